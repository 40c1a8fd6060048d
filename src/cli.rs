// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every option may also be provided through a `MONOHOOK_*` environment
//! variable; an explicit flag always wins. The command to execute comes after
//! the `--` terminator.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser, ValueEnum};

use crate::errors::MonohookError;
use crate::types::{ConcurrencyMode, DenyStatus};

const USAGE_EXAMPLES: &str = "\
Examples:
  Update a file when the hook is triggered:
    monohook -- touch hooked.txt
  Deploy an application when the hook is triggered:
    monohook -a letmein -- deploy-stuff.sh";

/// Command-line arguments for `monohook`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "monohook",
    version,
    about = "Expose a single HTTP webhook endpoint that executes a command.",
    override_usage = "monohook [OPTION...] [--] [EXEC...]",
    after_help = USAGE_EXAMPLES,
    long_about = None
)]
pub struct CliArgs {
    /// Token that must be sent as a Bearer token in the `Authorization` header
    /// or as the `authorization` URL query parameter.
    #[arg(short = 'a', long, env = "MONOHOOK_AUTHORIZATION", value_name = "TOKEN")]
    pub authorization: Option<String>,

    /// Maximum number of requests to queue before refusing subsequent ones
    /// (zero for infinite).
    #[arg(short = 'b', long, env = "MONOHOOK_BUFFER", default_value_t = 10)]
    pub buffer: usize,

    /// Maximum number of times the command may run in parallel (zero for
    /// infinite concurrency).
    #[arg(short = 'c', long, env = "MONOHOOK_CONCURRENCY", default_value_t = 1)]
    pub concurrency: usize,

    /// How the concurrency limit is enforced: `batch` waits for every running
    /// command before starting more, `window` starts one as soon as a slot frees.
    #[arg(
        long,
        value_enum,
        env = "MONOHOOK_CONCURRENCY_MODE",
        default_value_t = ConcurrencyMode::Batch
    )]
    pub concurrency_mode: ConcurrencyMode,

    /// Working directory in which to run the command.
    #[arg(short = 'C', long, env = "MONOHOOK_CWD", value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Forward each request's body to the command's standard input.
    #[arg(
        short = 'B',
        long,
        env = "MONOHOOK_FORWARD_REQUEST_BODY",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub forward_request_body: bool,

    /// Forward each request's headers as environment variables
    /// (e.g. Content-Type becomes $MONOHOOK_REQUEST_HEADER_CONTENT_TYPE).
    #[arg(
        short = 'H',
        long,
        env = "MONOHOOK_FORWARD_REQUEST_HEADERS",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub forward_request_headers: bool,

    /// Forward each request's URL as the $MONOHOOK_REQUEST_URL environment variable.
    #[arg(
        short = 'U',
        long,
        env = "MONOHOOK_FORWARD_REQUEST_URL",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub forward_request_url: bool,

    /// Port on which to listen.
    #[arg(short = 'p', long, env = "MONOHOOK_PORT", default_value_t = 5000)]
    pub port: u16,

    /// Do not print anything except the command's output.
    #[arg(
        short = 'q',
        long,
        env = "MONOHOOK_QUIET",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new()
    )]
    pub quiet: bool,

    /// Status answered to unauthorized requests.
    #[arg(
        long,
        value_enum,
        env = "MONOHOOK_DENY_STATUS",
        default_value_t = DenyStatus::Unauthorized
    )]
    pub deny_status: DenyStatus,

    /// Seconds allowed for handling a request (does not limit the command).
    #[arg(
        long,
        env = "MONOHOOK_REQUEST_TIMEOUT",
        value_name = "SECS",
        default_value_t = 30
    )]
    pub request_timeout: u64,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MONOHOOK_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Command to execute, followed by its arguments.
    #[arg(last = true, value_name = "EXEC")]
    pub exec: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Parse the process arguments.
///
/// Help and version requests print and exit immediately. Other parse failures
/// are returned so that `main` can pick the exit code.
pub fn parse() -> Result<CliArgs, MonohookError> {
    CliArgs::try_parse().map_err(classify)
}

/// Parse an explicit argument list (used by tests).
pub fn parse_from<I, T>(args: I) -> Result<CliArgs, MonohookError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    CliArgs::try_parse_from(args).map_err(classify)
}

fn classify(err: clap::Error) -> MonohookError {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => err.exit(),
        ErrorKind::InvalidValue | ErrorKind::ValueValidation => {
            MonohookError::InvalidOption(err.to_string())
        }
        _ => MonohookError::InvalidArguments(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let args = parse_from(["monohook", "--", "touch", "hooked.txt"]).unwrap();

        assert_eq!(args.buffer, 10);
        assert_eq!(args.concurrency, 1);
        assert_eq!(args.port, 5000);
        assert_eq!(args.concurrency_mode, ConcurrencyMode::Batch);
        assert_eq!(args.deny_status, DenyStatus::Unauthorized);
        assert!(!args.quiet);
        assert!(!args.forward_request_body);
        assert_eq!(args.exec, vec!["touch".to_string(), "hooked.txt".to_string()]);
    }

    #[test]
    fn short_flags_are_recognised() {
        let args = parse_from([
            "monohook", "-a", "letmein", "-b", "0", "-c", "4", "-B", "-H", "-U", "-q", "-p",
            "8080", "--", "deploy.sh", "--fast",
        ])
        .unwrap();

        assert_eq!(args.authorization.as_deref(), Some("letmein"));
        assert_eq!(args.buffer, 0);
        assert_eq!(args.concurrency, 4);
        assert!(args.forward_request_body);
        assert!(args.forward_request_headers);
        assert!(args.forward_request_url);
        assert!(args.quiet);
        assert_eq!(args.port, 8080);
        assert_eq!(args.exec, vec!["deploy.sh".to_string(), "--fast".to_string()]);
    }

    #[test]
    fn malformed_number_is_an_option_error() {
        let err = parse_from(["monohook", "-b", "lots", "--", "true"]).unwrap_err();
        assert!(matches!(err, MonohookError::InvalidOption(_)));
    }

    #[test]
    fn port_out_of_range_is_an_option_error() {
        let err = parse_from(["monohook", "-p", "70000", "--", "true"]).unwrap_err();
        assert!(matches!(err, MonohookError::InvalidOption(_)));
    }

    #[test]
    fn positional_before_terminator_is_an_argument_error() {
        let err = parse_from(["monohook", "touch", "--", "true"]).unwrap_err();
        assert!(matches!(err, MonohookError::InvalidArguments(_)));
    }

    #[test]
    fn deny_status_accepts_403() {
        let args = parse_from(["monohook", "--deny-status", "403", "--", "true"]).unwrap();
        assert_eq!(args.deny_status, DenyStatus::Forbidden);
    }
}
