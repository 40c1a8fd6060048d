// src/config/validate.rs

use std::time::Duration;

use crate::cli::CliArgs;
use crate::config::model::{ForwardOptions, HookConfig};
use crate::config::resolve::find_executable;
use crate::errors::{MonohookError, Result};

impl TryFrom<CliArgs> for HookConfig {
    type Error = MonohookError;

    fn try_from(args: CliArgs) -> std::result::Result<Self, Self::Error> {
        let path_var = std::env::var_os("PATH");
        build_config(args, path_var.as_deref())
    }
}

/// Validate parsed arguments and resolve the command using the given `PATH`.
pub fn build_config(args: CliArgs, path_var: Option<&std::ffi::OsStr>) -> Result<HookConfig> {
    let mut exec = args.exec.into_iter();
    let name = exec.next().ok_or_else(|| {
        MonohookError::InvalidArguments("no command to execute was provided".to_string())
    })?;

    let command = find_executable(&name, path_var)
        .ok_or_else(|| MonohookError::CommandNotFound(name.clone()))?;

    if let Some(ref cwd) = args.cwd {
        if !cwd.is_dir() {
            return Err(MonohookError::InvalidOption(format!(
                "working directory '{}' does not exist or is not a directory",
                cwd.display()
            )));
        }
    }

    if args.request_timeout == 0 {
        return Err(MonohookError::InvalidOption(
            "--request-timeout must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(HookConfig {
        auth_token: args.authorization.filter(|token| !token.is_empty()),
        queue_capacity: args.buffer,
        concurrency: args.concurrency,
        concurrency_mode: args.concurrency_mode,
        cwd: args.cwd,
        forward: ForwardOptions {
            body: args.forward_request_body,
            headers: args.forward_request_headers,
            url: args.forward_request_url,
        },
        port: args.port,
        deny_status: args.deny_status,
        request_timeout: Duration::from_secs(args.request_timeout),
        command,
        args: exec.collect(),
    })
}
