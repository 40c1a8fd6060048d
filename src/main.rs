// src/main.rs

use monohook::config::HookConfig;
use monohook::errors::MonohookError;
use monohook::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = match cli::parse() {
        Ok(args) => args,
        Err(err) => fail(err, false),
    };

    let quiet = args.quiet;
    if let Err(err) = run_main(args).await {
        fail(err, quiet);
    }
}

async fn run_main(args: cli::CliArgs) -> Result<(), MonohookError> {
    logging::init_logging(args.quiet, args.log_level)?;
    let cfg = HookConfig::try_from(args)?;
    run(cfg).await?;
    Ok(())
}

fn fail(err: MonohookError, quiet: bool) -> ! {
    if !quiet {
        let message = err.to_string();
        eprintln!("Error: {}", message.trim_start_matches("error: ").trim_end());
    }
    std::process::exit(err.exit_code());
}
