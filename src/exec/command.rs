// src/exec/command.rs

//! Production invoker: spawn the configured command for each job.

use std::future::Future;
use std::pin::Pin;
use std::process::{ExitStatus, Stdio};

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::exec::backend::{InvocationOutcome, Invoker};
use crate::job::{Job, JobInput, QueuedJob};

/// Spawns the job's command with its arguments, working directory and
/// environment, and waits for it to exit.
///
/// - stdout and stderr of the child go to the host's stdout.
/// - stdin is fed from the job's input pipe when body forwarding is on,
///   otherwise it is `/dev/null`.
#[derive(Debug, Clone, Default)]
pub struct CommandInvoker;

impl CommandInvoker {
    pub fn new() -> Self {
        Self
    }
}

impl Invoker for CommandInvoker {
    fn invoke(
        &self,
        job: QueuedJob,
    ) -> Pin<Box<dyn Future<Output = InvocationOutcome> + Send + '_>> {
        Box::pin(run_job(job))
    }
}

/// Run a single job, converting every failure into a logged outcome.
pub async fn run_job(queued: QueuedJob) -> InvocationOutcome {
    let QueuedJob { seq, job } = queued;
    let command = job.display_command();

    info!(seq, command = %command, "executing command");

    match run_job_inner(job).await {
        Ok(status) if status.success() => {
            info!(seq, command = %command, "successfully executed command");
            InvocationOutcome::Success
        }
        Ok(status) => {
            let code = status.code().unwrap_or(-1);
            error!(
                seq,
                command = %command,
                exit_code = code,
                "command failed: {status}"
            );
            InvocationOutcome::Failed(code)
        }
        Err(err) => {
            error!(seq, command = %command, error = %format!("{err:#}"), "command error");
            InvocationOutcome::Error
        }
    }
}

async fn run_job_inner(job: Job) -> Result<ExitStatus> {
    let Job {
        command,
        args,
        cwd,
        env,
        input,
    } = job;

    let mut cmd = Command::new(&command);
    cmd.args(&args).env_clear().envs(env);

    if let Some(ref dir) = cwd {
        cmd.current_dir(dir);
    }

    cmd.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::inherit())
    .stderr(host_stdout());

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning {}", command.display()))?;

    let feeder = match (input, child.stdin.take()) {
        (Some(input), Some(stdin)) => Some(spawn_stdin_feeder(input, stdin)),
        _ => None,
    };

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for {}", command.display()));

    // The job's input pipe must not outlive the process: dropping it lets the
    // request body transfer stop.
    if let Some(feeder) = feeder {
        close_input(feeder).await;
    }

    status
}

fn spawn_stdin_feeder(
    mut input: JobInput,
    mut stdin: tokio::process::ChildStdin,
) -> JoinHandle<std::io::Result<u64>> {
    tokio::spawn(async move {
        let copied = tokio::io::copy(&mut input, &mut stdin).await?;
        stdin.shutdown().await?;
        Ok(copied)
    })
}

async fn close_input(feeder: JoinHandle<std::io::Result<u64>>) {
    feeder.abort();
    match feeder.await {
        Ok(Ok(bytes)) => debug!(bytes, "request body delivered to command"),
        Ok(Err(err)) => debug!(error = %err, "command stopped reading its input"),
        Err(err) if err.is_cancelled() => {
            debug!("command exited before its input was fully delivered")
        }
        Err(err) => error!(error = %err, "stdin feeder task failed"),
    }
}

/// A second handle on the host's stdout, so the child's stderr lands there too.
#[cfg(unix)]
fn host_stdout() -> Stdio {
    use std::os::fd::AsFd;

    match std::io::stdout().as_fd().try_clone_to_owned() {
        Ok(fd) => Stdio::from(fd),
        Err(err) => {
            debug!(error = %err, "could not duplicate stdout; child stderr is inherited");
            Stdio::inherit()
        }
    }
}

#[cfg(not(unix))]
fn host_stdout() -> Stdio {
    Stdio::inherit()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::ffi::OsString;
    use std::path::PathBuf;
    use tokio::io::AsyncWriteExt;

    fn sh_job(script: &str) -> Job {
        Job {
            command: PathBuf::from("/bin/sh"),
            args: vec!["-c".to_string(), script.to_string()],
            cwd: None,
            env: std::env::vars_os().collect(),
            input: None,
        }
    }

    fn queued(job: Job) -> QueuedJob {
        QueuedJob { seq: 1, job }
    }

    #[tokio::test]
    async fn zero_exit_is_success() {
        assert_eq!(run_job(queued(sh_job("exit 0"))).await, InvocationOutcome::Success);
    }

    #[tokio::test]
    async fn non_zero_exit_is_reported_with_code() {
        assert_eq!(run_job(queued(sh_job("exit 7"))).await, InvocationOutcome::Failed(7));
    }

    #[tokio::test]
    async fn missing_executable_is_an_error_outcome() {
        let mut job = sh_job("exit 0");
        job.command = PathBuf::from("/definitely/not/a/command");

        assert_eq!(run_job(queued(job)).await, InvocationOutcome::Error);
    }

    #[tokio::test]
    async fn runs_in_working_directory_with_job_environment() {
        let dir = tempfile::tempdir().unwrap();
        let mut job = sh_job(r#"printf '%s' "$HOOK_VALUE" > out.txt"#);
        job.cwd = Some(dir.path().to_path_buf());
        job.env.push((OsString::from("HOOK_VALUE"), OsString::from("first")));
        job.env.push((OsString::from("HOOK_VALUE"), OsString::from("second")));

        assert!(run_job(queued(job)).await.is_success());

        let written = std::fs::read_to_string(dir.path().join("out.txt")).unwrap();
        assert_eq!(written, "second");
    }

    #[tokio::test]
    async fn input_pipe_feeds_stdin() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("stdin.txt");
        let mut job = sh_job(&format!("cat > '{}'", out.display()));

        let (reader, mut writer) = tokio::io::duplex(1024);
        job.input = Some(reader);
        writer.write_all(b"hello").await.unwrap();
        writer.shutdown().await.unwrap();

        assert!(run_job(queued(job)).await.is_success());
        assert_eq!(std::fs::read_to_string(out).unwrap(), "hello");
    }

    #[tokio::test]
    async fn input_is_closed_when_command_ignores_it() {
        let mut job = sh_job("exit 0");
        let (reader, mut writer) = tokio::io::duplex(16);
        job.input = Some(reader);

        assert!(run_job(queued(job)).await.is_success());

        // The reader side is gone, so further writes fail instead of blocking.
        let big = vec![0u8; 1024];
        assert!(writer.write_all(&big).await.is_err());
    }
}
