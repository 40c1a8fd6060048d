use std::path::PathBuf;

use monohook::config::ForwardOptions;
use monohook::engine::{admission_queue, AdmissionReceiver};
use monohook::http::{AuthToken, HookState};
use monohook::job::{Job, JobBuilder};
use monohook::types::DenyStatus;

/// A job whose command is never meant to be spawned (fake invokers).
pub fn inert_job() -> Job {
    Job {
        command: PathBuf::from("/nonexistent/inert"),
        args: Vec::new(),
        cwd: None,
        env: Vec::new(),
        input: None,
    }
}

/// Builder for `HookState` to simplify HTTP test setup.
///
/// `build` returns the consumer side of the queue as well, so tests can either
/// inspect it directly or hand it to a `Scheduler`.
pub struct HookStateBuilder {
    secret: Option<String>,
    deny_status: DenyStatus,
    capacity: usize,
    command: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    forward: ForwardOptions,
}

impl HookStateBuilder {
    pub fn new() -> Self {
        Self {
            secret: None,
            deny_status: DenyStatus::default(),
            capacity: 10,
            command: PathBuf::from("/bin/true"),
            args: Vec::new(),
            cwd: None,
            forward: ForwardOptions::default(),
        }
    }

    pub fn secret(mut self, secret: &str) -> Self {
        self.secret = Some(secret.to_string());
        self
    }

    pub fn deny_status(mut self, status: DenyStatus) -> Self {
        self.deny_status = status;
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Run `/bin/sh -c <script>` for every job.
    pub fn sh(mut self, script: &str) -> Self {
        self.command = PathBuf::from("/bin/sh");
        self.args = vec!["-c".to_string(), script.to_string()];
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn forward_body(mut self) -> Self {
        self.forward.body = true;
        self
    }

    pub fn forward_headers(mut self) -> Self {
        self.forward.headers = true;
        self
    }

    pub fn forward_url(mut self) -> Self {
        self.forward.url = true;
        self
    }

    pub fn build(self) -> (HookState, AdmissionReceiver) {
        let (queue, receiver) = admission_queue(self.capacity);
        let state = HookState {
            auth: AuthToken::new(self.secret),
            deny_status: self.deny_status,
            builder: JobBuilder::new(self.command, self.args, self.cwd, self.forward),
            queue,
        };
        (state, receiver)
    }
}

impl Default for HookStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
