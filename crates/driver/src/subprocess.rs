// SPDX-License-Identifier: MIT

//! Default [`AgentDriver`]: spawns the agent as a child process, optionally
//! streaming its stdout through the wire-format line parser.

use crate::driver_trait::{AgentDriver, ExecuteOptions};
use crate::env::build_env;
use crate::error::DriverError;
use crate::final_output::{extract_session_id, extract_tokens_used, parse_final_output};
use crate::request::AgentRequest;
use crate::result::{AgentCapabilities, AgentResult};
use crate::streaming::StreamState;
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};

const KILL_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Builds the argv (excluding the binary name) for one request.
pub type ArgvBuilder = Arc<dyn Fn(&AgentRequest) -> Vec<String> + Send + Sync>;

pub struct SubprocessAgentDriver {
    name: String,
    binary: String,
    build_argv: ArgvBuilder,
    env_deny_list: Vec<String>,
    capabilities: AgentCapabilities,
}

impl SubprocessAgentDriver {
    pub fn new(
        name: impl Into<String>,
        binary: impl Into<String>,
        build_argv: ArgvBuilder,
        env_deny_list: Vec<String>,
        capabilities: AgentCapabilities,
    ) -> Self {
        Self { name: name.into(), binary: binary.into(), build_argv, env_deny_list, capabilities }
    }
}

#[async_trait]
impl AgentDriver for SubprocessAgentDriver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        which(&self.binary).await
    }

    fn capabilities(&self) -> AgentCapabilities {
        self.capabilities
    }

    async fn execute(
        &self,
        request: AgentRequest,
        opts: ExecuteOptions,
    ) -> Result<AgentResult, DriverError> {
        let args = (self.build_argv)(&request);
        let env = build_env(std::env::vars(), &self.env_deny_list, &std::collections::HashMap::new());

        let mut cmd = Command::new(&self.binary);
        cmd.args(&args)
            .current_dir(&request.workspace_path)
            .env_clear()
            .envs(&env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(DriverError::Spawn)?;
        let pid = child.id();

        let stdout_handle = spawn_stdout_reader(&mut child, start, opts.event_sink.clone());
        let stderr_handle = spawn_stderr_reader(&mut child);

        let timeout = request.timeout;
        let cancel = opts.cancel.clone();

        enum Outcome {
            Exited(std::io::Result<std::process::ExitStatus>),
            TimedOut,
            Cancelled,
        }

        let outcome = tokio::select! {
            status = child.wait() => Outcome::Exited(status),
            _ = tokio::time::sleep(timeout) => Outcome::TimedOut,
            _ = cancel_or_pending(cancel.as_ref()) => Outcome::Cancelled,
        };

        match outcome {
            Outcome::Exited(status) => {
                let stdout = stdout_handle.await.unwrap_or_default();
                let stderr = stderr_handle.await.unwrap_or_default();
                let status = status.map_err(DriverError::Io)?;
                let structured = parse_final_output(&stdout);
                let session_id = extract_session_id(&structured);
                let tokens_used = extract_tokens_used(&structured);
                Ok(AgentResult {
                    success: status.success(),
                    exit_code: status.code(),
                    stdout,
                    stderr,
                    structured_output: Some(structured),
                    session_id,
                    tokens_used,
                    duration_ms: start.elapsed().as_millis() as u64,
                    timed_out: false,
                    cancelled: false,
                })
            }
            Outcome::TimedOut => {
                if let Some(pid) = pid {
                    kill_with_grace(pid as i32, KILL_GRACE_PERIOD).await;
                }
                Ok(AgentResult {
                    success: false,
                    exit_code: Some(124),
                    stdout: String::new(),
                    stderr: String::new(),
                    structured_output: None,
                    session_id: None,
                    tokens_used: None,
                    duration_ms: start.elapsed().as_millis() as u64,
                    timed_out: true,
                    cancelled: false,
                })
            }
            Outcome::Cancelled => {
                if let Some(pid) = pid {
                    let _ = nix::sys::signal::kill(
                        nix::unistd::Pid::from_raw(pid as i32),
                        nix::sys::signal::Signal::SIGTERM,
                    );
                }
                Ok(AgentResult {
                    success: false,
                    exit_code: None,
                    stdout: String::new(),
                    stderr: String::new(),
                    structured_output: None,
                    session_id: None,
                    tokens_used: None,
                    duration_ms: start.elapsed().as_millis() as u64,
                    timed_out: false,
                    cancelled: true,
                })
            }
        }
    }
}

fn spawn_stdout_reader(
    child: &mut Child,
    start: Instant,
    event_sink: Option<(tokio::sync::mpsc::Sender<agentgate_core::Event>, crate::request::StreamContext)>,
) -> tokio::task::JoinHandle<String> {
    let stdout = child.stdout.take();
    tokio::spawn(async move {
        let mut collected = String::new();
        let mut stream_state = event_sink.as_ref().map(|_| StreamState::new(start));
        let Some(stdout) = stdout else { return collected };
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            collected.push_str(&line);
            collected.push('\n');
            if let (Some((tx, ctx)), Some(state)) = (event_sink.as_ref(), stream_state.as_mut()) {
                for payload in state.process_line(&line, Instant::now()) {
                    let event =
                        agentgate_core::Event::new(ctx.work_order_id, Some(ctx.run_id), chrono::Utc::now(), payload);
                    let _ = tx.send(event).await;
                }
            }
        }
        collected
    })
}

fn spawn_stderr_reader(child: &mut Child) -> tokio::task::JoinHandle<String> {
    let stderr = child.stderr.take();
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = stderr {
            let _ = pipe.read_to_end(&mut buf).await;
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

async fn cancel_or_pending(cancel: Option<&tokio_util::sync::CancellationToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

async fn kill_with_grace(pid: i32, grace: Duration) {
    let nix_pid = nix::unistd::Pid::from_raw(pid);
    if nix::sys::signal::kill(nix_pid, nix::sys::signal::Signal::SIGTERM).is_err() {
        return;
    }
    tokio::time::sleep(grace).await;
    if nix::sys::signal::kill(nix_pid, None).is_ok() {
        let _ = nix::sys::signal::kill(nix_pid, nix::sys::signal::Signal::SIGKILL);
    }
}

async fn which(binary: &str) -> bool {
    Command::new("sh")
        .arg("-c")
        .arg(format!("command -v {binary}"))
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
