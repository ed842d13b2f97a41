// SPDX-License-Identifier: MIT

//! Default [`SandboxProvider`]: confines execution to a filesystem root and
//! runs commands as plain child processes, without namespace/container
//! isolation.

use crate::error::SandboxError;
use crate::exec::{ExecRequest, ExecResult};
use crate::path_guard::resolve_within;
use crate::provider::{Sandbox, SandboxProvider, SandboxStats};
use async_trait::async_trait;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::Command;

/// Grace period between SIGTERM and SIGKILL when a command exceeds its
/// timeout or the sandbox is destroyed with children still running.
const KILL_GRACE_PERIOD: Duration = Duration::from_millis(2_000);

#[derive(Default)]
pub struct SubprocessSandboxProvider;

#[async_trait]
impl SandboxProvider for SubprocessSandboxProvider {
    async fn acquire(&self, workspace_root: PathBuf) -> Result<Box<dyn Sandbox>, SandboxError> {
        if !workspace_root.exists() {
            return Err(SandboxError::RootUnavailable(workspace_root));
        }
        Ok(Box::new(SubprocessSandbox {
            root: workspace_root,
            live_pids: Arc::new(Mutex::new(Vec::new())),
            destroyed: AtomicBool::new(false),
        }))
    }
}

pub struct SubprocessSandbox {
    root: PathBuf,
    live_pids: Arc<Mutex<Vec<i32>>>,
    destroyed: AtomicBool,
}

impl SubprocessSandbox {
    fn check_alive(&self) -> Result<(), SandboxError> {
        if self.destroyed.load(Ordering::Acquire) {
            return Err(SandboxError::Destroyed);
        }
        Ok(())
    }
}

#[async_trait]
impl Sandbox for SubprocessSandbox {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn execute(&self, request: ExecRequest) -> Result<ExecResult, SandboxError> {
        self.check_alive()?;
        let cwd = match &request.cwd {
            Some(rel) => resolve_within(&self.root, Path::new(rel))?,
            None => self.root.clone(),
        };

        let mut cmd = Command::new(&request.command);
        cmd.args(&request.args)
            .current_dir(&cwd)
            .envs(&request.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|source| SandboxError::Spawn {
            command: request.command.clone(),
            source,
        })?;

        if let Some(pid) = child.id() {
            self.live_pids.lock().push(pid as i32);
        }

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();

        let wait = async {
            let mut stdout = Vec::new();
            let mut stderr = Vec::new();
            let (status, _, _) = tokio::join!(
                child.wait(),
                async {
                    if let Some(pipe) = stdout_pipe.as_mut() {
                        let _ = pipe.read_to_end(&mut stdout).await;
                    }
                },
                async {
                    if let Some(pipe) = stderr_pipe.as_mut() {
                        let _ = pipe.read_to_end(&mut stderr).await;
                    }
                }
            );
            (status, stdout, stderr)
        };

        match tokio::time::timeout(request.timeout, wait).await {
            Ok((status, stdout, stderr)) => {
                if let Some(pid) = child.id() {
                    self.live_pids.lock().retain(|p| *p != pid as i32);
                }
                let status = status.map_err(|source| SandboxError::Io { path: cwd.clone(), source })?;
                Ok(ExecResult {
                    exit_code: status.code(),
                    stdout: String::from_utf8_lossy(&stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&stderr).into_owned(),
                    timed_out: false,
                    duration: start.elapsed(),
                })
            }
            Err(_) => {
                if let Some(pid) = child.id() {
                    kill_with_grace(pid as i32, KILL_GRACE_PERIOD).await;
                    self.live_pids.lock().retain(|p| *p != pid as i32);
                }
                tracing::warn!(command = %request.command, timeout_ms = request.timeout.as_millis() as u64, "command timed out");
                Ok(ExecResult {
                    exit_code: None,
                    stdout: String::new(),
                    stderr: String::new(),
                    timed_out: true,
                    duration: start.elapsed(),
                })
            }
        }
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> Result<(), SandboxError> {
        self.check_alive()?;
        let resolved = resolve_within(&self.root, path)?;
        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| SandboxError::Io { path: parent.to_path_buf(), source })?;
        }
        let mut file = tokio::fs::File::create(&resolved)
            .await
            .map_err(|source| SandboxError::Io { path: resolved.clone(), source })?;
        file.write_all(content)
            .await
            .map_err(|source| SandboxError::Io { path: resolved.clone(), source })?;
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>, SandboxError> {
        self.check_alive()?;
        let resolved = resolve_within(&self.root, path)?;
        tokio::fs::read(&resolved).await.map_err(|source| SandboxError::Io { path: resolved, source })
    }

    async fn list_files(&self, path: &Path) -> Result<Vec<PathBuf>, SandboxError> {
        self.check_alive()?;
        let resolved = resolve_within(&self.root, path)?;
        let mut out = Vec::new();
        let mut stack = vec![resolved.clone()];
        while let Some(dir) = stack.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|source| SandboxError::Io { path: dir.clone(), source })?;
            while let Some(entry) =
                entries.next_entry().await.map_err(|source| SandboxError::Io { path: dir.clone(), source })?
            {
                let entry_path = entry.path();
                let file_type = entry
                    .file_type()
                    .await
                    .map_err(|source| SandboxError::Io { path: entry_path.clone(), source })?;
                if file_type.is_dir() {
                    stack.push(entry_path);
                } else {
                    out.push(entry_path);
                }
            }
        }
        Ok(out)
    }

    async fn get_stats(&self) -> Result<SandboxStats, SandboxError> {
        self.check_alive()?;
        let process_count = self.live_pids.lock().len() as u32;
        let disk_bytes = dir_size(&self.root).await.unwrap_or(0);
        Ok(SandboxStats { disk_bytes, process_count })
    }

    async fn destroy(&self) -> Result<(), SandboxError> {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let pids: Vec<i32> = self.live_pids.lock().drain(..).collect();
        for pid in pids {
            kill_with_grace(pid, KILL_GRACE_PERIOD).await;
        }
        Ok(())
    }
}

/// Send SIGTERM, wait `grace`, then SIGKILL if the process is still alive.
async fn kill_with_grace(pid: i32, grace: Duration) {
    let nix_pid = Pid::from_raw(pid);
    if signal::kill(nix_pid, Signal::SIGTERM).is_err() {
        return; // already gone
    }
    tokio::time::sleep(grace).await;
    if signal::kill(nix_pid, None).is_ok() {
        let _ = signal::kill(nix_pid, Signal::SIGKILL);
    }
}

async fn dir_size(path: &Path) -> std::io::Result<u64> {
    let mut total = 0u64;
    let mut stack = vec![path.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                stack.push(entry.path());
            } else if let Ok(meta) = entry.metadata().await {
                total += meta.len();
            }
        }
    }
    Ok(total)
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
