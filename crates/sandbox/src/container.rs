// SPDX-License-Identifier: MIT

//! Container-backed [`SandboxProvider`], behind the `container` feature.
//!
//! Shells out to the `docker` binary the same way the rest of this crate
//! shells out to `git`/child processes — no container-runtime crate
//! dependency, just `tokio::process::Command` plus the timeout/kill
//! machinery already used for plain subprocesses.

use crate::error::SandboxError;
use crate::exec::{ExecRequest, ExecResult};
use crate::path_guard::resolve_within;
use crate::provider::{Sandbox, SandboxProvider, SandboxStats};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::process::Command;

const CONTAINER_IMAGE_ENV: &str = "AGENTGATE_SANDBOX_IMAGE";
const DEFAULT_IMAGE: &str = "agentgate/sandbox-runtime:latest";
const KILL_GRACE_PERIOD: Duration = Duration::from_millis(2_000);

pub struct ContainerSandboxProvider {
    image: String,
}

impl Default for ContainerSandboxProvider {
    fn default() -> Self {
        Self { image: std::env::var(CONTAINER_IMAGE_ENV).unwrap_or_else(|_| DEFAULT_IMAGE.to_string()) }
    }
}

#[async_trait]
impl SandboxProvider for ContainerSandboxProvider {
    async fn acquire(&self, workspace_root: PathBuf) -> Result<Box<dyn Sandbox>, SandboxError> {
        if !workspace_root.exists() {
            return Err(SandboxError::RootUnavailable(workspace_root));
        }
        let output = Command::new("docker")
            .args(["run", "-d", "--rm", "-v"])
            .arg(format!("{}:/workspace", workspace_root.display()))
            .arg("-w")
            .arg("/workspace")
            .arg(&self.image)
            .arg("sleep")
            .arg("infinity")
            .output()
            .await
            .map_err(|source| SandboxError::Spawn { command: "docker run".into(), source })?;

        if !output.status.success() {
            return Err(SandboxError::Spawn {
                command: "docker run".into(),
                source: std::io::Error::other(String::from_utf8_lossy(&output.stderr).into_owned()),
            });
        }
        let container_id = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(Box::new(ContainerSandbox { root: workspace_root, container_id, destroyed: AtomicBool::new(false) }))
    }
}

pub struct ContainerSandbox {
    root: PathBuf,
    container_id: String,
    destroyed: AtomicBool,
}

impl ContainerSandbox {
    fn check_alive(&self) -> Result<(), SandboxError> {
        if self.destroyed.load(Ordering::Acquire) {
            return Err(SandboxError::Destroyed);
        }
        Ok(())
    }
}

#[async_trait]
impl Sandbox for ContainerSandbox {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn execute(&self, request: ExecRequest) -> Result<ExecResult, SandboxError> {
        self.check_alive()?;
        let cwd = request.cwd.as_deref().unwrap_or("/workspace").to_string();

        let mut cmd = Command::new("docker");
        cmd.args(["exec", "-w", &cwd]);
        for (k, v) in &request.env {
            cmd.arg("-e").arg(format!("{k}={v}"));
        }
        cmd.arg(&self.container_id).arg(&request.command).args(&request.args);
        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);

        let start = Instant::now();
        let child = cmd.spawn().map_err(|source| SandboxError::Spawn {
            command: request.command.clone(),
            source,
        })?;

        match tokio::time::timeout(request.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(ExecResult {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                timed_out: false,
                duration: start.elapsed(),
            }),
            Ok(Err(source)) => Err(SandboxError::Io { path: self.root.clone(), source }),
            Err(_) => {
                kill_exec_with_grace(&self.container_id, &request.command, KILL_GRACE_PERIOD).await;
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
        tokio::fs::write(&resolved, content)
            .await
            .map_err(|source| SandboxError::Io { path: resolved, source })
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
        let mut stack = vec![resolved];
        while let Some(dir) = stack.pop() {
            let mut entries = tokio::fs::read_dir(&dir)
                .await
                .map_err(|source| SandboxError::Io { path: dir.clone(), source })?;
            while let Some(entry) =
                entries.next_entry().await.map_err(|source| SandboxError::Io { path: dir.clone(), source })?
            {
                let entry_path = entry.path();
                if entry
                    .file_type()
                    .await
                    .map_err(|source| SandboxError::Io { path: entry_path.clone(), source })?
                    .is_dir()
                {
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
        // The host-mounted volume is the source of truth for disk usage;
        // process count inside the container isn't tracked here.
        Ok(SandboxStats { disk_bytes: 0, process_count: 0 })
    }

    async fn destroy(&self) -> Result<(), SandboxError> {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let _ = Command::new("docker").args(["rm", "-f", &self.container_id]).output().await;
        Ok(())
    }
}

async fn kill_exec_with_grace(container_id: &str, command: &str, grace: Duration) {
    let _ = Command::new("docker")
        .args(["exec", container_id, "pkill", "-TERM", "-f", command])
        .output()
        .await;
    tokio::time::sleep(grace).await;
    let _ = Command::new("docker")
        .args(["exec", container_id, "pkill", "-KILL", "-f", command])
        .output()
        .await;
}
