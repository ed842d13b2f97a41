// SPDX-License-Identifier: MIT

//! Append-only security audit log. Entries are line-delimited JSON, rotated
//! by size and swept by age (spec's external-interfaces persistence rules).

use crate::error::StorageError;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;
pub const DEFAULT_RETENTION_DAYS: i64 = 90;

/// Where audit entries are delivered. `Syslog` is approximated by logging
/// through `tracing` on the `"audit"` target, which is how this process
/// hands entries to the platform's log collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditDestination {
    File,
    Stdout,
    Syslog,
}

impl AuditDestination {
    fn from_str(value: &str) -> Result<Self, StorageError> {
        match value {
            "file" => Ok(Self::File),
            "stdout" => Ok(Self::Stdout),
            "syslog" => Ok(Self::Syslog),
            other => {
                Err(StorageError::InvalidEnv { var: "AGENTGATE_AUDIT_DESTINATION", value: other.to_string() })
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub event: String,
    pub subject: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
}

pub struct AuditLogConfig {
    pub destination: AuditDestination,
    pub path: PathBuf,
    pub include_content: bool,
    pub max_bytes: u64,
    pub retention_days: i64,
}

impl AuditLogConfig {
    /// Build config from `AGENTGATE_AUDIT_DESTINATION`, `AGENTGATE_AUDIT_CONTENT`,
    /// and `AGENTGATE_AUDIT_PATH`. `default_path` is used when the path
    /// variable is unset.
    pub fn from_env(default_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let destination = match std::env::var("AGENTGATE_AUDIT_DESTINATION") {
            Ok(value) => AuditDestination::from_str(&value)?,
            Err(_) => AuditDestination::File,
        };
        let include_content = match std::env::var("AGENTGATE_AUDIT_CONTENT") {
            Ok(value) => match value.as_str() {
                "true" => true,
                "false" => false,
                other => {
                    return Err(StorageError::InvalidEnv {
                        var: "AGENTGATE_AUDIT_CONTENT",
                        value: other.to_string(),
                    })
                }
            },
            Err(_) => true,
        };
        let path = std::env::var("AGENTGATE_AUDIT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_path.into());
        Ok(Self {
            destination,
            path,
            include_content,
            max_bytes: DEFAULT_MAX_BYTES,
            retention_days: DEFAULT_RETENTION_DAYS,
        })
    }
}

pub struct AuditLog {
    config: AuditLogConfig,
    lock: Mutex<()>,
}

impl AuditLog {
    pub fn new(config: AuditLogConfig) -> Result<Self, StorageError> {
        if config.destination == AuditDestination::File {
            if let Some(parent) = config.path.parent() {
                fs::create_dir_all(parent).map_err(|source| StorageError::Io { path: parent.to_path_buf(), source })?;
            }
        }
        Ok(Self { config, lock: Mutex::new(()) })
    }

    /// Append one entry, rotating the active file first if it is at or
    /// above `max_bytes`.
    pub fn record(
        &self,
        now: DateTime<Utc>,
        event: impl Into<String>,
        subject: serde_json::Value,
        content: Option<serde_json::Value>,
    ) -> Result<(), StorageError> {
        let entry = AuditEntry {
            timestamp: now,
            event: event.into(),
            subject,
            content: if self.config.include_content { content } else { None },
        };

        match self.config.destination {
            AuditDestination::Stdout => {
                println!("{}", serde_json::to_string(&entry).map_err(|source| StorageError::Serde {
                    id: entry.event.clone(),
                    source,
                })?);
                Ok(())
            }
            AuditDestination::Syslog => {
                tracing::info!(target: "audit", entry = %serde_json::to_string(&entry).unwrap_or_default());
                Ok(())
            }
            AuditDestination::File => self.append_to_file(now, &entry),
        }
    }

    fn append_to_file(&self, now: DateTime<Utc>, entry: &AuditEntry) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        rotate_if_needed(&self.config.path, self.config.max_bytes, now)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.config.path)
            .map_err(|source| StorageError::Io { path: self.config.path.clone(), source })?;
        let mut line = serde_json::to_vec(entry)
            .map_err(|source| StorageError::Serde { id: entry.event.clone(), source })?;
        line.push(b'\n');
        file.write_all(&line).map_err(|source| StorageError::Io { path: self.config.path.clone(), source })
    }

    /// Remove rotated files older than `retention_days`, leaving the active
    /// log file untouched.
    pub fn sweep_retention(&self, now: DateTime<Utc>) -> Result<usize, StorageError> {
        let Some(dir) = self.config.path.parent() else { return Ok(0) };
        let cutoff = now - chrono::Duration::days(self.config.retention_days);
        let stem = rotated_stem(&self.config.path);

        let entries = fs::read_dir(dir).map_err(|source| StorageError::Io { path: dir.to_path_buf(), source })?;
        let mut removed = 0;
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::Io { path: dir.to_path_buf(), source })?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
            let Some(suffix) = name.strip_prefix(&stem) else { continue };
            let Some(timestamp) = parse_rotation_suffix(suffix) else { continue };
            if timestamp < cutoff {
                fs::remove_file(&path).map_err(|source| StorageError::Io { path: path.clone(), source })?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

fn rotated_stem(path: &Path) -> String {
    format!("{}-", path.file_name().and_then(|n| n.to_str()).unwrap_or("audit.jsonl"))
}

fn parse_rotation_suffix(suffix: &str) -> Option<DateTime<Utc>> {
    suffix.parse::<i64>().ok().and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
}

fn rotate_if_needed(path: &Path, max_bytes: u64, now: DateTime<Utc>) -> Result<(), StorageError> {
    let Ok(metadata) = fs::metadata(path) else { return Ok(()) };
    if metadata.len() < max_bytes {
        return Ok(());
    }
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("audit.jsonl");
    let rotated = path.with_file_name(format!("{file_name}-{}", now.timestamp()));
    fs::rename(path, &rotated).map_err(|source| StorageError::Io { path: rotated, source })
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
