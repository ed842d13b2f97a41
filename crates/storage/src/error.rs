// SPDX-License-Identifier: MIT

//! Storage-layer errors.

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error at {path}: {source}")]
    Io { path: std::path::PathBuf, #[source] source: std::io::Error },
    #[error("serialization error for {id}: {source}")]
    Serde { id: String, #[source] source: serde_json::Error },
    #[error("no entity {id} under {dir}")]
    NotFound { dir: std::path::PathBuf, id: String },
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
}
