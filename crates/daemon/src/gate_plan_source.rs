// SPDX-License-Identifier: MIT

//! Resolves a work order's `gate_plan_source` string into a [`GatePlan`].
//!
//! Two forms are recognized, each a prefix on the string:
//!
//! - `inline:<json>` — the gate plan's JSON body follows the prefix directly.
//! - `file:<path>` — `<path>` is read from disk (relative paths resolve
//!   against the work order's workspace root) and parsed as JSON.
//!
//! Any other prefix, or no recognized prefix at all, is rejected rather than
//! guessed at.

use agentgate_core::gate_plan::GatePlan;
use std::path::Path;

use crate::error::ApplicationError;

const INLINE_PREFIX: &str = "inline:";
const FILE_PREFIX: &str = "file:";

pub fn resolve(gate_plan_source: &str, workspace_root: &Path) -> Result<GatePlan, ApplicationError> {
    if let Some(json) = gate_plan_source.strip_prefix(INLINE_PREFIX) {
        return Ok(GatePlan::from_json(json)?);
    }
    if let Some(path) = gate_plan_source.strip_prefix(FILE_PREFIX) {
        let path = Path::new(path);
        let path = if path.is_absolute() { path.to_path_buf() } else { workspace_root.join(path) };
        let body = std::fs::read_to_string(&path)
            .map_err(|_| ApplicationError::GatePlanSource(format!("gate plan file not found: {}", path.display())))?;
        return Ok(GatePlan::from_json(&body)?);
    }
    Err(ApplicationError::GatePlanSource(format!(
        "gate_plan_source `{gate_plan_source}` has no recognized `inline:`/`file:` prefix"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn resolves_inline_json() {
        let json = r#"{"version":1,"strategy":"fixed","config":{},"gates":[],"limits":{"max_iterations":3,"max_wall_clock":"10m"}}"#;
        let source = format!("inline:{json}");
        let plan = resolve(&source, Path::new("/tmp")).unwrap();
        assert_eq!(plan.gates.len(), 0);
    }

    #[test]
    fn resolves_file_relative_to_workspace_root() {
        let dir = tempfile::tempdir().unwrap();
        let json = r#"{"version":1,"strategy":"fixed","config":{},"gates":[],"limits":{"max_iterations":3,"max_wall_clock":"10m"}}"#;
        let mut file = std::fs::File::create(dir.path().join("plan.json")).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let plan = resolve("file:plan.json", dir.path()).unwrap();
        assert_eq!(plan.gates.len(), 0);
    }

    #[test]
    fn rejects_unrecognized_prefix() {
        assert!(resolve("http://example.com/plan.json", Path::new("/tmp")).is_err());
    }
}
