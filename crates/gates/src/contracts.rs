// SPDX-License-Identifier: MIT

//! L0 contracts gate: required files, forbidden patterns, JSON schema
//! rules, and naming conventions.

use crate::context::GateContext;
use crate::glob_util::{build_matcher, pattern_matches, walk_files};
use crate::naming::check_convention;
use crate::runner::GateRunner;
use agentgate_core::gate_plan::{ContractsCheck, NamingRule, SchemaRule};
use agentgate_core::{GateFailure, GateResult, WorkOrderId};
use async_trait::async_trait;
use std::path::Path;
use std::time::Instant;

pub struct ContractsRunner {
    check: ContractsCheck,
}

impl ContractsRunner {
    pub fn new(check: ContractsCheck) -> Self {
        Self { check }
    }

    async fn check_required_files(&self, ctx: &GateContext<'_>, failures: &mut Vec<GateFailure>) {
        for path in &self.check.required_files {
            if ctx.sandbox.read_file(Path::new(path)).await.is_err() {
                failures.push(GateFailure { file: Some(path.clone()), ..GateFailure::message(format!("required file missing: {path}")) });
            }
        }
    }

    fn check_forbidden_patterns(&self, ctx: &GateContext<'_>, failures: &mut Vec<GateFailure>) {
        let Some(matcher) = build_matcher(ctx.root(), &self.check.forbidden_patterns) else { return };
        for file in walk_files(ctx.root()) {
            if pattern_matches(&matcher, &file) {
                failures.push(GateFailure {
                    file: Some(file.display().to_string()),
                    ..GateFailure::message(format!("forbidden pattern matched: {}", file.display()))
                });
            }
        }
    }

    async fn check_schema_rules(&self, ctx: &GateContext<'_>, failures: &mut Vec<GateFailure>) {
        for rule in &self.check.schema_rules {
            if let Err(message) = apply_schema_rule(ctx, rule).await {
                failures.push(GateFailure::message(message));
            }
        }
    }

    fn check_naming_rules(&self, ctx: &GateContext<'_>, failures: &mut Vec<GateFailure>) {
        for rule in &self.check.naming_rules {
            check_naming_rule(ctx, rule, failures);
        }
    }
}

fn check_naming_rule(ctx: &GateContext<'_>, rule: &NamingRule, failures: &mut Vec<GateFailure>) {
    let Some(matcher) = build_matcher(ctx.root(), std::slice::from_ref(&rule.path_glob)) else { return };
    // Empty match set passes vacuously — no failures pushed when nothing matches.
    for file in walk_files(ctx.root()) {
        if !pattern_matches(&matcher, &file) {
            continue;
        }
        let stem = file.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        if !check_convention(stem, &rule.convention) {
            failures.push(GateFailure {
                file: Some(file.display().to_string()),
                ..GateFailure::message(format!("{} does not follow {}", file.display(), rule.convention))
            });
        }
    }
}

async fn apply_schema_rule(ctx: &GateContext<'_>, rule: &SchemaRule) -> Result<(), String> {
    match rule {
        SchemaRule::HasField { file, field } => {
            let value = read_json(ctx, file).await?;
            resolve_dot_path(&value, field).ok_or_else(|| format!("{file}: missing field `{field}`")).map(|_| ())
        }
        SchemaRule::FieldType { file, field, expected_type } => {
            let value = read_json(ctx, file).await?;
            let found = resolve_dot_path(&value, field).ok_or_else(|| format!("{file}: missing field `{field}`"))?;
            if json_type_name(found) == expected_type {
                Ok(())
            } else {
                Err(format!("{file}: field `{field}` expected type {expected_type}, found {}", json_type_name(found)))
            }
        }
        SchemaRule::MatchesRegex { file, field, pattern } => {
            let value = read_json(ctx, file).await?;
            let found = resolve_dot_path(&value, field).ok_or_else(|| format!("{file}: missing field `{field}`"))?;
            let text = found.as_str().ok_or_else(|| format!("{file}: field `{field}` is not a string"))?;
            let re = regex::Regex::new(pattern).map_err(|e| format!("{file}: invalid regex `{pattern}`: {e}"))?;
            if re.is_match(text) {
                Ok(())
            } else {
                Err(format!("{file}: field `{field}` value `{text}` does not match /{pattern}/"))
            }
        }
        SchemaRule::JsonSchema { file, schema_ref } => {
            let value = read_json(ctx, file).await?;
            let schema = read_json(ctx, schema_ref).await?;
            validate_minimal_schema(&value, &schema).map_err(|e| format!("{file}: {e}"))
        }
    }
}

async fn read_json(ctx: &GateContext<'_>, path: &str) -> Result<serde_json::Value, String> {
    let bytes = ctx.sandbox.read_file(Path::new(path)).await.map_err(|e| format!("{path}: {e}"))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("{path}: invalid JSON: {e}"))
}

fn resolve_dot_path<'a>(value: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
    path.split('.').try_fold(value, |current, segment| current.get(segment))
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// A deliberately minimal JSON-schema subset: top-level `required` and
/// `properties.<k>.type`. Sufficient for contract checks without pulling in
/// a full schema-validation dependency.
fn validate_minimal_schema(value: &serde_json::Value, schema: &serde_json::Value) -> Result<(), String> {
    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for field in required {
            let Some(name) = field.as_str() else { continue };
            if value.get(name).is_none() {
                return Err(format!("missing required field `{name}`"));
            }
        }
    }
    if let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) {
        for (name, prop_schema) in properties {
            let Some(expected) = prop_schema.get("type").and_then(|t| t.as_str()) else { continue };
            if let Some(found) = value.get(name) {
                if json_type_name(found) != expected {
                    return Err(format!("field `{name}` expected type {expected}, found {}", json_type_name(found)));
                }
            }
        }
    }
    Ok(())
}

#[async_trait]
impl GateRunner for ContractsRunner {
    fn check_type(&self) -> &'static str {
        "contracts"
    }

    async fn run(&self, ctx: &GateContext<'_>, gate_name: &str) -> GateResult {
        let start = Instant::now();
        let mut failures = Vec::new();

        self.check_required_files(ctx, &mut failures).await;
        self.check_forbidden_patterns(ctx, &mut failures);
        self.check_schema_rules(ctx, &mut failures).await;
        self.check_naming_rules(ctx, &mut failures);

        let duration = start.elapsed();
        if failures.is_empty() {
            GateResult::pass(gate_name, self.check_type(), duration)
        } else {
            GateResult::fail(gate_name, self.check_type(), duration, failures)
        }
    }

    fn reset(&self, _work_order_id: WorkOrderId) {
        // Contracts checks are stateless across iterations.
    }
}

#[cfg(test)]
#[path = "contracts_tests.rs"]
mod tests;
