// SPDX-License-Identifier: MIT

//! Gate plan document types (see spec §6 "Gate plan format").
//!
//! Deserialization is strict: an unrecognized `check.type` tag is a hard
//! error at the boundary (serde's internally-tagged enum rejects it)
//! rather than being silently skipped, per the open question in spec §9.

use serde::{Deserialize, Serialize};

/// Convergence controller strategy selector (see `agentgate_engine::strategy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Fixed,
    Hybrid,
    Ralph,
    Adaptive,
    Manual,
}

/// A single naming convention rule target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingRule {
    pub path_glob: String,
    /// One of the built-in convention names, or a regex if unrecognized.
    pub convention: String,
}

/// A single JSON schema rule applied to one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SchemaRule {
    HasField { file: String, field: String },
    FieldType { file: String, field: String, expected_type: String },
    MatchesRegex { file: String, field: String, pattern: String },
    JsonSchema { file: String, schema_ref: String },
}

/// L0 contract checks: required files, forbidden patterns, schema rules,
/// naming conventions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractsCheck {
    #[serde(default)]
    pub required_files: Vec<String>,
    #[serde(default)]
    pub forbidden_patterns: Vec<String>,
    #[serde(default)]
    pub schema_rules: Vec<SchemaRule>,
    #[serde(default)]
    pub naming_rules: Vec<NamingRule>,
}

/// L1-L3 declared command checks (tests / build / lint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandCheck {
    pub label: String,
    pub command: String,
}

/// Arbitrary shell command with a declared expected exit code and timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomCommandCheck {
    pub command: String,
    #[serde(default = "default_expected_exit")]
    pub expected_exit: i32,
    /// Duration string like `"5m"`, `"30s"`.
    #[serde(default = "default_timeout")]
    pub timeout: String,
}

fn default_expected_exit() -> i32 {
    0
}

fn default_timeout() -> String {
    "5m".to_string()
}

/// Convergence comparison strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceStrategyKind {
    Fingerprint,
    Similarity,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceCheck {
    pub strategy: ConvergenceStrategyKind,
    #[serde(default = "default_convergence_threshold")]
    pub threshold: f64,
}

fn default_convergence_threshold() -> f64 {
    0.95
}

/// External CI/signal poll check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CiSignalCheck {
    pub workflow: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_ci_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_ci_timeout_ms() -> u64 {
    600_000
}

/// The tagged union of gate check kinds (spec §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GateCheck {
    Contracts(ContractsCheck),
    Command(CommandCheck),
    CustomCommand(CustomCommandCheck),
    Convergence(ConvergenceCheck),
    CiSignal(CiSignalCheck),
}

impl GateCheck {
    pub fn type_name(&self) -> &'static str {
        match self {
            GateCheck::Contracts(_) => "contracts",
            GateCheck::Command(_) => "command",
            GateCheck::CustomCommand(_) => "custom_command",
            GateCheck::Convergence(_) => "convergence",
            GateCheck::CiSignal(_) => "ci_signal",
        }
    }
}

/// What to do when a gate fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnFailureAction {
    Continue,
    Stop,
    Retry,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnFailure {
    pub action: OnFailureAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateSpec {
    pub name: String,
    pub check: GateCheck,
    pub on_failure: OnFailure,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Limits {
    pub max_iterations: u32,
    pub max_wall_clock: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatePlan {
    pub version: u32,
    pub strategy: StrategyKind,
    #[serde(default)]
    pub config: serde_json::Value,
    pub gates: Vec<GateSpec>,
    pub limits: Limits,
}

impl GatePlan {
    /// Parse from a JSON document, rejecting unknown check types and
    /// malformed shapes at the boundary (spec §9 open question).
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_check_type() {
        let doc = r#"{
            "version": 1,
            "strategy": "fixed",
            "gates": [{"name": "g", "check": {"type": "bogus"}, "on_failure": {"action": "stop"}}],
            "limits": {"max_iterations": 3, "max_wall_clock": "1h"}
        }"#;
        assert!(GatePlan::from_json(doc).is_err());
    }

    #[test]
    fn parses_a_full_plan() {
        let doc = r#"{
            "version": 1,
            "strategy": "fixed",
            "gates": [
                {
                    "name": "contracts",
                    "check": {"type": "contracts", "required_files": ["README.md"]},
                    "on_failure": {"action": "stop"}
                },
                {
                    "name": "custom",
                    "check": {"type": "custom_command", "command": "echo ok"},
                    "on_failure": {"action": "retry", "max_retries": 2}
                }
            ],
            "limits": {"max_iterations": 3, "max_wall_clock": "1h"}
        }"#;
        let plan = GatePlan::from_json(doc).unwrap();
        assert_eq!(plan.gates.len(), 2);
        assert_eq!(plan.gates[1].check.type_name(), "custom_command");
    }
}
