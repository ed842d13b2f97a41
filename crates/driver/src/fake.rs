// SPDX-License-Identifier: MIT

//! Scripted [`AgentDriver`] test double. Enabled under `cfg(test)` within
//! this crate and via the `test-support` feature for downstream crates.

use crate::driver_trait::{AgentDriver, ExecuteOptions};
use crate::error::DriverError;
use crate::request::AgentRequest;
use crate::result::{AgentCapabilities, AgentResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;

fn default_success() -> AgentResult {
    AgentResult {
        success: true,
        exit_code: Some(0),
        stdout: String::new(),
        stderr: String::new(),
        structured_output: None,
        session_id: None,
        tokens_used: None,
        duration_ms: 0,
        timed_out: false,
        cancelled: false,
    }
}

/// A driver whose results are scripted ahead of time, for exercising the
/// iteration loop and daemon wiring without spawning a real agent process.
///
/// Results are popped off a queue in order; once the queue is drained,
/// a default success repeats so a test doesn't have to script every
/// iteration it doesn't care about. Every request passed to `execute` is
/// recorded and can be inspected afterwards via [`FakeAgentDriver::requests`].
pub struct FakeAgentDriver {
    name: String,
    available: Mutex<bool>,
    capabilities: AgentCapabilities,
    queued: Mutex<VecDeque<AgentResult>>,
    requests: Mutex<Vec<AgentRequest>>,
}

impl FakeAgentDriver {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            available: Mutex::new(true),
            capabilities: AgentCapabilities {
                supports_session_resume: true,
                supports_structured_output: true,
                supports_tool_restriction: true,
                supports_timeout: true,
                max_turns: None,
            },
            queued: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a result to be returned on the next `execute` call that drains it.
    pub fn push_result(&self, result: AgentResult) {
        self.queued.lock().push_back(result);
    }

    /// Queue a structured-output-only success, the common case of signaling
    /// `done` to the convergence controller.
    pub fn push_structured(&self, structured_output: serde_json::Value) {
        self.push_result(AgentResult { structured_output: Some(structured_output), ..default_success() });
    }

    pub fn set_available(&self, available: bool) {
        *self.available.lock() = available;
    }

    pub fn requests(&self) -> Vec<AgentRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl AgentDriver for FakeAgentDriver {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        *self.available.lock()
    }

    fn capabilities(&self) -> AgentCapabilities {
        self.capabilities
    }

    async fn execute(&self, request: AgentRequest, _opts: ExecuteOptions) -> Result<AgentResult, DriverError> {
        self.requests.lock().push(request);
        let result = self.queued.lock().pop_front().unwrap_or_else(default_success);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn req() -> AgentRequest {
        AgentRequest::new(std::path::PathBuf::from("/workspace"), "do it", Duration::from_secs(1))
    }

    #[tokio::test]
    async fn repeats_default_success_once_queue_is_drained() {
        let driver = FakeAgentDriver::new("fake");
        let result = driver.execute(req(), ExecuteOptions::default()).await.unwrap();
        assert!(result.success);
        assert_eq!(driver.call_count(), 1);
    }

    #[tokio::test]
    async fn returns_queued_results_in_order() {
        let driver = FakeAgentDriver::new("fake");
        driver.push_structured(serde_json::json!({ "done": false }));
        driver.push_structured(serde_json::json!({ "done": true }));
        let first = driver.execute(req(), ExecuteOptions::default()).await.unwrap();
        let second = driver.execute(req(), ExecuteOptions::default()).await.unwrap();
        assert_eq!(first.structured_output.unwrap()["done"], false);
        assert_eq!(second.structured_output.unwrap()["done"], true);
    }

    #[tokio::test]
    async fn unavailable_when_toggled_off() {
        let driver = FakeAgentDriver::new("fake");
        driver.set_available(false);
        assert!(!driver.is_available().await);
    }
}
