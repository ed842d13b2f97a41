// SPDX-License-Identifier: MIT

//! Driver registry: keyed by lowercase name, first registered wins as the
//! default.

use crate::driver_trait::AgentDriver;
use crate::error::DriverError;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Default)]
pub struct DriverRegistry {
    drivers: HashMap<String, Arc<dyn AgentDriver>>,
    default_key: Option<String>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a driver. The key is lowercased; the first call establishes
    /// the default.
    pub fn register(&mut self, key: impl Into<String>, driver: Arc<dyn AgentDriver>) {
        let key = key.into().to_lowercase();
        if self.default_key.is_none() {
            self.default_key = Some(key.clone());
        }
        self.drivers.insert(key, driver);
    }

    pub fn get(&self, key: &str) -> Result<Arc<dyn AgentDriver>, DriverError> {
        self.drivers
            .get(&key.to_lowercase())
            .cloned()
            .ok_or_else(|| DriverError::NotFound(key.to_string()))
    }

    pub fn default_driver(&self) -> Result<Arc<dyn AgentDriver>, DriverError> {
        let key = self.default_key.as_deref().ok_or(DriverError::NotFound("<default>".to_string()))?;
        self.get(key)
    }

    pub fn keys(&self) -> Vec<&str> {
        self.drivers.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver_trait::ExecuteOptions;
    use crate::request::AgentRequest;
    use crate::result::{AgentCapabilities, AgentResult};
    use async_trait::async_trait;

    struct StubDriver(&'static str);

    #[async_trait]
    impl AgentDriver for StubDriver {
        fn name(&self) -> &str {
            self.0
        }
        async fn is_available(&self) -> bool {
            true
        }
        fn capabilities(&self) -> AgentCapabilities {
            AgentCapabilities::default()
        }
        async fn execute(
            &self,
            _request: AgentRequest,
            _opts: ExecuteOptions,
        ) -> Result<AgentResult, DriverError> {
            unreachable!("not exercised in registry tests")
        }
    }

    #[test]
    fn first_registered_becomes_default() {
        let mut registry = DriverRegistry::new();
        registry.register("Claude", Arc::new(StubDriver("claude")));
        registry.register("codex", Arc::new(StubDriver("codex")));
        assert_eq!(registry.default_driver().unwrap().name(), "claude");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let mut registry = DriverRegistry::new();
        registry.register("Claude", Arc::new(StubDriver("claude")));
        assert!(registry.get("CLAUDE").is_ok());
    }

    #[test]
    fn missing_key_is_not_found() {
        let registry = DriverRegistry::new();
        assert!(matches!(registry.get("nope"), Err(DriverError::NotFound(_))));
    }
}
