// SPDX-License-Identifier: MIT

use crate::error::DriverError;
use crate::request::{AgentRequest, StreamContext};
use crate::result::{AgentCapabilities, AgentResult};
use agentgate_core::Event;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Options controlling one [`AgentDriver::execute`] call: streaming and
/// cancellation are both optional, channel-based rather than buffered.
#[derive(Default)]
pub struct ExecuteOptions {
    /// When set, the driver switches to line-parsing streaming mode and
    /// emits typed events here instead of only returning the final result.
    pub event_sink: Option<(mpsc::Sender<Event>, StreamContext)>,
    pub cancel: Option<CancellationToken>,
}

impl ExecuteOptions {
    pub fn with_streaming(mut self, tx: mpsc::Sender<Event>, ctx: StreamContext) -> Self {
        self.event_sink = Some((tx, ctx));
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// A pluggable backend for invoking an external LLM-backed coding agent.
///
/// Multiple drivers coexist in a [`crate::registry::DriverRegistry`] keyed
/// by lowercase name; the first one registered is the default.
#[async_trait]
pub trait AgentDriver: Send + Sync {
    fn name(&self) -> &str;

    async fn is_available(&self) -> bool;

    fn capabilities(&self) -> AgentCapabilities;

    async fn execute(
        &self,
        request: AgentRequest,
        opts: ExecuteOptions,
    ) -> Result<AgentResult, DriverError>;
}
