// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! agentgate-engine: the convergence controller (C6) and run state machine
//! (C7) that drive one work order's iteration loop from build through
//! verification to a terminal state.

pub mod error;
pub mod host;
pub mod iteration_loop;
pub mod loop_detector;
pub mod state;
pub mod strategy;

pub use error::{EngineError, TransitionError};
pub use host::DefaultLoopHost;
pub use iteration_loop::{BuildOutcome, IterationSnapshot, LoopHost, LoopOutcome};
pub use loop_detector::{Fingerprint, LoopDetector, LoopFinding, LoopPattern};
pub use state::{apply_transition, transition, validate};
pub use strategy::{
    build_strategy, ConvergenceStrategy, Decision, FixedStrategy, HybridStrategy, LoopContext, ManualHandle, ManualStrategy,
    RalphStrategy,
};
