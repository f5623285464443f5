//! Evict: controlled handover of a promoter resource to a peer
//!
//! - Scope checks (one plugin, one resource per snippet)
//! - Per-resource state machine
//! - Scoped disable guaranteeing the snippet is re-enabled
//! - Interruptible wait for a peer to take over

mod errors;
mod guard;
mod orchestrator;
mod precheck;
mod state;
mod wait;

pub use errors::{EvictError, EvictResult};
pub use guard::DisabledSnippet;
pub use orchestrator::{EvictOutcome, EvictReport, EvictSettings, Evictor, DEFAULT_DELAY};
pub use precheck::{check_scope, ScopeViolation, ViolationReason};
pub use state::EvictState;
pub use wait::{Interrupt, InterruptFlag, Sleeper, SignalRegistration, ThreadSleeper};
