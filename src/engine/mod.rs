//! Validation engine module.
//!
//! Provides the local engine, remote delegation, and the result model.

pub mod orchestrator;
pub mod result;
pub mod validator;

pub use orchestrator::ValidatorOrchestrator;
pub use validator::{resolve_lots, ValidationEngine};
