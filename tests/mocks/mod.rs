//! Mock collaborators and sheet fixtures for testing without network
//! services.
//!
//! The mocks record every call behind an `Arc<Mutex<_>>` so a test can keep
//! a handle after the orchestrator takes ownership of the boxed mock.

pub mod services;
pub mod sheets;

pub use services::*;
pub use sheets::*;
