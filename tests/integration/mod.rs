//! Integration tests for spot-validator.
//!
//! These tests drive the public API end to end with mock collaborators.

pub mod cli_tests;
pub mod correction_tests;
pub mod geometry_tests;
pub mod validation_tests;
