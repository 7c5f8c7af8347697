//! Shared test utilities for supportdesk integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated stores and input files in a temp directory
//! - Builders for raw emails and CSV inputs

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
