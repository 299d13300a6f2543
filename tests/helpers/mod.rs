//! Test helpers module
//!
//! Shared fixtures and service setup for the integration tests.

#![allow(dead_code)]

pub mod fixtures;
pub mod test_context;

pub use fixtures::*;
pub use test_context::*;
