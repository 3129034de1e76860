//! Test utilities.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - An in-memory persistence implementing every repo trait
//! - A mock payment gateway and email sender
//! - `TestAppStateBuilder` for HTTP-level tests

mod app_state_builder;
mod factories;
mod mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use mocks::*;
