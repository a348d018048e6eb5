//! Testing utilities
//!
//! Mock tools and OpenFEC payload fixtures for exercising the server without
//! network access.

pub mod fixtures;
pub mod mocks;

pub use mocks::*;
