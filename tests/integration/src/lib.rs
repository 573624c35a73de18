//! Integration test utilities for the library server
//!
//! Spawns the REST API against real PostgreSQL and Redis instances and
//! seeds the data an end-to-end test needs to log in.

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
