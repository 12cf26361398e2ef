//! Tests for the engine
//!
//! Organized by feature area

mod helpers;
mod resolver_tests;
