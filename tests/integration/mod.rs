//! Integration test suite for taskagent.
//!
//! These tests drive the decision engine and the tool façade together
//! against in-process stores. No network service is contacted.
//!
//! # Test Categories
//!
//! - `engine_properties`: determinism and structural guarantees of the engine
//! - `facade_behaviour`: validation, timeouts, cancellation and partial writes
//! - `project_lifecycle`: plan, progress and review of a project end to end

mod fixtures;

mod engine_properties;
mod facade_behaviour;
mod project_lifecycle;
