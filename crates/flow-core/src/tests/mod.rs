//! Test module for flow-core
//!
//! This module contains tests for:
//! - Descriptor parsing, field code stripping and bounded catalog scans
//! - App menu popup lifecycle and hit testing
//! - Shell startup, event routing, panels and teardown
//! - The dispatch loop's stop conditions and clock ticks
//! - Configuration parsing, defaults and validation

// Test code favours closures over method paths
#![allow(clippy::redundant_closure_for_method_calls)]

mod catalog_tests;
mod dispatcher_tests;
