//! Integration test suite.
//!
//! 1. End-to-end render scenarios
//! 2. Schema document loading and strict validation

pub mod document_tests;
pub mod scenarios;
