//! Definition loader tests
//!
//! These tests verify:
//! - Loading definitions and records from files
//! - Registration of JSON-described entities
//! - Field coercion into bound values

mod definition_tests;
