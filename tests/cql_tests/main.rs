//! CQL statement generation tests
//!
//! These tests verify:
//! - Insert templates (column order, placeholders, unqualified table)
//! - Table DDL (type mapping, primary key)
//! - Index DDL per index group
//! - Rejection of unique constraints and InsertAndUpdate
