//! # cradle-common
//!
//! Shared types, error definitions, and constants used across the Cradle
//! workspace.
//!
//! This crate is the leaf of the dependency graph — it depends on no other
//! internal crate and provides the data contract through which the container
//! engine hands metadata to the unit generator.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod constants;
pub mod error;
pub mod types;
