//! # socksnoop-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the entire socksnoop workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate and provides the raw event shape and the connection state
//! table that every other crate builds upon.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
