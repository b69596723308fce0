//! Core data types for specfold.
//!
//! This crate defines the values the normalizer works on: the pluggable
//! version scheme, relational predicates, single package specs, and the
//! configuration that tunes normalization output.
//!
//! This crate is intentionally free of I/O apart from loading config files.

pub mod config;
pub mod predicate;
pub mod spec;
pub mod version;
