//! Shared utilities for specfold.
//!
//! This crate provides the cross-cutting error type used by the other
//! specfold crates.

pub mod errors;
