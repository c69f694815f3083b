//! Core types and utilities for autolint.
//!
//! This crate provides the foundations shared by the validator engine and
//! the command-line shell:
//! - Error types with stable error codes and suggestions
//! - JSON helpers backed by sonic-rs

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
mod json;

pub use error::{DeliveryFailure, Error, ErrorCode, Result};
pub use json::{from_json, from_json_slice, to_json, to_json_pretty};

// Re-export commonly used types
pub use ahash::{AHashMap, AHashSet};
