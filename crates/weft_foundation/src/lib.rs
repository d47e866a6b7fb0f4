//! Core values, persistent collections, and error types for Weft.
//!
//! This crate provides:
//! - [`Value`] - The dynamic value passed to and returned from woven operations
//! - [`Type`] - Type descriptors used in argument checking and error messages
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`WeftVec`], [`WeftMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod types;
pub mod value;

pub use collections::{WeftMap, WeftVec};
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use types::Type;
pub use value::Value;
