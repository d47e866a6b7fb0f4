//! Weft - Runtime advice weaving for class member tables
//!
//! This crate re-exports all layers of the Weft system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: weft_engine     — Locator, pointcuts, weaves, rule sets, reset
//! Layer 1: weft_model      — Classes, member tables, callables, instances
//! Layer 0: weft_foundation — Core types (Value, Type, Error)
//! ```

pub use weft_engine as engine;
pub use weft_foundation as foundation;
pub use weft_model as model;
