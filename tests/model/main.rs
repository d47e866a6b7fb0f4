//! Integration tests for Layer 1: Model
//!
//! Tests for classes, member tables, and instance dispatch.

mod classes;
mod objects;
