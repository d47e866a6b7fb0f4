//! End-to-end scenarios
//!
//! Complete rule sets applied to small host classes, checked by their
//! observable behavior.

mod access_control;
mod logger;
