//! Process-wide member-table generation counter.
//!
//! Advanced whenever a member-table slot changes or a wrapper's claimant list
//! changes. Anything cached against the current member layout records the
//! generation it was computed at and is discarded once it no longer matches.

use std::sync::atomic::{AtomicU64, Ordering};

static GENERATION: AtomicU64 = AtomicU64::new(0);

/// Returns the current generation.
#[must_use]
pub fn current() -> u64 {
    GENERATION.load(Ordering::Acquire)
}

/// Advances the generation and returns the new value.
pub fn advance() -> u64 {
    GENERATION.fetch_add(1, Ordering::AcqRel) + 1
}
