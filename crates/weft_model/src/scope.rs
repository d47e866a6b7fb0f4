//! Explicit name → class mapping.
//!
//! Owner names in rule specifiers are resolved here rather than against
//! whatever happens to be visible at the call site.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::class::Class;

/// A set of classes addressable by name.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    entries: BTreeMap<String, Arc<Class>>,
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `class` under its own name.
    #[must_use]
    pub fn with(mut self, class: &Arc<Class>) -> Self {
        self.insert(class.name(), class);
        self
    }

    /// Adds `class` under `alias`, e.g. a qualified `garage.Car`.
    #[must_use]
    pub fn with_alias(mut self, alias: &str, class: &Arc<Class>) -> Self {
        self.insert(alias, class);
        self
    }

    /// Adds or replaces an entry.
    pub fn insert(&mut self, name: &str, class: &Arc<Class>) {
        self.entries.insert(name.to_string(), Arc::clone(class));
    }

    /// Returns the class named `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<Class>> {
        self.entries.get(name)
    }

    /// Iterates entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<Class>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the scope is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
