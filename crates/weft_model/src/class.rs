//! Classes and their member tables.
//!
//! A [`Class`] owns a table of named [`Member`] slots and an explicit ancestor
//! list (nearest first). Lookup checks the class's own slot, then each ancestor
//! in order. Slots are replaced in place through [`Class::set_member`] and
//! [`Class::remove_member`]; both advance the member-table generation.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use weft_foundation::{Result, Value};

use crate::callable::{Args, Callable};
use crate::generation;
use crate::object::{Object, SlotId};

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a class within the process.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    fn allocate() -> Self {
        Self(NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn index(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Members
// =============================================================================

/// The two member categories a rule can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MemberCategory {
    /// Callable members.
    Method,
    /// Attributes and properties.
    Property,
}

/// Storage behind a property synthesized from a plain attribute.
#[derive(Clone, Debug, PartialEq)]
pub struct Backing {
    /// Per-instance field slot holding the current value.
    pub slot: SlotId,
    /// The attribute's class-level value, returned until the slot is written.
    pub default: Value,
}

/// An accessor pair.
#[derive(Clone, Debug)]
pub struct Property {
    /// Called with no arguments on read.
    pub getter: Callable,
    /// Called with the new value as its only positional argument on write.
    pub setter: Option<Callable>,
    /// Present when the property stands in for a plain attribute.
    pub backing: Option<Backing>,
}

impl Property {
    /// Creates a read-only property.
    #[must_use]
    pub fn new(getter: Callable) -> Self {
        Self {
            getter,
            setter: None,
            backing: None,
        }
    }

    /// Adds a setter.
    #[must_use]
    pub fn with_setter(mut self, setter: Callable) -> Self {
        self.setter = Some(setter);
        self
    }

    /// Returns a copy with the setter replaced.
    #[must_use]
    pub fn replace_setter(&self, setter: Callable) -> Self {
        Self {
            setter: Some(setter),
            ..self.clone()
        }
    }

    /// Builds a property stored in a fresh instance slot.
    ///
    /// Reads fall back to a field written under `name` before the property
    /// existed, then to `default`. Writes also land in that field, so the
    /// plain attribute restored by a reset reads the last written value.
    #[must_use]
    pub fn backed(name: &str, default: Value) -> Self {
        let slot = SlotId::allocate();
        let field: Arc<str> = Arc::from(name);
        let fallback = default.clone();
        let getter = {
            let field = Arc::clone(&field);
            Callable::native(name, move |subject: &Object, _: &Args| {
                Ok(subject
                    .read_slot(slot)
                    .or_else(|| subject.field(&field))
                    .unwrap_or_else(|| fallback.clone()))
            })
        };
        let setter = Callable::native(name, move |subject: &Object, args: &Args| {
            let value = args.require(0)?.clone();
            subject.set_field(&field, value.clone());
            subject.write_slot(slot, value);
            Ok(Value::Nil)
        });
        Self {
            getter,
            setter: Some(setter),
            backing: Some(Backing { slot, default }),
        }
    }

}

/// A member-table slot.
#[derive(Clone, Debug)]
pub enum Member {
    /// A method.
    Method(Callable),
    /// A class-level value; instances may shadow it with their own field.
    Attribute(Value),
    /// An accessor pair.
    Property(Property),
}

impl Member {
    /// Returns the category used for rule targeting.
    #[must_use]
    pub fn category(&self) -> MemberCategory {
        match self {
            Self::Method(_) => MemberCategory::Method,
            Self::Attribute(_) | Self::Property(_) => MemberCategory::Property,
        }
    }

    /// Returns the callable if this is a method.
    #[must_use]
    pub fn as_method(&self) -> Option<&Callable> {
        match self {
            Self::Method(c) => Some(c),
            _ => None,
        }
    }

    /// Returns the property if this is one.
    #[must_use]
    pub fn as_property(&self) -> Option<&Property> {
        match self {
            Self::Property(p) => Some(p),
            _ => None,
        }
    }

    /// The callable a weave would occupy: a method itself, or a property's setter.
    #[must_use]
    pub fn weavable(&self) -> Option<&Callable> {
        match self {
            Self::Method(c) => Some(c),
            Self::Property(p) => p.setter.as_ref(),
            Self::Attribute(_) => None,
        }
    }
}

// =============================================================================
// Class
// =============================================================================

/// A named type with a mutable member table.
pub struct Class {
    id: ClassId,
    name: Arc<str>,
    ancestors: Vec<Arc<Class>>,
    members: RwLock<BTreeMap<Arc<str>, Member>>,
}

impl Class {
    /// Starts building a class.
    #[must_use]
    pub fn builder(name: impl Into<Arc<str>>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    /// Returns the class identity.
    #[must_use]
    pub fn id(&self) -> ClassId {
        self.id
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the ancestor linearization, nearest first.
    #[must_use]
    pub fn ancestors(&self) -> &[Arc<Class>] {
        &self.ancestors
    }

    /// Ancestors that come after `owner` in this class's linearization.
    ///
    /// When `owner` is this class, that is every ancestor. When `owner` is not
    /// in the linearization at all the result is empty.
    #[must_use]
    pub fn ancestors_after(&self, owner: ClassId) -> &[Arc<Class>] {
        if owner == self.id {
            return &self.ancestors;
        }
        match self.ancestors.iter().position(|a| a.id == owner) {
            Some(i) => &self.ancestors[i + 1..],
            None => &[],
        }
    }

    /// Returns this class's own slot for `name`.
    #[must_use]
    pub fn own_member(&self, name: &str) -> Option<Member> {
        self.members.read().get(name).cloned()
    }

    /// Returns true if this class defines `name` itself.
    #[must_use]
    pub fn has_own(&self, name: &str) -> bool {
        self.members.read().contains_key(name)
    }

    /// Looks `name` up on this class, then its ancestors.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Member> {
        self.own_member(name)
            .or_else(|| self.lookup_inherited(name).map(|(_, m)| m))
    }

    /// Looks `name` up on the ancestors only, returning the defining class.
    #[must_use]
    pub fn lookup_inherited(&self, name: &str) -> Option<(Arc<Class>, Member)> {
        self.ancestors
            .iter()
            .find_map(|a| a.own_member(name).map(|m| (Arc::clone(a), m)))
    }

    /// Names this class defines itself, sorted.
    #[must_use]
    pub fn own_member_names(&self) -> Vec<String> {
        self.members.read().keys().map(|k| k.to_string()).collect()
    }

    /// Names visible on this class (own and inherited), sorted.
    #[must_use]
    pub fn member_names(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = self.own_member_names().into_iter().collect();
        for ancestor in &self.ancestors {
            names.extend(ancestor.own_member_names());
        }
        names.into_iter().collect()
    }

    /// Replaces (or creates) this class's own slot, returning the previous one.
    pub fn set_member(&self, name: &str, member: Member) -> Option<Member> {
        let previous = self.members.write().insert(Arc::from(name), member);
        let generation = generation::advance();
        tracing::trace!(class = %self.name, member = name, generation, "member slot replaced");
        previous
    }

    /// Removes this class's own slot so lookups fall through to ancestors.
    pub fn remove_member(&self, name: &str) -> Option<Member> {
        let previous = self.members.write().remove(name);
        if previous.is_some() {
            let generation = generation::advance();
            tracing::trace!(class = %self.name, member = name, generation, "member slot removed");
        }
        previous
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("id", &self.id)
            .field("name", &self.name)
            .field(
                "ancestors",
                &self.ancestors.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// =============================================================================
// ClassBuilder
// =============================================================================

/// Builder for [`Class`].
pub struct ClassBuilder {
    name: Arc<str>,
    ancestors: Vec<Arc<Class>>,
    members: BTreeMap<Arc<str>, Member>,
}

impl ClassBuilder {
    fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            ancestors: Vec::new(),
            members: BTreeMap::new(),
        }
    }

    /// Appends `parent` and its ancestors to the linearization, skipping
    /// classes already present.
    #[must_use]
    pub fn extends(mut self, parent: &Arc<Class>) -> Self {
        for class in std::iter::once(parent).chain(parent.ancestors.iter()) {
            if !self.ancestors.iter().any(|a| a.id == class.id) {
                self.ancestors.push(Arc::clone(class));
            }
        }
        self
    }

    /// Adds a method backed by a closure.
    #[must_use]
    pub fn method<F>(mut self, name: &str, body: F) -> Self
    where
        F: Fn(&Object, &Args) -> Result<Value> + Send + Sync + 'static,
    {
        self.members
            .insert(Arc::from(name), Member::Method(Callable::native(name, body)));
        self
    }

    /// Adds a plain attribute with a class-level value.
    #[must_use]
    pub fn attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.members
            .insert(Arc::from(name), Member::Attribute(value.into()));
        self
    }

    /// Adds a property.
    #[must_use]
    pub fn property(mut self, name: &str, property: Property) -> Self {
        self.members
            .insert(Arc::from(name), Member::Property(property));
        self
    }

    /// Finishes the class.
    #[must_use]
    pub fn build(self) -> Arc<Class> {
        Arc::new(Class {
            id: ClassId::allocate(),
            name: self.name,
            ancestors: self.ancestors,
            members: RwLock::new(self.members),
        })
    }
}
