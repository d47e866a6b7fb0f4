//! Instances.
//!
//! An [`Object`] is a shared handle to an instance of a [`Class`]. Calls and
//! field accesses dispatch through the class's member table at the moment of
//! the access, so a slot replaced after the instance was created is seen by
//! every later access.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use weft_foundation::{Error, Result, Value};

use crate::callable::Args;
use crate::class::{Class, Member};

static NEXT_SLOT: AtomicU64 = AtomicU64::new(1);

/// Identity of an instance-storage slot owned by a synthesized property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(u64);

impl SlotId {
    /// Allocates a fresh slot id.
    #[must_use]
    pub fn allocate() -> Self {
        Self(NEXT_SLOT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Key of an instance field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldKey {
    /// A field written by name.
    Named(Arc<str>),
    /// Backing storage for a synthesized property.
    Slot(SlotId),
}

struct Inner {
    class: Arc<Class>,
    fields: RwLock<HashMap<FieldKey, Value>>,
}

/// Shared handle to an instance.
#[derive(Clone)]
pub struct Object(Arc<Inner>);

impl Object {
    /// Creates an instance with no fields set.
    #[must_use]
    pub fn new(class: &Arc<Class>) -> Self {
        Self(Arc::new(Inner {
            class: Arc::clone(class),
            fields: RwLock::new(HashMap::new()),
        }))
    }

    /// Returns the runtime class.
    #[must_use]
    pub fn class(&self) -> &Arc<Class> {
        &self.0.class
    }

    /// Calls the method `name`.
    pub fn call(&self, name: &str, args: &Args) -> Result<Value> {
        match self.0.class.lookup(name) {
            Some(Member::Method(callable)) => callable.call(self, args),
            Some(_) => Err(Error::not_callable(self.0.class.name(), name)),
            None => Err(Error::member_not_found(self.0.class.name(), name)),
        }
    }

    /// Reads `name`: a property's getter, an attribute (instance field first,
    /// then the class value), or a field the class does not declare.
    pub fn get(&self, name: &str) -> Result<Value> {
        match self.0.class.lookup(name) {
            Some(Member::Property(property)) => property.getter.call(self, &Args::new()),
            Some(Member::Attribute(default)) => Ok(self.field(name).unwrap_or(default)),
            Some(Member::Method(_)) => Err(Error::not_a_value(self.0.class.name(), name)),
            None => self
                .field(name)
                .ok_or_else(|| Error::member_not_found(self.0.class.name(), name)),
        }
    }

    /// Writes `name`: through a property's setter, or into an instance field.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        match self.0.class.lookup(name) {
            Some(Member::Property(property)) => match property.setter {
                Some(setter) => setter.call(self, &Args::new().with(value)).map(|_| ()),
                None => Err(Error::read_only(self.0.class.name(), name)),
            },
            Some(Member::Method(_)) => Err(Error::not_a_value(self.0.class.name(), name)),
            Some(Member::Attribute(_)) | None => {
                self.set_field(name, value);
                Ok(())
            }
        }
    }

    /// Reads a named instance field without dispatching through the class.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<Value> {
        self.0
            .fields
            .read()
            .get(&FieldKey::Named(Arc::from(name)))
            .cloned()
    }

    /// Writes a named instance field without dispatching through the class.
    pub fn set_field(&self, name: &str, value: Value) {
        self.0
            .fields
            .write()
            .insert(FieldKey::Named(Arc::from(name)), value);
    }

    /// Reads a property backing slot.
    #[must_use]
    pub fn read_slot(&self, slot: SlotId) -> Option<Value> {
        self.0.fields.read().get(&FieldKey::Slot(slot)).cloned()
    }

    /// Writes a property backing slot.
    pub fn write_slot(&self, slot: SlotId, value: Value) {
        self.0.fields.write().insert(FieldKey::Slot(slot), value);
    }

    /// Returns true if both handles refer to the same instance.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} instance>", self.0.class.name())
    }
}
