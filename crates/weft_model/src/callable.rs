//! Callables and call arguments.
//!
//! A [`Callable`] is what occupies a method slot (or a property's getter and
//! setter). It is a named, cheaply-clonable handle to an [`Invoke`]
//! implementation. Native callables wrap closures; other crates add their own
//! implementations (the weaving engine's wrappers are one) and expose the
//! callable they wrap through [`Invoke::wrapped`].

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use weft_foundation::{Error, Result, Type, Value};

use crate::object::Object;

// =============================================================================
// Invoke
// =============================================================================

/// Something that can be called with a subject instance and arguments.
pub trait Invoke: Send + Sync + 'static {
    /// Runs the call.
    fn invoke(&self, subject: &Object, args: &Args) -> Result<Value>;

    /// The callable this one wraps, if it is a wrapper.
    fn wrapped(&self) -> Option<&Callable> {
        None
    }

    /// Upcast used by [`Callable::downcast`].
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

type NativeBody = dyn Fn(&Object, &Args) -> Result<Value> + Send + Sync;

/// Callable backed by a Rust closure.
struct NativeFn {
    body: Box<NativeBody>,
}

impl Invoke for NativeFn {
    fn invoke(&self, subject: &Object, args: &Args) -> Result<Value> {
        (self.body)(subject, args)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

// =============================================================================
// Callable
// =============================================================================

/// Shared handle to an [`Invoke`] implementation.
///
/// Equality is identity: two handles are the same callable only if they point
/// at the same implementation (see [`Callable::ptr_eq`]).
#[derive(Clone)]
pub struct Callable {
    name: Arc<str>,
    inner: Arc<dyn Invoke>,
}

impl Callable {
    /// Creates a callable from a closure.
    pub fn native<F>(name: impl Into<Arc<str>>, body: F) -> Self
    where
        F: Fn(&Object, &Args) -> Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            inner: Arc::new(NativeFn {
                body: Box::new(body),
            }),
        }
    }

    /// Creates a callable from any [`Invoke`] implementation.
    pub fn from_invoke(name: impl Into<Arc<str>>, inner: Arc<dyn Invoke>) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Calls with the given subject and arguments.
    pub fn call(&self, subject: &Object, args: &Args) -> Result<Value> {
        self.inner.invoke(subject, args)
    }

    /// The callable this one wraps, if any.
    #[must_use]
    pub fn wrapped(&self) -> Option<&Callable> {
        self.inner.wrapped()
    }

    /// Returns the implementation as `T` if that is its concrete type.
    #[must_use]
    pub fn downcast<T: Invoke>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.inner).into_any().downcast::<T>().ok()
    }

    /// Returns true if both handles point at the same implementation.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&a.inner), Arc::as_ptr(&b.inner))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.wrapped().is_some() {
            write!(f, "<woven fn {}>", self.name)
        } else {
            write!(f, "<fn {}>", self.name)
        }
    }
}

// =============================================================================
// Args
// =============================================================================

/// Positional and named arguments for a call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Args {
    positional: Vec<Value>,
    named: BTreeMap<String, Value>,
}

impl Args {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    #[must_use]
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Sets a named argument.
    #[must_use]
    pub fn with_named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    /// Number of positional arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positional.len()
    }

    /// True if there are no positional and no named arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Positional arguments in order.
    #[must_use]
    pub fn positional(&self) -> &[Value] {
        &self.positional
    }

    /// Named arguments, sorted by name.
    #[must_use]
    pub fn named(&self) -> &BTreeMap<String, Value> {
        &self.named
    }

    /// Positional argument at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Named argument `name`.
    #[must_use]
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        self.named.get(name)
    }

    /// Last positional argument (the proposed value for a property write).
    #[must_use]
    pub fn last(&self) -> Option<&Value> {
        self.positional.last()
    }

    /// Positional argument at `index`, or an arity error.
    pub fn require(&self, index: usize) -> Result<&Value> {
        self.positional
            .get(index)
            .ok_or_else(|| Error::arity_mismatch(format!("at least {}", index + 1), self.len()))
    }

    /// Named argument `name`, or a missing-argument error.
    pub fn require_named(&self, name: &str) -> Result<&Value> {
        self.named
            .get(name)
            .ok_or_else(|| Error::missing_argument(name))
    }

    /// Positional integer argument at `index`.
    pub fn int(&self, index: usize) -> Result<i64> {
        let value = self.require(index)?;
        value
            .as_int()
            .ok_or_else(|| Error::type_mismatch(Type::Int, value.value_type()))
    }

    /// Positional string argument at `index`.
    pub fn str(&self, index: usize) -> Result<&str> {
        let value = self.require(index)?;
        value
            .as_str()
            .ok_or_else(|| Error::type_mismatch(Type::String, value.value_type()))
    }

    /// Integer parameter passed either positionally at `index` or by `name`,
    /// falling back to `default` when neither is present.
    pub fn int_param(&self, index: usize, name: &str, default: i64) -> Result<i64> {
        match self.positional.get(index).or_else(|| self.named.get(name)) {
            None => Ok(default),
            Some(value) => value
                .as_int()
                .ok_or_else(|| Error::type_mismatch(Type::Int, value.value_type())),
        }
    }
}

impl From<Vec<Value>> for Args {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: BTreeMap::new(),
        }
    }
}
