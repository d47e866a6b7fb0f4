//! Advice records.
//!
//! An [`Advice`] is an interceptor declared against a pointcut reference. It is
//! immutable once created and shared as `Arc<Advice>`; declaring one never
//! touches a member table, only a pointcut that claims a joinpoint does.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use weft_foundation::{Result, Value};
use weft_model::{Args, Object};

use crate::locator::{Specifier, TargetCategory};
use crate::pointcut::Pointcut;

/// When an advice runs relative to the original operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdviceKind {
    /// Before the around chain, with the caller's arguments.
    Before,
    /// After the original returns, observing only.
    After,
    /// Wraps the inner chain and decides whether and how to continue.
    Around,
}

/// What an advice is declared against.
#[derive(Clone)]
pub enum PointcutRef {
    /// A pointcut value.
    Pointcut(Arc<Pointcut>),
    /// A member of the same rule-set declaration, or a raw specifier if no
    /// member has that name.
    Name(String),
    /// A specifier for which an anonymous pointcut is created.
    Specifier(Specifier),
}

impl From<Arc<Pointcut>> for PointcutRef {
    fn from(pointcut: Arc<Pointcut>) -> Self {
        Self::Pointcut(pointcut)
    }
}

impl From<&Arc<Pointcut>> for PointcutRef {
    fn from(pointcut: &Arc<Pointcut>) -> Self {
        Self::Pointcut(Arc::clone(pointcut))
    }
}

impl From<&str> for PointcutRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<Specifier> for PointcutRef {
    fn from(specifier: Specifier) -> Self {
        Self::Specifier(specifier)
    }
}

impl fmt::Debug for PointcutRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pointcut(p) => write!(f, "Pointcut({})", p.display_name()),
            Self::Name(name) => write!(f, "Name({name})"),
            Self::Specifier(specifier) => write!(f, "Specifier({specifier})"),
        }
    }
}

// =============================================================================
// Rule-set handle
// =============================================================================

struct HandleInner {
    name: Option<String>,
    attributes: BTreeMap<String, Value>,
}

/// The rule set a pointcut belongs to, as seen by its advices.
#[derive(Clone)]
pub struct RuleSetHandle(Arc<HandleInner>);

impl RuleSetHandle {
    /// Creates a handle for a named rule set.
    #[must_use]
    pub fn new(name: impl Into<String>, attributes: BTreeMap<String, Value>) -> Self {
        Self(Arc::new(HandleInner {
            name: Some(name.into()),
            attributes,
        }))
    }

    /// The handle of pointcuts that belong to no rule set.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(Arc::new(HandleInner {
            name: None,
            attributes: BTreeMap::new(),
        }))
    }

    /// Rule-set name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.0.name.as_deref()
    }

    /// True if this handle belongs to no rule set.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0.name.is_none()
    }

    /// A declaration-level attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.0.attributes.get(name)
    }
}

impl fmt::Debug for RuleSetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "RuleSet({name})"),
            None => write!(f, "RuleSet(<anonymous>)"),
        }
    }
}

// =============================================================================
// Next
// =============================================================================

type ChainFn<'a> = dyn Fn(&Object, &Args) -> Result<Value> + 'a;

/// The rest of the chain, as handed to an around advice.
#[derive(Clone, Copy)]
pub struct Next<'a> {
    inner: &'a ChainFn<'a>,
}

impl<'a> Next<'a> {
    pub(crate) fn new(inner: &'a ChainFn<'a>) -> Self {
        Self { inner }
    }

    /// Continues with the inner chain.
    pub fn call(&self, subject: &Object, args: &Args) -> Result<Value> {
        (self.inner)(subject, args)
    }
}

// =============================================================================
// Advice
// =============================================================================

type ObserveFn = dyn Fn(&RuleSetHandle, &str, &Object, &Args) -> Result<()> + Send + Sync;
type AroundFn =
    dyn for<'n> Fn(&RuleSetHandle, &str, Next<'n>, &Object, &Args) -> Result<Value> + Send + Sync;

enum Callback {
    Observe(Box<ObserveFn>),
    Around(Box<AroundFn>),
}

/// An interceptor attached to a pointcut.
pub struct Advice {
    name: String,
    kind: AdviceKind,
    target: PointcutRef,
    category: TargetCategory,
    callback: Callback,
}

impl Advice {
    /// Declares an advice that runs before the operation.
    pub fn before<F>(name: impl Into<String>, target: impl Into<PointcutRef>, f: F) -> Self
    where
        F: Fn(&RuleSetHandle, &str, &Object, &Args) -> Result<()> + Send + Sync + 'static,
    {
        Self::observer(name.into(), AdviceKind::Before, target.into(), Box::new(f))
    }

    /// Declares an advice that runs after the operation returns.
    pub fn after<F>(name: impl Into<String>, target: impl Into<PointcutRef>, f: F) -> Self
    where
        F: Fn(&RuleSetHandle, &str, &Object, &Args) -> Result<()> + Send + Sync + 'static,
    {
        Self::observer(name.into(), AdviceKind::After, target.into(), Box::new(f))
    }

    /// Declares an advice that wraps the operation.
    pub fn around<F>(name: impl Into<String>, target: impl Into<PointcutRef>, f: F) -> Self
    where
        F: for<'n> Fn(&RuleSetHandle, &str, Next<'n>, &Object, &Args) -> Result<Value>
            + Send
            + Sync
            + 'static,
    {
        Self {
            name: name.into(),
            kind: AdviceKind::Around,
            target: target.into(),
            category: TargetCategory::All,
            callback: Callback::Around(Box::new(f)),
        }
    }

    fn observer(
        name: String,
        kind: AdviceKind,
        target: PointcutRef,
        f: Box<ObserveFn>,
    ) -> Self {
        Self {
            name,
            kind,
            target,
            category: TargetCategory::All,
            callback: Callback::Observe(f),
        }
    }

    /// Restricts the categories targeted when the advice synthesizes its own pointcut.
    #[must_use]
    pub fn with_category(mut self, category: TargetCategory) -> Self {
        self.category = category;
        self
    }

    /// Returns the advice name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the advice kind.
    #[must_use]
    pub fn kind(&self) -> AdviceKind {
        self.kind
    }

    /// Returns the declared target.
    #[must_use]
    pub fn target(&self) -> &PointcutRef {
        &self.target
    }

    /// Returns the target category.
    #[must_use]
    pub fn category(&self) -> TargetCategory {
        self.category
    }

    /// Runs a before or after callback. Around advices are not observers and
    /// do nothing here.
    pub(crate) fn observe(
        &self,
        rule_set: &RuleSetHandle,
        member: &str,
        subject: &Object,
        args: &Args,
    ) -> Result<()> {
        match &self.callback {
            Callback::Observe(f) => f(rule_set, member, subject, args),
            Callback::Around(_) => Ok(()),
        }
    }

    /// Runs an around callback. Observers fall straight through to `next`.
    pub(crate) fn surround(
        &self,
        rule_set: &RuleSetHandle,
        member: &str,
        next: Next<'_>,
        subject: &Object,
        args: &Args,
    ) -> Result<Value> {
        match &self.callback {
            Callback::Around(f) => f(rule_set, member, next, subject, args),
            Callback::Observe(_) => next.call(subject, args),
        }
    }
}

impl fmt::Debug for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advice")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("target", &self.target)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}
