//! Pointcuts.
//!
//! A [`Pointcut`] is a set of joinpoints plus three ordered advice lists and
//! its enable/disable state. Constructing one through a [`Locator`] weaves
//! every located joinpoint immediately; advices added later take effect on the
//! next call because weaves read the lists at call time.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use weft_foundation::Result;
use weft_model::{Callable, Class, ClassId, Member, MemberCategory, Property};

use crate::advice::{Advice, AdviceKind, RuleSetHandle};
use crate::locator::{LocatedMember, Locator, Specifier, TargetCategory};
use crate::reset::original_of;
use crate::weave::Weave;

static NEXT_POINTCUT_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identity of a pointcut.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PointcutId(u64);

impl fmt::Display for PointcutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A member-table slot a pointcut has claimed.
#[derive(Clone, Debug)]
pub struct Joinpoint {
    /// The class whose slot holds the weave.
    pub owner: Arc<Class>,
    /// The member name.
    pub name: String,
    /// The member category at weave time.
    pub category: MemberCategory,
}

impl fmt::Display for Joinpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.owner.name(), self.name)
    }
}

/// Snapshot of the advices that currently run.
#[derive(Clone, Debug, Default)]
pub struct ActiveAdvices {
    /// Before advices, in registration order.
    pub before: Vec<Arc<Advice>>,
    /// After advices, in registration order.
    pub after: Vec<Arc<Advice>>,
    /// Around advices, in registration order (the last one is outermost).
    pub around: Vec<Arc<Advice>>,
}

impl ActiveAdvices {
    /// True if no advice would run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty() && self.around.is_empty()
    }

    /// Total number of advices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.before.len() + self.after.len() + self.around.len()
    }
}

#[derive(Default)]
struct State {
    enabled: bool,
    before: Vec<Arc<Advice>>,
    after: Vec<Arc<Advice>>,
    around: Vec<Arc<Advice>>,
    disabled: HashSet<String>,
}

impl State {
    fn list_mut(&mut self, kind: AdviceKind) -> &mut Vec<Arc<Advice>> {
        match kind {
            AdviceKind::Before => &mut self.before,
            AdviceKind::After => &mut self.after,
            AdviceKind::Around => &mut self.around,
        }
    }

    fn active(&self, list: &[Arc<Advice>]) -> Vec<Arc<Advice>> {
        list.iter()
            .filter(|a| !self.disabled.contains(a.name()))
            .cloned()
            .collect()
    }
}

// =============================================================================
// Pointcut
// =============================================================================

/// A named or anonymous weaving unit.
pub struct Pointcut {
    id: PointcutId,
    category: TargetCategory,
    name: RwLock<Option<String>>,
    rule_set: RwLock<RuleSetHandle>,
    joinpoints: RwLock<Vec<Joinpoint>>,
    state: RwLock<State>,
}

impl Pointcut {
    /// Creates an enabled pointcut with no joinpoints.
    #[must_use]
    pub fn new(category: TargetCategory) -> Arc<Self> {
        Arc::new(Self {
            id: PointcutId(NEXT_POINTCUT_ID.fetch_add(1, Ordering::Relaxed)),
            category,
            name: RwLock::new(None),
            rule_set: RwLock::new(RuleSetHandle::anonymous()),
            joinpoints: RwLock::new(Vec::new()),
            state: RwLock::new(State {
                enabled: true,
                ..State::default()
            }),
        })
    }

    /// Resolves `specifier` and weaves every located joinpoint.
    pub fn construct(
        locator: &Locator,
        specifier: impl Into<Specifier>,
        category: TargetCategory,
    ) -> Result<Arc<Self>> {
        let specifier = specifier.into();
        let located = locator.locate(&specifier, category)?;
        let pointcut = Self::new(category);
        for member in &located {
            pointcut.weave_member(member);
        }
        tracing::debug!(
            pointcut = %pointcut.id,
            %specifier,
            joinpoints = pointcut.joinpoints.read().len(),
            "pointcut constructed"
        );
        Ok(pointcut)
    }

    /// Returns the pointcut identity.
    #[must_use]
    pub fn id(&self) -> PointcutId {
        self.id
    }

    /// Returns the target category.
    #[must_use]
    pub fn category(&self) -> TargetCategory {
        self.category
    }

    /// Returns the name given by a rule set, if any.
    #[must_use]
    pub fn name(&self) -> Option<String> {
        self.name.read().clone()
    }

    /// The name, or `<anonymous #id>`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name()
            .unwrap_or_else(|| format!("<anonymous {}>", self.id))
    }

    /// Names the pointcut.
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.write() = Some(name.into());
    }

    /// Returns the owning rule set's handle (anonymous when unbound).
    #[must_use]
    pub fn rule_set(&self) -> RuleSetHandle {
        self.rule_set.read().clone()
    }

    /// Binds the pointcut to a rule set.
    pub fn bind_rule_set(&self, handle: RuleSetHandle) {
        *self.rule_set.write() = handle;
    }

    /// Returns the claimed joinpoints.
    #[must_use]
    pub fn joinpoints(&self) -> Vec<Joinpoint> {
        self.joinpoints.read().clone()
    }

    /// Appends `advice` to the list for its kind unless it is already there.
    ///
    /// Returns false if the advice was already present.
    pub fn add_advice(&self, advice: Arc<Advice>) -> bool {
        let mut state = self.state.write();
        let list = state.list_mut(advice.kind());
        if list.iter().any(|a| Arc::ptr_eq(a, &advice)) {
            return false;
        }
        list.push(advice);
        true
    }

    /// Turns the pointcut on. Individually disabled advices stay disabled.
    pub fn enable(&self) {
        self.state.write().enabled = true;
        tracing::debug!(pointcut = %self.display_name(), "pointcut enabled");
    }

    /// Turns the pointcut off: no advice runs until [`Pointcut::enable`].
    pub fn disable(&self) {
        self.state.write().enabled = false;
        tracing::debug!(pointcut = %self.display_name(), "pointcut disabled");
    }

    /// Returns true if the pointcut is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    /// Disables every advice named `name`. Unknown names are accepted.
    pub fn disable_advice(&self, name: &str) {
        self.state.write().disabled.insert(name.to_string());
    }

    /// Lifts an individual disable.
    pub fn enable_advice(&self, name: &str) {
        self.state.write().disabled.remove(name);
    }

    /// The advices that run right now.
    #[must_use]
    pub fn advices(&self) -> ActiveAdvices {
        let state = self.state.read();
        if !state.enabled {
            return ActiveAdvices::default();
        }
        ActiveAdvices {
            before: state.active(&state.before),
            after: state.active(&state.after),
            around: state.active(&state.around),
        }
    }

    /// Wraps `callable`, or claims it if it already is a weave.
    ///
    /// Claiming an existing weave returns it unchanged, so wrapping twice
    /// never nests.
    #[must_use]
    pub fn wrap(self: &Arc<Self>, callable: &Callable, name: &str) -> Callable {
        self.wrap_in(callable, name, None, false)
    }

    fn wrap_in(
        self: &Arc<Self>,
        callable: &Callable,
        name: &str,
        owner: Option<ClassId>,
        inherited: bool,
    ) -> Callable {
        if let Some(weave) = callable.downcast::<Weave>() {
            if weave.claim(self) {
                tracing::debug!(pointcut = %self.display_name(), member = name, "weave claimed");
            }
            return callable.clone();
        }
        let weave = Arc::new(Weave::new(name, callable.clone(), owner, inherited));
        weave.claim(self);
        tracing::debug!(pointcut = %self.display_name(), member = name, inherited, "weave installed");
        Callable::from_invoke(name, weave)
    }

    /// Weaves one located member into its owner's slot.
    pub(crate) fn weave_member(self: &Arc<Self>, located: &LocatedMember) {
        let owner = &located.owner;
        let name = located.name.as_str();
        let inherited = located.inherited;
        let base = |c: &Callable| if inherited { original_of(c) } else { c.clone() };

        let replacement = match &located.member {
            Member::Method(current) => {
                let woven = self.wrap_in(&base(current), name, Some(owner.id()), inherited);
                (!Callable::ptr_eq(&woven, current)).then_some(Member::Method(woven))
            }
            Member::Attribute(default) => {
                let property = Property::backed(name, default.clone());
                let Some(setter) = property.setter.clone() else {
                    return;
                };
                let woven = self.wrap_in(&setter, name, Some(owner.id()), inherited);
                Some(Member::Property(property.replace_setter(woven)))
            }
            Member::Property(property) => {
                let Some(current) = &property.setter else {
                    tracing::debug!(owner = owner.name(), member = name, "skipping read-only property");
                    return;
                };
                let woven = self.wrap_in(&base(current), name, Some(owner.id()), inherited);
                (!Callable::ptr_eq(&woven, current))
                    .then(|| Member::Property(property.replace_setter(woven)))
            }
        };

        if let Some(member) = replacement {
            owner.set_member(name, member);
        }
        self.record(Joinpoint {
            owner: Arc::clone(owner),
            name: name.to_string(),
            category: located.member.category(),
        });
    }

    fn record(&self, joinpoint: Joinpoint) {
        let mut joinpoints = self.joinpoints.write();
        let known = joinpoints
            .iter()
            .any(|j| j.owner.id() == joinpoint.owner.id() && j.name == joinpoint.name);
        if !known {
            joinpoints.push(joinpoint);
        }
    }

    /// Removes this pointcut from every weave it claimed. The weaves stay
    /// installed. Returns how many claims were released.
    pub fn detach(&self) -> usize {
        let joinpoints = std::mem::take(&mut *self.joinpoints.write());
        let mut released = 0;
        for joinpoint in &joinpoints {
            let weave = joinpoint
                .owner
                .own_member(&joinpoint.name)
                .and_then(|m| m.weavable().and_then(Callable::downcast::<Weave>));
            if weave.is_some_and(|w| w.release(self.id)) {
                released += 1;
            }
        }
        tracing::debug!(pointcut = %self.display_name(), released, "pointcut detached");
        released
    }
}

impl fmt::Debug for Pointcut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pointcut")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("category", &self.category)
            .field("enabled", &self.is_enabled())
            .field("joinpoints", &self.joinpoints.read().len())
            .finish_non_exhaustive()
    }
}
