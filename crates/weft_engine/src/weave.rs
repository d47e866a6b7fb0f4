//! The wrapper installed into a member-table slot.
//!
//! A joinpoint gets at most one [`Weave`]. Every pointcut that claims the
//! joinpoint is added to that weave's claimant list instead of wrapping again,
//! so the wrapper chain is always one level deep over the original callable.
//!
//! Call order for one invocation:
//!
//! 1. effective claimants are determined for the subject's class
//! 2. every `before` advice runs with the caller's arguments
//! 3. the innermost function calls the original, then every `after` advice
//! 4. `around` advices wrap the innermost function, last attached outermost
//!
//! A weave installed on a class that only inherits the member also pulls in
//! the claimants of weaves further up the ancestor list. That resolution is
//! cached per subject class and discarded whenever the member-table
//! generation moves.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use weft_foundation::{Result, Value};
use weft_model::{Args, Callable, Class, ClassId, Invoke, Object, generation};

use crate::advice::{Next, RuleSetHandle};
use crate::pointcut::{ActiveAdvices, Pointcut, PointcutId};

type Claimants = Arc<[Arc<Pointcut>]>;
type Chain<'a> = Box<dyn Fn(&Object, &Args) -> Result<Value> + 'a>;

/// Wrapper around an original callable, shared by all claiming pointcuts.
pub struct Weave {
    member: String,
    original: Callable,
    owner: Option<ClassId>,
    inherited: bool,
    claimants: RwLock<Vec<Arc<Pointcut>>>,
    resolved: RwLock<HashMap<ClassId, (u64, Claimants)>>,
}

impl Weave {
    /// Creates a weave over `original`.
    ///
    /// `owner` is the class whose slot the weave occupies; `inherited` records
    /// that the owner did not define the member itself.
    #[must_use]
    pub fn new(member: &str, original: Callable, owner: Option<ClassId>, inherited: bool) -> Self {
        Self {
            member: member.to_string(),
            original,
            owner,
            inherited,
            claimants: RwLock::new(Vec::new()),
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// The member name.
    #[must_use]
    pub fn member(&self) -> &str {
        &self.member
    }

    /// The wrapped callable.
    #[must_use]
    pub fn original(&self) -> &Callable {
        &self.original
    }

    /// The class whose slot this weave occupies, if installed through a locator.
    #[must_use]
    pub fn owner(&self) -> Option<ClassId> {
        self.owner
    }

    /// True if installed on a class that inherits the member.
    #[must_use]
    pub fn is_inherited(&self) -> bool {
        self.inherited
    }

    /// Adds `pointcut` to the claimants. Returns false if it already was one.
    pub fn claim(&self, pointcut: &Arc<Pointcut>) -> bool {
        let mut claimants = self.claimants.write();
        if claimants.iter().any(|p| p.id() == pointcut.id()) {
            return false;
        }
        claimants.push(Arc::clone(pointcut));
        drop(claimants);
        generation::advance();
        true
    }

    /// Removes the pointcut with `id` from the claimants.
    pub fn release(&self, id: PointcutId) -> bool {
        let mut claimants = self.claimants.write();
        let before = claimants.len();
        claimants.retain(|p| p.id() != id);
        let removed = claimants.len() != before;
        drop(claimants);
        if removed {
            generation::advance();
        }
        removed
    }

    /// This weave's own claimants, in claim order.
    #[must_use]
    pub fn claimants(&self) -> Vec<Arc<Pointcut>> {
        self.claimants.read().clone()
    }

    /// Claimants whose advices run for an instance of `class`.
    #[must_use]
    pub fn effective_claimants(&self, class: &Class) -> Claimants {
        let Some(owner) = self.owner.filter(|_| self.inherited) else {
            return self.claimants.read().as_slice().into();
        };

        let generation = generation::current();
        if let Some((cached_at, claimants)) = self.resolved.read().get(&class.id()) {
            if *cached_at == generation {
                return Arc::clone(claimants);
            }
        }

        let mut layers = vec![self.claimants()];
        for ancestor in class.ancestors_after(owner) {
            let Some(member) = ancestor.own_member(&self.member) else {
                continue;
            };
            match member.weavable().and_then(Callable::downcast::<Weave>) {
                Some(weave) => {
                    layers.push(weave.claimants());
                    if !weave.is_inherited() {
                        break;
                    }
                }
                None => break,
            }
        }

        let mut seen = HashSet::new();
        let claimants: Claimants = layers
            .into_iter()
            .rev()
            .flatten()
            .filter(|p| seen.insert(p.id()))
            .collect();
        self.resolved
            .write()
            .insert(class.id(), (generation, Arc::clone(&claimants)));
        claimants
    }
}

impl Invoke for Weave {
    fn invoke(&self, subject: &Object, args: &Args) -> Result<Value> {
        let claimants = self.effective_claimants(subject.class());
        let plans: Vec<(RuleSetHandle, ActiveAdvices)> = claimants
            .iter()
            .map(|p| (p.rule_set(), p.advices()))
            .collect();
        tracing::trace!(
            member = %self.member,
            claimants = claimants.len(),
            "woven call"
        );

        for (rule_set, advices) in &plans {
            for advice in &advices.before {
                advice.observe(rule_set, &self.member, subject, args)?;
            }
        }

        let innermost = |subject: &Object, args: &Args| -> Result<Value> {
            let out = self.original.call(subject, args)?;
            for (rule_set, advices) in &plans {
                for advice in &advices.after {
                    advice.observe(rule_set, &self.member, subject, args)?;
                }
            }
            Ok(out)
        };

        let mut chain: Chain<'_> = Box::new(innermost);
        for (rule_set, advices) in &plans {
            for advice in &advices.around {
                let inner = chain;
                chain = Box::new(move |subject: &Object, args: &Args| {
                    advice.surround(rule_set, &self.member, Next::new(&*inner), subject, args)
                });
            }
        }
        chain(subject, args)
    }

    fn wrapped(&self) -> Option<&Callable> {
        Some(&self.original)
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn std::any::Any + Send + Sync> {
        self
    }
}

impl fmt::Debug for Weave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Weave")
            .field("member", &self.member)
            .field("inherited", &self.inherited)
            .field("claimants", &self.claimants.read().len())
            .finish_non_exhaustive()
    }
}
