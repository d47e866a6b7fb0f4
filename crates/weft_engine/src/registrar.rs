//! Rule-set registration.
//!
//! A [`RuleSetDecl`] collects attributes, named pointcuts and advices. Member
//! order does not matter: [`RuleSet::register`] indexes every member first and
//! only then binds each advice to the pointcut its target resolves to.

use std::collections::BTreeMap;
use std::sync::Arc;

use weft_foundation::{Error, ErrorContext, Result, Value};

use crate::advice::{Advice, PointcutRef, RuleSetHandle};
use crate::locator::{Locator, Specifier};
use crate::pointcut::Pointcut;

// =============================================================================
// Declaration
// =============================================================================

#[derive(Clone, Debug)]
enum DeclMember {
    Attribute,
    Pointcut(Arc<Pointcut>),
    Advice(Arc<Advice>),
}

/// Declaration of a rule set, before registration.
#[derive(Clone, Debug)]
pub struct RuleSetDecl {
    name: String,
    attributes: BTreeMap<String, Value>,
    members: Vec<(String, DeclMember)>,
}

impl RuleSetDecl {
    /// Starts a declaration.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            members: Vec::new(),
        }
    }

    /// Adds an attribute advices can read through [`RuleSetHandle::attribute`].
    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        self.attributes.insert(name.clone(), value.into());
        self.members.push((name, DeclMember::Attribute));
        self
    }

    /// Adds a named pointcut.
    #[must_use]
    pub fn pointcut(mut self, name: impl Into<String>, pointcut: Arc<Pointcut>) -> Self {
        self.members
            .push((name.into(), DeclMember::Pointcut(pointcut)));
        self
    }

    /// Adds an advice, keyed by its own name.
    #[must_use]
    pub fn advice(mut self, advice: impl Into<Arc<Advice>>) -> Self {
        let advice = advice.into();
        self.members
            .push((advice.name().to_string(), DeclMember::Advice(advice)));
        self
    }

    /// Returns the rule-set name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

// =============================================================================
// RuleSet
// =============================================================================

/// A registered rule set.
#[derive(Debug)]
pub struct RuleSet {
    handle: RuleSetHandle,
    named: BTreeMap<String, Arc<Pointcut>>,
    pointcuts: Vec<Arc<Pointcut>>,
}

impl RuleSet {
    /// Binds every advice in `decl` to its pointcut, weaving as needed.
    ///
    /// # Errors
    ///
    /// Returns a resolution error if an advice names a member that is not a
    /// pointcut, or a specifier cannot be resolved. Weaves installed before
    /// the error stay installed.
    pub fn register(decl: RuleSetDecl, locator: &Locator) -> Result<Self> {
        let handle = RuleSetHandle::new(decl.name.clone(), decl.attributes.clone());
        let mut rule_set = Self {
            handle,
            named: BTreeMap::new(),
            pointcuts: Vec::new(),
        };

        for (name, member) in &decl.members {
            if let DeclMember::Pointcut(pointcut) = member {
                pointcut.set_name(name.as_str());
                pointcut.bind_rule_set(rule_set.handle.clone());
                rule_set.named.insert(name.clone(), Arc::clone(pointcut));
                rule_set.track(pointcut);
            }
        }

        for (_, member) in &decl.members {
            let DeclMember::Advice(advice) = member else {
                continue;
            };
            let pointcut = rule_set
                .resolve(&decl, advice, locator)
                .map_err(|err| {
                    err.with_context(
                        ErrorContext::new()
                            .with_rule_set(decl.name.as_str())
                            .with_frame(advice.name()),
                    )
                })?;
            pointcut.add_advice(Arc::clone(advice));
        }

        tracing::debug!(
            rule_set = %decl.name,
            pointcuts = rule_set.pointcuts.len(),
            "rule set registered"
        );
        Ok(rule_set)
    }

    fn resolve(
        &mut self,
        decl: &RuleSetDecl,
        advice: &Advice,
        locator: &Locator,
    ) -> Result<Arc<Pointcut>> {
        match advice.target() {
            PointcutRef::Pointcut(pointcut) => {
                if pointcut.rule_set().is_anonymous() {
                    pointcut.bind_rule_set(self.handle.clone());
                }
                self.track(pointcut);
                Ok(Arc::clone(pointcut))
            }
            PointcutRef::Name(name) => {
                if let Some(pointcut) = self.named.get(name) {
                    return Ok(Arc::clone(pointcut));
                }
                if decl.members.iter().any(|(n, _)| n == name) {
                    return Err(Error::resolution(
                        name.as_str(),
                        "rule-set member is not a pointcut",
                    ));
                }
                self.synthesize(advice, locator, Specifier::from(name.as_str()))
            }
            PointcutRef::Specifier(specifier) => {
                self.synthesize(advice, locator, specifier.clone())
            }
        }
    }

    fn synthesize(
        &mut self,
        advice: &Advice,
        locator: &Locator,
        specifier: Specifier,
    ) -> Result<Arc<Pointcut>> {
        let pointcut = Pointcut::construct(locator, specifier, advice.category())?;
        pointcut.bind_rule_set(self.handle.clone());
        self.track(&pointcut);
        Ok(pointcut)
    }

    fn track(&mut self, pointcut: &Arc<Pointcut>) {
        if !self.pointcuts.iter().any(|p| p.id() == pointcut.id()) {
            self.pointcuts.push(Arc::clone(pointcut));
        }
    }

    /// Returns the rule-set name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.handle.name().unwrap_or_default()
    }

    /// Returns the handle advices receive.
    #[must_use]
    pub fn handle(&self) -> &RuleSetHandle {
        &self.handle
    }

    /// Every pointcut this rule set created or referenced.
    #[must_use]
    pub fn pointcuts(&self) -> &[Arc<Pointcut>] {
        &self.pointcuts
    }

    /// A named pointcut.
    #[must_use]
    pub fn pointcut(&self, name: &str) -> Option<&Arc<Pointcut>> {
        self.named.get(name)
    }

    /// Enables every pointcut.
    pub fn enable_all(&self) {
        self.pointcuts.iter().for_each(|p| p.enable());
    }

    /// Disables every pointcut.
    pub fn disable_all(&self) {
        self.pointcuts.iter().for_each(|p| p.disable());
    }

    /// Disables advices named `name` on every pointcut.
    pub fn disable_advice(&self, name: &str) {
        self.pointcuts.iter().for_each(|p| p.disable_advice(name));
    }

    /// Lifts an individual disable on every pointcut.
    pub fn enable_advice(&self, name: &str) {
        self.pointcuts.iter().for_each(|p| p.enable_advice(name));
    }

    /// Detaches every pointcut from its weaves. Returns the number of released claims.
    pub fn detach_all(&self) -> usize {
        self.pointcuts.iter().map(|p| p.detach()).sum()
    }
}
