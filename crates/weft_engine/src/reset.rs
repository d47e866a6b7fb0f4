//! Recovering originals and restoring member tables.

use std::sync::Arc;

use weft_foundation::Result;
use weft_model::{Callable, Class, Member};

use crate::inspect::is_woven;
use crate::locator::{Locator, Specifier, TargetCategory};
use crate::weave::Weave;

/// Follows the wrapper chain down to the callable that is not a wrapper.
#[must_use]
pub fn original_of(callable: &Callable) -> Callable {
    let mut current = callable;
    while let Some(inner) = current.wrapped() {
        current = inner;
    }
    current.clone()
}

/// The member a woven slot should go back to.
///
/// `None` means the slot should be removed so the inherited member shows
/// through again. Members that are not woven are returned unchanged.
#[must_use]
pub fn original_member(member: &Member) -> Option<Member> {
    let Some(woven) = member.weavable().and_then(Callable::downcast::<Weave>) else {
        return Some(member.clone());
    };
    if woven.is_inherited() {
        return None;
    }
    match member {
        Member::Property(property) => Some(match &property.backing {
            Some(backing) => Member::Attribute(backing.default.clone()),
            None => Member::Property(property.replace_setter(original_of(woven.original()))),
        }),
        _ => Some(Member::Method(original_of(woven.original()))),
    }
}

/// Restores `class`'s own slot for `name`. Returns false if it was not woven.
pub fn reset_member(class: &Arc<Class>, name: &str) -> bool {
    let Some(current) = class.own_member(name) else {
        return false;
    };
    if !is_woven(&current) {
        return false;
    }
    match original_member(&current) {
        Some(member) => {
            class.set_member(name, member);
        }
        None => {
            class.remove_member(name);
        }
    }
    tracing::debug!(class = class.name(), member = name, "member reset");
    true
}

/// Restores every woven member `specifier` locates. Returns how many slots changed.
pub fn reset(locator: &Locator, specifier: impl Into<Specifier>) -> Result<usize> {
    let located = locator.locate(&specifier.into(), TargetCategory::All)?;
    Ok(located
        .iter()
        .filter(|m| !m.inherited && reset_member(&m.owner, &m.name))
        .count())
}
