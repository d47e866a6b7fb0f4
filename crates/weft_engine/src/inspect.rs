//! What is woven where.

use weft_model::{Callable, Class, Member};

use crate::weave::Weave;

/// A woven slot on a class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WovenMember {
    /// The member name.
    pub name: String,
    /// True if the class only inherits the member.
    pub inherited: bool,
    /// Claimant pointcut names, in claim order.
    pub claimants: Vec<String>,
}

/// Returns true if the member's callable (or setter) is a weave.
#[must_use]
pub fn is_woven(member: &Member) -> bool {
    member
        .weavable()
        .and_then(Callable::downcast::<Weave>)
        .is_some()
}

/// Woven slots `class` holds itself, in name order.
#[must_use]
pub fn woven_members(class: &Class) -> Vec<WovenMember> {
    class
        .own_member_names()
        .into_iter()
        .filter_map(|name| {
            let member = class.own_member(&name)?;
            let weave = member.weavable().and_then(Callable::downcast::<Weave>)?;
            Some(WovenMember {
                inherited: weave.is_inherited(),
                claimants: weave.claimants().iter().map(|p| p.display_name()).collect(),
                name,
            })
        })
        .collect()
}
