//! Integration tests for weaving inherited members
//!
//! A pointcut on a subclass that inherits a member installs its own weave on
//! the subclass. Calls through that weave also run the advices of woven
//! ancestors, farthest ancestor first.

use std::sync::Arc;

use weft_engine::{Locator, Pointcut, TargetCategory, is_woven, reset_member, woven_members};
use weft_foundation::Value;
use weft_model::{Args, Class, Object, Scope};

use crate::support::{Journal, before, widget};

struct Family {
    journal: Journal,
    base: Arc<Class>,
    child: Arc<Class>,
    grandchild: Arc<Class>,
    locator: Locator,
}

fn family() -> Family {
    let journal = Journal::default();
    let base = widget(&journal);
    let child = Class::builder("Child").extends(&base).build();
    let grandchild = Class::builder("Grandchild").extends(&child).build();
    let locator = Locator::new(
        Scope::new()
            .with(&base)
            .with(&child)
            .with(&grandchild),
    );
    Family {
        journal,
        base,
        child,
        grandchild,
        locator,
    }
}

fn tag(f: &Family, label: &str, specifier: &str) -> Arc<Pointcut> {
    let p = Pointcut::construct(&f.locator, specifier, TargetCategory::All).unwrap();
    p.add_advice(before(&f.journal, label, &p));
    p
}

#[test]
fn subclass_weave_pulls_in_ancestor_claimants() {
    let f = family();
    let outer = tag(&f, "base", "Widget.f");
    tag(&f, "child", "Child.f");

    Object::new(&f.child).call("f", &Args::new()).unwrap();
    assert_eq!(f.journal.take(), vec!["base", "child", "f"]);

    Object::new(&f.base).call("f", &Args::new()).unwrap();
    assert_eq!(f.journal.take(), vec!["base", "f"]);

    let base_weave = woven_members(&f.base);
    assert_eq!(base_weave.len(), 1);
    assert_eq!(base_weave[0].claimants, vec![outer.display_name()]);
    assert!(woven_members(&f.child)[0].inherited);
}

#[test]
fn original_runs_once_under_nested_weaves() {
    let f = family();
    tag(&f, "base", "Widget.f");
    tag(&f, "child", "Child.f");
    let out = Object::new(&f.grandchild)
        .call("f", &Args::new().with(8))
        .unwrap();
    assert_eq!(out, Value::Int(8));
    assert_eq!(f.journal.take(), vec!["base", "child", "f"]);
}

#[test]
fn chain_of_inherited_weaves() {
    let f = family();
    tag(&f, "child", "Child.f");
    tag(&f, "grandchild", "Grandchild.f");

    Object::new(&f.grandchild).call("f", &Args::new()).unwrap();
    assert_eq!(f.journal.take(), vec!["child", "grandchild", "f"]);
}

#[test]
fn ancestor_weaves_added_later_are_seen() {
    let f = family();
    tag(&f, "child", "Child.f");
    let obj = Object::new(&f.child);
    obj.call("f", &Args::new()).unwrap();
    assert_eq!(f.journal.take(), vec!["child", "f"]);

    tag(&f, "base", "Widget.f");
    obj.call("f", &Args::new()).unwrap();
    assert_eq!(f.journal.take(), vec!["base", "child", "f"]);
}

#[test]
fn unwoven_override_stops_the_walk() {
    let journal = Journal::default();
    let base = widget(&journal);
    let mid_log = journal.clone();
    let mid = Class::builder("Mid")
        .extends(&base)
        .method("f", move |_, _| {
            mid_log.push("mid");
            Ok(Value::Nil)
        })
        .build();
    let leaf = Class::builder("Leaf").extends(&mid).build();
    let locator = Locator::new(Scope::new().with(&base).with(&mid).with(&leaf));

    let p = Pointcut::construct(&locator, "Widget.f", TargetCategory::All).unwrap();
    p.add_advice(before(&journal, "base", &p));
    let q = Pointcut::construct(&locator, "Leaf.f", TargetCategory::All).unwrap();
    q.add_advice(before(&journal, "leaf", &q));

    Object::new(&leaf).call("f", &Args::new()).unwrap();
    assert_eq!(journal.take(), vec!["leaf", "mid"]);
}

#[test]
fn resetting_a_subclass_weave_restores_inheritance() {
    let f = family();
    tag(&f, "base", "Widget.f");
    tag(&f, "child", "Child.f");
    assert!(f.child.has_own("f"));

    assert!(reset_member(&f.child, "f"));
    assert!(!f.child.has_own("f"));
    assert!(is_woven(&f.child.lookup("f").unwrap()));

    Object::new(&f.child).call("f", &Args::new()).unwrap();
    assert_eq!(f.journal.take(), vec!["base", "f"]);
}

#[test]
fn inherited_attributes_become_subclass_properties() {
    let journal = Journal::default();
    let base = Class::builder("Vehicle").attribute("speed", 1).build();
    let car = Class::builder("Car").extends(&base).build();
    let locator = Locator::new(Scope::new().with(&base).with(&car));
    let p = Pointcut::construct(&locator, "Car.speed", TargetCategory::All).unwrap();
    p.add_advice(before(&journal, "set", &p));

    let c = Object::new(&car);
    assert_eq!(c.get("speed").unwrap(), Value::Int(1));
    c.set("speed", 2).unwrap();
    assert_eq!(c.get("speed").unwrap(), Value::Int(2));
    assert_eq!(journal.take(), vec!["set"]);

    let v = Object::new(&base);
    v.set("speed", 3).unwrap();
    assert!(journal.take().is_empty());

    assert!(reset_member(&car, "speed"));
    assert!(!car.has_own("speed"));
}
