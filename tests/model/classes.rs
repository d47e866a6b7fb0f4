//! Integration tests for classes and member tables

use weft_foundation::Value;
use weft_model::{Callable, Class, Member, MemberCategory, Property, Scope, generation};

#[test]
fn builder_registers_every_member_kind() {
    let class = Class::builder("Car")
        .method("drive", |_, _| Ok(Value::Nil))
        .attribute("speed", 0)
        .property(
            "label",
            Property::new(Callable::native("label", |_, _| Ok(Value::from("car")))),
        )
        .build();

    assert_eq!(class.name(), "Car");
    assert_eq!(class.own_member_names(), vec!["drive", "label", "speed"]);
    assert_eq!(
        class.lookup("drive").map(|m| m.category()),
        Some(MemberCategory::Method)
    );
    assert_eq!(
        class.lookup("label").map(|m| m.category()),
        Some(MemberCategory::Property)
    );
}

#[test]
fn subclass_slots_shadow_ancestors() {
    let base = Class::builder("Base")
        .method("who", |_, _| Ok(Value::from("base")))
        .build();
    let child = Class::builder("Child")
        .extends(&base)
        .method("who", |_, _| Ok(Value::from("child")))
        .build();

    assert!(child.has_own("who"));
    let own = child.own_member("who").unwrap();
    let (owner, inherited) = child.lookup_inherited("who").unwrap();
    assert_eq!(owner.id(), base.id());
    assert!(!Callable::ptr_eq(
        own.as_method().unwrap(),
        inherited.as_method().unwrap()
    ));
}

#[test]
fn removing_a_slot_exposes_the_inherited_member() {
    let base = Class::builder("Base").attribute("wheels", 4).build();
    let child = Class::builder("Child").extends(&base).attribute("wheels", 3).build();

    assert!(matches!(child.lookup("wheels"), Some(Member::Attribute(Value::Int(3)))));
    let generation_before = generation::current();
    child.remove_member("wheels");
    assert!(generation::current() > generation_before);
    assert!(matches!(child.lookup("wheels"), Some(Member::Attribute(Value::Int(4)))));
}

#[test]
fn scope_resolves_names_and_aliases() {
    let car = Class::builder("Car").build();
    let scope = Scope::new().with(&car).with_alias("garage.Car", &car);
    assert_eq!(scope.get("garage.Car").map(|c| c.id()), Some(car.id()));
    assert!(!scope.is_empty());
}
