//! Integration tests for instances

use std::sync::Arc;
use std::thread;

use weft_foundation::{ErrorKind, Value};
use weft_model::{Args, Class, Member, Object};

fn account() -> Arc<Class> {
    Class::builder("Account")
        .attribute("balance", 0)
        .method("deposit", |this, args| {
            let amount = args.int(0)?;
            let next = this.get("balance")?.as_int().unwrap_or(0) + amount;
            this.set("balance", next)?;
            Ok(Value::Int(next))
        })
        .build()
}

#[test]
fn methods_mutate_instance_state() {
    let a = Object::new(&account());
    a.call("deposit", &Args::new().with(10)).unwrap();
    a.call("deposit", &Args::new().with(5)).unwrap();
    assert_eq!(a.get("balance").unwrap(), Value::Int(15));
}

#[test]
fn argument_errors_surface_from_bodies() {
    let a = Object::new(&account());
    let err = a.call("deposit", &Args::new()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ArityMismatch { .. }));
    let err = a.call("deposit", &Args::new().with("ten")).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::TypeMismatch { .. }));
}

#[test]
fn replaced_slots_are_seen_by_existing_instances() {
    let class = account();
    let a = Object::new(&class);
    class.set_member(
        "deposit",
        Member::Method(weft_model::Callable::native("deposit", |_, _| {
            Ok(Value::from("closed"))
        })),
    );
    assert_eq!(
        a.call("deposit", &Args::new().with(1)).unwrap(),
        Value::from("closed")
    );
}

#[test]
fn instances_are_shareable_across_threads() {
    let a = Object::new(&account());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let a = a.clone();
            thread::spawn(move || a.set_field("touched", Value::Bool(true)))
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(a.field("touched"), Some(Value::Bool(true)));
}
