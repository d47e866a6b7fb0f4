//! Integration tests for rule-set registration

use std::sync::Arc;

use weft_engine::{
    Advice, Locator, Pointcut, RuleSet, RuleSetDecl, Specifier, TargetCategory, woven_members,
};
use weft_foundation::Value;
use weft_model::{Args, Object, Scope};

use crate::support::{Journal, after, before, widget};

fn setup() -> (Journal, Arc<weft_model::Class>, Locator) {
    let journal = Journal::default();
    let class = widget(&journal);
    let locator = Locator::new(Scope::new().with(&class));
    (journal, class, locator)
}

#[test]
fn every_reference_form_binds_to_the_same_named_pointcut() {
    let (journal, class, locator) = setup();
    let calls = Pointcut::construct(&locator, "Widget.f", TargetCategory::All).unwrap();
    let decl = RuleSetDecl::new("Trace")
        .advice(before(&journal, "by_name", "calls"))
        .pointcut("calls", Arc::clone(&calls))
        .advice(after(&journal, "by_value", &calls));

    let rules = RuleSet::register(decl, &locator).unwrap();
    assert_eq!(rules.pointcuts().len(), 1);
    assert!(Arc::ptr_eq(rules.pointcut("calls").unwrap(), &calls));

    Object::new(&class).call("f", &Args::new()).unwrap();
    assert_eq!(journal.take(), vec!["by_name", "f", "by_value"]);
}

#[test]
fn specifier_targets_share_the_weave() {
    let (journal, class, locator) = setup();
    let decl = RuleSetDecl::new("Trace")
        .advice(before(&journal, "one", "Widget.f"))
        .advice(before(&journal, "two", Specifier::from("Widget.*")));
    let rules = RuleSet::register(decl, &locator).unwrap();

    assert_eq!(rules.pointcuts().len(), 2);
    let woven = woven_members(&class);
    assert_eq!(woven.len(), 1);
    assert_eq!(woven[0].claimants.len(), 2);

    Object::new(&class).call("f", &Args::new()).unwrap();
    assert_eq!(journal.take(), vec!["one", "two", "f"]);
}

#[test]
fn advices_read_rule_set_attributes() {
    let (journal, class, locator) = setup();
    let seen = journal.clone();
    let decl = RuleSetDecl::new("Limits")
        .attribute("limit", 3)
        .advice(Advice::before("check", "Widget.f", move |rules, member, _, _| {
            let limit = rules.attribute("limit").cloned().unwrap_or_default();
            seen.push(format!("{}:{member}:{limit}", rules.name().unwrap_or("?")));
            Ok(())
        }));
    RuleSet::register(decl, &locator).unwrap();

    Object::new(&class).call("f", &Args::new()).unwrap();
    assert_eq!(journal.take(), vec!["Limits:f:3", "f"]);
}

#[test]
fn bulk_disable_and_enable() {
    let (journal, class, locator) = setup();
    let decl = RuleSetDecl::new("Trace")
        .advice(before(&journal, "b", "Widget.f"))
        .advice(after(&journal, "a", "Widget.f"));
    let rules = RuleSet::register(decl, &locator).unwrap();
    let obj = Object::new(&class);

    rules.disable_all();
    obj.call("f", &Args::new()).unwrap();
    assert_eq!(journal.take(), vec!["f"]);

    rules.enable_all();
    rules.disable_advice("a");
    obj.call("f", &Args::new()).unwrap();
    assert_eq!(journal.take(), vec!["b", "f"]);

    rules.enable_advice("a");
    obj.call("f", &Args::new()).unwrap();
    assert_eq!(journal.take(), vec!["b", "f", "a"]);
}

#[test]
fn detach_all_leaves_the_weave_in_place() {
    let (journal, class, locator) = setup();
    let decl = RuleSetDecl::new("Trace").advice(before(&journal, "b", "Widget.f"));
    let rules = RuleSet::register(decl, &locator).unwrap();

    assert_eq!(rules.detach_all(), 1);
    let woven = woven_members(&class);
    assert_eq!(woven.len(), 1);
    assert!(woven[0].claimants.is_empty());

    let out = Object::new(&class).call("f", &Args::new().with(2)).unwrap();
    assert_eq!(out, Value::Int(2));
    assert_eq!(journal.take(), vec!["f"]);
}

#[test]
fn two_rule_sets_compose_on_one_member() {
    let (journal, class, locator) = setup();
    RuleSet::register(
        RuleSetDecl::new("First").advice(before(&journal, "first", "Widget.f")),
        &locator,
    )
    .unwrap();
    let second = RuleSet::register(
        RuleSetDecl::new("Second").advice(before(&journal, "second", "Widget.f")),
        &locator,
    )
    .unwrap();

    let obj = Object::new(&class);
    obj.call("f", &Args::new()).unwrap();
    assert_eq!(journal.take(), vec!["first", "second", "f"]);

    second.disable_all();
    obj.call("f", &Args::new()).unwrap();
    assert_eq!(journal.take(), vec!["first", "f"]);
}

#[test]
fn unresolvable_targets_fail_registration() {
    let (journal, _, locator) = setup();
    let decl = RuleSetDecl::new("Broken").advice(before(&journal, "b", "Gadget.f"));
    let err = RuleSet::register(decl, &locator).unwrap_err();
    assert!(err.is_resolution());
    let context = err.context.unwrap();
    assert_eq!(context.rule_set.as_deref(), Some("Broken"));
    assert_eq!(context.stack, vec!["b".to_string()]);
}
