//! Call and property-change logging on a `Car`.

use std::sync::Arc;

use parking_lot::Mutex;

use weft_engine::{Advice, Locator, RuleSet, RuleSetDecl, TargetCategory, reset};
use weft_foundation::Value;
use weft_model::{Args, Class, Object, Scope};

fn car() -> Arc<Class> {
    Class::builder("Car")
        .attribute("running", false)
        .attribute("speed", 0)
        .method("start", |this, _| this.set("running", true).map(|()| Value::Nil))
        .method("stop", |this, _| this.set("running", false).map(|()| Value::Nil))
        .method("accelerate", |this, args| {
            let delta = args.int_param(0, "delta", 1)?;
            if this.get("running")?.is_truthy() {
                let speed = this.get("speed")?.as_int().unwrap_or(0);
                this.set("speed", speed + delta)?;
            }
            Ok(Value::Nil)
        })
        .method("brake", |this, _| {
            let speed = this.get("speed")?.as_int().unwrap_or(0);
            if speed > 0 {
                this.set("speed", speed - 1)?;
            }
            Ok(Value::Nil)
        })
        .build()
}

type Lines = Arc<Mutex<Vec<String>>>;

fn logger(lines: &Lines) -> RuleSetDecl {
    let calls = Arc::clone(lines);
    let changes = Arc::clone(lines);
    RuleSetDecl::new("Logger")
        .advice(
            Advice::before("log_method_calls", "Car.*", move |_, name, _, args| {
                let positional: Vec<String> =
                    args.positional().iter().map(ToString::to_string).collect();
                let named: Vec<String> = args
                    .named()
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect();
                calls.lock().push(format!(
                    "call {name} ({}) {{{}}}",
                    positional.join(", "),
                    named.join(", ")
                ));
                Ok(())
            })
            .with_category(TargetCategory::Methods),
        )
        .advice(Advice::before(
            "log_speed_change",
            "Car.speed",
            move |_, name, this, args| {
                let old = this.get(name)?;
                let new = args.last().cloned().unwrap_or_default();
                changes
                    .lock()
                    .push(format!("change {name} {old} -> {new}"));
                Ok(())
            },
        ))
}

fn drain(lines: &Lines) -> Vec<String> {
    std::mem::take(&mut *lines.lock())
}

#[test]
fn calls_and_speed_changes_are_logged() {
    let _ = tracing_subscriber::fmt::try_init();
    let class = car();
    let locator = Locator::new(Scope::new().with(&class));
    let lines = Lines::default();
    let rules = RuleSet::register(logger(&lines), &locator).unwrap();
    let car = Object::new(&class);

    car.call("accelerate", &Args::new().with(1)).unwrap();
    assert_eq!(drain(&lines), vec!["call accelerate (1) {}"]);

    car.call("start", &Args::new()).unwrap();
    assert_eq!(drain(&lines), vec!["call start () {}"]);

    car.call("accelerate", &Args::new().with_named("delta", 2))
        .unwrap();
    assert_eq!(
        drain(&lines),
        vec!["call accelerate () {delta=2}", "change speed 0 -> 2"]
    );

    while car.get("speed").unwrap().as_int().unwrap_or(0) < 10 {
        car.call("accelerate", &Args::new().with_named("delta", 2))
            .unwrap();
    }
    let changes: Vec<_> = drain(&lines)
        .into_iter()
        .filter(|l| l.starts_with("change"))
        .collect();
    assert_eq!(changes.last().map(String::as_str), Some("change speed 8 -> 10"));
    assert_eq!(changes.len(), 4);

    rules.disable_all();
    while car.get("speed").unwrap().as_int().unwrap_or(0) > 0 {
        car.call("brake", &Args::new()).unwrap();
    }
    assert!(drain(&lines).is_empty());

    rules.enable_all();
    car.call("stop", &Args::new()).unwrap();
    assert_eq!(drain(&lines), vec!["call stop () {}"]);
}

#[test]
fn running_is_not_logged_as_a_property_change() {
    let class = car();
    let locator = Locator::new(Scope::new().with(&class));
    let lines = Lines::default();
    RuleSet::register(logger(&lines), &locator).unwrap();

    Object::new(&class).call("start", &Args::new()).unwrap();
    assert_eq!(drain(&lines), vec!["call start () {}"]);
}

#[test]
fn reset_silences_the_logger() {
    let class = car();
    let locator = Locator::new(Scope::new().with(&class));
    let lines = Lines::default();
    RuleSet::register(logger(&lines), &locator).unwrap();

    assert_eq!(reset(&locator, "Car.*").unwrap(), 5);
    let car = Object::new(&class);
    car.call("start", &Args::new()).unwrap();
    car.set("speed", 3).unwrap();
    assert!(drain(&lines).is_empty());
    assert_eq!(car.get("speed").unwrap(), Value::Int(3));
}
