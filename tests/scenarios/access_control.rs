//! Access control enforced by an around advice on `Repository.read`.

use std::sync::Arc;

use weft_engine::{Advice, Locator, Pointcut, RuleSet, RuleSetDecl, TargetCategory};
use weft_foundation::{Result, Value};
use weft_model::{Args, Class, Object, Scope};

fn repository() -> Arc<Class> {
    Class::builder("Repository")
        .method("read", |_, args| {
            let page = args.require(0)?.get_key("page").and_then(Value::as_str).unwrap_or("");
            let content = match page {
                "index" => "Index Content",
                "page A" => "Page A Content",
                "page B" => "Page B Content",
                _ => "Not Found",
            };
            Ok(Value::from(content))
        })
        .build()
}

fn request(page: &str, user: Option<&str>) -> Args {
    let mut entries = vec![("page", Value::from(page))];
    if let Some(user) = user {
        entries.push(("user", Value::from(user)));
    }
    Args::new().with(Value::record(entries))
}

fn contains(list: Option<&Value>, item: &str) -> bool {
    list.and_then(Value::as_vec)
        .is_some_and(|v| v.contains(&Value::from(item)))
}

fn install(locator: &Locator) -> Result<RuleSet> {
    let read = Pointcut::construct(locator, "Repository.read", TargetCategory::All)?;
    let decl = RuleSetDecl::new("AccessControl")
        .attribute("protected_pages", vec!["page A"])
        .attribute("allowed_users", vec!["admin"])
        .pointcut("read", read)
        .advice(Advice::around(
            "check_read_permission",
            "read",
            |rules, _, next, this, args| {
                let req = args.require(0)?;
                let page = req.get_key("page").and_then(Value::as_str).unwrap_or("");
                let user = req.get_key("user").and_then(Value::as_str).unwrap_or("");
                if !contains(rules.attribute("protected_pages"), page)
                    || contains(rules.attribute("allowed_users"), user)
                {
                    next.call(this, args)
                } else {
                    Ok(Value::from(format!(
                        "You don't have permission to read \"{page}\""
                    )))
                }
            },
        ));
    RuleSet::register(decl, locator)
}

fn read(repo: &Object, page: &str, user: Option<&str>) -> String {
    repo.call("read", &request(page, user))
        .unwrap()
        .as_str()
        .unwrap_or_default()
        .to_string()
}

#[test]
fn protected_pages_are_denied_to_anonymous_readers() {
    let class = repository();
    let locator = Locator::new(Scope::new().with(&class));
    install(&locator).unwrap();
    let repo = Object::new(&class);

    assert_eq!(read(&repo, "index", None), "Index Content");
    let denied = read(&repo, "page A", None);
    assert!(denied.contains("page A"));
    assert!(denied.starts_with("You don't have permission"));
    assert_eq!(read(&repo, "page B", None), "Page B Content");
}

#[test]
fn admin_reads_protected_pages() {
    let class = repository();
    let locator = Locator::new(Scope::new().with(&class));
    install(&locator).unwrap();
    let repo = Object::new(&class);

    assert_eq!(read(&repo, "page A", Some("admin")), "Page A Content");
    assert!(read(&repo, "page A", Some("bob")).contains("page A"));
    assert_eq!(read(&repo, "index", Some("bob")), "Index Content");
}

#[test]
fn disabling_the_rule_set_lifts_the_check() {
    let class = repository();
    let locator = Locator::new(Scope::new().with(&class));
    let rules = install(&locator).unwrap();
    let repo = Object::new(&class);

    rules.disable_all();
    assert_eq!(read(&repo, "page A", None), "Page A Content");
    rules.enable_all();
    assert!(read(&repo, "page A", None).contains("permission"));
}
