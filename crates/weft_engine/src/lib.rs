//! Weaving engine for Weft.
//!
//! This crate attaches advices to class members and takes them off again:
//! - [`locator`] - Resolves specifiers such as `"Car.sp*"` to member-table slots
//! - [`advice`] - Immutable before/after/around interceptor records
//! - [`pointcut`] - Joinpoint sets with advice lists and enable/disable state
//! - [`weave`] - The wrapper installed into a slot; runs every claimant's advices
//! - [`registrar`] - Binds a rule-set declaration's advices to its pointcuts
//! - [`reset`] - Recovers original callables and restores member tables
//! - [`inspect`] - Lists what is currently woven
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use weft_engine::{Advice, Locator, Pointcut, TargetCategory};
//! use weft_foundation::Value;
//! use weft_model::{Args, Class, Object, Scope};
//!
//! let car = Class::builder("Car")
//!     .method("start", |_, _| Ok(Value::from("vroom")))
//!     .build();
//! let locator = Locator::new(Scope::new().with(&car));
//!
//! let pointcut = Pointcut::construct(&locator, "Car.start", TargetCategory::All).unwrap();
//! pointcut.add_advice(Arc::new(Advice::around("loud", "Car.start", |_, _, next, this, args| {
//!     let out = next.call(this, args)?;
//!     Ok(Value::from(format!("{}!", out.as_str().unwrap_or_default())))
//! })));
//!
//! let c = Object::new(&car);
//! assert_eq!(c.call("start", &Args::new()).unwrap(), Value::from("vroom!"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod advice;
pub mod inspect;
pub mod locator;
pub mod pointcut;
pub mod registrar;
pub mod reset;
pub mod weave;

pub use advice::{Advice, AdviceKind, Next, PointcutRef, RuleSetHandle};
pub use inspect::{WovenMember, is_woven, woven_members};
pub use locator::{LocatedMember, Locator, LocatorConfig, Specifier, TargetCategory};
pub use pointcut::{ActiveAdvices, Joinpoint, Pointcut, PointcutId};
pub use registrar::{RuleSet, RuleSetDecl};
pub use reset::{original_member, original_of, reset, reset_member};
pub use weave::Weave;
