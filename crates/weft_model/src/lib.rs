//! Classes, member tables, and instances for Weft.
//!
//! This crate is the host the weaving engine installs wrappers into:
//! - [`Class`] - A named type with an explicit ancestor list and a mutable member table
//! - [`Member`] - A method, plain attribute, or property occupying a member-table slot
//! - [`Callable`] - A shared handle to anything implementing [`Invoke`]
//! - [`Object`] - An instance whose calls and field accesses dispatch through its class
//! - [`Scope`] - An explicit name → class mapping used to resolve owner names
//!
//! Every change to any member table advances a process-wide generation counter
//! ([`generation::current`]), which caches keyed on member layout compare against.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod callable;
pub mod class;
pub mod generation;
pub mod object;
pub mod scope;

pub use callable::{Args, Callable, Invoke};
pub use class::{Backing, Class, ClassBuilder, ClassId, Member, MemberCategory, Property};
pub use object::{FieldKey, Object, SlotId};
pub use scope::Scope;
