//! Error types for the Weft system.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::types::Type;

/// The main error type for Weft operations.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

/// Result alias used across the Weft crates.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Creates a resolution error for a specifier that cannot be located.
    #[must_use]
    pub fn resolution(specifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Resolution {
            specifier: specifier.into(),
            reason: reason.into(),
        })
    }

    /// Creates a member-not-found error.
    #[must_use]
    pub fn member_not_found(owner: impl Into<String>, member: impl Into<String>) -> Self {
        Self::new(ErrorKind::MemberNotFound {
            owner: owner.into(),
            member: member.into(),
        })
    }

    /// Creates an error for calling a member that is not a method.
    #[must_use]
    pub fn not_callable(owner: impl Into<String>, member: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotCallable {
            owner: owner.into(),
            member: member.into(),
        })
    }

    /// Creates an error for reading or writing a method as if it were a value.
    #[must_use]
    pub fn not_a_value(owner: impl Into<String>, member: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotAValue {
            owner: owner.into(),
            member: member.into(),
        })
    }

    /// Creates an error for writing a property that has no setter.
    #[must_use]
    pub fn read_only(owner: impl Into<String>, member: impl Into<String>) -> Self {
        Self::new(ErrorKind::ReadOnlyProperty {
            owner: owner.into(),
            member: member.into(),
        })
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: Type, actual: Type) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }

    /// Creates an arity mismatch error.
    #[must_use]
    pub fn arity_mismatch(expected: String, actual: usize) -> Self {
        Self::new(ErrorKind::ArityMismatch { expected, actual })
    }

    /// Creates a missing named argument error.
    #[must_use]
    pub fn missing_argument(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingArgument(name.into()))
    }

    /// Creates an error raised by user code (a method body or an advice).
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Failure(message.into()))
    }

    /// Returns true if this is a resolution error.
    #[must_use]
    pub fn is_resolution(&self) -> bool {
        matches!(self.kind, ErrorKind::Resolution { .. })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error)]
pub enum ErrorKind {
    /// A specifier matched no owner, named an unknown owner, or was malformed.
    #[error("cannot resolve '{specifier}': {reason}")]
    Resolution {
        /// The specifier as written.
        specifier: String,
        /// Why it could not be resolved.
        reason: String,
    },

    /// Member lookup failed on a class and all of its ancestors.
    #[error("member not found: {owner}.{member}")]
    MemberNotFound {
        /// Name of the class searched.
        owner: String,
        /// The member name.
        member: String,
    },

    /// The member exists but is not a method.
    #[error("{owner}.{member} is not callable")]
    NotCallable {
        /// Name of the class searched.
        owner: String,
        /// The member name.
        member: String,
    },

    /// The member is a method but was read or written as a value.
    #[error("{owner}.{member} is a method, not a value")]
    NotAValue {
        /// Name of the class searched.
        owner: String,
        /// The member name.
        member: String,
    },

    /// The member is a property without a setter.
    #[error("{owner}.{member} is read-only")]
    ReadOnlyProperty {
        /// Name of the class searched.
        owner: String,
        /// The member name.
        member: String,
    },

    /// Type mismatch while reading an argument or field.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected type.
        expected: Type,
        /// The actual type encountered.
        actual: Type,
    },

    /// Wrong number of positional arguments.
    #[error("arity mismatch: expected {expected}, got {actual}")]
    ArityMismatch {
        /// Description of expected arity.
        expected: String,
        /// Actual number of arguments.
        actual: usize,
    },

    /// A required named argument was not supplied.
    #[error("missing argument: {0}")]
    MissingArgument(String),

    /// Raised by user code; propagated through wrapper chains unchanged.
    #[error("{0}")]
    Failure(String),
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Rule set being registered, if any.
    pub rule_set: Option<String>,
    /// Joinpoint (`Owner.member`) involved, if any.
    pub joinpoint: Option<String>,
    /// Nested declaration frames, outermost first.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the rule set name.
    #[must_use]
    pub fn with_rule_set(mut self, name: impl Into<String>) -> Self {
        self.rule_set = Some(name.into());
        self
    }

    /// Sets the joinpoint.
    #[must_use]
    pub fn with_joinpoint(mut self, joinpoint: impl Into<String>) -> Self {
        self.joinpoint = Some(joinpoint.into());
        self
    }

    /// Adds a frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(rule_set) = &self.rule_set {
            write!(f, "in rule set {rule_set}")?;
        }
        if let Some(joinpoint) = &self.joinpoint {
            if self.rule_set.is_some() {
                write!(f, " ")?;
            }
            write!(f, "at {joinpoint}")?;
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
