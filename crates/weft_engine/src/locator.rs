//! Joinpoint location.
//!
//! Resolves a [`Specifier`] against an explicit [`Scope`] to the member-table
//! slots a rule applies to. Owner and member segments may use glob wildcards
//! (`*`, `?`, `[...]`), matched case-sensitively.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use glob::Pattern;
use weft_foundation::{Error, Result};
use weft_model::{Class, ClassId, Member, MemberCategory, Scope};

// =============================================================================
// Specifier
// =============================================================================

/// Names the joinpoints a rule applies to.
#[derive(Clone)]
pub enum Specifier {
    /// A member pattern on a class given directly.
    Member {
        /// The owning class.
        owner: Arc<Class>,
        /// Member name or glob.
        pattern: String,
    },
    /// `"Owner.member"`, split at the last `.`. Without a `.` the pattern
    /// applies to every owner in scope.
    Path(String),
    /// Ordered union of specifiers.
    List(Vec<Specifier>),
}

impl Specifier {
    /// A member pattern on a known class.
    #[must_use]
    pub fn direct(owner: &Arc<Class>, pattern: impl Into<String>) -> Self {
        Self::Member {
            owner: Arc::clone(owner),
            pattern: pattern.into(),
        }
    }
}

impl From<&str> for Specifier {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for Specifier {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<&str>> for Specifier {
    fn from(paths: Vec<&str>) -> Self {
        Self::List(paths.into_iter().map(Self::from).collect())
    }
}

impl From<Vec<Specifier>> for Specifier {
    fn from(specifiers: Vec<Specifier>) -> Self {
        Self::List(specifiers)
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member { owner, pattern } => write!(f, "{}.{pattern}", owner.name()),
            Self::Path(path) => f.write_str(path),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl fmt::Debug for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Specifier({self})")
    }
}

/// Which member categories a rule applies to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TargetCategory {
    /// Methods and properties.
    #[default]
    All,
    /// Methods only.
    Methods,
    /// Attributes and properties only.
    Properties,
}

impl TargetCategory {
    /// Returns true if members of `category` are targeted.
    #[must_use]
    pub fn admits(self, category: MemberCategory) -> bool {
        match self {
            Self::All => true,
            Self::Methods => category == MemberCategory::Method,
            Self::Properties => category == MemberCategory::Property,
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

/// Locator configuration.
#[derive(Clone, Debug)]
pub struct LocatorConfig {
    /// Member-name globs that are never matched.
    pub reserved_patterns: Vec<String>,
    /// Whether inherited members are candidates.
    pub include_inherited: bool,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            reserved_patterns: vec!["__*__".to_string()],
            include_inherited: true,
        }
    }
}

impl LocatorConfig {
    /// Adds a reserved member-name glob.
    #[must_use]
    pub fn with_reserved(mut self, pattern: impl Into<String>) -> Self {
        self.reserved_patterns.push(pattern.into());
        self
    }

    /// Sets whether inherited members are candidates.
    #[must_use]
    pub fn with_include_inherited(mut self, include: bool) -> Self {
        self.include_inherited = include;
        self
    }
}

// =============================================================================
// Locator
// =============================================================================

/// One located joinpoint.
#[derive(Clone, Debug)]
pub struct LocatedMember {
    /// The class whose slot a weave goes into.
    pub owner: Arc<Class>,
    /// The member name.
    pub name: String,
    /// The member as currently visible on `owner`.
    pub member: Member,
    /// True if `owner` does not define the member itself.
    pub inherited: bool,
}

impl LocatedMember {
    /// `Owner.member`.
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}.{}", self.owner.name(), self.name)
    }
}

/// Resolves specifiers to member-table slots.
#[derive(Clone, Debug)]
pub struct Locator {
    scope: Scope,
    config: LocatorConfig,
    reserved: Vec<Pattern>,
}

impl Locator {
    /// Creates a locator over `scope` with the default configuration.
    #[must_use]
    pub fn new(scope: Scope) -> Self {
        Self::with_config(scope, LocatorConfig::default())
    }

    /// Creates a locator with an explicit configuration.
    ///
    /// Reserved patterns that are not valid globs are ignored.
    #[must_use]
    pub fn with_config(scope: Scope, config: LocatorConfig) -> Self {
        let reserved = config
            .reserved_patterns
            .iter()
            .filter_map(|p| match Pattern::new(&normalize(p)) {
                Ok(pattern) => Some(pattern),
                Err(err) => {
                    tracing::debug!(pattern = %p, %err, "ignoring invalid reserved pattern");
                    None
                }
            })
            .collect();
        Self {
            scope,
            config,
            reserved,
        }
    }

    /// Returns the scope.
    #[must_use]
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Resolves `specifier` to joinpoints of the given category.
    ///
    /// An empty result is not an error. An exact owner name missing from the
    /// scope, an empty segment, or an invalid glob is.
    pub fn locate(
        &self,
        specifier: &Specifier,
        category: TargetCategory,
    ) -> Result<Vec<LocatedMember>> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        self.locate_into(specifier, category, &mut out, &mut seen)?;
        tracing::trace!(%specifier, found = out.len(), "located joinpoints");
        Ok(out)
    }

    fn locate_into(
        &self,
        specifier: &Specifier,
        category: TargetCategory,
        out: &mut Vec<LocatedMember>,
        seen: &mut HashSet<(ClassId, String)>,
    ) -> Result<()> {
        match specifier {
            Specifier::Member { owner, pattern } => {
                let pattern = compile(pattern, &specifier.to_string())?;
                self.collect(owner, &pattern, category, out, seen);
            }
            Specifier::Path(path) => {
                let (owner_segment, member_segment) = match path.rsplit_once('.') {
                    Some((owner, member)) => (Some(owner), member),
                    None => (None, path.as_str()),
                };
                if member_segment.is_empty() || owner_segment == Some("") {
                    return Err(Error::resolution(path.as_str(), "empty segment"));
                }
                let pattern = compile(member_segment, path)?;
                for owner in self.owners(owner_segment, path)? {
                    self.collect(&owner, &pattern, category, out, seen);
                }
            }
            Specifier::List(items) => {
                for item in items {
                    self.locate_into(item, category, out, seen)?;
                }
            }
        }
        Ok(())
    }

    /// Classes named by an owner segment, without duplicates.
    fn owners(&self, segment: Option<&str>, specifier: &str) -> Result<Vec<Arc<Class>>> {
        let mut ids = HashSet::new();
        let mut owners = Vec::new();
        let mut push = |class: &Arc<Class>| {
            if ids.insert(class.id()) {
                owners.push(Arc::clone(class));
            }
        };

        match segment {
            None => self.scope.iter().for_each(|(_, class)| push(class)),
            Some(name) if is_glob(name) => {
                let pattern = compile(name, specifier)?;
                self.scope
                    .iter()
                    .filter(|(entry, _)| pattern.matches(entry))
                    .for_each(|(_, class)| push(class));
            }
            Some(name) => match self.scope.get(name) {
                Some(class) => push(class),
                None => {
                    return Err(Error::resolution(
                        specifier,
                        format!("owner '{name}' is not in scope"),
                    ));
                }
            },
        }
        Ok(owners)
    }

    fn collect(
        &self,
        owner: &Arc<Class>,
        pattern: &Pattern,
        category: TargetCategory,
        out: &mut Vec<LocatedMember>,
        seen: &mut HashSet<(ClassId, String)>,
    ) {
        let names = if self.config.include_inherited {
            owner.member_names()
        } else {
            owner.own_member_names()
        };

        for name in names {
            if !pattern.matches(&name) || self.is_reserved(&name) {
                continue;
            }
            let (member, inherited) = match owner.own_member(&name) {
                Some(member) => (member, false),
                None => match owner.lookup_inherited(&name) {
                    Some((_, member)) => (member, true),
                    None => continue,
                },
            };
            if !category.admits(member.category()) {
                continue;
            }
            if seen.insert((owner.id(), name.clone())) {
                out.push(LocatedMember {
                    owner: Arc::clone(owner),
                    name,
                    member,
                    inherited,
                });
            }
        }
    }

    fn is_reserved(&self, name: &str) -> bool {
        self.reserved.iter().any(|p| p.matches(name))
    }
}

fn is_glob(segment: &str) -> bool {
    segment.contains(['*', '?', '['])
}

fn compile(pattern: &str, specifier: &str) -> Result<Pattern> {
    Pattern::new(&normalize(pattern))
        .map_err(|err| Error::resolution(specifier, format!("invalid pattern '{pattern}': {err}")))
}

/// Rewrites a member glob into the `glob` crate's dialect: runs of `*` mean
/// a single `*`, and a `[` that never closes is a literal.
fn normalize(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '*' => {
                out.push('*');
                while chars.next_if(|&(_, c)| c == '*').is_some() {}
            }
            '[' if !closes(&pattern[i + 1..]) => out.push_str("[[]"),
            _ => out.push(c),
        }
    }
    out
}

/// True if a class opened just before `rest` has a closing `]`. The first
/// member (after an optional `!`) may itself be `]`.
fn closes(rest: &str) -> bool {
    let body = rest.strip_prefix('!').unwrap_or(rest);
    body.chars().skip(1).any(|c| c == ']')
}
