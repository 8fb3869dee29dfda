//! Bind-time tags.
//!
//! Tags take the place of qualifier and scope annotations: they are plain
//! values handed to the `bind*` calls of
//! [`ContainerConfig`](crate::config::ContainerConfig).

use std::borrow::Cow;
use std::fmt;

use crate::key::Qualifier;
use crate::scope::ScopeTag;

/// A value attached to a binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Register under this qualifier. Several qualifier tags register the
    /// same supplier under several keys.
    Qualifier(Qualifier),
    /// Wrap the supplier in this scope's decorator.
    Scope(ScopeTag),
    /// Any other marker. Binding with one is rejected.
    Marker(&'static str),
}

impl Tag {
    /// Shorthand for a `named` qualifier tag.
    pub fn named(value: impl Into<Cow<'static, str>>) -> Self {
        Tag::Qualifier(Qualifier::named(value))
    }

    pub fn singleton() -> Self {
        Tag::Scope(ScopeTag::SINGLETON)
    }

    pub fn transient() -> Self {
        Tag::Scope(ScopeTag::TRANSIENT)
    }
}

impl From<Qualifier> for Tag {
    fn from(qualifier: Qualifier) -> Self {
        Tag::Qualifier(qualifier)
    }
}

impl From<ScopeTag> for Tag {
    fn from(scope: ScopeTag) -> Self {
        Tag::Scope(scope)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Qualifier(q) => write!(f, "{q}"),
            Tag::Scope(s) => write!(f, "@scope({s})"),
            Tag::Marker(name) => write!(f, "@{name}"),
        }
    }
}

/// Tags of one bind call, split by role.
#[derive(Debug, Default)]
pub(crate) struct SortedTags {
    pub qualifiers: Vec<Qualifier>,
    pub scopes: Vec<ScopeTag>,
}
