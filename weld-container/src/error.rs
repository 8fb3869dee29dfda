//! Error types for Weld container operations.
//!
//! Every configuration problem is fatal to the bind or seal call that found
//! it. Errors name components by their short type names and, where it
//! helps, carry a hint.

use std::collections::HashSet;
use std::fmt;

use weld_support::rendering::{render_cycle, render_set, shorten_type_name};

use crate::key::ComponentKey;
use crate::scope::ScopeTag;
use crate::tag::Tag;

/// Boxed error returned by user constructors, field setters and methods.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for all Weld operations.
#[derive(Debug, thiserror::Error)]
pub enum WeldError {
    /// The implementation cannot be instantiated or declares an illegal
    /// injection point.
    #[error("Illegal component {}: {reason}", shorten_type_name(.component))]
    IllegalComponent {
        component: &'static str,
        reason: String,
    },

    /// More than one constructor is marked for injection.
    #[error(
        "Ambiguous constructor: {} marks {count} constructors for injection\n  Hint: mark exactly one",
        shorten_type_name(.component)
    )]
    AmbiguousConstructor {
        component: &'static str,
        count: usize,
    },

    /// A bind-time tag is neither a recognized qualifier nor a scope.
    #[error(
        "Illegal qualifier {tag} for {component}\n  Hint: register the qualifier kind with .qualifier_kind() first"
    )]
    IllegalQualifier { component: ComponentKey, tag: Tag },

    /// A scope tag has no registered decorator factory.
    #[error("Unknown scope '{scope}' for {component}\n  Hint: register it with .scope()")]
    UnknownScope {
        component: ComponentKey,
        scope: ScopeTag,
    },

    /// A dependency has no matching binding.
    #[error("{}", .0)]
    DependencyNotFound(DependencyNotFoundError),

    /// A cycle of hard (non-lazy) dependencies exists.
    #[error("{}", .0)]
    CyclicDependency(CyclicDependencyError),

    /// The key is already bound and overriding is disabled.
    #[error("{}", .0)]
    AlreadyRegistered(AlreadyRegisteredError),

    /// A construction closure pulled an argument it did not declare.
    #[error(
        "Argument #{position} of {} is not a {expected}",
        shorten_type_name(.component)
    )]
    ArgumentMismatch {
        component: &'static str,
        position: usize,
        expected: String,
    },

    /// User code failed while building an instance.
    #[error("Failed to construct {}: {source}", shorten_type_name(.component))]
    ConstructionFailed {
        component: &'static str,
        #[source]
        source: BoxError,
    },

    /// A lazy handle outlived its container.
    #[error("Cannot provide {component}: its container has been dropped")]
    ContainerReleased { component: ComponentKey },
}

impl WeldError {
    pub(crate) fn illegal_component(component: &'static str, reason: impl Into<String>) -> Self {
        WeldError::IllegalComponent {
            component,
            reason: reason.into(),
        }
    }

    pub(crate) fn type_mismatch(component: &'static str, expected: &'static str) -> Self {
        WeldError::ConstructionFailed {
            component,
            source: format!("type mismatch: expected {}", shorten_type_name(expected)).into(),
        }
    }
}

/// A dependency is missing from the container.
#[derive(Debug)]
pub struct DependencyNotFoundError {
    /// The component whose dependency is missing.
    pub component: ComponentKey,
    /// The binding key that was asked for.
    pub dependency: ComponentKey,
    /// Registered components with similar names.
    pub suggestions: Vec<String>,
}

impl fmt::Display for DependencyNotFoundError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dependency not found: {}", self.dependency)?;
        write!(f, "\n  Required by: {}", self.component)?;

        if !self.suggestions.is_empty() {
            write!(f, "\n  Did you mean one of:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n    - {}", shorten_type_name(suggestion))?;
            }
        }

        write!(f, "\n  Hint: bind {} before sealing", self.dependency)
    }
}

/// A hard dependency cycle.
#[derive(Debug)]
pub struct CyclicDependencyError {
    /// Keys on the cycle, in traversal order. The last one depends on the
    /// first.
    pub path: Vec<ComponentKey>,
}

impl CyclicDependencyError {
    /// The keys on the cycle as a set.
    pub fn components(&self) -> HashSet<ComponentKey> {
        self.path.iter().cloned().collect()
    }
}

impl fmt::Display for CyclicDependencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.path.iter().map(ToString::to_string).collect();
        write!(f, "Cyclic dependency among {}:\n  ", render_set(&names))?;
        write!(f, "{}", render_cycle(&names))?;
        write!(f, "\n  Hint: request one side through Lazy<T> to break the cycle")
    }
}

/// A key was bound twice while overriding is disabled.
#[derive(Debug)]
pub struct AlreadyRegisteredError {
    pub key: ComponentKey,
}

impl fmt::Display for AlreadyRegisteredError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Component already bound: {}", self.key)?;
        write!(f, "\n  Hint: enable allow_override in ContainerSettings to replace bindings")
    }
}

/// Convenient Result type for Weld operations.
pub type Result<T> = std::result::Result<T, WeldError>;
