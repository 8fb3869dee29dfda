//! Dependency references: what a component asks the container for.

use std::fmt;

use crate::key::{ComponentKey, Qualifier};

/// How a dependency is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Wrapper {
    /// The instance itself, constructed before the dependent.
    #[default]
    None,
    /// A [`Lazy`](crate::args::Lazy) handle. Construction is deferred
    /// until the handle is invoked, so this edge never takes part in
    /// cycle detection.
    Lazy,
}

/// A request for a component: binding key plus delivery wrapper.
///
/// Two references are equal when type, qualifier and wrapper all match.
///
/// # Examples
/// ```
/// use weld_container::dependency::{Dependency, Wrapper};
/// use weld_container::key::Qualifier;
///
/// let eager = Dependency::of::<String>();
/// let lazy = Dependency::lazy::<String>();
/// assert_ne!(eager, lazy);
/// assert_eq!(eager.key(), lazy.key());
/// assert_eq!(lazy.wrapper(), Wrapper::Lazy);
///
/// let v6 = Dependency::of::<String>().qualified(Qualifier::named("v6"));
/// assert_eq!(v6.key().qualifier(), Some(&Qualifier::named("v6")));
/// ```
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    key: ComponentKey,
    wrapper: Wrapper,
}

impl Dependency {
    pub fn new(key: ComponentKey, wrapper: Wrapper) -> Self {
        Self { key, wrapper }
    }

    /// An eager, unqualified reference to `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::new(ComponentKey::of::<T>(), Wrapper::None)
    }

    /// A lazy, unqualified reference to `T`.
    pub fn lazy<T: ?Sized + 'static>() -> Self {
        Self::new(ComponentKey::of::<T>(), Wrapper::Lazy)
    }

    #[must_use]
    pub fn qualified(mut self, qualifier: Qualifier) -> Self {
        self.key = self.key.with_qualifier(Some(qualifier));
        self
    }

    #[inline]
    pub fn key(&self) -> &ComponentKey {
        &self.key
    }

    #[inline]
    pub fn wrapper(&self) -> Wrapper {
        self.wrapper
    }

    /// Returns `true` for references that are deferred behind a lazy handle.
    #[inline]
    pub fn is_lazy(&self) -> bool {
        self.wrapper == Wrapper::Lazy
    }
}

impl fmt::Debug for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wrapper {
            Wrapper::None => write!(f, "Dependency({:?})", self.key),
            Wrapper::Lazy => write!(f, "Dependency(Lazy<{:?}>)", self.key),
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.wrapper {
            Wrapper::None => write!(f, "{}", self.key),
            Wrapper::Lazy => write!(f, "Lazy<{}>", self.key),
        }
    }
}
