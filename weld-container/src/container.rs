//! # The Container
//!
//! The sealed, read-only resolver produced by
//! [`ContainerConfig::seal`](crate::config::ContainerConfig::seal).
//!
//! # Architecture
//! ```text
//! ContainerConfig ──seal()──> Container ──resolve()──> InstanceSupplier
//!                                 ▲                          │
//!                                 └──── resolve(dependency) ─┘
//! ```
//!
//! Suppliers call back into the container for their own dependencies;
//! that reentrancy is how transitive graphs get built. The container owns
//! no instances: caching lives in the scope decorators.
//!
//! An unbound key is not an error at this level: queries return `None`.

use std::any::type_name;
use std::fmt;
use std::sync::{Arc, Weak};

use tracing::trace;

use crate::args::{Lazy, LazyInstance, Resolved};
use crate::dependency::{Dependency, Wrapper};
use crate::error::{DependencyNotFoundError, Result, WeldError};
use crate::key::{ComponentKey, Qualifier};
use crate::registry::Registry;
use crate::supplier::Instance;

pub(crate) struct ContainerInner {
    registry: Registry,
}

/// Immutable, thread-safe resolver.
///
/// Cloning is cheap and yields a handle to the same bindings and the same
/// scope caches.
#[derive(Clone)]
pub struct Container {
    inner: Arc<ContainerInner>,
}

/// Non-owning handle held by lazy providers.
#[derive(Clone)]
pub(crate) struct WeakContainer(Weak<ContainerInner>);

impl WeakContainer {
    pub fn upgrade(&self) -> Option<Container> {
        self.0.upgrade().map(|inner| Container { inner })
    }
}

impl Container {
    pub(crate) fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(ContainerInner { registry }),
        }
    }

    pub(crate) fn downgrade(&self) -> WeakContainer {
        WeakContainer(Arc::downgrade(&self.inner))
    }

    /// Resolves one dependency reference.
    ///
    /// A lazy reference yields a [`Resolved::Lazy`] handle as soon as the
    /// binding exists; nothing is constructed until the handle is used.
    /// Returns `Ok(None)` for an unbound key.
    ///
    /// # Errors
    /// Whatever the bound supplier reports while constructing.
    pub fn resolve(&self, dependency: &Dependency) -> Result<Option<Resolved>> {
        let key = dependency.key();
        let Some(registration) = self.inner.registry.get(key) else {
            trace!(key = %key, "No binding");
            return Ok(None);
        };

        match dependency.wrapper() {
            Wrapper::Lazy => {
                trace!(key = %key, "Handing out lazy provider");
                Ok(Some(Resolved::Lazy(LazyInstance::new(key.clone(), self.downgrade()))))
            }
            Wrapper::None => {
                trace!(key = %key, "Resolving");
                registration.supplier.get(self).map(|instance| Some(Resolved::Instance(instance)))
            }
        }
    }

    /// Resolves the unqualified binding of `T`.
    ///
    /// ```rust,ignore
    /// let engine: Arc<dyn Engine> = container.get::<dyn Engine>()?.expect("bound");
    /// ```
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Arc<T>>> {
        self.get_key(ComponentKey::of::<T>())
    }

    /// Resolves the binding of `T` under `qualifier`. Never falls back to
    /// the unqualified binding.
    pub fn get_qualified<T: ?Sized + Send + Sync + 'static>(&self, qualifier: Qualifier) -> Result<Option<Arc<T>>> {
        self.get_key(ComponentKey::qualified::<T>(qualifier))
    }

    /// A deferred provider for the unqualified binding of `T`.
    pub fn get_lazy<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Option<Lazy<T>>> {
        self.lazy_key(ComponentKey::of::<T>())
    }

    pub fn get_lazy_qualified<T: ?Sized + Send + Sync + 'static>(
        &self,
        qualifier: Qualifier,
    ) -> Result<Option<Lazy<T>>> {
        self.lazy_key(ComponentKey::qualified::<T>(qualifier))
    }

    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.inner.registry.contains(key)
    }

    /// Number of binding keys.
    pub fn len(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.registry.is_empty()
    }

    /// Binding keys in registration order.
    pub fn keys(&self) -> &[ComponentKey] {
        self.inner.registry.keys()
    }

    /// Builds the instance bound to `key`, as a lazy handle does on use.
    pub(crate) fn supply(&self, key: &ComponentKey) -> Result<Instance> {
        let registration = self.inner.registry.get(key).ok_or_else(|| {
            WeldError::DependencyNotFound(DependencyNotFoundError {
                component: key.clone(),
                dependency: key.clone(),
                suggestions: Vec::new(),
            })
        })?;
        trace!(key = %key, "Resolving through lazy provider");
        registration.supplier.get(self)
    }

    fn get_key<T: ?Sized + Send + Sync + 'static>(&self, key: ComponentKey) -> Result<Option<Arc<T>>> {
        match self.resolve(&Dependency::new(key, Wrapper::None))? {
            Some(Resolved::Instance(instance)) => instance
                .downcast::<T>()
                .map(Some)
                .ok_or_else(|| WeldError::type_mismatch(instance.type_name(), type_name::<T>())),
            _ => Ok(None),
        }
    }

    fn lazy_key<T: ?Sized + Send + Sync + 'static>(&self, key: ComponentKey) -> Result<Option<Lazy<T>>> {
        match self.resolve(&Dependency::new(key, Wrapper::Lazy))? {
            Some(Resolved::Lazy(lazy)) => Ok(Some(Lazy::from_erased(lazy))),
            _ => Ok(None),
        }
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.inner.registry.len())
            .finish()
    }
}

// ═══════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════

pub mod prelude {
    pub use super::Container;
    pub use crate::args::{Args, Lazy};
    pub use crate::config::{ContainerConfig, ContainerSettings};
    pub use crate::dependency::Dependency;
    pub use crate::error::{BoxError, Result, WeldError};
    pub use crate::implements;
    pub use crate::implements::Implements;
    pub use crate::key::{ComponentKey, Qualifier};
    pub use crate::meta::{Component, ComponentMeta, Param};
    pub use crate::module::Module;
    pub use crate::scope::ScopeTag;
    pub use crate::tag::Tag;
}

// ═══════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════
