//! Instance lifetime scopes.
//!
//! A scope is a decorator around an [`InstanceSupplier`]. The configuration
//! maps each [`ScopeTag`] to a factory that builds the decorator:
//! - [`Transient`]: new instance on every request (the default)
//! - [`Singleton`]: first successful instance is cached for the lifetime
//!   of the container
//! - [`Pooled`]: up to `size` instances, handed out round-robin
//!
//! Decorators forward `dependencies()` untouched so that validation sees
//! every edge of the wrapped supplier.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use tracing::trace;

use crate::container::Container;
use crate::dependency::Dependency;
use crate::error::Result;
use crate::supplier::{Instance, InstanceSupplier, SharedSupplier};

/// Names a scope at bind time.
///
/// # Examples
/// ```
/// use weld_container::scope::ScopeTag;
///
/// const REQUEST: ScopeTag = ScopeTag::new("request");
/// assert_eq!(REQUEST.name(), "request");
/// assert_ne!(REQUEST, ScopeTag::SINGLETON);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeTag(&'static str);

impl ScopeTag {
    /// Fresh instance on every request.
    pub const TRANSIENT: ScopeTag = ScopeTag("transient");
    /// One instance per container.
    pub const SINGLETON: ScopeTag = ScopeTag("singleton");
    /// A bounded set of instances reused round-robin.
    pub const POOLED: ScopeTag = ScopeTag("pooled");

    pub const fn new(name: &'static str) -> Self {
        ScopeTag(name)
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ScopeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Builds a scope decorator around a supplier.
pub type ScopeFactory = Arc<dyn Fn(SharedSupplier) -> SharedSupplier + Send + Sync>;

/// Forwards every request to the wrapped supplier.
pub struct Transient {
    inner: SharedSupplier,
}

impl Transient {
    pub fn new(inner: SharedSupplier) -> Self {
        Self { inner }
    }
}

impl InstanceSupplier for Transient {
    fn get(&self, container: &Container) -> Result<Instance> {
        self.inner.get(container)
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.inner.dependencies()
    }
}

/// Caches the first successful instance.
///
/// Population goes through [`OnceCell::get_or_try_init`], so racing
/// callers observe one instance. A failed construction leaves the cell
/// empty and the next request tries again.
///
/// Construction must not ask for the same singleton again, for example by
/// calling a lazy handle to itself from a constructor: the cell is still
/// initializing and the call blocks forever. Hard cycles are rejected by
/// `seal()`; lazy handles should only be used after construction.
pub struct Singleton {
    inner: SharedSupplier,
    cell: OnceCell<Instance>,
}

impl Singleton {
    pub fn new(inner: SharedSupplier) -> Self {
        Self {
            inner,
            cell: OnceCell::new(),
        }
    }
}

impl InstanceSupplier for Singleton {
    fn get(&self, container: &Container) -> Result<Instance> {
        self.cell
            .get_or_try_init(|| {
                trace!("Populating singleton");
                self.inner.get(container)
            })
            .cloned()
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.inner.dependencies()
    }
}

/// Builds up to `size` instances, then cycles through them.
///
/// Instances are built outside the pool lock. Callers racing to fill the
/// last slot may each build one; the surplus is handed out once and not
/// kept.
pub struct Pooled {
    inner: SharedSupplier,
    size: usize,
    state: Mutex<PoolState>,
}

#[derive(Default)]
struct PoolState {
    instances: Vec<Instance>,
    next: usize,
}

impl PoolState {
    fn take_next(&mut self, size: usize) -> Instance {
        let idx = self.next % size;
        self.next = (idx + 1) % size;
        self.instances[idx].clone()
    }
}

impl Pooled {
    /// A pool of at least one instance.
    pub fn new(inner: SharedSupplier, size: usize) -> Self {
        Self {
            inner,
            size: size.max(1),
            state: Mutex::new(PoolState::default()),
        }
    }
}

impl InstanceSupplier for Pooled {
    fn get(&self, container: &Container) -> Result<Instance> {
        {
            let mut state = self.state.lock();
            if state.instances.len() >= self.size {
                return Ok(state.take_next(self.size));
            }
        }

        let instance = self.inner.get(container)?;

        let mut state = self.state.lock();
        if state.instances.len() < self.size {
            state.instances.push(instance.clone());
            trace!(filled = state.instances.len(), size = self.size, "Grew pool");
        }
        Ok(instance)
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.inner.dependencies()
    }
}

/// Factories registered on every new configuration.
pub(crate) fn builtin_scopes(pool_size: usize) -> Vec<(ScopeTag, ScopeFactory)> {
    vec![
        (
            ScopeTag::TRANSIENT,
            Arc::new(|inner| Arc::new(Transient::new(inner)) as SharedSupplier),
        ),
        (
            ScopeTag::SINGLETON,
            Arc::new(|inner| Arc::new(Singleton::new(inner)) as SharedSupplier),
        ),
        (
            ScopeTag::POOLED,
            Arc::new(move |inner| Arc::new(Pooled::new(inner, pool_size)) as SharedSupplier),
        ),
    ]
}
