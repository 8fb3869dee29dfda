//! Resolved arguments handed to constructors, fields and methods.

use std::any::{TypeId, type_name};
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use weld_support::rendering::shorten_type_name;

use crate::container::WeakContainer;
use crate::error::{Result, WeldError};
use crate::key::ComponentKey;
use crate::supplier::Instance;

/// What the container hands back for one dependency reference.
#[derive(Clone, Debug)]
pub enum Resolved {
    /// A constructed instance.
    Instance(Instance),
    /// A deferred handle; nothing has been constructed yet.
    Lazy(LazyInstance),
}

/// Type-erased lazy handle. See [`Lazy`] for the typed form.
///
/// Holds only the binding key and a weak container handle, so instances
/// that reach each other through lazy handles never keep one another alive.
#[derive(Clone)]
pub struct LazyInstance {
    key: ComponentKey,
    container: WeakContainer,
}

impl LazyInstance {
    pub(crate) fn new(key: ComponentKey, container: WeakContainer) -> Self {
        Self { key, container }
    }

    /// Asks the bound supplier for an instance.
    pub fn get(&self) -> Result<Instance> {
        let container = self.container.upgrade().ok_or_else(|| WeldError::ContainerReleased {
            component: self.key.clone(),
        })?;
        container.supply(&self.key)
    }

    #[inline]
    pub fn key(&self) -> &ComponentKey {
        &self.key
    }
}

impl fmt::Debug for LazyInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LazyInstance({:?})", self.key)
    }
}

/// A deferred provider of `T`.
///
/// The binding is looked up when the handle is created; the instance is
/// built (or fetched from its scope) on every [`Lazy::get`]. The handle
/// does not keep its container alive.
pub struct Lazy<T: ?Sized> {
    inner: LazyInstance,
    _component: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized + Send + Sync + 'static> Lazy<T> {
    pub(crate) fn from_erased(inner: LazyInstance) -> Self {
        Self {
            inner,
            _component: PhantomData,
        }
    }

    pub fn get(&self) -> Result<Arc<T>> {
        let instance = self.inner.get()?;
        instance
            .downcast::<T>()
            .ok_or_else(|| WeldError::type_mismatch(instance.type_name(), type_name::<T>()))
    }

    #[inline]
    pub fn key(&self) -> &ComponentKey {
        self.inner.key()
    }
}

impl<T: ?Sized> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _component: PhantomData,
        }
    }
}

impl<T: ?Sized> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lazy({})", self.inner.key)
    }
}

/// Arguments for one injection point, in declaration order.
///
/// Each declared [`Param`](crate::meta::Param) yields exactly one value;
/// pull them with [`next`](Args::next) or [`next_lazy`](Args::next_lazy)
/// matching the declaration.
pub struct Args {
    component: &'static str,
    values: VecDeque<Resolved>,
    position: usize,
}

impl Args {
    pub(crate) fn new(component: &'static str, values: Vec<Resolved>) -> Self {
        Self {
            component,
            values: values.into(),
            position: 0,
        }
    }

    /// Takes the next argument as an instance of `D`.
    pub fn next<D: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Arc<D>> {
        match self.take() {
            Some(Resolved::Instance(instance)) => instance
                .downcast::<D>()
                .ok_or_else(|| self.mismatch(shorten_type_name(type_name::<D>()))),
            _ => Err(self.mismatch(shorten_type_name(type_name::<D>()))),
        }
    }

    /// Takes the next argument as a lazy handle to `D`.
    pub fn next_lazy<D: ?Sized + Send + Sync + 'static>(&mut self) -> Result<Lazy<D>> {
        match self.take() {
            Some(Resolved::Lazy(lazy)) if lazy.key().type_id() == TypeId::of::<D>() => {
                Ok(Lazy::from_erased(lazy))
            }
            _ => Err(self.mismatch(format!("Lazy<{}>", shorten_type_name(type_name::<D>())))),
        }
    }

    /// Number of arguments not yet taken.
    pub fn remaining(&self) -> usize {
        self.values.len()
    }

    fn take(&mut self) -> Option<Resolved> {
        self.position += 1;
        self.values.pop_front()
    }

    fn mismatch(&self, expected: String) -> WeldError {
        WeldError::ArgumentMismatch {
            component: self.component,
            position: self.position,
            expected,
        }
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("component", &self.component)
            .field("remaining", &self.values.len())
            .finish()
    }
}
