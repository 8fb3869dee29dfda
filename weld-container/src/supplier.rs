//! Instance suppliers: strategies that produce a component instance.
//!
//! Every binding key maps to one [`InstanceSupplier`]. A supplier declares
//! the dependencies it will ask for; the graph validator reads them at seal
//! time without ever calling `get`.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use crate::args::{Args, Resolved};
use crate::container::Container;
use crate::dependency::Dependency;
use crate::error::{BoxError, DependencyNotFoundError, Result, WeldError};
use crate::implements::Implements;
use crate::introspect::InjectableDescriptor;
use crate::key::ComponentKey;

/// A type-erased component instance.
///
/// Wraps an `Arc<T>` where `T` is the component type the instance was
/// bound under (possibly a trait object). Cloning shares the instance.
#[derive(Clone)]
pub struct Instance {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Instance {
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Recovers the typed handle, or `None` if `T` is not the bound type.
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().cloned()
    }

    /// Returns `true` if both handles share one instance.
    pub fn same(&self, other: &Instance) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Instance({})", self.type_name)
    }
}

/// Produces instances for one binding key.
pub trait InstanceSupplier: Send + Sync {
    /// Builds or fetches an instance, resolving dependencies through
    /// `container`.
    fn get(&self, container: &Container) -> Result<Instance>;

    /// Everything `get` will request, in declaration order.
    fn dependencies(&self) -> Vec<Dependency>;
}

/// Shared handle to a supplier; one supplier may sit under several keys.
pub type SharedSupplier = Arc<dyn InstanceSupplier>;

/// Hands out one pre-built instance.
pub struct ConstantSupplier {
    instance: Instance,
}

impl ConstantSupplier {
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            instance: Instance::new(value),
        }
    }
}

impl InstanceSupplier for ConstantSupplier {
    fn get(&self, _container: &Container) -> Result<Instance> {
        Ok(self.instance.clone())
    }

    fn dependencies(&self) -> Vec<Dependency> {
        Vec::new()
    }
}

type FactoryFn<T> = Box<dyn Fn(&Container) -> std::result::Result<Arc<T>, BoxError> + Send + Sync>;

/// Builds instances with a closure that declares its dependencies up front.
pub struct FactorySupplier<T: ?Sized> {
    dependencies: Vec<Dependency>,
    factory: FactoryFn<T>,
}

impl<T: ?Sized + Send + Sync + 'static> FactorySupplier<T> {
    pub fn new(
        dependencies: Vec<Dependency>,
        factory: impl Fn(&Container) -> std::result::Result<Arc<T>, BoxError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            dependencies,
            factory: Box::new(factory),
        }
    }
}

impl<T: ?Sized + Send + Sync + 'static> InstanceSupplier for FactorySupplier<T> {
    fn get(&self, container: &Container) -> Result<Instance> {
        let value = (self.factory)(container).map_err(|source| WeldError::ConstructionFailed {
            component: type_name::<T>(),
            source,
        })?;
        Ok(Instance::new(value))
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.dependencies.clone()
    }
}

/// Builds `I` from its [`InjectableDescriptor`] and hands it out as `T`.
///
/// Construction order: constructor, then fields, then methods, each in
/// base-to-derived discovery order.
pub struct InjectedSupplier<T: ?Sized, I> {
    descriptor: InjectableDescriptor<I>,
    _component: PhantomData<fn() -> Arc<T>>,
}

impl<T: ?Sized, I> InjectedSupplier<T, I>
where
    T: Send + Sync + 'static,
    I: Implements<T>,
{
    pub fn new(descriptor: InjectableDescriptor<I>) -> Self {
        Self {
            descriptor,
            _component: PhantomData,
        }
    }

    fn arguments(&self, container: &Container, dependencies: &[Dependency]) -> Result<Args> {
        let component = self.descriptor.component();
        let values = dependencies
            .iter()
            .map(|dependency| {
                container.resolve(dependency)?.ok_or_else(|| {
                    WeldError::DependencyNotFound(DependencyNotFoundError {
                        component: ComponentKey::from_raw(TypeId::of::<I>(), component),
                        dependency: dependency.key().clone(),
                        suggestions: Vec::new(),
                    })
                })
            })
            .collect::<Result<Vec<Resolved>>>()?;
        Ok(Args::new(component, values))
    }

    fn failed(&self, source: BoxError) -> WeldError {
        WeldError::ConstructionFailed {
            component: self.descriptor.component(),
            source,
        }
    }
}

impl<T: ?Sized, I> InstanceSupplier for InjectedSupplier<T, I>
where
    T: Send + Sync + 'static,
    I: Implements<T>,
{
    fn get(&self, container: &Container) -> Result<Instance> {
        let descriptor = &self.descriptor;
        trace!(component = descriptor.component(), "Injecting");

        let constructor = descriptor.constructor();
        let mut args = self.arguments(container, constructor.dependencies())?;
        let mut instance = constructor.construct(&mut args).map_err(|e| self.failed(e))?;

        for field in descriptor.fields() {
            let mut args = self.arguments(container, std::slice::from_ref(field.dependency()))?;
            field.inject(&mut instance, &mut args).map_err(|e| self.failed(e))?;
        }

        for method in descriptor.methods() {
            let mut args = self.arguments(container, method.dependencies())?;
            method.inject(&mut instance, &mut args).map_err(|e| self.failed(e))?;
        }

        Ok(Instance::new(I::upcast(Arc::new(instance))))
    }

    fn dependencies(&self) -> Vec<Dependency> {
        self.descriptor.dependencies().to_vec()
    }
}
