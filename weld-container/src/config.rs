//! Binding configuration.
//!
//! A [`ContainerConfig`] accumulates bindings, validates their tags and,
//! on [`seal`](ContainerConfig::seal), the whole dependency graph. It is
//! the only mutable phase; the sealed [`Container`] never changes.
//!
//! ```text
//! ContainerConfig ──bind*()──> Registry ──seal()──> GraphValidator ──> Container
//! ```
//!
//! # Examples
//! ```
//! use weld_container::prelude::*;
//!
//! trait Engine: Send + Sync {
//!     fn name(&self) -> &str;
//! }
//!
//! struct V8;
//! impl Engine for V8 {
//!     fn name(&self) -> &str {
//!         "V8"
//!     }
//! }
//! impl Component for V8 {
//!     fn describe(meta: &mut ComponentMeta<Self>) {
//!         meta.default_constructor(|| V8);
//!     }
//! }
//! implements!(V8 => dyn Engine);
//!
//! let mut config = ContainerConfig::new();
//! config.bind::<dyn Engine, V8>(&[Tag::singleton()])?;
//! let container = config.seal()?;
//!
//! let engine = container.get::<dyn Engine>()?.expect("bound");
//! assert_eq!(engine.name(), "V8");
//! # Ok::<(), WeldError>(())
//! ```

use std::any::type_name;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::container::Container;
use crate::dependency::Dependency;
use crate::error::{BoxError, Result, WeldError};
use crate::graph::GraphValidator;
use crate::implements::Implements;
use crate::introspect::InjectableDescriptor;
use crate::key::{ComponentKey, NAMED, Qualifier};
use crate::meta::Component;
use crate::module::Module;
use crate::registry::{Registration, Registry};
use crate::scope::{ScopeFactory, ScopeTag, builtin_scopes};
use crate::supplier::{ConstantSupplier, FactorySupplier, InjectedSupplier, SharedSupplier};
use crate::tag::{SortedTags, Tag};

/// Tunables of a configuration.
///
/// Every field has a default, so a partial document deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Re-binding a key replaces the earlier binding instead of failing.
    pub allow_override: bool,
    /// Instances kept by the built-in `pooled` scope.
    pub pool_size: usize,
    /// Upper bound on "did you mean" hints in errors.
    pub max_suggestions: usize,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            allow_override: true,
            pool_size: 4,
            max_suggestions: 3,
        }
    }
}

/// Collects bindings, then seals them into a [`Container`].
pub struct ContainerConfig {
    registry: Registry,
    scopes: HashMap<ScopeTag, ScopeFactory>,
    qualifier_kinds: HashSet<&'static str>,
    settings: ContainerSettings,
}

impl ContainerConfig {
    pub fn new() -> Self {
        Self::with_settings(ContainerSettings::default())
    }

    /// Starts from `settings`, with the built-in scopes and the `named`
    /// qualifier kind registered.
    pub fn with_settings(settings: ContainerSettings) -> Self {
        Self {
            registry: Registry::new(),
            scopes: builtin_scopes(settings.pool_size).into_iter().collect(),
            qualifier_kinds: HashSet::from([NAMED]),
            settings,
        }
    }

    #[inline]
    pub fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    /// Accepts qualifiers of `kind` at bind time.
    pub fn qualifier_kind(&mut self, kind: &'static str) -> &mut Self {
        debug!(kind, "Registered qualifier kind");
        self.qualifier_kinds.insert(kind);
        self
    }

    /// Registers or replaces the decorator factory for `tag`.
    pub fn scope(
        &mut self,
        tag: ScopeTag,
        factory: impl Fn(SharedSupplier) -> SharedSupplier + Send + Sync + 'static,
    ) -> &mut Self {
        debug!(scope = %tag, "Registered scope");
        self.scopes.insert(tag, Arc::new(factory));
        self
    }

    // ── Constant bindings ──

    /// Binds a pre-built instance. Scope tags are accepted and ignored: the
    /// instance is already shared.
    ///
    /// # Errors
    /// [`WeldError::IllegalQualifier`] or [`WeldError::UnknownScope`] for a
    /// bad tag, [`WeldError::AlreadyRegistered`] when overriding is
    /// disabled.
    pub fn bind_instance<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        value: Arc<T>,
        tags: &[Tag],
    ) -> Result<&mut Self> {
        let key = ComponentKey::of::<T>();
        let tags = self.sort_tags(&key, tags)?;
        let supplier: SharedSupplier = Arc::new(ConstantSupplier::new(value));
        self.register_all(key, supplier, None, &tags.qualifiers)?;
        Ok(self)
    }

    /// Binds an owned value; shorthand for [`bind_instance`](Self::bind_instance).
    pub fn bind_value<T: Send + Sync + 'static>(&mut self, value: T, tags: &[Tag]) -> Result<&mut Self> {
        self.bind_instance(Arc::new(value), tags)
    }

    // ── Injected bindings ──

    /// Binds component type `T` to implementation `I`, built from its
    /// [`InjectableDescriptor`].
    ///
    /// The scope comes from a scope tag if one is given, else from the
    /// scope declared on `I`, else it is transient.
    ///
    /// # Errors
    /// Everything [`InjectableDescriptor::inspect`] reports, plus the tag
    /// and override errors of [`bind_instance`](Self::bind_instance).
    pub fn bind<T, I>(&mut self, tags: &[Tag]) -> Result<&mut Self>
    where
        T: ?Sized + Send + Sync + 'static,
        I: Component + Implements<T>,
    {
        let key = ComponentKey::of::<T>();
        let descriptor = InjectableDescriptor::<I>::inspect()?;
        let tags = self.sort_tags(&key, tags)?;
        let scope = self.pick_scope(descriptor.component(), &tags, descriptor.scope())?;

        let supplier: SharedSupplier = Arc::new(InjectedSupplier::<T, I>::new(descriptor));
        self.register_scoped(key, supplier, scope, &tags.qualifiers)?;
        Ok(self)
    }

    /// Binds `T` to a closure. `dependencies` must list everything the
    /// closure resolves so validation can see the edges.
    pub fn bind_factory<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        dependencies: Vec<Dependency>,
        tags: &[Tag],
        factory: impl Fn(&Container) -> std::result::Result<Arc<T>, BoxError> + Send + Sync + 'static,
    ) -> Result<&mut Self> {
        let supplier: SharedSupplier = Arc::new(FactorySupplier::<T>::new(dependencies, factory));
        self.bind_supplier::<T>(supplier, tags)
    }

    /// Binds `T` to a custom supplier, which must produce instances of `T`.
    pub fn bind_supplier<T: ?Sized + 'static>(
        &mut self,
        supplier: SharedSupplier,
        tags: &[Tag],
    ) -> Result<&mut Self> {
        let key = ComponentKey::of::<T>();
        let tags = self.sort_tags(&key, tags)?;
        let scope = self.pick_scope(type_name::<T>(), &tags, None)?;
        self.register_scoped(key, supplier, scope, &tags.qualifiers)?;
        Ok(self)
    }

    // ── Modules ──

    /// Lets `module` add its bindings.
    pub fn install(&mut self, module: &dyn Module) -> Result<&mut Self> {
        debug!(module = module.name(), "Installing module");
        module.configure(self)?;
        Ok(self)
    }

    // ── Seal ──

    /// Validates the dependency graph and freezes the bindings.
    ///
    /// # Errors
    /// [`WeldError::DependencyNotFound`] or [`WeldError::CyclicDependency`].
    #[instrument(skip(self), name = "container_seal")]
    pub fn seal(self) -> Result<Container> {
        info!(bindings = self.registry.len(), "Sealing container");

        GraphValidator::new(&self.registry, self.settings.max_suggestions).validate()?;

        info!("Container sealed");
        Ok(Container::new(self.registry))
    }

    // ── Internal ──

    fn sort_tags(&self, key: &ComponentKey, tags: &[Tag]) -> Result<SortedTags> {
        let mut sorted = SortedTags::default();
        for tag in tags {
            match tag {
                Tag::Qualifier(q) if self.qualifier_kinds.contains(q.kind()) => {
                    if !sorted.qualifiers.contains(q) {
                        sorted.qualifiers.push(q.clone());
                    }
                }
                Tag::Scope(scope) if self.scopes.contains_key(scope) => sorted.scopes.push(*scope),
                Tag::Scope(scope) => {
                    return Err(WeldError::UnknownScope {
                        component: key.clone(),
                        scope: *scope,
                    });
                }
                Tag::Qualifier(_) | Tag::Marker(_) => {
                    return Err(WeldError::IllegalQualifier {
                        component: key.clone(),
                        tag: tag.clone(),
                    });
                }
            }
        }
        Ok(sorted)
    }

    /// A bind-time scope tag wins over the one declared on the type.
    fn pick_scope(
        &self,
        component: &'static str,
        tags: &SortedTags,
        declared: Option<ScopeTag>,
    ) -> Result<ScopeTag> {
        if tags.scopes.len() > 1 {
            return Err(WeldError::illegal_component(
                component,
                format!("bound with {} scope tags, at most one is allowed", tags.scopes.len()),
            ));
        }
        Ok(tags.scopes.first().copied().or(declared).unwrap_or(ScopeTag::TRANSIENT))
    }

    fn register_scoped(
        &mut self,
        key: ComponentKey,
        supplier: SharedSupplier,
        scope: ScopeTag,
        qualifiers: &[Qualifier],
    ) -> Result<()> {
        let decorate = self.scopes.get(&scope).ok_or_else(|| WeldError::UnknownScope {
            component: key.clone(),
            scope,
        })?;
        let supplier = decorate(supplier);
        self.register_all(key, supplier, Some(scope), qualifiers)
    }

    /// One supplier under the unqualified key, or under every qualifier.
    fn register_all(
        &mut self,
        key: ComponentKey,
        supplier: SharedSupplier,
        scope: Option<ScopeTag>,
        qualifiers: &[Qualifier],
    ) -> Result<()> {
        let keys: Vec<ComponentKey> = if qualifiers.is_empty() {
            vec![key]
        } else {
            qualifiers
                .iter()
                .map(|q| key.clone().with_qualifier(Some(q.clone())))
                .collect()
        };

        for key in keys {
            let registration = Registration {
                key,
                supplier: supplier.clone(),
                scope,
            };
            self.registry.register(registration, self.settings.allow_override)?;
        }
        Ok(())
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContainerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut scopes: Vec<&str> = self.scopes.keys().map(ScopeTag::name).collect();
        scopes.sort_unstable();
        f.debug_struct("ContainerConfig")
            .field("bindings", &self.registry.len())
            .field("scopes", &scopes)
            .field("settings", &self.settings)
            .finish()
    }
}
