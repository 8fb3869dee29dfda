//! Binding registry: stores every binding of a configuration.
//!
//! The registry maps [`ComponentKey`] to the supplier that produces
//! instances for it. Registration order is kept so that validation and
//! error reporting are deterministic.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{AlreadyRegisteredError, Result, WeldError};
use crate::key::ComponentKey;
use crate::scope::ScopeTag;
use crate::supplier::SharedSupplier;

/// Registration entry for a single binding key.
#[derive(Clone)]
pub(crate) struct Registration {
    pub key: ComponentKey,
    pub supplier: SharedSupplier,
    /// `None` for constant bindings, which are never decorated.
    pub scope: Option<ScopeTag>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("key", &self.key)
            .field("scope", &self.scope)
            .field("dependencies", &self.supplier.dependencies())
            .finish()
    }
}

/// Stores all bindings.
///
/// Populated while configuring; moved into the container on seal and
/// never mutated again.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    registrations: HashMap<ComponentKey, Registration>,
    order: Vec<ComponentKey>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a supplier for a binding key.
    ///
    /// With `allow_override` the last registration for a key wins; the key
    /// keeps its original position.
    ///
    /// # Errors
    /// Returns [`WeldError::AlreadyRegistered`] if the key is already
    /// registered and `allow_override` is false.
    pub fn register(&mut self, registration: Registration, allow_override: bool) -> Result<()> {
        let key = registration.key.clone();

        if self.registrations.contains_key(&key) {
            if !allow_override {
                return Err(WeldError::AlreadyRegistered(AlreadyRegisteredError { key }));
            }
            debug!(key = %key, "Replacing binding");
        } else {
            self.order.push(key.clone());
        }

        debug!(key = %key, scope = ?registration.scope, "Registered binding");
        self.registrations.insert(key, registration);
        Ok(())
    }

    pub fn get(&self, key: &ComponentKey) -> Option<&Registration> {
        self.registrations.get(key)
    }

    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.registrations.contains_key(key)
    }

    /// Keys in registration order.
    pub fn keys(&self) -> &[ComponentKey] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Full type names of every bound component, for suggestions.
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut seen = HashSet::new();
        self.order
            .iter()
            .map(ComponentKey::type_name)
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Qualifier;
    use crate::supplier::ConstantSupplier;
    use std::sync::Arc;

    struct Database;

    fn make_reg(key: ComponentKey) -> Registration {
        Registration {
            key,
            supplier: Arc::new(ConstantSupplier::new(Arc::new(42i32))),
            scope: None,
        }
    }

    #[test]
    fn register_and_get() {
        let mut reg = Registry::new();
        let key = ComponentKey::of::<Database>();
        reg.register(make_reg(key.clone()), false).unwrap();
        assert!(reg.get(&key).is_some());
        assert!(reg.contains(&key));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn duplicate_fails_without_override() {
        let mut reg = Registry::new();
        let key = ComponentKey::of::<Database>();
        reg.register(make_reg(key.clone()), false).unwrap();
        assert!(matches!(
            reg.register(make_reg(key), false),
            Err(WeldError::AlreadyRegistered(_))
        ));
    }

    #[test]
    fn duplicate_with_override_keeps_position() {
        let mut reg = Registry::new();
        let first = ComponentKey::of::<Database>();
        let second = ComponentKey::of::<String>();
        reg.register(make_reg(first.clone()), true).unwrap();
        reg.register(make_reg(second.clone()), true).unwrap();
        reg.register(make_reg(first.clone()), true).unwrap();

        assert_eq!(reg.keys(), &[first, second]);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn qualified_keys_are_separate_slots() {
        let mut reg = Registry::new();
        reg.register(make_reg(ComponentKey::qualified::<Database>(Qualifier::named("a"))), false)
            .unwrap();
        reg.register(make_reg(ComponentKey::qualified::<Database>(Qualifier::named("b"))), false)
            .unwrap();

        assert_eq!(reg.len(), 2);
        assert!(!reg.contains(&ComponentKey::of::<Database>()));
        assert_eq!(reg.type_names().len(), 1);
    }
}
