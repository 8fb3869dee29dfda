//! Binding keys and qualifiers.
//!
//! A [`ComponentKey`] is the registry slot: a component type ([`TypeId`])
//! plus an optional [`Qualifier`]. The unqualified key is a distinct slot
//! of its own.

use std::any::{TypeId, type_name};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};

use weld_support::rendering::shorten_type_name;

/// Kind used by [`Qualifier::named`].
pub const NAMED: &str = "named";

/// Distinguishes several bindings of the same component type.
///
/// A qualifier is a `(kind, value)` pair compared by value. The `named`
/// kind is always recognized; other kinds must be registered on the
/// configuration before they can be used at bind time.
///
/// # Examples
/// ```
/// use weld_container::key::Qualifier;
///
/// let v6 = Qualifier::named("v6");
/// assert_eq!(v6.kind(), "named");
/// assert_eq!(v6.value(), "v6");
/// assert_eq!(v6, Qualifier::named(String::from("v6")));
/// assert_ne!(v6, Qualifier::new("profile", "v6"));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Qualifier {
    kind: &'static str,
    value: Cow<'static, str>,
}

impl Qualifier {
    /// Creates a qualifier of an arbitrary kind.
    pub fn new(kind: &'static str, value: impl Into<Cow<'static, str>>) -> Self {
        Self { kind, value: value.into() }
    }

    /// Creates a qualifier of the built-in `named` kind.
    pub fn named(value: impl Into<Cow<'static, str>>) -> Self {
        Self::new(NAMED, value)
    }

    #[inline]
    pub fn kind(&self) -> &'static str {
        self.kind
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}({:?})", self.kind, self.value)
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Identifies a registry slot: component type plus optional qualifier.
///
/// # Examples
/// ```
/// use weld_container::key::{ComponentKey, Qualifier};
///
/// let plain = ComponentKey::of::<String>();
/// assert_eq!(plain.qualifier(), None);
///
/// let primary = ComponentKey::qualified::<String>(Qualifier::named("primary"));
/// assert_ne!(plain, primary);
/// assert_eq!(primary.unqualified(), plain);
/// ```
#[derive(Clone)]
pub struct ComponentKey {
    type_id: TypeId,
    type_name: &'static str,
    qualifier: Option<Qualifier>,
}

impl ComponentKey {
    /// Creates the unqualified key for `T`.
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::from_raw(TypeId::of::<T>(), type_name::<T>())
    }

    /// Creates the key for `T` under `qualifier`.
    #[inline]
    pub fn qualified<T: ?Sized + 'static>(qualifier: Qualifier) -> Self {
        Self::of::<T>().with_qualifier(Some(qualifier))
    }

    /// Creates an unqualified key from a raw [`TypeId`] and type name.
    #[inline]
    pub fn from_raw(type_id: TypeId, type_name: &'static str) -> Self {
        Self { type_id, type_name, qualifier: None }
    }

    /// Returns the same component type under another qualifier.
    #[must_use]
    pub fn with_qualifier(mut self, qualifier: Option<Qualifier>) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// Drops the qualifier.
    #[must_use]
    pub fn unqualified(&self) -> Self {
        self.clone().with_qualifier(None)
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the fully qualified Rust type name.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the type name with module paths stripped.
    pub fn short_name(&self) -> String {
        shorten_type_name(self.type_name)
    }

    #[inline]
    pub fn qualifier(&self) -> Option<&Qualifier> {
        self.qualifier.as_ref()
    }
}

// type_name is for display only
impl PartialEq for ComponentKey {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.qualifier == other.qualifier
    }
}

impl Eq for ComponentKey {}

impl Hash for ComponentKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.qualifier.hash(state);
    }
}

impl fmt::Debug for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "ComponentKey({}, {q:?})", self.type_name),
            None => write!(f, "ComponentKey({})", self.type_name),
        }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{} {q}", self.short_name()),
            None => write!(f, "{}", self.short_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Wheel;
    trait Engine {}

    #[test]
    fn unqualified_keys_of_same_type_are_equal() {
        assert_eq!(ComponentKey::of::<Wheel>(), ComponentKey::of::<Wheel>());
        assert_ne!(ComponentKey::of::<Wheel>(), ComponentKey::of::<String>());
    }

    #[test]
    fn qualifier_is_part_of_identity() {
        let x = ComponentKey::qualified::<Wheel>(Qualifier::named("x"));
        let y = ComponentKey::qualified::<Wheel>(Qualifier::named("y"));
        assert_ne!(x, y);
        assert_ne!(x, ComponentKey::of::<Wheel>());
        assert_eq!(x, ComponentKey::qualified::<Wheel>(Qualifier::named("x")));
    }

    #[test]
    fn qualifier_kind_matters() {
        assert_ne!(Qualifier::named("a"), Qualifier::new("tier", "a"));
    }

    #[test]
    fn keys_index_a_map() {
        let mut map = HashMap::new();
        map.insert(ComponentKey::of::<Wheel>(), 1);
        map.insert(ComponentKey::qualified::<Wheel>(Qualifier::named("spare")), 2);
        assert_eq!(map.get(&ComponentKey::of::<Wheel>()), Some(&1));
        assert_eq!(
            map.get(&ComponentKey::qualified::<Wheel>(Qualifier::named("spare"))),
            Some(&2)
        );
        assert_eq!(map.get(&ComponentKey::qualified::<Wheel>(Qualifier::named("x"))), None);
    }

    #[test]
    fn trait_objects_have_keys() {
        let key = ComponentKey::of::<dyn Engine>();
        assert!(key.type_name().contains("Engine"));
        assert_eq!(key.to_string(), "dyn Engine");
    }

    #[test]
    fn display_includes_qualifier() {
        let key = ComponentKey::qualified::<Wheel>(Qualifier::named("spare"));
        assert_eq!(key.to_string(), "Wheel @named(\"spare\")");
    }
}
