//! Injection point introspection.
//!
//! Turns the raw [`ComponentMeta`] of a component into an
//! [`InjectableDescriptor`]: one construction point, then field points and
//! method points in base-to-derived order, each with its dependency
//! references. Descriptors are built once at bind time.
//!
//! Method override rules, by method name:
//! - the most-derived level that declares a name owns it;
//! - if that declaration is marked for injection it runs once;
//! - if it is a plain method, every marked declaration above it is
//!   suppressed.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::trace;

use crate::args::Args;
use crate::dependency::Dependency;
use crate::error::{BoxError, Result, WeldError};
use crate::meta::{Component, ComponentMeta, ConstructFn, InjectFn, Level, Param};
use crate::scope::ScopeTag;

/// How the component itself is created.
pub struct ConstructionPoint<T> {
    dependencies: Vec<Dependency>,
    build: ConstructFn<T>,
}

impl<T> ConstructionPoint<T> {
    #[inline]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn construct(&self, args: &mut Args) -> std::result::Result<T, BoxError> {
        (self.build)(args)
    }
}

/// A field populated after construction.
pub struct FieldPoint<T> {
    name: &'static str,
    dependency: Dependency,
    assign: InjectFn<T>,
}

impl<T> FieldPoint<T> {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn dependency(&self) -> &Dependency {
        &self.dependency
    }

    pub fn inject(&self, instance: &mut T, args: &mut Args) -> std::result::Result<(), BoxError> {
        (self.assign)(instance, args)
    }
}

/// A method invoked after field injection.
pub struct MethodPoint<T> {
    name: &'static str,
    owner: &'static str,
    dependencies: Vec<Dependency>,
    call: InjectFn<T>,
}

impl<T> MethodPoint<T> {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The type whose declaration is invoked.
    #[inline]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    #[inline]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn inject(&self, instance: &mut T, args: &mut Args) -> std::result::Result<(), BoxError> {
        (self.call)(instance, args)
    }
}

/// Validated, immutable recipe for building one component type.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use weld_container::dependency::Dependency;
/// use weld_container::introspect::InjectableDescriptor;
/// use weld_container::meta::{Component, ComponentMeta, Param};
///
/// struct Greeter {
///     greeting: Arc<String>,
/// }
///
/// impl Component for Greeter {
///     fn describe(meta: &mut ComponentMeta<Self>) {
///         meta.inject_constructor(|args| Ok(Greeter { greeting: args.next()? }))
///             .param(Param::of::<String>());
///     }
/// }
///
/// let descriptor = InjectableDescriptor::<Greeter>::inspect().unwrap();
/// assert_eq!(descriptor.dependencies(), &[Dependency::of::<String>()]);
/// ```
pub struct InjectableDescriptor<T> {
    component: &'static str,
    constructor: ConstructionPoint<T>,
    fields: Vec<FieldPoint<T>>,
    methods: Vec<MethodPoint<T>>,
    dependencies: Vec<Dependency>,
    scope: Option<ScopeTag>,
}

impl<T: Component> InjectableDescriptor<T> {
    /// Collects and validates the declaration of `T`.
    ///
    /// # Errors
    /// - [`WeldError::IllegalComponent`] for an abstract type, a missing
    ///   constructor, more than one parent or scope, an immutable field, a
    ///   generic method, or a point with several qualifiers
    /// - [`WeldError::AmbiguousConstructor`] when several constructors are
    ///   marked
    pub fn inspect() -> Result<Self> {
        Self::from_meta(ComponentMeta::collect())
    }
}

impl<T: 'static> InjectableDescriptor<T> {
    pub(crate) fn from_meta(meta: ComponentMeta<T>) -> Result<Self> {
        let component = meta.type_name;

        if meta.is_abstract {
            return Err(WeldError::illegal_component(component, "abstract types cannot be instantiated"));
        }
        if meta.parents > 1 {
            return Err(WeldError::illegal_component(
                component,
                format!("extends {} parents, at most one is allowed", meta.parents),
            ));
        }
        if meta.scopes.len() > 1 {
            return Err(WeldError::illegal_component(
                component,
                format!("declares {} scopes, at most one is allowed", meta.scopes.len()),
            ));
        }
        let scope = meta.scopes.first().copied();

        let ComponentMeta {
            constructors,
            default_constructor,
            ..
        } = &meta;
        let constructor = match (constructors.len(), default_constructor) {
            (0, Some(build)) => ConstructionPoint {
                dependencies: Vec::new(),
                build: build.clone(),
            },
            (0, None) => {
                return Err(WeldError::illegal_component(
                    component,
                    "no constructor is marked for injection and no zero-argument constructor is provided",
                ));
            }
            (1, _) => {
                let decl = &constructors[0];
                ConstructionPoint {
                    dependencies: params_to_dependencies(component, "constructor", &decl.params)?,
                    build: decl.build.clone(),
                }
            }
            (count, _) => return Err(WeldError::AmbiguousConstructor { component, count }),
        };

        let levels = meta.into_levels();
        let fields = collect_fields(component, &levels)?;
        let methods = collect_methods(component, levels)?;

        let mut dependencies = Vec::new();
        let mut seen = HashSet::new();
        let all = constructor
            .dependencies
            .iter()
            .chain(fields.iter().map(|f| &f.dependency))
            .chain(methods.iter().flat_map(|m| m.dependencies.iter()));
        for dependency in all {
            if seen.insert(dependency.clone()) {
                dependencies.push(dependency.clone());
            }
        }

        trace!(
            component,
            fields = fields.len(),
            methods = methods.len(),
            dependencies = dependencies.len(),
            "Inspected component"
        );

        Ok(Self {
            component,
            constructor,
            fields,
            methods,
            dependencies,
            scope,
        })
    }

    /// Full type name of the component.
    #[inline]
    pub fn component(&self) -> &'static str {
        self.component
    }

    #[inline]
    pub fn constructor(&self) -> &ConstructionPoint<T> {
        &self.constructor
    }

    #[inline]
    pub fn fields(&self) -> &[FieldPoint<T>] {
        &self.fields
    }

    #[inline]
    pub fn methods(&self) -> &[MethodPoint<T>] {
        &self.methods
    }

    /// Constructor, field and method dependencies in that order, without
    /// duplicates.
    #[inline]
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Scope declared on the type itself, if any.
    #[inline]
    pub fn scope(&self) -> Option<ScopeTag> {
        self.scope
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.fields.iter().map(|f| f.name).collect()
    }

    pub fn method_names(&self) -> Vec<&'static str> {
        self.methods.iter().map(|m| m.name).collect()
    }
}

impl<T> fmt::Debug for InjectableDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectableDescriptor")
            .field("component", &self.component)
            .field("fields", &self.fields.iter().map(|p| p.name).collect::<Vec<_>>())
            .field("methods", &self.methods.iter().map(|p| p.name).collect::<Vec<_>>())
            .field("dependencies", &self.dependencies)
            .field("scope", &self.scope)
            .finish()
    }
}

fn param_to_dependency(component: &'static str, point: &str, param: &Param) -> Result<Dependency> {
    if param.qualifiers().len() > 1 {
        let names: Vec<String> = param.qualifiers().iter().map(ToString::to_string).collect();
        return Err(WeldError::illegal_component(
            component,
            format!("{point} has more than one qualifier: {}", names.join(", ")),
        ));
    }
    let key = param.key().clone().with_qualifier(param.qualifiers().first().cloned());
    Ok(Dependency::new(key, param.wrapper()))
}

fn params_to_dependencies(component: &'static str, point: &str, params: &[Param]) -> Result<Vec<Dependency>> {
    params
        .iter()
        .map(|param| param_to_dependency(component, point, param))
        .collect()
}

fn collect_fields<T>(component: &'static str, levels: &[Level<T>]) -> Result<Vec<FieldPoint<T>>> {
    let mut fields = Vec::new();
    for level in levels {
        for decl in &level.fields {
            let point = format!("field '{}'", decl.name);
            if decl.immutable {
                return Err(WeldError::illegal_component(
                    component,
                    format!("{point} is immutable and cannot be injected"),
                ));
            }
            fields.push(FieldPoint {
                name: decl.name,
                dependency: param_to_dependency(component, &point, &decl.param)?,
                assign: decl.assign.clone(),
            });
        }
    }
    Ok(fields)
}

fn collect_methods<T>(component: &'static str, levels: Vec<Level<T>>) -> Result<Vec<MethodPoint<T>>> {
    // name -> index of the most-derived level declaring it
    let mut owners: HashMap<&'static str, usize> = HashMap::new();
    for (depth, level) in levels.iter().enumerate() {
        let mut names = HashSet::new();
        for decl in &level.methods {
            if !names.insert(decl.name) {
                return Err(WeldError::illegal_component(
                    component,
                    format!("method '{}' is declared twice by {}", decl.name, level.owner),
                ));
            }
            owners.insert(decl.name, depth);
        }
    }

    let mut methods = Vec::new();
    for (depth, level) in levels.into_iter().enumerate() {
        for decl in level.methods {
            if owners.get(decl.name) != Some(&depth) {
                continue;
            }
            let Some(call) = decl.call else { continue };

            let point = format!("method '{}'", decl.name);
            if !decl.type_parameters.is_empty() {
                return Err(WeldError::illegal_component(
                    component,
                    format!("{point} has type parameters <{}>", decl.type_parameters.join(", ")),
                ));
            }
            methods.push(MethodPoint {
                name: decl.name,
                owner: level.owner,
                dependencies: params_to_dependencies(component, &point, &decl.params)?,
                call,
            });
        }
    }
    Ok(methods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{
        CarImpl, Dashboard, Engine, MethodCounter, OrderedSub, SubWithInjectedOverride,
        SubWithPlainOverride, V8Impl,
    };
    use crate::key::Qualifier;
    use std::sync::Arc;

    fn illegal_reason<T: Component>() -> String {
        match InjectableDescriptor::<T>::inspect() {
            Err(WeldError::IllegalComponent { reason, .. }) => reason,
            other => panic!("Expected IllegalComponent, got: {other:?}"),
        }
    }

    struct Abstract;
    impl Component for Abstract {
        fn describe(meta: &mut ComponentMeta<Self>) {
            meta.default_constructor(|| Abstract).abstract_type();
        }
    }

    struct NoConstructor;
    impl Component for NoConstructor {
        fn describe(_meta: &mut ComponentMeta<Self>) {}
    }

    struct TwoConstructors;
    impl Component for TwoConstructors {
        fn describe(meta: &mut ComponentMeta<Self>) {
            meta.inject_constructor(|_| Ok(TwoConstructors));
            meta.inject_constructor(|_| Ok(TwoConstructors))
                .param(Param::of::<String>());
        }
    }

    struct FrozenField {
        _name: Option<Arc<String>>,
    }
    impl Component for FrozenField {
        fn describe(meta: &mut ComponentMeta<Self>) {
            meta.default_constructor(|| FrozenField { _name: None });
            meta.inject_field("name", Param::of::<String>(), |this, args| {
                this._name = Some(args.next()?);
                Ok(())
            })
            .immutable();
        }
    }

    struct GenericMethod;
    impl Component for GenericMethod {
        fn describe(meta: &mut ComponentMeta<Self>) {
            meta.default_constructor(|| GenericMethod);
            meta.inject_method("accept", |_, _| Ok(()))
                .type_parameter("T");
        }
    }

    struct DoubleQualified;
    impl Component for DoubleQualified {
        fn describe(meta: &mut ComponentMeta<Self>) {
            meta.inject_constructor(|_| Ok(DoubleQualified)).param(
                Param::of::<dyn Engine>()
                    .qualified(Qualifier::named("v6"))
                    .qualified(Qualifier::named("v8")),
            );
        }
    }

    struct TwoScopes;
    impl Component for TwoScopes {
        fn describe(meta: &mut ComponentMeta<Self>) {
            meta.default_constructor(|| TwoScopes)
                .scope(ScopeTag::SINGLETON)
                .scope(ScopeTag::POOLED);
        }
    }

    struct TwoParents {
        a: MethodCounter,
        b: MethodCounter,
    }
    impl Component for TwoParents {
        fn describe(meta: &mut ComponentMeta<Self>) {
            meta.default_constructor(|| TwoParents {
                a: MethodCounter::default(),
                b: MethodCounter::default(),
            })
            .extends::<MethodCounter>(|s| &mut s.a)
            .extends::<MethodCounter>(|s| &mut s.b);
        }
    }

    struct RepeatedDependency;
    impl Component for RepeatedDependency {
        fn describe(meta: &mut ComponentMeta<Self>) {
            meta.inject_constructor(|_| Ok(RepeatedDependency))
                .param(Param::of::<String>())
                .param(Param::lazy::<String>());
            meta.inject_field("again", Param::of::<String>(), |_, _| Ok(()));
            meta.inject_method("more", |_, _| Ok(()))
                .param(Param::of::<u32>())
                .param(Param::of::<String>());
        }
    }

    #[test]
    fn constructor_dependencies_in_order() {
        let descriptor = InjectableDescriptor::<CarImpl>::inspect().unwrap();
        assert_eq!(descriptor.constructor().dependencies(), &[Dependency::of::<dyn Engine>()]);
        assert!(descriptor.fields().is_empty());
        assert!(descriptor.methods().is_empty());
        assert!(descriptor.component().ends_with("CarImpl"));
    }

    #[test]
    fn default_constructor_without_marks() {
        let descriptor = InjectableDescriptor::<V8Impl>::inspect().unwrap();
        assert!(descriptor.constructor().dependencies().is_empty());
        assert!(descriptor.dependencies().is_empty());
    }

    #[test]
    fn dependencies_union_is_deduplicated() {
        let descriptor = InjectableDescriptor::<RepeatedDependency>::inspect().unwrap();
        assert_eq!(
            descriptor.dependencies(),
            &[
                Dependency::of::<String>(),
                Dependency::lazy::<String>(),
                Dependency::of::<u32>(),
            ]
        );
    }

    #[test]
    fn field_and_method_points_are_listed() {
        let descriptor = InjectableDescriptor::<Dashboard>::inspect().unwrap();
        assert_eq!(descriptor.field_names(), vec!["engine"]);
        assert_eq!(descriptor.method_names(), vec!["label"]);
        assert_eq!(
            descriptor.dependencies(),
            &[Dependency::of::<dyn Engine>(), Dependency::of::<String>()]
        );
    }

    #[test]
    fn points_run_base_to_derived() {
        let descriptor = InjectableDescriptor::<OrderedSub>::inspect().unwrap();
        assert_eq!(descriptor.field_names(), vec!["base_engine", "sub_engine"]);
        assert_eq!(descriptor.method_names(), vec!["base_step", "sub_step"]);
        assert!(descriptor.methods()[0].owner().ends_with("OrderedBase"));
        assert!(descriptor.methods()[1].owner().ends_with("OrderedSub"));
    }

    #[test]
    fn base_method_is_injected_once() {
        let descriptor = InjectableDescriptor::<MethodCounter>::inspect().unwrap();
        assert_eq!(descriptor.method_names(), vec!["init"]);
    }

    #[test]
    fn remarked_override_replaces_base_method() {
        let descriptor = InjectableDescriptor::<SubWithInjectedOverride>::inspect().unwrap();
        assert_eq!(descriptor.method_names(), vec!["init"]);
        assert!(descriptor.methods()[0].owner().ends_with("SubWithInjectedOverride"));
    }

    #[test]
    fn plain_override_suppresses_base_method() {
        let descriptor = InjectableDescriptor::<SubWithPlainOverride>::inspect().unwrap();
        assert!(descriptor.methods().is_empty());
    }

    #[test]
    fn abstract_type_is_rejected() {
        assert!(illegal_reason::<Abstract>().contains("abstract"));
    }

    #[test]
    fn missing_constructor_is_rejected() {
        assert!(illegal_reason::<NoConstructor>().contains("zero-argument"));
    }

    #[test]
    fn two_marked_constructors_are_ambiguous() {
        match InjectableDescriptor::<TwoConstructors>::inspect() {
            Err(WeldError::AmbiguousConstructor { count, .. }) => assert_eq!(count, 2),
            other => panic!("Expected AmbiguousConstructor, got: {other:?}"),
        }
    }

    #[test]
    fn immutable_field_is_rejected() {
        assert!(illegal_reason::<FrozenField>().contains("immutable"));
    }

    #[test]
    fn generic_method_is_rejected() {
        assert!(illegal_reason::<GenericMethod>().contains("type parameters <T>"));
    }

    #[test]
    fn two_qualifiers_on_one_point_are_rejected() {
        assert!(illegal_reason::<DoubleQualified>().contains("more than one qualifier"));
    }

    #[test]
    fn two_scopes_are_rejected() {
        assert!(illegal_reason::<TwoScopes>().contains("scopes"));
    }

    #[test]
    fn two_parents_are_rejected() {
        assert!(illegal_reason::<TwoParents>().contains("parents"));
    }
}
