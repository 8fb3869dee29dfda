//! Declared shape of a component.
//!
//! Rust has no runtime reflection, so a component describes its own
//! injection points through [`Component::describe`]. The description is
//! raw: it may contain illegal points (two marked constructors, an
//! immutable field, a generic method...). Turning it into a validated
//! [`InjectableDescriptor`](crate::introspect::InjectableDescriptor) is the
//! job of the introspector.
//!
//! # Examples
//! ```
//! use std::sync::Arc;
//! use weld_container::meta::{Component, ComponentMeta, Param};
//!
//! struct Greeting(Arc<String>);
//!
//! impl Component for Greeting {
//!     fn describe(meta: &mut ComponentMeta<Self>) {
//!         meta.inject_constructor(|args| Ok(Greeting(args.next()?)))
//!             .param(Param::of::<String>());
//!     }
//! }
//! ```

use std::any::type_name;
use std::sync::Arc;

use crate::args::Args;
use crate::dependency::Wrapper;
use crate::error::BoxError;
use crate::key::{ComponentKey, Qualifier};
use crate::scope::ScopeTag;

pub(crate) type ConstructFn<T> = Arc<dyn Fn(&mut Args) -> Result<T, BoxError> + Send + Sync>;
pub(crate) type InjectFn<T> = Arc<dyn Fn(&mut T, &mut Args) -> Result<(), BoxError> + Send + Sync>;

/// An implementation the container can build.
pub trait Component: Sized + Send + Sync + 'static {
    /// Declares constructors, fields, methods, parent and scope.
    fn describe(meta: &mut ComponentMeta<Self>);
}

/// One requested value of an injection point.
///
/// Qualifiers accumulate; the introspector rejects a param with more than
/// one.
#[derive(Debug, Clone)]
pub struct Param {
    key: ComponentKey,
    qualifiers: Vec<Qualifier>,
    wrapper: Wrapper,
}

impl Param {
    /// Requests an instance of `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            key: ComponentKey::of::<T>(),
            qualifiers: Vec::new(),
            wrapper: Wrapper::None,
        }
    }

    /// Requests a [`Lazy`](crate::args::Lazy) handle to `T`.
    pub fn lazy<T: ?Sized + 'static>() -> Self {
        Self {
            wrapper: Wrapper::Lazy,
            ..Self::of::<T>()
        }
    }

    #[must_use]
    pub fn qualified(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.push(qualifier);
        self
    }

    pub(crate) fn key(&self) -> &ComponentKey {
        &self.key
    }

    pub(crate) fn qualifiers(&self) -> &[Qualifier] {
        &self.qualifiers
    }

    pub(crate) fn wrapper(&self) -> Wrapper {
        self.wrapper
    }
}

/// A constructor marked for injection.
pub struct ConstructorDecl<T> {
    pub(crate) params: Vec<Param>,
    pub(crate) build: ConstructFn<T>,
}

impl<T> ConstructorDecl<T> {
    /// Appends a parameter; arguments arrive in this order.
    pub fn param(&mut self, param: Param) -> &mut Self {
        self.params.push(param);
        self
    }
}

/// A field marked for injection.
pub struct FieldDecl<T> {
    pub(crate) name: &'static str,
    pub(crate) param: Param,
    pub(crate) immutable: bool,
    pub(crate) assign: InjectFn<T>,
}

impl<T: 'static> FieldDecl<T> {
    /// Adds a qualifier to the field's dependency.
    pub fn qualified(&mut self, qualifier: Qualifier) -> &mut Self {
        self.param.qualifiers.push(qualifier);
        self
    }

    /// Declares the field constant after construction, which makes it
    /// illegal to inject.
    pub fn immutable(&mut self) -> &mut Self {
        self.immutable = true;
        self
    }

    fn lift<D: 'static>(self, accessor: fn(&mut D) -> &mut T) -> FieldDecl<D> {
        let assign = self.assign;
        FieldDecl {
            name: self.name,
            param: self.param,
            immutable: self.immutable,
            assign: Arc::new(move |this: &mut D, args: &mut Args| assign(accessor(this), args)),
        }
    }
}

/// A method, marked for injection or not.
///
/// Unmarked methods only matter as overrides: declaring one with the name of
/// an injected method of the parent suppresses the parent's call.
pub struct MethodDecl<T> {
    pub(crate) name: &'static str,
    pub(crate) params: Vec<Param>,
    pub(crate) type_parameters: Vec<&'static str>,
    pub(crate) call: Option<InjectFn<T>>,
}

impl<T: 'static> MethodDecl<T> {
    pub fn param(&mut self, param: Param) -> &mut Self {
        self.params.push(param);
        self
    }

    /// Declares an open type parameter on the method.
    pub fn type_parameter(&mut self, name: &'static str) -> &mut Self {
        self.type_parameters.push(name);
        self
    }

    fn lift<D: 'static>(self, accessor: fn(&mut D) -> &mut T) -> MethodDecl<D> {
        let call = self.call.map(|call| -> InjectFn<D> {
            Arc::new(move |this: &mut D, args: &mut Args| call(accessor(this), args))
        });
        MethodDecl {
            name: self.name,
            params: self.params,
            type_parameters: self.type_parameters,
            call,
        }
    }
}

/// Fields and methods declared by one type of a hierarchy.
pub(crate) struct Level<T> {
    pub owner: &'static str,
    pub fields: Vec<FieldDecl<T>>,
    pub methods: Vec<MethodDecl<T>>,
}

impl<T: 'static> Level<T> {
    fn new(owner: &'static str) -> Self {
        Self {
            owner,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    fn lift<D: 'static>(self, accessor: fn(&mut D) -> &mut T) -> Level<D> {
        Level {
            owner: self.owner,
            fields: self.fields.into_iter().map(|f| f.lift(accessor)).collect(),
            methods: self.methods.into_iter().map(|m| m.lift(accessor)).collect(),
        }
    }
}

/// The raw declaration collected from [`Component::describe`].
pub struct ComponentMeta<T> {
    pub(crate) type_name: &'static str,
    pub(crate) is_abstract: bool,
    pub(crate) constructors: Vec<ConstructorDecl<T>>,
    pub(crate) default_constructor: Option<ConstructFn<T>>,
    pub(crate) ancestors: Vec<Level<T>>,
    pub(crate) parents: usize,
    pub(crate) own: Level<T>,
    pub(crate) scopes: Vec<ScopeTag>,
}

impl<T: Component> ComponentMeta<T> {
    pub(crate) fn collect() -> Self {
        let mut meta = Self::empty();
        T::describe(&mut meta);
        meta
    }
}

impl<T: 'static> ComponentMeta<T> {
    fn empty() -> Self {
        let type_name = type_name::<T>();
        Self {
            type_name,
            is_abstract: false,
            constructors: Vec::new(),
            default_constructor: None,
            ancestors: Vec::new(),
            parents: 0,
            own: Level::new(type_name),
            scopes: Vec::new(),
        }
    }

    /// Marks a constructor for injection. Declare its parameters on the
    /// returned handle.
    pub fn inject_constructor(
        &mut self,
        build: impl Fn(&mut Args) -> Result<T, BoxError> + Send + Sync + 'static,
    ) -> &mut ConstructorDecl<T> {
        let idx = self.constructors.len();
        self.constructors.push(ConstructorDecl {
            params: Vec::new(),
            build: Arc::new(build),
        });
        &mut self.constructors[idx]
    }

    /// Provides the zero-argument constructor used when no constructor is
    /// marked.
    pub fn default_constructor(&mut self, build: impl Fn() -> T + Send + Sync + 'static) -> &mut Self {
        self.default_constructor = Some(Arc::new(move |_: &mut Args| Ok(build())));
        self
    }

    /// Marks a field for injection.
    pub fn inject_field(
        &mut self,
        name: &'static str,
        param: Param,
        assign: impl Fn(&mut T, &mut Args) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut FieldDecl<T> {
        let fields = &mut self.own.fields;
        let idx = fields.len();
        fields.push(FieldDecl {
            name,
            param,
            immutable: false,
            assign: Arc::new(assign),
        });
        &mut fields[idx]
    }

    /// Marks a method for injection. Declare its parameters on the
    /// returned handle.
    pub fn inject_method(
        &mut self,
        name: &'static str,
        call: impl Fn(&mut T, &mut Args) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> &mut MethodDecl<T> {
        self.push_method(name, Some(Arc::new(call)))
    }

    /// Declares a method that is not marked for injection.
    pub fn method(&mut self, name: &'static str) -> &mut MethodDecl<T> {
        self.push_method(name, None)
    }

    /// Inherits the injection points of `P`, reached through `accessor`.
    ///
    /// Parent points run before this component's own points. A component
    /// may extend at most one parent.
    pub fn extends<P: Component>(&mut self, accessor: fn(&mut T) -> &mut P) -> &mut Self {
        let parent = ComponentMeta::<P>::collect();
        self.parents += 1;
        self.ancestors = parent
            .into_levels()
            .into_iter()
            .map(|level| level.lift(accessor))
            .collect();
        self
    }

    /// Declares the component abstract; it can be extended but not bound.
    pub fn abstract_type(&mut self) -> &mut Self {
        self.is_abstract = true;
        self
    }

    /// Attaches a scope to the type itself. Used when the bind call names
    /// no scope.
    pub fn scope(&mut self, scope: ScopeTag) -> &mut Self {
        self.scopes.push(scope);
        self
    }

    /// Levels from the root ancestor down to `T`.
    pub(crate) fn into_levels(self) -> Vec<Level<T>> {
        let mut levels = self.ancestors;
        levels.push(self.own);
        levels
    }

    fn push_method(&mut self, name: &'static str, call: Option<InjectFn<T>>) -> &mut MethodDecl<T> {
        let methods = &mut self.own.methods;
        let idx = methods.len();
        methods.push(MethodDecl {
            name,
            params: Vec::new(),
            type_parameters: Vec::new(),
            call,
        });
        &mut methods[idx]
    }
}
