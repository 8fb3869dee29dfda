//! Components shared by the unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tracing_subscriber::EnvFilter;

use crate::args::Lazy;
use crate::config::ContainerConfig;
use crate::container::Container;
use crate::dependency::Dependency;
use crate::meta::{Component, ComponentMeta, Param};
use crate::scope::ScopeTag;
use crate::supplier::{FactorySupplier, SharedSupplier};

/// Routes `tracing` output to the test harness; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn empty_container() -> Container {
    ContainerConfig::new().seal().expect("empty configuration seals")
}

// === Car / Engine ===

pub trait Engine: Send + Sync {
    fn name(&self) -> &str;
}

pub trait Car: Send + Sync {
    fn engine(&self) -> Arc<dyn Engine>;
}

pub struct V8Impl;

impl Engine for V8Impl {
    fn name(&self) -> &str {
        "V8"
    }
}

impl Component for V8Impl {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| V8Impl);
    }
}

pub struct V6Impl;

impl Engine for V6Impl {
    fn name(&self) -> &str {
        "V6"
    }
}

impl Component for V6Impl {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| V6Impl);
    }
}

crate::implements!(V8Impl => dyn Engine, V6Impl => dyn Engine);

pub struct CarImpl {
    engine: Arc<dyn Engine>,
}

impl Car for CarImpl {
    fn engine(&self) -> Arc<dyn Engine> {
        self.engine.clone()
    }
}

impl Component for CarImpl {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.inject_constructor(|args| Ok(CarImpl { engine: args.next()? }))
            .param(Param::of::<dyn Engine>());
    }
}

crate::implements!(CarImpl => dyn Car);

/// Records the order in which its injection points run.
pub struct Dashboard {
    trace: Vec<&'static str>,
    engine: Option<Arc<dyn Engine>>,
    label: Option<Arc<String>>,
}

impl Dashboard {
    pub fn trace(&self) -> Vec<&'static str> {
        self.trace.clone()
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref().map(String::as_str)
    }

    pub fn engine(&self) -> Option<&Arc<dyn Engine>> {
        self.engine.as_ref()
    }
}

impl Component for Dashboard {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| Dashboard {
            trace: vec!["constructor"],
            engine: None,
            label: None,
        });
        meta.inject_field("engine", Param::of::<dyn Engine>(), |this, args| {
            this.engine = Some(args.next()?);
            this.trace.push("field:engine");
            Ok(())
        });
        meta.inject_method("label", |this, args| {
            this.label = Some(args.next()?);
            this.trace.push("method:label");
            Ok(())
        })
        .param(Param::of::<String>());
    }
}

/// Scoped singleton on the type itself.
pub struct Clock;

impl Component for Clock {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| Clock).scope(ScopeTag::SINGLETON);
    }
}

// === Method inheritance ===

#[derive(Default)]
pub struct MethodCounter {
    calls: u32,
}

impl MethodCounter {
    pub fn calls(&self) -> u32 {
        self.calls
    }
}

impl Component for MethodCounter {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(MethodCounter::default);
        meta.inject_method("init", |this, _| {
            this.calls += 1;
            Ok(())
        });
    }
}

/// Overrides `init` and marks it again.
pub struct SubWithInjectedOverride {
    base: MethodCounter,
}

impl SubWithInjectedOverride {
    pub fn calls(&self) -> u32 {
        self.base.calls
    }
}

impl Component for SubWithInjectedOverride {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| SubWithInjectedOverride {
            base: MethodCounter::default(),
        })
        .extends::<MethodCounter>(|s| &mut s.base);
        meta.inject_method("init", |this, _| {
            this.base.calls += 1;
            Ok(())
        });
    }
}

/// Overrides `init` without marking it.
pub struct SubWithPlainOverride {
    base: MethodCounter,
}

impl SubWithPlainOverride {
    pub fn calls(&self) -> u32 {
        self.base.calls
    }
}

impl Component for SubWithPlainOverride {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| SubWithPlainOverride {
            base: MethodCounter::default(),
        })
        .extends::<MethodCounter>(|s| &mut s.base);
        meta.method("init");
    }
}

#[derive(Default)]
pub struct OrderedBase {
    trace: Vec<&'static str>,
}

impl Component for OrderedBase {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(OrderedBase::default);
        meta.inject_field("base_engine", Param::of::<dyn Engine>(), |this, args| {
            args.next::<dyn Engine>()?;
            this.trace.push("base_engine");
            Ok(())
        });
        meta.inject_method("base_step", |this, _| {
            this.trace.push("base_step");
            Ok(())
        });
    }
}

pub struct OrderedSub {
    base: OrderedBase,
}

impl OrderedSub {
    pub fn trace(&self) -> Vec<&'static str> {
        self.base.trace.clone()
    }
}

impl Component for OrderedSub {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| OrderedSub {
            base: OrderedBase::default(),
        })
        .extends::<OrderedBase>(|s| &mut s.base);
        meta.inject_field("sub_engine", Param::of::<dyn Engine>(), |this, args| {
            args.next::<dyn Engine>()?;
            this.base.trace.push("sub_engine");
            Ok(())
        });
        meta.inject_method("sub_step", |this, _| {
            this.base.trace.push("sub_step");
            Ok(())
        });
    }
}

// === Cycles ===

/// Constructor edge to [`FieldB`].
pub struct CtorA {
    _b: Arc<FieldB>,
}

impl Component for CtorA {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.inject_constructor(|args| Ok(CtorA { _b: args.next()? }))
            .param(Param::of::<FieldB>());
    }
}

/// Field edge to [`CtorA`].
pub struct FieldB {
    _a: Option<Arc<CtorA>>,
}

impl Component for FieldB {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| FieldB { _a: None });
        meta.inject_field("a", Param::of::<CtorA>(), |this, args| {
            this._a = Some(args.next()?);
            Ok(())
        });
    }
}

/// Method edge to [`MethodB`].
pub struct MethodA {
    _b: Option<Arc<MethodB>>,
}

impl Component for MethodA {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| MethodA { _b: None });
        meta.inject_method("set_b", |this, args| {
            this._b = Some(args.next()?);
            Ok(())
        })
        .param(Param::of::<MethodB>());
    }
}

/// Method edge to [`MethodA`].
pub struct MethodB {
    _a: Option<Arc<MethodA>>,
}

impl Component for MethodB {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| MethodB { _a: None });
        meta.inject_method("set_a", |this, args| {
            this._a = Some(args.next()?);
            Ok(())
        })
        .param(Param::of::<MethodA>());
    }
}

/// `TriA → TriB → TriC → TriA` through constructor, field and method.
pub struct TriA {
    _b: Arc<TriB>,
}

impl Component for TriA {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.inject_constructor(|args| Ok(TriA { _b: args.next()? }))
            .param(Param::of::<TriB>());
    }
}

pub struct TriB {
    _c: Option<Arc<TriC>>,
}

impl Component for TriB {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| TriB { _c: None });
        meta.inject_field("c", Param::of::<TriC>(), |this, args| {
            this._c = Some(args.next()?);
            Ok(())
        });
    }
}

pub struct TriC {
    _a: Option<Arc<TriA>>,
}

impl Component for TriC {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| TriC { _a: None });
        meta.inject_method("set_a", |this, args| {
            this._a = Some(args.next()?);
            Ok(())
        })
        .param(Param::of::<TriA>());
    }
}

/// Depends on [`LazyB`] through a lazy handle.
pub struct LazyA {
    b: Lazy<LazyB>,
}

impl LazyA {
    pub fn b(&self) -> &Lazy<LazyB> {
        &self.b
    }

    pub fn name(&self) -> &str {
        "A"
    }
}

impl Component for LazyA {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.inject_constructor(|args| Ok(LazyA { b: args.next_lazy()? }))
            .param(Param::lazy::<LazyB>());
    }
}

/// Depends on [`LazyA`] through a lazy field.
pub struct LazyB {
    a: Option<Lazy<LazyA>>,
}

impl LazyB {
    pub fn a(&self) -> Option<&Lazy<LazyA>> {
        self.a.as_ref()
    }
}

impl Component for LazyB {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| LazyB { a: None });
        meta.inject_field("a", Param::lazy::<LazyA>(), |this, args| {
            this.a = Some(args.next_lazy()?);
            Ok(())
        });
    }
}

// === Scopes ===

pub struct Counted {
    pub id: u32,
}

/// A supplier building [`Counted`] with increasing ids. It declares a
/// `String` dependency it never resolves, so decorators can be checked for
/// forwarding it.
pub fn counting_supplier() -> (Arc<AtomicU32>, SharedSupplier) {
    let counter = Arc::new(AtomicU32::new(0));
    let supplier = FactorySupplier::<Counted>::new(vec![Dependency::of::<String>()], {
        let counter = counter.clone();
        move |_| {
            let id = counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Counted { id }))
        }
    });
    (counter, Arc::new(supplier))
}
