//! The Car/Engine scenario end to end.
//!
//! Run with `RUST_LOG=debug cargo run --example car` to see bindings,
//! validation and resolution traced.

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;
use weld::prelude::*;

trait Engine: Send + Sync {
    fn name(&self) -> &str;
}

trait Car: Send + Sync {
    fn summary(&self) -> String;
}

struct V8Engine;

impl Engine for V8Engine {
    fn name(&self) -> &str {
        "V8"
    }
}

impl Component for V8Engine {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| V8Engine).scope(ScopeTag::SINGLETON);
    }
}

struct V6Engine;

impl Engine for V6Engine {
    fn name(&self) -> &str {
        "V6"
    }
}

impl Component for V6Engine {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.default_constructor(|| V6Engine);
    }
}

implements!(V8Engine => dyn Engine, V6Engine => dyn Engine);

struct Sedan {
    engine: Arc<dyn Engine>,
    spare: Option<Lazy<dyn Engine>>,
}

impl Car for Sedan {
    fn summary(&self) -> String {
        let spare = match self.spare.as_ref().map(Lazy::get) {
            Some(Ok(engine)) => engine.name().to_owned(),
            Some(Err(err)) => format!("unavailable ({err})"),
            None => "none".to_owned(),
        };
        format!("sedan with a {} engine, spare: {spare}", self.engine.name())
    }
}

impl Component for Sedan {
    fn describe(meta: &mut ComponentMeta<Self>) {
        meta.inject_constructor(|args| {
            Ok(Sedan {
                engine: args.next()?,
                spare: None,
            })
        })
        .param(Param::of::<dyn Engine>());
        meta.inject_field("spare", Param::lazy::<dyn Engine>(), |this, args| {
            this.spare = Some(args.next_lazy()?);
            Ok(())
        })
        .qualified(Qualifier::named("v6"));
    }
}

implements!(Sedan => dyn Car);

struct EngineModule;

impl Module for EngineModule {
    fn configure(&self, config: &mut ContainerConfig) -> Result<()> {
        config
            .bind::<dyn Engine, V8Engine>(&[])?
            .bind::<dyn Engine, V6Engine>(&[Tag::named("v6")])?;
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut config = ContainerConfig::new();
    config.install(&EngineModule)?.bind::<dyn Car, Sedan>(&[])?;
    let container = config.seal()?;

    if let Some(car) = container.get::<dyn Car>()? {
        info!(car = %car.summary(), "Resolved car");
        println!("{}", car.summary());
    }

    if let Some(v6) = container.get_qualified::<dyn Engine>(Qualifier::named("v6"))? {
        println!("qualified engine: {}", v6.name());
    }

    // An unbound qualifier is absent, never guessed.
    let v12 = container.get_qualified::<dyn Engine>(Qualifier::named("v12"))?;
    println!("v12 bound: {}", v12.is_some());

    Ok(())
}
