//! # Weld: a validating dependency injection container
//!
//! Bindings are declared as plain values, checked as a whole graph before
//! anything is built, then served by an immutable, thread-safe container.
//!
//! - components describe their injection points through [`Component`](prelude::Component)
//! - qualifiers and scopes are [`Tag`](prelude::Tag) values passed at bind time
//! - missing bindings and hard cycles fail on `seal()`, not on first use
//! - [`Lazy<T>`](prelude::Lazy) dependencies break cycles on purpose
//!
//! # Quick start
//! ```
//! use std::sync::Arc;
//! use weld::prelude::*;
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
//! struct Car {
//!     engine: Arc<dyn Engine>,
//! }
//! impl Component for Car {
//!     fn describe(meta: &mut ComponentMeta<Self>) {
//!         meta.inject_constructor(|args| Ok(Car { engine: args.next()? }))
//!             .param(Param::of::<dyn Engine>());
//!     }
//! }
//!
//! let mut config = ContainerConfig::new();
//! config
//!     .bind::<dyn Engine, V8>(&[Tag::singleton()])?
//!     .bind::<Car, Car>(&[])?;
//! let container = config.seal()?;
//!
//! let car = container.get::<Car>()?.expect("Car is bound");
//! assert_eq!(car.engine.name(), "V8");
//! # Ok::<(), WeldError>(())
//! ```

pub use weld_container::*;
pub use weld_support::*;
