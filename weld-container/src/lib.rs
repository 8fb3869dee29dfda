//! Core engine of the Weld dependency injection container.
//!
//! Bindings are collected in a [`ContainerConfig`](config::ContainerConfig),
//! validated as a whole graph on seal and served by an immutable
//! [`Container`](container::Container).

pub mod args;
pub mod config;
pub mod container;
pub mod dependency;
pub mod error;
mod graph;
pub mod implements;
pub mod introspect;
pub mod key;
pub mod meta;
pub mod module;
mod registry;
pub mod scope;
pub mod supplier;
pub mod tag;

#[cfg(test)]
mod fixtures;

pub use container::prelude;
pub use error::{Result, WeldError};
pub use key::{ComponentKey, Qualifier};
pub use scope::ScopeTag;
