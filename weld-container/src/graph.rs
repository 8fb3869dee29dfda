//! Dependency graph validation.
//!
//! Runs once, inside [`ContainerConfig::seal`](crate::config::ContainerConfig::seal),
//! before anything is constructed:
//! - every dependency reference, lazy or not, must name a bound key
//! - hard (non-lazy) edges must not form a cycle
//!
//! Lazy edges are checked for existence but skipped during cycle
//! detection: their target is built later, on demand.

use std::collections::HashSet;

use tracing::{debug, instrument, warn};

use weld_support::rendering::suggest_similar;

use crate::error::{CyclicDependencyError, DependencyNotFoundError, Result, WeldError};
use crate::key::ComponentKey;
use crate::registry::Registry;

/// Depth-first validator over a registry.
///
/// Keeps the current DFS path for cycle reporting and a cache of keys
/// whose subgraph is already known to be valid.
pub(crate) struct GraphValidator<'a> {
    registry: &'a Registry,
    max_suggestions: usize,
    /// Currently being visited
    visiting: HashSet<ComponentKey>,
    /// Already validated
    validated: HashSet<ComponentKey>,
    /// Current DFS path
    path: Vec<ComponentKey>,
}

impl<'a> GraphValidator<'a> {
    pub fn new(registry: &'a Registry, max_suggestions: usize) -> Self {
        Self {
            registry,
            max_suggestions,
            visiting: HashSet::new(),
            validated: HashSet::new(),
            path: Vec::new(),
        }
    }

    /// Validates every registered key, in registration order.
    ///
    /// # Errors
    /// - [`WeldError::DependencyNotFound`]: a reference names an unbound key
    /// - [`WeldError::CyclicDependency`]: hard edges form a cycle
    #[instrument(skip(self), name = "graph_validation")]
    pub fn validate(&mut self) -> Result<()> {
        let registry = self.registry;
        debug!(binding_count = registry.len(), "Starting dependency graph validation");

        for key in registry.keys() {
            if !self.validated.contains(key) {
                self.visit(key)?;
            }
        }

        debug!("Dependency graph validation passed");
        Ok(())
    }

    fn visit(&mut self, key: &ComponentKey) -> Result<()> {
        if self.validated.contains(key) {
            return Ok(());
        }
        let registry = self.registry;
        let Some(registration) = registry.get(key) else {
            return Ok(());
        };

        self.visiting.insert(key.clone());
        self.path.push(key.clone());

        for dependency in registration.supplier.dependencies() {
            let dep_key = dependency.key();

            if !registry.contains(dep_key) {
                let suggestions = self.suggestions(dep_key);
                warn!(component = %key, dependency = %dependency, "Missing dependency");
                return Err(WeldError::DependencyNotFound(DependencyNotFoundError {
                    component: key.clone(),
                    dependency: dep_key.clone(),
                    suggestions,
                }));
            }

            if dependency.is_lazy() {
                continue;
            }

            if self.visiting.contains(dep_key) {
                let start = self.path.iter().position(|k| k == dep_key).unwrap_or(0);
                let path = self.path[start..].to_vec();
                warn!(cycle = ?path, "Cyclic dependency detected");
                return Err(WeldError::CyclicDependency(CyclicDependencyError { path }));
            }

            self.visit(dep_key)?;
        }

        self.path.pop();
        self.visiting.remove(key);
        self.validated.insert(key.clone());
        Ok(())
    }

    /// Same type under other qualifiers first, then similarly named types.
    fn suggestions(&self, wanted: &ComponentKey) -> Vec<String> {
        let mut out: Vec<String> = self
            .registry
            .keys()
            .iter()
            .filter(|k| k.type_id() == wanted.type_id())
            .map(ToString::to_string)
            .collect();

        let others: Vec<&str> = self
            .registry
            .type_names()
            .into_iter()
            .filter(|name| *name != wanted.type_name())
            .collect();
        out.extend(suggest_similar(wanted.type_name(), &others, self.max_suggestions));
        out.truncate(self.max_suggestions);
        out
    }
}
