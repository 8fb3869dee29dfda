//! Modules: named groups of related bindings.
//!
//! # Examples
//! ```
//! use weld_container::prelude::*;
//!
//! struct Settings {
//!     url: String,
//! }
//!
//! struct StorageModule;
//!
//! impl Module for StorageModule {
//!     fn configure(&self, config: &mut ContainerConfig) -> Result<()> {
//!         config.bind_value(Settings { url: "postgres://localhost".into() }, &[])?;
//!         Ok(())
//!     }
//! }
//!
//! let mut config = ContainerConfig::new();
//! config.install(&StorageModule)?;
//! let container = config.seal()?;
//! assert!(container.get::<Settings>()?.is_some());
//! # Ok::<(), WeldError>(())
//! ```

use crate::config::ContainerConfig;
use crate::error::Result;

/// Registers a set of related bindings into a configuration.
///
/// Split bindings by concern and install each module on the
/// configuration instead of growing one large setup function.
pub trait Module: Send + Sync {
    /// Adds this module's bindings. Called once per install.
    fn configure(&self, config: &mut ContainerConfig) -> Result<()>;

    /// Human-readable name for logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
