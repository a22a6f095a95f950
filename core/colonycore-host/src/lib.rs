//! Plugin host for ColonyCore.
//!
//! [`Service`] installs [`Plugin`](colonycore_pluginapi::Plugin)s atomically
//! into a [`MemoryStore`](colonycore_store::MemoryStore): their rules join
//! the engine, their dataset templates are bound and exposed through the
//! [`Catalog`]. The [`export`] module runs those templates in the background
//! and writes the results to an object store.

mod config;
mod error;
pub mod export;
mod service;
mod template;

pub use config::{ColonyConfig, HostConfig, WorkerConfig};
pub use error::{ExportError, HostError, HostResult, ParameterError};
pub use service::{Catalog, PluginMetadata, PluginRegistry, Service};
pub use template::HostTemplate;
