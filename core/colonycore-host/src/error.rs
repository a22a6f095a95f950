//! Error types for the plugin host and export worker.

use colonycore_pluginapi::RegistryError;
use colonycore_pluginapi::dataset::Format;
use colonycore_store::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for host operations.
pub type HostResult<T> = Result<T, HostError>;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("plugin {0} already registered")]
    PluginAlreadyRegistered(String),

    #[error("entity model major mismatch: host={host}, {subject} requires {required}")]
    EntityModelMismatch {
        host: u32,
        subject: String,
        required: u32,
    },

    #[error("dataset template {slug} declares entity model major {template} but plugin declares {plugin}")]
    TemplateModelConflict {
        slug: String,
        template: u32,
        plugin: u32,
    },

    /// `Plugin::register` returned an error.
    #[error("plugin {plugin} failed to register: {source}")]
    Registration {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    /// The registry rejected one of the plugin's contributions.
    #[error("plugin {plugin}: {source}")]
    Registry {
        plugin: String,
        #[source]
        source: RegistryError,
    },

    #[error("bind dataset {key}: {source}")]
    Bind {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("dataset template {0} already installed")]
    DuplicateTemplate(String),

    #[error("dataset template not bound")]
    NotBound,

    #[error("parameter validation failed: {}", ParameterError::join(.0))]
    InvalidParameters(Vec<ParameterError>),

    #[error("dataset run failed: {0}")]
    Run(#[source] anyhow::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One rejected dataset parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterError {
    pub name: String,
    pub message: String,
}

impl ParameterError {
    pub(crate) fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    fn join(errors: &[Self]) -> String {
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// Failures surfaced by the export worker and its object store.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("template slug required")]
    MissingSlug,

    #[error("dataset template {0} not found")]
    TemplateNotFound(String),

    #[error("unsupported dataset format {0:?}")]
    UnknownFormat(String),

    #[error("format {format} not supported by template")]
    UnsupportedFormat { format: Format },

    #[error("export queue full")]
    QueueFull,

    #[error("export worker stopped")]
    Stopped,

    #[error("object {0} already exists")]
    ObjectExists(String),

    #[error("object {0} not found")]
    ObjectNotFound(String),
}
