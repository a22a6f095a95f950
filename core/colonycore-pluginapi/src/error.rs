use thiserror::Error;

/// A builder was finalized without a required field.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{field} is required")]
pub struct BuildError {
    pub field: &'static str,
}

impl BuildError {
    pub(crate) const fn missing(field: &'static str) -> Self {
        Self { field }
    }
}

/// Structural problems with a dataset template.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("dataset template key required")]
    MissingKey,

    #[error("dataset template version required")]
    MissingVersion,

    #[error("dataset template title required")]
    MissingTitle,

    #[error("dataset template query required")]
    MissingQuery,

    #[error("dataset template requires at least one column")]
    NoColumns,

    #[error("dataset template must declare output formats")]
    NoOutputFormats,

    #[error("dataset template binder required")]
    MissingBinder,

    #[error("unsupported dataset dialect {0:?}")]
    UnsupportedDialect(String),

    #[error("unsupported dataset format {0:?}")]
    UnsupportedFormat(String),
}

/// Failures raised while a plugin registers its contributions.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("schema for entity '{0}' already registered")]
    DuplicateSchema(String),

    #[error("invalid dataset template '{key}': {source}")]
    InvalidTemplate {
        key: String,
        #[source]
        source: TemplateError,
    },

    #[error("dataset template {0} already registered")]
    DuplicateTemplate(String),
}
