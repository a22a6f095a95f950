//! Dataset templates contributed by plugins.
//!
//! A [`Template`] is a declarative manifest plus a [`Binder`] that the host
//! calls once at install time to obtain a [`DatasetRunner`].

use crate::error::TemplateError;
use crate::views::RuleView;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Query language of a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Sql,
    Dsl,
}

impl Dialect {
    pub fn parse(value: &str) -> Result<Self, TemplateError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sql" => Ok(Self::Sql),
            "dsl" => Ok(Self::Dsl),
            _ => Err(TemplateError::UnsupportedDialect(value.to_string())),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sql => "sql",
            Self::Dsl => "dsl",
        }
    }
}

/// Output encoding of a dataset result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Csv,
    Parquet,
    Png,
    Html,
}

impl Format {
    /// Case-insensitive parse of a format name.
    pub fn parse(value: &str) -> Result<Self, TemplateError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "parquet" => Ok(Self::Parquet),
            "png" => Ok(Self::Png),
            "html" => Ok(Self::Html),
            _ => Err(TemplateError::UnsupportedFormat(value.to_string())),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Parquet => "parquet",
            Self::Png => "png",
            Self::Html => "html",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Integer,
    Number,
    Boolean,
    Timestamp,
}

/// A runtime-supplied template parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    #[serde(rename = "enum", default, skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParameterType) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            description: String::new(),
            unit: String::new(),
            enum_values: Vec::new(),
            example: None,
            default: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub unit: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub format: String,
}

impl Column {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            unit: String::new(),
            description: String::new(),
            format: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub documentation: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub refresh_interval: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Entity model major the template's query was written against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_model_major: Option<u32>,
}

/// Requestor identity and authorization scope for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub requestor: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub protocol_ids: Vec<String>,
}

/// Serializable description of an installed template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateDescriptor {
    pub plugin: String,
    pub key: String,
    pub version: String,
    pub title: String,
    pub description: String,
    pub dialect: Dialect,
    pub query: String,
    pub parameters: Vec<Parameter>,
    pub columns: Vec<Column>,
    pub metadata: Metadata,
    pub output_formats: Vec<Format>,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub template: TemplateDescriptor,
    /// Validated and coerced parameters, keyed by declared name.
    pub parameters: Map<String, Value>,
    pub scope: Scope,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub schema: Vec<Column>,
    pub rows: Vec<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    pub generated_at: DateTime<Utc>,
    pub format: Format,
}

/// Supplies the read-only state a runner queries.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn snapshot(&self) -> Arc<dyn RuleView>;
}

#[async_trait]
pub trait DatasetRunner: Send + Sync {
    async fn run(&self, request: RunRequest) -> anyhow::Result<RunResult>;
}

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Dependencies handed to a [`Binder`].
#[derive(Clone)]
pub struct DatasetEnvironment {
    pub source: Arc<dyn SnapshotSource>,
    pub now: Clock,
}

impl fmt::Debug for DatasetEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetEnvironment").finish_non_exhaustive()
    }
}

pub type Binder =
    Arc<dyn Fn(&DatasetEnvironment) -> anyhow::Result<Arc<dyn DatasetRunner>> + Send + Sync>;

/// A plugin-provided dataset manifest.
#[derive(Clone)]
pub struct Template {
    pub key: String,
    pub version: String,
    pub title: String,
    pub description: String,
    pub dialect: Dialect,
    pub query: String,
    pub parameters: Vec<Parameter>,
    pub columns: Vec<Column>,
    pub metadata: Metadata,
    pub output_formats: Vec<Format>,
    pub binder: Option<Binder>,
}

impl Template {
    /// Checks required fields in declaration order and reports the first gap.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.key.trim().is_empty() {
            return Err(TemplateError::MissingKey);
        }
        if self.version.trim().is_empty() {
            return Err(TemplateError::MissingVersion);
        }
        if self.title.trim().is_empty() {
            return Err(TemplateError::MissingTitle);
        }
        if self.query.trim().is_empty() {
            return Err(TemplateError::MissingQuery);
        }
        if self.columns.is_empty() {
            return Err(TemplateError::NoColumns);
        }
        if self.output_formats.is_empty() {
            return Err(TemplateError::NoOutputFormats);
        }
        if self.binder.is_none() {
            return Err(TemplateError::MissingBinder);
        }
        Ok(())
    }

    /// Descriptor for this template as installed by `plugin`.
    #[must_use]
    pub fn descriptor(&self, plugin: &str) -> TemplateDescriptor {
        TemplateDescriptor {
            plugin: plugin.to_string(),
            key: self.key.clone(),
            version: self.version.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            dialect: self.dialect,
            query: self.query.clone(),
            parameters: self.parameters.clone(),
            columns: self.columns.clone(),
            metadata: self.metadata.clone(),
            output_formats: self.output_formats.clone(),
            slug: slug(plugin, &self.key, &self.version),
        }
    }
}

impl fmt::Debug for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Template")
            .field("key", &self.key)
            .field("version", &self.version)
            .field("title", &self.title)
            .field("dialect", &self.dialect)
            .field("parameters", &self.parameters.len())
            .field("columns", &self.columns.len())
            .field("output_formats", &self.output_formats)
            .field("binder", &self.binder.is_some())
            .finish_non_exhaustive()
    }
}

/// Canonical template identifier: `plugin/key@version`, or `key@version`
/// when no plugin owns it.
#[must_use]
pub fn slug(plugin: &str, key: &str, version: &str) -> String {
    if plugin.is_empty() {
        format!("{key}@{version}")
    } else {
        format!("{plugin}/{key}@{version}")
    }
}
