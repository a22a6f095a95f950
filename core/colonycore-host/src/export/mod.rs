//! Asynchronous dataset exports.
//!
//! A [`Worker`] accepts export requests on a bounded queue, runs the dataset
//! template in the background and materializes one artifact per requested
//! format into an [`ObjectStore`]. Progress is observable only by polling
//! [`Worker::get_export`].

mod audit;
mod object_store;
mod render;
mod worker;

pub use audit::{AuditEntry, AuditLog, MemoryAuditLog, TracingAuditLog};
pub use object_store::{MemoryObjectStore, ObjectStore};
pub use worker::{Worker, dedup_formats};

use chrono::{DateTime, Utc};
use colonycore_pluginapi::dataset::{Format, Scope, TemplateDescriptor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

impl ExportStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    pub const fn is_finished(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored export artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportArtifact {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    pub content_type: String,
    pub size_bytes: u64,
    pub url: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
}

/// An export request and everything that happened to it so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord {
    pub id: String,
    pub template: TemplateDescriptor,
    pub scope: Scope,
    pub parameters: Map<String, Value>,
    /// Deduplicated, in first-requested order.
    pub formats: Vec<Format>,
    pub status: ExportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ExportArtifact>,
    pub requested_by: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub protocol_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Arguments to [`Worker::enqueue_export`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportInput {
    pub template_slug: String,
    pub parameters: Map<String, Value>,
    /// Format names, matched case-insensitively. Empty means the configured
    /// defaults.
    pub formats: Vec<String>,
    pub scope: Scope,
    pub requested_by: String,
    pub project_id: String,
    pub protocol_id: String,
    pub reason: String,
}
