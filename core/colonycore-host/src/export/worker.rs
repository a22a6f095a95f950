use super::audit::{AuditEntry, AuditLog};
use super::object_store::ObjectStore;
use super::render;
use super::{ExportArtifact, ExportInput, ExportRecord, ExportStatus};
use crate::config::WorkerConfig;
use crate::error::ExportError;
use crate::service::Catalog;
use chrono::Utc;
use colonycore_pluginapi::dataset::Format;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const AUDIT_ACTION: &str = "dataset_export";

struct ExportTask {
    id: String,
    input: ExportInput,
}

/// State shared between the enqueueing side and the background loop.
struct Shared {
    catalog: Arc<dyn Catalog>,
    objects: Arc<dyn ObjectStore>,
    audit: Arc<dyn AuditLog>,
    jobs: RwLock<HashMap<String, ExportRecord>>,
}

/// Background dataset exporter fed by a bounded queue.
///
/// Nothing is processed until [`start`](Self::start) is called. Requests
/// beyond the queue capacity are refused immediately with
/// [`ExportError::QueueFull`].
pub struct Worker {
    shared: Arc<Shared>,
    config: WorkerConfig,
    sender: mpsc::Sender<ExportTask>,
    receiver: Mutex<Option<mpsc::Receiver<ExportTask>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
}

impl Worker {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        objects: Arc<dyn ObjectStore>,
        audit: Arc<dyn AuditLog>,
    ) -> Self {
        Self::with_config(catalog, objects, audit, WorkerConfig::default())
    }

    pub fn with_config(
        catalog: Arc<dyn Catalog>,
        objects: Arc<dyn ObjectStore>,
        audit: Arc<dyn AuditLog>,
        config: WorkerConfig,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                catalog,
                objects,
                audit,
                jobs: RwLock::new(HashMap::new()),
            }),
            config,
            sender,
            receiver: Mutex::new(Some(receiver)),
            handle: Mutex::new(None),
            cancel: CancellationToken::new(),
        }
    }

    /// Spawns the processing loop. Calling it again is a no-op.
    pub async fn start(&self) {
        let Some(receiver) = self.receiver.lock().await.take() else {
            return;
        };
        let shared = Arc::clone(&self.shared);
        let cancel = self.cancel.clone();
        let handle = tokio::spawn(async move { shared.run(receiver, cancel).await });
        *self.handle.lock().await = Some(handle);
        debug!(capacity = self.config.queue_capacity, "export worker started");
    }

    /// Stops the loop and waits for it to exit. Queued requests that were
    /// not picked up stay `queued`.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.lock().await.take()
            && let Err(err) = handle.await
        {
            warn!(error = %err, "export worker exited abnormally");
        }
        info!("export worker stopped");
    }

    /// Validates the request, records it as `queued` and hands it to the
    /// loop without waiting for queue space.
    pub async fn enqueue_export(&self, input: ExportInput) -> Result<ExportRecord, ExportError> {
        let slug = input.template_slug.trim();
        if slug.is_empty() {
            return Err(ExportError::MissingSlug);
        }
        let template = self
            .shared
            .catalog
            .resolve_dataset_template(slug)
            .ok_or_else(|| ExportError::TemplateNotFound(slug.to_string()))?;

        let requested = if input.formats.is_empty() {
            &self.config.default_formats
        } else {
            &input.formats
        };
        let formats = dedup_formats(requested)?;
        if let Some(&format) = formats.iter().find(|f| !template.supports_format(**f)) {
            return Err(ExportError::UnsupportedFormat { format });
        }

        let permit = match self.sender.try_reserve() {
            Ok(permit) => permit,
            Err(TrySendError::Full(())) => {
                warn!(template = %slug, "export queue full");
                return Err(ExportError::QueueFull);
            }
            Err(TrySendError::Closed(())) => return Err(ExportError::Stopped),
        };

        let now = Utc::now();
        let record = ExportRecord {
            id: Uuid::now_v7().to_string(),
            template: template.descriptor(),
            scope: input.scope.clone(),
            parameters: input.parameters.clone(),
            formats,
            status: ExportStatus::Queued,
            error: None,
            artifacts: Vec::new(),
            requested_by: input.requested_by.clone(),
            reason: input.reason.clone(),
            project_id: input.project_id.clone(),
            protocol_id: input.protocol_id.clone(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        self.shared
            .jobs
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        self.shared
            .audit_for(&record, ExportStatus::Queued, Map::new())
            .await;

        permit.send(ExportTask {
            id: record.id.clone(),
            input,
        });
        debug!(export_id = %record.id, template = %record.template.slug, "export queued");
        Ok(record)
    }

    /// Snapshot of an export's current state.
    pub async fn get_export(&self, id: &str) -> Option<ExportRecord> {
        self.shared.jobs.read().await.get(id).cloned()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Parses format names case-insensitively, keeping the first occurrence of
/// each.
pub fn dedup_formats(names: &[String]) -> Result<Vec<Format>, ExportError> {
    let mut formats = Vec::with_capacity(names.len());
    for name in names {
        let format =
            Format::parse(name).map_err(|_| ExportError::UnknownFormat(name.to_string()))?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    Ok(formats)
}

impl Shared {
    async fn run(&self, mut receiver: mpsc::Receiver<ExportTask>, cancel: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                task = receiver.recv() => match task {
                    Some(task) => self.process(task, &cancel).await,
                    None => break,
                },
            }
        }
    }

    async fn process(&self, task: ExportTask, cancel: &CancellationToken) {
        let ExportTask { id, input } = task;
        let Some(formats) = self.jobs.read().await.get(&id).map(|r| r.formats.clone()) else {
            return;
        };
        let Some(template) = self.catalog.resolve_dataset_template(&input.template_slug) else {
            self.fail(&id, format!("template {} missing", input.template_slug))
                .await;
            return;
        };

        self.transition(&id, ExportStatus::Running, Map::new()).await;

        let run = template.run(&input.parameters, input.scope.clone(), Format::Json);
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                self.fail(&id, "export cancelled".to_string()).await;
                return;
            }
            result = run => match result {
                Ok(result) => result,
                Err(err) => {
                    self.fail(&id, err.to_string()).await;
                    return;
                }
            },
        };

        let mut artifacts = Vec::with_capacity(formats.len());
        for format in formats {
            let columns = &template.template().columns;
            let rendered = match render::materialize(format, columns, &result) {
                Ok(rendered) => rendered,
                Err(reason) => {
                    self.fail(&id, reason).await;
                    return;
                }
            };
            let key = format!("exports/{id}/{}.{}", Uuid::now_v7(), rendered.extension);
            match self
                .objects
                .put(&key, rendered.payload, rendered.content_type, rendered.metadata)
                .await
            {
                Ok(stored) => artifacts.push(ExportArtifact {
                    format: Some(format),
                    ..stored
                }),
                Err(err) => {
                    self.fail(&id, format!("store artifact failed: {err}")).await;
                    return;
                }
            }
        }

        self.complete(&id, artifacts).await;
    }

    async fn transition(&self, id: &str, status: ExportStatus, metadata: Map<String, Value>) {
        let record = {
            let mut jobs = self.jobs.write().await;
            let Some(record) = jobs.get_mut(id) else {
                return;
            };
            record.status = status;
            record.updated_at = Utc::now();
            record.clone()
        };
        self.audit_for(&record, status, metadata).await;
    }

    async fn complete(&self, id: &str, artifacts: Vec<ExportArtifact>) {
        let count = artifacts.len();
        {
            let mut jobs = self.jobs.write().await;
            if let Some(record) = jobs.get_mut(id) {
                let now = Utc::now();
                record.error = None;
                record.artifacts = artifacts;
                record.completed_at = Some(now);
            }
        }
        self.transition(id, ExportStatus::Succeeded, Map::new()).await;
        info!(export_id = %id, artifacts = count, "export succeeded");
    }

    async fn fail(&self, id: &str, reason: String) {
        error!(export_id = %id, error = %reason, "export failed");
        {
            let mut jobs = self.jobs.write().await;
            if let Some(record) = jobs.get_mut(id) {
                record.error = Some(reason.clone());
                record.completed_at = Some(Utc::now());
            }
        }
        let mut metadata = Map::new();
        metadata.insert("error".to_string(), Value::String(reason));
        self.transition(id, ExportStatus::Failed, metadata).await;
    }

    async fn audit_for(
        &self,
        record: &ExportRecord,
        status: ExportStatus,
        metadata: Map<String, Value>,
    ) {
        self.audit
            .record(AuditEntry {
                id: Uuid::now_v7().to_string(),
                action: AUDIT_ACTION.to_string(),
                actor: record.requested_by.clone(),
                template: record.template.slug.clone(),
                status,
                scope: record.scope.clone(),
                reason: record.reason.clone(),
                metadata,
                occurred_at: Utc::now(),
            })
            .await;
    }
}
