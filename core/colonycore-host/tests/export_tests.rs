use async_trait::async_trait;
use chrono::Utc;
use colonycore_host::export::{
    AuditLog, ExportInput, ExportRecord, ExportStatus, MemoryAuditLog, MemoryObjectStore,
    ObjectStore, Worker,
};
use colonycore_host::{Catalog, ExportError, Service, WorkerConfig};
use colonycore_pluginapi::dataset::{
    Column, DatasetEnvironment, DatasetRunner, Dialect, Format, Metadata, Parameter,
    ParameterType, RunRequest, RunResult, SnapshotSource, Template,
};
use colonycore_pluginapi::{CancellationToken, Plugin, Registry};
use colonycore_store::{Facility, HousingUnit, MemoryStore, Organism, Record};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use std::time::Duration;

// ── Helpers ──────────────────────────────────────────────────────

/// Lists organisms from the latest committed snapshot.
struct PopulationRunner {
    source: Arc<dyn SnapshotSource>,
}

#[async_trait]
impl DatasetRunner for PopulationRunner {
    async fn run(&self, request: RunRequest) -> anyhow::Result<RunResult> {
        let stage = request.parameters.get("stage").and_then(Value::as_str);
        let view = self.source.snapshot().await;
        let rows = view
            .list_organisms()
            .into_iter()
            .filter(|organism| stage.is_none_or(|stage| organism.stage() == stage))
            .map(|organism| {
                let mut row = Map::new();
                row.insert("organism_id".into(), json!(organism.id()));
                row.insert("stage".into(), json!(organism.stage()));
                row
            })
            .collect();
        Ok(RunResult {
            schema: Vec::new(),
            rows,
            metadata: Map::new(),
            generated_at: Utc::now(),
            format: Format::Json,
        })
    }
}

struct PopulationPlugin;

impl Plugin for PopulationPlugin {
    fn name(&self) -> &str {
        "frog"
    }

    fn version(&self) -> &str {
        "0.1.0"
    }

    fn register(&self, registry: &mut dyn Registry) -> anyhow::Result<()> {
        let mut stage = Parameter::new("stage", ParameterType::String);
        stage.enum_values = vec!["adult".into(), "juvenile".into()];
        registry.register_dataset_template(Template {
            key: "population".into(),
            version: "1.0.0".into(),
            title: "Population".into(),
            description: String::new(),
            dialect: Dialect::Dsl,
            query: "REPORT population".into(),
            parameters: vec![stage],
            columns: vec![
                Column::new("organism_id", "string"),
                Column::new("stage", "string"),
            ],
            metadata: Metadata::default(),
            output_formats: vec![Format::Json, Format::Csv, Format::Parquet],
            binder: Some(Arc::new(|env: &DatasetEnvironment| {
                Ok(Arc::new(PopulationRunner {
                    source: Arc::clone(&env.source),
                }) as Arc<dyn DatasetRunner>)
            })),
        })?;
        Ok(())
    }
}

const SLUG: &str = "frog/population@1.0.0";

async fn make_catalog() -> Arc<dyn Catalog> {
    let store = Arc::new(MemoryStore::new());
    store
        .run_in_transaction(&CancellationToken::new(), |tx| {
            tx.create(
                Facility {
                    code: "main".into(),
                    name: "Main".into(),
                    ..Default::default()
                }
                .with_id("F1"),
            )?;
            tx.create(
                HousingUnit {
                    name: "Tank A".into(),
                    facility_id: "F1".into(),
                    capacity: 4,
                    environment: "aquatic".into(),
                    ..Default::default()
                }
                .with_id("H1"),
            )?;
            for (id, stage) in [("O1", "adult"), ("O2", "juvenile")] {
                tx.create(
                    Organism {
                        name: format!("Frog {id}"),
                        species: "frog".into(),
                        stage: stage.into(),
                        housing_id: Some("H1".into()),
                        ..Default::default()
                    }
                    .with_id(id),
                )?;
            }
            Ok(())
        })
        .await
        .unwrap();

    let mut service = Service::new(store);
    service.install_plugin(&PopulationPlugin).await.unwrap();
    Arc::new(service)
}

struct Harness {
    worker: Worker,
    objects: Arc<MemoryObjectStore>,
    audit: Arc<MemoryAuditLog>,
}

async fn make_worker(config: WorkerConfig) -> Harness {
    let objects = Arc::new(MemoryObjectStore::new());
    let audit = Arc::new(MemoryAuditLog::new());
    let worker = Worker::with_config(
        make_catalog().await,
        Arc::clone(&objects) as Arc<dyn ObjectStore>,
        Arc::clone(&audit) as Arc<dyn AuditLog>,
        config,
    );
    Harness {
        worker,
        objects,
        audit,
    }
}

fn make_input(formats: &[&str]) -> ExportInput {
    ExportInput {
        template_slug: SLUG.into(),
        formats: formats.iter().map(ToString::to_string).collect(),
        requested_by: "alice".into(),
        reason: "quarterly census".into(),
        ..Default::default()
    }
}

async fn wait_for_finish(worker: &Worker, id: &str) -> ExportRecord {
    for _ in 0..200 {
        let record = worker.get_export(id).await.unwrap();
        if record.status.is_finished() {
            return record;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("export {id} did not finish");
}

// ── Enqueue validation ───────────────────────────────────────────

#[tokio::test]
async fn enqueue_rejects_bad_requests() {
    let harness = make_worker(WorkerConfig::default()).await;
    let worker = &harness.worker;

    let mut missing = make_input(&["json"]);
    missing.template_slug = "  ".into();
    assert!(matches!(
        worker.enqueue_export(missing).await,
        Err(ExportError::MissingSlug)
    ));

    let mut unknown = make_input(&["json"]);
    unknown.template_slug = "frog/unknown@1.0.0".into();
    assert_eq!(
        worker.enqueue_export(unknown).await.unwrap_err().to_string(),
        "dataset template frog/unknown@1.0.0 not found"
    );

    assert!(matches!(
        worker.enqueue_export(make_input(&["xml"])).await,
        Err(ExportError::UnknownFormat(name)) if name == "xml"
    ));

    assert_eq!(
        worker
            .enqueue_export(make_input(&["json", "png"]))
            .await
            .unwrap_err()
            .to_string(),
        "format png not supported by template"
    );
    assert!(harness.audit.entries().await.is_empty());
}

#[tokio::test]
async fn formats_are_deduplicated_case_insensitively() {
    let harness = make_worker(WorkerConfig::default()).await;

    let record = harness
        .worker
        .enqueue_export(make_input(&["json", "JSON", "csv", "csv"]))
        .await
        .unwrap();

    assert_eq!(record.formats, vec![Format::Json, Format::Csv]);
    assert_eq!(record.status, ExportStatus::Queued);
    assert_eq!(record.template.slug, SLUG);
}

#[tokio::test]
async fn empty_formats_use_configured_defaults() {
    let harness = make_worker(WorkerConfig {
        default_formats: vec!["CSV".into()],
        ..Default::default()
    })
    .await;

    let record = harness.worker.enqueue_export(make_input(&[])).await.unwrap();

    assert_eq!(record.formats, vec![Format::Csv]);
}

// ── Back-pressure ────────────────────────────────────────────────

#[tokio::test]
async fn full_queue_fails_fast_without_recording() {
    let harness = make_worker(WorkerConfig {
        queue_capacity: 2,
        ..Default::default()
    })
    .await;
    let worker = &harness.worker;

    let first = worker.enqueue_export(make_input(&["json"])).await.unwrap();
    let second = worker.enqueue_export(make_input(&["json"])).await.unwrap();
    let err = tokio::time::timeout(
        Duration::from_secs(1),
        worker.enqueue_export(make_input(&["json"])),
    )
    .await
    .expect("enqueue must not wait for capacity")
    .unwrap_err();

    assert!(matches!(err, ExportError::QueueFull));
    assert_eq!(err.to_string(), "export queue full");
    for id in [&first.id, &second.id] {
        assert_eq!(
            worker.get_export(id).await.unwrap().status,
            ExportStatus::Queued
        );
    }
    assert_eq!(harness.audit.entries().await.len(), 2);
}

// ── Processing ───────────────────────────────────────────────────

#[tokio::test]
async fn export_succeeds_with_one_artifact_per_format() {
    let harness = make_worker(WorkerConfig::default()).await;
    harness.worker.start().await;

    let queued = harness
        .worker
        .enqueue_export(make_input(&["json", "csv"]))
        .await
        .unwrap();
    let record = wait_for_finish(&harness.worker, &queued.id).await;

    assert_eq!(record.status, ExportStatus::Succeeded);
    assert_eq!(record.error, None);
    assert!(record.completed_at.is_some());
    let formats: Vec<_> = record.artifacts.iter().map(|a| a.format).collect();
    assert_eq!(formats, vec![Some(Format::Json), Some(Format::Csv)]);

    let stored = harness
        .objects
        .list(&format!("exports/{}/", record.id))
        .await
        .unwrap();
    assert_eq!(stored.len(), 2);

    let csv = &record.artifacts[1];
    assert_eq!(csv.content_type, "text/csv");
    assert_eq!(csv.metadata.get("rows"), Some(&json!(2)));
    let (_, payload) = harness.objects.get(&csv.id).await.unwrap();
    assert_eq!(
        String::from_utf8(payload).unwrap(),
        "organism_id,stage\nO1,adult\nO2,juvenile\n"
    );

    let statuses: Vec<_> = harness
        .audit
        .entries()
        .await
        .into_iter()
        .map(|entry| entry.status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            ExportStatus::Queued,
            ExportStatus::Running,
            ExportStatus::Succeeded
        ]
    );

    harness.worker.shutdown().await;
}

#[tokio::test]
async fn parameters_reach_the_runner() {
    let harness = make_worker(WorkerConfig::default()).await;
    harness.worker.start().await;

    let mut input = make_input(&["json"]);
    input.parameters.insert("stage".into(), json!("juvenile"));
    let queued = harness.worker.enqueue_export(input).await.unwrap();
    let record = wait_for_finish(&harness.worker, &queued.id).await;

    let (_, payload) = harness
        .objects
        .get(&record.artifacts[0].id)
        .await
        .unwrap();
    let result: Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(result["rows"], json!([{ "organism_id": "O2", "stage": "juvenile" }]));
}

#[tokio::test]
async fn format_without_encoder_fails_the_export() {
    let harness = make_worker(WorkerConfig::default()).await;
    harness.worker.start().await;

    let queued = harness
        .worker
        .enqueue_export(make_input(&["parquet"]))
        .await
        .unwrap();
    let record = wait_for_finish(&harness.worker, &queued.id).await;

    assert_eq!(record.status, ExportStatus::Failed);
    assert_eq!(
        record.error.as_deref(),
        Some("format parquet not supported by exporter")
    );
    assert!(record.artifacts.is_empty());
}

#[tokio::test]
async fn invalid_parameters_fail_the_export() {
    let harness = make_worker(WorkerConfig::default()).await;
    harness.worker.start().await;

    let mut input = make_input(&["json"]);
    input.parameters.insert("stage".into(), json!("tadpole"));
    let queued = harness.worker.enqueue_export(input).await.unwrap();
    let record = wait_for_finish(&harness.worker, &queued.id).await;

    assert_eq!(record.status, ExportStatus::Failed);
    assert_eq!(
        record.error.as_deref(),
        Some("parameter validation failed: stage: value must be one of: adult, juvenile")
    );
    let last = harness.audit.entries().await.pop().unwrap();
    assert_eq!(last.status, ExportStatus::Failed);
    assert_eq!(last.actor, "alice");
    assert_eq!(last.action, "dataset_export");
}

#[tokio::test]
async fn stopped_worker_refuses_new_exports() {
    let harness = make_worker(WorkerConfig::default()).await;
    harness.worker.start().await;
    harness.worker.shutdown().await;

    let err = harness
        .worker
        .enqueue_export(make_input(&["json"]))
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Stopped));
}

#[tokio::test]
async fn unknown_export_id_is_none() {
    let harness = make_worker(WorkerConfig::default()).await;

    assert!(harness.worker.get_export("missing").await.is_none());
}

// ── Object store ─────────────────────────────────────────────────

#[tokio::test]
async fn object_store_refuses_overwrite() {
    let objects = MemoryObjectStore::new();
    objects
        .put("exports/a.json", b"{}".to_vec(), "application/json", Map::new())
        .await
        .unwrap();

    let err = objects
        .put("exports/a.json", b"[]".to_vec(), "application/json", Map::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::ObjectExists(_)));
    let (artifact, payload) = objects.get("exports/a.json").await.unwrap();
    assert_eq!(payload, b"{}".to_vec());
    assert_eq!(artifact.size_bytes, 2);
    assert_eq!(artifact.url, "memory://objects/exports/a.json");
    assert!(objects.delete("exports/a.json").await.unwrap());
    assert!(!objects.delete("exports/a.json").await.unwrap());
}

mod format_properties {
    use super::*;
    use colonycore_host::export::dedup_formats;
    use proptest::prelude::*;

    const NAMES: [&str; 5] = ["json", "csv", "parquet", "png", "html"];

    fn name_strategy() -> impl Strategy<Value = String> {
        (0..NAMES.len(), any::<bool>()).prop_map(|(index, upper)| {
            if upper {
                NAMES[index].to_uppercase()
            } else {
                NAMES[index].to_string()
            }
        })
    }

    proptest! {
        /// Output holds each requested format once, in first-requested order.
        #[test]
        fn dedup_keeps_first_occurrence(names in prop::collection::vec(name_strategy(), 1..12)) {
            let formats = dedup_formats(&names).unwrap();

            let mut expected: Vec<Format> = Vec::new();
            for name in &names {
                let format = Format::parse(name).unwrap();
                if !expected.contains(&format) {
                    expected.push(format);
                }
            }
            prop_assert_eq!(formats, expected);
        }
    }
}
