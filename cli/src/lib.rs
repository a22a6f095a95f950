//! Library half of the `colonycore` binary, kept separate so the demo can be
//! driven from tests.

use anyhow::{Context, Result, bail};
use colonycore_host::export::{
    ExportInput, ExportRecord, MemoryObjectStore, TracingAuditLog, Worker,
};
use colonycore_host::{Catalog, ColonyConfig, HostError, Service};
use colonycore_plugin_frog::{FrogPlugin, POPULATION_TEMPLATE_KEY};
use colonycore_pluginapi::dataset::{self, TemplateDescriptor};
use colonycore_pluginapi::{CancellationToken, Violation};
use colonycore_store::{
    Facility, HousingUnit, MemoryStore, Organism, Project, Record, StoreError,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(25);
const POLL_ATTEMPTS: usize = 400;

/// A violation as printed by the demo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViolationSummary {
    pub rule: String,
    pub severity: String,
    pub entity_id: String,
    pub message: String,
}

impl From<&Violation> for ViolationSummary {
    fn from(violation: &Violation) -> Self {
        Self {
            rule: violation.rule().to_string(),
            severity: violation.severity().to_string(),
            entity_id: violation.entity_id().to_string(),
            message: violation.message().to_string(),
        }
    }
}

/// What the demo walkthrough observed.
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub warnings: Vec<ViolationSummary>,
    pub blocked: Vec<ViolationSummary>,
    pub export: ExportRecord,
}

/// Builds a service over a fresh store with the frog plugin installed.
pub async fn build_service(config: &ColonyConfig) -> Result<Service> {
    let store = Arc::new(MemoryStore::with_config(config.store.clone()));
    let mut service = Service::with_config(store, config.host.clone());
    service
        .install_plugin(&FrogPlugin::new())
        .await
        .context("install frog plugin")?;
    Ok(service)
}

/// Installed dataset templates, sorted.
pub async fn list_templates(config: &ColonyConfig) -> Result<Vec<TemplateDescriptor>> {
    Ok(build_service(config).await?.dataset_templates())
}

/// Seeds a small colony, then shows a warning, a blocked transaction and a
/// dataset export.
pub async fn run_demo(config: &ColonyConfig) -> Result<DemoReport> {
    let service = build_service(config).await?;
    let cancel = CancellationToken::new();
    seed(&service, &cancel).await?;

    // Warning: the habitat rule flags the move but lets it commit.
    let (_, result) = service
        .assign_organism_housing(&cancel, "frog-2", "tank-dry")
        .await
        .context("move frog-2 to dry housing")?;
    let warnings: Vec<ViolationSummary> = result.iter().map(ViolationSummary::from).collect();
    for warning in &warnings {
        warn!(rule = %warning.rule, entity = %warning.entity_id, "{}", warning.message);
    }

    // Blocked: the dry tank holds a single occupant.
    let blocked = match service
        .assign_organism_housing(&cancel, "frog-1", "tank-dry")
        .await
    {
        Err(HostError::Store(StoreError::Blocked(err))) => {
            err.result.iter().map(ViolationSummary::from).collect::<Vec<_>>()
        }
        Err(err) => return Err(err).context("move frog-1 to dry housing"),
        Ok(_) => bail!("expected frog-1 move to be blocked"),
    };
    info!(violations = blocked.len(), "transaction blocked");

    let export = export_population(service, config).await?;
    Ok(DemoReport {
        warnings,
        blocked,
        export,
    })
}

async fn seed(service: &Service, cancel: &CancellationToken) -> Result<()> {
    service
        .store()
        .run_in_transaction(cancel, |tx| {
            tx.create(
                Facility {
                    code: "AQ-1".into(),
                    name: "Aquatics Wing".into(),
                    zone: "aquatics".into(),
                    access_policy: "restricted".into(),
                    ..Default::default()
                }
                .with_id("facility-1"),
            )?;
            tx.create(
                HousingUnit {
                    name: "Wet Tank".into(),
                    facility_id: "facility-1".into(),
                    capacity: 4,
                    environment: "aquatic".into(),
                    ..Default::default()
                }
                .with_id("tank-wet"),
            )?;
            tx.create(
                HousingUnit {
                    name: "Dry Terrarium".into(),
                    facility_id: "facility-1".into(),
                    capacity: 1,
                    environment: "terrestrial".into(),
                    ..Default::default()
                }
                .with_id("tank-dry"),
            )?;
            tx.create(
                Project {
                    code: "PRJ-1".into(),
                    title: "Limb regeneration".into(),
                    facility_ids: vec!["facility-1".into()],
                    ..Default::default()
                }
                .with_id("project-1"),
            )?;
            for (id, name, stage) in [
                ("frog-1", "Kermit", "adult"),
                ("frog-2", "Hypnotoad", "juvenile"),
            ] {
                tx.create(
                    Organism {
                        name: name.into(),
                        species: "Frog".into(),
                        stage: stage.into(),
                        housing_id: Some("tank-wet".into()),
                        project_id: Some("project-1".into()),
                        ..Default::default()
                    }
                    .with_id(id),
                )?;
            }
            Ok(())
        })
        .await
        .context("seed demo colony")?;
    info!("demo colony seeded");
    Ok(())
}

async fn export_population(service: Service, config: &ColonyConfig) -> Result<ExportRecord> {
    let worker = Worker::with_config(
        Arc::new(service),
        Arc::new(MemoryObjectStore::new()),
        Arc::new(TracingAuditLog),
        config.export.clone(),
    );
    worker.start().await;

    let queued = worker
        .enqueue_export(ExportInput {
            template_slug: dataset::slug("frog", POPULATION_TEMPLATE_KEY, "0.1.0"),
            formats: vec!["json".into(), "csv".into()],
            requested_by: "demo".into(),
            reason: "demo walkthrough".into(),
            ..Default::default()
        })
        .await
        .context("enqueue export")?;

    let mut record = queued;
    for _ in 0..POLL_ATTEMPTS {
        match worker.get_export(&record.id).await {
            Some(current) if current.status.is_finished() => {
                record = current;
                break;
            }
            Some(current) => record = current,
            None => bail!("export {} disappeared", record.id),
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    worker.shutdown().await;

    if !record.status.is_finished() {
        bail!("export {} did not finish", record.id);
    }
    info!(export_id = %record.id, status = %record.status, "export finished");
    Ok(record)
}
