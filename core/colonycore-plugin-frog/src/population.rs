use crate::habitat::is_frog;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use colonycore_pluginapi::OrganismView;
use colonycore_pluginapi::dataset::{
    Clock, Column, DatasetEnvironment, DatasetRunner, Dialect, Format, Metadata, Parameter,
    ParameterType, RunRequest, RunResult, Scope, SnapshotSource, Template,
};
use colonycore_types::LifecycleStageContext;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub const POPULATION_TEMPLATE_KEY: &str = "frog_population_snapshot";

const SOURCE: &str = "core.organisms";

/// The `frog_population_snapshot` template: one row per frog, filtered by
/// stage, update time and the caller's project and protocol scope.
pub fn population_template() -> Template {
    let mut stage = Parameter::new("stage", ParameterType::String);
    stage.description = "Optional lifecycle stage filter using canonical stage identifiers.".into();
    stage.enum_values = LifecycleStageContext::new()
        .all()
        .iter()
        .map(ToString::to_string)
        .collect();

    let mut as_of = Parameter::new("as_of", ParameterType::Timestamp);
    as_of.description =
        "Only include organisms updated on or before the provided RFC3339 timestamp.".into();
    as_of.unit = "iso8601".into();

    let mut include_retired = Parameter::new("include_retired", ParameterType::Boolean);
    include_retired.description =
        "Include retired frogs when no explicit stage filter is provided.".into();
    include_retired.default = Some(Value::Bool(false));

    Template {
        key: POPULATION_TEMPLATE_KEY.into(),
        version: "0.1.0".into(),
        title: "Frog Population Snapshot".into(),
        description: "Lists frog organisms with lifecycle, housing, and project context scoped \
                      to the caller's filters."
            .into(),
        dialect: Dialect::Dsl,
        query: "REPORT frog_population_snapshot\n\
                SELECT organism_id, organism_name, species, lifecycle_stage, project_id, \
                protocol_id, housing_id, updated_at\n\
                FROM organisms\n\
                WHERE species ILIKE 'frog%'"
            .into(),
        parameters: vec![stage, as_of, include_retired],
        columns: columns(),
        metadata: Metadata {
            source: SOURCE.into(),
            refresh_interval: "PT15M".into(),
            tags: vec!["frog".into(), "population".into(), "lifecycle".into()],
            annotations: BTreeMap::from([
                ("unit_of_count".to_string(), "organism".to_string()),
                ("classification".to_string(), "operational".to_string()),
            ]),
            ..Metadata::default()
        },
        output_formats: vec![
            Format::Json,
            Format::Csv,
            Format::Parquet,
            Format::Html,
            Format::Png,
        ],
        binder: Some(Arc::new(bind)),
    }
}

fn columns() -> Vec<Column> {
    let column = |name: &str, kind: &str, description: &str| {
        let mut column = Column::new(name, kind);
        column.description = description.into();
        column
    };
    let mut updated_at = column("updated_at", "timestamp", "Timestamp of last organism update.");
    updated_at.unit = "iso8601".into();
    vec![
        column("organism_id", "string", "Primary identifier for the organism."),
        column("organism_name", "string", "Common name or accession for the organism."),
        column("species", "string", "Recorded species name."),
        column("lifecycle_stage", "string", "Canonical lifecycle stage."),
        column("project_id", "string", "Owning project identifier."),
        column("protocol_id", "string", "Linked protocol identifier."),
        column("housing_id", "string", "Housing assignment identifier."),
        updated_at,
    ]
}

fn bind(environment: &DatasetEnvironment) -> anyhow::Result<Arc<dyn DatasetRunner>> {
    Ok(Arc::new(PopulationRunner {
        source: Arc::clone(&environment.source),
        now: Arc::clone(&environment.now),
    }))
}

struct PopulationRunner {
    source: Arc<dyn SnapshotSource>,
    now: Clock,
}

#[async_trait]
impl DatasetRunner for PopulationRunner {
    async fn run(&self, request: RunRequest) -> anyhow::Result<RunResult> {
        let filter = Filter::from_request(&request)?;
        let view = self.source.snapshot().await;
        let rows: Vec<_> = view
            .list_organisms()
            .into_iter()
            .filter(|organism| filter.matches(*organism))
            .map(row)
            .collect();
        debug!(rows = rows.len(), "frog population snapshot");

        Ok(RunResult {
            schema: request.template.columns.clone(),
            metadata: filter.metadata(rows.len()),
            rows,
            generated_at: (self.now)(),
            format: Format::Json,
        })
    }
}

struct Filter<'a> {
    stage: Option<&'a str>,
    include_retired: bool,
    as_of: Option<DateTime<Utc>>,
    scope: &'a Scope,
}

impl<'a> Filter<'a> {
    fn from_request(request: &'a RunRequest) -> anyhow::Result<Self> {
        let params = &request.parameters;
        let as_of = params
            .get("as_of")
            .and_then(Value::as_str)
            .map(|raw| {
                DateTime::parse_from_rfc3339(raw)
                    .map(|ts| ts.with_timezone(&Utc))
                    .with_context(|| format!("invalid as_of timestamp {raw:?}"))
            })
            .transpose()?;
        Ok(Self {
            stage: params
                .get("stage")
                .and_then(Value::as_str)
                .filter(|stage| !stage.is_empty()),
            include_retired: params
                .get("include_retired")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            as_of,
            scope: &request.scope,
        })
    }

    fn matches(&self, organism: &dyn OrganismView) -> bool {
        if !is_frog(organism.species()) {
            return false;
        }
        match self.stage {
            Some(stage) if organism.get_current_stage().to_string() != stage => return false,
            None if !self.include_retired && organism.is_retired() => return false,
            _ => {}
        }
        if self.as_of.is_some_and(|as_of| organism.updated_at() > as_of) {
            return false;
        }
        in_scope(&self.scope.project_ids, organism.project_id())
            && in_scope(&self.scope.protocol_ids, organism.protocol_id())
    }

    fn metadata(&self, row_count: usize) -> Map<String, Value> {
        let mut metadata = Map::new();
        metadata.insert("row_count".into(), json!(row_count));
        metadata.insert("source".into(), json!(SOURCE));
        if let Some(stage) = self.stage {
            metadata.insert("stage_filter".into(), json!(stage));
        }
        if !self.scope.project_ids.is_empty() {
            metadata.insert("project_scope".into(), json!(self.scope.project_ids));
        }
        if !self.scope.protocol_ids.is_empty() {
            metadata.insert("protocol_scope".into(), json!(self.scope.protocol_ids));
        }
        if let Some(as_of) = self.as_of {
            metadata.insert("as_of".into(), json!(as_of));
        }
        metadata
    }
}

/// An empty scope list allows everything.
fn in_scope(allowed: &[String], id: Option<&str>) -> bool {
    allowed.is_empty() || id.is_some_and(|id| allowed.iter().any(|a| a == id))
}

fn row(organism: &dyn OrganismView) -> Map<String, Value> {
    let mut row = Map::new();
    row.insert("organism_id".into(), json!(organism.id()));
    row.insert("organism_name".into(), json!(organism.name()));
    row.insert("species".into(), json!(organism.species()));
    row.insert(
        "lifecycle_stage".into(),
        json!(organism.get_current_stage().to_string()),
    );
    row.insert("project_id".into(), json!(organism.project_id()));
    row.insert("protocol_id".into(), json!(organism.protocol_id()));
    row.insert("housing_id".into(), json!(organism.housing_id()));
    row.insert("updated_at".into(), json!(organism.updated_at()));
    row
}
