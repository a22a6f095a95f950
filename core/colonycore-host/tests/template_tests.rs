use async_trait::async_trait;
use chrono::Utc;
use colonycore_host::{HostError, HostTemplate, ParameterError};
use colonycore_pluginapi::dataset::{
    Binder, Column, DatasetEnvironment, DatasetRunner, Dialect, Format, Metadata, Parameter,
    ParameterType, RunRequest, RunResult, Scope, SnapshotSource, Template,
};
use colonycore_store::MemoryStore;
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};
use std::sync::Arc;

// ── Helpers ──────────────────────────────────────────────────────

/// Echoes the coerced parameters back as a single row.
struct EchoRunner;

#[async_trait]
impl DatasetRunner for EchoRunner {
    async fn run(&self, request: RunRequest) -> anyhow::Result<RunResult> {
        Ok(RunResult {
            schema: Vec::new(),
            rows: vec![request.parameters],
            metadata: Map::new(),
            generated_at: Utc::now(),
            format: Format::Csv,
        })
    }
}

fn make_binder() -> Binder {
    Arc::new(|_env: &DatasetEnvironment| Ok(Arc::new(EchoRunner) as Arc<dyn DatasetRunner>))
}

fn make_environment() -> DatasetEnvironment {
    DatasetEnvironment {
        source: Arc::new(MemoryStore::new()) as Arc<dyn SnapshotSource>,
        now: Arc::new(Utc::now),
    }
}

fn make_template() -> HostTemplate {
    let mut stage = Parameter::new("stage", ParameterType::String);
    stage.enum_values = vec!["adult".into(), "juvenile".into()];
    let mut as_of = Parameter::new("as_of", ParameterType::Timestamp);
    as_of.required = true;
    let mut include_retired = Parameter::new("include_retired", ParameterType::Boolean);
    include_retired.default = Some(Value::Bool(false));

    HostTemplate::new(
        "frog",
        Template {
            key: "population".into(),
            version: "1.0.0".into(),
            title: "Population".into(),
            description: String::new(),
            dialect: Dialect::Dsl,
            query: "REPORT population".into(),
            parameters: vec![
                stage,
                Parameter::new("limit", ParameterType::Integer),
                Parameter::new("ratio", ParameterType::Number),
                include_retired,
                as_of,
            ],
            columns: vec![Column::new("stage", "string")],
            metadata: Metadata::default(),
            output_formats: vec![Format::Json, Format::Csv],
            binder: Some(make_binder()),
        },
    )
}

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

// ── Identity ─────────────────────────────────────────────────────

#[test]
fn slug_and_formats() {
    let template = make_template();

    assert_eq!(template.slug(), "frog/population@1.0.0");
    assert_eq!(template.descriptor().plugin, "frog");
    assert!(template.supports_format(Format::Csv));
    assert!(!template.supports_format(Format::Png));
    assert!(!template.is_bound());
}

// ── Parameter validation ─────────────────────────────────────────

#[test]
fn valid_parameters_are_coerced() {
    let cleaned = make_template()
        .validate_parameters(&params(json!({
            "stage": "adult",
            "limit": "5",
            "ratio": 1,
            "include_retired": "t",
            "as_of": "2024-01-01T10:00:00+02:00",
        })))
        .unwrap();

    assert_eq!(
        Value::Object(cleaned),
        json!({
            "stage": "adult",
            "limit": 5,
            "ratio": 1.0,
            "include_retired": true,
            "as_of": "2024-01-01T08:00:00Z",
        })
    );
}

#[test]
fn defaults_fill_missing_optional_parameters() {
    let cleaned = make_template()
        .validate_parameters(&params(json!({ "as_of": "2024-01-01T00:00:00Z" })))
        .unwrap();

    assert_eq!(cleaned.get("include_retired"), Some(&Value::Bool(false)));
    assert!(!cleaned.contains_key("stage"));
}

#[test]
fn names_match_case_insensitively() {
    let cleaned = make_template()
        .validate_parameters(&params(json!({ "AS_OF": "2024-01-01T00:00:00Z" })))
        .unwrap();

    assert_eq!(cleaned.get("as_of"), Some(&json!("2024-01-01T00:00:00Z")));
}

#[test]
fn every_problem_is_reported_sorted_by_name() {
    let errors = make_template()
        .validate_parameters(&params(json!({
            "stage": "larva",
            "limit": 1.5,
            "extra": 1,
        })))
        .unwrap_err();

    assert_eq!(
        errors,
        vec![
            ParameterError {
                name: "as_of".into(),
                message: "required parameter missing".into(),
            },
            ParameterError {
                name: "extra".into(),
                message: "parameter not declared".into(),
            },
            ParameterError {
                name: "limit".into(),
                message: "parameter limit expects integer".into(),
            },
            ParameterError {
                name: "stage".into(),
                message: "value must be one of: adult, juvenile".into(),
            },
        ]
    );
}

#[test]
fn type_mismatches_are_rejected() {
    let cases = [
        (json!({ "as_of": null }), "parameter as_of cannot be null"),
        (json!({ "as_of": "yesterday" }), "parameter as_of expects RFC3339 timestamp"),
        (json!({ "as_of": 17 }), "parameter as_of expects timestamp"),
        (
            json!({ "as_of": "2024-01-01T00:00:00Z", "include_retired": "maybe" }),
            "parameter include_retired expects boolean",
        ),
        (
            json!({ "as_of": "2024-01-01T00:00:00Z", "ratio": "lots" }),
            "parameter ratio expects number",
        ),
        (
            json!({ "as_of": "2024-01-01T00:00:00Z", "stage": 3 }),
            "parameter stage expects string",
        ),
    ];

    for (input, expected) in cases {
        let errors = make_template()
            .validate_parameters(&params(input.clone()))
            .unwrap_err();
        assert_eq!(errors.len(), 1, "input {input}");
        assert_eq!(errors[0].message, expected, "input {input}");
    }
}

// ── Running ──────────────────────────────────────────────────────

#[tokio::test]
async fn unbound_template_refuses_to_run() {
    let err = make_template()
        .run(&Map::new(), Scope::default(), Format::Json)
        .await
        .unwrap_err();

    assert!(matches!(err, HostError::NotBound));
}

#[tokio::test]
async fn run_fills_schema_and_stamps_format() {
    let mut template = make_template();
    template.bind(&make_environment()).unwrap();

    let result = template
        .run(
            &params(json!({ "as_of": "2024-01-01T00:00:00Z", "stage": "adult" })),
            Scope::default(),
            Format::Json,
        )
        .await
        .unwrap();

    assert_eq!(result.format, Format::Json);
    assert_eq!(result.schema, vec![Column::new("stage", "string")]);
    assert_eq!(result.rows[0].get("stage"), Some(&json!("adult")));
}

#[tokio::test]
async fn invalid_parameters_fail_the_run() {
    let mut template = make_template();
    template.bind(&make_environment()).unwrap();

    let err = template
        .run(&Map::new(), Scope::default(), Format::Json)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "parameter validation failed: as_of: required parameter missing"
    );
}
