use chrono::{DateTime, TimeZone, Utc};
use colonycore_host::{Catalog, Service};
use colonycore_plugin_frog::{
    FrogPlugin, HABITAT_RULE_NAME, POPULATION_TEMPLATE_KEY, organism_schema,
};
use colonycore_pluginapi::CancellationToken;
use colonycore_pluginapi::dataset::{Format, RunResult, Scope};
use colonycore_store::{Facility, HousingUnit, MemoryStore, Organism, Project, Record};
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};
use std::sync::Arc;

// ── Helpers ──────────────────────────────────────────────────────

const SLUG: &str = "frog/frog_population_snapshot@0.1.0";

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

fn make_organism(id: &str, species: &str, stage: &str, housing: &str) -> Organism {
    Organism {
        name: format!("Specimen {id}"),
        species: species.into(),
        stage: stage.into(),
        housing_id: Some(housing.into()),
        ..Default::default()
    }
    .with_id(id)
}

async fn make_service() -> Service {
    let store = Arc::new(MemoryStore::new().with_clock(fixed_now));
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
            for (id, environment) in [("WET", "aquatic"), ("DRY", "terrestrial")] {
                tx.create(
                    HousingUnit {
                        name: format!("Tank {id}"),
                        facility_id: "F1".into(),
                        capacity: 10,
                        environment: environment.into(),
                        ..Default::default()
                    }
                    .with_id(id),
                )?;
            }
            tx.create(
                Project {
                    code: "PRJ-1".into(),
                    title: "Regeneration".into(),
                    ..Default::default()
                }
                .with_id("PRJ1"),
            )?;
            Ok(())
        })
        .await
        .unwrap();

    let mut service = Service::new(store);
    service.install_plugin(&FrogPlugin::new()).await.unwrap();
    service
}

async fn seed_population(service: &Service) {
    service
        .store()
        .run_in_transaction(&CancellationToken::new(), |tx| {
            let mut scoped = make_organism("O1", "Frog", "adult", "WET");
            scoped.project_id = Some("PRJ1".into());
            tx.create(scoped)?;
            tx.create(make_organism("O2", "tree frog", "juvenile", "WET"))?;
            tx.create(make_organism("O3", "frog", "retired", "WET"))?;
            tx.create(make_organism("O4", "newt", "adult", "WET"))?;
            Ok(())
        })
        .await
        .unwrap();
}

async fn run_population(service: &Service, params: Value, scope: Scope) -> RunResult {
    let Value::Object(params) = params else {
        panic!("parameters must be an object");
    };
    service
        .resolve_dataset_template(SLUG)
        .unwrap()
        .run(&params, scope, Format::Json)
        .await
        .unwrap()
}

fn ids(result: &RunResult) -> Vec<&str> {
    result
        .rows
        .iter()
        .map(|row| row["organism_id"].as_str().unwrap())
        .collect()
}

// ── Registration ─────────────────────────────────────────────────

#[tokio::test]
async fn plugin_contributes_schema_rule_and_dataset() {
    let service = make_service().await;

    let plugins = service.registered_plugins();
    assert_eq!(plugins.len(), 1);
    assert_eq!(plugins[0].name, "frog");
    assert_eq!(plugins[0].version, "0.1.0");
    let schema = &plugins[0].schemas["organism"];
    assert_eq!(schema["$id"], json!("colonycore:frog:organism"));
    assert!(schema["properties"].get("call_frequency_hz").is_some());

    let rules = service.store().rules_engine().rule_names().await;
    assert_eq!(rules.last().map(String::as_str), Some(HABITAT_RULE_NAME));

    let datasets = service.dataset_templates();
    assert_eq!(datasets.len(), 1);
    assert_eq!(datasets[0].key, POPULATION_TEMPLATE_KEY);
    assert_eq!(datasets[0].slug, SLUG);
    assert_eq!(datasets[0].output_formats.len(), 5);
    assert_eq!(datasets[0].columns.len(), 8);
}

#[test]
fn organism_schema_is_a_json_schema_object() {
    let schema = organism_schema();

    assert_eq!(schema["$id"], json!("colonycore:frog:organism"));
    assert_eq!(schema["type"], json!("object"));
    let properties = schema["properties"].as_object().unwrap();
    let mut names: Vec<_> = properties.keys().map(String::as_str).collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec!["call_frequency_hz", "limb_regeneration_notes", "skin_color_index"]
    );
}

// ── Habitat rule ─────────────────────────────────────────────────

#[tokio::test]
async fn frog_in_dry_housing_is_warned_but_committed() {
    let service = make_service().await;

    let (organism, result) = service
        .create(
            &CancellationToken::new(),
            make_organism("O1", "Frog", "adult", "DRY"),
        )
        .await
        .unwrap();

    assert_eq!(organism.base.id, "O1");
    let violations = result.violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].rule(), HABITAT_RULE_NAME);
    assert_eq!(
        violations[0].message(),
        "frog assigned to non-aquatic/non-humid housing"
    );
    assert_eq!(violations[0].entity_id(), "O1");
    assert!(!violations[0].is_blocking());
}

#[tokio::test]
async fn wet_housing_and_other_species_are_not_warned() {
    let service = make_service().await;
    let cancel = CancellationToken::new();

    let (_, frog) = service
        .create(&cancel, make_organism("O1", "frog", "adult", "WET"))
        .await
        .unwrap();
    let (_, newt) = service
        .create(&cancel, make_organism("O2", "newt", "adult", "DRY"))
        .await
        .unwrap();

    assert!(frog.is_empty());
    assert!(newt.is_empty());
}

#[tokio::test]
async fn free_form_environments_are_matched_case_insensitively() {
    let service = make_service().await;
    let cancel = CancellationToken::new();
    for (id, environment) in [
        ("SEMI", "Semi-Aquatic"),
        ("MIST", "Humid Terrarium"),
        ("SAND", "Desert"),
    ] {
        service
            .create(
                &cancel,
                HousingUnit {
                    name: format!("Tank {id}"),
                    facility_id: "F1".into(),
                    capacity: 10,
                    environment: environment.into(),
                    ..Default::default()
                }
                .with_id(id),
            )
            .await
            .unwrap();
    }

    let (_, semi) = service
        .create(&cancel, make_organism("O1", "frog", "adult", "SEMI"))
        .await
        .unwrap();
    let (_, mist) = service
        .create(&cancel, make_organism("O2", "frog", "adult", "MIST"))
        .await
        .unwrap();
    let (_, sand) = service
        .create(&cancel, make_organism("O3", "frog", "adult", "SAND"))
        .await
        .unwrap();

    assert!(semi.is_empty());
    assert!(mist.is_empty());
    let warned: Vec<_> = sand.iter().map(|v| v.entity_id().to_string()).collect();
    assert_eq!(warned, vec!["O3"]);
}

// ── Population dataset ───────────────────────────────────────────

#[tokio::test]
async fn retired_frogs_are_excluded_by_default() {
    let service = make_service().await;
    seed_population(&service).await;

    let result = run_population(&service, json!({}), Scope::default()).await;

    assert_eq!(ids(&result), vec!["O1", "O2"]);
    assert_eq!(result.metadata["row_count"], json!(2));
    assert_eq!(result.metadata["source"], json!("core.organisms"));
    assert_eq!(result.generated_at, fixed_now());
    assert_eq!(result.schema.len(), 8);
}

#[tokio::test]
async fn include_retired_and_stage_filters() {
    let service = make_service().await;
    seed_population(&service).await;

    let with_retired =
        run_population(&service, json!({ "include_retired": true }), Scope::default()).await;
    assert_eq!(ids(&with_retired), vec!["O1", "O2", "O3"]);

    let juveniles =
        run_population(&service, json!({ "stage": "juvenile" }), Scope::default()).await;
    assert_eq!(ids(&juveniles), vec!["O2"]);
    assert_eq!(juveniles.metadata["stage_filter"], json!("juvenile"));
    assert_eq!(juveniles.rows[0]["lifecycle_stage"], json!("juvenile"));
    assert_eq!(juveniles.rows[0]["project_id"], Value::Null);
}

#[tokio::test]
async fn project_scope_limits_rows() {
    let service = make_service().await;
    seed_population(&service).await;

    let scope = Scope {
        requestor: "alice".into(),
        project_ids: vec!["PRJ1".into()],
        ..Default::default()
    };
    let result = run_population(&service, json!({}), scope).await;

    assert_eq!(ids(&result), vec!["O1"]);
    assert_eq!(result.metadata["project_scope"], json!(["PRJ1"]));
}

#[tokio::test]
async fn protocol_scope_excludes_unassigned_frogs() {
    let service = make_service().await;
    seed_population(&service).await;

    let scope = Scope {
        protocol_ids: vec!["P-9".into()],
        ..Default::default()
    };
    let result = run_population(&service, json!({}), scope).await;

    assert!(result.rows.is_empty());
    assert_eq!(result.metadata["row_count"], json!(0));
}

#[tokio::test]
async fn as_of_skips_later_updates() {
    let service = make_service().await;
    seed_population(&service).await;

    let before = run_population(
        &service,
        json!({ "as_of": "2024-03-01T11:59:59Z" }),
        Scope::default(),
    )
    .await;
    assert!(before.rows.is_empty());
    assert!(before.metadata.contains_key("as_of"));

    let at = run_population(
        &service,
        json!({ "as_of": "2024-03-01T12:00:00Z" }),
        Scope::default(),
    )
    .await;
    assert_eq!(ids(&at), vec!["O1", "O2"]);
}

#[tokio::test]
async fn unknown_stage_is_rejected_before_running() {
    let service = make_service().await;
    let mut params = Map::new();
    params.insert("stage".into(), json!("tadpole"));

    let err = service
        .resolve_dataset_template(SLUG)
        .unwrap()
        .run(&params, Scope::default(), Format::Json)
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "parameter validation failed: stage: value must be one of: planned, embryo_larva, juvenile, adult, retired, deceased"
    );
}
