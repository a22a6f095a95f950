use colonycore_types::{
    ActionContext, EntityContext, EntityTypeRef, ExtensionContributorContext,
    ExtensionHookContext, FacilityContext, HousingContext, LifecycleStageContext,
    ObservationContext, OpaqueRef, PermitContext, ProtocolContext, SampleContext,
    SeverityContext, SupplyContext, TreatmentContext,
};

// ── Equality ─────────────────────────────────────────────────────

#[test]
fn same_value_refs_are_equal() {
    let entities = EntityContext::new();
    assert!(entities.organism().equals(&entities.organism()));
    assert_eq!(entities.organism(), EntityContext::new().organism());
}

#[test]
fn distinct_values_are_not_equal() {
    let entities = EntityContext::new();
    assert!(!entities.organism().equals(&entities.housing_unit()));
    assert_ne!(entities.organism(), entities.cohort());
}

#[test]
fn equals_rejects_other_kinds() {
    let entity = EntityContext::new().organism();
    let action = ActionContext::new().create();
    let severity = SeverityContext::new().block();

    assert!(!entity.equals(&action));
    assert!(!action.equals(&entity));
    assert!(!severity.equals(&entity));
    assert!(!entity.equals(&"organism"));
    assert!(!entity.equals(&String::from("organism")));
}

const ORGANISM: EntityTypeRef = EntityContext::new().organism();

#[test]
fn equals_rejects_reference_and_boxed_variants() {
    let reference: &'static EntityTypeRef = &ORGANISM;
    let boxed = Box::new(ORGANISM);

    assert!(!ORGANISM.equals(&reference));
    assert!(!ORGANISM.equals(&boxed));
    assert!(ORGANISM.equals(reference));
}

#[test]
fn equality_is_symmetric_for_every_lifecycle_stage() {
    let stages = LifecycleStageContext::new().all();
    for (i, a) in stages.iter().enumerate() {
        for (j, b) in stages.iter().enumerate() {
            assert_eq!(a.equals(b), i == j, "{a} vs {b}");
            assert_eq!(a.equals(b), b.equals(a));
        }
    }
}

#[test]
fn display_exposes_identifier() {
    assert_eq!(EntityContext::new().supply_item().to_string(), "supply_item");
    assert_eq!(LifecycleStageContext::new().larva().to_string(), "embryo_larva");
    assert_eq!(
        format!("{:?}", SeverityContext::new().warn()),
        "SeverityRef(\"warn\")"
    );
}

// ── Predicates ───────────────────────────────────────────────────

#[test]
fn entity_core_membership() {
    let entities = EntityContext::new();
    assert!(entities.organism().is_core());
    assert!(entities.supply_item().is_core());
    assert!(!entities.cohort().is_core());
    assert!(!entities.breeding_unit().is_core());
    assert!(!entities.line().is_core());
    assert!(!entities.genotype_marker().is_core());
}

#[test]
fn severity_predicates() {
    let severities = SeverityContext::new();
    assert!(severities.block().is_blocking());
    assert!(!severities.warn().is_blocking());
    assert!(severities.warn().is_warning());
    assert!(severities.log().is_log());
}

#[test]
fn action_predicates() {
    let actions = ActionContext::new();
    assert!(actions.create().is_mutation());
    assert!(actions.update().is_mutation());
    assert!(actions.delete().is_destructive());
    assert!(!actions.update().is_destructive());
}

#[test]
fn lifecycle_activity() {
    let stages = LifecycleStageContext::new();
    assert!(stages.planned().is_active());
    assert!(stages.adult().is_active());
    assert!(!stages.retired().is_active());
    assert!(stages.deceased().is_terminal());
}

#[test]
fn housing_environment_predicates() {
    let housing = HousingContext::new();
    assert!(housing.aquatic().is_aquatic());
    assert!(housing.aquatic().is_humid());
    assert!(housing.humid().is_humid());
    assert!(!housing.terrestrial().is_humid());
    assert!(!housing.arboreal().is_aquatic());
    assert!(housing.states().decommissioned().is_decommissioned());
    assert!(housing.states().active().is_active());
}

#[test]
fn protocol_status_predicates() {
    let protocols = ProtocolContext::new();
    assert!(protocols.active().is_active());
    assert!(protocols.completed().is_terminal());
    assert!(protocols.cancelled().is_terminal());
    assert!(!protocols.suspended().is_terminal());
}

#[test]
fn facility_predicates() {
    let facility = FacilityContext::new();
    assert!(facility.zones().biosecure().is_biosecure());
    assert!(facility.zones().quarantine().is_quarantine());
    assert!(!facility.zones().general().is_biosecure());
    assert!(facility.access_policies().restricted().is_restricted());
    assert!(facility.access_policies().open().allows_visitors());
    assert!(!facility.access_policies().staff_only().allows_visitors());
}

#[test]
fn sample_supply_treatment_permit_predicates() {
    let samples = SampleContext::new().statuses();
    assert!(samples.stored().is_available());
    assert!(samples.in_transit().is_available());
    assert!(samples.consumed().is_terminal());
    assert!(!SampleContext::new()
        .sources()
        .organism()
        .equals(&SampleContext::new().sources().cohort()));

    let supplies = SupplyContext::new().statuses();
    assert!(supplies.reorder().requires_reorder());
    assert!(supplies.critical().requires_reorder());
    assert!(!supplies.healthy().requires_reorder());
    assert!(supplies.expired().is_expired());

    let treatments = TreatmentContext::new().statuses();
    assert!(treatments.in_progress().is_active());
    assert!(treatments.completed().is_completed());
    assert!(treatments.flagged().is_flagged());

    let permits = PermitContext::new().statuses();
    assert!(permits.approved().is_active());
    assert!(!permits.submitted().is_active());
    assert!(permits.archived().is_archived());

    let shapes = ObservationContext::new().shapes();
    assert!(shapes.mixed().has_structured_payload());
    assert!(shapes.mixed().has_narrative_notes());
    assert!(!shapes.narrative().has_structured_payload());
}

#[test]
fn extension_refs_compare_by_identifier() {
    let hooks = ExtensionHookContext::new();
    let contributors = ExtensionContributorContext::new();

    assert!(hooks.sample_attributes().equals(&hooks.sample_attributes()));
    assert!(!hooks.sample_attributes().equals(&hooks.organism_attributes()));
    assert!(!hooks.sample_attributes().equals(&contributors.core()));
    assert!(contributors.core().is_core());
    assert_eq!(contributors.custom("frog"), contributors.custom("frog"));
    assert!(hooks.strain_attributes().is_known());
    assert_eq!(hooks.all().len(), 10);
}
