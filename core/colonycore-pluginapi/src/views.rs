//! Getter-only projections of stored entities.
//!
//! Implementors supply the scalar accessors; every contextual accessor
//! (`get_*`, `is_*`) is derived from them here, so the two families can never
//! disagree for the same entity.

use chrono::{DateTime, Utc};
use colonycore_types::{
    EnvironmentTypeRef, ExtensionHookContext, ExtensionSet, FacilityAccessPolicyRef,
    FacilityContext, FacilityZoneRef, HousingContext, HousingStateRef, LifecycleStageContext,
    LifecycleStageRef, ObservationContext, ObservationShapeRef, PermitContext, PermitStatusRef,
    ProtocolContext, ProtocolStatusRef, SampleContext, SampleSourceRef, SampleStatusRef,
    SupplyContext, SupplyStatusRef, TreatmentContext, TreatmentStatusRef,
};
use serde_json::{Map, Value};

/// Fields every stored entity carries.
pub trait BaseView: Send + Sync {
    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;
}

pub trait OrganismView: BaseView {
    fn name(&self) -> &str;
    fn species(&self) -> &str;
    fn line(&self) -> &str;
    fn line_id(&self) -> Option<&str>;
    fn strain_id(&self) -> Option<&str>;
    fn parent_ids(&self) -> Vec<String>;
    /// Raw stage identifier. Prefer [`OrganismView::get_current_stage`].
    fn stage(&self) -> &str;
    fn cohort_id(&self) -> Option<&str>;
    fn housing_id(&self) -> Option<&str>;
    fn protocol_id(&self) -> Option<&str>;
    fn project_id(&self) -> Option<&str>;
    /// Deep copy of the free-form attribute map.
    fn attributes(&self) -> Map<String, Value>;

    /// Unknown stage identifiers read as adult.
    fn get_current_stage(&self) -> LifecycleStageRef {
        let stages = LifecycleStageContext::new();
        match self.stage() {
            "planned" => stages.planned(),
            "embryo_larva" => stages.larva(),
            "juvenile" => stages.juvenile(),
            "retired" => stages.retired(),
            "deceased" => stages.deceased(),
            _ => stages.adult(),
        }
    }

    fn is_active(&self) -> bool {
        self.get_current_stage().is_active()
    }

    fn is_retired(&self) -> bool {
        self.get_current_stage() == LifecycleStageContext::new().retired()
    }

    fn is_deceased(&self) -> bool {
        self.get_current_stage() == LifecycleStageContext::new().deceased()
    }

    /// Attributes exposed as the core contribution to the organism hook.
    fn extensions(&self) -> ExtensionSet {
        core_extension(ExtensionHookContext::new().organism_attributes(), self.attributes())
    }
}

pub trait HousingUnitView: BaseView {
    fn name(&self) -> &str;
    fn facility_id(&self) -> &str;
    fn capacity(&self) -> u32;
    fn environment(&self) -> &str;
    fn state(&self) -> &str;

    /// Unknown environments read as terrestrial.
    fn get_environment_type(&self) -> EnvironmentTypeRef {
        let housing = HousingContext::new();
        match self.environment() {
            "aquatic" => housing.aquatic(),
            "arboreal" => housing.arboreal(),
            "humid" => housing.humid(),
            _ => housing.terrestrial(),
        }
    }

    /// Unknown states read as active.
    fn get_state(&self) -> HousingStateRef {
        let states = HousingContext::new().states();
        match self.state() {
            "quarantine" => states.quarantine(),
            "cleaning" => states.cleaning(),
            "decommissioned" => states.decommissioned(),
            _ => states.active(),
        }
    }

    fn is_aquatic_environment(&self) -> bool {
        self.get_environment_type().is_aquatic()
    }

    fn is_humid_environment(&self) -> bool {
        self.get_environment_type().is_humid()
    }

    fn supports_species(&self, species: &str) -> bool {
        let environment = self.get_environment_type();
        match species {
            "frog" | "amphibian" => environment.is_aquatic() || environment.is_humid(),
            "fish" => environment.is_aquatic(),
            _ => !environment.is_aquatic(),
        }
    }
}

pub trait FacilityView: BaseView {
    fn code(&self) -> &str;
    fn name(&self) -> &str;
    fn zone(&self) -> &str;
    fn access_policy(&self) -> &str;
    fn environment_baselines(&self) -> Map<String, Value>;
    fn housing_unit_ids(&self) -> Vec<String>;
    fn project_ids(&self) -> Vec<String>;

    fn get_zone(&self) -> FacilityZoneRef {
        let zones = FacilityContext::new().zones();
        let zone = self.zone().trim().to_ascii_lowercase();
        if zone.contains("bio") || zone.contains("bsl") {
            zones.biosecure()
        } else if zone.contains("quarantine") || zone.contains("isolation") {
            zones.quarantine()
        } else {
            zones.general()
        }
    }

    fn get_access_policy(&self) -> FacilityAccessPolicyRef {
        let policies = FacilityContext::new().access_policies();
        let policy = self.access_policy().trim().to_ascii_lowercase();
        if policy.contains("restricted") || policy.contains("secure") {
            policies.restricted()
        } else if policy.contains("staff") {
            policies.staff_only()
        } else {
            policies.open()
        }
    }

    fn supports_housing_unit(&self, id: &str) -> bool {
        self.housing_unit_ids().iter().any(|candidate| candidate == id)
    }

    fn extensions(&self) -> ExtensionSet {
        core_extension(
            ExtensionHookContext::new().facility_environment_baselines(),
            self.environment_baselines(),
        )
    }
}

pub trait TreatmentView: BaseView {
    fn name(&self) -> &str;
    fn procedure_id(&self) -> &str;
    fn organism_ids(&self) -> Vec<String>;
    fn cohort_ids(&self) -> Vec<String>;
    fn dosage_plan(&self) -> &str;
    fn administration_log(&self) -> Vec<String>;
    fn adverse_events(&self) -> Vec<String>;

    /// Derived from the logs: nothing administered is planned, any adverse
    /// event flags the treatment.
    fn get_current_status(&self) -> TreatmentStatusRef {
        let statuses = TreatmentContext::new().statuses();
        if self.administration_log().is_empty() {
            statuses.planned()
        } else if self.adverse_events().is_empty() {
            statuses.completed()
        } else {
            statuses.flagged()
        }
    }

    fn is_completed(&self) -> bool {
        let status = self.get_current_status();
        status.is_completed() || status.is_flagged()
    }

    fn has_adverse_events(&self) -> bool {
        !self.adverse_events().is_empty()
    }
}

pub trait ObservationView: BaseView {
    fn procedure_id(&self) -> Option<&str>;
    fn organism_id(&self) -> Option<&str>;
    fn cohort_id(&self) -> Option<&str>;
    fn recorded_at(&self) -> DateTime<Utc>;
    fn observer(&self) -> &str;
    fn data(&self) -> Map<String, Value>;
    fn notes(&self) -> &str;

    fn get_data_shape(&self) -> ObservationShapeRef {
        let shapes = ObservationContext::new().shapes();
        let structured = !self.data().is_empty();
        let narrative = !self.notes().trim().is_empty();
        match (structured, narrative) {
            (true, true) => shapes.mixed(),
            (true, false) => shapes.structured(),
            _ => shapes.narrative(),
        }
    }

    fn has_structured_payload(&self) -> bool {
        self.get_data_shape().has_structured_payload()
    }

    fn has_narrative_notes(&self) -> bool {
        self.get_data_shape().has_narrative_notes()
    }

    fn extensions(&self) -> ExtensionSet {
        core_extension(ExtensionHookContext::new().observation_data(), self.data())
    }
}

pub trait SampleView: BaseView {
    fn identifier(&self) -> &str;
    fn source_type(&self) -> &str;
    fn organism_id(&self) -> Option<&str>;
    fn cohort_id(&self) -> Option<&str>;
    fn facility_id(&self) -> &str;
    fn collected_at(&self) -> DateTime<Utc>;
    fn status(&self) -> &str;
    fn storage_location(&self) -> &str;
    fn assay_type(&self) -> &str;
    fn chain_of_custody(&self) -> Vec<Map<String, Value>>;
    fn attributes(&self) -> Map<String, Value>;

    fn get_source(&self) -> SampleSourceRef {
        let sources = SampleContext::new().sources();
        match self.source_type().trim().to_ascii_lowercase().as_str() {
            "organism" => sources.organism(),
            "cohort" => sources.cohort(),
            "environment" | "environmental" => sources.environmental(),
            _ => sources.unknown(),
        }
    }

    /// Unknown statuses read as stored.
    fn get_status(&self) -> SampleStatusRef {
        let statuses = SampleContext::new().statuses();
        match self.status().trim().to_ascii_lowercase().as_str() {
            "in_transit" | "in-transit" | "transit" => statuses.in_transit(),
            "consumed" => statuses.consumed(),
            "disposed" => statuses.disposed(),
            _ => statuses.stored(),
        }
    }

    fn is_available(&self) -> bool {
        self.get_status().is_available()
    }

    fn extensions(&self) -> ExtensionSet {
        core_extension(ExtensionHookContext::new().sample_attributes(), self.attributes())
    }
}

pub trait ProtocolView: BaseView {
    fn code(&self) -> &str;
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn max_subjects(&self) -> u32;
    fn status(&self) -> &str;

    /// Unknown statuses read as draft.
    fn get_current_status(&self) -> ProtocolStatusRef {
        let protocols = ProtocolContext::new();
        match self.status() {
            "active" => protocols.active(),
            "suspended" => protocols.suspended(),
            "completed" => protocols.completed(),
            "cancelled" => protocols.cancelled(),
            _ => protocols.draft(),
        }
    }

    fn is_active_protocol(&self) -> bool {
        self.get_current_status().is_active()
    }

    fn is_terminal_status(&self) -> bool {
        self.get_current_status().is_terminal()
    }

    fn can_accept_new_subjects(&self) -> bool {
        self.is_active_protocol() && self.max_subjects() > 0
    }
}

pub trait PermitView: BaseView {
    fn permit_number(&self) -> &str;
    fn authority(&self) -> &str;
    fn status(&self) -> &str;
    fn valid_from(&self) -> DateTime<Utc>;
    fn valid_until(&self) -> Option<DateTime<Utc>>;
    fn allowed_activities(&self) -> Vec<String>;
    fn facility_ids(&self) -> Vec<String>;
    fn protocol_ids(&self) -> Vec<String>;
    fn notes(&self) -> &str;

    /// Status at `reference`. Draft, on-hold and archived permits keep their
    /// recorded status; otherwise the validity window decides.
    fn get_status(&self, reference: DateTime<Utc>) -> PermitStatusRef {
        let statuses = PermitContext::new().statuses();
        match self.status() {
            "draft" => return statuses.draft(),
            "on_hold" => return statuses.on_hold(),
            "archived" => return statuses.archived(),
            _ => {}
        }
        if reference < self.valid_from() {
            statuses.submitted()
        } else if self.valid_until().is_some_and(|until| reference > until) {
            statuses.expired()
        } else {
            statuses.approved()
        }
    }

    fn is_active(&self, reference: DateTime<Utc>) -> bool {
        self.get_status(reference).is_active()
    }

    fn is_expired(&self, reference: DateTime<Utc>) -> bool {
        self.get_status(reference).is_expired()
    }
}

pub trait ProjectView: BaseView {
    fn code(&self) -> &str;
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn facility_ids(&self) -> Vec<String>;
}

pub trait SupplyItemView: BaseView {
    fn sku(&self) -> &str;
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn quantity_on_hand(&self) -> u32;
    fn unit(&self) -> &str;
    fn lot_number(&self) -> &str;
    fn expires_at(&self) -> Option<DateTime<Utc>>;
    fn facility_ids(&self) -> Vec<String>;
    fn project_ids(&self) -> Vec<String>;
    fn reorder_level(&self) -> u32;
    fn attributes(&self) -> Map<String, Value>;

    fn get_inventory_status(&self, reference: DateTime<Utc>) -> SupplyStatusRef {
        let statuses = SupplyContext::new().statuses();
        if self.expires_at().is_some_and(|expires| expires < reference) {
            return statuses.expired();
        }
        let quantity = self.quantity_on_hand();
        let reorder = self.reorder_level();
        if quantity == 0 {
            statuses.critical()
        } else if reorder > 0 && quantity <= reorder {
            statuses.reorder()
        } else {
            statuses.healthy()
        }
    }

    fn requires_reorder(&self, reference: DateTime<Utc>) -> bool {
        self.get_inventory_status(reference).requires_reorder()
    }

    fn is_expired(&self, reference: DateTime<Utc>) -> bool {
        self.get_inventory_status(reference).is_expired()
    }

    fn extensions(&self) -> ExtensionSet {
        core_extension(ExtensionHookContext::new().supply_item_attributes(), self.attributes())
    }
}

/// Point-in-time, read-only view over every entity collection.
///
/// Lists are ordered by id.
pub trait RuleView: Send + Sync {
    fn list_organisms(&self) -> Vec<&dyn OrganismView>;
    fn find_organism(&self, id: &str) -> Option<&dyn OrganismView>;

    fn list_housing_units(&self) -> Vec<&dyn HousingUnitView>;
    fn find_housing_unit(&self, id: &str) -> Option<&dyn HousingUnitView>;

    fn list_facilities(&self) -> Vec<&dyn FacilityView>;
    fn find_facility(&self, id: &str) -> Option<&dyn FacilityView>;

    fn list_treatments(&self) -> Vec<&dyn TreatmentView>;
    fn find_treatment(&self, id: &str) -> Option<&dyn TreatmentView>;

    fn list_observations(&self) -> Vec<&dyn ObservationView>;
    fn find_observation(&self, id: &str) -> Option<&dyn ObservationView>;

    fn list_samples(&self) -> Vec<&dyn SampleView>;
    fn find_sample(&self, id: &str) -> Option<&dyn SampleView>;

    fn list_protocols(&self) -> Vec<&dyn ProtocolView>;
    fn find_protocol(&self, id: &str) -> Option<&dyn ProtocolView>;

    fn list_permits(&self) -> Vec<&dyn PermitView>;
    fn find_permit(&self, id: &str) -> Option<&dyn PermitView>;

    fn list_projects(&self) -> Vec<&dyn ProjectView>;
    fn find_project(&self, id: &str) -> Option<&dyn ProjectView>;

    fn list_supply_items(&self) -> Vec<&dyn SupplyItemView>;
    fn find_supply_item(&self, id: &str) -> Option<&dyn SupplyItemView>;
}

fn core_extension(hook: colonycore_types::HookRef, values: Map<String, Value>) -> ExtensionSet {
    if values.is_empty() {
        return ExtensionSet::default();
    }
    ExtensionSet::with_core(&hook, values)
}
