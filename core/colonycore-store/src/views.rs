//! Read-only view implementations over committed records.

use crate::records::{
    Facility, HousingUnit, Observation, Organism, Permit, Project, Protocol, Sample,
    SupplyItem, Treatment,
};
use chrono::{DateTime, Utc};
use colonycore_pluginapi::{
    BaseView, FacilityView, HousingUnitView, ObservationView, OrganismView, PermitView,
    ProjectView, ProtocolView, SampleView, SupplyItemView, TreatmentView,
};
use serde_json::{Map, Value};

macro_rules! base_view {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl BaseView for $ty {
                fn id(&self) -> &str {
                    &self.base.id
                }

                fn created_at(&self) -> DateTime<Utc> {
                    self.base.created_at
                }

                fn updated_at(&self) -> DateTime<Utc> {
                    self.base.updated_at
                }
            }
        )+
    };
}

base_view!(
    Organism,
    HousingUnit,
    Facility,
    Treatment,
    Observation,
    Sample,
    Protocol,
    Permit,
    Project,
    SupplyItem,
);

impl OrganismView for Organism {
    fn name(&self) -> &str {
        &self.name
    }

    fn species(&self) -> &str {
        &self.species
    }

    fn line(&self) -> &str {
        &self.line
    }

    fn line_id(&self) -> Option<&str> {
        self.line_id.as_deref()
    }

    fn strain_id(&self) -> Option<&str> {
        self.strain_id.as_deref()
    }

    fn parent_ids(&self) -> Vec<String> {
        self.parent_ids.clone()
    }

    fn stage(&self) -> &str {
        &self.stage
    }

    fn cohort_id(&self) -> Option<&str> {
        self.cohort_id.as_deref()
    }

    fn housing_id(&self) -> Option<&str> {
        self.housing_id.as_deref()
    }

    fn protocol_id(&self) -> Option<&str> {
        self.protocol_id.as_deref()
    }

    fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    fn attributes(&self) -> Map<String, Value> {
        self.attributes.clone()
    }
}

impl HousingUnitView for HousingUnit {
    fn name(&self) -> &str {
        &self.name
    }

    fn facility_id(&self) -> &str {
        &self.facility_id
    }

    fn capacity(&self) -> u32 {
        self.capacity
    }

    fn environment(&self) -> &str {
        &self.environment
    }

    fn state(&self) -> &str {
        &self.state
    }
}

impl FacilityView for Facility {
    fn code(&self) -> &str {
        &self.code
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn zone(&self) -> &str {
        &self.zone
    }

    fn access_policy(&self) -> &str {
        &self.access_policy
    }

    fn environment_baselines(&self) -> Map<String, Value> {
        self.environment_baselines.clone()
    }

    fn housing_unit_ids(&self) -> Vec<String> {
        self.housing_unit_ids.clone()
    }

    fn project_ids(&self) -> Vec<String> {
        self.project_ids.clone()
    }
}

impl TreatmentView for Treatment {
    fn name(&self) -> &str {
        &self.name
    }

    fn procedure_id(&self) -> &str {
        &self.procedure_id
    }

    fn organism_ids(&self) -> Vec<String> {
        self.organism_ids.clone()
    }

    fn cohort_ids(&self) -> Vec<String> {
        self.cohort_ids.clone()
    }

    fn dosage_plan(&self) -> &str {
        &self.dosage_plan
    }

    fn administration_log(&self) -> Vec<String> {
        self.administration_log.clone()
    }

    fn adverse_events(&self) -> Vec<String> {
        self.adverse_events.clone()
    }
}

impl ObservationView for Observation {
    fn procedure_id(&self) -> Option<&str> {
        self.procedure_id.as_deref()
    }

    fn organism_id(&self) -> Option<&str> {
        self.organism_id.as_deref()
    }

    fn cohort_id(&self) -> Option<&str> {
        self.cohort_id.as_deref()
    }

    fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    fn observer(&self) -> &str {
        &self.observer
    }

    fn data(&self) -> Map<String, Value> {
        self.data.clone()
    }

    fn notes(&self) -> &str {
        &self.notes
    }
}

impl SampleView for Sample {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn source_type(&self) -> &str {
        &self.source_type
    }

    fn organism_id(&self) -> Option<&str> {
        self.organism_id.as_deref()
    }

    fn cohort_id(&self) -> Option<&str> {
        self.cohort_id.as_deref()
    }

    fn facility_id(&self) -> &str {
        &self.facility_id
    }

    fn collected_at(&self) -> DateTime<Utc> {
        self.collected_at
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn storage_location(&self) -> &str {
        &self.storage_location
    }

    fn assay_type(&self) -> &str {
        &self.assay_type
    }

    fn chain_of_custody(&self) -> Vec<Map<String, Value>> {
        self.chain_of_custody.clone()
    }

    fn attributes(&self) -> Map<String, Value> {
        self.attributes.clone()
    }
}

impl ProtocolView for Protocol {
    fn code(&self) -> &str {
        &self.code
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn max_subjects(&self) -> u32 {
        self.max_subjects
    }

    fn status(&self) -> &str {
        &self.status
    }
}

impl PermitView for Permit {
    fn permit_number(&self) -> &str {
        &self.permit_number
    }

    fn authority(&self) -> &str {
        &self.authority
    }

    fn status(&self) -> &str {
        &self.status
    }

    fn valid_from(&self) -> DateTime<Utc> {
        self.valid_from
    }

    fn valid_until(&self) -> Option<DateTime<Utc>> {
        self.valid_until
    }

    fn allowed_activities(&self) -> Vec<String> {
        self.allowed_activities.clone()
    }

    fn facility_ids(&self) -> Vec<String> {
        self.facility_ids.clone()
    }

    fn protocol_ids(&self) -> Vec<String> {
        self.protocol_ids.clone()
    }

    fn notes(&self) -> &str {
        &self.notes
    }
}

impl ProjectView for Project {
    fn code(&self) -> &str {
        &self.code
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn facility_ids(&self) -> Vec<String> {
        self.facility_ids.clone()
    }
}

impl SupplyItemView for SupplyItem {
    fn sku(&self) -> &str {
        &self.sku
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn quantity_on_hand(&self) -> u32 {
        self.quantity_on_hand
    }

    fn unit(&self) -> &str {
        &self.unit
    }

    fn lot_number(&self) -> &str {
        &self.lot_number
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    fn facility_ids(&self) -> Vec<String> {
        self.facility_ids.clone()
    }

    fn project_ids(&self) -> Vec<String> {
        self.project_ids.clone()
    }

    fn reorder_level(&self) -> u32 {
        self.reorder_level
    }

    fn attributes(&self) -> Map<String, Value> {
        self.attributes.clone()
    }
}
