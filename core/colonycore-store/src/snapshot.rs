use crate::records::{
    BreedingUnit, Cohort, Facility, HousingUnit, Observation, Organism, Permit, Procedure,
    Project, Protocol, Record, Sample, SupplyItem, Treatment,
};
use colonycore_pluginapi::{
    FacilityView, HousingUnitView, ObservationView, OrganismView, PermitView, ProjectView,
    ProtocolView, RuleView, SampleView, SupplyItemView, TreatmentView,
};
use std::collections::BTreeMap;

/// Immutable point-in-time copy of every record table.
///
/// Committed state is published as `Arc<StoreSnapshot>`; a transaction works
/// on its own clone and the commit swaps the pointer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    pub(crate) organisms: BTreeMap<String, Organism>,
    pub(crate) cohorts: BTreeMap<String, Cohort>,
    pub(crate) housing_units: BTreeMap<String, HousingUnit>,
    pub(crate) breeding_units: BTreeMap<String, BreedingUnit>,
    pub(crate) facilities: BTreeMap<String, Facility>,
    pub(crate) procedures: BTreeMap<String, Procedure>,
    pub(crate) treatments: BTreeMap<String, Treatment>,
    pub(crate) observations: BTreeMap<String, Observation>,
    pub(crate) samples: BTreeMap<String, Sample>,
    pub(crate) protocols: BTreeMap<String, Protocol>,
    pub(crate) permits: BTreeMap<String, Permit>,
    pub(crate) projects: BTreeMap<String, Project>,
    pub(crate) supply_items: BTreeMap<String, SupplyItem>,
}

impl StoreSnapshot {
    pub fn get<R: Record>(&self, id: &str) -> Option<&R> {
        R::table(self).get(id)
    }

    /// Records of kind `R`, ordered by id.
    pub fn iter<R: Record>(&self) -> impl Iterator<Item = &R> {
        R::table(self).values()
    }

    pub fn count<R: Record>(&self) -> usize {
        R::table(self).len()
    }

    /// Recomputes the facility back-references derived from housing units and
    /// projects.
    pub(crate) fn reindex(&mut self) {
        let mut housing: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for unit in self.housing_units.values() {
            housing
                .entry(unit.facility_id.as_str())
                .or_default()
                .push(unit.base.id.clone());
        }
        let mut projects: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for project in self.projects.values() {
            for facility in &project.facility_ids {
                projects
                    .entry(facility.as_str())
                    .or_default()
                    .push(project.base.id.clone());
            }
        }
        for (id, facility) in &mut self.facilities {
            facility.housing_unit_ids = housing.remove(id.as_str()).unwrap_or_default();
            facility.project_ids = projects.remove(id.as_str()).unwrap_or_default();
        }
    }
}

macro_rules! list_find {
    ($list:ident, $find:ident, $table:ident, $view:ident) => {
        fn $list(&self) -> Vec<&dyn $view> {
            self.$table.values().map(|r| r as &dyn $view).collect()
        }

        fn $find(&self, id: &str) -> Option<&dyn $view> {
            self.$table.get(id).map(|r| r as &dyn $view)
        }
    };
}

impl RuleView for StoreSnapshot {
    list_find!(list_organisms, find_organism, organisms, OrganismView);
    list_find!(list_housing_units, find_housing_unit, housing_units, HousingUnitView);
    list_find!(list_facilities, find_facility, facilities, FacilityView);
    list_find!(list_treatments, find_treatment, treatments, TreatmentView);
    list_find!(list_observations, find_observation, observations, ObservationView);
    list_find!(list_samples, find_sample, samples, SampleView);
    list_find!(list_protocols, find_protocol, protocols, ProtocolView);
    list_find!(list_permits, find_permit, permits, PermitView);
    list_find!(list_projects, find_project, projects, ProjectView);
    list_find!(list_supply_items, find_supply_item, supply_items, SupplyItemView);
}
