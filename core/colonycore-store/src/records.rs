//! Domain records held by the store.
//!
//! Every record embeds a [`Base`] and implements the sealed [`Record`] trait,
//! which lets [`Transaction`](crate::Transaction) stay generic over kinds.

use crate::error::{StoreError, StoreResult};
use crate::snapshot::StoreSnapshot;
use chrono::{DateTime, Utc};
use colonycore_types::{EntityContext, EntityTypeRef};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

mod private {
    pub trait Sealed {}
}

/// Identity and timestamps shared by every record. The store assigns all three.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Base {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A kind of record the store can stage, validate and commit.
pub trait Record: private::Sealed + Clone + Serialize + Send + Sync + 'static {
    const ENTITY: EntityTypeRef;
    /// Human label used in error messages, e.g. `housing unit`.
    const LABEL: &'static str;

    fn id(&self) -> &str;

    fn base(&self) -> &Base;

    fn base_mut(&mut self) -> &mut Base;

    #[must_use]
    fn with_id(mut self, id: impl Into<String>) -> Self {
        self.base_mut().id = id.into();
        self
    }

    #[doc(hidden)]
    fn table(state: &StoreSnapshot) -> &BTreeMap<String, Self>;

    #[doc(hidden)]
    fn table_mut(state: &mut StoreSnapshot) -> &mut BTreeMap<String, Self>;

    /// Fills defaulted fields before validation.
    fn normalize(&mut self) {}

    /// Structural and referential checks against the staged state.
    fn validate(&self, _state: &StoreSnapshot) -> StoreResult<()> {
        Ok(())
    }

    /// Refuses deletion while other records still point at `id`.
    fn check_delete(_id: &str, _state: &StoreSnapshot) -> StoreResult<()> {
        Ok(())
    }
}

macro_rules! record {
    ($ty:ident => $table:ident, $entity:ident, $label:literal $(, { $($extra:tt)* })?) => {
        impl private::Sealed for $ty {}

        impl Record for $ty {
            const ENTITY: EntityTypeRef = EntityContext::new().$entity();
            const LABEL: &'static str = $label;

            fn id(&self) -> &str {
                &self.base.id
            }

            fn base(&self) -> &Base {
                &self.base
            }

            fn base_mut(&mut self) -> &mut Base {
                &mut self.base
            }

            fn table(state: &StoreSnapshot) -> &BTreeMap<String, Self> {
                &state.$table
            }

            fn table_mut(state: &mut StoreSnapshot) -> &mut BTreeMap<String, Self> {
                &mut state.$table
            }

            $($($extra)*)?
        }
    };
}

fn require<R: Record>(state: &StoreSnapshot, id: &str, owner: &'static str) -> StoreResult<()> {
    if R::table(state).contains_key(id) {
        Ok(())
    } else {
        Err(StoreError::MissingReference {
            kind: R::LABEL,
            id: id.to_string(),
            owner,
        })
    }
}

fn require_opt<R: Record>(
    state: &StoreSnapshot,
    id: Option<&str>,
    owner: &'static str,
) -> StoreResult<()> {
    match id {
        Some(id) => require::<R>(state, id, owner),
        None => Ok(()),
    }
}

/// Fails when any record of kind `R` satisfies `references`.
fn refuse_if_referenced<R: Record>(
    state: &StoreSnapshot,
    kind: &'static str,
    id: &str,
    references: impl Fn(&R) -> bool,
) -> StoreResult<()> {
    match R::table(state).values().find(|record| references(record)) {
        Some(record) => Err(StoreError::StillReferenced {
            kind,
            id: id.to_string(),
            by_kind: R::LABEL,
            by_id: record.id().to_string(),
        }),
        None => Ok(()),
    }
}

fn default_if_empty(field: &mut String, default: &str) {
    if field.trim().is_empty() {
        *field = default.to_string();
    }
}

// ── Organisms and groups ─────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub species: String,
    #[serde(default)]
    pub line: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strain_id: Option<String>,
    #[serde(default)]
    pub parent_ids: Vec<String>,
    pub stage: String,
    pub cohort_id: Option<String>,
    pub housing_id: Option<String>,
    pub protocol_id: Option<String>,
    pub project_id: Option<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

record!(Organism => organisms, organism, "organism", {
    fn normalize(&mut self) {
        default_if_empty(&mut self.stage, "planned");
    }

    fn validate(&self, state: &StoreSnapshot) -> StoreResult<()> {
        require_opt::<Cohort>(state, self.cohort_id.as_deref(), Self::LABEL)?;
        require_opt::<HousingUnit>(state, self.housing_id.as_deref(), Self::LABEL)?;
        require_opt::<Protocol>(state, self.protocol_id.as_deref(), Self::LABEL)?;
        require_opt::<Project>(state, self.project_id.as_deref(), Self::LABEL)
    }

    fn check_delete(id: &str, state: &StoreSnapshot) -> StoreResult<()> {
        refuse_if_referenced::<Sample>(state, Self::LABEL, id, |s| {
            s.organism_id.as_deref() == Some(id)
        })
    }
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub purpose: String,
    pub project_id: Option<String>,
    pub housing_id: Option<String>,
    pub protocol_id: Option<String>,
}

record!(Cohort => cohorts, cohort, "cohort", {
    fn validate(&self, state: &StoreSnapshot) -> StoreResult<()> {
        require_opt::<Project>(state, self.project_id.as_deref(), Self::LABEL)?;
        require_opt::<HousingUnit>(state, self.housing_id.as_deref(), Self::LABEL)?;
        require_opt::<Protocol>(state, self.protocol_id.as_deref(), Self::LABEL)
    }

    fn check_delete(id: &str, state: &StoreSnapshot) -> StoreResult<()> {
        refuse_if_referenced::<Sample>(state, Self::LABEL, id, |s| {
            s.cohort_id.as_deref() == Some(id)
        })
    }
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreedingUnit {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub strategy: String,
    pub housing_id: Option<String>,
    pub protocol_id: Option<String>,
    #[serde(default)]
    pub female_ids: Vec<String>,
    #[serde(default)]
    pub male_ids: Vec<String>,
}

record!(BreedingUnit => breeding_units, breeding_unit, "breeding unit", {
    fn validate(&self, state: &StoreSnapshot) -> StoreResult<()> {
        require_opt::<HousingUnit>(state, self.housing_id.as_deref(), Self::LABEL)?;
        require_opt::<Protocol>(state, self.protocol_id.as_deref(), Self::LABEL)?;
        for id in self.female_ids.iter().chain(&self.male_ids) {
            require::<Organism>(state, id, Self::LABEL)?;
        }
        Ok(())
    }
});

// ── Facilities and housing ───────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    #[serde(flatten)]
    pub base: Base,
    pub code: String,
    pub name: String,
    pub zone: String,
    pub access_policy: String,
    #[serde(default)]
    pub environment_baselines: Map<String, Value>,
    /// Maintained by the store from housing unit records.
    #[serde(default)]
    pub housing_unit_ids: Vec<String>,
    /// Maintained by the store from project records.
    #[serde(default)]
    pub project_ids: Vec<String>,
}

record!(Facility => facilities, facility, "facility", {
    fn check_delete(id: &str, state: &StoreSnapshot) -> StoreResult<()> {
        refuse_if_referenced::<HousingUnit>(state, Self::LABEL, id, |h| h.facility_id == id)?;
        refuse_if_referenced::<Sample>(state, Self::LABEL, id, |s| s.facility_id == id)?;
        refuse_if_referenced::<Project>(state, Self::LABEL, id, |p| {
            p.facility_ids.iter().any(|f| f == id)
        })?;
        refuse_if_referenced::<Permit>(state, Self::LABEL, id, |p| {
            p.facility_ids.iter().any(|f| f == id)
        })?;
        refuse_if_referenced::<SupplyItem>(state, Self::LABEL, id, |s| {
            s.facility_ids.iter().any(|f| f == id)
        })
    }
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HousingUnit {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub facility_id: String,
    pub capacity: u32,
    pub environment: String,
    pub state: String,
}

record!(HousingUnit => housing_units, housing_unit, "housing unit", {
    fn normalize(&mut self) {
        default_if_empty(&mut self.environment, "terrestrial");
        default_if_empty(&mut self.state, "active");
    }

    fn validate(&self, state: &StoreSnapshot) -> StoreResult<()> {
        if self.facility_id.trim().is_empty() {
            return Err(StoreError::invalid("housing unit requires facility id"));
        }
        require::<Facility>(state, &self.facility_id, Self::LABEL)?;
        if self.capacity == 0 {
            return Err(StoreError::invalid("housing capacity must be positive"));
        }
        Ok(())
    }

    fn check_delete(id: &str, state: &StoreSnapshot) -> StoreResult<()> {
        refuse_if_referenced::<Organism>(state, Self::LABEL, id, |o| {
            o.housing_id.as_deref() == Some(id)
        })
    }
});

// ── Protocols and procedures ─────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Protocol {
    #[serde(flatten)]
    pub base: Base,
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Zero means unlimited.
    pub max_subjects: u32,
    pub status: String,
}

record!(Protocol => protocols, protocol, "protocol", {
    fn normalize(&mut self) {
        default_if_empty(&mut self.status, "draft");
    }

    fn check_delete(id: &str, state: &StoreSnapshot) -> StoreResult<()> {
        refuse_if_referenced::<Procedure>(state, Self::LABEL, id, |p| p.protocol_id == id)?;
        refuse_if_referenced::<Permit>(state, Self::LABEL, id, |p| {
            p.protocol_ids.iter().any(|candidate| candidate == id)
        })
    }
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Procedure {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    pub status: String,
    pub scheduled_at: DateTime<Utc>,
    pub protocol_id: String,
    pub cohort_id: Option<String>,
    #[serde(default)]
    pub organism_ids: Vec<String>,
}

record!(Procedure => procedures, procedure, "procedure", {
    fn normalize(&mut self) {
        default_if_empty(&mut self.status, "scheduled");
    }

    fn validate(&self, state: &StoreSnapshot) -> StoreResult<()> {
        if self.protocol_id.trim().is_empty() {
            return Err(StoreError::invalid("procedure requires protocol id"));
        }
        require::<Protocol>(state, &self.protocol_id, Self::LABEL)?;
        require_opt::<Cohort>(state, self.cohort_id.as_deref(), Self::LABEL)
    }

    fn check_delete(id: &str, state: &StoreSnapshot) -> StoreResult<()> {
        refuse_if_referenced::<Treatment>(state, Self::LABEL, id, |t| t.procedure_id == id)
    }
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Treatment {
    #[serde(flatten)]
    pub base: Base,
    pub name: String,
    /// Workflow status checked by `lifecycle_transition`. Views derive their
    /// status from the logs instead.
    pub status: String,
    pub procedure_id: String,
    #[serde(default)]
    pub organism_ids: Vec<String>,
    #[serde(default)]
    pub cohort_ids: Vec<String>,
    #[serde(default)]
    pub dosage_plan: String,
    #[serde(default)]
    pub administration_log: Vec<String>,
    #[serde(default)]
    pub adverse_events: Vec<String>,
}

record!(Treatment => treatments, treatment, "treatment", {
    fn normalize(&mut self) {
        default_if_empty(&mut self.status, "planned");
    }

    fn validate(&self, state: &StoreSnapshot) -> StoreResult<()> {
        if self.procedure_id.trim().is_empty() {
            return Err(StoreError::invalid("treatment requires procedure id"));
        }
        require::<Procedure>(state, &self.procedure_id, Self::LABEL)
    }
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(flatten)]
    pub base: Base,
    pub procedure_id: Option<String>,
    pub organism_id: Option<String>,
    pub cohort_id: Option<String>,
    pub recorded_at: DateTime<Utc>,
    pub observer: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub notes: String,
}

record!(Observation => observations, observation, "observation", {
    fn validate(&self, state: &StoreSnapshot) -> StoreResult<()> {
        if self.procedure_id.is_none() && self.organism_id.is_none() && self.cohort_id.is_none() {
            return Err(StoreError::invalid(
                "observation requires procedure, organism, or cohort reference",
            ));
        }
        require_opt::<Procedure>(state, self.procedure_id.as_deref(), Self::LABEL)?;
        require_opt::<Organism>(state, self.organism_id.as_deref(), Self::LABEL)?;
        require_opt::<Cohort>(state, self.cohort_id.as_deref(), Self::LABEL)
    }
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(flatten)]
    pub base: Base,
    pub identifier: String,
    pub source_type: String,
    pub organism_id: Option<String>,
    pub cohort_id: Option<String>,
    pub facility_id: String,
    pub collected_at: DateTime<Utc>,
    pub status: String,
    #[serde(default)]
    pub storage_location: String,
    #[serde(default)]
    pub assay_type: String,
    #[serde(default)]
    pub chain_of_custody: Vec<Map<String, Value>>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

record!(Sample => samples, sample, "sample", {
    fn normalize(&mut self) {
        default_if_empty(&mut self.status, "stored");
    }

    fn validate(&self, state: &StoreSnapshot) -> StoreResult<()> {
        if self.facility_id.trim().is_empty() {
            return Err(StoreError::invalid("sample requires facility id"));
        }
        require::<Facility>(state, &self.facility_id, Self::LABEL)?;
        if self.organism_id.is_none() && self.cohort_id.is_none() {
            return Err(StoreError::invalid("sample requires organism or cohort reference"));
        }
        require_opt::<Organism>(state, self.organism_id.as_deref(), Self::LABEL)?;
        require_opt::<Cohort>(state, self.cohort_id.as_deref(), Self::LABEL)
    }
});

// ── Compliance and inventory ─────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Permit {
    #[serde(flatten)]
    pub base: Base,
    pub permit_number: String,
    pub authority: String,
    pub status: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub allowed_activities: Vec<String>,
    #[serde(default)]
    pub facility_ids: Vec<String>,
    #[serde(default)]
    pub protocol_ids: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

record!(Permit => permits, permit, "permit", {
    fn normalize(&mut self) {
        default_if_empty(&mut self.status, "draft");
    }

    fn validate(&self, state: &StoreSnapshot) -> StoreResult<()> {
        for id in &self.facility_ids {
            require::<Facility>(state, id, Self::LABEL)?;
        }
        for id in &self.protocol_ids {
            require::<Protocol>(state, id, Self::LABEL)?;
        }
        Ok(())
    }
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(flatten)]
    pub base: Base,
    pub code: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub facility_ids: Vec<String>,
}

record!(Project => projects, project, "project", {
    fn validate(&self, state: &StoreSnapshot) -> StoreResult<()> {
        for id in &self.facility_ids {
            require::<Facility>(state, id, Self::LABEL)?;
        }
        Ok(())
    }

    fn check_delete(id: &str, state: &StoreSnapshot) -> StoreResult<()> {
        refuse_if_referenced::<SupplyItem>(state, Self::LABEL, id, |s| {
            s.project_ids.iter().any(|p| p == id)
        })
    }
});

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplyItem {
    #[serde(flatten)]
    pub base: Base,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub quantity_on_hand: u32,
    pub unit: String,
    #[serde(default)]
    pub lot_number: String,
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub facility_ids: Vec<String>,
    #[serde(default)]
    pub project_ids: Vec<String>,
    #[serde(default)]
    pub reorder_level: u32,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

record!(SupplyItem => supply_items, supply_item, "supply item", {
    fn validate(&self, state: &StoreSnapshot) -> StoreResult<()> {
        for id in &self.facility_ids {
            require::<Facility>(state, id, Self::LABEL)?;
        }
        for id in &self.project_ids {
            require::<Project>(state, id, Self::LABEL)?;
        }
        Ok(())
    }
});
