//! Plugin boundary for ColonyCore.
//!
//! Plugins never see concrete domain types. They receive:
//! - [`Change`] values describing each mutated entity (before/after JSON)
//! - a [`RuleView`] of getter-only entity projections
//!
//! and answer with a [`RuleResult`] of [`Violation`]s. Registration goes
//! through the [`Registry`] handed to [`Plugin::register`].

mod change;
pub mod dataset;
mod error;
mod plugin;
mod result;
mod rule;
mod version;
mod views;
mod violation;

pub use change::{Change, ChangeBuilder};
pub use error::{BuildError, RegistryError, TemplateError};
pub use plugin::{Plugin, Registry};
pub use result::{RuleResult, RuleResultBuilder, RuleViolationError};
pub use rule::Rule;
pub use version::{version_provider, DefaultVersionProvider, VersionProvider, API_VERSION};
pub use views::{
    BaseView, FacilityView, HousingUnitView, ObservationView, OrganismView, PermitView,
    ProjectView, ProtocolView, RuleView, SampleView, SupplyItemView, TreatmentView,
};
pub use violation::{Violation, ViolationBuilder};

pub use colonycore_types::{ChangePayload, ExtensionSet, ObjectPayload};
pub use tokio_util::sync::CancellationToken;
