//! Transactional in-memory store for ColonyCore.
//!
//! [`MemoryStore::run_in_transaction`] stages mutations on a private copy of
//! committed state, hands the resulting [`Change`](colonycore_pluginapi::Change)
//! list and a [`StoreSnapshot`] of the prospective state to the
//! [`RulesEngine`], and commits only when no blocking violation was raised.
//! [`MemoryStore::view`] reads the latest committed snapshot without locking
//! out writers.

mod config;
mod engine;
mod error;
mod records;
pub mod rules;
mod snapshot;
mod store;
mod transaction;
mod views;

pub use config::StoreConfig;
pub use engine::RulesEngine;
pub use error::{StoreError, StoreResult};
pub use records::{
    Base, BreedingUnit, Cohort, Facility, HousingUnit, Observation, Organism, Permit, Procedure,
    Project, Protocol, Record, Sample, SupplyItem, Treatment,
};
pub use snapshot::StoreSnapshot;
pub use store::MemoryStore;
pub use transaction::Transaction;
