//! Rules every store enforces unless disabled in [`StoreConfig`](crate::StoreConfig).

mod housing_capacity;
mod lifecycle_transition;
mod protocol_subject_cap;

pub use housing_capacity::HousingCapacityRule;
pub use lifecycle_transition::LifecycleTransitionRule;
pub use protocol_subject_cap::ProtocolSubjectCapRule;

use colonycore_pluginapi::Rule;
use std::sync::Arc;

/// Built-in rules in evaluation order.
pub fn builtin() -> Vec<Arc<dyn Rule>> {
    vec![
        Arc::new(HousingCapacityRule),
        Arc::new(ProtocolSubjectCapRule),
        Arc::new(LifecycleTransitionRule),
    ]
}
