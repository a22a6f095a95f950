//! Reference plugin for frog colonies.
//!
//! Contributes an organism schema fragment, the [`FrogHabitatRule`] warning
//! and the `frog_population_snapshot` dataset template.

mod habitat;
mod population;

pub use habitat::{FrogHabitatRule, HABITAT_RULE_NAME};
pub use population::{POPULATION_TEMPLATE_KEY, population_template};

use colonycore_pluginapi::{Plugin, Registry};
use serde_json::{Map, Value, json};
use std::sync::Arc;

pub const PLUGIN_NAME: &str = "frog";
pub const PLUGIN_VERSION: &str = "0.1.0";

#[derive(Debug, Clone, Copy, Default)]
pub struct FrogPlugin;

impl FrogPlugin {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Plugin for FrogPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn version(&self) -> &str {
        PLUGIN_VERSION
    }

    fn register(&self, registry: &mut dyn Registry) -> anyhow::Result<()> {
        registry.register_schema("organism", organism_schema())?;
        registry.register_rule(Arc::new(FrogHabitatRule));
        registry.register_dataset_template(population_template())?;
        Ok(())
    }
}

/// JSON schema for frog-specific organism attributes.
pub fn organism_schema() -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("$id".into(), json!("colonycore:frog:organism"));
    schema.insert("type".into(), json!("object"));
    schema.insert(
        "properties".into(),
        json!({
            "skin_color_index": {
                "type": "number",
                "minimum": 0,
                "maximum": 10,
                "description": "Fitzpatrick-inspired coloration scale",
            },
            "call_frequency_hz": {
                "type": "number",
                "description": "Dominant advertisement call frequency in Hz",
            },
            "limb_regeneration_notes": {
                "type": "string",
                "description": "Qualitative regeneration observations",
            },
        }),
    );
    schema
}
