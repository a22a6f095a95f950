use crate::dataset::Template;
use crate::error::RegistryError;
use crate::rule::Rule;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Sink a plugin writes its contributions into during [`Plugin::register`].
pub trait Registry {
    /// Attaches a JSON schema to an entity kind. Each kind accepts one schema.
    fn register_schema(
        &mut self,
        entity: &str,
        schema: Map<String, Value>,
    ) -> Result<(), RegistryError>;

    fn register_rule(&mut self, rule: Arc<dyn Rule>);

    /// Validates and stores a dataset template.
    fn register_dataset_template(&mut self, template: Template) -> Result<(), RegistryError>;
}

/// A unit of installable behaviour.
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;
    fn version(&self) -> &str;

    /// Called once at install time. An error leaves the host unchanged.
    fn register(&self, registry: &mut dyn Registry) -> anyhow::Result<()>;

    /// Entity model major version the plugin was built against, if pinned.
    fn entity_model_major(&self) -> Option<u32> {
        None
    }
}
