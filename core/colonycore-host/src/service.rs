//! Plugin installation and the dataset catalog.
//!
//! [`Service`] owns a [`MemoryStore`], installs plugins into it and exposes
//! the dataset templates they contribute. It also offers thin transactional
//! helpers for callers that do not need a hand-written transaction body.

use crate::config::HostConfig;
use crate::error::{HostError, HostResult};
use crate::template::HostTemplate;
use colonycore_pluginapi::dataset::{
    self, DatasetEnvironment, SnapshotSource, Template, TemplateDescriptor,
};
use colonycore_pluginapi::{CancellationToken, Plugin, Registry, RegistryError, Rule, RuleResult};
use colonycore_store::{
    HousingUnit, MemoryStore, Organism, Protocol, Record, StoreError, StoreResult, Transaction,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

/// Read access to installed dataset templates.
pub trait Catalog: Send + Sync {
    /// Descriptors sorted by plugin, key and version.
    fn dataset_templates(&self) -> Vec<TemplateDescriptor>;

    fn resolve_dataset_template(&self, slug: &str) -> Option<HostTemplate>;
}

/// What an installed plugin contributed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub schemas: BTreeMap<String, Map<String, Value>>,
    #[serde(default)]
    pub datasets: Vec<TemplateDescriptor>,
}

/// Collects one plugin's contributions so installation can be all or nothing.
#[derive(Default)]
pub struct PluginRegistry {
    schemas: BTreeMap<String, Map<String, Value>>,
    rules: Vec<Arc<dyn Rule>>,
    templates: Vec<Template>,
    rejected: Option<RegistryError>,
}

impl PluginRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schemas(&self) -> &BTreeMap<String, Map<String, Value>> {
        &self.schemas
    }

    pub fn rule_names(&self) -> Vec<String> {
        self.rules.iter().map(|rule| rule.name().to_string()).collect()
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    /// Remembers the first rejection even if the plugin ignores the error.
    fn reject(&mut self, err: RegistryError) -> RegistryError {
        if self.rejected.is_none() {
            self.rejected = Some(err.clone());
        }
        err
    }
}

impl Registry for PluginRegistry {
    fn register_schema(
        &mut self,
        entity: &str,
        schema: Map<String, Value>,
    ) -> Result<(), RegistryError> {
        if self.schemas.contains_key(entity) {
            return Err(self.reject(RegistryError::DuplicateSchema(entity.to_string())));
        }
        self.schemas.insert(entity.to_string(), schema);
        Ok(())
    }

    fn register_rule(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    fn register_dataset_template(&mut self, template: Template) -> Result<(), RegistryError> {
        if let Err(source) = template.validate() {
            return Err(self.reject(RegistryError::InvalidTemplate {
                key: template.key.clone(),
                source,
            }));
        }
        let duplicate = self
            .templates
            .iter()
            .any(|t| t.key == template.key && t.version == template.version);
        if duplicate {
            let slug = dataset::slug("", &template.key, &template.version);
            return Err(self.reject(RegistryError::DuplicateTemplate(slug)));
        }
        self.templates.push(template);
        Ok(())
    }
}

/// Host facade over the store, the rules engine and the dataset catalog.
pub struct Service {
    store: Arc<MemoryStore>,
    config: HostConfig,
    plugins: BTreeMap<String, PluginMetadata>,
    templates: BTreeMap<String, HostTemplate>,
}

impl Service {
    pub fn new(store: Arc<MemoryStore>) -> Self {
        Self::with_config(store, HostConfig::default())
    }

    pub fn with_config(store: Arc<MemoryStore>, config: HostConfig) -> Self {
        Self {
            store,
            config,
            plugins: BTreeMap::new(),
            templates: BTreeMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    // ================================================================
    // Plugins
    // ================================================================

    /// Registers `plugin`, binds its dataset templates and appends its rules
    /// to the engine. Any failure leaves the host exactly as it was.
    pub async fn install_plugin(&mut self, plugin: &dyn Plugin) -> HostResult<PluginMetadata> {
        let name = plugin.name().to_string();
        if self.plugins.contains_key(&name) {
            return Err(HostError::PluginAlreadyRegistered(name));
        }

        let plugin_major = plugin.entity_model_major();
        if let Some(required) = plugin_major {
            self.require_entity_model(required, format!("plugin {name}"))?;
        }

        let mut registry = PluginRegistry::new();
        plugin
            .register(&mut registry)
            .map_err(|source| HostError::Registration {
                plugin: name.clone(),
                source,
            })?;
        if let Some(source) = registry.rejected.take() {
            return Err(HostError::Registry {
                plugin: name,
                source,
            });
        }

        let environment = DatasetEnvironment {
            source: Arc::clone(&self.store) as Arc<dyn SnapshotSource>,
            now: self.store.clock(),
        };
        let mut staged = Vec::with_capacity(registry.templates.len());
        let mut slugs = HashSet::new();
        for template in registry.templates {
            let mut installed = HostTemplate::new(&name, template);
            let slug = installed.slug();
            if let Some(template_major) = installed.template().metadata.entity_model_major {
                if let Some(plugin_major) = plugin_major.filter(|major| *major != template_major) {
                    return Err(HostError::TemplateModelConflict {
                        slug,
                        template: template_major,
                        plugin: plugin_major,
                    });
                }
                self.require_entity_model(template_major, format!("dataset template {slug}"))?;
            }
            installed.bind(&environment)?;
            if self.templates.contains_key(&slug) || !slugs.insert(slug.clone()) {
                return Err(HostError::DuplicateTemplate(slug));
            }
            staged.push((slug, installed));
        }

        let mut datasets: Vec<TemplateDescriptor> =
            staged.iter().map(|(_, t)| t.descriptor()).collect();
        sort_descriptors(&mut datasets);
        let metadata = PluginMetadata {
            name: name.clone(),
            version: plugin.version().to_string(),
            schemas: registry.schemas,
            datasets,
        };

        self.store.rules_engine().register_all(registry.rules).await;
        self.templates.extend(staged);
        self.plugins.insert(name.clone(), metadata.clone());

        info!(
            plugin = %name,
            version = %metadata.version,
            datasets = metadata.datasets.len(),
            "plugin installed"
        );
        Ok(metadata)
    }

    /// Installs a batch in plugin-name order, so rule evaluation order does
    /// not depend on discovery order. Stops at the first failure.
    pub async fn install_plugins(
        &mut self,
        plugins: impl IntoIterator<Item = Arc<dyn Plugin>>,
    ) -> HostResult<Vec<PluginMetadata>> {
        let mut plugins: Vec<_> = plugins.into_iter().collect();
        plugins.sort_by(|a, b| a.name().cmp(b.name()));
        let mut installed = Vec::with_capacity(plugins.len());
        for plugin in plugins {
            installed.push(self.install_plugin(plugin.as_ref()).await?);
        }
        Ok(installed)
    }

    /// Installed plugins sorted by name.
    pub fn registered_plugins(&self) -> Vec<PluginMetadata> {
        self.plugins.values().cloned().collect()
    }

    fn require_entity_model(&self, required: u32, subject: String) -> HostResult<()> {
        let host = self.config.entity_model_major;
        if host == required {
            Ok(())
        } else {
            Err(HostError::EntityModelMismatch {
                host,
                subject,
                required,
            })
        }
    }

    // ================================================================
    // Transactional helpers
    // ================================================================

    pub async fn create<R: Record>(
        &self,
        cancel: &CancellationToken,
        record: R,
    ) -> HostResult<(R, RuleResult)> {
        let created = self.store.transact(cancel, |tx| tx.create(record)).await?;
        debug!(entity = R::LABEL, id = created.0.id(), "record created");
        Ok(created)
    }

    pub async fn update<R, F>(
        &self,
        cancel: &CancellationToken,
        id: &str,
        mutator: F,
    ) -> HostResult<(R, RuleResult)>
    where
        R: Record,
        F: FnOnce(&mut R) -> StoreResult<()> + Send,
    {
        let updated = self
            .store
            .transact(cancel, |tx| tx.update(id, mutator))
            .await?;
        debug!(entity = R::LABEL, id, "record updated");
        Ok(updated)
    }

    pub async fn delete<R: Record>(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> HostResult<RuleResult> {
        let result = self
            .store
            .run_in_transaction(cancel, |tx| tx.delete::<R>(id))
            .await?;
        debug!(entity = R::LABEL, id, "record deleted");
        Ok(result)
    }

    /// Moves an organism into an existing housing unit.
    pub async fn assign_organism_housing(
        &self,
        cancel: &CancellationToken,
        organism_id: &str,
        housing_id: &str,
    ) -> HostResult<(Organism, RuleResult)> {
        let assigned = self
            .store
            .transact(cancel, |tx| {
                require::<HousingUnit>(tx, housing_id)?;
                tx.update::<Organism, _>(organism_id, |organism| {
                    organism.housing_id = Some(housing_id.to_string());
                    Ok(())
                })
            })
            .await?;
        Ok(assigned)
    }

    /// Enrolls an organism in an existing protocol.
    pub async fn assign_organism_protocol(
        &self,
        cancel: &CancellationToken,
        organism_id: &str,
        protocol_id: &str,
    ) -> HostResult<(Organism, RuleResult)> {
        let assigned = self
            .store
            .transact(cancel, |tx| {
                require::<Protocol>(tx, protocol_id)?;
                tx.update::<Organism, _>(organism_id, |organism| {
                    organism.protocol_id = Some(protocol_id.to_string());
                    Ok(())
                })
            })
            .await?;
        Ok(assigned)
    }
}

fn require<R: Record>(tx: &Transaction, id: &str) -> StoreResult<()> {
    match tx.snapshot().get::<R>(id) {
        Some(_) => Ok(()),
        None => Err(StoreError::NotFound {
            kind: R::LABEL,
            id: id.to_string(),
        }),
    }
}

fn sort_descriptors(descriptors: &mut [TemplateDescriptor]) {
    descriptors.sort_by(|a, b| {
        (&a.plugin, &a.key, &a.version).cmp(&(&b.plugin, &b.key, &b.version))
    });
}

impl Catalog for Service {
    fn dataset_templates(&self) -> Vec<TemplateDescriptor> {
        let mut descriptors: Vec<_> = self
            .templates
            .values()
            .map(HostTemplate::descriptor)
            .collect();
        sort_descriptors(&mut descriptors);
        descriptors
    }

    fn resolve_dataset_template(&self, slug: &str) -> Option<HostTemplate> {
        self.templates.get(slug).cloned()
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .field("templates", &self.templates.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
