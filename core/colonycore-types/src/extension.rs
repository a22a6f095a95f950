//! Hook/contributor namespacing for plugin-supplied attribute maps.

use crate::object::ObjectPayload;
use crate::refs::private::Sealed;
use crate::refs::OpaqueRef;
use serde_json::{Map, Value};
use std::any::Any;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// hook -> contributor -> attribute map.
pub type RawExtensions = BTreeMap<String, BTreeMap<String, Map<String, Value>>>;

const HOOK_ORGANISM_ATTRIBUTES: &str = "entity.organism.attributes";
const HOOK_FACILITY_ENVIRONMENT_BASELINES: &str = "entity.facility.environment_baselines";
const HOOK_BREEDING_UNIT_PAIRING: &str = "entity.breeding_unit.pairing_attributes";
const HOOK_LINE_DEFAULT_ATTRIBUTES: &str = "entity.line.default_attributes";
const HOOK_LINE_EXTENSION_OVERRIDES: &str = "entity.line.extension_overrides";
const HOOK_STRAIN_ATTRIBUTES: &str = "entity.strain.attributes";
const HOOK_GENOTYPE_MARKER_ATTRIBUTES: &str = "entity.genotype_marker.attributes";
const HOOK_OBSERVATION_DATA: &str = "entity.observation.data";
const HOOK_SAMPLE_ATTRIBUTES: &str = "entity.sample.attributes";
const HOOK_SUPPLY_ITEM_ATTRIBUTES: &str = "entity.supply_item.attributes";

const CORE_CONTRIBUTOR: &str = "core";

/// Namespaced slot that plugins contribute attributes into.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HookRef(Cow<'static, str>);

impl HookRef {
    /// Whether the hook is one the host defines.
    #[must_use]
    pub fn is_known(&self) -> bool {
        ExtensionHookContext::new()
            .all()
            .iter()
            .any(|known| known == self)
    }
}

impl fmt::Display for HookRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for HookRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HookRef({:?})", self.0)
    }
}

impl Sealed for HookRef {}

impl OpaqueRef for HookRef {
    fn equals(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<HookRef>().is_some_and(|o| o == self)
    }
}

/// Identifier of the plugin (or the host core) that contributed a payload.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PluginRef(Cow<'static, str>);

impl PluginRef {
    #[must_use]
    pub fn is_core(&self) -> bool {
        self.0 == CORE_CONTRIBUTOR
    }
}

impl fmt::Display for PluginRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for PluginRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PluginRef({:?})", self.0)
    }
}

impl Sealed for PluginRef {}

impl OpaqueRef for PluginRef {
    fn equals(&self, other: &dyn Any) -> bool {
        other.downcast_ref::<PluginRef>().is_some_and(|o| o == self)
    }
}

/// Factory for the hooks the host defines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionHookContext;

impl ExtensionHookContext {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub const fn organism_attributes(&self) -> HookRef {
        HookRef(Cow::Borrowed(HOOK_ORGANISM_ATTRIBUTES))
    }

    pub const fn facility_environment_baselines(&self) -> HookRef {
        HookRef(Cow::Borrowed(HOOK_FACILITY_ENVIRONMENT_BASELINES))
    }

    pub const fn breeding_unit_pairing_attributes(&self) -> HookRef {
        HookRef(Cow::Borrowed(HOOK_BREEDING_UNIT_PAIRING))
    }

    pub const fn line_default_attributes(&self) -> HookRef {
        HookRef(Cow::Borrowed(HOOK_LINE_DEFAULT_ATTRIBUTES))
    }

    pub const fn line_extension_overrides(&self) -> HookRef {
        HookRef(Cow::Borrowed(HOOK_LINE_EXTENSION_OVERRIDES))
    }

    pub const fn strain_attributes(&self) -> HookRef {
        HookRef(Cow::Borrowed(HOOK_STRAIN_ATTRIBUTES))
    }

    pub const fn genotype_marker_attributes(&self) -> HookRef {
        HookRef(Cow::Borrowed(HOOK_GENOTYPE_MARKER_ATTRIBUTES))
    }

    pub const fn observation_data(&self) -> HookRef {
        HookRef(Cow::Borrowed(HOOK_OBSERVATION_DATA))
    }

    pub const fn sample_attributes(&self) -> HookRef {
        HookRef(Cow::Borrowed(HOOK_SAMPLE_ATTRIBUTES))
    }

    pub const fn supply_item_attributes(&self) -> HookRef {
        HookRef(Cow::Borrowed(HOOK_SUPPLY_ITEM_ATTRIBUTES))
    }

    /// Every known hook, sorted by identifier.
    pub fn all(&self) -> Vec<HookRef> {
        let mut hooks = vec![
            self.organism_attributes(),
            self.facility_environment_baselines(),
            self.breeding_unit_pairing_attributes(),
            self.line_default_attributes(),
            self.line_extension_overrides(),
            self.strain_attributes(),
            self.genotype_marker_attributes(),
            self.observation_data(),
            self.sample_attributes(),
            self.supply_item_attributes(),
        ];
        hooks.sort();
        hooks
    }
}

/// Factory for contributor identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtensionContributorContext;

impl ExtensionContributorContext {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// The host itself.
    pub const fn core(&self) -> PluginRef {
        PluginRef(Cow::Borrowed(CORE_CONTRIBUTOR))
    }

    pub fn custom(&self, id: impl Into<String>) -> PluginRef {
        PluginRef(Cow::Owned(id.into()))
    }
}

/// Read-only set of extension payloads.
///
/// Every accessor returns a deep copy; mutating a returned map never changes
/// what the next call returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtensionSet {
    payloads: RawExtensions,
}

impl ExtensionSet {
    /// Takes ownership of `raw`. Hooks without contributors are dropped.
    #[must_use]
    pub fn new(raw: RawExtensions) -> Self {
        let payloads = raw
            .into_iter()
            .filter(|(_, plugins)| !plugins.is_empty())
            .collect();
        Self { payloads }
    }

    /// A set holding a single core contribution.
    #[must_use]
    pub fn with_core(hook: &HookRef, values: Map<String, Value>) -> Self {
        let contributor = ExtensionContributorContext::new().core();
        let mut plugins = BTreeMap::new();
        plugins.insert(contributor.0.into_owned(), values);
        let mut payloads = BTreeMap::new();
        payloads.insert(hook.0.to_string(), plugins);
        Self { payloads }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    /// Hooks with at least one contribution, sorted.
    pub fn hooks(&self) -> Vec<HookRef> {
        self.payloads
            .keys()
            .map(|hook| HookRef(Cow::Owned(hook.clone())))
            .collect()
    }

    /// Contributors for `hook`, sorted.
    pub fn plugins(&self, hook: &HookRef) -> Vec<PluginRef> {
        self.payloads
            .get(hook.0.as_ref())
            .map(|plugins| {
                plugins
                    .keys()
                    .map(|plugin| PluginRef(Cow::Owned(plugin.clone())))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn get(&self, hook: &HookRef, plugin: &PluginRef) -> Option<ObjectPayload> {
        let values = self.payloads.get(hook.0.as_ref())?.get(plugin.0.as_ref())?;
        Some(ObjectPayload::from_map(hook.clone(), values.clone()))
    }

    /// The host's own contribution to `hook`.
    pub fn core(&self, hook: &HookRef) -> Option<ObjectPayload> {
        self.get(hook, &ExtensionContributorContext::new().core())
    }

    /// Deep copy of the whole structure.
    #[must_use]
    pub fn raw(&self) -> RawExtensions {
        self.payloads.clone()
    }
}
