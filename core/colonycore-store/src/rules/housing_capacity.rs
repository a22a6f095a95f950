use async_trait::async_trait;
use colonycore_pluginapi::{
    CancellationToken, Change, Rule, RuleResult, RuleResultBuilder, RuleView, ViolationBuilder,
};
use colonycore_types::EntityContext;
use std::collections::HashMap;

/// Blocks when more organisms reference a housing unit than it can hold.
#[derive(Debug, Clone, Copy, Default)]
pub struct HousingCapacityRule;

#[async_trait]
impl Rule for HousingCapacityRule {
    fn name(&self) -> &str {
        "housing_capacity"
    }

    async fn evaluate(
        &self,
        _cancel: &CancellationToken,
        view: &dyn RuleView,
        _changes: &[Change],
    ) -> anyhow::Result<RuleResult> {
        let mut occupancy: HashMap<&str, u32> = HashMap::new();
        let organisms = view.list_organisms();
        for organism in &organisms {
            if let Some(housing) = organism.housing_id() {
                *occupancy.entry(housing).or_default() += 1;
            }
        }

        let mut result = RuleResultBuilder::new();
        for housing in view.list_housing_units() {
            let count = occupancy.get(housing.id()).copied().unwrap_or(0);
            if count > housing.capacity() {
                result = result.add_violation(
                    ViolationBuilder::new()
                        .with_rule(self.name())
                        .with_message(format!(
                            "housing {} ({}) over capacity: {}/{} occupants",
                            housing.name(),
                            housing.id(),
                            count,
                            housing.capacity()
                        ))
                        .with_entity(EntityContext::new().housing_unit())
                        .with_entity_id(housing.id())
                        .build_blocking()?,
                );
            }
        }
        Ok(result.build())
    }
}
