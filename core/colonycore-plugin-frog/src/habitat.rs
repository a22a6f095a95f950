use async_trait::async_trait;
use colonycore_pluginapi::{
    CancellationToken, Change, Rule, RuleResult, RuleResultBuilder, RuleView, ViolationBuilder,
};
use colonycore_types::EntityContext;

pub const HABITAT_RULE_NAME: &str = "frog_habitat_warning";

/// Warns about frogs housed outside aquatic or humid environments.
///
/// Never blocks. Organisms without housing, or whose housing cannot be
/// found, are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrogHabitatRule;

#[async_trait]
impl Rule for FrogHabitatRule {
    fn name(&self) -> &str {
        HABITAT_RULE_NAME
    }

    async fn evaluate(
        &self,
        _cancel: &CancellationToken,
        view: &dyn RuleView,
        _changes: &[Change],
    ) -> anyhow::Result<RuleResult> {
        let mut result = RuleResultBuilder::new();
        for organism in view.list_organisms() {
            if !is_frog(organism.species()) {
                continue;
            }
            let Some(housing) = organism
                .housing_id()
                .and_then(|id| view.find_housing_unit(id))
            else {
                continue;
            };
            if is_wet_habitat(housing.environment()) {
                continue;
            }
            result = result.add_violation(
                ViolationBuilder::new()
                    .with_rule(HABITAT_RULE_NAME)
                    .with_message("frog assigned to non-aquatic/non-humid housing")
                    .with_entity(EntityContext::new().organism())
                    .with_entity_id(organism.id())
                    .build_warning()?,
            );
        }
        Ok(result.build())
    }
}

pub(crate) fn is_frog(species: &str) -> bool {
    species.to_lowercase().contains("frog")
}

/// Free-form environments such as "Semi-Aquatic" or "humid terrarium" count.
fn is_wet_habitat(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment.contains("aquatic") || environment.contains("humid")
}
