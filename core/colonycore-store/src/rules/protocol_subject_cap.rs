use async_trait::async_trait;
use colonycore_pluginapi::{
    CancellationToken, Change, Rule, RuleResult, RuleResultBuilder, RuleView, ViolationBuilder,
};
use colonycore_types::EntityContext;
use std::collections::HashMap;

/// Blocks when a protocol with a positive subject limit has more organisms
/// enrolled than the limit allows.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtocolSubjectCapRule;

#[async_trait]
impl Rule for ProtocolSubjectCapRule {
    fn name(&self) -> &str {
        "protocol_subject_cap"
    }

    async fn evaluate(
        &self,
        _cancel: &CancellationToken,
        view: &dyn RuleView,
        _changes: &[Change],
    ) -> anyhow::Result<RuleResult> {
        let organisms = view.list_organisms();
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for organism in &organisms {
            if let Some(protocol) = organism.protocol_id() {
                *counts.entry(protocol).or_default() += 1;
            }
        }

        let mut result = RuleResultBuilder::new();
        for protocol in view.list_protocols() {
            let limit = protocol.max_subjects();
            let count = counts.get(protocol.id()).copied().unwrap_or(0);
            if limit == 0 || count <= limit {
                continue;
            }
            result = result.add_violation(
                ViolationBuilder::new()
                    .with_rule(self.name())
                    .with_message(format!(
                        "protocol {} ({}) over subject limit: {count}/{limit}",
                        protocol.title(),
                        protocol.code()
                    ))
                    .with_entity(EntityContext::new().protocol())
                    .with_entity_id(protocol.id())
                    .build_blocking()?,
            );
        }
        Ok(result.build())
    }
}
