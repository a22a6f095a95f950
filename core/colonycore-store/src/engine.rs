use crate::error::{StoreError, StoreResult};
use colonycore_pluginapi::{Change, Rule, RuleResult, RuleView, RuleViolationError};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Ordered set of rules evaluated against every transaction attempt.
#[derive(Default)]
pub struct RulesEngine {
    rules: RwLock<Vec<Arc<dyn Rule>>>,
}

impl RulesEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_rules(rules: Vec<Arc<dyn Rule>>) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }

    pub async fn register(&self, rule: Arc<dyn Rule>) {
        self.rules.write().await.push(rule);
    }

    /// Appends every rule in one step; concurrent evaluations see either none
    /// or all of them.
    pub async fn register_all(&self, rules: impl IntoIterator<Item = Arc<dyn Rule>>) {
        self.rules.write().await.extend(rules);
    }

    /// Rule names in evaluation order.
    pub async fn rule_names(&self) -> Vec<String> {
        self.rules
            .read()
            .await
            .iter()
            .map(|rule| rule.name().to_string())
            .collect()
    }

    /// Runs every rule in registration order and merges their results.
    ///
    /// The first rule error stops evaluation. A blocking violation in the
    /// merged result becomes [`StoreError::Blocked`] once all rules have run.
    pub async fn evaluate(
        &self,
        cancel: &CancellationToken,
        view: &dyn RuleView,
        changes: &[Change],
    ) -> StoreResult<RuleResult> {
        let rules = self.rules.read().await.clone();
        let mut aggregate = RuleResult::default();
        for rule in rules {
            if cancel.is_cancelled() {
                return Err(StoreError::Cancelled);
            }
            let result = rule
                .evaluate(cancel, view, changes)
                .await
                .map_err(|source| StoreError::Rule {
                    rule: rule.name().to_string(),
                    source,
                })?;
            debug!(rule = rule.name(), violations = result.len(), "rule evaluated");
            aggregate = aggregate.merge(&result);
        }

        if aggregate.has_blocking() {
            warn!(violations = aggregate.len(), "transaction blocked by rules");
            return Err(RuleViolationError::new(aggregate).into());
        }
        Ok(aggregate)
    }
}

impl std::fmt::Debug for RulesEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulesEngine").finish_non_exhaustive()
    }
}
