use crate::change::Change;
use crate::result::RuleResult;
use crate::views::RuleView;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A named check evaluated against the prospective state of a transaction.
///
/// Rules run in registration order. Returning `Err` aborts the transaction;
/// blocking violations abort it too, after every rule has run.
#[async_trait]
pub trait Rule: Send + Sync {
    fn name(&self) -> &str;

    async fn evaluate(
        &self,
        cancel: &CancellationToken,
        view: &dyn RuleView,
        changes: &[Change],
    ) -> anyhow::Result<RuleResult>;
}
