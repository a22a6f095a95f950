use crate::config::StoreConfig;
use crate::engine::RulesEngine;
use crate::error::{StoreError, StoreResult};
use crate::rules;
use crate::snapshot::StoreSnapshot;
use crate::transaction::Transaction;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use colonycore_pluginapi::dataset::{Clock, SnapshotSource};
use colonycore_pluginapi::{Change, RuleResult, RuleView};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Single-writer, snapshot-isolated in-memory store.
///
/// Writers are serialized for the whole stage, validate and commit sequence.
/// Readers clone the current `Arc<StoreSnapshot>` and never wait on a writer
/// that is still staging or evaluating rules.
pub struct MemoryStore {
    writer: Mutex<()>,
    state: RwLock<Arc<StoreSnapshot>>,
    engine: Arc<RulesEngine>,
    config: StoreConfig,
    clock: Clock,
}

impl MemoryStore {
    /// Store with default configuration and the built-in rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    #[must_use]
    pub fn with_config(config: StoreConfig) -> Self {
        let builtin = if config.builtin_rules {
            rules::builtin()
        } else {
            Vec::new()
        };
        Self {
            writer: Mutex::new(()),
            state: RwLock::new(Arc::new(StoreSnapshot::default())),
            engine: Arc::new(RulesEngine::with_rules(builtin)),
            config,
            clock: Arc::new(Utc::now),
        }
    }

    /// Replaces the wall clock used for record timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn rules_engine(&self) -> &Arc<RulesEngine> {
        &self.engine
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn clock(&self) -> Clock {
        Arc::clone(&self.clock)
    }

    /// Stages `f` against a private copy of committed state, evaluates every
    /// rule against the prospective state, then commits or discards.
    ///
    /// Errors from `f` propagate unchanged and skip rule evaluation. A
    /// blocking result yields [`StoreError::Blocked`]; a failing rule yields
    /// [`StoreError::Rule`]. Cancelling `cancel` (or exceeding the configured
    /// evaluation timeout) before the commit point yields
    /// [`StoreError::Cancelled`]. In every error case committed state is
    /// untouched.
    pub async fn run_in_transaction<F>(
        &self,
        cancel: &CancellationToken,
        f: F,
    ) -> StoreResult<RuleResult>
    where
        F: FnOnce(&mut Transaction) -> StoreResult<()> + Send,
    {
        self.transact(cancel, f).await.map(|((), result)| result)
    }

    /// Like [`run_in_transaction`](Self::run_in_transaction), but hands back
    /// whatever `f` produced alongside the rule result once committed.
    pub async fn transact<T, F>(
        &self,
        cancel: &CancellationToken,
        f: F,
    ) -> StoreResult<(T, RuleResult)>
    where
        T: Send,
        F: FnOnce(&mut Transaction) -> StoreResult<T> + Send,
    {
        let _writer = self.writer.lock().await;
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let baseline = self.state.read().await.as_ref().clone();
        let mut tx = Transaction::new(baseline, (self.clock)());
        let output = f(&mut tx)?;
        let (staged, changes) = tx.finish()?;

        let result = self.evaluate(cancel, &staged, &changes).await.inspect_err(|err| {
            warn!(error = %err, changes = changes.len(), "transaction rolled back");
        })?;

        // Commit point: cancellation after this line has no effect.
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        *self.state.write().await = Arc::new(staged);

        for violation in result.iter() {
            warn!(
                rule = violation.rule(),
                entity_id = violation.entity_id(),
                "{}",
                violation.message()
            );
        }
        debug!(changes = changes.len(), violations = result.len(), "transaction committed");
        Ok((output, result))
    }

    async fn evaluate(
        &self,
        cancel: &CancellationToken,
        staged: &StoreSnapshot,
        changes: &[Change],
    ) -> StoreResult<RuleResult> {
        let evaluation = self.engine.evaluate(cancel, staged, changes);
        let bounded = async {
            match self.config.evaluation_timeout() {
                Some(limit) => tokio::time::timeout(limit, evaluation)
                    .await
                    .unwrap_or(Err(StoreError::Cancelled)),
                None => evaluation.await,
            }
        };
        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(StoreError::Cancelled),
            result = bounded => result,
        }
    }

    /// Runs `f` against the latest committed snapshot. No rules run and no
    /// state changes.
    pub async fn view<T>(&self, f: impl FnOnce(&StoreSnapshot) -> T) -> T {
        let snapshot = self.snapshot().await;
        f(&snapshot)
    }

    /// The latest committed snapshot.
    pub async fn snapshot(&self) -> Arc<StoreSnapshot> {
        Arc::clone(&*self.state.read().await)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SnapshotSource for MemoryStore {
    async fn snapshot(&self) -> Arc<dyn RuleView> {
        let snapshot: Arc<dyn RuleView> = MemoryStore::snapshot(self).await;
        snapshot
    }
}
