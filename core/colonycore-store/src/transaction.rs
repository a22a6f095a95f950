use crate::error::{StoreError, StoreResult};
use crate::records::Record;
use crate::snapshot::StoreSnapshot;
use chrono::{DateTime, Utc};
use colonycore_pluginapi::{Change, ChangePayload};
use colonycore_types::{ActionContext, EntityTypeRef};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// First-before and last-after snapshot for one touched record.
#[derive(Debug)]
struct Touched {
    entity: EntityTypeRef,
    before: Option<Value>,
    after: Option<Value>,
}

/// Staging area handed to the closure passed to
/// [`MemoryStore::run_in_transaction`](crate::MemoryStore::run_in_transaction).
///
/// Mutations apply to a private copy of the committed state. Nothing is
/// visible to other readers until the whole attempt commits.
#[derive(Debug)]
pub struct Transaction {
    state: StoreSnapshot,
    now: DateTime<Utc>,
    touched: Vec<Touched>,
    index: HashMap<(EntityTypeRef, String), usize>,
}

impl Transaction {
    pub(crate) fn new(state: StoreSnapshot, now: DateTime<Utc>) -> Self {
        Self {
            state,
            now,
            touched: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Timestamp applied to every record written by this attempt.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// The staged state, including this attempt's own writes.
    pub fn snapshot(&self) -> &StoreSnapshot {
        &self.state
    }

    pub fn find<R: Record>(&self, id: &str) -> Option<R> {
        self.state.get::<R>(id).cloned()
    }

    pub fn list<R: Record>(&self) -> Vec<R> {
        self.state.iter::<R>().cloned().collect()
    }

    /// Stages a new record. An empty id is replaced with a fresh UUID v7.
    pub fn create<R: Record>(&mut self, mut record: R) -> StoreResult<R> {
        if record.id().trim().is_empty() {
            record.base_mut().id = Uuid::now_v7().to_string();
        }
        let id = record.id().to_string();
        if R::table(&self.state).contains_key(&id) {
            return Err(StoreError::AlreadyExists { kind: R::LABEL, id });
        }
        let base = record.base_mut();
        base.created_at = self.now;
        base.updated_at = self.now;
        record.normalize();
        record.validate(&self.state)?;

        let after = serde_json::to_value(&record)?;
        self.touch(R::ENTITY, &id, None, Some(after));
        R::table_mut(&mut self.state).insert(id, record.clone());
        Ok(record)
    }

    /// Applies `mutator` to a staged copy of record `id`. The id and creation
    /// time cannot be changed.
    pub fn update<R, F>(&mut self, id: &str, mutator: F) -> StoreResult<R>
    where
        R: Record,
        F: FnOnce(&mut R) -> StoreResult<()>,
    {
        let current = self.state.get::<R>(id).ok_or_else(|| StoreError::NotFound {
            kind: R::LABEL,
            id: id.to_string(),
        })?;
        let before = serde_json::to_value(current)?;
        let created_at = current.base().created_at;
        let mut updated = current.clone();

        mutator(&mut updated)?;
        let base = updated.base_mut();
        base.id = id.to_string();
        base.created_at = created_at;
        base.updated_at = self.now;
        updated.normalize();
        updated.validate(&self.state)?;

        let after = serde_json::to_value(&updated)?;
        self.touch(R::ENTITY, id, Some(before), Some(after));
        R::table_mut(&mut self.state).insert(id.to_string(), updated.clone());
        Ok(updated)
    }

    pub fn delete<R: Record>(&mut self, id: &str) -> StoreResult<()> {
        let current = self.state.get::<R>(id).ok_or_else(|| StoreError::NotFound {
            kind: R::LABEL,
            id: id.to_string(),
        })?;
        let before = serde_json::to_value(current)?;
        R::check_delete(id, &self.state)?;

        self.touch(R::ENTITY, id, Some(before), None);
        R::table_mut(&mut self.state).remove(id);
        Ok(())
    }

    fn touch(
        &mut self,
        entity: EntityTypeRef,
        id: &str,
        before: Option<Value>,
        after: Option<Value>,
    ) {
        match self.index.get(&(entity, id.to_string())) {
            Some(&slot) => self.touched[slot].after = after,
            None => {
                self.index.insert((entity, id.to_string()), self.touched.len());
                self.touched.push(Touched {
                    entity,
                    before,
                    after,
                });
            }
        }
    }

    /// Ends staging: one change per touched record in first-touch order,
    /// with the action derived from the net effect. A record created and then
    /// deleted in the same attempt produces no change.
    pub(crate) fn finish(mut self) -> StoreResult<(StoreSnapshot, Vec<Change>)> {
        let actions = ActionContext::new();
        let mut changes = Vec::with_capacity(self.touched.len());
        for touched in self.touched {
            let action = match (&touched.before, &touched.after) {
                (None, Some(_)) => actions.create(),
                (Some(_), Some(_)) => actions.update(),
                (Some(_), None) => actions.delete(),
                (None, None) => continue,
            };
            changes.push(Change::new(
                touched.entity,
                action,
                payload(touched.before.as_ref())?,
                payload(touched.after.as_ref())?,
            ));
        }
        self.state.reindex();
        Ok((self.state, changes))
    }
}

fn payload(value: Option<&Value>) -> StoreResult<ChangePayload> {
    match value {
        Some(value) => Ok(ChangePayload::from_value(value)?),
        None => Ok(ChangePayload::undefined()),
    }
}
