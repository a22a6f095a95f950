use crate::error::BuildError;
use colonycore_types::{ActionRef, ChangePayload, EntityTypeRef};

/// One entity's mutation inside a transaction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    entity: EntityTypeRef,
    action: ActionRef,
    before: ChangePayload,
    after: ChangePayload,
}

impl Change {
    #[must_use]
    pub fn new(
        entity: EntityTypeRef,
        action: ActionRef,
        before: ChangePayload,
        after: ChangePayload,
    ) -> Self {
        Self {
            entity,
            action,
            before,
            after,
        }
    }

    pub const fn entity(&self) -> EntityTypeRef {
        self.entity
    }

    pub const fn action(&self) -> ActionRef {
        self.action
    }

    /// Snapshot before the mutation; undefined for creates.
    pub fn before(&self) -> ChangePayload {
        self.before.clone()
    }

    /// Snapshot after the mutation; undefined for deletes.
    pub fn after(&self) -> ChangePayload {
        self.after.clone()
    }
}

/// Fluent construction of a [`Change`].
///
/// `build` consumes the builder, so it cannot be reused:
///
/// ```compile_fail
/// use colonycore_pluginapi::ChangeBuilder;
/// use colonycore_types::{ActionContext, EntityContext};
///
/// let builder = ChangeBuilder::new()
///     .with_entity(EntityContext::new().organism())
///     .with_action(ActionContext::new().create());
/// let _first = builder.build();
/// let _second = builder.build();
/// ```
#[derive(Debug, Default)]
#[must_use]
pub struct ChangeBuilder {
    entity: Option<EntityTypeRef>,
    action: Option<ActionRef>,
    before: ChangePayload,
    after: ChangePayload,
}

impl ChangeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entity(mut self, entity: EntityTypeRef) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn with_action(mut self, action: ActionRef) -> Self {
        self.action = Some(action);
        self
    }

    pub fn with_before(mut self, before: ChangePayload) -> Self {
        self.before = before;
        self
    }

    pub fn with_after(mut self, after: ChangePayload) -> Self {
        self.after = after;
        self
    }

    pub fn build(self) -> Result<Change, BuildError> {
        let entity = self.entity.ok_or(BuildError::missing("entity"))?;
        let action = self.action.ok_or(BuildError::missing("action"))?;
        Ok(Change::new(entity, action, self.before, self.after))
    }
}
