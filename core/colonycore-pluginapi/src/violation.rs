use crate::error::BuildError;
use colonycore_types::{EntityTypeRef, SeverityContext, SeverityRef};
use std::fmt;

/// A single rule finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    rule: String,
    severity: SeverityRef,
    message: String,
    entity: EntityTypeRef,
    entity_id: String,
}

impl Violation {
    #[must_use]
    pub fn new(
        rule: impl Into<String>,
        severity: SeverityRef,
        message: impl Into<String>,
        entity: EntityTypeRef,
        entity_id: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            severity,
            message: message.into(),
            entity,
            entity_id: entity_id.into(),
        }
    }

    pub fn rule(&self) -> &str {
        &self.rule
    }

    pub const fn severity(&self) -> SeverityRef {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn entity(&self) -> EntityTypeRef {
        self.entity
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub const fn is_blocking(&self) -> bool {
        self.severity.is_blocking()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {}/{}: {}",
            self.rule, self.severity, self.entity, self.entity_id, self.message
        )
    }
}

/// Fluent construction of a [`Violation`].
///
/// Required fields are checked in order: rule, severity, entity. The
/// builder is consumed by every `build*` call:
///
/// ```compile_fail
/// use colonycore_pluginapi::ViolationBuilder;
/// use colonycore_types::EntityContext;
///
/// let builder = ViolationBuilder::new()
///     .with_rule("habitat")
///     .with_entity(EntityContext::new().organism());
/// let _first = builder.build_warning();
/// let _again = builder.with_message("reused");
/// ```
#[derive(Debug, Default)]
#[must_use]
pub struct ViolationBuilder {
    rule: String,
    severity: Option<SeverityRef>,
    message: String,
    entity: Option<EntityTypeRef>,
    entity_id: String,
}

impl ViolationBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }

    pub fn with_severity(mut self, severity: SeverityRef) -> Self {
        self.severity = Some(severity);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_entity(mut self, entity: EntityTypeRef) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = entity_id.into();
        self
    }

    pub fn build(self) -> Result<Violation, BuildError> {
        if self.rule.is_empty() {
            return Err(BuildError::missing("rule"));
        }
        let severity = self.severity.ok_or(BuildError::missing("severity"))?;
        let entity = self.entity.ok_or(BuildError::missing("entity"))?;
        Ok(Violation {
            rule: self.rule,
            severity,
            message: self.message,
            entity,
            entity_id: self.entity_id,
        })
    }

    pub fn build_warning(self) -> Result<Violation, BuildError> {
        self.with_severity(SeverityContext::new().warn()).build()
    }

    pub fn build_blocking(self) -> Result<Violation, BuildError> {
        self.with_severity(SeverityContext::new().block()).build()
    }

    pub fn build_log(self) -> Result<Violation, BuildError> {
        self.with_severity(SeverityContext::new().log()).build()
    }
}
