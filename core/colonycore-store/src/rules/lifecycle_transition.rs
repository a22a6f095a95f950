use async_trait::async_trait;
use colonycore_pluginapi::{
    CancellationToken, Change, Rule, RuleResult, RuleResultBuilder, RuleView, ViolationBuilder,
};
use colonycore_types::{EntityContext, EntityTypeRef};

/// Allowed states for one kind of record, read from a single payload field.
struct Machine {
    entity: EntityTypeRef,
    label: &'static str,
    field: &'static str,
    valid: &'static [&'static str],
    terminal: &'static [&'static str],
}

const MACHINES: &[Machine] = &[
    Machine {
        entity: EntityContext::new().organism(),
        label: "organism",
        field: "stage",
        valid: &["planned", "embryo_larva", "juvenile", "adult", "retired", "deceased"],
        terminal: &["retired", "deceased"],
    },
    Machine {
        entity: EntityContext::new().housing_unit(),
        label: "housing unit",
        field: "state",
        valid: &["quarantine", "active", "cleaning", "decommissioned"],
        terminal: &["decommissioned"],
    },
    Machine {
        entity: EntityContext::new().procedure(),
        label: "procedure",
        field: "status",
        valid: &["scheduled", "in_progress", "completed", "cancelled", "failed"],
        terminal: &["completed", "cancelled", "failed"],
    },
    Machine {
        entity: EntityContext::new().treatment(),
        label: "treatment",
        field: "status",
        valid: &["planned", "in_progress", "completed", "flagged"],
        terminal: &["completed", "flagged"],
    },
    Machine {
        entity: EntityContext::new().protocol(),
        label: "protocol",
        field: "status",
        valid: &["draft", "active", "suspended", "completed", "cancelled"],
        terminal: &["completed", "cancelled"],
    },
    Machine {
        entity: EntityContext::new().permit(),
        label: "permit",
        field: "status",
        valid: &["draft", "submitted", "approved", "on_hold", "expired", "archived"],
        terminal: &["expired", "archived"],
    },
    Machine {
        entity: EntityContext::new().sample(),
        label: "sample",
        field: "status",
        valid: &["stored", "in_transit", "consumed", "disposed"],
        terminal: &["consumed", "disposed"],
    },
];

/// Blocks unknown lifecycle states and any move out of a terminal state.
///
/// Works purely from change payloads; the view is not consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleTransitionRule;

#[async_trait]
impl Rule for LifecycleTransitionRule {
    fn name(&self) -> &str {
        "lifecycle_transition"
    }

    async fn evaluate(
        &self,
        _cancel: &CancellationToken,
        _view: &dyn RuleView,
        changes: &[Change],
    ) -> anyhow::Result<RuleResult> {
        let mut result = RuleResultBuilder::new();
        for change in changes {
            let Some(machine) = MACHINES.iter().find(|m| m.entity == change.entity()) else {
                continue;
            };
            let after = change.after();
            let Some(next) = after.get_str(machine.field) else {
                continue;
            };
            let id = after.get_str("id").unwrap_or_default();

            let message = if !machine.valid.contains(&next.as_str()) {
                format!("{} {id} is set to invalid state {next}", machine.label)
            } else {
                match change.before().get_str(machine.field) {
                    Some(previous)
                        if previous != next && machine.terminal.contains(&previous.as_str()) =>
                    {
                        format!(
                            "cannot move {} {id} from terminal state {previous} to {next}",
                            machine.label
                        )
                    }
                    _ => continue,
                }
            };

            result = result.add_violation(
                ViolationBuilder::new()
                    .with_rule(self.name())
                    .with_message(message)
                    .with_entity(machine.entity)
                    .with_entity_id(id)
                    .build_blocking()?,
            );
        }
        Ok(result.build())
    }
}
