opaque_ref! {
    /// Regulatory status of a permit.
    pub struct PermitStatusRef(PermitStatus) {
        Draft => "draft",
        Submitted => "submitted",
        Approved => "approved",
        OnHold => "on_hold",
        Expired => "expired",
        Archived => "archived",
    }
}

impl PermitStatusRef {
    /// Only approved permits authorise activity.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.0, PermitStatus::Approved)
    }

    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self.0, PermitStatus::Expired)
    }

    #[must_use]
    pub const fn is_archived(&self) -> bool {
        matches!(self.0, PermitStatus::Archived)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PermitContext;

impl PermitContext {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub const fn statuses(&self) -> PermitStatusProvider {
        PermitStatusProvider
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PermitStatusProvider;

impl PermitStatusProvider {
    pub const fn draft(&self) -> PermitStatusRef {
        PermitStatusRef(PermitStatus::Draft)
    }

    pub const fn submitted(&self) -> PermitStatusRef {
        PermitStatusRef(PermitStatus::Submitted)
    }

    pub const fn approved(&self) -> PermitStatusRef {
        PermitStatusRef(PermitStatus::Approved)
    }

    pub const fn on_hold(&self) -> PermitStatusRef {
        PermitStatusRef(PermitStatus::OnHold)
    }

    pub const fn expired(&self) -> PermitStatusRef {
        PermitStatusRef(PermitStatus::Expired)
    }

    pub const fn archived(&self) -> PermitStatusRef {
        PermitStatusRef(PermitStatus::Archived)
    }
}
