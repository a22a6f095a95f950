opaque_ref! {
    /// Approval status of a research protocol.
    pub struct ProtocolStatusRef(ProtocolStatus) {
        Draft => "draft",
        Active => "active",
        Suspended => "suspended",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl ProtocolStatusRef {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.0, ProtocolStatus::Active)
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.0, ProtocolStatus::Completed | ProtocolStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProtocolContext;

impl ProtocolContext {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub const fn draft(&self) -> ProtocolStatusRef {
        ProtocolStatusRef(ProtocolStatus::Draft)
    }

    pub const fn active(&self) -> ProtocolStatusRef {
        ProtocolStatusRef(ProtocolStatus::Active)
    }

    pub const fn suspended(&self) -> ProtocolStatusRef {
        ProtocolStatusRef(ProtocolStatus::Suspended)
    }

    pub const fn completed(&self) -> ProtocolStatusRef {
        ProtocolStatusRef(ProtocolStatus::Completed)
    }

    pub const fn cancelled(&self) -> ProtocolStatusRef {
        ProtocolStatusRef(ProtocolStatus::Cancelled)
    }
}
