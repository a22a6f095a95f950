opaque_ref! {
    /// Inventory health of a supply item.
    pub struct SupplyStatusRef(SupplyStatus) {
        Healthy => "healthy",
        Reorder => "reorder",
        Critical => "critical",
        Expired => "expired",
    }
}

impl SupplyStatusRef {
    #[must_use]
    pub const fn requires_reorder(&self) -> bool {
        matches!(self.0, SupplyStatus::Reorder | SupplyStatus::Critical)
    }

    #[must_use]
    pub const fn is_expired(&self) -> bool {
        matches!(self.0, SupplyStatus::Expired)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SupplyContext;

impl SupplyContext {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub const fn statuses(&self) -> SupplyStatusProvider {
        SupplyStatusProvider
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SupplyStatusProvider;

impl SupplyStatusProvider {
    pub const fn healthy(&self) -> SupplyStatusRef {
        SupplyStatusRef(SupplyStatus::Healthy)
    }

    pub const fn reorder(&self) -> SupplyStatusRef {
        SupplyStatusRef(SupplyStatus::Reorder)
    }

    pub const fn critical(&self) -> SupplyStatusRef {
        SupplyStatusRef(SupplyStatus::Critical)
    }

    pub const fn expired(&self) -> SupplyStatusRef {
        SupplyStatusRef(SupplyStatus::Expired)
    }
}
