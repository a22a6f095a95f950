opaque_ref! {
    pub struct TreatmentStatusRef(TreatmentStatus) {
        Planned => "planned",
        InProgress => "in_progress",
        Completed => "completed",
        Flagged => "flagged",
    }
}

impl TreatmentStatusRef {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.0, TreatmentStatus::InProgress)
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.0, TreatmentStatus::Completed)
    }

    /// Flagged treatments recorded at least one adverse event.
    #[must_use]
    pub const fn is_flagged(&self) -> bool {
        matches!(self.0, TreatmentStatus::Flagged)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TreatmentContext;

impl TreatmentContext {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub const fn statuses(&self) -> TreatmentStatusProvider {
        TreatmentStatusProvider
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TreatmentStatusProvider;

impl TreatmentStatusProvider {
    pub const fn planned(&self) -> TreatmentStatusRef {
        TreatmentStatusRef(TreatmentStatus::Planned)
    }

    pub const fn in_progress(&self) -> TreatmentStatusRef {
        TreatmentStatusRef(TreatmentStatus::InProgress)
    }

    pub const fn completed(&self) -> TreatmentStatusRef {
        TreatmentStatusRef(TreatmentStatus::Completed)
    }

    pub const fn flagged(&self) -> TreatmentStatusRef {
        TreatmentStatusRef(TreatmentStatus::Flagged)
    }
}
