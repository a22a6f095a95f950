opaque_ref! {
    /// Where a sample was collected from.
    pub struct SampleSourceRef(Source) {
        Organism => "organism",
        Cohort => "cohort",
        Environmental => "environmental",
        Unknown => "unknown",
    }
}

opaque_ref! {
    /// Custody status of a sample.
    pub struct SampleStatusRef(SampleStatus) {
        Stored => "stored",
        InTransit => "in_transit",
        Consumed => "consumed",
        Disposed => "disposed",
    }
}

impl SampleStatusRef {
    /// Stored or in-transit samples can still be used.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self.0, SampleStatus::Stored | SampleStatus::InTransit)
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.0, SampleStatus::Consumed | SampleStatus::Disposed)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SampleContext;

impl SampleContext {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub const fn sources(&self) -> SampleSourceProvider {
        SampleSourceProvider
    }

    pub const fn statuses(&self) -> SampleStatusProvider {
        SampleStatusProvider
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SampleSourceProvider;

impl SampleSourceProvider {
    pub const fn organism(&self) -> SampleSourceRef {
        SampleSourceRef(Source::Organism)
    }

    pub const fn cohort(&self) -> SampleSourceRef {
        SampleSourceRef(Source::Cohort)
    }

    pub const fn environmental(&self) -> SampleSourceRef {
        SampleSourceRef(Source::Environmental)
    }

    pub const fn unknown(&self) -> SampleSourceRef {
        SampleSourceRef(Source::Unknown)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SampleStatusProvider;

impl SampleStatusProvider {
    pub const fn stored(&self) -> SampleStatusRef {
        SampleStatusRef(SampleStatus::Stored)
    }

    pub const fn in_transit(&self) -> SampleStatusRef {
        SampleStatusRef(SampleStatus::InTransit)
    }

    pub const fn consumed(&self) -> SampleStatusRef {
        SampleStatusRef(SampleStatus::Consumed)
    }

    pub const fn disposed(&self) -> SampleStatusRef {
        SampleStatusRef(SampleStatus::Disposed)
    }
}
