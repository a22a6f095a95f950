opaque_ref! {
    /// Whether an observation carries structured data, narrative notes or both.
    pub struct ObservationShapeRef(Shape) {
        Narrative => "narrative",
        Structured => "structured",
        Mixed => "mixed",
    }
}

impl ObservationShapeRef {
    #[must_use]
    pub const fn has_structured_payload(&self) -> bool {
        matches!(self.0, Shape::Structured | Shape::Mixed)
    }

    #[must_use]
    pub const fn has_narrative_notes(&self) -> bool {
        matches!(self.0, Shape::Narrative | Shape::Mixed)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObservationContext;

impl ObservationContext {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub const fn shapes(&self) -> ObservationShapeProvider {
        ObservationShapeProvider
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ObservationShapeProvider;

impl ObservationShapeProvider {
    pub const fn narrative(&self) -> ObservationShapeRef {
        ObservationShapeRef(Shape::Narrative)
    }

    pub const fn structured(&self) -> ObservationShapeRef {
        ObservationShapeRef(Shape::Structured)
    }

    pub const fn mixed(&self) -> ObservationShapeRef {
        ObservationShapeRef(Shape::Mixed)
    }
}
