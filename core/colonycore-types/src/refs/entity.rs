opaque_ref! {
    /// Kind of domain entity a change or violation refers to.
    pub struct EntityTypeRef(EntityType) {
        Organism => "organism",
        Cohort => "cohort",
        HousingUnit => "housing_unit",
        BreedingUnit => "breeding_unit",
        Procedure => "procedure",
        Protocol => "protocol",
        Project => "project",
        Facility => "facility",
        Treatment => "treatment",
        Observation => "observation",
        Sample => "sample",
        Permit => "permit",
        SupplyItem => "supply_item",
        Line => "line",
        Strain => "strain",
        GenotypeMarker => "genotype_marker",
    }
}

impl EntityTypeRef {
    /// Whether the entity belongs to the base colony model rather than a
    /// genetics extension.
    #[must_use]
    pub const fn is_core(&self) -> bool {
        matches!(
            self.0,
            EntityType::Organism
                | EntityType::HousingUnit
                | EntityType::Facility
                | EntityType::Procedure
                | EntityType::Treatment
                | EntityType::Observation
                | EntityType::Sample
                | EntityType::Protocol
                | EntityType::Permit
                | EntityType::Project
                | EntityType::SupplyItem
        )
    }
}

/// Factory for [`EntityTypeRef`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityContext;

impl EntityContext {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub const fn organism(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::Organism)
    }

    pub const fn cohort(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::Cohort)
    }

    pub const fn housing_unit(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::HousingUnit)
    }

    pub const fn breeding_unit(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::BreedingUnit)
    }

    pub const fn procedure(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::Procedure)
    }

    pub const fn protocol(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::Protocol)
    }

    pub const fn project(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::Project)
    }

    pub const fn facility(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::Facility)
    }

    pub const fn treatment(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::Treatment)
    }

    pub const fn observation(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::Observation)
    }

    pub const fn sample(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::Sample)
    }

    pub const fn permit(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::Permit)
    }

    pub const fn supply_item(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::SupplyItem)
    }

    pub const fn line(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::Line)
    }

    pub const fn strain(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::Strain)
    }

    pub const fn genotype_marker(&self) -> EntityTypeRef {
        EntityTypeRef(EntityType::GenotypeMarker)
    }
}

opaque_ref! {
    /// Mutation kind recorded on a change.
    pub struct ActionRef(Action) {
        Create => "create",
        Update => "update",
        Delete => "delete",
    }
}

impl ActionRef {
    /// Every action mutates state.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        true
    }

    #[must_use]
    pub const fn is_destructive(&self) -> bool {
        matches!(self.0, Action::Delete)
    }
}

/// Factory for [`ActionRef`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionContext;

impl ActionContext {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub const fn create(&self) -> ActionRef {
        ActionRef(Action::Create)
    }

    pub const fn update(&self) -> ActionRef {
        ActionRef(Action::Update)
    }

    pub const fn delete(&self) -> ActionRef {
        ActionRef(Action::Delete)
    }
}

opaque_ref! {
    /// How a violation affects the transaction that produced it.
    pub struct SeverityRef(Severity) {
        Block => "block",
        Warn => "warn",
        Log => "log",
    }
}

impl SeverityRef {
    /// A blocking violation forces the transaction to roll back.
    #[must_use]
    pub const fn is_blocking(&self) -> bool {
        matches!(self.0, Severity::Block)
    }

    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self.0, Severity::Warn)
    }

    #[must_use]
    pub const fn is_log(&self) -> bool {
        matches!(self.0, Severity::Log)
    }
}

/// Factory for [`SeverityRef`] values.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeverityContext;

impl SeverityContext {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub const fn block(&self) -> SeverityRef {
        SeverityRef(Severity::Block)
    }

    pub const fn warn(&self) -> SeverityRef {
        SeverityRef(Severity::Warn)
    }

    pub const fn log(&self) -> SeverityRef {
        SeverityRef(Severity::Log)
    }
}
