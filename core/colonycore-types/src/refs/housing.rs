opaque_ref! {
    /// Environment a housing unit provides.
    pub struct EnvironmentTypeRef(Environment) {
        Aquatic => "aquatic",
        Terrestrial => "terrestrial",
        Arboreal => "arboreal",
        Humid => "humid",
    }
}

impl EnvironmentTypeRef {
    #[must_use]
    pub const fn is_aquatic(&self) -> bool {
        matches!(self.0, Environment::Aquatic)
    }

    /// Aquatic environments count as humid.
    #[must_use]
    pub const fn is_humid(&self) -> bool {
        matches!(self.0, Environment::Humid | Environment::Aquatic)
    }
}

opaque_ref! {
    /// Operational state of a housing unit.
    pub struct HousingStateRef(HousingState) {
        Quarantine => "quarantine",
        Active => "active",
        Cleaning => "cleaning",
        Decommissioned => "decommissioned",
    }
}

impl HousingStateRef {
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.0, HousingState::Active)
    }

    #[must_use]
    pub const fn is_decommissioned(&self) -> bool {
        matches!(self.0, HousingState::Decommissioned)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HousingContext;

impl HousingContext {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub const fn aquatic(&self) -> EnvironmentTypeRef {
        EnvironmentTypeRef(Environment::Aquatic)
    }

    pub const fn terrestrial(&self) -> EnvironmentTypeRef {
        EnvironmentTypeRef(Environment::Terrestrial)
    }

    pub const fn arboreal(&self) -> EnvironmentTypeRef {
        EnvironmentTypeRef(Environment::Arboreal)
    }

    pub const fn humid(&self) -> EnvironmentTypeRef {
        EnvironmentTypeRef(Environment::Humid)
    }

    pub const fn states(&self) -> HousingStateProvider {
        HousingStateProvider
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HousingStateProvider;

impl HousingStateProvider {
    pub const fn quarantine(&self) -> HousingStateRef {
        HousingStateRef(HousingState::Quarantine)
    }

    pub const fn active(&self) -> HousingStateRef {
        HousingStateRef(HousingState::Active)
    }

    pub const fn cleaning(&self) -> HousingStateRef {
        HousingStateRef(HousingState::Cleaning)
    }

    pub const fn decommissioned(&self) -> HousingStateRef {
        HousingStateRef(HousingState::Decommissioned)
    }
}
