opaque_ref! {
    /// Developmental stage of an organism.
    pub struct LifecycleStageRef(Stage) {
        Planned => "planned",
        Larva => "embryo_larva",
        Juvenile => "juvenile",
        Adult => "adult",
        Retired => "retired",
        Deceased => "deceased",
    }
}

impl LifecycleStageRef {
    /// Active organisms are neither retired nor deceased.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !matches!(self.0, Stage::Retired | Stage::Deceased)
    }

    /// Retired and deceased are terminal: an organism never leaves them.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.0, Stage::Retired | Stage::Deceased)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LifecycleStageContext;

impl LifecycleStageContext {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub const fn planned(&self) -> LifecycleStageRef {
        LifecycleStageRef(Stage::Planned)
    }

    pub const fn larva(&self) -> LifecycleStageRef {
        LifecycleStageRef(Stage::Larva)
    }

    pub const fn juvenile(&self) -> LifecycleStageRef {
        LifecycleStageRef(Stage::Juvenile)
    }

    pub const fn adult(&self) -> LifecycleStageRef {
        LifecycleStageRef(Stage::Adult)
    }

    pub const fn retired(&self) -> LifecycleStageRef {
        LifecycleStageRef(Stage::Retired)
    }

    pub const fn deceased(&self) -> LifecycleStageRef {
        LifecycleStageRef(Stage::Deceased)
    }

    /// All stages in lifecycle order.
    pub const fn all(&self) -> [LifecycleStageRef; 6] {
        [
            self.planned(),
            self.larva(),
            self.juvenile(),
            self.adult(),
            self.retired(),
            self.deceased(),
        ]
    }
}
