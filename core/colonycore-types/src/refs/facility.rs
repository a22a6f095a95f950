opaque_ref! {
    /// Biosafety zone a facility belongs to.
    pub struct FacilityZoneRef(Zone) {
        Biosecure => "biosecure",
        Quarantine => "quarantine",
        General => "general",
    }
}

impl FacilityZoneRef {
    #[must_use]
    pub const fn is_biosecure(&self) -> bool {
        matches!(self.0, Zone::Biosecure)
    }

    #[must_use]
    pub const fn is_quarantine(&self) -> bool {
        matches!(self.0, Zone::Quarantine)
    }
}

opaque_ref! {
    /// Who may enter a facility.
    pub struct FacilityAccessPolicyRef(AccessPolicy) {
        Restricted => "restricted",
        StaffOnly => "staff_only",
        Open => "open",
    }
}

impl FacilityAccessPolicyRef {
    #[must_use]
    pub const fn is_restricted(&self) -> bool {
        matches!(self.0, AccessPolicy::Restricted)
    }

    #[must_use]
    pub const fn allows_visitors(&self) -> bool {
        matches!(self.0, AccessPolicy::Open)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FacilityContext;

impl FacilityContext {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub const fn zones(&self) -> FacilityZoneProvider {
        FacilityZoneProvider
    }

    pub const fn access_policies(&self) -> FacilityAccessPolicyProvider {
        FacilityAccessPolicyProvider
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FacilityZoneProvider;

impl FacilityZoneProvider {
    pub const fn biosecure(&self) -> FacilityZoneRef {
        FacilityZoneRef(Zone::Biosecure)
    }

    pub const fn quarantine(&self) -> FacilityZoneRef {
        FacilityZoneRef(Zone::Quarantine)
    }

    pub const fn general(&self) -> FacilityZoneRef {
        FacilityZoneRef(Zone::General)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FacilityAccessPolicyProvider;

impl FacilityAccessPolicyProvider {
    pub const fn restricted(&self) -> FacilityAccessPolicyRef {
        FacilityAccessPolicyRef(AccessPolicy::Restricted)
    }

    pub const fn staff_only(&self) -> FacilityAccessPolicyRef {
        FacilityAccessPolicyRef(AccessPolicy::StaffOnly)
    }

    pub const fn open(&self) -> FacilityAccessPolicyRef {
        FacilityAccessPolicyRef(AccessPolicy::Open)
    }
}
