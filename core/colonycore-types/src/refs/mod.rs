//! Sealed, comparable references for every closed domain enumeration.
//!
//! A reference can only be obtained from its context factory (for example
//! [`EntityContext::organism`]); there is no public constructor and the
//! [`OpaqueRef`] trait cannot be implemented outside this crate.

use std::any::Any;
use std::fmt;

pub(crate) mod private {
    pub trait Sealed {}
}

/// Behaviour shared by every opaque reference.
///
/// Sealed: only types defined in this crate implement it.
pub trait OpaqueRef: private::Sealed + fmt::Display + fmt::Debug + Send + Sync + 'static {
    /// Compares against any value. Refs of another kind, references to refs
    /// and boxed refs are never equal.
    fn equals(&self, other: &dyn Any) -> bool;
}

/// Defines a `Copy` reference over a private enumeration.
///
/// Each variant maps to the wire identifier used in stored records and
/// debug output.
macro_rules! opaque_ref {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($inner:ident) {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name($inner);

        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        enum $inner {
            $($variant),+
        }

        impl $name {
            pub(crate) const fn value(&self) -> &'static str {
                match self.0 {
                    $($inner::$variant => $value),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.value())
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.value())
            }
        }

        impl $crate::refs::private::Sealed for $name {}

        impl $crate::refs::OpaqueRef for $name {
            fn equals(&self, other: &dyn std::any::Any) -> bool {
                other.downcast_ref::<$name>().is_some_and(|o| o == self)
            }
        }
    };
}

mod entity;
mod facility;
mod housing;
mod lifecycle;
mod observation;
mod permit;
mod protocol;
mod sample;
mod supply;
mod treatment;

pub use entity::{
    ActionContext, ActionRef, EntityContext, EntityTypeRef, SeverityContext, SeverityRef,
};
pub use facility::{
    FacilityAccessPolicyProvider, FacilityAccessPolicyRef, FacilityContext, FacilityZoneProvider,
    FacilityZoneRef,
};
pub use housing::{EnvironmentTypeRef, HousingContext, HousingStateProvider, HousingStateRef};
pub use lifecycle::{LifecycleStageContext, LifecycleStageRef};
pub use observation::{ObservationContext, ObservationShapeProvider, ObservationShapeRef};
pub use permit::{PermitContext, PermitStatusProvider, PermitStatusRef};
pub use protocol::{ProtocolContext, ProtocolStatusRef};
pub use sample::{
    SampleContext, SampleSourceProvider, SampleSourceRef, SampleStatusProvider, SampleStatusRef,
};
pub use supply::{SupplyContext, SupplyStatusProvider, SupplyStatusRef};
pub use treatment::{TreatmentContext, TreatmentStatusProvider, TreatmentStatusRef};
