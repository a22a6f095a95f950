//! Shared value types for ColonyCore's plugin boundary.
//!
//! - [`refs`]: sealed opaque references minted by context factories
//! - [`ChangePayload`]: cloned JSON snapshot attached to a change
//! - [`ObjectPayload`] / [`ExtensionSet`]: deep-cloned attribute maps
//!   namespaced by hook and contributor
//!
//! Every accessor in this crate hands out an owned copy, so values can cross
//! into plugin code without sharing memory with the store.

mod error;
mod extension;
mod object;
mod payload;
pub mod refs;

pub use error::PayloadError;
pub use extension::{
    ExtensionContributorContext, ExtensionHookContext, ExtensionSet, HookRef, PluginRef,
    RawExtensions,
};
pub use object::ObjectPayload;
pub use payload::ChangePayload;
pub use refs::*;
