use thiserror::Error;

/// Errors raised while wrapping extension payloads.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("extension: hook {hook} expects object payload, got {found}")]
    NotAnObject { hook: String, found: &'static str },

    #[error("extension: payload for hook {0} is not initialised")]
    Undefined(String),

    #[error("extension: payload hook {actual} does not match expected {expected}")]
    HookMismatch { actual: String, expected: String },
}
