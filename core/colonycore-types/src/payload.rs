use serde::Serialize;

/// JSON snapshot of an entity on one side of a change.
///
/// An undefined payload means "no snapshot" (the before side of a create);
/// a defined payload may still be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangePayload {
    raw: Option<Vec<u8>>,
}

impl ChangePayload {
    /// Copies `raw` into a defined payload.
    #[must_use]
    pub fn new(raw: &[u8]) -> Self {
        Self {
            raw: Some(raw.to_vec()),
        }
    }

    #[must_use]
    pub const fn undefined() -> Self {
        Self { raw: None }
    }

    /// Serializes `value` into a defined payload.
    pub fn from_value<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Self> {
        Ok(Self {
            raw: Some(serde_json::to_vec(value)?),
        })
    }

    #[must_use]
    pub const fn defined(&self) -> bool {
        self.raw.is_some()
    }

    /// True when undefined or defined with zero bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.as_ref().is_none_or(Vec::is_empty)
    }

    /// Returns a fresh copy of the snapshot bytes, or `None` when there are none.
    #[must_use]
    pub fn raw(&self) -> Option<Vec<u8>> {
        match &self.raw {
            Some(raw) if !raw.is_empty() => Some(raw.clone()),
            _ => None,
        }
    }

    /// Decodes the snapshot as a JSON value.
    pub fn to_value(&self) -> Option<serde_json::Value> {
        self.raw
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| serde_json::from_slice(raw).ok())
    }

    /// Reads a string field from a JSON object snapshot.
    pub fn get_str(&self, field: &str) -> Option<String> {
        self.to_value()?
            .get(field)?
            .as_str()
            .map(str::to_string)
    }
}
