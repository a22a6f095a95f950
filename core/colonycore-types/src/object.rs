use crate::error::PayloadError;
use crate::extension::HookRef;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// Attribute map contributed to one extension hook.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPayload {
    hook: Option<HookRef>,
    values: Option<Map<String, Value>>,
}

impl ObjectPayload {
    /// Wraps `value` for `hook`. `Null` yields a defined, empty payload;
    /// anything other than an object is rejected.
    pub fn new(hook: HookRef, value: Value) -> Result<Self, PayloadError> {
        let values = match value {
            Value::Null => Map::new(),
            Value::Object(map) => map,
            other => {
                return Err(PayloadError::NotAnObject {
                    hook: hook.to_string(),
                    found: type_name(&other),
                });
            }
        };
        Ok(Self {
            hook: Some(hook),
            values: Some(values),
        })
    }

    pub(crate) fn from_map(hook: HookRef, values: Map<String, Value>) -> Self {
        Self {
            hook: Some(hook),
            values: Some(values),
        }
    }

    #[must_use]
    pub const fn undefined() -> Self {
        Self {
            hook: None,
            values: None,
        }
    }

    pub fn hook(&self) -> Option<&HookRef> {
        self.hook.as_ref()
    }

    #[must_use]
    pub const fn defined(&self) -> bool {
        self.values.is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.as_ref().is_none_or(Map::is_empty)
    }

    /// Deep copy of the attribute map; `None` when undefined or empty.
    #[must_use]
    pub fn map(&self) -> Option<Map<String, Value>> {
        self.values.as_ref().filter(|m| !m.is_empty()).cloned()
    }

    pub fn expect_hook(&self, expected: &HookRef) -> Result<(), PayloadError> {
        match &self.hook {
            None => Err(PayloadError::Undefined(expected.to_string())),
            Some(hook) if hook == expected => Ok(()),
            Some(hook) => Err(PayloadError::HookMismatch {
                actual: hook.to_string(),
                expected: expected.to_string(),
            }),
        }
    }
}

impl Serialize for ObjectPayload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.values {
            None => serializer.serialize_none(),
            Some(values) => values.serialize(serializer),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
