//! Installed dataset templates: parameter validation, binding and execution.

use crate::error::{HostError, HostResult, ParameterError};
use chrono::{DateTime, SecondsFormat, Utc};
use colonycore_pluginapi::dataset::{
    self, DatasetEnvironment, DatasetRunner, Format, Parameter, ParameterType, RunRequest,
    RunResult, Scope, Template, TemplateDescriptor,
};
use serde_json::{Map, Number, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A plugin template as installed in the host catalog.
///
/// Cloning is cheap; the bound runner is shared.
#[derive(Clone)]
pub struct HostTemplate {
    plugin: String,
    template: Template,
    runner: Option<Arc<dyn DatasetRunner>>,
}

impl HostTemplate {
    pub fn new(plugin: impl Into<String>, template: Template) -> Self {
        Self {
            plugin: plugin.into(),
            template,
            runner: None,
        }
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// `plugin/key@version`.
    pub fn slug(&self) -> String {
        dataset::slug(&self.plugin, &self.template.key, &self.template.version)
    }

    pub fn descriptor(&self) -> TemplateDescriptor {
        self.template.descriptor(&self.plugin)
    }

    pub fn supports_format(&self, format: Format) -> bool {
        self.template.output_formats.contains(&format)
    }

    pub fn is_bound(&self) -> bool {
        self.runner.is_some()
    }

    /// Calls the template's binder and keeps the runner it returns.
    pub fn bind(&mut self, environment: &DatasetEnvironment) -> HostResult<()> {
        let Some(binder) = self.template.binder.as_ref() else {
            return Err(HostError::Bind {
                key: self.template.key.clone(),
                source: anyhow::anyhow!("dataset template binder missing"),
            });
        };
        let runner = binder(environment).map_err(|source| HostError::Bind {
            key: self.template.key.clone(),
            source,
        })?;
        self.runner = Some(runner);
        Ok(())
    }

    /// Checks `supplied` against the declared parameters without running
    /// anything. Returns the cleaned values keyed by declared name, or every
    /// problem found sorted by parameter name.
    pub fn validate_parameters(
        &self,
        supplied: &Map<String, Value>,
    ) -> Result<Map<String, Value>, Vec<ParameterError>> {
        validate_parameters(&self.template.parameters, supplied)
    }

    /// Validates `params`, invokes the bound runner and stamps the result
    /// with `format`. An empty result schema is filled from the declared
    /// columns.
    pub async fn run(
        &self,
        params: &Map<String, Value>,
        scope: Scope,
        format: Format,
    ) -> HostResult<RunResult> {
        let runner = self.runner.as_ref().ok_or(HostError::NotBound)?;
        let parameters = self
            .validate_parameters(params)
            .map_err(HostError::InvalidParameters)?;

        let mut result = runner
            .run(RunRequest {
                template: self.descriptor(),
                parameters,
                scope,
            })
            .await
            .map_err(HostError::Run)?;

        if result.schema.is_empty() {
            result.schema = self.template.columns.clone();
        }
        result.format = format;
        Ok(result)
    }
}

impl fmt::Debug for HostTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostTemplate")
            .field("slug", &self.slug())
            .field("bound", &self.is_bound())
            .finish_non_exhaustive()
    }
}

// ── Parameter coercion ───────────────────────────────────────────

fn validate_parameters(
    definitions: &[Parameter],
    supplied: &Map<String, Value>,
) -> Result<Map<String, Value>, Vec<ParameterError>> {
    let mut cleaned = Map::new();
    let mut errors = Vec::new();
    let mut undeclared: BTreeSet<String> = supplied.keys().map(|k| k.to_lowercase()).collect();

    for param in definitions {
        let Some(raw) = find_value(&param.name, supplied) else {
            if param.required {
                errors.push(ParameterError::new(&param.name, "required parameter missing"));
            } else if let Some(default) = &param.default {
                cleaned.insert(param.name.clone(), default.clone());
            }
            continue;
        };
        undeclared.remove(&param.name.to_lowercase());

        match coerce(param, raw) {
            Ok(value) => {
                cleaned.insert(param.name.clone(), value);
            }
            Err(message) => errors.push(ParameterError::new(&param.name, message)),
        }
    }

    errors.extend(
        undeclared
            .into_iter()
            .map(|name| ParameterError::new(name, "parameter not declared")),
    );

    if errors.is_empty() {
        Ok(cleaned)
    } else {
        errors.sort_by(|a, b| a.name.cmp(&b.name));
        Err(errors)
    }
}

/// Exact match first, then case-insensitive.
fn find_value<'a>(name: &str, supplied: &'a Map<String, Value>) -> Option<&'a Value> {
    supplied.get(name).or_else(|| {
        supplied
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

fn coerce(param: &Parameter, raw: &Value) -> Result<Value, String> {
    let name = &param.name;
    if raw.is_null() {
        return Err(format!("parameter {name} cannot be null"));
    }
    match param.kind {
        ParameterType::String => {
            let Value::String(value) = raw else {
                return Err(format!("parameter {name} expects string"));
            };
            if !param.enum_values.is_empty() && !param.enum_values.contains(value) {
                return Err(format!(
                    "value must be one of: {}",
                    param.enum_values.join(", ")
                ));
            }
            Ok(raw.clone())
        }
        ParameterType::Integer => {
            let expects = || format!("parameter {name} expects integer");
            match raw {
                Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                    (Some(i), _) => Ok(Value::from(i)),
                    (None, Some(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(Value::from(f as i64))
                    }
                    _ => Err(expects()),
                },
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| expects()),
                _ => Err(expects()),
            }
        }
        ParameterType::Number => {
            let expects = || format!("parameter {name} expects number");
            let parsed = match raw {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            };
            parsed
                .and_then(Number::from_f64)
                .map(Value::Number)
                .ok_or_else(expects)
        }
        ParameterType::Boolean => match raw {
            Value::Bool(_) => Ok(raw.clone()),
            Value::String(s) => parse_bool(s)
                .map(Value::Bool)
                .ok_or_else(|| format!("parameter {name} expects boolean")),
            _ => Err(format!("parameter {name} expects boolean")),
        },
        ParameterType::Timestamp => match raw {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|ts| {
                    Value::String(
                        ts.with_timezone(&Utc)
                            .to_rfc3339_opts(SecondsFormat::AutoSi, true),
                    )
                })
                .map_err(|_| format!("parameter {name} expects RFC3339 timestamp")),
            _ => Err(format!("parameter {name} expects timestamp")),
        },
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}
