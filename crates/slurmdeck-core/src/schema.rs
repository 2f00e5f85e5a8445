// SPDX-FileCopyrightText: 2026 Slurmdeck Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative configuration schema published in [`PluginInfo`](crate::PluginInfo).
//!
//! The manager never enforces a schema on its own. Configurable plugins call
//! [`ConfigSchema::validate`] from their `validate_config` implementation to
//! get required-field, type and rule checks for free.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::Display;

use crate::error::SlurmdeckError;
use crate::types::PluginConfig;

/// Value type of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    /// Seconds, as a non-negative integer.
    Duration,
    List,
    Map,
}

impl FieldType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Int => value.is_i64() || value.is_u64(),
            FieldType::Float => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            FieldType::Duration => value.is_u64(),
            FieldType::List => value.is_array(),
            FieldType::Map => value.is_object(),
        }
    }
}

/// Extra constraint applied after the type check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    /// Numeric value within an inclusive range.
    Range { min: f64, max: f64 },
    /// String value from a fixed set.
    OneOf(Vec<String>),
    /// String, list or map must not be empty.
    NonEmpty,
}

impl ValidationRule {
    fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            ValidationRule::Range { min, max } => match value.as_f64() {
                Some(n) if n >= *min && n <= *max => Ok(()),
                Some(n) => Err(format!("{n} is outside {min}..={max}")),
                None => Err("expected a number".to_string()),
            },
            ValidationRule::OneOf(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| a == s) => Ok(()),
                Some(s) => Err(format!("`{s}` is not one of: {}", allowed.join(", "))),
                None => Err("expected a string".to_string()),
            },
            ValidationRule::NonEmpty => {
                let empty = match value {
                    Value::String(s) => s.is_empty(),
                    Value::Array(a) => a.is_empty(),
                    Value::Object(o) => o.is_empty(),
                    Value::Null => true,
                    _ => false,
                };
                if empty {
                    Err("must not be empty".to_string())
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// One field of a plugin's configuration schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigField {
    pub field_type: FieldType,
    pub description: String,
    pub default: Option<Value>,
    pub required: bool,
    pub validation: Option<ValidationRule>,
}

impl ConfigField {
    pub fn new(field_type: FieldType, description: impl Into<String>) -> Self {
        Self {
            field_type,
            description: description.into(),
            default: None,
            required: false,
            validation: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validation = Some(rule);
        self
    }
}

/// Named configuration fields, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigSchema {
    fields: BTreeMap<String, ConfigField>,
}

impl ConfigSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, field: ConfigField) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ConfigField> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ConfigField)> {
        self.fields.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Checks `config` against this schema.
    ///
    /// Keys the schema does not mention are accepted. All problems are
    /// collected into a single [`SlurmdeckError::Config`].
    pub fn validate(&self, config: &PluginConfig) -> Result<(), SlurmdeckError> {
        let mut problems = Vec::new();

        for (name, field) in &self.fields {
            let Some(value) = config.get(name) else {
                if field.required {
                    problems.push(format!("`{name}` is required"));
                }
                continue;
            };

            if !field.field_type.accepts(value) {
                problems.push(format!("`{name}` must be of type {}", field.field_type));
                continue;
            }

            if let Some(rule) = &field.validation
                && let Err(reason) = rule.check(value)
            {
                problems.push(format!("`{name}`: {reason}"));
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(SlurmdeckError::Config(problems.join("; ")))
        }
    }

    /// Returns `config` with schema defaults filled in for absent keys.
    pub fn apply_defaults(&self, config: &PluginConfig) -> PluginConfig {
        let mut merged = config.clone();
        for (name, field) in &self.fields {
            if let Some(default) = &field.default {
                merged
                    .entry(name.clone())
                    .or_insert_with(|| default.clone());
            }
        }
        merged
    }
}
