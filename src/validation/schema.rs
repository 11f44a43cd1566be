use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::{FieldViolation, ValidationError};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)+$")
        .expect("email pattern is a valid regex")
});

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// String with a character count in `min..=max`
    Text { min: usize, max: usize },
    Email { max: usize },
    /// Integer >= 1; numeric strings are accepted and normalized to numbers
    PositiveInt,
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    name: &'static str,
    kind: FieldKind,
    required: bool,
    default: Option<Value>,
}

impl FieldRule {
    pub fn text(name: &'static str, min: usize, max: usize) -> Self {
        Self::required(name, FieldKind::Text { min, max })
    }

    pub fn email(name: &'static str, max: usize) -> Self {
        Self::required(name, FieldKind::Email { max })
    }

    pub fn positive_int(name: &'static str) -> Self {
        Self::required(name, FieldKind::PositiveInt)
    }

    fn required(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Value used when the field is absent. The default still goes through the bounds check.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.required = false;
        self.default = Some(value.into());
        self
    }

    fn check(&self, value: &Value) -> Result<Value, String> {
        match &self.kind {
            FieldKind::Text { min, max } => {
                let s = value.as_str().ok_or_else(|| "Expected a string".to_string())?;
                let len = s.chars().count();
                if len < *min {
                    return Err(format!("Must be at least {} characters", min));
                }
                if len > *max {
                    return Err(format!("Must be at most {} characters", max));
                }
                Ok(value.clone())
            }
            FieldKind::Email { max } => {
                let s = value.as_str().ok_or_else(|| "Expected a string".to_string())?;
                if s.chars().count() > *max {
                    return Err(format!("Must be at most {} characters", max));
                }
                if !EMAIL_PATTERN.is_match(s) {
                    return Err("Invalid email address".to_string());
                }
                Ok(value.clone())
            }
            FieldKind::PositiveInt => {
                let n = match value {
                    Value::Number(n) => n.as_i64().ok_or_else(|| "Expected an integer".to_string())?,
                    Value::String(s) => s
                        .trim()
                        .parse::<i64>()
                        .map_err(|_| "Expected an integer".to_string())?,
                    _ => return Err("Expected an integer".to_string()),
                };
                if n < 1 {
                    return Err("Must be a positive integer".to_string());
                }
                Ok(Value::from(n))
            }
        }
    }
}

/// Ordered set of field rules describing one request shape
#[derive(Debug, Clone)]
pub struct Schema {
    fields: Vec<FieldRule>,
}

impl Schema {
    pub fn new(fields: Vec<FieldRule>) -> Self {
        Self { fields }
    }

    /// Normalize `input` against the schema, collecting every violation.
    ///
    /// Absent (or null) optional fields are omitted from the output; fields not named
    /// in the schema are dropped.
    pub fn validate(&self, input: &Value) -> Result<Map<String, Value>, ValidationError> {
        let empty = Map::new();
        let object = match input {
            Value::Object(obj) => obj,
            Value::Null => &empty,
            _ => return Err(ValidationError::single("$", "Expected an object")),
        };

        let mut normalized = Map::new();
        let mut violations = Vec::new();

        for rule in &self.fields {
            let supplied = object.get(rule.name).filter(|v| !v.is_null());
            let value = match (supplied, &rule.default) {
                (Some(v), _) => v,
                (None, Some(default)) => default,
                (None, None) if rule.required => {
                    violations.push(FieldViolation::new(rule.name, "Required"));
                    continue;
                }
                (None, None) => continue,
            };

            match rule.check(value) {
                Ok(v) => {
                    normalized.insert(rule.name.to_string(), v);
                }
                Err(message) => violations.push(FieldViolation::new(rule.name, message)),
            }
        }

        if violations.is_empty() {
            Ok(normalized)
        } else {
            Err(ValidationError { violations })
        }
    }

    /// Validate and deserialize into a typed request
    pub fn parse<T: DeserializeOwned>(&self, input: &Value) -> Result<T, ValidationError> {
        let normalized = self.validate(input)?;
        serde_json::from_value(Value::Object(normalized))
            .map_err(|e| ValidationError::single("$", e.to_string()))
    }
}
