//! Attribute flattening.
//!
//! Terraform reports a resource's attributes as an arbitrarily nested JSON
//! document. The engine compares attributes one scalar at a time, so this
//! module flattens the nested document into a map from dotted paths to
//! scalar values. Nested objects contribute `parent.child` keys and nested
//! lists contribute `parent.<index>` keys:
//!
//! ```json
//! {"ami": "ami-a1b2c3d4", "tags": {"Name": "web"}, "ports": [22, 443]}
//! ```
//!
//! flattens to:
//!
//! ```text
//! ami      = "ami-a1b2c3d4"
//! tags.Name = "web"
//! ports.0  = 22
//! ports.1  = 443
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

use crate::error::EngineError;

/// A scalar attribute value.
///
/// Terraform's null is represented explicitly so that the engine can tell a
/// null attribute apart from an absent one.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Terraform's null.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number. Terraform's JSON output does not distinguish integers from
    /// floats, so neither do we.
    Number(f64),
    /// A string.
    String(String),
}

/// A resource's flattened attributes, keyed by dotted path.
pub type Attributes = BTreeMap<String, AttributeValue>;

impl AttributeValue {
    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns true if this is Terraform's null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<f64> for AttributeValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Flattens a resource's attribute image into a map of dotted paths to
/// scalar values.
///
/// A `null` image produces an empty map; Terraform reports `null` for the
/// image of a side it knows nothing about.
///
/// # Errors
///
/// Returns [`EngineError::UnflattenableImage`] if the image is neither `null`
/// nor an object, and [`EngineError::UnsupportedAttribute`] if a nested
/// number cannot be represented as a scalar.
pub fn flatten(image: &Value) -> Result<Attributes, EngineError> {
    let mut attributes = Attributes::new();

    match image {
        Value::Null => {}
        Value::Object(fields) => {
            for (key, value) in fields {
                flatten_into(&mut attributes, key.clone(), value)?;
            }
        }
        other => {
            return Err(EngineError::UnflattenableImage {
                kind: json_kind(other),
            });
        }
    }

    Ok(attributes)
}

/// Flattens a single value into `attributes` under the given path.
fn flatten_into(attributes: &mut Attributes, path: String, value: &Value) -> Result<(), EngineError> {
    match value {
        Value::Object(fields) => {
            for (key, nested) in fields {
                flatten_into(attributes, format!("{path}.{key}"), nested)?;
            }
        }
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                flatten_into(attributes, format!("{path}.{index}"), nested)?;
            }
        }
        Value::Null => {
            attributes.insert(path, AttributeValue::Null);
        }
        Value::Bool(b) => {
            attributes.insert(path, AttributeValue::Bool(*b));
        }
        Value::Number(n) => {
            let n = n
                .as_f64()
                .ok_or(EngineError::UnsupportedAttribute { path: path.clone() })?;
            attributes.insert(path, AttributeValue::Number(n));
        }
        Value::String(s) => {
            attributes.insert(path, AttributeValue::String(s.clone()));
        }
    }

    Ok(())
}

/// Names a JSON value's kind for error messages.
const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_scalars_pass_through() {
        let image = json!({
            "ami": "ami-a1b2c3d4",
            "count": 2,
            "enabled": true,
            "description": null,
        });

        let attributes = flatten(&image).expect("flatten failed");

        assert_eq!(attributes.get("ami"), Some(&AttributeValue::from("ami-a1b2c3d4")));
        assert_eq!(attributes.get("count"), Some(&AttributeValue::Number(2.0)));
        assert_eq!(attributes.get("enabled"), Some(&AttributeValue::Bool(true)));
        assert_eq!(attributes.get("description"), Some(&AttributeValue::Null));
    }

    #[test]
    fn test_flatten_nested_objects_use_dotted_paths() {
        let image = json!({
            "tags": {
                "Name": "web",
                "Environment": "production",
            },
        });

        let attributes = flatten(&image).expect("flatten failed");

        assert_eq!(attributes.get("tags.Name"), Some(&AttributeValue::from("web")));
        assert_eq!(
            attributes.get("tags.Environment"),
            Some(&AttributeValue::from("production"))
        );
        assert!(!attributes.contains_key("tags"));
    }

    #[test]
    fn test_flatten_lists_use_indexed_paths() {
        let image = json!({
            "ports": [22, 443],
            "rules": [{"port": 80}],
        });

        let attributes = flatten(&image).expect("flatten failed");

        assert_eq!(attributes.get("ports.0"), Some(&AttributeValue::Number(22.0)));
        assert_eq!(attributes.get("ports.1"), Some(&AttributeValue::Number(443.0)));
        assert_eq!(attributes.get("rules.0.port"), Some(&AttributeValue::Number(80.0)));
    }

    #[test]
    fn test_flatten_null_image_is_empty() {
        let attributes = flatten(&Value::Null).expect("flatten failed");
        assert!(attributes.is_empty());
    }

    #[test]
    fn test_flatten_rejects_non_object_image() {
        let result = flatten(&json!("just a string"));

        match result {
            Err(EngineError::UnflattenableImage { kind }) => assert_eq!(kind, "string"),
            other => panic!("expected UnflattenableImage, got {other:?}"),
        }
    }

    #[test]
    fn test_flatten_is_deterministic() {
        let image = json!({
            "b": {"y": 1, "x": 2},
            "a": [true, false],
        });

        let first = flatten(&image).expect("flatten failed");
        let second = flatten(&image).expect("flatten failed");

        assert_eq!(first, second);
        let keys: Vec<&str> = first.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a.0", "a.1", "b.x", "b.y"]);
    }
}
