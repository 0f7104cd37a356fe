//! User-supplied ignore rules.
//!
//! A rule tells the engine that a specific kind of difference between two
//! resources' attributes is not meaningful and should not prevent a match.
//! Rules are passed on the command line as colon-separated directives:
//!
//! ```text
//! everything:aws_instance.example:tags.Name
//! whitespace:aws_iam_policy:policy
//! prefix:google_storage_bucket:name:project-id-
//! ```

use std::fmt;

use crate::engine::AttributeValue;
use crate::error::RuleError;

/// A parsed ignore rule.
///
/// A rule applies to a single `(resource type, attribute key)` pair and
/// describes one kind of difference that may be ignored there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    kind: RuleKind,
    resource_type: String,
    attribute: String,
}

/// The kind of difference a rule allows the engine to ignore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleKind {
    /// Ignore any difference, regardless of the two values.
    Everything,
    /// Ignore differences between strings that are equal once all whitespace
    /// is removed, such as reformatted JSON bodies.
    Whitespace,
    /// Ignore differences where one string equals the other with a literal
    /// prefix removed.
    Prefix(String),
}

impl Rule {
    /// Parses a rule from its `kind:type:key[:parameter]` textual form.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] naming the raw rule text if the syntax is
    /// malformed or the kind is unknown.
    pub fn parse(raw: &str) -> Result<Self, RuleError> {
        let (kind, rest) = raw
            .split_once(':')
            .ok_or_else(|| RuleError::malformed(raw, "expected kind:type:key"))?;

        match kind {
            "everything" | "whitespace" => {
                let (resource_type, attribute) = split_type_and_key(raw, rest)?;
                let kind = if kind == "everything" {
                    RuleKind::Everything
                } else {
                    RuleKind::Whitespace
                };
                Ok(Self {
                    kind,
                    resource_type,
                    attribute,
                })
            }
            "prefix" => {
                let mut fields = rest.splitn(3, ':');
                let resource_type = next_field(&mut fields, raw, "resource type")?;
                let attribute = next_field(&mut fields, raw, "attribute key")?;
                let prefix = next_field(&mut fields, raw, "prefix parameter")?;
                Ok(Self {
                    kind: RuleKind::Prefix(prefix),
                    resource_type,
                    attribute,
                })
            }
            unknown => Err(RuleError::UnknownKind {
                raw: raw.to_owned(),
                kind: unknown.to_owned(),
            }),
        }
    }

    /// Returns true if this rule applies to the given resource type and
    /// attribute key. Both must match exactly; there are no wildcards.
    #[must_use]
    pub fn applies_to(&self, resource_type: &str, attribute: &str) -> bool {
        self.resource_type == resource_type && self.attribute == attribute
    }

    /// Returns true if this rule considers the two values equivalent.
    ///
    /// The delete-side value is `None` when the attribute is absent from the
    /// resource planned for deletion.
    #[must_use]
    pub fn equates(&self, create: &AttributeValue, delete: Option<&AttributeValue>) -> bool {
        match &self.kind {
            RuleKind::Everything => true,
            RuleKind::Whitespace => {
                let (Some(c), Some(d)) = (create.as_str(), delete.and_then(AttributeValue::as_str))
                else {
                    return false;
                };
                strip_whitespace(c) == strip_whitespace(d)
            }
            RuleKind::Prefix(prefix) => {
                let (Some(c), Some(d)) = (create.as_str(), delete.and_then(AttributeValue::as_str))
                else {
                    return false;
                };
                c.strip_prefix(prefix.as_str()) == Some(d)
                    || d.strip_prefix(prefix.as_str()) == Some(c)
            }
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RuleKind::Everything => {
                write!(f, "everything:{}:{}", self.resource_type, self.attribute)
            }
            RuleKind::Whitespace => {
                write!(f, "whitespace:{}:{}", self.resource_type, self.attribute)
            }
            RuleKind::Prefix(prefix) => write!(
                f,
                "prefix:{}:{}:{}",
                self.resource_type, self.attribute, prefix
            ),
        }
    }
}

/// Splits `type:key` out of a rule's remainder, rejecting empty fields.
fn split_type_and_key(raw: &str, rest: &str) -> Result<(String, String), RuleError> {
    let (resource_type, attribute) = rest
        .split_once(':')
        .ok_or_else(|| RuleError::malformed(raw, "expected kind:type:key"))?;

    if resource_type.is_empty() {
        return Err(RuleError::malformed(raw, "resource type is empty"));
    }
    if attribute.is_empty() {
        return Err(RuleError::malformed(raw, "attribute key is empty"));
    }

    Ok((resource_type.to_owned(), attribute.to_owned()))
}

/// Pulls the next non-empty field out of a rule's colon-separated remainder.
fn next_field<'a>(
    fields: &mut impl Iterator<Item = &'a str>,
    raw: &str,
    name: &str,
) -> Result<String, RuleError> {
    match fields.next() {
        Some(field) if !field.is_empty() => Ok(field.to_owned()),
        _ => Err(RuleError::malformed(raw, format!("{name} is missing"))),
    }
}

/// Removes every whitespace character from a string.
fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
