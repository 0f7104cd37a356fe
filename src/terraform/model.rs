//! Serde model for Terraform's JSON plan schema.
//!
//! Only the fields the engine consumes are modeled: each resource change's
//! address, type, declared actions, and before/after attribute images.
//! Everything else in `terraform show -json` output is ignored.

use serde::Deserialize;
use serde_json::Value;

/// A Terraform plan, as produced by `terraform show -json <planfile>`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanJson {
    /// The resource changes the plan describes.
    #[serde(default)]
    pub resource_changes: Vec<ResourceChange>,
}

/// One resource's planned change.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceChange {
    /// The resource's address within its module's state.
    pub address: String,

    /// The resource's type.
    #[serde(rename = "type")]
    pub resource_type: String,

    /// What Terraform plans to do to the resource.
    pub change: Change,
}

/// The action set and attribute images of a planned change.
#[derive(Debug, Clone, Deserialize)]
pub struct Change {
    /// The declared actions. A replacement carries both `create` and
    /// `delete`.
    pub actions: Vec<Action>,

    /// The resource's attributes before the change. Null when the resource
    /// does not exist yet.
    #[serde(default)]
    pub before: Value,

    /// The resource's attributes after the change, as far as they are known
    /// at plan time. Null when the resource is being destroyed.
    #[serde(default)]
    pub after: Value,
}

/// A single action Terraform plans to take on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// The resource is left untouched.
    NoOp,
    /// The resource is created.
    Create,
    /// The resource is read.
    Read,
    /// The resource is updated in place.
    Update,
    /// The resource is destroyed.
    Delete,
}

impl PlanJson {
    /// Parses a plan from the raw JSON emitted by `terraform show -json`.
    ///
    /// # Errors
    ///
    /// Returns an error describing the parse failure.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_with_replacement() {
        let raw = r#"{
            "format_version": "1.2",
            "terraform_version": "1.7.0",
            "resource_changes": [
                {
                    "address": "random_pet.this",
                    "mode": "managed",
                    "type": "random_pet",
                    "name": "this",
                    "change": {
                        "actions": ["delete", "create"],
                        "before": {"id": "big-horse", "length": 2},
                        "after": {"id": null, "length": 2}
                    }
                }
            ]
        }"#;

        let plan = PlanJson::from_json(raw).expect("parse failed");

        assert_eq!(plan.resource_changes.len(), 1);
        let change = &plan.resource_changes[0];
        assert_eq!(change.address, "random_pet.this");
        assert_eq!(change.resource_type, "random_pet");
        assert_eq!(change.change.actions, vec![Action::Delete, Action::Create]);
        assert!(change.change.before.is_object());
    }

    #[test]
    fn test_parse_noop_action() {
        let raw = r#"{
            "resource_changes": [
                {
                    "address": "random_pet.this",
                    "type": "random_pet",
                    "change": {"actions": ["no-op"], "before": {}, "after": {}}
                }
            ]
        }"#;

        let plan = PlanJson::from_json(raw).expect("parse failed");

        assert_eq!(plan.resource_changes[0].change.actions, vec![Action::NoOp]);
    }

    #[test]
    fn test_parse_empty_plan() {
        let plan = PlanJson::from_json("{}").expect("parse failed");

        assert!(plan.resource_changes.is_empty());
    }
}
