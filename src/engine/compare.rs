//! Resource comparison.
//!
//! This module holds the differ, which classifies the attribute differences
//! between one resource planned for creation and one planned for deletion,
//! and the matcher, which runs the differ over every same-type pair across
//! all modules' plans.

use std::collections::BTreeMap;

use crate::engine::plan::Plan;
use crate::engine::resource::Resource;
use crate::engine::rules::Rule;

#[cfg(test)]
use mockall::automock;

/// The outcome of comparing a resource planned for creation with a resource
/// planned for deletion.
///
/// Every attribute key set on the create side lands in exactly one of the
/// three lists. Keys present only on the delete side are not surfaced: their
/// values are only known once the resource has been created, so comparing
/// them is meaningless.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// The resource Terraform plans to create.
    pub planned_for_creation: Resource,

    /// The resource Terraform plans to delete.
    pub planned_for_deletion: Resource,

    /// Keys of attributes with the same value in both resources.
    pub matching: Vec<String>,

    /// Keys of attributes with different values and no rule allowing the
    /// difference.
    pub mismatching: Vec<String>,

    /// Keys of attributes whose differences a rule says to ignore.
    pub ignored: Vec<String>,
}

impl Comparison {
    /// Returns true if the two resources match: every difference between
    /// them is covered by a rule. Ignored differences do not block a match.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.mismatching.is_empty()
    }
}

/// Compares a resource Terraform plans to create with a resource Terraform
/// plans to delete.
///
/// The matcher only depends on this single method, so tests can substitute
/// a fake differ and exercise the matcher without real attribute data.
#[cfg_attr(test, automock)]
pub trait Differ {
    /// Classifies the attribute differences between the two resources.
    ///
    /// Both resources must be of the same type; callers are expected to
    /// group resources by type before diffing.
    fn diff(&self, create: &Resource, delete: &Resource) -> Comparison;
}

/// The standard differ: attributes match on equality, and differences may be
/// ignored by user-supplied rules.
#[derive(Debug, Default)]
pub struct RuleDiffer {
    rules: Vec<Rule>,
}

impl RuleDiffer {
    /// Creates a differ that applies the given rules.
    #[must_use]
    pub const fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }
}

impl Differ for RuleDiffer {
    /// Classifies every non-null attribute on the create side as matching,
    /// mismatching, or ignored. Output lists are sorted by key.
    ///
    /// # Panics
    ///
    /// Panics if the two resources are not of the same type. That is a
    /// programming error in the caller, not a recoverable condition.
    fn diff(&self, create: &Resource, delete: &Resource) -> Comparison {
        assert_eq!(
            create.resource_type, delete.resource_type,
            "resources are of different types: {} and {}",
            create.resource_type, delete.resource_type,
        );

        let mut matching = Vec::new();
        let mut mismatching = Vec::new();
        let mut ignored = Vec::new();

        // Attributes iterate in key order, so the lists come out sorted.
        for (key, create_value) in &create.attributes {
            if create_value.is_null() {
                continue;
            }

            let delete_value = delete.attributes.get(key);

            if delete_value == Some(create_value) {
                matching.push(key.clone());
                continue;
            }

            let rule_says_to_ignore = self.rules.iter().any(|rule| {
                rule.applies_to(&create.resource_type, key)
                    && rule.equates(create_value, delete_value)
            });

            if rule_says_to_ignore {
                ignored.push(key.clone());
            } else {
                mismatching.push(key.clone());
            }
        }

        Comparison {
            planned_for_creation: create.clone(),
            planned_for_deletion: delete.clone(),
            matching,
            mismatching,
            ignored,
        }
    }
}

/// Compares each resource planned for creation to each resource planned for
/// deletion of the same type, across all plans.
///
/// Resources from every module take part, which is what allows the engine to
/// discover cross-module moves. For `C` creations and `D` deletions of a
/// shared type this produces `C x D` comparisons; there is no pruning,
/// because finding every true match takes priority over avoiding the
/// quadratic cost and realistic per-type cardinalities are small.
///
/// The result is sorted by the compared resources' modules and addresses so
/// that identical inputs always produce identical output.
#[must_use]
pub fn compare_plans(plans: &[Plan], differ: &impl Differ) -> Vec<Comparison> {
    // First, group resources by type and the action Terraform plans to take.
    let mut create_by_type: BTreeMap<&str, Vec<&Resource>> = BTreeMap::new();
    let mut delete_by_type: BTreeMap<&str, Vec<&Resource>> = BTreeMap::new();
    for plan in plans {
        for resource in &plan.planned_for_creation {
            create_by_type
                .entry(&resource.resource_type)
                .or_default()
                .push(resource);
        }
        for resource in &plan.planned_for_deletion {
            delete_by_type
                .entry(&resource.resource_type)
                .or_default()
                .push(resource);
        }
    }

    // Then, compare each resource planned for creation to all resources
    // planned for deletion of the same type.
    let mut comparisons = Vec::new();
    for (resource_type, creations) in &create_by_type {
        let Some(deletions) = delete_by_type.get(resource_type) else {
            continue;
        };
        for create in creations {
            for delete in deletions {
                comparisons.push(differ.diff(create, delete));
            }
        }
    }

    comparisons.sort_by(|a, b| {
        (
            &a.planned_for_creation.module_id,
            &a.planned_for_creation.address,
            &a.planned_for_deletion.module_id,
            &a.planned_for_deletion.address,
        )
            .cmp(&(
                &b.planned_for_creation.module_id,
                &b.planned_for_creation.address,
                &b.planned_for_deletion.module_id,
                &b.planned_for_deletion.address,
            ))
    });

    comparisons
}
