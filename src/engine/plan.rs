//! Plan summarization.
//!
//! Terraform's JSON plan carries far more than the engine needs. This module
//! condenses it into the engine's own model: the resources Terraform plans
//! to create and the resources it plans to delete, with their attributes
//! already flattened.

use crate::engine::flatten::flatten;
use crate::engine::resource::Resource;
use crate::error::EngineError;
use crate::terraform::{Action, PlanJson};

/// A summarized plan: what one module's Terraform run intends to create and
/// delete.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Plan {
    /// The resources Terraform plans to create.
    pub planned_for_creation: Vec<Resource>,

    /// The resources Terraform plans to delete.
    pub planned_for_deletion: Vec<Resource>,
}

impl Plan {
    /// Returns true if the plan contains no creations and no deletions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.planned_for_creation.is_empty() && self.planned_for_deletion.is_empty()
    }
}

/// Condenses Terraform's JSON plan into a [`Plan`].
///
/// The `module_id` can be any string, but must be unique for each plan
/// handed to the engine. Typically it is the path to the module's directory.
///
/// Each resource change is classified by its declared actions: a create
/// flattens the "after" image, a delete flattens the "before" image, and a
/// replace carries both actions and contributes a resource to both lists.
/// Changes that neither create nor delete, such as in-place updates, are
/// skipped; such resources are not being replaced, so there is nothing to
/// match them against.
///
/// # Errors
///
/// Propagates flattening errors, wrapped with the offending resource's
/// address.
pub fn summarize_plan(module_id: &str, plan: &PlanJson) -> Result<Plan, EngineError> {
    let mut summary = Plan::default();

    for change in &plan.resource_changes {
        let is_created = change.change.actions.contains(&Action::Create);
        let is_destroyed = change.change.actions.contains(&Action::Delete);

        if !is_created && !is_destroyed {
            continue;
        }

        if is_created {
            let attributes = flatten(&change.change.after)
                .map_err(|e| EngineError::flattening(&change.address, e))?;

            summary.planned_for_creation.push(Resource {
                module_id: module_id.to_owned(),
                resource_type: change.resource_type.clone(),
                address: change.address.clone(),
                attributes,
            });
        }

        if is_destroyed {
            let attributes = flatten(&change.change.before)
                .map_err(|e| EngineError::flattening(&change.address, e))?;

            summary.planned_for_deletion.push(Resource {
                module_id: module_id.to_owned(),
                resource_type: change.resource_type.clone(),
                address: change.address.clone(),
                attributes,
            });
        }
    }

    Ok(summary)
}
