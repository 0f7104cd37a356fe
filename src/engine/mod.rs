//! The reconciliation engine.
//!
//! Everything in this module is purely computational: no IO, no logging, no
//! shared mutable state. Given the same plans and rules, the engine always
//! produces byte-identical, identically ordered output, which is what makes
//! its determinism guarantees checkable.
//!
//! The pipeline runs summarized plans through three stages:
//!
//! 1. [`compare_plans`] compares every same-type pair of resources planned
//!    for creation and deletion, across all modules.
//! 2. [`determine_moves`] keeps only the pairs that match each other and
//!    only each other.
//! 3. The resulting [`Move`]s are handed to the serializer in
//!    [`crate::terraform`].

pub mod compare;
pub mod flatten;
pub mod moves;
pub mod plan;
pub mod resource;
pub mod rules;

pub use compare::{Comparison, Differ, RuleDiffer, compare_plans};
pub use flatten::{AttributeValue, Attributes, flatten};
pub use moves::{Move, determine_moves};
pub use plan::{Plan, summarize_plan};
pub use resource::Resource;
pub use rules::{Rule, RuleKind};
