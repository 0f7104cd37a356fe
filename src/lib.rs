// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// ============================================================================
// Crate Documentation
// ============================================================================

//! # tfremap
//!
//! Turns Terraform destroy-and-recreate pairs into moves.
//!
//! ## Overview
//!
//! When Terraform code is refactored, resources often change address without
//! changing identity: a rename, a move into a child module, a move into
//! another root module entirely. Terraform sees an old address to destroy and
//! a new address to create. tfremap compares what each plan wants to destroy
//! with what it wants to create and, when a pair is unambiguously the same
//! object, emits the move that preserves it:
//!
//! 1. **Plan**: obtain each module's plan from the Terraform CLI
//! 2. **Match**: compare the attributes of every create/delete pair of the
//!    same type, across all modules
//! 3. **Resolve**: keep only pairs that match each other and only each other
//! 4. **Write**: persist the moves as `moved` blocks or `state mv` commands
//!
//! tfremap never touches infrastructure or state itself; it only decides what
//! should move where and emits a plan for Terraform to execute.
//!
//! ## Modules
//!
//! - [`engine`]: the reconciliation engine (pure, deterministic)
//! - [`terraform`]: plan schema, CLI invocation, move serialization
//! - [`cli`]: command-line interface and human-readable summaries
//! - [`error`]: the error hierarchy
//!
//! ## Example
//!
//! ```no_run
//! use tfremap::engine::{self, RuleDiffer};
//!
//! let plans: Vec<engine::Plan> = vec![/* one per module */];
//! let differ = RuleDiffer::new(vec![]);
//!
//! let comparisons = engine::compare_plans(&plans, &differ);
//! let moves = engine::determine_moves(&comparisons);
//!
//! for m in &moves {
//!     println!("{} -> {}", m.source_address, m.destination_address);
//! }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod engine;
pub mod error;
pub mod terraform;

// ============================================================================
// Re-exports
// ============================================================================

pub use cli::{Cli, OutputFormat, Summarizer};
pub use engine::{
    Comparison, Differ, Move, Plan, Resource, Rule, RuleDiffer, compare_plans, determine_moves,
    summarize_plan,
};
pub use error::{Result, TfremapError};
pub use terraform::{PlanJson, PlanProvider, PlanSettings, TerraformRunner};
