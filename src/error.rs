//! Error types for tfremap.
//!
//! This module provides the error hierarchy for all operations in the tool:
//! rule parsing, plan summarization, the reconciliation engine, Terraform
//! invocation, and move serialization.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for tfremap.
#[derive(Debug, Error)]
pub enum TfremapError {
    /// Rule parsing errors.
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    /// Reconciliation engine errors.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Terraform invocation errors.
    #[error("Terraform error: {0}")]
    Terraform(#[from] TerraformError),

    /// Move serialization errors.
    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    /// IO errors.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised while parsing user-supplied ignore rules.
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule does not follow the `kind:type:key[:parameter]` syntax.
    #[error("rule {raw:?} is malformed: {reason}")]
    Malformed {
        /// The raw rule text as passed on the command line.
        raw: String,
        /// Description of what is missing or wrong.
        reason: String,
    },

    /// The rule's kind is not one the engine knows about.
    #[error("rule {raw:?} has unknown kind {kind:?}")]
    UnknownKind {
        /// The raw rule text as passed on the command line.
        raw: String,
        /// The unrecognized kind.
        kind: String,
    },
}

/// Errors raised by the reconciliation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A resource's attribute image is not an object and cannot be
    /// represented as a flat attribute set.
    #[error("cannot flatten {kind} value into attributes")]
    UnflattenableImage {
        /// The JSON kind of the offending value.
        kind: &'static str,
    },

    /// An attribute's value cannot be represented as a scalar.
    #[error("unsupported value for attribute {path:?}")]
    UnsupportedAttribute {
        /// Dotted path of the offending attribute.
        path: String,
    },

    /// Flattening failed for a specific resource.
    #[error("failed to flatten attributes of {address}: {source}")]
    AttributeFlattening {
        /// Address of the resource whose attributes could not be flattened.
        address: String,
        /// The underlying flattening error.
        #[source]
        source: Box<EngineError>,
    },
}

/// Errors raised while obtaining plans from Terraform.
#[derive(Debug, Error)]
pub enum TerraformError {
    /// The Terraform binary could not be found.
    #[error("executable {bin:?} not found in PATH")]
    ExecutableNotFound {
        /// The binary name or path that was looked up.
        bin: String,
    },

    /// The module directory does not exist or is not a directory.
    #[error("target directory {path:?} not found")]
    InvalidWorkdir {
        /// The missing directory.
        path: PathBuf,
    },

    /// A Terraform command exited with a failure status.
    #[error("{command:?} failed in {workdir:?}: {stderr}")]
    CommandFailed {
        /// The command that was run.
        command: String,
        /// The directory it ran in.
        workdir: String,
        /// Terraform's standard error output.
        stderr: String,
    },

    /// Terraform's JSON plan output could not be parsed.
    #[error("failed to parse Terraform plan JSON: {message}")]
    InvalidJson {
        /// Description of the parse failure.
        message: String,
    },

    /// One or more modules failed to produce a plan.
    #[error("failed to obtain a plan for one or more modules:\n{}", .errors.join("\n"))]
    PlanCollection {
        /// One message per failed module, each naming the module.
        errors: Vec<String>,
    },
}

/// Errors raised while serializing moves.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Moved blocks cannot express a move between two state files.
    #[error(
        "cannot write a moved block for a move from {source_module:?} to \
         {destination_module:?}: moved blocks only support moves within a single module"
    )]
    CrossModuleBlocks {
        /// Module the resource is moving from.
        source_module: String,
        /// Module the resource is moving to.
        destination_module: String,
    },

    /// Blocks output was requested for an invocation spanning several modules.
    #[error("blocks output format is not supported for multiple modules ({count} given)")]
    MultipleModules {
        /// Number of module arguments.
        count: usize,
    },
}

/// Result type alias for tfremap operations.
pub type Result<T> = std::result::Result<T, TfremapError>;

impl TfremapError {
    /// Creates a new internal error with the given message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl RuleError {
    /// Creates a malformed-rule error for the given raw rule text.
    #[must_use]
    pub fn malformed(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}

impl EngineError {
    /// Wraps a flattening error with the address of the offending resource.
    #[must_use]
    pub fn flattening(address: impl Into<String>, source: Self) -> Self {
        Self::AttributeFlattening {
            address: address.into(),
            source: Box::new(source),
        }
    }
}
