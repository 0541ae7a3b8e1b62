// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the runtime state

use thiserror::Error;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, NodeError>;

/// Broken contracts between the runtime state and the host that embeds it.
///
/// These only arise from bugs in the embedding's bootstrap or loader code,
/// never from script input. The plain accessors on
/// [`RuntimeState`](crate::RuntimeState) panic with these messages; the
/// `try_*` accessors hand them back instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A module name was registered twice
    #[error("module '{0}' is already registered")]
    DuplicateModule(String),

    /// A module record's `exports` property is not an object
    #[error("module '{module}' has a non-object `exports` property (found {found})")]
    NonObjectExports {
        /// Module name
        module: String,
        /// `typeof` of the offending value
        found: &'static str,
    },

    /// `internalBinding` is not present on the global object
    #[error("global `internalBinding` namespace is missing; bootstrap must run first")]
    MissingBindingNamespace,

    /// `internalBinding` is present but is not an object
    #[error("global `internalBinding` is not an object (found {0})")]
    MalformedBindingNamespace(&'static str),
}

/// Errors that can occur while loading modules or installing bindings
#[derive(Debug, Error)]
pub enum NodeError {
    /// Script engine error
    #[error("{0}")]
    Engine(#[from] tether_engine::Error),

    /// Contract violation surfaced through a `try_*` call
    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),

    /// Module not found
    #[error("Cannot find module '{0}'")]
    ModuleNotFound(String),

    /// Module body failed
    #[error("Error evaluating module '{module}': {reason}")]
    ModuleEvaluation {
        /// Module id
        module: String,
        /// Reason for failure
        reason: String,
    },

    /// Specifier could not be turned into a module id
    #[error("Invalid module specifier '{0}'")]
    InvalidSpecifier(String),

    /// No initializer registered for an internal binding
    #[error("No such binding: {0}")]
    NoSuchBinding(String),

    /// Bootstrap could not prepare the global object
    #[error("Bootstrap error: {0}")]
    Bootstrap(String),

    /// No tokio runtime to hand out as the event loop
    #[error("No event loop: {0}")]
    NoEventLoop(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system error
    #[error("File system error: {0}")]
    Fs(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Generic(String),
}

impl NodeError {
    /// Create a module not found error
    pub fn module_not_found(module: impl Into<String>) -> Self {
        Self::ModuleNotFound(module.into())
    }

    /// Create a module evaluation error
    pub fn module_evaluation(module: impl Into<String>, reason: impl ToString) -> Self {
        Self::ModuleEvaluation {
            module: module.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a missing binding error
    pub fn no_such_binding(name: impl Into<String>) -> Self {
        Self::NoSuchBinding(name.into())
    }

    /// Returns true if this error wraps a contract violation.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::Invariant(_))
    }
}
