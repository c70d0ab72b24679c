//! CLI support for weir-lang
//!
//! Provides programmatic access to the `weir` CLI functionality for
//! embedding in other tools.

mod check;

pub use check::{CheckOptions, CheckResult, execute_check};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Expression failed to compile
    #[error("{0}")]
    Compile(#[from] crate::CompileError),
    /// Hard evaluation failure
    #[error("evaluation error: {0}")]
    Eval(#[from] crate::EvalError),
    /// Unknown engine name
    #[error("{0}")]
    Engine(#[from] crate::EngineError),
    /// Payload is not valid JSON
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// A --var/--header/--attr binding was not in key=value form
    #[error("invalid binding '{0}': expected key=value")]
    Binding(String),
}
