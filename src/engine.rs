//! Engine selection.
//!
//! The host engine historically swapped the expression implementation by
//! loading a configured class name reflectively. Here the set is closed
//! and resolved once at startup: a configured name maps to one of the
//! known engine implementations behind a common trait, and evaluation
//! never pays a per-call lookup.

use thiserror::Error;

use crate::error::CompileError;
use crate::expression::CompiledExpression;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown expression engine '{0}'")]
pub struct EngineError(pub String);

/// A compiler for one expression dialect.
pub trait ExpressionEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn compile(&self, text: &str) -> Result<CompiledExpression, CompileError>;
}

/// The built-in dialect described by this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEngine;

impl ExpressionEngine for DefaultEngine {
    fn name(&self) -> &'static str {
        "default"
    }

    fn compile(&self, text: &str) -> Result<CompiledExpression, CompileError> {
        CompiledExpression::compile(text)
    }
}

/// Resolve a configured engine name. An empty name selects the default.
pub fn from_name(name: &str) -> Result<Box<dyn ExpressionEngine>, EngineError> {
    match name {
        "" | "default" => Ok(Box::new(DefaultEngine)),
        other => Err(EngineError(other.to_string())),
    }
}

#[test]
fn resolves_known_names_only() {
    assert_eq!(from_name("default").unwrap().name(), "default");
    assert_eq!(from_name("").unwrap().name(), "default");
    assert!(from_name("reflective").is_err());
}
