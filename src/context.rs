//! The message-context capability and the per-evaluation context bundle.
//!
//! The expression core does not implement transport, persistence, or
//! deployment; it consumes a narrow capability interface to the in-flight
//! message. The mediation engine supplies the real implementation;
//! [`ScratchMessageContext`] is an in-memory stand-in used by the CLI and
//! the test suites.

use std::collections::HashMap;

use crate::ast::AttributeScope;
use crate::error::EvalError;
use crate::value::{JsonValue, Value};

/// Read/write access to the in-flight message, as consumed by the
/// evaluator.
///
/// Lookups that miss return `None`; only a message whose body cannot be
/// materialized at all reports a hard error. `evaluate_xpath` hooks in the
/// engine's XML path collaborator for the `xpath("...")` escape form; the
/// default implementation has no XML document to offer and answers `None`.
pub trait MessageContext {
    fn get_variable(&self, name: &str) -> Option<Value>;

    fn set_variable(&mut self, name: &str, value: Value);

    fn get_header(&self, name: &str) -> Option<String>;

    /// The message body as a structured JSON tree.
    ///
    /// Expressions that are not content-aware never call this; the engine
    /// relies on that to skip materializing the body.
    fn body(&self) -> Result<JsonValue, EvalError>;

    fn get_attribute(&self, scope: AttributeScope, name: &str) -> Option<Value>;

    /// Evaluate an embedded XML path query, optionally against a named
    /// variable instead of the live body.
    fn evaluate_xpath(
        &self,
        query: &str,
        variable: Option<&str>,
        namespaces: &HashMap<String, String>,
    ) -> Option<String> {
        let _ = (query, variable, namespaces);
        None
    }
}

/// The short-lived, per-evaluation bundle handed to the evaluator: a
/// message-context handle and a namespace-prefix mapping for embedded XML
/// path queries. One context per evaluation call; never shared across
/// threads or reused.
pub struct EvalContext<'a> {
    pub msg: &'a dyn MessageContext,
    pub namespaces: HashMap<String, String>,
}

impl<'a> EvalContext<'a> {
    pub fn new(msg: &'a dyn MessageContext) -> Self {
        EvalContext {
            msg,
            namespaces: HashMap::new(),
        }
    }

    pub fn with_namespace(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.namespaces.insert(prefix.into(), uri.into());
        self
    }
}

/// In-memory message context for tests and the CLI.
#[derive(Debug, Clone, Default)]
pub struct ScratchMessageContext {
    body: Option<JsonValue>,
    variables: HashMap<String, Value>,
    headers: HashMap<String, String>,
    axis2: HashMap<String, Value>,
    synapse: HashMap<String, Value>,
}

impl ScratchMessageContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_body(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_attribute(
        mut self,
        scope: AttributeScope,
        name: impl Into<String>,
        value: Value,
    ) -> Self {
        match scope {
            AttributeScope::Axis2 => self.axis2.insert(name.into(), value),
            AttributeScope::Synapse => self.synapse.insert(name.into(), value),
        };
        self
    }
}

impl MessageContext for ScratchMessageContext {
    fn get_variable(&self, name: &str) -> Option<Value> {
        self.variables.get(name).cloned()
    }

    fn set_variable(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    fn get_header(&self, name: &str) -> Option<String> {
        self.headers.get(name).cloned()
    }

    fn body(&self) -> Result<JsonValue, EvalError> {
        self.body
            .clone()
            .ok_or_else(|| EvalError::BodyUnavailable("no payload attached".to_string()))
    }

    fn get_attribute(&self, scope: AttributeScope, name: &str) -> Option<Value> {
        match scope {
            AttributeScope::Axis2 => self.axis2.get(name).cloned(),
            AttributeScope::Synapse => self.synapse.get(name).cloned(),
        }
    }
}
