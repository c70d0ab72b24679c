use crate::ast::AttributeScope;
use crate::cli::CliError;
use crate::context::{EvalContext, ScratchMessageContext};
use crate::engine;
use crate::value::{JsonValue, Value};

/// Options for evaluating one expression against one synthetic message.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The expression to compile (bare, `${...}`, or `#[...]`)
    pub expression: String,
    /// JSON payload text, if any
    pub input: Option<String>,
    /// Context variable bindings, `name=value` (value parsed as JSON when
    /// possible, kept as a string otherwise)
    pub vars: Vec<String>,
    /// Transport header bindings, `name=value`
    pub headers: Vec<String>,
    /// Synapse-scope attribute bindings, `name=value`
    pub attrs: Vec<String>,
    /// Only compile; don't evaluate
    pub syntax_only: bool,
    /// Engine name (empty selects the default)
    pub engine: String,
}

/// Result of a check operation.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckResult {
    /// Expression compiled; evaluation was not requested
    SyntaxValid { content_aware: bool },
    /// Evaluation finished; `None` means the expression had no answer
    Success(Option<String>),
}

pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let engine = engine::from_name(&options.engine)?;
    let compiled = engine.compile(&options.expression)?;

    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid {
            content_aware: compiled.is_content_aware(),
        });
    }

    let mut msg = ScratchMessageContext::new();
    if let Some(input) = &options.input {
        let body: JsonValue = serde_json::from_str(input)?;
        msg = msg.with_body(body);
    }
    for binding in &options.vars {
        let (name, value) = split_binding(binding)?;
        msg = msg.with_variable(name, parse_binding_value(value));
    }
    for binding in &options.headers {
        let (name, value) = split_binding(binding)?;
        msg = msg.with_header(name, value);
    }
    for binding in &options.attrs {
        let (name, value) = split_binding(binding)?;
        msg = msg.with_attribute(AttributeScope::Synapse, name, parse_binding_value(value));
    }

    let ctx = EvalContext::new(&msg);
    let projected = compiled.evaluate_to_string(&ctx)?;
    Ok(CheckResult::Success(projected))
}

fn split_binding(binding: &str) -> Result<(&str, &str), CliError> {
    binding
        .split_once('=')
        .ok_or_else(|| CliError::Binding(binding.to_string()))
}

/// Bindings accept JSON values (`count=3`, `flag=true`, `tags=[1,2]`);
/// anything unparseable stays a plain string.
fn parse_binding_value(text: &str) -> Value {
    match serde_json::from_str::<JsonValue>(text) {
        Ok(node) => Value::from_json(&node),
        Err(_) => Value::String(text.to_string()),
    }
}
