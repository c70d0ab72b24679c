//! Compilation surface: source text in, reusable compiled expression out.
//!
//! Compilation runs once, on whichever thread first sees a given
//! expression string; the result is immutable and safe to share read-only
//! across threads for the lifetime of the owning artifact configuration.

use crate::ast::{Expr, Root};
use crate::context::EvalContext;
use crate::error::{CompileError, EvalError};
use crate::evaluator;
use crate::output;
use crate::parser::Parser;
use crate::value::Value;

/// A compiled, immutable expression plus its static analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    source: String,
    ast: Expr,
    content_aware: bool,
}

impl CompiledExpression {
    /// Compile an expression string.
    ///
    /// Accepts the bare grammar or either historical wrapper syntax,
    /// `${...}` and `#[...]`; only the inner text is compiled. Fails as a
    /// whole if the parser recorded any syntax error, reporting all of
    /// them together.
    pub fn compile(text: &str) -> Result<CompiledExpression, CompileError> {
        let inner = strip_markers(text);
        let (ast, errors) = Parser::new(inner).parse();

        if !errors.is_empty() {
            log::debug!(
                "expression '{}' failed to compile: {} error(s)",
                inner,
                errors.len()
            );
            return Err(CompileError::new(errors));
        }

        let content_aware = references_body(&ast);
        Ok(CompiledExpression {
            source: inner.to_string(),
            ast,
            content_aware,
        })
    }

    /// The inner source text this expression was compiled from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether evaluation needs the message body materialized.
    ///
    /// Computed once at compile time: true if the expression references
    /// `payload`/`$` (or a descendant), or embeds an XML path query that
    /// itself reads the body. Variable/header/attribute-only expressions
    /// report false, and the engine skips body materialization for them.
    pub fn is_content_aware(&self) -> bool {
        self.content_aware
    }

    /// Evaluate to a tagged result value.
    pub fn evaluate(&self, ctx: &EvalContext) -> Result<Value, EvalError> {
        evaluator::evaluate(&self.ast, ctx)
    }

    /// Evaluate and project to a string; `None` when the result has no
    /// well-defined answer.
    pub fn evaluate_to_string(&self, ctx: &EvalContext) -> Result<Option<String>, EvalError> {
        let value = self.evaluate(ctx)?;
        Ok(output::to_display_string(&value))
    }
}

/// Peel one `${...}` or `#[...]` wrapper, if present.
fn strip_markers(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(inner) = trimmed.strip_prefix("${").and_then(|t| t.strip_suffix('}')) {
        return inner;
    }
    if let Some(inner) = trimmed.strip_prefix("#[").and_then(|t| t.strip_suffix(']')) {
        return inner;
    }
    trimmed
}

/// One walk over the finished AST decides content-awareness.
fn references_body(expr: &Expr) -> bool {
    match expr {
        Expr::Root(Root::Payload) => true,
        Expr::Root(_) => false,

        // A query against a variable never touches the live body
        Expr::Xpath { variable: Some(_), .. } => false,
        Expr::Xpath { query, variable: None } => xpath_references_body(query),

        Expr::Integer(_)
        | Expr::Float(_)
        | Expr::String(_)
        | Expr::Boolean(_)
        | Expr::Null
        | Expr::Current
        | Expr::Key(_) => false,

        Expr::Array(elements) => elements.iter().any(references_body),
        Expr::Unary { operand, .. } => references_body(operand),
        Expr::Binary { left, right, .. } => references_body(left) || references_body(right),
        Expr::Ternary {
            condition,
            then_branch,
            else_branch,
        } => {
            references_body(condition)
                || references_body(then_branch)
                || references_body(else_branch)
        }
        Expr::Call { args, .. } => args.iter().any(references_body),
        Expr::Access { object, key } => references_body(object) || references_body(key),
        Expr::Filter { object, predicate } => {
            references_body(object) || references_body(predicate)
        }
    }
}

/// Static analysis of an embedded XML path query: `$ctx:name`-style
/// variable references leave the body alone, `$body...` and plain
/// location paths (`//student`, `/order/id`, `student`) read it.
fn xpath_references_body(query: &str) -> bool {
    let query = query.trim_start();
    match query.strip_prefix('$') {
        Some(rest) => rest.starts_with("body"),
        None => true,
    }
}
