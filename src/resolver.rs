//! Root-identifier and structural-index resolution.
//!
//! A path starts at one of the roots (message body, variables, headers,
//! attribute namespaces) and walks down with JSON-path-like semantics:
//! object member access, array indexing, and filter predicates. Misses are
//! not errors: a missing variable is `Unknown`, a missing header,
//! attribute or JSON member is `Null`, and mediation flows keep running on
//! partial messages.

use crate::ast::{Expr, Root};
use crate::context::EvalContext;
use crate::error::EvalError;
use crate::evaluator;
use crate::output;
use crate::value::{JsonValue, Value};

pub fn resolve_root(root: &Root, ctx: &EvalContext) -> Result<Value, EvalError> {
    match root {
        Root::Payload => Ok(Value::from_json(&ctx.msg.body()?)),
        // The capability interface is per-name lookup only; a bare
        // `vars`/`headers`/`attributes.*` has no enumerable value.
        Root::Variables | Root::Headers | Root::Attributes(_) => Ok(Value::Unknown),
    }
}

/// Resolve `object[key]` / `object.key`, routing the named roots through
/// the message-context capability and everything else through structural
/// indexing.
pub fn access(
    object: &Expr,
    key: &Expr,
    ctx: &EvalContext,
    current: Option<&JsonValue>,
) -> Result<Value, EvalError> {
    if let Expr::Root(root) = object {
        match root {
            Root::Variables => {
                let Some(name) = key_name(key, ctx, current)? else {
                    return Ok(Value::Unknown);
                };
                return Ok(ctx.msg.get_variable(&name).unwrap_or(Value::Unknown));
            }
            Root::Headers => {
                let Some(name) = key_name(key, ctx, current)? else {
                    return Ok(Value::Unknown);
                };
                return Ok(ctx
                    .msg
                    .get_header(&name)
                    .map(Value::String)
                    .unwrap_or(Value::Null));
            }
            Root::Attributes(scope) => {
                let Some(name) = key_name(key, ctx, current)? else {
                    return Ok(Value::Unknown);
                };
                return Ok(ctx.msg.get_attribute(*scope, &name).unwrap_or(Value::Null));
            }
            Root::Payload => {}
        }
    }

    let object = evaluator::eval_in(object, ctx, current)?;
    let key = evaluator::eval_in(key, ctx, current)?;
    Ok(index(&object, &key))
}

/// Structural filter: keep the elements of a sequence whose predicate
/// resolves to `true`. A predicate that resolves to anything other than
/// boolean true excludes the candidate. Filtering a non-sequence is
/// `Unknown`.
pub fn filter(
    object: &Expr,
    predicate: &Expr,
    ctx: &EvalContext,
    current: Option<&JsonValue>,
) -> Result<Value, EvalError> {
    let object = evaluator::eval_in(object, ctx, current)?;
    let Value::Array(items) = object else {
        return Ok(Value::Unknown);
    };

    let mut kept = Vec::new();
    for item in &items {
        let verdict = evaluator::eval_in(predicate, ctx, Some(item))?;
        if verdict == Value::Boolean(true) {
            kept.push(item.clone());
        }
    }
    Ok(Value::Array(kept))
}

/// Index one resolved value with another.
pub fn index(object: &Value, key: &Value) -> Value {
    match (object, key) {
        (Value::Unknown, _) | (_, Value::Unknown) => Value::Unknown,
        (Value::Object(map), Value::String(k)) => {
            map.get(k).map(Value::from_json).unwrap_or(Value::Null)
        }
        // Numeric keys on objects fall back to their string form
        (Value::Object(map), Value::Integer(n)) => map
            .get(&n.to_string())
            .map(Value::from_json)
            .unwrap_or(Value::Null),
        (Value::Object(map), Value::Float(x)) => map
            .get(&x.to_string())
            .map(Value::from_json)
            .unwrap_or(Value::Null),
        (Value::Array(items), Value::Integer(n)) => {
            let index = if *n < 0 {
                // Negative index counts from the end
                let back = n.unsigned_abs() as usize;
                if back > items.len() {
                    return Value::Null;
                }
                items.len() - back
            } else {
                *n as usize
            };
            items.get(index).map(Value::from_json).unwrap_or(Value::Null)
        }
        _ => Value::Null,
    }
}

fn key_name(
    key: &Expr,
    ctx: &EvalContext,
    current: Option<&JsonValue>,
) -> Result<Option<String>, EvalError> {
    let value = evaluator::eval_in(key, ctx, current)?;
    Ok(output::to_display_string(&value))
}
