//! Recursive AST evaluation.
//!
//! This module owns all coercion, comparison and arithmetic semantics.
//! Evaluation is total over operand kinds: a combination with no
//! well-defined answer resolves to [`Value::Unknown`] and keeps going.
//! `Result` is reserved for hard failures supplied by the surrounding
//! engine, in practice a message context whose body cannot be read.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::context::EvalContext;
use crate::error::EvalError;
use crate::functions;
use crate::resolver;
use crate::value::{JsonValue, Value};

/// Evaluate an expression node against an evaluation context.
pub fn evaluate(expr: &Expr, ctx: &EvalContext) -> Result<Value, EvalError> {
    eval_in(expr, ctx, None)
}

/// Evaluation with a filter candidate in scope (`@` refers to `current`).
pub(crate) fn eval_in(
    expr: &Expr,
    ctx: &EvalContext,
    current: Option<&JsonValue>,
) -> Result<Value, EvalError> {
    match expr {
        Expr::Integer(n) => Ok(Value::Integer(*n)),
        Expr::Float(x) => Ok(Value::Float(*x)),
        Expr::String(s) => Ok(Value::String(s.clone())),
        Expr::Boolean(b) => Ok(Value::Boolean(*b)),
        Expr::Null => Ok(Value::Null),

        Expr::Array(elements) => {
            let mut items = Vec::with_capacity(elements.len());
            for element in elements {
                let value = eval_in(element, ctx, current)?;
                items.push(value.into_json().unwrap_or(JsonValue::Null));
            }
            Ok(Value::Array(items))
        }

        Expr::Root(root) => resolver::resolve_root(root, ctx),
        Expr::Current => Ok(current.map(Value::from_json).unwrap_or(Value::Unknown)),
        Expr::Key(name) => Ok(Value::String(name.clone())),

        Expr::Access { object, key } => resolver::access(object, key, ctx, current),
        Expr::Filter { object, predicate } => resolver::filter(object, predicate, ctx, current),

        Expr::Unary { op, operand } => {
            let operand = eval_in(operand, ctx, current)?;
            Ok(apply_unary(*op, &operand))
        }

        Expr::Binary { op, left, right } => {
            let left = eval_in(left, ctx, current)?;
            let right = eval_in(right, ctx, current)?;
            Ok(apply_binary(*op, &left, &right))
        }

        Expr::Ternary {
            condition,
            then_branch,
            else_branch,
        } => {
            let condition = eval_in(condition, ctx, current)?;
            // A non-boolean condition poisons the whole conditional;
            // neither branch runs.
            match condition.as_boolean() {
                Some(true) => eval_in(then_branch, ctx, current),
                Some(false) => eval_in(else_branch, ctx, current),
                None => Ok(Value::Unknown),
            }
        }

        Expr::Call { function, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_in(arg, ctx, current)?);
            }
            Ok(functions::apply(*function, &values))
        }

        Expr::Xpath { query, variable } => Ok(ctx
            .msg
            .evaluate_xpath(query, variable.as_deref(), &ctx.namespaces)
            .map(Value::String)
            .unwrap_or(Value::Unknown)),
    }
}

fn apply_unary(op: UnaryOp, operand: &Value) -> Value {
    match op {
        UnaryOp::Minus => match operand {
            Value::Integer(n) => n
                .checked_neg()
                .map(Value::Integer)
                .unwrap_or(Value::Float(-(*n as f64))),
            Value::Float(x) => Value::Float(-x),
            _ => Value::Unknown,
        },
        UnaryOp::Not => match operand {
            Value::Boolean(b) => Value::Boolean(!b),
            _ => Value::Unknown,
        },
    }
}

/// The two numeric operand shapes: integral stays integral, any float
/// drags both sides to floats.
enum Numeric {
    Ints(i64, i64),
    Floats(f64, f64),
}

fn numeric_operands(left: &Value, right: &Value) -> Option<Numeric> {
    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => Some(Numeric::Ints(*a, *b)),
        _ if left.is_numeric() && right.is_numeric() => {
            Some(Numeric::Floats(left.as_f64()?, right.as_f64()?))
        }
        _ => None,
    }
}

pub(crate) fn apply_binary(op: BinOp, left: &Value, right: &Value) -> Value {
    // Unknown propagates through every operator.
    if left.is_unknown() || right.is_unknown() {
        return Value::Unknown;
    }

    match op {
        BinOp::Add => match (left, right) {
            (Value::String(a), Value::String(b)) => Value::String(format!("{}{}", a, b)),
            _ => match numeric_operands(left, right) {
                // Widen instead of wrapping on overflow
                Some(Numeric::Ints(a, b)) => a
                    .checked_add(b)
                    .map(Value::Integer)
                    .unwrap_or(Value::Float(a as f64 + b as f64)),
                Some(Numeric::Floats(a, b)) => Value::Float(a + b),
                None => Value::Unknown,
            },
        },

        BinOp::Subtract => match numeric_operands(left, right) {
            Some(Numeric::Ints(a, b)) => a
                .checked_sub(b)
                .map(Value::Integer)
                .unwrap_or(Value::Float(a as f64 - b as f64)),
            Some(Numeric::Floats(a, b)) => Value::Float(a - b),
            None => Value::Unknown,
        },

        BinOp::Multiply => match numeric_operands(left, right) {
            Some(Numeric::Ints(a, b)) => a
                .checked_mul(b)
                .map(Value::Integer)
                .unwrap_or(Value::Float(a as f64 * b as f64)),
            Some(Numeric::Floats(a, b)) => Value::Float(a * b),
            None => Value::Unknown,
        },

        BinOp::Divide => match numeric_operands(left, right) {
            // Division by zero has no answer, not an infinity
            Some(Numeric::Ints(_, 0)) => Value::Unknown,
            Some(Numeric::Ints(a, b)) => {
                if a % b == 0 {
                    Value::Integer(a / b)
                } else {
                    Value::Float(a as f64 / b as f64)
                }
            }
            Some(Numeric::Floats(_, b)) if b == 0.0 => Value::Unknown,
            Some(Numeric::Floats(a, b)) => Value::Float(a / b),
            None => Value::Unknown,
        },

        BinOp::Modulo => match numeric_operands(left, right) {
            Some(Numeric::Ints(_, 0)) => Value::Unknown,
            Some(Numeric::Ints(a, b)) => Value::Integer(a % b),
            Some(Numeric::Floats(_, b)) if b == 0.0 => Value::Unknown,
            Some(Numeric::Floats(a, b)) => Value::Float(a % b),
            None => Value::Unknown,
        },

        BinOp::Equal => equality(left, right),
        BinOp::NotEqual => match equality(left, right) {
            Value::Boolean(b) => Value::Boolean(!b),
            other => other,
        },

        BinOp::LessThan => ordering(left, right, |a, b| a < b),
        BinOp::GreaterThan => ordering(left, right, |a, b| a > b),
        BinOp::LessEqual => ordering(left, right, |a, b| a <= b),
        BinOp::GreaterEqual => ordering(left, right, |a, b| a >= b),

        BinOp::And => match (left.as_boolean(), right.as_boolean()) {
            (Some(a), Some(b)) => Value::Boolean(a && b),
            _ => Value::Unknown,
        },
        BinOp::Or => match (left.as_boolean(), right.as_boolean()) {
            (Some(a), Some(b)) => Value::Boolean(a || b),
            _ => Value::Unknown,
        },
    }
}

/// Equality is defined across same-kind pairs and between `Null` and
/// anything; other kind combinations have no answer.
fn equality(left: &Value, right: &Value) -> Value {
    match (left, right) {
        (Value::Null, Value::Null) => Value::Boolean(true),
        (Value::Null, _) | (_, Value::Null) => Value::Boolean(false),
        (Value::String(a), Value::String(b)) => Value::Boolean(a == b),
        (Value::Boolean(a), Value::Boolean(b)) => Value::Boolean(a == b),
        (Value::Array(a), Value::Array(b)) => Value::Boolean(a == b),
        (Value::Object(a), Value::Object(b)) => Value::Boolean(a == b),
        _ => match numeric_operands(left, right) {
            Some(Numeric::Ints(a, b)) => Value::Boolean(a == b),
            Some(Numeric::Floats(a, b)) => Value::Boolean(a == b),
            None => Value::Unknown,
        },
    }
}

/// Ordering is defined only between two numeric operands.
fn ordering(left: &Value, right: &Value, cmp: fn(f64, f64) -> bool) -> Value {
    match numeric_operands(left, right) {
        Some(Numeric::Ints(a, b)) => Value::Boolean(cmp(a as f64, b as f64)),
        Some(Numeric::Floats(a, b)) => Value::Boolean(cmp(a, b)),
        None => Value::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_overflow_widens() {
        assert_eq!(
            apply_binary(BinOp::Add, &Value::Integer(i64::MAX), &Value::Integer(1)),
            Value::Float(i64::MAX as f64 + 1.0)
        );
    }

    #[test]
    fn division_by_zero_has_no_answer() {
        assert_eq!(
            apply_binary(BinOp::Divide, &Value::Integer(5), &Value::Integer(0)),
            Value::Unknown
        );
        assert_eq!(
            apply_binary(BinOp::Divide, &Value::Float(5.2), &Value::Integer(0)),
            Value::Unknown
        );
    }

    #[test]
    fn ordering_rejects_non_numeric() {
        assert_eq!(
            apply_binary(
                BinOp::GreaterEqual,
                &Value::Boolean(true),
                &Value::Boolean(false)
            ),
            Value::Unknown
        );
    }
}
