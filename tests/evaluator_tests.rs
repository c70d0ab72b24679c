// tests/evaluator_tests.rs
//
// Semantics of the evaluator: numeric widening and formatting, the
// Unknown sentinel, ternary short-circuit, and path resolution against a
// message context.

use serde_json::json;
use weir_lang::{
    AttributeScope, CompiledExpression, EvalContext, EvalError, ScratchMessageContext, Value,
};

fn eval(expr: &str, msg: &ScratchMessageContext) -> Value {
    let compiled = CompiledExpression::compile(expr)
        .unwrap_or_else(|e| panic!("'{}' failed to compile: {}", expr, e));
    let ctx = EvalContext::new(msg);
    compiled.evaluate(&ctx).unwrap()
}

fn eval_str(expr: &str, msg: &ScratchMessageContext) -> Option<String> {
    let compiled = CompiledExpression::compile(expr)
        .unwrap_or_else(|e| panic!("'{}' failed to compile: {}", expr, e));
    let ctx = EvalContext::new(msg);
    compiled.evaluate_to_string(&ctx).unwrap()
}

fn empty() -> ScratchMessageContext {
    ScratchMessageContext::new()
}

// ============================================================================
// Numeric Widening and Formatting
// ============================================================================

#[test]
fn test_i32_overflow_widens_instead_of_wrapping() {
    let msg = empty();
    assert_eq!(eval_str("2147483647 + 1", &msg), Some("2147483648".to_string()));
    assert_eq!(
        eval_str("2147483647 * -2", &msg),
        Some("-4294967294".to_string())
    );
}

#[test]
fn test_division_by_zero_has_no_result() {
    let msg = empty();
    assert_eq!(eval_str("5 / 0", &msg), None);
    assert_eq!(eval_str("5.2 / 0", &msg), None);
}

#[test]
fn test_wide_literal_division_formats_exponentially() {
    let msg = empty();
    assert_eq!(eval_str("20000000000 / 10", &msg), Some("2.0E9".to_string()));
}

#[test]
fn test_exact_integer_division_stays_integral() {
    let msg = empty();
    assert_eq!(eval_str("200000000 / 10", &msg), Some("20000000".to_string()));
}

#[test]
fn test_inexact_integer_division_promotes_to_float() {
    let msg = empty();
    assert_eq!(eval_str("5 / 2", &msg), Some("2.5".to_string()));
}

#[test]
fn test_mixed_arithmetic_is_float() {
    let msg = empty();
    assert_eq!(eval_str("5 + 2.0", &msg), Some("7.0".to_string()));
    assert_eq!(eval_str("5 + 2.5", &msg), Some("7.5".to_string()));
}

#[test]
fn test_modulo() {
    let msg = empty();
    assert_eq!(eval_str("7 % 3", &msg), Some("1".to_string()));
    assert_eq!(eval_str("7 % 0", &msg), None);
}

#[test]
fn test_string_concatenation() {
    let msg = empty();
    assert_eq!(
        eval_str("\"foo\" + \"bar\"", &msg),
        Some("foobar".to_string())
    );
    // no cross-kind concatenation
    assert_eq!(eval_str("\"foo\" + 5", &msg), None);
    assert_eq!(eval_str("5 + \"foo\"", &msg), None);
}

// ============================================================================
// The Unknown Sentinel
// ============================================================================

#[test]
fn test_ordering_is_numeric_only() {
    let msg = empty();
    assert_eq!(eval("5 > \"bla\"", &msg), Value::Unknown);
    assert_eq!(eval("true >= false", &msg), Value::Unknown);
    assert_eq!(eval("5 > 3", &msg), Value::Boolean(true));
    assert_eq!(eval("5 >= 5.0", &msg), Value::Boolean(true));
}

#[test]
fn test_equality_across_kinds_is_unknown_not_false() {
    let msg = empty();
    assert_eq!(eval("5 == \"5\"", &msg), Value::Unknown);
    assert_eq!(eval("true == 1", &msg), Value::Unknown);
    assert_eq!(eval("5 == 5.0", &msg), Value::Boolean(true));
    assert_eq!(eval("\"a\" != \"b\"", &msg), Value::Boolean(true));
}

#[test]
fn test_null_compares_with_anything() {
    let msg = empty();
    assert_eq!(eval("null == null", &msg), Value::Boolean(true));
    assert_eq!(eval("null == 5", &msg), Value::Boolean(false));
    assert_eq!(eval("null != \"x\"", &msg), Value::Boolean(true));
}

#[test]
fn test_non_boolean_ternary_condition_poisons_the_expression() {
    let msg = empty();
    assert_eq!(eval("45 == (5 + 34 ? true : 456)", &msg), Value::Unknown);
}

#[test]
fn test_logic_requires_booleans_on_both_sides() {
    let msg = empty();
    assert_eq!(eval("true and 5", &msg), Value::Unknown);
    assert_eq!(eval("1 or false", &msg), Value::Unknown);
    assert_eq!(eval("true and false", &msg), Value::Boolean(false));
    assert_eq!(eval("true || false", &msg), Value::Boolean(true));
}

#[test]
fn test_unknown_propagates_through_operators() {
    let msg = empty();
    assert_eq!(eval("(5 / 0) + 1", &msg), Value::Unknown);
    assert_eq!(eval("not (5 / 0)", &msg), Value::Unknown);
    assert_eq!(eval("(5 / 0) == null", &msg), Value::Unknown);
}

// ============================================================================
// Ternary Short-Circuit
// ============================================================================

#[test]
fn test_nested_ternary_takes_only_one_branch() {
    let msg = empty();
    assert_eq!(
        eval_str("true ? false ? false : true : false", &msg),
        Some("true".to_string())
    );
}

#[test]
fn test_untaken_branch_is_not_evaluated() {
    // the untaken branch dereferences the body, which this context
    // cannot materialize; taking it would be a hard error
    let msg = empty();
    assert_eq!(eval_str("false ? payload.x : \"ok\"", &msg), Some("ok".to_string()));
}

// ============================================================================
// Path Resolution
// ============================================================================

fn student_message() -> ScratchMessageContext {
    ScratchMessageContext::new().with_body(json!({
        "student": {"name": "Tom", "marks": [70, 85, 92]},
        "active": true
    }))
}

#[test]
fn test_payload_access_dotted_and_dollar() {
    let msg = student_message();
    assert_eq!(
        eval_str("payload.student.name", &msg),
        Some("Tom".to_string())
    );
    assert_eq!(eval_str("$.student.name", &msg), Some("Tom".to_string()));
    assert_eq!(eval_str("$.student.marks[1]", &msg), Some("85".to_string()));
    assert_eq!(eval_str("$.student.marks[-1]", &msg), Some("92".to_string()));
}

#[test]
fn test_whole_body_projection() {
    let msg = ScratchMessageContext::new().with_body(json!({"a": 1, "b": [true, null]}));
    assert_eq!(
        eval_str("$", &msg),
        Some("{\"a\":1,\"b\":[true,null]}".to_string())
    );
}

#[test]
fn test_missing_member_is_null() {
    let msg = student_message();
    assert_eq!(eval("payload.student.age", &msg), Value::Null);
    assert_eq!(eval("payload.student.marks[9]", &msg), Value::Null);
}

#[test]
fn test_missing_variable_is_unknown() {
    let msg = empty();
    assert_eq!(eval("vars.missing", &msg), Value::Unknown);
    assert_eq!(eval("vars.missing + 1", &msg), Value::Unknown);
    assert_eq!(eval_str("vars.missing", &msg), None);
}

#[test]
fn test_variable_lookup() {
    use weir_lang::MessageContext;

    let mut msg = ScratchMessageContext::new().with_variable("count", Value::Integer(2));
    msg.set_variable("name", Value::String("abc".to_string()));
    assert_eq!(eval_str("vars.count + 1", &msg), Some("3".to_string()));
    assert_eq!(eval("vars.name == \"abc\"", &msg), Value::Boolean(true));
}

#[test]
fn test_header_lookup_and_escape_form() {
    let msg = ScratchMessageContext::new()
        .with_header("Content-Type", "application/json")
        .with_header("empty", "");
    assert_eq!(
        eval_str("headers[\"Content-Type\"]", &msg),
        Some("application/json".to_string())
    );
    assert_eq!(eval_str("headers[\"empty\"]", &msg), Some("".to_string()));
    // a miss is null-equivalent, not an error
    assert_eq!(eval("headers.missing", &msg), Value::Null);
}

#[test]
fn test_attribute_lookup() {
    let msg = ScratchMessageContext::new().with_attribute(
        AttributeScope::Synapse,
        "phrase",
        Value::String("hello".to_string()),
    );
    assert_eq!(
        eval_str("attributes.synapse.phrase", &msg),
        Some("hello".to_string())
    );
    assert_eq!(eval("attributes.synapse.other", &msg), Value::Null);
    assert_eq!(eval("attributes.axis2.phrase", &msg), Value::Null);
}

#[test]
fn test_bare_collection_roots_have_no_value() {
    let msg = empty();
    assert_eq!(eval("vars", &msg), Value::Unknown);
    assert_eq!(eval("headers", &msg), Value::Unknown);
}

#[test]
fn test_computed_bracket_key() {
    let msg = ScratchMessageContext::new()
        .with_body(json!({"student": "Tom"}))
        .with_variable("key", Value::String("student".to_string()));
    assert_eq!(eval_str("payload[vars.key]", &msg), Some("Tom".to_string()));
}

#[test]
fn test_filter_predicate_selects_elements() {
    let msg = ScratchMessageContext::new()
        .with_body(json!({
            "orders": [
                {"id": 1, "total": 50},
                {"id": 2, "total": 150},
                {"id": 3, "total": 200}
            ]
        }))
        .with_variable("threshold", Value::Integer(100));
    assert_eq!(
        eval_str("payload.orders[?(@.total > 100)]", &msg),
        Some("[{\"id\":2,\"total\":150},{\"id\":3,\"total\":200}]".to_string())
    );
    assert_eq!(
        eval_str("length(payload.orders[?(@.total > vars.threshold)])", &msg),
        Some("2".to_string())
    );
}

#[test]
fn test_filter_on_non_sequence_is_unknown() {
    let msg = student_message();
    assert_eq!(eval("payload.student[?(@.x == 1)]", &msg), Value::Unknown);
}

// ============================================================================
// Hard Failures
// ============================================================================

#[test]
fn test_body_unavailable_is_a_hard_error() {
    let msg = empty();
    let compiled = CompiledExpression::compile("payload.x").unwrap();
    let ctx = EvalContext::new(&msg);
    assert!(matches!(
        compiled.evaluate(&ctx),
        Err(EvalError::BodyUnavailable(_))
    ));
}

// ============================================================================
// Re-Evaluation Isolation
// ============================================================================

#[test]
fn test_one_compiled_ast_under_two_contexts() {
    let compiled = CompiledExpression::compile("$.student.name").unwrap();

    let first = ScratchMessageContext::new().with_body(json!({"student": {"name": "Tom"}}));
    let second = ScratchMessageContext::new().with_body(json!({"student": {"name": "Ann"}}));

    let ctx = EvalContext::new(&first);
    assert_eq!(
        compiled.evaluate_to_string(&ctx).unwrap(),
        Some("Tom".to_string())
    );
    let ctx = EvalContext::new(&second);
    assert_eq!(
        compiled.evaluate_to_string(&ctx).unwrap(),
        Some("Ann".to_string())
    );
    // and the first context again: nothing leaked between calls
    let ctx = EvalContext::new(&first);
    assert_eq!(
        compiled.evaluate_to_string(&ctx).unwrap(),
        Some("Tom".to_string())
    );
}
