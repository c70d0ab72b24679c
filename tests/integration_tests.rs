// tests/integration_tests.rs
//
// End-to-end behavior across the compile and evaluate surfaces: marker
// stripping, the compile-fatal error policy, content-awareness, the
// engine factory, the xpath capability hook, and the CLI check layer.

use std::collections::HashMap;

use serde_json::json;
use weir_lang::cli::{CheckOptions, CheckResult, execute_check};
use weir_lang::{
    AttributeScope, CompiledExpression, EvalContext, EvalError, JsonValue, MessageContext,
    ScratchMessageContext, Value, engine,
};

// ============================================================================
// Markers and Compilation Policy
// ============================================================================

#[test]
fn test_both_marker_syntaxes_compile_the_same_grammar() {
    let msg = ScratchMessageContext::new().with_variable("a", Value::Integer(4));
    for text in ["vars.a + 1", "${vars.a + 1}", "#[vars.a + 1]"] {
        let compiled = CompiledExpression::compile(text).unwrap();
        let ctx = EvalContext::new(&msg);
        assert_eq!(
            compiled.evaluate_to_string(&ctx).unwrap(),
            Some("5".to_string()),
            "failed for marker form: {}",
            text
        );
    }
}

#[test]
fn test_compilation_is_fatal_on_any_recorded_error() {
    let err = CompiledExpression::compile("5 >> 3").unwrap_err();
    assert_eq!(err.errors.len(), 1);
    assert_eq!(err.errors[0].column, 3);

    // every recovery point is reported together
    let err = CompiledExpression::compile("5 >> 3 >> 4").unwrap_err();
    assert_eq!(err.errors.len(), 2);
}

// ============================================================================
// Content-Awareness
// ============================================================================

#[test]
fn test_content_awareness_flags() {
    let cases = [
        ("payload", true),
        ("$.student", true),
        ("payload.orders[?(@.total > vars.t)]", true),
        ("vars.count + 1", false),
        ("headers[\"Content-Type\"]", false),
        ("attributes.synapse.phrase", false),
        ("xpath(\"$ctx:name\")", false),
        ("xpath(\"//student\")", true),
        ("xpath(\"$body/order\")", true),
        ("xpath(\"//student\", \"stored\")", false),
        ("vars.flag ? payload.a : vars.b", true),
    ];
    for (text, expected) in cases {
        let compiled = CompiledExpression::compile(text).unwrap();
        assert_eq!(
            compiled.is_content_aware(),
            expected,
            "content-awareness of '{}'",
            text
        );
    }
}

#[test]
fn test_non_content_aware_expression_never_touches_the_body() {
    // no body attached: a content-aware expression would hard-fail
    let msg = ScratchMessageContext::new().with_variable("a", Value::Integer(1));
    let compiled = CompiledExpression::compile("vars.a + 1").unwrap();
    assert!(!compiled.is_content_aware());
    let ctx = EvalContext::new(&msg);
    assert_eq!(compiled.evaluate_to_string(&ctx).unwrap(), Some("2".to_string()));

    let aware = CompiledExpression::compile("payload.a").unwrap();
    let ctx = EvalContext::new(&msg);
    assert!(matches!(
        aware.evaluate(&ctx),
        Err(EvalError::BodyUnavailable(_))
    ));
}

// ============================================================================
// Concurrent Read-Only Sharing
// ============================================================================

#[test]
fn test_compiled_expression_shares_across_threads() {
    let compiled = CompiledExpression::compile("$.n * 2").unwrap();

    std::thread::scope(|scope| {
        for n in 0..4 {
            let compiled = &compiled;
            scope.spawn(move || {
                let msg = ScratchMessageContext::new().with_body(json!({"n": n}));
                let ctx = EvalContext::new(&msg);
                assert_eq!(
                    compiled.evaluate_to_string(&ctx).unwrap(),
                    Some((n * 2).to_string())
                );
            });
        }
    });
}

// ============================================================================
// Engine Factory
// ============================================================================

#[test]
fn test_engine_factory_resolves_a_closed_set() {
    let engine = engine::from_name("default").unwrap();
    let compiled = engine.compile("1 + 1").unwrap();
    let msg = ScratchMessageContext::new();
    let ctx = EvalContext::new(&msg);
    assert_eq!(compiled.evaluate_to_string(&ctx).unwrap(), Some("2".to_string()));

    assert!(engine::from_name("reflective").is_err());
}

// ============================================================================
// The xpath() Capability Hook
// ============================================================================

/// A context whose engine collaborator can answer XML path queries.
struct XmlCapableContext {
    inner: ScratchMessageContext,
}

impl MessageContext for XmlCapableContext {
    fn get_variable(&self, name: &str) -> Option<Value> {
        self.inner.get_variable(name)
    }
    fn set_variable(&mut self, name: &str, value: Value) {
        self.inner.set_variable(name, value);
    }
    fn get_header(&self, name: &str) -> Option<String> {
        self.inner.get_header(name)
    }
    fn body(&self) -> Result<JsonValue, EvalError> {
        self.inner.body()
    }
    fn get_attribute(&self, scope: AttributeScope, name: &str) -> Option<Value> {
        self.inner.get_attribute(scope, name)
    }
    fn evaluate_xpath(
        &self,
        query: &str,
        variable: Option<&str>,
        _namespaces: &HashMap<String, String>,
    ) -> Option<String> {
        match (query, variable) {
            ("//student", None) => Some("Tom".to_string()),
            _ => None,
        }
    }
}

#[test]
fn test_xpath_delegates_to_the_context() {
    let msg = XmlCapableContext {
        inner: ScratchMessageContext::new(),
    };
    let compiled = CompiledExpression::compile("xpath(\"//student\")").unwrap();
    let ctx = EvalContext::new(&msg).with_namespace("m", "http://example.org/m");
    assert_eq!(
        compiled.evaluate_to_string(&ctx).unwrap(),
        Some("Tom".to_string())
    );

    // a query the collaborator cannot answer has no result
    let compiled = CompiledExpression::compile("xpath(\"//other\")").unwrap();
    let ctx = EvalContext::new(&msg);
    assert_eq!(compiled.evaluate_to_string(&ctx).unwrap(), None);
}

#[test]
fn test_default_context_has_no_xpath_capability() {
    let msg = ScratchMessageContext::new();
    let compiled = CompiledExpression::compile("xpath(\"$ctx:name\")").unwrap();
    let ctx = EvalContext::new(&msg);
    assert_eq!(compiled.evaluate(&ctx).unwrap(), Value::Unknown);
}

// ============================================================================
// CLI Check Layer
// ============================================================================

#[test]
fn test_execute_check_evaluates_with_bindings() {
    let options = CheckOptions {
        expression: "vars.count + length(payload.items)".to_string(),
        input: Some("{\"items\": [1, 2, 3]}".to_string()),
        vars: vec!["count=2".to_string()],
        ..Default::default()
    };
    assert_eq!(
        execute_check(&options).unwrap(),
        CheckResult::Success(Some("5".to_string()))
    );
}

#[test]
fn test_execute_check_syntax_only_reports_content_awareness() {
    let options = CheckOptions {
        expression: "${payload.x}".to_string(),
        syntax_only: true,
        ..Default::default()
    };
    assert_eq!(
        execute_check(&options).unwrap(),
        CheckResult::SyntaxValid { content_aware: true }
    );
}

#[test]
fn test_execute_check_surfaces_compile_errors() {
    let options = CheckOptions {
        expression: "5 >> 3".to_string(),
        ..Default::default()
    };
    assert!(execute_check(&options).is_err());
}

#[test]
fn test_execute_check_header_and_attr_bindings() {
    let options = CheckOptions {
        expression: "headers[\"X-Route\"] + \"/\" + attributes.synapse.tenant".to_string(),
        headers: vec!["X-Route=orders".to_string()],
        attrs: vec!["tenant=acme".to_string()],
        ..Default::default()
    };
    assert_eq!(
        execute_check(&options).unwrap(),
        CheckResult::Success(Some("orders/acme".to_string()))
    );
}

#[test]
fn test_execute_check_rejects_unknown_engine() {
    let options = CheckOptions {
        expression: "1".to_string(),
        engine: "reflective".to_string(),
        ..Default::default()
    };
    assert!(execute_check(&options).is_err());
}
