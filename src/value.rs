use serde_json::Map;

/// A parsed JSON document node, as exchanged with the message context and
/// the structural navigator.
pub type JsonValue = serde_json::Value;

/// An order-preserving JSON object body.
pub type JsonMap = Map<String, JsonValue>;

/// The tagged result of evaluating an expression.
///
/// Scalar results carry their own representation; structural results carry
/// the underlying JSON nodes so they can be handed back to mediation code
/// without another conversion.
///
/// # The `Unknown` sentinel
///
/// `Unknown` is a first-class value, not an error. It means "this
/// operation has no well-defined answer for these operand kinds"
/// (`5 > "bla"`, division by zero, a missing variable used in arithmetic)
/// and it propagates through every operator instead of aborting the
/// evaluation. Its string projection is absent.
///
/// # Numeric representation
///
/// Integral literals that fit a 32-bit range evaluate as `Integer`;
/// arithmetic widens over 64 bits and falls back to `Float` rather than
/// trapping or wrapping. Division stays integral only when both operands
/// are integers and the result is exact.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,

    /// Boolean (true/false)
    Boolean(bool),

    /// Integer number (preserved separately from floats)
    Integer(i64),

    /// Floating-point number
    Float(f64),

    /// UTF-8 string
    String(String),

    /// A JSON array, element order preserved
    Array(Vec<JsonValue>),

    /// A JSON object, member order preserved
    Object(JsonMap),

    /// No well-defined answer; propagates, never aborts
    Unknown,
}

impl Value {
    /// Lift a JSON document node into the tagged result model.
    pub fn from_json(node: &JsonValue) -> Value {
        match node {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Boolean(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Integer(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            JsonValue::String(s) => Value::String(s.clone()),
            JsonValue::Array(items) => Value::Array(items.clone()),
            JsonValue::Object(map) => Value::Object(map.clone()),
        }
    }

    /// Lower the result back to a JSON document node.
    ///
    /// `Unknown` has no JSON representation and maps to `None`; a
    /// non-finite float degrades to JSON null, which is what the
    /// serializer would emit anyway.
    pub fn into_json(self) -> Option<JsonValue> {
        match self {
            Value::Null => Some(JsonValue::Null),
            Value::Boolean(b) => Some(JsonValue::Bool(b)),
            Value::Integer(n) => Some(JsonValue::from(n)),
            Value::Float(x) => Some(
                serde_json::Number::from_f64(x)
                    .map(JsonValue::Number)
                    .unwrap_or(JsonValue::Null),
            ),
            Value::String(s) => Some(JsonValue::String(s)),
            Value::Array(items) => Some(JsonValue::Array(items)),
            Value::Object(map) => Some(JsonValue::Object(map)),
            Value::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Value::Unknown)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    /// Boolean view of the value, if it is a boolean.
    ///
    /// There is no truthiness in this language: only `Boolean` qualifies.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Unknown => "unknown",
        }
    }
}

#[test]
fn from_json_splits_numbers() {
    assert_eq!(Value::from_json(&serde_json::json!(7)), Value::Integer(7));
    assert_eq!(Value::from_json(&serde_json::json!(7.5)), Value::Float(7.5));
    assert_eq!(Value::from_json(&serde_json::json!(null)), Value::Null);
}

#[test]
fn into_json_drops_unknown() {
    assert_eq!(Value::Unknown.into_json(), None);
    assert_eq!(Value::Integer(3).into_json(), Some(serde_json::json!(3)));
}
