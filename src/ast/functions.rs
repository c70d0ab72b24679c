/// The closed catalog of built-in functions.
///
/// Function names resolve at parse time; an unknown name or an unsupported
/// argument count is a syntax error. Argument *values* never fail: every
/// function maps a bad value to the `Unknown` sentinel at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    // String
    Length,
    ToUpper,
    ToLower,
    SubString,
    StartsWith,
    EndsWith,
    Contains,
    Trim,
    Replace,
    Split,
    IndexOf,
    CharAt,

    // Numeric
    Abs,
    Floor,
    Ceil,
    Sqrt,
    Pow,
    Round,

    // Encoding
    Base64Encode,
    Base64Decode,
    UrlEncode,
    UrlDecode,

    // Type predicates
    IsNumber,
    IsString,
    IsArray,
    IsObject,

    // Type conversions
    StringCast,
    IntegerCast,
    FloatCast,
    BooleanCast,
    ObjectCast,
    ArrayCast,

    // Existence
    Exists,

    // Date/time
    Now,
    FormatDateTime,
}

impl Function {
    /// Resolve a source-level name to a catalog entry.
    pub fn from_name(name: &str) -> Option<Function> {
        let function = match name {
            "length" => Function::Length,
            "toUpper" => Function::ToUpper,
            "toLower" => Function::ToLower,
            "subString" => Function::SubString,
            "startsWith" => Function::StartsWith,
            "endsWith" => Function::EndsWith,
            "contains" => Function::Contains,
            "trim" => Function::Trim,
            "replace" => Function::Replace,
            "split" => Function::Split,
            "indexOf" => Function::IndexOf,
            "charAt" => Function::CharAt,
            "abs" => Function::Abs,
            "floor" => Function::Floor,
            "ceil" => Function::Ceil,
            "sqrt" => Function::Sqrt,
            "pow" => Function::Pow,
            "round" => Function::Round,
            "base64encode" => Function::Base64Encode,
            "base64decode" => Function::Base64Decode,
            "urlEncode" => Function::UrlEncode,
            "urlDecode" => Function::UrlDecode,
            "isNumber" => Function::IsNumber,
            "isString" => Function::IsString,
            "isArray" => Function::IsArray,
            "isObject" => Function::IsObject,
            "string" => Function::StringCast,
            "integer" => Function::IntegerCast,
            "float" => Function::FloatCast,
            "boolean" => Function::BooleanCast,
            "object" => Function::ObjectCast,
            "array" => Function::ArrayCast,
            "exists" => Function::Exists,
            "now" => Function::Now,
            "formatDateTime" => Function::FormatDateTime,
            _ => return None,
        };
        Some(function)
    }

    /// The source-level name, for error messages.
    pub fn name(&self) -> &'static str {
        match self {
            Function::Length => "length",
            Function::ToUpper => "toUpper",
            Function::ToLower => "toLower",
            Function::SubString => "subString",
            Function::StartsWith => "startsWith",
            Function::EndsWith => "endsWith",
            Function::Contains => "contains",
            Function::Trim => "trim",
            Function::Replace => "replace",
            Function::Split => "split",
            Function::IndexOf => "indexOf",
            Function::CharAt => "charAt",
            Function::Abs => "abs",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
            Function::Sqrt => "sqrt",
            Function::Pow => "pow",
            Function::Round => "round",
            Function::Base64Encode => "base64encode",
            Function::Base64Decode => "base64decode",
            Function::UrlEncode => "urlEncode",
            Function::UrlDecode => "urlDecode",
            Function::IsNumber => "isNumber",
            Function::IsString => "isString",
            Function::IsArray => "isArray",
            Function::IsObject => "isObject",
            Function::StringCast => "string",
            Function::IntegerCast => "integer",
            Function::FloatCast => "float",
            Function::BooleanCast => "boolean",
            Function::ObjectCast => "object",
            Function::ArrayCast => "array",
            Function::Exists => "exists",
            Function::Now => "now",
            Function::FormatDateTime => "formatDateTime",
        }
    }

    /// Whether this function supports `count` arguments.
    ///
    /// The only place argument counts are enforced; checked when the call
    /// is parsed, never at evaluation time.
    pub fn accepts_arity(&self, count: usize) -> bool {
        match self {
            Function::Length
            | Function::ToUpper
            | Function::ToLower
            | Function::Trim
            | Function::Abs
            | Function::Floor
            | Function::Ceil
            | Function::Sqrt
            | Function::Round
            | Function::IsNumber
            | Function::IsString
            | Function::IsArray
            | Function::IsObject
            | Function::StringCast
            | Function::IntegerCast
            | Function::FloatCast
            | Function::BooleanCast
            | Function::ObjectCast
            | Function::ArrayCast
            | Function::Exists => count == 1,

            Function::StartsWith
            | Function::EndsWith
            | Function::Contains
            | Function::Split
            | Function::IndexOf
            | Function::CharAt
            | Function::Pow => count == 2,

            Function::Replace => count == 3,

            Function::SubString => count == 2 || count == 3,

            Function::Base64Encode
            | Function::Base64Decode
            | Function::UrlEncode
            | Function::UrlDecode => count == 1 || count == 2,

            Function::Now => count == 0,

            Function::FormatDateTime => count == 2 || count == 3,
        }
    }
}

#[test]
fn names_round_trip() {
    for name in [
        "length",
        "subString",
        "base64encode",
        "isArray",
        "integer",
        "formatDateTime",
    ] {
        let f = Function::from_name(name).unwrap();
        assert_eq!(f.name(), name);
    }
    assert_eq!(Function::from_name("bogus"), None);
}
