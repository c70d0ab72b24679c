//! The built-in function library.
//!
//! Every function is total over argument *values*: a bad value (wrong
//! kind, unparseable text, unknown charset) maps to [`Value::Unknown`],
//! never to an error. Argument *counts* were already enforced when the
//! call was parsed, so `apply` trusts the arity here.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::ast::Function;
use crate::output;
use crate::value::{JsonValue, Value};

/// Invoke a catalog function over already-evaluated arguments.
pub fn apply(function: Function, args: &[Value]) -> Value {
    match function {
        Function::Length => length(args),
        Function::ToUpper => map_str(args, |s| Value::String(s.to_uppercase())),
        Function::ToLower => map_str(args, |s| Value::String(s.to_lowercase())),
        Function::SubString => sub_string(args),
        Function::StartsWith => str_pair(args, |s, p| Value::Boolean(s.starts_with(p))),
        Function::EndsWith => str_pair(args, |s, p| Value::Boolean(s.ends_with(p))),
        Function::Contains => str_pair(args, |s, p| Value::Boolean(s.contains(p))),
        Function::Trim => map_str(args, |s| Value::String(s.trim().to_string())),
        Function::Replace => replace(args),
        Function::Split => split(args),
        Function::IndexOf => index_of(args),
        Function::CharAt => char_at(args),

        Function::Abs => abs(args),
        Function::Floor => map_float(args, |x| Value::Float(x.floor())),
        Function::Ceil => map_float(args, |x| Value::Float(x.ceil())),
        Function::Sqrt => numeric(args).map(|x| Value::Float(x.sqrt())).unwrap_or(Value::Unknown),
        Function::Pow => pow(args),
        Function::Round => round(args),

        Function::Base64Encode => base64_encode(args),
        Function::Base64Decode => base64_decode(args),
        Function::UrlEncode => url_encode(args),
        Function::UrlDecode => url_decode(args),

        Function::IsNumber => Value::Boolean(args[0].is_numeric()),
        Function::IsString => Value::Boolean(matches!(args[0], Value::String(_))),
        Function::IsArray => is_shape(args, Shape::Array),
        Function::IsObject => is_shape(args, Shape::Object),

        Function::StringCast => string_cast(args),
        Function::IntegerCast => integer_cast(args),
        Function::FloatCast => float_cast(args),
        Function::BooleanCast => boolean_cast(args),
        Function::ObjectCast => shape_cast(args, Shape::Object),
        Function::ArrayCast => shape_cast(args, Shape::Array),

        Function::Exists => Value::Boolean(!matches!(args[0], Value::Null | Value::Unknown)),

        Function::Now => Value::Integer(Utc::now().timestamp_millis()),
        Function::FormatDateTime => format_date_time(args),
    }
}

// ---------------------------------------------------------------------
// String
// ---------------------------------------------------------------------

fn primary_str(args: &[Value]) -> Option<&str> {
    match args.first() {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

fn map_str(args: &[Value], f: impl Fn(&str) -> Value) -> Value {
    primary_str(args).map(f).unwrap_or(Value::Unknown)
}

fn str_pair(args: &[Value], f: impl Fn(&str, &str) -> Value) -> Value {
    match (args.first(), args.get(1)) {
        (Some(Value::String(a)), Some(Value::String(b))) => f(a, b),
        _ => Value::Unknown,
    }
}

/// Character count for strings, element count for sequences, member
/// count for objects; anything else has no length.
fn length(args: &[Value]) -> Value {
    match &args[0] {
        Value::String(s) => Value::Integer(s.chars().count() as i64),
        Value::Array(items) => Value::Integer(items.len() as i64),
        Value::Object(map) => Value::Integer(map.len() as i64),
        _ => Value::Unknown,
    }
}

fn int_arg(args: &[Value], index: usize) -> Option<i64> {
    match args.get(index) {
        Some(Value::Integer(n)) => Some(*n),
        _ => None,
    }
}

fn sub_string(args: &[Value]) -> Value {
    let Some(s) = primary_str(args) else {
        return Value::Unknown;
    };
    let len = s.chars().count() as i64;

    let Some(start) = int_arg(args, 1) else {
        return Value::Unknown;
    };
    let end = match args.get(2) {
        None => len,
        Some(Value::Integer(n)) => *n,
        Some(_) => return Value::Unknown,
    };

    if start < 0 || end < start || end > len {
        return Value::Unknown;
    }

    let result: String = s
        .chars()
        .skip(start as usize)
        .take((end - start) as usize)
        .collect();
    Value::String(result)
}

fn replace(args: &[Value]) -> Value {
    match (args.first(), args.get(1), args.get(2)) {
        (Some(Value::String(s)), Some(Value::String(old)), Some(Value::String(new))) => {
            Value::String(s.replace(old.as_str(), new))
        }
        _ => Value::Unknown,
    }
}

fn split(args: &[Value]) -> Value {
    let (Some(Value::String(s)), Some(Value::String(pattern))) = (args.first(), args.get(1))
    else {
        return Value::Unknown;
    };
    let Ok(regex) = Regex::new(pattern) else {
        log::debug!("split(): invalid delimiter pattern '{}'", pattern);
        return Value::Unknown;
    };
    let parts: Vec<JsonValue> = regex
        .split(s)
        .map(|part| JsonValue::String(part.to_string()))
        .collect();
    Value::Array(parts)
}

fn index_of(args: &[Value]) -> Value {
    str_pair(args, |s, sub| match s.find(sub) {
        Some(byte_pos) => Value::Integer(s[..byte_pos].chars().count() as i64),
        None => Value::Integer(-1),
    })
}

fn char_at(args: &[Value]) -> Value {
    let Some(s) = primary_str(args) else {
        return Value::Unknown;
    };
    let Some(index) = int_arg(args, 1) else {
        return Value::Unknown;
    };
    if index < 0 {
        return Value::Unknown;
    }
    s.chars()
        .nth(index as usize)
        .map(|ch| Value::String(ch.to_string()))
        .unwrap_or(Value::Unknown)
}

// ---------------------------------------------------------------------
// Numeric
// ---------------------------------------------------------------------

fn numeric(args: &[Value]) -> Option<f64> {
    args.first().and_then(Value::as_f64)
}

fn map_float(args: &[Value], f: impl Fn(f64) -> Value) -> Value {
    match args.first() {
        Some(Value::Integer(n)) => Value::Integer(*n),
        Some(Value::Float(x)) => f(*x),
        _ => Value::Unknown,
    }
}

fn abs(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::Integer(n)) => n
            .checked_abs()
            .map(Value::Integer)
            .unwrap_or(Value::Float((*n as f64).abs())),
        Some(Value::Float(x)) => Value::Float(x.abs()),
        _ => Value::Unknown,
    }
}

fn pow(args: &[Value]) -> Value {
    match (args.first().and_then(Value::as_f64), args.get(1).and_then(Value::as_f64)) {
        (Some(base), Some(exp)) => Value::Float(base.powf(exp)),
        _ => Value::Unknown,
    }
}

fn round(args: &[Value]) -> Value {
    match args.first() {
        Some(Value::Integer(n)) => Value::Integer(*n),
        Some(Value::Float(x)) => {
            let rounded = x.round();
            if rounded >= i64::MIN as f64 && rounded <= i64::MAX as f64 {
                Value::Integer(rounded as i64)
            } else {
                Value::Float(rounded)
            }
        }
        _ => Value::Unknown,
    }
}

// ---------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Charset {
    Utf8,
    Ascii,
    Latin1,
}

/// The optional trailing charset argument; absent means UTF-8, an
/// unrecognized name means no result.
fn charset_arg(args: &[Value], index: usize) -> Option<Charset> {
    match args.get(index) {
        None => Some(Charset::Utf8),
        Some(Value::String(name)) => match name.to_ascii_uppercase().as_str() {
            "UTF-8" | "UTF8" => Some(Charset::Utf8),
            "US-ASCII" | "ASCII" => Some(Charset::Ascii),
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" => Some(Charset::Latin1),
            _ => None,
        },
        Some(_) => None,
    }
}

fn encode_chars(s: &str, charset: Charset) -> Option<Vec<u8>> {
    match charset {
        Charset::Utf8 => Some(s.as_bytes().to_vec()),
        Charset::Ascii => s
            .chars()
            .map(|c| if (c as u32) < 0x80 { Some(c as u8) } else { None })
            .collect(),
        Charset::Latin1 => s
            .chars()
            .map(|c| {
                let code = c as u32;
                if code < 0x100 { Some(code as u8) } else { None }
            })
            .collect(),
    }
}

fn decode_chars(bytes: &[u8], charset: Charset) -> Option<String> {
    match charset {
        Charset::Utf8 => String::from_utf8(bytes.to_vec()).ok(),
        Charset::Ascii => bytes
            .iter()
            .map(|&b| if b < 0x80 { Some(b as char) } else { None })
            .collect(),
        Charset::Latin1 => Some(bytes.iter().map(|&b| b as char).collect()),
    }
}

fn base64_encode(args: &[Value]) -> Value {
    let Some(s) = primary_str(args) else {
        return Value::Unknown;
    };
    let Some(charset) = charset_arg(args, 1) else {
        return Value::Unknown;
    };
    encode_chars(s, charset)
        .map(|bytes| Value::String(BASE64.encode(bytes)))
        .unwrap_or(Value::Unknown)
}

fn base64_decode(args: &[Value]) -> Value {
    let Some(s) = primary_str(args) else {
        return Value::Unknown;
    };
    let Some(charset) = charset_arg(args, 1) else {
        return Value::Unknown;
    };
    BASE64
        .decode(s.trim())
        .ok()
        .and_then(|bytes| decode_chars(&bytes, charset))
        .map(Value::String)
        .unwrap_or(Value::Unknown)
}

fn is_url_literal(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'-' | b'*' | b'_')
}

fn url_encode(args: &[Value]) -> Value {
    let Some(s) = primary_str(args) else {
        return Value::Unknown;
    };
    let Some(charset) = charset_arg(args, 1) else {
        return Value::Unknown;
    };
    let Some(bytes) = encode_chars(s, charset) else {
        return Value::Unknown;
    };

    let mut out = String::with_capacity(bytes.len());
    for b in bytes {
        if is_url_literal(b) {
            out.push(b as char);
        } else if b == b' ' {
            out.push('+');
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    Value::String(out)
}

fn url_decode(args: &[Value]) -> Value {
    let Some(s) = primary_str(args) else {
        return Value::Unknown;
    };
    let Some(charset) = charset_arg(args, 1) else {
        return Value::Unknown;
    };

    let mut bytes = Vec::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '+' => bytes.push(b' '),
            '%' => {
                let (Some(hi), Some(lo)) = (chars.next(), chars.next()) else {
                    return Value::Unknown;
                };
                let (Some(hi), Some(lo)) = (hi.to_digit(16), lo.to_digit(16)) else {
                    return Value::Unknown;
                };
                bytes.push((hi * 16 + lo) as u8);
            }
            c if c.is_ascii() => bytes.push(c as u8),
            _ => return Value::Unknown,
        }
    }

    decode_chars(&bytes, charset)
        .map(Value::String)
        .unwrap_or(Value::Unknown)
}

// ---------------------------------------------------------------------
// Type predicates and conversions
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Array,
    Object,
}

/// Structural test; a string holding syntactically valid JSON of the
/// requested shape also qualifies.
fn is_shape(args: &[Value], shape: Shape) -> Value {
    let matched = match (&args[0], shape) {
        (Value::Array(_), Shape::Array) => true,
        (Value::Object(_), Shape::Object) => true,
        (Value::String(s), _) => matches!(
            (serde_json::from_str::<JsonValue>(s), shape),
            (Ok(JsonValue::Array(_)), Shape::Array) | (Ok(JsonValue::Object(_)), Shape::Object)
        ),
        _ => false,
    };
    Value::Boolean(matched)
}

fn string_cast(args: &[Value]) -> Value {
    output::to_display_string(&args[0])
        .map(Value::String)
        .unwrap_or(Value::Unknown)
}

/// Narrow conversion: integral input only, no truncation.
fn integer_cast(args: &[Value]) -> Value {
    match &args[0] {
        Value::Integer(n) => Value::Integer(*n),
        Value::Float(x) => {
            if x.fract() == 0.0 && *x >= i64::MIN as f64 && *x <= i64::MAX as f64 {
                Value::Integer(*x as i64)
            } else {
                Value::Unknown
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or(Value::Unknown),
        _ => Value::Unknown,
    }
}

fn float_cast(args: &[Value]) -> Value {
    match &args[0] {
        Value::Integer(n) => Value::Float(*n as f64),
        Value::Float(x) => Value::Float(*x),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or(Value::Unknown),
        _ => Value::Unknown,
    }
}

fn boolean_cast(args: &[Value]) -> Value {
    match &args[0] {
        Value::Boolean(b) => Value::Boolean(*b),
        Value::String(s) => match s.as_str() {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            _ => Value::Unknown,
        },
        _ => Value::Unknown,
    }
}

/// The input must already be, or be valid serialized JSON for, exactly
/// the requested shape.
fn shape_cast(args: &[Value], shape: Shape) -> Value {
    match (&args[0], shape) {
        (Value::Array(items), Shape::Array) => Value::Array(items.clone()),
        (Value::Object(map), Shape::Object) => Value::Object(map.clone()),
        (Value::String(s), _) => match (serde_json::from_str::<JsonValue>(s), shape) {
            (Ok(JsonValue::Array(items)), Shape::Array) => Value::Array(items),
            (Ok(JsonValue::Object(map)), Shape::Object) => Value::Object(map),
            _ => Value::Unknown,
        },
        _ => Value::Unknown,
    }
}

// ---------------------------------------------------------------------
// Date/time
// ---------------------------------------------------------------------

fn format_with(pattern: &str, datetime: &NaiveDateTime) -> Option<String> {
    let items: Vec<Item> = StrftimeItems::new(pattern).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return None;
    }
    Some(datetime.format_with_items(items.iter()).to_string())
}

fn parse_datetime(text: &str, pattern: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, pattern) {
        return Some(dt);
    }
    // Date-only patterns carry no time fields
    NaiveDate::parse_from_str(text, pattern)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// `formatDateTime(value, outPattern)` treats the value as epoch
/// milliseconds; `formatDateTime(value, inPattern, outPattern)` parses
/// the value with the input pattern first.
fn format_date_time(args: &[Value]) -> Value {
    if args.len() == 2 {
        let millis = match &args[0] {
            Value::Integer(n) => Some(*n),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        let Some(millis) = millis else {
            return Value::Unknown;
        };
        let (Some(instant), Some(Value::String(pattern))) =
            (DateTime::from_timestamp_millis(millis), args.get(1))
        else {
            return Value::Unknown;
        };
        return format_with(pattern, &instant.naive_utc())
            .map(Value::String)
            .unwrap_or(Value::Unknown);
    }

    let (Some(Value::String(text)), Some(Value::String(in_pattern)), Some(Value::String(out_pattern))) =
        (args.first(), args.get(1), args.get(2))
    else {
        return Value::Unknown;
    };
    parse_datetime(text, in_pattern)
        .and_then(|dt| format_with(out_pattern, &dt))
        .map(Value::String)
        .unwrap_or(Value::Unknown)
}
