use thiserror::Error;

/// A syntax problem found while lexing or parsing an expression.
///
/// Errors are collected, not thrown: one parse pass reports every
/// recovery point so a configuration author sees all problems at once.
/// `line` is 1-based, `column` is the 0-based character offset within
/// the line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (line {line}, column {column})")]
pub struct SyntaxError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, line: u32, column: u32) -> Self {
        SyntaxError {
            message: message.into(),
            line,
            column,
        }
    }
}

/// Compilation failure: the source text produced one or more syntax errors.
///
/// Construction of a [`crate::CompiledExpression`] fails as a whole if the
/// parser recorded any error; all of them are carried here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_errors(.errors))]
pub struct CompileError {
    pub errors: Vec<SyntaxError>,
}

impl CompileError {
    pub fn new(errors: Vec<SyntaxError>) -> Self {
        CompileError { errors }
    }
}

fn render_errors(errors: &[SyntaxError]) -> String {
    let rendered: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    format!(
        "expression failed to compile with {} error(s): {}",
        errors.len(),
        rendered.join("; ")
    )
}

/// A hard evaluation failure.
///
/// Operand and type mismatches never raise this; they resolve to the
/// [`crate::Value::Unknown`] sentinel instead. `EvalError` is reserved for
/// structurally impossible situations supplied by the surrounding engine,
/// such as a message context without a readable body.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("message body is not available: {0}")]
    BodyUnavailable(String),
}
