pub mod ast;
pub mod cli;
pub mod context;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod functions;
pub mod lexer;
pub mod navigator;
pub mod output;
pub mod parser;
pub mod resolver;
pub mod value;

pub use ast::{AttributeScope, BinOp, Expr, Function, Root, Token, TokenKind, UnaryOp};
pub use context::{EvalContext, MessageContext, ScratchMessageContext};
pub use engine::{DefaultEngine, EngineError, ExpressionEngine};
pub use error::{CompileError, EvalError, SyntaxError};
pub use expression::CompiledExpression;
pub use lexer::Lexer;
pub use navigator::{JsonPath, PathError, PathToken};
pub use output::{format_float, to_display_string};
pub use parser::Parser;
pub use value::{JsonMap, JsonValue, Value};
