//! # Expression Language - Abstract Syntax Tree
//!
//! The compiled form of a mediation expression. The AST is a closed set of
//! immutable node variants built directly by the recursive-descent parser;
//! once a [`crate::CompiledExpression`] is published it may be evaluated
//! repeatedly and concurrently, read-only.
//!
//! ## Submodules
//!
//! - **[tokens]** - Positioned lexical tokens produced by the lexer
//! - **[nodes]** - Expression nodes (literals, access, operations, filters)
//! - **[operators]** - Binary and unary operators
//! - **[functions]** - The closed catalog of built-in functions
//!
//! ## Core concepts
//!
//! An expression computes one value from an in-flight message. Roots name
//! where the value comes from:
//!
//! ```text
//! payload.orders[0].total          // the message body ($ is an alias)
//! vars.discount                    // a context variable
//! headers["Content-Type"]          // a transport header
//! attributes.synapse.phrase        // an engine-internal attribute
//! ```
//!
//! Operators, ternaries and the function library combine them:
//!
//! ```text
//! vars.count > 10 ? "bulk" : "single"
//! toUpper(payload.customer.name)
//! payload.orders[?(@.total > vars.threshold)]
//! ```

pub mod functions;
pub mod nodes;
pub mod operators;
pub mod tokens;

pub use functions::Function;
pub use nodes::{AttributeScope, Expr, Root};
pub use operators::{BinOp, UnaryOp};
pub use tokens::{Token, TokenKind};
