use crate::ast::{BinOp, Function, UnaryOp};

/// The two engine-internal attribute namespaces an expression can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeScope {
    /// Transport-level attributes (`attributes.axis2`)
    Axis2,
    /// Mediation-level attributes (`attributes.synapse`)
    Synapse,
}

impl AttributeScope {
    pub fn name(&self) -> &'static str {
        match self {
            AttributeScope::Axis2 => "axis2",
            AttributeScope::Synapse => "synapse",
        }
    }
}

/// A root accessor: where a path starts resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    /// The message body (`payload` or `$`); the only content-aware root
    Payload,
    /// Context variables (`vars`)
    Variables,
    /// Transport headers (`headers`)
    Headers,
    /// Engine-internal attributes (`attributes.axis2` /
    /// `attributes.synapse`)
    Attributes(AttributeScope),
}

/// Abstract syntax tree node for a parsed expression.
///
/// Nodes are immutable once built. The tree is strict (no cycles) and
/// owned by the compiled expression for its lifetime.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Integer literal
    Integer(i64),

    /// Float literal
    Float(f64),

    /// String literal
    String(String),

    /// Boolean literal
    Boolean(bool),

    /// Null literal
    Null,

    /// Array literal
    ///
    /// # Example
    /// ```text
    /// [1, 2, vars.third]
    /// ```
    Array(Vec<Expr>),

    // References
    /// Root accessor (`payload`, `$`, `vars`, `headers`,
    /// `attributes.axis2`, `attributes.synapse`)
    Root(Root),

    /// The candidate node (`@`) inside a filter predicate
    Current,

    /// Member name in the key position of an access expression.
    /// Produced from the identifier after a dot and from bracketed
    /// string keys; only ever appears as the `key` of [`Expr::Access`].
    Key(String),

    // Access
    /// Structural index: object member or array element
    ///
    /// # Examples
    /// ```text
    /// payload.student
    /// vars["reserved name"]
    /// payload.orders[0]
    /// ```
    Access { object: Box<Expr>, key: Box<Expr> },

    /// Structural filter over a sequence
    ///
    /// # Example
    /// ```text
    /// payload.orders[?(@.total > 100)]
    /// ```
    Filter {
        object: Box<Expr>,
        predicate: Box<Expr>,
    },

    // Operations
    /// Unary operation (`-x`, `not x`)
    Unary { op: UnaryOp, operand: Box<Expr> },

    /// Binary operation (arithmetic, comparison, logical)
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Ternary conditional; only the taken branch is evaluated
    ///
    /// # Example
    /// ```text
    /// vars.count > 10 ? "bulk" : "single"
    /// ```
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    /// Call into the built-in function catalog
    ///
    /// # Examples
    /// ```text
    /// toUpper(payload.name)
    /// subString(headers["X-Id"], 0, 8)
    /// ```
    Call { function: Function, args: Vec<Expr> },

    /// Embedded low-level XML path query, the `xpath("...")` escape form.
    ///
    /// With a `variable`, the query runs against that variable's value
    /// instead of the live message body (and is therefore never
    /// content-aware).
    Xpath {
        query: String,
        variable: Option<String>,
    },
}
