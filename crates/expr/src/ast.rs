use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use num_bigint::BigUint;

use crate::op::Op;

/// Abstract expression node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ast {
    /// Free bitvector variable.
    Symbol { name: String, width: u32 },
    /// Concrete bitvector value.
    Const { value: BigUint, width: u32 },
    /// Boolean literal.
    Bool(bool),
    /// Operator application.
    Op { op: Op, args: Vec<Arg> },
}

/// Operator argument: either a raw node, or a self-contained [`Expr`]
/// (children of splitting connectives after lifting).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arg {
    Node(Ast),
    Wrapped(Expr),
}

/// A node packaged with its derived attributes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Expr {
    ast: Arc<Ast>,
    symbolic: bool,
    variables: BTreeSet<String>,
}

impl Ast {
    pub fn symbol(name: impl Into<String>, width: u32) -> Self {
        Ast::Symbol {
            name: name.into(),
            width,
        }
    }

    pub fn constant(value: impl Into<BigUint>, width: u32) -> Self {
        Ast::Const {
            value: value.into(),
            width,
        }
    }

    pub fn bool(value: bool) -> Self {
        Ast::Bool(value)
    }

    /// Apply `op` to raw node arguments.
    pub fn op(op: Op, args: impl IntoIterator<Item = Ast>) -> Self {
        Ast::Op {
            op,
            args: args.into_iter().map(Arg::Node).collect(),
        }
    }

    /// Apply `op` to arguments that may already be wrapped.
    pub fn op_args(op: Op, args: Vec<Arg>) -> Self {
        Ast::Op { op, args }
    }

    pub fn unary(op: Op, arg: Ast) -> Self {
        Ast::op(op, [arg])
    }

    pub fn binary(op: Op, lhs: Ast, rhs: Ast) -> Self {
        Ast::op(op, [lhs, rhs])
    }

    pub fn extract(hi: u32, lo: u32, arg: Ast) -> Self {
        Ast::unary(Op::Extract { hi, lo }, arg)
    }

    /// True if any descendant is a [`Ast::Symbol`].
    pub fn is_symbolic(&self) -> bool {
        match self {
            Ast::Symbol { .. } => true,
            Ast::Const { .. } | Ast::Bool(_) => false,
            Ast::Op { args, .. } => args.iter().any(Arg::is_symbolic),
        }
    }

    /// Names of all free variables in the tree.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_variables(&mut out);
        out
    }

    fn collect_variables(&self, out: &mut BTreeSet<String>) {
        match self {
            Ast::Symbol { name, .. } => {
                out.insert(name.clone());
            }
            Ast::Const { .. } | Ast::Bool(_) => {}
            Ast::Op { args, .. } => {
                for arg in args {
                    match arg {
                        Arg::Node(node) => node.collect_variables(out),
                        Arg::Wrapped(expr) => out.extend(expr.variables.iter().cloned()),
                    }
                }
            }
        }
    }

    /// Bit width of the value this node denotes, `None` for booleans.
    ///
    /// Returns `None` as well when an operand needed to compute the width is
    /// itself boolean or missing, or when the width does not fit in a `u32`.
    pub fn width(&self) -> Option<u32> {
        match self {
            Ast::Symbol { width, .. } | Ast::Const { width, .. } => Some(*width),
            Ast::Bool(_) => None,
            Ast::Op { op, args } => {
                if op.is_predicate() {
                    return None;
                }
                match op {
                    Op::Concat => args
                        .iter()
                        .map(|a| a.ast().width())
                        .try_fold(0u32, |acc, w| acc.checked_add(w?)),
                    Op::Extract { hi, lo } => hi.checked_sub(*lo)?.checked_add(1),
                    Op::SignExtend(n) | Op::ZeroExtend(n) => {
                        args.first()?.ast().width()?.checked_add(*n)
                    }
                    Op::If => args.get(1).and_then(|a| a.ast().width()),
                    _ => args.first().and_then(|a| a.ast().width()),
                }
            }
        }
    }
}

impl Arg {
    pub fn ast(&self) -> &Ast {
        match self {
            Arg::Node(node) => node,
            Arg::Wrapped(expr) => expr.ast(),
        }
    }

    pub fn is_symbolic(&self) -> bool {
        match self {
            Arg::Node(node) => node.is_symbolic(),
            Arg::Wrapped(expr) => expr.symbolic,
        }
    }
}

impl From<Ast> for Arg {
    fn from(node: Ast) -> Self {
        Arg::Node(node)
    }
}

impl From<Expr> for Arg {
    fn from(expr: Expr) -> Self {
        Arg::Wrapped(expr)
    }
}

impl Expr {
    /// Wrap a node, deriving its attributes.
    pub fn new(ast: Ast) -> Self {
        let symbolic = ast.is_symbolic();
        let variables = ast.variables();
        Self {
            ast: Arc::new(ast),
            symbolic,
            variables,
        }
    }

    /// Wrap a node whose attributes were already derived by the caller.
    ///
    /// The attributes must agree with the node; a mismatch is a translation
    /// bug and trips a debug assertion.
    pub fn with_attributes(ast: Ast, symbolic: bool, variables: BTreeSet<String>) -> Self {
        debug_assert_eq!(
            symbolic,
            ast.is_symbolic(),
            "symbolic flag disagrees with {ast}"
        );
        debug_assert_eq!(
            variables,
            ast.variables(),
            "variable set disagrees with {ast}"
        );
        Self {
            ast: Arc::new(ast),
            symbolic,
            variables,
        }
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    pub fn is_symbolic(&self) -> bool {
        self.symbolic
    }

    pub fn variables(&self) -> &BTreeSet<String> {
        &self.variables
    }

    pub fn into_ast(self) -> Ast {
        Arc::unwrap_or_clone(self.ast)
    }
}

impl From<Ast> for Expr {
    fn from(ast: Ast) -> Self {
        Expr::new(ast)
    }
}

impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ast::Symbol { name, .. } => write!(f, "{name}"),
            Ast::Const { value, width } => write!(f, "{value}:{width}"),
            Ast::Bool(b) => write!(f, "{b}"),
            Ast::Op { op, args } => {
                write!(f, "({op}")?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ast())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ast)
    }
}
