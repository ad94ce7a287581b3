//! Translation between abstract expressions and SMT-LIB terms.
//!
//! [`lower`] turns an [`Ast`] into a solver [`Term`]; [`lift`] turns a solver
//! term back into an [`Ast`] and recomputes the symbolic flag and variable
//! set along the way.
//!
//! Operator names map one-to-one in both directions, with two lifting-only
//! aliases: `if` for `ite` and `bvsdiv_i` for `bvsdiv`. Indexed operators
//! (`extract`, `sign_extend`, `zero_extend`) carry their parameters in
//! [`Identifier::indices`].

use std::collections::BTreeSet;

use num_bigint::BigUint;
use symsolve_expr::{Arg, Ast, Expr, Op};
use symsolve_smtlib::quote_symbol;
use symsolve_smtlib::sort::Sort;
use symsolve_smtlib::term::{Identifier, Term};

use crate::error::SolverError;

/// Connectives whose lifted children are wrapped as standalone [`Expr`]s.
pub const SPLIT_ON: &[Op] = &[Op::And, Op::Or];

/// Non-indexed operators by SMT-LIB symbol, for lifting.
const OPERATORS: &[(&str, Op)] = &[
    ("bvadd", Op::Add),
    ("bvsub", Op::Sub),
    ("bvmul", Op::Mul),
    ("bvsdiv", Op::SDiv),
    ("bvsmod", Op::SMod),
    ("bvneg", Op::Neg),
    ("bvand", Op::BvAnd),
    ("bvor", Op::BvOr),
    ("bvxor", Op::BvXor),
    ("bvnot", Op::BvNot),
    ("bvshl", Op::Shl),
    ("bvlshr", Op::LShr),
    ("bvashr", Op::AShr),
    ("concat", Op::Concat),
    ("=", Op::Eq),
    ("distinct", Op::Ne),
    ("bvsgt", Op::SGt),
    ("bvsge", Op::SGe),
    ("bvslt", Op::SLt),
    ("bvsle", Op::SLe),
    ("bvugt", Op::UGt),
    ("bvuge", Op::UGe),
    ("bvult", Op::ULt),
    ("bvule", Op::ULe),
    ("and", Op::And),
    ("or", Op::Or),
    ("not", Op::Not),
    ("ite", Op::If),
];

/// Symbols accepted when lifting in addition to [`OPERATORS`].
const ALIASES: &[(&str, Op)] = &[("if", Op::If), ("bvsdiv_i", Op::SDiv)];

/// SMT-LIB identifier for `op`.
pub fn native_identifier(op: Op) -> Identifier {
    let symbol = match op {
        Op::Extract { hi, lo } => return Identifier::indexed("extract", vec![hi, lo]),
        Op::SignExtend(n) => return Identifier::indexed("sign_extend", vec![n]),
        Op::ZeroExtend(n) => return Identifier::indexed("zero_extend", vec![n]),
        Op::Add => "bvadd",
        Op::Sub => "bvsub",
        Op::Mul => "bvmul",
        Op::SDiv => "bvsdiv",
        Op::SMod => "bvsmod",
        Op::Neg => "bvneg",
        Op::BvAnd => "bvand",
        Op::BvOr => "bvor",
        Op::BvXor => "bvxor",
        Op::BvNot => "bvnot",
        Op::Shl => "bvshl",
        Op::LShr => "bvlshr",
        Op::AShr => "bvashr",
        Op::Concat => "concat",
        Op::Eq => "=",
        Op::Ne => "distinct",
        Op::SGt => "bvsgt",
        Op::SGe => "bvsge",
        Op::SLt => "bvslt",
        Op::SLe => "bvsle",
        Op::UGt => "bvugt",
        Op::UGe => "bvuge",
        Op::ULt => "bvult",
        Op::ULe => "bvule",
        Op::And => "and",
        Op::Or => "or",
        Op::Not => "not",
        Op::If => "ite",
    };
    Identifier::new(symbol)
}

/// Apply `op` to already-lowered arguments.
///
/// No arity check; [`lower`] checks before calling this.
pub fn apply(op: Op, args: Vec<Term>) -> Term {
    Term::App {
        func: native_identifier(op),
        args,
    }
}

// ---------------------------------------------------------------------------
// Lowering
// ---------------------------------------------------------------------------

/// Lower an abstract expression to an SMT-LIB term.
pub fn lower(ast: &Ast) -> Result<Term, SolverError> {
    match ast {
        Ast::Symbol { name, width } => {
            check_width(*width, || format!("symbol `{name}`"))?;
            if quote_symbol(name).is_none() {
                return Err(SolverError::UnsupportedValue(format!(
                    "symbol name `{name}` cannot be represented in SMT-LIB"
                )));
            }
            Ok(Term::constant(name.clone(), Sort::BitVec(*width)))
        }
        Ast::Const { value, width } => {
            check_width(*width, || format!("constant {value}"))?;
            if value.bits() > u64::from(*width) {
                return Err(SolverError::UnsupportedValue(format!(
                    "constant {value} does not fit in {width} bits"
                )));
            }
            Ok(Term::bv(value.clone(), *width))
        }
        Ast::Bool(b) => Ok(Term::BoolLit(*b)),
        Ast::Op { op, args } => {
            check_arity(*op, args.len())?;
            if let Op::Extract { hi, lo } = op
                && hi < lo
            {
                return Err(SolverError::malformed(
                    "extract",
                    format!("high index {hi} is below low index {lo}"),
                ));
            }
            let args = args
                .iter()
                .map(|arg| lower(arg.ast()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(apply(*op, args))
        }
    }
}

fn check_width(width: u32, what: impl FnOnce() -> String) -> Result<(), SolverError> {
    if width == 0 {
        return Err(SolverError::UnsupportedValue(format!("{} has zero width", what())));
    }
    Ok(())
}

fn check_arity(op: Op, count: usize) -> Result<(), SolverError> {
    let arity = op.arity();
    if arity.accepts(count) {
        Ok(())
    } else {
        Err(SolverError::malformed(
            native_identifier(op).symbol,
            format!("expected {arity} arguments, got {count}"),
        ))
    }
}

// ---------------------------------------------------------------------------
// Lifting
// ---------------------------------------------------------------------------

/// A lifted term together with its derived attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Lifted {
    pub symbolic: bool,
    pub variables: BTreeSet<String>,
    pub ast: Ast,
}

impl Lifted {
    fn leaf(ast: Ast) -> Self {
        Self {
            symbolic: false,
            variables: BTreeSet::new(),
            ast,
        }
    }

    /// Package as an [`Expr`], reusing the computed attributes.
    pub fn into_expr(self) -> Expr {
        Expr::with_attributes(self.ast, self.symbolic, self.variables)
    }
}

/// Lift a term, wrapping the children of [`SPLIT_ON`] connectives.
pub fn lift(term: &Term) -> Result<Lifted, SolverError> {
    lift_with(term, SPLIT_ON)
}

/// Lift a term, wrapping the children of the operators in `split_on`.
///
/// Children of a splitting operator are lifted with the same `split_on`;
/// children of any other operator are lifted with none, so wrapping stops at
/// the first non-splitting operator.
pub fn lift_with(term: &Term, split_on: &[Op]) -> Result<Lifted, SolverError> {
    match term {
        Term::Const {
            name,
            sort: Sort::BitVec(width),
        } => Ok(Lifted {
            symbolic: true,
            variables: BTreeSet::from([name.clone()]),
            ast: Ast::symbol(name.clone(), *width),
        }),
        Term::Const { name, sort } => Err(SolverError::UnrecognizedLeaf(format!(
            "constant `{name}` of sort {sort}"
        ))),
        Term::BitVecLit { value, width } => Ok(Lifted::leaf(Ast::Const {
            value: value.clone(),
            width: *width,
        })),
        Term::BoolLit(b) => Ok(Lifted::leaf(Ast::Bool(*b))),
        Term::App { func, args } if args.is_empty() => {
            Err(SolverError::UnrecognizedLeaf(func.symbol.clone()))
        }
        Term::App { func, args } => {
            let op = abstract_op(func)?;
            check_arity(op, args.len())?;

            let splitting = split_on.contains(&op);
            let child_split: &[Op] = if splitting { split_on } else { &[] };

            let mut symbolic = false;
            let mut variables = BTreeSet::new();
            let mut lifted_args = Vec::with_capacity(args.len());
            for child in args {
                let lifted = lift_with(child, child_split)?;
                symbolic |= lifted.symbolic;
                variables.extend(lifted.variables.iter().cloned());
                lifted_args.push(if splitting {
                    Arg::Wrapped(lifted.into_expr())
                } else {
                    Arg::Node(lifted.ast)
                });
            }
            Ok(Lifted {
                symbolic,
                variables,
                ast: Ast::op_args(op, lifted_args),
            })
        }
    }
}

/// Abstract operator for a native identifier, reading indexed parameters
/// from the identifier itself.
fn abstract_op(func: &Identifier) -> Result<Op, SolverError> {
    let symbol = func.symbol.as_str();
    let expect_indices = |n: usize| -> Result<(), SolverError> {
        if func.indices.len() == n {
            Ok(())
        } else {
            Err(SolverError::malformed(
                symbol,
                format!("expected {n} indices, got {}", func.indices.len()),
            ))
        }
    };

    let op = match symbol {
        "extract" => {
            expect_indices(2)?;
            Op::Extract {
                hi: func.indices[0],
                lo: func.indices[1],
            }
        }
        "sign_extend" => {
            expect_indices(1)?;
            Op::SignExtend(func.indices[0])
        }
        "zero_extend" => {
            expect_indices(1)?;
            Op::ZeroExtend(func.indices[0])
        }
        _ => {
            expect_indices(0)?;
            OPERATORS
                .iter()
                .chain(ALIASES)
                .find(|(s, _)| *s == symbol)
                .map(|(_, op)| *op)
                .ok_or_else(|| SolverError::malformed(symbol, "no matching abstract operator"))?
        }
    };
    Ok(op)
}

/// Largest unsigned value of a `width`-bit vector.
pub(crate) fn max_unsigned(width: u32) -> BigUint {
    (BigUint::from(1u32) << width) - 1u32
}
