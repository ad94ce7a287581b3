//! # symsolve-expr
//!
//! The abstract expression tree shared between the symbolic engine and the
//! solver adapter.
//!
//! Nodes are immutable values. Two attributes are derived bottom-up and never
//! stored on raw nodes: whether the tree mentions a free variable
//! ([`Ast::is_symbolic`]) and which variables it mentions
//! ([`Ast::variables`]). An [`Expr`] is a node packaged together with those
//! attributes, which is how children of logical connectives travel once they
//! have been lifted back out of a solver.
//!
//! ```
//! use symsolve_expr::{Ast, Op};
//!
//! let x = Ast::symbol("x", 8);
//! let guard = Ast::binary(Op::ULt, x.clone(), Ast::constant(10u32, 8));
//! assert!(guard.is_symbolic());
//! assert_eq!(x.width(), Some(8));
//! assert_eq!(guard.width(), None);
//! ```

pub mod ast;
pub mod op;

pub use ast::{Arg, Ast, Expr};
pub use op::{Arity, Op};
