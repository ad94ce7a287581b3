//! # symsolve-solver
//!
//! Incremental SMT solving over abstract bitvector expressions.
//!
//! Expressions built with [`symsolve_expr`] are lowered to SMT-LIB terms,
//! sent to a long-lived solver process, and answers flow back as concrete
//! values, models, or lifted expressions.
//!
//! ## Usage
//!
//! ```no_run
//! use symsolve_expr::{Ast, Op};
//! use symsolve_solver::{Session, SolverConfig};
//!
//! let config = SolverConfig::auto_detect().unwrap();
//! let mut session = Session::spawn(&config).unwrap();
//!
//! let x = Ast::symbol("x", 8);
//! let window = [
//!     Ast::binary(Op::UGe, x.clone(), Ast::constant(5u32, 8)),
//!     Ast::binary(Op::ULt, x.clone(), Ast::constant(10u32, 8)),
//! ];
//!
//! let values = session.eval(&x, 3, &window).unwrap();
//! let lo = session.min(&x, &window).unwrap();
//! let hi = session.max(&x, &window).unwrap();
//! println!("{} values, range {lo}..={hi}", values.len());
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod model;
mod parser;
mod query;
pub mod result;
pub mod session;
pub mod solver;
pub mod translate;

// Re-export primary types for ergonomic use
pub use backend::SolverBackend;
pub use config::{SolverConfig, SolverKind};
pub use error::SolverError;
pub use model::{Model, Value};
pub use result::{CheckResult, SolverResult};
pub use session::Session;
pub use solver::ProcessSolver;
pub use translate::{Lifted, SPLIT_ON, lift, lift_with, lower};
