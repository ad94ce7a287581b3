//! # symsolve-smtlib
//!
//! The solver-native side of the adapter: SMT-LIB2 sorts, terms and commands,
//! plus their textual rendering.
//!
//! Terms mirror the solver's own term graph. An application carries an
//! [`Identifier`](term::Identifier) whose `indices` hold the numeric
//! parameters of indexed operators such as `(_ extract 7 4)`, so callers read
//! them structurally instead of reparsing printed output.

pub mod command;
mod formatter;
pub mod sort;
pub mod term;

pub use formatter::{is_simple_symbol, quote_symbol};
