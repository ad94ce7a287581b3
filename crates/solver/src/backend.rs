//! The seam between sessions and a concrete solver.
//!
//! [`Session`](crate::Session) drives any [`SolverBackend`]; the production
//! implementation is the interactive subprocess in [`crate::solver`].

use symsolve_smtlib::sort::Sort;
use symsolve_smtlib::term::Term;

use crate::error::SolverError;
use crate::model::{Model, Value};
use crate::result::CheckResult;

/// Incremental solver operations a session needs.
///
/// Declarations are global: a constant declared inside a scope stays
/// declared after that scope is popped.
pub trait SolverBackend {
    /// Declare a constant. Re-declaring with the same sort is a no-op; a
    /// different sort is a [`SolverError::SortConflict`].
    fn declare_const(&mut self, name: &str, sort: &Sort) -> Result<(), SolverError>;

    /// Assert a Bool term in the current scope.
    fn assert(&mut self, term: &Term) -> Result<(), SolverError>;

    /// Open a new assertion scope.
    fn push(&mut self) -> Result<(), SolverError>;

    /// Discard the innermost assertion scope.
    fn pop(&mut self) -> Result<(), SolverError>;

    /// Check the conjunction of all live assertions.
    ///
    /// An `unknown` answer is reported as [`SolverError::Timeout`] or
    /// [`SolverError::Unknown`].
    fn check_sat(&mut self) -> Result<CheckResult, SolverError>;

    /// Assignments for the declared constants after a `Sat` check.
    fn model(&mut self) -> Result<Model, SolverError>;

    /// Value of `term` under the model of the last `Sat` check.
    fn value(&mut self, term: &Term) -> Result<Value, SolverError>;

    /// Solver-side simplification of `term`.
    fn simplify(&mut self, term: &Term) -> Result<Term, SolverError>;
}

impl<B: SolverBackend + ?Sized> SolverBackend for Box<B> {
    fn declare_const(&mut self, name: &str, sort: &Sort) -> Result<(), SolverError> {
        (**self).declare_const(name, sort)
    }

    fn assert(&mut self, term: &Term) -> Result<(), SolverError> {
        (**self).assert(term)
    }

    fn push(&mut self) -> Result<(), SolverError> {
        (**self).push()
    }

    fn pop(&mut self) -> Result<(), SolverError> {
        (**self).pop()
    }

    fn check_sat(&mut self) -> Result<CheckResult, SolverError> {
        (**self).check_sat()
    }

    fn model(&mut self) -> Result<Model, SolverError> {
        (**self).model()
    }

    fn value(&mut self, term: &Term) -> Result<Value, SolverError> {
        (**self).value(term)
    }

    fn simplify(&mut self, term: &Term) -> Result<Term, SolverError> {
        (**self).simplify(term)
    }
}
