use symsolve_smtlib::term::Term;

use crate::backend::SolverBackend;
use crate::config::SolverConfig;
use crate::error::SolverError;
use crate::model::{Model, Value};
use crate::result::CheckResult;
use crate::solver::ProcessSolver;

/// A solver context plus the depth of its assertion-scope stack.
///
/// Sessions are single-threaded and own their backend outright. Depth can
/// never drop below zero, the depth at creation.
#[derive(Debug)]
pub struct Session<B = ProcessSolver> {
    backend: B,
    depth: u32,
}

impl Session<ProcessSolver> {
    /// Start a solver process as described by `config`.
    pub fn spawn(config: &SolverConfig) -> Result<Self, SolverError> {
        Ok(Self::new(ProcessSolver::spawn(config)?))
    }
}

impl<B: SolverBackend> Session<B> {
    /// Wrap a backend with no open scopes.
    pub fn new(backend: B) -> Self {
        Self { backend, depth: 0 }
    }

    /// Number of currently open scopes.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    pub fn push(&mut self) -> Result<(), SolverError> {
        self.backend.push()?;
        self.depth += 1;
        tracing::trace!(depth = self.depth, "push");
        Ok(())
    }

    pub fn pop(&mut self) -> Result<(), SolverError> {
        if self.depth == 0 {
            return Err(SolverError::ScopeUnderflow { depth: self.depth });
        }
        self.backend.pop()?;
        self.depth -= 1;
        tracing::trace!(depth = self.depth, "pop");
        Ok(())
    }

    /// Run `f` inside a fresh scope.
    ///
    /// The depth is back to its pre-call value when this returns, whether `f`
    /// succeeded or not. An error from `f` wins over an error while popping.
    pub fn scoped<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SolverError>,
    ) -> Result<T, SolverError> {
        let saved = self.depth;
        self.push()?;
        let result = f(self);
        let restored = self.restore(saved);
        match (result, restored) {
            (Err(e), _) | (Ok(_), Err(e)) => Err(e),
            (Ok(value), Ok(())) => Ok(value),
        }
    }

    fn restore(&mut self, depth: u32) -> Result<(), SolverError> {
        while self.depth > depth {
            self.pop()?;
        }
        Ok(())
    }

    /// Declare every constant in `term` that the solver has not seen yet.
    pub(crate) fn declare_constants(&mut self, term: &Term) -> Result<(), SolverError> {
        for (name, sort) in term.constants() {
            self.backend.declare_const(name, sort)?;
        }
        Ok(())
    }

    /// Assert native Bool terms in the current scope.
    ///
    /// Terms are not type-checked here; the solver rejects ill-sorted ones.
    pub fn assert_terms(&mut self, terms: &[Term]) -> Result<(), SolverError> {
        for term in terms {
            self.declare_constants(term)?;
            self.backend.assert(term)?;
        }
        Ok(())
    }

    /// Check the current assertions. Scopes are left untouched.
    pub fn check(&mut self) -> Result<CheckResult, SolverError> {
        self.backend.check_sat()
    }

    /// Model of the last check. Only meaningful right after a `Sat` answer.
    pub fn current_model(&mut self) -> Result<Model, SolverError> {
        self.backend.model()
    }

    /// Value of a native term under the model of the last check.
    pub fn value(&mut self, term: &Term) -> Result<Value, SolverError> {
        self.declare_constants(term)?;
        self.backend.value(term)
    }

    /// Let the solver simplify a native term.
    pub fn simplify_term(&mut self, term: &Term) -> Result<Term, SolverError> {
        self.declare_constants(term)?;
        self.backend.simplify(term)
    }
}
