//! Queries over abstract expressions: satisfiability, enumeration of
//! concrete values, and unsigned minimum/maximum by binary search.

use num_bigint::BigUint;
use num_traits::Zero;
use symsolve_expr::{Ast, Expr, Op};
use symsolve_smtlib::term::Term;

use crate::backend::SolverBackend;
use crate::error::SolverError;
use crate::model::Value;
use crate::result::SolverResult;
use crate::session::Session;
use crate::translate::{self, apply, lower};

fn lower_all(constraints: &[Ast]) -> Result<Vec<Term>, SolverError> {
    constraints.iter().map(lower).collect()
}

impl<B: SolverBackend> Session<B> {
    /// Lower `constraints` and assert them in the current scope.
    pub fn add_constraints(&mut self, constraints: &[Ast]) -> Result<(), SolverError> {
        let terms = lower_all(constraints)?;
        self.assert_terms(&terms)
    }

    /// Check the current assertions and return a model when satisfiable.
    pub fn solve(&mut self) -> Result<SolverResult, SolverError> {
        if self.check()?.is_sat() {
            Ok(SolverResult::Sat(self.current_model()?))
        } else {
            Ok(SolverResult::Unsat)
        }
    }

    /// Whether the current assertions, plus `extra` in a temporary scope, are
    /// satisfiable.
    pub fn is_satisfiable(&mut self, extra: &[Ast]) -> Result<bool, SolverError> {
        let extra = lower_all(extra)?;
        self.with_extra(&extra, |s| Ok(s.check()?.is_sat()))
    }

    /// Up to `n` distinct values `expr` can take.
    ///
    /// Fewer than `n` values means the solutions ran out. No value at all is
    /// [`SolverError::UnsatisfiableQuery`]. Values come in whatever order the
    /// solver finds them.
    pub fn eval(&mut self, expr: &Ast, n: usize, extra: &[Ast]) -> Result<Vec<Value>, SolverError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let term = lower(expr)?;
        let extra = lower_all(extra)?;
        // Globally, so the first model already covers every constant of `expr`.
        self.declare_constants(&term)?;

        let enumerate = |s: &mut Self| -> Result<Vec<Value>, SolverError> {
            s.assert_terms(&extra)?;
            let mut values = Vec::new();
            for i in 0..n {
                if !s.check()?.is_sat() {
                    break;
                }
                let value = s.value(&term)?;
                tracing::trace!(%value, "eval solution {}", i + 1);
                if i + 1 < n {
                    let blocked = Term::distinct(term.clone(), value.to_term());
                    s.assert_terms(&[blocked])?;
                }
                values.push(value);
            }
            Ok(values)
        };

        let values = if n != 1 || !extra.is_empty() {
            self.scoped(enumerate)?
        } else {
            enumerate(self)?
        };
        tracing::debug!(requested = n, found = values.len(), "eval {expr}");
        if values.is_empty() {
            return Err(SolverError::UnsatisfiableQuery);
        }
        Ok(values)
    }

    /// Smallest unsigned value `expr` can take.
    pub fn min(&mut self, expr: &Ast, extra: &[Ast]) -> Result<BigUint, SolverError> {
        self.optimize(expr, extra, Direction::Min)
    }

    /// Largest unsigned value `expr` can take.
    pub fn max(&mut self, expr: &Ast, extra: &[Ast]) -> Result<BigUint, SolverError> {
        self.optimize(expr, extra, Direction::Max)
    }

    /// Lower `expr`, let the solver simplify it, and lift the result.
    pub fn simplify(&mut self, expr: &Ast) -> Result<Expr, SolverError> {
        let term = lower(expr)?;
        let simplified = self.simplify_term(&term)?;
        Ok(translate::lift(&simplified)?.into_expr())
    }

    fn with_extra<T>(
        &mut self,
        extra: &[Term],
        f: impl FnOnce(&mut Self) -> Result<T, SolverError>,
    ) -> Result<T, SolverError> {
        if extra.is_empty() {
            f(self)
        } else {
            self.scoped(|s| {
                s.assert_terms(extra)?;
                f(s)
            })
        }
    }

    fn optimize(
        &mut self,
        expr: &Ast,
        extra: &[Ast],
        direction: Direction,
    ) -> Result<BigUint, SolverError> {
        let width = expr.width().ok_or_else(|| {
            SolverError::UnsupportedValue(format!("{expr} is not a bitvector expression"))
        })?;
        let term = lower(expr)?;
        let extra = lower_all(extra)?;
        self.declare_constants(&term)?;

        let result = self.with_extra(&extra, |s| {
            if !s.check()?.is_sat() {
                return Err(SolverError::UnsatisfiableQuery);
            }
            match direction {
                Direction::Min => s.search_min(&term, width),
                Direction::Max => s.search_max(&term, width),
            }
        })?;
        tracing::debug!(?direction, %result, "optimized {expr}");
        Ok(result)
    }

    /// Whether `constraints` are satisfiable in a throwaway scope.
    fn holds_in_scope(&mut self, constraints: &[Term]) -> Result<bool, SolverError> {
        self.scoped(|s| {
            s.assert_terms(constraints)?;
            Ok(s.check()?.is_sat())
        })
    }

    fn search_min(&mut self, term: &Term, width: u32) -> Result<BigUint, SolverError> {
        let bv = |v: &BigUint| Term::bv(v.clone(), width);
        let mut lo = BigUint::zero();
        let mut hi = translate::max_unsigned(width);

        while hi > &lo + 1u32 {
            let mid: BigUint = (&lo + &hi) >> 1u32;
            let below_mid = self.holds_in_scope(&[
                apply(Op::UGe, vec![term.clone(), bv(&lo)]),
                apply(Op::ULt, vec![term.clone(), bv(&mid)]),
            ])?;
            if below_mid {
                hi = mid - 1u32;
            } else {
                lo = mid;
            }
            tracing::trace!(%lo, %hi, "min bounds");
        }

        if hi == lo || self.holds_in_scope(&[Term::eq(term.clone(), bv(&lo))])? {
            Ok(lo)
        } else {
            Ok(hi)
        }
    }

    fn search_max(&mut self, term: &Term, width: u32) -> Result<BigUint, SolverError> {
        let bv = |v: &BigUint| Term::bv(v.clone(), width);
        let mut lo = BigUint::zero();
        let mut hi = translate::max_unsigned(width);

        while hi > &lo + 1u32 {
            let mid: BigUint = (&lo + &hi) >> 1u32;
            let above_mid = self.holds_in_scope(&[
                apply(Op::UGt, vec![term.clone(), bv(&mid)]),
                apply(Op::ULe, vec![term.clone(), bv(&hi)]),
            ])?;
            if above_mid {
                lo = mid + 1u32;
            } else {
                hi = mid;
            }
            tracing::trace!(%lo, %hi, "max bounds");
        }

        if hi == lo || self.holds_in_scope(&[Term::eq(term.clone(), bv(&hi))])? {
            Ok(hi)
        } else {
            Ok(lo)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Min,
    Max,
}
