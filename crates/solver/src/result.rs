use crate::model::Model;

/// Outcome of a single `check-sat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckResult {
    Sat,
    Unsat,
}

impl CheckResult {
    pub fn is_sat(self) -> bool {
        self == CheckResult::Sat
    }
}

/// Result of [`Session::solve`](crate::Session::solve).
#[derive(Debug, Clone, PartialEq)]
pub enum SolverResult {
    /// Constraints are satisfiable; the model witnesses it.
    Sat(Model),
    /// Constraints are unsatisfiable.
    Unsat,
}

impl SolverResult {
    /// Returns `true` if the result is `Sat`.
    pub fn is_sat(&self) -> bool {
        matches!(self, SolverResult::Sat(_))
    }

    /// Returns `true` if the result is `Unsat`.
    pub fn is_unsat(&self) -> bool {
        matches!(self, SolverResult::Unsat)
    }

    /// Returns the model if the result is `Sat`.
    pub fn model(&self) -> Option<&Model> {
        match self {
            SolverResult::Sat(model) => Some(model),
            SolverResult::Unsat => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Value;

    #[test]
    fn sat_predicates() {
        let sat = SolverResult::Sat(Model::new());
        assert!(sat.is_sat());
        assert!(!sat.is_unsat());
    }

    #[test]
    fn unsat_predicates() {
        let unsat = SolverResult::Unsat;
        assert!(!unsat.is_sat());
        assert!(unsat.is_unsat());
    }

    #[test]
    fn model_accessor() {
        let model = Model::with_assignments(vec![("x".to_string(), Value::bv(5u32, 8))]);
        let sat = SolverResult::Sat(model.clone());
        assert_eq!(sat.model(), Some(&model));
        assert_eq!(SolverResult::Unsat.model(), None);
    }

    #[test]
    fn check_result() {
        assert!(CheckResult::Sat.is_sat());
        assert!(!CheckResult::Unsat.is_sat());
    }
}
