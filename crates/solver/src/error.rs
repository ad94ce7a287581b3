use std::path::PathBuf;

use smtkit::session::SessionError;
use symsolve_smtlib::sort::Sort;

use crate::config::SolverKind;

/// Errors from translation, solver interaction and queries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SolverError {
    /// Solver binary not found at the specified path.
    #[error("{0} binary not found at: {path}", path = .1.display())]
    NotFound(SolverKind, PathBuf),
    /// Process failed to start, crashed, or its pipes broke.
    #[error("Solver process error: {0}")]
    ProcessError(String),
    /// Failed to parse solver output.
    #[error("Failed to parse solver output: {0}")]
    ParseError(String),
    /// The solver answered a command with `(error ...)`.
    #[error("Solver rejected command: {0}")]
    Solver(String),
    /// Timeout exceeded.
    #[error("Solver timeout exceeded")]
    Timeout,
    /// `check-sat` answered `unknown` for a reason other than a timeout.
    #[error("Solver returned unknown: {0}")]
    Unknown(String),
    /// A value handed to lowering is outside the translatable vocabulary.
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),
    /// A childless native term that is not a bitvector variable or literal.
    #[error("Unrecognized leaf term: {0}")]
    UnrecognizedLeaf(String),
    /// An operator that is unmapped or applied to the wrong arguments.
    #[error("Malformed operator `{op}`: {detail}")]
    MalformedOperator { op: String, detail: String },
    /// A query found no satisfying assignment at all.
    #[error("Constraints are unsatisfiable")]
    UnsatisfiableQuery,
    /// `pop` past the depth the session was created at.
    #[error("Cannot pop below the session's base scope (depth {depth})")]
    ScopeUnderflow { depth: u32 },
    /// A constant was used with a different sort than it was declared with.
    #[error("Constant `{name}` declared as {declared} but used as {requested}")]
    SortConflict {
        name: String,
        declared: Sort,
        requested: Sort,
    },
}

impl From<SessionError> for SolverError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Solver { message } => crate::parser::rejected(&message),
            SessionError::Unsupported => SolverError::Solver("unsupported".to_string()),
            SessionError::Timeout { .. } => SolverError::Timeout,
            SessionError::Parse(e) => SolverError::ParseError(e.to_string()),
            SessionError::UnknownStatus(status) => {
                SolverError::ParseError(format!("Unexpected check-sat response: {status}"))
            }
            SessionError::BadGetValue => {
                SolverError::ParseError("Unexpected get-value response".to_string())
            }
            other => SolverError::ProcessError(other.to_string()),
        }
    }
}

impl SolverError {
    pub(crate) fn malformed(op: impl Into<String>, detail: impl Into<String>) -> Self {
        SolverError::MalformedOperator {
            op: op.into(),
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_found() {
        let err = SolverError::NotFound(SolverKind::Z3, PathBuf::from("/no/z3"));
        assert_eq!(err.to_string(), "z3 binary not found at: /no/z3");
    }

    #[test]
    fn display_process_error() {
        let err = SolverError::ProcessError("crashed".to_string());
        assert_eq!(err.to_string(), "Solver process error: crashed");
    }

    #[test]
    fn display_parse_error() {
        let err = SolverError::ParseError("bad output".to_string());
        assert_eq!(err.to_string(), "Failed to parse solver output: bad output");
    }

    #[test]
    fn display_timeout() {
        assert_eq!(SolverError::Timeout.to_string(), "Solver timeout exceeded");
    }

    #[test]
    fn display_translation_errors() {
        let err = SolverError::malformed("bvadd", "expected exactly 2 arguments, got 3");
        assert_eq!(
            err.to_string(),
            "Malformed operator `bvadd`: expected exactly 2 arguments, got 3"
        );
        let err = SolverError::UnrecognizedLeaf("flag".to_string());
        assert_eq!(err.to_string(), "Unrecognized leaf term: flag");
    }

    #[test]
    fn display_sort_conflict() {
        let err = SolverError::SortConflict {
            name: "x".to_string(),
            declared: Sort::BitVec(8),
            requested: Sort::BitVec(16),
        };
        assert_eq!(
            err.to_string(),
            "Constant `x` declared as (_ BitVec 8) but used as (_ BitVec 16)"
        );
    }

    #[test]
    fn session_errors() {
        let rejected = SessionError::Solver {
            message: "(error \"unknown constant y\")".to_string(),
        };
        assert_eq!(
            SolverError::from(rejected),
            SolverError::Solver("unknown constant y".to_string())
        );
        let wall = SessionError::Timeout {
            operation: "check-sat",
            timeout: std::time::Duration::from_secs(1),
        };
        assert_eq!(SolverError::from(wall), SolverError::Timeout);
        assert!(matches!(
            SolverError::from(SessionError::Eof),
            SolverError::ProcessError(_)
        ));
    }

    #[test]
    fn error_equality() {
        assert_eq!(SolverError::Timeout, SolverError::Timeout);
        assert_ne!(SolverError::Timeout, SolverError::ProcessError("x".into()));
        assert_eq!(
            SolverError::ScopeUnderflow { depth: 0 },
            SolverError::ScopeUnderflow { depth: 0 }
        );
    }
}
