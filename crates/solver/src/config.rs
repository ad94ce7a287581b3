use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::SolverError;

/// Extra time a response may take beyond the solver's own timeout before the
/// session gives up on the process.
const RESPONSE_GRACE: Duration = Duration::from_secs(5);

/// Response deadline when no solver timeout is configured.
const UNBOUNDED_RESPONSE: Duration = Duration::from_secs(24 * 60 * 60);

/// SMT-LIB2 solvers that can drive a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverKind {
    Z3,
    Cvc5,
    Yices,
}

impl SolverKind {
    pub const ALL: [SolverKind; 3] = [SolverKind::Z3, SolverKind::Cvc5, SolverKind::Yices];

    /// Short name, also accepted by [`str::parse`].
    pub fn name(&self) -> &'static str {
        match self {
            SolverKind::Z3 => "z3",
            SolverKind::Cvc5 => "cvc5",
            SolverKind::Yices => "yices",
        }
    }

    /// Binary looked up on `PATH` by [`SolverConfig::auto_detect_for`].
    pub fn binary_name(&self) -> &'static str {
        match self {
            SolverKind::Z3 => "z3",
            SolverKind::Cvc5 => "cvc5",
            SolverKind::Yices => "yices-smt2",
        }
    }

    /// Arguments that make the solver read SMT-LIB2 from stdin and keep its
    /// assertion stack between checks.
    pub fn interactive_args(&self) -> &'static [&'static str] {
        match self {
            SolverKind::Z3 => &["-in", "-smt2"],
            SolverKind::Cvc5 => &["--lang", "smt2", "--incremental"],
            SolverKind::Yices => &["--incremental"],
        }
    }

    /// Per-check timeout flag; `None` when `timeout_ms` is zero.
    pub fn timeout_arg(&self, timeout_ms: u64) -> Option<String> {
        if timeout_ms == 0 {
            return None;
        }
        match self {
            SolverKind::Z3 => Some(format!("-t:{timeout_ms}")),
            SolverKind::Cvc5 => Some(format!("--tlimit-per={timeout_ms}")),
            // Whole seconds only.
            SolverKind::Yices => Some(format!("--timeout={}", timeout_ms.div_ceil(1000))),
        }
    }

    /// Whether the solver understands the non-standard `(simplify t)` command.
    pub fn supports_simplify(&self) -> bool {
        matches!(self, SolverKind::Z3 | SolverKind::Cvc5)
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SolverKind {
    type Err = String;

    /// Accepts the short name or the binary name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.to_ascii_lowercase();
        SolverKind::ALL
            .into_iter()
            .find(|kind| wanted == kind.name() || wanted == kind.binary_name())
            .ok_or_else(|| {
                let names: Vec<&str> = SolverKind::ALL.iter().map(SolverKind::name).collect();
                let expected = names.join(", ");
                format!("unknown solver `{s}`, expected one of: {expected}")
            })
    }
}

/// How to start a solver for a session.
///
/// Passed once when a session is spawned; nothing here is read from the
/// process environment unless [`SolverConfig::auto_detect_for`] is called.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub kind: SolverKind,
    pub solver_path: PathBuf,
    /// Per-check timeout in milliseconds (0 = no timeout).
    pub timeout_ms: u64,
    /// Logic to declare at startup, if any.
    pub logic: Option<String>,
    /// Passed to the solver after the interactive and timeout arguments.
    pub extra_args: Vec<String>,
}

impl SolverConfig {
    pub fn new(kind: SolverKind, solver_path: PathBuf) -> Self {
        Self {
            kind,
            solver_path,
            timeout_ms: 0,
            logic: None,
            extra_args: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Declare `logic` (e.g. `QF_BV`) when the session starts.
    pub fn with_logic(mut self, logic: impl Into<String>) -> Self {
        self.logic = Some(logic.into());
        self
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Find the solver binary for `kind` in the directories of `PATH`.
    pub fn auto_detect_for(kind: SolverKind) -> Result<Self, SolverError> {
        let binary = kind.binary_name();
        let found = std::env::var_os("PATH")
            .and_then(|dirs| find_in(std::env::split_paths(&dirs), binary));
        match found {
            Some(path) => Ok(Self::new(kind, path)),
            None => Err(SolverError::NotFound(kind, PathBuf::from(binary))),
        }
    }

    /// Find Z3 on `PATH`.
    pub fn auto_detect() -> Result<Self, SolverError> {
        Self::auto_detect_for(SolverKind::Z3)
    }

    /// Full argument list for the solver process.
    pub fn build_args(&self) -> Vec<String> {
        let mut args: Vec<String> = self
            .kind
            .interactive_args()
            .iter()
            .map(|a| a.to_string())
            .collect();
        args.extend(self.kind.timeout_arg(self.timeout_ms));
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// How long to wait for any single solver response before abandoning the
    /// process. Past this the session reports [`SolverError::Timeout`].
    pub fn response_deadline(&self) -> Duration {
        if self.timeout_ms == 0 {
            UNBOUNDED_RESPONSE
        } else {
            Duration::from_millis(self.timeout_ms) + RESPONSE_GRACE
        }
    }

    /// Check that the configured solver binary exists.
    pub fn validate(&self) -> Result<(), SolverError> {
        if !self.solver_path.is_file() {
            return Err(SolverError::NotFound(self.kind, self.solver_path.clone()));
        }
        Ok(())
    }
}

fn find_in(dirs: impl IntoIterator<Item = PathBuf>, binary: &str) -> Option<PathBuf> {
    dirs.into_iter()
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_config() {
        let config = SolverConfig::new(SolverKind::Z3, PathBuf::from("/usr/bin/z3"));
        assert_eq!(config.kind, SolverKind::Z3);
        assert_eq!(config.timeout_ms, 0);
        assert_eq!(config.logic, None);
        assert!(config.extra_args.is_empty());
    }

    #[test]
    fn builder() {
        let config = SolverConfig::new(SolverKind::Cvc5, PathBuf::from("/usr/bin/cvc5"))
            .with_timeout(5000)
            .with_logic("QF_BV")
            .with_extra_args(vec!["--seed=1".to_string()]);
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.logic.as_deref(), Some("QF_BV"));
        assert_eq!(
            config.build_args(),
            vec![
                "--lang",
                "smt2",
                "--incremental",
                "--tlimit-per=5000",
                "--seed=1",
            ]
        );
    }

    #[test]
    fn validate_missing_binary() {
        let config = SolverConfig::new(SolverKind::Z3, PathBuf::from("/nonexistent/z3"));
        assert_eq!(
            config.validate().unwrap_err(),
            SolverError::NotFound(SolverKind::Z3, PathBuf::from("/nonexistent/z3"))
        );
    }

    #[test]
    fn find_in_skips_missing_directories() {
        let dirs = vec![PathBuf::from("/nonexistent"), std::env::temp_dir()];
        assert_eq!(find_in(dirs, "symsolve-no-such-binary"), None);
    }

    #[test]
    fn response_deadline_follows_timeout() {
        let path = PathBuf::from("/usr/bin/z3");
        let bounded = SolverConfig::new(SolverKind::Z3, path.clone());
        let bounded = bounded.with_timeout(2000);
        assert_eq!(bounded.response_deadline(), Duration::from_secs(7));
        let unbounded = SolverConfig::new(SolverKind::Z3, path);
        assert_eq!(unbounded.response_deadline(), UNBOUNDED_RESPONSE);
    }

    // ---- SolverKind ----

    #[test]
    fn kind_names_round_trip() {
        for kind in SolverKind::ALL {
            assert_eq!(kind.to_string().parse::<SolverKind>(), Ok(kind));
            assert_eq!(kind.binary_name().parse::<SolverKind>(), Ok(kind));
        }
        assert_eq!("CVC5".parse::<SolverKind>(), Ok(SolverKind::Cvc5));
        let err = "boolector".parse::<SolverKind>().unwrap_err();
        assert!(err.contains("z3, cvc5, yices"), "{err}");
    }

    #[test]
    fn timeout_args() {
        assert_eq!(SolverKind::Z3.timeout_arg(5000).as_deref(), Some("-t:5000"));
        assert_eq!(
            SolverKind::Cvc5.timeout_arg(5000).as_deref(),
            Some("--tlimit-per=5000")
        );
        assert_eq!(
            SolverKind::Yices.timeout_arg(1500).as_deref(),
            Some("--timeout=2")
        );
        assert_eq!(SolverKind::Z3.timeout_arg(0), None);
    }

    #[test]
    fn z3_args() {
        let config = SolverConfig::new(SolverKind::Z3, PathBuf::from("/usr/bin/z3"))
            .with_timeout(3000)
            .with_extra_args(vec!["-v:1".to_string()]);
        assert_eq!(config.build_args(), vec!["-in", "-smt2", "-t:3000", "-v:1"]);
    }

    #[test]
    fn simplify_support() {
        assert!(SolverKind::Z3.supports_simplify());
        assert!(!SolverKind::Yices.supports_simplify());
    }
}
