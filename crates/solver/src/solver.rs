use std::collections::HashMap;
use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;

use smtkit::session::{SmtlibSession, Status};
use smtkit::sexp::Sexp;
use symsolve_smtlib::command::Command as SmtCmd;
use symsolve_smtlib::quote_symbol;
use symsolve_smtlib::sort::Sort;
use symsolve_smtlib::term::Term;

use crate::backend::SolverBackend;
use crate::config::{SolverConfig, SolverKind};
use crate::error::SolverError;
use crate::model::{Model, Value};
use crate::parser;
use crate::result::CheckResult;

/// Interactive SMT-LIB2 solver process.
///
/// The solver is spawned once and kept alive through an [`SmtlibSession`],
/// so assertion scopes persist across checks. Each command is fenced with an
/// `echo`, which pins an `(error ...)` answer to the command that caused it.
/// The process is killed when the value is dropped.
pub struct ProcessSolver {
    kind: SolverKind,
    session: SmtlibSession,
    path: PathBuf,
    args: Vec<String>,
    declared: HashMap<String, Sort>,
}

impl std::fmt::Debug for ProcessSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessSolver")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("declared", &self.declared.len())
            .finish()
    }
}

/// Solver text for a term, sort or symbol.
fn sexp(item: impl std::fmt::Display) -> Sexp {
    Sexp::atom(item.to_string())
}

impl ProcessSolver {
    /// Spawn the configured solver and prepare it for incremental use.
    pub fn spawn(config: &SolverConfig) -> Result<Self, SolverError> {
        config.validate()?;
        let args = config.build_args();
        tracing::debug!(
            solver = %config.kind,
            path = %config.solver_path.display(),
            ?args,
            "Spawning solver"
        );

        let program = config.solver_path.to_str().ok_or_else(|| {
            SolverError::ProcessError(format!(
                "Solver path is not valid UTF-8: {}",
                config.solver_path.display()
            ))
        })?;
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let mut session = SmtlibSession::spawn(program, &arg_refs)?;
        session.set_wall_timeout(config.response_deadline());

        session.set_print_success(false)?;
        session.set_produce_models(true)?;
        session.set_option(":global-declarations", &Sexp::atom("true"))?;
        if let Some(logic) = &config.logic {
            session.set_logic(logic)?;
        }

        Ok(Self {
            kind: config.kind,
            session,
            path: config.solver_path.clone(),
            args,
            declared: HashMap::new(),
        })
    }

    /// Which solver this process runs.
    pub fn kind(&self) -> SolverKind {
        self.kind
    }

    fn reason_unknown(&mut self) -> Result<SolverError, SolverError> {
        let response = self.session.get_info(":reason-unknown")?;
        tracing::trace!(solver = %self.kind, "< {response}");
        let reason = parser::parse_reason_unknown(&response);
        if reason.contains("timeout") || reason == "canceled" {
            Ok(SolverError::Timeout)
        } else {
            Ok(SolverError::Unknown(reason))
        }
    }

    /// Run `script` through a fresh solver process and return its output.
    ///
    /// Used for commands the interactive session has no reader for.
    fn run_batch(&self, script: &str) -> Result<String, SolverError> {
        tracing::trace!(solver = %self.kind, "batch > {}", script.trim_end());
        let mut child = Command::new(&self.path)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SolverError::ProcessError(format!("Failed to start {}: {e}", self.kind))
            })?;

        {
            let stdin = child.stdin.as_mut().ok_or_else(|| {
                SolverError::ProcessError(format!("Failed to open {} stdin", self.kind))
            })?;
            stdin.write_all(script.as_bytes()).map_err(|e| {
                SolverError::ProcessError(format!("Failed to write to {} stdin: {e}", self.kind))
            })?;
        }

        let output = child.wait_with_output().map_err(|e| {
            SolverError::ProcessError(format!("Failed to wait for {}: {e}", self.kind))
        })?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::trace!(solver = %self.kind, "batch < {}", stdout.trim_end());
        Ok(stdout)
    }
}

impl SolverBackend for ProcessSolver {
    fn declare_const(&mut self, name: &str, sort: &Sort) -> Result<(), SolverError> {
        if let Some(declared) = self.declared.get(name) {
            if declared != sort {
                return Err(SolverError::SortConflict {
                    name: name.to_string(),
                    declared: declared.clone(),
                    requested: sort.clone(),
                });
            }
            return Ok(());
        }
        let quoted = quote_symbol(name).ok_or_else(|| {
            SolverError::UnsupportedValue(format!(
                "symbol name `{name}` cannot be represented in SMT-LIB"
            ))
        })?;
        tracing::trace!(solver = %self.kind, "> (declare-const {quoted} {sort})");
        self.session.declare_const(&quoted, &sexp(sort))?;
        self.declared.insert(name.to_string(), sort.clone());
        Ok(())
    }

    fn assert(&mut self, term: &Term) -> Result<(), SolverError> {
        tracing::trace!(solver = %self.kind, "> (assert {term})");
        Ok(self.session.assert_sexp(&sexp(term))?)
    }

    fn push(&mut self) -> Result<(), SolverError> {
        tracing::trace!(solver = %self.kind, "> (push 1)");
        Ok(self.session.push()?)
    }

    fn pop(&mut self) -> Result<(), SolverError> {
        tracing::trace!(solver = %self.kind, "> (pop 1)");
        Ok(self.session.pop(1)?)
    }

    fn check_sat(&mut self) -> Result<CheckResult, SolverError> {
        let start = Instant::now();
        tracing::trace!(solver = %self.kind, "> (check-sat)");
        let result = match self.session.check_sat()? {
            Status::Sat => CheckResult::Sat,
            Status::Unsat => CheckResult::Unsat,
            Status::Unknown => {
                let err = self.reason_unknown()?;
                tracing::debug!(solver = %self.kind, "UNKNOWN ({err}) in {:?}", start.elapsed());
                return Err(err);
            }
        };
        tracing::debug!(solver = %self.kind, ?result, "check-sat in {:?}", start.elapsed());
        Ok(result)
    }

    fn model(&mut self) -> Result<Model, SolverError> {
        tracing::trace!(solver = %self.kind, "> (get-model)");
        let response = self.session.get_model()?;
        tracing::trace!(solver = %self.kind, "< {response}");
        parser::parse_model(&response)
    }

    fn value(&mut self, term: &Term) -> Result<Value, SolverError> {
        tracing::trace!(solver = %self.kind, "> (get-value ({term}))");
        let pairs = self.session.get_value_pairs(&[sexp(term)])?;
        let (_, value) = pairs.first().ok_or_else(|| {
            SolverError::ParseError(format!("Empty get-value response for {term}"))
        })?;
        tracing::trace!(solver = %self.kind, "< {value}");
        parser::parse_value(value)
    }

    fn simplify(&mut self, term: &Term) -> Result<Term, SolverError> {
        if !self.kind.supports_simplify() {
            tracing::debug!(solver = %self.kind, "simplify unsupported, returning term unchanged");
            return Ok(term.clone());
        }
        let mut script = String::new();
        for (name, sort) in term.constants() {
            let declare = SmtCmd::DeclareConst(name.into(), sort.clone());
            let _ = writeln!(script, "{declare}");
        }
        let _ = writeln!(script, "{}", SmtCmd::Simplify(term.clone()));
        let _ = writeln!(script, "{}", SmtCmd::Exit);

        let stdout = self.run_batch(&script)?;
        let responses = parser::parse_batch_output(&stdout)?;
        let simplified = responses.last().ok_or_else(|| {
            SolverError::ParseError(format!("No simplify response for {term}"))
        })?;
        parser::parse_term(simplified, &self.declared)
    }
}
