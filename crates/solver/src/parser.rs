//! Interpreting SMT-LIB2 solver responses.
//!
//! Framing and s-expression parsing come from [`smtkit`]; this module turns
//! the resulting [`Sexp`] trees into terms, values and models. Atoms keep
//! their source spelling, so quoted symbols arrive as `|a b|` and string
//! literals with their surrounding quotes.

use std::collections::HashMap;

use num_bigint::BigUint;
use smtkit::sexp::Sexp;
use symsolve_smtlib::sort::Sort;
use symsolve_smtlib::term::{Identifier, Term};

use crate::error::SolverError;
use crate::model::{Model, Value};

fn parse_error(msg: impl Into<String>) -> SolverError {
    SolverError::ParseError(msg.into())
}

/// Parse exactly one s-expression.
pub(crate) fn parse_sexp(text: &str) -> Result<Sexp, SolverError> {
    smtkit::sexp::parse_one(text)
        .map_err(|e| parse_error(format!("{e}: {}", text.trim())))
}

/// Parse the complete output of a batch run, failing on the first
/// `(error ...)` response.
pub(crate) fn parse_batch_output(stdout: &str) -> Result<Vec<Sexp>, SolverError> {
    let Sexp::List(responses) = parse_sexp(&format!("(\n{stdout}\n)"))? else {
        return Err(parse_error(format!("Unexpected solver output: {stdout}")));
    };
    for response in &responses {
        check_error(response)?;
    }
    Ok(responses)
}

/// A symbol with its `|...|` quoting removed.
fn symbol(atom: &str) -> &str {
    atom.strip_prefix('|')
        .and_then(|s| s.strip_suffix('|'))
        .unwrap_or(atom)
}

/// Contents of a string literal atom; `None` for any other atom.
fn string_literal(atom: &str) -> Option<String> {
    let inner = atom.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.replace("\"\"", "\""))
}

/// Turn an `(error "...")` response into [`SolverError::Solver`].
pub(crate) fn check_error(response: &Sexp) -> Result<(), SolverError> {
    if let Sexp::List(items) = response
        && let [Sexp::Atom(head), rest @ ..] = items.as_slice()
        && head == "error"
    {
        let msg = match rest.first() {
            Some(Sexp::Atom(a)) => string_literal(a).unwrap_or_else(|| a.clone()),
            _ => "unspecified error".to_string(),
        };
        return Err(SolverError::Solver(msg));
    }
    Ok(())
}

/// Error for a rejected command, given the raw `(error ...)` text.
pub(crate) fn rejected(message: &str) -> SolverError {
    match parse_sexp(message).map(|sexp| check_error(&sexp)) {
        Ok(Err(err)) => err,
        _ => SolverError::Solver(message.trim().to_string()),
    }
}

/// Extract the reason from a `(:reason-unknown "...")` response.
pub(crate) fn parse_reason_unknown(response: &Sexp) -> String {
    match response {
        Sexp::List(items) => match items.as_slice() {
            [_, Sexp::Atom(reason)] => string_literal(reason).unwrap_or_else(|| reason.clone()),
            _ => "unknown".to_string(),
        },
        Sexp::Atom(_) => "unknown".to_string(),
    }
}

/// Parse a sort: `Bool` or `(_ BitVec n)`.
pub(crate) fn parse_sort(sexp: &Sexp) -> Result<Sort, SolverError> {
    match sexp {
        Sexp::Atom(a) if a == "Bool" => Ok(Sort::Bool),
        Sexp::List(items) => match items.as_slice() {
            [Sexp::Atom(u), Sexp::Atom(bv), Sexp::Atom(n)] if u == "_" && bv == "BitVec" => {
                n.parse()
                    .map(Sort::BitVec)
                    .map_err(|_| parse_error(format!("Invalid bitvector width: {n}")))
            }
            _ => Err(parse_error(format!("Unsupported sort: {sexp}"))),
        },
        Sexp::Atom(_) => Err(parse_error(format!("Unsupported sort: {sexp}"))),
    }
}

/// Parse a term, resolving constants against the declared `sorts` and
/// expanding `let` bindings.
///
/// Symbols that are neither bound nor declared become nullary applications;
/// lifting reports them as unrecognized leaves.
pub(crate) fn parse_term(sexp: &Sexp, sorts: &HashMap<String, Sort>) -> Result<Term, SolverError> {
    let mut env = Vec::new();
    to_term(sexp, sorts, &mut env)
}

fn to_term(
    sexp: &Sexp,
    sorts: &HashMap<String, Sort>,
    env: &mut Vec<(String, Term)>,
) -> Result<Term, SolverError> {
    let items = match sexp {
        Sexp::Atom(atom) => return atom_term(atom, sorts, env),
        Sexp::List(items) => items.as_slice(),
    };
    match items {
        [] => Err(parse_error("Empty application")),
        [Sexp::Atom(u), Sexp::Atom(lit), Sexp::Atom(width)]
            if u == "_" && lit.starts_with("bv") =>
        {
            let value = BigUint::parse_bytes(lit[2..].as_bytes(), 10)
                .ok_or_else(|| parse_error(format!("Invalid bitvector literal: {lit}")))?;
            let width = width
                .parse()
                .map_err(|_| parse_error(format!("Invalid bitvector width: {width}")))?;
            Ok(Term::bv(value, width))
        }
        [Sexp::Atom(kw), Sexp::List(bindings), body] if kw == "let" => {
            // Parallel let: every bound term sees only the outer scope.
            let mut bound = Vec::with_capacity(bindings.len());
            for binding in bindings {
                let Sexp::List(pair) = binding else {
                    return Err(parse_error(format!("Malformed let binding: {binding}")));
                };
                let [Sexp::Atom(name), value] = pair.as_slice() else {
                    return Err(parse_error(format!("Malformed let binding: {binding}")));
                };
                bound.push((symbol(name).to_string(), to_term(value, sorts, env)?));
            }
            let mark = env.len();
            env.extend(bound);
            let body = to_term(body, sorts, env);
            env.truncate(mark);
            body
        }
        [head] => Err(parse_error(format!("Application without arguments: {head}"))),
        [head, args @ ..] => {
            let func = parse_identifier(head)?;
            let args = args
                .iter()
                .map(|a| to_term(a, sorts, env))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Term::App { func, args })
        }
    }
}

fn parse_identifier(head: &Sexp) -> Result<Identifier, SolverError> {
    let invalid = || parse_error(format!("Invalid function identifier: {head}"));
    match head {
        Sexp::Atom(atom) if string_literal(atom).is_some() => Err(invalid()),
        Sexp::Atom(atom) => Ok(Identifier::new(symbol(atom))),
        Sexp::List(items) => match items.as_slice() {
            [Sexp::Atom(u), Sexp::Atom(name), indices @ ..] if u == "_" && !indices.is_empty() => {
                let bad_index = || parse_error(format!("Invalid index in {head}"));
                let indices = indices
                    .iter()
                    .map(|i| match i {
                        Sexp::Atom(a) => a.parse::<u32>().map_err(|_| bad_index()),
                        Sexp::List(_) => Err(bad_index()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Identifier::indexed(symbol(name), indices))
            }
            _ => Err(invalid()),
        },
    }
}

fn atom_term(
    atom: &str,
    sorts: &HashMap<String, Sort>,
    env: &[(String, Term)],
) -> Result<Term, SolverError> {
    if !atom.starts_with('|') {
        match atom {
            "true" => return Ok(Term::BoolLit(true)),
            "false" => return Ok(Term::BoolLit(false)),
            _ => {}
        }
        if let Some(bits) = atom.strip_prefix("#b") {
            return radix_literal(atom, bits, 2, 1);
        }
        if let Some(hex) = atom.strip_prefix("#x") {
            return radix_literal(atom, hex, 16, 4);
        }
        if string_literal(atom).is_some() {
            return Err(parse_error(format!("Unexpected string literal in term: {atom}")));
        }
    }
    let name = symbol(atom);
    if let Some((_, term)) = env.iter().rev().find(|(bound, _)| bound == name) {
        return Ok(term.clone());
    }
    if let Some(sort) = sorts.get(name) {
        return Ok(Term::constant(name, sort.clone()));
    }
    Ok(Term::App {
        func: Identifier::new(name),
        args: Vec::new(),
    })
}

fn radix_literal(
    atom: &str,
    digits: &str,
    radix: u32,
    bits_per_digit: u32,
) -> Result<Term, SolverError> {
    let value = BigUint::parse_bytes(digits.as_bytes(), radix)
        .ok_or_else(|| parse_error(format!("Invalid bitvector literal: {atom}")))?;
    let width = u32::try_from(digits.len())
        .ok()
        .and_then(|n| n.checked_mul(bits_per_digit))
        .ok_or_else(|| parse_error(format!("Bitvector literal too wide: {atom}")))?;
    Ok(Term::bv(value, width))
}

/// Parse a literal value.
pub(crate) fn parse_value(sexp: &Sexp) -> Result<Value, SolverError> {
    let term = parse_term(sexp, &HashMap::new())?;
    Value::from_term(&term)
        .ok_or_else(|| parse_error(format!("Expected a literal value, got: {term}")))
}

/// Parse a `(get-model)` response.
///
/// Both `((define-fun ...) ...)` and the older `(model (define-fun ...) ...)`
/// layouts are accepted. Only nullary definitions with literal bodies are
/// kept.
pub(crate) fn parse_model(response: &Sexp) -> Result<Model, SolverError> {
    let Sexp::List(items) = response else {
        return Err(parse_error(format!("Unexpected get-model response: {response}")));
    };
    let entries = match items.first() {
        Some(Sexp::Atom(head)) if head == "model" => &items[1..],
        _ => &items[..],
    };

    let mut assignments = Vec::new();
    for entry in entries {
        let Sexp::List(parts) = entry else {
            return Err(parse_error(format!("Unexpected model entry: {entry}")));
        };
        let Some((name, params, sort, body)) = definition(parts) else {
            tracing::warn!("Ignoring unrecognized model entry: {entry}");
            continue;
        };
        if !params.is_empty() {
            tracing::debug!(name, "Skipping non-constant model entry");
            continue;
        }
        let sort = parse_sort(sort)?;
        let value = parse_value(body)?;
        let matches_sort = match (&sort, &value) {
            (Sort::Bool, Value::Bool(_)) => true,
            (Sort::BitVec(w), Value::BitVec { width, .. }) => w == width,
            _ => false,
        };
        if !matches_sort {
            tracing::warn!(name, %sort, %value, "Model value does not match declared sort");
            continue;
        }
        assignments.push((name.to_string(), value));
    }
    Ok(Model::with_assignments(assignments))
}

/// Name, parameters, sort and body of a `define-fun` model entry.
fn definition(parts: &[Sexp]) -> Option<(&str, &[Sexp], &Sexp, &Sexp)> {
    let [kw, name, params, sort, body] = parts else {
        return None;
    };
    match (kw, name, params) {
        (Sexp::Atom(kw), Sexp::Atom(name), Sexp::List(params)) if kw == "define-fun" => {
            Some((symbol(name), params.as_slice(), sort, body))
        }
        _ => None,
    }
}
