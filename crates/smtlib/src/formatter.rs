//! SMT-LIB2 text formatting for AST types.
//!
//! Implements `Display` for [`Sort`], [`Identifier`], [`Term`] and
//! [`Command`], producing SMT-LIB2 text that solvers such as Z3 accept.

use std::borrow::Cow;
use std::fmt;

use crate::command::Command;
use crate::sort::Sort;
use crate::term::{Identifier, Term};

// ---------------------------------------------------------------------------
// Symbols
// ---------------------------------------------------------------------------

/// Characters allowed in a simple symbol besides ASCII letters and digits.
const SYMBOL_PUNCTUATION: &str = "~!@$%^&*_-+=<>.?/";

/// Reserved words and command names, which only parse as symbols when quoted.
const RESERVED_WORDS: &[&str] = &[
    "!",
    "_",
    "as",
    "BINARY",
    "DECIMAL",
    "exists",
    "forall",
    "HEXADECIMAL",
    "let",
    "match",
    "NUMERAL",
    "par",
    "STRING",
    "assert",
    "check-sat",
    "check-sat-assuming",
    "declare-const",
    "declare-datatype",
    "declare-datatypes",
    "declare-fun",
    "declare-sort",
    "define-fun",
    "define-fun-rec",
    "define-funs-rec",
    "define-sort",
    "echo",
    "exit",
    "get-assertions",
    "get-assignment",
    "get-info",
    "get-model",
    "get-option",
    "get-proof",
    "get-unsat-assumptions",
    "get-unsat-core",
    "get-value",
    "pop",
    "push",
    "reset",
    "reset-assertions",
    "set-info",
    "set-logic",
    "set-option",
];

/// Whether `name` is an SMT-LIB simple symbol that needs no quoting.
pub fn is_simple_symbol(name: &str) -> bool {
    let mut chars = name.chars();
    let well_formed = match chars.next() {
        None => false,
        Some(c) if c.is_ascii_digit() => false,
        Some(c) => std::iter::once(c)
            .chain(chars)
            .all(|c| c.is_ascii_alphanumeric() || SYMBOL_PUNCTUATION.contains(c)),
    };
    well_formed && !RESERVED_WORDS.contains(&name)
}

/// Render `name` as a symbol, quoting it as `|name|` when required.
///
/// Returns `None` for names that cannot be represented at all: quoted symbols
/// may not contain `|` or `\`.
pub fn quote_symbol(name: &str) -> Option<Cow<'_, str>> {
    if is_simple_symbol(name) {
        Some(Cow::Borrowed(name))
    } else if name.contains(['|', '\\']) {
        None
    } else {
        Some(Cow::Owned(format!("|{name}|")))
    }
}

fn fmt_symbol(name: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match quote_symbol(name) {
        Some(quoted) => f.write_str(&quoted),
        // Unrepresentable; the translator rejects these before they get here.
        None => write!(f, "|{}|", name.replace(['|', '\\'], "_")),
    }
}

// ---------------------------------------------------------------------------
// Sort
// ---------------------------------------------------------------------------

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sort::Bool => write!(f, "Bool"),
            Sort::BitVec(width) => write!(f, "(_ BitVec {width})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Term
// ---------------------------------------------------------------------------

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.indices.is_empty() {
            return f.write_str(&self.symbol);
        }
        write!(f, "(_ {}", self.symbol)?;
        for index in &self.indices {
            write!(f, " {index}")?;
        }
        write!(f, ")")
    }
}

/// Write a space-separated list of terms.
fn fmt_term_list(terms: &[Term], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, t) in terms.iter().enumerate() {
        if i > 0 {
            write!(f, " ")?;
        }
        write!(f, "{t}")?;
    }
    Ok(())
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::BoolLit(true) => write!(f, "true"),
            Term::BoolLit(false) => write!(f, "false"),
            Term::BitVecLit { value, width } => write!(f, "(_ bv{value} {width})"),
            Term::Const { name, .. } => fmt_symbol(name, f),
            Term::App { func, args } => {
                if args.is_empty() {
                    write!(f, "{func}")
                } else {
                    write!(f, "({func} ")?;
                    fmt_term_list(args, f)?;
                    write!(f, ")")
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::DeclareConst(name, sort) => {
                write!(f, "(declare-const ")?;
                fmt_symbol(name, f)?;
                write!(f, " {sort})")
            }
            Command::Simplify(term) => write!(f, "(simplify {term})"),
            Command::Exit => write!(f, "(exit)"),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
