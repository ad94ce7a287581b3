use crate::sort::Sort;
use crate::term::Term;

/// SMT-LIB commands for one-shot scripts.
///
/// Incremental commands go through the interactive session instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `(declare-const name sort)`
    DeclareConst(String, Sort),
    /// `(simplify term)` (Z3 extension)
    Simplify(Term),
    /// `(exit)`
    Exit,
}
