use num_bigint::BigUint;

use crate::sort::Sort;

/// Function symbol of an application, with the numeric indices of indexed
/// identifiers: `bvadd` has none, `(_ extract 7 4)` has `[7, 4]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub symbol: String,
    pub indices: Vec<u32>,
}

impl Identifier {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            indices: Vec::new(),
        }
    }

    pub fn indexed(symbol: impl Into<String>, indices: Vec<u32>) -> Self {
        Self {
            symbol: symbol.into(),
            indices,
        }
    }

    /// The `i`-th numeric index, if present.
    pub fn index(&self, i: usize) -> Option<u32> {
        self.indices.get(i).copied()
    }
}

/// SMT-LIB term (expression) representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    // === Literals ===
    /// Boolean literal
    BoolLit(bool),
    /// Bitvector literal with unsigned value and width
    BitVecLit { value: BigUint, width: u32 },

    // === Variables ===
    /// Declared constant of the given sort
    Const { name: String, sort: Sort },

    // === Function application ===
    /// `(f arg1 arg2 ...)` or `((_ f i j) arg1 ...)`
    App { func: Identifier, args: Vec<Term> },
}

impl Term {
    pub fn bool(value: bool) -> Self {
        Term::BoolLit(value)
    }

    pub fn bv(value: impl Into<BigUint>, width: u32) -> Self {
        Term::BitVecLit {
            value: value.into(),
            width,
        }
    }

    pub fn constant(name: impl Into<String>, sort: Sort) -> Self {
        Term::Const {
            name: name.into(),
            sort,
        }
    }

    pub fn app(symbol: impl Into<String>, args: Vec<Term>) -> Self {
        Term::App {
            func: Identifier::new(symbol),
            args,
        }
    }

    pub fn indexed(symbol: impl Into<String>, indices: Vec<u32>, args: Vec<Term>) -> Self {
        Term::App {
            func: Identifier::indexed(symbol, indices),
            args,
        }
    }

    /// `(not t)`
    pub fn not(term: Term) -> Self {
        Term::app("not", vec![term])
    }

    /// `(= a b)`
    pub fn eq(lhs: Term, rhs: Term) -> Self {
        Term::app("=", vec![lhs, rhs])
    }

    /// `(distinct a b)`
    pub fn distinct(lhs: Term, rhs: Term) -> Self {
        Term::app("distinct", vec![lhs, rhs])
    }

    /// The function symbol of an application.
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Term::App { func, .. } => Some(&func.symbol),
            _ => None,
        }
    }

    /// Numeric indices of an application's identifier (empty for leaves).
    pub fn indices(&self) -> &[u32] {
        match self {
            Term::App { func, .. } => &func.indices,
            _ => &[],
        }
    }

    /// Direct children; leaves have none.
    pub fn children(&self) -> &[Term] {
        match self {
            Term::App { args, .. } => args,
            _ => &[],
        }
    }

    /// Every distinct constant in the term, in first-occurrence order.
    pub fn constants(&self) -> Vec<(&str, &Sort)> {
        let mut out: Vec<(&str, &Sort)> = Vec::new();
        let mut stack = vec![self];
        while let Some(term) = stack.pop() {
            match term {
                Term::Const { name, sort } => {
                    if !out.iter().any(|(n, _)| *n == name.as_str()) {
                        out.push((name, sort));
                    }
                }
                Term::App { args, .. } => stack.extend(args.iter().rev()),
                Term::BoolLit(_) | Term::BitVecLit { .. } => {}
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_on_leaves() {
        let x = Term::constant("x", Sort::BitVec(8));
        assert_eq!(x.symbol(), None);
        assert!(x.indices().is_empty());
        assert!(x.children().is_empty());
    }

    #[test]
    fn accessors_on_indexed_app() {
        let x = Term::constant("x", Sort::BitVec(8));
        let ext = Term::indexed("extract", vec![7, 4], vec![x.clone()]);
        assert_eq!(ext.symbol(), Some("extract"));
        assert_eq!(ext.indices(), &[7, 4]);
        assert_eq!(ext.children(), &[x]);
        match &ext {
            Term::App { func, .. } => {
                assert_eq!(func.index(0), Some(7));
                assert_eq!(func.index(1), Some(4));
                assert_eq!(func.index(2), None);
            }
            _ => panic!("expected application"),
        }
    }

    #[test]
    fn constants_are_deduplicated_in_order() {
        let x = Term::constant("x", Sort::BitVec(8));
        let y = Term::constant("y", Sort::BitVec(8));
        let t = Term::app(
            "bvadd",
            vec![x.clone(), Term::app("bvmul", vec![y.clone(), x.clone()])],
        );
        let names: Vec<&str> = t.constants().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["x", "y"]);
    }

    #[test]
    fn helper_constructors() {
        let x = Term::constant("x", Sort::BitVec(4));
        let blocked = Term::distinct(x.clone(), Term::bv(3u32, 4));
        assert_eq!(blocked.symbol(), Some("distinct"));
        let negated = Term::not(Term::bool(true));
        assert_eq!(negated.children(), &[Term::BoolLit(true)]);
        assert_eq!(Term::eq(x.clone(), x).symbol(), Some("="));
    }
}
