use std::fmt;

use num_bigint::BigUint;
use symsolve_smtlib::term::Term;

/// A concrete value produced by the solver.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Bool(bool),
    BitVec { value: BigUint, width: u32 },
}

impl Value {
    pub fn bv(value: impl Into<BigUint>, width: u32) -> Self {
        Value::BitVec {
            value: value.into(),
            width,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::BitVec { .. } => None,
        }
    }

    /// Unsigned value of a bitvector.
    pub fn as_biguint(&self) -> Option<&BigUint> {
        match self {
            Value::BitVec { value, .. } => Some(value),
            Value::Bool(_) => None,
        }
    }

    /// Unsigned value of a bitvector, if it fits in 64 bits.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_biguint().and_then(|v| u64::try_from(v).ok())
    }

    /// The literal term denoting this value.
    pub fn to_term(&self) -> Term {
        match self {
            Value::Bool(b) => Term::BoolLit(*b),
            Value::BitVec { value, width } => Term::bv(value.clone(), *width),
        }
    }

    /// Interpret a literal term as a value.
    pub fn from_term(term: &Term) -> Option<Self> {
        match term {
            Term::BoolLit(b) => Some(Value::Bool(*b)),
            Term::BitVecLit { value, width } => Some(Value::bv(value.clone(), *width)),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::BitVec { value, width } => write!(f, "{value}:{width}"),
        }
    }
}

/// A satisfying assignment from the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    /// Variable assignments: `(name, value)` pairs.
    pub assignments: Vec<(String, Value)>,
}

impl Model {
    /// Create a new empty model.
    pub fn new() -> Self {
        Self {
            assignments: Vec::new(),
        }
    }

    /// Create a model from assignment pairs.
    pub fn with_assignments(assignments: Vec<(String, Value)>) -> Self {
        Self { assignments }
    }

    /// Look up a variable's value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.assignments
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Look up a bitvector variable's unsigned value.
    pub fn get_bv(&self, name: &str) -> Option<&BigUint> {
        self.get(name).and_then(Value::as_biguint)
    }

    /// Return the number of assignments.
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Return whether the model is empty.
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}
