use std::fmt;

/// Abstract operator identifiers.
///
/// The three indexed operators carry their numeric parameters inline; every
/// other operator is fully described by its tag and its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // === Bitvector arithmetic ===
    Add,
    Sub,
    Mul,
    /// Signed division.
    SDiv,
    /// Signed remainder (sign follows the divisor).
    SMod,
    /// Two's complement negation.
    Neg,

    // === Bitvector bitwise ===
    BvAnd,
    BvOr,
    BvXor,
    BvNot,
    Shl,
    /// Logical shift right.
    LShr,
    /// Arithmetic shift right.
    AShr,

    // === Bitvector structure ===
    /// Concatenation, most significant operand first.
    Concat,
    /// Bits `hi..=lo` of the operand.
    Extract { hi: u32, lo: u32 },
    /// Sign-extend the operand by the given number of bits.
    SignExtend(u32),
    /// Zero-extend the operand by the given number of bits.
    ZeroExtend(u32),

    // === Core ===
    Eq,
    Ne,

    // === Bitvector comparison (signed) ===
    SGt,
    SGe,
    SLt,
    SLe,

    // === Bitvector comparison (unsigned) ===
    UGt,
    UGe,
    ULt,
    ULe,

    // === Logical connectives ===
    And,
    Or,
    Not,
    If,
}

/// Number of arguments an operator accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    /// Whether `count` arguments satisfy this arity.
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(n) => count >= n,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "exactly {n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
        }
    }
}

impl Op {
    pub fn arity(self) -> Arity {
        match self {
            Op::Neg | Op::BvNot | Op::Not => Arity::Exactly(1),
            Op::Extract { .. } | Op::SignExtend(_) | Op::ZeroExtend(_) => Arity::Exactly(1),
            Op::Concat => Arity::AtLeast(1),
            Op::And | Op::Or => Arity::AtLeast(2),
            Op::If => Arity::Exactly(3),
            _ => Arity::Exactly(2),
        }
    }

    /// Comparisons and connectives produce booleans; everything else a bitvector.
    pub fn is_predicate(self) -> bool {
        matches!(
            self,
            Op::Eq
                | Op::Ne
                | Op::SGt
                | Op::SGe
                | Op::SLt
                | Op::SLe
                | Op::UGt
                | Op::UGe
                | Op::ULt
                | Op::ULe
                | Op::And
                | Op::Or
                | Op::Not
        )
    }

    /// Short mnemonic used when printing abstract trees.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Mul => "mul",
            Op::SDiv => "sdiv",
            Op::SMod => "smod",
            Op::Neg => "neg",
            Op::BvAnd => "bvand",
            Op::BvOr => "bvor",
            Op::BvXor => "bvxor",
            Op::BvNot => "bvnot",
            Op::Shl => "shl",
            Op::LShr => "lshr",
            Op::AShr => "ashr",
            Op::Concat => "concat",
            Op::Extract { .. } => "extract",
            Op::SignExtend(_) => "sext",
            Op::ZeroExtend(_) => "zext",
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::SGt => "sgt",
            Op::SGe => "sge",
            Op::SLt => "slt",
            Op::SLe => "sle",
            Op::UGt => "ugt",
            Op::UGe => "uge",
            Op::ULt => "ult",
            Op::ULe => "ule",
            Op::And => "and",
            Op::Or => "or",
            Op::Not => "not",
            Op::If => "if",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Extract { hi, lo } => write!(f, "extract[{hi}:{lo}]"),
            Op::SignExtend(n) => write!(f, "sext[{n}]"),
            Op::ZeroExtend(n) => write!(f, "zext[{n}]"),
            other => f.write_str(other.mnemonic()),
        }
    }
}
