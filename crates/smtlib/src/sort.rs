/// SMT-LIB sort (type) representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Sort {
    /// Boolean sort
    Bool,
    /// Fixed-width bitvector: `(_ BitVec n)`
    BitVec(u32),
}

impl Sort {
    /// Width of a bitvector sort.
    pub fn bv_width(&self) -> Option<u32> {
        match self {
            Sort::BitVec(width) => Some(*width),
            Sort::Bool => None,
        }
    }
}
