use std::fmt::{Display, Formatter};

/// Handle to a predicate node owned by a [`CharSetSolver`][crate::solver::CharSetSolver].
///
/// Thanks to hash consing, two handles from the same solver are equal
/// if and only if they denote the same set of characters.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ref(u32);

impl Ref {
    /// The `False` terminal (empty character set).
    pub const ZERO: Ref = Ref(0);
    /// The `True` terminal (every character code).
    pub const ONE: Ref = Ref(1);

    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the index of the node in the solver's arena.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_one(self) -> bool {
        self.0 == 1
    }

    pub const fn is_terminal(self) -> bool {
        self.0 <= 1
    }
}

impl Display for Ref {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            0 => write!(f, "⊥"),
            1 => write!(f, "⊤"),
            i => write!(f, "@{}", i),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminals() {
        assert!(Ref::ZERO.is_zero());
        assert!(Ref::ONE.is_one());
        assert!(Ref::ZERO.is_terminal());
        assert!(Ref::ONE.is_terminal());
        assert!(!Ref::new(2).is_terminal());
    }

    #[test]
    fn test_display() {
        assert_eq!(Ref::ZERO.to_string(), "⊥");
        assert_eq!(Ref::ONE.to_string(), "⊤");
        assert_eq!(Ref::new(42).to_string(), "@42");
    }
}
