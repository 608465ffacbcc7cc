//! The predicate interface the automaton algebra is written against.

use std::fmt::Debug;

/// An effective Boolean algebra over transition labels.
///
/// The automaton operations never look inside a predicate: they combine
/// labels through this trait and prune transitions whose label is not
/// satisfiable.
pub trait BooleanAlgebra {
    type Predicate: Copy + Eq + Debug;

    /// The predicate accepting every symbol.
    fn top(&self) -> Self::Predicate;
    /// The predicate accepting no symbol.
    fn bottom(&self) -> Self::Predicate;

    fn conjoin(&self, a: Self::Predicate, b: Self::Predicate) -> Self::Predicate;
    fn disjoin(&self, a: Self::Predicate, b: Self::Predicate) -> Self::Predicate;
    fn complement(&self, a: Self::Predicate) -> Self::Predicate;

    fn is_satisfiable(&self, a: Self::Predicate) -> bool;

    /// Whether two predicates share no symbol.
    fn is_disjoint(&self, a: Self::Predicate, b: Self::Predicate) -> bool {
        !self.is_satisfiable(self.conjoin(a, b))
    }
}
