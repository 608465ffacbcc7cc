//! Symbolic finite automata.
//!
//! A symbolic automaton is an NFA whose transitions carry predicates from a
//! [`BooleanAlgebra`](crate::algebra::BooleanAlgebra) instead of single
//! characters. A move with no label is an epsilon move.
//!
//! # Representation
//!
//! - Moves live in an arena (`Vec<Option<Move>>`); removed moves leave a tombstone
//! - `forward` maps a state to the arena indices of its outgoing moves,
//!   `backward` to its incoming ones; every mutation keeps both in sync
//! - All collections are ordered, so iteration order (and hence sampling
//!   under a fixed seed) is deterministic
//!
//! The two degenerate languages have their own variants,
//! [`Automaton::Empty`] (no word) and [`Automaton::Epsilon`] (only the empty word).

mod compose;
mod epsilon;
mod product;

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::Debug;

pub type StateId = u32;

/// A transition. `label == None` marks an epsilon move.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Move<P> {
    pub source: StateId,
    pub target: StateId,
    pub label: Option<P>,
}

impl<P> Move<P> {
    pub fn new(source: StateId, target: StateId, label: Option<P>) -> Self {
        Self { source, target, label }
    }

    pub fn is_epsilon(&self) -> bool {
        self.label.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct Sfa<P> {
    initial: StateId,
    finals: BTreeSet<StateId>,
    states: BTreeSet<StateId>,
    moves: Vec<Option<Move<P>>>,
    forward: BTreeMap<StateId, Vec<usize>>,
    backward: BTreeMap<StateId, Vec<usize>>,
    max_state: StateId,
    is_deterministic: bool,
}

/// An automaton, with the empty language and the empty word as explicit variants.
#[derive(Debug, Clone)]
pub enum Automaton<P> {
    Empty,
    Epsilon,
    General(Sfa<P>),
}

// ============================================================================
// Sfa: construction and queries
// ============================================================================

impl<P: Copy + Eq + Debug> Sfa<P> {
    /// An automaton with a single non-final state and no moves.
    pub fn new(initial: StateId) -> Self {
        Self {
            initial,
            finals: BTreeSet::new(),
            states: BTreeSet::from([initial]),
            moves: Vec::new(),
            forward: BTreeMap::new(),
            backward: BTreeMap::new(),
            max_state: initial,
            is_deterministic: true,
        }
    }

    /// Assemble an automaton from its moves.
    ///
    /// Panics if a final state is neither the initial state nor an endpoint of a move.
    pub fn from_moves(
        initial: StateId,
        finals: impl IntoIterator<Item = StateId>,
        moves: impl IntoIterator<Item = Move<P>>,
    ) -> Self {
        let mut sfa = Self::new(initial);
        for m in moves {
            sfa.add_move(m.source, m.target, m.label);
        }
        for f in finals {
            sfa.set_final(f, true);
        }
        sfa.is_deterministic = false;
        sfa
    }

    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn finals(&self) -> &BTreeSet<StateId> {
        &self.finals
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.contains(&state)
    }

    pub fn states(&self) -> &BTreeSet<StateId> {
        &self.states
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_moves(&self) -> usize {
        self.forward.values().map(|v| v.len()).sum()
    }

    /// Highest state id ever allocated for this automaton.
    pub fn max_state(&self) -> StateId {
        self.max_state
    }

    pub fn min_state(&self) -> StateId {
        // The initial state is always present.
        *self.states.first().unwrap_or(&self.initial)
    }

    /// Advisory: set when the construction guarantees disjoint outgoing predicates.
    pub fn is_deterministic(&self) -> bool {
        self.is_deterministic
    }

    pub fn is_epsilon_free(&self) -> bool {
        self.moves().all(|m| !m.is_epsilon())
    }

    pub fn moves(&self) -> impl Iterator<Item = &Move<P>> + '_ {
        self.forward
            .values()
            .flatten()
            .filter_map(|&i| self.moves[i].as_ref())
    }

    pub fn out_moves(&self, state: StateId) -> impl Iterator<Item = &Move<P>> + '_ {
        self.forward
            .get(&state)
            .into_iter()
            .flatten()
            .filter_map(|&i| self.moves[i].as_ref())
    }

    pub fn in_moves(&self, state: StateId) -> impl Iterator<Item = &Move<P>> + '_ {
        self.backward
            .get(&state)
            .into_iter()
            .flatten()
            .filter_map(|&i| self.moves[i].as_ref())
    }

    pub fn out_degree(&self, state: StateId) -> usize {
        self.forward.get(&state).map_or(0, |v| v.len())
    }

    pub fn in_degree(&self, state: StateId) -> usize {
        self.backward.get(&state).map_or(0, |v| v.len())
    }

    /// The unique final state.
    ///
    /// Panics unless there is exactly one.
    pub fn final_state(&self) -> StateId {
        assert_eq!(
            self.finals.len(),
            1,
            "Expected exactly one final state, found {:?}",
            self.finals
        );
        *self.finals.first().unwrap_or(&self.initial)
    }

    /// The final state, if it is the only one and has no outgoing moves.
    pub fn single_final_sink(&self) -> Option<StateId> {
        if self.finals.len() != 1 {
            return None;
        }
        let f = self.final_state();
        if self.out_degree(f) == 0 {
            Some(f)
        } else {
            None
        }
    }

    /// Whether the empty word is accepted, following epsilon moves.
    pub fn accepts_empty_word(&self) -> bool {
        self.epsilon_closure(self.initial).iter().any(|s| self.is_final(*s))
    }

    /// States reachable from `state` through epsilon moves only, `state` included.
    pub fn epsilon_closure(&self, state: StateId) -> BTreeSet<StateId> {
        let mut closure = BTreeSet::from([state]);
        let mut stack = vec![state];
        while let Some(s) = stack.pop() {
            for m in self.out_moves(s) {
                if m.is_epsilon() && closure.insert(m.target) {
                    stack.push(m.target);
                }
            }
        }
        closure
    }
}

// ============================================================================
// Sfa: mutation
// ============================================================================

impl<P: Copy + Eq + Debug> Sfa<P> {
    pub(crate) fn add_state(&mut self, state: StateId) {
        self.states.insert(state);
        self.max_state = self.max_state.max(state);
    }

    /// Add a move, skipping epsilon self-loops and exact duplicates.
    pub(crate) fn add_move(&mut self, source: StateId, target: StateId, label: Option<P>) {
        self.add_state(source);
        self.add_state(target);

        if label.is_none() && source == target {
            return;
        }
        if self
            .out_moves(source)
            .any(|m| m.target == target && m.label == label)
        {
            return;
        }

        let index = self.moves.len();
        self.moves.push(Some(Move::new(source, target, label)));
        self.forward.entry(source).or_default().push(index);
        self.backward.entry(target).or_default().push(index);
    }

    pub(crate) fn remove_move(&mut self, index: usize) {
        let Some(m) = self.moves[index].take() else {
            return;
        };
        if let Some(out) = self.forward.get_mut(&m.source) {
            out.retain(|&i| i != index);
            if out.is_empty() {
                self.forward.remove(&m.source);
            }
        }
        if let Some(inc) = self.backward.get_mut(&m.target) {
            inc.retain(|&i| i != index);
            if inc.is_empty() {
                self.backward.remove(&m.target);
            }
        }
    }

    pub(crate) fn set_final(&mut self, state: StateId, value: bool) {
        assert!(
            self.states.contains(&state),
            "Final state {} is not a state of the automaton",
            state
        );
        if value {
            self.finals.insert(state);
        } else {
            self.finals.remove(&state);
        }
    }

    pub(crate) fn set_initial(&mut self, state: StateId) {
        self.add_state(state);
        self.initial = state;
    }

    pub(crate) fn set_deterministic(&mut self, value: bool) {
        self.is_deterministic = value;
    }

    /// Raise `max_state` so that ids up to `state` count as allocated.
    pub(crate) fn reserve(&mut self, state: StateId) {
        self.max_state = self.max_state.max(state);
    }

    /// Merge state `from` into `to`, redirecting every move touching `from`.
    pub(crate) fn rename_state(&mut self, from: StateId, to: StateId) {
        if from == to {
            return;
        }

        let mut touching: Vec<usize> = Vec::new();
        touching.extend(self.forward.get(&from).into_iter().flatten());
        touching.extend(self.backward.get(&from).into_iter().flatten());
        touching.sort_unstable();
        touching.dedup();

        let mut rewired = Vec::with_capacity(touching.len());
        for index in touching {
            if let Some(m) = self.moves[index] {
                rewired.push(m);
                self.remove_move(index);
            }
        }

        self.states.remove(&from);
        self.add_state(to);
        if self.finals.remove(&from) {
            self.finals.insert(to);
        }
        if self.initial == from {
            self.initial = to;
        }

        let rename = |s: StateId| if s == from { to } else { s };
        for m in rewired {
            self.add_move(rename(m.source), rename(m.target), m.label);
        }
    }

    /// Copy every state and move of `other` (but not its initial or final marks).
    pub(crate) fn extend_from(&mut self, other: &Sfa<P>) {
        for &s in other.states() {
            self.add_state(s);
        }
        for m in other.moves() {
            self.add_move(m.source, m.target, m.label);
        }
        self.reserve(other.max_state);
    }

    /// A copy with every state id shifted by `offset`.
    pub fn relabel(&self, offset: StateId) -> Sfa<P> {
        let mut res = Sfa::new(self.initial + offset);
        for &s in &self.states {
            res.add_state(s + offset);
        }
        for m in self.moves() {
            res.add_move(m.source + offset, m.target + offset, m.label);
        }
        for &f in &self.finals {
            res.set_final(f + offset, true);
        }
        res.max_state = self.max_state + offset;
        res.is_deterministic = self.is_deterministic;
        res
    }

    /// Rebuild the arena without tombstones.
    pub(crate) fn compact(&mut self) {
        let moves: Vec<Move<P>> = self.moves().copied().collect();
        self.moves.clear();
        self.forward.clear();
        self.backward.clear();
        for m in moves {
            self.add_move(m.source, m.target, m.label);
        }
    }
}

// ============================================================================
// Sfa: reachability
// ============================================================================

impl<P: Copy + Eq + Debug> Sfa<P> {
    pub fn reachable_states(&self) -> BTreeSet<StateId> {
        let mut visited = BTreeSet::from([self.initial]);
        let mut queue = VecDeque::from([self.initial]);
        while let Some(s) = queue.pop_front() {
            for m in self.out_moves(s) {
                if visited.insert(m.target) {
                    queue.push_back(m.target);
                }
            }
        }
        visited
    }

    pub fn coreachable_states(&self) -> BTreeSet<StateId> {
        let mut visited: BTreeSet<StateId> = self.finals.clone();
        let mut queue: VecDeque<StateId> = self.finals.iter().copied().collect();
        while let Some(s) = queue.pop_front() {
            for m in self.in_moves(s) {
                if visited.insert(m.source) {
                    queue.push_back(m.source);
                }
            }
        }
        visited
    }

    /// Keep only the states in `keep`, dropping every move touching any other state.
    fn restrict_to(&self, keep: &BTreeSet<StateId>) -> Sfa<P> {
        let mut res = Sfa::new(self.initial);
        for m in self.moves() {
            if keep.contains(&m.source) && keep.contains(&m.target) {
                res.add_move(m.source, m.target, m.label);
            }
        }
        for &f in &self.finals {
            if keep.contains(&f) {
                res.add_state(f);
                res.set_final(f, true);
            }
        }
        res.max_state = self.max_state;
        res.is_deterministic = self.is_deterministic;
        res
    }
}

// ============================================================================
// Automaton
// ============================================================================

impl<P: Copy + Eq + Debug> Automaton<P> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Automaton::Empty)
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Automaton::Epsilon)
    }

    pub fn as_sfa(&self) -> Option<&Sfa<P>> {
        match self {
            Automaton::General(sfa) => Some(sfa),
            _ => None,
        }
    }

    pub fn num_states(&self) -> usize {
        match self {
            Automaton::Empty => 0,
            Automaton::Epsilon => 1,
            Automaton::General(sfa) => sfa.num_states(),
        }
    }

    pub fn num_moves(&self) -> usize {
        match self {
            Automaton::General(sfa) => sfa.num_moves(),
            _ => 0,
        }
    }

    pub fn max_state(&self) -> Option<StateId> {
        self.as_sfa().map(|sfa| sfa.max_state())
    }

    pub fn accepts_empty_word(&self) -> bool {
        match self {
            Automaton::Empty => false,
            Automaton::Epsilon => true,
            Automaton::General(sfa) => sfa.accepts_empty_word(),
        }
    }

    /// Drop states that are unreachable from the initial state or cannot reach a final state.
    pub fn trim(self) -> Automaton<P> {
        let sfa = match self {
            Automaton::General(sfa) => sfa,
            other => return other,
        };

        let reachable = sfa.reachable_states();
        let coreachable = sfa.coreachable_states();
        if !coreachable.contains(&sfa.initial) {
            return Automaton::Empty;
        }

        let keep: BTreeSet<StateId> = reachable.intersection(&coreachable).copied().collect();
        let trimmed = sfa.restrict_to(&keep);
        if trimmed.num_moves() == 0 && trimmed.is_final(trimmed.initial) {
            return Automaton::Epsilon;
        }
        Automaton::General(trimmed)
    }
}


#[cfg(test)]
mod tests {
    use test_log::test;

    use super::testing::*;
    use super::*;

    fn chain() -> Sfa<u64> {
        // 0 -a-> 1 -b-> 2
        Sfa::from_moves(
            0,
            [2],
            [Move::new(0, 1, Some(sym(0))), Move::new(1, 2, Some(sym(1)))],
        )
    }

    #[test]
    fn test_indices_in_sync() {
        let mut sfa = chain();
        assert_eq!(sfa.num_states(), 3);
        assert_eq!(sfa.num_moves(), 2);
        assert_eq!(sfa.out_degree(0), 1);
        assert_eq!(sfa.in_degree(2), 1);

        sfa.remove_move(0);
        assert_eq!(sfa.num_moves(), 1);
        assert_eq!(sfa.out_degree(0), 0);
        assert_eq!(sfa.in_degree(1), 0);
        assert_eq!(sfa.in_moves(2).count(), 1);
    }

    #[test]
    fn test_duplicate_moves_skipped() {
        let mut sfa = chain();
        sfa.add_move(0, 1, Some(sym(0)));
        sfa.add_move(1, 1, None);
        assert_eq!(sfa.num_moves(), 2);
        assert!(sfa.is_epsilon_free());
        sfa.add_move(1, 2, None);
        assert!(!sfa.is_epsilon_free());
    }

    #[test]
    fn test_rename_state() {
        let mut sfa = chain();
        sfa.rename_state(2, 0);
        assert!(sfa.is_final(0));
        assert_eq!(sfa.num_states(), 2);
        assert_eq!(sfa.in_degree(0), 1);
        let a = Automaton::General(sfa);
        assert!(accepts(&a, &[]));
        assert!(accepts(&a, &[0, 1, 0, 1]));
        assert!(!accepts(&a, &[0]));
    }

    #[test]
    fn test_relabel() {
        let sfa = chain().relabel(10);
        assert_eq!(sfa.initial(), 10);
        assert_eq!(sfa.final_state(), 12);
        assert_eq!(sfa.max_state(), 12);
        assert_eq!(sfa.min_state(), 10);
        assert!(accepts(&Automaton::General(sfa), &[0, 1]));
    }

    #[test]
    fn test_single_final_sink() {
        let sfa = chain();
        assert_eq!(sfa.single_final_sink(), Some(2));

        let mut looping = chain();
        looping.add_move(2, 2, Some(sym(3)));
        assert_eq!(looping.single_final_sink(), None);
    }

    #[test]
    #[should_panic(expected = "not a state")]
    fn test_final_must_be_state() {
        let mut sfa = chain();
        sfa.set_final(7, true);
    }

    #[test]
    #[should_panic(expected = "exactly one final state")]
    fn test_final_state_requires_one() {
        let sfa: Sfa<u64> = Sfa::new(0);
        sfa.final_state();
    }

    #[test]
    fn test_trim() {
        // 0 -a-> 1 -b-> 2 (final), 0 -c-> 3 (dead end), 4 -a-> 2 (unreachable)
        let sfa = Sfa::from_moves(
            0,
            [2],
            [
                Move::new(0, 1, Some(sym(0))),
                Move::new(1, 2, Some(sym(1))),
                Move::new(0, 3, Some(sym(2))),
                Move::new(4, 2, Some(sym(0))),
            ],
        );
        let trimmed = Automaton::General(sfa).trim();
        assert_eq!(trimmed.num_states(), 3);
        assert_eq!(trimmed.num_moves(), 2);
        assert_language(&trimmed, &[0, 1, 2], 3, |w| w == [0, 1]);
    }

    #[test]
    fn test_trim_to_degenerate() {
        let dead: Sfa<u64> = Sfa::from_moves(0, [], [Move::new(0, 1, Some(sym(0)))]);
        assert!(Automaton::General(dead).trim().is_empty());

        let mut only_initial: Sfa<u64> = Sfa::from_moves(0, [0], [Move::new(1, 0, Some(sym(0)))]);
        only_initial.add_state(5);
        assert!(Automaton::General(only_initial).trim().is_epsilon());
    }

    #[test]
    fn test_compact() {
        let mut sfa = chain();
        sfa.add_move(0, 2, Some(sym(4)));
        sfa.remove_move(0);
        sfa.compact();
        assert_eq!(sfa.num_moves(), 2);
        assert!(accepts(&Automaton::General(sfa), &[4]));
    }
}
