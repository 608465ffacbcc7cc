//! Structural composition: literals, concatenation, union and repetition.

use std::fmt::Debug;

use log::{debug, trace};

use super::{Automaton, Sfa, StateId};
use crate::algebra::BooleanAlgebra;

impl<P: Copy + Eq + Debug> Automaton<P> {
    /// A single transition `start -p-> start + 1`.
    ///
    /// `free_prefix` puts an `any` self-loop on the initial state and
    /// `free_suffix` one on the final state.
    pub fn from_predicate<A>(
        start: StateId,
        predicate: P,
        free_prefix: bool,
        free_suffix: bool,
        any: P,
        algebra: &A,
    ) -> Self
    where
        A: BooleanAlgebra<Predicate = P>,
    {
        Self::from_predicates(start, &[predicate], free_prefix, free_suffix, any, algebra)
    }

    /// A chain `start -p0-> start + 1 -p1-> ... -> start + n`.
    pub fn from_predicates<A>(
        start: StateId,
        predicates: &[P],
        free_prefix: bool,
        free_suffix: bool,
        any: P,
        algebra: &A,
    ) -> Self
    where
        A: BooleanAlgebra<Predicate = P>,
    {
        if predicates.iter().any(|&p| !algebra.is_satisfiable(p)) {
            return Automaton::Empty;
        }
        if predicates.is_empty() {
            if free_prefix || free_suffix {
                return Self::free_loop(start, any);
            }
            return Automaton::Epsilon;
        }

        let mut sfa = Sfa::new(start);
        let mut state = start;
        for &p in predicates {
            sfa.add_move(state, state + 1, Some(p));
            state += 1;
        }
        sfa.set_final(state, true);
        if free_prefix {
            sfa.add_move(start, start, Some(any));
        }
        if free_suffix {
            sfa.add_move(state, state, Some(any));
        }
        sfa.set_deterministic(!free_prefix && !free_suffix);
        Automaton::General(sfa)
    }

    /// One state, both initial and final, with an `any` self-loop.
    pub fn free_loop(start: StateId, any: P) -> Self {
        let mut sfa = Sfa::new(start);
        sfa.add_move(start, start, Some(any));
        sfa.set_final(start, true);
        Automaton::General(sfa)
    }

    /// Language concatenation. State ids of the operands must be disjoint.
    pub fn concat(self, other: Automaton<P>) -> Self {
        match (self, other) {
            (Automaton::Empty, _) | (_, Automaton::Empty) => Automaton::Empty,
            (Automaton::Epsilon, b) => b,
            (a, Automaton::Epsilon) => a,
            (Automaton::General(a), Automaton::General(b)) => concat_sfa(a, b),
        }
    }

    pub fn concat_many(operands: impl IntoIterator<Item = Automaton<P>>) -> Self {
        let mut res = Automaton::Epsilon;
        for op in operands {
            res = res.concat(op);
            if res.is_empty() {
                break;
            }
        }
        res
    }

    /// Language union. State ids of the operands must be disjoint.
    pub fn alternate<A>(operands: Vec<Automaton<P>>, algebra: &A) -> Self
    where
        A: BooleanAlgebra<Predicate = P>,
    {
        let mut has_empty = false;
        let mut parts = Vec::with_capacity(operands.len());
        for op in operands {
            match op {
                Automaton::Empty => {}
                Automaton::Epsilon => has_empty = true,
                Automaton::General(sfa) => parts.push(sfa),
            }
        }

        if parts.is_empty() {
            return if has_empty { Automaton::Epsilon } else { Automaton::Empty };
        }
        if parts.len() == 1 && !has_empty {
            if let Some(sfa) = parts.pop() {
                return Automaton::General(sfa);
            }
        }

        let start = parts.iter().map(|s| s.max_state()).max().unwrap_or(0) + 1;
        let sink = start + 1;

        let merge_initials = parts.iter().all(|s| s.in_degree(s.initial()) == 0);
        let merge_sinks = parts
            .iter()
            .all(|s| s.single_final_sink().is_some_and(|f| f != s.initial()));
        let deterministic = merge_initials
            && parts.iter().all(|s| s.is_deterministic())
            && first_moves_disjoint(&parts, algebra);

        trace!(
            "alternate: {} parts, merge_initials = {}, merge_sinks = {}, has_empty = {}",
            parts.len(),
            merge_initials,
            merge_sinks,
            has_empty
        );

        let mut res = Sfa::new(start);
        for sfa in &parts {
            let rename = |s: StateId| {
                if merge_initials && s == sfa.initial() {
                    start
                } else if merge_sinks && sfa.is_final(s) {
                    sink
                } else {
                    s
                }
            };
            for &s in sfa.states() {
                res.add_state(rename(s));
            }
            for m in sfa.moves() {
                res.add_move(rename(m.source), rename(m.target), m.label);
            }
            for &f in sfa.finals() {
                res.set_final(rename(f), true);
            }
            if !merge_initials {
                res.add_move(start, sfa.initial(), None);
            }
        }
        if has_empty {
            res.set_final(start, true);
        }
        res.reserve(sink);
        res.set_deterministic(deterministic);
        Automaton::General(res)
    }

    /// Accept the empty word as well.
    pub fn optional(self) -> Self {
        match self {
            Automaton::Empty | Automaton::Epsilon => Automaton::Epsilon,
            Automaton::General(mut sfa) => {
                if sfa.in_degree(sfa.initial()) > 0 {
                    sfa.add_bypass();
                }
                let initial = sfa.initial();
                sfa.set_final(initial, true);
                Automaton::General(sfa)
            }
        }
    }

    /// Kleene star.
    pub fn kleene_closure<A>(self, algebra: &A) -> Self
    where
        A: BooleanAlgebra<Predicate = P>,
    {
        let mut sfa = match self {
            Automaton::Empty | Automaton::Epsilon => return Automaton::Epsilon,
            Automaton::General(sfa) => sfa,
        };

        let initial = sfa.initial();

        // Already closed: every accepted path ends back at the initial state
        if sfa.finals().len() == 1 && sfa.is_final(initial) {
            trace!("kleene_closure: already closed");
            return Automaton::General(sfa);
        }

        // Source initial state and a single final sink: fold the sink into the initial state
        if sfa.in_degree(initial) == 0 {
            if let Some(sink) = sfa.single_final_sink() {
                trace!("kleene_closure: folding sink {} into {}", sink, initial);
                sfa.rename_state(sink, initial);
                return Automaton::General(sfa);
            }
        }

        if sfa.in_degree(initial) > 0 {
            sfa.add_bypass();
        }
        let initial = sfa.initial();
        let finals: Vec<StateId> = sfa.finals().iter().copied().collect();
        sfa.set_final(initial, true);
        for f in finals {
            sfa.add_move(f, initial, None);
        }
        sfa.set_deterministic(false);
        sfa.collapse_epsilon_cycles(algebra);
        Automaton::General(sfa)
    }

    /// Repetition `{min, max}`; `max == None` is unbounded.
    pub fn bounded_repeat<A>(self, min: u32, max: Option<u32>, algebra: &A) -> Self
    where
        A: BooleanAlgebra<Predicate = P>,
    {
        if let Some(max) = max {
            assert!(min <= max, "Invalid repetition bounds {{{},{}}}", min, max);
        }

        match (min, max) {
            (0, None) => return self.kleene_closure(algebra),
            (0, Some(0)) => return Automaton::Epsilon,
            (1, Some(1)) => return self,
            (0, Some(1)) => return self.optional(),
            _ => {}
        }

        let sfa = match self {
            Automaton::Empty => {
                return if min == 0 { Automaton::Epsilon } else { Automaton::Empty };
            }
            Automaton::Epsilon => return Automaton::Epsilon,
            Automaton::General(sfa) => sfa,
        };

        debug!(
            "bounded_repeat(min = {}, max = {:?}) over {} states",
            min,
            max,
            sfa.num_states()
        );

        // One spare id per copy for a bypass state
        let span = sfa.max_state() - sfa.min_state() + 2;
        let copy = |i: u32| -> Automaton<P> {
            if i == 0 {
                Automaton::General(sfa.clone())
            } else {
                Automaton::General(sfa.relabel(i * span))
            }
        };

        let mut res = Automaton::Epsilon;
        for i in 0..min {
            res = res.concat(copy(i));
        }
        match max {
            None => {
                res = res.concat(copy(min).kleene_closure(algebra));
            }
            Some(max) => {
                for i in min..max {
                    res = res.concat(copy(i).optional());
                }
            }
        }
        res
    }
}

impl<P: Copy + Eq + Debug> Sfa<P> {
    /// Make a fresh initial state with copies of the old initial state's outgoing moves.
    pub(crate) fn add_bypass(&mut self) {
        let old = self.initial();
        let fresh = self.max_state() + 1;
        let moves: Vec<_> = self.out_moves(old).copied().collect();
        self.set_initial(fresh);
        for m in moves {
            self.add_move(fresh, m.target, m.label);
        }
        if self.is_final(old) {
            self.set_final(fresh, true);
        }
    }
}

fn concat_sfa<P: Copy + Eq + Debug>(mut a: Sfa<P>, b: Sfa<P>) -> Automaton<P> {
    debug_assert!(
        a.states().is_disjoint(b.states()),
        "concatenated automata must not share states"
    );

    let deterministic = a.is_deterministic() && b.is_deterministic();

    if let Some(sink) = a.single_final_sink() {
        if sink == a.initial() {
            // Nothing leaves the initial state, so `a` accepts only the empty word
            return Automaton::General(b);
        }

        // Rewire: the sink of `a` takes the place of the initial state of `b`
        a.set_final(sink, false);
        let rename = |s: StateId| if s == b.initial() { sink } else { s };
        for &s in b.states() {
            a.add_state(rename(s));
        }
        for m in b.moves() {
            a.add_move(rename(m.source), rename(m.target), m.label);
        }
        for &f in b.finals() {
            a.set_final(rename(f), true);
        }
        a.reserve(b.max_state());
        a.set_deterministic(deterministic);
    } else {
        let finals: Vec<StateId> = a.finals().iter().copied().collect();
        a.extend_from(&b);
        for f in finals {
            a.set_final(f, false);
            a.add_move(f, b.initial(), None);
        }
        for &f in b.finals() {
            a.set_final(f, true);
        }
        a.set_deterministic(false);
    }

    Automaton::General(a)
}

fn first_moves_disjoint<P, A>(parts: &[Sfa<P>], algebra: &A) -> bool
where
    P: Copy + Eq + Debug,
    A: BooleanAlgebra<Predicate = P>,
{
    let mut seen: Vec<P> = Vec::new();
    for sfa in parts {
        for m in sfa.out_moves(sfa.initial()) {
            let Some(p) = m.label else {
                return false;
            };
            if seen.iter().any(|&q| !algebra.is_disjoint(p, q)) {
                return false;
            }
            seen.push(p);
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::super::testing::*;
    use super::*;

    fn lit(start: StateId, s: u32) -> Automaton<u64> {
        Automaton::from_predicate(start, sym(s), false, false, u64::MAX, &BitAlgebra)
    }

    fn word(start: StateId, w: &[u32]) -> Automaton<u64> {
        let preds: Vec<u64> = w.iter().map(|&s| sym(s)).collect();
        Automaton::from_predicates(start, &preds, false, false, u64::MAX, &BitAlgebra)
    }

    #[test]
    fn test_from_predicate() {
        let a = lit(0, 1);
        assert_eq!(a.num_states(), 2);
        assert!(a.as_sfa().is_some_and(|s| s.is_deterministic()));
        assert_language(&a, &[0, 1], 3, |w| w == [1]);

        assert!(Automaton::from_predicate(0, 0, false, false, u64::MAX, &BitAlgebra).is_empty());
    }

    #[test]
    fn test_from_predicate_free_edges() {
        let a = Automaton::from_predicate(0, sym(1), true, true, sym(0) | sym(1), &BitAlgebra);
        assert_language(&a, &[0, 1, 2], 4, |w| w.contains(&1) && !w.contains(&2));

        let prefix_only = Automaton::from_predicate(0, sym(1), true, false, sym(0) | sym(1), &BitAlgebra);
        assert_language(&prefix_only, &[0, 1], 4, |w| w.last() == Some(&1));
    }

    #[test]
    fn test_from_empty_chain() {
        assert!(Automaton::from_predicates(0, &[], false, false, u64::MAX, &BitAlgebra).is_epsilon());
        let free = Automaton::from_predicates(0, &[], true, false, sym(0), &BitAlgebra);
        assert_language(&free, &[0, 1], 3, |w| w.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_concat_sink_rewiring() {
        let ab = lit(0, 0).concat(lit(2, 1));
        // The sink of the first operand is reused
        assert_eq!(ab.num_states(), 3);
        assert!(ab.as_sfa().is_some_and(|s| s.is_epsilon_free()));
        assert_language(&ab, &[0, 1], 3, |w| w == [0, 1]);
    }

    #[test]
    fn test_concat_with_epsilon_moves() {
        // (a|b)* has its final at the initial state, so no sink rewiring
        let star = Automaton::alternate(vec![lit(0, 0), lit(2, 1)], &BitAlgebra).kleene_closure(&BitAlgebra);
        let c = lit(10, 2);
        let res = star.concat(c);
        assert_language(&res, &[0, 1, 2], 4, |w| {
            w.last() == Some(&2) && w[..w.len() - 1].iter().all(|&x| x != 2)
        });
    }

    #[test]
    fn test_concat_degenerate() {
        assert!(lit(0, 0).concat(Automaton::Empty).is_empty());
        assert!(Automaton::<u64>::Empty.concat(lit(0, 0)).is_empty());
        let a = Automaton::Epsilon.concat(lit(0, 0));
        assert_language(&a, &[0, 1], 2, |w| w == [0]);
        let many = Automaton::concat_many([lit(0, 0), Automaton::Epsilon, lit(2, 1), lit(4, 0)]);
        assert_language(&many, &[0, 1], 4, |w| w == [0, 1, 0]);
    }

    #[test]
    fn test_alternate_merges() {
        let a = Automaton::alternate(vec![word(0, &[0, 1]), word(3, &[1]), word(5, &[2, 2])], &BitAlgebra);
        let sfa = a.as_sfa().cloned().unwrap();
        // Merged start and merged sink
        assert_eq!(sfa.num_states(), 4);
        assert_eq!(sfa.finals().len(), 1);
        assert!(sfa.is_epsilon_free());
        assert!(sfa.is_deterministic());
        assert_language(&a, &[0, 1, 2], 3, |w| w == [0, 1] || w == [1] || w == [2, 2]);
    }

    #[test]
    fn test_alternate_overlapping_first_moves() {
        let a = Automaton::alternate(vec![word(0, &[0, 1]), word(3, &[0, 2])], &BitAlgebra);
        assert!(a.as_sfa().is_some_and(|s| !s.is_deterministic()));
        assert_language(&a, &[0, 1, 2], 3, |w| w == [0, 1] || w == [0, 2]);
    }

    #[test]
    fn test_alternate_with_empty_and_epsilon() {
        let a = Automaton::alternate(vec![Automaton::Empty, lit(0, 0), Automaton::Epsilon], &BitAlgebra);
        assert_language(&a, &[0, 1], 3, |w| w.is_empty() || w == [0]);

        assert!(Automaton::<u64>::alternate(vec![Automaton::Empty, Automaton::Empty], &BitAlgebra).is_empty());
        assert!(Automaton::<u64>::alternate(vec![Automaton::Epsilon, Automaton::Empty], &BitAlgebra).is_epsilon());
    }

    #[test]
    fn test_alternate_fan_out() {
        // The first operand loops back into its initial state
        let star = lit(0, 0).kleene_closure(&BitAlgebra).concat(lit(5, 1));
        let a = Automaton::alternate(vec![star, lit(10, 2)], &BitAlgebra);
        assert_language(&a, &[0, 1, 2], 4, |w| {
            w == [2] || (w.last() == Some(&1) && w[..w.len() - 1].iter().all(|&x| x == 0))
        });
    }

    #[test]
    fn test_kleene_fold_sink() {
        let a = word(0, &[0, 1]).kleene_closure(&BitAlgebra);
        assert_eq!(a.num_states(), 2);
        assert_language(&a, &[0, 1], 6, |w| w.len() % 2 == 0 && w.chunks(2).all(|c| c == [0, 1]));
    }

    #[test]
    fn test_kleene_already_closed() {
        let star = lit(0, 0).kleene_closure(&BitAlgebra);
        let n = star.num_states();
        let again = star.kleene_closure(&BitAlgebra);
        assert_eq!(again.num_states(), n);
        assert_language(&again, &[0, 1], 4, |w| w.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_kleene_general_case() {
        // (ab?)* : two finals, so the general construction applies
        let ab_opt = lit(0, 0).concat(lit(2, 1).optional());
        assert_eq!(ab_opt.as_sfa().map(|s| s.finals().len()), Some(2));
        let a = ab_opt.kleene_closure(&BitAlgebra);
        let expected = |w: &[u32]| {
            // every 1 is preceded by a 0 and no two 1s are adjacent
            w.iter().enumerate().all(|(i, &c)| c == 0 || (i > 0 && w[i - 1] == 0))
        };
        assert_language(&a, &[0, 1], 6, expected);
    }

    #[test]
    fn test_kleene_with_incoming_initial() {
        // (a*b)* needs a bypass state
        let inner = lit(0, 0).kleene_closure(&BitAlgebra).concat(lit(3, 1));
        let a = inner.kleene_closure(&BitAlgebra);
        assert_language(&a, &[0, 1], 6, |w| w.is_empty() || w.last() == Some(&1));
    }

    #[test]
    fn test_kleene_collapses_epsilon_cycles() {
        // (a?)* : the epsilon back-edge closes a cycle through the optional's accepting initial
        let a = lit(0, 0).optional().concat(lit(5, 1).optional());
        let star = a.kleene_closure(&BitAlgebra);
        let sfa = star.as_sfa().cloned().unwrap();
        for s in sfa.states() {
            let closure = sfa.epsilon_closure(*s);
            for t in &closure {
                if t != s {
                    assert!(!sfa.epsilon_closure(*t).contains(s), "epsilon cycle between {} and {}", s, t);
                }
            }
        }
        assert_language(&star, &[0, 1, 2], 4, |w| w.iter().all(|&c| c != 2));
    }

    #[test]
    fn test_optional() {
        let a = word(0, &[0, 1]).optional();
        assert_language(&a, &[0, 1], 3, |w| w.is_empty() || w == [0, 1]);

        // With incoming moves on the initial state a bypass is needed
        let star = word(0, &[0, 1]).kleene_closure(&BitAlgebra).concat(lit(5, 2));
        let opt = star.optional();
        assert_language(&opt, &[0, 1, 2], 5, |w| {
            w.is_empty() || (w.last() == Some(&2) && w[..w.len() - 1].chunks(2).all(|c| c == [0, 1]) && (w.len() - 1) % 2 == 0)
        });
    }

    #[test]
    fn test_bounded_repeat_exact() {
        let a = word(0, &[0, 1]).bounded_repeat(3, Some(3), &BitAlgebra);
        assert_language(&a, &[0, 1], 7, |w| w == [0, 1, 0, 1, 0, 1]);
    }

    #[test]
    fn test_bounded_repeat_range() {
        let a = lit(0, 0).bounded_repeat(2, Some(4), &BitAlgebra);
        assert_language(&a, &[0, 1], 6, |w| (2..=4).contains(&w.len()) && w.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_bounded_repeat_at_least() {
        let a = lit(0, 0).bounded_repeat(2, None, &BitAlgebra);
        assert_language(&a, &[0, 1], 6, |w| w.len() >= 2 && w.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_bounded_repeat_special_cases() {
        assert!(lit(0, 0).bounded_repeat(0, Some(0), &BitAlgebra).is_epsilon());
        assert!(Automaton::<u64>::Empty.bounded_repeat(0, Some(3), &BitAlgebra).is_epsilon());
        assert!(Automaton::<u64>::Empty.bounded_repeat(1, Some(3), &BitAlgebra).is_empty());
        assert!(Automaton::<u64>::Epsilon.bounded_repeat(2, None, &BitAlgebra).is_epsilon());

        let one = lit(0, 0).bounded_repeat(1, Some(1), &BitAlgebra);
        assert_language(&one, &[0], 2, |w| w.len() == 1);

        let opt = lit(0, 0).bounded_repeat(0, Some(1), &BitAlgebra);
        assert_language(&opt, &[0], 2, |w| w.len() <= 1);
    }

    #[test]
    fn test_bounded_repeat_of_loop() {
        // (a*b){2,3} relabels copies containing bypass states without collisions
        let body = lit(0, 0).kleene_closure(&BitAlgebra).concat(lit(3, 1));
        let a = body.bounded_repeat(2, Some(3), &BitAlgebra);
        let ones = |w: &[u32]| w.iter().filter(|&&c| c == 1).count();
        assert_language(&a, &[0, 1], 6, |w| w.last() == Some(&1) && (2..=3).contains(&ones(w)));
    }

    #[test]
    #[should_panic(expected = "Invalid repetition bounds")]
    fn test_bounded_repeat_bad_bounds() {
        lit(0, 0).bounded_repeat(3, Some(2), &BitAlgebra);
    }
}
