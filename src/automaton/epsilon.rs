//! Epsilon elimination and epsilon-cycle collapsing.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::Debug;

use log::debug;

use super::{Automaton, Sfa, StateId};
use crate::algebra::BooleanAlgebra;

impl<P: Copy + Eq + Debug> Sfa<P> {
    /// Merge every strongly connected component of the epsilon graph into its
    /// smallest state, then OR together parallel labelled moves.
    pub(crate) fn collapse_epsilon_cycles<A>(&mut self, algebra: &A)
    where
        A: BooleanAlgebra<Predicate = P>,
    {
        let closures: BTreeMap<StateId, BTreeSet<StateId>> = self
            .states()
            .iter()
            .map(|&s| (s, self.epsilon_closure(s)))
            .collect();

        let mut assigned = BTreeSet::new();
        let mut components = Vec::new();
        for (&s, reach) in &closures {
            if assigned.contains(&s) {
                continue;
            }
            // BTreeSet iteration is ordered, so `s` is the smallest member of its component
            let component: Vec<StateId> = reach
                .iter()
                .copied()
                .filter(|t| closures.get(t).is_some_and(|r| r.contains(&s)))
                .collect();
            assigned.extend(component.iter().copied());
            if component.len() > 1 {
                components.push(component);
            }
        }

        if components.is_empty() {
            return;
        }
        debug!("collapsing {} epsilon cycles", components.len());

        for component in components {
            let representative = component[0];
            for &other in &component[1..] {
                self.rename_state(other, representative);
            }
        }
        self.merge_parallel_moves(algebra);
    }

    /// Replace labelled moves sharing source and target by a single move labelled with their union.
    pub(crate) fn merge_parallel_moves<A>(&mut self, algebra: &A)
    where
        A: BooleanAlgebra<Predicate = P>,
    {
        let mut groups: BTreeMap<(StateId, StateId), Vec<usize>> = BTreeMap::new();
        for indices in self.forward.values() {
            for &i in indices {
                if let Some(m) = self.moves[i] {
                    if !m.is_epsilon() {
                        groups.entry((m.source, m.target)).or_default().push(i);
                    }
                }
            }
        }

        for ((source, target), indices) in groups {
            if indices.len() < 2 {
                continue;
            }
            let mut label = algebra.bottom();
            for &i in &indices {
                if let Some(p) = self.moves[i].and_then(|m| m.label) {
                    label = algebra.disjoin(label, p);
                }
                self.remove_move(i);
            }
            self.add_move(source, target, Some(label));
        }
    }
}

impl<P: Copy + Eq + Debug> Automaton<P> {
    /// An equivalent automaton without epsilon moves.
    ///
    /// Every state reachable from the initial state receives the labelled
    /// moves of its epsilon closure and is final when the closure contains a
    /// final state. Unreachable states are dropped.
    pub fn remove_epsilons<A>(self, algebra: &A) -> Self
    where
        A: BooleanAlgebra<Predicate = P>,
    {
        let sfa = match self {
            Automaton::General(sfa) => sfa,
            other => return other,
        };
        if sfa.is_epsilon_free() {
            return Automaton::General(sfa);
        }

        let initial = sfa.initial();
        let mut labelled: BTreeMap<(StateId, StateId), P> = BTreeMap::new();
        let mut finals = BTreeSet::new();
        let mut visited = BTreeSet::from([initial]);
        let mut queue = VecDeque::from([initial]);

        while let Some(s) = queue.pop_front() {
            let closure = sfa.epsilon_closure(s);
            if closure.iter().any(|&t| sfa.is_final(t)) {
                finals.insert(s);
            }
            for &t in &closure {
                for m in sfa.out_moves(t) {
                    let Some(p) = m.label else {
                        continue;
                    };
                    labelled
                        .entry((s, m.target))
                        .and_modify(|q| *q = algebra.disjoin(*q, p))
                        .or_insert(p);
                    if visited.insert(m.target) {
                        queue.push_back(m.target);
                    }
                }
            }
        }

        let mut res = Sfa::new(initial);
        for ((source, target), p) in labelled {
            res.add_move(source, target, Some(p));
        }
        for f in finals {
            res.set_final(f, true);
        }
        res.reserve(sfa.max_state());
        debug!(
            "remove_epsilons: {} states, {} moves -> {} states, {} moves",
            sfa.num_states(),
            sfa.num_moves(),
            res.num_states(),
            res.num_moves()
        );
        Automaton::General(res)
    }

    /// Epsilon elimination followed by [`Automaton::trim`]; the form the sampler walks.
    pub fn finalize<A>(self, algebra: &A) -> Self
    where
        A: BooleanAlgebra<Predicate = P>,
    {
        let mut res = self.remove_epsilons(algebra).trim();
        if let Automaton::General(sfa) = &mut res {
            sfa.compact();
        }
        res
    }
}
