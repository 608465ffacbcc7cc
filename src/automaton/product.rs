use std::collections::{BTreeMap, VecDeque};
use std::fmt::Debug;

use log::debug;

use super::{Automaton, Sfa, StateId};
use crate::algebra::BooleanAlgebra;

impl<P: Copy + Eq + Debug> Automaton<P> {
    /// Language intersection.
    ///
    /// Both operands are made epsilon-free first. Pairs of states are explored
    /// breadth-first from the pair of initial states; a pair of moves yields a
    /// combined move only when the conjunction of their labels is satisfiable.
    /// The result is trimmed, so an empty intersection comes back as [`Automaton::Empty`].
    pub fn product<A>(self, other: Automaton<P>, algebra: &A) -> Self
    where
        A: BooleanAlgebra<Predicate = P>,
    {
        let a = self.remove_epsilons(algebra);
        let b = other.remove_epsilons(algebra);

        match (a, b) {
            (Automaton::Empty, _) | (_, Automaton::Empty) => Automaton::Empty,
            (Automaton::Epsilon, x) | (x, Automaton::Epsilon) => {
                if x.accepts_empty_word() {
                    Automaton::Epsilon
                } else {
                    Automaton::Empty
                }
            }
            (Automaton::General(a), Automaton::General(b)) => product_sfa(&a, &b, algebra).trim(),
        }
    }
}

fn product_sfa<P, A>(a: &Sfa<P>, b: &Sfa<P>, algebra: &A) -> Automaton<P>
where
    P: Copy + Eq + Debug,
    A: BooleanAlgebra<Predicate = P>,
{
    let start = (a.initial(), b.initial());
    let mut ids: BTreeMap<(StateId, StateId), StateId> = BTreeMap::from([(start, 0)]);
    let mut queue = VecDeque::from([start]);
    let mut res = Sfa::new(0);

    while let Some((p, q)) = queue.pop_front() {
        let id = ids[&(p, q)];
        if a.is_final(p) && b.is_final(q) {
            res.set_final(id, true);
        }

        for ma in a.out_moves(p) {
            for mb in b.out_moves(q) {
                let (Some(la), Some(lb)) = (ma.label, mb.label) else {
                    continue;
                };
                let label = algebra.conjoin(la, lb);
                if !algebra.is_satisfiable(label) {
                    continue;
                }

                let key = (ma.target, mb.target);
                let next = ids.len() as StateId;
                let target = *ids.entry(key).or_insert_with(|| {
                    queue.push_back(key);
                    next
                });
                res.add_move(id, target, Some(label));
            }
        }
    }

    res.set_deterministic(a.is_deterministic() && b.is_deterministic());
    debug!(
        "product: {} x {} states -> {} pairs, {} moves",
        a.num_states(),
        b.num_states(),
        ids.len(),
        res.num_moves()
    );
    Automaton::General(res)
}
