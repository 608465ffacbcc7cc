//! Random walks over a finalized automaton.

use std::collections::HashSet;

use log::{debug, trace};

use crate::automaton::Automaton;
use crate::chooser::Chooser;
use crate::reference::Ref;
use crate::solver::CharSetSolver;

/// Number of draws allowed per requested member, before and after the first
/// hundred distinct members have been found.
const MIN_ATTEMPTS: usize = 100;
const MAX_ATTEMPTS: usize = 200;

pub struct Sampler<'a> {
    solver: &'a CharSetSolver,
}

impl<'a> Sampler<'a> {
    pub fn new(solver: &'a CharSetSolver) -> Self {
        Self { solver }
    }

    /// Draw one member of the language of `automaton`.
    ///
    /// The walk starts at the initial state. At an accepting state with
    /// outgoing moves, a coin flip decides whether to stop; otherwise a move
    /// is chosen uniformly and a character is drawn from its label.
    /// Returns `None` for the empty language.
    pub fn generate_one(&self, chooser: &mut Chooser, automaton: &Automaton<Ref>) -> Option<String> {
        let sfa = match automaton {
            Automaton::Empty => return None,
            Automaton::Epsilon => return Some(String::new()),
            Automaton::General(sfa) => sfa,
        };

        let mut res = String::new();
        let mut state = sfa.initial();
        loop {
            let moves: Vec<_> = sfa.out_moves(state).collect();
            if sfa.is_final(state) && (moves.is_empty() || chooser.choose_bool()) {
                break;
            }
            if moves.is_empty() {
                debug!("walk stuck in non-accepting state {}", state);
                return None;
            }

            let m = moves[chooser.choose(moves.len())];
            if let Some(label) = m.label {
                let code = self.solver.generate_member(chooser, label);
                match char::from_u32(code) {
                    Some(c) => res.push(c),
                    None => panic!("Generated code {:#X} is not a Unicode scalar value", code),
                }
            }
            state = m.target;
        }

        trace!("generated {:?}", res);
        Some(res)
    }

    /// Draw up to `count` distinct members.
    ///
    /// Each slot gets a bounded number of attempts at a new member. When a
    /// slot runs out, the language is taken to be exhausted and the members
    /// found so far are returned.
    pub fn generate_many(&self, chooser: &mut Chooser, automaton: &Automaton<Ref>, count: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut res = Vec::with_capacity(count);

        for _ in 0..count {
            let attempts = (MIN_ATTEMPTS + seen.len()).min(MAX_ATTEMPTS);
            let mut found = false;
            for _ in 0..attempts {
                let Some(member) = self.generate_one(chooser, automaton) else {
                    return res;
                };
                if seen.insert(member.clone()) {
                    res.push(member);
                    found = true;
                    break;
                }
            }
            if !found {
                debug!("no new member after {} attempts, stopping at {}", attempts, res.len());
                break;
            }
        }

        res
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::automaton::Sfa;
    use crate::types::Encoding;

    fn chain(solver: &CharSetSolver, chars: &[char]) -> Automaton<Ref> {
        let preds: Vec<Ref> = chars.iter().map(|&c| solver.mk_char_constraint(false, c)).collect();
        Automaton::from_predicates(0, &preds, false, false, solver.one(), solver)
    }

    #[test]
    fn test_trivial_languages() {
        let solver = CharSetSolver::new(Encoding::Ascii);
        let sampler = Sampler::new(&solver);
        let mut chooser = Chooser::with_seed(1);
        assert_eq!(sampler.generate_one(&mut chooser, &Automaton::Empty), None);
        assert_eq!(sampler.generate_one(&mut chooser, &Automaton::Epsilon), Some(String::new()));
        assert!(sampler.generate_many(&mut chooser, &Automaton::Empty, 5).is_empty());
        assert_eq!(sampler.generate_many(&mut chooser, &Automaton::Epsilon, 5), vec![String::new()]);
    }

    #[test]
    fn test_single_word() {
        let solver = CharSetSolver::new(Encoding::Utf16);
        let sampler = Sampler::new(&solver);
        let mut chooser = Chooser::with_seed(7);
        let a = chain(&solver, &['h', 'é', 'ł']);
        assert_eq!(sampler.generate_one(&mut chooser, &a).as_deref(), Some("héł"));
        assert_eq!(sampler.generate_many(&mut chooser, &a, 10), vec!["héł".to_string()]);
    }

    #[test]
    fn test_exhausts_small_language() {
        let solver = CharSetSolver::new(Encoding::Ascii);
        let sampler = Sampler::new(&solver);
        let mut chooser = Chooser::with_seed(3);
        let digit = solver.mk_range_constraint(false, '0' as u32, '9' as u32);
        let a = Automaton::from_predicate(0, digit, false, false, solver.one(), &solver);

        let mut members = sampler.generate_many(&mut chooser, &a, 50);
        assert_eq!(members.len(), 10);
        members.sort();
        let expected: Vec<String> = ('0'..='9').map(|c| c.to_string()).collect();
        assert_eq!(members, expected);
    }

    #[test]
    fn test_loop_stops_at_accepting_state() {
        let solver = CharSetSolver::new(Encoding::Ascii);
        let sampler = Sampler::new(&solver);
        let mut chooser = Chooser::with_seed(11);
        let a_or_b = solver.mk_range_constraint(false, 'a' as u32, 'b' as u32);
        let mut sfa = Sfa::new(0);
        sfa.add_move(0, 0, Some(a_or_b));
        sfa.set_final(0, true);
        let a = Automaton::General(sfa);

        let members = sampler.generate_many(&mut chooser, &a, 20);
        assert_eq!(members.len(), 20);
        for m in &members {
            assert!(m.chars().all(|c| c == 'a' || c == 'b'), "unexpected member {:?}", m);
        }
    }

    #[test]
    fn test_same_seed_same_members() {
        let solver = CharSetSolver::new(Encoding::Utf16);
        let sampler = Sampler::new(&solver);
        let any = solver.mk_not(solver.mk_range_constraint(false, 0xD800, 0xDFFF));
        let a = Automaton::from_predicates(0, &[any, any, any], false, false, any, &solver);

        let first = sampler.generate_many(&mut Chooser::with_seed(99), &a, 8);
        let second = sampler.generate_many(&mut Chooser::with_seed(99), &a, 8);
        assert_eq!(first, second);
        assert_eq!(first.len(), 8);
        for m in &first {
            assert_eq!(m.chars().count(), 3);
        }
    }
}
