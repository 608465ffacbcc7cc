//! The public entry points: patterns in, automata and members out.

use log::{debug, info};

use crate::automaton::Automaton;
use crate::chooser::Chooser;
use crate::error::Error;
use crate::options::RexOptions;
use crate::reference::Ref;
use crate::sampler::Sampler;
use crate::solver::CharSetSolver;
use crate::syntax::parse;
use crate::translate::Translator;
use crate::unicode::CategoryProvider;

/// Members drawn from a batch of patterns, next to the patterns that failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generated {
    pub members: Vec<String>,
    pub errors: Vec<Error>,
}

/// Owns the solver, the category predicates, and the random source.
///
/// Automata created by an engine carry predicates of its solver, so they
/// must only be sampled through the same engine.
pub struct RexEngine {
    solver: CharSetSolver,
    categories: CategoryProvider,
    chooser: Chooser,
    options: RexOptions,
}

impl RexEngine {
    pub fn new(options: RexOptions) -> Self {
        let chooser = match options.seed {
            Some(seed) => Chooser::with_seed(seed),
            None => Chooser::new(),
        };
        debug!(
            "RexEngine::new(encoding = {}, seed = {})",
            options.encoding,
            chooser.seed()
        );
        Self {
            solver: CharSetSolver::new(options.encoding),
            categories: CategoryProvider::new(),
            chooser,
            options,
        }
    }

    pub fn solver(&self) -> &CharSetSolver {
        &self.solver
    }

    pub fn options(&self) -> &RexOptions {
        &self.options
    }

    /// Seed of the random source, for reproducing a run.
    pub fn seed(&self) -> u64 {
        self.chooser.seed()
    }

    /// Parse and translate one pattern into a trimmed, epsilon-free automaton.
    pub fn create_automaton(&self, pattern: &str) -> Result<Automaton<Ref>, Error> {
        let node = parse(pattern, &self.options).map_err(|kind| Error::new(pattern, kind))?;
        let mut translator = Translator::new(&self.solver, &self.categories);
        let automaton = translator
            .translate(&node)
            .map_err(|kind| Error::new(pattern, kind))?
            .finalize(&self.solver);
        debug!(
            "pattern {:?}: {} states, {} moves",
            pattern,
            automaton.num_states(),
            automaton.num_moves()
        );
        Ok(automaton)
    }

    /// The automaton accepting the strings matched by every pattern.
    ///
    /// Every pattern is translated before any product is taken, so the first
    /// failing pattern is reported even when the intersection is already empty.
    /// No patterns at all give the empty language.
    pub fn create_automaton_from_patterns<S: AsRef<str>>(&self, patterns: &[S]) -> Result<Automaton<Ref>, Error> {
        let automata = patterns
            .iter()
            .map(|pattern| self.create_automaton(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut res: Option<Automaton<Ref>> = None;
        for (i, automaton) in automata.into_iter().enumerate() {
            let next = match res {
                None => automaton,
                Some(acc) => acc.product(automaton, &self.solver),
            };
            if next.is_empty() {
                debug!("intersection became empty at pattern {}", i);
                return Ok(Automaton::Empty);
            }
            res = Some(next);
        }
        Ok(res.unwrap_or(Automaton::Empty))
    }

    pub fn generate_one(&mut self, automaton: &Automaton<Ref>) -> Option<String> {
        Sampler::new(&self.solver).generate_one(&mut self.chooser, automaton)
    }

    /// Up to `count` distinct members of the language of `automaton`.
    pub fn generate_many(&mut self, automaton: &Automaton<Ref>, count: usize) -> Vec<String> {
        Sampler::new(&self.solver).generate_many(&mut self.chooser, automaton, count)
    }

    /// Draw up to `count` members per pattern, or from the intersection of
    /// all of them when [`RexOptions::intersect`] is set.
    ///
    /// A failing pattern is reported in [`Generated::errors`] and does not
    /// stop the others.
    pub fn generate_from_patterns<S: AsRef<str>>(&mut self, patterns: &[S], count: usize) -> Generated {
        let mut res = Generated::default();

        if self.options.intersect {
            match self.create_automaton_from_patterns(patterns) {
                Ok(automaton) => res.members = self.generate_many(&automaton, count),
                Err(e) => res.errors.push(e),
            }
        } else {
            for pattern in patterns {
                match self.create_automaton(pattern.as_ref()) {
                    Ok(automaton) => {
                        let members = self.generate_many(&automaton, count);
                        res.members.extend(members);
                    }
                    Err(e) => res.errors.push(e),
                }
            }
        }

        info!(
            "generated {} members from {} patterns ({} failed), solver has {} nodes, cache hits: {}, misses: {}",
            res.members.len(),
            patterns.len(),
            res.errors.len(),
            self.solver.num_nodes(),
            self.solver.cache().hits(),
            self.solver.cache().misses()
        );
        res
    }
}

/// Draw up to `count` members from `patterns`.
///
/// A given `seed` takes precedence over [`RexOptions::seed`]; with neither,
/// the engine picks a fresh one.
///
/// ```
/// use symrex::{generate_members, RexOptions};
///
/// let generated = generate_members(&[r"^\d{3}$"], 5, &RexOptions::default(), Some(42));
/// assert!(generated.errors.is_empty());
/// assert_eq!(generated.members.len(), 5);
/// ```
pub fn generate_members<S: AsRef<str>>(
    patterns: &[S],
    count: usize,
    options: &RexOptions,
    seed: Option<u64>,
) -> Generated {
    let mut options = options.clone();
    if let Some(seed) = seed {
        options = options.with_seed(seed);
    }
    RexEngine::new(options).generate_from_patterns(patterns, count)
}

/// Build the intersection automaton of `patterns`, together with the engine
/// owning its predicates.
pub fn create_automaton_from_patterns<S: AsRef<str>>(
    patterns: &[S],
    options: &RexOptions,
) -> Result<(RexEngine, Automaton<Ref>), Error> {
    let engine = RexEngine::new(options.clone());
    let automaton = engine.create_automaton_from_patterns(patterns)?;
    Ok((engine, automaton))
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::error::{ErrorKind, UnsupportedConstruct};
    use crate::types::Encoding;

    #[test]
    fn test_create_automaton() {
        let engine = RexEngine::new(RexOptions::default().with_seed(1));
        let a = engine.create_automaton("^ab$").unwrap();
        assert_eq!(a.num_states(), 3);
        assert!(a.as_sfa().unwrap().is_epsilon_free());
        assert!(engine.create_automaton("^$").unwrap().is_epsilon());
    }

    #[test]
    fn test_create_automaton_error() {
        let engine = RexEngine::new(RexOptions::default());
        let e = engine.create_automaton(r"(a)\1").unwrap_err();
        assert_eq!(e.pattern, r"(a)\1");
        assert_eq!(e.kind, ErrorKind::Unsupported(UnsupportedConstruct::Backreference));
        assert!(matches!(
            engine.create_automaton("a(").unwrap_err().kind,
            ErrorKind::Syntax(_)
        ));
    }

    #[test]
    fn test_intersection() {
        let engine = RexEngine::new(RexOptions::default());
        let a = engine.create_automaton_from_patterns(&["^a+$", "^b+$"]).unwrap();
        assert!(a.is_empty());
        let a = engine.create_automaton_from_patterns(&["^[ab]{2}$", "^a"]).unwrap();
        assert!(!a.is_empty());
        let empty: [&str; 0] = [];
        assert!(engine.create_automaton_from_patterns(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_generate_from_patterns_reports_errors() {
        let mut engine = RexEngine::new(RexOptions::default().with_encoding(Encoding::Ascii).with_seed(5));
        let generated = engine.generate_from_patterns(&["^x$", "(?=y)", "^z$"], 3);
        assert_eq!(generated.members, vec!["x".to_string(), "z".to_string()]);
        assert_eq!(generated.errors.len(), 1);
        assert_eq!(generated.errors[0].pattern, "(?=y)");
    }

    #[test]
    fn test_generate_intersection() {
        let options = RexOptions::default()
            .with_encoding(Encoding::Ascii)
            .with_intersect(true);
        let generated = generate_members(&["^[a-c][a-c]$", "^[b-d]", "c$"], 10, &options, Some(17));
        assert!(generated.errors.is_empty());
        let mut members = generated.members;
        members.sort();
        assert_eq!(members, vec!["bc".to_string(), "cc".to_string()]);
    }

    #[test]
    fn test_seed_override() {
        let options = RexOptions::default().with_seed(1);
        let (engine, _) = create_automaton_from_patterns(&["a"], &options).unwrap();
        assert_eq!(engine.seed(), 1);
        let first = generate_members(&[r"\w{5}"], 4, &options, Some(2));
        let second = generate_members(&[r"\w{5}"], 4, &RexOptions::default(), Some(2));
        assert_eq!(first, second);
    }

    #[test]
    fn test_seed_falls_back_to_options() {
        let options = RexOptions::default().with_seed(9);
        let from_options = generate_members(&[r"^[a-z]{6}$"], 5, &options, None);
        let explicit = generate_members(&[r"^[a-z]{6}$"], 5, &RexOptions::default(), Some(9));
        assert_eq!(from_options, explicit);

        let unseeded = generate_members(&[r"^[a-z]{6}$"], 5, &RexOptions::default(), None);
        assert!(unseeded.errors.is_empty());
        assert_eq!(unseeded.members.len(), 5);
    }

    #[test]
    fn test_intersection_reports_error_after_empty_product() {
        let engine = RexEngine::new(RexOptions::default());
        let e = engine
            .create_automaton_from_patterns(&["^a$", "^b$", "(?=x)"])
            .unwrap_err();
        assert_eq!(e.pattern, "(?=x)");
        assert_eq!(e.kind, ErrorKind::Unsupported(UnsupportedConstruct::Lookaround));

        let options = RexOptions::default().with_intersect(true);
        let generated = generate_members(&["^a$", "^b$", "(?=x)"], 5, &options, Some(1));
        assert!(generated.members.is_empty());
        assert_eq!(generated.errors.len(), 1);
        assert_eq!(generated.errors[0].pattern, "(?=x)");
    }
}
