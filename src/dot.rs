//! DOT (Graphviz) rendering of predicates and automata.
//!
//! # Predicates
//!
//! [`CharSetSolver::to_dot`] draws the decision diagram of one or more predicates:
//! - **Terminal nodes** (0 and 1) are squares at the bottom (sink rank)
//! - **Decision nodes** are circles labelled `b<ordinal>`, grouped by ordinal
//! - Solid edges are taken when the bit is set, dashed edges when it is clear
//! - **Root nodes** are rectangles at the top (source rank)
//!
//! # Automata
//!
//! [`Automaton::to_dot`] draws states left to right:
//! - The initial state is pointed to by an arrow from an invisible point
//! - Final states are double circles
//! - Edges carry the rendered character class; epsilon edges are dashed and labelled `ε`
//!
//! ```
//! use symrex::automaton::Automaton;
//! use symrex::dot::DotConfig;
//! use symrex::solver::CharSetSolver;
//! use symrex::types::Encoding;
//!
//! let solver = CharSetSolver::new(Encoding::Ascii);
//! let digit = solver.mk_range_constraint(false, '0' as u32, '9' as u32);
//! let a = Automaton::from_predicate(0, digit, false, false, solver.one(), &solver);
//!
//! let dot = a.to_dot(&solver, &DotConfig::default()).unwrap();
//! assert!(dot.contains("[0-9]"));
//! ```

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::automaton::Automaton;
use crate::reference::Ref;
use crate::solver::CharSetSolver;
use crate::utils::escape_dot_label;

/// Configuration options for DOT output generation.
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for decision nodes (default: "circle")
    pub node_shape: &'static str,
    /// Shape for terminal nodes (default: "square")
    pub terminal_shape: &'static str,
    /// Shape for root nodes (default: "rect")
    pub root_shape: &'static str,
    /// Style for edges taken when the bit is set (default: "solid")
    pub high_edge_style: &'static str,
    /// Style for edges taken when the bit is clear (default: "dashed")
    pub low_edge_style: &'static str,
    /// Shape for non-final automaton states (default: "circle")
    pub state_shape: &'static str,
    /// Shape for final automaton states (default: "doublecircle")
    pub final_shape: &'static str,
    /// Style for epsilon moves (default: "dashed")
    pub epsilon_style: &'static str,
    /// Layout direction of automata (default: "LR")
    pub rankdir: &'static str,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            node_shape: "circle",
            terminal_shape: "square",
            root_shape: "rect",
            high_edge_style: "solid",
            low_edge_style: "dashed",
            state_shape: "circle",
            final_shape: "doublecircle",
            epsilon_style: "dashed",
            rankdir: "LR",
        }
    }
}

impl DotConfig {
    pub fn with_state_shape(mut self, shape: &'static str) -> Self {
        self.state_shape = shape;
        self
    }

    pub fn with_final_shape(mut self, shape: &'static str) -> Self {
        self.final_shape = shape;
        self
    }

    pub fn with_epsilon_style(mut self, style: &'static str) -> Self {
        self.epsilon_style = style;
        self
    }

    pub fn with_rankdir(mut self, rankdir: &'static str) -> Self {
        self.rankdir = rankdir;
        self
    }
}

impl CharSetSolver {
    /// Converts predicates to DOT format with the default configuration.
    pub fn to_dot(&self, roots: &[Ref]) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(roots, &DotConfig::default())
    }

    pub fn to_dot_with_config(&self, roots: &[Ref], config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "graph {{")?;
        writeln!(dot, "node [shape={}, fixedsize=true];", config.node_shape)?;

        // Terminal nodes (0 and 1)
        writeln!(dot, "{{ rank=sink")?;
        writeln!(dot, "0 [shape={}, label=\"0\"];", config.terminal_shape)?;
        writeln!(dot, "1 [shape={}, label=\"1\"];", config.terminal_shape)?;
        writeln!(dot, "}}")?;

        let all_nodes = self.descendants(roots.iter().copied());

        // Group nodes by ordinal for layout
        let mut levels = BTreeMap::<u32, Vec<Ref>>::new();
        for &node in all_nodes.iter() {
            levels.entry(self.ordinal(node)).or_default().push(node);
        }
        for (ordinal, level) in levels.iter_mut() {
            level.sort();
            writeln!(dot, "{{ rank=same")?;
            for node in level.iter() {
                writeln!(dot, "{} [label=\"b{}\"];", node.index(), ordinal)?;
            }
            writeln!(dot, "}}")?;
        }

        for level in levels.values() {
            for &node in level {
                writeln!(
                    dot,
                    "{} -- {} [style={}];",
                    node.index(),
                    self.high(node).index(),
                    config.high_edge_style
                )?;
                writeln!(
                    dot,
                    "{} -- {} [style={}];",
                    node.index(),
                    self.low(node).index(),
                    config.low_edge_style
                )?;
            }
        }

        writeln!(dot, "{{ rank=source")?;
        for (i, root) in roots.iter().enumerate() {
            writeln!(dot, "r{} [shape={}, label=\"{}\"];", i, config.root_shape, root)?;
        }
        writeln!(dot, "}}")?;
        for (i, root) in roots.iter().enumerate() {
            writeln!(dot, "r{} -- {};", i, root.index())?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

impl Automaton<Ref> {
    /// Converts the automaton to DOT format, labelling moves with [`CharSetSolver::pretty`].
    pub fn to_dot(&self, solver: &CharSetSolver, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let mut dot = String::new();
        writeln!(dot, "digraph automaton {{")?;
        writeln!(dot, "rankdir={};", config.rankdir)?;
        writeln!(dot, "node [shape={}];", config.state_shape)?;
        writeln!(dot, "init [shape=point];")?;

        match self {
            Automaton::Empty => {
                writeln!(dot, "0;")?;
                writeln!(dot, "init -> 0;")?;
            }
            Automaton::Epsilon => {
                writeln!(dot, "0 [shape={}];", config.final_shape)?;
                writeln!(dot, "init -> 0;")?;
            }
            Automaton::General(sfa) => {
                for &s in sfa.states() {
                    if sfa.is_final(s) {
                        writeln!(dot, "{} [shape={}];", s, config.final_shape)?;
                    } else {
                        writeln!(dot, "{};", s)?;
                    }
                }
                writeln!(dot, "init -> {};", sfa.initial())?;
                for m in sfa.moves() {
                    match m.label {
                        Some(p) => writeln!(
                            dot,
                            "{} -> {} [label=\"{}\"];",
                            m.source,
                            m.target,
                            escape_dot_label(&solver.pretty(p))
                        )?,
                        None => writeln!(
                            dot,
                            "{} -> {} [label=\"ε\", style={}];",
                            m.source, m.target, config.epsilon_style
                        )?,
                    }
                }
            }
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Encoding;

    #[test]
    fn test_bdd_to_dot() {
        let solver = CharSetSolver::new(Encoding::Ascii);
        let f = solver.mk_range_constraint(false, 'a' as u32, 'z' as u32);

        let dot = solver.to_dot(&[f]).unwrap();
        assert!(dot.starts_with("graph {"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("label=\"b0\""));
        assert!(dot.contains("r0 --"));
    }

    #[test]
    fn test_bdd_to_dot_constants() {
        let solver = CharSetSolver::new(Encoding::Ascii);
        let dot = solver.to_dot(&[solver.zero(), solver.one()]).unwrap();
        assert!(dot.contains("r0 -- 0;"));
        assert!(dot.contains("r1 -- 1;"));
    }

    #[test]
    fn test_automaton_to_dot() {
        let solver = CharSetSolver::new(Encoding::Ascii);
        let nl = solver.mk_char_constraint(false, '\n');
        let quote = solver.mk_char_constraint(false, '"');
        let a = Automaton::from_predicate(0, nl, false, false, solver.one(), &solver)
            .optional()
            .concat(Automaton::from_predicate(5, quote, false, false, solver.one(), &solver));

        let dot = a.to_dot(&solver, &DotConfig::default()).unwrap();
        assert!(dot.starts_with("digraph automaton {"));
        assert!(dot.contains("init -> 0;"));
        assert!(dot.contains("[label=\"\\\\n\"]"));
        assert!(dot.contains("[label=\"\\\"\"]"));
        assert!(dot.contains("6 [shape=doublecircle];"));
        assert!(dot.contains("style=dashed"));
    }

    #[test]
    fn test_degenerate_to_dot() {
        let solver = CharSetSolver::new(Encoding::Ascii);
        let config = DotConfig::default().with_final_shape("box").with_rankdir("TB");
        let dot = Automaton::<Ref>::Epsilon.to_dot(&solver, &config).unwrap();
        assert!(dot.contains("0 [shape=box];"));
        assert!(dot.contains("rankdir=TB;"));
        let dot = Automaton::<Ref>::Empty.to_dot(&solver, &config).unwrap();
        assert!(!dot.contains("box"));
    }
}
