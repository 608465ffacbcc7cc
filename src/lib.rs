//! # symrex: random members of regular expressions
//!
//! **`symrex`** turns regular expressions into **symbolic finite automata** and draws random strings from their languages.
//! It is meant for producing test inputs: strings that a pattern is guaranteed to match, or that several patterns match at once.
//!
//! ## How it works
//!
//! Transitions of the automata are labelled with **character predicates**, each a Binary Decision Diagram over the bits of a character code.
//! All predicates live in one [`CharSetSolver`][crate::solver::CharSetSolver] manager, which hash-conses the nodes and caches operation results,
//! so equal character sets are the same [`Ref`][crate::reference::Ref] and satisfiability is a constant-time check.
//!
//! A pattern goes through the following pipeline:
//!
//! 1. [`syntax`] parses it with `regex-syntax` and resolves the inline flags.
//! 2. [`translate`] builds an automaton bottom-up from the tree, using the combinators of [`automaton`].
//! 3. [`Automaton::finalize`][crate::automaton::Automaton::finalize] removes epsilon moves and dead states.
//! 4. [`sampler`] walks the automaton at random, picking a character from each predicate on the way.
//!
//! Patterns are unanchored by default: a free edge of the pattern accepts any prefix or suffix,
//! so `abc` yields strings like `"x1abc"`, while `^abc$` yields exactly `"abc"`.
//!
//! ## Basic Usage
//!
//! ```rust
//! use symrex::{RexEngine, RexOptions};
//! use symrex::types::Encoding;
//!
//! let mut engine = RexEngine::new(RexOptions::default().with_encoding(Encoding::Ascii).with_seed(42));
//!
//! let automaton = engine.create_automaton(r"^[a-f]{2}-\d$").unwrap();
//! for member in engine.generate_many(&automaton, 10) {
//!     assert_eq!(member.len(), 4);
//!     assert!(member.as_bytes()[2] == b'-');
//! }
//! ```
//!
//! ## Core Components
//!
//! - **[`solver`]**, **[`charset`]**, **[`sat`]**: the BDD manager for character predicates and queries on it.
//! - **[`automaton`]**: symbolic automata and their combinators (concatenation, union, repetition, product).
//! - **[`engine`]**: the [`RexEngine`] and the [`generate_members`] shortcut.
//! - **[`dot`]**: Graphviz output for predicates and automata.

pub mod algebra;
pub mod automaton;
pub mod cache;
pub mod charset;
pub mod chooser;
pub mod dot;
pub mod engine;
pub mod error;
pub mod node;
pub mod options;
pub mod reference;
pub mod sampler;
pub mod sat;
pub mod solver;
pub mod syntax;
pub mod translate;
pub mod types;
pub mod unicode;
pub mod utils;

pub use engine::{create_automaton_from_patterns, generate_members, Generated, RexEngine};
pub use error::{Error, ErrorKind};
pub use options::RexOptions;
