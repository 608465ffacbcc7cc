//! The bit-vector predicate solver.
//!
//! A [`CharSetSolver`] owns every predicate node it hands out. Predicates are
//! reduced ordered BDDs over the `k` bits of a character code, where `k` comes
//! from the solver's [`Encoding`]. Nodes are hash-consed through a unique table
//! keyed by `(ordinal, high, low)`, so two [`Ref`]s are equal exactly when they
//! denote the same character set. All operations are memoized in a
//! [`Cache`] keyed by operand identities.
//!
//! ```
//! use symrex::solver::CharSetSolver;
//! use symrex::types::Encoding;
//!
//! let solver = CharSetSolver::new(Encoding::Ascii);
//! let digits = solver.mk_range_constraint(false, '0' as u32, '9' as u32);
//! let not_digits = solver.mk_not(digits);
//!
//! assert_eq!(solver.mk_and(digits, not_digits), solver.zero());
//! assert_eq!(solver.mk_or(digits, not_digits), solver.one());
//! assert_eq!(solver.count(digits), 10);
//! ```

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;

use log::{debug, trace};

use crate::algebra::BooleanAlgebra;
use crate::cache::{Cache, CacheKey, OpType};
use crate::node::Node;
use crate::reference::Ref;
use crate::types::Encoding;

pub struct CharSetSolver {
    encoding: Encoding,
    nodes: RefCell<Vec<Node>>,
    unique: RefCell<HashMap<Node, Ref>>,
    cache: RefCell<Cache>,
    pub(crate) int_cache: RefCell<HashMap<u32, Ref>>,
}

impl CharSetSolver {
    pub fn new(encoding: Encoding) -> Self {
        debug!("CharSetSolver::new(encoding = {}, bits = {})", encoding, encoding.bits());

        // Index 0 is False, index 1 is True.
        let nodes = vec![Node::terminal(), Node::terminal()];

        Self {
            encoding,
            nodes: RefCell::new(nodes),
            unique: RefCell::new(HashMap::new()),
            cache: RefCell::new(Cache::with_capacity(1 << 12)),
            int_cache: RefCell::new(HashMap::new()),
        }
    }
}

impl Default for CharSetSolver {
    fn default() -> Self {
        CharSetSolver::new(Encoding::default())
    }
}

impl Debug for CharSetSolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.cache.borrow();
        f.debug_struct("CharSetSolver")
            .field("encoding", &self.encoding)
            .field("nodes", &self.nodes.borrow().len())
            .field("cache_size", &cache.len())
            .field("cache_hits", &cache.hits())
            .field("cache_misses", &cache.misses())
            .finish()
    }
}

impl CharSetSolver {
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Number of bits in a character code.
    pub fn bits(&self) -> u32 {
        self.encoding.bits()
    }

    pub fn max_char(&self) -> u32 {
        self.encoding.max_char()
    }

    pub fn cache(&self) -> std::cell::Ref<'_, Cache> {
        self.cache.borrow()
    }

    /// Total number of allocated nodes, terminals included.
    pub fn num_nodes(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn zero(&self) -> Ref {
        Ref::ZERO
    }
    pub fn one(&self) -> Ref {
        Ref::ONE
    }

    pub fn is_zero(&self, f: Ref) -> bool {
        f.is_zero()
    }
    pub fn is_one(&self, f: Ref) -> bool {
        f.is_one()
    }
    pub fn is_terminal(&self, f: Ref) -> bool {
        f.is_terminal()
    }

    pub(crate) fn node(&self, f: Ref) -> Node {
        self.nodes.borrow()[f.index()]
    }

    /// Ordinal of the bit tested at `f`, or [`Node::TERMINAL_ORDINAL`] for terminals.
    pub fn ordinal(&self, f: Ref) -> u32 {
        self.node(f).ordinal
    }
    pub fn high(&self, f: Ref) -> Ref {
        self.node(f).high
    }
    pub fn low(&self, f: Ref) -> Ref {
        self.node(f).low
    }

    /// Return the unique node `(ordinal, high, low)`, creating it if needed.
    pub fn mk_node(&self, ordinal: u32, high: Ref, low: Ref) -> Ref {
        trace!("mk(ordinal = {}, high = {}, low = {})", ordinal, high, low);

        assert!(
            ordinal < self.bits(),
            "Ordinal {} is out of range for {} bits",
            ordinal,
            self.bits()
        );

        // Handle duplicates
        if high == low {
            return high;
        }

        debug_assert!(ordinal < self.ordinal(high), "ordinals must increase toward the leaves");
        debug_assert!(ordinal < self.ordinal(low), "ordinals must increase toward the leaves");

        let node = Node::new(ordinal, high, low);
        if let Some(&existing) = self.unique.borrow().get(&node) {
            return existing;
        }

        let mut nodes = self.nodes.borrow_mut();
        let res = Ref::new(nodes.len() as u32);
        nodes.push(node);
        self.unique.borrow_mut().insert(node, res);
        res
    }

    /// Fix the bit at `ordinal` to `value` and simplify.
    ///
    /// ```text
    /// restrict(f, x, b) = f|x<-b
    /// ```
    pub fn restrict(&self, f: Ref, ordinal: u32, value: bool) -> Ref {
        if f.is_terminal() {
            return f;
        }

        let node = self.node(f);
        if node.ordinal > ordinal {
            // 'f' does not depend on this bit
            return f;
        }
        if node.ordinal == ordinal {
            return if value { node.high } else { node.low };
        }

        let key = CacheKey::unary(OpType::Restrict { ordinal, value }, f);
        let cached = self.cache.borrow_mut().get(&key);
        if let Some(res) = cached {
            trace!("cache: restrict(f = {}, ordinal = {}, value = {}) -> {}", f, ordinal, value, res);
            return res;
        }

        let high = self.restrict(node.high, ordinal, value);
        let low = self.restrict(node.low, ordinal, value);
        let res = self.mk_node(node.ordinal, high, low);
        self.cache.borrow_mut().insert(key, res);
        res
    }

    pub fn mk_not(&self, f: Ref) -> Ref {
        trace!("mk_not(f = {})", f);

        if f.is_zero() {
            return Ref::ONE;
        }
        if f.is_one() {
            return Ref::ZERO;
        }

        let key = CacheKey::unary(OpType::Not, f);
        let cached = self.cache.borrow_mut().get(&key);
        if let Some(res) = cached {
            return res;
        }

        let node = self.node(f);
        let high = self.mk_not(node.high);
        let low = self.mk_not(node.low);
        let res = self.mk_node(node.ordinal, high, low);

        self.cache.borrow_mut().insert(key, res);
        // Negation is an involution, so the reverse direction is known too.
        self.cache.borrow_mut().insert(CacheKey::unary(OpType::Not, res), f);
        res
    }

    pub fn mk_and(&self, f: Ref, g: Ref) -> Ref {
        trace!("mk_and(f = {}, g = {})", f, g);

        if f.is_zero() || g.is_zero() {
            return Ref::ZERO;
        }
        if f.is_one() {
            return g;
        }
        if g.is_one() || f == g {
            return f;
        }

        let key = CacheKey::commutative(OpType::And, f, g);
        let cached = self.cache.borrow_mut().get(&key);
        if let Some(res) = cached {
            trace!("cache: mk_and(f = {}, g = {}) -> {}", f, g, res);
            return res;
        }

        // Split on the lower ordinal of the two operands
        let m = self.ordinal(f).min(self.ordinal(g));
        let high = self.mk_and(self.restrict(f, m, true), self.restrict(g, m, true));
        let low = self.mk_and(self.restrict(f, m, false), self.restrict(g, m, false));
        let res = self.mk_node(m, high, low);

        self.cache.borrow_mut().insert(key, res);
        res
    }

    pub fn mk_or(&self, f: Ref, g: Ref) -> Ref {
        trace!("mk_or(f = {}, g = {})", f, g);

        if f.is_one() || g.is_one() {
            return Ref::ONE;
        }
        if f.is_zero() {
            return g;
        }
        if g.is_zero() || f == g {
            return f;
        }

        let key = CacheKey::commutative(OpType::Or, f, g);
        let cached = self.cache.borrow_mut().get(&key);
        if let Some(res) = cached {
            trace!("cache: mk_or(f = {}, g = {}) -> {}", f, g, res);
            return res;
        }

        let m = self.ordinal(f).min(self.ordinal(g));
        let high = self.mk_or(self.restrict(f, m, true), self.restrict(g, m, true));
        let low = self.mk_or(self.restrict(f, m, false), self.restrict(g, m, false));
        let res = self.mk_node(m, high, low);

        self.cache.borrow_mut().insert(key, res);
        res
    }

    /// `f ∧ ¬g`
    pub fn mk_diff(&self, f: Ref, g: Ref) -> Ref {
        self.mk_and(f, self.mk_not(g))
    }

    /// `(f ∧ ¬g) ∨ (¬f ∧ g)`
    pub fn mk_xor(&self, f: Ref, g: Ref) -> Ref {
        self.mk_or(self.mk_diff(f, g), self.mk_diff(g, f))
    }

    pub fn mk_and_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = Ref::ONE;
        for node in nodes {
            res = self.mk_and(res, node);
            if res.is_zero() {
                break;
            }
        }
        res
    }

    pub fn mk_or_many(&self, nodes: impl IntoIterator<Item = Ref>) -> Ref {
        let mut res = Ref::ZERO;
        for node in nodes {
            res = self.mk_or(res, node);
            if res.is_one() {
                break;
            }
        }
        res
    }

    pub fn is_satisfiable(&self, f: Ref) -> bool {
        !f.is_zero()
    }

    /// Evaluate the predicate on a single character code.
    pub fn contains(&self, f: Ref, code: u32) -> bool {
        if code > self.max_char() {
            return false;
        }
        let bits = self.bits();
        let mut current = f;
        while !current.is_terminal() {
            let node = self.node(current);
            let bit = (code >> (bits - 1 - node.ordinal)) & 1 == 1;
            current = if bit { node.high } else { node.low };
        }
        current.is_one()
    }

    pub fn descendants(&self, nodes: impl IntoIterator<Item = Ref>) -> HashSet<Ref> {
        let mut visited = HashSet::new();
        let mut stack: Vec<Ref> = nodes.into_iter().collect();

        while let Some(node) = stack.pop() {
            if node.is_terminal() {
                continue;
            }
            if visited.insert(node) {
                stack.push(self.high(node));
                stack.push(self.low(node));
            }
        }

        visited
    }

    /// Number of decision nodes reachable from `f`.
    pub fn size(&self, f: Ref) -> usize {
        self.descendants([f]).len()
    }

    pub fn to_bracket_string(&self, f: Ref) -> String {
        if f.is_zero() {
            return "(0)".to_string();
        } else if f.is_one() {
            return "(1)".to_string();
        }

        let node = self.node(f);
        format!(
            "{}:(b{}, {}, {})",
            f,
            node.ordinal,
            self.to_bracket_string(node.high),
            self.to_bracket_string(node.low)
        )
    }
}

impl BooleanAlgebra for CharSetSolver {
    type Predicate = Ref;

    fn top(&self) -> Ref {
        Ref::ONE
    }
    fn bottom(&self) -> Ref {
        Ref::ZERO
    }

    fn conjoin(&self, a: Ref, b: Ref) -> Ref {
        self.mk_and(a, b)
    }
    fn disjoin(&self, a: Ref, b: Ref) -> Ref {
        self.mk_or(a, b)
    }
    fn complement(&self, a: Ref) -> Ref {
        self.mk_not(a)
    }

    fn is_satisfiable(&self, a: Ref) -> bool {
        CharSetSolver::is_satisfiable(self, a)
    }
}
