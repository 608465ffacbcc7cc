//! Lowering of the syntax tree into a symbolic automaton.
//!
//! The translator walks the tree recursively, threading three things through
//! the walk: the next unused state id, and whether the current node sits at
//! the very start or the very end of the whole pattern. Nodes at an edge that
//! is not anchored accept an arbitrary prefix or suffix, which gives the
//! resulting automaton search semantics: it accepts every string in which
//! the pattern finds a match.

use std::cmp::Ordering;

use log::{debug, trace};

use crate::automaton::{Automaton, Sfa, StateId};
use crate::error::{Anchor, ErrorKind};
use crate::reference::Ref;
use crate::solver::CharSetSolver;
use crate::syntax::{CharClass, ClassExpr, ClassItem, ClassOp, NodeKind, RegexNode};
use crate::types::Encoding;
use crate::unicode::CategoryProvider;

/// Every code a generated string may contain: the whole alphabet, minus the
/// surrogate block for [`Encoding::Utf16`].
pub fn universe(solver: &CharSetSolver) -> Ref {
    match solver.encoding() {
        Encoding::Utf16 => solver.mk_not(solver.mk_range_constraint(false, 0xD800, 0xDFFF)),
        _ => solver.one(),
    }
}

pub struct Translator<'a> {
    solver: &'a CharSetSolver,
    categories: &'a CategoryProvider,
    next_state: StateId,
    universe: Ref,
}

impl<'a> Translator<'a> {
    pub fn new(solver: &'a CharSetSolver, categories: &'a CategoryProvider) -> Self {
        Self {
            solver,
            categories,
            next_state: 0,
            universe: universe(solver),
        }
    }

    /// Translate a whole pattern.
    pub fn translate(&mut self, node: &RegexNode) -> Result<Automaton<Ref>, ErrorKind> {
        let res = self.convert(node, true, true)?;
        let res = self.wrap_zero_width(node, res, true, true);
        debug!(
            "translated into {} states and {} moves",
            res.num_states(),
            res.num_moves()
        );
        Ok(res)
    }

    fn convert(&mut self, node: &RegexNode, at_start: bool, at_end: bool) -> Result<Automaton<Ref>, ErrorKind> {
        trace!(
            "convert({:?}, at_start = {}, at_end = {})",
            std::mem::discriminant(&node.kind),
            at_start,
            at_end
        );

        let ic = node.ignore_case;
        let solver = self.solver;

        let res = match &node.kind {
            NodeKind::Empty => Automaton::Epsilon,
            NodeKind::Literal(c) => {
                let p = solver.mk_and(solver.mk_char_constraint(ic, *c), self.universe);
                self.leaf(&[p], at_start, at_end)
            }
            NodeKind::NotLiteral(c) => {
                let p = solver.mk_diff(self.universe, solver.mk_char_constraint(ic, *c));
                self.leaf(&[p], at_start, at_end)
            }
            NodeKind::Set(cls) => {
                let p = self.class(cls, ic);
                self.leaf(&[p], at_start, at_end)
            }
            NodeKind::String(chars) => {
                let preds: Vec<Ref> = chars
                    .iter()
                    .map(|&c| solver.mk_and(solver.mk_char_constraint(ic, c), self.universe))
                    .collect();
                self.leaf(&preds, at_start, at_end)
            }
            NodeKind::Concat(children) => self.concat(children, at_start, at_end)?,
            NodeKind::Alternate(children) => {
                let mut parts = Vec::with_capacity(children.len());
                for child in children {
                    let part = self.convert(child, at_start, at_end)?;
                    parts.push(self.wrap_zero_width(child, part, at_start, at_end));
                }
                Automaton::alternate(parts, solver)
            }
            NodeKind::Loop { min, max, body } => {
                let body = self.convert(body, false, false)?;
                let repeated = body.bounded_repeat(*min, *max, solver);
                self.advance(&repeated);
                self.wrap_free(repeated, at_start, at_end)
            }
            NodeKind::Capture(inner) => self.convert(inner, at_start, at_end)?,
            NodeKind::StartAnchor => {
                if !at_start {
                    return Err(ErrorKind::MisplacedAnchor(Anchor::Start));
                }
                Automaton::Epsilon
            }
            NodeKind::EndAnchor => {
                if !at_end {
                    return Err(ErrorKind::MisplacedAnchor(Anchor::End));
                }
                Automaton::Epsilon
            }
            NodeKind::StartOfLine => {
                if !at_start {
                    return Err(ErrorKind::MisplacedAnchor(Anchor::StartOfLine));
                }
                self.start_of_line()
            }
            NodeKind::EndOfLine => {
                if !at_end {
                    return Err(ErrorKind::MisplacedAnchor(Anchor::EndOfLine));
                }
                self.end_of_line()
            }
            NodeKind::Unsupported(construct) => return Err(ErrorKind::Unsupported(*construct)),
        };

        self.advance(&res);
        Ok(res)
    }

    /// Concatenation. Zero-width children (anchors, empty groups) do not
    /// count when deciding which child sits at an edge of the pattern: an
    /// anchor is allowed wherever only zero-width children separate it from
    /// the edge, and the first consuming child gets a free prefix unless a
    /// start anchor precedes it.
    fn concat(&mut self, children: &[RegexNode], at_start: bool, at_end: bool) -> Result<Automaton<Ref>, ErrorKind> {
        let n = children.len();
        let first = children.iter().position(|c| !is_zero_width(c)).unwrap_or(n);
        let last = children.iter().rposition(|c| !is_zero_width(c));

        let mut parts = Vec::with_capacity(n);
        // Every child is converted so that errors surface even past an empty part
        for (i, child) in children.iter().enumerate() {
            let child_start = match i.cmp(&first) {
                Ordering::Less => at_start,
                Ordering::Equal => at_start && !children[..i].iter().any(has_start_anchor),
                Ordering::Greater => false,
            };
            let child_end = match last.map(|last| i.cmp(&last)) {
                None | Some(Ordering::Greater) => at_end,
                Some(Ordering::Equal) => at_end && !children[i + 1..].iter().any(has_end_anchor),
                Some(Ordering::Less) => false,
            };
            parts.push(self.convert(child, child_start, child_end)?);
        }
        Ok(Automaton::concat_many(parts))
    }

    /// Give a zero-width node at a pattern edge the free prefix or suffix
    /// that no consuming node inside it could provide.
    fn wrap_zero_width(&mut self, node: &RegexNode, automaton: Automaton<Ref>, at_start: bool, at_end: bool) -> Automaton<Ref> {
        if !is_zero_width(node) {
            return automaton;
        }
        let prefix = at_start && !has_start_anchor(node);
        let suffix = at_end && !has_end_anchor(node);
        if prefix && suffix && automaton.is_epsilon() {
            return self.free_loop();
        }
        self.wrap_free(automaton, prefix, suffix)
    }

    fn advance(&mut self, automaton: &Automaton<Ref>) {
        if let Some(max) = automaton.max_state() {
            self.next_state = self.next_state.max(max + 1);
        }
    }

    fn leaf(&mut self, predicates: &[Ref], at_start: bool, at_end: bool) -> Automaton<Ref> {
        let res = Automaton::from_predicates(
            self.next_state,
            predicates,
            at_start,
            at_end,
            self.universe,
            self.solver,
        );
        self.advance(&res);
        res
    }

    /// `.*` over the universe, as a single accepting state.
    fn free_loop(&mut self) -> Automaton<Ref> {
        let res = Automaton::free_loop(self.next_state, self.universe);
        self.advance(&res);
        res
    }

    fn wrap_free(&mut self, automaton: Automaton<Ref>, at_start: bool, at_end: bool) -> Automaton<Ref> {
        let mut res = automaton;
        if at_start {
            res = self.free_loop().concat(res);
        }
        if at_end {
            let suffix = self.free_loop();
            res = res.concat(suffix);
        }
        res
    }

    /// Accepts the empty word and every string ending in `\n`.
    fn start_of_line(&mut self) -> Automaton<Ref> {
        let solver = self.solver;
        let nl = solver.mk_char_constraint(false, '\n');
        let not_nl = solver.mk_diff(self.universe, nl);
        let (a, b) = (self.next_state, self.next_state + 1);

        let mut sfa = Sfa::new(a);
        sfa.add_move(a, a, Some(nl));
        sfa.add_move(a, b, Some(not_nl));
        sfa.add_move(b, a, Some(nl));
        sfa.add_move(b, b, Some(not_nl));
        sfa.set_final(a, true);
        Automaton::General(sfa)
    }

    /// Accepts the empty word and every string starting with `\n`.
    fn end_of_line(&mut self) -> Automaton<Ref> {
        let solver = self.solver;
        let nl = solver.mk_char_constraint(false, '\n');
        let (a, b) = (self.next_state, self.next_state + 1);

        let mut sfa = Sfa::new(a);
        sfa.add_move(a, b, Some(nl));
        sfa.add_move(b, b, Some(self.universe));
        sfa.set_final(a, true);
        sfa.set_final(b, true);
        Automaton::General(sfa)
    }

    fn class(&self, cls: &CharClass, ignore_case: bool) -> Ref {
        let solver = self.solver;
        let p = self.class_expr(&cls.expr, ignore_case);
        let p = if cls.negated { solver.mk_not(p) } else { p };
        solver.mk_and(p, self.universe)
    }

    fn class_expr(&self, expr: &ClassExpr, ignore_case: bool) -> Ref {
        let solver = self.solver;
        match expr {
            ClassExpr::Items(items) => solver.mk_or_many(items.iter().map(|item| self.class_item(item, ignore_case))),
            ClassExpr::Binary { op, lhs, rhs } => {
                let l = self.class_expr(lhs, ignore_case);
                let r = self.class_expr(rhs, ignore_case);
                match op {
                    ClassOp::Intersection => solver.mk_and(l, r),
                    ClassOp::Difference => solver.mk_diff(l, r),
                    ClassOp::SymmetricDifference => solver.mk_xor(l, r),
                }
            }
        }
    }

    fn class_item(&self, item: &ClassItem, ignore_case: bool) -> Ref {
        let solver = self.solver;
        let negate = |p: Ref, negated: bool| if negated { solver.mk_not(p) } else { p };
        match item {
            ClassItem::Range(lo, hi) => solver.mk_range_constraint(ignore_case, *lo as u32, *hi as u32),
            ClassItem::Category { categories, negated } => {
                negate(self.categories.categories(solver, categories), *negated)
            }
            ClassItem::Whitespace { negated } => negate(self.categories.whitespace(solver), *negated),
            ClassItem::WordLetter { negated } => negate(self.categories.word_letter(solver), *negated),
            ClassItem::Decoded { ranges, negated } => negate(solver.mk_ranges_constraint(false, ranges), *negated),
            ClassItem::Nested(cls) => self.class(cls, ignore_case),
        }
    }
}

/// Whether `node` can only match the empty word (possibly under a line condition).
fn is_zero_width(node: &RegexNode) -> bool {
    match &node.kind {
        NodeKind::Empty
        | NodeKind::StartAnchor
        | NodeKind::EndAnchor
        | NodeKind::StartOfLine
        | NodeKind::EndOfLine => true,
        NodeKind::Capture(inner) => is_zero_width(inner),
        NodeKind::Concat(children) => children.iter().all(is_zero_width),
        _ => false,
    }
}

fn has_start_anchor(node: &RegexNode) -> bool {
    match &node.kind {
        NodeKind::StartAnchor | NodeKind::StartOfLine => true,
        NodeKind::Capture(inner) => has_start_anchor(inner),
        NodeKind::Concat(children) => children.iter().any(has_start_anchor),
        _ => false,
    }
}

fn has_end_anchor(node: &RegexNode) -> bool {
    match &node.kind {
        NodeKind::EndAnchor | NodeKind::EndOfLine => true,
        NodeKind::Capture(inner) => has_end_anchor(inner),
        NodeKind::Concat(children) => children.iter().any(has_end_anchor),
        _ => false,
    }
}
