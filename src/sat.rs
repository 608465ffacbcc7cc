use crate::chooser::Chooser;
use crate::reference::Ref;
use crate::solver::CharSetSolver;

impl CharSetSolver {
    /// Pick a random code accepted by `f`.
    ///
    /// Descends from ordinal 0. Bits the diagram does not test are fair coin
    /// flips; at a node, an unsatisfiable branch forces the other one.
    pub fn generate_member(&self, chooser: &mut Chooser, f: Ref) -> u32 {
        assert!(!f.is_zero(), "Cannot pick a member of the empty set");

        let bits = self.bits();
        let mut code = 0;
        let mut current = f;

        for ordinal in 0..bits {
            let bit = if current.is_one() || self.ordinal(current) > ordinal {
                // Don't-care bit
                chooser.choose_bool()
            } else {
                let node = self.node(current);
                let bit = if node.high.is_zero() {
                    false
                } else if node.low.is_zero() {
                    true
                } else {
                    chooser.choose_bool()
                };
                current = if bit { node.high } else { node.low };
                bit
            };
            code = (code << 1) | bit as u32;
        }

        debug_assert!(current.is_one());
        code
    }

    /// The smallest code accepted by `f`, if any.
    pub fn min_member(&self, f: Ref) -> Option<u32> {
        if f.is_zero() {
            return None;
        }

        let bits = self.bits();
        let mut code = 0;
        let mut current = f;

        // Walk down the diagram, preferring the low branch whenever it is satisfiable
        for ordinal in 0..bits {
            let bit = if current.is_one() || self.ordinal(current) > ordinal {
                false
            } else {
                let node = self.node(current);
                let bit = node.low.is_zero();
                current = if bit { node.high } else { node.low };
                bit
            };
            code = (code << 1) | bit as u32;
        }

        Some(code)
    }
}
