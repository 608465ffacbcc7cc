use crate::reference::Ref;

/// A decision node: "if bit at `ordinal` is set, follow `high`, else follow `low`".
///
/// Ordinal 0 tests the most significant bit of the character code.
/// Terminals carry [`Node::TERMINAL_ORDINAL`], so they sort after every decision node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Node {
    pub ordinal: u32,
    pub high: Ref,
    pub low: Ref,
}

impl Node {
    pub const TERMINAL_ORDINAL: u32 = u32::MAX;

    pub fn new(ordinal: u32, high: Ref, low: Ref) -> Self {
        Self { ordinal, high, low }
    }

    pub fn terminal() -> Self {
        Self {
            ordinal: Self::TERMINAL_ORDINAL,
            high: Ref::ZERO,
            low: Ref::ZERO,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.ordinal == Self::TERMINAL_ORDINAL
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::terminal()
    }
}
