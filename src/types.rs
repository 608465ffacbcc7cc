//! Alphabet descriptions for the character predicates.
//!
//! A predicate ranges over the `k` bits of a character code, where `k`
//! is fixed by the [`Encoding`] chosen by the caller.
use std::fmt;

/// Character encoding, which fixes the width of the predicate alphabet.
///
/// # Invariants
///
/// - Every code handed to the solver is `<= max_char()`
/// - For [`Encoding::Utf16`] the surrogate block is never a valid member
///   of a generated string (see [`Encoding::is_scalar`])
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Encoding {
    /// 7-bit ASCII.
    Ascii,
    /// 8-bit single-byte alphabet (Latin-1).
    Latin1,
    /// 16-bit double-byte alphabet (the Basic Multilingual Plane).
    #[default]
    Utf16,
}

impl Encoding {
    /// Number of bits in a character code.
    pub fn bits(self) -> u32 {
        match self {
            Encoding::Ascii => 7,
            Encoding::Latin1 => 8,
            Encoding::Utf16 => 16,
        }
    }

    /// The largest representable character code.
    pub fn max_char(self) -> u32 {
        (1 << self.bits()) - 1
    }

    /// Whether `code` is a Unicode scalar value inside this alphabet.
    pub fn is_scalar(self, code: u32) -> bool {
        code <= self.max_char() && char::from_u32(code).is_some()
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoding::Ascii => write!(f, "ascii"),
            Encoding::Latin1 => write!(f, "latin1"),
            Encoding::Utf16 => write!(f, "utf16"),
        }
    }
}

impl std::str::FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" | "7" => Ok(Encoding::Ascii),
            "latin1" | "8" => Ok(Encoding::Latin1),
            "utf16" | "unicode" | "16" => Ok(Encoding::Utf16),
            other => Err(format!("unknown encoding '{}'", other)),
        }
    }
}
