//! Errors reported for a single pattern.

use std::fmt;

use thiserror::Error;

/// The constructs the translator rejects.
pub const UNSUPPORTED_CONSTRUCTS: &str =
    "backreferences, lookaround, named groups, conditional alternation, lazy quantifiers, word boundaries";

/// A pattern that could not be turned into an automaton.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("pattern `{pattern}`: {kind}")]
pub struct Error {
    pub pattern: String,
    pub kind: ErrorKind,
}

impl Error {
    pub fn new(pattern: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            pattern: pattern.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("unsupported construct: {0} (not supported: {list})", list = UNSUPPORTED_CONSTRUCTS)]
    Unsupported(UnsupportedConstruct),

    #[error("misplaced anchor: {0} is only allowed at the start or end of the whole pattern")]
    MisplacedAnchor(Anchor),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnsupportedConstruct {
    Backreference,
    Lookaround,
    NamedGroup,
    ConditionalAlternation,
    LazyQuantifier,
    WordBoundary,
}

impl fmt::Display for UnsupportedConstruct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnsupportedConstruct::Backreference => "backreference",
            UnsupportedConstruct::Lookaround => "lookaround",
            UnsupportedConstruct::NamedGroup => "named group",
            UnsupportedConstruct::ConditionalAlternation => "conditional alternation",
            UnsupportedConstruct::LazyQuantifier => "lazy quantifier",
            UnsupportedConstruct::WordBoundary => "word boundary",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// `^` or `\A`
    Start,
    /// `$` or `\z`
    End,
    /// `^` in multi-line mode
    StartOfLine,
    /// `$` in multi-line mode
    EndOfLine,
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anchor::Start => write!(f, "start anchor"),
            Anchor::End => write!(f, "end anchor"),
            Anchor::StartOfLine => write!(f, "start-of-line anchor"),
            Anchor::EndOfLine => write!(f, "end-of-line anchor"),
        }
    }
}
