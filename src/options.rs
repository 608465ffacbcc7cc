use crate::types::Encoding;

/// Settings for translating patterns and sampling members.
///
/// ```
/// use symrex::options::RexOptions;
/// use symrex::types::Encoding;
///
/// let options = RexOptions::default()
///     .with_encoding(Encoding::Ascii)
///     .with_ignore_case(true)
///     .with_seed(42);
/// assert_eq!(options.seed, Some(42));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RexOptions {
    /// Alphabet of the generated strings (default: [`Encoding::Utf16`]).
    pub encoding: Encoding,
    /// Match letters case-insensitively, as the `i` flag (default: false).
    pub ignore_case: bool,
    /// `^` and `$` match at line boundaries, as the `m` flag (default: false).
    pub multi_line: bool,
    /// `.` also matches `\n`, as the `s` flag (default: false).
    pub dot_all: bool,
    /// Generate members of the intersection of all patterns (default: false).
    pub intersect: bool,
    /// Seed for the random choices; `None` picks a fresh one (default: None).
    pub seed: Option<u64>,
}

impl Default for RexOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            ignore_case: false,
            multi_line: false,
            dot_all: false,
            intersect: false,
            seed: None,
        }
    }
}

impl RexOptions {
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_ignore_case(mut self, value: bool) -> Self {
        self.ignore_case = value;
        self
    }

    pub fn with_multi_line(mut self, value: bool) -> Self {
        self.multi_line = value;
        self
    }

    pub fn with_dot_all(mut self, value: bool) -> Self {
        self.dot_all = value;
        self
    }

    pub fn with_intersect(mut self, value: bool) -> Self {
        self.intersect = value;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
