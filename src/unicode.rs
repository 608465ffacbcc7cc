//! Unicode category predicates.
//!
//! Ranges are decoded from the static tables shipped with `regex-syntax`,
//! by translating a one-class pattern such as `\p{Lu}` to its HIR.

use std::cell::OnceCell;
use std::fmt;

use log::debug;
use regex_syntax::hir::{Class, HirKind};

use crate::reference::Ref;
use crate::solver::CharSetSolver;

/// The thirty Unicode general categories.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum GeneralCategory {
    UppercaseLetter,
    LowercaseLetter,
    TitlecaseLetter,
    ModifierLetter,
    OtherLetter,
    NonSpacingMark,
    SpacingCombiningMark,
    EnclosingMark,
    DecimalDigitNumber,
    LetterNumber,
    OtherNumber,
    SpaceSeparator,
    LineSeparator,
    ParagraphSeparator,
    Control,
    Format,
    Surrogate,
    PrivateUse,
    ConnectorPunctuation,
    DashPunctuation,
    OpenPunctuation,
    ClosePunctuation,
    InitialQuotePunctuation,
    FinalQuotePunctuation,
    OtherPunctuation,
    MathSymbol,
    CurrencySymbol,
    ModifierSymbol,
    OtherSymbol,
    OtherNotAssigned,
}

use GeneralCategory::*;

impl GeneralCategory {
    pub const ALL: [GeneralCategory; 30] = [
        UppercaseLetter,
        LowercaseLetter,
        TitlecaseLetter,
        ModifierLetter,
        OtherLetter,
        NonSpacingMark,
        SpacingCombiningMark,
        EnclosingMark,
        DecimalDigitNumber,
        LetterNumber,
        OtherNumber,
        SpaceSeparator,
        LineSeparator,
        ParagraphSeparator,
        Control,
        Format,
        Surrogate,
        PrivateUse,
        ConnectorPunctuation,
        DashPunctuation,
        OpenPunctuation,
        ClosePunctuation,
        InitialQuotePunctuation,
        FinalQuotePunctuation,
        OtherPunctuation,
        MathSymbol,
        CurrencySymbol,
        ModifierSymbol,
        OtherSymbol,
        OtherNotAssigned,
    ];

    /// The letter categories, `Nd` and `Pc`.
    pub const WORD_LETTER: [GeneralCategory; 7] = [
        UppercaseLetter,
        LowercaseLetter,
        TitlecaseLetter,
        ModifierLetter,
        OtherLetter,
        DecimalDigitNumber,
        ConnectorPunctuation,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Two-letter property value alias, e.g. `Lu`.
    pub fn abbrev(self) -> &'static str {
        match self {
            UppercaseLetter => "Lu",
            LowercaseLetter => "Ll",
            TitlecaseLetter => "Lt",
            ModifierLetter => "Lm",
            OtherLetter => "Lo",
            NonSpacingMark => "Mn",
            SpacingCombiningMark => "Mc",
            EnclosingMark => "Me",
            DecimalDigitNumber => "Nd",
            LetterNumber => "Nl",
            OtherNumber => "No",
            SpaceSeparator => "Zs",
            LineSeparator => "Zl",
            ParagraphSeparator => "Zp",
            Control => "Cc",
            Format => "Cf",
            Surrogate => "Cs",
            PrivateUse => "Co",
            ConnectorPunctuation => "Pc",
            DashPunctuation => "Pd",
            OpenPunctuation => "Ps",
            ClosePunctuation => "Pe",
            InitialQuotePunctuation => "Pi",
            FinalQuotePunctuation => "Pf",
            OtherPunctuation => "Po",
            MathSymbol => "Sm",
            CurrencySymbol => "Sc",
            ModifierSymbol => "Sk",
            OtherSymbol => "So",
            OtherNotAssigned => "Cn",
        }
    }

    /// Long property value name, e.g. `Uppercase_Letter`.
    pub fn long_name(self) -> &'static str {
        match self {
            UppercaseLetter => "Uppercase_Letter",
            LowercaseLetter => "Lowercase_Letter",
            TitlecaseLetter => "Titlecase_Letter",
            ModifierLetter => "Modifier_Letter",
            OtherLetter => "Other_Letter",
            NonSpacingMark => "Nonspacing_Mark",
            SpacingCombiningMark => "Spacing_Mark",
            EnclosingMark => "Enclosing_Mark",
            DecimalDigitNumber => "Decimal_Number",
            LetterNumber => "Letter_Number",
            OtherNumber => "Other_Number",
            SpaceSeparator => "Space_Separator",
            LineSeparator => "Line_Separator",
            ParagraphSeparator => "Paragraph_Separator",
            Control => "Control",
            Format => "Format",
            Surrogate => "Surrogate",
            PrivateUse => "Private_Use",
            ConnectorPunctuation => "Connector_Punctuation",
            DashPunctuation => "Dash_Punctuation",
            OpenPunctuation => "Open_Punctuation",
            ClosePunctuation => "Close_Punctuation",
            InitialQuotePunctuation => "Initial_Punctuation",
            FinalQuotePunctuation => "Final_Punctuation",
            OtherPunctuation => "Other_Punctuation",
            MathSymbol => "Math_Symbol",
            CurrencySymbol => "Currency_Symbol",
            ModifierSymbol => "Modifier_Symbol",
            OtherSymbol => "Other_Symbol",
            OtherNotAssigned => "Unassigned",
        }
    }

    /// Look up a category or a major category group by name.
    ///
    /// Accepts two-letter aliases (`Lu`), one-letter groups (`L`) and long
    /// names, ignoring case, spaces, hyphens and underscores.
    pub fn lookup(name: &str) -> Option<Vec<GeneralCategory>> {
        let key = normalize(name);

        let group = |prefix: char| -> Vec<GeneralCategory> {
            GeneralCategory::ALL
                .into_iter()
                .filter(|c| c.abbrev().starts_with(prefix))
                .collect()
        };
        match key.as_str() {
            "l" | "letter" => return Some(group('L')),
            "m" | "mark" | "combiningmark" => return Some(group('M')),
            "n" | "number" => return Some(group('N')),
            "z" | "separator" => return Some(group('Z')),
            "c" | "other" => return Some(group('C')),
            "p" | "punctuation" | "punct" => return Some(group('P')),
            "s" | "symbol" => return Some(group('S')),
            _ => {}
        }

        GeneralCategory::ALL
            .into_iter()
            .find(|c| normalize(c.abbrev()) == key || normalize(c.long_name()) == key)
            .map(|c| vec![c])
    }
}

impl fmt::Display for GeneralCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbrev())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | ' ' | '-'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Decode a single-class pattern like `\p{Greek}` into inclusive code ranges.
pub fn decode_class(pattern: &str) -> Result<Vec<(u32, u32)>, String> {
    let hir = regex_syntax::ParserBuilder::new()
        .build()
        .parse(pattern)
        .map_err(|e| e.to_string())?;

    match hir.kind() {
        HirKind::Class(Class::Unicode(cls)) => Ok(cls
            .ranges()
            .iter()
            .map(|r| (r.start() as u32, r.end() as u32))
            .collect()),
        HirKind::Class(Class::Bytes(cls)) => Ok(cls
            .ranges()
            .iter()
            .map(|r| (r.start() as u32, r.end() as u32))
            .collect()),
        // A class with a single member is simplified to a literal
        HirKind::Literal(lit) => {
            let s = std::str::from_utf8(&lit.0).map_err(|e| e.to_string())?;
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(vec![(c as u32, c as u32)]),
                _ => Err(format!("'{}' does not denote a character class", pattern)),
            }
        }
        HirKind::Empty => Ok(Vec::new()),
        _ => Err(format!("'{}' does not denote a character class", pattern)),
    }
}

/// Lazily built category predicates for one solver.
#[derive(Debug, Default)]
pub struct CategoryProvider {
    categories: [OnceCell<Ref>; 30],
    whitespace: OnceCell<Ref>,
    word_letter: OnceCell<Ref>,
}

impl CategoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self, solver: &CharSetSolver, category: GeneralCategory) -> Ref {
        *self.categories[category.index()].get_or_init(|| {
            let ranges = if category == Surrogate {
                // Not representable as `char`, so not in the decoded tables
                vec![(0xD800, 0xDFFF)]
            } else {
                known_class(&format!("\\p{{{}}}", category.abbrev()))
            };
            let res = solver.mk_ranges_constraint(false, &ranges);
            debug!(
                "category {} decoded: {} ranges, {} members in {}",
                category,
                ranges.len(),
                solver.count(res),
                solver.encoding()
            );
            res
        })
    }

    /// Union of several categories.
    pub fn categories(&self, solver: &CharSetSolver, categories: &[GeneralCategory]) -> Ref {
        solver.mk_or_many(categories.iter().map(|&c| self.category(solver, c)))
    }

    /// Unicode `White_Space`.
    pub fn whitespace(&self, solver: &CharSetSolver) -> Ref {
        *self.whitespace.get_or_init(|| {
            let ranges = known_class(r"\s");
            solver.mk_ranges_constraint(false, &ranges)
        })
    }

    /// Word characters: [`GeneralCategory::WORD_LETTER`] together with the
    /// rest of the parser's `\w` table (marks, `Nl`, other alphabetics, joiners).
    pub fn word_letter(&self, solver: &CharSetSolver) -> Ref {
        *self.word_letter.get_or_init(|| {
            let letters = self.categories(solver, &GeneralCategory::WORD_LETTER);
            let rest = solver.mk_ranges_constraint(false, &known_class(r"\w"));
            solver.mk_or(letters, rest)
        })
    }
}

fn known_class(pattern: &str) -> Vec<(u32, u32)> {
    match decode_class(pattern) {
        Ok(ranges) => ranges,
        Err(e) => panic!("Unicode table for {} is unavailable: {}", pattern, e),
    }
}
