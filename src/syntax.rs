//! The syntax tree consumed by the translator.
//!
//! [`parse`] runs the `regex-syntax` AST parser and lowers its output into
//! [`RegexNode`]s: inline flags are resolved into a per-node `ignore_case`
//! bit and into the choice of anchors and classes, runs of literals become
//! [`NodeKind::String`], and constructs without a counterpart become
//! [`NodeKind::Unsupported`].

use regex_syntax::ast::{self, Ast};

use crate::error::{ErrorKind, UnsupportedConstruct};
use crate::options::RexOptions;
use crate::unicode::{decode_class, GeneralCategory};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexNode {
    pub kind: NodeKind,
    pub ignore_case: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Matches the empty word.
    Empty,
    Literal(char),
    /// Any character except this one.
    NotLiteral(char),
    Set(CharClass),
    String(Vec<char>),
    Concat(Vec<RegexNode>),
    Alternate(Vec<RegexNode>),
    Loop {
        min: u32,
        max: Option<u32>,
        body: Box<RegexNode>,
    },
    Capture(Box<RegexNode>),
    StartAnchor,
    EndAnchor,
    StartOfLine,
    EndOfLine,
    Unsupported(UnsupportedConstruct),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClass {
    pub negated: bool,
    pub expr: ClassExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassExpr {
    /// Union of the items.
    Items(Vec<ClassItem>),
    Binary {
        op: ClassOp,
        lhs: Box<ClassExpr>,
        rhs: Box<ClassExpr>,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ClassOp {
    Intersection,
    Difference,
    SymmetricDifference,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassItem {
    Range(char, char),
    Category {
        categories: Vec<GeneralCategory>,
        negated: bool,
    },
    Whitespace {
        negated: bool,
    },
    WordLetter {
        negated: bool,
    },
    /// Ranges decoded up front, e.g. scripts and POSIX classes.
    Decoded {
        ranges: Vec<(u32, u32)>,
        negated: bool,
    },
    Nested(CharClass),
}

impl RegexNode {
    pub fn new(kind: NodeKind, ignore_case: bool) -> Self {
        Self { kind, ignore_case }
    }

    fn plain(kind: NodeKind) -> Self {
        Self::new(kind, false)
    }
}

impl CharClass {
    pub fn new(negated: bool, items: Vec<ClassItem>) -> Self {
        Self {
            negated,
            expr: ClassExpr::Items(items),
        }
    }
}

/// Parse `pattern` with the flags of `options` in effect at the start.
pub fn parse(pattern: &str, options: &RexOptions) -> Result<RegexNode, ErrorKind> {
    let ast = ast::parse::ParserBuilder::new()
        .build()
        .parse(pattern)
        .map_err(|e| parse_error(pattern, &e))?;

    let mut flags = Flags {
        ignore_case: options.ignore_case,
        multi_line: options.multi_line,
        dot_all: options.dot_all,
        swap_greed: false,
        unicode: true,
    };
    lower(&ast, &mut flags)
}

fn parse_error(pattern: &str, e: &ast::Error) -> ErrorKind {
    match e.kind() {
        ast::ErrorKind::UnsupportedBackreference => ErrorKind::Unsupported(UnsupportedConstruct::Backreference),
        ast::ErrorKind::UnsupportedLookAround => ErrorKind::Unsupported(UnsupportedConstruct::Lookaround),
        _ if pattern.contains("(?(") => ErrorKind::Unsupported(UnsupportedConstruct::ConditionalAlternation),
        _ if pattern.contains("\\k<") || pattern.contains("\\k'") => {
            ErrorKind::Unsupported(UnsupportedConstruct::Backreference)
        }
        kind => ErrorKind::Syntax(format!("{} at offset {}", kind, e.span().start.offset)),
    }
}

#[derive(Debug, Copy, Clone)]
struct Flags {
    ignore_case: bool,
    multi_line: bool,
    dot_all: bool,
    swap_greed: bool,
    unicode: bool,
}

impl Flags {
    fn apply(&mut self, items: &ast::Flags) {
        let mut enable = true;
        for item in &items.items {
            match item.kind {
                ast::FlagsItemKind::Negation => enable = false,
                ast::FlagsItemKind::Flag(ast::Flag::CaseInsensitive) => self.ignore_case = enable,
                ast::FlagsItemKind::Flag(ast::Flag::MultiLine) => self.multi_line = enable,
                ast::FlagsItemKind::Flag(ast::Flag::DotMatchesNewLine) => self.dot_all = enable,
                ast::FlagsItemKind::Flag(ast::Flag::SwapGreed) => self.swap_greed = enable,
                ast::FlagsItemKind::Flag(ast::Flag::Unicode) => self.unicode = enable,
                // Handled by the parser or without effect on the language
                ast::FlagsItemKind::Flag(_) => {}
            }
        }
    }
}

fn lower(ast: &Ast, flags: &mut Flags) -> Result<RegexNode, ErrorKind> {
    let ic = flags.ignore_case;
    let node = match ast {
        Ast::Empty(_) => RegexNode::plain(NodeKind::Empty),
        Ast::Flags(set) => {
            flags.apply(&set.flags);
            RegexNode::plain(NodeKind::Empty)
        }
        Ast::Literal(lit) => RegexNode::new(NodeKind::Literal(lit.c), ic),
        Ast::Dot(_) => {
            if flags.dot_all {
                let all = CharClass::new(false, vec![ClassItem::Range('\0', char::MAX)]);
                RegexNode::plain(NodeKind::Set(all))
            } else {
                RegexNode::plain(NodeKind::NotLiteral('\n'))
            }
        }
        Ast::Assertion(assertion) => {
            let kind = match assertion.kind {
                ast::AssertionKind::StartLine if flags.multi_line => NodeKind::StartOfLine,
                ast::AssertionKind::EndLine if flags.multi_line => NodeKind::EndOfLine,
                ast::AssertionKind::StartLine | ast::AssertionKind::StartText => NodeKind::StartAnchor,
                ast::AssertionKind::EndLine | ast::AssertionKind::EndText => NodeKind::EndAnchor,
                _ => NodeKind::Unsupported(UnsupportedConstruct::WordBoundary),
            };
            RegexNode::plain(kind)
        }
        Ast::ClassUnicode(cls) => {
            let item = unicode_item(cls)?;
            RegexNode::new(NodeKind::Set(CharClass::new(false, vec![item])), ic)
        }
        Ast::ClassPerl(cls) => {
            let item = perl_item(cls, flags.unicode);
            RegexNode::new(NodeKind::Set(CharClass::new(false, vec![item])), ic)
        }
        Ast::ClassBracketed(cls) => RegexNode::new(NodeKind::Set(bracketed(cls, flags.unicode)?), ic),
        Ast::Repetition(rep) => {
            if rep.greedy == flags.swap_greed {
                return Ok(RegexNode::plain(NodeKind::Unsupported(UnsupportedConstruct::LazyQuantifier)));
            }
            let (min, max) = match &rep.op.kind {
                ast::RepetitionKind::ZeroOrOne => (0, Some(1)),
                ast::RepetitionKind::ZeroOrMore => (0, None),
                ast::RepetitionKind::OneOrMore => (1, None),
                ast::RepetitionKind::Range(ast::RepetitionRange::Exactly(n)) => (*n, Some(*n)),
                ast::RepetitionKind::Range(ast::RepetitionRange::AtLeast(n)) => (*n, None),
                ast::RepetitionKind::Range(ast::RepetitionRange::Bounded(m, n)) => (*m, Some(*n)),
            };
            let body = lower(&rep.ast, flags)?;
            RegexNode::new(
                NodeKind::Loop {
                    min,
                    max,
                    body: Box::new(body),
                },
                ic,
            )
        }
        Ast::Group(group) => match &group.kind {
            ast::GroupKind::CaptureIndex(_) => {
                let mut inner_flags = *flags;
                let inner = lower(&group.ast, &mut inner_flags)?;
                RegexNode::new(NodeKind::Capture(Box::new(inner)), ic)
            }
            ast::GroupKind::CaptureName { .. } => {
                RegexNode::plain(NodeKind::Unsupported(UnsupportedConstruct::NamedGroup))
            }
            ast::GroupKind::NonCapturing(group_flags) => {
                let mut inner_flags = *flags;
                inner_flags.apply(group_flags);
                lower(&group.ast, &mut inner_flags)?
            }
        },
        Ast::Alternation(alt) => {
            let mut children = Vec::with_capacity(alt.asts.len());
            for child in &alt.asts {
                children.push(lower(child, flags)?);
            }
            RegexNode::new(NodeKind::Alternate(children), ic)
        }
        Ast::Concat(concat) => lower_concat(&concat.asts, flags)?,
    };
    Ok(node)
}

/// Lower a concatenation, dropping flag directives and merging literal runs into strings.
fn lower_concat(asts: &[Ast], flags: &mut Flags) -> Result<RegexNode, ErrorKind> {
    let ic = flags.ignore_case;
    let mut children: Vec<RegexNode> = Vec::with_capacity(asts.len());

    for child in asts {
        if let Ast::Flags(set) = child {
            flags.apply(&set.flags);
            continue;
        }
        let node = lower(child, flags)?;

        let merged = match (children.last_mut(), &node.kind) {
            (Some(last), NodeKind::Literal(c)) if last.ignore_case == node.ignore_case => match &mut last.kind {
                NodeKind::Literal(prev) => {
                    last.kind = NodeKind::String(vec![*prev, *c]);
                    true
                }
                NodeKind::String(chars) => {
                    chars.push(*c);
                    true
                }
                _ => false,
            },
            _ => false,
        };
        if !merged {
            children.push(node);
        }
    }

    Ok(match children.len() {
        0 => RegexNode::plain(NodeKind::Empty),
        1 => children.remove(0),
        _ => RegexNode::new(NodeKind::Concat(children), ic),
    })
}

fn bracketed(cls: &ast::ClassBracketed, unicode: bool) -> Result<CharClass, ErrorKind> {
    Ok(CharClass {
        negated: cls.negated,
        expr: class_set(&cls.kind, unicode)?,
    })
}

fn class_set(set: &ast::ClassSet, unicode: bool) -> Result<ClassExpr, ErrorKind> {
    match set {
        ast::ClassSet::Item(item) => {
            let mut items = Vec::new();
            set_items(item, unicode, &mut items)?;
            Ok(ClassExpr::Items(items))
        }
        ast::ClassSet::BinaryOp(op) => {
            let kind = match op.kind {
                ast::ClassSetBinaryOpKind::Intersection => ClassOp::Intersection,
                ast::ClassSetBinaryOpKind::Difference => ClassOp::Difference,
                ast::ClassSetBinaryOpKind::SymmetricDifference => ClassOp::SymmetricDifference,
            };
            Ok(ClassExpr::Binary {
                op: kind,
                lhs: Box::new(class_set(&op.lhs, unicode)?),
                rhs: Box::new(class_set(&op.rhs, unicode)?),
            })
        }
    }
}

fn set_items(item: &ast::ClassSetItem, unicode: bool, out: &mut Vec<ClassItem>) -> Result<(), ErrorKind> {
    match item {
        ast::ClassSetItem::Empty(_) => {}
        ast::ClassSetItem::Literal(lit) => out.push(ClassItem::Range(lit.c, lit.c)),
        ast::ClassSetItem::Range(range) => out.push(ClassItem::Range(range.start.c, range.end.c)),
        ast::ClassSetItem::Ascii(ascii) => out.push(ClassItem::Decoded {
            ranges: ascii_ranges(&ascii.kind).to_vec(),
            negated: ascii.negated,
        }),
        ast::ClassSetItem::Unicode(cls) => out.push(unicode_item(cls)?),
        ast::ClassSetItem::Perl(cls) => out.push(perl_item(cls, unicode)),
        ast::ClassSetItem::Bracketed(cls) => out.push(ClassItem::Nested(bracketed(cls, unicode)?)),
        ast::ClassSetItem::Union(union) => {
            for item in &union.items {
                set_items(item, unicode, out)?;
            }
        }
    }
    Ok(())
}

fn unicode_item(cls: &ast::ClassUnicode) -> Result<ClassItem, ErrorKind> {
    let negated = cls.is_negated();

    let (category_name, decode_name) = match &cls.kind {
        ast::ClassUnicodeKind::OneLetter(c) => (Some(c.to_string()), c.to_string()),
        ast::ClassUnicodeKind::Named(name) => (Some(name.clone()), name.clone()),
        ast::ClassUnicodeKind::NamedValue { name, value, .. } => {
            let key = name.to_ascii_lowercase().replace(['_', ' ', '-'], "");
            let category = matches!(key.as_str(), "gc" | "generalcategory").then(|| value.clone());
            (category, format!("{}={}", name, value))
        }
    };

    if let Some(categories) = category_name.as_deref().and_then(GeneralCategory::lookup) {
        return Ok(ClassItem::Category { categories, negated });
    }

    let ranges = decode_class(&format!("\\p{{{}}}", decode_name)).map_err(ErrorKind::Syntax)?;
    Ok(ClassItem::Decoded { ranges, negated })
}

fn perl_item(cls: &ast::ClassPerl, unicode: bool) -> ClassItem {
    let negated = cls.negated;
    match (&cls.kind, unicode) {
        (ast::ClassPerlKind::Digit, true) => ClassItem::Category {
            categories: vec![GeneralCategory::DecimalDigitNumber],
            negated,
        },
        (ast::ClassPerlKind::Space, true) => ClassItem::Whitespace { negated },
        (ast::ClassPerlKind::Word, true) => ClassItem::WordLetter { negated },
        (ast::ClassPerlKind::Digit, false) => ClassItem::Decoded {
            ranges: ascii_ranges(&ast::ClassAsciiKind::Digit).to_vec(),
            negated,
        },
        (ast::ClassPerlKind::Space, false) => ClassItem::Decoded {
            ranges: ascii_ranges(&ast::ClassAsciiKind::Space).to_vec(),
            negated,
        },
        (ast::ClassPerlKind::Word, false) => ClassItem::Decoded {
            ranges: ascii_ranges(&ast::ClassAsciiKind::Word).to_vec(),
            negated,
        },
    }
}

fn ascii_ranges(kind: &ast::ClassAsciiKind) -> &'static [(u32, u32)] {
    use ast::ClassAsciiKind::*;
    match kind {
        Alnum => &[(0x30, 0x39), (0x41, 0x5A), (0x61, 0x7A)],
        Alpha => &[(0x41, 0x5A), (0x61, 0x7A)],
        Ascii => &[(0x00, 0x7F)],
        Blank => &[(0x09, 0x09), (0x20, 0x20)],
        Cntrl => &[(0x00, 0x1F), (0x7F, 0x7F)],
        Digit => &[(0x30, 0x39)],
        Graph => &[(0x21, 0x7E)],
        Lower => &[(0x61, 0x7A)],
        Print => &[(0x20, 0x7E)],
        Punct => &[(0x21, 0x2F), (0x3A, 0x40), (0x5B, 0x60), (0x7B, 0x7E)],
        Space => &[(0x09, 0x0D), (0x20, 0x20)],
        Upper => &[(0x41, 0x5A)],
        Word => &[(0x30, 0x39), (0x41, 0x5A), (0x5F, 0x5F), (0x61, 0x7A)],
        Xdigit => &[(0x30, 0x39), (0x41, 0x46), (0x61, 0x66)],
    }
}
