//! Token and segment types produced by the lexer (component C4).
//!
//! [`Word`]/[`WordKind`] are expression tokens (spec §3, §4.4 `splitWords`);
//! [`EmbeddedText`]/[`SegmentKind`] are template segments (§3, §4.4
//! `splitEmbedded`). Both carry their matched text alongside the
//! classification so the parser never needs to re-slice the source.

use derive_more::Display;

/// Classification of an expression token.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WordKind {
    Identifier,
    Number,
    StringLiteral,
    TrueLiteral,
    FalseLiteral,
    Period,
    Assign,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEq,
    GreaterEq,
    Plus,
    Minus,
    Multiply,
    Divide,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Not,
    Comma,
    Hash,
    Dollar,
    Question,
    Colon,
    Semicolon,
    Backslash,
    And,
    Or,
    Xor,
    In,
}

/// A single expression-grammar token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub text: String,
    pub kind: WordKind,
}

impl Word {
    pub fn new(text: impl Into<String>, kind: WordKind) -> Self {
        Self { text: text.into(), kind }
    }
}

/// Classification of a template segment.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    Text,
    Unfold,
    NoEscapeUnfold,
    Variables,
    IfBlock,
    ElseIfBlock,
    ElseBlock,
    EndIfBlock,
    ForBlock,
    EndForBlock,
    SelectBlock,
    SelectCaseBlock,
    SelectDefaultBlock,
    EndSelectBlock,
    EmptyBlock,
}

/// A single template-grammar segment. For the block-header kinds
/// (`IfBlock`, `ElseIfBlock`, `ForBlock`, `SelectBlock`, `SelectCaseBlock`)
/// `text` holds only the inner header/condition, with keyword and braces
/// already stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedText {
    pub text: String,
    pub kind: SegmentKind,
}

impl EmbeddedText {
    pub fn new(text: impl Into<String>, kind: SegmentKind) -> Self {
        Self { text: text.into(), kind }
    }
}
