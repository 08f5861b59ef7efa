//! Error kinds (component A1), one enum per failure category from spec §7.
//!
//! Shaped after `slumber_template`'s `error.rs`: a handful of focused
//! `thiserror` enums rather than one flat list, joined into a single
//! top-level [`WordsmithError`] via `#[from]` so `?` composes across lexer,
//! parser, and evaluator boundaries the way `RenderError` does for the
//! teacher's render pipeline.

use crate::store::PopFailed;
use crate::token::WordKind;
use thiserror::Error;

/// Lexical analysis failures (spec §7 "Lexical").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unclosed string literal")]
    UnclosedStringLiteralError,

    #[error("consecutive underscore separators in numeric literal")]
    ConsecutiveUnderscoreError,

    #[error("invalid command `{command}`")]
    InvalidCommandError { command: String },

    #[error("unclosed block")]
    UnclosedBlockError,
}

/// Parsing failures (spec §7 "Parser").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("invalid expression")]
    InvalidExpression,

    #[error("ternary operator missing `:` branch")]
    TernaryOperatorParseFailed,

    #[error("invalid variable name")]
    InvalidVariableName,

    #[error("variable declaration missing `=`")]
    VariableAssignmentMissing,

    #[error("variable declaration missing value")]
    VariableValueMissing,

    #[error("`{{if}}` block not closed")]
    IfBlockNotClosed,

    #[error("`{{else}}`/`{{elseif}}`/`{{/if}}` without a matching `{{if}}`")]
    IfBlockNotStarted,

    #[error("`{{for}}` block not closed")]
    ForBlockNotClosed,

    #[error("`{{/for}}` without a matching `{{for}}`")]
    ForBlockNotStarted,

    #[error("invalid `{{for}}` header")]
    ForParseFailed,

    #[error("`{{select}}` block not closed")]
    SelectBlockNotClosed,

    #[error("`{{select}}` missing scrutinee expression")]
    InvalidSelectExpression,

    #[error("`{{case}}` missing value expression")]
    InvalidSelectCaseValue,

    #[error("variable declarations must be separated by `;`")]
    VariableNotSemicolonSeparated,
}

/// Variable environment failures (spec §7 "Variable").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VariableError {
    #[error("variable `{name}` not found")]
    NotFound { name: String },

    #[error("cannot pop the last scope")]
    CannotRemoveLastScope,
}

/// Value-algebra and evaluation failures (spec §7 "Value").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("array index {index} out of bounds (length {len})")]
    ArrayIndexOutOfBounds { index: i64, len: usize },

    #[error("value is not an array")]
    NotAnArray,

    #[error("invalid array index (must be a non-negative number)")]
    InvalidArrayAccess,

    #[error("invalid escape sequence `\\{sequence}`")]
    EscapeSequenceParseFailed { sequence: String },

    #[error("evaluation failed")]
    EvaluationFailed,

    #[error("calculation failed")]
    CalculationFailed,

    #[error("logical operation failed")]
    LogicalOperationFailed,

    #[error("unary operator `{op}` not supported for this operand")]
    UnaryOperatorNotSupported { op: WordKind },

    #[error("binary operator `{op}` not supported for these operands")]
    BinaryOperatorNotSupported { op: WordKind },

    #[error("function call to `{name}` failed")]
    FunctionCallFailed { name: String },

    #[error("if condition must evaluate to a boolean")]
    InvalidIfStatement,

    #[error("`{{for}}` collection element cannot itself be an array")]
    InvalidForCollection,

    #[error("identifier `{name}` could not be resolved")]
    IdentifierParseFailed { name: String },

    #[error(transparent)]
    Variable(#[from] VariableError),

    #[error(transparent)]
    Store(#[from] PopFailed),
}

/// Crate-wide error type returned by the driver API (component C10).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WordsmithError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Value(#[from] ValueError),

    #[error(transparent)]
    Variable(#[from] VariableError),
}

pub type LexResult<T> = Result<T, LexError>;
pub type ParseResult<T> = Result<T, ParseError>;
pub type VariableResult<T> = Result<T, VariableError>;
pub type ValueResult<T> = Result<T, ValueError>;
pub type WordsmithResult<T> = Result<T, WordsmithError>;
