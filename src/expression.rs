//! The tagged-union AST (component C7's node shape, spec §3).
//!
//! Every node is allocated from a [`Store<Expression>`](crate::store::Store)
//! owned by the enclosing [`ParseAnswer`](crate::driver::ParseAnswer); a
//! child is referenced by [`ExprId`], a non-owning, pointer-stable handle
//! into that arena rather than a `Box`. This mirrors the teacher's
//! `expression.rs` enum shape (one variant per grammar production) while
//! keeping the ownership model the spec calls for: the arena owns every
//! node, so dropping a `ParseAnswer` drops the whole tree at once without
//! walking it.

use crate::store::StorePtr;
use crate::token::WordKind;

/// A handle to an [`Expression`] owned by some [`Store<Expression>`](crate::store::Store).
pub type ExprId = StorePtr<Expression>;

/// A single AST node. See spec §3 for the full field-by-field contract;
/// each variant here corresponds 1:1 to a production named there.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// Template concatenation: evaluate each child and join their string
    /// forms.
    List(Vec<ExprId>),
    /// Literal template text, pre-escape-decode (decoding is deferred to
    /// evaluation, see [`crate::eval`]).
    NoneEmbedded(String),
    /// `#{ ... }` — evaluate and escape-filter the result.
    Unfold(ExprId),
    /// `!{ ... }` — evaluate and insert the raw result.
    NoEscapeUnfold(ExprId),
    /// `${ decl; decl; ... }` — each child is a [`Expression::VariableDecl`]
    /// evaluated purely for its binding side effect.
    VariableList(Vec<ExprId>),
    /// `name = value`, binding `name` in the current (innermost) scope.
    VariableDecl { name: String, value: ExprId },
    /// `{if}`/`{elseif}`/`{else}`/`{/if}`. Children are
    /// [`Expression::IfCondition`] or [`Expression::Else`] nodes, tried in
    /// order.
    If(Vec<ExprId>),
    IfCondition { cond: ExprId, body: ExprId },
    Else(ExprId),
    Ternary { cond: ExprId, then_branch: ExprId, else_branch: ExprId },
    /// A parenthesized sub-expression. Kept as its own node (rather than
    /// being unwrapped at parse time) so `Display` can round-trip the
    /// source's grouping.
    Paren(ExprId),
    Binary { op: WordKind, lhs: ExprId, rhs: ExprId },
    Unary { op: WordKind, expr: ExprId },
    Number(f64),
    Bool(bool),
    /// A string literal, stored as the lexer captured it (including its
    /// surrounding quote characters). Escape decoding happens in
    /// [`crate::eval`], per spec §4.7 — this is why a malformed escape
    /// surfaces as a [`crate::error::ValueError`], not a
    /// [`crate::error::ParseError`].
    String(String),
    /// A string whose text is inserted as-is, with no escape decoding.
    /// The surface grammar never produces this node directly (every
    /// quoted literal goes through [`Expression::String`]); it exists so
    /// the evaluator's dispatch table matches spec §3 exactly and so
    /// future host-level literal injection has somewhere to land.
    NoEscapeString(String),
    Identifier(String),
    ArrayLiteral(Vec<ExprId>),
    ArrayIndex { base: ExprId, index: ExprId },
    /// `{for var in collection} body {/for}`.
    For { var: String, collection: ExprId, body: ExprId },
    /// `{select expr} ... {/select}`. First child is always
    /// [`Expression::SelectTop`]; the rest are
    /// [`Expression::SelectCase`]/[`Expression::SelectDefault`].
    Select(Vec<ExprId>),
    SelectTop { expr: ExprId, prelude: ExprId },
    SelectCase { expr: ExprId, body: ExprId },
    SelectDefault(ExprId),
    /// `name(args...)`. `name` is the literal identifier text the grammar
    /// requires before `(` — there is no syntax for a computed callee, so
    /// this stores the name directly rather than nesting an `Identifier`
    /// node.
    FunctionCall { name: String, args: Vec<ExprId> },
}

impl Expression {
    /// Child node ids, in evaluation order. Used by [`crate::display`] and
    /// by tests that want to walk the tree without duplicating this match
    /// arm-by-arm.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            Self::List(cs) | Self::VariableList(cs) | Self::If(cs) | Self::ArrayLiteral(cs) | Self::Select(cs) => {
                cs.clone()
            }
            Self::Unfold(e) | Self::NoEscapeUnfold(e) | Self::Else(e) | Self::Paren(e) | Self::SelectDefault(e) => {
                vec![*e]
            }
            Self::VariableDecl { value, .. } => vec![*value],
            Self::IfCondition { cond, body } => vec![*cond, *body],
            Self::Ternary { cond, then_branch, else_branch } => vec![*cond, *then_branch, *else_branch],
            Self::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            Self::Unary { expr, .. } => vec![*expr],
            Self::ArrayIndex { base, index } => vec![*base, *index],
            Self::For { collection, body, .. } => vec![*collection, *body],
            Self::SelectTop { expr, prelude } => vec![*expr, *prelude],
            Self::SelectCase { expr, body } => vec![*expr, *body],
            Self::FunctionCall { args, .. } => args.clone(),
            Self::Number(_) | Self::Bool(_) | Self::String(_) | Self::NoEscapeString(_) | Self::Identifier(_) => {
                Vec::new()
            }
        }
    }
}
