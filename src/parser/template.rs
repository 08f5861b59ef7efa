//! Template parser (component C6, spec §4.6).
//!
//! Drives the flat [`EmbeddedText`] segment sequence [`crate::lexer::split_embedded`]
//! produces, re-entering [`crate::parser::expr`] for every embedded
//! expression (`#{}`, `!{}`, `${}`, and every block header). Nesting of
//! `{if}`/`{for}`/`{select}` is resolved structurally: a nested `{if}`
//! consumes its own `{/if}` while being parsed as one ordinary child of the
//! enclosing body, so a sibling `{else}`/`{/if}` is never mistaken for one
//! belonging to an inner block — there's no separate depth counter to keep
//! in sync.

use crate::error::{ParseError, ParseResult};
use crate::expression::{ExprId, Expression};
use crate::lexer::split_words;
use crate::parser::expr::{parse_expression, parse_for_header, parse_variable_list};
use crate::store::Store;
use crate::token::{EmbeddedText, SegmentKind};

/// Parse a complete template from its segment sequence into a single
/// top-level [`Expression::List`]. Any segment that doesn't belong at the
/// position it's found (a stray `{else}`, an unmatched `{/for}`, ...)
/// aborts the whole parse, matching spec §4.6's "both parsers reject
/// leftover tokens/segments at top level".
pub fn parse_template(store: &mut Store<Expression>, segments: &[EmbeddedText]) -> ParseResult<ExprId> {
    let mut parser = Parser { store, segments, pos: 0 };
    let list = parser.parse_list_until(&[])?;
    if parser.pos != parser.segments.len() {
        return Err(ParseError::InvalidExpression);
    }
    Ok(list)
}

struct Parser<'s> {
    store: &'s mut Store<Expression>,
    segments: &'s [EmbeddedText],
    pos: usize,
}

impl<'s> Parser<'s> {
    fn peek_kind(&self) -> Option<SegmentKind> {
        self.segments.get(self.pos).map(|s| s.kind)
    }

    fn advance(&mut self) -> Option<EmbeddedText> {
        let seg = self.segments.get(self.pos).cloned();
        if seg.is_some() {
            self.pos += 1;
        }
        seg
    }

    /// Parse a run of nodes into a single `List`, stopping (without
    /// consuming) at the first segment whose kind is in `stop_kinds`, or at
    /// end of input.
    fn parse_list_until(&mut self, stop_kinds: &[SegmentKind]) -> ParseResult<ExprId> {
        let mut children = Vec::new();
        while let Some(kind) = self.peek_kind() {
            if stop_kinds.contains(&kind) {
                break;
            }
            if let Some(child) = self.parse_one()? {
                children.push(child);
            }
        }
        Ok(self.store.get(|| Expression::List(children)))
    }

    /// Parse exactly one segment into a node. Returns `Ok(None)` for
    /// `{}` (spec: "emits nothing") rather than an empty literal node, so
    /// it never shows up in a `List`'s children.
    fn parse_one(&mut self) -> ParseResult<Option<ExprId>> {
        let seg = self.advance().expect("peek_kind confirmed a segment is present");
        match seg.kind {
            SegmentKind::Text => Ok(Some(self.store.get(|| Expression::NoneEmbedded(seg.text)))),
            SegmentKind::Unfold => {
                let inner = parse_header_expr(self.store, &seg.text)?;
                Ok(Some(self.store.get(|| Expression::Unfold(inner))))
            }
            SegmentKind::NoEscapeUnfold => {
                let inner = parse_header_expr(self.store, &seg.text)?;
                Ok(Some(self.store.get(|| Expression::NoEscapeUnfold(inner))))
            }
            SegmentKind::Variables => {
                let words = split_words(&seg.text)?;
                Ok(Some(parse_variable_list(self.store, &words)?))
            }
            SegmentKind::IfBlock => Ok(Some(self.parse_if(seg.text)?)),
            SegmentKind::ForBlock => Ok(Some(self.parse_for(seg.text)?)),
            SegmentKind::SelectBlock => Ok(Some(self.parse_select(seg.text)?)),
            SegmentKind::EmptyBlock => Ok(None),
            SegmentKind::ElseIfBlock | SegmentKind::ElseBlock | SegmentKind::EndIfBlock => {
                Err(ParseError::IfBlockNotStarted)
            }
            SegmentKind::EndForBlock => Err(ParseError::ForBlockNotStarted),
            SegmentKind::SelectCaseBlock | SegmentKind::SelectDefaultBlock | SegmentKind::EndSelectBlock => {
                Err(ParseError::InvalidExpression)
            }
        }
    }

    /// `{if cond} body {elseif cond} body ... {else} body {/if}`. Each
    /// branch's body is parsed by recursing into `parse_list_until`, which
    /// stops exactly at the next sibling `elseif`/`else`/`/if` — nested
    /// `{if}` blocks consume their own terminator first, so they're
    /// invisible to this scan.
    fn parse_if(&mut self, header: String) -> ParseResult<ExprId> {
        const BRANCH_STOP: &[SegmentKind] = &[SegmentKind::ElseIfBlock, SegmentKind::ElseBlock, SegmentKind::EndIfBlock];

        let cond = parse_header_expr(self.store, &header)?;
        let body = self.parse_list_until(BRANCH_STOP)?;
        let mut children = vec![self.store.get(|| Expression::IfCondition { cond, body })];

        loop {
            match self.peek_kind() {
                Some(SegmentKind::ElseIfBlock) => {
                    let seg = self.advance().expect("peeked");
                    let cond = parse_header_expr(self.store, &seg.text)?;
                    let body = self.parse_list_until(BRANCH_STOP)?;
                    children.push(self.store.get(|| Expression::IfCondition { cond, body }));
                }
                Some(SegmentKind::ElseBlock) => {
                    self.advance();
                    let body = self.parse_list_until(&[SegmentKind::EndIfBlock])?;
                    children.push(self.store.get(|| Expression::Else(body)));
                    match self.peek_kind() {
                        Some(SegmentKind::EndIfBlock) => {
                            self.advance();
                            break;
                        }
                        _ => return Err(ParseError::IfBlockNotClosed),
                    }
                }
                Some(SegmentKind::EndIfBlock) => {
                    self.advance();
                    break;
                }
                _ => return Err(ParseError::IfBlockNotClosed),
            }
        }
        Ok(self.store.get(|| Expression::If(children)))
    }

    /// `{for ident in expr} body {/for}`.
    fn parse_for(&mut self, header: String) -> ParseResult<ExprId> {
        let words = split_words(&header)?;
        let (var, collection) = parse_for_header(self.store, &words)?;
        let body = self.parse_list_until(&[SegmentKind::EndForBlock])?;
        match self.peek_kind() {
            Some(SegmentKind::EndForBlock) => {
                self.advance();
            }
            _ => return Err(ParseError::ForBlockNotClosed),
        }
        Ok(self.store.get(|| Expression::For { var, collection, body }))
    }

    /// `{select expr} prelude {case expr} body ... {default} body {/select}`.
    fn parse_select(&mut self, header: String) -> ParseResult<ExprId> {
        const CASE_STOP: &[SegmentKind] =
            &[SegmentKind::SelectCaseBlock, SegmentKind::SelectDefaultBlock, SegmentKind::EndSelectBlock];

        if header.trim().is_empty() {
            return Err(ParseError::InvalidSelectExpression);
        }
        let expr = parse_header_expr(self.store, &header)?;
        let prelude = self.parse_list_until(CASE_STOP)?;
        let mut children = vec![self.store.get(|| Expression::SelectTop { expr, prelude })];

        loop {
            match self.peek_kind() {
                Some(SegmentKind::SelectCaseBlock) => {
                    let seg = self.advance().expect("peeked");
                    if seg.text.trim().is_empty() {
                        return Err(ParseError::InvalidSelectCaseValue);
                    }
                    let expr = parse_header_expr(self.store, &seg.text)?;
                    let body = self.parse_list_until(CASE_STOP)?;
                    children.push(self.store.get(|| Expression::SelectCase { expr, body }));
                }
                Some(SegmentKind::SelectDefaultBlock) => {
                    self.advance();
                    let body = self.parse_list_until(CASE_STOP)?;
                    children.push(self.store.get(|| Expression::SelectDefault(body)));
                }
                Some(SegmentKind::EndSelectBlock) => {
                    self.advance();
                    break;
                }
                _ => return Err(ParseError::SelectBlockNotClosed),
            }
        }
        Ok(self.store.get(|| Expression::Select(children)))
    }
}

/// Tokenize and parse a block header/payload as a full expression.
fn parse_header_expr(store: &mut Store<Expression>, header: &str) -> ParseResult<ExprId> {
    let words = split_words(header)?;
    parse_expression(store, &words)
}
