//! Lexer (component C4): `split_words` tokenizes expression source into
//! [`Word`]s; `split_embedded` tokenizes template source into
//! [`EmbeddedText`] segments. Both are pure functions over `&str` — no
//! allocation beyond the returned vector and the token/segment text itself.
//!
//! Classification is driven by a 256-entry "splitter" byte table (spec
//! §4.4), built once at compile time. Continuation bytes of multi-byte
//! UTF-8 sequences are always `>= 0x80` and never appear in the splitter
//! table, so both scanners can walk the input byte-by-byte without
//! decoding: a slice boundary is only ever placed at a byte that can't be a
//! continuation byte, which keeps every extracted substring valid UTF-8.

use crate::error::{LexError, LexResult};
use crate::token::{EmbeddedText, SegmentKind, Word, WordKind};
use tracing::trace;

const fn build_splitter_table() -> [bool; 256] {
    let mut table = [false; 256];
    let bytes: &[u8] = b" \t\n\r\'\"+-*/()[].,;:?!$#\\=<>";
    let mut i = 0;
    while i < bytes.len() {
        table[bytes[i] as usize] = true;
        i += 1;
    }
    table
}

const SPLITTER_TABLE: [bool; 256] = build_splitter_table();

fn is_splitter(b: u8) -> bool {
    SPLITTER_TABLE[b as usize]
}

/// Tokenize an expression source string (spec §4.4 `splitWords`).
pub fn split_words(input: &str) -> LexResult<Vec<Word>> {
    let bytes = input.as_bytes();
    let mut pos = 0;
    let mut words = Vec::new();
    while pos < bytes.len() {
        let b = bytes[pos];
        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }
        if b == b'\'' || b == b'"' {
            let (word, next) = read_string_literal(bytes, pos)?;
            trace!(kind = ?word.kind, "split_words: string literal");
            words.push(word);
            pos = next;
            continue;
        }
        if b.is_ascii_digit() {
            let (word, next) = read_number(bytes, pos)?;
            trace!(kind = ?word.kind, "split_words: number");
            words.push(word);
            pos = next;
            continue;
        }
        if !is_splitter(b) {
            let (word, next) = read_identifier(bytes, pos);
            trace!(kind = ?word.kind, text = %word.text, "split_words: identifier/keyword");
            words.push(word);
            pos = next;
            continue;
        }
        let (word, next) = read_operator(bytes, pos);
        trace!(kind = ?word.kind, "split_words: operator");
        words.push(word);
        pos = next;
    }
    Ok(words)
}

fn read_string_literal(bytes: &[u8], start: usize) -> LexResult<(Word, usize)> {
    let quote = bytes[start];
    let mut pos = start + 1;
    loop {
        if pos >= bytes.len() {
            return Err(LexError::UnclosedStringLiteralError);
        }
        let b = bytes[pos];
        if b == b'\\' {
            if pos + 1 >= bytes.len() {
                return Err(LexError::UnclosedStringLiteralError);
            }
            pos += 2;
            continue;
        }
        if b == quote {
            pos += 1;
            break;
        }
        pos += 1;
    }
    let text = std::str::from_utf8(&bytes[start..pos]).expect("source is valid utf8").to_string();
    Ok((Word::new(text, WordKind::StringLiteral), pos))
}

fn read_number(bytes: &[u8], start: usize) -> LexResult<(Word, usize)> {
    let mut pos = start;
    let mut seen_dot = false;
    let mut prev_underscore = false;
    while pos < bytes.len() {
        let b = bytes[pos];
        if b.is_ascii_digit() {
            prev_underscore = false;
            pos += 1;
        } else if b == b'_' {
            if prev_underscore {
                return Err(LexError::ConsecutiveUnderscoreError);
            }
            prev_underscore = true;
            pos += 1;
        } else if b == b'.' {
            if seen_dot {
                break;
            }
            seen_dot = true;
            prev_underscore = false;
            pos += 1;
        } else {
            break;
        }
    }
    let text = std::str::from_utf8(&bytes[start..pos]).expect("source is valid utf8").to_string();
    Ok((Word::new(text, WordKind::Number), pos))
}

fn read_identifier(bytes: &[u8], start: usize) -> (Word, usize) {
    let mut pos = start;
    while pos < bytes.len() {
        let b = bytes[pos];
        if b < 0x80 && (b.is_ascii_whitespace() || is_splitter(b)) {
            break;
        }
        pos += 1;
    }
    let text = std::str::from_utf8(&bytes[start..pos]).expect("source is valid utf8");
    let kind = classify_identifier(text);
    (Word::new(text, kind), pos)
}

fn classify_identifier(text: &str) -> WordKind {
    match text {
        "true" => WordKind::TrueLiteral,
        "false" => WordKind::FalseLiteral,
        "and" => WordKind::And,
        "or" => WordKind::Or,
        "xor" => WordKind::Xor,
        "in" => WordKind::In,
        _ => WordKind::Identifier,
    }
}

fn read_operator(bytes: &[u8], pos: usize) -> (Word, usize) {
    let b = bytes[pos];
    let next = bytes.get(pos + 1).copied();
    let (kind, len) = match b {
        b'=' if next == Some(b'=') => (WordKind::Equal, 2),
        b'=' => (WordKind::Assign, 1),
        b'<' if next == Some(b'=') => (WordKind::LessEq, 2),
        b'<' if next == Some(b'>') => (WordKind::NotEqual, 2),
        b'<' => (WordKind::Less, 1),
        b'>' if next == Some(b'=') => (WordKind::GreaterEq, 2),
        b'>' => (WordKind::Greater, 1),
        b'+' => (WordKind::Plus, 1),
        b'-' => (WordKind::Minus, 1),
        b'*' => (WordKind::Multiply, 1),
        b'/' => (WordKind::Divide, 1),
        b'(' => (WordKind::LeftParen, 1),
        b')' => (WordKind::RightParen, 1),
        b'[' => (WordKind::LeftBracket, 1),
        b']' => (WordKind::RightBracket, 1),
        b'.' => (WordKind::Period, 1),
        b',' => (WordKind::Comma, 1),
        b';' => (WordKind::Semicolon, 1),
        b':' => (WordKind::Colon, 1),
        b'?' => (WordKind::Question, 1),
        b'!' => (WordKind::Not, 1),
        b'$' => (WordKind::Dollar, 1),
        b'#' => (WordKind::Hash, 1),
        b'\\' => (WordKind::Backslash, 1),
        _ => unreachable!("read_operator called on byte {b:#x}, which is not an operator splitter"),
    };
    let text = std::str::from_utf8(&bytes[pos..pos + len]).expect("operator bytes are ascii").to_string();
    (Word::new(text, kind), pos + len)
}

/// Tokenize a template source string into segments (spec §4.4
/// `splitEmbedded`).
pub fn split_embedded(input: &str) -> LexResult<Vec<EmbeddedText>> {
    let bytes = input.as_bytes();
    let mut pos = 0;
    let mut segments = Vec::new();
    let mut text_start = 0;
    while pos < bytes.len() {
        let b = bytes[pos];
        if b == b'\\' && pos + 1 < bytes.len() && matches!(bytes[pos + 1], b'{' | b'}' | b'#' | b'!' | b'$') {
            pos += 2;
            continue;
        }
        if b == b'{' {
            push_text(&mut segments, bytes, text_start, pos);
            let content_start = pos + 1;
            let brace_end = find_unescaped_brace(bytes, content_start)?;
            let content = std::str::from_utf8(&bytes[content_start..brace_end]).expect("source is valid utf8");
            let segment = classify_command(content)?;
            trace!(kind = ?segment.kind, "split_embedded: command segment");
            segments.push(segment);
            pos = brace_end + 1;
            text_start = pos;
            continue;
        }
        if matches!(b, b'#' | b'!' | b'$') && bytes.get(pos + 1) == Some(&b'{') {
            push_text(&mut segments, bytes, text_start, pos);
            let kind = match b {
                b'#' => SegmentKind::Unfold,
                b'!' => SegmentKind::NoEscapeUnfold,
                _ => SegmentKind::Variables,
            };
            let content_start = pos + 2;
            let brace_end = find_unescaped_brace(bytes, content_start)?;
            let content = std::str::from_utf8(&bytes[content_start..brace_end]).expect("source is valid utf8");
            trace!(?kind, "split_embedded: prefixed expression segment");
            segments.push(EmbeddedText::new(content, kind));
            pos = brace_end + 1;
            text_start = pos;
            continue;
        }
        // `#`, `!`, `$` not followed by `{` (or any other byte) fall
        // through as plain text, per spec §4.4.
        pos += 1;
    }
    push_text(&mut segments, bytes, text_start, pos);
    Ok(segments)
}

fn push_text(segments: &mut Vec<EmbeddedText>, bytes: &[u8], start: usize, end: usize) {
    if end > start {
        let text = std::str::from_utf8(&bytes[start..end]).expect("source is valid utf8").to_string();
        segments.push(EmbeddedText::new(text, SegmentKind::Text));
    }
}

/// Find the index of the next `}` not escaped by a preceding `\`, starting
/// at `start`. A lone trailing backslash (no following byte) is itself an
/// unclosed block.
fn find_unescaped_brace(bytes: &[u8], start: usize) -> LexResult<usize> {
    let mut pos = start;
    while pos < bytes.len() {
        let b = bytes[pos];
        if b == b'\\' {
            pos += 2;
            continue;
        }
        if b == b'}' {
            return Ok(pos);
        }
        pos += 1;
    }
    Err(LexError::UnclosedBlockError)
}

/// Classify a `{...}` command's inner content into the matching
/// [`EmbeddedText`], per the prefix table in spec §4.4.
fn classify_command(content: &str) -> LexResult<EmbeddedText> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Ok(EmbeddedText::new("", SegmentKind::EmptyBlock));
    }
    if let Some(rest) = strip_keyword(content, "else if") {
        return Ok(EmbeddedText::new(rest.trim_start(), SegmentKind::ElseIfBlock));
    }
    if let Some(rest) = strip_keyword(content, "elseif") {
        return Ok(EmbeddedText::new(rest.trim_start(), SegmentKind::ElseIfBlock));
    }
    if trimmed == "else" {
        return Ok(EmbeddedText::new("", SegmentKind::ElseBlock));
    }
    if trimmed == "/if" {
        return Ok(EmbeddedText::new("", SegmentKind::EndIfBlock));
    }
    if let Some(rest) = strip_keyword(content, "if") {
        return Ok(EmbeddedText::new(rest.trim_start(), SegmentKind::IfBlock));
    }
    if trimmed == "/for" {
        return Ok(EmbeddedText::new("", SegmentKind::EndForBlock));
    }
    if let Some(rest) = strip_keyword(content, "for") {
        return Ok(EmbeddedText::new(rest.trim_start(), SegmentKind::ForBlock));
    }
    if trimmed == "/select" {
        return Ok(EmbeddedText::new("", SegmentKind::EndSelectBlock));
    }
    if trimmed == "default" {
        return Ok(EmbeddedText::new("", SegmentKind::SelectDefaultBlock));
    }
    if let Some(rest) = strip_keyword(content, "case") {
        return Ok(EmbeddedText::new(rest.trim_start(), SegmentKind::SelectCaseBlock));
    }
    if let Some(rest) = strip_keyword(content, "select") {
        return Ok(EmbeddedText::new(rest.trim_start(), SegmentKind::SelectBlock));
    }
    Err(LexError::InvalidCommandError { command: content.to_string() })
}

/// If `content`, after skipping leading whitespace, starts with `keyword`
/// immediately followed by whitespace, return the remainder starting at
/// that whitespace. A bare keyword with nothing after it doesn't count —
/// these headers all require a following expression.
fn strip_keyword<'a>(content: &'a str, keyword: &str) -> Option<&'a str> {
    let leading_ws = content.len() - content.trim_start().len();
    let body = &content[leading_ws..];
    let rest = body.strip_prefix(keyword)?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::identifier("foo", WordKind::Identifier)]
    #[case::true_literal("true", WordKind::TrueLiteral)]
    #[case::false_literal("false", WordKind::FalseLiteral)]
    #[case::and_keyword("and", WordKind::And)]
    #[case::or_keyword("or", WordKind::Or)]
    #[case::xor_keyword("xor", WordKind::Xor)]
    #[case::in_keyword("in", WordKind::In)]
    fn test_split_words_single_identifier(#[case] input: &str, #[case] kind: WordKind) {
        let words = split_words(input).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].kind, kind);
    }

    #[test]
    fn test_split_words_number_with_separators_and_dot() {
        let words = split_words("1_000.25").unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].kind, WordKind::Number);
        assert_eq!(words[0].text, "1_000.25");
    }

    #[test]
    fn test_split_words_number_second_dot_ends_token() {
        let words = split_words("1.2.3").unwrap();
        assert_eq!(words.len(), 3);
        assert_eq!(words[0].text, "1.2");
        assert_eq!(words[1].kind, WordKind::Period);
        assert_eq!(words[2].text, "3");
    }

    #[test]
    fn test_split_words_consecutive_underscore_errors() {
        let err = split_words("1__000").unwrap_err();
        assert_eq!(err, LexError::ConsecutiveUnderscoreError);
    }

    #[test]
    fn test_split_words_string_literal_with_escapes() {
        let words = split_words(r#"'World \{\}'"#).unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].kind, WordKind::StringLiteral);
        assert_eq!(words[0].text, r#"'World \{\}'"#);
    }

    #[test]
    fn test_split_words_unclosed_string_errors() {
        let err = split_words("'abc").unwrap_err();
        assert_eq!(err, LexError::UnclosedStringLiteralError);
    }

    #[test]
    fn test_split_words_operators() {
        let words = split_words("a == b <> c >= d <= e <> f").unwrap();
        let kinds: Vec<_> = words.iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WordKind::Identifier,
                WordKind::Equal,
                WordKind::Identifier,
                WordKind::NotEqual,
                WordKind::Identifier,
                WordKind::GreaterEq,
                WordKind::Identifier,
                WordKind::LessEq,
                WordKind::Identifier,
                WordKind::NotEqual,
                WordKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_split_words_ternary_and_grouping() {
        let words = split_words("a ? (b) : [c, d]").unwrap();
        let kinds: Vec<_> = words.iter().map(|w| w.kind).collect();
        assert_eq!(
            kinds,
            vec![
                WordKind::Identifier,
                WordKind::Question,
                WordKind::LeftParen,
                WordKind::Identifier,
                WordKind::RightParen,
                WordKind::Colon,
                WordKind::LeftBracket,
                WordKind::Identifier,
                WordKind::Comma,
                WordKind::Identifier,
                WordKind::RightBracket,
            ]
        );
    }

    #[test]
    fn test_split_embedded_plain_text() {
        let segments = split_embedded("hello world").unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Text);
        assert_eq!(segments[0].text, "hello world");
    }

    #[test]
    fn test_split_embedded_unfold_with_escaped_braces_in_string() {
        let segments = split_embedded(r#"Hello, #{'World \{\}'}!"#).unwrap();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], EmbeddedText::new("Hello, ", SegmentKind::Text));
        assert_eq!(segments[1], EmbeddedText::new(r#"'World \{\}'"#, SegmentKind::Unfold));
        assert_eq!(segments[2], EmbeddedText::new("!", SegmentKind::Text));
    }

    #[test]
    fn test_split_embedded_if_else_endif() {
        let segments = split_embedded("{if a > 0}pos{else}neg{/if}").unwrap();
        assert_eq!(
            segments,
            vec![
                EmbeddedText::new("a > 0", SegmentKind::IfBlock),
                EmbeddedText::new("pos", SegmentKind::Text),
                EmbeddedText::new("", SegmentKind::ElseBlock),
                EmbeddedText::new("neg", SegmentKind::Text),
                EmbeddedText::new("", SegmentKind::EndIfBlock),
            ]
        );
    }

    #[test]
    fn test_split_embedded_elseif_and_nested_if() {
        let segments = split_embedded("{if false}A{elseif true}{if false}B_1{else}B_2{/if}{else}C{/if}").unwrap();
        assert_eq!(
            segments,
            vec![
                EmbeddedText::new("false", SegmentKind::IfBlock),
                EmbeddedText::new("A", SegmentKind::Text),
                EmbeddedText::new("true", SegmentKind::ElseIfBlock),
                EmbeddedText::new("false", SegmentKind::IfBlock),
                EmbeddedText::new("B_1", SegmentKind::Text),
                EmbeddedText::new("", SegmentKind::ElseBlock),
                EmbeddedText::new("B_2", SegmentKind::Text),
                EmbeddedText::new("", SegmentKind::EndIfBlock),
                EmbeddedText::new("", SegmentKind::ElseBlock),
                EmbeddedText::new("C", SegmentKind::Text),
                EmbeddedText::new("", SegmentKind::EndIfBlock),
            ]
        );
    }

    #[test]
    fn test_split_embedded_for_block() {
        let segments = split_embedded("{for i in [1,2,3]}i=#{i}{/for}").unwrap();
        assert_eq!(
            segments,
            vec![
                EmbeddedText::new("i in [1,2,3]", SegmentKind::ForBlock),
                EmbeddedText::new("i=", SegmentKind::Text),
                EmbeddedText::new("i", SegmentKind::Unfold),
                EmbeddedText::new("", SegmentKind::EndForBlock),
            ]
        );
    }

    #[test]
    fn test_split_embedded_select_block() {
        let segments = split_embedded("{select x}{case 1}one{default}other{/select}").unwrap();
        assert_eq!(
            segments,
            vec![
                EmbeddedText::new("x", SegmentKind::SelectBlock),
                EmbeddedText::new("1", SegmentKind::SelectCaseBlock),
                EmbeddedText::new("one", SegmentKind::Text),
                EmbeddedText::new("", SegmentKind::SelectDefaultBlock),
                EmbeddedText::new("other", SegmentKind::Text),
                EmbeddedText::new("", SegmentKind::EndSelectBlock),
            ]
        );
    }

    #[test]
    fn test_split_embedded_variables_and_empty_block() {
        let segments = split_embedded("${a = 10; b = 20}{}done").unwrap();
        assert_eq!(
            segments,
            vec![
                EmbeddedText::new("a = 10; b = 20", SegmentKind::Variables),
                EmbeddedText::new("", SegmentKind::EmptyBlock),
                EmbeddedText::new("done", SegmentKind::Text),
            ]
        );
    }

    #[test]
    fn test_split_embedded_invalid_command_errors() {
        let err = split_embedded("{bogus}").unwrap_err();
        assert_eq!(err, LexError::InvalidCommandError { command: "bogus".to_string() });
    }

    #[test]
    fn test_split_embedded_unclosed_block_errors() {
        let err = split_embedded("{if a").unwrap_err();
        assert_eq!(err, LexError::UnclosedBlockError);
    }

    #[test]
    fn test_split_embedded_lead_byte_without_brace_is_text() {
        let segments = split_embedded("cost: $5 #1").unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].kind, SegmentKind::Text);
        assert_eq!(segments[0].text, "cost: $5 #1");
    }
}
