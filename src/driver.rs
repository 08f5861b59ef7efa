//! Top-level entry points (component C10, spec §4.10).
//!
//! [`execute`] runs the expression grammar end to end (lex → parse);
//! [`translate`] does the same for the template grammar. Both return a
//! [`ParseAnswer`] that owns the arena the parsed tree lives in, mirroring
//! the teacher's `impl FromStr for Template` pairing: parsing and rendering
//! are separate steps, so the same parsed tree can be rendered repeatedly
//! against different environments without re-lexing or re-parsing.

use crate::env::VariableEnvironment;
use crate::error::{ValueError, WordsmithResult};
use crate::eval;
use crate::expression::{ExprId, Expression};
use crate::lexer::{split_embedded, split_words};
use crate::parser::expr::parse_expression;
use crate::parser::template::parse_template;
use crate::render_config::RenderConfig;
use crate::store::Store;
use crate::value::Value;

/// A parsed tree, plus the arena it lives in. Dropping a `ParseAnswer`
/// drops its `Store` and every node in it at once (no per-node teardown),
/// per spec §4.2's arena-ownership requirement.
pub struct ParseAnswer {
    store: Store<Expression>,
    root: ExprId,
}

impl ParseAnswer {
    /// Evaluate the parsed tree against `env`, using the default
    /// (non-escaping, system-clock) [`RenderConfig`]. Can be called more
    /// than once against the same or different environments; nothing here
    /// consumes the tree.
    pub fn get(&self, env: &mut VariableEnvironment) -> Result<Value, ValueError> {
        self.get_with_config(env, &RenderConfig::identity())
    }

    /// Evaluate the parsed tree against `env`, with a caller-supplied
    /// escape policy and clock.
    pub fn get_with_config(&self, env: &mut VariableEnvironment, config: &RenderConfig) -> Result<Value, ValueError> {
        eval::evaluate(self.root, &self.store, env, config)
    }
}

/// Lex and parse `source` as a standalone expression (spec §4.5), rejecting
/// leftover tokens.
pub fn execute(source: &str) -> WordsmithResult<ParseAnswer> {
    let words = split_words(source)?;
    let mut store = Store::new();
    let root = parse_expression(&mut store, &words)?;
    Ok(ParseAnswer { store, root })
}

/// Lex and parse `source` as a template (spec §4.6): literal text
/// interleaved with `#{}`/`!{}`/`${}`/`{if}`/`{for}`/`{select}` segments.
pub fn translate(source: &str) -> WordsmithResult<ParseAnswer> {
    let segments = split_embedded(source)?;
    let mut store = Store::new();
    let root = parse_template(&mut store, &segments)?;
    Ok(ParseAnswer { store, root })
}
