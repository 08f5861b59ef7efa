//! AST evaluation (component C7's evaluator half, spec §4.7).
//!
//! [`evaluate`] walks an [`Expression`] tree stored in a
//! [`Store<Expression>`], producing a typed [`Value`] against a
//! [`VariableEnvironment`]. Spec §5 requires the scope stack to be left at
//! its entry height on every return path through `If`/`For`/`Select`,
//! including error paths; [`ScopeGuard`] pushes on construction and pops on
//! drop so this holds regardless of which `?`/`return` exits the block,
//! rather than duplicating a `pop_scope()` call at each exit point.

use crate::env::VariableEnvironment;
use crate::error::ValueError;
use crate::expression::{ExprId, Expression};
use crate::functions;
use crate::parser::expr::decode_string_literal;
use crate::render_config::RenderConfig;
use crate::store::Store;
use crate::value::{binary_op, unary_op, values_equal, Value};
use tracing::warn;

/// Pushes a scope on construction, pops it on drop. Holding one of these
/// across a recursive `evaluate` call (including through `?`/`return`)
/// guarantees the push/pop pair stays balanced.
struct ScopeGuard<'e> {
    env: &'e mut VariableEnvironment,
}

impl<'e> ScopeGuard<'e> {
    fn new(env: &'e mut VariableEnvironment) -> Self {
        env.push_scope();
        Self { env }
    }

    fn env_mut(&mut self) -> &mut VariableEnvironment {
        self.env
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.env.pop_scope().expect("a scope this guard pushed is always poppable");
    }
}

/// Evaluate `id` against `env`, per spec §4.7's per-variant rules. `store`
/// holds the whole tree `id` belongs to; `config` supplies the host-injected
/// escape policy and clock (spec §9, A3).
pub fn evaluate(
    id: ExprId,
    store: &Store<Expression>,
    env: &mut VariableEnvironment,
    config: &RenderConfig,
) -> Result<Value, ValueError> {
    match store.resolve(id) {
        Expression::List(children) => {
            let mut out = String::new();
            for &child in children {
                let s = evaluate(child, store, env, config)?.to_display_string();
                if !s.is_empty() {
                    out.push_str(&s);
                }
            }
            Ok(Value::String(out))
        }

        Expression::NoneEmbedded(text) => Ok(Value::String(decode_none_embedded(text))),

        Expression::Unfold(inner) => {
            let s = evaluate(*inner, store, env, config)?.to_display_string();
            Ok(Value::String(config.escape.apply(&s)))
        }

        Expression::NoEscapeUnfold(inner) => {
            Ok(Value::String(evaluate(*inner, store, env, config)?.to_display_string()))
        }

        Expression::VariableList(decls) => {
            for &decl in decls {
                evaluate(decl, store, env, config)?;
            }
            Ok(Value::String(String::new()))
        }

        Expression::VariableDecl { name, value } => {
            let v = evaluate(*value, store, env, config)?;
            env.regist(name.clone(), v);
            Ok(Value::String(String::new()))
        }

        Expression::If(children) => eval_if(children, store, env, config),

        Expression::IfCondition { .. } | Expression::Else(_) => {
            // Only reachable if an `If` node's children are malformed
            // (these variants are only ever visited from inside `eval_if`).
            Err(ValueError::InvalidIfStatement)
        }

        Expression::Ternary { cond, then_branch, else_branch } => {
            match evaluate(*cond, store, env, config)? {
                Value::Bool(true) => evaluate(*then_branch, store, env, config),
                Value::Bool(false) => evaluate(*else_branch, store, env, config),
                // Spec §4.7 names this "InvalidExpression", a ParseError
                // variant; since that's a syntax-time error and this is a
                // runtime type mismatch, it's reported as the evaluator's
                // generic `EvaluationFailed` instead.
                _ => Err(ValueError::EvaluationFailed),
            }
        }

        Expression::Paren(inner) => evaluate(*inner, store, env, config),

        Expression::Binary { op, lhs, rhs } => {
            let lhs = evaluate(*lhs, store, env, config)?;
            let rhs = evaluate(*rhs, store, env, config)?;
            binary_op(*op, lhs, rhs)
        }

        Expression::Unary { op, expr } => {
            let v = evaluate(*expr, store, env, config)?;
            unary_op(*op, v)
        }

        Expression::Number(n) => Ok(Value::Number(*n)),
        Expression::Bool(b) => Ok(Value::Bool(*b)),
        Expression::String(raw) => decode_string_literal(raw).map(Value::String),
        Expression::NoEscapeString(s) => Ok(Value::String(s.clone())),

        Expression::Identifier(name) => {
            env.get(name).map_err(|_| ValueError::IdentifierParseFailed { name: name.clone() })
        }

        Expression::ArrayLiteral(children) => {
            let mut items = Vec::with_capacity(children.len());
            for &child in children {
                items.push(evaluate(child, store, env, config)?);
            }
            Ok(Value::Array(items))
        }

        Expression::ArrayIndex { base, index } => {
            let base = evaluate(*base, store, env, config)?;
            let index = evaluate(*index, store, env, config)?;
            let Value::Array(items) = base else {
                return Err(ValueError::NotAnArray);
            };
            let Value::Number(n) = index else {
                return Err(ValueError::InvalidArrayAccess);
            };
            if n < 0.0 {
                return Err(ValueError::InvalidArrayAccess);
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let idx = n.floor() as usize;
            let len = items.len();
            items.into_iter().nth(idx).ok_or_else(|| {
                warn!(index = idx, len, "array index out of bounds");
                ValueError::ArrayIndexOutOfBounds { index: idx as i64, len }
            })
        }

        Expression::For { var, collection, body } => eval_for(var, *collection, *body, store, env, config),

        Expression::Select(children) => eval_select(children, store, env, config),

        Expression::SelectTop { .. } | Expression::SelectCase { .. } | Expression::SelectDefault(_) => {
            // Only reachable if a `Select` node's children are malformed.
            Err(ValueError::EvaluationFailed)
        }

        Expression::FunctionCall { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for &arg in args {
                values.push(evaluate(arg, store, env, config)?);
            }
            functions::call(name, &values, config)
        }
    }
}

/// Decode the backslash-escapes a [`Expression::NoneEmbedded`] literal may
/// carry in front of `{`, `}`, `#{`, `!{`, `${` (spec §4.7). Scans first so
/// the common escape-free case returns the original text without a copy.
fn decode_none_embedded(text: &str) -> String {
    let bytes = text.as_bytes();
    let has_escape = bytes.windows(2).any(|w| w[0] == b'\\' && matches!(w[1], b'{' | b'}' | b'#' | b'!' | b'$'));
    if !has_escape {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' && matches!(chars.peek(), Some('{' | '}' | '#' | '!' | '$')) {
            continue;
        }
        out.push(c);
    }
    out
}

fn eval_if(
    children: &[ExprId],
    store: &Store<Expression>,
    env: &mut VariableEnvironment,
    config: &RenderConfig,
) -> Result<Value, ValueError> {
    for &child in children {
        match store.resolve(child) {
            Expression::IfCondition { cond, body } => {
                let (cond, body) = (*cond, *body);
                let mut guard = ScopeGuard::new(env);
                match evaluate(cond, store, guard.env_mut(), config)? {
                    Value::Bool(true) => return evaluate(body, store, guard.env_mut(), config),
                    Value::Bool(false) => {}
                    _ => return Err(ValueError::InvalidIfStatement),
                }
            }
            Expression::Else(body) => {
                let body = *body;
                let mut guard = ScopeGuard::new(env);
                return evaluate(body, store, guard.env_mut(), config);
            }
            _ => return Err(ValueError::InvalidIfStatement),
        }
    }
    Ok(Value::String(String::new()))
}

fn eval_for(
    var: &str,
    collection: ExprId,
    body: ExprId,
    store: &Store<Expression>,
    env: &mut VariableEnvironment,
    config: &RenderConfig,
) -> Result<Value, ValueError> {
    let collection = evaluate(collection, store, env, config)?;
    let Value::Array(items) = collection else {
        return Err(ValueError::NotAnArray);
    };
    let mut guard = ScopeGuard::new(env);
    let mut out = String::new();
    for item in items {
        match item {
            Value::Array(_) => return Err(ValueError::InvalidForCollection),
            other => guard.env_mut().regist(var.to_string(), other),
        }
        out.push_str(&evaluate(body, store, guard.env_mut(), config)?.to_display_string());
    }
    Ok(Value::String(out))
}

fn eval_select(
    children: &[ExprId],
    store: &Store<Expression>,
    env: &mut VariableEnvironment,
    config: &RenderConfig,
) -> Result<Value, ValueError> {
    let Some((&top, rest)) = children.split_first() else {
        return Ok(Value::String(String::new()));
    };
    let Expression::SelectTop { expr, prelude } = store.resolve(top) else {
        return Err(ValueError::EvaluationFailed);
    };
    let (expr, prelude) = (*expr, *prelude);
    let mut guard = ScopeGuard::new(env);
    let scrutinee = evaluate(expr, store, guard.env_mut(), config)?;
    let mut out = evaluate(prelude, store, guard.env_mut(), config)?.to_display_string();

    for &child in rest {
        match store.resolve(child) {
            Expression::SelectCase { expr, body } => {
                let (case_expr, body) = (*expr, *body);
                let case_value = evaluate(case_expr, store, guard.env_mut(), config)?;
                if values_equal(&scrutinee, &case_value)? {
                    out.push_str(&evaluate(body, store, guard.env_mut(), config)?.to_display_string());
                    return Ok(Value::String(out));
                }
            }
            Expression::SelectDefault(body) => {
                let body = *body;
                out.push_str(&evaluate(body, store, guard.env_mut(), config)?.to_display_string());
                return Ok(Value::String(out));
            }
            _ => return Err(ValueError::EvaluationFailed),
        }
    }
    Ok(Value::String(out))
}
