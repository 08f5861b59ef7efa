//! `Display` impls for the AST and for runtime values.
//!
//! Grounded on the teacher's `display.rs`, which prints a `Template` back
//! out close to its original source for error messages and debug logging.
//! [`ExpressionDisplay`] does the same here: it isn't meant to byte-for-byte
//! round-trip arbitrary input (escape sequences and whitespace aren't
//! preserved), but it renders a tree back into something a developer would
//! recognize as the expression that produced it.

use std::fmt;

use crate::expression::{ExprId, Expression};
use crate::store::Store;
use crate::token::WordKind;
use crate::value::Value;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

fn op_symbol(op: WordKind) -> &'static str {
    match op {
        WordKind::Plus => "+",
        WordKind::Minus => "-",
        WordKind::Multiply => "*",
        WordKind::Divide => "/",
        WordKind::Equal => "==",
        WordKind::NotEqual => "<>",
        WordKind::Less => "<",
        WordKind::LessEq => "<=",
        WordKind::Greater => ">",
        WordKind::GreaterEq => ">=",
        WordKind::And => "and",
        WordKind::Or => "or",
        WordKind::Xor => "xor",
        WordKind::Not => "!",
        _ => "?",
    }
}

/// Borrows a [`Store<Expression>`] and an [`ExprId`] just long enough to
/// print the subtree rooted there. Expression nodes can't implement
/// `Display` on their own since a child is a non-owning [`ExprId`], not an
/// owned `Expression` — this wrapper carries the arena they need to resolve
/// through.
pub struct ExpressionDisplay<'a> {
    store: &'a Store<Expression>,
    id: ExprId,
}

impl<'a> ExpressionDisplay<'a> {
    pub fn new(store: &'a Store<Expression>, id: ExprId) -> Self {
        Self { store, id }
    }

    fn child(&self, id: ExprId) -> Self {
        Self { store: self.store, id }
    }

    fn join(&self, ids: &[ExprId], sep: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in ids.iter().enumerate() {
            if i > 0 {
                write!(f, "{sep}")?;
            }
            write!(f, "{}", self.child(*id))?;
        }
        Ok(())
    }
}

impl fmt::Display for ExpressionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.store.resolve(self.id) {
            Expression::List(children) => self.join(children, "", f),
            Expression::NoneEmbedded(text) => write!(f, "{text}"),
            Expression::Unfold(inner) => write!(f, "#{{{}}}", self.child(*inner)),
            Expression::NoEscapeUnfold(inner) => write!(f, "!{{{}}}", self.child(*inner)),
            Expression::VariableList(decls) => {
                write!(f, "${{")?;
                self.join(decls, "; ", f)?;
                write!(f, "}}")
            }
            Expression::VariableDecl { name, value } => write!(f, "{name} = {}", self.child(*value)),
            Expression::If(branches) => self.join(branches, "", f),
            Expression::IfCondition { cond, body } => write!(f, "{{if {}}}{}", self.child(*cond), self.child(*body)),
            Expression::Else(body) => write!(f, "{{else}}{}", self.child(*body)),
            Expression::Ternary { cond, then_branch, else_branch } => {
                write!(f, "{} ? {} : {}", self.child(*cond), self.child(*then_branch), self.child(*else_branch))
            }
            Expression::Paren(inner) => write!(f, "({})", self.child(*inner)),
            Expression::Binary { op, lhs, rhs } => {
                write!(f, "{} {} {}", self.child(*lhs), op_symbol(*op), self.child(*rhs))
            }
            Expression::Unary { op, expr } => write!(f, "{}{}", op_symbol(*op), self.child(*expr)),
            Expression::Number(n) => write!(f, "{n}"),
            Expression::Bool(b) => write!(f, "{b}"),
            Expression::String(s) | Expression::NoEscapeString(s) => write!(f, "{s}"),
            Expression::Identifier(name) => write!(f, "{name}"),
            Expression::ArrayLiteral(items) => {
                write!(f, "[")?;
                self.join(items, ", ", f)?;
                write!(f, "]")
            }
            Expression::ArrayIndex { base, index } => write!(f, "{}[{}]", self.child(*base), self.child(*index)),
            Expression::For { var, collection, body } => {
                write!(f, "{{for {var} in {}}}{}{{/for}}", self.child(*collection), self.child(*body))
            }
            Expression::Select(branches) => {
                write!(f, "{{select}}")?;
                self.join(branches, "", f)?;
                write!(f, "{{/select}}")
            }
            Expression::SelectTop { expr, prelude } => write!(f, "{}{}", self.child(*expr), self.child(*prelude)),
            Expression::SelectCase { expr, body } => write!(f, "{{case {}}}{}", self.child(*expr), self.child(*body)),
            Expression::SelectDefault(body) => write!(f, "{{default}}{}", self.child(*body)),
            Expression::FunctionCall { name, args } => {
                write!(f, "{name}(")?;
                self.join(args, ", ", f)?;
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Store;

    #[test]
    fn test_value_display_matches_to_display_string() {
        let v = Value::Array(vec![Value::Number(1.0), Value::Bool(true)]);
        assert_eq!(v.to_string(), v.to_display_string());
    }

    #[test]
    fn test_expression_display_binary() {
        let mut store = Store::new();
        let lhs = store.get(|| Expression::Number(1.0));
        let rhs = store.get(|| Expression::Number(2.0));
        let expr = store.get(|| Expression::Binary { op: WordKind::Plus, lhs, rhs });
        assert_eq!(ExpressionDisplay::new(&store, expr).to_string(), "1 + 2");
    }

    #[test]
    fn test_expression_display_ternary_and_paren() {
        let mut store = Store::new();
        let cond = store.get(|| Expression::Bool(true));
        let cond = store.get(|| Expression::Paren(cond));
        let then_branch = store.get(|| Expression::Number(1.0));
        let else_branch = store.get(|| Expression::Number(0.0));
        let expr = store.get(|| Expression::Ternary { cond, then_branch, else_branch });
        assert_eq!(ExpressionDisplay::new(&store, expr).to_string(), "(true) ? 1 : 0");
    }

    #[test]
    fn test_expression_display_function_call() {
        let mut store = Store::new();
        let arg = store.get(|| Expression::Identifier("x".to_string()));
        let expr = store.get(|| Expression::FunctionCall { name: "now".to_string(), args: vec![arg] });
        assert_eq!(ExpressionDisplay::new(&store, expr).to_string(), "now(x)");
    }
}
