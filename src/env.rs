//! Variable environment (component C9, spec §4.9).
//!
//! A [`VariableEnvironment`] is a non-empty stack of [`Scope`]s, each an
//! [`OrderedMap`] from name to [`Value`]. Lookup scans innermost to
//! outermost; every mutation (`regist*`, `unregist`) targets the innermost
//! scope only. `push_scope`/`pop_scope` correspond to the spec's
//! `addHierarchy`/`removeHierarchy`; popping the last scope is rejected.
//!
//! Deviation from spec §3's literal `VariableValue` enumeration
//! (`Expr(&Expression) | Number | String | Bool`): this implementation
//! binds the fully evaluated [`Value`] (including [`Value::Array`]), not a
//! pointer back into the AST. That follows directly from the "eager
//! `VariableDecl` evaluation" open-question resolution (see `DESIGN.md`):
//! once declarations bind values rather than expressions, a named array
//! (`${arr = [1,2,3]}`) needs somewhere to live so a later `{for x in arr}`
//! or `arr[0]` can still resolve it. Keeping `VariableValue` scalar-only
//! while also evaluating eagerly would make that common pattern
//! inexpressible, so the value set here is `Value` in full, mirroring the
//! scope's secondary grounding (`ori_eval/src/environment.rs`'s
//! push/pop-scope API) adapted to a flat `Vec<Scope>` instead of an
//! `Rc<RefCell<_>>` parent chain.

use crate::btree::OrderedMap;
use crate::error::{VariableError, VariableResult};
use crate::value::Value;
use tracing::trace;

/// Branching factor passed to each scope's [`OrderedMap`]: small scopes
/// (a handful of bindings) don't benefit from a wide fanout, but the type
/// itself is the spec-mandated B-tree regardless of size.
const SCOPE_BRANCHING_FACTOR: usize = 2;

struct Scope {
    bindings: OrderedMap<String, Value>,
}

impl Scope {
    fn new() -> Self {
        Self { bindings: OrderedMap::new(SCOPE_BRANCHING_FACTOR) }
    }
}

/// A stack of lexical [`Scope`]s. Always has at least one (the global)
/// scope; evaluation pushes and pops as it enters/exits `{if}`/`{for}`/
/// `{select}` bodies, but must leave the stack at its entry height on any
/// return path (spec §5) — see `ScopeGuard` in [`crate::eval`].
pub struct VariableEnvironment {
    scopes: Vec<Scope>,
}

impl VariableEnvironment {
    pub fn new() -> Self {
        Self { scopes: vec![Scope::new()] }
    }

    /// Current stack height, including the global scope. Used by tests to
    /// assert scope-balance (spec §8 invariant 3).
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn innermost(&mut self) -> &mut Scope {
        self.scopes.last_mut().expect("scope stack is never empty")
    }

    /// Bind `name` to `value` in the innermost scope, overwriting any
    /// existing binding for that name in this scope only (a binding in an
    /// outer scope is shadowed, not replaced).
    pub fn regist(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        trace!(%name, "registering variable");
        let scope = self.innermost();
        if let Some(slot) = scope.bindings.search_mut(&name) {
            *slot = value;
        } else {
            scope.bindings.insert(name, value).expect("just checked absence");
        }
    }

    pub fn regist_number(&mut self, name: impl Into<String>, value: f64) {
        self.regist(name, Value::Number(value));
    }

    pub fn regist_string(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.regist(name, Value::String(value.into()));
    }

    pub fn regist_boolean(&mut self, name: impl Into<String>, value: bool) {
        self.regist(name, Value::Bool(value));
    }

    /// Look up `name`, scanning from the innermost scope outward.
    pub fn get(&self, name: &str) -> VariableResult<Value> {
        for scope in self.scopes.iter().rev() {
            if let Some(value) = scope.bindings.search(&name.to_string()) {
                return Ok(value.clone());
            }
        }
        Err(VariableError::NotFound { name: name.to_string() })
    }

    /// Remove `name` from the innermost scope only. Missing is not an
    /// error (spec §4.9: "missing → silently ok").
    pub fn unregist(&mut self, name: &str) {
        self.innermost().bindings.remove(&name.to_string());
    }

    /// Push a new, empty scope (spec's `addHierarchy`).
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Pop the innermost scope (spec's `removeHierarchy`). Refuses to pop
    /// the last remaining (global) scope.
    pub fn pop_scope(&mut self) -> VariableResult<()> {
        if self.scopes.len() == 1 {
            return Err(VariableError::CannotRemoveLastScope);
        }
        self.scopes.pop();
        Ok(())
    }
}

impl Default for VariableEnvironment {
    fn default() -> Self {
        Self::new()
    }
}
