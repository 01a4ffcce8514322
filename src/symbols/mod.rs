#[cfg(test)]
mod test;

use ordermap::OrderMap;
use std::fmt::Display;

/// A declared variable and the type it was declared with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub ty: String,
}

impl Symbol {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {}", self.name, self.ty)
    }
}

pub type Scope = OrderMap<String, Symbol>;

/// Chain of lexical scopes, innermost last. The bottom frame is the global
/// scope and is never popped.
#[derive(Debug)]
pub struct SymTable {
    scope_stack: Vec<Scope>,
}

impl SymTable {
    pub fn new() -> SymTable {
        SymTable {
            scope_stack: vec![Scope::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.scope_stack.push(Scope::new());
    }

    pub fn pop_scope(&mut self) -> Option<Scope> {
        if self.scope_stack.len() > 1 {
            self.scope_stack.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.scope_stack.len()
    }

    pub fn current(&self) -> &Scope {
        &self.scope_stack[self.scope_stack.len() - 1]
    }

    /// Declares `name` in the innermost scope. Fails, leaving the table
    /// untouched, if that scope already has it; outer scopes may.
    pub fn insert(&mut self, name: &str, symbol: Symbol) -> bool {
        let last = self.scope_stack.len() - 1;
        let scope = &mut self.scope_stack[last];
        if scope.contains_key(name) {
            return false;
        }
        scope.insert(name.to_string(), symbol);
        true
    }

    /// Nearest enclosing declaration of `name`.
    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.scope_stack
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }
}

impl Default for SymTable {
    fn default() -> Self {
        Self::new()
    }
}
