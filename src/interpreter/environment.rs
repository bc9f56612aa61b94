use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use crate::token::Token;
use crate::value::Value;

use super::error::RuntimeError;

struct Scope {
    values: HashMap<String, Value>,
    enclosing: Option<Environment>,
}

/// A lexical scope frame, shared via `Rc<RefCell<_>>` so closures and
/// nested blocks can hold independent handles to the same mutable map
/// (spec.md 3 "Environment", 9 "reference-counted handles").
#[derive(Clone)]
pub struct Environment(Rc<RefCell<Scope>>);

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "<environment>")
    }
}

impl Environment {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(Scope { values: HashMap::new(), enclosing: None })))
    }

    pub fn with_enclosing(enclosing: Environment) -> Self {
        trace!("pushing a new scope");
        Self(Rc::new(RefCell::new(Scope {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        })))
    }

    /// Binds `name` in the current scope, overwriting any prior binding of
    /// the same name in that scope without error.
    pub fn define(&self, name: &str, value: Value) {
        self.0.borrow_mut().values.insert(name.to_owned(), value);
    }

    /// Looks up `name`, walking the enclosing chain from innermost out.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        let scope = self.0.borrow();
        if let Some(value) = scope.values.get(&name.lexeme) {
            return Ok(value.clone());
        }
        if let Some(enclosing) = &scope.enclosing {
            return enclosing.get(name);
        }
        Err(RuntimeError::new(name.line, format!("undefined variable '{}'", name.lexeme)))
    }

    /// Assigns to the nearest enclosing scope that already declared `name`.
    pub fn assign(&self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        let mut scope = self.0.borrow_mut();
        if scope.values.contains_key(&name.lexeme) {
            scope.values.insert(name.lexeme.clone(), value);
            return Ok(());
        }
        match &scope.enclosing {
            Some(enclosing) => enclosing.assign(name, value),
            None => Err(RuntimeError::new(name.line, format!("undefined variable '{}'", name.lexeme))),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn ident(name: &str) -> Token {
        Token::new(TokenKind::Identifier, name, None, 1)
    }

    #[test]
    fn shadowing_in_a_nested_scope_does_not_affect_the_parent() {
        let parent = Environment::new();
        parent.define("x", Value::Number(1.0));
        let child = Environment::with_enclosing(parent.clone());
        child.define("x", Value::Number(2.0));

        assert_eq!(child.get(&ident("x")).unwrap(), Value::Number(2.0));
        assert_eq!(parent.get(&ident("x")).unwrap(), Value::Number(1.0));
    }

    #[test]
    fn assign_targets_the_declaring_scope() {
        let parent = Environment::new();
        parent.define("x", Value::Number(1.0));
        let child = Environment::with_enclosing(parent.clone());

        child.assign(&ident("x"), Value::Number(9.0)).unwrap();

        assert_eq!(parent.get(&ident("x")).unwrap(), Value::Number(9.0));
    }

    #[test]
    fn undefined_lookup_is_a_runtime_error() {
        let env = Environment::new();
        assert!(env.get(&ident("missing")).is_err());
    }
}
