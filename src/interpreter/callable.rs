use std::rc::Rc;

use log::trace;

use crate::ast::Function;
use crate::value::{Callable, Value};

use super::environment::Environment;
use super::error::RuntimeError;
use super::{Flow, Interpreter};

/// A user-defined function value: its declaration AST plus the environment
/// that was current when `prrr` ran — its lexical closure (spec.md 3, 9).
#[derive(Debug)]
pub struct UserFunction {
    declaration: Rc<Function>,
    closure: Environment,
}

impl UserFunction {
    pub fn new(declaration: Rc<Function>, closure: Environment) -> Self {
        Self { declaration, closure }
    }
}

impl Callable for UserFunction {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(&self, interpreter: &mut Interpreter, arguments: Vec<Value>) -> Result<Value, RuntimeError> {
        trace!("invoking '{}' with {} argument(s)", self.declaration.name.lexeme, arguments.len());
        let call_env = Environment::with_enclosing(self.closure.clone());
        for (param, arg) in self.declaration.params.iter().zip(arguments) {
            call_env.define(&param.lexeme, arg);
        }
        match interpreter.execute_block(&self.declaration.body, call_env)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }

    fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }
}
