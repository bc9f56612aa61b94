//! The tree-walking evaluator (spec.md 4.3).

mod callable;
mod environment;
mod error;

pub use callable::UserFunction;
pub use environment::Environment;
pub use error::RuntimeError;

use std::rc::Rc;

use log::{debug, trace};

use crate::ast::{Expr, Stmt};
use crate::token::TokenKind;
use crate::value::{Callable, Value};

/// Statement execution either completes normally or unwinds with a return
/// value on its way back to the enclosing function invocation (spec.md 9
/// "Non-local return"). This is not an error: it is an internal control-flow
/// signal, never surfaced to user code.
pub enum Flow {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    globals: Environment,
    environment: Environment,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        let globals = Environment::new();
        Self {
            environment: globals.clone(),
            globals,
        }
    }

    /// Executes a whole program. A `Return` that unwinds past every function
    /// invocation (a `mew` outside any `prrr`) is itself a runtime error,
    /// per spec.md 4.3.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for statement in statements {
            match self.execute(statement)? {
                Flow::Normal => {}
                Flow::Return(_) => {
                    // Not reached by well-formed programs (spec.md 4.3); no
                    // token is available here to attribute a line to.
                    return Err(RuntimeError::new(0, "can't return from outside a function"));
                }
            }
        }
        Ok(())
    }

    fn execute(&mut self, stmt: &Stmt) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Flow::Normal)
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                println!("{}", value.stringify());
                Ok(Flow::Normal)
            }
            Stmt::Var(name, initializer) => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(&name.lexeme, value);
                Ok(Flow::Normal)
            }
            Stmt::Block(statements) => {
                let block_env = Environment::with_enclosing(self.environment.clone());
                self.execute_block(statements, block_env)
            }
            Stmt::If(condition, then_branch, else_branch) => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Flow::Normal)
                }
            }
            Stmt::While(condition, body) => {
                loop {
                    let value = self.evaluate(condition)?;
                    if !matches!(value, Value::Bool(_) | Value::Number(_)) {
                        return Err(RuntimeError::new(expr_line(condition), "while condition must be a boolean or a number"));
                    }
                    if !value.is_truthy() {
                        break;
                    }
                    match self.execute(body)? {
                        Flow::Normal => {}
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Function(declaration) => {
                debug!("declaring function '{}'", declaration.name.lexeme);
                let function = UserFunction::new(Rc::clone(declaration), self.environment.clone());
                self.environment.define(&declaration.name.lexeme, Value::Callable(Rc::new(function)));
                Ok(Flow::Normal)
            }
            Stmt::Return(keyword, value) => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                trace!("returning from line {}", keyword.line);
                Ok(Flow::Return(value))
            }
        }
    }

    /// Runs `statements` in `env`, restoring the caller's current
    /// environment on every exit path — normal completion, an early
    /// `Return`, or a propagated error (spec.md 4.3 "Block").
    pub(crate) fn execute_block(&mut self, statements: &[Stmt], env: Environment) -> Result<Flow, RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, env);
        let result = (|| {
            for statement in statements {
                match self.execute(statement)? {
                    Flow::Normal => {}
                    flow @ Flow::Return(_) => return Ok(flow),
                }
            }
            Ok(Flow::Normal)
        })();
        self.environment = previous;
        trace!("popped back to the enclosing scope");
        result
    }

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Variable(name) => self.environment.get(name),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary(op, operand) => {
                let value = self.evaluate(operand)?;
                match op.kind {
                    TokenKind::Not => Ok(Value::Bool(!value.is_truthy())),
                    TokenKind::Scratch => match value {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::new(op.line, "operand must be a number")),
                    },
                    _ => unreachable!("unary operator token must be NOT or SCRATCH"),
                }
            }
            Expr::Logical(left, op, right) => {
                let left_value = self.evaluate(left)?;
                match op.kind {
                    TokenKind::Or if left_value.is_truthy() => Ok(left_value),
                    TokenKind::Or => self.evaluate(right),
                    TokenKind::And if !left_value.is_truthy() => Ok(left_value),
                    TokenKind::And => self.evaluate(right),
                    _ => unreachable!("logical operator token must be AND or OR"),
                }
            }
            Expr::Assign(name, value) => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Binary(left, op, right) => self.evaluate_binary(left, op, right),
            Expr::Call(callee, paren, args) => self.evaluate_call(callee, paren, args),
        }
    }

    fn evaluate_binary(&mut self, left: &Expr, op: &crate::token::Token, right: &Expr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match op.kind {
            TokenKind::PawPaw => match (&left, &right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::Str(_), _) | (_, Value::Str(_)) => Ok(Value::Str(format!("{}{}", left.stringify(), right.stringify()))),
                _ => Err(RuntimeError::new(op.line, "operands must be numbers or strings")),
            },
            TokenKind::Scratch => self.numeric_binary(op, left, right, |a, b| Ok(Value::Number(a - b))),
            TokenKind::PurrPurr => self.numeric_binary(op, left, right, |a, b| Ok(Value::Number(a * b))),
            TokenKind::Feed => self.numeric_binary(op, left, right, |a, b| {
                if b == 0.0 {
                    Err(())
                } else {
                    Ok(Value::Number(a / b))
                }
            }),
            TokenKind::TailUp | TokenKind::TailUpUp | TokenKind::TailDown | TokenKind::TailDownDown => self.compare(op, left, right),
            TokenKind::Pspsps => Ok(Value::Bool(left == right)),
            TokenKind::Hisss => Ok(Value::Bool(left != right)),
            _ => unreachable!("binary operator token out of range"),
        }
    }

    fn numeric_binary(&self, op: &crate::token::Token, left: Value, right: Value, f: impl Fn(f64, f64) -> Result<Value, ()>) -> Result<Value, RuntimeError> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => f(a, b).map_err(|_| RuntimeError::new(op.line, "Division by zero")),
            _ => Err(RuntimeError::new(op.line, "operands must be numbers")),
        }
    }

    fn compare(&self, op: &crate::token::Token, left: Value, right: Value) -> Result<Value, RuntimeError> {
        let ordering = match (&left, &right) {
            (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            _ => return Err(RuntimeError::new(op.line, "operands must both be numbers or both be strings")),
        };
        let Some(ordering) = ordering else {
            return Err(RuntimeError::new(op.line, "operands are not comparable"));
        };
        use std::cmp::Ordering::*;
        let result = match op.kind {
            TokenKind::TailUp => ordering == Greater,
            TokenKind::TailUpUp => ordering != Less,
            TokenKind::TailDown => ordering == Less,
            TokenKind::TailDownDown => ordering != Greater,
            _ => unreachable!("comparison operator token out of range"),
        };
        Ok(Value::Bool(result))
    }

    fn evaluate_call(&mut self, callee: &Expr, paren: &crate::token::Token, args: &[Expr]) -> Result<Value, RuntimeError> {
        let callee_value = self.evaluate(callee)?;
        let mut arguments = Vec::with_capacity(args.len());
        for arg in args {
            arguments.push(self.evaluate(arg)?);
        }
        let Value::Callable(function) = callee_value else {
            return Err(RuntimeError::new(paren.line, "can only call functions"));
        };
        if arguments.len() != function.arity() {
            return Err(RuntimeError::new(
                paren.line,
                format!("expected {} arguments but got {}", function.arity(), arguments.len()),
            ));
        }
        function.call(self, arguments)
    }
}

/// Best-effort line lookup for expressions that don't evaluate to an error
/// themselves (the `mrrr` condition check). Only `Binary`/`Logical`/`Unary`/
/// `Assign`/`Call`/`Variable` carry a token per spec.md 3; a bare literal or
/// grouped literal condition has no attributable line.
fn expr_line(expr: &Expr) -> usize {
    match expr {
        Expr::Variable(token) | Expr::Unary(token, _) | Expr::Assign(token, _) => token.line,
        Expr::Binary(_, token, _) | Expr::Logical(_, token, _) | Expr::Call(_, token, _) => token.line,
        Expr::Grouping(inner) => expr_line(inner),
        Expr::Literal(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    fn run(source: &str) -> Result<(), RuntimeError> {
        let tokens = Lexer::new(source).scan_tokens().expect("lex");
        let (statements, errors) = Parser::new(tokens).parse();
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        Interpreter::new().interpret(&statements)
    }

    #[test]
    fn division_by_zero_is_a_runtime_error() {
        let err = run("purr 10 ^ 0\n").unwrap_err();
        assert!(err.message.contains("Division by zero"));
    }

    #[test]
    fn while_condition_must_be_boolean_or_number() {
        let err = run("mrrr \"yes\" {\n  purr 1\n}\n").unwrap_err();
        assert!(err.message.contains("boolean or a number"));
    }

    #[test]
    fn closures_capture_their_defining_scope() {
        let tokens = Lexer::new(
            "prrr counter() {\n  meow n = 0\n  prrr inc() {\n    n = n @ 1\n    mew n\n  }\n  mew inc\n}\nmeow c = counter()\n",
        )
        .scan_tokens()
        .unwrap();
        let (statements, errors) = Parser::new(tokens).parse();
        assert!(errors.is_empty());
        let mut interpreter = Interpreter::new();
        interpreter.interpret(&statements).unwrap();

        let c = interpreter.globals.get(&crate::token::Token::new(crate::token::TokenKind::Identifier, "c", None, 1)).unwrap();
        let Value::Callable(c) = c else { panic!("expected a callable") };
        assert_eq!(c.call(&mut interpreter, vec![]).unwrap(), Value::Number(1.0));
        assert_eq!(c.call(&mut interpreter, vec![]).unwrap(), Value::Number(2.0));
    }

    #[test]
    fn unknown_variable_is_a_runtime_error() {
        assert!(run("purr missing\n").is_err());
    }

    #[test]
    fn nil_equals_nil_but_not_false() {
        assert!(run("purr nil PSPSPS nil\n").is_ok());
    }
}
