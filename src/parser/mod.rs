//! Recursive-descent parser with Pratt-style precedence climbing for
//! expressions (spec.md 4.2).

use std::fmt;

use log::{debug, trace};

use crate::ast::{Expr, Function, Stmt};
use crate::lexer::phrase_for_line;
use crate::token::{Literal, Token, TokenKind};
use crate::value::Value;

const MAX_ARGS: usize = 255;

/// A parse error: a token mismatch with the grammar. Carries both a precise
/// `message` describing exactly what the grammar expected, and a whimsical
/// cat-sound `phrase` — the same pool the lexer draws from — that is what
/// actually gets displayed (spec.md 4.2: "the same whimsical cat phrases as
/// the lexer"). `token` is the offending lexeme, kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub line: usize,
    pub message: String,
    pub phrase: String,
    pub token: String,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] {}", self.line, self.phrase)
    }
}

impl std::error::Error for ParseError {}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            current: 0,
            errors: Vec::new(),
        }
    }

    /// Parses the whole token stream into a statement list. Returns the
    /// statements accumulated so far alongside every parse error collected
    /// via synchronization; the caller decides whether any error should
    /// halt the pipeline before evaluation (spec.md 7).
    pub fn parse(mut self) -> (Vec<Stmt>, Vec<ParseError>) {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if self.matches(&[TokenKind::Newline]) {
                continue;
            }
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                Err(_) => self.synchronize(),
            }
        }
        debug!("parsed {} top-level statement(s), {} error(s)", statements.len(), self.errors.len());
        (statements, self.errors)
    }

    // ---- declarations ----

    fn declaration(&mut self) -> Result<Stmt, ParseError> {
        if self.matches(&[TokenKind::Prrr]) {
            return self.function_declaration();
        }
        if self.matches(&[TokenKind::Meow]) {
            return self.var_declaration();
        }
        self.statement()
    }

    fn function_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(TokenKind::Identifier, "expected a function name")?;
        trace!("parsing function declaration '{}'", name.lexeme);
        self.consume(TokenKind::LeftParen, "expected '(' after function name")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= MAX_ARGS {
                    self.error_at_current("can't have more than 255 parameters");
                }
                params.push(self.consume(TokenKind::Identifier, "expected a parameter name")?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "expected ')' after parameters")?;
        self.consume(TokenKind::LeftBrace, "expected '{' before function body")?;
        let body = self.block()?;
        Ok(Stmt::Function(std::rc::Rc::new(Function { name, params, body })))
    }

    fn var_declaration(&mut self) -> Result<Stmt, ParseError> {
        let name = self.consume(TokenKind::Identifier, "expected a variable name")?;
        let initializer = if self.matches(&[TokenKind::Equals]) { Some(self.expression()?) } else { None };
        self.consume_terminator()?;
        Ok(Stmt::Var(name, initializer))
    }

    // ---- statements ----

    fn statement(&mut self) -> Result<Stmt, ParseError> {
        if self.matches(&[TokenKind::Grr]) {
            return self.if_statement();
        }
        if self.matches(&[TokenKind::Mrrr]) {
            return self.while_statement();
        }
        if self.matches(&[TokenKind::Purr]) {
            return self.print_statement();
        }
        if self.matches(&[TokenKind::Mew]) {
            return self.return_statement();
        }
        if self.matches(&[TokenKind::LeftBrace]) {
            return Ok(Stmt::Block(self.block()?));
        }
        self.expression_statement()
    }

    fn if_statement(&mut self) -> Result<Stmt, ParseError> {
        let condition = self.expression()?;
        self.consume(TokenKind::LeftBrace, "expected '{' after if condition")?;
        let then_branch = Box::new(Stmt::Block(self.block()?));
        let else_branch = if self.matches(&[TokenKind::Grrr]) {
            self.consume(TokenKind::LeftBrace, "expected '{' after grrr")?;
            Some(Box::new(Stmt::Block(self.block()?)))
        } else {
            None
        };
        Ok(Stmt::If(condition, then_branch, else_branch))
    }

    fn while_statement(&mut self) -> Result<Stmt, ParseError> {
        let condition = self.expression()?;
        self.consume(TokenKind::LeftBrace, "expected '{' after while condition")?;
        let body = Box::new(Stmt::Block(self.block()?));
        Ok(Stmt::While(condition, body))
    }

    fn print_statement(&mut self) -> Result<Stmt, ParseError> {
        let value = self.expression()?;
        self.consume_terminator()?;
        Ok(Stmt::Print(value))
    }

    fn return_statement(&mut self) -> Result<Stmt, ParseError> {
        let keyword = self.previous();
        let value = if self.check(TokenKind::Newline) || self.is_at_end() {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume_terminator()?;
        Ok(Stmt::Return(keyword, value))
    }

    fn block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if self.matches(&[TokenKind::Newline]) {
                continue;
            }
            match self.declaration() {
                Ok(stmt) => statements.push(stmt),
                // Recover at the failed statement and keep parsing the rest
                // of this block, rather than unwinding out of it entirely.
                Err(_) => self.synchronize(),
            }
        }
        self.consume(TokenKind::RightBrace, "expected '}' after block")?;
        Ok(statements)
    }

    fn expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.expression()?;
        self.consume_terminator()?;
        Ok(Stmt::Expression(expr))
    }

    /// A NEWLINE terminates most statements, but is waived at EOF.
    fn consume_terminator(&mut self) -> Result<(), ParseError> {
        if self.is_at_end() {
            return Ok(());
        }
        self.consume(TokenKind::Newline, "expected a newline after statement")?;
        Ok(())
    }

    // ---- expressions ----

    fn expression(&mut self) -> Result<Expr, ParseError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.logic_or()?;
        if self.matches(&[TokenKind::Equals]) {
            let equals = self.previous();
            let value = self.assignment()?;
            return match expr {
                Expr::Variable(name) => Ok(Expr::Assign(name, Box::new(value))),
                _ => {
                    self.errors.push(ParseError {
                        line: equals.line,
                        message: "invalid assignment target".to_owned(),
                        phrase: phrase_for_line(equals.line).to_owned(),
                        token: equals.lexeme.clone(),
                    });
                    Ok(expr)
                }
            };
        }
        Ok(expr)
    }

    fn logic_or(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.logic_and()?;
        while self.matches(&[TokenKind::Or]) {
            let op = self.previous();
            let right = self.logic_and()?;
            expr = Expr::Logical(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn logic_and(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenKind::And]) {
            let op = self.previous();
            let right = self.equality()?;
            expr = Expr::Logical(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.comparison()?;
        while self.matches(&[TokenKind::Pspsps, TokenKind::Hisss]) {
            let op = self.previous();
            let right = self.comparison()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.term()?;
        while self.matches(&[TokenKind::TailUp, TokenKind::TailUpUp, TokenKind::TailDown, TokenKind::TailDownDown]) {
            let op = self.previous();
            let right = self.term()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.factor()?;
        while self.matches(&[TokenKind::PawPaw, TokenKind::Scratch]) {
            let op = self.previous();
            let right = self.factor()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.unary()?;
        while self.matches(&[TokenKind::PurrPurr, TokenKind::Feed]) {
            let op = self.previous();
            let right = self.unary()?;
            expr = Expr::Binary(Box::new(expr), op, Box::new(right));
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.matches(&[TokenKind::Not, TokenKind::Scratch]) {
            let op = self.previous();
            let right = self.unary()?;
            return Ok(Expr::Unary(op, Box::new(right)));
        }
        self.call()
    }

    fn call(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.primary()?;
        loop {
            if self.matches(&[TokenKind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn finish_call(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if args.len() >= MAX_ARGS {
                    self.error_at_current("can't have more than 255 arguments");
                }
                args.push(self.expression()?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        let paren = self.consume(TokenKind::RightParen, "expected ')' after arguments")?;
        Ok(Expr::Call(Box::new(callee), paren, args))
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        if self.matches(&[TokenKind::False]) {
            return Ok(Expr::Literal(Value::Bool(false)));
        }
        if self.matches(&[TokenKind::True]) {
            return Ok(Expr::Literal(Value::Bool(true)));
        }
        if self.matches(&[TokenKind::Nil]) {
            return Ok(Expr::Literal(Value::Nil));
        }
        if self.matches(&[TokenKind::Number]) {
            return Ok(Expr::Literal(match self.previous().literal {
                Some(Literal::Number(n)) => Value::Number(n),
                _ => unreachable!("NUMBER token without a numeric literal"),
            }));
        }
        if self.matches(&[TokenKind::String]) {
            return Ok(Expr::Literal(match self.previous().literal {
                Some(Literal::Str(s)) => Value::Str(s),
                _ => unreachable!("STRING token without a string literal"),
            }));
        }
        if self.matches(&[TokenKind::Identifier]) {
            return Ok(Expr::Variable(self.previous()));
        }
        if self.matches(&[TokenKind::LeftParen]) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "expected ')' after expression")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }
        Err(self.make_error(self.peek(), "expected an expression"))
    }

    // ---- token-stream plumbing ----

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        for kind in kinds {
            if self.check(*kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> Token {
        self.tokens[self.current].clone()
    }

    fn previous(&self) -> Token {
        self.tokens[self.current - 1].clone()
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.make_error(self.peek(), message))
    }

    /// Records a non-aborting error (arity caps): parsing continues past
    /// the 256th parameter/argument to allow recovery, per spec.md 4.2.
    fn error_at_current(&mut self, message: &str) {
        let token = self.peek();
        self.errors.push(ParseError {
            line: token.line,
            message: message.to_owned(),
            phrase: phrase_for_line(token.line).to_owned(),
            token: token.lexeme,
        });
    }

    fn make_error(&mut self, token: Token, message: &str) -> ParseError {
        let error = ParseError {
            line: token.line,
            message: message.to_owned(),
            phrase: phrase_for_line(token.line).to_owned(),
            token: token.lexeme,
        };
        self.errors.push(error.clone());
        error
    }

    /// Advances past a NEWLINE or to the next statement-starting keyword,
    /// discarding the offending declaration (spec.md 4.2). Always consumes
    /// the offending token first so that an error detected right after a
    /// NEWLINE can't make this a no-op and stall `parse`'s loop forever.
    fn synchronize(&mut self) {
        trace!("synchronizing after a parse error at line {}", self.peek().line);
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Newline {
                return;
            }
            match self.peek().kind {
                TokenKind::Meow | TokenKind::Purr | TokenKind::Grr | TokenKind::Grrr | TokenKind::Mrrr | TokenKind::Prrr | TokenKind::Mew => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn parse_ok(source: &str) -> Vec<Stmt> {
        let tokens = Lexer::new(source).scan_tokens().unwrap();
        let (stmts, errors) = Parser::new(tokens).parse();
        assert!(errors.is_empty(), "unexpected parse errors: {errors:?}");
        stmts
    }

    #[test]
    fn parses_print_of_binary_expression() {
        let stmts = parse_ok("purr 1 @ 2\n");
        assert!(matches!(&stmts[0], Stmt::Print(Expr::Binary(..))));
    }

    #[test]
    fn assignment_is_right_associative() {
        let stmts = parse_ok("meow a = 1\nmeow b = 1\na = b = 5\n");
        assert!(matches!(&stmts[2], Stmt::Expression(Expr::Assign(_, inner)) if matches!(**inner, Expr::Assign(..))));
    }

    #[test]
    fn invalid_assignment_target_records_error_without_aborting() {
        let tokens = Lexer::new("1 @ 2 = 3\n").scan_tokens().unwrap();
        let (stmts, errors) = Parser::new(tokens).parse();
        assert_eq!(errors.len(), 1);
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn function_declaration_with_params() {
        let stmts = parse_ok("prrr add(a, b) {\n  mew a @ b\n}\n");
        match &stmts[0] {
            Stmt::Function(f) => assert_eq!(f.params.len(), 2),
            other => panic!("expected a function declaration, got {other:?}"),
        }
    }

    #[test]
    fn if_else_and_while_blocks() {
        let stmts = parse_ok("grr true {\n  purr 1\n} grrr {\n  purr 2\n}\nmrrr true {\n  purr 3\n}\n");
        assert!(matches!(stmts[0], Stmt::If(_, _, Some(_))));
        assert!(matches!(stmts[1], Stmt::While(..)));
    }

    #[test]
    fn newline_waived_at_eof() {
        let stmts = parse_ok("purr 1");
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn missing_closing_paren_is_a_parse_error() {
        let tokens = Lexer::new("purr (1 @ 2\n").scan_tokens().unwrap();
        let (_, errors) = Parser::new(tokens).parse();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn synchronize_terminates_when_the_error_token_directly_follows_a_newline() {
        // A stray '}' right after a terminated var declaration puts `previous()`
        // at NEWLINE the instant the error is detected; synchronize must still
        // consume the stray token instead of returning in place, or this parse
        // never returns.
        let tokens = Lexer::new("meow x = 1\n}\n").scan_tokens().unwrap();
        let (stmts, errors) = Parser::new(tokens).parse();
        assert_eq!(stmts.len(), 1);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn a_bad_statement_inside_a_block_does_not_abandon_the_rest_of_the_block() {
        let tokens = Lexer::new("prrr f() {\n  ^ 1\n  mew 2\n}\n").scan_tokens().unwrap();
        let (stmts, errors) = Parser::new(tokens).parse();
        assert_eq!(errors.len(), 1);
        assert_eq!(stmts.len(), 1, "the function declaration itself must still be a single top-level statement");
        match &stmts[0] {
            Stmt::Function(f) => assert_eq!(f.body.len(), 1, "recovery should stay inside the block and still parse 'mew 2'"),
            other => panic!("expected a function declaration, got {other:?}"),
        }
    }
}
