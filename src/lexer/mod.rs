//! Hand-written single-pass scanner: source text in, a token vector out.

mod keywords;

use std::fmt;

use log::{debug, trace};

use crate::token::{Literal, Token, TokenKind};
use keywords::KEYWORDS;

pub use keywords::phrase_for_line;

/// A lexical error: an unrecognized character or an unterminated string.
/// Carries both a precise `message` for tooling that wants to know exactly
/// what went wrong, and a whimsical cat-sound `phrase` that is what actually
/// gets displayed (spec.md 4.1: "the message is a whimsical 'cat sound'").
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub line: usize,
    pub message: String,
    pub phrase: String,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] {}", self.line, self.phrase)
    }
}

impl std::error::Error for LexError {}

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
        }
    }

    /// Scans the whole source, returning the token vector (always EOF
    /// terminated) or the first error encountered. Matches the reference
    /// scanner in aborting the whole scan on the first bad character or
    /// unterminated string, rather than trying to recover token-by-token.
    pub fn scan_tokens(mut self) -> Result<Vec<Token>, LexError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }
        self.tokens.push(Token::new(TokenKind::Eof, "", None, self.line));
        debug!("scanned {} token(s) across {} line(s)", self.tokens.len(), self.line);
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), LexError> {
        let c = self.advance();
        match c {
            '(' => self.add_token(TokenKind::LeftParen, None),
            ')' => self.add_token(TokenKind::RightParen, None),
            '{' => self.add_token(TokenKind::LeftBrace, None),
            '}' => self.add_token(TokenKind::RightBrace, None),
            ',' => self.add_token(TokenKind::Comma, None),
            '@' => self.add_token(TokenKind::PawPaw, None),
            '%' => self.add_token(TokenKind::Scratch, None),
            '~' => self.add_token(TokenKind::PurrPurr, None),
            '^' => self.add_token(TokenKind::Feed, None),
            '=' => self.add_token(TokenKind::Equals, None),
            '!' => self.add_token(TokenKind::Not, None),
            '#' => {
                while self.peek() != '\n' && !self.is_at_end() {
                    self.advance();
                }
            }
            ' ' | '\r' | '\t' => {}
            '\n' => {
                if self.tokens.last().map(|t| t.kind) != Some(TokenKind::Newline) {
                    self.add_token(TokenKind::Newline, None);
                }
                self.line += 1;
            }
            '"' => self.string()?,
            c if c.is_ascii_digit() => self.number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.identifier(),
            _ => {
                return Err(LexError {
                    line: self.line,
                    message: format!("unexpected character '{c}'"),
                    phrase: phrase_for_line(self.line).to_owned(),
                })
            }
        }
        Ok(())
    }

    fn string(&mut self) -> Result<(), LexError> {
        while self.peek() != '"' && !self.is_at_end() {
            if self.peek() == '\n' {
                self.line += 1;
            }
            self.advance();
        }
        if self.is_at_end() {
            return Err(LexError {
                line: self.line,
                message: "unterminated string".to_owned(),
                phrase: phrase_for_line(self.line).to_owned(),
            });
        }
        self.advance(); // closing quote
        let value: String = self.source[self.start + 1..self.current - 1].iter().collect();
        self.add_token(TokenKind::String, Some(Literal::Str(value)));
        Ok(())
    }

    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            self.advance(); // the '.'
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        let text: String = self.source[self.start..self.current].iter().collect();
        let value: f64 = text.parse().expect("scanned number text must be valid f64");
        self.add_token(TokenKind::Number, Some(Literal::Number(value)));
    }

    fn identifier(&mut self) {
        while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
            self.advance();
        }
        let text: String = self.source[self.start..self.current].iter().collect();
        let kind = KEYWORDS.get(text.as_str()).copied().unwrap_or(TokenKind::Identifier);
        self.add_token(kind, None);
    }

    fn add_token(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let lexeme: String = self.source[self.start..self.current].iter().collect();
        trace!("produced token {kind:?} '{lexeme}' on line {}", self.line);
        self.tokens.push(Token::new(kind, lexeme, literal, self.line));
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> char {
        *self.source.get(self.current).unwrap_or(&'\0')
    }

    fn peek_next(&self) -> char {
        *self.source.get(self.current + 1).unwrap_or(&'\0')
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source).scan_tokens().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn single_char_tokens() {
        assert_eq!(
            kinds("(){},@%~^=!"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::LeftBrace,
                TokenKind::RightBrace,
                TokenKind::Comma,
                TokenKind::PawPaw,
                TokenKind::Scratch,
                TokenKind::PurrPurr,
                TokenKind::Feed,
                TokenKind::Equals,
                TokenKind::Not,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_and_word_operators() {
        assert_eq!(
            kinds("meow purr grr grrr mrrr prrr mew and or true false nil TAIL_UP TAIL_UP_UP TAIL_DOWN TAIL_DOWN_DOWN PSPSPS HISSS"),
            vec![
                TokenKind::Meow,
                TokenKind::Purr,
                TokenKind::Grr,
                TokenKind::Grrr,
                TokenKind::Mrrr,
                TokenKind::Prrr,
                TokenKind::Mew,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::True,
                TokenKind::False,
                TokenKind::Nil,
                TokenKind::TailUp,
                TokenKind::TailUpUp,
                TokenKind::TailDown,
                TokenKind::TailDownDown,
                TokenKind::Pspsps,
                TokenKind::Hisss,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn newline_collapsing() {
        assert_eq!(
            kinds("meow x\n\n\nmeow y"),
            vec![
                TokenKind::Meow,
                TokenKind::Identifier,
                TokenKind::Newline,
                TokenKind::Meow,
                TokenKind::Identifier,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn number_literal_with_fraction() {
        let tokens = Lexer::new("3.5 3. 3").scan_tokens().unwrap();
        assert_eq!(tokens[0].literal, Some(Literal::Number(3.5)));
        // trailing '.' without a digit is not consumed as part of the number
        assert_eq!(tokens[1].literal, Some(Literal::Number(3.0)));
        assert_eq!(tokens[1].lexeme, "3");
    }

    #[test]
    fn string_literal_spanning_lines() {
        let tokens = Lexer::new("\"a\nb\"").scan_tokens().unwrap();
        assert_eq!(tokens[0].literal, Some(Literal::Str("a\nb".to_owned())));
    }

    #[test]
    fn unterminated_string_is_an_error() {
        assert!(Lexer::new("\"abc").scan_tokens().is_err());
    }

    #[test]
    fn unknown_character_is_an_error() {
        assert!(Lexer::new("$").scan_tokens().is_err());
    }

    #[test]
    fn line_comment_runs_to_newline() {
        assert_eq!(kinds("meow x # this is a comment\n"), vec![TokenKind::Meow, TokenKind::Identifier, TokenKind::Newline, TokenKind::Eof]);
    }
}
