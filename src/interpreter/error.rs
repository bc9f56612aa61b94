use std::fmt;

/// A runtime error: type mismatch, division by zero, unknown variable, wrong
/// arity, non-callable invocation, or a non-numeric/non-boolean `mrrr`
/// condition (spec.md 7). Carries the line of the offending token.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub line: usize,
    pub message: String,
}

impl RuntimeError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self { line, message: message.into() }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] {}", self.line, self.message)
    }
}

impl std::error::Error for RuntimeError {}
