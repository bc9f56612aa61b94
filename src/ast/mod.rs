//! The abstract syntax tree produced by the parser.
//!
//! Expressions and statements partition into two disjoint sums, each carried
//! in its own module, following the split the reference interpreter makes
//! between `ExprVisitor` and `StmtVisitor`.

mod expr;
mod stmt;

pub use expr::Expr;
pub use stmt::{Function, Stmt};
