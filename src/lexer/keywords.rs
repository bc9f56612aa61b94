//! The keyword lookup table and the lexer's whimsical error-message pool.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::token::TokenKind;

/// Maps every reserved identifier (including the word-operators like
/// `TAIL_UP`) to its token kind. Anything not found here is an IDENTIFIER.
pub static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("meow", TokenKind::Meow);
    m.insert("purr", TokenKind::Purr);
    m.insert("hiss", TokenKind::Hiss);
    m.insert("grr", TokenKind::Grr);
    m.insert("grrr", TokenKind::Grrr);
    m.insert("mrrr", TokenKind::Mrrr);
    m.insert("prrr", TokenKind::Prrr);
    m.insert("mew", TokenKind::Mew);
    m.insert("and", TokenKind::And);
    m.insert("or", TokenKind::Or);
    m.insert("true", TokenKind::True);
    m.insert("false", TokenKind::False);
    m.insert("nil", TokenKind::Nil);
    m.insert("TAIL_UP", TokenKind::TailUp);
    m.insert("TAIL_UP_UP", TokenKind::TailUpUp);
    m.insert("TAIL_DOWN", TokenKind::TailDown);
    m.insert("TAIL_DOWN_DOWN", TokenKind::TailDownDown);
    m.insert("PSPSPS", TokenKind::Pspsps);
    m.insert("HISSS", TokenKind::Hisss);
    m
});

/// A small, fixed pool of cat-sound phrases used for both lexer and parser
/// diagnostics (spec.md 4.1, 4.2: "implementers may emit any fixed or
/// randomized set from a small phrase pool"). Indexed deterministically by
/// line number rather than pulled from `rand`, which the host crate doesn't
/// otherwise need.
pub static PHRASES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "hiss!",
        "mrowr?!",
        "fffppt.",
        "yowl!",
        "grumble-meow.",
        "pspspsps...",
        "hhhhhk-tui.",
        "mrrrowl.",
    ]
});

pub fn phrase_for_line(line: usize) -> &'static str {
    let pool = &*PHRASES;
    pool[line % pool.len()]
}
