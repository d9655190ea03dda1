//! Small lexical building blocks shared by most grammars.
//!
//! # Whitespace
//! [`whitespace`] (and therefore [`word`]) skips space, tab, newline, carriage return and
//! vertical tab: the ASCII whitespace characters other than form feed. Carriage return is
//! included so that input with `\r\n` line endings tokenises the same as input with `\n`.
//! Grammars that want a narrower set, such as only `' '`, `'\t'` and `'\n'`, can build their
//! own with [`many`] and [`one_of`].

use crate::{
    charset::CharSet,
    expr::{left, literal, many, one_of, Expr},
};

/// The characters skipped by [`whitespace`].
const WHITESPACE: [char; 5] = [' ', '\t', '\n', '\r', '\x0B'];

/// Matches any run of whitespace, possibly empty, producing the list of matched characters.
pub fn whitespace() -> Expr {
    many(one_of(WHITESPACE))
}

/// Matches `text` followed by any whitespace, producing `text`.
pub fn word(text: &str) -> Expr {
    left(literal(text), whitespace())
}

/// Matches a single decimal digit.
pub fn digit() -> Expr {
    one_of('0'..='9')
}

/// Matches a single decimal digit other than `0`.
pub fn nonzero_digit() -> Expr {
    one_of('1'..='9')
}

/// Matches a single ASCII letter.
pub fn alpha() -> Expr {
    one_of(('A'..='Z').chain('a'..='z').collect::<CharSet>())
}
