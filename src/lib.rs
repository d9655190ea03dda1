//! Lazy parser combinators for ambiguous, recursive grammars.
//!
//! Parsers are ordinary values ([`Expr`]s) built from atomic matchers (literals, regular
//! expressions and character classes) and combined by sequencing, alternation, repetition,
//! optionality and semantic transforms. Parsing an input produces a lazy iterator of every
//! `(value, rest)` pair the parser admits, so ambiguous grammars simply produce more than one
//! result.
//!
//! Rules that refer to each other, or to themselves, are assembled in a [`Rules`] environment
//! and frozen into a [`Grammar`] (see the [`rules`] module).
//!
//! ```
//! use gllc::{full, literal, many, union, Value};
//!
//! # fn main() -> Result<(), gllc::GrammarError> {
//! let ab = full(many(union([literal("a"), literal("b")])));
//! let parses: Vec<_> = ab.parse("abba")?.collect();
//! assert_eq!(parses, [(Value::list(["a", "b", "b", "a"]), "")]);
//! # Ok(())
//! # }
//! ```
//!
//! # Semantics
//! This is plain exhaustive backtracking over immutable input. There is no memoisation and no
//! left-recursion handling: a left-recursive rule never terminates. Failing to match is not an
//! error, it is an empty iterator; [`GrammarError`] is reserved for malformed grammars.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

extern crate static_assertions as sa;

pub mod charset;
pub mod error;
pub mod expr;
pub mod grammars;
pub mod lexical;
pub mod parse;
pub mod rules;
pub mod value;

pub use charset::CharSet;
pub use error::GrammarError;
pub use expr::{
    class, cons, first, full, left, literal, many, many1, map, none_of, not_class, one_of, opt,
    regex, right, seq, union, Expr,
};
pub use parse::{Parse, Parses};
pub use rules::{Grammar, Rules, Values};
pub use value::{cons_list, fst, snd, Value};

// grammars are built once and then shared, possibly between threads
sa::assert_impl_all!(Expr: Clone, Send, Sync);
sa::assert_impl_all!(Grammar: Clone, Send, Sync);
sa::assert_impl_all!(GrammarError: std::error::Error, Send, Sync);
