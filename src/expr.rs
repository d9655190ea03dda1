//! Parser expressions and the functions that build them.
//!
//! An [`Expr`] is a node in a grammar graph. It is a cheap, shareable handle: cloning it
//! clones a pointer, never the expression itself, so one sub-expression can appear in any
//! number of places in a grammar and is only ever built once.
//!
//! # Building expressions
//! Every variant has a named builder function, and grouping is always explicit in the call
//! structure. For example the grammar fragment `a b | c` is written
//! `union([seq(a, b), c])`, while `a (b | c)` is `seq(a, union([b, c]))`.
//!
//! | builder                     | matches                                             | value                |
//! |-----------------------------|-----------------------------------------------------|----------------------|
//! | [`literal`]                 | exactly the given text                              | the text             |
//! | [`regex`]                   | the pattern, anchored at the start of the input     | the matched text     |
//! | [`one_of`], [`class`]       | one character in the set                            | the character        |
//! | [`none_of`], [`not_class`]  | one character not in the set                        | the character        |
//! | [`seq`]                     | both parsers, one after the other                   | a pair               |
//! | [`union`]                   | every alternative (ambiguous)                       | whatever matched     |
//! | [`first`]                   | the first alternative that matches at all           | whatever matched     |
//! | [`many`], [`many1`]         | zero/one or more repetitions                        | a list               |
//! | [`opt`]                     | the parser, or nothing if it cannot match           | a list of 0 or 1     |
//! | [`map`]                     | the parser                                          | transformed value    |
//! | [`full`]                    | the parser, if it consumes all the input            | the parser's value   |
//!
//! Rule references are created with [`Rules::rule`](crate::rules::Rules::rule).

use std::{collections::BTreeSet, fmt::Debug, sync::Arc};

use regex_automata::meta::Regex;

use crate::{
    charset::CharSet,
    error::GrammarError,
    value::{cons_list, fst, snd, Value},
};

/// A pure function applied to every value produced by a [`map`] expression.
pub(crate) type Transform = Arc<dyn for<'src> Fn(Value<'src>) -> Value<'src> + Send + Sync>;

/// A parser expression.
///
/// Expressions carry no per-parse state, and so can be reused across any number of parses;
/// see [`Expr::parse`] and [`Grammar`](crate::rules::Grammar).
#[derive(Clone)]
pub struct Expr(Arc<Node>);

/// The variants of a parser expression.
pub(crate) enum Node {
    /// Matches a literal string.
    Literal(String),
    /// Matches an anchored regular expression.
    Regex {
        /// The pattern as written by the user.
        pattern: String,
        /// The compiled pattern, only ever searched in anchored mode.
        compiled: Regex,
    },
    /// Matches a single character in the set.
    OneOf(CharSet),
    /// Matches a single character not in the set.
    NoneOf(CharSet),
    /// Sequencing.
    Seq(Expr, Expr),
    /// Ambiguous alternation.
    Union(Vec<Expr>),
    /// Ordered alternation, committing to the first alternative with any result.
    First(Vec<Expr>),
    /// Zero or more repetitions.
    Many(Expr),
    /// One or more repetitions.
    Many1(Expr),
    /// Zero or one occurrence, preferring one.
    Opt(Expr),
    /// Semantic transform.
    Map(Expr, Transform),
    /// Keeps only the parses that consume the entire input.
    Full(Expr),
    /// A late-bound reference to a named rule.
    Rule(String),
}

impl Expr {
    /// Wraps a [`Node`] in a new handle.
    fn new(node: Node) -> Self {
        Self(Arc::new(node))
    }

    /// Returns the node this handle points to.
    pub(crate) fn node(&self) -> &Node {
        &self.0
    }

    /// Creates a reference to the rule `name`, which is only looked up when parsing.
    pub(crate) fn reference(name: String) -> Self {
        Self::new(Node::Rule(name))
    }

    /// Returns `true` if `self` and `other` are the same node, not merely equivalent ones.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Collects the names of every rule referenced from `self`, without following the
    /// references themselves.
    pub(crate) fn references(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        let mut stack = vec![self];

        while let Some(expr) = stack.pop() {
            match expr.node() {
                Node::Literal(_) | Node::Regex { .. } | Node::OneOf(_) | Node::NoneOf(_) => {}
                Node::Seq(lhs, rhs) => stack.extend([lhs, rhs]),
                Node::Union(alts) | Node::First(alts) => stack.extend(alts),
                Node::Many(inner)
                | Node::Many1(inner)
                | Node::Opt(inner)
                | Node::Map(inner, _)
                | Node::Full(inner) => stack.push(inner),
                Node::Rule(name) => {
                    names.insert(name.as_str());
                }
            }
        }

        names
    }
}

impl Debug for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.node() {
            Node::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Node::Regex { pattern, .. } => f.debug_tuple("Regex").field(pattern).finish(),
            Node::OneOf(set) => f.debug_tuple("OneOf").field(set).finish(),
            Node::NoneOf(set) => f.debug_tuple("NoneOf").field(set).finish(),
            Node::Seq(lhs, rhs) => f.debug_tuple("Seq").field(lhs).field(rhs).finish(),
            Node::Union(alts) => f.debug_tuple("Union").field(alts).finish(),
            Node::First(alts) => f.debug_tuple("First").field(alts).finish(),
            Node::Many(inner) => f.debug_tuple("Many").field(inner).finish(),
            Node::Many1(inner) => f.debug_tuple("Many1").field(inner).finish(),
            Node::Opt(inner) => f.debug_tuple("Opt").field(inner).finish(),
            Node::Map(inner, _) => f
                .debug_tuple("Map")
                .field(inner)
                .field(&format_args!("_"))
                .finish(),
            Node::Full(inner) => f.debug_tuple("Full").field(inner).finish(),
            // never recurse through a reference, since rules may be cyclic
            Node::Rule(name) => write!(f, "Rule({name})"),
        }
    }
}

/// Returns an [`Expr`] matching exactly `text`.
pub fn literal(text: impl Into<String>) -> Expr {
    Expr::new(Node::Literal(text.into()))
}

/// Returns an [`Expr`] matching `pattern` at the very start of the input.
///
/// Fails immediately if `pattern` is not a valid regular expression.
pub fn regex(pattern: &str) -> Result<Expr, GrammarError> {
    // anchoring happens at search time; the pattern is compiled exactly as written
    let compiled = Regex::new(pattern).map_err(|source| GrammarError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })?;

    Ok(Expr::new(Node::Regex {
        pattern: pattern.to_string(),
        compiled,
    }))
}

/// Returns an [`Expr`] matching a single character in `set`.
pub fn one_of(set: impl Into<CharSet>) -> Expr {
    Expr::new(Node::OneOf(set.into()))
}

/// Returns an [`Expr`] matching a single character not in `set`.
///
/// This never matches the empty input.
pub fn none_of(set: impl Into<CharSet>) -> Expr {
    Expr::new(Node::NoneOf(set.into()))
}

/// Like [`one_of`], but parses `notation` as [class notation](crate::charset).
pub fn class(notation: &str) -> Result<Expr, GrammarError> {
    Ok(one_of(notation.parse::<CharSet>()?))
}

/// Like [`none_of`], but parses `notation` as [class notation](crate::charset).
pub fn not_class(notation: &str) -> Result<Expr, GrammarError> {
    Ok(none_of(notation.parse::<CharSet>()?))
}

/// Returns an [`Expr`] matching `lhs` followed by `rhs`, producing a [`Value::Pair`].
///
/// Sequences never flatten: `seq(seq(a, b), c)` produces `((a . b) . c)` whereas
/// `seq(a, seq(b, c))` produces `(a . (b . c))`.
pub fn seq(lhs: Expr, rhs: Expr) -> Expr {
    Expr::new(Node::Seq(lhs, rhs))
}

/// Returns an [`Expr`] producing every result of every alternative, in order.
pub fn union(alts: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::new(Node::Union(alts.into_iter().collect()))
}

/// Returns an [`Expr`] producing all the results of the first alternative which has any.
///
/// Later alternatives are never tried once one has matched, even if every result of the
/// matching alternative is later rejected (e.g. by [`full`]).
pub fn first(alts: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::new(Node::First(alts.into_iter().collect()))
}

/// Returns an [`Expr`] matching `inner` zero or more times, producing a [`Value::List`].
///
/// If `inner` can match without consuming input, parsing with this expression never
/// terminates.
pub fn many(inner: Expr) -> Expr {
    Expr::new(Node::Many(inner))
}

/// Returns an [`Expr`] matching `inner` one or more times, producing a [`Value::List`].
pub fn many1(inner: Expr) -> Expr {
    Expr::new(Node::Many1(inner))
}

/// Returns an [`Expr`] matching `inner` if possible, and nothing otherwise.
///
/// Each result of `inner` is wrapped in a single-element [`Value::List`]; the empty list is
/// produced only if `inner` has no results at all.
pub fn opt(inner: Expr) -> Expr {
    Expr::new(Node::Opt(inner))
}

/// Returns an [`Expr`] applying `transform` to every value produced by `inner`.
pub fn map<F>(inner: Expr, transform: F) -> Expr
where
    F: for<'src> Fn(Value<'src>) -> Value<'src> + Send + Sync + 'static,
{
    Expr::new(Node::Map(inner, Arc::new(transform)))
}

/// Returns an [`Expr`] keeping only the results of `inner` which consume the entire input.
pub fn full(inner: Expr) -> Expr {
    Expr::new(Node::Full(inner))
}

/// Matches `head` then `tail`, where `tail` produces a list, and prepends the value of `head`.
pub fn cons(head: Expr, tail: Expr) -> Expr {
    map(seq(head, tail), cons_list)
}

/// Matches `lhs` then `rhs`, keeping only the value of `lhs`.
pub fn left(lhs: Expr, rhs: Expr) -> Expr {
    map(seq(lhs, rhs), fst)
}

/// Matches `lhs` then `rhs`, keeping only the value of `rhs`.
pub fn right(lhs: Expr, rhs: Expr) -> Expr {
    map(seq(lhs, rhs), snd)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regex_is_validated_as_written() {
        assert!(matches!(
            regex(")("),
            Err(GrammarError::InvalidRegex { pattern, .. }) if pattern == ")("
        ));
        assert!(regex("[").is_err());
        assert!(regex("[0-9]+").is_ok());
    }

    #[test]
    fn verbose_patterns_may_end_in_a_comment() {
        assert!(regex("(?x)a # trailing comment").is_ok());
        assert!(regex("(?x) [0-9]+ # digits").is_ok());
    }

    #[test]
    fn class_errors_are_grammar_errors() {
        assert!(matches!(class("9-0"), Err(GrammarError::InvalidCharSet(_))));
        assert!(not_class("a-z").is_ok());
    }

    #[test]
    fn clones_share_their_node() {
        let a = literal("a");
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&literal("a")));
    }

    #[test]
    fn references_are_collected_without_duplicates() {
        let expr = seq(
            Expr::reference("x".into()),
            union([
                many(Expr::reference("y".into())),
                map(Expr::reference("x".into()), fst),
                literal("z"),
            ]),
        );
        assert_eq!(expr.references().into_iter().collect::<Vec<_>>(), ["x", "y"]);
        assert!(literal("x").references().is_empty());
    }

    #[test]
    fn debug_does_not_follow_references() {
        let expr = seq(literal("a"), Expr::reference("rest".into()));
        assert_eq!(format!("{expr:?}"), r#"Seq(Literal("a"), Rule(rest))"#);
    }
}
