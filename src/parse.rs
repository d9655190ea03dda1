//! Lazy evaluation of parser expressions.
//!
//! Parsing an input with an [`Expr`] produces a [`Parses`] iterator of `(value, rest)` pairs,
//! where `rest` is the suffix of the input left unconsumed. Results are computed only when
//! they are pulled from the iterator, so a consumer that only wants the first full parse
//! never pays for the alternatives it doesn't look at.
//!
//! # Failure
//! A parser that cannot match simply produces no results; there is no error for unmatched
//! input. The only error in this module is a [`GrammarError::UnresolvedRule`], raised before
//! any parsing happens if the expression mentions a rule that cannot be resolved.
//!
//! # Termination
//! This is plain exhaustive backtracking. Left-recursive rules and repetitions of parsers
//! that can succeed without consuming input do not terminate.

use std::{collections::BTreeMap, iter};

use log::trace;
use regex_automata::{Anchored, Input};

use crate::{
    error::GrammarError,
    expr::{Expr, Node},
    value::Value,
};

/// A single parse: a semantic value and the remaining input.
pub type Parse<'src> = (Value<'src>, &'src str);

/// A lazily evaluated sequence of parses, borrowing the grammar for `'g` and the input for
/// `'src`.
pub type Parses<'g, 'src> = Box<dyn Iterator<Item = Parse<'src>> + 'g>;

/// The frozen mapping from rule names to their definitions.
pub(crate) type RuleMap = BTreeMap<String, Expr>;

/// The environment used by expressions parsed outside of any grammar.
static NO_RULES: RuleMap = BTreeMap::new();

/// A frontier of branches in a repetition: the values matched so far and the remaining input.
type Frontier<'src> = Vec<(Vec<Value<'src>>, &'src str)>;

impl Expr {
    /// Parses `input` with `self`, producing every parse lazily.
    ///
    /// Fails if `self` contains a rule reference: a standalone expression has no rules to
    /// refer to, so use a [`Grammar`](crate::rules::Grammar) instead.
    pub fn parse<'g, 'src: 'g>(
        &'g self,
        input: &'src str,
    ) -> Result<Parses<'g, 'src>, GrammarError> {
        if let Some(name) = self.references().into_iter().next() {
            return Err(GrammarError::UnresolvedRule {
                name: name.to_string(),
            });
        }

        Ok(self.eval(&NO_RULES, input))
    }

    /// Parses `input` with `self`, resolving rule references in `rules`.
    ///
    /// Every rule reachable from `self` must already be bound in `rules`.
    pub(crate) fn eval<'g, 'src: 'g>(
        &'g self,
        rules: &'g RuleMap,
        input: &'src str,
    ) -> Parses<'g, 'src> {
        match self.node() {
            Node::Literal(text) => Box::new(
                input
                    .strip_prefix(text.as_str())
                    .map(|rest| (Value::from(&input[..text.len()]), rest))
                    .into_iter(),
            ),

            Node::Regex { compiled, .. } => Box::new(
                compiled
                    .search(&Input::new(input).anchored(Anchored::Yes))
                    .map(|m| (Value::from(&input[..m.end()]), &input[m.end()..]))
                    .into_iter(),
            ),

            Node::OneOf(set) => Box::new(split_char(input, |c| set.contains(c)).into_iter()),
            Node::NoneOf(set) => Box::new(split_char(input, |c| !set.contains(c)).into_iter()),

            Node::Seq(lhs, rhs) => Box::new(lhs.eval(rules, input).flat_map(move |(left, rest)| {
                rhs.eval(rules, rest)
                    .map(move |(right, rest)| (Value::pair(left.clone(), right), rest))
            })),

            Node::Union(alts) => Box::new(alts.iter().flat_map(move |alt| alt.eval(rules, input))),

            Node::First(alts) => deferred(move || {
                for alt in alts {
                    let mut parses = alt.eval(rules, input).peekable();
                    if parses.peek().is_some() {
                        return Box::new(parses) as Parses<'g, 'src>;
                    }
                }
                Box::new(iter::empty())
            }),

            Node::Many(inner) => deferred(move || {
                Box::new(
                    repeat(inner, rules, input)
                        .into_iter()
                        .map(|(values, rest)| (Value::List(values), rest)),
                )
            }),

            Node::Many1(inner) => Box::new(inner.eval(rules, input).flat_map(move |(head, rest)| {
                repeat(inner, rules, rest)
                    .into_iter()
                    .map(move |(mut values, rest)| {
                        values.insert(0, head.clone());
                        (Value::List(values), rest)
                    })
            })),

            Node::Opt(inner) => deferred(move || {
                let mut parses = inner.eval(rules, input).peekable();
                if parses.peek().is_none() {
                    return Box::new(iter::once((Value::List(Vec::new()), input)));
                }
                Box::new(parses.map(|(value, rest)| (Value::List(vec![value]), rest)))
            }),

            Node::Map(inner, transform) => Box::new(
                inner
                    .eval(rules, input)
                    .map(move |(value, rest)| (transform(value), rest)),
            ),

            Node::Full(inner) => Box::new(
                inner
                    .eval(rules, input)
                    .filter(|(_, rest)| rest.is_empty()),
            ),

            Node::Rule(name) => deferred(move || match rules.get(name) {
                Some(definition) => definition.eval(rules, input),
                None => unreachable!("rule `{name}` is resolved before parsing starts"),
            }),
        }
    }
}

/// Delays calling `f` until the first result is pulled from the returned iterator.
fn deferred<'g, 'src: 'g, F>(f: F) -> Parses<'g, 'src>
where
    F: FnOnce() -> Parses<'g, 'src> + 'g,
{
    Box::new(iter::once(f).flat_map(|f| f()))
}

/// Splits the first character off `input` if it satisfies `accept`.
fn split_char(input: &str, accept: impl Fn(char) -> bool) -> Option<Parse<'_>> {
    let mut chars = input.chars();
    match chars.next() {
        Some(c) if accept(c) => Some((Value::Char(c), chars.as_str())),
        _ => None,
    }
}

/// Applies `inner` to every branch of a frontier until no branch can be extended, and returns
/// the last non-empty frontier.
///
/// Every branch is tracked separately because `inner` may itself be ambiguous.
fn repeat<'g, 'src: 'g>(inner: &'g Expr, rules: &'g RuleMap, input: &'src str) -> Frontier<'src> {
    let mut frontier = vec![(Vec::new(), input)];

    loop {
        let expanded: Frontier<'src> = frontier
            .iter()
            .flat_map(|(values, rest)| {
                inner.eval(rules, *rest).map(move |(value, rest)| {
                    let mut values = values.clone();
                    values.push(value);
                    (values, rest)
                })
            })
            .collect();

        if expanded.is_empty() {
            return frontier;
        }

        trace!(
            "repetition expanded {} branch(es) into {}",
            frontier.len(),
            expanded.len()
        );
        frontier = expanded;
    }
}
