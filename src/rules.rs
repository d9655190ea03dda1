//! Named, late-bound rules and the grammars assembled from them.
//!
//! # Assembling a grammar
//! A [`Grammar`] is built in a single pass by [`Grammar::build`], which hands a mutable
//! [`Rules`] environment to an assembly function. Inside that function, [`Rules::rule`]
//! returns a reference to a rule by name without looking it up, so rules can mention rules
//! that are defined later, and rules can be (mutually) recursive.
//!
//! ```raw
//! list ::= item ',' list | item
//! item ::= '[' list ']' | 'x'
//! ```
//!
//! ```
//! # use gllc::{left, literal, right, seq, Grammar, Value};
//! # fn main() -> Result<(), gllc::GrammarError> {
//! let grammar = Grammar::build(|rules| {
//!     let list = rules.rule("list");
//!     let item = rules.rule("item");
//!     rules.define("list", seq(item.clone(), right(literal(","), list.clone())));
//!     rules.define("list", item.clone());
//!     rules.define("item", right(literal("["), left(list.clone(), literal("]"))));
//!     rules.define("item", literal("x"));
//!     Ok(list)
//! })?;
//!
//! assert_eq!(grammar.parse_first("x,x"), Some(Value::pair("x", "x")));
//! assert_eq!(grammar.parse_first("[x]"), Some(Value::from("x")));
//! # Ok(())
//! # }
//! ```
//!
//! Defining a rule that is already defined does not replace it: the new definition becomes an
//! additional alternative, as if the rule were the [`union`] of all its definitions in the
//! order they were given.
//!
//! # Freezing
//! Once the assembly function returns, the environment is checked and frozen. Every rule
//! reference reachable from the grammar must name a defined rule, so a misspelled name is
//! reported as a [`GrammarError::UnresolvedRule`] before any input is parsed. The frozen
//! [`Grammar`] cannot be modified, and can be shared between threads and reused for any
//! number of parses.

use std::collections::btree_map::Entry;

use log::debug;

use crate::{
    error::GrammarError,
    expr::{union, Expr, Node},
    parse::{Parses, RuleMap},
    value::Value,
};

/// A lazily evaluated sequence of values from complete parses.
pub type Values<'g, 'src> = Box<dyn Iterator<Item = Value<'src>> + 'g>;

/// The environment in which a [`Grammar`] is assembled.
#[derive(Debug, Default)]
pub struct Rules {
    /// The definition of every rule bound so far.
    defs: RuleMap,
}

impl Rules {
    /// Returns an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a reference to the rule `name`, which need not be defined yet.
    pub fn rule(&self, name: impl Into<String>) -> Expr {
        Expr::reference(name.into())
    }

    /// Binds `expr` to the rule `name`, or adds it as a new alternative if `name` is
    /// already bound.
    pub fn define(&mut self, name: impl Into<String>, expr: Expr) {
        match self.defs.entry(name.into()) {
            Entry::Vacant(entry) => {
                debug!("defining rule `{}`", entry.key());
                entry.insert(expr);
            }
            Entry::Occupied(mut entry) => {
                let mut alts = match entry.get().node() {
                    Node::Union(alts) => alts.clone(),
                    _ => vec![entry.get().clone()],
                };
                alts.push(expr);
                debug!(
                    "rule `{}` now has {} alternatives",
                    entry.key(),
                    alts.len()
                );
                entry.insert(union(alts));
            }
        }
    }

    /// Returns the current definition of `name`, if any.
    pub fn get(&self, name: &str) -> Option<&Expr> {
        self.defs.get(name)
    }

    /// Returns `true` if `name` is bound.
    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    /// Iterates over the bound rule names in ascending order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }

    /// Checks that every reference in `exprs` and in every bound rule names a bound rule.
    fn resolve<'a>(&'a self, exprs: impl IntoIterator<Item = &'a Expr>) -> Result<(), GrammarError> {
        for expr in exprs.into_iter().chain(self.defs.values()) {
            if let Some(name) = expr
                .references()
                .into_iter()
                .find(|name| !self.contains(name))
            {
                return Err(GrammarError::UnresolvedRule {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// A frozen grammar: a start expression and the rules it may refer to.
#[derive(Debug, Clone)]
pub struct Grammar {
    /// The definition of every rule.
    rules: RuleMap,
    /// The expression parsed by [`Grammar::parse`].
    start: Expr,
}

impl Grammar {
    /// Assembles a grammar by calling `assemble` with an empty [`Rules`] environment. The
    /// expression returned by `assemble` becomes the start expression.
    ///
    /// Fails with the error returned by `assemble`, or with a
    /// [`GrammarError::UnresolvedRule`] if any rule reference names an undefined rule.
    pub fn build<F>(assemble: F) -> Result<Self, GrammarError>
    where
        F: FnOnce(&mut Rules) -> Result<Expr, GrammarError>,
    {
        let mut rules = Rules::new();
        let start = assemble(&mut rules)?;
        rules.resolve([&start])?;

        debug!("froze grammar with {} rule(s)", rules.defs.len());
        Ok(Self {
            rules: rules.defs,
            start,
        })
    }

    /// Returns the start expression.
    pub fn start(&self) -> &Expr {
        &self.start
    }

    /// Returns the definition of the rule `name`, if any.
    pub fn rule(&self, name: &str) -> Option<&Expr> {
        self.rules.get(name)
    }

    /// Iterates over the rule names in ascending order.
    pub fn rule_names(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Parses `input` with the start expression, producing every parse lazily.
    pub fn parse<'g, 'src: 'g>(&'g self, input: &'src str) -> Parses<'g, 'src> {
        self.start.eval(&self.rules, input)
    }

    /// Like [`Grammar::parse`], but starting from the rule `name`.
    pub fn parse_rule<'g, 'src: 'g>(
        &'g self,
        name: &str,
        input: &'src str,
    ) -> Result<Parses<'g, 'src>, GrammarError> {
        let start = self.rule(name).ok_or_else(|| GrammarError::UnknownRule {
            name: name.to_string(),
        })?;
        Ok(start.eval(&self.rules, input))
    }

    /// Produces the values of every parse of `input` which consumes all of it.
    pub fn parse_full<'g, 'src: 'g>(&'g self, input: &'src str) -> Values<'g, 'src> {
        Box::new(
            self.parse(input)
                .filter_map(|(value, rest)| rest.is_empty().then_some(value)),
        )
    }

    /// Returns the value of the first parse of `input` which consumes all of it.
    ///
    /// Only as much of the search space as is needed to find this parse is explored.
    pub fn parse_first<'src>(&self, input: &'src str) -> Option<Value<'src>> {
        self.parse_full(input).next()
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        expr::{first, full, left, literal, many, one_of, right, seq},
        value::snd,
    };

    use super::*;

    /// `list ::= item ',' list | item` and `item ::= '[' list ']' | 'x'`, with the rules
    /// defined in an order that needs forward references.
    fn nested_lists() -> Grammar {
        Grammar::build(|rules| {
            let list = rules.rule("list");
            let item = rules.rule("item");
            rules.define(
                "list",
                seq(item.clone(), right(literal(","), list.clone())),
            );
            rules.define("list", item.clone());
            rules.define(
                "item",
                right(literal("["), left(list.clone(), literal("]"))),
            );
            rules.define("item", literal("x"));
            Ok(list)
        })
        .unwrap()
    }

    #[test]
    fn forward_and_mutual_references_resolve() {
        let grammar = nested_lists();
        assert_eq!(grammar.rule_names().collect::<Vec<_>>(), ["item", "list"]);

        assert_eq!(grammar.parse_first("x"), Some(Value::from("x")));
        assert_eq!(
            grammar.parse_first("x,x"),
            Some(Value::pair("x", "x"))
        );
        assert_eq!(
            grammar.parse_first("[x,[x]],x"),
            Some(Value::pair(Value::pair("x", "x"), "x"))
        );
        assert_eq!(grammar.parse_first("[x,]"), None);
        assert_eq!(grammar.parse_first(""), None);
    }

    #[test]
    fn partial_parses_are_all_reported() {
        let grammar = nested_lists();
        let results: Vec<_> = grammar.parse("x,x").collect();
        dbg!(&results);
        assert_eq!(
            results,
            [
                (Value::pair("x", "x"), ""),
                (Value::from("x"), ",x"),
            ]
        );
        assert_eq!(grammar.parse_full("x,x").count(), 1);
    }

    #[test]
    fn redefinition_adds_alternatives_in_order() {
        let mut rules = Rules::new();
        rules.define("r", literal("a"));
        assert!(matches!(rules.get("r").map(Expr::node), Some(Node::Literal(_))));

        rules.define("r", literal("ab"));
        rules.define("r", literal("abc"));
        match rules.get("r").map(Expr::node) {
            Some(Node::Union(alts)) => assert_eq!(alts.len(), 3),
            _ => panic!("expected a flat union of three alternatives"),
        }

        let grammar = Grammar::build(|rules| {
            rules.define("r", literal("a"));
            rules.define("r", literal("ab"));
            rules.define("r", literal("a"));
            Ok(rules.rule("r"))
        })
        .unwrap();
        assert_eq!(
            grammar.parse("ab").collect::<Vec<_>>(),
            [
                (Value::from("a"), "b"),
                (Value::from("ab"), ""),
                (Value::from("a"), "b"),
            ]
        );
    }

    #[test]
    fn redefinition_is_a_union_not_a_cut() {
        let grammar = Grammar::build(|rules| {
            rules.define("r", first([literal("a")]));
            rules.define("r", seq(literal("a"), literal("b")));
            Ok(full(rules.rule("r")))
        })
        .unwrap();
        assert_eq!(
            grammar.parse_first("ab"),
            Some(Value::pair("a", "b"))
        );
    }

    #[test]
    fn references_see_later_definitions() {
        let grammar = Grammar::build(|rules| {
            let digits = many(rules.rule("digit"));
            rules.define("digit", one_of('0'..='4'));
            rules.define("digit", one_of('5'..='9'));
            Ok(digits)
        })
        .unwrap();
        assert_eq!(
            grammar.parse_first("1979"),
            Some(Value::list(['1', '9', '7', '9']))
        );
    }

    #[test]
    fn self_recursion_through_the_right() {
        // nest ::= '(' nest ')' | ''
        let grammar = Grammar::build(|rules| {
            let nest = rules.rule("nest");
            rules.define(
                "nest",
                map_depth(seq(literal("("), left(nest.clone(), literal(")")))),
            );
            rules.define("nest", crate::expr::map(literal(""), |_| Value::Int(0)));
            Ok(nest)
        })
        .unwrap();

        assert_eq!(grammar.parse_first("((()))"), Some(Value::Int(3)));
        assert_eq!(grammar.parse_first("(()"), None);

        fn map_depth(expr: Expr) -> Expr {
            crate::expr::map(expr, |value| match snd(value) {
                Value::Int(depth) => Value::Int(depth + 1),
                other => other,
            })
        }
    }

    #[test]
    fn undefined_rules_are_rejected_when_freezing() {
        let err = Grammar::build(|rules| {
            rules.define("a", seq(literal("a"), rules.rule("b")));
            Ok(rules.rule("a"))
        })
        .unwrap_err();
        assert!(matches!(err, GrammarError::UnresolvedRule { name } if name == "b"));

        let err = Grammar::build(|rules| Ok(rules.rule("start"))).unwrap_err();
        assert!(matches!(err, GrammarError::UnresolvedRule { name } if name == "start"));

        // unreachable rules are checked too
        let err = Grammar::build(|rules| {
            rules.define("unused", rules.rule("missing"));
            Ok(literal("x"))
        })
        .unwrap_err();
        assert!(matches!(err, GrammarError::UnresolvedRule { name } if name == "missing"));
    }

    #[test]
    fn assembly_errors_propagate() {
        let err = Grammar::build(|_| crate::expr::regex("(")).unwrap_err();
        assert!(matches!(err, GrammarError::InvalidRegex { .. }));
    }

    #[test]
    fn parsing_from_another_rule() {
        let grammar = nested_lists();
        let items: Vec<_> = grammar.parse_rule("item", "[x]").unwrap().collect();
        assert_eq!(items, [(Value::from("x"), "")]);

        assert!(matches!(
            grammar.parse_rule("value", "x"),
            Err(GrammarError::UnknownRule { name }) if name == "value"
        ));
    }

    #[test]
    fn grammars_are_reusable_and_shareable() {
        let grammar = nested_lists();
        let clone = grammar.clone();
        assert!(grammar.start().ptr_eq(clone.start()));

        let handle = std::thread::spawn(move || clone.parse_first("x,x").map(Value::into_owned));
        assert_eq!(handle.join().unwrap(), grammar.parse_first("x,x"));
        assert_eq!(grammar.parse_first("x,x"), grammar.parse_first("x,x"));
    }
}
