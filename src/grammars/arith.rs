//! Integer arithmetic.
//!
//! # Grammar
//! ```raw
//! expr ::= term '+' expr
//!        | term '-' expr
//!        | term
//!
//! term ::= atom '*' term
//!        | atom '/' term
//!        | atom
//!
//! atom ::= [0-9]+
//!        | '(' expr ')'
//! ```
//!
//! Whitespace is allowed before the expression and after every token. Each rule is assembled
//! one alternative at a time, and `atom` refers back to `expr` before `atom` itself is
//! defined.
//!
//! Since the grammar is right-recursive, binary operators associate to the right: `8 - 2 - 1`
//! is `8 - (2 - 1)`.
//!
//! # Values
//! Parses are reshaped into s-expression lists `[op lhs rhs]`, with numbers left as their
//! digit strings; for example `1 + 2 * 3` becomes `["+" "1" ["*" "2" "3"]]`.

use anyhow::{bail, ensure, Context};
use once_cell::sync::OnceCell;

use crate::{
    error::GrammarError,
    expr::{left, map, regex, right, seq, Expr},
    lexical::{whitespace, word},
    rules::Grammar,
    value::Value,
};

/// Returns the (lazily built) arithmetic grammar.
pub fn grammar() -> Result<&'static Grammar, GrammarError> {
    static GRAMMAR: OnceCell<Grammar> = OnceCell::new();
    GRAMMAR.get_or_try_init(build)
}

/// Assembles the arithmetic grammar.
fn build() -> Result<Grammar, GrammarError> {
    Grammar::build(|rules| {
        let expr = rules.rule("expr");
        let term = rules.rule("term");
        let atom = rules.rule("atom");

        rules.define("expr", binary(term.clone(), "+", expr.clone()));
        rules.define("expr", binary(term.clone(), "-", expr.clone()));
        rules.define("expr", term.clone());

        rules.define("term", binary(atom.clone(), "*", term.clone()));
        rules.define("term", binary(atom.clone(), "/", term));
        rules.define("term", atom);

        rules.define("atom", left(regex("[0-9]+")?, whitespace()));
        rules.define("atom", right(word("("), left(expr.clone(), word(")"))));

        Ok(right(whitespace(), expr))
    })
}

/// Matches `lhs op rhs`, producing `[op lhs rhs]`.
fn binary(lhs: Expr, op: &str, rhs: Expr) -> Expr {
    map(seq(lhs, seq(word(op), rhs)), prefix_form)
}

/// Reshapes `(lhs . (op . rhs))` into `[op lhs rhs]`.
fn prefix_form(value: Value<'_>) -> Value<'_> {
    match value {
        Value::Pair(lhs, tail) => match *tail {
            Value::Pair(op, rhs) => Value::List(vec![*op, *lhs, *rhs]),
            tail => Value::pair(*lhs, tail),
        },
        other => other,
    }
}

/// Parses `src` into its expression tree.
pub fn parse(src: &str) -> anyhow::Result<Value<'_>> {
    grammar()?
        .parse_first(src)
        .with_context(|| format!("{src:?} is not an arithmetic expression"))
}

/// Parses and evaluates `src`.
pub fn evaluate(src: &str) -> anyhow::Result<i64> {
    fold(&parse(src)?)
}

/// Evaluates an expression tree produced by [`parse`].
fn fold(tree: &Value<'_>) -> anyhow::Result<i64> {
    match tree {
        Value::Str(digits) => digits
            .parse::<i64>()
            .with_context(|| format!("integer literal {digits} is out of range")),
        Value::List(items) => match items.as_slice() {
            [Value::Str(op), lhs, rhs] => {
                let (lhs, rhs) = (fold(lhs)?, fold(rhs)?);
                let result = match &**op {
                    "+" => lhs.checked_add(rhs),
                    "-" => lhs.checked_sub(rhs),
                    "*" => lhs.checked_mul(rhs),
                    "/" => {
                        ensure!(rhs != 0, "division by zero in {lhs} / {rhs}");
                        lhs.checked_div(rhs)
                    }
                    other => bail!("unknown operator {other:?}"),
                };
                result.with_context(|| format!("overflow in {lhs} {op} {rhs}"))
            }
            _ => bail!("malformed expression tree {tree}"),
        },
        _ => bail!("malformed expression tree {tree}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trees_are_prefix_lists() {
        assert_eq!(parse("42").unwrap(), Value::from("42"));
        assert_eq!(
            parse("1 + 2 * 3").unwrap(),
            Value::list([
                Value::from("+"),
                Value::from("1"),
                Value::list(["*", "2", "3"]),
            ])
        );
        assert_eq!(
            parse(" ( 1 + 2 ) * 3 ").unwrap().to_string(),
            r#"["*" ["+" "1" "2"] "3"]"#
        );
    }

    #[test]
    fn evaluates_with_precedence() {
        assert_eq!(evaluate("1 + 2 * 3").unwrap(), 7);
        assert_eq!(evaluate("(1 + 2) * 3").unwrap(), 9);
        assert_eq!(evaluate("((((5))))").unwrap(), 5);
        assert_eq!(evaluate("2*3+4*5").unwrap(), 26);
    }

    #[test]
    fn operators_associate_right() {
        assert_eq!(evaluate("8 - 2 - 1").unwrap(), 7);
        assert_eq!(evaluate("(8 - 2) - 1").unwrap(), 5);
        assert_eq!(evaluate("64 / 8 / 2").unwrap(), 16);
    }

    #[test]
    fn full_parses_are_unambiguous() {
        let grammar = grammar().unwrap();
        let trees: Vec<_> = grammar.parse_full("1 - 2 + 3 * 4").collect();
        dbg!(&trees);
        assert_eq!(trees.len(), 1);
    }

    #[test]
    fn rejects_malformed_input() {
        for src in ["", "1 +", "(1", "1)", "+ 1", "1 2", "a"] {
            let err = evaluate(src).unwrap_err();
            assert!(
                err.to_string().contains("is not an arithmetic expression"),
                "{src:?}: {err}"
            );
        }
    }

    #[test]
    fn reports_arithmetic_errors() {
        let err = evaluate("1 / (2 - 2)").unwrap_err();
        assert!(err.to_string().contains("division by zero"), "{err}");

        let err = evaluate("9223372036854775807 + 1").unwrap_err();
        assert!(err.to_string().contains("overflow"), "{err}");

        let err = evaluate("99999999999999999999").unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
    }
}
