//! Errors raised while a grammar is being assembled.
//!
//! Failing to parse some input is *not* an error in this crate: a parser that cannot match
//! simply produces no results. The [`GrammarError`] type is reserved for malformed grammars,
//! i.e. mistakes made by whoever wrote the grammar rather than whoever wrote the input.

use thiserror::Error;

use crate::charset::CharSetError;

/// The error type produced when constructing or freezing a grammar.
#[derive(Debug, Error)]
pub enum GrammarError {
    /// A pattern passed to [`regex`](crate::expr::regex) failed to compile.
    #[error("invalid regular expression {pattern:?}")]
    InvalidRegex {
        /// The pattern as it was given.
        pattern: String,
        /// The underlying compilation error.
        #[source]
        source: regex_automata::meta::BuildError,
    },

    /// A character class passed to [`class`](crate::expr::class) or
    /// [`not_class`](crate::expr::not_class) was malformed.
    #[error(transparent)]
    InvalidCharSet(#[from] CharSetError),

    /// A rule reference names a rule which was never defined.
    #[error("reference to undefined rule `{name}`")]
    UnresolvedRule {
        /// The name of the missing rule.
        name: String,
    },

    /// A parse was requested from a start rule which is not defined in the grammar.
    #[error("no rule named `{name}` in this grammar")]
    UnknownRule {
        /// The requested start rule.
        name: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_rule() {
        let err = GrammarError::UnresolvedRule {
            name: "expr".into(),
        };
        assert_eq!(err.to_string(), "reference to undefined rule `expr`");

        let err = GrammarError::UnknownRule {
            name: "stmt".into(),
        };
        assert_eq!(err.to_string(), "no rule named `stmt` in this grammar");
    }

    #[test]
    fn regex_errors_keep_their_source() {
        use std::error::Error as _;

        let source = regex_automata::meta::Regex::new("(").unwrap_err();
        let err = GrammarError::InvalidRegex {
            pattern: "(".into(),
            source,
        };
        assert!(err.source().is_some());
        assert!(err.to_string().contains("\"(\""));
    }
}
