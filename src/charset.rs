//! Character sets for the single-character matchers.
//!
//! A [`CharSet`] is an explicit set of characters. It can be built directly from any sequence
//! of characters (every character is taken literally), or parsed from a compact _class
//! notation_ with [`str::parse`].
//!
//! # Class notation
//! ```raw
//! class  ::= item*
//! item   ::= single '-' single     (inclusive range, bounds in order)
//!          | single
//! single ::= '\' ANY               (escaped character)
//!          | ANY except '\'
//! ```
//!
//! A `-` that cannot be the middle of a range (e.g. at either end of the class) is taken
//! literally, so `"+-"` is the set `{'+', '-'}`.

use std::{collections::BTreeSet, ops::RangeInclusive, str::FromStr};

use nom::{
    branch::alt,
    character::complete::{anychar, char, none_of},
    combinator::{all_consuming, cut, map},
    error::{context, convert_error, ContextError, ErrorKind, ParseError, VerboseError},
    multi::many0,
    sequence::{preceded, separated_pair},
    Finish, IResult, Parser,
};
use thiserror::Error;

/// The error type thrown when parsing a [`CharSet`] from class notation.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("invalid character class {class:?}\nerror trace:\n{trace}")]
pub struct CharSetError {
    /// The class notation that failed to parse.
    pub class: String,
    /// A human-readable trace produced by [`convert_error`].
    pub trace: String,
}

/// A set of characters, used by [`one_of`](crate::expr::one_of) and
/// [`none_of`](crate::expr::none_of).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharSet(BTreeSet<char>);

impl CharSet {
    /// Returns `true` if `c` is a member of this set.
    #[inline(always)]
    pub fn contains(&self, c: char) -> bool {
        self.0.contains(&c)
    }

    /// Returns the number of characters in this set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if this set contains no characters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the members of this set in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<char> for CharSet {
    fn from_iter<I: IntoIterator<Item = char>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Takes every character of the string literally; use [`str::parse`] for class notation.
impl From<&str> for CharSet {
    fn from(value: &str) -> Self {
        value.chars().collect()
    }
}

impl From<RangeInclusive<char>> for CharSet {
    fn from(value: RangeInclusive<char>) -> Self {
        value.collect()
    }
}

impl<const N: usize> From<[char; N]> for CharSet {
    fn from(value: [char; N]) -> Self {
        value.into_iter().collect()
    }
}

impl FromStr for CharSet {
    type Err = CharSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all_consuming(many0(item))
            .parse(s)
            .finish()
            .map(|(_, ranges)| Self(ranges.into_iter().flatten().collect()))
            .map_err(|err: VerboseError<&str>| CharSetError {
                class: s.to_string(),
                trace: convert_error(s, err),
            })
    }
}

/// The return type of the class notation parsers.
type ClassResult<'src, O> = IResult<&'src str, O, VerboseError<&'src str>>;

/// Parses a range or a single character, in both cases producing an inclusive range.
fn item(input: &str) -> ClassResult<'_, RangeInclusive<char>> {
    alt((range, map(single, |c| c..=c))).parse(input)
}

/// Parses an inclusive range `lo-hi`, failing irrecoverably if `lo > hi`.
fn range(input: &str) -> ClassResult<'_, RangeInclusive<char>> {
    let (tail, (lo, hi)) = separated_pair(single, char('-'), single).parse(input)?;
    if lo > hi {
        let err = VerboseError::from_error_kind(input, ErrorKind::Verify);
        return Err(nom::Err::Failure(VerboseError::add_context(
            input,
            "range bounds out of order",
            err,
        )));
    }
    Ok((tail, lo..=hi))
}

/// Parses a single, possibly escaped, character.
fn single(input: &str) -> ClassResult<'_, char> {
    alt((
        preceded(
            char('\\'),
            cut(context("expected a character after `\\`", anychar)),
        ),
        none_of("\\"),
    ))
    .parse(input)
}
