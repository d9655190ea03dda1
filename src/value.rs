//! Semantic values produced by parsers.
//!
//! There is no fixed result type: the shape of a [`Value`] is decided entirely by the
//! combinators that produced it. Atomic matchers produce [`Value::Str`] or [`Value::Char`],
//! sequencing produces [`Value::Pair`], and repetition produces [`Value::List`]. Anything else
//! comes out of a user-supplied transform (see [`map`](crate::expr::map)).
//!
//! # Transform helpers
//! The free functions [`fst`], [`snd`] and [`cons_list`] are the transforms most grammars
//! need to flatten pair-shaped sequence results. They are free functions rather than methods
//! so that they can be passed directly to [`map`](crate::expr::map).

use std::{borrow::Cow, fmt::Display};

/// A semantic value borrowing from the input string `'src` where it can.
///
/// The [`Display`] implementation on this type produces a lisp-style rendering, where pairs are
/// written as dotted pairs and lists in square brackets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value<'src> {
    /// A string, usually a slice of the input matched by a literal or a regex.
    Str(Cow<'src, str>),
    /// A single character matched by a character class.
    Char(char),
    /// An integer, only ever produced by transforms.
    Int(i64),
    /// The results of the two halves of a sequence, in order.
    Pair(Box<Self>, Box<Self>),
    /// The results of a repetition or an optional, in input order.
    List(Vec<Self>),
}

impl<'src> Value<'src> {
    /// Constructs a [`Value::Pair`].
    pub fn pair(left: impl Into<Self>, right: impl Into<Self>) -> Self {
        Self::Pair(Box::new(left.into()), Box::new(right.into()))
    }

    /// Constructs a [`Value::List`] from anything yielding values.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Returns the contained string, if this is a [`Value::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained character, if this is a [`Value::Char`].
    pub fn as_char(&self) -> Option<char> {
        match self {
            Self::Char(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the contained integer, if this is a [`Value::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the contained items, if this is a [`Value::List`].
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Consumes `self` and returns both halves, if this is a [`Value::Pair`].
    pub fn into_pair(self) -> Option<(Self, Self)> {
        match self {
            Self::Pair(left, right) => Some((*left, *right)),
            _ => None,
        }
    }

    /// Consumes `self` and returns the items, if this is a [`Value::List`].
    pub fn into_list(self) -> Option<Vec<Self>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Detaches `self` from the input it was parsed from.
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Self::Str(s) => Value::Str(Cow::Owned(s.into_owned())),
            Self::Char(c) => Value::Char(c),
            Self::Int(n) => Value::Int(n),
            Self::Pair(left, right) => Value::pair(left.into_owned(), right.into_owned()),
            Self::List(items) => Value::List(items.into_iter().map(Value::into_owned).collect()),
        }
    }
}

impl<'src> From<&'src str> for Value<'src> {
    fn from(value: &'src str) -> Self {
        Self::Str(Cow::Borrowed(value))
    }
}

impl From<String> for Value<'_> {
    fn from(value: String) -> Self {
        Self::Str(Cow::Owned(value))
    }
}

impl From<char> for Value<'_> {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<i64> for Value<'_> {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl<'src> From<Vec<Value<'src>>> for Value<'src> {
    fn from(value: Vec<Value<'src>>) -> Self {
        Self::List(value)
    }
}

impl Display for Value<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Char(c) => write!(f, "{c:?}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Pair(left, right) => write!(f, "({left} . {right})"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Projects the left half of a pair. Any other value is returned unchanged.
pub fn fst(value: Value<'_>) -> Value<'_> {
    match value {
        Value::Pair(left, _) => *left,
        other => other,
    }
}

/// Projects the right half of a pair. Any other value is returned unchanged.
pub fn snd(value: Value<'_>) -> Value<'_> {
    match value {
        Value::Pair(_, right) => *right,
        other => other,
    }
}

/// Turns `(x . [ys..])` into `[x ys..]`.
///
/// If the right half is not a list, the result is the two-element list `[x y]`. Any value
/// which is not a pair is wrapped in a single-element list.
pub fn cons_list(value: Value<'_>) -> Value<'_> {
    match value {
        Value::Pair(head, tail) => match *tail {
            Value::List(mut items) => {
                items.insert(0, *head);
                Value::List(items)
            }
            tail => Value::List(vec![*head, tail]),
        },
        other => Value::List(vec![other]),
    }
}
