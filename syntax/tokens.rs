//! A slice of lexical tokens usable as [nom](https://crates.io/crates/nom)
//! input. See nom's notes on
//! [custom input types](https://github.com/rust-bakery/nom/blob/main/doc/custom_input_types.md).

use std::iter::Enumerate;
use std::ops::{Range, RangeFrom, RangeFull, RangeTo};
use std::slice::Iter;

use nom::{InputIter, InputLength, InputTake, Needed, Slice, UnspecializedInput};

/// The tokens not yet consumed, and where they start in the whole stream.
#[derive(Debug)]
pub struct Tokens<'a, T> {
    tokens: &'a [T],
    offset: usize,
}

impl<'a, T> Tokens<'a, T> {
    pub fn new(tokens: &'a [T]) -> Self {
        Self { tokens, offset: 0 }
    }

    pub fn as_slice(&self) -> &'a [T] {
        self.tokens
    }

    /// The next token, if any.
    pub fn first(&self) -> Option<&'a T> {
        self.tokens.first()
    }

    /// Index of the next token in the stream this one was cut from.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    fn cut(&self, range: Range<usize>) -> Self {
        Self {
            offset: self.offset + range.start,
            tokens: &self.tokens[range],
        }
    }
}

impl<'a, T> Clone for Tokens<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Tokens<'a, T> {}

/// Equal if the remaining tokens are, wherever they came from.
impl<'a, T: PartialEq> PartialEq for Tokens<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        self.tokens == other.tokens
    }
}

impl<'a, T> InputLength for Tokens<'a, T> {
    fn input_len(&self) -> usize {
        self.len()
    }
}

impl<'a, T> InputTake for Tokens<'a, T> {
    fn take(&self, count: usize) -> Self {
        self.cut(0..count)
    }

    /// nom wants `(suffix, prefix)`.
    fn take_split(&self, count: usize) -> (Self, Self) {
        (self.cut(count..self.len()), self.cut(0..count))
    }
}

impl<'a, T> Slice<Range<usize>> for Tokens<'a, T> {
    fn slice(&self, range: Range<usize>) -> Self {
        self.cut(range)
    }
}

impl<'a, T> Slice<RangeTo<usize>> for Tokens<'a, T> {
    fn slice(&self, range: RangeTo<usize>) -> Self {
        self.cut(0..range.end)
    }
}

impl<'a, T> Slice<RangeFrom<usize>> for Tokens<'a, T> {
    fn slice(&self, range: RangeFrom<usize>) -> Self {
        self.cut(range.start..self.len())
    }
}

impl<'a, T> Slice<RangeFull> for Tokens<'a, T> {
    fn slice(&self, _: RangeFull) -> Self {
        *self
    }
}

impl<'a, T> InputIter for Tokens<'a, T> {
    type Item = &'a T;
    type Iter = Enumerate<Iter<'a, T>>;
    type IterElem = Iter<'a, T>;

    fn iter_indices(&self) -> Self::Iter {
        self.tokens.iter().enumerate()
    }

    fn iter_elements(&self) -> Self::IterElem {
        self.tokens.iter()
    }

    fn position<P>(&self, predicate: P) -> Option<usize>
    where
        P: Fn(Self::Item) -> bool,
    {
        self.tokens.iter().position(predicate)
    }

    fn slice_index(&self, count: usize) -> Result<usize, Needed> {
        match count.checked_sub(self.len()) {
            Some(missing) if missing > 0 => Err(Needed::new(missing)),
            _ => Ok(count),
        }
    }
}

impl<'a, T> UnspecializedInput for Tokens<'a, T> {}
