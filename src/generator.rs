//! Lazily transformed sequences.

use std::fmt::{self, Debug};
use std::iter::{FusedIterator};

/// Pairs a function with a sequence of arguments for it.
///
/// A `Generator` stores no results. Each time an element is requested, the
/// function is applied to the corresponding element of the source. Unlike
/// [`Iterator::map()`], a `Generator` can be iterated many times, and its
/// iterators can read their current element without advancing.
///
/// ```
/// use ndkit::{Generator, Range};
/// let squares = Generator::new(|x: i32| x * x, Range::new(0, 5));
/// assert_eq!(squares.iter().collect::<Vec<_>>(), [0, 1, 4, 9, 16]);
/// assert_eq!(squares.iter().rev().collect::<Vec<_>>(), [16, 9, 4, 1, 0]);
/// ```
#[derive(Clone)]
pub struct Generator<S, F> {
    func: F,
    source: S,
}

impl<S, F> Generator<S, F> {
    /// Does not call `func`.
    pub fn new(func: F, source: S) -> Self { Self {func, source} }

    pub fn source(&self) -> &S { &self.source }

    pub fn into_inner(self) -> (F, S) { (self.func, self.source) }
}

impl<S: IntoIterator> Generator<S, fn(S::Item) -> S::Item> {
    /// A `Generator` whose elements are those of `source`.
    pub fn identity(source: S) -> Self { Self::new(|x| x, source) }
}

impl<S: IntoIterator + Clone, F> Generator<S, F> {
    /// Returns an iterator over a copy of the source.
    pub fn iter(&self) -> GeneratorIter<S::IntoIter, &F> {
        GeneratorIter::new(&self.func, self.source.clone().into_iter())
    }

    /// The number of elements. Does not call the function.
    pub fn len(&self) -> usize where S::IntoIter: ExactSizeIterator {
        self.source.clone().into_iter().len()
    }

    pub fn is_empty(&self) -> bool where S::IntoIter: ExactSizeIterator {
        self.len() == 0
    }
}

impl<S: Debug, F> Debug for Generator<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator").field("source", &self.source).finish_non_exhaustive()
    }
}

impl<U, S: IntoIterator, F: Fn(S::Item) -> U> IntoIterator for Generator<S, F> {
    type Item = U;
    type IntoIter = GeneratorIter<S::IntoIter, F>;
    fn into_iter(self) -> Self::IntoIter { GeneratorIter::new(self.func, self.source.into_iter()) }
}

impl<'a, U, S: IntoIterator + Clone, F: Fn(S::Item) -> U> IntoIterator for &'a Generator<S, F> {
    type Item = U;
    type IntoIter = GeneratorIter<S::IntoIter, &'a F>;
    fn into_iter(self) -> Self::IntoIter { self.iter() }
}

// ----------------------------------------------------------------------------

/// An iterator that applies a function to the elements of another iterator.
///
/// The function is called once for each element read, either by the
/// `Iterator` methods or by [`current()`]. Nothing is cached.
///
/// Two `GeneratorIter`s compare equal if their positions do. The functions
/// are not compared.
///
/// [`current()`]: Self::current()
#[derive(Clone)]
pub struct GeneratorIter<I, F> {
    func: F,
    pos: I,
}

impl<I: Iterator, F> GeneratorIter<I, F> {
    pub fn new(func: F, pos: I) -> Self { Self {func, pos} }

    /// The underlying iterator.
    pub fn position(&self) -> &I { &self.pos }

    /// Applies the function to the next element without consuming it.
    ///
    /// ```
    /// use std::cell::{Cell};
    /// use ndkit::{Generator, Range};
    /// let calls = Cell::new(0);
    /// let g = Generator::new(|x: u8| { calls.set(calls.get() + 1); x + 10 }, Range::new(0, 3));
    /// let it = g.iter();
    /// assert_eq!(it.current(), Some(10));
    /// assert_eq!(it.current(), Some(10));
    /// assert_eq!(calls.get(), 2);
    /// ```
    pub fn current<U>(&self) -> Option<U> where I: Clone, F: Fn(I::Item) -> U {
        self.pos.clone().next().map(&self.func)
    }

    /// Skips `n` elements without calling the function.
    pub fn advance(&mut self, n: usize) {
        if n > 0 { self.pos.nth(n - 1); }
    }
}

impl<I: PartialEq, F> PartialEq for GeneratorIter<I, F> {
    fn eq(&self, other: &Self) -> bool { self.pos == other.pos }
}

impl<I: Debug, F> Debug for GeneratorIter<I, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorIter").field("pos", &self.pos).finish_non_exhaustive()
    }
}

impl<U, I: Iterator, F: Fn(I::Item) -> U> Iterator for GeneratorIter<I, F> {
    type Item = U;

    fn next(&mut self) -> Option<U> { self.pos.next().map(&self.func) }

    fn size_hint(&self) -> (usize, Option<usize>) { self.pos.size_hint() }

    fn nth(&mut self, n: usize) -> Option<U> { self.pos.nth(n).map(&self.func) }
}

impl<U, I: DoubleEndedIterator, F: Fn(I::Item) -> U> DoubleEndedIterator for GeneratorIter<I, F> {
    fn next_back(&mut self) -> Option<U> { self.pos.next_back().map(&self.func) }
}

impl<U, I: ExactSizeIterator, F: Fn(I::Item) -> U> ExactSizeIterator for GeneratorIter<I, F> {}

impl<U, I: FusedIterator, F: Fn(I::Item) -> U> FusedIterator for GeneratorIter<I, F> {}

// ----------------------------------------------------------------------------
