//! Lazy arithmetic progressions of integers.

use std::iter::{FusedIterator};

use num_traits::{NumCast, PrimInt};

/// The magnitude of `x`.
fn magnitude<T: PrimInt>(x: T) -> u128 {
    x.to_i128().map(i128::unsigned_abs).or_else(|| x.to_u128()).unwrap_or(0)
}

/// `hi - lo`, where `lo <= hi`.
fn span<T: PrimInt>(lo: T, hi: T) -> u128 {
    match (lo.to_i128(), hi.to_i128()) {
        (Some(lo), Some(hi)) => hi.wrapping_sub(lo) as u128,
        _ => match (lo.to_u128(), hi.to_u128()) {
            (Some(lo), Some(hi)) => hi - lo,
            // `lo` is negative and `hi` exceeds `i128::MAX`; no `T` has both.
            _ => 0,
        },
    }
}

/// `x + by` if `up`, otherwise `x - by`. The result must be a `T`.
fn offset<T: PrimInt>(x: T, by: u128, up: bool) -> Option<T> {
    // Wrapping arithmetic is exact whenever the result fits in an `i128`.
    let signed = || {
        let x = x.to_i128()? as u128;
        <T as NumCast>::from((if up { x.wrapping_add(by) } else { x.wrapping_sub(by) }) as i128)
    };
    let unsigned = || {
        let x = x.to_u128()?;
        <T as NumCast>::from(if up { x.checked_add(by)? } else { x.checked_sub(by)? })
    };
    signed().or_else(unsigned)
}

// ----------------------------------------------------------------------------

/// An arithmetic progression of integers: `start`, `start + step`, ...,
/// stopping before `stop`.
///
/// A `Range` is computed on demand and stores only its first and last
/// elements, its step and its length.
///
/// If `step` points away from `stop`, or `start == stop`, the `Range` is
/// empty. This is not an error.
///
/// ```
/// use ndkit::{Range};
/// assert_eq!(Range::new(0, 5).iter().collect::<Vec<i32>>(), [0, 1, 2, 3, 4]);
/// assert_eq!(Range::with_step(5, 0, -1).iter().collect::<Vec<i32>>(), [5, 4, 3, 2, 1]);
/// assert_eq!(Range::with_step(0, 10, 3).iter().collect::<Vec<i32>>(), [0, 3, 6, 9]);
/// assert!(Range::with_step(0, 10, -1).is_empty());
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Range<T> {
    first: T,
    last: T,
    step: T,
    ascending: bool,
    len: usize,
}

impl<T: PrimInt> Range<T> {
    /// The integers from `start` up to, or down to, `stop`, excluding `stop`.
    ///
    /// The step is 1 if `start <= stop` and -1 otherwise. This also works
    /// for unsigned types.
    ///
    /// # Panics
    ///
    /// Panics if there are more than `usize::MAX` elements.
    pub fn new(start: T, stop: T) -> Self {
        Self::build(start, stop, T::one(), start <= stop)
    }

    /// The integers `start + k * step` for `k = 0, 1, ...` that are strictly
    /// before `stop`.
    ///
    /// # Panics
    ///
    /// Panics if `step` is zero, or if there are more than `usize::MAX`
    /// elements.
    pub fn with_step(start: T, stop: T, step: T) -> Self {
        assert!(step != T::zero(), "Range step must be non-zero");
        Self::build(start, stop, step, step > T::zero())
    }

    fn build(start: T, stop: T, step: T, ascending: bool) -> Self {
        let empty = Range {first: start, last: start, step, ascending, len: 0};
        let (lo, hi) = if ascending { (start, stop) } else { (stop, start) };
        if lo >= hi { return empty; }
        let stride = magnitude(step);
        let count = (span(lo, hi) - 1) / stride + 1;
        let len = usize::try_from(count).unwrap_or_else(|_| {
            panic!("Range is too long: {} elements do not fit in a usize", count)
        });
        // The last element lies between `start` and `stop`, so it is a `T`.
        let Some(last) = offset(start, (count - 1) * stride, ascending) else {
            unreachable!("Range element out of bounds");
        };
        Range {first: start, last, step, ascending, len}
    }

    /// The number of elements.
    #[inline(always)]
    pub fn len(&self) -> usize { self.len }

    #[inline(always)]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    pub fn first(&self) -> Option<T> { (self.len > 0).then_some(self.first) }

    pub fn last(&self) -> Option<T> { (self.len > 0).then_some(self.last) }

    /// The step, as passed to the constructor.
    #[inline(always)]
    pub fn step(&self) -> T { self.step }

    /// Returns `true` if the elements increase.
    #[inline(always)]
    pub fn is_ascending(&self) -> bool { self.ascending }

    /// The same elements in the opposite order.
    ///
    /// ```
    /// use ndkit::{Range};
    /// let r = Range::new(0u8, 5).reverse();
    /// assert_eq!(r.iter().collect::<Vec<_>>(), [4, 3, 2, 1, 0]);
    /// assert_eq!(r.reverse(), Range::new(0, 5));
    /// ```
    pub fn reverse(&self) -> Self {
        Range {first: self.last, last: self.first, ascending: !self.ascending, ..*self}
    }

    pub fn iter(&self) -> RangeIter<T> {
        RangeIter {
            front: self.first,
            back: self.last,
            step: self.step,
            ascending: self.ascending,
            remaining: self.len,
        }
    }
}

impl<T: PrimInt> IntoIterator for Range<T> {
    type Item = T;
    type IntoIter = RangeIter<T>;
    fn into_iter(self) -> RangeIter<T> { self.iter() }
}

impl<'a, T: PrimInt> IntoIterator for &'a Range<T> {
    type Item = T;
    type IntoIter = RangeIter<T>;
    fn into_iter(self) -> RangeIter<T> { self.iter() }
}

// ----------------------------------------------------------------------------

/// The return type of [`Range::iter()`].
///
/// Two `RangeIter`s compare equal if they have the same elements left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeIter<T> {
    front: T,
    back: T,
    step: T,
    ascending: bool,
    remaining: usize,
}

impl<T: PrimInt> RangeIter<T> {
    /// Moves `x` one step towards the back (`forwards`) or the front.
    ///
    /// Only called when the result is an element, so it cannot overflow.
    #[inline(always)]
    fn advance(&self, x: T, forwards: bool) -> T {
        if (self.step > T::zero()) == (self.ascending == forwards) {
            x + self.step
        } else {
            x - self.step
        }
    }
}

impl<T: PrimInt> Iterator for RangeIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.remaining == 0 { return None; }
        let x = self.front;
        self.remaining -= 1;
        if self.remaining > 0 { self.front = self.advance(x, true); }
        Some(x)
    }

    fn size_hint(&self) -> (usize, Option<usize>) { (self.remaining, Some(self.remaining)) }

    fn nth(&mut self, n: usize) -> Option<T> {
        if n >= self.remaining {
            self.remaining = 0;
            return None;
        }
        let by = magnitude(self.step) * n as u128;
        match offset(self.front, by, self.ascending) {
            Some(x) => {
                self.front = x;
                self.remaining -= n;
                self.next()
            },
            None => {
                self.remaining = 0;
                None
            },
        }
    }
}

impl<T: PrimInt> DoubleEndedIterator for RangeIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.remaining == 0 { return None; }
        let x = self.back;
        self.remaining -= 1;
        if self.remaining > 0 { self.back = self.advance(x, false); }
        Some(x)
    }
}

impl<T: PrimInt> ExactSizeIterator for RangeIter<T> {}

impl<T: PrimInt> FusedIterator for RangeIter<T> {}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn elements<T: PrimInt>(r: Range<T>) -> Vec<T> { r.iter().collect() }

    #[test]
    fn enumeration() {
        assert_eq!(elements(Range::with_step(0, 5, 1)), [0, 1, 2, 3, 4]);
        assert_eq!(Range::with_step(0, 5, 1).len(), 5);
        assert_eq!(elements(Range::with_step(5, 0, -1)), [5, 4, 3, 2, 1]);
        assert_eq!(Range::with_step(5, 0, -1).len(), 5);
        assert_eq!(elements(Range::with_step(2, 2, 1)), Vec::<i32>::new());
        assert_eq!(Range::with_step(2, 2, 1).len(), 0);
        assert_eq!(elements(Range::with_step(0, 5, 1).reverse()), [4, 3, 2, 1, 0]);
    }

    #[test]
    fn degenerate_and_disagreeing_steps() {
        for step in [-3, -1, 1, 2, 7] {
            assert!(Range::with_step(4, 4, step).is_empty());
        }
        assert!(Range::with_step(0, 5, -1).is_empty());
        assert!(Range::with_step(5, 0, 1).is_empty());
        assert!(Range::new(3u32, 3).is_empty());
    }

    #[test]
    fn counts() {
        assert_eq!(Range::with_step(0, 10, 3).len(), 4);
        assert_eq!(Range::with_step(0, 9, 3).len(), 3);
        assert_eq!(Range::with_step(10, -10, -7).len(), 3);
        assert_eq!(elements(Range::with_step(10, -10, -7)), [10, 3, -4]);
        assert_eq!(Range::new(i8::MIN, i8::MAX).len(), 255);
        assert_eq!(Range::new(u32::MAX, 0).len(), u32::MAX as usize);
        assert_eq!(Range::with_step(127i8, -128, -128).iter().collect::<Vec<_>>(), [127, -1]);
    }

    #[test]
    fn no_overflow_at_type_limits() {
        assert_eq!(elements(Range::with_step(250u8, 255, 10)), [250]);
        assert_eq!(elements(Range::new(253u8, 255)), [253, 254]);
        assert_eq!(elements(Range::new(2u8, 0)), [2, 1]);
        assert_eq!(elements(Range::with_step(-126i8, -128, -1)), [-126, -127]);
    }

    #[test]
    fn reverse() {
        let r = Range::with_step(1, 12, 4);
        assert_eq!(elements(r), [1, 5, 9]);
        assert_eq!(elements(r.reverse()), [9, 5, 1]);
        assert_eq!(r.reverse().reverse(), r);
        assert_eq!(r.iter().rev().collect::<Vec<_>>(), [9, 5, 1]);
        assert_eq!(elements(Range::with_step(127i8, -128, -128).reverse()), [-1, 127]);
        assert!(Range::new(0, 0).reverse().is_empty());
    }

    #[test]
    fn iterator_random_access() {
        let r = Range::with_step(0i64, 100, 5);
        let mut it = r.iter();
        assert_eq!(it.len(), 20);
        assert_eq!(it.nth(3), Some(15));
        assert_eq!(it.len(), 16);
        assert_eq!(it.next_back(), Some(95));
        assert_eq!(it.nth(100), None);
        assert_eq!(it.next(), None);
        let mut a = r.iter();
        let mut b = r.iter();
        a.nth(4);
        b.next();
        assert!(a != b);
        b.nth(3);
        assert!(a == b);
    }

    #[test]
    fn mixed_iteration() {
        let mut it = Range::new(0, 4).iter();
        assert_eq!(it.next(), Some(0));
        assert_eq!(it.next_back(), Some(3));
        assert_eq!(it.next(), Some(1));
        assert_eq!(it.next_back(), Some(2));
        assert_eq!(it.next(), None);
        assert_eq!(it.next_back(), None);
    }

    #[test]
    fn wide_types() {
        let r = Range::new(u128::MAX - 3, u128::MAX);
        assert_eq!(elements(r), [u128::MAX - 3, u128::MAX - 2, u128::MAX - 1]);
        let q = u128::MAX / 4;
        let r = Range::with_step(0u128, u128::MAX, q);
        assert_eq!(r.len(), 5);
        assert_eq!(r.last(), Some(4 * q));
        assert_eq!(r.iter().nth(3), Some(3 * q));
        let r = Range::with_step(i128::MIN, i128::MAX, i128::MAX);
        assert_eq!(elements(r), [i128::MIN, -1, i128::MAX - 1]);
        assert_eq!(elements(r.reverse()), [i128::MAX - 1, -1, i128::MIN]);
    }

    #[test]
    #[should_panic(expected = "Range is too long")]
    fn too_long_unsigned() {
        Range::new(0u128, u128::MAX);
    }

    #[test]
    #[should_panic(expected = "Range is too long")]
    fn too_long_signed() {
        Range::new(i128::MIN, 0);
    }

    #[test]
    #[should_panic]
    fn zero_step() {
        Range::with_step(0, 5, 0);
    }
}
