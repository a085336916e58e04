//! Support types for building numerical models: dense multi-dimensional
//! arrays, intrusive reference counting, and lazy integer sequences.
//!
//! [`Shape<N>`] describes the extents of an `N`-dimensional array and does
//! the arithmetic between multi-indices and positions in a flat row-major
//! buffer. Multi-indices can be written as arrays, as tuples, or as points
//! yielded by [`Shape::iter()`]; any type that implements [`Point`] will do.
//!
//! [`NdArray<T, N>`] owns exactly `shape.size()` elements in a [`Box<[T]>`].
//! It can be built from a fill value, from a function of the position, from
//! a flat source whose length is checked, or from a nested literal such as
//! `[[1, 2, 3], [4, 5, 6]]`. Fallible constructors return a [`ShapeError`]
//! without building anything.
//!
//! [`RcHandle<T>`] is a shared-ownership pointer whose counter lives inside
//! the pointee, which must implement [`RefCounted`]. Wrap any value in
//! [`Counted`] to make it shareable. Handles can be upcast to trait objects
//! without touching the counter.
//!
//! [`Range<T>`] is an arithmetic progression of integers that is computed on
//! demand, and [`Generator`] lazily applies a function to any re-iterable
//! sequence.
//!
//! ```
//! use ndkit::{shape, NdArray, Generator, Range};
//! let s = shape![2, 3];
//! let a: NdArray<i32, 2> = NdArray::from_nested([[1, 2, 3], [4, 5, 6]]).unwrap();
//! assert_eq!(a.shape(), &s);
//! let doubled = Generator::new(|i: usize| 2 * a[i], Range::new(0, s.size()));
//! assert_eq!(doubled.iter().collect::<Vec<_>>(), [2, 4, 6, 8, 10, 12]);
//! ```

mod error;
pub use error::{ShapeError, Result};

mod shape;
pub use shape::{Point, Shape, Points};

pub mod literal;
pub use literal::{Literal};

mod ndarray;
pub use ndarray::{NdArray};

pub mod rc;
pub use rc::{RefCount, Reserve, RefCounted, Counted, Upcast, RcHandle};

mod range;
pub use range::{Range, RangeIter};

mod generator;
pub use generator::{Generator, GeneratorIter};

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_literal_matrix() {
        let a: NdArray<i32, 2> = NdArray::from_nested(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(a.shape(), &shape![2, 3]);
        assert_eq!(a[(1, 2)], 6);
        assert_eq!(a[5], 6);
        assert_eq!(a.shape().to_linear((1, 2)), 1 * 3 + 2);
        assert_eq!(a.shape().size(), 6);
    }

    #[test]
    fn array_of_shared_handles() {
        let shared = RcHandle::new(Counted::new(String::from("x")));
        let mut a = NdArray::filled([2, 2], shared.clone());
        assert_eq!(shared.count(), 5);
        a[(0, 1)] = RcHandle::null();
        assert_eq!(shared.count(), 4);
        let b = a.clone();
        assert_eq!(shared.count(), 7);
        drop(a);
        drop(b);
        assert_eq!(shared.count(), 1);
    }

    #[test]
    fn generated_points() {
        let s = shape![3, 2];
        let a: NdArray<usize, 2> = NdArray::from_point_fn(s, |p| p[0] * 10 + p[1]);
        let g = Generator::new(|p: Shape<2>| a[p], s);
        assert_eq!(g.iter().collect::<Vec<_>>(), a.as_slice());
        assert_eq!(g.iter().rev().next(), Some(21));
    }
}
