//! Nested lists that can initialise an [`NdArray`].
//!
//! A rank-`N` literal is a list of rank-`N - 1` literals; a rank-1 literal is
//! a list of elements. Both `Vec`s and fixed-size arrays can be used at any
//! level, up to rank 4. `Vec`s can be ragged, so the extents are first
//! deduced from the first entry at each level, and then every entry is
//! checked against them before any element is moved.
//!
//! [`NdArray`]: super::NdArray

use super::{ShapeError, Result};

/// Implemented by nested lists of `T` with `N` levels.
pub trait Literal<T, const N: usize>: Sized {
    /// Writes the extents of `self` into `dims`, which has length `N`.
    ///
    /// The extents of each inner axis are taken from the first entry. If
    /// `self` is empty, the inner extents are zero.
    fn extents(&self, dims: &mut [usize]);

    /// Checks that every list in `self` has the length given by `dims`.
    ///
    /// - axis - the axis of the outermost list of `self`, for error reports.
    fn check(&self, dims: &[usize], axis: usize) -> Result<()>;

    /// Appends the elements of `self` to `out` in row-major order.
    fn flatten(self, out: &mut Vec<T>);
}

fn conform(found: usize, expected: usize, axis: usize) -> Result<()> {
    if found == expected {
        Ok(())
    } else {
        Err(ShapeError::Ragged {axis, expected, found})
    }
}

impl<T> Literal<T, 1> for Vec<T> {
    fn extents(&self, dims: &mut [usize]) { dims[0] = self.len(); }

    fn check(&self, dims: &[usize], axis: usize) -> Result<()> {
        conform(self.len(), dims[0], axis)
    }

    fn flatten(self, out: &mut Vec<T>) { out.extend(self); }
}

impl<T, const K: usize> Literal<T, 1> for [T; K] {
    fn extents(&self, dims: &mut [usize]) { dims[0] = K; }

    fn check(&self, dims: &[usize], axis: usize) -> Result<()> {
        conform(K, dims[0], axis)
    }

    fn flatten(self, out: &mut Vec<T>) { out.extend(self); }
}

macro_rules! impl_nested_literal {
    ($n:literal, $m:literal) => {
        impl<T, L: Literal<T, $m>> Literal<T, $n> for Vec<L> {
            fn extents(&self, dims: &mut [usize]) {
                dims[0] = self.len();
                match self.first() {
                    Some(first) => first.extents(&mut dims[1..]),
                    None => dims[1..].fill(0),
                }
            }

            fn check(&self, dims: &[usize], axis: usize) -> Result<()> {
                conform(self.len(), dims[0], axis)?;
                self.iter().try_for_each(|l| l.check(&dims[1..], axis + 1))
            }

            fn flatten(self, out: &mut Vec<T>) {
                for l in self { l.flatten(out); }
            }
        }

        impl<T, L: Literal<T, $m>, const K: usize> Literal<T, $n> for [L; K] {
            fn extents(&self, dims: &mut [usize]) {
                dims[0] = K;
                match self.first() {
                    Some(first) => first.extents(&mut dims[1..]),
                    None => dims[1..].fill(0),
                }
            }

            fn check(&self, dims: &[usize], axis: usize) -> Result<()> {
                conform(K, dims[0], axis)?;
                self.iter().try_for_each(|l| l.check(&dims[1..], axis + 1))
            }

            fn flatten(self, out: &mut Vec<T>) {
                for l in self { l.flatten(out); }
            }
        }
    };
}

impl_nested_literal!(2, 1);
impl_nested_literal!(3, 2);
impl_nested_literal!(4, 3);

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn extents_of<L: Literal<i32, N>, const N: usize>(l: &L) -> [usize; N] {
        let mut dims = [0; N];
        l.extents(&mut dims);
        dims
    }

    #[test]
    fn deduce() {
        let a: Vec<Vec<i32>> = vec![vec![1, 2, 3], vec![4, 5, 6]];
        assert_eq!(extents_of::<_, 2>(&a), [2, 3]);
        let b = [[[0i32; 4]; 3]; 2];
        assert_eq!(extents_of::<_, 3>(&b), [2, 3, 4]);
        let c: Vec<Vec<i32>> = Vec::new();
        assert_eq!(extents_of::<_, 2>(&c), [0, 0]);
    }

    #[test]
    fn check_reports_axis() {
        let ragged: Vec<Vec<Vec<i32>>> = vec![
            vec![vec![1, 2], vec![3, 4]],
            vec![vec![5, 6], vec![7]],
        ];
        let dims = extents_of::<_, 3>(&ragged);
        assert_eq!(dims, [2, 2, 2]);
        assert_eq!(
            Literal::<i32, 3>::check(&ragged, &dims, 0),
            Err(ShapeError::Ragged {axis: 2, expected: 2, found: 1}),
        );
    }

    #[test]
    fn flatten_is_row_major() {
        let a = vec![[1, 2], [3, 4], [5, 6]];
        let mut out = Vec::new();
        Literal::<i32, 2>::flatten(a, &mut out);
        assert_eq!(out, [1, 2, 3, 4, 5, 6]);
    }
}
