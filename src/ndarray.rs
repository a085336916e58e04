use std::fmt::{self, Display};
use std::ops::{Index, IndexMut};

use super::{Shape, Point, Literal, ShapeError, Result};

/// A dense array of `T`s with `N` axes.
///
/// The elements are stored in row-major order in a [`Box<[T]>`] whose length
/// is always exactly `shape().size()`. The buffer is never reallocated; the
/// only way to change the shape is to build a new `NdArray`.
///
/// Elements can be accessed by flat position (`a[5]`) or by multi-index
/// (`a[(1, 2)]`, `a[[1, 2]]`, or a point from [`Shape::iter()`]).
///
/// ```
/// use ndkit::{NdArray};
/// let a: NdArray<i32, 2> = NdArray::from_nested([[1, 2, 3], [4, 5, 6]]).unwrap();
/// assert_eq!(a[(1, 2)], 6);
/// assert_eq!(a[5], 6);
/// assert_eq!(a.shape().size(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NdArray<T, const N: usize> {
    shape: Shape<N>,
    items: Box<[T]>,
}

impl<T, const N: usize> NdArray<T, N> {
    const NONZERO_RANK: () = assert!(N > 0, "An NdArray must have at least one axis");

    fn new_inner(shape: Shape<N>, items: Box<[T]>) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_RANK;
        assert_eq!(shape.size(), items.len());
        Self {shape, items}
    }

    fn check_len(shape: &Shape<N>, found: usize) -> Result<()> {
        let expected = shape.size();
        if found == expected {
            Ok(())
        } else {
            Err(ShapeError::LengthMismatch {expected, found})
        }
    }

    /// Constructs an `NdArray` of shape `shape` that adopts `items` as its
    /// buffer.
    ///
    /// ```
    /// use ndkit::{NdArray, ShapeError};
    /// let a: NdArray<f32, 2> = NdArray::new([2, 2], vec![0.0, 1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(a[(1, 0)], 2.0);
    /// let b = NdArray::<f32, 2>::new([2, 2], vec![0.0]);
    /// assert_eq!(b, Err(ShapeError::LengthMismatch {expected: 4, found: 1}));
    /// ```
    pub fn new(shape: impl Into<Shape<N>>, items: impl Into<Box<[T]>>) -> Result<Self> {
        let shape = shape.into();
        let items = items.into();
        Self::check_len(&shape, items.len())?;
        Ok(Self::new_inner(shape, items))
    }

    /// Constructs an `NdArray` with every element equal to `value`.
    pub fn filled(shape: impl Into<Shape<N>>, value: T) -> Self where T: Clone {
        let shape = shape.into();
        Self::new_inner(shape, vec![value; shape.size()].into())
    }

    /// Constructs an `NdArray` with every element equal to `T::default()`.
    pub fn with_default(shape: impl Into<Shape<N>>) -> Self where T: Default {
        Self::from_fn(shape, |_| T::default())
    }

    /// Constructs an `NdArray` from a function of the flat position.
    ///
    /// `f` is called exactly once for each position, in increasing order.
    ///
    /// ```
    /// use ndkit::{NdArray};
    /// let a: NdArray<usize, 2> = NdArray::from_fn([2, 3], |i| i * 10);
    /// assert_eq!(a.as_slice(), [0, 10, 20, 30, 40, 50]);
    /// ```
    pub fn from_fn(shape: impl Into<Shape<N>>, f: impl FnMut(usize) -> T) -> Self {
        let shape = shape.into();
        Self::new_inner(shape, (0..shape.size()).map(f).collect())
    }

    /// Constructs an `NdArray` from a function of the multi-index.
    ///
    /// `f` is called exactly once for each point, in row-major order.
    ///
    /// ```
    /// use ndkit::{NdArray};
    /// let a: NdArray<usize, 2> = NdArray::from_point_fn([2, 3], |p| p[0] + p[1]);
    /// assert_eq!(a.as_slice(), [0, 1, 2, 1, 2, 3]);
    /// ```
    pub fn from_point_fn(shape: impl Into<Shape<N>>, mut f: impl FnMut(&Shape<N>) -> T) -> Self {
        let shape = shape.into();
        Self::new_inner(shape, shape.iter().map(|p| f(&p)).collect())
    }

    /// Constructs an `NdArray` by cloning the elements of `items`.
    pub fn from_slice(shape: impl Into<Shape<N>>, items: &[T]) -> Result<Self> where T: Clone {
        Self::from_iter_exact(shape, items.iter().cloned())
    }

    /// Constructs an `NdArray` from a flat sequence of elements in row-major
    /// order.
    ///
    /// The length of `items` is checked before any element is consumed.
    ///
    /// ```
    /// use ndkit::{NdArray, Range, ShapeError};
    /// let a: NdArray<i64, 2> = NdArray::from_iter_exact([2, 2], Range::new(0, 4)).unwrap();
    /// assert_eq!(a[(1, 1)], 3);
    /// let b = NdArray::<i64, 2>::from_iter_exact([2, 2], Range::new(0, 5));
    /// assert_eq!(b, Err(ShapeError::LengthMismatch {expected: 4, found: 5}));
    /// ```
    pub fn from_iter_exact<I>(shape: impl Into<Shape<N>>, items: I) -> Result<Self> where
        I: IntoIterator<Item=T>,
        I::IntoIter: ExactSizeIterator,
    {
        let shape = shape.into();
        let items = items.into_iter();
        Self::check_len(&shape, items.len())?;
        // `ExactSizeIterator::len()` is only a promise.
        let items: Box<[T]> = items.collect();
        Self::check_len(&shape, items.len())?;
        Ok(Self::new_inner(shape, items))
    }

    /// Constructs an `NdArray` from a nested literal, deducing the shape.
    ///
    /// The whole literal is checked to be rectangular before any element is
    /// moved.
    ///
    /// ```
    /// use ndkit::{NdArray, ShapeError};
    /// let a: NdArray<i32, 2> = NdArray::from_nested(vec![vec![1, 2], vec![3, 4]]).unwrap();
    /// assert_eq!(*a.shape().dims(), [2, 2]);
    /// let b = NdArray::<i32, 2>::from_nested(vec![vec![1, 2], vec![3]]);
    /// assert_eq!(b, Err(ShapeError::Ragged {axis: 1, expected: 2, found: 1}));
    /// ```
    pub fn from_nested(literal: impl Literal<T, N>) -> Result<Self> {
        let mut dims = [0; N];
        literal.extents(&mut dims);
        literal.check(&dims, 0)?;
        let shape = Shape::new(dims);
        let mut items = Vec::with_capacity(shape.size());
        literal.flatten(&mut items);
        Ok(Self::new_inner(shape, items.into()))
    }

    /// The shape of this array.
    #[inline(always)]
    pub fn shape(&self) -> &Shape<N> { &self.shape }

    /// The extent of axis `i`.
    #[inline(always)]
    pub fn extent(&self, i: usize) -> usize { self.shape.extent(i) }

    /// The number of elements.
    #[inline(always)]
    pub fn len(&self) -> usize { self.items.len() }

    #[inline(always)]
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    #[inline(always)]
    pub fn as_slice(&self) -> &[T] { &self.items }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] { &mut self.items }

    /// Iterates over the elements in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> { self.items.iter() }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> { self.items.iter_mut() }

    /// Borrows the element at `index`, or returns `None` if `index` is out of
    /// bounds.
    pub fn get(&self, index: impl Point<N>) -> Option<&T> {
        let i = self.shape.checked_linear(index)?;
        Some(&self.items[i])
    }

    pub fn get_mut(&mut self, index: impl Point<N>) -> Option<&mut T> {
        let i = self.shape.checked_linear(index)?;
        Some(&mut self.items[i])
    }

    /// Moves the contents out of `self`, leaving it empty.
    ///
    /// Afterwards `self` has a shape with all extents zero and no elements.
    ///
    /// ```
    /// use ndkit::{NdArray};
    /// let mut a: NdArray<u8, 1> = NdArray::filled([3], 7);
    /// let b = a.take();
    /// assert_eq!(b.as_slice(), [7, 7, 7]);
    /// assert_eq!(a.len(), 0);
    /// assert_eq!(a.shape().size(), 0);
    /// ```
    pub fn take(&mut self) -> Self { std::mem::take(self) }

    /// Applies `f` to every element, making a new array of the same shape.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> NdArray<U, N> {
        NdArray::new_inner(self.shape, self.items.iter().map(f).collect())
    }

    /// Returns the raw array elements.
    pub fn into_raw(self) -> Box<[T]> { self.items }

    pub fn into_vec(self) -> Vec<T> { self.items.into_vec() }
}

impl<T, const N: usize> Default for NdArray<T, N> {
    fn default() -> Self {
        Self::new_inner(Shape::new([0; N]), Vec::new().into())
    }
}

impl<T> From<Vec<T>> for NdArray<T, 1> {
    fn from(items: Vec<T>) -> Self {
        Self::new_inner(Shape::new([items.len()]), items.into())
    }
}

impl<T, const N: usize> AsRef<[T]> for NdArray<T, N> {
    fn as_ref(&self) -> &[T] { &self.items }
}

impl<T, const N: usize> AsMut<[T]> for NdArray<T, N> {
    fn as_mut(&mut self) -> &mut [T] { &mut self.items }
}

impl<T: Display, const N: usize> Display for NdArray<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, t) in self.items.iter().enumerate() {
            if i > 0 { write!(f, ",")?; }
            write!(f, "{}", t)?;
        }
        write!(f, "]")
    }
}

impl<T, const N: usize> IntoIterator for NdArray<T, N> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;
    fn into_iter(self) -> Self::IntoIter { self.into_vec().into_iter() }
}

impl<'a, T, const N: usize> IntoIterator for &'a NdArray<T, N> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;
    fn into_iter(self) -> Self::IntoIter { self.items.iter() }
}

impl<'a, T, const N: usize> IntoIterator for &'a mut NdArray<T, N> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;
    fn into_iter(self) -> Self::IntoIter { self.items.iter_mut() }
}

// ----------------------------------------------------------------------------

impl<T, const N: usize> Index<usize> for NdArray<T, N> {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: usize) -> &T { &self.items[index] }
}

impl<T, const N: usize> IndexMut<usize> for NdArray<T, N> {
    #[inline(always)]
    fn index_mut(&mut self, index: usize) -> &mut T { &mut self.items[index] }
}

macro_rules! impl_point_index {
    ($($p:ty: $n:tt),*) => {$(
        impl<T> Index<$p> for NdArray<T, $n> {
            type Output = T;
            #[inline(always)]
            fn index(&self, index: $p) -> &T { &self.items[self.shape.to_linear(index)] }
        }

        impl<T> IndexMut<$p> for NdArray<T, $n> {
            #[inline(always)]
            fn index_mut(&mut self, index: $p) -> &mut T {
                let i = self.shape.to_linear(index);
                &mut self.items[i]
            }
        }
    )*};
}

impl_point_index!(
    (usize,): 1,
    (usize, usize): 2,
    (usize, usize, usize): 3,
    (usize, usize, usize, usize): 4
);

impl<T, const N: usize> Index<[usize; N]> for NdArray<T, N> {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: [usize; N]) -> &T { &self.items[self.shape.to_linear(index)] }
}

impl<T, const N: usize> IndexMut<[usize; N]> for NdArray<T, N> {
    #[inline(always)]
    fn index_mut(&mut self, index: [usize; N]) -> &mut T {
        let i = self.shape.to_linear(index);
        &mut self.items[i]
    }
}

impl<T, const N: usize> Index<Shape<N>> for NdArray<T, N> {
    type Output = T;
    #[inline(always)]
    fn index(&self, index: Shape<N>) -> &T { &self.items[self.shape.to_linear(index)] }
}

impl<T, const N: usize> IndexMut<Shape<N>> for NdArray<T, N> {
    #[inline(always)]
    fn index_mut(&mut self, index: Shape<N>) -> &mut T {
        let i = self.shape.to_linear(index);
        &mut self.items[i]
    }
}

// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::{Cell};
    use std::rc::{Rc};

    use approx::{assert_relative_eq};

    use super::*;
    use crate::{shape, Counted, RcHandle};

    #[test]
    fn nested_literal_end_to_end() {
        let s = shape![2, 3];
        let a: NdArray<i32, 2> = NdArray::from_nested(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(*a.shape(), s);
        assert_eq!(a[(1, 2)], 6);
        assert_eq!(a[5], 6);
        assert_eq!(a[5], a[s.to_linear((1, 2))]);
        assert_eq!(a.shape().size(), 6);
        assert_eq!(a.iter().count(), a.shape().size());
    }

    #[test]
    fn ragged_literal_is_rejected() {
        let a = NdArray::<i32, 2>::from_nested(vec![vec![1, 2, 3], vec![4, 5]]);
        assert_eq!(a, Err(ShapeError::Ragged {axis: 1, expected: 3, found: 2}));
        let b = NdArray::<i32, 3>::from_nested(vec![
            vec![vec![1], vec![2]],
            vec![vec![3]],
        ]);
        assert_eq!(b, Err(ShapeError::Ragged {axis: 1, expected: 2, found: 1}));
    }

    #[test]
    fn rejected_literal_drops_every_element() {
        let drops = Rc::new(Cell::new(0));
        struct Noisy(Rc<Cell<usize>>);
        impl Drop for Noisy {
            fn drop(&mut self) { self.0.set(self.0.get() + 1); }
        }
        let literal = vec![
            vec![Noisy(drops.clone()), Noisy(drops.clone())],
            vec![Noisy(drops.clone())],
        ];
        assert!(NdArray::<Noisy, 2>::from_nested(literal).is_err());
        assert_eq!(drops.get(), 3);
    }

    #[test]
    fn empty_literal() {
        let a = NdArray::<i32, 2>::from_nested(Vec::<Vec<i32>>::new()).unwrap();
        assert_eq!(*a.shape().dims(), [0, 0]);
        assert!(a.is_empty());
    }

    #[test]
    fn fill_and_functions() {
        let a: NdArray<char, 2> = NdArray::filled([2, 2], 'x');
        assert_eq!(a.as_slice(), ['x'; 4]);
        let b: NdArray<String, 1> = NdArray::with_default([3]);
        assert!(b.iter().all(|s| s.is_empty()));
        let c: NdArray<[usize; 3], 3> = NdArray::from_point_fn([2, 2, 2], |p| *p.dims());
        for (i, p) in c.shape().iter().enumerate() {
            assert_eq!(c[i], *p.dims());
            assert_eq!(c[p], *p.dims());
        }
        let d: NdArray<f64, 1> = NdArray::from_fn([4], |i| 0.1 * i as f64);
        assert_relative_eq!(d[3], 0.3);
        assert_relative_eq!(d.iter().sum::<f64>(), 0.6);
    }

    #[test]
    fn flat_sources_are_length_checked() {
        assert_eq!(
            NdArray::<u8, 2>::from_slice([2, 3], &[1, 2, 3]),
            Err(ShapeError::LengthMismatch {expected: 6, found: 3}),
        );
        let a = NdArray::<u8, 2>::from_slice([1, 3], &[1, 2, 3]).unwrap();
        assert_eq!(a[[0, 2]], 3);
        let b = NdArray::<u8, 1>::from_iter_exact([3], a.iter().copied()).unwrap();
        assert_eq!(b.as_slice(), a.as_slice());
        assert!(NdArray::<u8, 1>::new([2], vec![1, 2, 3]).is_err());
    }

    #[test]
    fn access_and_mutation() {
        let mut a: NdArray<i32, 3> = NdArray::filled([2, 3, 4], 0);
        a[(1, 2, 3)] = 9;
        a[[0, 0, 1]] = 1;
        *a.get_mut((1, 0, 0)).unwrap() = 5;
        assert_eq!(a[23], 9);
        assert_eq!(a[1], 1);
        assert_eq!(a[12], 5);
        assert_eq!(a.get((2, 0, 0)), None);
        assert_eq!(a.get((1, 2, 3)), Some(&9));
        assert_eq!(a.extent(1), 3);
        for x in &mut a { *x += 1; }
        assert_eq!(a.iter().sum::<i32>(), 24 + 15);
    }

    #[test]
    #[should_panic]
    fn multi_index_out_of_bounds() {
        let a: NdArray<i32, 2> = NdArray::filled([2, 3], 0);
        let _ = a[(0, 3)];
    }

    #[test]
    fn take_leaves_source_empty() {
        let mut a: NdArray<i32, 2> = NdArray::from_fn([3, 2], |i| i as i32);
        let copy = a.clone();
        let b = a.take();
        assert_eq!(b, copy);
        assert_eq!(b.iter().count(), b.shape().size());
        assert_eq!(a.iter().count(), a.shape().size());
        assert_eq!(a.len(), 0);
        assert_eq!(*a.shape().dims(), [0, 0]);
    }

    #[test]
    fn clone_is_deep() {
        let a: NdArray<Vec<u8>, 1> = NdArray::filled([2], vec![1]);
        let mut b = a.clone();
        b[0].push(2);
        assert_eq!(a[0], [1]);
        assert_eq!(b[0], [1, 2]);
    }

    #[test]
    fn dropping_releases_handles() {
        let h = RcHandle::new(Counted::new("shared"));
        let a: NdArray<RcHandle<Counted<&str>>, 1> = NdArray::filled([4], h.clone());
        assert_eq!(h.count(), 5);
        let b = a.clone();
        assert_eq!(h.count(), 9);
        drop(a);
        assert_eq!(h.count(), 5);
        drop(b);
        assert_eq!(h.count(), 1);
    }

    #[test]
    fn display_and_conversions() {
        let a: NdArray<i32, 2> = NdArray::from_nested([[1, 2], [3, 4]]).unwrap();
        assert_eq!(a.to_string(), "[1,2,3,4]");
        assert_eq!(a.map(|x| x * 2).into_vec(), [2, 4, 6, 8]);
        let v: NdArray<i32, 1> = vec![5, 6].into();
        assert_eq!(*v.shape().dims(), [2]);
        assert_eq!(v.into_iter().collect::<Vec<_>>(), [5, 6]);
    }
}
