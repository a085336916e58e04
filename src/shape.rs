use std::fmt::{self, Display};
use std::iter::{FusedIterator};

/// Implemented by types that can be used as a multi-dimensional index into a
/// [`Shape<N>`].
///
/// You are encouraged to write new `Point` types. The crate provides
/// implementations for `[usize; N]`, for tuples of `usize` up to rank 4, and
/// for `Shape<N>` itself, so that the points yielded by [`Shape::iter()`] can
/// be fed straight back into [`Shape::to_linear()`].
pub trait Point<const N: usize>: Copy {
    /// Returns the coordinates of `self`, outermost axis first.
    fn coords(self) -> [usize; N];
}

impl<const N: usize> Point<N> for [usize; N] {
    #[inline(always)]
    fn coords(self) -> [usize; N] { self }
}

impl<const N: usize> Point<N> for Shape<N> {
    #[inline(always)]
    fn coords(self) -> [usize; N] { self.dims }
}

impl<'a, const N: usize> Point<N> for &'a Shape<N> {
    #[inline(always)]
    fn coords(self) -> [usize; N] { self.dims }
}

impl Point<1> for (usize,) {
    #[inline(always)]
    fn coords(self) -> [usize; 1] { [self.0] }
}

impl Point<2> for (usize, usize) {
    #[inline(always)]
    fn coords(self) -> [usize; 2] { [self.0, self.1] }
}

impl Point<3> for (usize, usize, usize) {
    #[inline(always)]
    fn coords(self) -> [usize; 3] { [self.0, self.1, self.2] }
}

impl Point<4> for (usize, usize, usize, usize) {
    #[inline(always)]
    fn coords(self) -> [usize; 4] { [self.0, self.1, self.2, self.3] }
}

// ----------------------------------------------------------------------------

/// The extents of an `N`-dimensional array.
///
/// A `Shape` is an immutable value. Its total `size()` and its row-major
/// strides are computed once, when it is constructed.
///
/// A `Shape` is also used to represent a point inside another `Shape`: see
/// [`Shape::point()`]. A point's "extents" are its coordinates.
///
/// ```
/// use ndkit::{shape, Shape};
/// let s: Shape<3> = shape![2, 3, 4];
/// assert_eq!(s.size(), 24);
/// assert_eq!(s[1], 3);
/// assert_eq!(s.to_linear((1, 2, 3)), 23);
/// assert_eq!(s.point(23).dims(), &[1, 2, 3]);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Shape<const N: usize> {
    dims: [usize; N],
    strides: [usize; N],
    size: usize,
}

impl<const N: usize> Shape<N> {
    /// Constructs a `Shape` with the given extents.
    ///
    /// # Panics
    ///
    /// Panics if the number of elements overflows a `usize`. A shape with a
    /// zero extent has no elements, and never panics.
    pub fn new(dims: [usize; N]) -> Self {
        let empty = dims.contains(&0);
        let mut strides = [0; N];
        let mut size: usize = 1;
        for k in (0..N).rev() {
            strides[k] = size;
            size = size.checked_mul(dims[k]).unwrap_or_else(|| {
                assert!(empty, "Shape {:?} has more than usize::MAX elements", dims);
                // No point has a valid coordinate on the zero axis.
                usize::MAX
            });
        }
        Self {dims, strides, size: if empty { 0 } else { size }}
    }

    /// The number of axes.
    #[inline(always)]
    pub const fn rank(&self) -> usize { N }

    /// The extent of each axis.
    #[inline(always)]
    pub fn dims(&self) -> &[usize; N] { &self.dims }

    /// The extent of axis `i`.
    #[inline(always)]
    pub fn extent(&self, i: usize) -> usize { self.dims[i] }

    /// The distance in the flat buffer between neighbours along each axis.
    #[inline(always)]
    pub fn strides(&self) -> &[usize; N] { &self.strides }

    /// The total number of elements, i.e. the product of the extents.
    #[inline(always)]
    pub fn size(&self) -> usize { self.size }

    /// Returns `true` if any extent is zero.
    #[inline(always)]
    pub fn is_empty(&self) -> bool { self.size == 0 }

    /// Computes the row-major position of `index` in a flat buffer.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate of `index` is out of bounds.
    pub fn to_linear(&self, index: impl Point<N>) -> usize {
        let coords = index.coords();
        self.checked_linear(coords).unwrap_or_else(|| {
            panic!("Index {:?} is out of bounds for shape {}", coords, self)
        })
    }

    /// Like [`Self::to_linear()`] but returns `None` instead of panicking.
    pub fn checked_linear(&self, index: impl Point<N>) -> Option<usize> {
        let mut linear = 0;
        for ((&i, &dim), &stride) in index.coords().iter().zip(&self.dims).zip(&self.strides) {
            if i >= dim { return None; }
            linear += i * stride;
        }
        Some(linear)
    }

    /// Returns the point at row-major position `index`.
    ///
    /// This is the inverse of [`Self::to_linear()`]: for every
    /// `i < self.size()`, `self.to_linear(self.point(i)) == i`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    pub fn point(&self, index: usize) -> Shape<N> {
        assert!(index < self.size, "Linear index {} is out of bounds for shape {}", index, self);
        let mut coords = [0; N];
        let mut rest = index;
        for (c, &stride) in coords.iter_mut().zip(&self.strides) {
            *c = rest / stride;
            rest %= stride;
        }
        Shape::new(coords)
    }

    /// Returns an iterator over every point of `self` in row-major order.
    ///
    /// ```
    /// use ndkit::{shape};
    /// let points: Vec<[usize; 2]> = shape![2, 2].iter().map(|p| *p.dims()).collect();
    /// assert_eq!(points, [[0, 0], [0, 1], [1, 0], [1, 1]]);
    /// ```
    pub fn iter(&self) -> Points<N> {
        Points {shape: *self, pos: 0, end: self.size}
    }
}

impl<const N: usize> From<[usize; N]> for Shape<N> {
    fn from(dims: [usize; N]) -> Self { Self::new(dims) }
}

impl<const N: usize> std::ops::Index<usize> for Shape<N> {
    type Output = usize;
    #[inline(always)]
    fn index(&self, i: usize) -> &usize { &self.dims[i] }
}

impl<const N: usize> Display for Shape<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (k, dim) in self.dims.iter().enumerate() {
            if k > 0 { write!(f, ",")?; }
            write!(f, "{}", dim)?;
        }
        write!(f, ")")
    }
}

impl<const N: usize> IntoIterator for Shape<N> {
    type Item = Shape<N>;
    type IntoIter = Points<N>;
    fn into_iter(self) -> Points<N> { self.iter() }
}

impl<'a, const N: usize> IntoIterator for &'a Shape<N> {
    type Item = Shape<N>;
    type IntoIter = Points<N>;
    fn into_iter(self) -> Points<N> { self.iter() }
}

/// Constructs a [`Shape`] whose rank is the number of arguments.
///
/// ```
/// use ndkit::{shape};
/// let s = shape![4, 5];
/// assert_eq!(s.rank(), 2);
/// assert_eq!(s.size(), 20);
/// ```
#[macro_export]
macro_rules! shape {
    ($($dim:expr),* $(,)?) => { $crate::Shape::new([$($dim),*]) };
}

// ----------------------------------------------------------------------------

/// The return type of [`Shape::iter()`].
///
/// Two `Points` compare equal if they are at the same position.
#[derive(Debug, Clone)]
pub struct Points<const N: usize> {
    shape: Shape<N>,
    pos: usize,
    end: usize,
}

impl<const N: usize> Points<N> {
    /// The row-major position of the next point.
    #[inline(always)]
    pub fn position(&self) -> usize { self.pos }
}

impl<const N: usize> PartialEq for Points<N> {
    fn eq(&self, other: &Self) -> bool { self.pos == other.pos }
}

impl<const N: usize> Iterator for Points<N> {
    type Item = Shape<N>;

    fn next(&mut self) -> Option<Shape<N>> {
        if self.pos >= self.end { return None; }
        let point = self.shape.point(self.pos);
        self.pos += 1;
        Some(point)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end - self.pos;
        (n, Some(n))
    }

    fn nth(&mut self, n: usize) -> Option<Shape<N>> {
        self.pos = self.pos.saturating_add(n).min(self.end);
        self.next()
    }
}

impl<const N: usize> DoubleEndedIterator for Points<N> {
    fn next_back(&mut self) -> Option<Shape<N>> {
        if self.pos >= self.end { return None; }
        self.end -= 1;
        Some(self.shape.point(self.end))
    }
}

impl<const N: usize> ExactSizeIterator for Points<N> {}

impl<const N: usize> FusedIterator for Points<N> {}

// ----------------------------------------------------------------------------
