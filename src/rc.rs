//! Intrusive reference counting.
//!
//! An object that can be shared through an [`RcHandle`] carries its own
//! counter, a [`RefCount`], and exposes it by implementing [`RefCounted`].
//! Because the counter lives inside the object, a handle is a single
//! (possibly fat) pointer, and a new handle can be made from nothing more
//! than a pointer to the object (see [`RcHandle::from_raw()`]).
//!
//! The counter is a plain [`Cell`], so neither `RefCount` nor `RcHandle` is
//! `Send` or `Sync`.
//!
//! ```
//! use ndkit::{RcHandle, Counted};
//! let a = RcHandle::new(Counted::new(vec![1, 2, 3]));
//! let b = a.clone();
//! assert_eq!(a.count(), 2);
//! assert!(a == b);
//! assert_eq!(b.len(), 3);
//! drop(a);
//! assert_eq!(b.count(), 1);
//! ```

use std::cell::{Cell};
use std::fmt::{self, Debug};
use std::marker::{PhantomData};
use std::mem::{ManuallyDrop};
use std::ops::{Deref, DerefMut};
use std::ptr::{NonNull};

/// The number of [`RcHandle`]s that refer to an object.
///
/// A new `RefCount` is zero. Cloning a `RefCount` also gives zero, so that
/// cloning a [`RefCounted`] object does not copy its handles.
pub struct RefCount(Cell<isize>);

impl RefCount {
    pub const fn new() -> Self { RefCount(Cell::new(0)) }

    /// The current count.
    #[inline(always)]
    pub fn get(&self) -> isize { self.0.get() }

    #[inline(always)]
    fn incr(&self) -> isize {
        let n = self.0.get() + 1;
        self.0.set(n);
        n
    }

    #[inline(always)]
    fn decr(&self) -> isize {
        let n = self.0.get() - 1;
        self.0.set(n);
        n
    }

    /// Holds an extra count until the returned guard is dropped.
    ///
    /// Unlike an `RcHandle`, the guard never destroys the object. This is
    /// useful when an object that is not yet owned by any handle needs to
    /// make temporary handles to itself: without the reservation, dropping
    /// the last temporary handle would destroy the object.
    pub fn reserve(&self) -> Reserve<'_> {
        self.incr();
        Reserve(self)
    }
}

impl Default for RefCount {
    fn default() -> Self { Self::new() }
}

impl Clone for RefCount {
    fn clone(&self) -> Self { Self::new() }
}

impl Debug for RefCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RefCount").field(&self.get()).finish()
    }
}

/// The return type of [`RefCount::reserve()`].
#[must_use]
pub struct Reserve<'a>(&'a RefCount);

impl<'a> Drop for Reserve<'a> {
    fn drop(&mut self) { self.0.decr(); }
}

// ----------------------------------------------------------------------------

/// Implemented by types that can be shared using [`RcHandle`].
///
/// # Safety
///
/// `ref_count()` must always return the same [`RefCount`], which must be
/// owned by `self`. Nothing other than `RcHandle` and [`Reserve`] may change
/// it.
pub unsafe trait RefCounted {
    fn ref_count(&self) -> &RefCount;
}

/// Wraps a value of any type so that it can be shared using [`RcHandle`].
#[derive(Debug, Default, Clone)]
pub struct Counted<T> {
    count: RefCount,
    value: T,
}

impl<T> Counted<T> {
    pub const fn new(value: T) -> Self { Counted {count: RefCount::new(), value} }

    pub fn into_inner(self) -> T { self.value }
}

unsafe impl<T> RefCounted for Counted<T> {
    #[inline(always)]
    fn ref_count(&self) -> &RefCount { &self.count }
}

impl<T> Deref for Counted<T> {
    type Target = T;
    fn deref(&self) -> &T { &self.value }
}

impl<T> DerefMut for Counted<T> {
    fn deref_mut(&mut self) -> &mut T { &mut self.value }
}

// ----------------------------------------------------------------------------

/// Implemented by `Self` if an `RcHandle<Self>` can be converted into an
/// `RcHandle<P>` referring to the same object.
///
/// Every `T` implements `Upcast<T>`. Use [`impl_upcast`] to let a concrete
/// type be viewed as a trait object.
///
/// # Safety
///
/// `upcast_ptr()` must return a pointer to the same object, such that
/// `ref_count()` returns the same [`RefCount`] through either pointer.
///
/// [`impl_upcast`]: crate::impl_upcast
pub unsafe trait Upcast<P: ?Sized + RefCounted>: RefCounted {
    fn upcast_ptr(ptr: NonNull<Self>) -> NonNull<P>;
}

unsafe impl<T: ?Sized + RefCounted> Upcast<T> for T {
    #[inline(always)]
    fn upcast_ptr(ptr: NonNull<T>) -> NonNull<T> { ptr }
}

/// Implements [`Upcast`] from a concrete type to a trait object.
///
/// The trait must have [`RefCounted`] as a supertrait.
///
/// ```
/// use ndkit::{impl_upcast, RcHandle, RefCount, RefCounted};
///
/// trait Animal: RefCounted { fn legs(&self) -> u32; }
///
/// struct Dog(RefCount);
/// unsafe impl RefCounted for Dog { fn ref_count(&self) -> &RefCount { &self.0 } }
/// impl Animal for Dog { fn legs(&self) -> u32 { 4 } }
/// impl_upcast!(Dog => dyn Animal);
///
/// let dog = RcHandle::new(Dog(RefCount::new()));
/// let animal: RcHandle<dyn Animal> = dog.clone().upcast();
/// assert_eq!(animal.legs(), 4);
/// assert_eq!(dog.count(), 2);
/// ```
#[macro_export]
macro_rules! impl_upcast {
    ($from:ty => $to:ty) => {
        unsafe impl $crate::Upcast<$to> for $from {
            #[inline(always)]
            fn upcast_ptr(ptr: ::std::ptr::NonNull<Self>) -> ::std::ptr::NonNull<$to> { ptr }
        }
    };
}

// ----------------------------------------------------------------------------

/// A shared-ownership handle to a [`RefCounted`] object.
///
/// The object's count is the number of live handles that refer to it. The
/// object is destroyed when the count falls from 1 to 0.
///
/// A handle can be null. Dereferencing a null handle panics.
pub struct RcHandle<T: ?Sized + RefCounted> {
    ptr: Option<NonNull<T>>,
    _owns: PhantomData<T>,
}

/// Decrements the count of `ptr` and destroys it if the count reaches zero.
///
/// # Safety
///
/// `ptr` must have been allocated by a `Box` and its count must include one
/// that the caller is giving up.
unsafe fn release<T: ?Sized + RefCounted>(ptr: NonNull<T>) {
    if ptr.as_ref().ref_count().decr() == 0 {
        drop(Box::from_raw(ptr.as_ptr()));
    }
}

impl<T: RefCounted> RcHandle<T> {
    /// Moves `value` to the heap and makes the first handle to it.
    pub fn new(value: T) -> Self { Self::from_box(Box::new(value)) }
}

impl<T: ?Sized + RefCounted> RcHandle<T> {
    /// A handle that refers to nothing.
    pub const fn null() -> Self { RcHandle {ptr: None, _owns: PhantomData} }

    /// Takes ownership of `value` and makes a handle to it.
    pub fn from_box(value: Box<T>) -> Self {
        let ptr = NonNull::from(Box::leak(value));
        // SAFETY: `ptr` was allocated by a `Box`.
        unsafe { Self::from_raw(ptr.as_ptr()) }
    }

    /// Makes a new handle to the object at `ptr`, incrementing its count.
    ///
    /// # Safety
    ///
    /// `ptr` must be null, or must point to a live object that was allocated
    /// by a `Box` and whose lifetime is governed by its count, for example a
    /// pointer obtained from [`Self::as_ptr()`] of a live handle.
    pub unsafe fn from_raw(ptr: *mut T) -> Self {
        Self::acquire(NonNull::new(ptr))
    }

    /// Increments the count of `ptr`, if any, and wraps it.
    unsafe fn acquire(ptr: Option<NonNull<T>>) -> Self {
        if let Some(p) = ptr { p.as_ref().ref_count().incr(); }
        RcHandle {ptr, _owns: PhantomData}
    }

    /// Returns the pointer to the object, without changing the count.
    #[inline(always)]
    pub fn as_ptr(&self) -> Option<NonNull<T>> { self.ptr }

    /// Borrows the object, or returns `None` if `self` is null.
    #[inline(always)]
    pub fn get(&self) -> Option<&T> {
        // SAFETY: a non-null handle keeps its object alive.
        self.ptr.map(|p| unsafe { &*p.as_ptr() })
    }

    #[inline(always)]
    pub fn is_null(&self) -> bool { self.ptr.is_none() }

    /// The number of handles that refer to the object, or 0 if `self` is
    /// null.
    pub fn count(&self) -> isize {
        self.get().map_or(0, |t| t.ref_count().get())
    }

    /// Releases the object and makes `self` null.
    ///
    /// The object is destroyed if `self` was the last handle to it.
    pub fn reset(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            // SAFETY: `self` held one count.
            unsafe { release(ptr) };
        }
    }

    /// Makes `self` refer to the same object as `other`.
    ///
    /// The new object's count is incremented before the old object is
    /// released, so this is safe even if the old object is what keeps the
    /// new object alive.
    pub fn assign(&mut self, other: &RcHandle<T>) {
        // SAFETY: `other.ptr` comes from a live handle.
        let new = unsafe { Self::acquire(other.ptr) };
        *self = new;
    }

    /// Makes `self` refer to the object at `ptr`, which may be null.
    ///
    /// # Safety
    ///
    /// Same as [`Self::from_raw()`].
    pub unsafe fn assign_raw(&mut self, ptr: *mut T) {
        let new = Self::acquire(NonNull::new(ptr));
        *self = new;
    }

    /// Converts `self` into a handle to a supertype of the same object.
    ///
    /// The count is unchanged.
    pub fn upcast<P: ?Sized + RefCounted>(self) -> RcHandle<P> where T: Upcast<P> {
        let this = ManuallyDrop::new(self);
        RcHandle {ptr: this.ptr.map(<T as Upcast<P>>::upcast_ptr), _owns: PhantomData}
    }
}

impl<T: ?Sized + RefCounted> Drop for RcHandle<T> {
    fn drop(&mut self) { self.reset(); }
}

impl<T: ?Sized + RefCounted> Clone for RcHandle<T> {
    fn clone(&self) -> Self {
        // SAFETY: `self.ptr` comes from a live handle.
        unsafe { Self::acquire(self.ptr) }
    }

    fn clone_from(&mut self, source: &Self) { self.assign(source); }
}

impl<T: ?Sized + RefCounted> Default for RcHandle<T> {
    fn default() -> Self { Self::null() }
}

impl<T: ?Sized + RefCounted> Deref for RcHandle<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match self.get() {
            Some(t) => t,
            None => panic!("Dereferenced a null RcHandle"),
        }
    }
}

/// Handles are equal if they refer to the same object.
impl<T: ?Sized + RefCounted> PartialEq for RcHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr.map(|p| p.as_ptr() as *const u8) == other.ptr.map(|p| p.as_ptr() as *const u8)
    }
}

impl<T: ?Sized + RefCounted> Eq for RcHandle<T> {}

impl<T: ?Sized + RefCounted + Debug> Debug for RcHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.ptr, self.get()) {
            (Some(p), Some(t)) => f.debug_struct("RcHandle")
                .field("ptr", &p)
                .field("count", &self.count())
                .field("value", &t)
                .finish(),
            _ => write!(f, "RcHandle(null)"),
        }
    }
}

// ----------------------------------------------------------------------------
