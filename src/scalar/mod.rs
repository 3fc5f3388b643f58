//! Deferred computations that may fail.
//!
//! A [`Scalar`] is a value that is computed when asked for, every time it
//! is asked for. Wrappers such as [`Checked`] own the scalar they decorate
//! and add exactly one behavior on the way back up.
//!
//! Failures are split into categories at the type level by [`Fault`]:
//!
//! - [`Fault::Checked`] - a declared failure the caller knows how to handle
//! - [`Fault::Cancelled`] - cooperative cancellation was observed
//! - [`Fault::Defect`] - a programming defect, never remapped
//!
//! # Example
//!
//! ```rust
//! use brook::scalar::{from_fn, Fault, Scalar, ScalarExt};
//! use std::io;
//!
//! #[derive(Debug)]
//! struct LoadFailed(io::Error);
//!
//! let load = from_fn(|| -> Result<u32, Fault<io::Error>> {
//!     Err(io::Error::new(io::ErrorKind::NotFound, "no such file").into())
//! })
//! .checked(LoadFailed);
//!
//! match load.value() {
//!     Err(Fault::Checked(LoadFailed(cause))) => {
//!         assert_eq!(cause.kind(), io::ErrorKind::NotFound)
//!     }
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

mod cancel;
mod checked;
mod fault;

pub use cancel::{CancelToken, Cancelled};
pub use checked::{checked, io_checked, Checked};
pub use fault::{Defect, Fault};

/// A deferred computation.
///
/// [`Scalar::value`] evaluates the computation from scratch on every call;
/// nothing is cached.
pub trait Scalar {
    /// The value produced on success.
    type Output;

    /// The failure produced otherwise.
    type Error;

    /// Evaluates the computation.
    fn value(&self) -> Result<Self::Output, Self::Error>;
}

impl<S: Scalar + ?Sized> Scalar for &S {
    type Output = S::Output;
    type Error = S::Error;

    fn value(&self) -> Result<S::Output, S::Error> {
        (**self).value()
    }
}

impl<S: Scalar + ?Sized> Scalar for Box<S> {
    type Output = S::Output;
    type Error = S::Error;

    fn value(&self) -> Result<S::Output, S::Error> {
        (**self).value()
    }
}

/// A scalar backed by a closure.
///
/// Created by [`from_fn`].
pub struct FromFn<F> {
    f: F,
}

impl<F> std::fmt::Debug for FromFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FromFn").field("f", &"<function>").finish()
    }
}

impl<F, T, E> Scalar for FromFn<F>
where
    F: Fn() -> Result<T, E>,
{
    type Output = T;
    type Error = E;

    fn value(&self) -> Result<T, E> {
        (self.f)()
    }
}

/// Wraps a closure as a [`Scalar`]. The closure runs on every evaluation.
///
/// # Example
///
/// ```rust
/// use brook::scalar::{from_fn, Scalar};
/// use std::cell::Cell;
///
/// let calls = Cell::new(0);
/// let counter = from_fn(|| {
///     calls.set(calls.get() + 1);
///     Ok::<_, ()>(calls.get())
/// });
///
/// assert_eq!(counter.value(), Ok(1));
/// assert_eq!(counter.value(), Ok(2));
/// ```
pub fn from_fn<F, T, E>(f: F) -> FromFn<F>
where
    F: Fn() -> Result<T, E>,
{
    FromFn { f }
}

/// Combinator methods available on every [`Scalar`].
pub trait ScalarExt: Scalar + Sized {
    /// Remaps declared failures with `mapper`; see [`Checked`].
    fn checked<F, E, E2>(self, mapper: F) -> Checked<Self, F>
    where
        Self: Scalar<Error = Fault<E>>,
        E: From<Cancelled>,
        F: Fn(E) -> E2,
    {
        Checked::new(self, mapper)
    }
}

impl<S: Scalar> ScalarExt for S {}
