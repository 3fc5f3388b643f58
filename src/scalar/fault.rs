//! Failure categories for deferred computations.

use std::error::Error as StdError;
use std::fmt;

use super::cancel::Cancelled;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Why a computation failed.
///
/// The variants are disjoint on purpose: code that handles declared
/// failures matches [`Fault::Checked`] and cannot catch a
/// [`Fault::Defect`] by accident.
///
/// Any `E` converts into `Fault::Checked`, so `?` works inside closures
/// returning `Result<T, Fault<E>>`.
#[derive(Debug)]
pub enum Fault<E> {
    /// A declared, recoverable failure.
    Checked(E),
    /// Cooperative cancellation was observed during evaluation.
    Cancelled(Cancelled),
    /// A programming defect.
    Defect(Defect),
}

impl<E> Fault<E> {
    /// Wraps `error` as a defect.
    pub fn defect(error: impl Into<BoxError>) -> Self {
        Fault::Defect(Defect::new(error))
    }

    /// Returns true for [`Fault::Checked`].
    pub fn is_checked(&self) -> bool {
        matches!(self, Fault::Checked(_))
    }

    /// Returns true for [`Fault::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Fault::Cancelled(_))
    }

    /// Returns true for [`Fault::Defect`].
    pub fn is_defect(&self) -> bool {
        matches!(self, Fault::Defect(_))
    }

    /// The declared failure, if this is one.
    pub fn checked(&self) -> Option<&E> {
        match self {
            Fault::Checked(e) => Some(e),
            _ => None,
        }
    }

    /// Consumes the fault, returning the declared failure if this is one.
    pub fn into_checked(self) -> Option<E> {
        match self {
            Fault::Checked(e) => Some(e),
            _ => None,
        }
    }

    /// The defect, if this is one.
    pub fn defect_ref(&self) -> Option<&Defect> {
        match self {
            Fault::Defect(d) => Some(d),
            _ => None,
        }
    }

    /// Maps the declared failure, leaving the other categories alone.
    pub fn map_checked<F, E2>(self, f: F) -> Fault<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Fault::Checked(e) => Fault::Checked(f(e)),
            Fault::Cancelled(c) => Fault::Cancelled(c),
            Fault::Defect(d) => Fault::Defect(d),
        }
    }
}

impl<E> From<E> for Fault<E> {
    fn from(error: E) -> Self {
        Fault::Checked(error)
    }
}

impl<E: fmt::Display> fmt::Display for Fault<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::Checked(e) => write!(f, "{}", e),
            Fault::Cancelled(c) => write!(f, "{}", c),
            Fault::Defect(d) => write!(f, "{}", d),
        }
    }
}

impl<E: StdError + 'static> StdError for Fault<E> {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Fault::Checked(e) => e.source(),
            Fault::Cancelled(c) => c.source(),
            Fault::Defect(d) => d.source(),
        }
    }
}

/// A failure that signals a bug rather than an environmental problem.
///
/// Defects are carried through every wrapper as the same object they were
/// created as. Panics are defects too; no wrapper in this crate catches
/// them.
#[derive(Debug)]
pub struct Defect {
    error: BoxError,
}

impl Defect {
    /// Wraps `error`. Strings are accepted as messages.
    pub fn new(error: impl Into<BoxError>) -> Self {
        Defect {
            error: error.into(),
        }
    }

    /// The wrapped error.
    pub fn get_ref(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.error
    }

    /// The wrapped error, if it is a `T`.
    pub fn downcast_ref<T: StdError + 'static>(&self) -> Option<&T> {
        self.error.downcast_ref::<T>()
    }

    /// Returns the wrapped error.
    pub fn into_inner(self) -> BoxError {
        self.error
    }
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl StdError for Defect {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.error.source()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, PartialEq)]
    struct Bug(&'static str);

    impl fmt::Display for Bug {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "bug: {}", self.0)
        }
    }

    impl StdError for Bug {}

    #[test]
    fn test_question_mark_lifts_into_checked() {
        fn open() -> Result<(), Fault<io::Error>> {
            let missing: Result<(), io::Error> =
                Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
            missing?;
            Ok(())
        }

        let fault = open().unwrap_err();
        assert!(fault.is_checked());
        assert_eq!(fault.checked().unwrap().kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_defect_keeps_original_error() {
        let fault: Fault<io::Error> = Fault::defect(Bug("index out of range"));

        assert!(fault.is_defect());
        let defect = fault.defect_ref().unwrap();
        assert_eq!(defect.downcast_ref::<Bug>(), Some(&Bug("index out of range")));
        assert_eq!(defect.to_string(), "bug: index out of range");
    }

    #[test]
    fn test_defect_from_message() {
        let defect = Defect::new("unreachable state");
        assert_eq!(defect.to_string(), "unreachable state");
        assert!(defect.source().is_none());
    }

    #[test]
    fn test_map_checked_leaves_defects_alone() {
        let fault: Fault<&str> = Fault::defect(Bug("kept"));
        let mapped = fault.map_checked(|e| e.len());

        assert!(mapped.defect_ref().unwrap().downcast_ref::<Bug>().is_some());
    }

    #[test]
    fn test_display_is_transparent() {
        let fault: Fault<io::Error> = io::Error::new(io::ErrorKind::Other, "disk full").into();
        assert_eq!(fault.to_string(), "disk full");
    }
}
