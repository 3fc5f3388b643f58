//! Checked evaluation: remap declared failures, pass defects through.

use std::error::Error as StdError;
use std::io;

use super::cancel::Cancelled;
use super::fault::Fault;
use super::Scalar;

/// A scalar whose declared failures are remapped by a function.
///
/// On each [`Scalar::value`] the wrapped scalar is evaluated once:
///
/// - success passes through unchanged;
/// - [`Fault::Checked`] becomes `Fault::Checked(mapper(error))`;
/// - [`Fault::Cancelled`] re-arms the originating token, is converted into
///   the declared error type, then mapped like any declared failure;
/// - [`Fault::Defect`] is returned as the same object, untouched.
///
/// The mapper receives the original failure by value and decides on its
/// own whether the new failure keeps it as its cause. `Checked` never adds
/// or removes a cause.
///
/// # Example
///
/// ```rust
/// use brook::scalar::{checked, from_fn, Fault, Scalar};
/// use std::error::Error;
/// use std::io;
///
/// #[derive(Debug)]
/// struct ConfigMissing(io::Error);
///
/// impl std::fmt::Display for ConfigMissing {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "config missing")
///     }
/// }
///
/// impl Error for ConfigMissing {
///     fn source(&self) -> Option<&(dyn Error + 'static)> {
///         Some(&self.0)
///     }
/// }
///
/// let read = checked(
///     from_fn(|| -> Result<String, Fault<io::Error>> {
///         Err(io::Error::new(io::ErrorKind::NotFound, "app.toml").into())
///     }),
///     ConfigMissing,
/// );
///
/// let err = read.value().unwrap_err().into_checked().unwrap();
/// assert_eq!(err.source().unwrap().to_string(), "app.toml");
/// ```
pub struct Checked<S, F> {
    origin: S,
    mapper: F,
}

impl<S, F> std::fmt::Debug for Checked<S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Checked")
            .field("origin", &"<scalar>")
            .field("mapper", &"<function>")
            .finish()
    }
}

impl<S, F> Checked<S, F> {
    /// Wraps `origin`, remapping its declared failures with `mapper`.
    pub fn new(origin: S, mapper: F) -> Self {
        Checked { origin, mapper }
    }

    /// The wrapped scalar.
    pub fn get_ref(&self) -> &S {
        &self.origin
    }
}

impl<S, F, E, E2> Scalar for Checked<S, F>
where
    S: Scalar<Error = Fault<E>>,
    E: From<Cancelled>,
    F: Fn(E) -> E2,
{
    type Output = S::Output;
    type Error = Fault<E2>;

    fn value(&self) -> Result<S::Output, Fault<E2>> {
        match self.origin.value() {
            Ok(value) => Ok(value),
            Err(Fault::Checked(error)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("remapping checked failure");
                Err(Fault::Checked((self.mapper)(error)))
            }
            Err(Fault::Cancelled(cancelled)) => {
                cancelled.restore();
                #[cfg(feature = "tracing")]
                tracing::debug!("cancellation re-armed before remapping");
                Err(Fault::Checked((self.mapper)(E::from(cancelled))))
            }
            Err(Fault::Defect(defect)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(%defect, "defect passed through unmapped");
                Err(Fault::Defect(defect))
            }
        }
    }
}

/// Wraps `origin`, remapping its declared failures with `mapper`.
pub fn checked<S, F, E, E2>(origin: S, mapper: F) -> Checked<S, F>
where
    S: Scalar<Error = Fault<E>>,
    E: From<Cancelled>,
    F: Fn(E) -> E2,
{
    Checked::new(origin, mapper)
}

/// A [`Checked`] that turns every declared failure into an [`io::Error`].
///
/// Declared failures that already are `io::Error`s are returned as they
/// are; anything else becomes an `io::Error` of kind
/// [`io::ErrorKind::Other`] whose inner error is the original failure.
///
/// # Example
///
/// ```rust
/// use brook::scalar::{from_fn, io_checked, Fault, Scalar};
/// use std::io;
///
/// let scalar = io_checked(from_fn(|| -> Result<(), Fault<io::Error>> {
///     Err(io::Error::new(io::ErrorKind::TimedOut, "slow disk").into())
/// }));
///
/// let err = scalar.value().unwrap_err().into_checked().unwrap();
/// assert_eq!(err.kind(), io::ErrorKind::TimedOut);
/// ```
pub fn io_checked<S, E>(origin: S) -> Checked<S, fn(E) -> io::Error>
where
    S: Scalar<Error = Fault<E>>,
    E: StdError + Send + Sync + From<Cancelled> + 'static,
{
    Checked::new(origin, into_io_error::<E> as fn(E) -> io::Error)
}

fn into_io_error<E>(error: E) -> io::Error
where
    E: StdError + Send + Sync + 'static,
{
    let boxed: Box<dyn StdError + Send + Sync> = Box::new(error);
    match boxed.downcast::<io::Error>() {
        Ok(io_error) => *io_error,
        Err(other) => io::Error::other(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{from_fn, CancelToken, Defect, ScalarExt};
    use std::cell::Cell;
    use std::fmt;

    #[derive(Debug)]
    struct Wrapped {
        cause: Option<io::Error>,
    }

    impl Wrapped {
        fn with_cause(cause: io::Error) -> Self {
            Wrapped { cause: Some(cause) }
        }

        fn without_cause(_: io::Error) -> Self {
            Wrapped { cause: None }
        }
    }

    impl fmt::Display for Wrapped {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "wrapped")
        }
    }

    impl StdError for Wrapped {
        fn source(&self) -> Option<&(dyn StdError + 'static)> {
            self.cause.as_ref().map(|e| e as &(dyn StdError + 'static))
        }
    }

    #[derive(Debug, PartialEq)]
    struct Bug;

    impl fmt::Display for Bug {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "illegal state")
        }
    }

    impl StdError for Bug {}

    fn failing(kind: io::ErrorKind) -> impl Scalar<Output = i32, Error = Fault<io::Error>> {
        from_fn(move || -> Result<i32, Fault<io::Error>> {
            Err(Fault::Checked(io::Error::new(kind, "boom")))
        })
    }

    #[test]
    fn test_success_passes_through() {
        let scalar = from_fn(|| Ok::<_, Fault<io::Error>>(7)).checked(Wrapped::with_cause);
        assert_eq!(scalar.value().unwrap(), 7);
    }

    #[test]
    fn test_checked_failure_is_mapped_with_cause() {
        let scalar = failing(io::ErrorKind::NotFound).checked(Wrapped::with_cause);

        let err = scalar.value().unwrap_err().into_checked().unwrap();
        let cause = err.source().unwrap().downcast_ref::<io::Error>().unwrap();
        assert_eq!(cause.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_mapper_may_drop_cause() {
        let scalar = failing(io::ErrorKind::NotFound).checked(Wrapped::without_cause);

        let err = scalar.value().unwrap_err().into_checked().unwrap();
        assert!(err.source().is_none());
    }

    #[test]
    fn test_defect_passes_through_unmapped() {
        let mapped = Cell::new(false);
        let scalar = checked(
            from_fn(|| -> Result<i32, Fault<io::Error>> { Err(Fault::defect(Bug)) }),
            |e: io::Error| {
                mapped.set(true);
                Wrapped::with_cause(e)
            },
        );

        let fault = scalar.value().unwrap_err();

        assert!(!mapped.get());
        let defect: &Defect = fault.defect_ref().unwrap();
        assert_eq!(defect.downcast_ref::<Bug>(), Some(&Bug));
        assert!(defect.source().is_none());
    }

    #[test]
    fn test_cancellation_is_mapped_and_rearmed() {
        let token = CancelToken::new();
        token.cancel();
        let scalar = from_fn(|| -> Result<i32, Fault<io::Error>> {
            token.checkpoint().map_err(Fault::Cancelled)?;
            Ok(1)
        })
        .checked(Wrapped::with_cause);

        let err = scalar.value().unwrap_err().into_checked().unwrap();

        assert!(token.is_cancelled());
        let cause = err.source().unwrap().downcast_ref::<io::Error>().unwrap();
        assert_eq!(cause.kind(), io::ErrorKind::Other);
        assert!(Cancelled::carried_by(cause).is_some());
    }

    #[test]
    fn test_every_value_call_reevaluates() {
        let calls = Cell::new(0);
        let scalar = from_fn(|| {
            calls.set(calls.get() + 1);
            Err::<i32, _>(Fault::Checked(io::Error::new(io::ErrorKind::Other, "again")))
        })
        .checked(Wrapped::with_cause);

        let _ = scalar.value();
        let _ = scalar.value();

        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_nested_checked_keeps_defect_identity() {
        let inner = from_fn(|| -> Result<(), Fault<io::Error>> { Err(Fault::defect(Bug)) })
            .checked(|e: io::Error| io::Error::new(io::ErrorKind::Other, e));
        let outer = inner.checked(Wrapped::with_cause);

        let fault = outer.value().unwrap_err();
        assert!(fault.defect_ref().unwrap().downcast_ref::<Bug>().is_some());
    }

    #[test]
    fn test_io_checked_keeps_io_errors() {
        let scalar = io_checked(failing(io::ErrorKind::PermissionDenied));

        let err = scalar.value().unwrap_err().into_checked().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_io_checked_wraps_foreign_errors() {
        #[derive(Debug)]
        struct Parse;

        impl fmt::Display for Parse {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "parse failed")
            }
        }

        impl StdError for Parse {}

        impl From<Cancelled> for Parse {
            fn from(_: Cancelled) -> Self {
                Parse
            }
        }

        let scalar = io_checked(from_fn(|| -> Result<(), Fault<Parse>> { Err(Parse.into()) }));

        let err = scalar.value().unwrap_err().into_checked().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(err.get_ref().unwrap().is::<Parse>());
    }

    #[cfg(feature = "tracing")]
    mod tracing_tests {
        use super::*;
        use tracing_test::traced_test;

        #[test]
        #[traced_test]
        fn test_logs_defect_passthrough() {
            let scalar = from_fn(|| -> Result<(), Fault<io::Error>> { Err(Fault::defect(Bug)) })
                .checked(Wrapped::with_cause);
            let _ = scalar.value();

            assert!(logs_contain("defect passed through unmapped"));
        }
    }
}
