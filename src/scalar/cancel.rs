//! Cooperative cancellation.
//!
//! A [`CancelToken`] is a shared flag. A supervisor calls
//! [`CancelToken::cancel`]; the computation polls
//! [`CancelToken::checkpoint`] at points where stopping is safe. Observing
//! the signal consumes it, so whoever turns it into a failure and hands
//! that failure to an outer layer must re-arm it with
//! [`Cancelled::restore`]. [`Checked`](super::Checked) does this itself, and
//! so does the conversion into [`io::Error`].
//!
//! A cancellation carried by an `io::Error` has kind
//! [`io::ErrorKind::Other`], never `Interrupted`, so read loops that retry
//! interrupted reads do not swallow it.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable cancellation flag.
///
/// Clones share state, so a token can be handed to a computation while the
/// caller keeps a handle to cancel it.
///
/// # Example
///
/// ```rust
/// use brook::scalar::CancelToken;
///
/// let token = CancelToken::new();
/// assert!(token.checkpoint().is_ok());
///
/// token.cancel();
/// let cancelled = token.checkpoint().unwrap_err();
/// assert!(!token.is_cancelled()); // consumed
///
/// cancelled.restore();
/// assert!(token.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        CancelToken::default()
    }

    /// Requests cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Returns true while cancellation is pending.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Consumes a pending cancellation.
    ///
    /// Returns `Err(Cancelled)` if cancellation was requested, clearing the
    /// flag; `Ok(())` otherwise.
    pub fn checkpoint(&self) -> Result<(), Cancelled> {
        if self.cancelled.swap(false, Ordering::SeqCst) {
            return Err(Cancelled {
                token: self.clone(),
            });
        }
        Ok(())
    }

    /// Returns true if both handles share the same flag.
    pub fn same_as(&self, other: &CancelToken) -> bool {
        Arc::ptr_eq(&self.cancelled, &other.cancelled)
    }
}

/// A consumed cancellation signal.
#[derive(Debug, Clone)]
pub struct Cancelled {
    token: CancelToken,
}

impl Cancelled {
    /// The token the signal was observed on.
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    /// Re-arms the originating token so outer layers still see the request.
    pub fn restore(&self) {
        self.token.cancel();
    }

    /// The cancellation wrapped in `error`, if it carries one.
    pub fn carried_by(error: &io::Error) -> Option<&Cancelled> {
        error.get_ref().and_then(|inner| inner.downcast_ref::<Cancelled>())
    }
}

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "evaluation cancelled")
    }
}

impl StdError for Cancelled {}

/// Re-arms the token and wraps the signal in an error of kind
/// [`io::ErrorKind::Other`].
impl From<Cancelled> for io::Error {
    fn from(cancelled: Cancelled) -> Self {
        cancelled.restore();
        io::Error::other(cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkpoint_passes_when_not_cancelled() {
        let token = CancelToken::new();
        assert!(token.checkpoint().is_ok());
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_clones_share_the_flag() {
        let token = CancelToken::new();
        let handle = token.clone();

        handle.cancel();

        assert!(token.is_cancelled());
        assert!(token.same_as(&handle));
        assert!(!token.same_as(&CancelToken::new()));
    }

    #[test]
    fn test_checkpoint_consumes_and_restore_rearms() {
        let token = CancelToken::new();
        token.cancel();

        let cancelled = token.checkpoint().unwrap_err();
        assert!(!token.is_cancelled());
        assert!(cancelled.token().same_as(&token));

        cancelled.restore();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_io_error_conversion_rearms_and_is_not_retryable() {
        let token = CancelToken::new();
        token.cancel();
        let err: io::Error = token.checkpoint().unwrap_err().into();

        assert!(token.is_cancelled());
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(Cancelled::carried_by(&err).unwrap().token().same_as(&token));
    }

    #[test]
    fn test_carried_by_ignores_other_errors() {
        let err = io::Error::new(io::ErrorKind::Interrupted, "signal");
        assert!(Cancelled::carried_by(&err).is_none());
        assert!(Cancelled::carried_by(&io::Error::from(io::ErrorKind::Other)).is_none());
    }
}
