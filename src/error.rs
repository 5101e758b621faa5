use std::error::Error as StdError;
use std::fmt::{self, Display};

/// A `CircuitBreaker`'s error.
#[derive(Debug, PartialEq)]
pub enum Error<E> {
    /// An error from the wrapped call, propagated unchanged.
    Inner(E),
    /// The call was rejected without being executed because the circuit
    /// breaker is open.
    Rejected,
}

impl<E> Error<E> {
    /// Returns `true` when the call was denied before reaching the wrapped
    /// operation.
    pub fn is_rejected(&self) -> bool {
        match self {
            Error::Rejected => true,
            Error::Inner(_) => false,
        }
    }
}

impl<E> Display for Error<E>
where
    E: Display,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Rejected => write!(f, "call was rejected, circuit breaker is open"),
            Error::Inner(err) => write!(f, "{}", err),
        }
    }
}

impl<E> StdError for Error<E>
where
    E: StdError + 'static,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Inner(ref err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_is_rejected() {
        assert!(Error::<()>::Rejected.is_rejected());
        assert!(!Error::Inner(()).is_rejected());
    }

    #[test]
    fn inner_error_is_the_source() {
        let err: Error<fmt::Error> = Error::Inner(fmt::Error);
        assert!(err.source().is_some());
        assert!(Error::<fmt::Error>::Rejected.source().is_none());
    }
}
