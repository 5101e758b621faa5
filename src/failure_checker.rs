/// Evaluates whether a call outcome counts as a failure and thus increments
/// the failure counter.
///
/// A checker must be a pure predicate over the outcome; it is consulted once
/// per executed call, after the wrapped operation has finished.
pub trait FailureChecker<R, E> {
    /// Must return `true` if the outcome should be recorded as a failure,
    /// otherwise it must return `false`.
    fn is_failure(&self, outcome: &Result<R, E>) -> bool;
}

impl<R, E, F> FailureChecker<R, E> for F
where
    F: Fn(&Result<R, E>) -> bool,
{
    fn is_failure(&self, outcome: &Result<R, E>) -> bool {
        self(outcome)
    }
}

/// The default checker: any error outcome is a failure, any success value is
/// a success.
#[derive(Debug)]
pub struct AnyError;

impl<R, E> FailureChecker<R, E> for AnyError {
    fn is_failure(&self, outcome: &Result<R, E>) -> bool {
        outcome.is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn use_func_as_failure_checker() {
        fn is_failure(outcome: &Result<(), bool>) -> bool {
            matches!(outcome, Err(true))
        }

        assert!(FailureChecker::is_failure(&is_failure, &Err(true)));
        assert!(!FailureChecker::is_failure(&is_failure, &Err(false)));
        assert!(!FailureChecker::is_failure(&is_failure, &Ok(())));
    }

    #[test]
    fn any_error_classifies_by_tag() {
        assert!(AnyError.is_failure(&Err::<(), _>(())));
        assert!(!AnyError.is_failure(&Ok::<_, ()>(())));
    }
}
