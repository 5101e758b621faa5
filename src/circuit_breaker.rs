use std::fmt::{self, Display};
use std::sync::Arc;

use parking_lot::RwLock;

use super::clock;
use super::config::Config;
use super::error::Error;
use super::failure_checker::FailureChecker;
use super::storage::{InMemoryStorage, Storage};

type SharedChecker<R, E> = Arc<dyn FailureChecker<R, E> + Send + Sync>;

/// Observable states of a circuit breaker.
///
/// The state is never stored; it is derived from the failure counter, the
/// configured threshold and the clock on every read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    /// The downstream is considered healthy and calls are allowed.
    Closed,
    /// The failure threshold is exceeded; calls are rejected without reaching
    /// the downstream.
    Open,
    /// Transitional: the failure threshold is exceeded but the last failure
    /// is stamped at or after the observation instant, so a call may still be
    /// tentatively allowed.
    HalfOpen,
}

impl State {
    /// Returns a string value for the state identifier.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            State::Open => "open",
            State::Closed => "closed",
            State::HalfOpen => "half_open",
        }
    }
}

impl Display for State {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}

/// A circuit breaker guarding calls whose outcome is `Result<R, E>`.
///
/// The breaker owns no state machine. It holds a [`Storage`] with a single
/// failure counter and derives its [`State`] from a counter snapshot: a count
/// at or below the threshold is `Closed`; above the threshold the breaker is
/// `HalfOpen` while the last failure is stamped at or after the current
/// instant and `Open` otherwise. With a live clock the failure stamp is in
/// the past by the time it is compared, so `Open` is the state an
/// above-threshold breaker reports in practice; there is no cool-down
/// duration after which calls resume on their own, only [`reset`] closes the
/// breaker again.
///
/// Cloning is cheap and clones share the same storage and failure checker.
///
/// [`reset`]: CircuitBreaker::reset
pub struct CircuitBreaker<R, E, S = InMemoryStorage> {
    shared: Arc<Shared<R, E, S>>,
}

struct Shared<R, E, S> {
    storage: S,
    failure_threshold: u64,
    failure_checker: RwLock<SharedChecker<R, E>>,
}

impl<R, E> CircuitBreaker<R, E>
where
    R: 'static,
    E: 'static,
{
    /// Returns a circuit breaker's builder.
    pub fn builder() -> Config<R, E, InMemoryStorage> {
        Config::new()
    }
}

impl<R, E> Default for CircuitBreaker<R, E>
where
    R: 'static,
    E: 'static,
{
    fn default() -> Self {
        CircuitBreaker::builder().build()
    }
}

impl<R, E, S> CircuitBreaker<R, E, S>
where
    S: Storage,
{
    pub(crate) fn new(
        storage: S,
        failure_threshold: u64,
        failure_checker: SharedChecker<R, E>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                storage,
                failure_threshold,
                failure_checker: RwLock::new(failure_checker),
            }),
        }
    }

    /// Derives the current state from a storage snapshot and the clock.
    pub fn state(&self) -> State {
        let counter = self.shared.storage.failure_counter();

        if counter.total_failures > self.shared.failure_threshold {
            match counter.last_failure_time {
                Some(at) if at >= clock::now() => State::HalfOpen,
                _ => State::Open,
            }
        } else {
            State::Closed
        }
    }

    /// Requests permission to call.
    ///
    /// It returns `true` if a call is allowed, or `false` if prohibited.
    #[inline]
    pub fn is_call_permitted(&self) -> bool {
        self.state() != State::Open
    }

    /// Returns the circuit breaker to its closed state, losing failure
    /// statistics.
    #[inline]
    pub fn reset(&self) {
        self.shared.storage.reset_counter();
    }

    /// Records a failed call.
    #[inline]
    pub fn record_failure(&self) {
        self.shared.storage.increment_counter();
    }

    /// Replaces the active failure checker.
    ///
    /// Takes effect for subsequent calls only. Concurrent replacement is
    /// last-writer-wins; no ordering guarantee is provided.
    pub fn add_failure_checker<C>(&self, failure_checker: C)
    where
        C: FailureChecker<R, E> + Send + Sync + 'static,
    {
        *self.shared.failure_checker.write() = Arc::new(failure_checker);
    }

    /// Executes a given function within the circuit breaker.
    ///
    /// When the breaker is open the call is rejected with [`Error::Rejected`]
    /// and `f` is never invoked. Otherwise `f` runs, its whole outcome is
    /// classified by the active failure checker, and exactly one piece of
    /// bookkeeping happens before control returns: a failure increments the
    /// counter, anything else resets it. The wrapped call's own error then
    /// surfaces unchanged as [`Error::Inner`]; the breaker never retries and
    /// never masks it.
    pub fn call<F>(&self, f: F) -> Result<R, Error<E>>
    where
        F: FnOnce() -> Result<R, E>,
    {
        if self.state() == State::Open {
            return Err(Error::Rejected);
        }

        let outcome = f();

        if self.shared.failure_checker.read().is_failure(&outcome) {
            self.record_failure();
        } else {
            self.reset();
        }

        match outcome {
            Ok(value) => Ok(value),
            Err(err) => Err(Error::Inner(err)),
        }
    }
}

impl<R, E, S> Clone for CircuitBreaker<R, E, S> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<R, E, S> fmt::Debug for CircuitBreaker<R, E, S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("storage", &self.shared.storage)
            .field("failure_threshold", &self.shared.failure_threshold)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::super::storage::FailureCounter;
    use super::*;

    #[test]
    fn closed_while_at_or_below_threshold() {
        let circuit_breaker = new_circuit_breaker(3);

        for _ in 0..3 {
            circuit_breaker.record_failure();
            assert_eq!(State::Closed, circuit_breaker.state());
            assert!(circuit_breaker.is_call_permitted());
        }
    }

    #[test]
    fn open_once_threshold_is_exceeded() {
        let circuit_breaker = new_circuit_breaker(3);

        for _ in 0..4 {
            circuit_breaker.record_failure();
        }

        // Let the failure stamp fall into the past, the breaker is then open
        // rather than half open.
        thread::sleep(Duration::from_millis(1));
        assert_eq!(State::Open, circuit_breaker.state());
        assert!(!circuit_breaker.is_call_permitted());
    }

    #[test]
    fn half_open_while_failure_stamp_has_not_passed() {
        clock::freeze(|time| {
            let circuit_breaker = new_circuit_breaker(1);

            circuit_breaker.record_failure();
            circuit_breaker.record_failure();

            // Under a frozen clock the failure stamp equals "now".
            assert_eq!(State::HalfOpen, circuit_breaker.state());
            assert!(circuit_breaker.is_call_permitted());

            time.advance(Duration::from_millis(1));
            assert_eq!(State::Open, circuit_breaker.state());
        });
    }

    #[test]
    fn reset_returns_to_closed() {
        let storage = Arc::new(InMemoryStorage::new());
        let circuit_breaker = CircuitBreaker::<(), ()>::builder()
            .storage(Arc::clone(&storage))
            .failure_threshold(1)
            .build();

        circuit_breaker.record_failure();
        circuit_breaker.record_failure();
        thread::sleep(Duration::from_millis(1));
        assert_eq!(State::Open, circuit_breaker.state());

        circuit_breaker.reset();

        assert_eq!(State::Closed, circuit_breaker.state());
        assert_eq!(FailureCounter::default(), storage.failure_counter());
    }

    #[test]
    fn open_breaker_never_invokes_the_operation() {
        let circuit_breaker = new_circuit_breaker(0);
        let invocations = AtomicUsize::new(0);

        circuit_breaker.record_failure();
        thread::sleep(Duration::from_millis(1));

        match circuit_breaker.call(|| {
            invocations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }) {
            Err(Error::Rejected) => {}
            x => unreachable!("{:?}", x),
        }
        assert_eq!(0, invocations.load(Ordering::SeqCst));
    }

    #[test]
    fn success_resets_prior_failures() {
        let storage = Arc::new(InMemoryStorage::new());
        let circuit_breaker = CircuitBreaker::<(), ()>::builder()
            .storage(Arc::clone(&storage))
            .build();

        circuit_breaker.record_failure();
        circuit_breaker.record_failure();

        circuit_breaker.call(|| Ok(())).unwrap();

        assert_eq!(0, storage.failure_counter().total_failures);
    }

    #[test]
    fn error_propagates_unchanged_after_bookkeeping() {
        let storage = Arc::new(InMemoryStorage::new());
        let circuit_breaker = CircuitBreaker::<(), &str>::builder()
            .storage(Arc::clone(&storage))
            .build();

        match circuit_breaker.call(|| Err("boom")) {
            Err(Error::Inner("boom")) => {}
            x => unreachable!("{:?}", x),
        }
        assert_eq!(1, storage.failure_counter().total_failures);
    }

    #[test]
    fn replaced_checker_takes_effect_for_subsequent_calls() {
        let storage = Arc::new(InMemoryStorage::new());
        let circuit_breaker = CircuitBreaker::<(), bool>::builder()
            .storage(Arc::clone(&storage))
            .build();

        // Only `Err(true)` counts as a failure from now on.
        circuit_breaker.add_failure_checker(|outcome: &Result<(), bool>| {
            matches!(outcome, Err(true))
        });

        match circuit_breaker.call(|| Err(false)) {
            Err(Error::Inner(false)) => {}
            x => unreachable!("{:?}", x),
        }
        assert_eq!(0, storage.failure_counter().total_failures);

        match circuit_breaker.call(|| Err(true)) {
            Err(Error::Inner(true)) => {}
            x => unreachable!("{:?}", x),
        }
        assert_eq!(1, storage.failure_counter().total_failures);
    }

    #[test]
    fn state_display() {
        assert_eq!("closed", State::Closed.to_string());
        assert_eq!("open", State::Open.to_string());
        assert_eq!("half_open", State::HalfOpen.to_string());
    }

    fn new_circuit_breaker(failure_threshold: u64) -> CircuitBreaker<(), ()> {
        CircuitBreaker::builder()
            .failure_threshold(failure_threshold)
            .build()
    }
}
