use std::fmt;
use std::sync::Arc;

use super::circuit_breaker::CircuitBreaker;
use super::failure_checker::{AnyError, FailureChecker};
use super::storage::{InMemoryStorage, Storage};

/// Failure threshold used when none is configured.
pub const DEFAULT_FAILURE_THRESHOLD: u64 = 100;

/// A `CircuitBreaker`'s configuration.
pub struct Config<R, E, S = InMemoryStorage> {
    pub(crate) storage: S,
    pub(crate) failure_threshold: u64,
    pub(crate) failure_checker: Arc<dyn FailureChecker<R, E> + Send + Sync>,
}

impl<R, E> Config<R, E, InMemoryStorage>
where
    R: 'static,
    E: 'static,
{
    /// Creates a circuit breaker's default configuration: a fresh in-memory
    /// storage, the [`AnyError`] checker and [`DEFAULT_FAILURE_THRESHOLD`].
    pub fn new() -> Self {
        Config {
            storage: InMemoryStorage::new(),
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            failure_checker: Arc::new(AnyError),
        }
    }
}

impl<R, E> Default for Config<R, E, InMemoryStorage>
where
    R: 'static,
    E: 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<R, E, S> Config<R, E, S> {
    /// Configures the storage backend.
    ///
    /// Pass an `Arc<InMemoryStorage>` (or a reference) to share one counter
    /// between several circuit breakers.
    pub fn storage<T>(self, storage: T) -> Config<R, E, T>
    where
        T: Storage,
    {
        Config {
            storage,
            failure_threshold: self.failure_threshold,
            failure_checker: self.failure_checker,
        }
    }

    /// Configures the initial failure checker.
    pub fn failure_checker<C>(mut self, failure_checker: C) -> Self
    where
        C: FailureChecker<R, E> + Send + Sync + 'static,
    {
        self.failure_checker = Arc::new(failure_checker);
        self
    }

    /// Configures the failure threshold; calls are rejected once the recorded
    /// failure count exceeds it.
    pub fn failure_threshold(mut self, failure_threshold: u64) -> Self {
        self.failure_threshold = failure_threshold;
        self
    }

    /// Builds a new circuit breaker instance.
    pub fn build(self) -> CircuitBreaker<R, E, S>
    where
        S: Storage,
    {
        CircuitBreaker::new(self.storage, self.failure_threshold, self.failure_checker)
    }
}

impl<R, E, S> fmt::Debug for Config<R, E, S>
where
    S: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Config")
            .field("storage", &self.storage)
            .field("failure_threshold", &self.failure_threshold)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_threshold_is_100() {
        let config: Config<(), ()> = Config::new();

        assert_eq!(100, config.failure_threshold);
    }

    #[test]
    fn threshold_is_configurable() {
        let config: Config<(), ()> = Config::new().failure_threshold(3);

        assert_eq!(3, config.failure_threshold);
    }
}
