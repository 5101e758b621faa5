use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use super::clock;

/// A point-in-time snapshot of recorded failures.
///
/// The snapshot is a plain value; mutating it has no effect on the storage it
/// was read from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FailureCounter {
    /// Number of failures recorded since the last reset.
    pub total_failures: u64,
    /// When the most recent failure was recorded, if any.
    pub last_failure_time: Option<Instant>,
}

/// A backing store owning one `FailureCounter`.
///
/// Implementations must keep the counter consistent under concurrent callers:
/// no increment may be lost or double-counted, and a snapshot never observes
/// a half-applied update. These operations do not fail.
///
/// A backend may be process-local like [`InMemoryStorage`], or external (a
/// shared cache); the circuit breaker is agnostic.
pub trait Storage {
    /// Atomically increments `total_failures` by one and stamps the failure
    /// time with the current instant.
    fn increment_counter(&self);

    /// Atomically sets `total_failures` to zero and clears the failure time.
    fn reset_counter(&self);

    /// Returns a consistent snapshot of the counter.
    fn failure_counter(&self) -> FailureCounter;
}

impl<'a, T> Storage for &'a T
where
    T: Storage + ?Sized,
{
    fn increment_counter(&self) {
        (**self).increment_counter()
    }

    fn reset_counter(&self) {
        (**self).reset_counter()
    }

    fn failure_counter(&self) -> FailureCounter {
        (**self).failure_counter()
    }
}

impl<T> Storage for Arc<T>
where
    T: Storage + ?Sized,
{
    fn increment_counter(&self) {
        (**self).increment_counter()
    }

    fn reset_counter(&self) {
        (**self).reset_counter()
    }

    fn failure_counter(&self) -> FailureCounter {
        (**self).failure_counter()
    }
}

/// Process-local storage backend over a mutex-guarded counter.
///
/// Share it between circuit breakers by wrapping it in an `Arc`; the counter
/// is reset in place, never recreated, so the storage identity is stable for
/// its whole lifetime.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    counter: Mutex<FailureCounter>,
}

impl InMemoryStorage {
    /// Creates a storage with a zeroed counter.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for InMemoryStorage {
    fn increment_counter(&self) {
        let mut counter = self.counter.lock();
        counter.total_failures += 1;
        counter.last_failure_time = Some(clock::now());
    }

    fn reset_counter(&self) {
        *self.counter.lock() = FailureCounter::default();
    }

    fn failure_counter(&self) -> FailureCounter {
        *self.counter.lock()
    }
}
