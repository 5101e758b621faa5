use std::time::Instant;

#[cfg(test)]
use std::cell::Cell;
#[cfg(test)]
use std::time::Duration;

#[cfg(test)]
thread_local!(static FROZEN: Cell<Option<Instant>> = Cell::new(None));

/// Returns the current instant, honoring a frozen clock within `freeze`.
#[cfg(test)]
pub fn now() -> Instant {
    FROZEN.with(|cell| match cell.get() {
        Some(frozen) => frozen,
        None => Instant::now(),
    })
}

#[cfg(not(test))]
#[inline]
pub fn now() -> Instant {
    Instant::now()
}

/// Handle to a frozen clock; time moves only through `advance`.
#[cfg(test)]
#[derive(Debug)]
pub struct FrozenClock {
    _priv: (),
}

#[cfg(test)]
impl FrozenClock {
    pub fn advance(&mut self, diff: Duration) {
        FROZEN.with(|cell| {
            let frozen = cell.get().expect("clock is not frozen");
            cell.set(Some(frozen + diff));
        });
    }
}

/// Freezes the clock for the current thread while `f` runs.
#[cfg(test)]
pub fn freeze<F, R>(f: F) -> R
where
    F: FnOnce(&mut FrozenClock) -> R,
{
    FROZEN.with(|cell| {
        assert!(cell.get().is_none(), "clock already frozen for this thread");

        // Ensure that the clock thaws when leaving the scope. This handles
        // cases that involve panicking.
        struct Reset<'a>(&'a Cell<Option<Instant>>);

        impl<'a> Drop for Reset<'a> {
            fn drop(&mut self) {
                self.0.set(None);
            }
        }

        let _reset = Reset(cell);

        cell.set(Some(Instant::now()));

        f(&mut FrozenClock { _priv: () })
    })
}
