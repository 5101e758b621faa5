//! A threshold circuit breaker for guarding remote calls.
//!
//! `CircuitBreaker` wraps a potentially-failing operation, typically an HTTP
//! request, and fails fast once recorded failures exceed a fixed threshold,
//! protecting callers and the downstream service from cascading overload.
//! The breaker never stores a state field; it derives `closed`, `open` or
//! `half_open` on every read from a single failure counter held in a
//! pluggable [`Storage`] backend. Which outcomes count as failures is decided
//! by a pluggable [`FailureChecker`].
//!
//! See https://martinfowler.com/bliki/CircuitBreaker.html
//!
//! # Example
//!
//! ```
//! use tripswitch::{CircuitBreaker, Error};
//!
//! // In-memory storage, default failure threshold (100), and the default
//! // checker: any error outcome counts as a failure.
//! let circuit_breaker: CircuitBreaker<&str, &str> = CircuitBreaker::default();
//!
//! assert_eq!("pong", circuit_breaker.call(|| Ok("pong")).unwrap());
//!
//! // The wrapped call's own error propagates unchanged after bookkeeping.
//! match circuit_breaker.call(|| Err("downstream unavailable")) {
//!     Err(Error::Inner(msg)) => assert_eq!("downstream unavailable", msg),
//!     x => unreachable!("{:?}", x),
//! }
//! ```
//!
//! With the `http-transport` feature (enabled by default), the
//! [`transport`] module routes an HTTP transport's send path through a
//! breaker, counting connection failures and 5xx responses as failures and
//! everything else, 4xx included, as successes.

#![deny(missing_debug_implementations)]
#![deny(missing_docs)]
#![cfg_attr(test, deny(warnings))]

mod circuit_breaker;
mod clock;
mod config;
mod error;
mod failure_checker;
mod storage;

#[cfg(feature = "http-transport")]
pub mod transport;

pub use self::circuit_breaker::{CircuitBreaker, State};
pub use self::config::{Config, DEFAULT_FAILURE_THRESHOLD};
pub use self::error::Error;
pub use self::failure_checker::{AnyError, FailureChecker};
pub use self::storage::{FailureCounter, InMemoryStorage, Storage};
