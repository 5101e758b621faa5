//! HTTP transport integration.
//!
//! [`TransportAdapter`] sits on a transport's send path and routes every send
//! through a [`CircuitBreaker`], installing a failure checker with HTTP
//! semantics first: a connection-level failure or a 5xx response counts as a
//! failure, everything else, 4xx responses included, counts as a success for
//! breaker purposes.

use std::fmt;
use std::marker::PhantomData;

use http::Response;

use super::circuit_breaker::CircuitBreaker;
use super::error::Error;
use super::failure_checker::FailureChecker;
use super::storage::{InMemoryStorage, Storage};

/// A transport performing the actual network send.
///
/// The circuit breaker treats `send` as an opaque operation; connection
/// pooling, TLS and timeouts all belong to the implementation.
pub trait Transport {
    /// The request value handed to [`send`](Transport::send).
    type Request;
    /// The response body type.
    type Body;
    /// The transport's own error type.
    type Error;

    /// Performs the network send.
    fn send(&self, request: Self::Request) -> Result<Response<Self::Body>, Self::Error>;

    /// Returns `true` when `err` is a connection-level failure, as opposed to
    /// an error that says nothing about downstream health.
    fn is_connection_error(err: &Self::Error) -> bool;
}

/// The failure checker a [`TransportAdapter`] installs before each send.
///
/// Classifies connection-level failures and responses with a status code of
/// 500 or above as failures; any other outcome is a success.
pub struct ServerFailure<T>(PhantomData<fn() -> T>);

impl<T> ServerFailure<T> {
    /// Creates the checker.
    pub fn new() -> Self {
        ServerFailure(PhantomData)
    }
}

impl<T> Default for ServerFailure<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FailureChecker<Response<T::Body>, T::Error> for ServerFailure<T>
where
    T: Transport,
{
    fn is_failure(&self, outcome: &Result<Response<T::Body>, T::Error>) -> bool {
        match outcome {
            Ok(response) => response.status().is_server_error(),
            Err(err) => T::is_connection_error(err),
        }
    }
}

impl<T> fmt::Debug for ServerFailure<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("ServerFailure")
    }
}

/// Binds a [`CircuitBreaker`] to a transport's send operation.
///
/// The adapter owns nothing besides the transport and the breaker; it
/// re-installs [`ServerFailure`] on the breaker before every send, so sharing
/// the breaker with callers that need a different checker is a last-writer-wins
/// race.
#[derive(Debug)]
pub struct TransportAdapter<T, S = InMemoryStorage>
where
    T: Transport,
{
    transport: T,
    circuit_breaker: CircuitBreaker<Response<T::Body>, T::Error, S>,
}

impl<T, S> TransportAdapter<T, S>
where
    T: Transport + 'static,
    T::Body: 'static,
    T::Error: 'static,
    S: Storage,
{
    /// Creates an adapter routing `transport`'s sends through
    /// `circuit_breaker`.
    pub fn new(
        transport: T,
        circuit_breaker: CircuitBreaker<Response<T::Body>, T::Error, S>,
    ) -> Self {
        Self {
            transport,
            circuit_breaker,
        }
    }

    /// Sends `request` within the circuit breaker.
    ///
    /// When the breaker is open the transport is never reached and
    /// [`Error::Rejected`] comes back immediately. A transport error
    /// propagates unchanged as [`Error::Inner`]; a 5xx response is still
    /// returned to the caller as a success value, only the breaker records it
    /// as a failure.
    pub fn send(&self, request: T::Request) -> Result<Response<T::Body>, Error<T::Error>> {
        self.circuit_breaker
            .add_failure_checker(ServerFailure::<T>::new());
        self.circuit_breaker.call(|| self.transport.send(request))
    }

    /// Returns the adapter's circuit breaker.
    pub fn circuit_breaker(&self) -> &CircuitBreaker<Response<T::Body>, T::Error, S> {
        &self.circuit_breaker
    }
}
