//! Request slots and cancellation scopes.
//!
//! A [`Scope`] is owned by one screen. Every request that screen issues gets a
//! child token of the scope, so cancelling the scope on teardown cancels all of
//! its outstanding work at once.
//!
//! A [`RequestSlot`] admits at most one request at a time. Checking "is anything
//! in flight" and marking the new request as in flight happen in the same
//! `&mut self` call, so two triggers landing in the same tick cannot both pass the
//! guard. Completions carry the [`Ticket`] they were issued with; a completion
//! whose ticket no longer matches the slot is stale and must be ignored.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

/// Process-wide so that tickets from a torn-down screen can never collide with
/// tickets from the screen that replaced it.
static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn next() -> Self {
        Ticket(NEXT_TICKET.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

/// A request that has been admitted and is ready to be sent.
///
/// `query` is whatever the API call needs; `token` must be honoured by whoever
/// performs the call (see [`bind`]).
#[derive(Debug, Clone)]
pub struct Request<Q> {
    pub ticket: Ticket,
    pub token: CancellationToken,
    pub query: Q,
}

impl<Q> Request<Q> {
    /// Issues a request outside of any slot, e.g. a comment submission.
    pub fn detached(scope: &Scope, query: Q) -> Self {
        Self { ticket: Ticket::next(), token: scope.child(), query }
    }
}

/// Cancellation boundary tied to a screen's lifetime.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    token: CancellationToken,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Cancels every request issued under this scope. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug)]
struct InFlight {
    ticket: Ticket,
    token: CancellationToken,
}

/// Single-request-in-flight gate.
#[derive(Debug, Default)]
pub struct RequestSlot {
    in_flight: Option<InFlight>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Admits a new request unless one is already in flight or the scope is gone.
    pub fn try_begin<Q>(&mut self, scope: &Scope, query: Q) -> Option<Request<Q>> {
        if self.in_flight.is_some() || scope.is_cancelled() {
            return None;
        }
        Some(self.admit(scope, query))
    }

    /// Cancels whatever is in flight and admits `query` in its place. Used where
    /// the latest request wins (search navigation, autocomplete).
    pub fn supersede<Q>(&mut self, scope: &Scope, query: Q) -> Request<Q> {
        self.reset();
        self.admit(scope, query)
    }

    /// Releases the slot if `ticket` is the request currently holding it.
    ///
    /// Returns `false` for stale tickets; the caller must then discard the
    /// completion without touching state.
    pub fn finish(&mut self, ticket: Ticket) -> bool {
        match &self.in_flight {
            Some(current) if current.ticket == ticket => {
                self.in_flight = None;
                true
            }
            _ => false,
        }
    }

    /// Cancels the in-flight request, if any, and frees the slot.
    pub fn reset(&mut self) {
        if let Some(current) = self.in_flight.take() {
            current.token.cancel();
        }
    }

    fn admit<Q>(&mut self, scope: &Scope, query: Q) -> Request<Q> {
        let ticket = Ticket::next();
        let token = scope.child();
        self.in_flight = Some(InFlight { ticket, token: token.clone() });
        Request { ticket, token, query }
    }
}

/// Runs `fut` until it completes or `token` is cancelled, whichever comes first.
///
/// Cancellation wins ties so that nothing is reported after teardown.
pub async fn bind<T, F>(token: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Error::Cancelled),
        result = fut => {
            if token.is_cancelled() {
                Err(Error::Cancelled)
            } else {
                result
            }
        }
    }
}
