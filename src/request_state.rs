/*!
 * Single-flight request tracking shared by the intake controller and the result session.
 */

use log::warn;
use parking_lot::Mutex;
use thiserror::Error;

/// Lifecycle of one kind of request issued by a controller
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    /// Nothing has been sent yet
    #[default]
    Idle,
    /// A request is outstanding
    InFlight,
    /// The last request completed successfully
    Succeeded,
    /// The last request failed with the given message
    Failed(String),
}

/// Returned when a request is started while another one is outstanding
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("a request is already in flight")]
pub struct AlreadyInFlight;

impl RequestState {
    /// Move to `InFlight`. Fails, without changing state, if a request is already outstanding.
    pub fn begin(&mut self) -> Result<(), AlreadyInFlight> {
        if self.is_in_flight() {
            return Err(AlreadyInFlight);
        }
        *self = Self::InFlight;
        Ok(())
    }

    /// Record success of the outstanding request. Returns false if nothing was in flight.
    pub fn succeed(&mut self) -> bool {
        self.finish(Self::Succeeded)
    }

    /// Record failure of the outstanding request. Returns false if nothing was in flight.
    pub fn fail(&mut self, reason: impl Into<String>) -> bool {
        self.finish(Self::Failed(reason.into()))
    }

    fn finish(&mut self, next: Self) -> bool {
        if !self.is_in_flight() {
            return false;
        }
        *self = next;
        true
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight)
    }

    /// Failure message of the last request, if it failed
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Held across the `.await` of an outstanding request.
///
/// If the request future is dropped before `disarm` is called, the guarded
/// `RequestState` leaves `InFlight` as `Failed(reason)` so the next request can start.
pub struct InFlightGuard<'a, T> {
    state: &'a Mutex<T>,
    request: fn(&mut T) -> &mut RequestState,
    reason: &'static str,
    armed: bool,
}

impl<'a, T> InFlightGuard<'a, T> {
    /// `request` selects the guarded `RequestState` inside the locked state
    pub fn new(state: &'a Mutex<T>, request: fn(&mut T) -> &mut RequestState, reason: &'static str) -> Self {
        Self {
            state,
            request,
            reason,
            armed: true,
        }
    }

    /// The request completed; its outcome is recorded by the caller.
    /// Must be called before the caller locks the state again.
    pub fn disarm(mut self) {
        self.armed = false;
    }
}

impl<T> Drop for InFlightGuard<'_, T> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.lock();
        if (self.request)(&mut state).fail(self.reason) {
            warn!("{}", self.reason);
        }
    }
}
