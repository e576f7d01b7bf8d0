//! Reservation gate arbitrating navigation-stack mutations between the native
//! platform and the script environment.
//!
//! The state machine is a single-slot semaphore made explicit:
//!
//! ```text
//!            request (script)            commit(top)
//!   Idle ───────────────────► Reserved ──────────────► Committing
//!    ▲  ▲                        │                        │
//!    │  └──── cancel / expire ───┘                        │
//!    │  └──────────── complete_commit / abort_commit ─────┘
//!    │
//!    └── finish / cancel native ── NativeTransition ◄── try_native (from Idle)
//! ```
//!
//! `abandon` resets any state to `Idle`. Every other transition is refused and
//! leaves the state untouched.

use crate::error::NavigationError;
use crate::telemetry::NavigatorCounters;
use core::time::Duration;
use log::{debug, warn};
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Which driver, if any, currently owns the right to mutate the stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ReservationState {
    /// Nobody holds the stack; native gestures are accepted immediately.
    Idle,
    /// The script holds the next stack mutation.
    Reserved,
    /// The reserved change is being applied to the platform stack.
    Committing,
    /// A native gesture was granted and is still in flight.
    NativeTransition,
}

impl Display for ReservationState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Reserved => "reserved",
            Self::Committing => "committing",
            Self::NativeTransition => "in a native transition",
        };
        f.write_str(name)
    }
}

/// Mutual-exclusion gate between native-gesture and script-origin stack changes.
///
/// Not internally synchronized. Own it from a single task (see
/// [`crate::actor::NavigatorActor`]) or wrap it in a `Mutex` when several threads
/// drive it.
#[derive(Debug)]
pub struct ReservationStateMachine {
    state: ReservationState,
    /// Index of the top the script asked for; only set while committing.
    requested_top: Option<usize>,
    /// Index of the top a granted native gesture is heading to.
    native_proposed_top: Option<usize>,
    reserved_at: Option<Instant>,
    timeout: Option<Duration>,
    counters: NavigatorCounters,
}

impl Default for ReservationStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReservationStateMachine {
    /// Create an idle state machine whose reservations never expire.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// Create an idle state machine that releases reservations held longer than `timeout`.
    #[inline]
    #[must_use]
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self {
            state: ReservationState::Idle,
            requested_top: None,
            native_proposed_top: None,
            reserved_at: None,
            timeout,
            counters: NavigatorCounters::default(),
        }
    }

    /// Current state.
    #[inline]
    pub const fn state(&self) -> ReservationState {
        self.state
    }

    /// Whether nobody holds the stack.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.state == ReservationState::Idle
    }

    /// The top being committed. `None` unless a commit is in progress.
    #[inline]
    pub const fn requested_top(&self) -> Option<usize> {
        self.requested_top
    }

    /// The top a granted native gesture proposed. `None` outside a native transition.
    #[inline]
    pub const fn native_proposed_top(&self) -> Option<usize> {
        self.native_proposed_top
    }

    /// Counters accumulated since creation.
    #[inline]
    pub const fn counters(&self) -> &NavigatorCounters {
        &self.counters
    }

    /// Try to reserve the next stack mutation for the script.
    ///
    /// Succeeds only from `Idle`. A `false` return is an ordinary denial; the script
    /// should drop its navigation intent.
    pub fn request_scheduling_script_navigation(&mut self) -> bool {
        self.expire_if_stale();
        if self.state != ReservationState::Idle {
            self.counters.reservations_denied = self.counters.reservations_denied.saturating_add(1);
            debug!("reservation denied while {}", self.state);
            return false;
        }
        self.state = ReservationState::Reserved;
        self.reserved_at = Some(Instant::now());
        self.counters.reservations_granted = self.counters.reservations_granted.saturating_add(1);
        debug!("reservation granted");
        true
    }

    /// Move a granted reservation into `Committing` with `new_top` as the target.
    ///
    /// Returns the top the host must now apply. The host reports the outcome with
    /// [`Self::complete_commit`] or [`Self::abort_commit`].
    ///
    /// # Errors
    /// Returns [`NavigationError::ProtocolViolation`] when no reservation is held; the
    /// state is left unchanged.
    pub fn commit_requested_top(&mut self, new_top: usize) -> Result<usize, NavigationError> {
        self.expire_if_stale();
        if self.state != ReservationState::Reserved {
            return Err(self.violation("commit_requested_top"));
        }
        self.state = ReservationState::Committing;
        self.requested_top = Some(new_top);
        self.reserved_at = None;
        debug!("committing top {new_top}");
        Ok(new_top)
    }

    /// Finish a commit after the platform applied it.
    ///
    /// # Errors
    /// Returns [`NavigationError::ProtocolViolation`] outside `Committing`.
    pub fn complete_commit(&mut self) -> Result<usize, NavigationError> {
        let top = self.leave_committing("complete_commit")?;
        self.counters.commits_applied = self.counters.commits_applied.saturating_add(1);
        Ok(top)
    }

    /// Return to `Idle` after the platform failed to apply a commit.
    ///
    /// # Errors
    /// Returns [`NavigationError::ProtocolViolation`] outside `Committing`.
    pub fn abort_commit(&mut self) -> Result<usize, NavigationError> {
        let top = self.leave_committing("abort_commit")?;
        self.counters.apply_failures = self.counters.apply_failures.saturating_add(1);
        Ok(top)
    }

    /// Ask whether the platform may change the stack on its own (for example, a back swipe).
    ///
    /// Granted from `Idle`, and again for the gesture already in flight. Denied while the
    /// script holds a reservation or a commit is in progress; the host must then revert
    /// the native change.
    pub fn try_native_stack_change(&mut self, proposed_top: usize) -> bool {
        self.expire_if_stale();
        match self.state {
            ReservationState::Idle | ReservationState::NativeTransition => {
                self.state = ReservationState::NativeTransition;
                self.native_proposed_top = Some(proposed_top);
                self.counters.native_granted = self.counters.native_granted.saturating_add(1);
                true
            }
            ReservationState::Reserved | ReservationState::Committing => {
                self.counters.native_denied = self.counters.native_denied.saturating_add(1);
                debug!("native change to {proposed_top} denied while {}", self.state);
                false
            }
        }
    }

    /// End a granted native gesture. Returns `false` (state untouched) if none was in flight.
    pub fn finish_native_change(&mut self) -> bool {
        if self.state != ReservationState::NativeTransition {
            return false;
        }
        self.state = ReservationState::Idle;
        self.native_proposed_top = None;
        true
    }

    /// Script-side release of a reservation that will not be committed.
    ///
    /// Returns `false` and leaves the state untouched unless it is `Reserved`.
    pub fn cancel_reservation(&mut self) -> bool {
        if self.state != ReservationState::Reserved {
            debug!("cancel ignored while {}", self.state);
            return false;
        }
        self.release();
        true
    }

    /// Force the machine back to `Idle` from any state, as on teardown.
    ///
    /// Returns the state that was abandoned, or `None` if it was already idle.
    pub fn abandon(&mut self) -> Option<ReservationState> {
        let previous = self.state;
        match previous {
            ReservationState::Idle => return None,
            ReservationState::Reserved | ReservationState::Committing => self.release(),
            ReservationState::NativeTransition => {
                self.state = ReservationState::Idle;
                self.native_proposed_top = None;
            }
        }
        warn!("abandoned navigator state while {previous}");
        Some(previous)
    }

    /// Release a reservation held longer than the configured timeout.
    ///
    /// Returns `true` if a reservation was released. Only `Reserved` expires; a commit in
    /// progress is always resolved by the host.
    pub fn expire_if_stale(&mut self) -> bool {
        let (Some(timeout), Some(reserved_at)) = (self.timeout, self.reserved_at) else {
            return false;
        };
        if self.state != ReservationState::Reserved || reserved_at.elapsed() < timeout {
            return false;
        }
        warn!("reservation expired after {timeout:?} without a commit");
        self.release();
        self.counters.reservations_expired = self.counters.reservations_expired.saturating_add(1);
        true
    }

    fn leave_committing(&mut self, operation: &'static str) -> Result<usize, NavigationError> {
        if self.state != ReservationState::Committing {
            return Err(self.violation(operation));
        }
        let top = self.requested_top.take().unwrap_or_default();
        self.state = ReservationState::Idle;
        Ok(top)
    }

    fn release(&mut self) {
        self.state = ReservationState::Idle;
        self.requested_top = None;
        self.reserved_at = None;
        self.counters.reservations_released = self.counters.reservations_released.saturating_add(1);
    }

    fn violation(&mut self, operation: &'static str) -> NavigationError {
        self.counters.protocol_violations = self.counters.protocol_violations.saturating_add(1);
        let err = NavigationError::ProtocolViolation {
            operation,
            state: self.state,
        };
        warn!("{err}");
        err
    }
}
