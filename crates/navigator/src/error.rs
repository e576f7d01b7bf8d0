//! Error taxonomy for the navigator.
//!
//! A denied reservation is not an error; it is reported as `false` by the
//! reservation gate. Everything here is recoverable and never fatal.

use crate::reservation::ReservationState;
use std::fmt::{Display, Formatter};

/// Errors raised by the reservation state machine and the host adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// An operation was invoked in a state that does not allow it.
    ///
    /// The state is left untouched; the caller's request is dropped.
    ProtocolViolation {
        /// Operation that was attempted.
        operation: &'static str,
        /// State the machine was in at the time.
        state: ReservationState,
    },
    /// The platform could not bring its stack to the requested top.
    PlatformApplyFailure {
        /// Top the script asked for.
        requested_top: usize,
        /// Human-readable cause reported by the platform layer.
        reason: String,
    },
}

impl Display for NavigationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProtocolViolation { operation, state } => {
                write!(f, "ProtocolViolation: {operation} is not allowed while {state}")
            }
            Self::PlatformApplyFailure {
                requested_top,
                reason,
            } => write!(f, "PlatformApplyFailure: top {requested_top}: {reason}"),
        }
    }
}

impl std::error::Error for NavigationError {}
