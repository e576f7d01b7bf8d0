//! Navigation scheduling for a natively hosted navigator driven by a script environment.
//!
//! Two independent drivers want to change the same navigation stack: the platform,
//! whose interactive gestures start and finish inside its own event loop, and the
//! script environment, which computes the desired stack on its own timeline. This
//! crate serializes both into one committed stack through a reservation gate, applies
//! committed changes to the platform, and reports every change back through the
//! [`bridge`] dispatcher.

/// Single-task owner of a navigator
pub mod actor;
pub mod config;
pub mod error;
/// Adapter between the platform controller and the reservation gate
pub mod host;
pub mod platform;
pub mod reservation;
pub mod telemetry;

pub use actor::NavigatorActor;
pub use config::NavigatorConfig;
pub use error::NavigationError;
pub use host::HostAdapter;
pub use platform::{NavigationController, PlatformEvent};
pub use reservation::{ReservationState, ReservationStateMachine};
pub use telemetry::NavigatorCounters;
