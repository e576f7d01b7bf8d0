//! Script-facing dispatch facade for the native navigator.
//! This crate centralizes the values exchanged between the native navigation host
//! and the script environment: the facts the host reports, the commands the script
//! sends, and the asynchronous channel that carries them.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Commands sent from the script timeline into the navigator.
pub mod commands;
pub use commands::ScriptCommand;

/// Facts reported by the navigator to the script timeline.
pub mod facts;
pub use facts::{FactOrigin, NavigationFact, ReleaseReason};

/// Channel transport between the native host and the script environment.
pub mod channel;
pub use channel::{ChannelDispatcher, DispatchChannel, ScriptEndpoint, dispatch_channel};

pub mod console;
pub use console::LoggingDispatcher;

// ============================
// Screen identity
// ============================

/// A stable, opaque identifier for a screen the script has mounted.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct ScreenId(pub u64);

/// A screen plus the title shown for it in the platform navigation bar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Screen presented for this route.
    pub screen: ScreenId,
    /// Title displayed while the route is on top.
    pub title: String,
}

impl Route {
    /// Build a route for `screen` with the given title.
    #[inline]
    pub fn new(screen: u64, title: impl Into<String>) -> Self {
        Self {
            screen: ScreenId(screen),
            title: title.into(),
        }
    }
}

// ============================
// Dispatch collaborator
// ============================

/// Fire-and-forget sink for navigation facts.
///
/// Implementations must not block; delivery order from a single notifier is
/// preserved, nothing else is guaranteed.
pub trait Dispatcher: Send {
    /// Report a fact to the script environment.
    fn notify(&self, fact: NavigationFact);
}

impl<D: Dispatcher + Sync> Dispatcher for Arc<D> {
    #[inline]
    fn notify(&self, fact: NavigationFact) {
        (**self).notify(fact);
    }
}
