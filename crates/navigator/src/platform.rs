//! Platform boundary: the navigation controller the host drives, and the events
//! the platform produces.
//!
//! Platform delegate callbacks are translated into [`PlatformEvent`] values by the
//! embedding layer, so the adapter never depends on a particular callback mechanism.

use anyhow::Result;
use bridge::Route;

/// The platform's navigation controller.
///
/// Implementations wrap a real navigation view; the adapter only asks for single
/// push and pop steps and never reads platform views directly.
pub trait NavigationController {
    /// Number of screens the platform currently presents.
    fn depth(&self) -> usize;

    /// Present `route` on top of the current stack.
    ///
    /// # Errors
    /// Returns an error if the platform refuses the push.
    fn push(&mut self, route: &Route, animated: bool) -> Result<()>;

    /// Remove the top screen.
    ///
    /// # Errors
    /// Returns an error if the platform refuses the pop.
    fn pop(&mut self, animated: bool) -> Result<()>;

    /// Visually revert an interactive transition that was refused.
    fn cancel_interactive_transition(&mut self);

    /// Stop any transition animation that is still running.
    fn abort_animations(&mut self);

    /// Whether the navigation view is still part of the view hierarchy.
    fn is_attached(&self) -> bool;
}

/// Something the platform navigation controller reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlatformEvent {
    /// An interactive gesture wants to move the stack to `proposed_top`.
    GestureWillBegin { proposed_top: usize },
    /// The gesture completed; the platform now shows `top` on top.
    GestureDidFinish { top: usize },
    /// The gesture was abandoned by the user.
    GestureCancelled,
    /// The navigation view was removed from the hierarchy.
    ViewRemoved,
}
