//! A stand-in navigation controller that logs instead of animating.

use anyhow::{Result, bail};
use bridge::Route;
use log::info;
use navigator::NavigationController;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Simulated platform stack, shared so the demo can play the user's gestures.
#[derive(Clone, Default)]
pub struct SimulatedController {
    shown: Arc<Mutex<Vec<Route>>>,
}

impl SimulatedController {
    fn shown(&self) -> MutexGuard<'_, Vec<Route>> {
        self.shown.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The platform popping its top screen as an interactive back swipe completes.
    pub fn swipe_back(&self) {
        if let Some(route) = self.shown().pop() {
            info!("platform: swiped back from {:?}", route.title);
        }
    }
}

impl NavigationController for SimulatedController {
    fn depth(&self) -> usize {
        self.shown().len()
    }

    fn push(&mut self, route: &Route, animated: bool) -> Result<()> {
        info!("platform: push {:?} (animated: {animated})", route.title);
        self.shown().push(route.clone());
        Ok(())
    }

    fn pop(&mut self, animated: bool) -> Result<()> {
        let Some(route) = self.shown().pop() else {
            bail!("platform stack is already empty");
        };
        info!("platform: pop {:?} (animated: {animated})", route.title);
        Ok(())
    }

    fn cancel_interactive_transition(&mut self) {
        info!("platform: interactive transition cancelled");
    }

    fn abort_animations(&mut self) {
        info!("platform: animations aborted");
    }

    fn is_attached(&self) -> bool {
        true
    }
}
