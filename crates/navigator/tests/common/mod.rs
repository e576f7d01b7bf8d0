#![allow(dead_code, reason = "each test binary uses a different subset")]

use anyhow::{Result, bail};
use bridge::{Dispatcher, NavigationFact, Route};
use navigator::{HostAdapter, NavigationController, NavigatorConfig};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Initialize logger for visibility during test runs.
pub fn init_logging() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

/// `count` routes titled "screen-0", "screen-1", ...
pub fn routes(count: u64) -> Vec<Route> {
    (0..count)
        .map(|idx| Route::new(idx, format!("screen-{idx}")))
        .collect()
}

/// Dispatcher that keeps every fact for later inspection.
#[derive(Clone, Default)]
pub struct RecordingDispatcher(Arc<Mutex<Vec<NavigationFact>>>);

impl RecordingDispatcher {
    pub fn facts(&self) -> Vec<NavigationFact> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last(&self) -> Option<NavigationFact> {
        self.facts().last().cloned()
    }
}

impl Dispatcher for RecordingDispatcher {
    fn notify(&self, fact: NavigationFact) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(fact);
    }
}

/// What the fake platform currently shows, plus call counts.
#[derive(Debug)]
pub struct FakePlatform {
    pub shown: Vec<Route>,
    pub pushes: usize,
    pub pops: usize,
    pub cancelled_gestures: usize,
    pub aborted_animations: usize,
    pub attached: bool,
    pub refuse_pushes: bool,
}

/// Navigation controller backed by shared state, so tests can inspect it after the
/// adapter has been moved into an actor.
#[derive(Clone)]
pub struct FakeController(Arc<Mutex<FakePlatform>>);

impl FakeController {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(FakePlatform {
            shown: Vec::new(),
            pushes: 0,
            pops: 0,
            cancelled_gestures: 0,
            aborted_animations: 0,
            attached: true,
            refuse_pushes: false,
        })))
    }

    pub fn platform(&self) -> MutexGuard<'_, FakePlatform> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The platform popping a screen on its own, as an interactive back swipe does.
    pub fn swipe_back(&self) {
        self.platform().shown.pop();
    }

    pub fn shown_titles(&self) -> Vec<String> {
        self.platform()
            .shown
            .iter()
            .map(|route| route.title.clone())
            .collect()
    }
}

impl NavigationController for FakeController {
    fn depth(&self) -> usize {
        self.platform().shown.len()
    }

    fn push(&mut self, route: &Route, _animated: bool) -> Result<()> {
        let mut platform = self.platform();
        if !platform.attached {
            bail!("navigation view removed");
        }
        if platform.refuse_pushes {
            bail!("push refused");
        }
        platform.pushes += 1;
        platform.shown.push(route.clone());
        Ok(())
    }

    fn pop(&mut self, _animated: bool) -> Result<()> {
        let mut platform = self.platform();
        if platform.shown.pop().is_none() {
            bail!("nothing to pop");
        }
        platform.pops += 1;
        Ok(())
    }

    fn cancel_interactive_transition(&mut self) {
        self.platform().cancelled_gestures += 1;
    }

    fn abort_animations(&mut self) {
        self.platform().aborted_animations += 1;
    }

    fn is_attached(&self) -> bool {
        self.platform().attached
    }
}

pub type TestAdapter = HostAdapter<FakeController, RecordingDispatcher>;

/// An adapter with `route_count` mounted routes and nothing committed yet.
pub fn adapter_with_routes(
    route_count: u64,
    config: &NavigatorConfig,
) -> (TestAdapter, FakeController, RecordingDispatcher) {
    let controller = FakeController::new();
    let dispatcher = RecordingDispatcher::default();
    let mut adapter = HostAdapter::new(controller.clone(), dispatcher.clone(), config);
    adapter.set_routes(routes(route_count));
    (adapter, controller, dispatcher)
}
