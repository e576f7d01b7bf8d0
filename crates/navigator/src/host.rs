//! Host adapter between the platform navigation controller, the reservation gate
//! and the dispatch collaborator.
//!
//! The adapter is the only writer of the committed navigation stack. Platform
//! events and script commands both funnel through it, so every committed change
//! has a single origin.

use crate::config::NavigatorConfig;
use crate::error::NavigationError;
use crate::platform::{NavigationController, PlatformEvent};
use crate::reservation::{ReservationState, ReservationStateMachine};
use crate::telemetry::{NavigatorCounters, counters_json, maybe_emit};
use bridge::{Dispatcher, FactOrigin, NavigationFact, ReleaseReason, Route, ScriptCommand};
use log::{debug, info, warn};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::info_span;

/// Wraps a platform navigation controller and keeps it consistent with the
/// reservation gate.
pub struct HostAdapter<C: NavigationController, D: Dispatcher> {
    /// Reservation gate owned by this navigator.
    machine: ReservationStateMachine,
    /// Platform controller the committed stack is applied to.
    controller: C,
    /// Sink for facts reported to the script environment.
    dispatcher: D,
    /// Routes the script has mounted; commits index into this list.
    routes: Vec<Route>,
    /// The committed, platform-visible stack.
    stack: Vec<Route>,
    /// Whether script-driven pushes and pops animate.
    animated: bool,
    /// Whether to log a counters line after each handled event.
    telemetry_enabled: bool,
    /// Set once the navigation view is gone.
    torn_down: bool,
}

impl<C: NavigationController, D: Dispatcher> HostAdapter<C, D> {
    /// Create an adapter with an empty stack and an idle gate.
    pub fn new(controller: C, dispatcher: D, config: &NavigatorConfig) -> Self {
        Self {
            machine: ReservationStateMachine::with_timeout(config.reservation_timeout()),
            controller,
            dispatcher,
            routes: Vec::new(),
            stack: Vec::new(),
            animated: config.animated,
            telemetry_enabled: config.telemetry_enabled,
            torn_down: false,
        }
    }

    /// The committed stack, bottom first.
    #[inline]
    pub fn stack(&self) -> &[Route] {
        &self.stack
    }

    /// Index of the committed top, or `None` for an empty stack.
    #[inline]
    pub fn top(&self) -> Option<usize> {
        self.stack.len().checked_sub(1)
    }

    /// Routes currently mounted by the script.
    #[inline]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Current reservation state.
    #[inline]
    pub const fn state(&self) -> ReservationState {
        self.machine.state()
    }

    /// Counters accumulated by the gate.
    #[inline]
    pub const fn counters(&self) -> &NavigatorCounters {
        self.machine.counters()
    }

    /// The wrapped platform controller.
    #[inline]
    pub const fn controller(&self) -> &C {
        &self.controller
    }

    /// Mutable access to the wrapped platform controller.
    #[inline]
    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    /// The dispatcher facts are reported to.
    #[inline]
    pub const fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Whether the navigation view has been torn down.
    #[inline]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Replace the routes the script may commit to.
    ///
    /// The committed stack is left alone until the next commit.
    pub fn set_routes(&mut self, routes: Vec<Route>) {
        debug!("mounted {} routes", routes.len());
        self.routes = routes;
    }

    /// Reserve the next stack mutation for the script.
    pub fn request_scheduling_script_navigation(&mut self) -> bool {
        if self.torn_down {
            debug!("reservation denied: navigator torn down");
            return false;
        }
        self.release_if_expired();
        let granted = self.machine.request_scheduling_script_navigation();
        self.emit_telemetry();
        granted
    }

    /// Release a granted reservation at the script's request.
    pub fn cancel_reservation(&mut self) -> bool {
        let released = self.machine.cancel_reservation();
        if released {
            self.dispatcher.notify(NavigationFact::ReservationReleased {
                reason: ReleaseReason::Cancelled,
            });
        }
        self.emit_telemetry();
        released
    }

    /// Apply the script's reserved navigation so the platform ends at `new_top`.
    ///
    /// On success the committed top is reported as a script-origin fact. On platform
    /// failure the gate is forced back to idle and the failure is reported.
    ///
    /// # Errors
    /// Returns [`NavigationError::ProtocolViolation`] without touching the stack when no
    /// reservation is held, or [`NavigationError::PlatformApplyFailure`] when the platform
    /// could not reach `new_top`.
    pub fn commit_requested_top(&mut self, new_top: usize) -> Result<usize, NavigationError> {
        let result = self.commit_and_apply(new_top);
        self.emit_telemetry();
        result
    }

    fn commit_and_apply(&mut self, new_top: usize) -> Result<usize, NavigationError> {
        self.release_if_expired();
        let top = self.machine.commit_requested_top(new_top)?;
        match self.apply_top(top) {
            Ok(()) => {
                let applied = self.machine.complete_commit()?;
                self.dispatcher.notify(NavigationFact::TopChanged {
                    top: applied,
                    depth: self.stack.len(),
                    origin: FactOrigin::Script,
                });
                Ok(applied)
            }
            Err(reason) => {
                self.controller.abort_animations();
                self.machine.abort_commit()?;
                tracing::warn!("Failed to apply top {top}: {reason}");
                self.dispatcher.notify(NavigationFact::ApplyFailed {
                    requested_top: top,
                    top: self.top(),
                    depth: self.stack.len(),
                    reason: reason.clone(),
                });
                Err(NavigationError::PlatformApplyFailure {
                    requested_top: top,
                    reason,
                })
            }
        }
    }

    /// Drive the platform to `top`, keeping the committed stack in step with every
    /// successful push and pop.
    fn apply_top(&mut self, top: usize) -> Result<(), String> {
        let _span = info_span!("navigator.apply", top).entered();
        if !self.controller.is_attached() {
            return Err(String::from("navigation view is no longer attached"));
        }
        if top >= self.routes.len() {
            return Err(format!(
                "top {top} is beyond the {} mounted routes",
                self.routes.len()
            ));
        }
        let target = top + 1;
        let keep = self
            .stack
            .iter()
            .zip(&self.routes)
            .take(target)
            .take_while(|(shown, mounted)| shown == mounted)
            .count();
        while self.stack.len() > keep {
            self.controller
                .pop(self.animated)
                .map_err(|err| format!("{err:#}"))?;
            self.stack.pop();
        }
        while self.stack.len() < target {
            let route = self.routes[self.stack.len()].clone();
            self.controller
                .push(&route, self.animated)
                .map_err(|err| format!("{err:#}"))?;
            self.stack.push(route);
        }
        Ok(())
    }

    /// Translate one platform event into gate calls and facts.
    pub fn handle_platform_event(&mut self, event: PlatformEvent) {
        if self.torn_down {
            debug!("ignoring {event:?}: navigator torn down");
            return;
        }
        self.release_if_expired();
        match event {
            PlatformEvent::GestureWillBegin { proposed_top } => {
                self.gesture_will_begin(proposed_top);
            }
            PlatformEvent::GestureDidFinish { top } => self.gesture_did_finish(top),
            PlatformEvent::GestureCancelled => {
                if !self.machine.finish_native_change() {
                    debug!("gesture cancelled with no native transition in flight");
                }
            }
            PlatformEvent::ViewRemoved => self.teardown(),
        }
        self.emit_telemetry();
    }

    fn gesture_will_begin(&mut self, proposed_top: usize) {
        if self.machine.try_native_stack_change(proposed_top) {
            return;
        }
        self.controller.cancel_interactive_transition();
        self.dispatcher
            .notify(NavigationFact::NativeChangeRejected { proposed_top });
    }

    fn gesture_did_finish(&mut self, top: usize) {
        let granted = self.machine.state() == ReservationState::NativeTransition
            || self.machine.try_native_stack_change(top);
        if !granted {
            warn!(
                "native change to {top} finished while {}; restoring committed stack",
                self.machine.state()
            );
            self.restore_platform_stack();
            self.dispatcher
                .notify(NavigationFact::NativeChangeRejected { proposed_top: top });
            return;
        }
        self.machine.finish_native_change();
        if top >= self.stack.len() {
            warn!(
                "platform reported top {top} but only {} screens are committed; restoring",
                self.stack.len()
            );
            self.restore_platform_stack();
            self.dispatcher
                .notify(NavigationFact::NativeChangeRejected { proposed_top: top });
            return;
        }
        self.stack.truncate(top + 1);
        self.dispatcher.notify(NavigationFact::TopChanged {
            top,
            depth: self.stack.len(),
            origin: FactOrigin::Native,
        });
    }

    /// Bring the platform back to the committed stack after a change slipped past the gate.
    fn restore_platform_stack(&mut self) {
        while self.controller.depth() > self.stack.len() {
            if let Err(err) = self.controller.pop(false) {
                warn!("failed to restore committed stack: {err:#}");
                return;
            }
        }
        let shown = self.controller.depth();
        for route in self.stack.iter().skip(shown) {
            if let Err(err) = self.controller.push(route, false) {
                warn!("failed to restore committed stack: {err:#}");
                return;
            }
        }
    }

    /// Handle one command from the script timeline.
    pub fn handle_script_command(&mut self, command: ScriptCommand) {
        match command {
            ScriptCommand::Reserve { reply } => {
                let granted = self.request_scheduling_script_navigation();
                if reply.send(granted).is_err() && granted {
                    debug!("script dropped the reservation reply; releasing");
                    self.cancel_reservation();
                }
            }
            ScriptCommand::Commit { top } => {
                if let Err(err) = self.commit_requested_top(top) {
                    debug!("commit to {top} dropped: {err}");
                }
            }
            ScriptCommand::Cancel => {
                self.cancel_reservation();
            }
            ScriptCommand::SetRoutes { routes } => self.set_routes(routes),
        }
    }

    /// Drain all platform events already queued on `events`.
    ///
    /// Returns the number of events handled.
    pub fn pump_platform_events(&mut self, events: &mut UnboundedReceiver<PlatformEvent>) -> usize {
        let mut handled = 0;
        loop {
            match events.try_recv() {
                Ok(event) => {
                    self.handle_platform_event(event);
                    handled += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        handled
    }

    /// Tear the navigator down: abort animations and drop any outstanding reservation.
    ///
    /// Idempotent. Afterwards reservations are denied and platform events ignored.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.controller.abort_animations();
        if let Some(ReservationState::Reserved | ReservationState::Committing) =
            self.machine.abandon()
        {
            self.dispatcher.notify(NavigationFact::ReservationReleased {
                reason: ReleaseReason::TornDown,
            });
        }
        info!("navigator torn down with {} screens committed", self.stack.len());
    }

    fn release_if_expired(&mut self) {
        if self.machine.expire_if_stale() {
            self.dispatcher.notify(NavigationFact::ReservationReleased {
                reason: ReleaseReason::Expired,
            });
        }
    }

    fn emit_telemetry(&self) {
        if self.telemetry_enabled {
            maybe_emit(true, &counters_json(self.machine.counters()));
        }
    }
}

impl<C: NavigationController, D: Dispatcher> Drop for HostAdapter<C, D> {
    fn drop(&mut self) {
        self.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorder(Mutex<Vec<NavigationFact>>);

    impl Dispatcher for Recorder {
        fn notify(&self, fact: NavigationFact) {
            self.0.lock().unwrap().push(fact);
        }
    }

    #[derive(Default)]
    struct Ops {
        pushes: usize,
        pops: usize,
        depth: usize,
        refuse_push: bool,
    }

    impl NavigationController for Ops {
        fn depth(&self) -> usize {
            self.depth
        }
        fn push(&mut self, _route: &Route, _animated: bool) -> Result<()> {
            if self.refuse_push {
                bail!("push refused");
            }
            self.pushes += 1;
            self.depth += 1;
            Ok(())
        }
        fn pop(&mut self, _animated: bool) -> Result<()> {
            self.pops += 1;
            self.depth -= 1;
            Ok(())
        }
        fn cancel_interactive_transition(&mut self) {}
        fn abort_animations(&mut self) {}
        fn is_attached(&self) -> bool {
            true
        }
    }

    fn routes(titles: &[&str]) -> Vec<Route> {
        titles
            .iter()
            .enumerate()
            .map(|(idx, title)| Route::new(idx as u64, *title))
            .collect()
    }

    fn commit(adapter: &mut HostAdapter<Ops, Arc<Recorder>>, top: usize) {
        assert!(adapter.request_scheduling_script_navigation());
        assert_eq!(adapter.commit_requested_top(top), Ok(top));
    }

    #[test]
    fn commit_only_touches_the_changed_suffix() {
        let recorder = Arc::new(Recorder::default());
        let mut adapter =
            HostAdapter::new(Ops::default(), Arc::clone(&recorder), &NavigatorConfig::default());
        adapter.set_routes(routes(&["a", "b", "c"]));
        commit(&mut adapter, 2);
        assert_eq!(adapter.controller().pushes, 3);

        commit(&mut adapter, 0);
        assert_eq!(adapter.controller().pops, 2);
        assert_eq!(adapter.top(), Some(0));

        adapter.set_routes(routes(&["a", "x", "y"]));
        commit(&mut adapter, 2);
        assert_eq!(adapter.controller().pushes, 5);
        assert_eq!(adapter.stack()[1].title, "x");
    }

    #[test]
    fn partial_apply_keeps_the_stack_truthful() {
        let recorder = Arc::new(Recorder::default());
        let mut adapter =
            HostAdapter::new(Ops::default(), Arc::clone(&recorder), &NavigatorConfig::default());
        adapter.set_routes(routes(&["a", "b", "c"]));
        commit(&mut adapter, 1);
        adapter.controller_mut().refuse_push = true;

        assert!(adapter.request_scheduling_script_navigation());
        let err = adapter.commit_requested_top(2).unwrap_err();
        assert!(matches!(
            err,
            NavigationError::PlatformApplyFailure { requested_top: 2, .. }
        ));
        assert_eq!(adapter.top(), Some(1));
        assert_eq!(adapter.state(), ReservationState::Idle);
        let facts = recorder.0.lock().unwrap();
        assert!(matches!(
            facts.last(),
            Some(NavigationFact::ApplyFailed { requested_top: 2, .. })
        ));
    }
}
