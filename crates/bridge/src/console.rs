//! Log-backed dispatcher decorator.
//!
//! Every fact passing through is written with the `log` crate before it is
//! forwarded, so native-side output stays in one place.

use crate::{Dispatcher, NavigationFact};
use log::{info, warn};

/// Wraps another dispatcher and logs each fact it forwards.
pub struct LoggingDispatcher<D: Dispatcher> {
    inner: D,
}

impl<D: Dispatcher> LoggingDispatcher<D> {
    /// Wrap `inner`.
    #[inline]
    pub const fn new(inner: D) -> Self {
        Self { inner }
    }

    /// Access the wrapped dispatcher.
    #[inline]
    pub const fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D: Dispatcher> Dispatcher for LoggingDispatcher<D> {
    fn notify(&self, fact: NavigationFact) {
        match &fact {
            NavigationFact::ApplyFailed { .. } | NavigationFact::ReservationReleased { .. } => {
                warn!("[Nav]: {fact}");
            }
            NavigationFact::TopChanged { .. } | NavigationFact::NativeChangeRejected { .. } => {
                info!("[Nav]: {fact}");
            }
        }
        self.inner.notify(fact);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{DispatchChannel, dispatch_channel};
    use crate::{FactOrigin, ReleaseReason};

    #[test]
    fn facts_reach_the_wrapped_dispatcher() {
        let DispatchChannel {
            dispatcher,
            commands: _commands,
            mut script,
        } = dispatch_channel();
        let logging = LoggingDispatcher::new(dispatcher);
        logging.notify(NavigationFact::TopChanged {
            top: 0,
            depth: 1,
            origin: FactOrigin::Script,
        });
        logging.inner().notify(NavigationFact::ReservationReleased {
            reason: ReleaseReason::Cancelled,
        });
        assert_eq!(script.drain_facts().len(), 2);
    }
}
