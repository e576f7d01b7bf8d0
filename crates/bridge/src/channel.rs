use crate::{Dispatcher, NavigationFact, Route, ScriptCommand};
use anyhow::{Result, anyhow};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::sync::oneshot;

/// Dispatcher that forwards facts to a [`ScriptEndpoint`] over an unbounded channel.
#[derive(Clone, Debug)]
pub struct ChannelDispatcher {
    facts: UnboundedSender<NavigationFact>,
}

impl Dispatcher for ChannelDispatcher {
    fn notify(&self, fact: NavigationFact) {
        if self.facts.send(fact).is_err() {
            log::debug!("[Nav]: script endpoint dropped; fact discarded");
        }
    }
}

/// The script side of the dispatch channel.
///
/// Sends commands into the navigator and receives the facts it reports.
#[derive(Debug)]
pub struct ScriptEndpoint {
    commands: UnboundedSender<ScriptCommand>,
    facts: UnboundedReceiver<NavigationFact>,
}

impl ScriptEndpoint {
    /// Ask the navigator for a reservation and wait for the grant.
    ///
    /// Returns `Ok(false)` when the reservation was denied; callers should then do nothing.
    ///
    /// # Errors
    /// Returns an error if the navigator is gone.
    pub async fn request_scheduling(&self) -> Result<bool> {
        let (reply, granted) = oneshot::channel();
        self.send(ScriptCommand::Reserve { reply })?;
        granted
            .await
            .map_err(|err| anyhow!("navigator dropped reservation reply: {err}"))
    }

    /// Send the target top for a reservation that was granted.
    ///
    /// # Errors
    /// Returns an error if the navigator is gone.
    pub fn commit_requested_top(&self, top: usize) -> Result<()> {
        self.send(ScriptCommand::Commit { top })
    }

    /// Give up a granted reservation.
    ///
    /// # Errors
    /// Returns an error if the navigator is gone.
    pub fn cancel(&self) -> Result<()> {
        self.send(ScriptCommand::Cancel)
    }

    /// Replace the routes the navigator may present.
    ///
    /// # Errors
    /// Returns an error if the navigator is gone.
    pub fn set_routes(&self, routes: Vec<Route>) -> Result<()> {
        self.send(ScriptCommand::SetRoutes { routes })
    }

    /// Wait for the next fact; `None` once the navigator is gone and the queue is drained.
    pub async fn next_fact(&mut self) -> Option<NavigationFact> {
        self.facts.recv().await
    }

    /// Drain every fact that is already queued.
    pub fn drain_facts(&mut self) -> Vec<NavigationFact> {
        let mut out = Vec::new();
        loop {
            match self.facts.try_recv() {
                Ok(fact) => out.push(fact),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        out
    }

    fn send(&self, command: ScriptCommand) -> Result<()> {
        let name = command.name();
        self.commands
            .send(command)
            .map_err(|err| anyhow!("failed to send {name}: {err}"))
    }
}

/// Both halves of a freshly created dispatch channel.
pub struct DispatchChannel {
    /// Native-side fact sink.
    pub dispatcher: ChannelDispatcher,
    /// Native-side command stream.
    pub commands: UnboundedReceiver<ScriptCommand>,
    /// Script-side handle.
    pub script: ScriptEndpoint,
}

/// Create a connected dispatcher, command receiver and script endpoint.
pub fn dispatch_channel() -> DispatchChannel {
    let (command_tx, command_rx) = unbounded_channel();
    let (fact_tx, fact_rx) = unbounded_channel();
    DispatchChannel {
        dispatcher: ChannelDispatcher { facts: fact_tx },
        commands: command_rx,
        script: ScriptEndpoint {
            commands: command_tx,
            facts: fact_rx,
        },
    }
}
