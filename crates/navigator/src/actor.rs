//! Single-task actor that owns a [`HostAdapter`].
//!
//! Script commands and platform events arrive on separate channels and are handled
//! one at a time, so the reservation gate needs no lock even when the script runs
//! on another OS thread.

use crate::host::HostAdapter;
use crate::platform::{NavigationController, PlatformEvent};
use bridge::{Dispatcher, ScriptCommand};
use log::{debug, info};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// Serializes script commands and platform events onto one owner of the navigator.
pub struct NavigatorActor<C: NavigationController, D: Dispatcher> {
    adapter: HostAdapter<C, D>,
    commands: UnboundedReceiver<ScriptCommand>,
    platform: UnboundedReceiver<PlatformEvent>,
}

impl<C: NavigationController, D: Dispatcher> NavigatorActor<C, D> {
    /// Wrap `adapter` with its two inbound channels.
    pub fn new(
        adapter: HostAdapter<C, D>,
        commands: UnboundedReceiver<ScriptCommand>,
        platform: UnboundedReceiver<PlatformEvent>,
    ) -> Self {
        Self {
            adapter,
            commands,
            platform,
        }
    }

    /// Handle inbound messages until the view is removed or both channels close.
    ///
    /// The adapter is torn down before it is handed back.
    pub async fn run(mut self) -> HostAdapter<C, D> {
        let mut commands_open = true;
        let mut platform_open = true;
        while commands_open || platform_open {
            tokio::select! {
                command = self.commands.recv(), if commands_open => match command {
                    Some(command) => {
                        debug!("script command: {}", command.name());
                        self.adapter.handle_script_command(command);
                    }
                    None => commands_open = false,
                },
                event = self.platform.recv(), if platform_open => match event {
                    Some(PlatformEvent::ViewRemoved) => {
                        self.adapter.handle_platform_event(PlatformEvent::ViewRemoved);
                        break;
                    }
                    Some(event) => self.adapter.handle_platform_event(event),
                    None => platform_open = false,
                },
            }
        }
        self.adapter.teardown();
        info!("navigator actor stopped");
        self.adapter
    }
}

impl<C, D> NavigatorActor<C, D>
where
    C: NavigationController + Send + 'static,
    D: Dispatcher + 'static,
{
    /// Run the actor on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<HostAdapter<C, D>> {
        tokio::spawn(self.run())
    }
}
