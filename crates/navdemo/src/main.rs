use crate::platform::SimulatedController;
use anyhow::{Error, anyhow};
use bridge::{DispatchChannel, LoggingDispatcher, NavigationFact, Route, ScriptEndpoint, dispatch_channel};
use log::info;
use navigator::{HostAdapter, NavigatorActor, NavigatorConfig, PlatformEvent};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{UnboundedSender, unbounded_channel};

mod platform;

pub fn main() -> Result<(), Error> {
    env_logger::init();

    let runtime = Runtime::new()?;
    runtime.block_on(run())
}

async fn run() -> Result<(), Error> {
    let config = NavigatorConfig::from_env();
    let DispatchChannel {
        dispatcher,
        commands,
        mut script,
    } = dispatch_channel();
    let (platform_tx, platform_rx) = unbounded_channel();
    let controller = SimulatedController::default();
    let adapter = HostAdapter::new(
        controller.clone(),
        LoggingDispatcher::new(dispatcher),
        &config,
    );
    let actor = NavigatorActor::new(adapter, commands, platform_rx).spawn();

    script.set_routes(vec![
        Route::new(1, "Movies"),
        Route::new(2, "Search results"),
        Route::new(3, "Movie details"),
    ])?;

    // Script drills down to the details screen.
    navigate(&mut script, 2).await?;

    // User swipes back while nobody holds the stack.
    platform_tx.send(PlatformEvent::GestureWillBegin { proposed_top: 1 })?;
    controller.swipe_back();
    platform_tx.send(PlatformEvent::GestureDidFinish { top: 1 })?;
    report(&mut script).await?;

    // Script reserves, then a swipe races it and loses.
    if script.request_scheduling().await? {
        back_swipe_attempt(&platform_tx, 0)?;
        report(&mut script).await?;
        script.commit_requested_top(0)?;
        report(&mut script).await?;
    }

    platform_tx.send(PlatformEvent::ViewRemoved)?;
    let adapter = actor.await?;
    info!(
        "final stack: {:?}",
        adapter
            .stack()
            .iter()
            .map(|route| route.title.as_str())
            .collect::<Vec<_>>()
    );
    info!("counters: {}", navigator::telemetry::counters_json(adapter.counters()));
    Ok(())
}

/// Reserve, commit `top`, and wait for the resulting fact.
async fn navigate(script: &mut ScriptEndpoint, top: usize) -> Result<(), Error> {
    if !script.request_scheduling().await? {
        info!("reservation denied; dropping navigation to {top}");
        return Ok(());
    }
    script.commit_requested_top(top)?;
    report(script).await
}

fn back_swipe_attempt(
    platform_tx: &UnboundedSender<PlatformEvent>,
    proposed_top: usize,
) -> Result<(), Error> {
    platform_tx.send(PlatformEvent::GestureWillBegin { proposed_top })?;
    Ok(())
}

/// Wait for one fact and log the payload the script side would receive.
async fn report(script: &mut ScriptEndpoint) -> Result<(), Error> {
    let fact: NavigationFact = script
        .next_fact()
        .await
        .ok_or_else(|| anyhow!("navigator stopped before reporting"))?;
    info!("script <- {} {}", fact.event_name(), fact.to_payload());
    Ok(())
}
