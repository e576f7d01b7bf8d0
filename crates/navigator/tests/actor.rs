//! End-to-end tests for the navigator actor wired to the dispatch channel.

use bridge::{DispatchChannel, FactOrigin, NavigationFact, ReleaseReason, dispatch_channel};
use navigator::{HostAdapter, NavigatorActor, NavigatorConfig, PlatformEvent, ReservationState};
use tokio::sync::mpsc::unbounded_channel;

mod common;

use common::{FakeController, init_logging, routes};

#[tokio::test]
async fn script_and_gestures_share_one_committed_stack() -> anyhow::Result<()> {
    init_logging();
    let DispatchChannel {
        dispatcher,
        commands,
        mut script,
    } = dispatch_channel();
    let (platform_tx, platform_rx) = unbounded_channel();
    let controller = FakeController::new();
    let adapter = HostAdapter::new(controller.clone(), dispatcher, &NavigatorConfig::default());
    let actor = NavigatorActor::new(adapter, commands, platform_rx).spawn();

    script.set_routes(routes(3))?;
    assert!(script.request_scheduling().await?);
    script.commit_requested_top(2)?;
    assert_eq!(
        script.next_fact().await,
        Some(NavigationFact::TopChanged {
            top: 2,
            depth: 3,
            origin: FactOrigin::Script,
        })
    );

    assert!(script.request_scheduling().await?);
    assert!(!script.request_scheduling().await?);
    platform_tx.send(PlatformEvent::GestureWillBegin { proposed_top: 1 })?;
    assert_eq!(
        script.next_fact().await,
        Some(NavigationFact::NativeChangeRejected { proposed_top: 1 })
    );
    script.commit_requested_top(0)?;
    assert_eq!(
        script.next_fact().await,
        Some(NavigationFact::TopChanged {
            top: 0,
            depth: 1,
            origin: FactOrigin::Script,
        })
    );
    assert_eq!(controller.shown_titles(), vec!["screen-0"]);

    platform_tx.send(PlatformEvent::ViewRemoved)?;
    let adapter = actor.await?;
    assert!(adapter.is_torn_down());
    assert_eq!(adapter.state(), ReservationState::Idle);
    assert_eq!(adapter.counters().commits_applied, 2);
    assert_eq!(controller.platform().cancelled_gestures, 1);
    Ok(())
}

#[tokio::test]
async fn teardown_releases_outstanding_reservation() -> anyhow::Result<()> {
    let DispatchChannel {
        dispatcher,
        commands,
        mut script,
    } = dispatch_channel();
    let (platform_tx, platform_rx) = unbounded_channel();
    let controller = FakeController::new();
    let adapter = HostAdapter::new(controller.clone(), dispatcher, &NavigatorConfig::default());
    let actor = NavigatorActor::new(adapter, commands, platform_rx).spawn();

    script.set_routes(routes(2))?;
    assert!(script.request_scheduling().await?);
    platform_tx.send(PlatformEvent::ViewRemoved)?;
    let adapter = actor.await?;

    assert_eq!(adapter.state(), ReservationState::Idle);
    assert!(adapter.stack().is_empty());
    assert_eq!(controller.platform().pushes, 0);
    assert_eq!(
        script.next_fact().await,
        Some(NavigationFact::ReservationReleased {
            reason: ReleaseReason::TornDown,
        })
    );
    assert!(script.request_scheduling().await.is_err());
    Ok(())
}

#[tokio::test]
async fn actor_stops_when_both_drivers_hang_up() -> anyhow::Result<()> {
    let DispatchChannel {
        dispatcher,
        commands,
        script,
    } = dispatch_channel();
    let (platform_tx, platform_rx) = unbounded_channel::<PlatformEvent>();
    let adapter = HostAdapter::new(
        FakeController::new(),
        dispatcher,
        &NavigatorConfig::default(),
    );
    let actor = NavigatorActor::new(adapter, commands, platform_rx).spawn();

    assert!(script.request_scheduling().await?);
    drop(script);
    drop(platform_tx);
    let adapter = actor.await?;
    assert!(adapter.is_torn_down());
    assert_eq!(adapter.counters().reservations_released, 1);
    Ok(())
}
