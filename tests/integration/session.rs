//! Session notification integration tests
//!
//! Interruptions and route changes posted through the offline session's
//! event channel, the way the platform delivers them.

use crate::helpers::*;
use plughost::core::{InterruptionPhase, RouteChangeReason};
use plughost::prelude::*;

fn began() -> SessionEvent {
    SessionEvent::Interruption {
        phase: InterruptionPhase::Began,
        should_resume: false,
    }
}

fn ended(should_resume: bool) -> SessionEvent {
    SessionEvent::Interruption {
        phase: InterruptionPhase::Ended,
        should_resume,
    }
}

/// Posts `event` and lets the host handle it.
fn deliver(host: &mut HostEngine, event: SessionEvent) {
    host.session().event_sender().send(event).unwrap();
    assert_eq!(host.pump_session_events().unwrap(), 1);
}

#[tokio::test]
async fn test_interruption_keeps_graph_and_resumes() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();
    let id = host.active_plugin().unwrap().id();
    let records = host.metrics().len();

    host.session_mut().deactivate();
    deliver(&mut host, began());
    assert_eq!(host.state(), LifecycleState::Ready);
    assert!(host.active_plugin().is_some());
    assert!(is_silent(&render_channel(&mut host, 0)));

    deliver(&mut host, ended(true));
    assert_eq!(host.state(), LifecycleState::Playing);
    assert!(host.session().is_active());
    assert!(host.session().is_running());
    assert_eq!(host.active_plugin().unwrap().id(), id);
    assert_eq!(host.metrics().len(), records);
    assert!(!is_silent(&render_channel(&mut host, 0)));
}

#[tokio::test]
async fn test_interruption_without_resume_stays_stopped() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();

    deliver(&mut host, began());
    deliver(&mut host, ended(false));
    assert_eq!(host.state(), LifecycleState::Ready);
    assert!(!host.is_playing());

    // The user can still restart by hand.
    host.start_playing().unwrap();
    assert_eq!(host.state(), LifecycleState::Playing);
}

/// The platform may repeat `Began`; the resume decision belongs to the first.
#[tokio::test]
async fn test_repeated_began_still_resumes() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();

    host.session_mut().deactivate();
    deliver(&mut host, began());
    deliver(&mut host, began());
    deliver(&mut host, ended(true));

    assert_eq!(host.state(), LifecycleState::Playing);
    assert!(!is_silent(&render_channel(&mut host, 0)));
}

/// An interruption that never asks to resume leaves the session inactive;
/// the next load brings it back.
#[tokio::test]
async fn test_load_after_unresumed_interruption() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();

    host.session_mut().deactivate();
    deliver(&mut host, began());
    deliver(&mut host, ended(false));
    assert!(!host.session().is_active());

    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    assert_eq!(host.state(), LifecycleState::Ready);
    assert!(host.session().is_active());
    assert!(host.session().is_running());

    host.start_playing().unwrap();
    assert!(!is_silent(&render_channel(&mut host, 0)));
}

#[tokio::test]
async fn test_resume_does_not_start_playback_that_was_stopped() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();

    host.session_mut().deactivate();
    deliver(&mut host, began());
    deliver(&mut host, ended(true));

    assert_eq!(host.state(), LifecycleState::Ready);
    assert!(host.session().is_running());
}

#[tokio::test]
async fn test_interruption_while_idle() {
    let mut host = test_host();
    host.session_mut().deactivate();
    deliver(&mut host, began());
    deliver(&mut host, ended(true));

    assert_eq!(host.state(), LifecycleState::Idle);
    assert!(host.session().is_active());
    assert!(!host.session().is_running());
}

#[tokio::test]
async fn test_device_removal_stops_playback() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();

    deliver(
        &mut host,
        SessionEvent::RouteChange {
            reason: RouteChangeReason::OldDeviceUnavailable,
        },
    );
    assert_eq!(host.state(), LifecycleState::Ready);
    assert!(host.active_plugin().is_some());
    assert!(is_silent(&render_channel(&mut host, 0)));
}

#[tokio::test]
async fn test_other_route_changes_are_informational() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();

    let sender = host.session().event_sender();
    for reason in [
        RouteChangeReason::NewDeviceAvailable,
        RouteChangeReason::CategoryChange,
        RouteChangeReason::ConfigurationChange,
    ] {
        sender.send(SessionEvent::RouteChange { reason }).unwrap();
    }
    assert_eq!(host.pump_session_events().unwrap(), 3);
    assert_eq!(host.state(), LifecycleState::Playing);
    assert_eq!(host.pump_session_events().unwrap(), 0);
}
