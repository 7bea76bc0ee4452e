//! Lifecycle integration tests
//!
//! Load/unload ordering, failure recovery and the single-instance rule.

use crate::helpers::*;
use plughost::core::NodeId;
use plughost::plugin::{HostError, InstantiationErrorKind, LoadStage};
use plughost::prelude::*;
use std::time::Duration;

#[tokio::test]
async fn test_load_reaches_ready() {
    let mut host = test_host();
    let timing = host.load_plugin(&gain_descriptor(), true).await.unwrap();

    assert_eq!(host.state(), LifecycleState::Ready);
    assert!(timing.succeeded());
    assert!(timing.out_of_process);
    assert_eq!(host.active_plugin().unwrap().name(), "Gain");
    assert!(host.session().is_running());
}

/// load(A) then load(B): exactly B is active and no edge references A.
#[tokio::test]
async fn test_second_load_replaces_first() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    let first = host.active_plugin().unwrap().id();

    host.load_plugin(&generator_descriptor(), false).await.unwrap();
    let active = host.active_plugin().unwrap();

    assert_eq!(active.name(), "Constant");
    assert_ne!(active.id(), first);
    let topology = host.topology();
    assert!(!topology.references(NodeId::Stage(first)));
    assert_eq!(topology.stage(), Some(active.id()));
    assert_eq!(host.metrics().len(), 2);
}

#[tokio::test]
async fn test_unload_twice_is_silent() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();

    host.unload_plugin();
    host.unload_plugin();

    assert_eq!(host.state(), LifecycleState::Idle);
    assert!(host.active_plugin().is_none());
    assert!(!host.session().is_running());
    assert_eq!(host.metrics().len(), 1);
}

#[tokio::test]
async fn test_unload_restores_bypass() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.unload_plugin();

    let topology = host.topology();
    assert_eq!(topology.stage(), None);
    assert_eq!(
        topology.output_format(NodeId::Source),
        Some(AudioFormat::stereo(SOURCE_SAMPLE_RATE))
    );
    assert_eq!(topology.output_format(NodeId::Mixer), Some(hardware()));
}

/// Format error at instantiation: Idle, one record, nothing past instantiate timed.
#[tokio::test]
async fn test_instantiation_format_error() {
    let mut host = test_host();
    let err = host.load_plugin(&broken_descriptor(), true).await.unwrap_err();

    match err {
        plughost::Error::Host(HostError::Instantiation { stage, source }) => {
            assert_eq!(stage, LoadStage::Instantiate);
            assert_eq!(source.kind, InstantiationErrorKind::FormatNotSupported);
            assert_eq!(source.status, Some(FORMAT_ERROR_STATUS));
        }
        other => panic!("unexpected error: {other}"),
    }

    assert_eq!(host.state(), LifecycleState::Idle);
    assert!(host.active_plugin().is_none());
    assert_eq!(host.metrics().len(), 1);

    let record = host.metrics().latest().unwrap();
    assert_eq!(record.failure, Some(LoadStage::Instantiate));
    assert_eq!(record.connect_graph, Duration::ZERO);
    assert_eq!(record.allocate_resources, Duration::ZERO);
    assert_eq!(record.load_view, Duration::ZERO);
    assert!(record.total >= record.instantiate);
}

#[tokio::test]
async fn test_incompatible_format_fails_connect() {
    let mut host = test_host();
    let err = host
        .load_plugin(&mono_only_descriptor(), false)
        .await
        .unwrap_err();

    assert_eq!(err.load_stage(), Some(LoadStage::ConnectGraph));
    assert_eq!(host.state(), LifecycleState::Idle);
    assert_eq!(host.topology().stage(), None);
    assert_eq!(
        host.metrics().latest().unwrap().failure,
        Some(LoadStage::ConnectGraph)
    );
}

#[tokio::test]
async fn test_allocation_failure_unloads() {
    let mut host = test_host();
    let err = host
        .load_plugin(&starving_descriptor(), false)
        .await
        .unwrap_err();

    assert_eq!(err.load_stage(), Some(LoadStage::AllocateResources));
    assert_eq!(host.state(), LifecycleState::Idle);
    assert!(host.active_plugin().is_none());
    assert_eq!(host.topology().stage(), None);
    assert!(!host.session().is_running());
}

#[tokio::test]
async fn test_out_of_process_crash() {
    let mut host = test_host();
    let err = host
        .load_plugin(&crashing_descriptor(), true)
        .await
        .unwrap_err();

    match err {
        plughost::Error::Host(e) => {
            assert_eq!(e.instantiation_kind(), Some(InstantiationErrorKind::ProcessCrashed))
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(host.state(), LifecycleState::Idle);
}

/// A failed load after a good one leaves nothing of either.
#[tokio::test]
async fn test_failed_load_tears_down_previous() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();

    assert!(host.load_plugin(&broken_descriptor(), false).await.is_err());
    assert_eq!(host.state(), LifecycleState::Idle);
    assert!(host.active_plugin().is_none());
    assert!(!host.is_playing());
}

#[tokio::test]
async fn test_load_by_name() {
    let mut host = test_host();
    host.load_by_name("Constant", false).await.unwrap();
    assert_eq!(host.active_plugin().unwrap().name(), "Constant");

    assert!(matches!(
        host.load_by_name("Missing", false).await,
        Err(plughost::Error::PluginNotFound(_))
    ));
}

#[tokio::test]
async fn test_load_by_name_without_registry() {
    let mut host = HostEngine::builder()
        .build_offline(test_instantiator(), hardware())
        .unwrap();
    assert!(matches!(
        host.load_by_name("Gain", false).await,
        Err(plughost::Error::NoRegistry)
    ));
}

#[tokio::test]
async fn test_play_state_rules() {
    let mut host = test_host();
    assert!(matches!(
        host.start_playing(),
        Err(plughost::Error::Host(HostError::InvalidState { .. }))
    ));
    host.stop_playing();
    assert_eq!(host.state(), LifecycleState::Idle);

    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();
    host.start_playing().unwrap();
    assert!(host.is_playing());
    host.stop_playing();
    assert_eq!(host.state(), LifecycleState::Ready);
}
