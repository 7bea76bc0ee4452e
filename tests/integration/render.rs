//! Signal-flow integration tests
//!
//! Blocks rendered through the offline session with a plugin in the graph.

use crate::helpers::tolerances::FLOAT_EPSILON;
use crate::helpers::*;
use approx::assert_abs_diff_eq;
use plughost::prelude::*;

fn assert_level(samples: &[f32], level: f32) {
    for s in samples {
        assert_abs_diff_eq!(*s, level, epsilon = FLOAT_EPSILON);
    }
}

#[tokio::test]
async fn test_gain_scales_source() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();
    host.set_parameter(GAIN, 0.5).unwrap();

    assert_level(&render_channel(&mut host, 0), SOURCE_LEVEL * 0.5);
    assert_level(&render_channel(&mut host, 1), SOURCE_LEVEL * 0.5);
}

#[tokio::test]
async fn test_bypass_passes_source_unchanged() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();
    host.set_parameter(GAIN, 2.0).unwrap();
    host.set_parameter(BYPASS, 1.0).unwrap();

    assert_level(&render_channel(&mut host, 0), SOURCE_LEVEL);
}

#[tokio::test]
async fn test_stopped_source_is_silent() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();

    assert!(is_silent(&render_channel(&mut host, 0)));
}

#[tokio::test]
async fn test_generator_renders_without_source() {
    let mut host = test_host();
    host.load_plugin(&generator_descriptor(), false).await.unwrap();

    assert_level(&render_channel(&mut host, 1), GENERATOR_LEVEL);
}

#[tokio::test]
async fn test_output_volume() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();
    host.set_volume(0.5);

    assert_eq!(host.volume(), 0.5);
    assert_level(&render_channel(&mut host, 0), SOURCE_LEVEL * 0.5);
}

/// The render side reports the value it applied; the control side polls it.
#[tokio::test]
async fn test_effective_value_follows_render() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();
    assert_eq!(host.set_parameter(GAIN, 3.0).unwrap(), 2.0);

    let before = host
        .parameter_snapshot()
        .into_iter()
        .find(|p| p.address == GAIN)
        .unwrap();
    assert_eq!(before.requested, 2.0);
    assert_eq!(before.effective, 1.0);

    render_channel(&mut host, 0);
    let after = host
        .parameter_snapshot()
        .into_iter()
        .find(|p| p.address == GAIN)
        .unwrap();
    assert_eq!(after.effective, 2.0);
    assert_eq!(host.parameter(GAIN).unwrap(), 2.0);
}

#[tokio::test]
async fn test_unloaded_host_outputs_silence() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();
    host.unload_plugin();

    assert!(is_silent(&render_channel(&mut host, 0)));
    assert!(host.parameter_snapshot().is_empty());
}

/// A plugin loaded while the session runs is picked up at the next block.
#[tokio::test]
async fn test_reload_while_running() {
    let mut host = test_host();
    host.load_plugin(&generator_descriptor(), false).await.unwrap();
    assert_level(&render_channel(&mut host, 0), GENERATOR_LEVEL);

    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();
    assert_level(&render_channel(&mut host, 0), SOURCE_LEVEL);
}
