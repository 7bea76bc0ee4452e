//! Graph wiring integration tests
//!
//! The topology installed for each plugin category, read back from the host.

use crate::helpers::*;
use plughost::prelude::*;

/// Effect with a 44.1 kHz source on 48 kHz hardware: the source format wins
/// up to the mixer, the hardware format carries mixer -> output.
#[tokio::test]
async fn test_effect_topology_uses_source_format() {
    let mut host = test_host();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();

    let stage = NodeId::Stage(host.active_plugin().unwrap().id());
    let source = AudioFormat::stereo(SOURCE_SAMPLE_RATE);
    let edges: Vec<_> = host
        .topology()
        .connections()
        .iter()
        .map(|c| (c.source, c.destination, c.format))
        .collect();

    assert_eq!(
        edges,
        vec![
            (NodeId::Source, stage, source),
            (stage, NodeId::Mixer, source),
            (NodeId::Mixer, NodeId::Output, hardware()),
        ]
    );
}

#[tokio::test]
async fn test_effect_without_source_uses_hardware_format() {
    let mut host = HostEngine::builder()
        .build_offline(test_instantiator(), hardware())
        .unwrap();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();

    let stage = NodeId::Stage(host.active_plugin().unwrap().id());
    assert_eq!(host.topology().input_format(stage), Some(hardware()));
}

#[tokio::test]
async fn test_generator_topology_has_no_source() {
    let mut host = HostEngine::builder()
        .source_clip(source_clip())
        .build_offline(test_instantiator(), AudioFormat::standard(96000.0, 4))
        .unwrap();
    host.load_plugin(&generator_descriptor(), false).await.unwrap();

    let topology = host.topology();
    let stage = NodeId::Stage(host.active_plugin().unwrap().id());
    assert!(!topology.has_source());
    assert_eq!(topology.len(), 2);
    assert_eq!(topology.output_format(stage), Some(AudioFormat::stereo(96000.0)));
    assert_eq!(
        topology.output_format(NodeId::Mixer),
        Some(AudioFormat::standard(96000.0, 4))
    );
}

#[tokio::test]
async fn test_every_installed_topology_validates() {
    let mut host = test_host();
    assert!(host.topology().validate().is_ok());

    for descriptor in [gain_descriptor(), generator_descriptor()] {
        host.load_plugin(&descriptor, false).await.unwrap();
        assert!(host.topology().validate().is_ok());
    }
    host.unload_plugin();
    assert!(host.topology().validate().is_ok());
}

#[test]
fn test_registry_listing() {
    let registry = test_registry();
    assert_eq!(
        registry_names(&registry, PluginCategory::Effect),
        ["Broken", "Crashing", "Gain", "Mono Only", "Starving"]
    );
    assert_eq!(
        registry_names(&registry, PluginCategory::Generator),
        ["Constant"]
    );
}

/// A WAV source sets the format of the source -> stage edge.
#[tokio::test]
async fn test_wav_source_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loop.wav");
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 22050,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    for _ in 0..512 {
        writer.write_sample(i16::MAX / 2).unwrap();
    }
    writer.finalize().unwrap();

    let mut host = HostEngine::builder()
        .source_wav(&path)
        .build_offline(test_instantiator(), hardware())
        .unwrap();
    host.load_plugin(&gain_descriptor(), false).await.unwrap();
    host.start_playing().unwrap();

    let stage = NodeId::Stage(host.active_plugin().unwrap().id());
    assert_eq!(
        host.topology().input_format(stage),
        Some(AudioFormat::standard(22050.0, 1))
    );

    // Mono source reaches both output channels.
    for ch in 0..2 {
        assert!(!is_silent(&render_channel(&mut host, ch)));
    }
}
