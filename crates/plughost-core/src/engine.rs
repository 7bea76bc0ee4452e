//! Render engine: control-side graph owner and its real-time half.
//!
//! Control context -> `incoming` ring -> [`Renderer`] -> `retired` ring -> control context.
//!
//! A graph (topology, stage and scratch buffers) is built and allocated on
//! the control side, then handed to the renderer as one boxed value. The
//! renderer swaps it in at the start of a block and sends the previous graph
//! back, so stages are created, allocated, deallocated and freed only on the
//! control side.

use crate::clip::SourceClip;
use crate::config::EngineConfig;
use crate::format::AudioFormat;
use crate::lockfree::{AtomicFlag, AtomicFloat};
use crate::render::{AudioBuffers, NoInput, PullInput, RenderError, RenderStage};
use crate::topology::{GraphTopology, NodeId};
use crate::{Error, Result};
use arc_swap::ArcSwap;
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Passthrough,
    Processor,
    Generator,
}

/// Everything the renderer needs for one topology.
struct RenderGraph {
    route: Route,
    stage: Option<Box<dyn RenderStage>>,
    scratch: AudioBuffers,
    allocated: bool,
}

impl RenderGraph {
    /// Control context only.
    fn retire(mut self) {
        if let Some(stage) = self.stage.as_mut() {
            if self.allocated {
                stage.deallocate_render_resources();
            }
            tracing::debug!(stage = stage.name(), "stage released");
        }
    }
}

/// State read by the renderer every block.
#[derive(Debug)]
struct SharedState {
    playing: AtomicFlag,
    volume: AtomicFloat,
}

struct SourcePlayer {
    clip: Arc<SourceClip>,
    position: usize,
}

/// Upstream of processing stages: the looping source clip while playing,
/// silence otherwise.
struct SourcePull<'a> {
    player: Option<&'a mut SourcePlayer>,
    playing: bool,
}

impl PullInput for SourcePull<'_> {
    fn pull(&mut self, frames: usize, into: &mut AudioBuffers) -> std::result::Result<(), RenderError> {
        if frames > into.capacity() {
            return Err(RenderError::TooManyFrames {
                requested: frames,
                max: into.capacity(),
            });
        }

        let player = match self.player.as_deref_mut() {
            Some(player) if self.playing => player,
            _ => {
                into.silence(frames);
                return Ok(());
            }
        };

        let clip_frames = player.clip.frames();
        if clip_frames == 0 {
            into.silence(frames);
            return Ok(());
        }

        let clip_channels = player.clip.channel_count();
        for index in 0..into.channel_count() {
            let src = player.clip.channel(index % clip_channels);
            let dst = &mut into.channel_mut(index)[..frames];
            let mut pos = player.position;
            let mut written = 0;
            while written < frames {
                let n = (frames - written).min(clip_frames - pos);
                dst[written..written + n].copy_from_slice(&src[pos..pos + n]);
                written += n;
                pos = (pos + n) % clip_frames;
            }
        }
        player.position = (player.position + frames) % clip_frames;
        Ok(())
    }
}

/// Real-time half of the engine. Owned by whatever drives the hardware callback.
pub struct Renderer {
    current: Box<RenderGraph>,
    incoming: HeapCons<Box<RenderGraph>>,
    retired: HeapProd<Box<RenderGraph>>,
    source: Option<SourcePlayer>,
    shared: Arc<SharedState>,
    max_frames: usize,
}

impl Renderer {
    pub fn max_frames(&self) -> usize {
        self.max_frames
    }

    /// Applies pending graph swaps. Real-time safe; returns how many were applied.
    pub fn sync(&mut self) -> usize {
        let mut applied = 0;
        while let Some(next) = self.incoming.try_pop() {
            let previous = std::mem::replace(&mut self.current, next);
            // RenderEngine keeps in-flight graphs within ring capacity.
            let pushed = self.retired.try_push(previous);
            debug_assert!(pushed.is_ok(), "retired ring overflow");
            applied += 1;
        }
        applied
    }

    /// Renders one block into `output`. Real-time safe.
    ///
    /// On error `output` is silenced for the block.
    pub fn process(
        &mut self,
        frames: usize,
        output: &mut AudioBuffers,
    ) -> std::result::Result<(), RenderError> {
        self.sync();

        let max = self.max_frames.min(output.capacity());
        if frames > max {
            output.silence(max);
            return Err(RenderError::TooManyFrames {
                requested: frames,
                max,
            });
        }

        let graph = &mut *self.current;
        let mut pull = SourcePull {
            player: self.source.as_mut(),
            playing: self.shared.playing.get(),
        };

        let status = match (graph.route, graph.stage.as_mut()) {
            (Route::Processor, Some(stage)) => stage.render(frames, &mut graph.scratch, &mut pull),
            (Route::Generator, Some(stage)) => {
                stage.render(frames, &mut graph.scratch, &mut NoInput)
            }
            _ => pull.pull(frames, &mut graph.scratch),
        };

        if let Err(e) = status {
            output.silence(frames);
            return Err(e);
        }

        let volume = self.shared.volume.get();
        let scratch_channels = graph.scratch.channel_count();
        for index in 0..output.channel_count() {
            let dst = &mut output.channel_mut(index)[..frames];
            if scratch_channels == 0 {
                dst.fill(0.0);
                continue;
            }
            let src = &graph.scratch.channel(index % scratch_channels)[..frames];
            for (d, s) in dst.iter_mut().zip(src) {
                *d = *s * volume;
            }
        }
        Ok(())
    }
}

/// Control-side owner of the render graph.
pub struct RenderEngine {
    config: EngineConfig,
    hardware: AudioFormat,
    source_format: Option<AudioFormat>,
    outgoing: HeapProd<Box<RenderGraph>>,
    returned: HeapCons<Box<RenderGraph>>,
    /// Graphs owned by the render side, including the one it renders.
    in_flight: usize,
    staged: Option<Box<RenderGraph>>,
    topology: ArcSwap<GraphTopology>,
    shared: Arc<SharedState>,
}

impl RenderEngine {
    /// Creates the engine and its renderer, wired in the bypass topology.
    pub fn new(
        config: EngineConfig,
        hardware: AudioFormat,
        clip: Option<Arc<SourceClip>>,
    ) -> Result<(Self, Renderer)> {
        config.validate()?;
        hardware.validate()?;

        let capacity = config.command_queue_capacity;
        let (outgoing, incoming) = HeapRb::<Box<RenderGraph>>::new(capacity).split();
        let (retired, returned) = HeapRb::<Box<RenderGraph>>::new(capacity).split();

        let shared = Arc::new(SharedState {
            playing: AtomicFlag::new(false),
            volume: AtomicFloat::new(1.0),
        });

        let source_format = clip.as_ref().map(|c| c.format());
        let bypass = GraphTopology::bypass(hardware, source_format);
        let initial = Box::new(RenderGraph {
            route: Route::Passthrough,
            stage: None,
            scratch: AudioBuffers::new(
                source_format.unwrap_or(hardware).channel_count(),
                config.max_block_frames,
            ),
            allocated: false,
        });

        let renderer = Renderer {
            current: initial,
            incoming,
            retired,
            source: clip.map(|clip| SourcePlayer { clip, position: 0 }),
            shared: Arc::clone(&shared),
            max_frames: config.max_block_frames,
        };

        let engine = Self {
            config,
            hardware,
            source_format,
            outgoing,
            returned,
            in_flight: 1,
            staged: None,
            topology: ArcSwap::from_pointee(bypass),
            shared,
        };

        Ok((engine, renderer))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn hardware_format(&self) -> AudioFormat {
        self.hardware
    }

    /// Takes effect for the next planned topology.
    pub fn set_hardware_format(&mut self, format: AudioFormat) -> Result<()> {
        format.validate()?;
        self.hardware = format;
        Ok(())
    }

    pub fn source_format(&self) -> Option<AudioFormat> {
        self.source_format
    }

    /// The most recently applied topology. Lock-free; callable from any thread.
    pub fn topology(&self) -> Arc<GraphTopology> {
        self.topology.load_full()
    }

    /// Validates `topology` against `stage`, builds the graph and publishes
    /// the topology. The graph reaches the renderer on [`commit`](Self::commit).
    ///
    /// Replaces any graph staged earlier. On error nothing changes and
    /// `stage` is dropped.
    pub fn stage(
        &mut self,
        topology: GraphTopology,
        stage: Option<Box<dyn RenderStage>>,
    ) -> Result<()> {
        topology.validate()?;

        let route = match (topology.stage(), stage.as_ref()) {
            (None, None) => Route::Passthrough,
            (Some(id), Some(stage)) => {
                let node = NodeId::Stage(id);
                for conn in topology.connections() {
                    if (conn.source == node || conn.destination == node)
                        && !stage.supports_format(&conn.format)
                    {
                        return Err(Error::IncompatibleFormat {
                            source_node: conn.source,
                            destination: conn.destination,
                            format: conn.format,
                        });
                    }
                }
                if topology.has_source() {
                    Route::Processor
                } else {
                    Route::Generator
                }
            }
            (Some(_), None) => {
                return Err(Error::InvalidTopology(
                    "topology references a stage but none was given".into(),
                ))
            }
            (None, Some(_)) => {
                return Err(Error::InvalidTopology(
                    "stage given but topology does not reference it".into(),
                ))
            }
        };

        let scratch_format = match topology.stage() {
            Some(id) => topology.output_format(NodeId::Stage(id)),
            None => topology.output_format(NodeId::Source),
        }
        .unwrap_or(self.hardware);

        self.discard_staged();
        self.staged = Some(Box::new(RenderGraph {
            route,
            stage,
            scratch: AudioBuffers::new(scratch_format.channel_count(), self.config.max_block_frames),
            allocated: false,
        }));

        tracing::debug!(topology = %topology, "topology staged");
        self.topology.store(Arc::new(topology));
        Ok(())
    }

    /// Allocates the staged stage's render resources and hands the graph to
    /// the renderer, which swaps it in whole at its next block.
    pub fn commit(&mut self) -> Result<()> {
        let mut graph = self.staged.take().ok_or(Error::NothingStaged)?;

        if let Some(stage) = graph.stage.as_mut() {
            let topology = self.topology.load();
            let format = topology
                .stage()
                .and_then(|id| topology.output_format(NodeId::Stage(id)))
                .unwrap_or(self.hardware);
            stage
                .allocate_render_resources(&format, self.config.max_block_frames)
                .map_err(|e| Error::Allocation(e.to_string()))?;
            graph.allocated = true;
        }

        self.collect_garbage();
        if self.in_flight > self.config.command_queue_capacity {
            graph.retire();
            return Err(Error::QueueFull {
                capacity: self.config.command_queue_capacity,
            });
        }
        if let Err(graph) = self.outgoing.try_push(graph) {
            graph.retire();
            return Err(Error::QueueFull {
                capacity: self.config.command_queue_capacity,
            });
        }
        self.in_flight += 1;
        Ok(())
    }

    /// Stages and commits the pass-through topology.
    pub fn install_bypass(&mut self) -> Result<()> {
        self.stage(GraphTopology::bypass(self.hardware, self.source_format), None)?;
        self.commit()
    }

    /// Drops a staged, uncommitted graph. Its stage is released here.
    pub fn discard_staged(&mut self) {
        if let Some(graph) = self.staged.take() {
            graph.retire();
        }
    }

    /// Releases graphs the renderer has swapped out. Returns how many.
    pub fn collect_garbage(&mut self) -> usize {
        let mut collected = 0;
        while let Some(graph) = self.returned.try_pop() {
            self.in_flight -= 1;
            graph.retire();
            collected += 1;
        }
        if collected > 0 {
            tracing::debug!(collected, "retired render graphs released");
        }
        collected
    }

    pub fn has_pending(&self) -> bool {
        self.in_flight > 1 || self.staged.is_some()
    }

    pub fn set_playing(&self, playing: bool) {
        self.shared.playing.set(playing);
    }

    pub fn is_playing(&self) -> bool {
        self.shared.playing.get()
    }

    /// Main mixer output gain.
    pub fn set_volume(&self, volume: f32) {
        self.shared.volume.set(volume.max(0.0));
    }

    pub fn volume(&self) -> f32 {
        self.shared.volume.get()
    }
}
