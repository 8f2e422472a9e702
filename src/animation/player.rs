//! Animation Player
//!
//! Drives a [`PlaybackTarget`] through a recorded [`AnimationSequence`], one
//! frame at a time, capturing every rendered frame.
//!
//! ```text
//! Idle ──load──▶ Loading ──play──▶ Playing ──▶ Completed
//!                   │                 │
//!                   └──invalid──▶ Aborted ◀──cancel / fatal error
//! ```
//!
//! Frame semantics:
//! - Frames are applied strictly in order; nothing is skipped or interpolated.
//! - Blendshape coefficients are sample-and-hold: a name missing from a frame
//!   keeps the value it last had.
//! - When a frame has both a vertex snapshot and coefficients, the snapshot
//!   sets the positions. The coefficients are still recorded on the target,
//!   but not synthesized for that frame.
//! - Names the target's rig does not know are skipped, with one warning per
//!   name per sequence.

use std::path::{Path, PathBuf};

use glam::Vec3;
use rustc_hash::FxHashSet;

use crate::animation::cancel::CancelToken;
use crate::animation::capture::FrameRecorder;
use crate::animation::encoder::{EncodeJob, VideoEncoder};
use crate::animation::sequence::AnimationSequence;
use crate::errors::{FaceMeshError, Result};
use crate::renderer::frame::RenderedFrame;
use crate::resources::blendshape::{BlendshapeRig, ResolvedCoefficients};

/// What the player drives. Implemented by the viewer.
pub trait PlaybackTarget {
    fn vertex_count(&self) -> usize;

    fn rig(&self) -> Option<&BlendshapeRig>;

    /// Replaces all vertex positions.
    fn apply_positions(&mut self, positions: &[Vec3], recompute_normals: bool) -> Result<()>;

    /// Synthesizes the rig with `coefficients` and applies the result.
    fn synthesize_coefficients(&mut self, coefficients: &[f32], recompute_normals: bool) -> Result<()>;

    /// Records `coefficients` as current state without touching geometry.
    fn store_coefficients(&mut self, coefficients: &[f32]);

    /// Renders the current state. `Ok(None)` means the render was dropped.
    fn render_frame(&mut self) -> Result<Option<RenderedFrame>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    /// A validated sequence is loaded and ready to play.
    Loading,
    Playing {
        frame: usize,
    },
    Completed,
    Aborted,
}

impl PlayerState {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing { .. } => "playing",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }
}

/// Result of a completed playback, ready for an encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackReport {
    pub frames: Vec<PathBuf>,
    pub frame_pattern: PathBuf,
    pub fps: f32,
    pub audio: Option<PathBuf>,
    /// Blendshape names skipped because the rig does not know them.
    pub unknown_names: Vec<String>,
    /// Frames whose render was dropped; the previous image was captured again.
    pub dropped_renders: usize,
}

impl PlaybackReport {
    #[must_use]
    pub fn encode_job(&self, output: impl AsRef<Path>) -> EncodeJob {
        EncodeJob {
            frame_pattern: self.frame_pattern.clone(),
            frame_count: self.frames.len(),
            fps: self.fps,
            audio: self.audio.clone(),
            output: output.as_ref().to_path_buf(),
        }
    }
}

#[derive(Debug)]
pub struct AnimationPlayer {
    state: PlayerState,
    sequence: Option<AnimationSequence>,
    /// Per-frame coefficients resolved against the target rig.
    resolved: Vec<Option<ResolvedCoefficients>>,
    unknown_names: Vec<String>,
    /// Sample-and-hold coefficient state.
    coefficients: Vec<f32>,
    last_frame: Option<RenderedFrame>,
}

impl Default for AnimationPlayer {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationPlayer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: PlayerState::Idle,
            sequence: None,
            resolved: Vec::new(),
            unknown_names: Vec::new(),
            coefficients: Vec::new(),
            last_frame: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> PlayerState {
        self.state
    }

    #[must_use]
    pub fn sequence(&self) -> Option<&AnimationSequence> {
        self.sequence.as_ref()
    }

    /// Current sample-and-hold coefficients, in rig order.
    #[must_use]
    pub fn coefficients(&self) -> &[f32] {
        &self.coefficients
    }

    #[must_use]
    pub fn unknown_names(&self) -> &[String] {
        &self.unknown_names
    }

    /// Back to `Idle` after a finished or aborted playback.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn transition_error(&self, requested: &'static str) -> FaceMeshError {
        FaceMeshError::InvalidPlaybackState {
            current: self.state.name(),
            requested,
        }
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Validates `sequence` against `target` and resolves blendshape names.
    ///
    /// A vertex snapshot with the wrong row count rejects the whole sequence
    /// and leaves the player `Aborted`.
    pub fn load<T: PlaybackTarget + ?Sized>(&mut self, sequence: AnimationSequence, target: &T) -> Result<()> {
        if self.state != PlayerState::Idle {
            return Err(self.transition_error("load"));
        }
        self.state = PlayerState::Loading;

        if let Err(err) = sequence.validate(target.vertex_count()) {
            log::error!("Rejecting animation sequence: {err}");
            self.state = PlayerState::Aborted;
            return Err(err);
        }

        let rig = target.rig();
        let mut seen = FxHashSet::default();
        let mut unknown_names = Vec::new();
        let resolved: Vec<Option<ResolvedCoefficients>> = sequence
            .data
            .iter()
            .map(|frame| {
                let named = frame.blendshapes.as_ref()?;
                let resolved = match rig {
                    Some(rig) => rig.resolve_named(named.iter().map(|(k, v)| (k.as_str(), *v))),
                    None => ResolvedCoefficients {
                        pairs: Vec::new(),
                        unknown: named.keys().cloned().collect(),
                    },
                };
                for name in &resolved.unknown {
                    if seen.insert(name.clone()) {
                        log::warn!("Blendshape '{name}' not found in rig, skipping");
                        unknown_names.push(name.clone());
                    }
                }
                Some(resolved)
            })
            .collect();

        self.resolved = resolved;
        self.unknown_names = unknown_names;
        self.coefficients = vec![0.0; rig.map_or(0, BlendshapeRig::n_blendshapes)];
        self.last_frame = None;

        log::info!(
            "Loaded animation: {} frames at {} fps",
            sequence.len(),
            sequence.metadata.fps
        );
        self.sequence = Some(sequence);
        Ok(())
    }

    // ========================================================================
    // Playback
    // ========================================================================

    /// Plays every frame in order, capturing each render into `recorder`.
    ///
    /// Cancellation is checked before each frame. On cancel or a fatal error
    /// the frames written so far are deleted and the player ends `Aborted`.
    pub fn play<T: PlaybackTarget + ?Sized>(
        &mut self,
        target: &mut T,
        recorder: &mut FrameRecorder,
        cancel: &CancelToken,
    ) -> Result<PlaybackReport> {
        if self.state != PlayerState::Loading {
            return Err(self.transition_error("play"));
        }
        let frame_count = self.sequence.as_ref().map_or(0, AnimationSequence::len);
        let mut dropped_renders = 0;

        // Playback always starts from the neutral state, whatever a seek left behind.
        self.coefficients.fill(0.0);
        self.last_frame = None;

        for index in 0..frame_count {
            if cancel.is_cancelled() {
                log::info!("Playback cancelled before frame {index}");
                return Err(self.abort(recorder, FaceMeshError::PlaybackAborted { frames_rendered: index }));
            }
            self.state = PlayerState::Playing { frame: index };

            if let Err(err) = self.apply_frame(target, index, true) {
                if !err.is_recoverable() {
                    return Err(self.abort(recorder, err));
                }
                log::warn!("Frame {index}: {err}");
            }

            match target.render_frame() {
                Ok(Some(frame)) => self.last_frame = Some(frame),
                Ok(None) => {
                    dropped_renders += 1;
                    log::debug!("Frame {index}: render dropped, reusing previous image");
                }
                Err(err) if err.is_recoverable() => {
                    dropped_renders += 1;
                    log::warn!("Frame {index}: {err}, reusing previous image");
                }
                Err(err) => return Err(self.abort(recorder, err)),
            }

            let recorded = self.last_frame.as_ref().map(|frame| recorder.record(frame));
            match recorded {
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(self.abort(recorder, err)),
                None => log::warn!("Frame {index}: nothing rendered yet, no image captured"),
            }
        }

        self.state = PlayerState::Completed;
        let metadata = self.sequence.as_ref().map(|s| s.metadata.clone()).unwrap_or_default();
        Ok(PlaybackReport {
            frames: recorder.frames().to_vec(),
            frame_pattern: recorder.input_pattern(),
            fps: metadata.fps,
            audio: metadata.audio,
            unknown_names: self.unknown_names.clone(),
            dropped_renders,
        })
    }

    /// Plays the sequence and hands the captured frames to `encoder`.
    pub fn export<T, E>(
        &mut self,
        target: &mut T,
        recorder: &mut FrameRecorder,
        cancel: &CancelToken,
        encoder: &mut E,
        output: impl AsRef<Path>,
    ) -> Result<PlaybackReport>
    where
        T: PlaybackTarget + ?Sized,
        E: VideoEncoder + ?Sized,
    {
        let report = self.play(target, recorder, cancel)?;
        encoder.encode(&report.encode_job(output))?;
        Ok(report)
    }

    /// Shows frame `frame` (clamped into range) without capturing it.
    ///
    /// Uses the fast path: normals are not recomputed. Returns the index
    /// actually shown.
    pub fn seek<T: PlaybackTarget + ?Sized>(&mut self, target: &mut T, frame: usize) -> Result<usize> {
        if matches!(self.state, PlayerState::Idle | PlayerState::Playing { .. }) || self.sequence.is_none() {
            return Err(self.transition_error("seek"));
        }
        let len = self.sequence.as_ref().map_or(0, AnimationSequence::len);
        if len == 0 {
            return Err(self.transition_error("seek in an empty sequence"));
        }
        let index = frame.min(len - 1);

        // Rebuild the held coefficients as they stood at `index`.
        self.coefficients.fill(0.0);
        for resolved in self.resolved[..index].iter().flatten() {
            self.coefficients = resolved.apply_to(&self.coefficients);
        }

        self.apply_frame(target, index, false)?;
        if let Ok(Some(image)) = target.render_frame() {
            self.last_frame = Some(image);
        }
        Ok(index)
    }

    fn apply_frame<T: PlaybackTarget + ?Sized>(
        &mut self,
        target: &mut T,
        index: usize,
        recompute_normals: bool,
    ) -> Result<()> {
        let Some(record) = self.sequence.as_ref().and_then(|s| s.data.get(index)) else {
            return Ok(());
        };

        let resolved = self.resolved.get(index).and_then(Option::as_ref);
        if let Some(resolved) = resolved {
            self.coefficients = resolved.apply_to(&self.coefficients);
        }
        let has_rig = target.rig().is_some();

        match (record.positions(), resolved) {
            (Some(positions), Some(_)) => {
                target.apply_positions(positions, recompute_normals)?;
                target.store_coefficients(&self.coefficients);
            }
            (Some(positions), None) => target.apply_positions(positions, recompute_normals)?,
            (None, Some(_)) if has_rig => target.synthesize_coefficients(&self.coefficients, recompute_normals)?,
            (None, _) => {}
        }
        Ok(())
    }

    fn abort(&mut self, recorder: &mut FrameRecorder, err: FaceMeshError) -> FaceMeshError {
        recorder.discard();
        self.state = PlayerState::Aborted;
        err
    }
}
