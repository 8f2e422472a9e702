//! Video export.
//!
//! The numbered PNG sequence produced by playback is handed to an external
//! command-line encoder. Encoding runs out of process; the caller blocks
//! until it exits.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::errors::{FaceMeshError, Result};

/// Input of one encode.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeJob {
    /// printf-style pattern of the frame files, e.g. `frames/%05d.png`.
    pub frame_pattern: PathBuf,
    pub frame_count: usize,
    pub fps: f32,
    pub audio: Option<PathBuf>,
    pub output: PathBuf,
}

pub trait VideoEncoder {
    /// Encodes the job and waits for completion.
    fn encode(&mut self, job: &EncodeJob) -> Result<()>;
}

/// Encodes with an `ffmpeg` executable.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
    codec: String,
    pixel_format: String,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            codec: "libx264".to_string(),
            pixel_format: "yuv420p".to_string(),
        }
    }
}

impl FfmpegEncoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    #[must_use]
    pub fn with_codec(mut self, codec: impl Into<String>) -> Self {
        self.codec = codec.into();
        self
    }

    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Command-line arguments for `job`, without the program name.
    ///
    /// With an audio track the output is cut to the shorter stream.
    #[must_use]
    pub fn args(&self, job: &EncodeJob) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-y".into(),
            "-framerate".into(),
            job.fps.to_string().into(),
            "-i".into(),
            job.frame_pattern.clone().into(),
        ];
        if let Some(audio) = &job.audio {
            args.push("-i".into());
            args.push(audio.clone().into());
        }
        args.extend([
            "-c:v".into(),
            self.codec.clone().into(),
            "-pix_fmt".into(),
            self.pixel_format.clone().into(),
        ]);
        if job.audio.is_some() {
            args.extend(["-c:a".into(), "aac".into(), "-shortest".into()]);
        }
        args.push(job.output.clone().into());
        args
    }

    #[must_use]
    pub fn command(&self, job: &EncodeJob) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.args(job));
        cmd
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn encode(&mut self, job: &EncodeJob) -> Result<()> {
        if job.frame_count == 0 {
            return Err(FaceMeshError::EncoderFailed("no frames to encode".to_string()));
        }

        log::info!(
            "Encoding {} frames at {} fps into {}",
            job.frame_count,
            job.fps,
            job.output.display()
        );

        let output = self
            .command(job)
            .output()
            .map_err(|e| FaceMeshError::EncoderFailed(format!("{}: {e}", self.program.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FaceMeshError::EncoderFailed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}
