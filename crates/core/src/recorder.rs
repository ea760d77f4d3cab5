//! Complaint-audio capture.
//!
//! State machine: `idle → recording → stopped(has-blob)`; submission then
//! moves through uploading and ends in success or error at the client
//! layer. Stop flushes every buffered chunk into a single [`AudioBlob`];
//! there is no chunked or streaming upload.

use std::path::Path;
use std::time::{Duration, Instant};

use triage_types::AudioBlob;

/// Media type used when detection has nothing better to say. Matches what
/// the capture devices at intake produce.
const DEFAULT_MEDIA_TYPE: &str = "audio/webm";

#[derive(Debug, thiserror::Error)]
pub enum RecorderError {
    #[error("already recording")]
    AlreadyRecording,
    #[error("not recording")]
    NotRecording,
    #[error("nothing captured")]
    NothingCaptured,
    #[error("failed to read audio file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
    Stopped,
}

/// Buffers capture chunks until stop, then hands back one upload blob.
#[derive(Debug)]
pub struct Recorder {
    state: RecorderState,
    chunks: Vec<Vec<u8>>,
    started: Option<Instant>,
    captured: Duration,
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            chunks: Vec::new(),
            started: None,
            captured: Duration::ZERO,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Time captured so far (live while recording, frozen after stop).
    pub fn elapsed(&self) -> Duration {
        match self.state {
            RecorderState::Recording => self.started.map(|s| s.elapsed()).unwrap_or_default(),
            _ => self.captured,
        }
    }

    /// Begins a capture session. Starting over from `stopped` discards the
    /// previous take (the re-record path).
    ///
    /// # Errors
    ///
    /// [`RecorderError::AlreadyRecording`] when a session is active.
    pub fn start(&mut self) -> Result<(), RecorderError> {
        if self.state == RecorderState::Recording {
            return Err(RecorderError::AlreadyRecording);
        }
        self.chunks.clear();
        self.captured = Duration::ZERO;
        self.started = Some(Instant::now());
        self.state = RecorderState::Recording;
        Ok(())
    }

    /// Buffers one chunk of captured audio. Empty chunks are ignored.
    ///
    /// # Errors
    ///
    /// [`RecorderError::NotRecording`] outside an active session.
    pub fn push(&mut self, chunk: &[u8]) -> Result<(), RecorderError> {
        if self.state != RecorderState::Recording {
            return Err(RecorderError::NotRecording);
        }
        if !chunk.is_empty() {
            self.chunks.push(chunk.to_vec());
        }
        Ok(())
    }

    /// Stops capture and flushes all buffered chunks into a single blob.
    ///
    /// # Errors
    ///
    /// [`RecorderError::NotRecording`] outside an active session;
    /// [`RecorderError::NothingCaptured`] when no non-empty chunk arrived.
    pub fn stop(&mut self) -> Result<AudioBlob, RecorderError> {
        if self.state != RecorderState::Recording {
            return Err(RecorderError::NotRecording);
        }
        self.captured = self.started.take().map(|s| s.elapsed()).unwrap_or_default();
        self.state = RecorderState::Stopped;

        if self.chunks.is_empty() {
            return Err(RecorderError::NothingCaptured);
        }

        let data: Vec<u8> = self.chunks.drain(..).flatten().collect();
        Ok(AudioBlob::new(data, DEFAULT_MEDIA_TYPE, upload_file_name("webm")))
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Upload filename in the intake convention, e.g. `triage_1704067200000.webm`.
fn upload_file_name(extension: &str) -> String {
    format!("triage_{}.{extension}", chrono::Utc::now().timestamp_millis())
}

/// Loads a pre-recorded take from disk, best-effort detecting the media
/// type from content and falling back to `audio/webm`.
pub fn load_audio(path: &Path) -> Result<AudioBlob, RecorderError> {
    let data = std::fs::read(path).map_err(|source| RecorderError::Read {
        path: path.display().to_string(),
        source,
    })?;
    if data.is_empty() {
        return Err(RecorderError::NothingCaptured);
    }

    let (media_type, extension) = match infer::get(&data) {
        Some(kind) => (kind.mime_type().to_string(), kind.extension().to_string()),
        None => {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("webm")
                .to_string();
            (DEFAULT_MEDIA_TYPE.to_string(), ext)
        }
    };

    Ok(AudioBlob::new(data, media_type, upload_file_name(&extension)))
}
