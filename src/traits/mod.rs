use async_trait::async_trait;
use thiserror::Error;

use crate::services::audio::PcmBuffer;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The model service could not be reached or refused the handshake.
    /// Load failures are never surfaced to a request; the process degrades
    /// to the tone synthesizer instead.
    #[error("backend failed to load: {0}")]
    Load(String),
    /// An already-loaded backend failed while generating. These surface to
    /// the caller as a request failure.
    #[error("speech generation failed: {0}")]
    Generation(String),
}

#[async_trait]
pub trait SpeechBackend: Send + Sync {
    /// Synthesize speech for `text`, optionally conditioned on reference
    /// audio bytes (a WAV clip whose timbre the output should imitate).
    async fn synthesize(&self, text: &str, reference: Option<&[u8]>)
        -> Result<PcmBuffer, BackendError>;
}
