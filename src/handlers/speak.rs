use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use tracing::{info, warn};

use crate::services::audio;
use crate::services::synth::tone;
use crate::state::AppState;

#[derive(Debug)]
pub struct SpeakRequest {
    pub text: String,
    /// Reference voice path relative to the public assets root.
    pub voice_path: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct SpeakResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SpeakResponse {
    fn ok(audio: String, sample_rate: u32, mock: bool) -> Self {
        Self {
            success: true,
            audio: Some(audio),
            sample_rate: Some(sample_rate),
            format: Some("wav".to_string()),
            // Only present when the fallback synthesizer produced the audio.
            mock: mock.then_some(true),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            audio: None,
            sample_rate: None,
            format: None,
            mock: None,
            error: Some(message.into()),
        }
    }
}

/// One request, one envelope. Every failure folds into the envelope; nothing
/// here terminates the process.
pub async fn handle_speak(state: &AppState, request: SpeakRequest) -> SpeakResponse {
    let text = request.text.trim();
    if text.is_empty() {
        return SpeakResponse::failure("Text cannot be empty");
    }

    let (pcm, mock) = match &state.backend {
        Some(backend) => {
            let reference = resolve_reference(state, request.voice_path.as_deref());
            let result = match &reference {
                Some(bytes) => match backend.synthesize(text, Some(bytes)).await {
                    Ok(pcm) => Ok(pcm),
                    Err(e) => {
                        // Conditioning on the reference clip failed; retry
                        // once with the backend's default voice.
                        warn!("Voice conditioning failed, retrying with default voice: {}", e);
                        backend.synthesize(text, None).await
                    }
                },
                None => backend.synthesize(text, None).await,
            };
            match result {
                Ok(pcm) => (pcm, false),
                Err(e) => return SpeakResponse::failure(e.to_string()),
            }
        }
        None => (tone::synthesize(text, state.config.audio.sample_rate), true),
    };

    match audio::encode_wav(&pcm) {
        Ok(bytes) => SpeakResponse::ok(
            general_purpose::STANDARD.encode(&bytes),
            pcm.sample_rate,
            mock,
        ),
        Err(e) => SpeakResponse::failure(format!("Failed to encode WAV: {}", e)),
    }
}

// An explicit voice path wins over the configured reference voice. A clip
// that is missing or unreadable is skipped, not a request failure.
fn resolve_reference(state: &AppState, voice_path: Option<&str>) -> Option<Vec<u8>> {
    if let Some(rel) = voice_path {
        let path = state
            .config
            .assets
            .public_root
            .join(rel.trim_start_matches('/'));
        match std::fs::read(&path) {
            Ok(bytes) => {
                info!("Using custom reference voice {:?}", path);
                return Some(bytes);
            }
            Err(e) => warn!("Could not read reference voice {:?}: {}", path, e),
        }
    }

    let default = &state.config.assets.reference_voice;
    match std::fs::read(default) {
        Ok(bytes) => {
            info!("Using default reference voice {:?}", default);
            Some(bytes)
        }
        Err(_) => {
            info!("No reference voice found, generating with default voice");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AssetSettings, AudioSettings, BackendSettings, ServiceConfig};
    use std::io::Cursor;
    use std::sync::Arc;

    fn fallback_state() -> AppState {
        AppState {
            config: Arc::new(ServiceConfig {
                audio: AudioSettings { sample_rate: 24000 },
                assets: AssetSettings {
                    public_root: "public".into(),
                    reference_voice: "female_voice.wav".into(),
                },
                backend: BackendSettings {
                    endpoint: None,
                    token: None,
                    voice: "default".to_string(),
                },
            }),
            backend: None,
        }
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_synthesis() {
        let state = fallback_state();
        for text in ["", "   ", "\t\n"] {
            let resp = handle_speak(
                &state,
                SpeakRequest {
                    text: text.to_string(),
                    voice_path: None,
                },
            )
            .await;
            assert!(!resp.success);
            assert_eq!(resp.error.as_deref(), Some("Text cannot be empty"));
            assert!(resp.audio.is_none());
        }
    }

    #[tokio::test]
    async fn fallback_path_marks_the_envelope_as_mock() {
        let state = fallback_state();
        let resp = handle_speak(
            &state,
            SpeakRequest {
                text: "Hello".to_string(),
                voice_path: None,
            },
        )
        .await;

        assert!(resp.success);
        assert_eq!(resp.mock, Some(true));
        assert_eq!(resp.sample_rate, Some(24000));
        assert_eq!(resp.format.as_deref(), Some("wav"));
        assert!(resp.error.is_none());

        // "Hello" clamps to 1.5 s: 36000 samples behind a 44-byte header.
        let wav = general_purpose::STANDARD
            .decode(resp.audio.unwrap())
            .unwrap();
        assert_eq!(wav.len(), 44 + 36000 * 2);

        let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
        assert_eq!(reader.spec().sample_rate, 24000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len(), 36000);
    }

    #[tokio::test]
    async fn surrounding_whitespace_is_trimmed_before_synthesis() {
        let state = fallback_state();
        let trimmed = handle_speak(
            &state,
            SpeakRequest {
                text: "Hello".to_string(),
                voice_path: None,
            },
        )
        .await;
        let padded = handle_speak(
            &state,
            SpeakRequest {
                text: "  Hello  ".to_string(),
                voice_path: None,
            },
        )
        .await;
        assert_eq!(trimmed.audio, padded.audio);
    }

    #[test]
    fn failure_envelope_serializes_without_audio_fields() {
        let json = serde_json::to_string(&SpeakResponse::failure("No text provided")).unwrap();
        assert_eq!(json, r#"{"success":false,"error":"No text provided"}"#);
    }
}
