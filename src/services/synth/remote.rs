use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::services::audio::PcmBuffer;
use crate::traits::{BackendError, SpeechBackend};

/// Client for a pretrained speech model exposed as an HTTP service.
pub struct RemoteSpeechBackend {
    endpoint: String,
    token: Option<String>,
    voice: String,
    client: Client,
}

#[derive(Deserialize)]
struct SynthesizeResponse {
    // Base64 of raw PCM16 little-endian mono samples.
    audio: String,
    sample_rate: u32,
}

impl RemoteSpeechBackend {
    /// Load-time handshake. An unreachable or unhealthy endpoint means the
    /// process runs on the fallback synthesizer for its whole lifetime.
    pub async fn connect(
        endpoint: String,
        token: Option<String>,
        voice: String,
    ) -> Result<Self, BackendError> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let client = Client::new();

        let mut req = client.get(format!("{}/health", endpoint));
        if let Some(token) = &token {
            req = req.bearer_auth(token);
        }
        let resp = req
            .send()
            .await
            .map_err(|e| BackendError::Load(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(BackendError::Load(format!(
                "health check returned {}",
                resp.status()
            )));
        }

        info!("Speech backend ready at {}", endpoint);
        Ok(Self {
            endpoint,
            token,
            voice,
            client,
        })
    }
}

#[async_trait]
impl SpeechBackend for RemoteSpeechBackend {
    async fn synthesize(
        &self,
        text: &str,
        reference: Option<&[u8]>,
    ) -> Result<PcmBuffer, BackendError> {
        info!(
            "Generating speech for '{}' using voice '{}'{}",
            text,
            self.voice,
            if reference.is_some() {
                " with reference audio"
            } else {
                ""
            }
        );

        let mut body = json!({
            "text": text,
            "voice": self.voice,
        });
        if let Some(reference) = reference {
            body["reference_audio"] = json!(general_purpose::STANDARD.encode(reference));
        }

        let mut req = self
            .client
            .post(format!("{}/synthesize", self.endpoint))
            .json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| BackendError::Generation(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let detail = resp.text().await.unwrap_or_default();
            return Err(BackendError::Generation(format!(
                "backend returned {}: {}",
                status, detail
            )));
        }

        let parsed: SynthesizeResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Generation(e.to_string()))?;

        let raw = general_purpose::STANDARD
            .decode(&parsed.audio)
            .map_err(|e| BackendError::Generation(format!("invalid base64 audio: {}", e)))?;

        info!("Received {} bytes of raw PCM from speech backend", raw.len());

        // Convert bytes to i16 PCM (little endian), dropping a trailing odd byte.
        let mut pcm_i16: Vec<i16> = Vec::with_capacity(raw.len() / 2);
        for chunk in raw.chunks(2) {
            if chunk.len() == 2 {
                pcm_i16.push(i16::from_le_bytes([chunk[0], chunk[1]]));
            }
        }

        Ok(PcmBuffer::from_pcm16(&pcm_i16, parsed.sample_rate))
    }
}
