use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ServiceConfig;
use crate::services::synth::remote::RemoteSpeechBackend;
use crate::traits::SpeechBackend;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServiceConfig>,
    pub backend: Option<Arc<dyn SpeechBackend>>,
}

impl AppState {
    /// The backend handle is built exactly once, here, and injected into the
    /// request handler. A load failure is not a request failure: the process
    /// keeps running on the fallback tone synthesizer.
    pub async fn new(config: ServiceConfig) -> Self {
        let backend: Option<Arc<dyn SpeechBackend>> = match &config.backend.endpoint {
            Some(endpoint) => {
                info!("Attempting to load speech backend at {}", endpoint);
                if config.backend.token.is_none() {
                    warn!("backend.token not set, backend loading may fail");
                }
                match RemoteSpeechBackend::connect(
                    endpoint.clone(),
                    config.backend.token.clone(),
                    config.backend.voice.clone(),
                )
                .await
                {
                    Ok(backend) => Some(Arc::new(backend)),
                    Err(e) => {
                        warn!("Speech backend failed to load: {}", e);
                        warn!("Falling back to tone synthesizer");
                        None
                    }
                }
            }
            None => {
                info!("No speech backend configured, using tone synthesizer");
                None
            }
        };

        Self {
            config: Arc::new(config),
            backend,
        }
    }
}
