use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub audio: AudioSettings,
    pub assets: AssetSettings,
    pub backend: BackendSettings,
}

#[derive(Debug, Deserialize)]
pub struct AudioSettings {
    pub sample_rate: u32,
}

#[derive(Debug, Deserialize)]
pub struct AssetSettings {
    /// Root that client-supplied voice paths are resolved against.
    pub public_root: PathBuf,
    /// Default reference voice. Optional on disk; absence just means
    /// default-voice generation.
    pub reference_voice: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the speech model service. When unset the process runs on
    /// the fallback tone synthesizer for its whole lifetime.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    pub voice: String,
}

impl ServiceConfig {
    pub fn new() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .set_default("audio.sample_rate", 24000)?
            .set_default("assets.public_root", "public")?
            .set_default("assets.reference_voice", "female_voice.wav")?
            .set_default("backend.voice", "default")?
            .add_source(config::File::with_name("Settings.toml").required(false))
            .add_source(config::Environment::with_prefix("TTS_BRIDGE").separator("__"));

        builder.build()?.try_deserialize()
    }
}
