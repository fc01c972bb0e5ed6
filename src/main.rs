mod config;
mod handlers;
mod services;
mod state;
mod traits;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServiceConfig;
use crate::handlers::speak::{handle_speak, SpeakRequest, SpeakResponse};
use crate::state::AppState;

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr; stdout carries exactly one JSON document so
    // the calling process can parse it.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tts_bridge=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args().skip(1);
    let text = match args.next() {
        Some(text) => text,
        None => {
            emit(&SpeakResponse::failure("No text provided"));
            std::process::exit(1);
        }
    };
    let voice_path = args.next();

    tracing::info!("Received text: {}", text);
    tracing::info!("Received voice_path: {:?}", voice_path);

    let config = match ServiceConfig::new() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            emit(&SpeakResponse::failure(format!(
                "Failed to load configuration: {}",
                e
            )));
            return;
        }
    };

    let state = AppState::new(config).await;
    let response = handle_speak(&state, SpeakRequest { text, voice_path }).await;
    emit(&response);
}

fn emit(response: &SpeakResponse) {
    match serde_json::to_string(response) {
        Ok(line) => println!("{}", line),
        Err(e) => {
            // Should not happen for these envelopes; keep stdout valid anyway.
            tracing::error!("Failed to serialize response: {}", e);
            println!(r#"{{"success":false,"error":"internal serialization error"}}"#);
        }
    }
}
