use base64::{engine::general_purpose, Engine as _};
use std::io::Cursor;
use std::process::{Command, Output};

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tts_bridge"))
        .args(args)
        .output()
        .expect("failed to run tts_bridge")
}

fn stdout_json(out: &Output) -> serde_json::Value {
    serde_json::from_slice(&out.stdout).expect("stdout is a JSON document")
}

#[test]
fn missing_text_argument_exits_nonzero() {
    let out = run(&[]);
    assert_eq!(out.status.code(), Some(1));
    let json = stdout_json(&out);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "No text provided");
}

#[test]
fn hello_produces_a_mock_wav_envelope() {
    let out = run(&["Hello"]);
    assert!(out.status.success());

    let json = stdout_json(&out);
    assert_eq!(json["success"], true);
    assert_eq!(json["format"], "wav");
    assert_eq!(json["sample_rate"], 24000);
    assert_eq!(json["mock"], true);

    // 1.5 s at 24 kHz: 44-byte header plus 36000 16-bit samples.
    let wav = general_purpose::STANDARD
        .decode(json["audio"].as_str().expect("audio is a string"))
        .expect("audio is base64");
    assert_eq!(wav.len(), 44 + 36000 * 2);

    let reader = hound::WavReader::new(Cursor::new(wav)).expect("valid WAV stream");
    let spec = reader.spec();
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 24000);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(reader.len(), 36000);
}

#[test]
fn long_text_clamps_to_four_seconds() {
    let text = "a".repeat(40);
    let out = run(&[&text]);
    assert!(out.status.success());

    let json = stdout_json(&out);
    let wav = general_purpose::STANDARD
        .decode(json["audio"].as_str().unwrap())
        .unwrap();
    let reader = hound::WavReader::new(Cursor::new(wav)).unwrap();
    assert_eq!(reader.len(), 4 * 24000);
}

#[test]
fn whitespace_text_reports_failure_without_exiting_nonzero() {
    let out = run(&["   "]);
    assert!(out.status.success());
    let json = stdout_json(&out);
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Text cannot be empty");
    assert!(json.get("audio").is_none());
}

#[test]
fn mock_audio_is_identical_across_processes() {
    let a = run(&["same text, same tone"]);
    let b = run(&["same text, same tone"]);
    assert!(a.status.success());
    assert_eq!(a.stdout, b.stdout);
}

#[test]
fn stdout_carries_only_the_json_document() {
    let out = run(&["Hello"]);
    let stdout = String::from_utf8(out.stdout).expect("stdout is UTF-8");
    assert_eq!(stdout.lines().count(), 1);
    serde_json::from_str::<serde_json::Value>(stdout.trim()).expect("parseable as one document");
}
