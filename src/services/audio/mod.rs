use anyhow::{Context, Result};
use std::io::Cursor;

/// Mono float PCM and its sample rate. Samples are expected in [-1.0, 1.0].
#[derive(Debug, Clone, PartialEq)]
pub struct PcmBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl PcmBuffer {
    pub fn from_pcm16(samples: &[i16], sample_rate: u32) -> Self {
        Self {
            samples: samples.iter().map(|&s| s as f32 / 32768.0).collect(),
            sample_rate,
        }
    }

    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

// Wrap a PCM buffer into a 16-bit mono little-endian WAV byte stream.
pub fn encode_wav(pcm: &PcmBuffer) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: pcm.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer =
        hound::WavWriter::new(&mut cursor, spec).context("Failed to create WAV writer")?;
    for &sample in &pcm.samples {
        writer
            .write_sample(quantize(sample))
            .context("Failed to write WAV sample")?;
    }
    writer.finalize().context("Failed to finalize WAV stream")?;

    Ok(cursor.into_inner())
}

fn quantize(sample: f32) -> i16 {
    (sample * 32767.0).round().clamp(-32768.0, 32767.0) as i16
}
