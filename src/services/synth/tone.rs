use crate::services::audio::PcmBuffer;

const SECS_PER_CHAR: f32 = 0.15;
const MIN_DURATION_SECS: f32 = 1.5;
const MAX_DURATION_SECS: f32 = 4.0;
const FADE_SECS: f32 = 0.1;
const VIBRATO_RATE_HZ: f32 = 5.0;
const VIBRATO_DEPTH: f32 = 0.02;
const PEAK_TARGET: f32 = 0.8;

/// Deterministic placeholder tone for when no speech backend is available.
///
/// Duration scales with text length (clamped to 1.5-4.0 s) and the base
/// pitch is derived from a stable hash of the text, so distinct phrases
/// sound distinct while identical `(text, sample_rate)` inputs always
/// produce bit-identical buffers.
pub fn synthesize(text: &str, sample_rate: u32) -> PcmBuffer {
    let chars = text.chars().count();
    let duration = (SECS_PER_CHAR * chars as f32).clamp(MIN_DURATION_SECS, MAX_DURATION_SECS);
    let total = (sample_rate as f32 * duration).round() as usize;

    let base_freq = base_frequency(text);

    // Three harmonics, fundamental loudest, plus a slow vibrato so the tone
    // sounds less like a test signal.
    let mut samples = vec![0.0f32; total];
    for (i, sample) in samples.iter_mut().enumerate() {
        let t = i as f32 * duration / total as f32;
        let mut acc = 0.0f32;
        for harmonic in 1..=3u32 {
            let freq = base_freq * harmonic as f32;
            acc += (std::f32::consts::TAU * freq * t).sin() / harmonic as f32;
        }
        let vibrato = 1.0 + VIBRATO_DEPTH * (std::f32::consts::TAU * VIBRATO_RATE_HZ * t).sin();
        *sample = acc * vibrato;
    }

    apply_fade(&mut samples, (FADE_SECS * sample_rate as f32) as usize);
    normalize(&mut samples, PEAK_TARGET);

    PcmBuffer {
        samples,
        sample_rate,
    }
}

fn base_frequency(text: &str) -> f32 {
    (180 + (fnv1a(text.as_bytes()) % 100) as u32) as f32
}

// 64-bit FNV-1a over the UTF-8 bytes. The default hasher is randomized per
// process, which would make the fallback audio unreproducible.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x100_0000_01b3);
    }
    hash
}

// Linear ramps at both ends so the tone does not click. The fade length is
// clipped to half the buffer so a short buffer is never scaled twice.
fn apply_fade(samples: &mut [f32], fade_len: usize) {
    let fade_len = fade_len.min(samples.len() / 2);
    if fade_len < 2 {
        return;
    }
    let total = samples.len();
    for i in 0..fade_len {
        let ramp = i as f32 / (fade_len - 1) as f32;
        samples[i] *= ramp;
        samples[total - 1 - i] *= ramp;
    }
}

// Scale so the peak lands at `target`, leaving headroom below full scale.
// An all-zero buffer is left alone.
fn normalize(samples: &mut [f32], target: f32) {
    let peak = samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if peak > 0.0 {
        let gain = target / peak;
        for sample in samples.iter_mut() {
            *sample *= gain;
        }
    }
}
