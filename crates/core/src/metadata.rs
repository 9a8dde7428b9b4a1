//! Placeholder preview metadata.
//!
//! Duration, waveform, tempo and key are made up for display. They are not
//! measured from audio and never feed into classification.

use crate::models::{CandidateFile, SampleMetadata};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const WAVEFORM_POINTS: usize = 50;
const KEYS: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Produces metadata for a file. Files carrying a fingerprint get an RNG
/// seeded from it, so the same bytes always render the same preview.
pub fn generate(file: &CandidateFile) -> SampleMetadata {
    match file.fingerprint.as_deref().and_then(seed_from_hex) {
        Some(seed) => generate_with(&mut StdRng::from_seed(seed)),
        None => generate_with(&mut rand::thread_rng()),
    }
}

pub fn generate_with<R: Rng>(rng: &mut R) -> SampleMetadata {
    SampleMetadata {
        duration_seconds: rng.gen_range(0.0..5.0),
        waveform: waveform(rng, WAVEFORM_POINTS),
        bpm: rng.gen_range(80..120),
        key: KEYS[rng.gen_range(0..KEYS.len())].to_string(),
    }
}

/// Decaying envelope with a little sine wobble and noise, clamped to [0, 1].
fn waveform<R: Rng>(rng: &mut R, points: usize) -> Vec<f32> {
    let phase: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
    (0..points)
        .map(|i| {
            let position = i as f32 / points as f32;
            let wobble = (phase + i as f32 * 10.0).sin() * 0.2;
            let envelope = (-position * 3.0).exp() * 0.7 + 0.3;
            let noise: f32 = rng.gen_range(0.0..0.3);
            ((noise + envelope + wobble) * 0.7).clamp(0.0, 1.0)
        })
        .collect()
}

fn seed_from_hex(hex: &str) -> Option<[u8; 32]> {
    let bytes = hex.as_bytes();
    if bytes.len() < 64 {
        return None;
    }
    let mut seed = [0u8; 32];
    for (i, slot) in seed.iter_mut().enumerate() {
        let pair = std::str::from_utf8(&bytes[i * 2..i * 2 + 2]).ok()?;
        *slot = u8::from_str_radix(pair, 16).ok()?;
    }
    Some(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fingerprinted(fp: &str) -> CandidateFile {
        CandidateFile::new("kick.wav", None, 10, 0)
            .unwrap()
            .with_fingerprint(Some(fp.to_string()))
    }

    #[test]
    fn values_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let meta = generate_with(&mut rng);
            assert!((0.0..5.0).contains(&meta.duration_seconds));
            assert!((80..120).contains(&meta.bpm));
            assert!(KEYS.contains(&meta.key.as_str()));
            assert_eq!(meta.waveform.len(), WAVEFORM_POINTS);
            assert!(meta.waveform.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }

    #[test]
    fn fingerprint_makes_metadata_reproducible() {
        let fp = blake3::hash(b"same bytes").to_hex().to_string();
        let a = generate(&fingerprinted(&fp));
        let b = generate(&fingerprinted(&fp));
        assert_eq!(a.bpm, b.bpm);
        assert_eq!(a.key, b.key);
        assert_eq!(a.waveform, b.waveform);
    }

    #[test]
    fn malformed_fingerprint_is_ignored() {
        assert!(seed_from_hex("abc").is_none());
        assert!(seed_from_hex(&"zz".repeat(32)).is_none());
    }
}
