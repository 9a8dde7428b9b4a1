//! Last-resort keyword heuristics standing in for a spectral analysis.
//!
//! Nothing here looks at audio. Terms are tested as plain substrings of the
//! lower-cased file name, which is deliberately looser than the word-boundary
//! rules in [`crate::taxonomy`].

use crate::models::CategoryId;
use crate::taxonomy::{
    HIGH_FREQUENCY_TERMS, LOW_FREQUENCY_TERMS, OVERRIDE_808_CYMBAL, PERCUSSIVE_TERMS,
};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpectralProfile {
    pub is_low_freq: bool,
    pub is_mid_freq: bool,
    pub is_high_freq: bool,
    pub is_percussive: bool,
}

pub fn profile(file_name: &str) -> SpectralProfile {
    let name = file_name.to_lowercase();
    let contains_any = |terms: &[&str]| terms.iter().any(|t| name.contains(*t));
    let is_low_freq = contains_any(&LOW_FREQUENCY_TERMS[..]);
    let is_high_freq = contains_any(&HIGH_FREQUENCY_TERMS[..]);
    let is_percussive = contains_any(&PERCUSSIVE_TERMS[..]);
    SpectralProfile {
        is_low_freq,
        is_mid_freq: !is_low_freq && !is_high_freq,
        is_high_freq,
        is_percussive,
    }
}

/// Decision table over the keyword buckets. `None` means nothing fired and
/// the caller should settle on [`CategoryId::Other`].
pub fn guess(profile: &SpectralProfile) -> Option<CategoryId> {
    match (profile.is_high_freq, profile.is_low_freq, profile.is_percussive) {
        (true, _, _) => Some(CategoryId::Hihats),
        (false, true, false) => Some(CategoryId::Bass),
        (false, true, true) => Some(CategoryId::Kicks),
        (false, false, true) => Some(CategoryId::Percussion),
        (false, false, false) => None,
    }
}

/// "808 crash" / "808 cymbal" (space separated) always belong with hi-hats.
pub fn forces_hihats(file_name: &str) -> bool {
    let name = file_name.to_lowercase();
    OVERRIDE_808_CYMBAL.iter().any(|r| r.is_match(&name))
}
