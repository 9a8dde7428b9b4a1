//! Pure file-name categorization.
//!
//! Stages run in order and stop at the first that resolves:
//! name rules, folder rules, keyword heuristics. The 808 cymbal override is
//! checked last and wins over all of them. Anything still unresolved is
//! [`CategoryId::Other`].

use crate::models::{is_supported_audio, CategoryId};
use crate::spectral;
use crate::taxonomy::{Rule, NAME_RULES, PATH_RULES};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Name,
    Path,
    Spectral,
    Override,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub category: CategoryId,
    pub stage: Stage,
    /// Name of the taxonomy rule that fired, for the name and path stages.
    pub rule: Option<&'static str>,
}

pub fn classify(file_name: &str, relative_path: Option<&str>) -> CategoryId {
    explain(file_name, relative_path).category
}

pub fn explain(file_name: &str, relative_path: Option<&str>) -> Classification {
    let resolved = classify_name(file_name)
        .map(|(category, rule)| Classification {
            category,
            stage: Stage::Name,
            rule: Some(rule),
        })
        .or_else(|| {
            relative_path
                .and_then(|p| classify_path(file_name, p))
                .map(|(category, rule)| Classification {
                    category,
                    stage: Stage::Path,
                    rule: Some(rule),
                })
        })
        .or_else(|| {
            spectral::guess(&spectral::profile(file_name)).map(|category| Classification {
                category,
                stage: Stage::Spectral,
                rule: None,
            })
        });

    if spectral::forces_hihats(file_name) {
        return Classification {
            category: CategoryId::Hihats,
            stage: Stage::Override,
            rule: None,
        };
    }

    resolved.unwrap_or(Classification {
        category: CategoryId::Other,
        stage: Stage::Fallback,
        rule: None,
    })
}

/// First name rule that matches, or `None` when the name says nothing.
pub fn classify_name(file_name: &str) -> Option<(CategoryId, &'static str)> {
    first_match(&NAME_RULES, &normalize(file_name))
}

/// Tries each directory of `relative_path`, outermost first. The file name
/// itself is not treated as a folder.
pub fn classify_path(file_name: &str, relative_path: &str) -> Option<(CategoryId, &'static str)> {
    folder_segments(file_name, relative_path)
        .iter()
        .find_map(|segment| first_match(&PATH_RULES, &normalize(segment)))
}

fn first_match(rules: &'static [Rule], text: &str) -> Option<(CategoryId, &'static str)> {
    if text.is_empty() {
        return None;
    }
    rules
        .iter()
        .find(|rule| rule.matches(text))
        .map(|rule| (rule.category, rule.name))
}

fn folder_segments<'a>(file_name: &str, relative_path: &'a str) -> Vec<&'a str> {
    let mut segments: Vec<&str> = relative_path
        .split(['/', '\\'])
        .filter(|s| !s.trim().is_empty())
        .collect();
    if segments
        .last()
        .map(|last| last.eq_ignore_ascii_case(file_name))
        .unwrap_or(false)
    {
        segments.pop();
    }
    segments
}

/// Lower-cases, drops an audio extension, and splits the name into
/// space-separated tokens at punctuation and letter/digit boundaries, so
/// "Kick_01.wav" reads as "kick 01" and "tr808" as "tr 808".
pub fn normalize(name: &str) -> String {
    let path = Path::new(name);
    let base = if is_supported_audio(path) {
        path.file_stem().and_then(|s| s.to_str()).unwrap_or(name)
    } else {
        name
    };

    let mut out = String::with_capacity(base.len() + 4);
    let mut prev: Option<char> = None;
    for ch in base.chars().flat_map(char::to_lowercase) {
        if !ch.is_alphanumeric() {
            if !out.is_empty() && !out.ends_with(' ') {
                out.push(' ');
            }
            prev = None;
            continue;
        }
        if let Some(p) = prev {
            if p.is_ascii_digit() != ch.is_ascii_digit() {
                out.push(' ');
            }
        }
        out.push(ch);
        prev = Some(ch);
    }
    out.trim_end().to_string()
}
