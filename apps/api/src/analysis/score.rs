//! Score extraction from free-form model output.
//!
//! The model is asked for a `Score: <n>` line but nothing enforces it, so
//! parsing is total: a missing score becomes 0 (the rejection tier) and an
//! out-of-range score is clamped to 100. Both fallbacks are logged.

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

pub const MAX_SCORE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSource {
    /// A `Score:` line was found and in range.
    Parsed,
    /// A `Score:` line was found but exceeded 100.
    Clamped,
    /// No `Score:` line; defaulted to 0.
    Missing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedScore {
    pub score: u8,
    pub source: ScoreSource,
}

fn score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Tolerates markdown emphasis the model likes to add: "**Score:** 85".
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:Score|SCORE)\s*:\s*\**\s*(\d+)").expect("score pattern is valid")
    })
}

/// Extracts the first `Score:`/`SCORE:` integer from `text`. Never fails.
pub fn parse_score(text: &str) -> ParsedScore {
    let Some(digits) = score_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        warn!("No score line found in analysis response; defaulting to 0");
        return ParsedScore {
            score: 0,
            source: ScoreSource::Missing,
        };
    };

    // Digits only, so a parse failure can only be overflow.
    let raw = digits.parse::<u64>().unwrap_or(u64::MAX);
    if raw > u64::from(MAX_SCORE) {
        warn!(raw_score = %digits, "Analysis score above {MAX_SCORE}; clamping");
        return ParsedScore {
            score: MAX_SCORE,
            source: ScoreSource::Clamped,
        };
    }

    ParsedScore {
        score: raw as u8,
        source: ScoreSource::Parsed,
    }
}
