//! Targeted keyword-window extraction
//!
//! Scans normalized visible text for tokens of interest (airport codes,
//! prices, clock times, flight numbers, durations, dates and domain
//! keywords), expands every hit by a context window, merges overlapping
//! windows and emits each merged region under a header listing its labels.
//!
//! ```text
//! [AIRPORT:JFK, FLIGHT:UA123, KEYWORD:flight]
//! Flight UA123 departs JFK
//!
//! [KEYWORD:price, PRICE:$245.00]
//! Price: $245.00
//! ```

use crate::text::{back_chars, forward_chars, normalize_whitespace};
use crate::vocabulary::{DEFAULT_KEYWORDS, KNOWN_AIRPORT_CODES};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::warn;

fn pattern(source: &str) -> Regex {
    Regex::new(source).expect("token pattern is valid")
}

static AIRPORT: Lazy<Regex> = Lazy::new(|| pattern(r"\b[A-Z]{3}\b"));
static PRICE: Lazy<Regex> = Lazy::new(|| pattern(r"[$€£¥]?\b\d+(?:,\d{3})*(?:\.\d{2})?\b"));
static TIME: Lazy<Regex> = Lazy::new(|| pattern(r"\b\d{1,2}:\d{2}(?:\s?[AaPp][Mm])?\b"));
static FLIGHT: Lazy<Regex> = Lazy::new(|| pattern(r"\b[A-Z]{1,2}\d{1,4}\b"));
static DURATION: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)\b\d+\s*h(?:ours?|rs?)?\s*\d+\s*m(?:in(?:ute)?s?)?\b"));
static DATE: Lazy<Regex> = Lazy::new(|| {
    pattern(r"\b(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Sept|Oct|Nov|Dec)[a-z]*\.?\s+\d{1,2}(?:st|nd|rd|th)?,?\s+\d{4}\b")
});

/// Settings for targeted extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetedConfig {
    /// Characters kept on each side of a match
    pub context_window: usize,

    /// Three-letter codes known to be airports
    pub known_codes: Vec<String>,

    /// Accept any all-uppercase three-letter token as an airport code.
    ///
    /// Recall over precision: common acronyms will match too.
    pub accept_unlisted_codes: bool,

    /// Whole-word keywords, matched case-insensitively
    pub keywords: Vec<String>,
}

impl Default for TargetedConfig {
    fn default() -> Self {
        Self {
            context_window: 200,
            known_codes: KNOWN_AIRPORT_CODES.iter().map(|code| code.to_string()).collect(),
            accept_unlisted_codes: true,
            keywords: DEFAULT_KEYWORDS.iter().map(|word| word.to_string()).collect(),
        }
    }
}

/// A token of interest in normalized text (byte offsets)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    /// Start offset
    pub start: usize,
    /// End offset, exclusive
    pub end: usize,
    /// `CLASS:token`
    pub label: String,
}

/// Context-expanded span covering one or more matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    /// Start offset
    pub start: usize,
    /// End offset, exclusive
    pub end: usize,
    /// Union of the labels of every merged match, sorted
    pub labels: BTreeSet<String>,
}

/// Targeted keyword-window extractor
#[derive(Debug, Clone)]
pub struct TargetedExtractor {
    context_window: usize,
    known_codes: HashSet<String>,
    accept_unlisted_codes: bool,
    keyword_pattern: Option<Regex>,
}

fn keyword_pattern(keywords: &[String]) -> Option<Regex> {
    let mut words: Vec<&str> = keywords
        .iter()
        .map(|word| word.trim())
        .filter(|word| !word.is_empty())
        .collect();
    if words.is_empty() {
        return None;
    }
    words.sort_by_key(|word| std::cmp::Reverse(word.len()));

    let alternation = words
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");
    match Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!(error = %e, "keyword list could not be compiled, keywords disabled");
            None
        }
    }
}

impl TargetedExtractor {
    /// Build an extractor from its configuration
    pub fn new(config: &TargetedConfig) -> Self {
        Self {
            context_window: config.context_window,
            known_codes: config.known_codes.iter().cloned().collect(),
            accept_unlisted_codes: config.accept_unlisted_codes,
            keyword_pattern: keyword_pattern(&config.keywords),
        }
    }

    /// Every token of interest in `text`, in scan order per class
    pub fn find_matches(&self, text: &str) -> Vec<Match> {
        let mut matches = Vec::new();

        for m in AIRPORT.find_iter(text) {
            if self.accept_unlisted_codes || self.known_codes.contains(m.as_str()) {
                matches.push(labeled("AIRPORT", &m));
            }
        }

        let classes: [(&str, &Regex); 5] = [
            ("PRICE", &*PRICE),
            ("TIME", &*TIME),
            ("FLIGHT", &*FLIGHT),
            ("DURATION", &*DURATION),
            ("DATE", &*DATE),
        ];
        for (class, regex) in classes {
            matches.extend(regex.find_iter(text).map(|m| labeled(class, &m)));
        }

        if let Some(keywords) = &self.keyword_pattern {
            matches.extend(keywords.find_iter(text).map(|m| Match {
                start: m.start(),
                end: m.end(),
                label: format!("KEYWORD:{}", m.as_str().to_lowercase()),
            }));
        }

        matches
    }

    /// Expand matches by the context window and merge overlapping or
    /// touching spans
    pub fn regions(&self, text: &str, matches: Vec<Match>) -> Vec<Region> {
        let mut expanded: Vec<Region> = matches
            .into_iter()
            .map(|m| Region {
                start: back_chars(text, m.start, self.context_window),
                end: forward_chars(text, m.end, self.context_window),
                labels: BTreeSet::from([m.label]),
            })
            .collect();
        expanded.sort_by_key(|region| (region.start, region.end));

        let mut merged: Vec<Region> = Vec::with_capacity(expanded.len());
        for region in expanded {
            match merged.last_mut() {
                Some(last) if region.start <= last.end => {
                    last.end = last.end.max(region.end);
                    last.labels.extend(region.labels);
                }
                _ => merged.push(region),
            }
        }
        merged
    }

    /// Reduce visible text to labelled regions.
    ///
    /// Returns an empty string when nothing of interest is found.
    pub fn extract(&self, text: &str) -> String {
        let normalized = normalize_whitespace(text);
        let matches = self.find_matches(&normalized);
        if matches.is_empty() {
            return String::new();
        }

        self.regions(&normalized, matches)
            .iter()
            .map(|region| {
                let labels = region.labels.iter().cloned().collect::<Vec<_>>().join(", ");
                format!("[{}]\n{}", labels, &normalized[region.start..region.end])
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Default for TargetedExtractor {
    fn default() -> Self {
        Self::new(&TargetedConfig::default())
    }
}

fn labeled(class: &str, m: &regex::Match<'_>) -> Match {
    Match {
        start: m.start(),
        end: m.end(),
        label: format!("{}:{}", class, m.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITINERARY: &str = "Flight UA123 departs JFK at 14:30, arrives LAX. Price: $245.00";

    fn extractor(window: usize) -> TargetedExtractor {
        TargetedExtractor::new(&TargetedConfig {
            context_window: window,
            ..TargetedConfig::default()
        })
    }

    fn labels(matches: &[Match]) -> Vec<&str> {
        matches.iter().map(|m| m.label.as_str()).collect()
    }

    #[test]
    fn test_finds_every_token_class() {
        let matches = extractor(10).find_matches(ITINERARY);
        let found = labels(&matches);
        assert!(found.contains(&"FLIGHT:UA123"));
        assert!(found.contains(&"AIRPORT:JFK"));
        assert!(found.contains(&"AIRPORT:LAX"));
        assert!(found.contains(&"TIME:14:30"));
        assert!(found.contains(&"PRICE:$245.00"));
        assert!(found.contains(&"KEYWORD:flight"));
        assert!(found.contains(&"KEYWORD:price"));
    }

    #[test]
    fn test_duration_and_date() {
        let matches = extractor(10).find_matches("Total 5h 20m on Mar 14, 2025 and 1 hour 5 minutes");
        let found = labels(&matches);
        assert!(found.contains(&"DURATION:5h 20m"));
        assert!(found.contains(&"DURATION:1 hour 5 minutes"));
        assert!(found.contains(&"DATE:Mar 14, 2025"));
    }

    #[test]
    fn test_time_with_meridiem() {
        let matches = extractor(10).find_matches("boarding 9:05 pm sharp");
        assert!(labels(&matches).contains(&"TIME:9:05 pm"));
    }

    #[test]
    fn test_unlisted_codes_follow_config() {
        let loose = extractor(10).find_matches("the NBA game");
        assert!(labels(&loose).contains(&"AIRPORT:NBA"));

        let strict = TargetedExtractor::new(&TargetedConfig {
            accept_unlisted_codes: false,
            ..TargetedConfig::default()
        });
        let found = strict.find_matches("the NBA game to SFO");
        assert_eq!(labels(&found), vec!["AIRPORT:SFO"]);
    }

    #[test]
    fn test_overlapping_windows_merge_with_label_union() {
        let extractor = extractor(3);
        let text = "aa JFK LAX bb";
        let regions = extractor.regions(text, extractor.find_matches(text));
        assert_eq!(regions.len(), 1);
        let labels: Vec<_> = regions[0].labels.iter().cloned().collect();
        assert_eq!(labels, vec!["AIRPORT:JFK", "AIRPORT:LAX"]);
        assert_eq!(&text[regions[0].start..regions[0].end], "aa JFK LAX bb");
    }

    #[test]
    fn test_distant_matches_stay_separate() {
        let extractor = extractor(2);
        let text = format!("JFK {} LAX", "x".repeat(40));
        let output = extractor.extract(&text);
        assert_eq!(output, "[AIRPORT:JFK]\nJFK x\n\n[AIRPORT:LAX]\nx LAX");
    }

    #[test]
    fn test_touching_windows_merge() {
        let extractor = TargetedExtractor::new(&TargetedConfig {
            context_window: 0,
            keywords: Vec::new(),
            ..TargetedConfig::default()
        });
        let regions = extractor.regions(
            "ab",
            vec![
                Match { start: 0, end: 1, label: "B".to_string() },
                Match { start: 1, end: 2, label: "A".to_string() },
            ],
        );
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].labels.iter().next().unwrap(), "A");
    }

    #[test]
    fn test_itinerary_scenario() {
        let output = extractor(10).extract(ITINERARY);
        assert!(output.starts_with('['));
        for label in ["FLIGHT:UA123", "AIRPORT:JFK", "TIME:", "AIRPORT:LAX", "PRICE:"] {
            assert!(output.contains(label), "missing {} in {}", label, output);
        }
    }

    #[test]
    fn test_no_matches_is_empty() {
        assert_eq!(extractor(200).extract("Hello world, nothing relevant here."), "");
        assert_eq!(extractor(200).extract(""), "");
    }

    #[test]
    fn test_input_is_normalized_first() {
        let output = extractor(4).extract("lorem\n\n   JFK\t\tipsum");
        assert_eq!(output, "[AIRPORT:JFK]\nrem JFK ips");
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let config: TargetedConfig = serde_json::from_str(r#"{"context_window": 50}"#).unwrap();
        assert_eq!(config.context_window, 50);
        assert!(config.accept_unlisted_codes);
        assert!(config.known_codes.contains(&"JFK".to_string()));
    }
}
