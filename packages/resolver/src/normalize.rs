//! Normalization of raw agency-supplied lake designations.
//!
//! Applied symmetrically at gazetteer-load time (over `official_name` and
//! each alternative name) and at query time, so `"LEWIS CO PRK PD-S"` and a
//! gazetteer record's spelled-out name land on overlapping token streams.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use lake_resolver_models::NormalizedQuery;

use crate::synonyms;

static PAREN_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([A-Z]{3,5})\)").expect("valid regex"));

/// Normalizes a raw designation into a [`NormalizedQuery`].
///
/// `explicit_county`, if present and non-empty, overrides county-hint
/// detection. Empty or whitespace-only input yields the empty query
/// (`normalized: ""`, `tokens: []`, `county_hint: None`).
#[must_use]
pub fn normalize(raw_name: &str, explicit_county: Option<&str>) -> NormalizedQuery {
    if raw_name.trim().is_empty() {
        return NormalizedQuery::default();
    }

    let detected = detect_county_hint(raw_name);
    let county_hint = explicit_county
        .and_then(normalize_county_input)
        .or_else(|| detected.and_then(normalize_county_input));

    let (normalized, tokens) = normalize_characters_and_tokens(raw_name);

    NormalizedQuery {
        normalized,
        tokens,
        county_hint,
    }
}

/// Detects a county hint from the raw designation, trying three tiers in
/// order: parenthesized codes, `<CODE> CO`/`<CODE> COUNTY` substrings, then
/// any full county name appearing as a substring.
fn detect_county_hint(raw_name: &str) -> Option<&'static str> {
    let upper = raw_name.to_uppercase();

    for caps in PAREN_CODE_RE.captures_iter(&upper) {
        if let Some(name) = synonyms::county_name_for_code(&caps[1]) {
            return Some(name);
        }
    }

    for (code, name) in synonyms::county_codes() {
        if upper.contains(&format!("{code} CO")) || upper.contains(&format!("{code} COUNTY")) {
            return Some(name);
        }
    }

    for name in synonyms::county_names() {
        if upper.contains(&name.to_uppercase()) {
            return Some(name);
        }
    }

    None
}

/// Lowercases, strips `county`/`cnty` and non-alphabetic characters, and
/// collapses whitespace. Returns `None` if the result is empty.
fn normalize_county_input(value: &str) -> Option<String> {
    let lower = value.to_lowercase().replace("county", " ").replace("cnty", " ");
    let cleaned: String = lower
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_whitespace() { c } else { ' ' })
        .collect();
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() { None } else { Some(collapsed) }
}

/// Replaces `&` with `" and "`, replaces `-_/()` with spaces, strips any
/// remaining non-alphanumeric character to a space, lowercases, expands
/// abbreviations and county codes per token, and deduplicates the result
/// preserving first occurrence.
fn normalize_characters_and_tokens(raw_name: &str) -> (String, Vec<String>) {
    let with_and = raw_name.replace('&', " and ");
    let no_separators = with_and.replace(['-', '_', '/', '(', ')'], " ");
    let cleaned: String = no_separators
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c.is_whitespace() { c } else { ' ' })
        .collect();
    let lowered = cleaned.to_lowercase();

    let mut expanded = Vec::new();
    for token in lowered.split_whitespace() {
        expanded.extend(synonyms::expand_token(token));
    }

    let mut seen = HashSet::new();
    let mut tokens = Vec::with_capacity(expanded.len());
    for token in expanded {
        if seen.insert(token.clone()) {
            tokens.push(token);
        }
    }

    let normalized = tokens.join(" ");
    (normalized, tokens)
}
