#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared types for the lake name resolver.
//!
//! This crate contains only data types and simple conversions. It has no
//! heavyweight dependencies (no regex, no I/O, no database client) so it can
//! be depended on by both the resolver core and the HTTP surface without
//! pulling in either's implementation details.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// `matched_score` sentinel for a manual override: the maximum safe integer
/// of an IEEE-754 double (`2^53 - 1`), preserved for wire compatibility with
/// consumers that decode `matched_score` as a JSON number.
pub const MANUAL_OVERRIDE_SCORE: i64 = 9_007_199_254_740_991;

/// One of the feature types carried by the gazetteer. Records of any other
/// type are filtered out at ingest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    /// A natural or artificial lake.
    Lake,
    /// An impounded reservoir.
    Reservoir,
    /// A pond.
    Pond,
}

impl FeatureType {
    /// Parses a feature type from the raw gazetteer dataset's string value.
    ///
    /// Matching is case-insensitive. Returns `None` for any value outside
    /// `{lake, reservoir, pond}`, which the loader uses to drop the record.
    #[must_use]
    pub fn from_source_str(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "lake" => Some(Self::Lake),
            "reservoir" => Some(Self::Reservoir),
            "pond" => Some(Self::Pond),
            _ => None,
        }
    }

    /// The lowercase string tag used in the `feature_type` wire field.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lake => "lake",
            Self::Reservoir => "reservoir",
            Self::Pond => "pond",
        }
    }
}

/// An immutable entry in the authoritative gazetteer dataset, hydrated with
/// its own normalized form at load time.
///
/// Uniquely identified by `(official_name, latitude, longitude)`; the
/// gazetteer store drops duplicates of that tuple at load time, first
/// occurrence wins.
#[derive(Debug, Clone, PartialEq)]
pub struct GazetteerRecord {
    /// Stable identifier from the source dataset (`gnis_id` or `id`).
    pub id: String,
    /// Canonical display name.
    pub official_name: String,
    /// One of `{lake, reservoir, pond}`.
    pub feature_type: FeatureType,
    /// Administrative county label. May be empty.
    pub county_name: String,
    /// Decimal degrees latitude. Always finite.
    pub latitude: f64,
    /// Decimal degrees longitude. Always finite.
    pub longitude: f64,
    /// Unordered aliases for the record, possibly empty.
    pub alternative_names: Vec<String>,
    /// `Normalizer(official_name).normalized`.
    pub normalized: String,
    /// `Normalizer(official_name).tokens`.
    pub tokens: Vec<String>,
}

/// The output of the normalizer: a normalized string, its token vector, and
/// an optional county hint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedQuery {
    /// Lowercase ASCII letter-and-digit string with single-space separators.
    pub normalized: String,
    /// Ordered tokens, duplicates removed, first occurrence preserved.
    pub tokens: Vec<String>,
    /// Lowercase multi-word county name, if one was detected or supplied.
    pub county_hint: Option<String>,
}

/// Which stage of the resolver produced a [`MatchResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    /// Returned from the hand-curated override table.
    ManualOverride,
    /// Returned from the persistent result cache.
    Cache,
    /// Computed by the matcher (token or fuzzy strategy).
    Algorithm,
}

/// Which matcher strategy produced an algorithmic [`MatchResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// Token-overlap + edit-distance composite scoring cleared the
    /// acceptance threshold.
    Token,
    /// Pure edit-distance fallback over the full gazetteer.
    Fuzzy,
}

/// The resolver's response: an official name and coordinates, or the null
/// result, along with the provenance of the answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Canonical display name, or `None` for the null result.
    #[serde(rename = "officialName")]
    pub official_name: Option<String>,
    /// Decimal degrees latitude.
    pub lat: Option<f64>,
    /// Decimal degrees longitude.
    pub lng: Option<f64>,
    /// `0` for the null result, a sentinel for manual overrides, otherwise
    /// the computed token or fuzzy score.
    pub matched_score: i64,
    /// Which stage produced this result.
    pub source: MatchSource,
    /// Present only when `source == Algorithm`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<MatchStrategy>,
    /// Present only for algorithmic, token-strategy matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_type: Option<String>,
    /// Present only for algorithmic, token-strategy matches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub county_name: Option<String>,
}

impl MatchResult {
    /// The null result: no match, `matched_score == 0`, `source == Algorithm`.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            official_name: None,
            lat: None,
            lng: None,
            matched_score: 0,
            source: MatchSource::Algorithm,
            strategy: None,
            feature_type: None,
            county_name: None,
        }
    }
}

/// A persisted cache entry, as read from or written to the result cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheRecord {
    /// Canonical display name.
    pub official_name: String,
    /// Decimal degrees latitude.
    pub lat: f64,
    /// Decimal degrees longitude.
    pub lng: f64,
    /// The score the entry was written with.
    pub matched_score: i64,
    /// ISO-8601 timestamp of when the entry was written.
    pub created_at: String,
}

/// Environment-sourced configuration for the resolver.
///
/// Constructed once at process startup (see `lake_resolver::ResolverConfig::from_env`)
/// and passed by reference into the facade; this crate only holds the data.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// `GAZETTEER_PATH` — primary dataset path (required).
    pub gazetteer_path: PathBuf,
    /// `HYDROGRAPHY_PATH` — optional secondary dataset path.
    pub hydrography_path: Option<PathBuf>,
    /// `OVERRIDE_PATH` — override table path (optional).
    pub override_path: Option<PathBuf>,
    /// `CACHE_TABLE` — cache backend identifier; absence disables caching.
    pub cache_table: Option<String>,
    /// `MIN_TOKEN_SCORE` — acceptance threshold for the token strategy.
    pub min_token_score: i64,
}

/// Default acceptance threshold for the token-overlap matching strategy.
pub const DEFAULT_MIN_TOKEN_SCORE: i64 = 3;

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            gazetteer_path: PathBuf::new(),
            hydrography_path: None,
            override_path: None,
            cache_table: None,
            min_token_score: DEFAULT_MIN_TOKEN_SCORE,
        }
    }
}
