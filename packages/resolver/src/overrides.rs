//! Hand-curated override table.
//!
//! Checked before the cache and before the matcher: an exact, trimmed-string
//! match here always wins, carrying the sentinel [`MANUAL_OVERRIDE_SCORE`].
//! A missing override file is not an error — it simply means no overrides
//! are configured.

use std::collections::HashMap;
use std::sync::OnceLock;

use lake_resolver_models::{MANUAL_OVERRIDE_SCORE, MatchResult, MatchSource, ResolverConfig};
use serde::Deserialize;

use crate::ResolverError;

#[derive(Debug, Deserialize)]
struct OverrideEntry {
    official_name: String,
    lat: f64,
    lng: f64,
}

/// A lazily-loaded, process-wide override table, keyed by the exact,
/// trimmed raw name a caller supplied.
#[derive(Default)]
pub struct OverrideTable {
    entries: OnceLock<HashMap<String, OverrideEntry>>,
}

impl OverrideTable {
    /// Creates an unloaded table.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: OnceLock::new(),
        }
    }

    /// Loads the table on first call, returning an empty map (not an error)
    /// if `config.override_path` is unset or names a missing file.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::DatasetCorrupt`] if the file exists but
    /// cannot be parsed as the expected JSON object.
    fn get_or_load(&self, config: &ResolverConfig) -> Result<&HashMap<String, OverrideEntry>, ResolverError> {
        if let Some(entries) = self.entries.get() {
            return Ok(entries);
        }

        let loaded = load(config)?;
        let _ = self.entries.set(loaded);
        Ok(self
            .entries
            .get()
            .expect("entries were just set or already present"))
    }

    /// Looks up `raw_name`, trimmed, for an exact override.
    ///
    /// # Errors
    ///
    /// Propagates [`ResolverError::DatasetCorrupt`] from the lazy load.
    pub fn check(&self, raw_name: &str, config: &ResolverConfig) -> Result<Option<MatchResult>, ResolverError> {
        let entries = self.get_or_load(config)?;
        let key = raw_name.trim();
        Ok(entries.get(key).map(|entry| MatchResult {
            official_name: Some(entry.official_name.clone()),
            lat: Some(entry.lat),
            lng: Some(entry.lng),
            matched_score: MANUAL_OVERRIDE_SCORE,
            source: MatchSource::ManualOverride,
            strategy: None,
            feature_type: None,
            county_name: None,
        }))
    }
}

fn load(config: &ResolverConfig) -> Result<HashMap<String, OverrideEntry>, ResolverError> {
    let Some(path) = &config.override_path else {
        return Ok(HashMap::new());
    };

    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(_) => {
            log::warn!("Override file not found at {}, ignoring.", path.display());
            return Ok(HashMap::new());
        }
    };

    serde_json::from_str(&data)
        .map_err(|e| ResolverError::DatasetCorrupt(format!("{}: {e}", path.display())))
}
