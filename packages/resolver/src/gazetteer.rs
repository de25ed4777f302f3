//! Gazetteer dataset loading.
//!
//! Loads the authoritative record set once per process, hydrates each
//! record with its own normalized form and token vector, and deduplicates
//! on `(official_name, latitude, longitude)`.

use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use lake_resolver_models::{FeatureType, GazetteerRecord, ResolverConfig};
use serde::Deserialize;

use crate::ResolverError;
use crate::normalize;

#[derive(Debug, Deserialize)]
struct RawGazetteerRecord {
    #[serde(alias = "gnis_id")]
    id: String,
    official_name: String,
    feature_type: String,
    #[serde(default)]
    county_name: String,
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    alternative_names: Vec<String>,
}

/// A lazily-loaded, process-wide gazetteer.
///
/// The first call to [`GazetteerStore::get_or_load`] reads and hydrates the
/// dataset under a one-shot initializer; subsequent calls, including
/// concurrent ones racing the first, return the same published slice
/// without re-reading the file or re-running the normalizer.
#[derive(Default)]
pub struct GazetteerStore {
    records: OnceLock<Vec<GazetteerRecord>>,
}

impl GazetteerStore {
    /// Creates an unloaded store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: OnceLock::new(),
        }
    }

    /// Returns the hydrated record set, loading it on first call.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::DatasetMissing`] if the primary dataset path
    /// cannot be read, or [`ResolverError::DatasetCorrupt`] if it cannot be
    /// parsed. Neither failure is cached: a later call retries the load.
    pub fn get_or_load(&self, config: &ResolverConfig) -> Result<&[GazetteerRecord], ResolverError> {
        if let Some(records) = self.records.get() {
            return Ok(records);
        }

        let loaded = load(config)?;
        // Another thread may have won the race; either outcome publishes a
        // valid, identical-in-content record set.
        let _ = self.records.set(loaded);
        Ok(self
            .records
            .get()
            .expect("records were just set or already present"))
    }
}

fn load(config: &ResolverConfig) -> Result<Vec<GazetteerRecord>, ResolverError> {
    let primary = load_file(&config.gazetteer_path)?;
    let mut hydrated = hydrate(primary);

    if let Some(hydro_path) = &config.hydrography_path {
        if hydro_path.exists() {
            let secondary = load_file(hydro_path)?;
            hydrated.extend(hydrate(secondary));
        } else {
            log::warn!(
                "Hydrography dataset not found at {}, ignoring.",
                hydro_path.display()
            );
        }
    }

    Ok(dedupe(hydrated))
}

fn load_file(path: &Path) -> Result<Vec<RawGazetteerRecord>, ResolverError> {
    let data = std::fs::read_to_string(path)
        .map_err(|_| ResolverError::DatasetMissing(path.display().to_string()))?;
    serde_json::from_str(&data)
        .map_err(|e| ResolverError::DatasetCorrupt(format!("{}: {e}", path.display())))
}

/// Normalizes each record's `official_name`, attaches `normalized`/`tokens`,
/// and drops records whose `feature_type` is not `{lake, reservoir, pond}`
/// or whose coordinates are not both finite.
fn hydrate(raw: Vec<RawGazetteerRecord>) -> Vec<GazetteerRecord> {
    raw.into_iter()
        .filter_map(|r| {
            let feature_type = FeatureType::from_source_str(&r.feature_type)?;
            if !r.latitude.is_finite() || !r.longitude.is_finite() {
                return None;
            }
            let normalized = normalize::normalize(&r.official_name, None);
            Some(GazetteerRecord {
                id: r.id,
                official_name: r.official_name,
                feature_type,
                county_name: r.county_name,
                latitude: r.latitude,
                longitude: r.longitude,
                alternative_names: r.alternative_names,
                normalized: normalized.normalized,
                tokens: normalized.tokens,
            })
        })
        .collect()
}

/// Deduplicates on `(official_name, latitude, longitude)`, first occurrence
/// wins.
fn dedupe(records: Vec<GazetteerRecord>) -> Vec<GazetteerRecord> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(records.len());
    for record in records {
        let key = (
            record.official_name.clone(),
            record.latitude.to_bits(),
            record.longitude.to_bits(),
        );
        if seen.insert(key) {
            out.push(record);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    struct TempJsonFile {
        path: PathBuf,
    }

    impl TempJsonFile {
        fn new(contents: &str) -> Self {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let path = std::env::temp_dir().join(format!(
                "lake_resolver_gazetteer_test_{}_{n}.json",
                std::process::id()
            ));
            std::fs::write(&path, contents).expect("write temp dataset");
            Self { path }
        }
    }

    impl Drop for TempJsonFile {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.path);
        }
    }

    #[test]
    fn missing_primary_dataset_is_dataset_missing() {
        let config = ResolverConfig {
            gazetteer_path: std::env::temp_dir().join("lake_resolver_does_not_exist_12345.json"),
            ..ResolverConfig::default()
        };
        let store = GazetteerStore::new();
        let err = store.get_or_load(&config).unwrap_err();
        assert!(matches!(err, ResolverError::DatasetMissing(_)));
    }

    #[test]
    fn malformed_json_is_dataset_corrupt() {
        let file = TempJsonFile::new("not json");
        let config = ResolverConfig {
            gazetteer_path: file.path.clone(),
            ..ResolverConfig::default()
        };
        let store = GazetteerStore::new();
        let err = store.get_or_load(&config).unwrap_err();
        assert!(matches!(err, ResolverError::DatasetCorrupt(_)));
    }

    #[test]
    fn loads_hydrates_filters_and_dedupes() {
        let file = TempJsonFile::new(
            r#"[
                {"gnis_id": "1", "official_name": "Battle Ground Lake", "feature_type": "lake", "county_name": "Clark", "latitude": 45.78, "longitude": -122.54, "alternative_names": []},
                {"gnis_id": "1", "official_name": "Battle Ground Lake", "feature_type": "lake", "county_name": "Clark", "latitude": 45.78, "longitude": -122.54, "alternative_names": []},
                {"id": "2", "official_name": "Some River", "feature_type": "river", "county_name": "Clark", "latitude": 45.0, "longitude": -122.0, "alternative_names": []}
            ]"#,
        );
        let config = ResolverConfig {
            gazetteer_path: file.path.clone(),
            ..ResolverConfig::default()
        };
        let store = GazetteerStore::new();
        let records = store.get_or_load(&config).expect("dataset loads");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].official_name, "Battle Ground Lake");
        assert_eq!(records[0].feature_type, FeatureType::Lake);
        assert_eq!(records[0].normalized, "battle ground lake");
    }

    #[test]
    fn missing_hydrography_path_is_ignored_not_an_error() {
        let file = TempJsonFile::new(
            r#"[{"gnis_id": "1", "official_name": "Long Lake", "feature_type": "lake", "county_name": "King", "latitude": 47.5, "longitude": -122.2, "alternative_names": []}]"#,
        );
        let config = ResolverConfig {
            gazetteer_path: file.path.clone(),
            hydrography_path: Some(std::env::temp_dir().join("lake_resolver_missing_hydro_99.json")),
            ..ResolverConfig::default()
        };
        let store = GazetteerStore::new();
        let records = store.get_or_load(&config).expect("primary alone still loads");
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn second_load_reuses_published_records() {
        let file = TempJsonFile::new(
            r#"[{"gnis_id": "1", "official_name": "Long Lake", "feature_type": "lake", "county_name": "King", "latitude": 47.5, "longitude": -122.2, "alternative_names": []}]"#,
        );
        let config = ResolverConfig {
            gazetteer_path: file.path.clone(),
            ..ResolverConfig::default()
        };
        let store = GazetteerStore::new();
        let first = store.get_or_load(&config).expect("loads").as_ptr();
        let second = store.get_or_load(&config).expect("loads").as_ptr();
        assert_eq!(first, second);
    }
}
