#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Deterministic lake name resolution.
//!
//! [`ResolverFacade`] is the single entry point: it checks the manual
//! override table, then the result cache, then runs the normalizer and
//! matcher against the gazetteer, writing a successful algorithmic match
//! back to the cache before returning it.

mod cache;
mod gazetteer;
mod matcher;
mod normalize;
mod overrides;
mod synonyms;

use std::sync::Arc;

use lake_resolver_models::{
    CacheRecord, DEFAULT_MIN_TOKEN_SCORE, MatchResult, MatchSource, ResolverConfig,
};

pub use cache::{DuckDbCache, NullCache, ResultCache};
pub use gazetteer::GazetteerStore;
pub use overrides::OverrideTable;

/// Errors the facade itself can return. Cache unavailability and "no match
/// found" are not errors: the former degrades to [`NullCache`] with a log
/// line, the latter is a normal [`MatchResult::none`] response.
#[derive(Debug, thiserror::Error)]
pub enum ResolverError {
    /// The supplied name was empty or whitespace-only.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The configured dataset path could not be read.
    #[error("dataset missing: {0}")]
    DatasetMissing(String),
    /// The dataset was read but could not be parsed.
    #[error("dataset corrupt: {0}")]
    DatasetCorrupt(String),
}

/// Reads a [`ResolverConfig`] from the process environment.
///
/// `GAZETTEER_PATH` is read eagerly into the config but not validated here;
/// a missing or unreadable dataset surfaces as [`ResolverError::DatasetMissing`]
/// on first [`ResolverFacade::resolve`] call (or at eager startup load, if
/// the caller chooses to force one).
pub trait ResolverConfigExt {
    /// Builds a config from `GAZETTEER_PATH`, `HYDROGRAPHY_PATH`,
    /// `OVERRIDE_PATH`, `CACHE_TABLE`, and `MIN_TOKEN_SCORE`.
    #[must_use]
    fn from_env() -> Self;
}

impl ResolverConfigExt for ResolverConfig {
    fn from_env() -> Self {
        Self {
            gazetteer_path: env_path("GAZETTEER_PATH").unwrap_or_default(),
            hydrography_path: env_path("HYDROGRAPHY_PATH"),
            override_path: env_path("OVERRIDE_PATH"),
            cache_table: env_string("CACHE_TABLE"),
            min_token_score: std::env::var("MIN_TOKEN_SCORE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MIN_TOKEN_SCORE),
        }
    }
}

fn env_path(key: &str) -> Option<std::path::PathBuf> {
    env_string(key).map(std::path::PathBuf::from)
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

struct Inner {
    config: ResolverConfig,
    gazetteer: GazetteerStore,
    overrides: OverrideTable,
    cache: Box<dyn ResultCache>,
}

/// The resolver's public entry point.
///
/// Cheaply `Clone`-able: internal state lives behind an [`Arc`], so the
/// facade can be handed to every `actix-web` worker via `web::Data` without
/// re-loading the gazetteer in each one.
#[derive(Clone)]
pub struct ResolverFacade(Arc<Inner>);

impl ResolverFacade {
    /// Builds a facade from `config`. Opening the cache backend named by
    /// `config.cache_table` (a `DuckDB` database path) happens here; on
    /// failure the facade logs and falls back to [`NullCache`] rather than
    /// failing construction, since caching is not required for correctness.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        let cache: Box<dyn ResultCache> = match &config.cache_table {
            Some(path) => match DuckDbCache::open(std::path::Path::new(path), "lake_match_cache") {
                Ok(cache) => Box::new(cache),
                Err(e) => {
                    log::error!("failed to open result cache at {path}: {e}, caching disabled");
                    Box::new(NullCache)
                }
            },
            None => Box::new(NullCache),
        };

        Self(Arc::new(Inner {
            config,
            gazetteer: GazetteerStore::new(),
            overrides: OverrideTable::new(),
            cache,
        }))
    }

    /// Forces the gazetteer to load now rather than on first [`Self::resolve`]
    /// call, so a bad dataset fails the process at startup instead of on the
    /// first request.
    ///
    /// # Errors
    ///
    /// See [`GazetteerStore::get_or_load`].
    pub fn warm(&self) -> Result<(), ResolverError> {
        self.0.gazetteer.get_or_load(&self.0.config)?;
        Ok(())
    }

    /// Resolves `raw_name` (optionally disambiguated by `explicit_county`) to
    /// a [`MatchResult`].
    ///
    /// Checks, in order: the manual override table, the result cache, then
    /// the matcher against the gazetteer. A successful algorithmic match is
    /// written back to the cache before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`ResolverError::InvalidInput`] if `raw_name` is empty or
    /// whitespace-only, or a dataset error if the gazetteer cannot be
    /// loaded.
    pub fn resolve(&self, raw_name: &str, explicit_county: Option<&str>) -> Result<MatchResult, ResolverError> {
        if raw_name.trim().is_empty() {
            return Err(ResolverError::InvalidInput("name must not be empty".to_string()));
        }

        if let Some(result) = self.0.overrides.check(raw_name, &self.0.config)? {
            return Ok(result);
        }

        let query = normalize::normalize(raw_name, explicit_county);
        let trimmed = raw_name.trim();
        let cache_key = compose_cache_key(trimmed, query.county_hint.as_deref());

        let cached = self.0.cache.get(&cache_key).or_else(|| {
            // A composite key miss falls back to the bare name: a prior
            // resolve without (or with a different) county hint may have
            // already cached this name.
            query
                .county_hint
                .as_ref()
                .and_then(|_| self.0.cache.get(trimmed))
        });

        if let Some(cached) = cached {
            return Ok(MatchResult {
                official_name: Some(cached.official_name),
                lat: Some(cached.lat),
                lng: Some(cached.lng),
                matched_score: cached.matched_score,
                source: MatchSource::Cache,
                strategy: None,
                feature_type: None,
                county_name: None,
            });
        }

        let records = self.0.gazetteer.get_or_load(&self.0.config)?;
        let result = matcher::resolve(&query, records, self.0.config.min_token_score);

        if let (Some(official_name), Some(lat), Some(lng)) = (&result.official_name, result.lat, result.lng) {
            self.0.cache.put(
                &cache_key,
                &CacheRecord {
                    official_name: official_name.clone(),
                    lat,
                    lng,
                    matched_score: result.matched_score,
                    created_at: chrono::Utc::now().to_rfc3339(),
                },
            );
        }

        Ok(result)
    }
}

/// `raw_name|county_hint` if a county hint is present, else bare `raw_name`.
fn compose_cache_key(trimmed_raw_name: &str, county_hint: Option<&str>) -> String {
    match county_hint {
        Some(hint) => format!("{trimmed_raw_name}|{hint}"),
        None => trimmed_raw_name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lake_resolver_models::MatchStrategy;
    use std::sync::atomic::{AtomicU64, Ordering};

    static COUNTER: AtomicU64 = AtomicU64::new(0);

    struct Fixture {
        gazetteer_path: std::path::PathBuf,
        override_path: std::path::PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let n = COUNTER.fetch_add(1, Ordering::Relaxed);
            let base = std::env::temp_dir().join(format!("lake_resolver_e2e_{}_{n}", std::process::id()));
            let gazetteer_path = base.with_extension("gazetteer.json");
            let override_path = base.with_extension("overrides.json");
            std::fs::write(
                &gazetteer_path,
                r#"[
                    {"gnis_id": "1", "official_name": "Battle Ground Lake", "feature_type": "lake", "county_name": "Clark", "latitude": 45.78, "longitude": -122.54, "alternative_names": []},
                    {"gnis_id": "2", "official_name": "Long Lake", "feature_type": "lake", "county_name": "King", "latitude": 47.5, "longitude": -122.2, "alternative_names": ["Long L"]}
                ]"#,
            )
            .expect("write fixture gazetteer");
            std::fs::write(
                &override_path,
                r#"{"Mystery Spot": {"official_name": "Known Lake", "lat": 47.1, "lng": -122.1}}"#,
            )
            .expect("write fixture overrides");
            Self {
                gazetteer_path,
                override_path,
            }
        }

        fn config(&self) -> ResolverConfig {
            ResolverConfig {
                gazetteer_path: self.gazetteer_path.clone(),
                hydrography_path: None,
                override_path: Some(self.override_path.clone()),
                cache_table: None,
                min_token_score: DEFAULT_MIN_TOKEN_SCORE,
            }
        }
    }

    impl Drop for Fixture {
        fn drop(&mut self) {
            let _ = std::fs::remove_file(&self.gazetteer_path);
            let _ = std::fs::remove_file(&self.override_path);
        }
    }

    #[test]
    fn empty_input_is_invalid() {
        let fixture = Fixture::new();
        let facade = ResolverFacade::new(fixture.config());
        let err = facade.resolve("   ", None).unwrap_err();
        assert!(matches!(err, ResolverError::InvalidInput(_)));
    }

    #[test]
    fn missing_gazetteer_is_dataset_missing() {
        let mut config = Fixture::new().config();
        config.gazetteer_path = std::env::temp_dir().join("lake_resolver_missing_e2e.json");
        let facade = ResolverFacade::new(config);
        let err = facade.resolve("Anything", None).unwrap_err();
        assert!(matches!(err, ResolverError::DatasetMissing(_)));
    }

    #[test]
    fn manual_override_wins_before_matcher_runs() {
        let fixture = Fixture::new();
        let facade = ResolverFacade::new(fixture.config());
        let result = facade.resolve("Mystery Spot", None).expect("resolves");
        assert_eq!(result.official_name, Some("Known Lake".to_string()));
        assert_eq!(result.source, MatchSource::ManualOverride);
        assert_eq!(result.matched_score, lake_resolver_models::MANUAL_OVERRIDE_SCORE);
    }

    #[test]
    fn exact_token_match_is_algorithmic() {
        let fixture = Fixture::new();
        let facade = ResolverFacade::new(fixture.config());
        let result = facade.resolve("Battle Ground Lk", None).expect("resolves");
        assert_eq!(result.official_name, Some("Battle Ground Lake".to_string()));
        assert_eq!(result.source, MatchSource::Algorithm);
        assert_eq!(result.strategy, Some(MatchStrategy::Token));
    }

    #[test]
    fn unmatchable_name_falls_back_to_fuzzy_never_none_with_nonempty_gazetteer() {
        let fixture = Fixture::new();
        let facade = ResolverFacade::new(fixture.config());
        let result = facade.resolve("Zzyzx Nonexistent", None).expect("resolves");
        assert_eq!(result.source, MatchSource::Algorithm);
        assert_eq!(result.strategy, Some(MatchStrategy::Fuzzy));
        assert!(result.official_name.is_some());
    }

    #[test]
    fn second_lookup_of_same_name_is_served_from_cache() {
        let fixture = Fixture::new();
        let mut config = fixture.config();
        let cache_path = std::env::temp_dir().join(format!(
            "lake_resolver_e2e_cache_{}.duckdb",
            COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        config.cache_table = Some(cache_path.display().to_string());
        let facade = ResolverFacade::new(config);

        let first = facade.resolve("Battle Ground Lk", None).expect("resolves");
        assert_eq!(first.source, MatchSource::Algorithm);

        let second = facade.resolve("Battle Ground Lk", None).expect("resolves");
        assert_eq!(second.source, MatchSource::Cache);
        assert_eq!(second.official_name, first.official_name);

        let _ = std::fs::remove_file(&cache_path);
    }
}
