//! Token-overlap and fuzzy-fallback matching against the gazetteer.
//!
//! Two strategies, tried in order:
//!
//! 1. **Token.** Every candidate's token set (its own plus each alternative
//!    name's) is scored against the query's token set as `3*E + P - L`
//!    (exact overlap, partial overlap, capped edit-distance penalty), plus
//!    a county boost. The highest-scoring candidate wins if its score
//!    clears `min_token_score`.
//! 2. **Fuzzy.** If no candidate clears the threshold, every candidate's
//!    normalized name is scored by edit distance against the query's
//!    normalized string, and the closest one wins regardless of threshold.

use lake_resolver_models::{GazetteerRecord, MatchResult, MatchSource, MatchStrategy, NormalizedQuery};

use crate::normalize;

/// Edit-distance penalty cap: distances beyond this contribute no more to
/// the score than a distance of exactly this many characters would.
const MAX_EDIT_PENALTY: i64 = 10;

/// Scores a query against one candidate name's token vector.
///
/// Exact matches are counted over candidate positions, which are then
/// excluded from partial-match consideration (each candidate position
/// contributes at most one credit). The edit penalty is the Levenshtein
/// distance between the query's normalized string and the candidate
/// tokens joined by spaces, capped at [`MAX_EDIT_PENALTY`].
///
/// Returns `None` if either side has no tokens (mirrors the `-inf`
/// sentinel used to mean "cannot be compared"), which the caller skips
/// rather than lets win.
fn compute_token_score(query: &NormalizedQuery, candidate_tokens: &[String]) -> Option<i64> {
    if query.tokens.is_empty() || candidate_tokens.is_empty() {
        return None;
    }

    let mut used = vec![false; candidate_tokens.len()];
    let mut exact = 0i64;
    for (i, ct) in candidate_tokens.iter().enumerate() {
        if query.tokens.contains(ct) {
            exact += 1;
            used[i] = true;
        }
    }

    let mut partial = 0i64;
    for (i, ct) in candidate_tokens.iter().enumerate() {
        if used[i] {
            continue;
        }
        if query.tokens.iter().any(|q| q != ct && tokens_partially_match(q, ct)) {
            partial += 1;
        }
    }

    let candidate_joined = candidate_tokens.join(" ");
    let penalty = i64::try_from(levenshtein(&query.normalized, &candidate_joined))
        .unwrap_or(i64::MAX)
        .min(MAX_EDIT_PENALTY);

    Some(3 * exact + partial - penalty)
}

/// Two tokens partially match if both are at least 3 characters, distinct,
/// and one is a substring of the other.
fn tokens_partially_match(a: &str, b: &str) -> bool {
    a.len() >= 3 && b.len() >= 3 && a != b && (a.contains(b) || b.contains(a))
}

/// `+2` if a county hint is present and is a substring of the candidate's
/// county name (case-insensitive), else `0`.
fn county_boost(hint: Option<&str>, candidate: &GazetteerRecord) -> i64 {
    match hint {
        Some(h) if !h.is_empty() && candidate.county_name.to_lowercase().contains(h) => 2,
        _ => 0,
    }
}

/// Levenshtein edit distance, computed with a two-row dynamic program.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            current[j + 1] = (previous[j + 1] + 1)
                .min(current[j] + 1)
                .min(previous[j] + cost);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

/// Runs the token strategy, then the fuzzy fallback, over `gazetteer`.
///
/// Returns [`MatchResult::none`] only when `gazetteer` is empty; otherwise
/// the fuzzy fallback always produces some result.
#[must_use]
pub fn resolve(query: &NormalizedQuery, gazetteer: &[GazetteerRecord], min_token_score: i64) -> MatchResult {
    if gazetteer.is_empty() {
        return MatchResult::none();
    }

    if let Some(result) = token_strategy(query, gazetteer, min_token_score) {
        return result;
    }

    fuzzy_strategy(query, gazetteer)
}

fn token_strategy(query: &NormalizedQuery, gazetteer: &[GazetteerRecord], min_token_score: i64) -> Option<MatchResult> {
    let hint = query.county_hint.as_deref().filter(|h| !h.is_empty());
    let narrowed: Vec<&GazetteerRecord> = match hint {
        Some(h) => {
            let filtered: Vec<&GazetteerRecord> = gazetteer
                .iter()
                .filter(|r| r.county_name.to_lowercase().contains(h))
                .collect();
            if filtered.is_empty() {
                gazetteer.iter().collect()
            } else {
                filtered
            }
        }
        None => gazetteer.iter().collect(),
    };

    let mut best_score = i64::MIN;
    let mut best_candidate: Option<&GazetteerRecord> = None;

    for candidate in narrowed {
        let mut name_token_sets: Vec<Vec<String>> = vec![candidate.tokens.clone()];
        for alt in &candidate.alternative_names {
            name_token_sets.push(normalize::normalize(alt, None).tokens);
        }

        for tokens in &name_token_sets {
            let Some(base_score) = compute_token_score(query, tokens) else {
                continue;
            };
            let score = base_score + county_boost(query.county_hint.as_deref(), candidate);
            if score > best_score {
                best_score = score;
                best_candidate = Some(candidate);
            }
        }
    }

    let candidate = best_candidate?;
    if best_score < min_token_score {
        return None;
    }

    Some(MatchResult {
        official_name: Some(candidate.official_name.clone()),
        lat: Some(candidate.latitude),
        lng: Some(candidate.longitude),
        matched_score: best_score,
        source: MatchSource::Algorithm,
        strategy: Some(MatchStrategy::Token),
        feature_type: Some(candidate.feature_type.as_str().to_string()),
        county_name: Some(candidate.county_name.clone()),
    })
}

fn fuzzy_strategy(query: &NormalizedQuery, gazetteer: &[GazetteerRecord]) -> MatchResult {
    let mut best_distance = usize::MAX;
    let mut best_candidate: Option<&GazetteerRecord> = None;

    for candidate in gazetteer {
        let distance = levenshtein(&query.normalized, &candidate.normalized);
        if distance < best_distance {
            best_distance = distance;
            best_candidate = Some(candidate);
        }
    }

    // `gazetteer` is non-empty at every call site of this function.
    let candidate = best_candidate.expect("fuzzy_strategy called with a non-empty gazetteer");
    let score = i64::max(1, 20 - i64::try_from(best_distance).unwrap_or(i64::MAX));

    MatchResult {
        official_name: Some(candidate.official_name.clone()),
        lat: Some(candidate.latitude),
        lng: Some(candidate.longitude),
        matched_score: score,
        source: MatchSource::Algorithm,
        strategy: Some(MatchStrategy::Fuzzy),
        feature_type: None,
        county_name: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lake_resolver_models::FeatureType;

    fn record(name: &str, county: &str, lat: f64, lng: f64) -> GazetteerRecord {
        let normalized = normalize::normalize(name, None);
        GazetteerRecord {
            id: name.to_string(),
            official_name: name.to_string(),
            feature_type: FeatureType::Lake,
            county_name: county.to_string(),
            latitude: lat,
            longitude: lng,
            alternative_names: vec![],
            normalized: normalized.normalized,
            tokens: normalized.tokens,
        }
    }

    #[test]
    fn levenshtein_matches_known_distances() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", "abc"), 0);
    }

    #[test]
    fn tokens_partially_match_requires_minimum_length_and_distinctness() {
        assert!(tokens_partially_match("battle", "battleground"));
        assert!(!tokens_partially_match("at", "cat"));
        assert!(!tokens_partially_match("lake", "lake"));
    }

    #[test]
    fn exact_token_match_wins_over_fuzzy() {
        let gazetteer = vec![
            record("Battle Ground Lake", "Clark", 45.78, -122.54),
            record("Long Lake", "King", 47.5, -122.2),
        ];
        let query = normalize::normalize("Battle Ground Lake", None);
        let result = resolve(&query, &gazetteer, 3);
        assert_eq!(result.official_name, Some("Battle Ground Lake".to_string()));
        assert_eq!(result.strategy, Some(MatchStrategy::Token));
    }

    #[test]
    fn county_hint_narrows_and_boosts_candidates() {
        let gazetteer = vec![
            record("Long Lake", "King", 47.5, -122.2),
            record("Long Lake", "Clark", 45.7, -122.5),
        ];
        let query = normalize::normalize("Long Lake (KING)", None);
        let result = resolve(&query, &gazetteer, 3);
        assert_eq!(result.county_name, Some("King".to_string()));
    }

    #[test]
    fn below_threshold_falls_back_to_fuzzy() {
        let gazetteer = vec![record("Entirely Unrelated Pond", "Pierce", 47.0, -122.0)];
        let query = normalize::normalize("Zzyzx Something", None);
        let result = resolve(&query, &gazetteer, 3);
        assert_eq!(result.strategy, Some(MatchStrategy::Fuzzy));
        assert_eq!(
            result.official_name,
            Some("Entirely Unrelated Pond".to_string())
        );
    }

    #[test]
    fn empty_gazetteer_yields_none_result() {
        let query = normalize::normalize("Anything", None);
        let result = resolve(&query, &[], 3);
        assert_eq!(result, MatchResult::none());
    }
}
