//! Abbreviation and county-code tables used by the normalizer.
//!
//! Both tables are applied symmetrically: once when hydrating gazetteer
//! records at load time, and once per query, so that `"LEWIS CO PRK PD-S"`
//! and a gazetteer record whose official name spells out "Lewis County Park
//! Pond" land on the same token stream.

use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Maps a lowercase token abbreviation to its expansion, which may be more
/// than one word (e.g. a county code expands to a multi-word county name
/// elsewhere, but these are all single-word expansions).
static ABBREVIATIONS: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        ("lk", "lake"),
        ("lks", "lakes"),
        ("pd", "pond"),
        ("pnd", "pond"),
        ("prk", "park"),
        ("pk", "park"),
        ("res", "reservoir"),
        ("co", "county"),
        ("cnty", "county"),
        ("st", "saint"),
        ("mt", "mount"),
        ("mtn", "mountain"),
        ("ctr", "center"),
        ("ctrs", "centers"),
        ("no", "number"),
        ("n", "north"),
        ("s", "south"),
        ("e", "east"),
        ("w", "west"),
        ("ne", "northeast"),
        ("nw", "northwest"),
        ("se", "southeast"),
        ("sw", "southwest"),
    ])
});

/// Maps a county code (as it appears uppercased in an agency designation)
/// to the county's full, lowercase, whitespace-separated name.
///
/// Fixed 39-entry table for the target state (Washington).
static COUNTY_CODES: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        ("ADAM", "adams"),
        ("ASOT", "asotin"),
        ("BENT", "benton"),
        ("CHEL", "chelan"),
        ("CLAL", "clallam"),
        ("CLAR", "clark"),
        ("COWL", "cowlitz"),
        ("DOUG", "douglas"),
        ("FERR", "ferry"),
        ("FRAN", "franklin"),
        ("GARF", "garfield"),
        ("GRAN", "grant"),
        ("GRAY", "grays harbor"),
        ("ISLA", "island"),
        ("JEFF", "jefferson"),
        ("KING", "king"),
        ("KITS", "kitsap"),
        ("KITT", "kittitas"),
        ("KLIC", "klickitat"),
        ("LEWI", "lewis"),
        ("LINC", "lincoln"),
        ("MASO", "mason"),
        ("OKAN", "okanogan"),
        ("PACI", "pacific"),
        ("PEND", "pend oreille"),
        ("PIER", "pierce"),
        ("SANJ", "san juan"),
        ("SKAG", "skagit"),
        ("SKAM", "skamania"),
        ("SNOH", "snohomish"),
        ("SPOK", "spokane"),
        ("STEV", "stevens"),
        ("THUR", "thurston"),
        ("WAHK", "wahkiakum"),
        ("WALL", "walla walla"),
        ("WHAT", "whatcom"),
        ("WHIT", "whitman"),
        ("YAKI", "yakima"),
    ])
});

/// Number of entries in the county-code table. Exposed for tests that want
/// to assert the table stays at its fixed size.
pub const COUNTY_CODE_COUNT: usize = 39;

/// Expands a single lowercase token into the words it should contribute to
/// the token stream: its abbreviation expansion, its county name (if its
/// uppercase form is a known county code), or itself unchanged.
#[must_use]
pub fn expand_token(token: &str) -> Vec<String> {
    if let Some(expanded) = ABBREVIATIONS.get(token) {
        return vec![(*expanded).to_string()];
    }
    let upper = token.to_uppercase();
    if let Some(county) = COUNTY_CODES.get(upper.as_str()) {
        return county.split_whitespace().map(ToString::to_string).collect();
    }
    vec![token.to_string()]
}

/// Looks up a county code's full name (lowercase, possibly multi-word).
#[must_use]
pub fn county_name_for_code(code: &str) -> Option<&'static str> {
    COUNTY_CODES.get(code).copied()
}

/// Iterates all known county names (lowercase, possibly multi-word).
pub fn county_names() -> impl Iterator<Item = &'static str> {
    COUNTY_CODES.values().copied()
}

/// Iterates all known county codes paired with their county name.
pub fn county_codes() -> impl Iterator<Item = (&'static str, &'static str)> {
    COUNTY_CODES.iter().map(|(code, name)| (*code, *name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_abbreviations() {
        assert_eq!(expand_token("lk"), vec!["lake".to_string()]);
        assert_eq!(expand_token("prk"), vec!["park".to_string()]);
        assert_eq!(expand_token("pd"), vec!["pond".to_string()]);
        assert_eq!(expand_token("res"), vec!["reservoir".to_string()]);
    }

    #[test]
    fn expands_multi_word_county_code() {
        assert_eq!(
            expand_token("pend"),
            vec!["pend".to_string(), "oreille".to_string()]
        );
        assert_eq!(
            expand_token("gray"),
            vec!["grays".to_string(), "harbor".to_string()]
        );
    }

    #[test]
    fn passes_through_unknown_tokens() {
        assert_eq!(expand_token("battle"), vec!["battle".to_string()]);
    }

    #[test]
    fn table_has_fixed_size() {
        assert_eq!(COUNTY_CODES.len(), COUNTY_CODE_COUNT);
    }
}
