//! Alternate WCS registry.
//!
//! Alternate solutions are stored next to the primary one with a one-letter
//! suffix on every keyword (`CRVAL1A`, `CD1_1B`, `WCSNAMEA`). The registry
//! enumerates and deletes them; key `'O'` marks the original solution and is
//! never deleted.

use hdrlet_fits::Header;

use crate::constants::{AXIS_KEYS, MATRIX_KEYS, ORIGINAL_WCS_KEY};

/// Enumerates and deletes alternate WCS solutions on a header.
pub trait AltWcsRegistry {
    /// Alternate keys (`'A'..='Z'`) present on the header, sorted.
    fn keys(&self, header: &Header) -> Vec<char>;

    /// Delete alternate `key` from the header. Returns the number of cards
    /// removed; key `'O'` is refused and yields 0.
    fn delete(&self, header: &mut Header, key: char) -> usize;
}

/// Keyword-suffix based registry.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordAltWcs;

impl AltWcsRegistry for KeywordAltWcs {
    fn keys(&self, header: &Header) -> Vec<char> {
        let mut keys: Vec<char> = header
            .cards()
            .iter()
            .filter_map(|card| split_key(card.keyword()))
            .filter(|(base, _)| *base == "WCSNAME" || is_axis_keyword(base, "CTYPE"))
            .map(|(_, key)| key)
            .collect();
        keys.sort_unstable();
        keys.dedup();
        keys
    }

    fn delete(&self, header: &mut Header, key: char) -> usize {
        if key == ORIGINAL_WCS_KEY {
            return 0;
        }
        let before = header.len();
        header.retain(|card| {
            !matches!(
                split_key(card.keyword()),
                Some((base, k)) if k == key && is_wcs_keyword(base)
            )
        });
        before - header.len()
    }
}

/// Split a keyword into its base and alternate key letter.
fn split_key(keyword: &str) -> Option<(&str, char)> {
    let key = keyword.chars().last()?;
    if key.is_ascii_uppercase() && keyword.len() > 1 {
        Some((&keyword[..keyword.len() - 1], key))
    } else {
        None
    }
}

/// `STEM` followed by an axis number, e.g. `CTYPE2`.
pub(crate) fn is_axis_keyword(keyword: &str, stem: &str) -> bool {
    keyword
        .strip_prefix(stem)
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

/// `STEM` followed by `i_j`, e.g. `CD1_2`.
pub(crate) fn is_matrix_keyword(keyword: &str, stem: &str) -> bool {
    keyword
        .strip_prefix(stem)
        .and_then(|rest| rest.split_once('_'))
        .is_some_and(|(i, j)| {
            !i.is_empty()
                && !j.is_empty()
                && i.chars().all(|c| c.is_ascii_digit())
                && j.chars().all(|c| c.is_ascii_digit())
        })
}

/// Whether a key-less keyword belongs to a linear WCS description.
pub(crate) fn is_wcs_keyword(base: &str) -> bool {
    base == "WCSNAME"
        || base == "WCSAXES"
        || AXIS_KEYS.iter().any(|stem| is_axis_keyword(base, stem))
        || MATRIX_KEYS.iter().any(|stem| is_matrix_keyword(base, stem))
}
