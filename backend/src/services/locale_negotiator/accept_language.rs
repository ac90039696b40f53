//! Accept-Language parsing and ranking
//!
//! Grammar (RFC 2616 section 14.4):
//!
//! ```text
//! Accept-Language = 1#( language-range [ ";" "q" "=" qvalue ] )
//! language-range  = ( 1*8ALPHA *( "-" 1*8alphanum ) ) | "*"
//! qvalue          = ( "0" [ "." *DIGIT ] ) | ( "1" [ "." *"0" ] )
//! ```
//!
//! Each entry contributes the language range it starts with; trailing junk
//! after the range is ignored. A `q` parameter outside the qvalue grammar is
//! treated as absent, except that a `0.d+` prefix followed by further
//! `.d+` groups (`0.5.5`) keeps its leading value. Entries that do not start
//! with a range are skipped. Parsing never fails.

use crate::models::LanguageRange;

const DEFAULT_QUALITY: f32 = 1.0;

/// Parse `field` into ranges with their quality, in first-seen order
///
/// A multi-subtag range also enters its primary subtag with the same
/// quality, so `en-US;q=0.8` can match a catalog that only has `en`. A range
/// seen again (ignoring case) takes the later quality but keeps its position.
pub fn parse_accept_language(field: &str) -> Vec<(LanguageRange, f32)> {
    let mut entries: Vec<(LanguageRange, f32)> = Vec::new();

    for raw in field.split(',') {
        let Some((range, quality)) = parse_entry(raw) else {
            if !raw.trim().is_empty() {
                tracing::trace!("Skipping malformed Accept-Language entry: {:?}", raw);
            }
            continue;
        };

        let primary = range
            .primary_subtag()
            .filter(|primary| !primary.eq_ignore_ascii_case(range.as_str()))
            .map(|primary| LanguageRange::Tag(primary.to_string()));

        record(&mut entries, range, quality);
        if let Some(primary) = primary {
            record(&mut entries, primary, quality);
        }
    }

    entries
}

/// Ranges from `field` ordered by descending quality
///
/// The sort is stable: equal qualities keep first-seen order.
pub fn rank_preferred_languages(field: &str) -> Vec<LanguageRange> {
    let mut entries = parse_accept_language(field);
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.into_iter().map(|(range, _)| range).collect()
}

/// Parse a qvalue. `None` when it does not match the grammar.
pub fn parse_quality(value: &str) -> Option<f32> {
    let (integer, fraction) = match value.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (value, None),
    };

    match (integer, fraction) {
        ("0", None) => Some(0.0),
        ("1", None) => Some(1.0),
        ("0", Some(fraction)) if fraction.chars().all(|c| c.is_ascii_digit()) => {
            if fraction.is_empty() { Some(0.0) } else { value.parse().ok() }
        },
        ("1", Some(fraction)) if fraction.chars().all(|c| c == '0') => Some(1.0),
        _ => None,
    }
}

fn parse_entry(raw: &str) -> Option<(LanguageRange, f32)> {
    let mut parts = raw.split(';');
    let range = LanguageRange::parse_leading(parts.next()?.trim())?;

    let mut quality = DEFAULT_QUALITY;
    for param in parts {
        let Some((name, value)) = param.split_once('=') else {
            continue;
        };
        if name.trim().eq_ignore_ascii_case("q") {
            quality = lenient_quality(value.trim()).unwrap_or(DEFAULT_QUALITY);
        }
    }

    Some((range, quality))
}

/// `parse_quality`, also accepting `0.d+` followed by more `.d+` groups
fn lenient_quality(value: &str) -> Option<f32> {
    if let Some(quality) = parse_quality(value) {
        return Some(quality);
    }

    let fraction = value.strip_prefix("0.")?;
    let mut groups = fraction.split('.');
    let leading = groups.next()?;
    let is_digits = |group: &str| !group.is_empty() && group.chars().all(|c| c.is_ascii_digit());
    if !is_digits(leading) || !groups.all(is_digits) {
        return None;
    }
    parse_quality(&value[..2 + leading.len()])
}

fn record(entries: &mut Vec<(LanguageRange, f32)>, range: LanguageRange, quality: f32) {
    match entries.iter_mut().find(|(existing, _)| existing.same_as(&range)) {
        Some(entry) => entry.1 = quality,
        None => entries.push((range, quality)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(field: &str) -> Vec<String> {
        rank_preferred_languages(field).iter().map(|range| range.to_string()).collect()
    }

    #[test]
    fn test_orders_by_quality() {
        assert_eq!(ranked("fr;q=0.9,en;q=1.0"), vec!["en", "fr"]);
        assert_eq!(ranked("da, en-gb;q=0.8, en;q=0.7"), vec!["da", "en-gb", "en"]);
    }

    #[test]
    fn test_adds_primary_subtag_with_same_quality() {
        let entries = parse_accept_language("en-US;q=0.8");
        assert_eq!(
            entries,
            vec![
                (LanguageRange::Tag("en-US".to_string()), 0.8),
                (LanguageRange::Tag("en".to_string()), 0.8),
            ]
        );
    }

    #[test]
    fn test_later_entries_overwrite_quality() {
        // `en` is first entered at 1.0 as the prefix of en-US, then lowered
        assert_eq!(ranked("en-US, fr;q=0.6, en;q=0.5"), vec!["en-US", "fr", "en"]);
        assert_eq!(ranked("de;q=0.1, de;q=0.9, fr;q=0.5"), vec!["de", "fr"]);
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        assert_eq!(ranked("fr, de, en"), vec!["fr", "de", "en"]);
        assert_eq!(ranked("de;q=0.5, fr;q=0.5, *;q=0.5"), vec!["de", "fr", "*"]);
    }

    #[test]
    fn test_wildcard() {
        let entries = parse_accept_language("*;q=0.5");
        assert_eq!(entries, vec![(LanguageRange::Wildcard, 0.5)]);
        assert_eq!(ranked("*"), vec!["*"]);
    }

    #[test]
    fn test_skips_entries_without_a_range() {
        assert_eq!(ranked("123, _x, ;q=0.5, nl"), vec!["nl"]);
        assert!(rank_preferred_languages("").is_empty());
        assert!(rank_preferred_languages(" , ,").is_empty());
    }

    #[test]
    fn test_uses_leading_range_of_entry() {
        assert_eq!(ranked("de_DE;q=0.5, fr-CH!;q=0.4"), vec!["de", "fr-CH", "fr"]);
    }

    #[test]
    fn test_unparseable_quality_counts_as_absent() {
        let entries = parse_accept_language("fr;q=abc, de;q=0.5.5, it;q, es;q=.5, nl;q=1.5");
        assert_eq!(
            entries,
            vec![
                (LanguageRange::Tag("fr".to_string()), 1.0),
                (LanguageRange::Tag("de".to_string()), 0.5),
                (LanguageRange::Tag("it".to_string()), 1.0),
                (LanguageRange::Tag("es".to_string()), 1.0),
                (LanguageRange::Tag("nl".to_string()), 1.0),
            ]
        );
    }

    #[test]
    fn test_lenient_quality() {
        assert_eq!(lenient_quality("0.5"), Some(0.5));
        assert_eq!(lenient_quality("0.5.5"), Some(0.5));
        assert_eq!(lenient_quality("0.25.1.0"), Some(0.25));
        assert_eq!(lenient_quality("0.5x"), None);
        assert_eq!(lenient_quality("0.5."), None);
        assert_eq!(lenient_quality("abc"), None);
    }

    #[test]
    fn test_tolerates_whitespace_and_unknown_params() {
        assert_eq!(ranked(" fr ; q=0.4 ,de ;level=1;q=0.6"), vec!["de", "fr"]);
    }

    #[test]
    fn test_alphanumeric_subtags() {
        assert_eq!(ranked("es-419;q=0.9"), vec!["es-419", "es"]);
    }

    #[test]
    fn test_parse_quality() {
        assert_eq!(parse_quality("1"), Some(1.0));
        assert_eq!(parse_quality("1.0"), Some(1.0));
        assert_eq!(parse_quality("1.000"), Some(1.0));
        assert_eq!(parse_quality("1."), Some(1.0));
        assert_eq!(parse_quality("0"), Some(0.0));
        assert_eq!(parse_quality("0."), Some(0.0));
        assert_eq!(parse_quality("0.25"), Some(0.25));
        assert_eq!(parse_quality("0.8"), Some(0.8));
        assert_eq!(parse_quality("1.5"), None);
        assert_eq!(parse_quality(".5"), None);
        assert_eq!(parse_quality("2"), None);
        assert_eq!(parse_quality("0.x"), None);
        assert_eq!(parse_quality(""), None);
    }
}
