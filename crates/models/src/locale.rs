//! Locale negotiation.
//!
//! The stored user preference wins; otherwise the highest-weighted
//! `Accept-Language` tag whose primary subtag is supported is used.

use validator::ValidationError;

pub const SUPPORTED_LOCALES: &[&str] = &["en", "fr", "de", "es", "pl"];
pub const DEFAULT_LOCALE: &str = "en";

fn supported(tag: &str) -> Option<&'static str> {
    let primary = tag.split(['-', '_']).next()?.trim().to_ascii_lowercase();
    SUPPORTED_LOCALES.iter().copied().find(|l| *l == primary)
}

/// Resolve the locale for a request.
pub fn resolve_locale(preferred: Option<&str>, accept_language: Option<&str>) -> &'static str {
    if let Some(locale) = preferred.and_then(supported) {
        return locale;
    }

    let Some(header) = accept_language else {
        return DEFAULT_LOCALE;
    };

    let mut candidates: Vec<(&str, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.trim().split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }
            let weight = pieces
                .find_map(|p| p.trim().strip_prefix("q="))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            Some((tag, weight))
        })
        .filter(|(_, weight)| *weight > 0.0)
        .collect();

    // Stable sort keeps header order among equal weights
    candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    candidates
        .into_iter()
        .find_map(|(tag, _)| supported(tag))
        .unwrap_or(DEFAULT_LOCALE)
}

pub(crate) fn validate_locale(locale: &str) -> Result<(), ValidationError> {
    if SUPPORTED_LOCALES.contains(&locale) {
        Ok(())
    } else {
        Err(ValidationError::new("unsupported_locale"))
    }
}
