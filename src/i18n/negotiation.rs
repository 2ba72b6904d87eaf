use super::{Locale, LocaleSettings};

/// Pick the best supported locale from an `Accept-Language` header value.
///
/// Quality values are honored (ties keep header order) and a region subtag
/// falls back to its primary tag (`ja-JP` → `ja`). `q=0` entries are skipped.
pub fn negotiate_accept_language<'a>(
    settings: &'a LocaleSettings,
    header: &str,
) -> Option<&'a Locale> {
    for (tag, _quality) in parse_accept_language(header) {
        if let Some(locale) = settings.find(&tag) {
            return Some(locale);
        }
        if let Some(primary) = tag.split('-').next()
            && let Some(locale) = settings.find(primary)
        {
            return Some(locale);
        }
    }
    None
}

fn parse_accept_language(header: &str) -> Vec<(String, f32)> {
    let mut tags: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }

            let mut segments = part.split(';');
            let tag = segments.next()?.trim().to_ascii_lowercase();
            if tag.is_empty() || tag == "*" {
                return None;
            }

            let quality = segments
                .find_map(|s| s.trim().strip_prefix("q=")?.trim().parse::<f32>().ok())
                .unwrap_or(1.0)
                .clamp(0.0, 1.0);

            (quality > 0.0).then_some((tag, quality))
        })
        .collect();

    // stable: equal weights keep header order
    tags.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    tags
}
