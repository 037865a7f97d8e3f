const FALLBACK_SLUG: &str = "franchise";

/// Longest slug the directory stores.
pub const MAX_SLUG_LEN: usize = 50;

/// URL-safe slug: lowercase ASCII alphanumerics, other runs collapsed to a single `-`.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for ch in value.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Successive slug candidates: `base`, `base-1`, `base-2`, ...
///
/// Every candidate fits in [`MAX_SLUG_LEN`]; the base is shortened to make room for the suffix.
pub(crate) fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    let base = if base.is_empty() { FALLBACK_SLUG } else { base };
    std::iter::once(clip(base, MAX_SLUG_LEN).to_string()).chain((1u32..).map(move |n| {
        let suffix = format!("-{n}");
        format!("{}{suffix}", clip(base, MAX_SLUG_LEN - suffix.len()))
    }))
}

// Slugs are ASCII, so byte offsets are char boundaries.
fn clip(slug: &str, max_len: usize) -> &str {
    if slug.len() <= max_len {
        return slug;
    }
    slug[..max_len].trim_end_matches('-')
}
