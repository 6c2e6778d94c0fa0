use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Dropbox rejects tag texts longer than 32 characters.
pub const MAX_TAG_LEN: usize = 32;

/// Normalize a Finder label into a Dropbox-safe tag text.
///
/// Canonically decomposes the label (NFD), drops combining marks so accented
/// letters fall back to their base character, replaces anything outside
/// `[A-Za-z0-9_]` with `_`, and truncates to 32 characters. Total: every
/// input produces an output, possibly the empty string. Distinct labels may
/// collide ("a b" and "a_b" both become "a_b"); collisions are accepted.
pub fn normalize_tag(label: &str) -> String {
    label
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_TAG_LEN)
        .collect()
}
