//! Path normalization.
//!
//! Literal segments are rewritten to dash-case. Each run of alphanumeric
//! characters is split into words on case boundaries (a run of capitals is
//! one word, so `getXMLData` becomes `get-xml-data`) and lower-cased;
//! underscores and spaces become dashes and other characters are kept.
//! Segments containing `:` are placeholders and pass through.

use heck::ToKebabCase;

/// Normalize `path` when `enabled`, otherwise return it unchanged.
pub fn normalize_path(path: &str, enabled: bool) -> String {
    if !enabled {
        return path.to_string();
    }

    path.split('/')
        .map(|segment| {
            if segment.is_empty() || segment.contains(':') {
                segment.to_string()
            } else {
                dasherize(segment)
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn dasherize(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len() + 4);
    let mut word = String::new();
    for c in segment.chars() {
        if c.is_alphanumeric() {
            word.push(c);
            continue;
        }
        out.push_str(&word.to_kebab_case());
        word.clear();
        match c {
            '_' | ' ' => out.push('-'),
            other => out.push(other),
        }
    }
    out.push_str(&word.to_kebab_case());
    out
}
