//! Path template matching.
//!
//! # Responsibilities
//! - Compile `:name` path templates
//! - Match a request path exactly (routes) or by prefix (mounts)
//! - Capture placeholder values, percent-decoded
//!
//! # Design Decisions
//! - Literal segments compare ASCII case-insensitively
//! - Empty segments are ignored, so a trailing slash still matches
//! - No regex: matching is a single pass over the segments

use percent_encoding::percent_decode_str;

/// Values captured by placeholders, in template order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams(Vec<(String, String)>);

impl PathParams {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    pub fn extend(&mut self, other: PathParams) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled path template such as `/widgets/:id/parts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    template: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let segments = split(&template)
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(s.to_string()),
            })
            .collect();
        Self { template, segments }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholder names in template order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match the whole of `path`.
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        let parts: Vec<&str> = split(path).collect();
        if parts.len() != self.segments.len() {
            return None;
        }
        self.match_segments(&parts)
    }

    /// Match a leading part of `path` on segment boundaries.
    ///
    /// Returns the captured params and the unmatched remainder (`""` when the
    /// whole path was consumed, otherwise starting with `/`).
    pub fn match_prefix(&self, path: &str) -> Option<(PathParams, String)> {
        let parts: Vec<&str> = split(path).collect();
        if parts.len() < self.segments.len() {
            return None;
        }
        let (head, tail) = parts.split_at(self.segments.len());
        let params = self.match_segments(head)?;
        let rest = if tail.is_empty() {
            String::new()
        } else {
            format!("/{}", tail.join("/"))
        };
        Some((params, rest))
    }

    fn match_segments(&self, parts: &[&str]) -> Option<PathParams> {
        let mut params = PathParams::default();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if !decode(part).eq_ignore_ascii_case(literal) {
                        return None;
                    }
                }
                Segment::Param(name) => params.insert(name.clone(), decode(part)),
            }
        }
        Some(params)
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn decode(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let pattern = PathPattern::new("/widgets/:id/parts");
        let params = pattern.match_path("/widgets/42/parts").unwrap();
        assert_eq!(params.get("id"), Some("42"));

        assert!(pattern.match_path("/widgets/42").is_none());
        assert!(pattern.match_path("/widgets/42/parts/7").is_none());
        assert!(pattern.match_path("/gadgets/42/parts").is_none());
    }

    #[test]
    fn test_case_insensitive_literals_and_trailing_slash() {
        let pattern = PathPattern::new("/Widgets/count");
        assert!(pattern.match_path("/widgets/COUNT/").is_some());
    }

    #[test]
    fn test_percent_decoding() {
        let pattern = PathPattern::new("/files/:name");
        let params = pattern.match_path("/files/a%20b%2Fc").unwrap();
        assert_eq!(params.get("name"), Some("a b/c"));
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::new("");
        assert!(pattern.match_path("/").is_some());
        assert!(pattern.match_path("").is_some());
        assert_eq!(pattern.match_prefix("/a/b").unwrap().1, "/a/b");
    }

    #[test]
    fn test_prefix_match() {
        let pattern = PathPattern::new("/widgets");
        let (_, rest) = pattern.match_prefix("/widgets/7/count").unwrap();
        assert_eq!(rest, "/7/count");

        let (_, rest) = pattern.match_prefix("/Widgets").unwrap();
        assert_eq!(rest, "");

        // Segment boundaries only.
        assert!(pattern.match_prefix("/widgetsx").is_none());
    }

    #[test]
    fn test_param_names() {
        let pattern = PathPattern::new("/prototype/:id/parts/:part");
        assert_eq!(pattern.param_names().collect::<Vec<_>>(), vec!["id", "part"]);
    }
}
