//! Global hooks selected by method-name pattern.
//!
//! Patterns are `.`-separated like qualified method names. `*` matches exactly
//! one segment and `**` matches every remaining segment, so `Widget.*`
//! selects the static methods of `Widget`, `Widget.prototype.*` its instance
//! methods and `**` everything.

use std::sync::Arc;

use crate::registry::method::Hook;

/// A compiled method-name pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookPattern {
    segments: Vec<String>,
}

impl HookPattern {
    pub fn new(pattern: &str) -> Self {
        Self {
            segments: pattern.split('.').map(str::to_string).collect(),
        }
    }

    pub fn matches(&self, full_name: &str) -> bool {
        let name: Vec<&str> = full_name.split('.').collect();
        let mut i = 0;
        for (pos, segment) in self.segments.iter().enumerate() {
            if segment == "**" {
                // Trailing `**` swallows the rest; an inner `**` must still
                // leave room for the remaining pattern segments.
                let rest = self.segments.len() - pos - 1;
                return name.len() >= i + rest
                    && self.segments[pos + 1..]
                        .iter()
                        .zip(&name[name.len() - rest..])
                        .all(|(p, n)| p == "*" || p == n);
            }
            match name.get(i) {
                Some(n) if segment == "*" || segment == n => i += 1,
                _ => return false,
            }
        }
        i == name.len()
    }
}

/// Hooks registered against name patterns, in registration order.
#[derive(Clone, Default)]
pub struct HookSet {
    hooks: Vec<(HookPattern, Arc<dyn Hook>)>,
}

impl HookSet {
    pub fn push(&mut self, pattern: &str, hook: Arc<dyn Hook>) {
        self.hooks.push((HookPattern::new(pattern), hook));
    }

    /// Hooks whose pattern selects `full_name`.
    pub fn matching(&self, full_name: &str) -> Vec<Arc<dyn Hook>> {
        self.hooks
            .iter()
            .filter(|(pattern, _)| pattern.matches(full_name))
            .map(|(_, hook)| hook.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}
