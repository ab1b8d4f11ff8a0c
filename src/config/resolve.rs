//! Effective option resolution.
//!
//! Options live at three layers: adapter-wide ([`RestConfig`]), per class
//! ([`ClassOptions`]) and per call or per entity. The most specific layer
//! that sets a value wins.

use crate::config::schema::RestConfig;
use crate::registry::ClassOptions;

/// A REST flag that can be overridden below the adapter level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestFlag {
    NormalizeHttpPath,
    HandleUnknownPaths,
    HandleErrors,
}

impl RestFlag {
    fn adapter_value(self, config: &RestConfig) -> bool {
        match self {
            RestFlag::NormalizeHttpPath => config.normalize_http_path,
            RestFlag::HandleUnknownPaths => config.handle_unknown_paths,
            RestFlag::HandleErrors => config.handle_errors,
        }
    }

    fn class_value(self, options: &ClassOptions) -> Option<bool> {
        match self {
            RestFlag::NormalizeHttpPath => options.normalize_http_path,
            RestFlag::HandleUnknownPaths => options.handle_unknown_paths,
            RestFlag::HandleErrors => options.handle_errors,
        }
    }
}

/// Resolve the effective value of `flag`.
///
/// Precedence: `call` > `class` > `adapter`.
pub fn resolve(
    flag: RestFlag,
    adapter: &RestConfig,
    class: Option<&ClassOptions>,
    call: Option<bool>,
) -> bool {
    call.or_else(|| class.and_then(|c| flag.class_value(c)))
        .unwrap_or_else(|| flag.adapter_value(adapter))
}

/// Resolve the credential used for a programmatic invocation.
///
/// The global credential always wins. A per-call credential is only used when
/// no global one is configured and pass-through is enabled.
pub fn resolve_credential(
    global: Option<&str>,
    per_call: Option<&str>,
    pass_through: bool,
) -> Option<String> {
    match (global, per_call) {
        (Some(token), _) => Some(token.to_string()),
        (None, Some(token)) if pass_through => Some(token.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence() {
        let adapter = RestConfig::default();
        let class = ClassOptions {
            handle_errors: Some(false),
            ..Default::default()
        };

        assert!(resolve(RestFlag::HandleErrors, &adapter, None, None));
        assert!(!resolve(RestFlag::HandleErrors, &adapter, Some(&class), None));
        assert!(resolve(RestFlag::HandleErrors, &adapter, Some(&class), Some(true)));
        // Unset at class level falls through to the adapter.
        assert!(resolve(RestFlag::HandleUnknownPaths, &adapter, Some(&class), None));
        assert!(!resolve(RestFlag::NormalizeHttpPath, &adapter, Some(&class), None));
    }

    #[test]
    fn test_credential_precedence() {
        assert_eq!(resolve_credential(Some("g"), Some("c"), true).as_deref(), Some("g"));
        assert_eq!(resolve_credential(None, Some("c"), true).as_deref(), Some("c"));
        assert_eq!(resolve_credential(None, Some("c"), false), None);
        assert_eq!(resolve_credential(None, None, true), None);
    }
}
