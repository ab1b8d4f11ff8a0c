//! Path joining and prototype route composition.

use crate::config::{resolve, RestConfig, RestFlag};
use crate::registry::{Route, SharedClass, SharedMethod};
use crate::routing::derive::derive_routes;

/// Join two path fragments with exactly one `/` at the boundary.
pub fn join_paths(prefix: &str, suffix: &str) -> String {
    if prefix.is_empty() {
        return suffix.to_string();
    }
    if suffix.trim_matches('/').is_empty() {
        return prefix.to_string();
    }

    match (prefix.ends_with('/'), suffix.starts_with('/')) {
        (true, true) => format!("{}{}", prefix, &suffix[1..]),
        (true, false) | (false, true) => format!("{prefix}{suffix}"),
        (false, false) => format!("{prefix}/{suffix}"),
    }
}

/// Cross product of constructor routes and method routes.
///
/// The verb comes from the method route; the constructor route only
/// contributes its path as a prefix.
pub fn prototype_routes(ctor_routes: &[Route], method_routes: &[Route]) -> Vec<Route> {
    ctor_routes
        .iter()
        .flat_map(|ctor| {
            method_routes
                .iter()
                .map(move |route| Route::new(route.verb, join_paths(&ctor.path, &route.path)))
        })
        .collect()
}

/// Routes of `method` relative to its class mount point.
pub fn method_routes(class: &SharedClass, method: &SharedMethod, config: &RestConfig) -> Vec<Route> {
    let normalize = resolve(RestFlag::NormalizeHttpPath, config, Some(class.options()), None);
    let routes = derive_routes(method, normalize);

    if method.is_static() {
        return routes;
    }
    match class.shared_ctor() {
        Some(ctor) => prototype_routes(&derive_routes(ctor.as_ref(), normalize), &routes),
        // Classes without a shared constructor cannot hold prototype methods.
        None => Vec::new(),
    }
}

/// Mount paths of `class`.
pub fn class_routes(class: &SharedClass, config: &RestConfig) -> Vec<Route> {
    let normalize = resolve(RestFlag::NormalizeHttpPath, config, Some(class.options()), None);
    derive_routes(class, normalize)
}
