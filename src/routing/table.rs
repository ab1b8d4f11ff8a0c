//! Route table construction.
//!
//! # Data Flow
//! ```text
//! RemoteObjects
//!     → method_routes() per method (derive + compose)
//!     → flatten across classes, stable-rank globally
//!     → regroup per class (rank order preserved)
//!     → class Mux (+ optional unknown-path catch-all)
//!     → mounted at every class path on the root Mux
//!     → optional global catch-all
//! ```

use std::sync::Arc;

use axum::http::Method;
use serde::Serialize;

use crate::config::{resolve, RestConfig, RestFlag};
use crate::registry::{
    ArgDescriptor, RemoteObjects, ReturnDescriptor, Route, SharedClass, SharedMethod, Verb,
};
use crate::routing::compose::{class_routes, join_paths, method_routes};
use crate::routing::mux::{Match, Mux};
use crate::routing::rank::rank_by;

/// Fatal error while building the route table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error(
        "the REST adapter no longer supports built-in CORS configuration; \
         remove `rest.cors` and use a dedicated CORS middleware instead"
    )]
    LegacyCors,

    #[error("method `{0}` yields no routes")]
    NoRoutes(String),
}

/// What a matched registration dispatches to.
#[derive(Debug, Clone)]
pub enum EndpointKind {
    /// A remote method, with its class's shared constructor for prototype
    /// methods.
    Method {
        method: Arc<SharedMethod>,
        ctor: Option<Arc<SharedMethod>>,
    },
    /// Terminal "no such method" handler.
    UnknownPath,
}

#[derive(Debug, Clone)]
pub struct Endpoint {
    pub kind: EndpointKind,
    /// Render errors in the structured wire format.
    pub handle_errors: bool,
}

impl Endpoint {
    /// Whether the endpoint can serve right now. Disabled methods are skipped.
    pub fn is_available(&self) -> bool {
        match &self.kind {
            EndpointKind::Method { method, .. } => method.is_enabled(),
            EndpointKind::UnknownPath => true,
        }
    }
}

/// One row of the introspection listing.
#[derive(Debug, Clone, Serialize)]
pub struct RouteInfo {
    pub verb: Verb,
    pub path: String,
    pub method: String,
    pub accepts: Vec<ArgDescriptor>,
    pub returns: Vec<ReturnDescriptor>,
    pub errors: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

struct RouteEntry {
    class: usize,
    route: Route,
    method: Arc<SharedMethod>,
}

/// The dispatch table for every registered method.
#[derive(Debug)]
pub struct RouteTable {
    mux: Mux<Endpoint>,
    routes: Vec<RouteInfo>,
    handle_errors: bool,
}

impl RouteTable {
    pub fn build(objects: &RemoteObjects, config: &RestConfig) -> Result<Self, BuildError> {
        if config.has_legacy_cors() {
            return Err(BuildError::LegacyCors);
        }

        let classes = objects.classes();
        let mut entries = Vec::new();
        for (index, class) in classes.iter().enumerate() {
            for method in class.methods() {
                let routes = method_routes(class, method, config);
                if routes.is_empty() {
                    return Err(BuildError::NoRoutes(method.full_name()));
                }
                entries.extend(routes.into_iter().map(|route| RouteEntry {
                    class: index,
                    route,
                    method: method.clone(),
                }));
            }
        }
        rank_by(&mut entries, |e| &e.route);

        let mut mux = Mux::new();
        let mut listing = Vec::new();
        for (index, class) in classes.iter().enumerate() {
            let class_entries: Vec<&RouteEntry> =
                entries.iter().filter(|e| e.class == index).collect();
            let mounts = class_routes(class, config);
            let handle_errors =
                resolve(RestFlag::HandleErrors, config, Some(class.options()), None);

            for mount in &mounts {
                mux.mount(&mount.path, Self::class_mux(class, &class_entries, config, handle_errors));
                for entry in &class_entries {
                    listing.push(route_info(&mount.path, entry));
                }
            }

            tracing::debug!(
                class = %class.name(),
                routes = class_entries.len(),
                mounts = mounts.len(),
                "Mounted class"
            );
        }

        if config.handle_unknown_paths {
            mux.catch_all(Endpoint {
                kind: EndpointKind::UnknownPath,
                handle_errors: config.handle_errors,
            });
        }

        tracing::info!(
            classes = classes.len(),
            routes = listing.len(),
            "Route table built"
        );

        Ok(Self {
            mux,
            routes: listing,
            handle_errors: config.handle_errors,
        })
    }

    fn class_mux(
        class: &SharedClass,
        entries: &[&RouteEntry],
        config: &RestConfig,
        handle_errors: bool,
    ) -> Mux<Endpoint> {
        let mut mux = Mux::new();
        for entry in entries {
            let ctor = if entry.method.is_static() {
                None
            } else {
                class.shared_ctor().cloned()
            };
            mux.route(
                entry.route.verb,
                &entry.route.path,
                Endpoint {
                    kind: EndpointKind::Method {
                        method: entry.method.clone(),
                        ctor,
                    },
                    handle_errors,
                },
            );
        }
        if resolve(RestFlag::HandleUnknownPaths, config, Some(class.options()), None) {
            mux.catch_all(Endpoint {
                kind: EndpointKind::UnknownPath,
                handle_errors,
            });
        }
        mux
    }

    /// First available endpoint matching the request.
    pub fn find(&self, method: &Method, path: &str) -> Option<Match<'_, Endpoint>> {
        self.mux.find(method, path, &Endpoint::is_available)
    }

    /// Flattened route listing in registration order.
    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    /// Adapter-level error rendering for requests no class claimed.
    pub fn handle_errors(&self) -> bool {
        self.handle_errors
    }
}

fn route_info(mount: &str, entry: &RouteEntry) -> RouteInfo {
    let method = &entry.method;
    RouteInfo {
        verb: entry.route.verb,
        path: join_paths(mount, &entry.route.path),
        method: method.full_name(),
        accepts: method.accepts().to_vec(),
        returns: method.returns().to_vec(),
        errors: method.errors().to_vec(),
        description: method.description().map(str::to_string),
        notes: method.notes().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{
        handler_fn, prototype_fn, ClassOptions, MethodBuilder, RouteSpec,
    };
    use serde_json::json;

    fn widget(options: ClassOptions) -> Arc<SharedClass> {
        SharedClass::builder("Widget")
            .http(RouteSpec::path("/widgets"))
            .options(options)
            .shared_ctor(
                MethodBuilder::shared_ctor(handler_fn(|_args| async { Ok(vec![json!({})]) }))
                    .http(RouteSpec::path("/:id")),
            )
            .method(
                MethodBuilder::new_static("findById", handler_fn(|_args| async { Ok(vec![]) }))
                    .http(RouteSpec::new(Verb::Get, "/:id")),
            )
            .method(
                MethodBuilder::new_static("count", handler_fn(|_args| async { Ok(vec![]) }))
                    .http(RouteSpec::new(Verb::Get, "/count")),
            )
            .method(
                MethodBuilder::new_prototype(
                    "parts",
                    prototype_fn(|_i, _args| async { Ok(vec![]) }),
                )
                .http(RouteSpec::verb(Verb::Get)),
            )
            .build()
            .unwrap()
    }

    fn endpoint_name(found: Option<Match<'_, Endpoint>>) -> String {
        match found.map(|m| m.handler.kind.clone()) {
            Some(EndpointKind::Method { method, .. }) => method.full_name(),
            Some(EndpointKind::UnknownPath) => "404".into(),
            None => "none".into(),
        }
    }

    #[test]
    fn test_legacy_cors_is_fatal() {
        let objects = RemoteObjects::new();
        let mut config = RestConfig::default();
        config.cors = Some(json!({ "origin": "*" }));
        assert_eq!(RouteTable::build(&objects, &config).unwrap_err(), BuildError::LegacyCors);

        config.cors = Some(json!(false));
        assert!(RouteTable::build(&objects, &config).is_ok());
    }

    #[test]
    fn test_literal_wins_over_placeholder() {
        let objects = RemoteObjects::new();
        objects.add_class(widget(ClassOptions::default()));
        let table = RouteTable::build(&objects, &RestConfig::default()).unwrap();

        assert_eq!(endpoint_name(table.find(&Method::GET, "/widgets/count")), "Widget.count");
        assert_eq!(endpoint_name(table.find(&Method::GET, "/widgets/7")), "Widget.findById");
        assert_eq!(
            endpoint_name(table.find(&Method::GET, "/widgets/7/parts")),
            "Widget.prototype.parts"
        );
        assert_eq!(endpoint_name(table.find(&Method::POST, "/widgets/7")), "404");
        assert_eq!(endpoint_name(table.find(&Method::GET, "/elsewhere")), "404");
    }

    #[test]
    fn test_listing_is_ranked_and_prefixed() {
        let objects = RemoteObjects::new();
        objects.add_class(widget(ClassOptions::default()));
        let table = RouteTable::build(&objects, &RestConfig::default()).unwrap();

        let listing: Vec<String> = table
            .routes()
            .iter()
            .map(|r| format!("{} {} {}", r.verb, r.path, r.method))
            .collect();
        assert_eq!(
            listing,
            vec![
                "GET /widgets/count Widget.count",
                "GET /widgets/:id/parts Widget.prototype.parts",
                "GET /widgets/:id Widget.findById",
            ]
        );
    }

    #[test]
    fn test_disabled_method_falls_through() {
        let objects = RemoteObjects::new();
        let class = widget(ClassOptions::default());
        objects.add_class(class.clone());
        let table = RouteTable::build(&objects, &RestConfig::default()).unwrap();

        class.find_method("count", true).unwrap().disable();
        // `/count` now reaches the placeholder route.
        assert_eq!(endpoint_name(table.find(&Method::GET, "/widgets/count")), "Widget.findById");
    }

    #[test]
    fn test_class_level_unknown_path_handling() {
        let objects = RemoteObjects::new();
        objects.add_class(widget(ClassOptions {
            handle_unknown_paths: Some(false),
            ..Default::default()
        }));
        let mut config = RestConfig::default();
        config.handle_unknown_paths = false;
        let table = RouteTable::build(&objects, &config).unwrap();
        assert_eq!(endpoint_name(table.find(&Method::DELETE, "/widgets/7")), "none");

        let objects = RemoteObjects::new();
        objects.add_class(widget(ClassOptions {
            handle_unknown_paths: Some(true),
            handle_errors: Some(false),
            ..Default::default()
        }));
        let table = RouteTable::build(&objects, &config).unwrap();
        let found = table.find(&Method::DELETE, "/widgets/7").unwrap();
        assert!(matches!(found.handler.kind, EndpointKind::UnknownPath));
        assert!(!found.handler.handle_errors);
        assert!(table.find(&Method::DELETE, "/gadgets").is_none());
    }
}
