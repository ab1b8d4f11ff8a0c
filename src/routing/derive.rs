//! Route derivation from class and method metadata.

use crate::registry::{Route, RouteSpec, SharedClass, SharedMethod, Verb};
use crate::routing::normalize::normalize_path;

/// Path every shared constructor gets when it declares no route.
pub const SHARED_CTOR_PATH: &str = "/prototype";

/// Something that routes can be derived for: a class or a method.
pub trait RouteSource {
    fn route_name(&self) -> &str;
    fn declared_routes(&self) -> &[RouteSpec];
    fn is_shared_ctor(&self) -> bool {
        false
    }
    /// Entity-level override of the normalization flag.
    fn normalize_override(&self) -> Option<bool> {
        None
    }
}

impl RouteSource for SharedMethod {
    fn route_name(&self) -> &str {
        self.name()
    }

    fn declared_routes(&self) -> &[RouteSpec] {
        self.http()
    }

    fn is_shared_ctor(&self) -> bool {
        SharedMethod::is_shared_ctor(self)
    }

    fn normalize_override(&self) -> Option<bool> {
        self.normalize_http_path()
    }
}

impl RouteSource for SharedClass {
    fn route_name(&self) -> &str {
        self.name()
    }

    fn declared_routes(&self) -> &[RouteSpec] {
        self.http()
    }
}

/// Derive the routes of `entity`.
///
/// `normalize` is the flag in effect for the entity's scope; an entity-level
/// override takes precedence. The result is never empty.
pub fn derive_routes<E: RouteSource + ?Sized>(entity: &E, normalize: bool) -> Vec<Route> {
    let normalize = entity.normalize_override().unwrap_or(normalize);
    let declared = entity.declared_routes();

    if !declared.is_empty() {
        return declared
            .iter()
            .map(|spec| {
                let path = match &spec.path {
                    Some(path) => path.clone(),
                    None => format!("/{}", entity.route_name()),
                };
                Route::new(spec.verb.unwrap_or(Verb::All), normalize_path(&path, normalize))
            })
            .collect();
    }

    if entity.is_shared_ctor() {
        return vec![Route::new(Verb::All, SHARED_CTOR_PATH)];
    }

    let path = if entity.route_name().is_empty() {
        String::new()
    } else {
        normalize_path(&format!("/{}", entity.route_name()), normalize)
    };
    vec![Route::new(Verb::All, path)]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Entity {
        name: &'static str,
        http: Vec<RouteSpec>,
        ctor: bool,
        normalize: Option<bool>,
    }

    impl Entity {
        fn named(name: &'static str) -> Self {
            Self {
                name,
                http: Vec::new(),
                ctor: false,
                normalize: None,
            }
        }
    }

    impl RouteSource for Entity {
        fn route_name(&self) -> &str {
            self.name
        }
        fn declared_routes(&self) -> &[RouteSpec] {
            &self.http
        }
        fn is_shared_ctor(&self) -> bool {
            self.ctor
        }
        fn normalize_override(&self) -> Option<bool> {
            self.normalize
        }
    }

    #[test]
    fn test_default_route() {
        let routes = derive_routes(&Entity::named("findById"), true);
        assert_eq!(routes, vec![Route::new(Verb::All, "/find-by-id")]);

        let routes = derive_routes(&Entity::named("findById"), false);
        assert_eq!(routes, vec![Route::new(Verb::All, "/findById")]);
    }

    #[test]
    fn test_nameless_entity_is_mount_root() {
        assert_eq!(derive_routes(&Entity::named(""), true), vec![Route::new(Verb::All, "")]);
    }

    #[test]
    fn test_shared_ctor_default_is_not_normalized() {
        let mut ctor = Entity::named("SharedCtor");
        ctor.ctor = true;
        assert_eq!(derive_routes(&ctor, true), vec![Route::new(Verb::All, "/prototype")]);
    }

    #[test]
    fn test_declared_routes_fill_defaults() {
        let mut entity = Entity::named("countAll");
        entity.http = vec![
            RouteSpec::path("/CountAll/:Kind"),
            RouteSpec::verb(Verb::Get),
            RouteSpec::new(Verb::Delete, "/x"),
        ];
        let routes = derive_routes(&entity, true);
        assert_eq!(
            routes,
            vec![
                Route::new(Verb::All, "/count-all/:Kind"),
                Route::new(Verb::Get, "/count-all"),
                Route::new(Verb::Delete, "/x"),
            ]
        );
    }

    #[test]
    fn test_entity_override_wins() {
        let mut entity = Entity::named("findById");
        entity.normalize = Some(false);
        assert_eq!(derive_routes(&entity, true), vec![Route::new(Verb::All, "/findById")]);

        entity.normalize = Some(true);
        assert_eq!(derive_routes(&entity, false), vec![Route::new(Verb::All, "/find-by-id")]);
    }
}
