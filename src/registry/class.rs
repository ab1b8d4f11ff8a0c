//! Remote class descriptors.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::registry::descriptor::RouteSpec;
use crate::registry::method::{MethodBuilder, SharedMethod};

/// Error raised while assembling a class.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("class `{class}` declares prototype method `{method}` but has no shared constructor")]
    MissingSharedCtor { class: String, method: String },

    #[error("class `{class}` declares method `{method}` more than once")]
    DuplicateMethod { class: String, method: String },

    #[error("`{0}` is a shared constructor and cannot be added as a regular method")]
    CtorAsMethod(String),

    #[error("shared constructor `{method}` of class `{class}` must have a static handler")]
    PrototypeCtor { class: String, method: String },
}

/// Per-class overrides of the adapter-wide REST flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassOptions {
    pub normalize_http_path: Option<bool>,
    pub handle_unknown_paths: Option<bool>,
    pub handle_errors: Option<bool>,
}

/// A registered class: its methods, shared constructor and class routes.
#[derive(Debug)]
pub struct SharedClass {
    name: String,
    methods: Vec<Arc<SharedMethod>>,
    ctor: Option<Arc<SharedMethod>>,
    http: Vec<RouteSpec>,
    options: ClassOptions,
}

impl SharedClass {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            name: name.into(),
            methods: Vec::new(),
            ctor: None,
            http: Vec::new(),
            options: ClassOptions::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Methods in declaration order. The shared constructor is not included.
    pub fn methods(&self) -> &[Arc<SharedMethod>] {
        &self.methods
    }

    pub fn shared_ctor(&self) -> Option<&Arc<SharedMethod>> {
        self.ctor.as_ref()
    }

    pub fn http(&self) -> &[RouteSpec] {
        &self.http
    }

    pub fn options(&self) -> &ClassOptions {
        &self.options
    }

    pub fn find_method(&self, name: &str, is_static: bool) -> Option<&Arc<SharedMethod>> {
        self.methods
            .iter()
            .find(|m| m.name() == name && m.is_static() == is_static)
    }
}

pub struct ClassBuilder {
    name: String,
    methods: Vec<MethodBuilder>,
    ctor: Option<MethodBuilder>,
    http: Vec<RouteSpec>,
    options: ClassOptions,
}

impl ClassBuilder {
    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    /// Set the shared constructor. Any static builder is accepted and
    /// registered as a constructor; its routes default to `/prototype`.
    pub fn shared_ctor(mut self, ctor: MethodBuilder) -> Self {
        self.ctor = Some(ctor);
        self
    }

    pub fn http(mut self, route: RouteSpec) -> Self {
        self.http.push(route);
        self
    }

    pub fn options(mut self, options: ClassOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Result<Arc<SharedClass>, RegistryError> {
        if let Some(ctor) = self.ctor.as_ref().filter(|c| c.is_prototype()) {
            return Err(RegistryError::PrototypeCtor {
                class: self.name.clone(),
                method: ctor.name().to_string(),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for method in &self.methods {
            if method.is_shared_ctor() {
                return Err(RegistryError::CtorAsMethod(method.name().to_string()));
            }
            if method.is_prototype() && self.ctor.is_none() {
                return Err(RegistryError::MissingSharedCtor {
                    class: self.name.clone(),
                    method: method.name().to_string(),
                });
            }
            if !seen.insert((method.name().to_string(), method.is_prototype())) {
                return Err(RegistryError::DuplicateMethod {
                    class: self.name.clone(),
                    method: method.name().to_string(),
                });
            }
        }

        let name = self.name;
        let methods = self
            .methods
            .into_iter()
            .map(|m| Arc::new(m.build(&name)))
            .collect();
        let ctor = self
            .ctor
            .map(|c| Arc::new(c.into_shared_ctor().build(&name)));

        Ok(Arc::new(SharedClass {
            name,
            methods,
            ctor,
            http: self.http,
            options: self.options,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RestConfig;
    use crate::registry::method::{handler_fn, prototype_fn};
    use crate::registry::{Route, Verb};
    use crate::routing::method_routes;
    use serde_json::json;

    fn find() -> MethodBuilder {
        MethodBuilder::new_static("find", handler_fn(|_args| async { Ok(vec![json!([])]) }))
    }

    fn count() -> MethodBuilder {
        MethodBuilder::new_prototype(
            "count",
            prototype_fn(|_instance, _args| async { Ok(vec![json!(0)]) }),
        )
    }

    #[test]
    fn test_build_class() {
        let class = SharedClass::builder("Widget")
            .shared_ctor(MethodBuilder::shared_ctor(handler_fn(|args| async move {
                Ok(vec![json!({ "id": args.first().cloned() })])
            })))
            .method(find())
            .method(count())
            .build()
            .unwrap();

        assert_eq!(class.methods().len(), 2);
        assert_eq!(class.methods()[1].full_name(), "Widget.prototype.count");
        assert!(class.shared_ctor().unwrap().is_shared_ctor());
        assert!(class.find_method("count", false).is_some());
        assert!(class.find_method("count", true).is_none());
    }

    #[test]
    fn test_prototype_requires_ctor() {
        let err = SharedClass::builder("Widget").method(count()).build().unwrap_err();
        assert_eq!(
            err,
            RegistryError::MissingSharedCtor {
                class: "Widget".into(),
                method: "count".into()
            }
        );
    }

    #[test]
    fn test_any_static_builder_becomes_a_shared_ctor() {
        let class = SharedClass::builder("Widget")
            .shared_ctor(MethodBuilder::new_static(
                "load",
                handler_fn(|_args| async { Ok(vec![json!({})]) }),
            ))
            .method(count())
            .build()
            .unwrap();

        let ctor = class.shared_ctor().unwrap();
        assert!(ctor.is_shared_ctor());
        assert!(class.methods().iter().all(|m| !m.is_shared_ctor()));
        assert_eq!(
            method_routes(&class, &class.methods()[0], &RestConfig::default()),
            vec![Route::new(Verb::All, "/prototype/count")]
        );
    }

    #[test]
    fn test_prototype_ctor_is_rejected() {
        let err = SharedClass::builder("Widget")
            .shared_ctor(count())
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::PrototypeCtor {
                class: "Widget".into(),
                method: "count".into()
            }
        );
    }

    #[test]
    fn test_duplicate_method() {
        let err = SharedClass::builder("Widget")
            .method(find())
            .method(find())
            .build()
            .unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateMethod { .. }));
    }
}
