//! In-memory `Widget` class served by the `rest-adapter` binary.
//!
//! Exercises every routing feature: a class mount, a shared constructor bound
//! to `/:id`, literal and placeholder static routes, and prototype methods.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{json, Value};

use crate::error::RemoteError;
use crate::registry::{
    handler_fn, prototype_fn, ArgDescriptor, ArgSource, ArgType, MethodBuilder, RegistryError,
    Results, ReturnDescriptor, RouteSpec, SharedClass, Verb,
};

#[derive(Debug, Default)]
struct Store {
    next_id: u64,
    widgets: BTreeMap<u64, Value>,
}

/// Shared widget storage.
#[derive(Debug, Clone, Default)]
pub struct WidgetStore(Arc<Mutex<Store>>);

impl WidgetStore {
    fn lock(&self) -> Result<MutexGuard<'_, Store>, RemoteError> {
        self.0
            .lock()
            .map_err(|_| RemoteError::internal("widget store is poisoned"))
    }

    pub fn create(&self, mut data: Value) -> Result<Value, RemoteError> {
        let Value::Object(fields) = &mut data else {
            return Err(RemoteError::bad_request("widget data must be an object"));
        };
        let mut store = self.lock()?;
        store.next_id += 1;
        let id = store.next_id;
        fields.insert("id".into(), json!(id));
        store.widgets.insert(id, data.clone());
        Ok(data)
    }

    pub fn get(&self, id: u64) -> Result<Option<Value>, RemoteError> {
        Ok(self.lock()?.widgets.get(&id).cloned())
    }

    pub fn all(&self) -> Result<Vec<Value>, RemoteError> {
        Ok(self.lock()?.widgets.values().cloned().collect())
    }

    pub fn update(&self, id: u64, patch: &Value) -> Result<Value, RemoteError> {
        let mut store = self.lock()?;
        let widget = store
            .widgets
            .get_mut(&id)
            .ok_or_else(|| RemoteError::not_found(format!("Unknown \"Widget\" id {id}")))?;
        if let (Value::Object(target), Value::Object(patch)) = (&mut *widget, patch) {
            for (key, value) in patch.iter().filter(|(k, _)| k.as_str() != "id") {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(widget.clone())
    }

    pub fn remove(&self, id: u64) -> Result<bool, RemoteError> {
        Ok(self.lock()?.widgets.remove(&id).is_some())
    }
}

fn widget_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn instance_id(instance: &Value) -> Result<u64, RemoteError> {
    instance
        .get("id")
        .and_then(widget_id)
        .ok_or_else(|| RemoteError::internal("widget instance has no id"))
}

fn first(args: &[Value]) -> Value {
    args.first().cloned().unwrap_or(Value::Null)
}

fn ctor(store: &WidgetStore, args: &[Value]) -> Result<Results, RemoteError> {
    let widget = match args.first().and_then(widget_id) {
        Some(id) => store.get(id)?,
        None => None,
    };
    Ok(vec![widget.unwrap_or(Value::Null)])
}

fn create(store: &WidgetStore, args: &[Value]) -> Result<Results, RemoteError> {
    Ok(vec![store.create(first(args))?, json!(201)])
}

fn find(store: &WidgetStore, args: &[Value]) -> Result<Results, RemoteError> {
    let limit = args
        .first()
        .and_then(|filter| filter.get("limit"))
        .and_then(Value::as_u64)
        .and_then(|limit| usize::try_from(limit).ok());
    let mut all = store.all()?;
    if let Some(limit) = limit {
        all.truncate(limit);
    }
    Ok(vec![Value::Array(all)])
}

fn find_by_id(store: &WidgetStore, args: &[Value]) -> Result<Results, RemoteError> {
    let id = args.first().and_then(widget_id);
    match id.map(|id| store.get(id)).transpose()?.flatten() {
        Some(widget) => Ok(vec![widget]),
        None => Err(
            RemoteError::not_found(format!("Unknown \"Widget\" id {}", first(args)))
                .with_code("MODEL_NOT_FOUND"),
        ),
    }
}

fn count(store: &WidgetStore) -> Result<Results, RemoteError> {
    Ok(vec![json!(store.all()?.len())])
}

fn update_attributes(store: &WidgetStore, instance: &Value, args: &[Value]) -> Result<Results, RemoteError> {
    Ok(vec![store.update(instance_id(instance)?, &first(args))?])
}

fn destroy(store: &WidgetStore, instance: &Value) -> Result<Results, RemoteError> {
    store.remove(instance_id(instance)?)?;
    Ok(vec![])
}

/// Build the `Widget` class over `store`.
pub fn widget_class(store: WidgetStore) -> Result<Arc<SharedClass>, RegistryError> {
    let s = store.clone();
    let ctor_handler = handler_fn(move |args: Vec<Value>| {
        let store = s.clone();
        async move { ctor(&store, &args) }
    });
    let s = store.clone();
    let create_handler = handler_fn(move |args: Vec<Value>| {
        let store = s.clone();
        async move { create(&store, &args) }
    });
    let s = store.clone();
    let find_handler = handler_fn(move |args: Vec<Value>| {
        let store = s.clone();
        async move { find(&store, &args) }
    });
    let s = store.clone();
    let find_by_id_handler = handler_fn(move |args: Vec<Value>| {
        let store = s.clone();
        async move { find_by_id(&store, &args) }
    });
    let s = store.clone();
    let count_handler = handler_fn(move |_args: Vec<Value>| {
        let store = s.clone();
        async move { count(&store) }
    });
    let s = store.clone();
    let update_handler = prototype_fn(move |instance: Value, args: Vec<Value>| {
        let store = s.clone();
        async move { update_attributes(&store, &instance, &args) }
    });
    let destroy_handler = prototype_fn(move |instance: Value, _args: Vec<Value>| {
        let store = store.clone();
        async move { destroy(&store, &instance) }
    });

    SharedClass::builder("Widget")
        .http(RouteSpec::path("/widgets"))
        .shared_ctor(
            MethodBuilder::shared_ctor(ctor_handler)
                .accepts(
                    ArgDescriptor::new("id", ArgType::Any)
                        .from_source(ArgSource::Path)
                        .required(),
                )
                .http(RouteSpec::path("/:id")),
        )
        .method(
            MethodBuilder::new_static("create", create_handler)
                .accepts(
                    ArgDescriptor::new("data", ArgType::Object)
                        .from_source(ArgSource::Body)
                        .required(),
                )
                .returns(ReturnDescriptor::new("data", ArgType::Object).root())
                .returns(ReturnDescriptor::new("status", ArgType::Number).to_status())
                .http(RouteSpec::new(Verb::Post, "/"))
                .description("Create a widget."),
        )
        .method(
            MethodBuilder::new_static("find", find_handler)
                .accepts(ArgDescriptor::new("filter", ArgType::Object))
                .accepts(ArgDescriptor::new("options", ArgType::Object))
                .returns(ReturnDescriptor::new("data", ArgType::Array).root())
                .http(RouteSpec::new(Verb::Get, "/"))
                .description("Find all widgets."),
        )
        .method(
            MethodBuilder::new_static("findById", find_by_id_handler)
                .accepts(
                    ArgDescriptor::new("id", ArgType::Any)
                        .from_source(ArgSource::Path)
                        .required(),
                )
                .returns(ReturnDescriptor::new("data", ArgType::Object).root())
                .http(RouteSpec::new(Verb::Get, "/:id")),
        )
        .method(
            MethodBuilder::new_static("count", count_handler)
                .returns(ReturnDescriptor::new("count", ArgType::Number))
                .http(RouteSpec::new(Verb::Get, "/count")),
        )
        .method(
            MethodBuilder::new_prototype("updateAttributes", update_handler)
                .accepts(
                    ArgDescriptor::new("data", ArgType::Object)
                        .from_source(ArgSource::Body)
                        .required(),
                )
                .returns(ReturnDescriptor::new("data", ArgType::Object).root())
                .http(RouteSpec::new(Verb::Put, "/")),
        )
        .method(
            MethodBuilder::new_prototype("destroy", destroy_handler)
                .http(RouteSpec::new(Verb::Delete, "/")),
        )
        .build()
}
