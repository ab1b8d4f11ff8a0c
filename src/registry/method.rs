//! Remote method descriptors and their invocation handlers.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RemoteError;
use crate::invocation::InvocationContext;
use crate::registry::args::get_arg_by_name;
use crate::registry::descriptor::{ArgDescriptor, ReturnDescriptor, RouteSpec};

/// Positional results of a method call.
pub type Results = Vec<Value>;

/// Handler of a static method (and of shared constructors).
#[async_trait]
pub trait StaticHandler: Send + Sync {
    async fn call(&self, args: Vec<Value>) -> Result<Results, RemoteError>;
}

/// Handler of an instance-bound method.
#[async_trait]
pub trait PrototypeHandler: Send + Sync {
    async fn call(&self, instance: Value, args: Vec<Value>) -> Result<Results, RemoteError>;
}

/// A before/after hook run around an invocation.
#[async_trait]
pub trait Hook: Send + Sync {
    async fn run(&self, ctx: &mut InvocationContext) -> Result<(), RemoteError>;
}

/// Closure adapter for [`StaticHandler`].
pub struct FnHandler<F>(F);

/// Closure adapter for [`PrototypeHandler`].
pub struct FnPrototype<F>(F);

/// Closure adapter for [`Hook`]. The closure runs synchronously.
pub struct FnHook<F>(F);

pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Results, RemoteError>> + Send + 'static,
{
    FnHandler(f)
}

pub fn prototype_fn<F, Fut>(f: F) -> FnPrototype<F>
where
    F: Fn(Value, Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Results, RemoteError>> + Send + 'static,
{
    FnPrototype(f)
}

pub fn hook_fn<F>(f: F) -> FnHook<F>
where
    F: Fn(&mut InvocationContext) -> Result<(), RemoteError> + Send + Sync + 'static,
{
    FnHook(f)
}

#[async_trait]
impl<F, Fut> StaticHandler for FnHandler<F>
where
    F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Results, RemoteError>> + Send + 'static,
{
    async fn call(&self, args: Vec<Value>) -> Result<Results, RemoteError> {
        (self.0)(args).await
    }
}

#[async_trait]
impl<F, Fut> PrototypeHandler for FnPrototype<F>
where
    F: Fn(Value, Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Results, RemoteError>> + Send + 'static,
{
    async fn call(&self, instance: Value, args: Vec<Value>) -> Result<Results, RemoteError> {
        (self.0)(instance, args).await
    }
}

#[async_trait]
impl<F> Hook for FnHook<F>
where
    F: Fn(&mut InvocationContext) -> Result<(), RemoteError> + Send + Sync + 'static,
{
    async fn run(&self, ctx: &mut InvocationContext) -> Result<(), RemoteError> {
        (self.0)(ctx)
    }
}

/// How a method is called.
#[derive(Clone)]
pub enum Invocation {
    Static(Arc<dyn StaticHandler>),
    Prototype(Arc<dyn PrototypeHandler>),
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Static(_) => f.write_str("Static"),
            Invocation::Prototype(_) => f.write_str("Prototype"),
        }
    }
}

/// A registered remote method.
///
/// Immutable once its class is built, except for the enabled flag which is
/// read live on every dispatch.
pub struct SharedMethod {
    name: String,
    class_name: String,
    invocation: Invocation,
    shared_ctor: bool,
    accepts: Vec<ArgDescriptor>,
    returns: Vec<ReturnDescriptor>,
    errors: Vec<Value>,
    http: Vec<RouteSpec>,
    description: Option<String>,
    notes: Option<String>,
    normalize_http_path: Option<bool>,
    before: Option<Arc<dyn Hook>>,
    after: Option<Arc<dyn Hook>>,
    enabled: AtomicBool,
}

impl fmt::Debug for SharedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedMethod")
            .field("name", &self.full_name())
            .field("invocation", &self.invocation)
            .field("http", &self.http)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

impl SharedMethod {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// `Class.name` for static methods, `Class.prototype.name` otherwise.
    pub fn full_name(&self) -> String {
        if self.is_static() {
            format!("{}.{}", self.class_name, self.name)
        } else {
            format!("{}.prototype.{}", self.class_name, self.name)
        }
    }

    pub fn is_static(&self) -> bool {
        matches!(self.invocation, Invocation::Static(_))
    }

    pub fn is_shared_ctor(&self) -> bool {
        self.shared_ctor
    }

    pub fn invocation(&self) -> &Invocation {
        &self.invocation
    }

    pub fn accepts(&self) -> &[ArgDescriptor] {
        &self.accepts
    }

    pub fn returns(&self) -> &[ReturnDescriptor] {
        &self.returns
    }

    pub fn errors(&self) -> &[Value] {
        &self.errors
    }

    pub fn http(&self) -> &[RouteSpec] {
        &self.http
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Entity-level override of the path normalization flag.
    pub fn normalize_http_path(&self) -> Option<bool> {
        self.normalize_http_path
    }

    pub fn before_hook(&self) -> Option<&Arc<dyn Hook>> {
        self.before.as_ref()
    }

    pub fn after_hook(&self) -> Option<&Arc<dyn Hook>> {
        self.after.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    pub fn disable(&self) {
        self.set_enabled(false);
    }

    /// Value bound to the declared argument `name` in `args`.
    pub fn arg_by_name<'a>(&self, name: &str, args: &'a [Value]) -> Option<&'a Value> {
        get_arg_by_name(&self.accepts, name, args)
    }
}

/// Builder for [`SharedMethod`]. The owning class name is filled in when the
/// method is added to a class.
pub struct MethodBuilder {
    name: String,
    invocation: Invocation,
    shared_ctor: bool,
    accepts: Vec<ArgDescriptor>,
    returns: Vec<ReturnDescriptor>,
    errors: Vec<Value>,
    http: Vec<RouteSpec>,
    description: Option<String>,
    notes: Option<String>,
    normalize_http_path: Option<bool>,
    before: Option<Arc<dyn Hook>>,
    after: Option<Arc<dyn Hook>>,
}

impl MethodBuilder {
    fn new(name: impl Into<String>, invocation: Invocation) -> Self {
        Self {
            name: name.into(),
            invocation,
            shared_ctor: false,
            accepts: Vec::new(),
            returns: Vec::new(),
            errors: Vec::new(),
            http: Vec::new(),
            description: None,
            notes: None,
            normalize_http_path: None,
            before: None,
            after: None,
        }
    }

    /// A static method.
    pub fn new_static(name: impl Into<String>, handler: impl StaticHandler + 'static) -> Self {
        Self::new(name, Invocation::Static(Arc::new(handler)))
    }

    /// An instance-bound method, called with the instance produced by the
    /// class's shared constructor.
    pub fn new_prototype(name: impl Into<String>, handler: impl PrototypeHandler + 'static) -> Self {
        Self::new(name, Invocation::Prototype(Arc::new(handler)))
    }

    /// A shared constructor. The first result of the handler is the instance.
    pub fn shared_ctor(handler: impl StaticHandler + 'static) -> Self {
        let mut builder = Self::new("sharedCtor", Invocation::Static(Arc::new(handler)));
        builder.shared_ctor = true;
        builder
    }

    pub fn accepts(mut self, arg: ArgDescriptor) -> Self {
        self.accepts.push(arg);
        self
    }

    pub fn returns(mut self, ret: ReturnDescriptor) -> Self {
        self.returns.push(ret);
        self
    }

    pub fn error(mut self, error: Value) -> Self {
        self.errors.push(error);
        self
    }

    pub fn http(mut self, route: RouteSpec) -> Self {
        self.http.push(route);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn notes(mut self, text: impl Into<String>) -> Self {
        self.notes = Some(text.into());
        self
    }

    pub fn normalize_http_path(mut self, enabled: bool) -> Self {
        self.normalize_http_path = Some(enabled);
        self
    }

    pub fn before(mut self, hook: impl Hook + 'static) -> Self {
        self.before = Some(Arc::new(hook));
        self
    }

    pub fn after(mut self, hook: impl Hook + 'static) -> Self {
        self.after = Some(Arc::new(hook));
        self
    }

    pub(crate) fn is_prototype(&self) -> bool {
        matches!(self.invocation, Invocation::Prototype(_))
    }

    pub(crate) fn is_shared_ctor(&self) -> bool {
        self.shared_ctor
    }

    pub(crate) fn into_shared_ctor(mut self) -> Self {
        self.shared_ctor = true;
        self
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn build(self, class_name: &str) -> SharedMethod {
        SharedMethod {
            name: self.name,
            class_name: class_name.to_string(),
            invocation: self.invocation,
            shared_ctor: self.shared_ctor,
            accepts: self.accepts,
            returns: self.returns,
            errors: self.errors,
            http: self.http,
            description: self.description,
            notes: self.notes,
            normalize_http_path: self.normalize_http_path,
            before: self.before,
            after: self.after,
            enabled: AtomicBool::new(true),
        }
    }
}
