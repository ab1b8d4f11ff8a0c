//! Per-call invocation state.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::RemoteError;
use crate::invocation::binding::{bind_args, RequestInfo};
use crate::registry::SharedMethod;

/// Pipeline states. `Error` is absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Created,
    CtorResolving,
    HookBefore,
    Invoking,
    HookAfter,
    Done,
    Error,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Created => "CREATED",
            PipelineState::CtorResolving => "CTOR_RESOLVING",
            PipelineState::HookBefore => "HOOK_BEFORE",
            PipelineState::Invoking => "INVOKING",
            PipelineState::HookAfter => "HOOK_AFTER",
            PipelineState::Done => "DONE",
            PipelineState::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Everything known about one invocation as it moves through the pipeline.
///
/// Hooks receive it mutably: a before-hook may replace arguments or set the
/// credential, an after-hook may rewrite the result.
#[derive(Debug)]
pub struct InvocationContext {
    method: Arc<SharedMethod>,
    ctor: Option<Arc<SharedMethod>>,
    request: Option<RequestInfo>,
    args: Option<Vec<Value>>,
    ctor_args: Option<Vec<Value>>,
    instance: Option<Value>,
    result: Option<Vec<Value>>,
    credential: Option<String>,
    request_id: Option<String>,
    state: PipelineState,
}

impl InvocationContext {
    fn new(method: Arc<SharedMethod>, ctor: Option<Arc<SharedMethod>>) -> Self {
        Self {
            method,
            ctor,
            request: None,
            args: None,
            ctor_args: None,
            instance: None,
            result: None,
            credential: None,
            request_id: None,
            state: PipelineState::Created,
        }
    }

    /// Context for an HTTP request. Arguments are bound lazily from `request`.
    pub fn from_request(
        method: Arc<SharedMethod>,
        ctor: Option<Arc<SharedMethod>>,
        request: RequestInfo,
        request_id: Option<String>,
    ) -> Self {
        let mut ctx = Self::new(method, ctor);
        ctx.request = Some(request);
        ctx.request_id = request_id;
        ctx
    }

    /// Context for a programmatic call with arguments supplied up front.
    pub fn programmatic(
        method: Arc<SharedMethod>,
        ctor: Option<Arc<SharedMethod>>,
        ctor_args: Vec<Value>,
        args: Vec<Value>,
    ) -> Self {
        let mut ctx = Self::new(method, ctor);
        ctx.ctor_args = Some(ctor_args);
        ctx.args = Some(args);
        ctx
    }

    pub fn method(&self) -> &Arc<SharedMethod> {
        &self.method
    }

    pub fn ctor(&self) -> Option<&Arc<SharedMethod>> {
        self.ctor.as_ref()
    }

    pub fn request(&self) -> Option<&RequestInfo> {
        self.request.as_ref()
    }

    /// Bound arguments. Empty until binding has happened.
    pub fn args(&self) -> &[Value] {
        self.args.as_deref().unwrap_or_default()
    }

    pub fn set_args(&mut self, args: Vec<Value>) {
        self.args = Some(args);
    }

    /// Bound value of the declared argument `name`.
    pub fn arg(&self, name: &str) -> Option<&Value> {
        self.method.arg_by_name(name, self.args())
    }

    pub fn ctor_args(&self) -> &[Value] {
        self.ctor_args.as_deref().unwrap_or_default()
    }

    pub fn instance(&self) -> Option<&Value> {
        self.instance.as_ref()
    }

    pub fn result(&self) -> Option<&[Value]> {
        self.result.as_deref()
    }

    pub fn set_result(&mut self, result: Vec<Value>) {
        self.result = Some(result);
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn set_credential(&mut self, credential: Option<String>) {
        self.credential = credential;
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: PipelineState) {
        tracing::trace!(method = %self.method.full_name(), from = %self.state, to = %state, "Pipeline transition");
        self.state = state;
    }

    pub(crate) fn set_instance(&mut self, instance: Value) {
        self.instance = Some(instance);
    }

    /// Bind method arguments from the request unless already supplied.
    pub(crate) fn bind_args(&mut self) -> Result<(), RemoteError> {
        if self.args.is_some() {
            return Ok(());
        }
        let args = match &self.request {
            Some(request) => bind_args(self.method.accepts(), request)?,
            None => Vec::new(),
        };
        self.args = Some(args);
        Ok(())
    }

    /// Bind constructor arguments from the request unless already supplied.
    pub(crate) fn bind_ctor_args(&mut self) -> Result<(), RemoteError> {
        if self.ctor_args.is_some() {
            return Ok(());
        }
        let args = match (&self.ctor, &self.request) {
            (Some(ctor), Some(request)) => bind_args(ctor.accepts(), request)?,
            _ => Vec::new(),
        };
        self.ctor_args = Some(args);
        Ok(())
    }
}
