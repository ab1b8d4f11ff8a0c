//! In-process invoker used by HTTP dispatch.

use async_trait::async_trait;
use axum::response::Response;
use serde_json::Value;

use crate::error::RemoteError;
use crate::invocation::context::InvocationContext;
use crate::invocation::pipeline::Invoker;
use crate::invocation::response::render_result;
use crate::registry::{Invocation, Results};

/// Calls registered handlers directly and renders an axum [`Response`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalInvoker;

#[async_trait]
impl Invoker for LocalInvoker {
    type Output = Response;

    async fn resolve_instance(&self, ctx: &InvocationContext) -> Option<Result<Value, RemoteError>> {
        let method = ctx.method();
        let Some(ctor) = ctx.ctor() else {
            return Some(Err(RemoteError::internal(format!(
                "{} has no shared constructor",
                method.full_name()
            ))));
        };
        let Invocation::Static(handler) = ctor.invocation() else {
            return Some(Err(RemoteError::internal("shared constructor must be static")));
        };

        let resolved = handler.call(ctx.ctor_args().to_vec()).await.and_then(|results| {
            match results.into_iter().next() {
                Some(Value::Null) | None => Err(RemoteError::not_found(format!(
                    "Unknown \"{}\" instance",
                    method.class_name()
                ))
                .with_code("INSTANCE_NOT_FOUND")),
                Some(instance) => Ok(instance),
            }
        });
        Some(resolved)
    }

    async fn invoke(&self, ctx: &InvocationContext) -> Result<Results, RemoteError> {
        let args = ctx.args().to_vec();
        match ctx.method().invocation() {
            Invocation::Static(handler) => handler.call(args).await,
            Invocation::Prototype(handler) => {
                let instance = ctx
                    .instance()
                    .cloned()
                    .ok_or_else(|| RemoteError::internal("instance was not resolved"))?;
                handler.call(instance, args).await
            }
        }
    }

    fn finalize(&self, ctx: &mut InvocationContext) -> Result<Response, RemoteError> {
        render_result(ctx.method().returns(), ctx.result().unwrap_or_default())
    }
}
