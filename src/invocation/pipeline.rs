//! The invocation state machine.
//!
//! # State Machine
//! ```text
//! CREATED → CTOR_RESOLVING → HOOK_BEFORE → INVOKING → HOOK_AFTER → DONE
//!                 │               │            │           │       │
//!                 └───────────────┴────────────┴───────────┴───────┴──→ ERROR
//! ```
//!
//! Finalization runs in DONE; a finalization failure moves DONE → ERROR.
//!
//! # Design Decisions
//! - A constructor failure is held as a [`CtorOutcome`] and consumed once,
//!   after the before-hooks ran. An authorization hook that rejects the call
//!   therefore wins over "instance not found", and the constructor error
//!   travels with it as `deferred`.
//! - HTTP arguments are bound before the before-hooks so hooks can inspect
//!   them. A binding failure is surfaced on entering INVOKING.
//! - The invoker is the only seam between local dispatch and the remote
//!   client; the hook sequence is identical for both.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RemoteError;
use crate::invocation::context::{InvocationContext, PipelineState};
use crate::registry::{Hook, RemoteObjects, Results};

/// Result of the constructor stage.
#[derive(Debug)]
pub enum CtorOutcome {
    /// Static method, or the invoker leaves instance resolution to the far
    /// side.
    NotRequired,
    Resolved,
    Failed(RemoteError),
}

/// How a pipeline resolves instances, calls the method and produces output.
#[async_trait]
pub trait Invoker: Send + Sync {
    type Output: Send;

    /// Produce the instance for a prototype method. `None` when the invoker
    /// does not resolve instances itself.
    async fn resolve_instance(&self, ctx: &InvocationContext)
        -> Option<Result<Value, RemoteError>>;

    async fn invoke(&self, ctx: &InvocationContext) -> Result<Results, RemoteError>;

    /// Turn the finished context into the invoker's output.
    fn finalize(&self, ctx: &mut InvocationContext) -> Result<Self::Output, RemoteError>;
}

/// Drive `ctx` through every stage.
pub async fn run_pipeline<I>(
    objects: &RemoteObjects,
    invoker: &I,
    ctx: &mut InvocationContext,
) -> Result<I::Output, RemoteError>
where
    I: Invoker + ?Sized,
{
    let name = ctx.method().full_name();

    ctx.set_state(PipelineState::CtorResolving);
    let ctor = resolve_ctor(invoker, ctx).await;

    ctx.set_state(PipelineState::HookBefore);
    let binding = ctx.bind_args();
    let mut before = objects.before_hooks(&name);
    if let Some(hook) = ctx.method().before_hook() {
        before.push(hook.clone());
    }
    if let Err(err) = run_hooks(&before, ctx).await {
        let deferred = match ctor {
            CtorOutcome::Failed(ctor_err) => {
                tracing::warn!(
                    method = %name,
                    error = %ctor_err,
                    "Constructor error deferred behind before-hook failure"
                );
                Some(ctor_err)
            }
            _ => None,
        };
        return Err(fail(ctx, err.with_deferred(deferred)));
    }
    if let CtorOutcome::Failed(err) = ctor {
        return Err(fail(ctx, err));
    }

    ctx.set_state(PipelineState::Invoking);
    if let Err(err) = binding {
        return Err(fail(ctx, err));
    }
    match invoker.invoke(ctx).await {
        Ok(result) => ctx.set_result(result),
        Err(err) => return Err(fail(ctx, err)),
    }

    ctx.set_state(PipelineState::HookAfter);
    let mut after: Vec<_> = ctx.method().after_hook().cloned().into_iter().collect();
    after.extend(objects.after_hooks(&name));
    if let Err(err) = run_hooks(&after, ctx).await {
        return Err(fail(ctx, err));
    }

    ctx.set_state(PipelineState::Done);
    invoker.finalize(ctx).map_err(|err| fail(ctx, err))
}

async fn resolve_ctor<I>(invoker: &I, ctx: &mut InvocationContext) -> CtorOutcome
where
    I: Invoker + ?Sized,
{
    if ctx.method().is_static() {
        return CtorOutcome::NotRequired;
    }
    if let Err(err) = ctx.bind_ctor_args() {
        return CtorOutcome::Failed(err);
    }
    match invoker.resolve_instance(ctx).await {
        None => CtorOutcome::NotRequired,
        Some(Ok(instance)) => {
            ctx.set_instance(instance);
            CtorOutcome::Resolved
        }
        Some(Err(err)) => CtorOutcome::Failed(err),
    }
}

async fn run_hooks(
    hooks: &[std::sync::Arc<dyn Hook>],
    ctx: &mut InvocationContext,
) -> Result<(), RemoteError> {
    for hook in hooks {
        hook.run(ctx).await?;
    }
    Ok(())
}

fn fail(ctx: &mut InvocationContext, err: RemoteError) -> RemoteError {
    tracing::warn!(
        method = %ctx.method().full_name(),
        stage = %ctx.state(),
        status = err.status_code,
        error = %err,
        "Invocation failed"
    );
    ctx.set_state(PipelineState::Error);
    err
}
