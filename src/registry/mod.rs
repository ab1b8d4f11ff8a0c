//! Registry of remote classes and methods.
//!
//! # Data Flow
//! ```text
//! ClassBuilder / MethodBuilder (startup)
//!     → class.rs (validated SharedClass)
//!     → objects.rs (RemoteObjects: ordered classes + pattern hooks)
//!     → routing (route table, built once)
//!     → index.rs (MethodIndex for programmatic calls)
//! ```
//!
//! # Design Decisions
//! - Descriptors are immutable once built; the enabled flag is the only
//!   mutation and is read live
//! - Dispatch goes through a tagged `Invocation` (static | prototype)
//!   rather than lookup by name at call time
//! - Every registry mutation bumps a generation counter

pub mod args;
pub mod class;
pub mod descriptor;
pub mod hooks;
pub mod index;
pub mod method;
pub mod objects;

pub use args::get_arg_by_name;
pub use class::{ClassBuilder, ClassOptions, RegistryError, SharedClass};
pub use descriptor::{
    ArgDescriptor, ArgSource, ArgType, ReturnDescriptor, ReturnTarget, Route, RouteSpec, Verb,
};
pub use hooks::{HookPattern, HookSet};
pub use index::MethodIndex;
pub use method::{
    handler_fn, hook_fn, prototype_fn, Hook, Invocation, MethodBuilder, PrototypeHandler,
    Results, SharedMethod, StaticHandler,
};
pub use objects::RemoteObjects;
