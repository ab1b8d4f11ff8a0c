//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route Compilation (at startup):
//!     SharedClass / SharedMethod metadata
//!     → derive.rs (default routes, declared overrides)
//!     → normalize.rs (dash-case literal segments)
//!     → compose.rs (constructor prefix × method route)
//!     → rank.rs (specificity order)
//!     → table.rs (class muxes mounted on the root mux)
//!
//! Incoming Request (verb, path)
//!     → mux.rs (first matching registration)
//!     → pattern.rs (segment matching, params)
//!     → Return: Endpoint or NoMatch
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same registry always yields the same table
//! - First match wins (ordered by rank)

pub mod compose;
pub mod derive;
pub mod mux;
pub mod normalize;
pub mod pattern;
pub mod rank;
pub mod table;

pub use compose::{class_routes, join_paths, method_routes, prototype_routes};
pub use derive::{derive_routes, RouteSource, SHARED_CTOR_PATH};
pub use mux::{Match, Mux};
pub use normalize::normalize_path;
pub use pattern::{PathParams, PathPattern};
pub use rank::{compare_routes, rank_by, rank_routes};
pub use table::{BuildError, Endpoint, EndpointKind, RouteInfo, RouteTable};
