//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → AdapterConfig (validated, immutable)
//!     → shared with the route table and the HTTP server
//!
//! Per decision point:
//!     resolve.rs picks the effective value across
//!     adapter → class → call layers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the route table is built from it once
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod resolve;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use resolve::{resolve, resolve_credential, RestFlag};
pub use schema::{
    AdapterConfig, AdminConfig, ListenerConfig, ObservabilityConfig, RestConfig, SecurityConfig,
    TimeoutConfig,
};
