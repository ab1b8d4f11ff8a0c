//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject removed options (built-in CORS)
//! - Validate value ranges (timeouts > 0, body limit > 0, bind address)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AdapterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::AdapterConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid listener bind address `{0}`")]
    BindAddress(String),

    #[error("invalid metrics address `{0}`")]
    MetricsAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("admin.api_key must be set when admin endpoints are enabled")]
    MissingAdminKey,

    #[error(
        "rest.cors is no longer supported; configure CORS with a dedicated middleware in front of the adapter"
    )]
    LegacyCors,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &AdapterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.admin.enabled && config.admin.api_key.trim().is_empty() {
        errors.push(ValidationError::MissingAdminKey);
    }
    if config.rest.has_legacy_cors() {
        errors.push(ValidationError::LegacyCors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
