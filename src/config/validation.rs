//! Configuration validation.
//!
//! Semantic checks on top of serde's syntactic parsing. Returns every
//! violation found, not just the first, so an operator can fix a config
//! file in one pass.

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::ServerConfig;

/// A single semantic violation in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human-readable description of the violation.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("not a valid socket address: {:?}", config.listener.bind_address),
        });
    }

    match Url::parse(&config.executor.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError {
            field: "executor.base_url",
            message: format!("unsupported scheme {:?}, expected http or https", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field: "executor.base_url",
            message: format!("not a valid URL: {}", e),
        }),
    }

    if config.executor.connect_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "executor.connect_timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.queue.execution_timeout_secs == 0 {
        errors.push(ValidationError {
            field: "queue.execution_timeout_secs",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.rate_limit.enabled {
        if config.rate_limit.window_secs == 0 {
            errors.push(ValidationError {
                field: "rate_limit.window_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if config.rate_limit.max_requests == 0 {
            errors.push(ValidationError {
                field: "rate_limit.max_requests",
                message: "must be greater than zero".to_string(),
            });
        }
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError {
            field: "limits.max_body_size",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError {
            field: "observability.metrics_address",
            message: format!(
                "not a valid socket address: {:?}",
                config.observability.metrics_address
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
