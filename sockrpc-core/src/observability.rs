//! Logging initialization
//!
//! sockrpc emits structured `tracing` events and spans (connect, call, send,
//! receive, boundary failures). Libraries never install a subscriber on their
//! own; an embedding application, or a foreign host loading the adapter
//! library, calls [`init_observability`] once at startup to get output.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: filter directives (e.g. `"sockrpc_client=debug"`); takes
//!   precedence over the configured level
//!
//! # Examples
//!
//! ```rust,no_run
//! use sockrpc_core::ObservabilityConfig;
//!
//! let config = ObservabilityConfig::new("bdev-tool")
//!     .with_log_level("debug")
//!     .with_json(true);
//!
//! sockrpc_core::init_observability(config).expect("logging already initialized");
//! tracing::info!("ready");
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Name attached to the startup event
    pub service_name: String,

    /// Filter used when `RUST_LOG` is not set
    ///
    /// Any `EnvFilter` directive works: "info", "warn",
    /// "sockrpc_client=trace,info", ...
    pub log_level: String,

    /// Emit one JSON object per event instead of human-readable lines
    pub json: bool,
}

impl Default for ObservabilityConfig {
    /// Service "sockrpc", level "info", plain text output
    fn default() -> Self {
        Self {
            service_name: "sockrpc".to_string(),
            log_level: "info".to_string(),
            json: false,
        }
    }
}

impl ObservabilityConfig {
    /// Create a configuration with a custom service name
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }

    /// Set the fallback filter directive
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Toggle JSON output
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Build the filter: `RUST_LOG` if set and valid, otherwise `log_level`
    pub fn env_filter(&self) -> Result<EnvFilter, Box<dyn std::error::Error + Send + Sync>> {
        let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&self.log_level))?;
        Ok(filter)
    }
}

/// Install the global `tracing` subscriber
///
/// # Errors
///
/// - the configured level is not a valid filter directive
/// - a global subscriber is already installed (calling twice is an error,
///   not a panic)
pub fn init_observability(
    config: ObservabilityConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let env_filter = config.env_filter()?;

    if config.json {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_line_number(true)
            .json();

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    tracing::info!(
        service_name = %config.service_name,
        json = config.json,
        "Logging initialized"
    );

    Ok(())
}
