//! Logging setup for Tessera processes.
//!
//! All crates in the workspace log through `tracing`. This module installs a
//! subscriber when the process asks for one.
//!
//! # Environment Variables
//!
//! - `TESSERA_DEBUG=true` - Enable debug logging
//! - `TESSERA_LOG_LEVEL=debug|info|warn|error|trace` - Set specific log level
//! - `TESSERA_LOG_FORMAT=json|pretty|compact` - Set output format (default: json)
//!
//! Security events (`SecurityViolation`) are logged on the `tessera::security`
//! target at `error` level and stay enabled whatever the level.
//!
//! # Usage
//!
//! ```rust,no_run
//! use tessera_core::logging;
//!
//! // Initialize logging (call once at startup)
//! logging::init();
//! ```

use std::sync::Once;

use crate::config::{EnvSource, StdEnvSource};
use crate::tenant::SECURITY_TARGET;

static INIT: Once = Once::new();

const CRATES: [&str; 4] = ["tessera", "tessera_core", "tessera_postgres", "tessera_axum"];

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

/// Level and format read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// Level applied to the workspace crates.
    pub level: &'static str,
    /// Output format.
    pub format: LogFormat,
}

impl LogSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_source(&StdEnvSource)
    }

    /// Read settings from an environment source.
    ///
    /// The level defaults to `debug` when `TESSERA_DEBUG` is set and `info`
    /// otherwise; unknown values fall back to the default.
    pub fn from_source(env: &impl EnvSource) -> Self {
        let debug = env
            .get("TESSERA_DEBUG")
            .is_some_and(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"));
        let fallback = if debug { "debug" } else { "info" };

        let level = match env.get("TESSERA_LOG_LEVEL").map(|v| v.to_lowercase()) {
            Some(v) if v == "trace" => "trace",
            Some(v) if v == "debug" => "debug",
            Some(v) if v == "info" => "info",
            Some(v) if v == "warn" => "warn",
            Some(v) if v == "error" => "error",
            _ => fallback,
        };

        let format = match env.get("TESSERA_LOG_FORMAT").map(|v| v.to_lowercase()) {
            Some(v) if v == "pretty" => LogFormat::Pretty,
            Some(v) if v == "compact" => LogFormat::Compact,
            _ => LogFormat::Json,
        };

        Self { level, format }
    }

    /// The `EnvFilter` directive for these settings.
    pub fn filter_directive(&self) -> String {
        let mut directives: Vec<String> = CRATES
            .iter()
            .map(|krate| format!("{}={}", krate, self.level))
            .collect();
        directives.push(format!("{}=error", SECURITY_TARGET));
        directives.join(",")
    }
}

/// Initialize logging from the process environment.
///
/// Subsequent calls are no-ops. Without the `tracing-subscriber` feature this
/// does nothing and the host application installs its own subscriber.
pub fn init() {
    init_with(LogSettings::from_env());
}

/// Initialize logging with explicit settings.
pub fn init_with(settings: LogSettings) {
    INIT.call_once(|| {
        #[cfg(feature = "tracing-subscriber")]
        {
            use tracing_subscriber::{EnvFilter, fmt, prelude::*};

            let filter = EnvFilter::try_new(settings.filter_directive())
                .unwrap_or_else(|_| EnvFilter::new("info"));
            let registry = tracing_subscriber::registry().with(filter);

            let installed = match settings.format {
                LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
                LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
                LogFormat::Pretty => registry.with(fmt::layer().pretty()).try_init(),
            };

            // another subscriber was installed first
            if installed.is_ok() {
                tracing::info!(
                    level = settings.level,
                    format = ?settings.format,
                    "Tessera logging initialized"
                );
            }
        }
        #[cfg(not(feature = "tracing-subscriber"))]
        let _ = settings;
    });
}
