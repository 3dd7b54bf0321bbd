//! Instance mode and the system registry access gate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::error;

use crate::error::{TenantError, TenantResult};

/// Log target for security events.
pub const SECURITY_TARGET: &str = "tessera::security";

/// The role this process plays, fixed at start-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceMode {
    /// Owns the tenant registry and serves requests for any tenant.
    #[default]
    ControlPlane,
    /// Serves exactly one tenant and has no registry access.
    DataPlane,
}

impl InstanceMode {
    /// The configuration name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ControlPlane => "CONTROL_PLANE",
            Self::DataPlane => "DATA_PLANE",
        }
    }

    /// Whether this mode may open connections to the system registry.
    pub fn allows_system_access(&self) -> bool {
        match self {
            Self::ControlPlane => true,
            Self::DataPlane => false,
        }
    }
}

impl fmt::Display for InstanceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstanceMode {
    type Err = TenantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "CONTROL_PLANE" => Ok(Self::ControlPlane),
            "DATA_PLANE" => Ok(Self::DataPlane),
            other => Err(TenantError::config(format!(
                "invalid INSTANCE_MODE '{}': expected CONTROL_PLANE or DATA_PLANE",
                other
            ))),
        }
    }
}

/// Holds the process mode and guards every path to the system registry.
///
/// The gate is `Copy` and immutable; it is built once from configuration and
/// handed to the pool cache, which consults it before creating or returning
/// the `"system"` pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeGate {
    mode: InstanceMode,
}

impl ModeGate {
    /// Create a gate for the given mode.
    pub const fn new(mode: InstanceMode) -> Self {
        Self { mode }
    }

    /// The process mode.
    pub fn mode(&self) -> InstanceMode {
        self.mode
    }

    /// Fail with [`TenantError::SecurityViolation`] unless the process may reach the registry.
    pub fn assert_system_access_allowed(&self) -> TenantResult<()> {
        match self.mode {
            InstanceMode::ControlPlane => Ok(()),
            InstanceMode::DataPlane => {
                error!(
                    target: SECURITY_TARGET,
                    mode = %self.mode,
                    "Blocked system registry access from a data-plane instance"
                );
                Err(TenantError::security_violation(
                    "system registry access is not allowed in DATA_PLANE mode",
                ))
            }
        }
    }
}

impl From<InstanceMode> for ModeGate {
    fn from(mode: InstanceMode) -> Self {
        Self::new(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!(
            "CONTROL_PLANE".parse::<InstanceMode>().unwrap(),
            InstanceMode::ControlPlane
        );
        assert_eq!(
            " DATA_PLANE ".parse::<InstanceMode>().unwrap(),
            InstanceMode::DataPlane
        );

        let err = "data_plane".parse::<InstanceMode>().unwrap_err();
        assert_eq!(err.code(), crate::ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_gate_allows_control_plane() {
        let gate = ModeGate::new(InstanceMode::ControlPlane);
        assert!(gate.assert_system_access_allowed().is_ok());
    }

    #[test]
    fn test_gate_blocks_data_plane() {
        let gate = ModeGate::new(InstanceMode::DataPlane);
        let err = gate.assert_system_access_allowed().unwrap_err();
        assert!(err.is_security_violation());
    }

    #[test]
    fn test_mode_serde_names() {
        assert_eq!(InstanceMode::DataPlane.to_string(), "DATA_PLANE");
        assert!(!InstanceMode::DataPlane.allows_system_access());
        assert!(InstanceMode::ControlPlane.allows_system_access());
    }
}
