//! Reconciler configuration.

use serde::{Deserialize, Serialize};

use crate::error::SmfError;

/// Default name of the SMF configuration tool.
pub const DEFAULT_SVCCFG: &str = "svccfg";

/// Options controlling how properties are reconciled.
///
/// ```
/// use smf_property::ReconcilerConfig;
///
/// let config = ReconcilerConfig::from_json(serde_json::json!({"dry_run": true})).unwrap();
/// assert_eq!(config.svccfg, "svccfg");
/// assert!(config.dry_run);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcilerConfig {
    /// Path or name of the `svccfg` binary.
    pub svccfg: String,
    /// Report what would change without running `setprop`.
    pub dry_run: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            svccfg: DEFAULT_SVCCFG.to_string(),
            dry_run: false,
        }
    }
}

impl ReconcilerConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different `svccfg` binary.
    pub fn with_svccfg(mut self, svccfg: impl Into<String>) -> Self {
        self.svccfg = svccfg.into();
        self
    }

    /// Enable or disable dry-run mode.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Parse a configuration document. Missing keys take their defaults;
    /// `null` means all defaults.
    pub fn from_json(config: serde_json::Value) -> Result<Self, SmfError> {
        if config.is_null() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_value(config)?;
        if config.svccfg.is_empty() {
            return Err(SmfError::Validation("svccfg must not be empty".to_string()));
        }
        Ok(config)
    }
}
