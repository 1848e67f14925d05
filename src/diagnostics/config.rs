//! Mass-balance configuration.
//!
//! # Example
//!
//! ```
//! use massbal::diagnostics::{MassBalanceConfig, MissingPatchPolicy};
//!
//! let config = MassBalanceConfig::new("outlet").with_missing_patch(MissingPatchPolicy::Warn);
//! assert_eq!(config.patch_name, "outlet");
//! ```

use serde::{Deserialize, Serialize};

use super::error::MassBalanceError;

/// Patch checked when no name is configured.
pub const DEFAULT_PATCH_NAME: &str = "atmosphere";

/// What to do when the configured patch exists on no partition at all.
///
/// A patch missing on *some* partitions is normal after decomposition and is
/// never reported. Missing everywhere usually means a typo in the patch name,
/// and the residual then measures a closed domain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPatchPolicy {
    /// Return [`MassBalanceError::PatchNotFoundAnywhere`].
    #[default]
    Error,
    /// Log a warning and return the report with zero outflux.
    Warn,
}

/// Configuration for [`MassBalanceChecker`](super::MassBalanceChecker).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassBalanceConfig {
    /// Name of the boundary patch mass leaves through.
    pub patch_name: String,
    /// Handling of a patch that no partition owns.
    pub missing_patch: MissingPatchPolicy,
}

impl Default for MassBalanceConfig {
    fn default() -> Self {
        Self {
            patch_name: DEFAULT_PATCH_NAME.to_string(),
            missing_patch: MissingPatchPolicy::default(),
        }
    }
}

impl MassBalanceConfig {
    /// Check the outflux through `patch_name`.
    pub fn new(patch_name: impl Into<String>) -> Self {
        Self {
            patch_name: patch_name.into(),
            ..Default::default()
        }
    }

    /// Set the missing-patch policy.
    pub fn with_missing_patch(mut self, policy: MissingPatchPolicy) -> Self {
        self.missing_patch = policy;
        self
    }

    /// Reject configurations that cannot name a patch.
    pub fn validate(&self) -> Result<(), MassBalanceError> {
        if self.patch_name.trim().is_empty() {
            return Err(MassBalanceError::EmptyPatchName);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MassBalanceConfig::default();
        assert_eq!(config.patch_name, "atmosphere");
        assert_eq!(config.missing_patch, MissingPatchPolicy::Error);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(
            MassBalanceConfig::new("  ").validate(),
            Err(MassBalanceError::EmptyPatchName)
        ));
    }

    #[test]
    fn test_from_json() {
        let config: MassBalanceConfig =
            serde_json::from_str(r#"{ "patch_name": "outlet", "missing_patch": "warn" }"#).unwrap();
        assert_eq!(
            config,
            MassBalanceConfig::new("outlet").with_missing_patch(MissingPatchPolicy::Warn)
        );

        let partial: MassBalanceConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(partial, MassBalanceConfig::default());
    }
}
