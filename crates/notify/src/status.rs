//! Build outcomes and their attachment colors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Outcome of a CI build, as reported in a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStatus {
    /// Build was queued or started
    Started,
    /// Build succeeded
    Success,
    /// Build succeeded after previous failures
    BackToNormal,
    /// Build finished with test failures
    Unstable,
    /// Build failed
    Failure,
    /// Build was cancelled
    Aborted,
    /// Build was skipped
    NotBuilt,
}

impl BuildStatus {
    /// Mattermost attachment color for this outcome.
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Success | Self::BackToNormal => "good",
            Self::Failure => "danger",
            Self::Started | Self::Unstable | Self::Aborted | Self::NotBuilt => "warning",
        }
    }

    /// Get display name for this outcome.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "Started",
            Self::Success => "Success",
            Self::BackToNormal => "Back to normal",
            Self::Unstable => "Unstable",
            Self::Failure => "Failure",
            Self::Aborted => "Aborted",
            Self::NotBuilt => "Not built",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildStatus {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "started" | "start" => Ok(Self::Started),
            "success" => Ok(Self::Success),
            "back-to-normal" | "fixed" => Ok(Self::BackToNormal),
            "unstable" => Ok(Self::Unstable),
            "failure" | "failed" => Ok(Self::Failure),
            "aborted" => Ok(Self::Aborted),
            "not-built" => Ok(Self::NotBuilt),
            _ => Err(ConfigError::Invalid {
                name: "build status",
                value: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_colors() {
        assert_eq!(BuildStatus::Success.color(), "good");
        assert_eq!(BuildStatus::BackToNormal.color(), "good");
        assert_eq!(BuildStatus::Failure.color(), "danger");
        assert_eq!(BuildStatus::Unstable.color(), "warning");
        assert_eq!(BuildStatus::Started.color(), "warning");
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("FAILURE".parse::<BuildStatus>().unwrap(), BuildStatus::Failure);
        assert_eq!(
            "back_to_normal".parse::<BuildStatus>().unwrap(),
            BuildStatus::BackToNormal
        );
        assert_eq!("not-built".parse::<BuildStatus>().unwrap(), BuildStatus::NotBuilt);
        assert!("exploded".parse::<BuildStatus>().is_err());
    }

    #[test]
    fn test_status_serde_names() {
        assert_eq!(
            serde_json::to_string(&BuildStatus::BackToNormal).unwrap(),
            "\"back-to-normal\""
        );
    }
}
