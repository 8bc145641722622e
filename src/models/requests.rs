//! Request DTOs for the cache lab API
//!
//! Defines the structure of incoming HTTP request bodies. Enum-valued fields
//! arrive as strings and are parsed here so unknown names map to the
//! matching `LabError` instead of a generic body rejection.

use serde::Deserialize;

use crate::cache::PolicyKind;
use crate::error::Result;
use crate::traffic::{Distribution, RunConfig};

/// Request body for POST /cache/policy
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyRequest {
    /// Policy name: `lru`, `lfu` or `fifo`
    pub policy: String,
    /// Rebuild index scores under the new policy right away
    #[serde(default)]
    pub reindex: bool,
}

impl PolicyRequest {
    pub fn policy(&self) -> Result<PolicyKind> {
        self.policy.parse()
    }
}

/// Request body for POST /traffic/start
///
/// Missing fields fall back to a one-minute Poisson run at 1 req/s.
#[derive(Debug, Clone, Deserialize)]
pub struct StartRequest {
    #[serde(default = "default_distribution")]
    pub distribution: String,
    #[serde(default = "default_rate")]
    pub rate: f64,
    #[serde(default = "default_duration")]
    pub duration: f64,
}

fn default_distribution() -> String {
    Distribution::Poisson.as_str().to_string()
}

fn default_rate() -> f64 {
    1.0
}

fn default_duration() -> f64 {
    60.0
}

impl Default for StartRequest {
    fn default() -> Self {
        Self {
            distribution: default_distribution(),
            rate: default_rate(),
            duration: default_duration(),
        }
    }
}

impl StartRequest {
    /// Parses the distribution name into a run configuration.
    ///
    /// Rate and duration are checked when the schedule is generated.
    pub fn to_config(&self) -> Result<RunConfig> {
        Ok(RunConfig {
            distribution: self.distribution.parse()?,
            rate: self.rate,
            duration: self.duration,
        })
    }
}

/// Request body for POST /traffic/test-request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestRequest {
    /// Key to fetch; a random catalog key when absent
    #[serde(default)]
    pub key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LabError;

    #[test]
    fn test_policy_request_deserialize() {
        let req: PolicyRequest = serde_json::from_str(r#"{"policy": "LFU"}"#).unwrap();
        assert_eq!(req.policy().unwrap(), PolicyKind::Lfu);
        assert!(!req.reindex);

        let req: PolicyRequest =
            serde_json::from_str(r#"{"policy": "fifo", "reindex": true}"#).unwrap();
        assert!(req.reindex);
    }

    #[test]
    fn test_policy_request_unknown_policy() {
        let req: PolicyRequest = serde_json::from_str(r#"{"policy": "mru"}"#).unwrap();
        assert!(matches!(req.policy(), Err(LabError::InvalidPolicy(_))));
    }

    #[test]
    fn test_start_request_defaults() {
        let req: StartRequest = serde_json::from_str("{}").unwrap();
        let config = req.to_config().unwrap();

        assert_eq!(config.distribution, Distribution::Poisson);
        assert_eq!(config.rate, 1.0);
        assert_eq!(config.duration, 60.0);
    }

    #[test]
    fn test_start_request_partial() {
        let req: StartRequest =
            serde_json::from_str(r#"{"distribution": "normal", "rate": 4.5}"#).unwrap();
        let config = req.to_config().unwrap();

        assert_eq!(config.distribution, Distribution::Normal);
        assert_eq!(config.rate, 4.5);
        assert_eq!(config.duration, 60.0);
    }

    #[test]
    fn test_start_request_unknown_distribution() {
        let req = StartRequest {
            distribution: "gamma".to_string(),
            ..StartRequest::default()
        };
        assert!(matches!(
            req.to_config(),
            Err(LabError::InvalidDistribution(_))
        ));
    }

    #[test]
    fn test_test_request_optional_key() {
        let req: TestRequest = serde_json::from_str("{}").unwrap();
        assert!(req.key.is_none());

        let req: TestRequest = serde_json::from_str(r#"{"key": "17"}"#).unwrap();
        assert_eq!(req.key.as_deref(), Some("17"));
    }
}
