use crate::error::{DashError, DashResult};
use serde::Deserialize;
use std::path::Path;

/// The fields of a service-account key file the dashboard cares about.
/// The private key itself is never read into memory.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub client_email: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl ServiceAccountKey {
    pub fn load(path: &Path) -> DashResult<Self> {
        let invalid = |reason: String| DashError::InvalidCredentials {
            path: path.display().to_string(),
            reason,
        };
        let content = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let key: ServiceAccountKey =
            serde_json::from_str(&content).map_err(|e| invalid(e.to_string()))?;
        if key.key_type != "service_account" {
            return Err(invalid(format!(
                "expected a service_account key, found {:?}",
                key.key_type
            )));
        }
        Ok(key)
    }
}
