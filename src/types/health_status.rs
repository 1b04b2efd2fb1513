use serde::{Deserialize, Serialize};

/// The body of a `GET /health` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// Either `healthy` or `degraded`.
    pub status: String,

    /// Service name.
    #[serde(default)]
    pub service: String,

    /// Service version.
    #[serde(default)]
    pub version: String,

    /// Either `configured` or `not_configured`.
    #[serde(default)]
    pub authentication: String,

    /// Names of the specialist agents the backend has loaded.
    #[serde(default)]
    pub agents: Vec<String>,
}

impl HealthStatus {
    /// Returns true when the backend reports itself healthy.
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degraded_backend() {
        let json = serde_json::json!({
            "status": "degraded",
            "service": "AI Tutor",
            "version": "1.0.0",
            "authentication": "not_configured",
            "agents": []
        });
        let health: HealthStatus = serde_json::from_value(json).unwrap();
        assert!(!health.is_healthy());
        assert!(health.agents.is_empty());
    }

    #[test]
    fn minimal_health_body() {
        let health: HealthStatus =
            serde_json::from_value(serde_json::json!({"status": "healthy"})).unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.service, "");
    }
}
