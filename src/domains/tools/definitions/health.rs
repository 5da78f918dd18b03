//! Health tool definition.

use std::time::Instant;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domains::tools::{ToolContext, ToolDefinition, ToolError, ToolParams};

/// The health tool takes no parameters. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct HealthParams {}

impl ToolParams for HealthParams {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HealthVersions {
    pub protocol: String,
    pub server: String,
}

/// Liveness report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HealthReport {
    pub name: String,
    pub status: String,
    /// Seconds since server start, millisecond precision.
    pub uptime_sec: f64,
    /// Upstream call timeout in seconds.
    pub http_timeout_sec: f64,
    pub versions: HealthVersions,
}

pub struct HealthTool {
    server_name: String,
    server_version: String,
    started: Instant,
    http_timeout_sec: f64,
}

impl HealthTool {
    pub fn new(
        server_name: impl Into<String>,
        server_version: impl Into<String>,
        started: Instant,
        http_timeout_sec: f64,
    ) -> Self {
        Self {
            server_name: server_name.into(),
            server_version: server_version.into(),
            started,
            http_timeout_sec,
        }
    }

    pub fn report(&self) -> HealthReport {
        let uptime = self.started.elapsed().as_secs_f64();
        HealthReport {
            name: self.server_name.clone(),
            status: "healthy".to_string(),
            uptime_sec: (uptime * 1000.0).round() / 1000.0,
            http_timeout_sec: self.http_timeout_sec,
            versions: HealthVersions {
                protocol: "MCP".to_string(),
                server: self.server_version.clone(),
            },
        }
    }
}

#[async_trait]
impl ToolDefinition for HealthTool {
    const NAME: &'static str = "health";

    const DESCRIPTION: &'static str = "Server liveness: name, status, uptime, upstream timeout and versions.";

    const HTTP_METHOD: &'static str = "GET";

    type Params = HealthParams;
    type Output = HealthReport;

    async fn run(&self, _params: HealthParams, _ctx: &ToolContext) -> Result<HealthReport, ToolError> {
        debug!("Health tool called");
        Ok(self.report())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::tools::ToolHandler;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn test_health_report() {
        let started = Instant::now() - Duration::from_millis(1500);
        let tool = HealthTool::new("mcp-demo", "0.1.0", started, 5.0);

        let value = tool.execute(json!(null), &ToolContext::default()).await.unwrap();
        let report: HealthReport = serde_json::from_value(value).unwrap();

        assert_eq!(report.name, "mcp-demo");
        assert_eq!(report.status, "healthy");
        assert_eq!(report.http_timeout_sec, 5.0);
        assert_eq!(report.versions.protocol, "MCP");
        assert_eq!(report.versions.server, "0.1.0");
        assert!(report.uptime_sec >= 1.5);
    }

    #[tokio::test]
    async fn test_health_ignores_arguments() {
        let tool = HealthTool::new("mcp-demo", "0.1.0", Instant::now(), 5.0);
        assert!(tool.execute(json!({"extra": 1}), &ToolContext::default()).await.is_ok());
    }

    #[test]
    fn test_health_is_get() {
        assert_eq!(HealthTool::HTTP_METHOD, "GET");
    }
}
