//! Deployment configuration and simulated deployment

pub mod document;

pub use document::generate_deployment_document;

use crate::error::{Error, Result};
use crate::wizard::ConfigRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployResult {
    pub success: bool,
    pub deployment_id: Uuid,
    pub deployed_at: DateTime<Utc>,
}

/// Simulated deployment target. Nothing leaves the process.
#[derive(Debug, Clone)]
pub struct Deployer {
    test_delay: Duration,
    deploy_delay: Duration,
}

impl Deployer {
    pub fn new(test_delay: Duration, deploy_delay: Duration) -> Self {
        Self {
            test_delay,
            deploy_delay,
        }
    }

    /// Verify a deployment document
    pub async fn test_deployment(&self, document: &str) -> Result<()> {
        if document.trim().is_empty() {
            return Err(Error::field(
                "deploymentDocument",
                "Deployment document has not been generated",
            ));
        }
        sleep(self.test_delay).await;
        info!(bytes = document.len(), "Deployment document verified");
        Ok(())
    }

    /// Deploy the configuration described by `record`
    pub async fn deploy(&self, record: &ConfigRecord) -> Result<DeployResult> {
        if record
            .deployment_document
            .as_deref()
            .map_or(true, |doc| doc.trim().is_empty())
        {
            return Err(Error::field(
                "deploymentDocument",
                "Deployment document has not been generated",
            ));
        }

        sleep(self.deploy_delay).await;
        let result = DeployResult {
            success: true,
            deployment_id: Uuid::new_v4(),
            deployed_at: Utc::now(),
        };
        info!(
            deployment_id = %result.deployment_id,
            route = %record.formatted_route(),
            "API transformation deployed"
        );
        Ok(result)
    }
}
