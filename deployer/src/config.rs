//! Deployer settings resolved from the process environment

use std::env;

use crate::deploy::names::Environment;
use crate::errors::DeployError;

/// Deployer settings
#[derive(Debug, Clone)]
pub struct Settings {
    /// Target deployment environment
    pub environment: Environment,

    /// AWS region for all calls and the awslogs sink
    pub aws_region: String,

    /// AWS profile to authenticate with (shared config / SSO)
    pub aws_profile: Option<String>,

    /// ECR repository URL for the MID server image
    pub ecr_repo: String,

    /// Image tag to deploy
    pub image_tag: String,

    /// Desired number of running tasks
    pub desired_count: u32,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Settings {
    /// Resolve settings for an environment from process environment
    /// variables. `ECR_REPO` is required for deployment; everything
    /// else has a default.
    pub fn from_env(environment: Environment) -> Result<Self, DeployError> {
        let ecr_repo = env::var("ECR_REPO")
            .map_err(|_| DeployError::ConfigError("ECR_REPO is not set".to_string()))?;

        Ok(Self {
            environment,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| default_region()),
            aws_profile: env::var("AWS_PROFILE").ok(),
            ecr_repo,
            image_tag: "latest".to_string(),
            desired_count: 1,
        })
    }

    /// Full image reference for the task definition
    pub fn image(&self) -> String {
        format!("{}:{}", self.ecr_repo, self.image_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_reference() {
        let settings = Settings {
            environment: Environment::Dev,
            aws_region: default_region(),
            aws_profile: None,
            ecr_repo: "123456789012.dkr.ecr.us-east-1.amazonaws.com/midserver".to_string(),
            image_tag: "latest".to_string(),
            desired_count: 1,
        };
        assert_eq!(
            settings.image(),
            "123456789012.dkr.ecr.us-east-1.amazonaws.com/midserver:latest"
        );
    }
}
