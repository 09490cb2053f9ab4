//! Error types for the MID server deployer

use thiserror::Error;

use crate::aws::client::ResourceKind;

/// Main error type for the deployer
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("AWS credentials expired: {0}")]
    ExpiredCredential(String),

    #[error("no VPC available in the target account and region")]
    NoNetworkFound,

    #[error("required runtime parameter missing: {0}")]
    MissingRuntimeParameter(String),

    #[error("{kind} {operation} failed: {message}")]
    ProviderCall {
        kind: ResourceKind,
        operation: String,
        code: Option<String>,
        message: String,
    },

    #[error("rollback not possible: {0}")]
    RollbackNotPossible(String),

    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl DeployError {
    /// Build a provider-call failure with the originating resource
    /// kind and operation attached.
    pub fn provider(
        kind: ResourceKind,
        operation: &str,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        DeployError::ProviderCall {
            kind,
            operation: operation.to_string(),
            code,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for DeployError {
    fn from(err: anyhow::Error) -> Self {
        DeployError::ConfigError(err.to_string())
    }
}
