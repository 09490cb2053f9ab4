//! Deterministic resource naming
//!
//! Every environment-scoped resource is addressed as
//! `midserver-{environment}-{kind}` so repeated runs (and the rollback
//! flow) always land on the same resources.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Workload prefix shared by every resource name and parameter path
pub const WORKLOAD: &str = "midserver";

/// Principal allowed to assume the task and execution roles
pub const TASK_TRUST_SERVICE: &str = "ecs-tasks.amazonaws.com";

/// Managed policy attached to the task role
pub const TASK_ROLE_POLICY_ARN: &str = "arn:aws:iam::aws:policy/CloudWatchLogsFullAccess";

/// Managed policy attached to the execution role
pub const EXECUTION_ROLE_POLICY_ARN: &str =
    "arn:aws:iam::aws:policy/service-role/AmazonECSTaskExecutionRolePolicy";

/// Runtime parameters the MID server container requires. A miss on any
/// of these is fatal to the whole deployment.
pub const REQUIRED_PARAMETERS: [&str; 4] = [
    "MID_INSTANCE_URL",
    "MID_INSTANCE_USERNAME",
    "MID_INSTANCE_PASSWORD",
    "MID_SERVER_NAME",
];

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Dev => "dev",
            Environment::Staging => "staging",
            Environment::Prod => "prod",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "staging" => Ok(Environment::Staging),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!(
                "Invalid environment: {} (expected dev, staging or prod)",
                s
            )),
        }
    }
}

fn resource_name(environment: Environment, kind: &str) -> String {
    format!("{}-{}-{}", WORKLOAD, environment, kind)
}

pub fn cluster_name(environment: Environment) -> String {
    resource_name(environment, "cluster")
}

pub fn service_name(environment: Environment) -> String {
    resource_name(environment, "service")
}

pub fn task_family(environment: Environment) -> String {
    resource_name(environment, "task")
}

pub fn security_group_name(environment: Environment) -> String {
    resource_name(environment, "sg")
}

pub fn task_role_name(environment: Environment) -> String {
    resource_name(environment, "task-role")
}

pub fn execution_role_name(environment: Environment) -> String {
    resource_name(environment, "execution-role")
}

/// Name of the MID server container inside the task definition
pub fn container_name(environment: Environment) -> String {
    format!("{}-{}", WORKLOAD, environment)
}

/// CloudWatch log group the container logs to
pub fn log_group(environment: Environment) -> String {
    format!("/ecs/{}-{}", WORKLOAD, environment)
}

/// SSM path for a runtime parameter: `/{workload}/{environment}/{VAR}`
pub fn parameter_path(environment: Environment, var: &str) -> String {
    format!("/{}/{}/{}", WORKLOAD, environment, var)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!("PROD".parse::<Environment>().unwrap(), Environment::Prod);
        assert!("qa".parse::<Environment>().is_err());
    }

    #[test]
    fn test_deterministic_names() {
        let env = Environment::Staging;
        assert_eq!(cluster_name(env), "midserver-staging-cluster");
        assert_eq!(service_name(env), "midserver-staging-service");
        assert_eq!(task_family(env), "midserver-staging-task");
        assert_eq!(security_group_name(env), "midserver-staging-sg");
        assert_eq!(task_role_name(env), "midserver-staging-task-role");
        assert_eq!(
            execution_role_name(env),
            "midserver-staging-execution-role"
        );
        assert_eq!(log_group(env), "/ecs/midserver-staging");
    }

    #[test]
    fn test_parameter_path() {
        assert_eq!(
            parameter_path(Environment::Prod, "MID_INSTANCE_PASSWORD"),
            "/midserver/prod/MID_INSTANCE_PASSWORD"
        );
    }
}
