//! Roll a service back to its previous task-definition revision

use serde::Serialize;
use tracing::info;

use crate::aws::client::{Lookup, ResourceClient};
use crate::aws::ecs;
use crate::deploy::names::{self, Environment};
use crate::errors::DeployError;

/// Outcome of a successful rollback
#[derive(Debug, Clone, Serialize)]
pub struct RollbackSummary {
    pub cluster: String,
    pub service: String,
    pub task_definition: String,
}

/// Compute the previous revision of `{family}:{revision}` (also
/// accepts the full ARN form). Returns `None` at revision 1 or below,
/// or when the trailing segment is not a revision number.
pub fn previous_revision(task_definition: &str) -> Option<String> {
    let (family, revision) = task_definition.rsplit_once(':')?;
    let revision: u32 = revision.parse().ok()?;
    if revision <= 1 {
        return None;
    }
    Some(format!("{}:{}", family, revision - 1))
}

/// Point the environment's service back at the revision preceding the
/// one it currently runs. Refuses to proceed below revision 1 and
/// leaves the service untouched in that case.
pub async fn rollback(
    client: &dyn ResourceClient,
    environment: Environment,
) -> Result<RollbackSummary, DeployError> {
    let cluster = names::cluster_name(environment);
    let service = names::service_name(environment);

    let current = match ecs::describe_service(client, &cluster, &service).await? {
        Lookup::Found(info) => info.task_definition,
        Lookup::NotFound => {
            return Err(DeployError::RollbackNotPossible(format!(
                "service {} not found in cluster {}",
                service, cluster
            )))
        }
    };

    let previous = previous_revision(&current).ok_or_else(|| {
        DeployError::RollbackNotPossible(format!("no revision before {}", current))
    })?;

    ecs::update_service(
        client,
        &cluster,
        &service,
        &previous,
        &ecs::ServiceUpdate::default(),
    )
    .await?;

    info!(
        service = %service,
        from = %current,
        to = %previous,
        "Rolled back service to previous task definition"
    );

    Ok(RollbackSummary {
        cluster,
        service,
        task_definition: previous,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previous_revision() {
        assert_eq!(
            previous_revision("midserver-prod-task:3").as_deref(),
            Some("midserver-prod-task:2")
        );
    }

    #[test]
    fn test_previous_revision_on_arn() {
        assert_eq!(
            previous_revision("arn:aws:ecs:us-east-1:123456789012:task-definition/midserver-dev-task:2")
                .as_deref(),
            Some("arn:aws:ecs:us-east-1:123456789012:task-definition/midserver-dev-task:1")
        );
    }

    #[test]
    fn test_previous_revision_refuses_first_revision() {
        assert_eq!(previous_revision("midserver-dev-task:1"), None);
    }

    #[test]
    fn test_previous_revision_rejects_non_numeric() {
        assert_eq!(previous_revision("midserver-dev-task"), None);
        assert_eq!(previous_revision("midserver-dev-task:latest"), None);
    }
}
