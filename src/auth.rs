use anyhow::{Context, Result};

use crate::docker::ContainerCli;
use crate::logging::Logger;
use crate::models::RegistryHost;
use crate::registry::RegistryApi;

/// ECR authorization tokens always carry this username.
pub const ECR_USERNAME: &str = "AWS";

/// Fetch a short-lived password from the registry and log the container
/// tool into the host. Skipped entirely on dry runs.
pub async fn login_to_registry(
    registry: &dyn RegistryApi,
    docker: &dyn ContainerCli,
    host: &RegistryHost,
    logger: &Logger,
) -> Result<()> {
    let password = registry
        .get_login_password()
        .await
        .context("could not obtain a registry login password")?;

    let hostname = host.hostname();
    logger.info(format!("Logging into Docker registry: {}", hostname));
    docker.login(&hostname, ECR_USERNAME, &password).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{test_logger, FakeDocker, FakeRegistry};

    #[tokio::test]
    async fn login_uses_the_registry_password() {
        let registry = FakeRegistry {
            password: "sesame".to_string(),
            ..FakeRegistry::default()
        };
        let docker = FakeDocker::default();
        let host = RegistryHost::new("123456789012", "eu-west-1");

        login_to_registry(&registry, &docker, &host, &test_logger())
            .await
            .unwrap();

        assert_eq!(
            docker.recorded_calls(),
            vec!["login 123456789012.dkr.ecr.eu-west-1.amazonaws.com AWS sesame"]
        );
    }

    #[tokio::test]
    async fn password_failure_means_no_login_attempt() {
        let registry = FakeRegistry {
            fail_password: true,
            ..FakeRegistry::default()
        };
        let docker = FakeDocker::default();
        let host = RegistryHost::new("123456789012", "eu-west-1");

        let result = login_to_registry(&registry, &docker, &host, &test_logger()).await;

        assert!(result.is_err());
        assert!(docker.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn login_failure_propagates() {
        let registry = FakeRegistry::default();
        let docker = FakeDocker {
            fail_login: true,
            ..FakeDocker::default()
        };
        let host = RegistryHost::new("123456789012", "eu-west-1");

        let result = login_to_registry(&registry, &docker, &host, &test_logger()).await;

        assert!(result.is_err());
    }
}
