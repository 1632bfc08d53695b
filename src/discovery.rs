use anyhow::Result;

use crate::logging::Logger;
use crate::registry::RegistryApi;

/// Repository names that start with `prefix`, in the order the registry
/// returned them. The match is exact and case-sensitive; `github/` and
/// `Github/` select different repositories.
pub async fn discover_repositories(
    registry: &dyn RegistryApi,
    prefix: &str,
    logger: &Logger,
) -> Result<Vec<String>> {
    let repositories: Vec<String> = registry
        .list_repositories()
        .await?
        .into_iter()
        .filter(|name| name.starts_with(prefix))
        .collect();

    logger.info(format!(
        "Discovered {} repositories with prefix '{}'",
        repositories.len(),
        prefix
    ));
    logger.debug(format!("Repositories: {:?}", repositories));

    Ok(repositories)
}
