use crate::docker::ContainerCli;
use crate::logging::Logger;
use crate::models::{RefreshOutcome, RegistryHost, RunTotals};
use crate::ranking;
use crate::registry::RegistryApi;

/// Runs the pull, delete, push cycle for one tag at a time. Failures stop
/// the cycle for that tag but never abort the run; the outcome records how
/// far the cycle got. There is no retry and no rollback, so a delete whose
/// push then fails leaves the tag absent from the registry.
pub struct TagRefresher<'a> {
    pub registry: &'a dyn RegistryApi,
    pub docker: &'a dyn ContainerCli,
    pub host: &'a RegistryHost,
    pub logger: &'a Logger,
    pub dry_run: bool,
}

impl TagRefresher<'_> {
    pub async fn refresh(&self, repo: &str, tag: &str) -> RefreshOutcome {
        let image_ref = self.host.image_ref(repo, tag);

        if self.dry_run {
            self.logger
                .info(format!("[DRY-RUN] Would process: {}", image_ref));
            return RefreshOutcome::DryRun;
        }

        self.logger.info(format!("Pulling image: {}", image_ref));
        if let Err(e) = self.docker.pull(&image_ref).await {
            self.logger
                .error(format!("Failed to pull {}: {:#}", image_ref, e));
            return RefreshOutcome::PullFailed;
        }
        self.logger.info(format!("Pulled image: {}", image_ref));

        self.logger
            .info(format!("Deleting image tag from ECR: {}", image_ref));
        if let Err(e) = self.registry.delete_tag(repo, tag).await {
            self.logger
                .error(format!("Failed to delete {} in ECR: {:#}", image_ref, e));
            return RefreshOutcome::DeleteFailed;
        }
        self.logger
            .info(format!("Deleted image tag in ECR: {}", image_ref));

        self.logger
            .info(format!("Pushing image back to ECR: {}", image_ref));
        if let Err(e) = self.docker.push(&image_ref).await {
            self.logger
                .error(format!("Failed to push {}: {:#}", image_ref, e));
            return RefreshOutcome::PushFailed;
        }
        self.logger.info(format!("Pushed image back: {}", image_ref));

        RefreshOutcome::Completed
    }

    /// Walk every repository, refresh its most recent tags, and tally the
    /// results. Repositories with no recent tags are noted and skipped
    /// without counting toward the totals.
    pub async fn refresh_repositories(&self, repos: &[String]) -> RunTotals {
        let mut totals = RunTotals::default();

        for repo in repos {
            let tags = ranking::rank_tags(self.registry, repo, self.logger).await;
            if tags.is_empty() {
                self.logger
                    .info(format!("No recent tags found for repo: {}", repo));
                continue;
            }

            totals.repositories += 1;
            self.logger
                .info(format!("Processing repo: {} | Tags: {:?}", repo, tags));

            for tag in &tags {
                let outcome = self.refresh(repo, tag).await;
                totals.record(outcome);
                if !outcome.is_success() {
                    self.logger
                        .warn(format!("Action failed for {}:{} ({})", repo, tag, outcome));
                }
            }
        }

        totals
    }
}
