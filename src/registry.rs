use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_ecr::primitives::DateTime as EcrDateTime;
use aws_sdk_ecr::types::{DescribeImagesFilter, ImageIdentifier, TagStatus};
use aws_sdk_ecr::Client;
use aws_types::region::Region;
use base64::{prelude::BASE64_STANDARD, Engine};
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::logging::Logger;
use crate::models::ImageRecord;

/// Narrow view of the registry control plane. Everything the run needs
/// from ECR goes through here, so tests can substitute a fake.
#[async_trait]
pub trait RegistryApi: Send + Sync {
    /// Every repository name in the registry, across all pages.
    async fn list_repositories(&self) -> Result<Vec<String>>;

    /// Every tagged image in the repository, across all pages. Untagged
    /// images are excluded by the server-side filter.
    async fn list_tagged_images(&self, repo: &str) -> Result<Vec<ImageRecord>>;

    /// Remove a single tag from the repository.
    async fn delete_tag(&self, repo: &str, tag: &str) -> Result<()>;

    /// Short-lived password for `docker login` against this registry.
    async fn get_login_password(&self) -> Result<String>;
}

pub struct EcrRegistry {
    client: Client,
    logger: Logger,
}

impl EcrRegistry {
    /// Build a client for the region, optionally through a named
    /// credential profile. Nothing is validated here; a bad region or
    /// profile surfaces when the first call is made.
    pub async fn connect(region: &str, profile: Option<&str>, logger: Logger) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        Self {
            client: Client::new(&config),
            logger,
        }
    }
}

#[async_trait]
impl RegistryApi for EcrRegistry {
    async fn list_repositories(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            self.logger.debug(format!(
                "DescribeRepositories (next_token: {:?})",
                next_token
            ));
            let mut request = self.client.describe_repositories();
            if let Some(token) = &next_token {
                request = request.next_token(token);
            }
            let response = request.send().await.context("DescribeRepositories failed")?;

            for repo in response.repositories() {
                if let Some(name) = repo.repository_name() {
                    names.push(name.to_string());
                }
            }

            next_token = response.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        Ok(names)
    }

    async fn list_tagged_images(&self, repo: &str) -> Result<Vec<ImageRecord>> {
        let mut images = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            self.logger.debug(format!(
                "DescribeImages for {} (next_token: {:?})",
                repo, next_token
            ));
            let filter = DescribeImagesFilter::builder()
                .tag_status(TagStatus::Tagged)
                .build();
            let mut request = self
                .client
                .describe_images()
                .repository_name(repo)
                .filter(filter);
            if let Some(token) = &next_token {
                request = request.next_token(token);
            }
            let response = request
                .send()
                .await
                .with_context(|| format!("DescribeImages failed for {repo}"))?;

            for detail in response.image_details() {
                images.push(ImageRecord {
                    tags: detail.image_tags().to_vec(),
                    pushed_at: detail.image_pushed_at().and_then(to_chrono),
                });
            }

            next_token = response.next_token().map(str::to_string);
            if next_token.is_none() {
                break;
            }
        }

        Ok(images)
    }

    async fn delete_tag(&self, repo: &str, tag: &str) -> Result<()> {
        self.logger
            .debug(format!("BatchDeleteImage for {}:{}", repo, tag));
        let image_id = ImageIdentifier::builder().image_tag(tag).build();
        let response = self
            .client
            .batch_delete_image()
            .repository_name(repo)
            .image_ids(image_id)
            .send()
            .await
            .with_context(|| format!("BatchDeleteImage failed for {repo}:{tag}"))?;

        // The call can return 200 while individual images fail to delete.
        let failures = response.failures();
        if !failures.is_empty() {
            let reasons = failures
                .iter()
                .map(|failure| {
                    format!(
                        "{}: {}",
                        failure
                            .failure_code()
                            .map(|code| code.as_str())
                            .unwrap_or("unknown"),
                        failure.failure_reason().unwrap_or("no reason given"),
                    )
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AppError::DeleteRejected(reasons).into());
        }

        Ok(())
    }

    async fn get_login_password(&self) -> Result<String> {
        self.logger.debug("GetAuthorizationToken");
        let response = self
            .client
            .get_authorization_token()
            .send()
            .await
            .context("GetAuthorizationToken failed")?;

        let token = response
            .authorization_data()
            .first()
            .and_then(|data| data.authorization_token())
            .ok_or(AppError::MissingAuthData)?;

        Ok(password_from_token(token)?)
    }
}

/// The authorization token decodes to `user:password`; only the password
/// half is fed to the container tool.
fn password_from_token(token: &str) -> Result<String, AppError> {
    let decoded = String::from_utf8(BASE64_STANDARD.decode(token)?)?;
    let (_, password) = decoded.split_once(':').ok_or(AppError::TokenFormat)?;
    Ok(password.to_string())
}

/// ECR reports push times as epoch seconds plus nanos; ranking works in
/// chrono. A timestamp chrono cannot represent becomes `None`.
fn to_chrono(pushed_at: &EcrDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(pushed_at.secs(), pushed_at.subsec_nanos())
}
