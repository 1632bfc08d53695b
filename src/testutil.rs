use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::DateTime;

use crate::docker::ContainerCli;
use crate::logging::Logger;
use crate::models::ImageRecord;
use crate::registry::RegistryApi;

pub fn test_logger() -> Logger {
    Logger::new(false, None).expect("logger without a file sink cannot fail")
}

pub fn image(tags: &[&str], pushed_secs: Option<i64>) -> ImageRecord {
    ImageRecord {
        tags: tags.iter().map(|t| t.to_string()).collect(),
        pushed_at: pushed_secs.map(|secs| DateTime::from_timestamp(secs, 0).unwrap()),
    }
}

/// In-memory registry double. Failure flags make individual operations
/// return errors; listing calls and completed deletions are recorded for
/// assertions.
#[derive(Default)]
pub struct FakeRegistry {
    pub repositories: Vec<String>,
    pub images: HashMap<String, Vec<ImageRecord>>,
    pub password: String,
    pub fail_listing: bool,
    pub fail_images_for: HashSet<String>,
    pub fail_delete: bool,
    pub fail_password: bool,
    pub deleted: Mutex<Vec<(String, String)>>,
    pub listings: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub fn with_repositories(names: &[&str]) -> Self {
        Self {
            repositories: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn add_images(mut self, repo: &str, images: Vec<ImageRecord>) -> Self {
        self.images.insert(repo.to_string(), images);
        self
    }

    pub fn deleted_tags(&self) -> Vec<(String, String)> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn recorded_listings(&self) -> Vec<String> {
        self.listings.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryApi for FakeRegistry {
    async fn list_repositories(&self) -> Result<Vec<String>> {
        self.listings.lock().unwrap().push("repositories".to_string());
        if self.fail_listing {
            bail!("repository listing unavailable");
        }
        Ok(self.repositories.clone())
    }

    async fn list_tagged_images(&self, repo: &str) -> Result<Vec<ImageRecord>> {
        self.listings.lock().unwrap().push(format!("images {repo}"));
        if self.fail_images_for.contains(repo) {
            bail!("cannot list images for {repo}");
        }
        Ok(self.images.get(repo).cloned().unwrap_or_default())
    }

    async fn delete_tag(&self, repo: &str, tag: &str) -> Result<()> {
        if self.fail_delete {
            bail!("delete rejected for {repo}:{tag}");
        }
        self.deleted
            .lock()
            .unwrap()
            .push((repo.to_string(), tag.to_string()));
        Ok(())
    }

    async fn get_login_password(&self) -> Result<String> {
        if self.fail_password {
            bail!("no authorization token available");
        }
        Ok(self.password.clone())
    }
}

/// Container tool double. Every call is recorded before the failure
/// flags are consulted, so tests can assert how far a cycle got.
#[derive(Default)]
pub struct FakeDocker {
    pub fail_pull: HashSet<String>,
    pub fail_push: HashSet<String>,
    pub fail_login: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeDocker {
    pub fn failing_pull(image_refs: &[String]) -> Self {
        Self {
            fail_pull: image_refs.iter().cloned().collect(),
            ..Self::default()
        }
    }

    pub fn failing_push(image_refs: &[String]) -> Self {
        Self {
            fail_push: image_refs.iter().cloned().collect(),
            ..Self::default()
        }
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl ContainerCli for FakeDocker {
    async fn login(&self, registry: &str, username: &str, password: &str) -> Result<()> {
        self.record(format!("login {registry} {username} {password}"));
        if self.fail_login {
            bail!("login denied by {registry}");
        }
        Ok(())
    }

    async fn pull(&self, image_ref: &str) -> Result<()> {
        self.record(format!("pull {image_ref}"));
        if self.fail_pull.contains(image_ref) {
            bail!("pull failed for {image_ref}");
        }
        Ok(())
    }

    async fn push(&self, image_ref: &str) -> Result<()> {
        self.record(format!("push {image_ref}"));
        if self.fail_push.contains(image_ref) {
            bail!("push failed for {image_ref}");
        }
        Ok(())
    }
}
