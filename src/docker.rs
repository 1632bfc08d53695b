use std::process::Stdio;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::error::AppError;
use crate::logging::Logger;

const DOCKER: &str = "docker";

/// The container-tool operations a refresh needs. Implemented over the
/// `docker` binary; tests substitute a fake.
#[async_trait]
pub trait ContainerCli: Send + Sync {
    /// Authenticate against a registry host. The password goes in over
    /// stdin, never on the command line.
    async fn login(&self, registry: &str, username: &str, password: &str) -> Result<()>;

    /// Pull an image reference into the local daemon.
    async fn pull(&self, image_ref: &str) -> Result<()>;

    /// Push an image reference from the local daemon.
    async fn push(&self, image_ref: &str) -> Result<()>;
}

pub struct DockerCli {
    logger: Logger,
}

impl DockerCli {
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }

    async fn run(&self, args: &[&str]) -> Result<()> {
        let rendered = format!("{} {}", DOCKER, args.join(" "));
        self.logger.debug(format!("Running: {}", rendered));

        let status = Command::new(DOCKER)
            .args(args)
            .status()
            .await
            .with_context(|| format!("failed to execute `{rendered}`"))?;

        if !status.success() {
            return Err(AppError::CommandFailed {
                command: rendered,
                status,
            }
            .into());
        }

        Ok(())
    }
}

#[async_trait]
impl ContainerCli for DockerCli {
    async fn login(&self, registry: &str, username: &str, password: &str) -> Result<()> {
        let rendered = format!(
            "{} login --username {} --password-stdin {}",
            DOCKER, username, registry
        );
        self.logger.debug(format!("Running: {}", rendered));

        let mut child = Command::new(DOCKER)
            .args(["login", "--username", username, "--password-stdin", registry])
            .stdin(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to execute `{rendered}`"))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(password.as_bytes())
                .await
                .context("failed to write the login password to docker")?;
            // Dropping stdin closes the pipe so docker sees end of input.
        }

        let status = child
            .wait()
            .await
            .with_context(|| format!("failed to wait on `{rendered}`"))?;

        if !status.success() {
            return Err(AppError::CommandFailed {
                command: rendered,
                status,
            }
            .into());
        }

        Ok(())
    }

    async fn pull(&self, image_ref: &str) -> Result<()> {
        self.run(&["pull", image_ref]).await
    }

    async fn push(&self, image_ref: &str) -> Result<()> {
        self.run(&["push", image_ref]).await
    }
}
