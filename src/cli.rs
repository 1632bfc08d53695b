use std::path::PathBuf;

use clap::Parser;

/// ecr-refresh — re-push the most recent tags of prefixed ECR repositories
#[derive(Parser, Debug)]
#[command(
    name = "ecr-refresh",
    version,
    about,
    after_help = "Exit status: 0 = all tags refreshed, 1 = completed with failures, \
                  2 = aborted before processing (login, repository listing, or log file error)."
)]
pub struct Cli {
    /// Repository name prefix to select (e.g., github/)
    #[arg(long)]
    pub prefix: String,

    /// AWS account id owning the registry
    #[arg(long)]
    pub account_id: String,

    /// AWS region of the registry (e.g., eu-west-1)
    #[arg(long, env = "AWS_REGION")]
    pub region: String,

    /// Named AWS credential profile (omit to use the default chain)
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Preview the run without pulling, deleting, or pushing
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Append a plain-text copy of the log to this file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
