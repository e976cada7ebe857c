use anyhow::{bail, Result};
use clap::Parser;

mod config;

use glstatus_core::gitlab::StatusClient;
use glstatus_core::status::StatusOutcome;

/// Report a commit's CI build status to a GitLab server.
#[derive(Parser, Debug)]
#[command(name = "glstatus")]
#[command(version = glstatus_core::VERSION)]
#[command(about = "Post a build status for a commit through the GitLab API", long_about = None)]
struct Cli {
    /// GitLab API base URL (e.g. https://gitlab.com/api/v4)
    #[arg(long, env = "GLSTATUS_API_BASE_URL")]
    api_base_url: String,

    /// Private token used to authenticate against the API
    #[arg(long, env = "GLSTATUS_PRIVATE_TOKEN", hide_env_values = true)]
    private_token: String,

    /// Git remote URL of the repository (https, ssh, or scp-like)
    #[arg(long, env = "GLSTATUS_REPOSITORY_URL")]
    repository_url: Option<String>,

    /// Numeric project ID; skips repository URL resolution when given
    #[arg(long, env = "GLSTATUS_PROJECT_ID")]
    project_id: Option<u64>,

    /// Commit hash the status is attached to
    #[arg(long, env = "GLSTATUS_COMMIT_HASH")]
    commit_hash: String,

    /// Status to report: auto, pending, running, success, failed or canceled
    #[arg(long, env = "GLSTATUS_STATUS", default_value = "auto")]
    status: String,

    /// Branch or tag the status applies to (omitted from the request when blank)
    #[arg(long = "ref", env = "GLSTATUS_REF")]
    ref_name: Option<String>,

    /// URL the status links to in the GitLab UI
    #[arg(long, env = "GLSTATUS_TARGET_URL")]
    target_url: Option<String>,

    /// Human-readable description (defaults to the capitalized status)
    #[arg(long, env = "GLSTATUS_DESCRIPTION")]
    description: Option<String>,

    /// Status context label to differentiate this status from other systems
    #[arg(long, env = "GLSTATUS_CONTEXT")]
    context: Option<String>,

    /// Test coverage percentage (0-100)
    #[arg(long, env = "GLSTATUS_COVERAGE")]
    coverage: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (doesn't override existing env vars)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glstatus_cli=info,glstatus_core=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let inputs = config::Inputs::from_cli(cli)?;
    inputs.log_summary();

    let project = inputs.project_ref()?;
    let client = StatusClient::new(&inputs.api_base_url, inputs.private_token.clone())?;

    let state = inputs.request.state.resolve(inputs.upstream_clean);

    match client
        .report(&project, &inputs.request, inputs.upstream_clean)
        .await?
    {
        StatusOutcome::Sent { status } => {
            tracing::info!(
                "Status '{}' recorded for commit {} on project {} (HTTP {})",
                state,
                inputs.request.commit_hash,
                project,
                status
            );
            Ok(())
        }
        StatusOutcome::Rejected { status, body, url } => {
            bail!(
                "GitLab rejected the status update (HTTP {}) at {}: {}",
                status,
                url,
                body
            )
        }
    }
}
