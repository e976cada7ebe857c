//! Input validation and assembly.
//!
//! clap gathers raw flag/env values; this module turns them into the
//! validated core types and echoes the effective configuration with the
//! token redacted. Everything here runs before any network activity.

use secrecy::{ExposeSecret, SecretString};

use glstatus_core::error::StatusError;
use glstatus_core::gitlab::ProjectRef;
use glstatus_core::remote::project_path_from_remote;
use glstatus_core::status::{StateOverride, StatusRequest};

use crate::Cli;

/// Name of the build-result indicator exported by the surrounding
/// pipeline. `"0"` means every preceding step finished clean.
const BUILD_STATUS_VAR: &str = "BUILD_STATUS";

/// Validated inputs for one invocation.
pub struct Inputs {
    pub api_base_url: String,
    pub private_token: SecretString,
    pub repository_url: Option<String>,
    pub project_id: Option<u64>,
    pub request: StatusRequest,
    pub upstream_clean: bool,
}

impl Inputs {
    /// Validates the raw CLI values and assembles the status request.
    ///
    /// Detects every configuration problem (blank commit hash, unknown
    /// status word, out-of-range coverage, missing project addressing)
    /// before a single byte goes on the wire.
    pub fn from_cli(cli: Cli) -> Result<Self, StatusError> {
        if cli.commit_hash.trim().is_empty() {
            return Err(StatusError::Configuration(
                "commit hash is required and must not be blank".to_string(),
            ));
        }

        if cli.private_token.is_empty() {
            return Err(StatusError::Configuration(
                "private token must not be empty".to_string(),
            ));
        }

        let state: StateOverride = cli.status.parse().map_err(StatusError::Configuration)?;

        let coverage = cli
            .coverage
            .as_deref()
            .map(parse_coverage)
            .transpose()?;

        if cli.repository_url.is_none() && cli.project_id.is_none() {
            return Err(StatusError::Configuration(
                "either a repository URL or a project ID is required".to_string(),
            ));
        }

        let request = StatusRequest {
            commit_hash: cli.commit_hash.trim().to_string(),
            state,
            ref_name: cli.ref_name,
            target_url: cli.target_url,
            description: cli.description,
            context: cli.context,
            coverage,
        };

        Ok(Self {
            api_base_url: cli.api_base_url,
            private_token: SecretString::from(cli.private_token),
            repository_url: cli.repository_url,
            project_id: cli.project_id,
            request,
            upstream_clean: upstream_build_clean(),
        })
    }

    /// Project addressing for the API: an explicit ID wins, otherwise the
    /// repository URL must resolve to a namespace path.
    pub fn project_ref(&self) -> Result<ProjectRef, StatusError> {
        if let Some(id) = self.project_id {
            return Ok(ProjectRef::Id(id));
        }

        let url = self.repository_url.as_deref().unwrap_or_default();
        project_path_from_remote(url)
            .map(ProjectRef::Path)
            .ok_or_else(|| StatusError::Resolution(url.to_string()))
    }

    /// Logs the effective configuration. The token is shown redacted;
    /// its clear form never reaches the log output.
    pub fn log_summary(&self) {
        tracing::info!("API base URL:   {}", self.api_base_url);
        tracing::info!(
            "Repository URL: {}",
            self.repository_url.as_deref().unwrap_or("-")
        );
        if let Some(id) = self.project_id {
            tracing::info!("Project ID:     {}", id);
        }
        tracing::info!("Commit hash:    {}", self.request.commit_hash);
        tracing::info!(
            "Private token:  {}",
            mask_token(self.private_token.expose_secret())
        );
    }
}

/// Reads the upstream build-result indicator from the environment.
fn upstream_build_clean() -> bool {
    std::env::var(BUILD_STATUS_VAR)
        .map(|v| v == "0")
        .unwrap_or(false)
}

/// Parses a coverage percentage, repairing the sloppy values build
/// environments produce: surrounding whitespace and trailing junk after
/// the leading decimal are dropped, so `"0.1."`, `"0.1   "` and
/// `"0.1abc"` all parse as `0.1`.
fn parse_coverage(raw: &str) -> Result<f64, StatusError> {
    let trimmed = raw.trim();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(trimmed.len());
    let prefix = trimmed[..end].trim_end_matches('.');

    let value: f64 = prefix.parse().map_err(|_| {
        StatusError::Configuration(format!("Invalid coverage value '{}'", raw))
    })?;

    if !(0.0..=100.0).contains(&value) {
        return Err(StatusError::Configuration(format!(
            "Coverage {} is outside the 0-100 range",
            value
        )));
    }

    Ok(value)
}

/// Masks a token for display (first and last 4 characters).
/// Tokens shorter than 12 characters are fully masked.
fn mask_token(token: &str) -> String {
    if token.len() < 12 {
        "*".repeat(token.len())
    } else {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glstatus_core::status::CommitState;

    fn base_cli() -> Cli {
        Cli {
            api_base_url: "https://gitlab.com/api/v4".to_string(),
            private_token: "asd123".to_string(),
            repository_url: Some("https://gitlab.com/owner/repository.git".to_string()),
            project_id: None,
            commit_hash: "aaa111".to_string(),
            status: "auto".to_string(),
            ref_name: None,
            target_url: None,
            description: None,
            context: None,
            coverage: None,
        }
    }

    #[test]
    fn valid_inputs_assemble_a_request() {
        let mut cli = base_cli();
        cli.status = "success".to_string();
        cli.coverage = Some("0.1".to_string());

        let inputs = Inputs::from_cli(cli).expect("inputs are valid");

        assert_eq!(inputs.request.commit_hash, "aaa111");
        assert_eq!(
            inputs.request.state,
            StateOverride::State(CommitState::Success)
        );
        assert_eq!(inputs.request.coverage, Some(0.1));
    }

    #[test]
    fn blank_commit_hash_is_rejected_before_any_network_call() {
        let mut cli = base_cli();
        cli.commit_hash = "   ".to_string();

        let result = Inputs::from_cli(cli);
        assert!(matches!(result, Err(StatusError::Configuration(_))));
    }

    #[test]
    fn unknown_status_word_is_rejected() {
        let mut cli = base_cli();
        cli.status = "finished".to_string();

        let result = Inputs::from_cli(cli);
        assert!(matches!(result, Err(StatusError::Configuration(_))));
    }

    #[test]
    fn missing_project_addressing_is_rejected() {
        let mut cli = base_cli();
        cli.repository_url = None;
        cli.project_id = None;

        let result = Inputs::from_cli(cli);
        assert!(matches!(result, Err(StatusError::Configuration(_))));
    }

    #[test]
    fn project_id_skips_url_resolution() {
        let mut cli = base_cli();
        cli.repository_url = None;
        cli.project_id = Some(4242);

        let inputs = Inputs::from_cli(cli).expect("inputs are valid");
        let project = inputs.project_ref().expect("project resolves");
        assert!(matches!(project, ProjectRef::Id(4242)));
    }

    #[test]
    fn unresolvable_repository_url_is_a_resolution_error() {
        let mut cli = base_cli();
        cli.repository_url = Some("https://gitlab.com/repository.git".to_string());

        let inputs = Inputs::from_cli(cli).expect("inputs are valid");
        let result = inputs.project_ref();
        assert!(matches!(result, Err(StatusError::Resolution(_))));
    }

    #[test]
    fn coverage_repair_table() {
        // Values observed from real build environments.
        assert_eq!(parse_coverage("0.1").unwrap(), 0.1);
        assert_eq!(parse_coverage("0.1.").unwrap(), 0.1);
        assert_eq!(parse_coverage("0.1      ").unwrap(), 0.1);
        assert_eq!(parse_coverage("0.1asdsdasdf34,asd.eerv5.3").unwrap(), 0.1);
        assert_eq!(parse_coverage("100").unwrap(), 100.0);
    }

    #[test]
    fn unusable_coverage_is_rejected() {
        assert!(parse_coverage("abc").is_err());
        assert!(parse_coverage("").is_err());
        assert!(parse_coverage("100.5").is_err());
        assert!(parse_coverage("-3").is_err());
    }

    #[test]
    fn upstream_indicator_only_trusts_a_clean_zero() {
        temp_env::with_var(BUILD_STATUS_VAR, Some("0"), || {
            assert!(upstream_build_clean());
        });
        temp_env::with_var(BUILD_STATUS_VAR, Some("1"), || {
            assert!(!upstream_build_clean());
        });
        temp_env::with_var(BUILD_STATUS_VAR, None::<&str>, || {
            assert!(!upstream_build_clean());
        });
    }

    #[test]
    fn mask_token_short() {
        assert_eq!(mask_token("abc"), "***");
        assert_eq!(mask_token("abcdefghijk"), "***********");
    }

    #[test]
    fn mask_token_long() {
        assert_eq!(mask_token("abcdefghijkl"), "abcd...ijkl");
        assert_eq!(mask_token("glpat-1234567890abcdef"), "glpa...cdef");
    }
}
