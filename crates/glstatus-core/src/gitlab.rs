//! GitLab commit-status API client.
//!
//! Implements the "post the build status to a commit" endpoint:
//! `POST /projects/:id/statuses/:sha`, authenticated through the
//! `PRIVATE-TOKEN` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use crate::error::{Result, StatusError};
use crate::remote::ProjectPath;
use crate::status::{StatusOutcome, StatusRequest};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Addresses a project either by its resolved namespace path or by a
/// numeric project ID supplied directly.
#[derive(Debug, Clone)]
pub enum ProjectRef {
    Path(ProjectPath),
    Id(u64),
}

impl ProjectRef {
    /// The value used as the `:id` segment of the API URL. Paths are
    /// percent-encoded into a single opaque segment.
    fn api_segment(&self) -> String {
        match self {
            ProjectRef::Path(path) => path.encoded(),
            ProjectRef::Id(id) => id.to_string(),
        }
    }
}

impl std::fmt::Display for ProjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectRef::Path(path) => write!(f, "{}", path),
            ProjectRef::Id(id) => write!(f, "#{}", id),
        }
    }
}

/// Client for posting commit statuses to one GitLab server.
pub struct StatusClient {
    client: reqwest::Client,
    base_url: String,
    token: SecretString,
}

impl StatusClient {
    /// Creates a client for the given API base URL
    /// (e.g. `https://gitlab.com/api/v4`).
    ///
    /// The token travels only in the `PRIVATE-TOKEN` header, never as a
    /// query parameter, and its `Debug` form is redacted.
    pub fn new(base_url: &str, token: SecretString) -> Result<Self> {
        url::Url::parse(base_url).map_err(|e| {
            StatusError::Configuration(format!("Invalid API base URL '{}': {}", base_url, e))
        })?;

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                StatusError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// URL of the statuses endpoint for one commit of one project.
    fn status_url(&self, project: &ProjectRef, commit_hash: &str) -> String {
        format!(
            "{}/projects/{}/statuses/{}",
            self.base_url,
            project.api_segment(),
            commit_hash
        )
    }

    /// Posts one status update and classifies the response.
    ///
    /// `upstream_clean` feeds the `auto` state resolution; see
    /// [`crate::status::StateOverride::resolve`].
    pub async fn report(
        &self,
        project: &ProjectRef,
        request: &StatusRequest,
        upstream_clean: bool,
    ) -> Result<StatusOutcome> {
        let state = request.state.resolve(upstream_clean);
        let url = self.status_url(project, &request.commit_hash);
        let fields = request.form_fields(state);

        tracing::debug!("Posting commit status '{}' to {}", state, url);

        let response = self
            .client
            .post(&url)
            .header("PRIVATE-TOKEN", self.token.expose_secret())
            .form(&fields)
            .send()
            .await
            .map_err(|source| StatusError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status().as_u16();

        // Read the body on every path: failures carry the server's
        // diagnostics, and a consumed body releases the connection.
        let body = response
            .text()
            .await
            .map_err(|source| StatusError::Transport {
                url: url.clone(),
                source,
            })?;

        Ok(StatusOutcome::from_response(status, body, url))
    }
}
