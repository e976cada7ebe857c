//! Commit status domain types.

use serde::{Deserialize, Serialize};

/// State of a commit status, as GitLab's API enumerates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    Pending,
    Running,
    Success,
    Failed,
    Canceled,
}

impl CommitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommitState::Pending => "pending",
            CommitState::Running => "running",
            CommitState::Success => "success",
            CommitState::Failed => "failed",
            CommitState::Canceled => "canceled",
        }
    }

    /// Capitalized form, used as the default human-readable description.
    pub fn label(&self) -> &'static str {
        match self {
            CommitState::Pending => "Pending",
            CommitState::Running => "Running",
            CommitState::Success => "Success",
            CommitState::Failed => "Failed",
            CommitState::Canceled => "Canceled",
        }
    }
}

impl std::fmt::Display for CommitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CommitState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(CommitState::Pending),
            "running" => Ok(CommitState::Running),
            "success" => Ok(CommitState::Success),
            "failed" => Ok(CommitState::Failed),
            "canceled" => Ok(CommitState::Canceled),
            _ => Err(format!("Unknown commit state: {}", s)),
        }
    }
}

/// Requested status: a concrete state, or `auto` to follow the result of
/// the surrounding build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateOverride {
    #[default]
    Auto,
    State(CommitState),
}

impl StateOverride {
    /// Resolves to a concrete state.
    ///
    /// An explicit override is used verbatim. `Auto` reports `success` when
    /// the upstream build finished clean and `failed` otherwise, so the
    /// step can run as a post-build hook without being told the outcome.
    pub fn resolve(self, upstream_clean: bool) -> CommitState {
        match self {
            StateOverride::State(state) => state,
            StateOverride::Auto if upstream_clean => CommitState::Success,
            StateOverride::Auto => CommitState::Failed,
        }
    }
}

impl std::str::FromStr for StateOverride {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "auto" => Ok(StateOverride::Auto),
            other => other.parse().map(StateOverride::State),
        }
    }
}

/// A single status update, assembled once per invocation.
#[derive(Debug, Clone)]
pub struct StatusRequest {
    pub commit_hash: String,
    pub state: StateOverride,
    pub ref_name: Option<String>,
    pub target_url: Option<String>,
    pub description: Option<String>,
    pub context: Option<String>,
    pub coverage: Option<f64>,
}

impl StatusRequest {
    /// Form fields for the statuses endpoint, in wire order.
    ///
    /// The description defaults to the capitalized state label. `coverage`
    /// is only sent when configured. `ref` is omitted entirely when blank:
    /// GitLab distinguishes a missing ref from an empty one.
    pub fn form_fields(&self, state: CommitState) -> Vec<(&'static str, String)> {
        let description = self
            .description
            .clone()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| state.label().to_string());

        let mut fields = vec![
            ("state", state.as_str().to_string()),
            ("target_url", self.target_url.clone().unwrap_or_default()),
            ("description", description),
            ("context", self.context.clone().unwrap_or_default()),
        ];

        if let Some(coverage) = self.coverage {
            fields.push(("coverage", format!("{:.1}", coverage)));
        }

        if let Some(ref_name) = self
            .ref_name
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
        {
            fields.push(("ref", ref_name.to_string()));
        }

        fields
    }
}

/// Result of one status report call.
///
/// Transport-level failures are not an outcome; they surface as
/// [`crate::StatusError::Transport`] before a response exists.
#[derive(Debug, Clone)]
pub enum StatusOutcome {
    /// The server accepted the status (2xx).
    Sent { status: u16 },
    /// A response arrived outside the 2xx range. Carries the server's
    /// diagnostics so a failure can be understood without re-running.
    Rejected {
        status: u16,
        body: String,
        url: String,
    },
}

impl StatusOutcome {
    /// Classifies an HTTP response.
    pub fn from_response(status: u16, body: String, url: String) -> Self {
        if (200..300).contains(&status) {
            StatusOutcome::Sent { status }
        } else {
            StatusOutcome::Rejected { status, body, url }
        }
    }

    pub fn is_sent(&self) -> bool {
        matches!(self, StatusOutcome::Sent { .. })
    }
}
