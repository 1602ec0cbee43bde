use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaneError {
    #[error("Invalid group size {lanes}: must be a power of two between 1 and {max}")]
    InvalidGroupSize { lanes: usize, max: usize },

    #[error("Lane count mismatch: group has {expected} lanes, got {actual} inputs")]
    LaneCountMismatch { expected: usize, actual: usize },

    #[error("Too many values: {actual} values do not fit a {lanes}-lane group")]
    TooManyValues { lanes: usize, actual: usize },

    #[error("Backend '{0}' cannot execute on the host")]
    BackendUnavailable(String),

    #[error("Unknown backend '{0}', expected 'scalar', 'threaded', or 'ptx'")]
    UnknownBackend(String),

    #[error("Unknown sort order '{0}', expected 'ascending' or 'descending'")]
    UnknownSortOrder(String),

    #[error("Lane {lane} panicked during a collective")]
    LanePanicked { lane: usize },

    #[error("Failed to read launch config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// One failed self-test check.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Violation {
    pub severity: Severity,
    /// Check id, e.g. `MASK-001`.
    pub rule: String,
    pub message: String,
    /// Input layout the check ran on, e.g. `num_dups=3`.
    pub location: Option<String>,
}

/// `Error` fails a self-test run; `Warning` reports a documented limitation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl Violation {
    pub fn new(severity: Severity, rule: &str, message: String, location: &str) -> Self {
        Self {
            severity,
            rule: rule.to_string(),
            message,
            location: Some(location.to_string()),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self.severity {
            Severity::Error => "FAIL",
            Severity::Warning => "WARN",
        };
        write!(f, "{tag} {}", self.rule)?;
        if let Some(ref layout) = self.location {
            write!(f, " [{layout}]")?;
        }
        write!(f, ": {}", self.message)
    }
}
