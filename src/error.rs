use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanlyticsError {
    #[error("Malformed scan event{}: {reason}", line_suffix(.line))]
    MalformedEvent {
        line: Option<usize>,
        reason: String,
    },

    #[error("Malformed customer record: {0}")]
    MalformedCustomer(String),

    #[error("Invalid filter input for '{param}': {value}")]
    InvalidFilterInput { param: String, value: String },

    #[error("Unknown report: {0}")]
    UnknownReport(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ScanlyticsError>;

fn line_suffix(line: &Option<usize>) -> String {
    line.map(|l| format!(" at line {}", l)).unwrap_or_default()
}

impl From<std::io::Error> for ScanlyticsError {
    fn from(e: std::io::Error) -> Self {
        ScanlyticsError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for ScanlyticsError {
    fn from(e: serde_json::Error) -> Self {
        ScanlyticsError::Json(e.to_string())
    }
}

impl ScanlyticsError {
    /// Shorthand for a [`ScanlyticsError::MalformedEvent`] without a line number.
    pub fn malformed(reason: impl Into<String>) -> Self {
        ScanlyticsError::MalformedEvent {
            line: None,
            reason: reason.into(),
        }
    }

    /// Attach a 1-based source line to a malformed-event error. Other variants pass through.
    pub fn at_line(self, line: usize) -> Self {
        match self {
            ScanlyticsError::MalformedEvent { reason, .. } => ScanlyticsError::MalformedEvent {
                line: Some(line),
                reason,
            },
            other => other,
        }
    }

    /// Process exit code used by the command-line front end.
    pub fn exit_code(&self) -> i32 {
        match self {
            ScanlyticsError::MalformedEvent { .. } => 65,
            ScanlyticsError::MalformedCustomer(_) => 65,
            ScanlyticsError::Json(_) => 65,
            ScanlyticsError::InvalidFilterInput { .. } => 64,
            ScanlyticsError::UnknownReport(_) => 64,
            ScanlyticsError::Config(_) => 78,
            ScanlyticsError::Io(_) => 74,
        }
    }
}
