use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// The request never produced a response (DNS, refused connection, caller-imposed timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered, but with an error status, an unreadable body,
    /// or a payload that declares failure (e.g. no route found).
    #[error("Fetch error: {message}")]
    Fetch { message: String },

    /// The caller handed in something the pipeline refuses to send upstream.
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl PipelineError {
    pub fn fetch(message: impl Into<String>) -> Self {
        PipelineError::Fetch {
            message: message.into(),
        }
    }

    /// Short machine-readable name, handed to the frontend alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Network(_) => "network",
            PipelineError::Fetch { .. } => "fetch",
            PipelineError::Validation(_) => "validation",
        }
    }

    /// Collapses any failure into `Network`, keeping the message.
    pub fn into_network(self) -> Self {
        match self {
            PipelineError::Network(_) => self,
            PipelineError::Fetch { message } => PipelineError::Network(message),
            PipelineError::Validation(message) => PipelineError::Network(message),
        }
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() || e.is_body() || e.is_status() {
            PipelineError::fetch(e.to_string())
        } else {
            PipelineError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::fetch(format!("Failed to parse JSON response: {}", e))
    }
}
