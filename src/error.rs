use thiserror::Error;

#[derive(Debug, Error)]
pub enum GudError {
   #[error("Git command failed: {0}")]
   GitError(String),

   #[error("No {what}")]
   NoChanges { what: String },

   #[error("{var} environment variable is not set")]
   MissingApiKey { var: &'static str },

   #[error("Bedrock API error (HTTP {status}): {body}")]
   ApiError { status: u16, body: String },

   #[error("No content in Bedrock response")]
   EmptyCompletion,

   #[error("Failed to load config {path}: {reason}")]
   ConfigError { path: String, reason: String },

   #[error("Prompt template error: {0}")]
   TemplateError(String),

   #[error(transparent)]
   Normalize(#[from] NormalizeError),

   #[error("IO error: {0}")]
   IoError(#[from] std::io::Error),

   #[error("JSON error: {0}")]
   JsonError(#[from] serde_json::Error),

   #[error("HTTP error: {0}")]
   HttpError(#[from] reqwest::Error),

   #[error("{0}")]
   Other(String),
}

impl GudError {
   /// Conditions where there is simply nothing to do; the binaries report
   /// them and exit with status zero.
   pub const fn is_clean_exit(&self) -> bool {
      matches!(self, Self::NoChanges { .. } | Self::Normalize(NormalizeError::EmptyResponse))
   }

   /// The model answered, but with nothing usable at all
   pub const fn is_empty_completion(&self) -> bool {
      matches!(self, Self::EmptyCompletion | Self::Normalize(NormalizeError::EmptyResponse))
   }
}

/// Failures of the response normalizer.
///
/// `EmptyResponse` is terminal for a single normalization call. Every other
/// variant means the model replied with something, so callers may still show
/// the raw text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
   #[error("model response is empty")]
   EmptyResponse,

   #[error("no commits found in response")]
   NoCommits,

   #[error("commit #{index} is missing required field `{field}`")]
   MissingField { index: usize, field: &'static str },

   #[error("commit #{index} has invalid type '{value}'")]
   InvalidCommitType { index: usize, value: String },

   #[error("commit #{index} has scope '{value}' containing ')'")]
   InvalidScope { index: usize, value: String },

   #[error("response could not be parsed: {reason}")]
   Unparseable { reason: String },
}

pub type Result<T> = std::result::Result<T, GudError>;
