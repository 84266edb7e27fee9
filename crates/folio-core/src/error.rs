use thiserror::Error;

/// Why a diagram payload was rejected. The `Display` text is shown to the
/// user as-is, so it must tell a wrong file type apart from broken content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Please upload a .excalidraw or .json file (got '{filename}')")]
    UnsupportedExtension { filename: String },

    #[error("Could not read file: contents are not valid UTF-8 text")]
    InvalidEncoding,

    #[error("Invalid JSON: {reason}")]
    Malformed { reason: String },

    #[error("Invalid scene: expected a JSON object at the top level")]
    NotAnObject,
}

impl ParseError {
    /// True when the input was rejected before its contents were looked at.
    pub fn is_wrong_extension(&self) -> bool {
        matches!(self, Self::UnsupportedExtension { .. })
    }
}

#[derive(Debug, Error)]
pub enum FolioError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl FolioError {
    /// Returns `true` for errors a caller should report to the user.
    ///
    /// Storage and render failures are infrastructure hiccups: they are
    /// logged and degraded locally instead of being surfaced.
    pub fn is_user_facing(&self) -> bool {
        match self {
            Self::NotFound(_) | Self::Parse(_) | Self::InvalidInput(_) => true,
            Self::Storage(_)
            | Self::Serialization(_)
            | Self::Config(_)
            | Self::Render(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FolioError>;
