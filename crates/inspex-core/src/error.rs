use crate::model::SheetDetection;

#[derive(Debug, thiserror::Error)]
pub enum InspexError {
    #[error("unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("could not detect 'Feature Number' and 'Actual' columns in any sheet")]
    StructureNotFound { trace: Vec<SheetDetection> },

    /// The cause is logged where the failure happens; only the document kind is shown.
    #[error("failed to process the {document} document")]
    Decode { document: String, detail: String },

    #[error("{tool} not found. Install it or set its path in the configuration")]
    ToolNotFound { tool: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl InspexError {
    /// Build a decode failure and log its cause for operators.
    pub fn decode(document: &str, detail: impl std::fmt::Display) -> Self {
        let detail = detail.to_string();
        tracing::error!(document, %detail, "document decode failed");
        InspexError::Decode {
            document: document.to_string(),
            detail,
        }
    }
}

impl From<figment::Error> for InspexError {
    fn from(e: figment::Error) -> Self {
        InspexError::Config(e.to_string())
    }
}
