use std::path::PathBuf;

/// Transport-level failures talking to the generation service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Request worker exited without a response")]
    Abandoned,
}

/// Actions the user tried that cannot go ahead
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserError {
    #[error("Please select a file first!")]
    NoFileSelected,

    #[error("Please wait for the current request to finish.")]
    Busy,

    #[error("{} is not a PDF file.", .0.display())]
    NotPdf(PathBuf),

    #[error("{} does not exist or is not a file.", .0.display())]
    Unreadable(PathBuf),
}
