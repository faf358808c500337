use thiserror::Error;

/// Errors returned by the Places API client's fallible internals.
///
/// The engine-facing calls never surface these; they degrade to synthetic
/// error statuses or empty detail fields instead.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The configured base URL is not parseable.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),
}
