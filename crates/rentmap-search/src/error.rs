use thiserror::Error;

/// Failures of the backend search call.
///
/// Every variant is recoverable: the session clears its result set and shows
/// [`SearchError::user_message`].
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The backend answered with `success: false`.
    #[error("listings backend reported failure: {0}")]
    Backend(String),

    #[error("invalid backend base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl SearchError {
    /// Text suitable for showing to the person searching.
    ///
    /// Backend-supplied messages are passed through verbatim; transport and
    /// decoding failures collapse to a generic retry hint.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SearchError::Backend(message) => message.clone(),
            SearchError::Http(_)
            | SearchError::UnexpectedStatus { .. }
            | SearchError::Deserialize { .. }
            | SearchError::InvalidBaseUrl { .. } => {
                "搜索房源失败，请稍后重试".to_string()
            }
        }
    }
}
