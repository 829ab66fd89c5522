use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to build HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Network request failed for {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body from {url}")]
    ReadBody {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Failed to decode JSON response from {url}")]
    JsonDecode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}
