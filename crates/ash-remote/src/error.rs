//! Error types for ash-remote

/// Result type for ash-remote operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by a [`crate::RemoteTree`].
///
/// None of these ever stand for "no children": an empty listing is an `Ok`
/// with an empty vector.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The adapter program could not be started
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The request reached the adapter but failed (network, auth, 5xx)
    #[error("Remote request {request} failed ({status}): {message}")]
    Transport {
        request: String,
        status: String,
        message: String,
    },

    /// The response body was not what the request promised
    #[error("Could not decode response for {request}: {message}")]
    Decode { request: String, message: String },
}

impl Error {
    /// Whether repeating the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
