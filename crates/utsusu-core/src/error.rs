//! Error types for utsusu-core

use thiserror::Error;

/// Result type alias using utsusu-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to the user while converting a video.
///
/// None of these end the session; every variant is recoverable from the
/// input form or the upgrade prompt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The URL is empty or does not point at a supported video host
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The video or transcript service could not be reached
    #[error("video service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The text generation step failed
    #[error("generation failed: {0}")]
    GenerationFailed(String),

    /// The free trial is used up and no plan is active
    #[error("free trial used ({used}/{limit}); a plan is required to continue")]
    EntitlementDenied { used: u32, limit: u32 },

    /// A generation is already in flight
    #[error("a generation is already running")]
    Busy,

    /// The run was aborted through its handle
    #[error("generation cancelled")]
    Cancelled,

    /// Regenerate was requested with nothing on screen
    #[error("no active record")]
    NoActiveRecord,
}

impl Error {
    /// Whether retrying the same request can succeed without user changes.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::UpstreamUnavailable(_) | Error::GenerationFailed(_) | Error::Cancelled
        )
    }

    /// Whether the only way forward is the upgrade action.
    pub fn requires_upgrade(&self) -> bool {
        matches!(self, Error::EntitlementDenied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(Error::UpstreamUnavailable("timeout".into()).is_retryable());
        assert!(Error::GenerationFailed("empty".into()).is_retryable());
        assert!(!Error::InvalidInput("no host".into()).is_retryable());
        assert!(!Error::EntitlementDenied { used: 1, limit: 1 }.is_retryable());
    }

    #[test]
    fn test_requires_upgrade_only_for_denied() {
        assert!(Error::EntitlementDenied { used: 1, limit: 1 }.requires_upgrade());
        assert!(!Error::Busy.requires_upgrade());
    }

    #[test]
    fn test_denied_message_mentions_limit() {
        let msg = Error::EntitlementDenied { used: 1, limit: 1 }.to_string();
        assert!(msg.contains("1/1"));
    }
}
