//! Error types for the broker protocol

use std::time::Duration;

use thiserror::Error;

use crate::timefmt::TimeParseError;

/// Errors surfaced by broker operations
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Command requested for an ID that has never checked in.
    #[error("unknown client id: {id}")]
    UnknownClient { id: String },

    /// The client did not reply within the reply ceiling.
    #[error("client at id {id} did not reply within {} seconds", .ceiling.as_secs())]
    ReplyTimeout { id: String, ceiling: Duration },

    /// A submitted timestamp failed to parse against the wire layout.
    #[error("malformed timestamp {input:?}: {source}")]
    MalformedTimestamp {
        input: String,
        #[source]
        source: TimeParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_client_names_the_id() {
        let err = BrokerError::UnknownClient {
            id: "c-42".to_string(),
        };
        assert!(err.to_string().contains("c-42"));
    }

    #[test]
    fn test_reply_timeout_names_the_ceiling() {
        let err = BrokerError::ReplyTimeout {
            id: "c-42".to_string(),
            ceiling: Duration::from_secs(5),
        };
        assert!(err.to_string().contains("5 seconds"));
    }
}
