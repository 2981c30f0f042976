//! Boundary trait for the pub/sub collaborator that fans successful props out
//! to stream subscribers. Delivery and retry semantics belong to the
//! implementation, not the core.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};

static STREAM_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9:_-]+$").expect("stream pattern is valid")
});

/// Stream identifiers are opaque routing keys, constrained to a conservative
/// character set so hosts can embed them in channel names.
pub fn valid_stream_name(name: &str) -> bool {
    STREAM_PATTERN.is_match(name)
}

#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Deliver an ok-shaped payload to subscribers of `stream`. Called
    /// at-most-once per successful non-redirect completion, after the primary
    /// response is finalized.
    async fn broadcast(
        &self,
        stream: &str,
        props: &Map<String, JsonValue>,
        version: i64,
    ) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_channel_like_names() {
        assert!(valid_stream_name("teams:4:members"));
        assert!(valid_stream_name("board_42-live"));
    }

    #[test]
    fn rejects_spaces_and_empty_names() {
        assert!(!valid_stream_name(""));
        assert!(!valid_stream_name("teams 4"));
        assert!(!valid_stream_name("teams/4"));
    }
}
