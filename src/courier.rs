use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::order::CourierEvent;

// ============================================================================
// Courier Status Source
// ============================================================================
//
// External collaborator owning the authoritative, append-only status
// sequence per tracking number. The engine only ever asks for the event
// immediately following the last one it has recorded; "no successor yet"
// is a normal result, not an error.
//
// ============================================================================

#[async_trait]
pub trait CourierStatusSource: Send + Sync {
    /// Return the event immediately following `last_seen` in the sequence
    /// for `tracking_number`, or `None` when no successor exists yet.
    ///
    /// A `last_seen` the source does not recognize (e.g. the locally
    /// synthesized booking event) positions the cursor before the first
    /// event of the sequence.
    async fn next_event(
        &self,
        tracking_number: &str,
        last_seen: Option<&CourierEvent>,
    ) -> anyhow::Result<Option<CourierEvent>>;
}

/// In-memory scripted feed. Stands in for the courier tracking API in the
/// demo binary and in tests; sequences are fixed up front and consumed one
/// event per poll.
#[derive(Debug, Default)]
pub struct StaticCourierFeed {
    sequences: HashMap<String, Vec<CourierEvent>>,
}

impl StaticCourierFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sequence(
        mut self,
        tracking_number: impl Into<String>,
        events: Vec<CourierEvent>,
    ) -> Self {
        self.sequences.insert(tracking_number.into(), events);
        self
    }
}

#[async_trait]
impl CourierStatusSource for StaticCourierFeed {
    async fn next_event(
        &self,
        tracking_number: &str,
        last_seen: Option<&CourierEvent>,
    ) -> anyhow::Result<Option<CourierEvent>> {
        let Some(sequence) = self.sequences.get(tracking_number) else {
            return Ok(None);
        };

        let next = match last_seen {
            Some(seen) => match sequence.iter().position(|e| e == seen) {
                Some(idx) => sequence.get(idx + 1),
                // Unknown cursor: the caller has only locally synthesized
                // history, so the whole sequence is still unseen.
                None => sequence.first(),
            },
            None => sequence.first(),
        };

        Ok(next.cloned())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn event(n: u32, text: &str) -> CourierEvent {
        CourierEvent::new(
            Utc.with_ymd_and_hms(2024, 7, 26, 10, n, 0).unwrap(),
            text,
        )
    }

    fn feed() -> StaticCourierFeed {
        StaticCourierFeed::new().with_sequence(
            "TCS1",
            vec![
                event(1, "Arrived at Karachi Hub"),
                event(2, "Out for Delivery"),
                event(3, "Delivered Successfully"),
            ],
        )
    }

    #[tokio::test]
    async fn test_advances_one_event_per_call() {
        let feed = feed();

        let first = feed.next_event("TCS1", None).await.unwrap().unwrap();
        assert_eq!(first.status_text, "Arrived at Karachi Hub");

        let second = feed.next_event("TCS1", Some(&first)).await.unwrap().unwrap();
        assert_eq!(second.status_text, "Out for Delivery");

        let third = feed.next_event("TCS1", Some(&second)).await.unwrap().unwrap();
        assert_eq!(third.status_text, "Delivered Successfully");

        // Sequence exhausted.
        assert!(feed.next_event("TCS1", Some(&third)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_cursor_starts_from_first_event() {
        let feed = feed();
        let synthesized = event(0, "Booked");

        let next = feed
            .next_event("TCS1", Some(&synthesized))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next.status_text, "Arrived at Karachi Hub");
    }

    #[tokio::test]
    async fn test_unknown_tracking_number_has_no_events() {
        let feed = feed();
        assert!(feed.next_event("NOPE", None).await.unwrap().is_none());
    }
}
