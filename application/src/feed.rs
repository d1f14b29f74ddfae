//! Observation feed: the append-only log of every turn across all sessions.
//!
//! Writers (one scheduler task per session) serialize on a short write
//! section; readers clone a snapshot under a read lock and therefore never
//! observe a half-written turn. Push-based viewers can additionally
//! [`subscribe`](ObservationFeed::subscribe) to a best-effort broadcast.

use crate::ports::transcript_sink::{NoTranscriptSink, TranscriptSink};
use roundtable_domain::{SessionId, Turn};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::trace;

/// Channel capacity for live subscribers
const CHANNEL_CAPACITY: usize = 256;

#[derive(Default)]
struct FeedInner {
    turns: Vec<Turn>,
    next_sequence: HashMap<SessionId, u64>,
}

/// Shared, thread-safe log of turns
pub struct ObservationFeed {
    inner: RwLock<FeedInner>,
    sender: broadcast::Sender<Turn>,
    sink: Arc<dyn TranscriptSink>,
}

impl ObservationFeed {
    pub fn new() -> Self {
        Self::with_sink(Arc::new(NoTranscriptSink))
    }

    /// Create a feed that mirrors every appended turn to `sink`
    pub fn with_sink(sink: Arc<dyn TranscriptSink>) -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: RwLock::new(FeedInner::default()),
            sender,
            sink,
        }
    }

    /// Append a turn.
    ///
    /// Never fails. Within a session, sequence numbers must start at 0 and
    /// increase by exactly one; anything else is a scheduler bug.
    pub fn append(&self, turn: Turn) {
        self.insert(&turn);
        self.publish(turn);
    }

    /// In-memory half of [`append`](Self::append).
    ///
    /// The scheduler calls this under the session lock so that a cancel can
    /// never interleave with it; it only touches memory.
    pub(crate) fn insert(&self, turn: &Turn) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let next = inner
            .next_sequence
            .entry(turn.session_id().clone())
            .or_insert(0);
        debug_assert_eq!(
            turn.sequence_number(),
            *next,
            "out-of-order turn for session {}",
            turn.session_id()
        );
        *next = turn.sequence_number() + 1;
        inner.turns.push(turn.clone());
    }

    /// Mirror an inserted turn to the transcript sink and live subscribers.
    ///
    /// Called outside any session lock, since the sink may block on I/O.
    pub(crate) fn publish(&self, turn: Turn) {
        trace!(
            "Feed append: session={} seq={}",
            turn.session_id(),
            turn.sequence_number()
        );
        self.sink.record(&turn);
        // No subscribers is fine
        let _ = self.sender.send(turn);
    }

    /// Ordered snapshot of the feed, optionally restricted to one session
    pub fn read_all(&self, session_id: Option<&SessionId>) -> Vec<Turn> {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        match session_id {
            Some(id) => inner
                .turns
                .iter()
                .filter(|t| t.session_id() == id)
                .cloned()
                .collect(),
            None => inner.turns.clone(),
        }
    }

    /// Number of turns across all sessions
    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .turns
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receive turns as they are appended.
    ///
    /// Delivery is best-effort: a subscriber that falls more than the
    /// channel capacity behind observes `RecvError::Lagged` and should fall
    /// back to [`read_all`](Self::read_all).
    pub fn subscribe(&self) -> broadcast::Receiver<Turn> {
        self.sender.subscribe()
    }
}

impl Default for ObservationFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roundtable_domain::{FailureReason, ParticipantId};
    use std::sync::Mutex;

    fn turn(session: &str, seq: u64, text: &str) -> Turn {
        Turn::record(
            SessionId::new(session),
            seq,
            "User",
            ParticipantId::new("PM"),
            "topic",
            Ok(text.to_string()),
        )
    }

    #[derive(Default)]
    struct RecordingSink {
        seen: Mutex<Vec<u64>>,
    }

    impl TranscriptSink for RecordingSink {
        fn record(&self, turn: &Turn) {
            self.seen.lock().unwrap().push(turn.sequence_number());
        }
    }

    #[test]
    fn test_append_and_read_all() {
        let feed = ObservationFeed::new();
        assert!(feed.is_empty());

        feed.append(turn("a", 0, "one"));
        feed.append(turn("b", 0, "uno"));
        feed.append(turn("a", 1, "two"));

        let all = feed.read_all(None);
        assert_eq!(all.len(), 3);
        assert_eq!(all[1].output_text(), "uno");

        let a = feed.read_all(Some(&SessionId::new("a")));
        let texts: Vec<_> = a.iter().map(|t| t.output_text()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_read_unknown_session_is_empty() {
        let feed = ObservationFeed::new();
        feed.append(turn("a", 0, "one"));
        assert!(feed.read_all(Some(&SessionId::new("zzz"))).is_empty());
    }

    #[test]
    fn test_failed_turns_are_kept() {
        let feed = ObservationFeed::new();
        feed.append(turn("a", 0, "one"));
        feed.append(Turn::record(
            SessionId::new("a"),
            1,
            "PM",
            ParticipantId::new("CTO"),
            "one",
            Err(FailureReason::Timeout),
        ));
        let turns = feed.read_all(Some(&SessionId::new("a")));
        assert_eq!(turns.len(), 2);
        assert!(!turns[1].is_ok());
    }

    #[test]
    fn test_sink_mirrors_appends() {
        let sink = Arc::new(RecordingSink::default());
        let feed = ObservationFeed::with_sink(sink.clone());
        feed.append(turn("a", 0, "one"));
        feed.append(turn("a", 1, "two"));
        assert_eq!(*sink.seen.lock().unwrap(), vec![0, 1]);
    }

    #[tokio::test]
    async fn test_subscribe_receives_appends() {
        let feed = ObservationFeed::new();
        let mut rx = feed.subscribe();
        feed.append(turn("a", 0, "one"));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.output_text(), "one");
    }

    #[test]
    #[should_panic(expected = "out-of-order turn")]
    #[cfg(debug_assertions)]
    fn test_sequence_gap_is_a_bug() {
        let feed = ObservationFeed::new();
        feed.append(turn("a", 0, "one"));
        feed.append(turn("a", 2, "three"));
    }

    #[test]
    fn test_concurrent_readers_see_whole_turns() {
        let feed = Arc::new(ObservationFeed::new());
        let writer = {
            let feed = Arc::clone(&feed);
            std::thread::spawn(move || {
                for seq in 0..200 {
                    feed.append(turn("a", seq, &format!("turn-{}", seq)));
                }
            })
        };
        let readers: Vec<_> = (0..4)
            .map(|_| {
                let feed = Arc::clone(&feed);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        let snapshot = feed.read_all(Some(&SessionId::new("a")));
                        for (i, t) in snapshot.iter().enumerate() {
                            assert_eq!(t.sequence_number(), i as u64);
                            assert_eq!(t.output_text(), format!("turn-{}", i));
                        }
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert_eq!(feed.len(), 200);
    }
}
