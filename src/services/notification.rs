//! Delivery of assignment changes to real-time subscribers.
//!
//! The engine enqueues a [`Notification`] while it still owns the tournament
//! lock and returns immediately. The dispatcher routes each notification to a
//! delivery lane for its tournament; a lane delivers in commit order, and a
//! slow transport for one tournament never holds up a mutation or another
//! tournament's lane.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    services::sse_events,
    state::{TournamentChannels, assignments::TournamentAssignments},
};

/// Failure reported by a sink; logged by the dispatcher, never returned to callers.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("failed to serialize notification payload")]
    Serialization(#[from] serde_json::Error),
    #[error("notification transport failed: {0}")]
    Transport(String),
}

/// Real-time transport for tournament changes.
pub trait NotificationSink: Send + Sync {
    fn notify_assignment_updated(
        &self,
        tournament_id: String,
        assignments: TournamentAssignments,
    ) -> BoxFuture<'static, Result<(), NotificationError>>;

    fn notify_ring_cleared(
        &self,
        tournament_id: String,
        ring_number: u32,
        assignments: TournamentAssignments,
    ) -> BoxFuture<'static, Result<(), NotificationError>>;
}

/// A committed change waiting to be delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    AssignmentUpdated {
        tournament_id: String,
        assignments: TournamentAssignments,
    },
    RingCleared {
        tournament_id: String,
        ring_number: u32,
        assignments: TournamentAssignments,
    },
}

impl Notification {
    fn kind(&self) -> &'static str {
        match self {
            Notification::AssignmentUpdated { .. } => "race_assignment",
            Notification::RingCleared { .. } => "ring_clear",
        }
    }

    fn tournament_id(&self) -> &str {
        match self {
            Notification::AssignmentUpdated { tournament_id, .. }
            | Notification::RingCleared { tournament_id, .. } => tournament_id,
        }
    }

    fn deliver(self, sink: &dyn NotificationSink) -> BoxFuture<'static, Result<(), NotificationError>> {
        match self {
            Notification::AssignmentUpdated {
                tournament_id,
                assignments,
            } => sink.notify_assignment_updated(tournament_id, assignments),
            Notification::RingCleared {
                tournament_id,
                ring_number,
                assignments,
            } => sink.notify_ring_cleared(tournament_id, ring_number, assignments),
        }
    }
}

struct Envelope {
    notification: Notification,
    queued_at: Instant,
}

/// Handle onto the background routing task.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl NotificationDispatcher {
    /// Spawn the routing task on the current Tokio runtime.
    ///
    /// Deliveries slower than `latency_alert` (measured from enqueue) are logged as warnings.
    pub fn spawn(sink: Arc<dyn NotificationSink>, latency_alert: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(route(sink, rx, latency_alert));
        Self { tx }
    }

    /// Queue a notification without waiting for delivery.
    pub fn dispatch(&self, notification: Notification) {
        let envelope = Envelope {
            notification,
            queued_at: Instant::now(),
        };
        if let Err(err) = self.tx.send(envelope) {
            let dropped = err.0.notification;
            warn!(
                tournament_id = dropped.tournament_id(),
                kind = dropped.kind(),
                "notification dispatcher stopped; dropping notification"
            );
        }
    }
}

/// Fan envelopes out to one lane per tournament, spawning lanes on first use.
///
/// Lanes end when this task ends and drops their senders.
async fn route(
    sink: Arc<dyn NotificationSink>,
    mut rx: mpsc::UnboundedReceiver<Envelope>,
    latency_alert: Duration,
) {
    let mut lanes: HashMap<String, mpsc::UnboundedSender<Envelope>> = HashMap::new();

    while let Some(envelope) = rx.recv().await {
        let tournament_id = envelope.notification.tournament_id().to_owned();
        let lane = lanes.entry(tournament_id).or_insert_with_key(|tournament_id| {
            debug!(%tournament_id, "opening notification lane");
            let (tx, rx) = mpsc::unbounded_channel();
            tokio::spawn(deliver_lane(sink.clone(), rx, latency_alert));
            tx
        });
        if let Err(err) = lane.send(envelope) {
            let dropped = err.0.notification;
            warn!(
                tournament_id = dropped.tournament_id(),
                kind = dropped.kind(),
                "notification lane stopped; dropping notification"
            );
        }
    }
    debug!("notification dispatcher shut down");
}

async fn deliver_lane(
    sink: Arc<dyn NotificationSink>,
    mut rx: mpsc::UnboundedReceiver<Envelope>,
    latency_alert: Duration,
) {
    while let Some(Envelope {
        notification,
        queued_at,
    }) = rx.recv().await
    {
        let kind = notification.kind();
        let tournament_id = notification.tournament_id().to_owned();
        let outcome = notification.deliver(sink.as_ref()).await;
        let elapsed_ms = queued_at.elapsed().as_millis() as u64;

        match outcome {
            Ok(()) => debug!(%tournament_id, kind, elapsed_ms, "notification delivered"),
            Err(err) => warn!(
                %tournament_id,
                kind,
                elapsed_ms,
                error = %err,
                "failed to deliver notification"
            ),
        }

        if queued_at.elapsed() > latency_alert {
            warn!(
                %tournament_id,
                kind,
                elapsed_ms,
                target_ms = latency_alert.as_millis() as u64,
                "notification exceeded latency target"
            );
        }
    }
}

/// Sink publishing onto the per-tournament SSE hubs.
#[derive(Clone)]
pub struct SseNotificationSink {
    channels: Arc<TournamentChannels>,
}

impl SseNotificationSink {
    pub fn new(channels: Arc<TournamentChannels>) -> Self {
        Self { channels }
    }
}

impl NotificationSink for SseNotificationSink {
    fn notify_assignment_updated(
        &self,
        tournament_id: String,
        assignments: TournamentAssignments,
    ) -> BoxFuture<'static, Result<(), NotificationError>> {
        let outcome = sse_events::assignment_updated(&assignments)
            .map(|event| {
                let receivers = self.channels.publish(&tournament_id, event);
                debug!(%tournament_id, receivers, "published assignment update");
            })
            .map_err(NotificationError::from);
        Box::pin(async move { outcome })
    }

    fn notify_ring_cleared(
        &self,
        tournament_id: String,
        ring_number: u32,
        assignments: TournamentAssignments,
    ) -> BoxFuture<'static, Result<(), NotificationError>> {
        let outcome = sse_events::ring_cleared(ring_number, &assignments)
            .map(|event| {
                let receivers = self.channels.publish(&tournament_id, event);
                debug!(%tournament_id, ring_number, receivers, "published ring clear");
            })
            .map_err(NotificationError::from);
        Box::pin(async move { outcome })
    }
}


#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use tokio::time::timeout;

    use super::{testing::ScriptedSink, *};
    use crate::{
        services::sse_events::{EVENT_ASSIGNMENT_UPDATED, EVENT_RING_CLEARED},
        state::assignments::RingConfiguration,
    };

    fn assignments(id: &str) -> TournamentAssignments {
        TournamentAssignments::seeded(
            id,
            &[RingConfiguration {
                ring_number: 1,
                color: "Red".into(),
            }],
            SystemTime::UNIX_EPOCH,
        )
    }

    fn updated(id: &str) -> Notification {
        Notification::AssignmentUpdated {
            tournament_id: id.into(),
            assignments: assignments(id),
        }
    }

    #[tokio::test]
    async fn dispatcher_delivers_in_order_to_sse() {
        let channels = Arc::new(TournamentChannels::new(8));
        let mut rx = channels.subscribe("T1");
        let dispatcher = NotificationDispatcher::spawn(
            Arc::new(SseNotificationSink::new(channels.clone())),
            Duration::from_secs(3),
        );

        dispatcher.dispatch(updated("T1"));
        dispatcher.dispatch(Notification::RingCleared {
            tournament_id: "T1".into(),
            ring_number: 1,
            assignments: assignments("T1"),
        });

        let first = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        let second = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
        assert_eq!(first.event.as_deref(), Some(EVENT_ASSIGNMENT_UPDATED));
        assert_eq!(second.event.as_deref(), Some(EVENT_RING_CLEARED));
    }

    #[tokio::test]
    async fn failed_deliveries_do_not_stop_later_ones() {
        let (sink, mut delivered) = ScriptedSink::new(3, None);
        let dispatcher = NotificationDispatcher::spawn(sink, Duration::from_secs(3));

        for _ in 0..3 {
            dispatcher.dispatch(updated("T1"));
        }
        dispatcher.dispatch(Notification::RingCleared {
            tournament_id: "T1".into(),
            ring_number: 1,
            assignments: assignments("T1"),
        });

        let next = timeout(Duration::from_secs(1), delivered.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next, ("T1".to_owned(), "ring_clear"));
    }

    #[tokio::test]
    async fn stalled_tournament_does_not_delay_others() {
        let (sink, mut delivered) = ScriptedSink::new(0, Some("stuck"));
        let dispatcher = NotificationDispatcher::spawn(sink, Duration::from_millis(10));

        dispatcher.dispatch(updated("stuck"));
        dispatcher.dispatch(updated("stuck"));
        dispatcher.dispatch(updated("T2"));

        let next = timeout(Duration::from_secs(1), delivered.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next, ("T2".to_owned(), "race_assignment"));
    }
}
