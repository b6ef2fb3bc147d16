use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::sse::ServerEvent,
    error::ServiceError,
    services::sse_events,
    state::SharedState,
};

/// A freshly registered tournament stream.
pub struct TournamentSubscription {
    pub connection_id: String,
    pub receiver: broadcast::Receiver<ServerEvent>,
    /// Sent before any live event: handshake, then the current snapshot.
    pub initial: Vec<ServerEvent>,
}

/// Subscribe to one tournament's stream.
///
/// The receiver is registered before the snapshot is read so no committed
/// change can fall between the two.
pub async fn subscribe_tournament(
    state: &SharedState,
    tournament_id: &str,
) -> Result<TournamentSubscription, ServiceError> {
    if !state.catalog().contains(tournament_id) {
        return Err(ServiceError::NotFound(format!("tournament {tournament_id}")));
    }

    let receiver = state.channels().subscribe(tournament_id);
    let assignments = state.engine().get_assignments(tournament_id).await?;
    let connection_id = Uuid::new_v4().simple().to_string();

    let initial = [
        sse_events::handshake(tournament_id, &connection_id),
        sse_events::snapshot(assignments.as_ref()),
    ]
    .into_iter()
    .filter_map(|event| {
        event
            .inspect_err(|err| warn!(tournament_id, error = %err, "failed to serialize initial SSE event"))
            .ok()
    })
    .collect();

    Ok(TournamentSubscription {
        connection_id,
        receiver,
        initial,
    })
}

/// Convert a subscription into an SSE response, forwarding events until the
/// client disconnects.
pub fn to_sse_stream(
    subscription: TournamentSubscription,
    tournament_id: String,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let TournamentSubscription {
        connection_id,
        mut receiver,
        initial,
    } = subscription;
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: replays the initial events, then reads from broadcast
    tokio::spawn(async move {
        for payload in initial {
            if tx.send(Ok(to_event(payload))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(%tournament_id, %connection_id, skipped, "SSE subscriber lagged");
                            continue;
                        }
                    }
                }
            }
        }

        info!(%tournament_id, %connection_id, "tournament SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}
