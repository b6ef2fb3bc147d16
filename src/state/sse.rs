use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Per-tournament broadcast hubs, created on first use.
pub struct TournamentChannels {
    hubs: DashMap<String, SseHub>,
    capacity: usize,
}

impl TournamentChannels {
    /// Build the registry; every hub gets `capacity` slots of backlog.
    pub fn new(capacity: usize) -> Self {
        Self {
            hubs: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Register a subscriber on the tournament's hub, creating the hub when needed.
    pub fn subscribe(&self, tournament_id: &str) -> broadcast::Receiver<ServerEvent> {
        self.hubs
            .entry(tournament_id.to_owned())
            .or_insert_with(|| SseHub::new(self.capacity))
            .subscribe()
    }

    /// Publish to the tournament's subscribers and return how many received it.
    ///
    /// A tournament nobody listens to has no hub and yields zero.
    pub fn publish(&self, tournament_id: &str, event: ServerEvent) -> usize {
        match self.hubs.get(tournament_id) {
            Some(hub) => hub.broadcast(event),
            None => 0,
        }
    }

    #[cfg(test)]
    pub(crate) fn subscriber_count(&self, tournament_id: &str) -> usize {
        self.hubs
            .get(tournament_id)
            .map(|hub| hub.receiver_count())
            .unwrap_or(0)
    }
}

/// Simple broadcast hub wrapper used by the SSE services.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers; zero when nobody listens.
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    #[cfg(test)]
    fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
