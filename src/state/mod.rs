pub mod assignments;
mod locks;
mod sse;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    dao::{
        assignment_store::{AssignmentStore, MemoryAssignmentStore},
        catalog::MemoryCatalog,
    },
    services::{
        assignment_engine::AssignmentEngine,
        notification::{NotificationDispatcher, SseNotificationSink},
    },
};

pub use self::locks::{TournamentGuard, TournamentLocks};
pub use self::sse::TournamentChannels;

pub type SharedState = Arc<AppState>;

/// Central application state: catalog, assignment engine and SSE hubs.
pub struct AppState {
    config: AppConfig,
    catalog: Arc<MemoryCatalog>,
    engine: AssignmentEngine,
    channels: Arc<TournamentChannels>,
}

impl AppState {
    /// Wire the engine over `store` and start the notification dispatcher.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: AppConfig, store: Arc<dyn AssignmentStore>) -> SharedState {
        let catalog = Arc::new(MemoryCatalog::new());
        let channels = Arc::new(TournamentChannels::new(config.sse_capacity()));
        let dispatcher = NotificationDispatcher::spawn(
            Arc::new(SseNotificationSink::new(channels.clone())),
            config.notification_latency_alert(),
        );
        let engine = AssignmentEngine::new(store, catalog.clone(), catalog.clone(), dispatcher);

        Arc::new(Self {
            config,
            catalog,
            engine,
            channels,
        })
    }

    /// State backed by the in-process assignment store.
    pub fn in_memory(config: AppConfig) -> SharedState {
        Self::new(config, Arc::new(MemoryAssignmentStore::new()))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn catalog(&self) -> &MemoryCatalog {
        &self.catalog
    }

    pub fn engine(&self) -> &AssignmentEngine {
        &self.engine
    }

    /// Per-tournament SSE hubs.
    pub fn channels(&self) -> &TournamentChannels {
        &self.channels
    }
}
