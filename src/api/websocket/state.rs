//! Shared application state

use std::sync::Arc;

use tokio::sync::broadcast;

use super::broadcaster::GraphBroadcaster;
use super::events::WsMessage;
use crate::chat::CompletionBackend;
use crate::config::Config;
use crate::manager::KnowledgeGraphManager;
use crate::tools::ToolDispatcher;

/// State shared by every HTTP and WebSocket handler
pub struct AppState {
    pub manager: Arc<KnowledgeGraphManager>,
    pub broadcaster: Arc<GraphBroadcaster>,
    pub dispatcher: ToolDispatcher,
    pub completion: Arc<dyn CompletionBackend>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        manager: Arc<KnowledgeGraphManager>,
        completion: Arc<dyn CompletionBackend>,
        config: Config,
    ) -> Self {
        let broadcaster = Arc::new(GraphBroadcaster::new(manager.clone()));
        let dispatcher = ToolDispatcher::new(broadcaster.clone(), config.data_dir.clone());

        Self {
            manager,
            broadcaster,
            dispatcher,
            completion,
            config: Arc::new(config),
        }
    }

    /// Subscribe to receive broadcast messages
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.broadcaster.subscribe()
    }

    /// Get the current sequence ID
    pub fn current_sequence_id(&self) -> u64 {
        self.broadcaster.current_sequence_id()
    }
}
