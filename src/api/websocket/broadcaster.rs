//! Graph broadcaster
//!
//! Projects the manager's graph and fans it out to every connected viewer
//! over a tokio broadcast channel.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, error};

use super::events::{ServerEvent, WsMessage};
use crate::api::projection::{convert_to_visualization, extract_prefixes};
use crate::error::RdfResult;
use crate::manager::KnowledgeGraphManager;

/// Buffered messages per viewer before it is considered lagging
pub const CHANNEL_CAPACITY: usize = 1024;

/// Pushes graph projections to all viewers
pub struct GraphBroadcaster {
    manager: Arc<KnowledgeGraphManager>,
    tx: broadcast::Sender<WsMessage>,
    sequence_counter: AtomicU64,
    /// Held from reading the graph until the send, so sequence order
    /// follows commit order
    publish_lock: Mutex<()>,
}

impl GraphBroadcaster {
    pub fn new(manager: Arc<KnowledgeGraphManager>) -> Self {
        Self::with_capacity(manager, CHANNEL_CAPACITY)
    }

    pub fn with_capacity(manager: Arc<KnowledgeGraphManager>, capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            manager,
            tx,
            sequence_counter: AtomicU64::new(0),
            publish_lock: Mutex::new(()),
        }
    }

    /// Wrap an event with the next sequence id
    pub fn message(&self, event: ServerEvent) -> WsMessage {
        let seq = self.sequence_counter.fetch_add(1, Ordering::SeqCst);
        WsMessage {
            event,
            sequence_id: seq,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    /// Send an event to every subscribed viewer
    pub fn publish(&self, event: ServerEvent) {
        let _guard = self.publish_lock.lock();
        self.send(event);
    }

    fn send(&self, event: ServerEvent) {
        // A send error only means nobody is listening
        let _ = self.tx.send(self.message(event));
    }

    /// Current projection as a `graphData` message
    pub fn snapshot(&self) -> RdfResult<WsMessage> {
        let graph = self.manager.read_graph()?;
        Ok(self.message(ServerEvent::GraphData(convert_to_visualization(&graph))))
    }

    /// Messages a viewer receives right after connecting
    pub fn initial_messages(&self) -> Vec<WsMessage> {
        match self.manager.read_graph() {
            Ok(graph) => vec![
                self.message(ServerEvent::GraphData(convert_to_visualization(&graph))),
                self.message(ServerEvent::Prefixes(extract_prefixes(&graph))),
            ],
            Err(e) => {
                error!(error = %e, "Failed to load initial graph");
                vec![self.message(ServerEvent::Error("Failed to load initial graph".to_string()))]
            }
        }
    }

    /// Re-project the graph and push it to all viewers
    pub fn broadcast_graph(&self) {
        let _guard = self.publish_lock.lock();
        match self.manager.read_graph() {
            Ok(graph) => {
                let data = convert_to_visualization(&graph);
                debug!(
                    nodes = data.node_count(),
                    edges = data.edge_count(),
                    viewers = self.tx.receiver_count(),
                    "Broadcasting graph"
                );
                self.send(ServerEvent::GraphData(data));
            }
            Err(e) => {
                error!(error = %e, "Failed to load graph data for viewers");
                self.send(ServerEvent::Error(
                    "Failed to load graph data for clients".to_string(),
                ));
            }
        }
    }

    /// Push the namespace hints after a prefix table change
    pub fn broadcast_prefixes(&self) {
        let _guard = self.publish_lock.lock();
        match self.manager.read_graph() {
            Ok(graph) => self.send(ServerEvent::Prefixes(extract_prefixes(&graph))),
            Err(e) => error!(error = %e, "Failed to load prefixes for viewers"),
        }
    }

    /// Get the current sequence ID
    pub fn current_sequence_id(&self) -> u64 {
        self.sequence_counter.load(Ordering::SeqCst)
    }

    /// Subscribe to receive broadcast messages
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.tx.subscribe()
    }

    pub fn manager(&self) -> &Arc<KnowledgeGraphManager> {
        &self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Triple;

    #[test]
    fn test_sequence_increments() {
        let broadcaster = GraphBroadcaster::new(Arc::new(KnowledgeGraphManager::in_memory()));
        assert_eq!(broadcaster.current_sequence_id(), 0);

        broadcaster.publish(ServerEvent::Pong);
        let msg = broadcaster.message(ServerEvent::Pong);

        assert_eq!(msg.sequence_id, 1);
        assert_eq!(broadcaster.current_sequence_id(), 2);
    }

    #[tokio::test]
    async fn test_broadcast_graph_reaches_subscribers() {
        let manager = Arc::new(KnowledgeGraphManager::in_memory());
        manager
            .add_triples(vec![Triple::new("http://ex.org/a", "http://ex.org/p", "http://ex.org/b")])
            .unwrap();
        let broadcaster = GraphBroadcaster::new(manager);

        let mut first = broadcaster.subscribe();
        let mut second = broadcaster.subscribe();
        broadcaster.broadcast_graph();

        let a = first.recv().await.unwrap();
        let b = second.recv().await.unwrap();
        assert_eq!(a.event, b.event);
        match a.event {
            ServerEvent::GraphData(data) => {
                assert_eq!(data.node_count(), 2);
                assert_eq!(data.edge_count(), 1);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_last_broadcast_matches_final_graph() {
        let manager = Arc::new(KnowledgeGraphManager::in_memory());
        let broadcaster = Arc::new(GraphBroadcaster::new(Arc::clone(&manager)));
        let mut rx = broadcaster.subscribe();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let manager = Arc::clone(&manager);
                let broadcaster = Arc::clone(&broadcaster);
                std::thread::spawn(move || {
                    for j in 0..10 {
                        manager
                            .add_triples(vec![Triple::new(
                                format!("http://ex.org/s{}", i),
                                "http://ex.org/p",
                                format!("http://ex.org/o{}", j),
                            )])
                            .unwrap();
                        broadcaster.broadcast_graph();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut last = None;
        let mut previous_seq = None;
        while let Ok(msg) = rx.try_recv() {
            if let Some(prev) = previous_seq {
                assert!(msg.sequence_id > prev);
            }
            previous_seq = Some(msg.sequence_id);
            last = Some(msg);
        }

        match last.map(|m| m.event) {
            Some(ServerEvent::GraphData(data)) => assert_eq!(data.edge_count(), 40),
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_initial_messages() {
        let broadcaster = GraphBroadcaster::new(Arc::new(KnowledgeGraphManager::in_memory()));
        let messages = broadcaster.initial_messages();

        assert_eq!(messages.len(), 2);
        assert!(matches!(messages[0].event, ServerEvent::GraphData(_)));
        assert!(matches!(&messages[1].event, ServerEvent::Prefixes(p) if p.contains(&"owl:".to_string())));
    }
}
