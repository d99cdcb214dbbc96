// SPDX-License-Identifier: MIT OR Apache-2.0
//! Change notifications emitted by the graph store.

use nodeflow_graph::{ConnectionId, NodeId, Position};
use std::collections::VecDeque;
use tracing::warn;

/// Maximum number of undrained events kept
pub const EVENT_QUEUE_CAPACITY: usize = 256;

/// A change made to the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    /// A node was added
    NodeCreated(NodeId),
    /// A node was removed
    NodeRemoved(NodeId),
    /// A node's fields were updated
    NodeUpdated(NodeId),
    /// A node was moved
    NodeMoved {
        /// Moved node
        id: NodeId,
        /// New position
        position: Position,
    },
    /// A node joined the selection
    NodeSelected(NodeId),
    /// A node left the selection
    NodeDeselected(NodeId),
    /// A connection drag started
    ConnectionStarted {
        /// Source node
        node: NodeId,
        /// Source output port
        output: String,
    },
    /// A connection was added
    ConnectionCreated(ConnectionId),
    /// A connection was removed
    ConnectionRemoved(ConnectionId),
    /// A connection's rendering hints were updated
    ConnectionUpdated(ConnectionId),
    /// A connection joined the selection
    ConnectionSelected(ConnectionId),
    /// A connection left the selection
    ConnectionDeselected(ConnectionId),
    /// The viewport pan changed
    CanvasPanned(Position),
    /// The zoom factor changed
    ZoomChanged(f64),
    /// A module was added
    ModuleCreated(String),
    /// The current module changed
    ModuleChanged(String),
    /// A module was removed
    ModuleRemoved(String),
    /// Flow data was imported
    DataImported {
        /// Nodes added
        nodes: usize,
        /// Connections added
        connections: usize,
    },
    /// Flow data was exported
    DataExported {
        /// Modules written
        modules: usize,
    },
    /// Undo/redo availability may have changed
    HistoryChanged,
}

impl StoreEvent {
    /// Event name in `subject:verb` form
    pub fn name(&self) -> &'static str {
        match self {
            Self::NodeCreated(_) => "node:created",
            Self::NodeRemoved(_) => "node:removed",
            Self::NodeUpdated(_) => "node:updated",
            Self::NodeMoved { .. } => "node:moved",
            Self::NodeSelected(_) => "node:selected",
            Self::NodeDeselected(_) => "node:deselected",
            Self::ConnectionStarted { .. } => "connection:start",
            Self::ConnectionCreated(_) => "connection:created",
            Self::ConnectionRemoved(_) => "connection:removed",
            Self::ConnectionUpdated(_) => "connection:updated",
            Self::ConnectionSelected(_) => "connection:selected",
            Self::ConnectionDeselected(_) => "connection:deselected",
            Self::CanvasPanned(_) => "canvas:pan",
            Self::ZoomChanged(_) => "zoom:changed",
            Self::ModuleCreated(_) => "module:created",
            Self::ModuleChanged(_) => "module:changed",
            Self::ModuleRemoved(_) => "module:removed",
            Self::DataImported { .. } => "data:imported",
            Self::DataExported { .. } => "data:exported",
            Self::HistoryChanged => "history:changed",
        }
    }
}

/// Bounded FIFO of events; the oldest events are dropped on overflow
#[derive(Debug, Clone)]
pub struct EventQueue {
    events: VecDeque<StoreEvent>,
    capacity: usize,
    dropped: u64,
}

impl EventQueue {
    /// Create a queue with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(EVENT_QUEUE_CAPACITY)
    }

    /// Create a queue holding at most `capacity` events
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: VecDeque::with_capacity(capacity.min(EVENT_QUEUE_CAPACITY)),
            capacity: capacity.max(1),
            dropped: 0,
        }
    }

    /// Queue an event
    pub fn push(&mut self, event: StoreEvent) {
        if self.events.len() >= self.capacity {
            if let Some(oldest) = self.events.pop_front() {
                warn!(event = oldest.name(), "Event queue full, dropping oldest event");
            }
            self.dropped += 1;
        }
        self.events.push_back(event);
    }

    /// Take all queued events in emission order
    pub fn drain(&mut self) -> Vec<StoreEvent> {
        self.events.drain(..).collect()
    }

    /// Number of queued events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events are queued
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events discarded because the queue was full
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drops_oldest() {
        let mut queue = EventQueue::with_capacity(2);
        queue.push(StoreEvent::ModuleCreated("a".into()));
        queue.push(StoreEvent::ModuleCreated("b".into()));
        queue.push(StoreEvent::ModuleCreated("c".into()));
        assert_eq!(queue.dropped(), 1);

        let events = queue.drain();
        assert_eq!(
            events,
            vec![
                StoreEvent::ModuleCreated("b".into()),
                StoreEvent::ModuleCreated("c".into())
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn test_event_names() {
        assert_eq!(StoreEvent::NodeCreated(NodeId::Int(1)).name(), "node:created");
        assert_eq!(StoreEvent::ZoomChanged(1.0).name(), "zoom:changed");
        assert_eq!(StoreEvent::DataExported { modules: 1 }.name(), "data:exported");
    }
}
