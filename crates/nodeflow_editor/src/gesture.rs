// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pointer gestures on the canvas.
//!
//! A [`GestureController`] turns press/move/release pointer input into store
//! operations. Pointer positions are in screen pixels; the controller
//! converts them with the current viewport. Intermediate frames never touch
//! the history; a node drag is recorded once, on release.

use crate::store::GraphStore;
use nodeflow_graph::{ConnectionId, NodeData, NodeDimensions, NodeId, Position, Rect};
use tracing::debug;

/// Active pointer interaction
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    /// No interaction in progress
    #[default]
    Idle,
    /// Moving the selected nodes
    DraggingNodes {
        /// Pointer position at press (screen)
        origin: Position,
        /// Positions of the dragged nodes at press
        start_positions: Vec<(NodeId, Position)>,
    },
    /// Moving the viewport
    Panning {
        /// Pointer position at press (screen)
        origin: Position,
        /// Viewport offset at press
        start_offset: Position,
    },
    /// Dragging a connection out of an output port
    Connecting {
        /// Source node
        source: NodeId,
        /// Source output port
        output: String,
    },
    /// Rubber-band selection
    BoxSelecting {
        /// Corner where the press happened (world)
        origin: Position,
        /// Opposite corner (world)
        current: Position,
        /// Whether the hit nodes are added to the current selection
        additive: bool,
    },
}

/// What the pointer was released over
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ReleaseTarget {
    /// Empty canvas or anything that is not a port
    #[default]
    Nothing,
    /// An input port
    InputPort {
        /// Node owning the port
        node: NodeId,
        /// Input port id
        input: String,
    },
}

/// Result of finishing a gesture
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// Nothing happened
    None,
    /// Nodes ended up somewhere else
    NodesMoved(Vec<NodeId>),
    /// The viewport was panned
    Panned,
    /// A connection was created
    Connected(ConnectionId),
    /// The connection drag ended without a connection
    ConnectionCancelled,
    /// The box selection hit these nodes
    BoxSelected(Vec<NodeId>),
}

/// Drives one pointer gesture at a time
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    gesture: Gesture,
}

impl GestureController {
    /// Create an idle controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Current gesture
    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Whether no gesture is in progress
    pub fn is_idle(&self) -> bool {
        self.gesture == Gesture::Idle
    }

    /// Press on a node body.
    ///
    /// The node is selected (added to the selection when `additive`), then
    /// every unlocked selected node starts dragging. Returns false if the
    /// drag was refused because the canvas is not editable or the node is
    /// locked.
    pub fn begin_node_drag<D: NodeData>(
        &mut self,
        store: &mut GraphStore<D>,
        node_id: &NodeId,
        pointer: Position,
        additive: bool,
    ) -> bool {
        self.cancel(store);

        let Some(node) = store.node(node_id) else {
            debug!(node = %node_id, "begin_node_drag: no such node");
            return false;
        };
        let locked = node.locked;
        if !store.selected_nodes().contains(node_id) {
            store.select_node(node_id, additive);
        }
        if !store.canvas().mode.is_editable() || locked {
            debug!(node = %node_id, "Node drag refused");
            return false;
        }

        store.save_to_history();
        let start_positions = store
            .selected_nodes()
            .iter()
            .filter_map(|id| store.node(id))
            .filter(|node| !node.locked)
            .map(|node| (node.id.clone(), node.position))
            .collect();
        self.gesture = Gesture::DraggingNodes {
            origin: pointer,
            start_positions,
        };
        true
    }

    /// Press on empty canvas with the pan button
    pub fn begin_pan<D: NodeData>(&mut self, store: &mut GraphStore<D>, pointer: Position) {
        self.cancel(store);
        self.gesture = Gesture::Panning {
            origin: pointer,
            start_offset: store.viewport().offset(),
        };
    }

    /// Press on an output port. Refused like [`begin_node_drag`](Self::begin_node_drag).
    pub fn begin_connection<D: NodeData>(
        &mut self,
        store: &mut GraphStore<D>,
        node_id: &NodeId,
        output: &str,
        pointer: Position,
    ) -> bool {
        self.cancel(store);

        let Some(node) = store.node(node_id) else {
            debug!(node = %node_id, "begin_connection: no such node");
            return false;
        };
        if !store.canvas().mode.is_editable() || node.locked {
            debug!(node = %node_id, "Connection drag refused");
            return false;
        }

        let world = store.viewport().screen_to_world(pointer);
        store.start_connection(node_id, output, Some(world));
        self.gesture = Gesture::Connecting {
            source: node_id.clone(),
            output: output.to_string(),
        };
        true
    }

    /// Press on empty canvas with the selection button
    pub fn begin_box_select<D: NodeData>(&mut self, store: &mut GraphStore<D>, pointer: Position, additive: bool) {
        self.cancel(store);
        let world = store.viewport().screen_to_world(pointer);
        self.gesture = Gesture::BoxSelecting {
            origin: world,
            current: world,
            additive,
        };
    }

    /// Pointer moved while pressed
    pub fn pointer_moved<D: NodeData>(&mut self, store: &mut GraphStore<D>, pointer: Position) {
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::DraggingNodes {
                origin,
                start_positions,
            } => {
                let delta = (pointer - *origin).scale(1.0 / store.viewport().zoom);
                for (id, start) in start_positions.iter() {
                    let position = store.canvas().snap(*start + delta);
                    store.move_node(id, position);
                }
            }
            Gesture::Panning { origin, start_offset } => {
                let target = *start_offset + (pointer - *origin);
                store.pan_to(target.x, target.y);
            }
            Gesture::Connecting { .. } => {
                let world = store.viewport().screen_to_world(pointer);
                store.update_connection_mouse(world);
            }
            Gesture::BoxSelecting { current, .. } => {
                *current = store.viewport().screen_to_world(pointer);
            }
        }
    }

    /// Rectangle of an active box selection (world coordinates)
    pub fn selection_rect(&self) -> Option<Rect> {
        match &self.gesture {
            Gesture::BoxSelecting { origin, current, .. } => Some(Rect::from_corners(*origin, *current)),
            _ => None,
        }
    }

    /// Pointer released; finishes the gesture.
    ///
    /// `dims` supplies measured node sizes for box selection.
    pub fn release<D: NodeData>(
        &mut self,
        store: &mut GraphStore<D>,
        target: ReleaseTarget,
        dims: impl Fn(&NodeId) -> Option<NodeDimensions>,
    ) -> GestureOutcome {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => GestureOutcome::None,
            Gesture::DraggingNodes { start_positions, .. } => {
                let moved: Vec<NodeId> = start_positions
                    .into_iter()
                    .filter(|(id, start)| store.node(id).is_some_and(|node| node.position != *start))
                    .map(|(id, _)| id)
                    .collect();
                if moved.is_empty() {
                    return GestureOutcome::None;
                }
                store.save_to_history();
                GestureOutcome::NodesMoved(moved)
            }
            Gesture::Panning { .. } => GestureOutcome::Panned,
            Gesture::Connecting { .. } => match target {
                ReleaseTarget::InputPort { node, input } => match store.complete_connection(&node, &input) {
                    Some(id) => {
                        store.save_to_history();
                        GestureOutcome::Connected(id)
                    }
                    None => GestureOutcome::ConnectionCancelled,
                },
                ReleaseTarget::Nothing => {
                    store.cancel_connection();
                    GestureOutcome::ConnectionCancelled
                }
            },
            Gesture::BoxSelecting {
                origin,
                current,
                additive,
            } => {
                let hit = store.nodes_in_rect(Rect::from_corners(origin, current), dims);
                let mut selection: Vec<NodeId> = Vec::new();
                if additive {
                    selection.extend(store.selected_nodes().iter().cloned());
                }
                selection.extend(hit.iter().cloned());
                store.select_nodes(&selection);
                GestureOutcome::BoxSelected(hit)
            }
        }
    }

    /// Abort the gesture, undoing its intermediate effects
    pub fn cancel<D: NodeData>(&mut self, store: &mut GraphStore<D>) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::BoxSelecting { .. } => {}
            Gesture::DraggingNodes { start_positions, .. } => {
                for (id, start) in start_positions {
                    store.move_node(&id, start);
                }
            }
            Gesture::Panning { start_offset, .. } => store.pan_to(start_offset.x, start_offset.y),
            Gesture::Connecting { .. } => store.cancel_connection(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{EditorMode, GridPatch};
    use nodeflow_graph::{Node, NodePatch};
    use serde_json::Value;

    fn store() -> GraphStore<Value> {
        let mut store = GraphStore::new();
        store.add_node(Node::new("A", "t").with_id("a").with_position(0.0, 0.0));
        store.add_node(Node::new("B", "t").with_id("b").with_position(300.0, 0.0));
        store.save_to_history();
        store
    }

    fn id(id: &str) -> NodeId {
        NodeId::from(id)
    }

    #[test]
    fn test_drag_moves_selection_and_records_once() {
        let mut store = store();
        let mut gestures = GestureController::new();
        store.select_node(&id("b"), false);

        assert!(gestures.begin_node_drag(&mut store, &id("a"), Position::new(10.0, 10.0), true));
        gestures.pointer_moved(&mut store, Position::new(20.0, 15.0));
        gestures.pointer_moved(&mut store, Position::new(50.0, 30.0));
        let outcome = gestures.release(&mut store, ReleaseTarget::Nothing, |_| None);

        assert_eq!(outcome, GestureOutcome::NodesMoved(vec![id("b"), id("a")]));
        assert_eq!(store.node(&id("a")).unwrap().position, Position::new(40.0, 20.0));
        assert_eq!(store.node(&id("b")).unwrap().position, Position::new(340.0, 20.0));
        assert!(gestures.is_idle());

        assert!(store.undo());
        assert_eq!(store.node(&id("a")).unwrap().position, Position::default());
        assert_eq!(store.history_stats().undo_count, 1);
    }

    #[test]
    fn test_drag_respects_zoom_and_snap() {
        let mut store = store();
        store.set_zoom(2.0);
        store.set_grid(GridPatch {
            snap: Some(true),
            size: Some(20.0),
            ..Default::default()
        });
        let mut gestures = GestureController::new();

        gestures.begin_node_drag(&mut store, &id("a"), Position::new(0.0, 0.0), false);
        gestures.pointer_moved(&mut store, Position::new(58.0, 22.0));
        assert_eq!(store.node(&id("a")).unwrap().position, Position::new(20.0, 20.0));
    }

    #[test]
    fn test_drag_refused_when_locked_or_not_editable() {
        let mut store = store();
        let mut gestures = GestureController::new();
        store.update_node(
            &id("a"),
            NodePatch {
                locked: Some(true),
                ..Default::default()
            },
        );
        assert!(!gestures.begin_node_drag(&mut store, &id("a"), Position::default(), false));
        assert!(gestures.is_idle());

        store.set_mode(EditorMode::Fixed);
        assert!(!gestures.begin_node_drag(&mut store, &id("b"), Position::default(), false));
        assert!(!gestures.begin_connection(&mut store, &id("b"), "out", Position::default()));
        assert!(store.connecting().is_none());
        // Selection still follows the click
        assert!(store.selected_nodes().contains(&id("b")));
    }

    #[test]
    fn test_cancel_restores_drag() {
        let mut store = store();
        let mut gestures = GestureController::new();
        gestures.begin_node_drag(&mut store, &id("a"), Position::default(), false);
        gestures.pointer_moved(&mut store, Position::new(100.0, 100.0));
        gestures.cancel(&mut store);
        assert_eq!(store.node(&id("a")).unwrap().position, Position::default());
        assert!(gestures.is_idle());
    }

    #[test]
    fn test_connect_gesture() {
        let mut store = store();
        let mut gestures = GestureController::new();

        assert!(gestures.begin_connection(&mut store, &id("a"), "out", Position::new(150.0, 40.0)));
        gestures.pointer_moved(&mut store, Position::new(290.0, 40.0));
        assert_eq!(store.connecting().unwrap().pointer, Some(Position::new(290.0, 40.0)));

        let outcome = gestures.release(
            &mut store,
            ReleaseTarget::InputPort {
                node: id("b"),
                input: "in".into(),
            },
            |_| None,
        );
        assert!(matches!(outcome, GestureOutcome::Connected(_)));
        assert_eq!(store.connection_count(), 1);

        gestures.begin_connection(&mut store, &id("a"), "out", Position::default());
        let outcome = gestures.release(&mut store, ReleaseTarget::Nothing, |_| None);
        assert_eq!(outcome, GestureOutcome::ConnectionCancelled);
        assert!(store.connecting().is_none());
    }

    #[test]
    fn test_pan_gesture() {
        let mut store = store();
        let mut gestures = GestureController::new();
        gestures.begin_pan(&mut store, Position::new(100.0, 100.0));
        gestures.pointer_moved(&mut store, Position::new(130.0, 90.0));
        assert_eq!(store.viewport().offset(), Position::new(30.0, -10.0));
        assert_eq!(
            gestures.release(&mut store, ReleaseTarget::Nothing, |_| None),
            GestureOutcome::Panned
        );
    }

    #[test]
    fn test_box_select() {
        let mut store = store();
        let mut gestures = GestureController::new();
        store.select_node(&id("b"), false);

        gestures.begin_box_select(&mut store, Position::new(-10.0, -10.0), false);
        gestures.pointer_moved(&mut store, Position::new(100.0, 50.0));
        assert!(gestures.selection_rect().is_some());
        let outcome = gestures.release(&mut store, ReleaseTarget::Nothing, |_| None);

        assert_eq!(outcome, GestureOutcome::BoxSelected(vec![id("a")]));
        assert_eq!(store.selected_nodes().len(), 1);

        store.select_node(&id("b"), false);
        gestures.begin_box_select(&mut store, Position::new(-10.0, -10.0), true);
        gestures.pointer_moved(&mut store, Position::new(100.0, 50.0));
        gestures.release(&mut store, ReleaseTarget::Nothing, |_| None);
        assert_eq!(store.selected_nodes().len(), 2);
    }
}
