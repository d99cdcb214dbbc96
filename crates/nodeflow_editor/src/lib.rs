// SPDX-License-Identifier: MIT OR Apache-2.0
//! Nodeflow editor core.
//!
//! Headless state management for a node-graph editor:
//! - [`GraphStore`]: nodes, connections, selection, modules and canvas state
//! - Per-module undo/redo on copy-on-write snapshots
//! - Versioned JSON flow import/export with legacy reconciliation
//! - Pointer gestures (drag, pan, connect, box select)
//!
//! Rendering is left to the embedding application, which reads the store
//! and drains [`StoreEvent`]s after each interaction.

pub mod canvas;
pub mod config;
pub mod events;
pub mod exchange;
pub mod file_io;
pub mod gesture;
pub mod history;
pub mod modules;
pub mod selection;
pub mod store;

pub use canvas::{CanvasState, EditorMode, GridConfig, GridPatch, Theme, Viewport, ViewportPatch, ZoomLimits};
pub use config::{ConfigError, EditorConfig};
pub use events::StoreEvent;
pub use exchange::{FlowError, ImportSummary};
pub use gesture::{Gesture, GestureController, GestureOutcome, ReleaseTarget};
pub use history::HistoryStats;
pub use modules::ModuleSummary;
pub use store::{ConnectingState, GraphStore, SharedGraphStore};

pub use nodeflow_graph as graph;
