// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas settings: viewport, grid, editor mode, layout direction and theme.

use nodeflow_graph::{LayoutDirection, Position};
use serde::{Deserialize, Serialize};

/// Default minimum zoom factor
pub const DEFAULT_MIN_ZOOM: f64 = 0.5;
/// Default maximum zoom factor
pub const DEFAULT_MAX_ZOOM: f64 = 2.0;
/// Default zoom increment for zoom in/out
pub const DEFAULT_ZOOM_STEP: f64 = 0.1;
/// Default grid cell size
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Pan offset (screen pixels) and zoom factor of a module
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Horizontal pan
    pub x: f64,
    /// Vertical pan
    pub y: f64,
    /// Zoom factor
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Pan offset as a position
    pub fn offset(&self) -> Position {
        Position::new(self.x, self.y)
    }

    /// Convert a screen-space point to world coordinates
    pub fn screen_to_world(&self, screen: Position) -> Position {
        (screen - self.offset()).scale(1.0 / self.zoom)
    }

    /// Convert a world-space point to screen coordinates
    pub fn world_to_screen(&self, world: Position) -> Position {
        world.scale(self.zoom) + self.offset()
    }
}

/// Partial viewport update
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct ViewportPatch {
    /// New horizontal pan
    pub x: Option<f64>,
    /// New vertical pan
    pub y: Option<f64>,
    /// New zoom factor (clamped)
    pub zoom: Option<f64>,
}

impl ViewportPatch {
    /// Merge the present fields into `viewport`, clamping the zoom
    pub fn apply(self, viewport: &mut Viewport, limits: &ZoomLimits) {
        if let Some(x) = self.x {
            viewport.x = x;
        }
        if let Some(y) = self.y {
            viewport.y = y;
        }
        if let Some(zoom) = self.zoom {
            viewport.zoom = limits.clamp(zoom);
        }
    }
}

impl From<Viewport> for ViewportPatch {
    fn from(viewport: Viewport) -> Self {
        Self {
            x: Some(viewport.x),
            y: Some(viewport.y),
            zoom: Some(viewport.zoom),
        }
    }
}

/// Zoom bounds and increment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomLimits {
    /// Smallest zoom factor
    pub min: f64,
    /// Largest zoom factor
    pub max: f64,
    /// Increment used by zoom in/out
    pub step: f64,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            min: DEFAULT_MIN_ZOOM,
            max: DEFAULT_MAX_ZOOM,
            step: DEFAULT_ZOOM_STEP,
        }
    }
}

impl ZoomLimits {
    /// Replace unusable bounds with the defaults.
    ///
    /// Bounds must satisfy `0 < min <= max`, both finite; the step must be
    /// finite and positive.
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let bounds_ok = self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max;
        let (min, max) = if bounds_ok {
            (self.min, self.max)
        } else {
            (defaults.min, defaults.max)
        };
        let step = if self.step.is_finite() && self.step > 0.0 {
            self.step
        } else {
            defaults.step
        };
        Self { min, max, step }
    }

    /// Clamp a zoom factor into range. Never panics, even on inverted bounds.
    pub fn clamp(&self, zoom: f64) -> f64 {
        let zoom = if zoom.is_nan() { 1.0 } else { zoom };
        zoom.max(self.min).min(self.max)
    }
}

/// Background grid settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Cell size in world units
    pub size: f64,
    /// Whether the grid is drawn
    pub visible: bool,
    /// Whether dragged nodes snap to the grid
    pub snap: bool,
    /// Line color
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Line opacity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_GRID_SIZE,
            visible: true,
            snap: false,
            color: None,
            opacity: None,
        }
    }
}

/// Partial grid update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridPatch {
    /// Cell size in world units
    pub size: Option<f64>,
    /// Draw the grid
    pub visible: Option<bool>,
    /// Snap dragged nodes to the grid
    pub snap: Option<bool>,
    /// Line color
    pub color: Option<String>,
    /// Line opacity
    pub opacity: Option<f64>,
}

impl GridPatch {
    /// Merge the present fields into `grid`
    pub fn apply(self, grid: &mut GridConfig) {
        if let Some(size) = self.size {
            grid.size = size;
        }
        if let Some(visible) = self.visible {
            grid.visible = visible;
        }
        if let Some(snap) = self.snap {
            grid.snap = snap;
        }
        if let Some(color) = self.color {
            grid.color = Some(color);
        }
        if let Some(opacity) = self.opacity {
            grid.opacity = Some(opacity);
        }
    }
}

/// Editor interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorMode {
    /// Full editing
    #[default]
    Edit,
    /// Locked: nodes and connections cannot be changed by gestures
    Fixed,
    /// Read-only presentation
    View,
}

impl EditorMode {
    /// Whether gestures may change the graph
    pub fn is_editable(self) -> bool {
        self == Self::Edit
    }
}

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Light theme
    #[default]
    Light,
    /// Dark theme
    Dark,
}

impl Theme {
    /// The other theme
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Live canvas state of the current module
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CanvasState {
    /// Viewport of the current module
    pub viewport: Viewport,
    /// Grid settings
    pub grid: GridConfig,
    /// Interaction mode
    pub mode: EditorMode,
    /// Layout direction
    pub direction: LayoutDirection,
    /// Zoom bounds
    pub zoom_limits: ZoomLimits,
}

impl CanvasState {
    /// Merge a viewport patch, clamping the zoom
    pub fn apply_viewport(&mut self, patch: ViewportPatch) {
        patch.apply(&mut self.viewport, &self.zoom_limits);
    }

    /// Whether the canvas is locked
    pub fn is_locked(&self) -> bool {
        self.mode == EditorMode::Fixed
    }

    /// Snap a world position using the grid settings
    pub fn snap(&self, position: Position) -> Position {
        nodeflow_graph::geometry::snap_to_grid(position, self.grid.size, self.grid.snap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_world_conversion() {
        let viewport = Viewport {
            x: 100.0,
            y: 50.0,
            zoom: 2.0,
        };
        let world = viewport.screen_to_world(Position::new(300.0, 250.0));
        assert_eq!(world, Position::new(100.0, 100.0));
        assert_eq!(viewport.world_to_screen(world), Position::new(300.0, 250.0));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut canvas = CanvasState::default();
        let limits = canvas.zoom_limits;
        assert_eq!(limits.clamp(5.0), DEFAULT_MAX_ZOOM);
        assert_eq!(limits.clamp(0.01), DEFAULT_MIN_ZOOM);
        assert_eq!(limits.clamp(f64::NAN), 1.0);

        canvas.apply_viewport(ViewportPatch {
            x: Some(10.0),
            zoom: Some(9.0),
            ..Default::default()
        });
        assert_eq!(canvas.viewport.x, 10.0);
        assert_eq!(canvas.viewport.y, 0.0);
        assert_eq!(canvas.viewport.zoom, DEFAULT_MAX_ZOOM);
    }

    #[test]
    fn test_inverted_zoom_limits_do_not_panic() {
        let inverted = ZoomLimits {
            min: 2.0,
            max: 1.0,
            step: 0.1,
        };
        assert_eq!(inverted.clamp(1.5), 1.0);

        let sanitized = inverted.sanitized();
        assert_eq!(sanitized, ZoomLimits::default());
        assert_eq!(sanitized.clamp(1.5), 1.5);

        let broken = ZoomLimits {
            min: f64::NAN,
            max: 3.0,
            step: -1.0,
        };
        assert_eq!(broken.clamp(10.0), 3.0);
        assert_eq!(broken.sanitized(), ZoomLimits::default());

        let custom = ZoomLimits {
            min: 0.25,
            max: 4.0,
            step: 0.5,
        };
        assert_eq!(custom.sanitized(), custom);
    }

    #[test]
    fn test_grid_patch_and_snap() {
        let mut canvas = CanvasState::default();
        assert_eq!(canvas.snap(Position::new(13.0, 27.0)), Position::new(13.0, 27.0));

        GridPatch {
            snap: Some(true),
            size: Some(10.0),
            ..Default::default()
        }
        .apply(&mut canvas.grid);
        assert!(canvas.grid.visible);
        assert_eq!(canvas.snap(Position::new(13.0, 27.0)), Position::new(10.0, 30.0));
    }

    #[test]
    fn test_modes_and_theme() {
        assert!(EditorMode::Edit.is_editable());
        assert!(!EditorMode::View.is_editable());
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(serde_json::to_string(&EditorMode::Fixed).unwrap(), "\"fixed\"");
    }
}
