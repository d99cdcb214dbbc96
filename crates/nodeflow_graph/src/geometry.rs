// SPDX-License-Identifier: MIT OR Apache-2.0
//! Geometry: curve paths, port anchors, grid snapping.
//!
//! Everything here is a pure function of the data model. Paths are emitted as
//! SVG path strings so any renderer can consume them.

use crate::connection::ReroutePoint;
use crate::node::Node;
use crate::port::PortDirection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Node width used when no measured width is available
pub const DEFAULT_NODE_WIDTH: f64 = 150.0;
/// Node height used when no measured height is available
pub const DEFAULT_NODE_HEIGHT: f64 = 80.0;
/// Diameter of a rendered port dot
pub const PORT_DOT_SIZE: f64 = 12.0;
/// Gap between neighbouring port dots in vertical layout
pub const PORT_GAP: f64 = 8.0;
/// Distance of the port row from the node edge in vertical layout
const PORT_ROW_OFFSET: f64 = 12.0;

/// Default bezier curvature for new connections
pub const DEFAULT_CURVATURE: f64 = 0.5;

/// A point in world (or screen) coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

impl Position {
    /// Create a new position
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Scale both axes
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl Add for Position {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Flow direction of the graph layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    /// Left to right
    #[default]
    Horizontal,
    /// Top to bottom
    Vertical,
}

/// Rendered size of a node in world units
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeDimensions {
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl NodeDimensions {
    /// Create new dimensions
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for NodeDimensions {
    fn default() -> Self {
        Self::new(DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT)
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Top-left corner
    pub min: Position,
    /// Bottom-right corner
    pub max: Position,
}

impl Rect {
    /// Build a normalized rectangle from two arbitrary corners
    pub fn from_corners(a: Position, b: Position) -> Self {
        Self {
            min: Position::new(a.x.min(b.x), a.y.min(b.y)),
            max: Position::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Build a rectangle from its origin and size
    pub fn from_origin_size(origin: Position, size: NodeDimensions) -> Self {
        Self {
            min: origin,
            max: Position::new(origin.x + size.width, origin.y + size.height),
        }
    }

    /// Width
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Whether the two rectangles overlap (touching edges do not count)
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    /// Whether a point lies inside (edges included)
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// Path number formatting: shortest round-trip form, negative zero as `0`
struct Coord(f64);

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0.0 {
            f.write_str("0")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

fn fmt_point(p: Position) -> String {
    format!("{} {}", Coord(p.x), Coord(p.y))
}

fn cubic_segment(c1: Position, c2: Position, end: Position) -> String {
    format!(" C {}, {}, {}", fmt_point(c1), fmt_point(c2), fmt_point(end))
}

/// Control point offset along the dominant axis of the layout
fn axis_offset(from: Position, to: Position, curvature: f64, direction: LayoutDirection) -> Position {
    match direction {
        LayoutDirection::Horizontal => Position::new((to.x - from.x) * curvature, 0.0),
        LayoutDirection::Vertical => Position::new(0.0, (to.y - from.y) * curvature),
    }
}

/// Calculate the SVG path of a connection.
///
/// Without reroute points this is a single cubic bezier whose control points
/// are pulled along the layout axis by `curvature * delta`. With reroute
/// points the path passes through every waypoint: the first and last segments
/// are curved, the ones in between are straight.
pub fn calculate_bezier_path(
    start: Position,
    end: Position,
    curvature: f64,
    reroute_points: &[ReroutePoint],
    direction: LayoutDirection,
) -> String {
    if !reroute_points.is_empty() {
        let points: Vec<Position> = std::iter::once(start)
            .chain(reroute_points.iter().map(|p| p.position))
            .chain(std::iter::once(end))
            .collect();
        return build_path_with_reroute_points(&points, curvature, direction);
    }

    let offset = axis_offset(start, end, curvature, direction);
    format!("M {}{}", fmt_point(start), cubic_segment(start + offset, end - offset, end))
}

fn build_path_with_reroute_points(
    points: &[Position],
    curvature: f64,
    direction: LayoutDirection,
) -> String {
    if points.len() < 2 {
        return String::new();
    }

    let mut path = format!("M {}", fmt_point(points[0]));
    let last_segment = points.len() - 2;

    for (i, pair) in points.windows(2).enumerate() {
        let (current, next) = (pair[0], pair[1]);
        let offset = axis_offset(current, next, curvature, direction);
        let segment = match (i == 0, i == last_segment) {
            (true, true) => cubic_segment(current + offset, next - offset, next),
            (true, false) => cubic_segment(current + offset, next, next),
            (false, true) => cubic_segment(current, next - offset, next),
            (false, false) => format!(" L {}", fmt_point(next)),
        };
        path.push_str(&segment);
    }

    path
}

/// Euclidean distance between two points
pub fn distance(a: Position, b: Position) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Round both axes to the nearest multiple of `grid_size`
pub fn snap_to_grid(position: Position, grid_size: f64, enabled: bool) -> Position {
    if !enabled || grid_size <= 0.0 {
        return position;
    }

    Position::new(
        (position.x / grid_size).round() * grid_size,
        (position.y / grid_size).round() * grid_size,
    )
}

/// Anchor of a port relative to the node's top-left corner.
///
/// `dims` should be the measured node size in world units; the default
/// 150x80 box is used otherwise. An unknown port resolves to the node centre.
pub fn get_port_position_relative<D>(
    node: &Node<D>,
    port_id: &str,
    port_direction: PortDirection,
    direction: LayoutDirection,
    dims: Option<NodeDimensions>,
) -> Position {
    let ports = match port_direction {
        PortDirection::Input => &node.inputs,
        PortDirection::Output => &node.outputs,
    };
    let NodeDimensions { width, height } = dims.unwrap_or_default();

    let Some(index) = ports.get_index_of(port_id) else {
        return Position::new(width / 2.0, height / 2.0);
    };
    let count = ports.len() as f64;
    let index = index as f64;

    match direction {
        LayoutDirection::Horizontal => {
            let spacing = height / (count + 1.0);
            let x = match port_direction {
                PortDirection::Input => 0.0,
                PortDirection::Output => width,
            };
            Position::new(x, spacing * (index + 1.0))
        }
        LayoutDirection::Vertical => {
            let center_x = width / 2.0;
            let x = if ports.len() == 1 {
                center_x
            } else {
                let row_width = PORT_DOT_SIZE * count + PORT_GAP * (count - 1.0);
                let row_left = center_x - row_width / 2.0;
                row_left + PORT_DOT_SIZE / 2.0 + index * (PORT_DOT_SIZE + PORT_GAP)
            };
            let y = match port_direction {
                PortDirection::Input => -PORT_ROW_OFFSET + PORT_DOT_SIZE / 2.0,
                PortDirection::Output => height + PORT_ROW_OFFSET - PORT_DOT_SIZE / 2.0,
            };
            Position::new(x, y)
        }
    }
}

/// Anchor of a port in world coordinates
pub fn port_position_absolute<D>(
    node: &Node<D>,
    port_id: &str,
    port_direction: PortDirection,
    direction: LayoutDirection,
    dims: Option<NodeDimensions>,
) -> Position {
    node.position + get_port_position_relative(node, port_id, port_direction, direction, dims)
}

/// World-space bounding box of a node
pub fn node_rect<D>(node: &Node<D>, dims: Option<NodeDimensions>) -> Rect {
    Rect::from_origin_size(node.position, dims.unwrap_or_default())
}
