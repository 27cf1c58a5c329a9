//! Node box layout.
//!
//! Node geometry is derived, never stored: a node's rectangle follows from
//! its position, its field rows, and the metrics below. Ports sit on the
//! left and right edges at the header's vertical center.

use crate::geometry::{Point, Rect};
use crate::model::Node;
use crate::port::PortDirection;
use serde::{Deserialize, Serialize};

/// Sizes used to lay out a node box, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeMetrics {
    pub width: f32,
    pub header_height: f32,
    /// Row height for a field laid out label-beside-control.
    pub row_height: f32,
    /// Row height for an inline field (label above control).
    pub inline_row_height: f32,
    /// Bottom padding below the last row.
    pub padding: f32,
    pub port_radius: f32,
}

impl Default for NodeMetrics {
    fn default() -> Self {
        Self {
            width: 180.0,
            header_height: 28.0,
            row_height: 26.0,
            inline_row_height: 44.0,
            padding: 8.0,
            port_radius: 6.0,
        }
    }
}

impl NodeMetrics {
    /// Width and height of a node's box.
    pub fn size(&self, node: &Node) -> (f32, f32) {
        let rows: f32 = node.fields().iter().map(|f| self.row_height_for(f.inline())).sum();
        let padding = if node.fields().is_empty() { 0.0 } else { self.padding };
        (self.width, self.header_height + rows + padding)
    }

    /// World-space rectangle at the node's current position.
    pub fn bounds(&self, node: &Node) -> Rect {
        let (w, h) = self.size(node);
        Rect::new(node.x, node.y, w, h)
    }

    /// World-space center of a port.
    pub fn port_center(&self, node: &Node, direction: PortDirection) -> Point {
        let y = node.y + self.header_height / 2.0;
        match direction {
            PortDirection::Input => Point::new(node.x, y),
            PortDirection::Output => Point::new(node.x + self.width, y),
        }
    }

    /// Rectangles of each field row, in field order.
    pub fn field_rows(&self, node: &Node) -> Vec<Rect> {
        let mut y = node.y + self.header_height;
        node.fields()
            .iter()
            .map(|f| {
                let h = self.row_height_for(f.inline());
                let row = Rect::new(node.x, y, self.width, h);
                y += h;
                row
            })
            .collect()
    }

    fn row_height_for(&self, inline: bool) -> f32 {
        if inline {
            self.inline_row_height
        } else {
            self.row_height
        }
    }
}
