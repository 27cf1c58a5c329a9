//! Editor configuration.
//!
//! Every field has a default, so a host may pass a partial JSON object.

use crate::input::PointerButton;
use ng_core::layout::NodeMetrics;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Grid cell size in world units; also the snap step.
    pub grid_size: f32,
    /// Zoom multiplier per wheel notch.
    pub scale_factor: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub snap_to_grid: bool,
    /// Margin around the union of selected nodes.
    pub selection_padding: f32,
    /// Button that pans when pressed on the background.
    pub pan_button: PointerButton,
    /// Type tag given to nodes created from the context menu.
    pub default_node_type: String,
    /// Fraction of the remaining distance covered per animation frame.
    pub ease_factor: f32,
    /// Distance at which an easing node counts as settled.
    pub settle_epsilon: f32,
    /// Wire hit distance in screen pixels.
    pub wire_hit_tolerance: f32,
    /// Screen distance a press must travel before it counts as a drag.
    pub drag_threshold: f32,
    pub metrics: NodeMetrics,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 20.0,
            scale_factor: 1.2,
            min_scale: 0.2,
            max_scale: 3.0,
            snap_to_grid: true,
            selection_padding: 10.0,
            pan_button: PointerButton::Middle,
            default_node_type: "node".to_string(),
            ease_factor: 0.2,
            settle_epsilon: 0.5,
            wire_hit_tolerance: 6.0,
            drag_threshold: 2.0,
            metrics: NodeMetrics::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON object.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
