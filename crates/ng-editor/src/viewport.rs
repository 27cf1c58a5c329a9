//! Pan/zoom transform between screen pixels and world units.
//!
//! `screen = world * scale + t`.

use crate::config::EditorConfig;
use ng_core::geometry::{Point, Rect, clamp};
use ng_core::record::ViewportRecord;
use ng_render::GridStyle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub tx: f32,
    pub ty: f32,
    pub scale: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            tx: 0.0,
            ty: 0.0,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new((p.x - self.tx) / self.scale, (p.y - self.ty) / self.scale)
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.tx, p.y * self.scale + self.ty)
    }

    pub fn screen_rect_to_world(&self, r: Rect) -> Rect {
        let a = self.screen_to_world(Point::new(r.x, r.y));
        Rect::new(a.x, a.y, r.width / self.scale, r.height / self.scale)
    }

    /// Zoom one step toward (negative `delta_y`) or away from the viewer,
    /// keeping the world point under `pivot` fixed on screen.
    ///
    /// The new scale is clamped to the configured range and rounded to two
    /// decimals. Returns `false` when the scale did not change.
    pub fn zoom_at(&mut self, pivot: Point, delta_y: f32, config: &EditorConfig) -> bool {
        let prev = self.scale;
        let raw = if delta_y < 0.0 {
            prev * config.scale_factor
        } else {
            prev / config.scale_factor
        };
        self.scale = (clamp(raw, config.min_scale, config.max_scale) * 100.0).round() / 100.0;
        if self.scale == prev {
            return false;
        }
        let ratio = self.scale / prev;
        self.tx -= (pivot.x - self.tx) * (ratio - 1.0);
        self.ty -= (pivot.y - self.ty) * (ratio - 1.0);
        log::trace!("zoom {prev} -> {} at ({}, {})", self.scale, pivot.x, pivot.y);
        true
    }

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.tx += dx;
        self.ty += dy;
    }

    /// Background grid cell size and offset for the current transform.
    pub fn grid(&self, grid_size: f32) -> GridStyle {
        let size = grid_size * self.scale;
        GridStyle {
            size,
            offset: Point::new(self.tx + size / 2.0, self.ty + size / 2.0),
        }
    }

    pub fn to_record(&self) -> ViewportRecord {
        ViewportRecord {
            scale: self.scale,
            tx: self.tx,
            ty: self.ty,
        }
    }

    /// Restore from a record, clamping the scale into the configured range.
    pub fn from_record(rec: &ViewportRecord, config: &EditorConfig) -> Self {
        let scale = if rec.scale.is_finite() && rec.scale > 0.0 {
            clamp(rec.scale, config.min_scale, config.max_scale)
        } else {
            1.0
        };
        Self {
            tx: rec.tx,
            ty: rec.ty,
            scale,
        }
    }
}
