//! Geometry primitives shared by the model, the renderer, and the editor.
//!
//! All coordinates are `f32`. World space is the graph's own coordinate
//! system; screen space is world space after the editor's pan/zoom.

use serde::{Deserialize, Serialize};

/// Horizontal control-point offset for connection curves.
pub const BEZIER_STRENGTH: f32 = 100.0;

/// Linear interpolation from `start` toward `end` by `t`.
pub fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start + (end - start) * t
}

/// Round `val` to the nearest multiple of `step`.
pub fn round_to_step(val: f32, step: f32) -> f32 {
    if step <= 0.0 {
        return val;
    }
    (val / step).round() * step
}

/// Clamp `val` into `[min, max]`.
pub fn clamp(val: f32, min: f32, max: f32) -> f32 {
    min.max(val.min(max))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalize a drag rectangle spanned by two corner points.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// True when `other` lies entirely inside `self` (edges may touch).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.right() <= self.right()
            && other.y >= self.y
            && other.bottom() <= self.bottom()
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Grow by `pad` on every side.
    pub fn inflate(&self, pad: f32) -> Rect {
        Rect::new(
            self.x - pad,
            self.y - pad,
            self.width + pad * 2.0,
            self.height + pad * 2.0,
        )
    }

    /// Union of all rectangles, or `None` for an empty iterator.
    pub fn union_all(rects: impl IntoIterator<Item = Rect>) -> Option<Rect> {
        rects.into_iter().reduce(|acc, r| acc.union(&r))
    }
}

/// A cubic bezier wire between two port centers.
///
/// Control points sit `BEZIER_STRENGTH` units to the right of the source and
/// to the left of the target, so the wire always leaves and enters
/// horizontally.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BezierPath {
    pub from: Point,
    pub c1: Point,
    pub c2: Point,
    pub to: Point,
}

impl BezierPath {
    pub fn between(from: Point, to: Point) -> Self {
        Self {
            from,
            c1: from.offset(BEZIER_STRENGTH, 0.0),
            c2: to.offset(-BEZIER_STRENGTH, 0.0),
            to,
        }
    }

    /// SVG path data for a `<path d="...">` element.
    pub fn to_svg_d(&self) -> String {
        format!(
            "M {} {} C {} {}, {} {}, {} {}",
            self.from.x, self.from.y, self.c1.x, self.c1.y, self.c2.x, self.c2.y, self.to.x, self.to.y
        )
    }
}
