//! Pointer gestures as explicit state objects.
//!
//! A gesture begins on pointer-down, receives every pointer-move, and ends
//! on pointer-up. The editor holds at most one [`Gesture`] at a time and
//! always returns to [`Gesture::Idle`] on pointer-up, so nothing outlives
//! the gesture that created it.

use crate::animation::Animator;
use crate::config::EditorConfig;
use crate::viewport::Viewport;
use ng_core::geometry::{Point, Rect, round_to_step};
use ng_core::{NodeGraph, NodeId};
use smallvec::SmallVec;

#[derive(Debug, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Pan(PanGesture),
    /// Dragging the node under the pointer.
    NodeDrag(MoveGesture),
    /// Dragging the selection's bounding box.
    BoundsDrag(MoveGesture),
    RectSelect(RectSelect),
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}

// ─── Pan ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct PanGesture {
    last: Point,
}

impl PanGesture {
    pub fn start(screen: Point) -> Self {
        Self { last: screen }
    }

    /// Add the raw screen delta since the previous move to the translation.
    pub fn update(&mut self, screen: Point, viewport: &mut Viewport) {
        viewport.pan_by(screen.x - self.last.x, screen.y - self.last.y);
        self.last = screen;
    }
}

// ─── Move (node drag / bounds drag) ──────────────────────────────────────

/// Translates a set of nodes by the pointer's world delta. Each node eases
/// independently toward its own start position plus that delta.
#[derive(Debug)]
pub struct MoveGesture {
    anchor: Point,
    anchor_screen: Point,
    origins: SmallVec<[(NodeId, Point); 4]>,
    moved: bool,
}

impl MoveGesture {
    pub fn start(graph: &NodeGraph, ids: &[NodeId], world: Point, screen: Point) -> Self {
        let origins = ids
            .iter()
            .filter_map(|id| graph.node(*id).map(|n| (*id, n.wish_pos)))
            .collect();
        Self {
            anchor: world,
            anchor_screen: screen,
            origins,
            moved: false,
        }
    }

    pub fn update(
        &mut self,
        world: Point,
        screen: Point,
        graph: &mut NodeGraph,
        animator: &mut Animator,
        config: &EditorConfig,
    ) {
        if !self.moved && distance(screen, self.anchor_screen) < config.drag_threshold {
            return;
        }
        self.moved = true;
        let (dx, dy) = (world.x - self.anchor.x, world.y - self.anchor.y);
        for (id, origin) in &self.origins {
            let mut wish = origin.offset(dx, dy);
            if config.snap_to_grid {
                wish = Point::new(
                    round_to_step(wish.x, config.grid_size),
                    round_to_step(wish.y, config.grid_size),
                );
            }
            let Some(node) = graph.node_mut(*id) else {
                continue;
            };
            node.wish_pos = wish;
            animator.register(graph, *id);
        }
    }

    /// Whether the pointer travelled far enough to count as a drag.
    pub fn moved(&self) -> bool {
        self.moved
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.origins.iter().map(|(id, _)| *id)
    }
}

// ─── Rectangle select ────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RectSelect {
    anchor: Point,
    current: Point,
    threshold: f32,
}

impl RectSelect {
    pub fn start(screen: Point, threshold: f32) -> Self {
        Self {
            anchor: screen,
            current: screen,
            threshold,
        }
    }

    pub fn update(&mut self, screen: Point) {
        self.current = screen;
    }

    /// The rubber band in screen space.
    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.anchor, self.current)
    }

    pub fn moved(&self) -> bool {
        distance(self.anchor, self.current) >= self.threshold
    }
}

fn distance(a: Point, b: Point) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}
