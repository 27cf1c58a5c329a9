//! Right-click context menu.
//!
//! Items depend on what was right-clicked: "Add Node" is always offered,
//! "Delete" only on a node. Opening a menu replaces any open one.

use ng_core::NodeId;
use ng_core::geometry::{Point, Rect};
use ng_render::MenuView;

/// Item box size in screen pixels, for canvas hosts that draw the menu.
pub const ITEM_WIDTH: f32 = 160.0;
pub const ITEM_HEIGHT: f32 = 24.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    AddNode,
    Delete,
}

impl MenuAction {
    pub fn label(self) -> &'static str {
        match self {
            MenuAction::AddNode => "Add Node",
            MenuAction::Delete => "Delete",
        }
    }

    pub fn shortcut(self) -> Option<&'static str> {
        match self {
            MenuAction::AddNode => None,
            MenuAction::Delete => Some("del"),
        }
    }

    /// Whether the item is offered for a menu opened over `target`.
    fn offered_for(self, target: MenuTarget) -> bool {
        match self {
            MenuAction::AddNode => true,
            MenuAction::Delete => matches!(target, MenuTarget::Node(_)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuTarget {
    Background,
    Node(NodeId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenMenu {
    /// Top-left corner in screen space.
    pub origin: Point,
    /// World position that was right-clicked.
    pub world: Point,
    pub target: MenuTarget,
    pub items: Vec<MenuAction>,
}

impl OpenMenu {
    fn item_rect(&self, index: usize) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y + index as f32 * ITEM_HEIGHT,
            ITEM_WIDTH,
            ITEM_HEIGHT,
        )
    }
}

#[derive(Debug, Default)]
pub struct ContextMenu {
    open: Option<OpenMenu>,
}

impl ContextMenu {
    pub fn open(&mut self, origin: Point, world: Point, target: MenuTarget) -> &OpenMenu {
        let items = [MenuAction::AddNode, MenuAction::Delete]
            .into_iter()
            .filter(|a| a.offered_for(target))
            .collect();
        self.open.insert(OpenMenu {
            origin,
            world,
            target,
            items,
        })
    }

    pub fn close(&mut self) -> bool {
        self.open.take().is_some()
    }

    pub fn current(&self) -> Option<&OpenMenu> {
        self.open.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// The item drawn at screen position `p`, if the menu is open.
    pub fn item_at(&self, p: Point) -> Option<MenuAction> {
        let menu = self.open.as_ref()?;
        menu.items
            .iter()
            .enumerate()
            .find(|(i, _)| menu.item_rect(*i).contains(p))
            .map(|(_, a)| *a)
    }

    pub fn view(&self) -> Option<MenuView> {
        let menu = self.open.as_ref()?;
        Some(MenuView {
            origin: menu.origin,
            items: menu
                .items
                .iter()
                .map(|a| (a.label().to_string(), a.shortcut().map(str::to_string)))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn items_depend_on_target() {
        let mut menu = ContextMenu::default();
        let bg = menu.open(Point::ZERO, Point::ZERO, MenuTarget::Background);
        assert_eq!(bg.items, vec![MenuAction::AddNode]);
        let on_node = menu.open(Point::ZERO, Point::ZERO, MenuTarget::Node(NodeId::from_raw(3)));
        assert_eq!(on_node.items, vec![MenuAction::AddNode, MenuAction::Delete]);
    }

    #[test]
    fn item_hit_testing() {
        let mut menu = ContextMenu::default();
        menu.open(
            Point::new(100.0, 100.0),
            Point::ZERO,
            MenuTarget::Node(NodeId::from_raw(1)),
        );
        assert_eq!(menu.item_at(Point::new(110.0, 110.0)), Some(MenuAction::AddNode));
        assert_eq!(menu.item_at(Point::new(110.0, 130.0)), Some(MenuAction::Delete));
        assert_eq!(menu.item_at(Point::new(110.0, 160.0)), None);
        let view = menu.view().unwrap();
        assert_eq!(view.items[1], ("Delete".to_string(), Some("del".to_string())));
        assert!(menu.is_open());
        assert!(menu.close());
        assert!(!menu.close());
        assert!(!menu.is_open());
        assert_eq!(menu.item_at(Point::new(110.0, 110.0)), None);
    }
}
