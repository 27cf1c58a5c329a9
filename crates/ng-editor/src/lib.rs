pub mod animation;
pub mod clipboard;
pub mod config;
pub mod connect;
pub mod editor;
pub mod gesture;
pub mod input;
pub mod menu;
pub mod selection;
pub mod shortcuts;
pub mod viewport;

pub use config::EditorConfig;
pub use connect::ConnectState;
pub use editor::{Editor, EditorEvent, Response};
pub use input::{InputEvent, Modifiers, PointerButton};
pub use menu::{MenuAction, MenuTarget};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use viewport::Viewport;
