pub mod hit;
pub mod scene;

pub use hit::{HitTarget, hit_test, hit_test_rect};
pub use scene::{DrawCmd, DrawList, GridStyle, MenuView, SceneState, build_scene};
