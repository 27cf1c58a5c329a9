//! Canvas2D renderer for editor draw lists.
//!
//! Grid and menu commands are screen-space; everything else is drawn under
//! the viewport transform.

use ng_core::field::Widget;
use ng_core::geometry::{BezierPath, Point, Rect};
use ng_core::port::PortDirection;
use ng_editor::Viewport;
use ng_editor::menu::{ITEM_HEIGHT, ITEM_WIDTH};
use ng_render::{DrawCmd, GridStyle, MenuView};
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

/// Theme-dependent colors for the canvas renderer.
pub struct CanvasTheme {
    pub bg: &'static str,
    pub grid: &'static str,
    pub node_bg: &'static str,
    pub node_header: &'static str,
    pub node_border: &'static str,
    pub node_text: &'static str,
    pub control_bg: &'static str,
    pub wire: &'static str,
    pub port: &'static str,
    pub accent: &'static str,
    pub menu_bg: &'static str,
    pub menu_text: &'static str,
    pub menu_hint: &'static str,
}

impl CanvasTheme {
    pub fn light() -> Self {
        Self {
            bg: "#F5F5F7",
            grid: "rgba(0, 0, 0, 0.08)",
            node_bg: "#FFFFFF",
            node_header: "#E8E8ED",
            node_border: "#C7C7CC",
            node_text: "#1D1D1F",
            control_bg: "#F2F2F7",
            wire: "#8E8E93",
            port: "#636366",
            accent: "#4FC3F7",
            menu_bg: "#FFFFFF",
            menu_text: "#1D1D1F",
            menu_hint: "#86868B",
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: "#1C1C1E",
            grid: "rgba(255, 255, 255, 0.06)",
            node_bg: "#2C2C2E",
            node_header: "#3A3A3C",
            node_border: "#48484A",
            node_text: "#F5F5F7",
            control_bg: "#1C1C1E",
            wire: "#98989D",
            port: "#AEAEB2",
            accent: "#4FC3F7",
            menu_bg: "#2C2C2E",
            menu_text: "#F5F5F7",
            menu_hint: "#98989D",
        }
    }
}

/// Paint a full frame.
pub fn render_scene(
    ctx: &CanvasRenderingContext2d,
    cmds: &[DrawCmd],
    viewport: Viewport,
    canvas_width: f64,
    canvas_height: f64,
    theme: &CanvasTheme,
) {
    screen_space(ctx);
    ctx.set_fill_style_str(theme.bg);
    ctx.fill_rect(0.0, 0.0, canvas_width, canvas_height);

    for cmd in cmds {
        match cmd {
            DrawCmd::Grid(grid) => {
                screen_space(ctx);
                draw_grid(ctx, grid, canvas_width, canvas_height, theme);
            }
            DrawCmd::Menu(menu) => {
                screen_space(ctx);
                draw_menu(ctx, menu, theme);
            }
            world => {
                world_space(ctx, viewport);
                draw_world(ctx, world, viewport.scale, theme);
            }
        }
    }
    screen_space(ctx);
}

fn screen_space(ctx: &CanvasRenderingContext2d) {
    let _ = ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0);
}

fn world_space(ctx: &CanvasRenderingContext2d, vp: Viewport) {
    let s = vp.scale as f64;
    let _ = ctx.set_transform(s, 0.0, 0.0, s, vp.tx as f64, vp.ty as f64);
}

fn draw_world(ctx: &CanvasRenderingContext2d, cmd: &DrawCmd, scale: f32, theme: &CanvasTheme) {
    // Hairlines stay one screen pixel wide at any zoom.
    let px = 1.0 / scale.max(f32::EPSILON) as f64;
    match cmd {
        DrawCmd::Wire { path, preview } => draw_wire(ctx, path, *preview, px, theme),
        DrawCmd::NodeBox {
            rect,
            title,
            header_height,
            active,
            disabled,
            ..
        } => draw_node_box(
            ctx,
            *rect,
            title,
            *header_height,
            *active,
            *disabled,
            px,
            theme,
        ),
        DrawCmd::FieldRow { rect, control, .. } => {
            draw_field_row(ctx, *rect, &control.label, control.inline, &control.widget, theme)
        }
        DrawCmd::Port {
            port,
            center,
            radius,
            connected,
        } => {
            ctx.begin_path();
            let _ = ctx.arc(
                center.x as f64,
                center.y as f64,
                *radius as f64,
                0.0,
                std::f64::consts::TAU,
            );
            ctx.set_fill_style_str(if *connected { theme.accent } else { theme.node_bg });
            ctx.fill();
            ctx.set_stroke_style_str(match port.direction {
                PortDirection::Input => theme.port,
                PortDirection::Output => theme.accent,
            });
            ctx.set_line_width(1.5 * px);
            ctx.stroke();
        }
        DrawCmd::SelectionBounds(r) => {
            ctx.save();
            ctx.set_stroke_style_str(theme.accent);
            ctx.set_line_width(px);
            dashed(ctx, 6.0 * px);
            ctx.stroke_rect(r.x as f64, r.y as f64, r.width as f64, r.height as f64);
            ctx.restore();
        }
        DrawCmd::Marquee(r) => draw_marquee_rect(ctx, *r, px),
        DrawCmd::Grid(_) | DrawCmd::Menu(_) => {}
    }
}

// ─── Drawing primitives ─────────────────────────────────────────────────

fn draw_grid(
    ctx: &CanvasRenderingContext2d,
    grid: &GridStyle,
    width: f64,
    height: f64,
    theme: &CanvasTheme,
) {
    let spacing = grid.size as f64;
    if spacing < 4.0 {
        return;
    }
    ctx.set_fill_style_str(theme.grid);
    let mut x = (grid.offset.x as f64).rem_euclid(spacing);
    while x < width {
        let mut y = (grid.offset.y as f64).rem_euclid(spacing);
        while y < height {
            ctx.fill_rect(x, y, 1.5, 1.5);
            y += spacing;
        }
        x += spacing;
    }
}

fn draw_wire(
    ctx: &CanvasRenderingContext2d,
    path: &BezierPath,
    preview: bool,
    px: f64,
    theme: &CanvasTheme,
) {
    ctx.save();
    ctx.begin_path();
    move_to(ctx, path.from);
    ctx.bezier_curve_to(
        path.c1.x as f64,
        path.c1.y as f64,
        path.c2.x as f64,
        path.c2.y as f64,
        path.to.x as f64,
        path.to.y as f64,
    );
    if preview {
        ctx.set_stroke_style_str(theme.accent);
        dashed(ctx, 5.0 * px);
    } else {
        ctx.set_stroke_style_str(theme.wire);
    }
    ctx.set_line_width(2.0 * px);
    ctx.stroke();
    ctx.restore();
}

#[allow(clippy::too_many_arguments)]
fn draw_node_box(
    ctx: &CanvasRenderingContext2d,
    r: Rect,
    title: &str,
    header_height: f32,
    active: bool,
    disabled: bool,
    px: f64,
    theme: &CanvasTheme,
) {
    let (x, y, w, h) = (r.x as f64, r.y as f64, r.width as f64, r.height as f64);
    let radius = 6.0;

    ctx.save();
    if disabled {
        ctx.set_global_alpha(0.4);
    }

    rounded_rect_path(ctx, x, y, w, h, radius);
    ctx.set_fill_style_str(theme.node_bg);
    ctx.fill();

    // Header band, clipped to the rounded box.
    ctx.save();
    rounded_rect_path(ctx, x, y, w, h, radius);
    ctx.clip();
    ctx.set_fill_style_str(theme.node_header);
    ctx.fill_rect(x, y, w, header_height as f64);
    ctx.restore();

    ctx.set_fill_style_str(theme.node_text);
    ctx.set_font("600 12px Inter, system-ui, sans-serif");
    ctx.set_text_baseline("middle");
    let _ = ctx.fill_text(title, x + 12.0, y + header_height as f64 / 2.0);

    rounded_rect_path(ctx, x, y, w, h, radius);
    if active {
        ctx.set_stroke_style_str(theme.accent);
        ctx.set_line_width(2.0 * px);
    } else {
        ctx.set_stroke_style_str(theme.node_border);
        ctx.set_line_width(px);
    }
    ctx.stroke();
    ctx.restore();
}

fn draw_field_row(
    ctx: &CanvasRenderingContext2d,
    r: Rect,
    label: &str,
    inline: bool,
    widget: &Widget,
    theme: &CanvasTheme,
) {
    let (x, y, w, h) = (r.x as f64, r.y as f64, r.width as f64, r.height as f64);
    let pad = 8.0;
    ctx.save();
    ctx.set_font("11px Inter, system-ui, sans-serif");
    ctx.set_text_baseline("middle");

    // Inline rows stack label over control; the rest put them side by side.
    let (control_x, control_y, control_w, control_h) = if matches!(widget, Widget::Button { .. })
    {
        (x + pad, y + 3.0, w - 2.0 * pad, h - 6.0)
    } else if inline {
        ctx.set_fill_style_str(theme.menu_hint);
        let _ = ctx.fill_text(label, x + pad, y + h * 0.25);
        (x + pad, y + h / 2.0, w - 2.0 * pad, h / 2.0 - 3.0)
    } else {
        ctx.set_fill_style_str(theme.menu_hint);
        let _ = ctx.fill_text(label, x + pad, y + h / 2.0);
        let half = w / 2.0;
        (x + half, y + 3.0, half - pad, h - 6.0)
    };

    rounded_rect_path(ctx, control_x, control_y, control_w, control_h, 3.0);
    ctx.set_fill_style_str(match widget {
        Widget::Button { .. } => theme.node_header,
        _ => theme.control_bg,
    });
    ctx.fill();

    if let Widget::Color { value } = widget {
        ctx.set_fill_style_str(value);
        ctx.fill_rect(control_x + 3.0, control_y + 3.0, control_h - 6.0, control_h - 6.0);
    }

    ctx.set_fill_style_str(theme.node_text);
    let text = widget.display_text();
    let text_x = if matches!(widget, Widget::Button { .. }) {
        ctx.set_text_align("center");
        control_x + control_w / 2.0
    } else {
        control_x + 6.0
    };
    let _ = ctx.fill_text(&text, text_x, control_y + control_h / 2.0);
    ctx.restore();
}

/// Draw the marquee (rubber-band) selection rectangle.
fn draw_marquee_rect(ctx: &CanvasRenderingContext2d, r: Rect, px: f64) {
    let (x, y, w, h) = (r.x as f64, r.y as f64, r.width as f64, r.height as f64);
    if w < px && h < px {
        return;
    }

    ctx.save();
    ctx.set_fill_style_str("rgba(79, 195, 247, 0.08)");
    ctx.fill_rect(x, y, w, h);
    ctx.set_stroke_style_str("#4FC3F7");
    ctx.set_line_width(px);
    dashed(ctx, 4.0 * px);
    ctx.stroke_rect(x, y, w, h);
    ctx.restore();
}

fn draw_menu(ctx: &CanvasRenderingContext2d, menu: &MenuView, theme: &CanvasTheme) {
    let (x, y) = (menu.origin.x as f64, menu.origin.y as f64);
    let (w, ih) = (ITEM_WIDTH as f64, ITEM_HEIGHT as f64);
    let h = ih * menu.items.len() as f64;

    ctx.save();
    ctx.set_shadow_color("rgba(0, 0, 0, 0.2)");
    ctx.set_shadow_blur(8.0);
    rounded_rect_path(ctx, x, y, w, h, 4.0);
    ctx.set_fill_style_str(theme.menu_bg);
    ctx.fill();
    ctx.set_shadow_color("transparent");

    ctx.set_font("12px Inter, system-ui, sans-serif");
    ctx.set_text_baseline("middle");
    for (i, (label, hint)) in menu.items.iter().enumerate() {
        let cy = y + ih * (i as f64 + 0.5);
        ctx.set_text_align("left");
        ctx.set_fill_style_str(theme.menu_text);
        let _ = ctx.fill_text(label, x + 10.0, cy);
        if let Some(hint) = hint {
            ctx.set_text_align("right");
            ctx.set_fill_style_str(theme.menu_hint);
            let _ = ctx.fill_text(hint, x + w - 10.0, cy);
        }
    }
    ctx.restore();
}

fn move_to(ctx: &CanvasRenderingContext2d, p: Point) {
    ctx.move_to(p.x as f64, p.y as f64);
}

fn dashed(ctx: &CanvasRenderingContext2d, dash: f64) {
    let _ = ctx.set_line_dash(&js_sys::Array::of2(
        &JsValue::from_f64(dash),
        &JsValue::from_f64(dash),
    ));
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0).max(0.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    ctx.arc_to(x + w, y, x + w, y + r, r).unwrap_or(());
    ctx.line_to(x + w, y + h - r);
    ctx.arc_to(x + w, y + h, x + w - r, y + h, r).unwrap_or(());
    ctx.line_to(x + r, y + h);
    ctx.arc_to(x, y + h, x, y + h - r, r).unwrap_or(());
    ctx.line_to(x, y + r);
    ctx.arc_to(x, y, x + r, y, r).unwrap_or(());
    ctx.close_path();
}
