use quest_core::Puzzle;
use tangram_core::{Point, TangramSession, Violation};
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

use crate::constants::{ACCENT, BACKGROUND, GRID, GRID_STEP, OUTLINE, OUTLINE_WIDTH, TEXT};
use crate::state::State;

// Non-deprecated helpers to set canvas styles via property assignment.
pub fn set_fill_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("fillStyle"),
        &JsValue::from_str(color),
    );
}

pub fn set_stroke_style(ctx: &CanvasRenderingContext2d, color: &str) {
    let _ = js_sys::Reflect::set(
        ctx.as_ref(),
        &JsValue::from_str("strokeStyle"),
        &JsValue::from_str(color),
    );
}

fn trace(ctx: &CanvasRenderingContext2d, pts: &[Point]) -> bool {
    let Some((first, rest)) = pts.split_first() else {
        return false;
    };
    ctx.begin_path();
    ctx.move_to(first.x, first.y);
    for p in rest {
        ctx.line_to(p.x, p.y);
    }
    ctx.close_path();
    true
}

fn fill_polygon(ctx: &CanvasRenderingContext2d, pts: &[Point], color: &str) {
    if trace(ctx, pts) {
        set_fill_style(ctx, color);
        ctx.fill();
    }
}

fn draw_grid(ctx: &CanvasRenderingContext2d, w: f64, h: f64) {
    set_stroke_style(ctx, GRID);
    ctx.set_line_width(1.0);
    ctx.begin_path();
    let mut x = 0.0;
    while x <= w {
        ctx.move_to(x, 0.0);
        ctx.line_to(x, h);
        x += GRID_STEP;
    }
    let mut y = 0.0;
    while y <= h {
        ctx.move_to(0.0, y);
        ctx.line_to(w, y);
        y += GRID_STEP;
    }
    ctx.stroke();
}

fn draw_tangram(ctx: &CanvasRenderingContext2d, board: &TangramSession) {
    let scale = board.scale();
    let target = board.target();
    fill_polygon(ctx, &target.real_vertices(scale), &target.colour);

    for piece in board.pieces() {
        fill_polygon(ctx, &piece.real_vertices(scale), &piece.colour);
    }
    if let Some(i) = board.selected()
        && let Some(piece) = board.pieces().get(i)
        && trace(ctx, &piece.real_vertices(scale))
    {
        set_stroke_style(ctx, OUTLINE);
        ctx.set_line_width(OUTLINE_WIDTH);
        ctx.stroke();
    }

    if board.is_solved() {
        let c = board.layout().target_center;
        set_fill_style(ctx, ACCENT);
        ctx.set_font(&format!("bold {}px monospace", (28.0 * scale).round().max(12.0)));
        ctx.set_text_align("center");
        let _ = ctx.fill_text("ACCESS GRANTED", c.x, c.y);
    }
}

/// One line per layout problem, for the debug overlay.
pub fn describe(v: &Violation, board: &TangramSession) -> String {
    let name = |i: usize| {
        board
            .pieces()
            .get(i)
            .map(|p| p.shape_id.as_str())
            .unwrap_or("?")
    };
    match *v {
        Violation::Outside(i) => format!("{} sticks out of the silhouette", name(i)),
        Violation::Overlaps(i, j) => format!("{} overlaps {}", name(i), name(j)),
    }
}

pub fn draw(state: &State) {
    let ctx = &state.ctx;
    let w = state.canvas.width() as f64;
    let h = state.canvas.height() as f64;
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
    set_fill_style(ctx, BACKGROUND);
    ctx.fill_rect(0.0, 0.0, w, h);
    draw_grid(ctx, w, h);

    if let Some(quest) = &state.quest
        && let Some(Puzzle::Tangram(board)) = quest.puzzle()
    {
        draw_tangram(ctx, board);
    }

    if !state.status.is_empty() {
        set_fill_style(ctx, TEXT);
        ctx.set_font("14px monospace");
        ctx.set_text_align("left");
        let _ = ctx.fill_text(&state.status, 12.0, h - 12.0);
    }
}
