//! Interactive tangram board: selection, dragging, snapping and the
//! victory check, driven by pointer and button events.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::collision::{Overlap, collide_poly_poly, polygon_inside};
use crate::constants::{
    BOARD_HEIGHT, BOARD_WIDTH, SNAP_TOLERANCE, SOLUTION_ANSWER, VICTORY_SCALE,
};
use crate::error::TangramError;
use crate::geometry::Point;
use crate::piece::Piece;
use crate::shapes::ShapesCatalog;

/// Axis aligned rectangle in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Where things go on the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Playable area; piece origins are mapped proportionally when it changes.
    pub area: Rect,
    pub scale: f64,
    pub target_center: Point,
    pub tray: Rect,
}

impl Layout {
    /// Split `area` into a target half and a tray half.
    ///
    /// Landscape areas put the target on the left, portrait ones on top.
    pub fn fit(area: Rect) -> Layout {
        if area.w >= area.h {
            Layout {
                area,
                scale: (area.h * 0.8 / BOARD_HEIGHT).min(area.w * 0.4 / BOARD_WIDTH),
                target_center: Point::new(area.x + area.w / 4.0, area.y + area.h / 2.0),
                tray: Rect::new(area.x + area.w / 2.0, area.y, area.w / 2.0, area.h),
            }
        } else {
            Layout {
                area,
                scale: (area.h * 0.4 / BOARD_HEIGHT).min(area.w * 0.8 / BOARD_WIDTH),
                target_center: Point::new(area.x + area.w / 2.0, area.y + area.h / 4.0),
                tray: Rect::new(area.x, area.y + area.h / 2.0, area.w, area.h / 2.0),
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Idle,
    Selected,
    Dragging,
    Solved,
}

/// Emitted once when a release completes the silhouette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Victory {
    pub answer: &'static str,
}

/// Why a layout is not (yet) a solution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    /// Piece `i` has a vertex outside the target.
    Outside(usize),
    /// Pieces `i` and `j` (`i < j`) overlap.
    Overlaps(usize, usize),
}

#[derive(Clone, Copy, Debug)]
struct Press {
    offset: Point,
    moved: bool,
    /// The press that selected the piece; releasing it must not rotate.
    fresh: bool,
}

#[derive(Clone, Debug)]
pub struct TangramSession {
    catalog: ShapesCatalog,
    layout: Layout,
    target: Piece,
    pieces: Vec<Piece>,
    selected: Option<usize>,
    press: Option<Press>,
    phase: SessionPhase,
    victory_announced: bool,
}

impl TangramSession {
    pub fn new(catalog: ShapesCatalog, layout: Layout) -> Self {
        let target = Piece::centered(&catalog.target, layout.target_center, layout.scale);
        let pieces = Self::tray_pieces(&catalog, &layout);
        TangramSession {
            catalog,
            layout,
            target,
            pieces,
            selected: None,
            press: None,
            phase: SessionPhase::Idle,
            victory_announced: false,
        }
    }

    fn tray_pieces(catalog: &ShapesCatalog, layout: &Layout) -> Vec<Piece> {
        let c = layout.tray.center();
        catalog
            .pieces
            .iter()
            .map(|def| {
                let home = def.home_offset();
                let at = Point::new(c.x + home.x * layout.scale, c.y + home.y * layout.scale);
                Piece::centered(def, at, layout.scale)
            })
            .collect()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn scale(&self) -> f64 {
        self.layout.scale
    }

    pub fn target(&self) -> &Piece {
        &self.target
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_solved(&self) -> bool {
        self.phase == SessionPhase::Solved
    }

    /// Put a piece at an exact pose, bypassing pointer interaction.
    pub fn place(&mut self, id: &str, origin: Point, rot: u8, flip: bool) -> Result<(), TangramError> {
        let i = self
            .catalog
            .position(id)
            .ok_or_else(|| TangramError::UnknownShape(id.to_string()))?;
        let piece = &mut self.pieces[i];
        piece.set_rotation(rot)?;
        piece.origin = origin;
        piece.flip = flip;
        Ok(())
    }

    fn hit_piece(&self, p: Point) -> Option<usize> {
        let scale = self.layout.scale;
        self.pieces.iter().position(|piece| piece.contains(p, scale))
    }

    fn select_at(&mut self, p: Point) {
        match self.hit_piece(p) {
            Some(i) => {
                debug!("selected {}", self.pieces[i].shape_id);
                self.selected = Some(i);
                self.phase = SessionPhase::Selected;
                self.press = Some(Press {
                    offset: self.offset_from(i, p),
                    moved: false,
                    fresh: true,
                });
            }
            None => {
                self.selected = None;
                self.phase = SessionPhase::Idle;
                self.press = None;
            }
        }
    }

    fn offset_from(&self, i: usize, p: Point) -> Point {
        let o = self.pieces[i].origin;
        Point::new(p.x - o.x, p.y - o.y)
    }

    pub fn pointer_down(&mut self, p: Point) {
        match self.phase {
            SessionPhase::Solved | SessionPhase::Dragging => {}
            SessionPhase::Idle => self.select_at(p),
            SessionPhase::Selected => {
                let Some(i) = self.selected else {
                    self.select_at(p);
                    return;
                };
                if self.pieces[i].contains(p, self.layout.scale) {
                    self.press = Some(Press {
                        offset: self.offset_from(i, p),
                        moved: false,
                        fresh: false,
                    });
                } else {
                    debug!("deselected {}", self.pieces[i].shape_id);
                    self.select_at(p);
                }
            }
        }
    }

    /// Drag the pressed piece. Victory is only evaluated on release.
    pub fn pointer_move(&mut self, p: Point) {
        if self.phase == SessionPhase::Solved {
            return;
        }
        let (Some(i), Some(press)) = (self.selected, self.press.as_mut()) else {
            return;
        };
        press.moved = true;
        self.pieces[i].origin = Point::new(p.x - press.offset.x, p.y - press.offset.y);
        self.phase = SessionPhase::Dragging;
    }

    pub fn pointer_up(&mut self) -> Option<Victory> {
        let press = self.press.take()?;
        match self.phase {
            SessionPhase::Dragging => {
                self.phase = SessionPhase::Selected;
                self.snap_to_corners();
                if self.check_victory() && !self.victory_announced {
                    self.victory_announced = true;
                    self.phase = SessionPhase::Solved;
                    self.selected = None;
                    info!("tangram solved");
                    return Some(Victory {
                        answer: SOLUTION_ANSWER,
                    });
                }
                None
            }
            SessionPhase::Selected if !press.moved && !press.fresh => {
                self.rotate_clockwise();
                None
            }
            _ => None,
        }
    }

    /// A press and release without movement.
    pub fn click(&mut self, p: Point) -> Option<Victory> {
        self.pointer_down(p);
        self.pointer_up()
    }

    fn selected_mut(&mut self) -> Option<&mut Piece> {
        if matches!(self.phase, SessionPhase::Solved | SessionPhase::Idle) {
            return None;
        }
        let i = self.selected?;
        self.pieces.get_mut(i)
    }

    pub fn rotate_clockwise(&mut self) {
        if let Some(piece) = self.selected_mut() {
            piece.rotate_clockwise();
            debug!("{} rot={}", piece.shape_id, piece.rot);
        }
    }

    pub fn rotate_anticlockwise(&mut self) {
        if let Some(piece) = self.selected_mut() {
            piece.rotate_anticlockwise();
            debug!("{} rot={}", piece.shape_id, piece.rot);
        }
    }

    pub fn flip(&mut self) {
        if let Some(piece) = self.selected_mut() {
            piece.toggle_flip();
            debug!("{} flip={}", piece.shape_id, piece.flip);
        }
    }

    /// Back to the starting layout; also leaves the solved state.
    pub fn reset(&mut self) {
        self.target = Piece::centered(&self.catalog.target, self.layout.target_center, self.layout.scale);
        self.pieces = Self::tray_pieces(&self.catalog, &self.layout);
        self.selected = None;
        self.press = None;
        self.phase = SessionPhase::Idle;
        self.victory_announced = false;
        debug!("tangram reset");
    }

    pub fn resize(&mut self, layout: Layout) {
        let (old_w, old_h) = (self.layout.area.w, self.layout.area.h);
        for piece in &mut self.pieces {
            if old_w > 0.0 {
                piece.origin.x = piece.origin.x / old_w * layout.area.w;
            }
            if old_h > 0.0 {
                piece.origin.y = piece.origin.y / old_h * layout.area.h;
            }
        }
        self.target = Piece::centered(&self.catalog.target, layout.target_center, layout.scale);
        self.layout = layout;
    }

    /// Pull the selected piece onto the first target corner within tolerance.
    ///
    /// Returns whether a snap happened. At most one snap is applied.
    pub fn snap_to_corners(&mut self) -> bool {
        let Some(i) = self.selected else {
            return false;
        };
        let scale = self.layout.scale;
        let target = self.target.real_vertices(scale);
        for sv in self.pieces[i].real_vertices(scale) {
            for tv in &target {
                if (sv.x - tv.x).abs() < SNAP_TOLERANCE && (sv.y - tv.y).abs() < SNAP_TOLERANCE {
                    let piece = &mut self.pieces[i];
                    piece.origin = piece.origin.offset(tv.x - sv.x, tv.y - sv.y);
                    debug!("{} snapped to ({}, {})", piece.shape_id, tv.x, tv.y);
                    return true;
                }
            }
        }
        false
    }

    /// Target at full scale, pieces shrunk to [`VICTORY_SCALE`].
    fn victory_polygons(&self) -> (Vec<Point>, Vec<Vec<Point>>) {
        let scale = self.layout.scale;
        let target = self.target.real_vertices(scale);
        let pieces = self
            .pieces
            .iter()
            .map(|p| p.real_vertices(scale * VICTORY_SCALE))
            .collect();
        (target, pieces)
    }

    pub fn check_victory(&self) -> bool {
        let (target, pieces) = self.victory_polygons();
        if !pieces.iter().all(|p| polygon_inside(&target, p)) {
            return false;
        }
        for (i, a) in pieces.iter().enumerate() {
            for b in &pieces[i + 1..] {
                if collide_poly_poly(a, b, Overlap::Boundary) {
                    return false;
                }
            }
        }
        true
    }

    /// Every reason the current layout fails [`check_victory`](Self::check_victory).
    pub fn diagnostics(&self) -> Vec<Violation> {
        let (target, pieces) = self.victory_polygons();
        let mut out = Vec::new();
        for (i, p) in pieces.iter().enumerate() {
            if !polygon_inside(&target, p) {
                out.push(Violation::Outside(i));
            }
        }
        for (i, a) in pieces.iter().enumerate() {
            for (j, b) in pieces.iter().enumerate().skip(i + 1) {
                if collide_poly_poly(a, b, Overlap::Boundary) {
                    out.push(Violation::Overlaps(i, j));
                }
            }
        }
        out
    }
}
