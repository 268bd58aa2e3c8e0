//! Offline rendering of tangram layouts: rebuild a board from a placement
//! file, judge it with the same rules as the game and draw it as SVG or PNG.

use std::error::Error;
use std::fmt::Write as _;

use png::{BitDepth, ColorType, Compression, Encoder, FilterType};
use serde::{Deserialize, Serialize};
use tangram_core::{Layout, Point, Rect, ShapesCatalog, TangramSession, TangramError, Violation};

pub const BACKGROUND: &str = "#101010";
pub const VICTORY_FRAME: &str = "#39FF14";
pub const VIOLATION_STROKE: &str = "#FF3B30";

/// Where one piece sits. `origin` is in board pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: String,
    pub origin: [f64; 2],
    #[serde(default)]
    pub rot: u8,
    #[serde(default)]
    pub flip: bool,
}

/// A saved board. Omitted fields fall back to the fitted layout of an
/// 800x600 board; pieces not listed stay in the tray.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutFile {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub scale: Option<f64>,
    pub target_center: Option<[f64; 2]>,
    #[serde(default)]
    pub pieces: Vec<Placement>,
}

impl LayoutFile {
    pub fn size(&self) -> (f64, f64) {
        (
            self.width.unwrap_or(800.0).max(1.0),
            self.height.unwrap_or(600.0).max(1.0),
        )
    }

    pub fn board_layout(&self) -> Layout {
        let (w, h) = self.size();
        let mut layout = Layout::fit(Rect::new(0.0, 0.0, w, h));
        if let Some(s) = self.scale {
            layout.scale = s;
        }
        if let Some(c) = self.target_center {
            layout.target_center = c.into();
        }
        layout
    }

    /// Board with every listed piece placed.
    pub fn session(&self, catalog: ShapesCatalog) -> Result<TangramSession, TangramError> {
        let mut s = TangramSession::new(catalog, self.board_layout());
        for p in &self.pieces {
            s.place(&p.id, Point::from(p.origin), p.rot, p.flip)?;
        }
        Ok(s)
    }
}

/// Verdict on a layout.
#[derive(Clone, Debug, PartialEq)]
pub struct Report {
    pub victory: bool,
    pub violations: Vec<Violation>,
}

pub fn judge(session: &TangramSession) -> Report {
    Report {
        victory: session.check_victory(),
        violations: session.diagnostics(),
    }
}

/// Human readable line for one violation.
pub fn describe(session: &TangramSession, v: &Violation) -> String {
    let name = |i: usize| {
        session
            .pieces()
            .get(i)
            .map(|p| p.shape_id.clone())
            .unwrap_or_else(|| format!("#{i}"))
    };
    match *v {
        Violation::Outside(i) => format!("{} is not inside the silhouette", name(i)),
        Violation::Overlaps(i, j) => format!("{} overlaps {}", name(i), name(j)),
    }
}

/// Escape text for a double-quoted XML attribute.
fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn points_attr(pts: &[Point]) -> String {
    let mut s = String::new();
    for (i, p) in pts.iter().enumerate() {
        if i > 0 {
            s.push(' ');
        }
        let _ = write!(s, "{},{}", p.x, p.y);
    }
    s
}

/// Plain SVG with no text nodes, so rasterising needs no fonts.
pub fn build_svg(session: &TangramSession, width: f64, height: f64) -> String {
    let report = judge(session);
    let scale = session.scale();
    let mut flagged = vec![false; session.pieces().len()];
    for v in &report.violations {
        match *v {
            Violation::Outside(i) => flagged[i] = true,
            Violation::Overlaps(i, j) => {
                flagged[i] = true;
                flagged[j] = true;
            }
        }
    }

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    let _ = writeln!(
        svg,
        r#"<rect x="0" y="0" width="{width}" height="{height}" fill="{BACKGROUND}"/>"#
    );
    let target = session.target();
    let _ = writeln!(
        svg,
        r#"<polygon points="{}" fill="{}"/>"#,
        points_attr(&target.real_vertices(scale)),
        escape_attr(&target.colour)
    );
    for (piece, bad) in session.pieces().iter().zip(&flagged) {
        let stroke = if *bad {
            format!(r#" stroke="{VIOLATION_STROKE}" stroke-width="3""#)
        } else {
            String::new()
        };
        let _ = writeln!(
            svg,
            r#"<polygon id="{}" points="{}" fill="{}"{stroke}/>"#,
            escape_attr(&piece.shape_id),
            points_attr(&piece.real_vertices(scale)),
            escape_attr(&piece.colour)
        );
    }
    if report.victory {
        let _ = writeln!(
            svg,
            r#"<rect x="4" y="4" width="{}" height="{}" fill="none" stroke="{VICTORY_FRAME}" stroke-width="8"/>"#,
            (width - 8.0).max(0.0),
            (height - 8.0).max(0.0)
        );
    }
    svg.push_str("</svg>\n");
    svg
}

/// Rasterise at `px_scale` device pixels per board pixel.
pub fn render_pixmap(
    svg: &str,
    width: f64,
    height: f64,
    px_scale: f64,
) -> Result<tiny_skia::Pixmap, Box<dyn Error>> {
    let opt = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| format!("SVG parse error: {e:?}"))?;
    let w_px = (width * px_scale).round().max(1.0) as u32;
    let h_px = (height * px_scale).round().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(w_px, h_px).ok_or("pixmap alloc failed")?;
    let mut pm = pixmap.as_mut();
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(px_scale as f32, px_scale as f32),
        &mut pm,
    );
    Ok(pixmap)
}

/// Deterministic PNG: fixed filter and compression.
pub fn encode_png<W: std::io::Write>(
    pixmap: &tiny_skia::Pixmap,
    out: W,
) -> Result<(), Box<dyn Error>> {
    let mut enc = Encoder::new(out, pixmap.width(), pixmap.height());
    enc.set_color(ColorType::Rgba);
    enc.set_depth(BitDepth::Eight);
    enc.set_filter(FilterType::NoFilter);
    enc.set_compression(Compression::Default);
    let mut writer = enc.write_header()?;
    writer.write_image_data(pixmap.data())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SOLVED: &str = r#"{
        "width": 800, "height": 600, "scale": 1.0, "target_center": [200, 200],
        "pieces": [
            {"id": "triangle", "origin": [60, 50], "rot": 6},
            {"id": "pentagon", "origin": [182.21825406947977, 46.159379566434055], "rot": 1},
            {"id": "long_trap", "origin": [200, 290], "rot": 6},
            {"id": "short_trap", "origin": [320, 30], "rot": 4, "flip": true}
        ]
    }"#;

    fn load(text: &str) -> TangramSession {
        let file: LayoutFile = serde_json::from_str(text).unwrap();
        file.session(ShapesCatalog::builtin()).unwrap()
    }

    #[test]
    fn solved_layout_is_a_victory() {
        let s = load(SOLVED);
        let report = judge(&s);
        assert!(report.victory, "{:?}", report.violations);
        assert!(report.violations.is_empty());
        let svg = build_svg(&s, 800.0, 600.0);
        assert!(svg.contains(VICTORY_FRAME));
        assert!(!svg.contains(VIOLATION_STROKE));
    }

    #[test]
    fn unplaced_pieces_are_reported() {
        let s = load(r#"{"pieces": []}"#);
        let report = judge(&s);
        assert!(!report.victory);
        assert_eq!(report.violations.len(), 4);
        let lines: Vec<String> = report.violations.iter().map(|v| describe(&s, v)).collect();
        assert_eq!(lines[0], "triangle is not inside the silhouette");
        let svg = build_svg(&s, 800.0, 600.0);
        assert_eq!(svg.matches(VIOLATION_STROKE).count(), 4);
    }

    #[test]
    fn unknown_piece_is_an_error() {
        let file: LayoutFile =
            serde_json::from_str(r#"{"pieces": [{"id": "hexagon", "origin": [0, 0]}]}"#).unwrap();
        let err = file.session(ShapesCatalog::builtin()).unwrap_err();
        assert!(matches!(err, TangramError::UnknownShape(ref id) if id == "hexagon"));
    }

    #[test]
    fn defaults_fit_an_800_by_600_board() {
        let file = LayoutFile::default();
        assert_eq!(file.size(), (800.0, 600.0));
        assert_eq!(
            file.board_layout(),
            Layout::fit(Rect::new(0.0, 0.0, 800.0, 600.0))
        );
    }

    #[test]
    fn shape_text_is_escaped_in_attributes() {
        let catalog = ShapesCatalog::from_json(
            r##"{
                "target": {"id": "t", "label": "T", "points": [[0, 0], [10, 0], [0, 10]]},
                "pieces": [{
                    "id": "a\"b<c&d", "label": "odd", "colour": "#fff\" x=\"",
                    "points": [[0, 0], [5, 0], [0, 5]]
                }]
            }"##,
        )
        .unwrap();
        let s = LayoutFile::default().session(catalog).unwrap();
        let svg = build_svg(&s, 100.0, 100.0);
        assert!(svg.contains(r#"id="a&quot;b&lt;c&amp;d""#), "{svg}");
        assert!(svg.contains(r##"fill="#fff&quot; x=&quot;""##), "{svg}");
        assert!(render_pixmap(&svg, 100.0, 100.0, 1.0).is_ok());
    }

    #[test]
    fn png_has_the_scaled_size() {
        let s = load(SOLVED);
        let svg = build_svg(&s, 100.0, 50.0);
        let pixmap = render_pixmap(&svg, 100.0, 50.0, 2.0).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (200, 100));
        let mut bytes = Vec::new();
        encode_png(&pixmap, &mut bytes).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
