use tangram_core::{Layout, Point, Rect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, HtmlCanvasElement, MouseEvent, TouchEvent, Window};

use crate::state::State;

/// Log a message to the browser console.
pub fn log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

pub fn now_ms() -> u64 {
    js_sys::Date::now().max(0.0) as u64
}

/// Ensure the canvas backing store matches the CSS size and device pixel ratio
/// to prevent non-uniform stretching. Returns true when the size changed.
pub fn sync_canvas_size(state: &mut State) -> bool {
    let dpr = state.window.device_pixel_ratio();
    let (css_w, css_h) = if let Some(el) = state.canvas.dyn_ref::<web_sys::Element>() {
        let rect = el.get_bounding_client_rect();
        (rect.width().max(1.0), rect.height().max(1.0))
    } else {
        (
            state.canvas.client_width() as f64,
            state.canvas.client_height() as f64,
        )
    };
    let target_w = (css_w * dpr).round().clamp(1.0, 10000.0) as u32;
    let target_h = (css_h * dpr).round().clamp(1.0, 10000.0) as u32;
    let mut changed = false;
    if state.canvas.width() != target_w {
        state.canvas.set_width(target_w);
        changed = true;
    }
    if state.canvas.height() != target_h {
        state.canvas.set_height(target_h);
        changed = true;
    }
    changed
}

/// Board layout covering the whole canvas backing store.
pub fn canvas_layout(cv: &HtmlCanvasElement) -> Layout {
    Layout::fit(Rect::new(0.0, 0.0, cv.width() as f64, cv.height() as f64))
}

/// Convert client coordinates into canvas internal pixel coordinates
/// so hit testing works even if CSS scales the canvas element.
fn client_to_canvas(client_x: f64, client_y: f64, cv: &HtmlCanvasElement) -> Option<Point> {
    let el = cv.dyn_ref::<web_sys::Element>()?;
    let r = el.get_bounding_client_rect();
    Some(scale_to_backing(
        Point::new(client_x, client_y),
        Rect::new(r.left(), r.top(), r.width(), r.height()),
        (cv.width() as f64, cv.height() as f64),
    ))
}

/// Map a client point inside the element box `css` onto a backing store of
/// `backing` pixels.
pub fn scale_to_backing(client: Point, css: Rect, backing: (f64, f64)) -> Point {
    Point::new(
        (client.x - css.x) * backing.0 / css.w.max(1.0),
        (client.y - css.y) * backing.1 / css.h.max(1.0),
    )
}

pub fn event_canvas_coords(e: &MouseEvent, cv: &HtmlCanvasElement) -> Point {
    client_to_canvas(e.client_x() as f64, e.client_y() as f64, cv)
        .unwrap_or_else(|| Point::new(e.offset_x() as f64, e.offset_y() as f64))
}

/// First finger that changed in this event; `None` for multi-finger gestures.
pub fn touch_canvas_coords(e: &TouchEvent, cv: &HtmlCanvasElement) -> Option<Point> {
    if e.touches().length() > 1 {
        return None;
    }
    let t = e.changed_touches().get(0)?;
    client_to_canvas(t.client_x() as f64, t.client_y() as f64, cv)
}

pub fn set_text(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

pub fn set_visible(document: &Document, id: &str, visible: bool) {
    if let Some(el) = document.get_element_by_id(id)
        && let Ok(el) = el.dyn_into::<web_sys::HtmlElement>()
    {
        let _ = el
            .style()
            .set_property("display", if visible { "" } else { "none" });
    }
}

/// Read and clear the value of an `<input>`.
pub fn take_input(document: &Document, id: &str) -> Option<String> {
    let input = document
        .get_element_by_id(id)?
        .dyn_into::<web_sys::HtmlInputElement>()
        .ok()?;
    let v = input.value();
    input.set_value("");
    Some(v)
}

pub fn input_value(document: &Document, id: &str) -> String {
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<web_sys::HtmlInputElement>().ok())
        .map(|i| i.value())
        .unwrap_or_default()
}

/// Build an absolute URL for an asset, taking into account the optional
/// `window.__BASE_URL` which is set by the host page.
pub fn asset_url(path: &str) -> String {
    let p = path.trim();
    if p.starts_with("http://") || p.starts_with("https://") || p.starts_with("data:") {
        return p.to_string();
    }
    let base = web_sys::window()
        .and_then(|w| {
            let v = js_sys::Reflect::get(&w, &JsValue::from_str("__BASE_URL")).ok()?;
            v.as_string()
        })
        .unwrap_or_else(|| "/".to_string());
    let base = if base.ends_with('/') {
        base
    } else {
        format!("{base}/")
    };
    format!("{base}{}", p.trim_start_matches('/'))
}

/// Fetch a text resource, `None` on any network or HTTP failure.
pub async fn fetch_text(window: &Window, url: &str) -> Option<String> {
    let resp_value = wasm_bindgen_futures::JsFuture::from(window.fetch_with_str(url))
        .await
        .ok()?;
    let resp: web_sys::Response = resp_value.dyn_into().ok()?;
    if !resp.ok() {
        return None;
    }
    let text_js = wasm_bindgen_futures::JsFuture::from(resp.text().ok()?)
        .await
        .ok()?;
    text_js.as_string()
}

/// Simple query string parser used at start-up.
pub fn get_query_param(search: &str, key: &str) -> Option<String> {
    let s = search.trim_start_matches('?');
    for pair in s.split('&') {
        let mut it = pair.splitn(2, '=');
        let Some(k) = it.next() else { continue };
        let v = it.next().unwrap_or("");
        if k == key {
            return Some(url_decode(v));
        }
    }
    None
}

fn url_decode(s: &str) -> String {
    let plus = s.replace('+', " ");
    percent_encoding::percent_decode_str(&plus)
        .decode_utf8()
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn css_scaled_canvas_maps_to_backing_pixels() {
        // 400x300 CSS box at (10, 20) over an 800x600 backing store (dpr 2)
        let css = Rect::new(10.0, 20.0, 400.0, 300.0);
        assert_eq!(
            scale_to_backing(Point::new(10.0, 20.0), css, (800.0, 600.0)),
            Point::new(0.0, 0.0)
        );
        assert_eq!(
            scale_to_backing(Point::new(210.0, 170.0), css, (800.0, 600.0)),
            Point::new(400.0, 300.0)
        );
    }

    #[test]
    fn collapsed_box_does_not_divide_by_zero() {
        let p = scale_to_backing(Point::new(5.0, 5.0), Rect::new(0.0, 0.0, 0.0, 0.0), (1.0, 1.0));
        assert_eq!(p, Point::new(5.0, 5.0));
    }

    #[test]
    fn query_params_are_percent_decoded() {
        let search = "?team=Night%20Owls&agent1=Ada+L&agent2=Linus";
        assert_eq!(get_query_param(search, "team").as_deref(), Some("Night Owls"));
        assert_eq!(get_query_param(search, "agent1").as_deref(), Some("Ada L"));
        assert_eq!(get_query_param(search, "shapes"), None);
    }
}
