use std::cell::RefCell;
use std::rc::Rc;

use quest_core::{Countdown, QuestSession};
use tangram_core::ShapesCatalog;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, Window};

use crate::storage::LocalStorage;

/// Global application state stored behind an `Rc<RefCell<_>>` so it can be
/// shared across the WASM callbacks.
pub struct State {
    pub window: Window,
    pub document: Document,
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
    /// `None` until a team is registered.
    pub quest: Option<QuestSession<LocalStorage>>,
    pub countdown: Option<Countdown>,
    /// When the current level was entered, for the delayed hint.
    pub level_entered_ms: u64,
    /// Replacement tangram shapes fetched at start-up, if any.
    pub shapes: Option<ShapesCatalog>,
    pub status: String,
}

/// Thread local storage for the single runtime state instance.
thread_local! {
    pub static STATE: RefCell<Option<Rc<RefCell<State>>>> = const { RefCell::new(None) };
}
