use std::cell::RefCell;
use std::rc::Rc;

use log::{LevelFilter, debug, error, info, warn};
use quest_core::{
    Countdown, Outcome, Puzzle, QuestSession, TOTAL_LEVELS, Team, format_elapsed,
    format_remaining, taunt,
};
use tangram_core::{ShapesCatalog, TangramSession};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent, MouseEvent, TouchEvent,
};

mod canvas;
mod constants;
mod logger;
mod state;
mod storage;
mod utils;

use canvas::{describe, draw};
use constants::TICK_MS;
use state::{STATE, State};
use storage::LocalStorage;
use utils::{
    asset_url, canvas_layout, event_canvas_coords, fetch_text, get_query_param, input_value,
    log, now_ms, set_text, set_visible, sync_canvas_size, take_input, touch_canvas_coords,
};

const NO_INTEL: &str = "NO INTEL AVAILABLE YET.";

fn current_state() -> Option<Rc<RefCell<State>>> {
    STATE.with(|s| s.borrow().clone())
}

/// Rebuild the board for the level the team is on and restart the hint clock.
fn enter_level(s: &mut State) {
    s.level_entered_ms = now_ms();
    let layout = canvas_layout(&s.canvas);
    let shapes = s.shapes.clone();
    if let Some(board) = s
        .quest
        .as_mut()
        .and_then(|q| q.puzzle_mut())
        .and_then(Puzzle::tangram_mut)
    {
        *board = TangramSession::new(shapes.unwrap_or_else(ShapesCatalog::builtin), layout);
    }
}

fn refresh_dom(s: &State) {
    let doc = &s.document;
    set_visible(doc, "register", s.quest.is_none());
    set_visible(doc, "game", s.quest.is_some());
    let Some(quest) = &s.quest else {
        return;
    };
    let progress = quest.progress();
    set_text(doc, "teamName", &progress.team.name);
    if let Some(done) = &progress.completed {
        set_text(doc, "levelTitle", "ALL LAYERS BREACHED");
        set_text(
            doc,
            "levelContent",
            &format!("Completion time {}", format_elapsed(done.completion_time_seconds)),
        );
        set_text(doc, "hint", "");
        set_text(doc, "taunt", "");
        set_visible(doc, "tangramTools", false);
        return;
    }
    if let Some(level) = quest.level() {
        set_text(
            doc,
            "levelTitle",
            &format!("LAYER {:02}/{TOTAL_LEVELS} // {}", level.id, level.title),
        );
        set_text(doc, "levelContent", &level.content);
        let secs = now_ms().saturating_sub(s.level_entered_ms) / 1000;
        let hint = match &level.hint {
            Some(h) if level.hint_unlocked(secs) => h.as_str(),
            _ => NO_INTEL,
        };
        set_text(doc, "hint", hint);
        set_text(doc, "taunt", taunt(level.id));
    }
    let on_board = matches!(quest.puzzle(), Some(Puzzle::Tangram(_)));
    set_visible(doc, "tangramTools", on_board);
}

fn refresh(s: &State) {
    refresh_dom(s);
    set_text(&s.document, "status", &s.status);
    draw(s);
}

fn outcome_message(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Solved { .. } => "ACCESS GRANTED".to_string(),
        Outcome::Rejected { message }
        | Outcome::Hint { message }
        | Outcome::ResetProgress { message } => message.clone(),
    }
}

fn submit_answer(s: &mut State, answer: &str) {
    let Some(quest) = s.quest.as_mut() else {
        return;
    };
    match quest.submit(answer, now_ms()) {
        Ok(outcome) => {
            s.status = outcome_message(&outcome);
            if matches!(outcome, Outcome::Solved { .. } | Outcome::ResetProgress { .. }) {
                enter_level(s);
            }
        }
        Err(e) => {
            error!("submit failed: {e}");
            s.status = e.to_string();
        }
    }
    refresh(s);
}

fn register(s: &mut State, name: &str, agent1: &str, agent2: &str) -> Result<(), String> {
    let team = Team::register(name, agent1, agent2).map_err(|e| e.to_string())?;
    let store = LocalStorage::open(&s.window).map_err(|e| format!("{e:?}"))?;
    let now = now_ms();
    let quest = QuestSession::start(team, now, store).map_err(|e| e.to_string())?;
    s.countdown = Some(Countdown::new(now));
    s.quest = Some(quest);
    s.status.clear();
    enter_level(s);
    refresh(s);
    Ok(())
}

fn logout_team(s: &mut State) {
    if let Some(quest) = s.quest.take()
        && let Err(e) = quest.logout()
    {
        warn!("logout left stale progress: {e}");
    }
    s.countdown = None;
    s.status.clear();
    refresh(s);
}

fn with_board(s: &mut State, f: impl FnOnce(&mut TangramSession)) {
    if let Some(board) = s
        .quest
        .as_mut()
        .and_then(|q| q.puzzle_mut())
        .and_then(Puzzle::tangram_mut)
    {
        f(board);
    }
}

/// Drop whatever is held; a winning drop submits the board.
fn release_piece(s: &mut State) {
    let mut victory = None;
    with_board(s, |b| victory = b.pointer_up());
    match victory {
        Some(v) => submit_answer(s, v.answer),
        None => draw(s),
    }
}

fn on_click(
    document: &Document,
    id: &str,
    state: &Rc<RefCell<State>>,
    mut f: impl FnMut(&mut State) + 'static,
) {
    let Some(btn) = document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
    else {
        debug!("no #{id} on this page");
        return;
    };
    let st = state.clone();
    let onclick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
        let mut s = st.borrow_mut();
        f(&mut *s);
        refresh(&s);
    }));
    btn.set_onclick(Some(onclick.as_ref().unchecked_ref()));
    onclick.forget();
}

fn attach_ui(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let (document, canvas, window) = {
        let s = state.borrow();
        (s.document.clone(), s.canvas.clone(), s.window.clone())
    };

    on_click(&document, "registerBtn", &state, |s| {
        let doc = s.document.clone();
        let name = input_value(&doc, "teamInput");
        let a1 = input_value(&doc, "agent1Input");
        let a2 = input_value(&doc, "agent2Input");
        if let Err(msg) = register(s, &name, &a1, &a2) {
            s.status = msg;
        }
    });
    on_click(&document, "submit", &state, |s| {
        let answer = take_input(&s.document, "answer").unwrap_or_default();
        submit_answer(s, &answer);
    });
    on_click(&document, "skip", &state, |s| {
        if let Some(quest) = s.quest.as_mut() {
            match quest.skip(now_ms()) {
                Ok(()) => enter_level(s),
                Err(e) => error!("skip failed: {e}"),
            }
        }
    });
    on_click(&document, "previous", &state, |s| {
        if let Some(quest) = s.quest.as_mut() {
            match quest.previous() {
                Ok(()) => enter_level(s),
                Err(e) => error!("previous failed: {e}"),
            }
        }
    });
    on_click(&document, "logout", &state, logout_team);
    on_click(&document, "rotateCw", &state, |s| {
        with_board(s, TangramSession::rotate_clockwise)
    });
    on_click(&document, "rotateCcw", &state, |s| {
        with_board(s, TangramSession::rotate_anticlockwise)
    });
    on_click(&document, "flip", &state, |s| with_board(s, TangramSession::flip));
    on_click(&document, "resetPuzzle", &state, |s| {
        with_board(s, TangramSession::reset);
        s.status.clear();
    });

    // Mouse down
    {
        let st = state.clone();
        let cv = canvas.clone();
        let down = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            let mut s = st.borrow_mut();
            let p = event_canvas_coords(&e, &cv);
            with_board(&mut s, |b| b.pointer_down(p));
            draw(&s);
        }));
        canvas.add_event_listener_with_callback("mousedown", down.as_ref().unchecked_ref())?;
        down.forget();
    }

    // Mouse move (only while the primary button is held)
    {
        let st = state.clone();
        let cv = canvas.clone();
        let mv = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |e: MouseEvent| {
            if e.buttons() & 1 == 0 {
                return;
            }
            let mut s = st.borrow_mut();
            let p = event_canvas_coords(&e, &cv);
            with_board(&mut s, |b| b.pointer_move(p));
            draw(&s);
        }));
        canvas.add_event_listener_with_callback("mousemove", mv.as_ref().unchecked_ref())?;
        mv.forget();
    }

    // Mouse up on the window so releases outside the canvas still drop the piece
    {
        let st = state.clone();
        let up = Closure::<dyn FnMut(MouseEvent)>::wrap(Box::new(move |_e: MouseEvent| {
            release_piece(&mut st.borrow_mut());
        }));
        window.add_event_listener_with_callback("mouseup", up.as_ref().unchecked_ref())?;
        up.forget();
    }

    // Touch: same gestures as the mouse; prevent_default stops the page
    // scrolling and the browser from synthesising mouse events
    {
        let st = state.clone();
        let cv = canvas.clone();
        let start = Closure::<dyn FnMut(TouchEvent)>::wrap(Box::new(move |e: TouchEvent| {
            let Some(p) = touch_canvas_coords(&e, &cv) else {
                return;
            };
            e.prevent_default();
            let mut s = st.borrow_mut();
            with_board(&mut s, |b| b.pointer_down(p));
            draw(&s);
        }));
        canvas.add_event_listener_with_callback("touchstart", start.as_ref().unchecked_ref())?;
        start.forget();
    }
    {
        let st = state.clone();
        let cv = canvas.clone();
        let mv = Closure::<dyn FnMut(TouchEvent)>::wrap(Box::new(move |e: TouchEvent| {
            let Some(p) = touch_canvas_coords(&e, &cv) else {
                return;
            };
            e.prevent_default();
            let mut s = st.borrow_mut();
            with_board(&mut s, |b| b.pointer_move(p));
            draw(&s);
        }));
        canvas.add_event_listener_with_callback("touchmove", mv.as_ref().unchecked_ref())?;
        mv.forget();
    }
    {
        let st = state.clone();
        let end = Closure::<dyn FnMut(TouchEvent)>::wrap(Box::new(move |e: TouchEvent| {
            e.prevent_default();
            release_piece(&mut st.borrow_mut());
        }));
        canvas.add_event_listener_with_callback("touchend", end.as_ref().unchecked_ref())?;
        canvas.add_event_listener_with_callback("touchcancel", end.as_ref().unchecked_ref())?;
        end.forget();
    }

    // Keyboard: q/e rotate, f flips, d dumps layout problems
    {
        let st = state.clone();
        let key = Closure::<dyn FnMut(KeyboardEvent)>::wrap(Box::new(move |e: KeyboardEvent| {
            if let Some(t) = e.target()
                && t.dyn_ref::<web_sys::HtmlInputElement>().is_some()
            {
                return;
            }
            let mut s = st.borrow_mut();
            match e.key().as_str() {
                "q" | "Q" | "ArrowLeft" => with_board(&mut s, TangramSession::rotate_anticlockwise),
                "e" | "E" | "ArrowRight" => with_board(&mut s, TangramSession::rotate_clockwise),
                "f" | "F" => with_board(&mut s, TangramSession::flip),
                "d" | "D" => {
                    let mut lines = Vec::new();
                    with_board(&mut s, |b| {
                        let b = &*b;
                        lines = b.diagnostics().iter().map(|v| describe(v, b)).collect();
                    });
                    s.status = if lines.is_empty() {
                        "layout ok".to_string()
                    } else {
                        lines.join("; ")
                    };
                    debug!("diagnostics: {}", s.status);
                }
                _ => return,
            }
            e.prevent_default();
            draw(&s);
        }));
        window.add_event_listener_with_callback("keydown", key.as_ref().unchecked_ref())?;
        key.forget();
    }

    // Keep the backing store in step with CSS and refit the board
    {
        let st = state.clone();
        let resize = Closure::<dyn FnMut()>::wrap(Box::new(move || {
            let mut s = st.borrow_mut();
            if sync_canvas_size(&mut s) {
                let layout = canvas_layout(&s.canvas);
                with_board(&mut s, |b| b.resize(layout));
            }
            draw(&s);
        }));
        window.add_event_listener_with_callback("resize", resize.as_ref().unchecked_ref())?;
        resize.forget();
    }

    Ok(())
}

/// Once a second: countdown, alerts and the delayed hint.
fn start_clock(state: Rc<RefCell<State>>) -> Result<(), JsValue> {
    let window = state.borrow().window.clone();
    let tick = Closure::<dyn FnMut()>::wrap(Box::new(move || {
        let mut s = state.borrow_mut();
        let now = now_ms();
        if let Some(cd) = s.countdown.as_mut() {
            let remaining = cd.remaining(now);
            let alert = cd.poll(now);
            set_text(&s.document, "timer", &format_remaining(remaining));
            if let Some(a) = alert {
                info!("{} minutes left", a.minutes);
                s.status = a.message();
            }
        }
        refresh_dom(&s);
        set_text(&s.document, "status", &s.status);
    }));
    window.set_interval_with_callback_and_timeout_and_arguments_0(
        tick.as_ref().unchecked_ref(),
        TICK_MS,
    )?;
    tick.forget();
    Ok(())
}

async fn load_shapes(url: String) {
    let Some(state) = current_state() else {
        return;
    };
    let window = state.borrow().window.clone();
    let Some(text) = fetch_text(&window, &url).await else {
        warn!("could not fetch shapes from {url}");
        return;
    };
    match ShapesCatalog::from_json(&text) {
        Ok(catalog) => {
            info!("loaded {} pieces from {url}", catalog.pieces.len());
            let mut s = state.borrow_mut();
            s.shapes = Some(catalog);
            enter_level(&mut s);
            refresh(&s);
        }
        Err(e) => warn!("ignoring shapes from {url}: {e}"),
    }
}

fn init_canvas(
    document: &Document,
) -> Result<(HtmlCanvasElement, CanvasRenderingContext2d), JsValue> {
    let cv = document
        .get_element_by_id("cv")
        .ok_or_else(|| JsValue::from_str("canvas #cv not found"))?
        .dyn_into::<HtmlCanvasElement>()?;
    let ctx = cv
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context not available"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    Ok((cv, ctx))
}

/// Register a team from the host page. Errors carry the message to show.
#[wasm_bindgen]
pub fn register_team(name: &str, agent1: &str, agent2: &str) -> Result<(), JsValue> {
    let state = current_state().ok_or("not started")?;
    let mut s = state.borrow_mut();
    register(&mut s, name, agent1, agent2).map_err(|msg| JsValue::from_str(&msg))
}

/// Submit an answer as if typed into the answer box; returns the status line.
#[wasm_bindgen]
pub fn submit(answer: &str) -> Result<String, JsValue> {
    let state = current_state().ok_or("not started")?;
    let mut s = state.borrow_mut();
    submit_answer(&mut s, answer);
    Ok(s.status.clone())
}

#[wasm_bindgen]
pub fn logout() {
    if let Some(state) = current_state() {
        logout_team(&mut state.borrow_mut());
    }
}

/// Drive the interactive widgets from the page.
///
/// `action` names the widget gesture; `a` and `b` are its indices (`b` is a
/// signed delta for `wheel`, a char code for `cell`, 0 clearing the cell).
#[wasm_bindgen]
pub fn widget_action(action: &str, a: usize, b: i32) -> Result<String, JsValue> {
    let state = current_state().ok_or("not started")?;
    let mut s = state.borrow_mut();
    let puzzle = s
        .quest
        .as_mut()
        .and_then(|q| q.puzzle_mut())
        .ok_or("no active level")?;
    let err = |e: quest_core::QuestError| JsValue::from_str(&e.to_string());
    let reply = match (action, puzzle) {
        ("arrow", Puzzle::Clock(dial)) => dial.rotate_arrow(a).map_err(err)?.to_string(),
        ("riddle", Puzzle::Mcq(frame)) => frame.select_option(a).map_err(err)?.to_string(),
        ("cell", Puzzle::Crossword(grid)) => {
            let ch = u32::try_from(b).ok().filter(|c| *c > 0).and_then(char::from_u32);
            grid.fill(a / 10, a % 10, ch).map_err(err)?;
            grid.check_grid().to_string()
        }
        ("hex", Puzzle::FloorPlan(plan)) => format!("{:?}", plan.light(a).map_err(err)?),
        ("door", Puzzle::ThreeDoors(doors)) => {
            let d = doors.click_door(a).map_err(err)?;
            format!("{}{}{}", d[0], d[1], d[2])
        }
        ("proceed", Puzzle::ThreeDoors(doors)) => doors.proceed().to_string(),
        ("wheel", Puzzle::Rotary(dial)) => {
            dial.turn_wheel(a, b).map_err(err)?;
            dial.visible()
        }
        (other, p) => {
            return Err(JsValue::from_str(&format!(
                "{other} does not apply to {:?}",
                p.kind()
            )));
        }
    };
    debug!("{action}({a}, {b}) -> {reply}");
    Ok(reply)
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let search = window.location().search().unwrap_or_default();
    logger::init(if get_query_param(&search, "debug").is_some() {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    let (canvas, ctx) = init_canvas(&document)?;

    let quest = match QuestSession::resume(LocalStorage::open(&window)?) {
        Ok(q) => q,
        Err(e) => {
            warn!("stored progress unreadable, starting over: {e}");
            None
        }
    };
    let countdown = quest
        .as_ref()
        .map(|q| Countdown::new(q.progress().started_at_ms));

    let state = Rc::new(RefCell::new(State {
        window: window.clone(),
        document,
        canvas,
        ctx,
        quest,
        countdown,
        level_entered_ms: now_ms(),
        shapes: None,
        status: String::new(),
    }));
    STATE.with(|s| *s.borrow_mut() = Some(state.clone()));

    {
        let mut s = state.borrow_mut();
        sync_canvas_size(&mut s);
        if s.quest.is_none()
            && let (Some(name), Some(a1), Some(a2)) = (
                get_query_param(&search, "team"),
                get_query_param(&search, "agent1"),
                get_query_param(&search, "agent2"),
            )
            && let Err(msg) = register(&mut s, &name, &a1, &a2)
        {
            s.status = msg;
        }
        enter_level(&mut s);
        refresh(&s);
    }

    attach_ui(state.clone())?;
    start_clock(state)?;

    if let Some(path) = get_query_param(&search, "shapes") {
        wasm_bindgen_futures::spawn_local(load_shapes(asset_url(&path)));
    }
    log("escape room ready");
    Ok(())
}
