//! Browser entry point: wires the engine to the terminal renderer, the
//! keyboard/mouse handlers and the fixed-timestep frame loop.

mod actions;
mod bot;
mod config;
mod engine;
mod input;
mod level;
mod log;
mod render;
mod save;
mod scoring;
#[cfg(test)]
mod simulator;
mod state;
mod time;
mod upgrade;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};

use engine::{ClickSource, Engine};
use input::{pixel_x_to_col, pixel_y_to_row, ClickState};
use save::{SaveBackend, SaveStore, MAX_NAME_LEN};
use state::Panel;
use time::TickClock;

#[cfg(target_arch = "wasm32")]
fn storage_backend() -> Box<dyn SaveBackend> {
    Box::new(save::LocalStorageBackend)
}

#[cfg(not(target_arch = "wasm32"))]
fn storage_backend() -> Box<dyn SaveBackend> {
    Box::new(save::MemoryBackend::new())
}

/// Paint the page background behind the terminal grid.
fn apply_background(color: &str) {
    #[cfg(target_arch = "wasm32")]
    if let Some(body) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
    {
        if body.style().set_property("background-color", color).is_err() {
            log::warn("failed to apply background color");
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    let _ = color;
}

/// Convert a mouse event's pixel position to a terminal cell using the grid
/// container's bounding rect.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let document = web_sys::window()?.document()?;
    // DomBackend renders into a <div> grid directly under <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_x_to_col(mouse_x as f64 - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(mouse_y as f64 - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

fn dispatch_action(engine: &mut Engine, action: u16, now_ms: f64) {
    match action {
        actions::AUTO_BUTTON => {
            engine.press_auto(now_ms);
        }
        actions::TAB_CIRCLES => set_panel(engine, Panel::Circles),
        actions::TAB_BOT => set_panel(engine, Panel::Bot),
        actions::TAB_STATS => set_panel(engine, Panel::Stats),
        actions::TAB_SETTINGS => set_panel(engine, Panel::Settings),
        actions::SETTINGS_TOGGLE_SOUND => {
            if let Some(on) = engine.store.data().map(|d| d.settings.sound) {
                engine.store.set_sound(!on);
                engine.store.save(now_ms);
            }
        }
        actions::SETTINGS_CYCLE_BACKGROUND => {
            if let Some(current) = engine.store.data().map(|d| d.settings.background.clone()) {
                let idx = render::BACKGROUNDS
                    .iter()
                    .position(|&b| b == current)
                    .map(|i| (i + 1) % render::BACKGROUNDS.len())
                    .unwrap_or(0);
                let next = render::BACKGROUNDS[idx];
                engine.store.set_background(next.to_string());
                apply_background(next);
                engine.store.save(now_ms);
            }
        }
        actions::SETTINGS_RENAME => {
            let current = engine.store.data().map(|d| d.name.clone()).unwrap_or_default();
            engine.state.rename_buffer = Some(current);
        }
        actions::SETTINGS_RESET => {
            engine.reset_save(now_ms);
        }
        a if a >= actions::CIRCLE_TARGET_BASE && a < actions::BUY_CIRCLE_BASE => {
            let idx = (a - actions::CIRCLE_TARGET_BASE) as usize;
            if let Some(circle) = engine.state.circles.get(idx) {
                let id = circle.id;
                engine.circle_hit(id, ClickSource::Manual);
            }
        }
        a => {
            if let Some(axis) = actions::decode_buy_action(a) {
                let _ = engine.purchase(axis, now_ms);
            }
        }
    }
}

fn set_panel(engine: &mut Engine, panel: Panel) {
    if panel != Panel::Settings {
        engine.state.rename_buffer = None;
    }
    engine.state.panel = panel;
}

fn handle_key(engine: &mut Engine, code: KeyCode, now_ms: f64) {
    // A pending rename captures all keys until committed or cancelled.
    if let Some(buffer) = engine.state.rename_buffer.as_mut() {
        match code {
            KeyCode::Char(c) => {
                if buffer.chars().count() < MAX_NAME_LEN {
                    buffer.push(c);
                }
            }
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Enter => {
                let name = buffer.trim().to_string();
                engine.state.rename_buffer = None;
                // A blank entry keeps the current name.
                if !name.is_empty() {
                    engine.store.set_name(&name);
                    engine.store.save(now_ms);
                }
            }
            KeyCode::Esc => {
                engine.state.rename_buffer = None;
            }
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Char('1') => set_panel(engine, Panel::Circles),
        KeyCode::Char('2') => set_panel(engine, Panel::Bot),
        KeyCode::Char('3') => set_panel(engine, Panel::Stats),
        KeyCode::Char('4') => set_panel(engine, Panel::Settings),
        KeyCode::Char('b') => {
            engine.press_auto(now_ms);
        }
        _ => {}
    }
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Game start is gated on the progression tables parsing and validating;
    // a broken bundle shows an error screen instead of a broken game.
    let tables = match config::load_tables() {
        Ok(t) => t,
        Err(e) => {
            let message = e.to_string();
            log::error(&format!("startup failed: {message}"));
            terminal.draw_web(move |f| render::render_error(f, &message));
            return Ok(());
        }
    };

    let now = js_sys::Date::now();
    let mut store = SaveStore::new(storage_backend());
    store.load(now);
    if let Some(data) = store.data() {
        apply_background(&data.settings.background);
    }

    let seed = (now as u64 & u32::MAX as u64) as u32;
    let engine = Rc::new(RefCell::new(Engine::new(tables, store, seed)));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let clock = Rc::new(RefCell::new(TickClock::new()));

    terminal.on_key_event({
        let engine = engine.clone();
        move |key_event| {
            handle_key(&mut engine.borrow_mut(), key_event.code, js_sys::Date::now());
        }
    });

    terminal.on_mouse_event({
        let engine = engine.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let cs = click_state.borrow();
            if cs.terminal_rows == 0 || cs.terminal_cols == 0 {
                return;
            }
            let action = dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                .and_then(|(col, row)| cs.hit_test(col, row));
            drop(cs);

            if let Some(action) = action {
                dispatch_action(&mut engine.borrow_mut(), action, js_sys::Date::now());
            }
        }
    });

    terminal.draw_web({
        let engine = engine.clone();
        let click_state = click_state.clone();
        move |f| {
            let now = js_sys::Date::now();
            let mut e = engine.borrow_mut();
            let ticks = clock.borrow_mut().advance(now);
            e.tick(ticks, now);
            render::render(&mut e, f, &mut click_state.borrow_mut(), now);
        }
    });

    Ok(())
}
