//! Rendering: header readout, the circle playfield, and the side panel with
//! its four tabs. Every interactive region registers its click target here
//! so the hit regions always match the drawn frame.

use ratzilla::ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph};
use ratzilla::ratatui::Frame;

use crate::actions;
use crate::bot::BotPhase;
use crate::engine::Engine;
use crate::input::{is_narrow_layout, ClickState};
use crate::level;
use crate::state::{CircleType, Panel};
use crate::upgrade::{self, BotAxis, CircleAxis, NextUpgrade, UpgradeAxis};
use crate::widgets::{ClickableList, TabBar};

/// Background colors the settings panel cycles through.
pub const BACKGROUNDS: &[&str] = &["#1e1e2e", "#000000", "#102a43", "#2d1b2e"];

pub fn render(engine: &mut Engine, f: &mut Frame, cs: &mut ClickState, now_ms: f64) {
    let size = f.area();
    cs.terminal_cols = size.width;
    cs.terminal_rows = size.height;
    cs.clear_targets();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(8)])
        .split(size);

    render_header(engine, f, chunks[0], now_ms);

    if is_narrow_layout(size.width) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(8),
                Constraint::Length(panel_height(engine.state.panel)),
            ])
            .split(chunks[1]);
        render_playfield(engine, f, rows[0], cs);
        render_panel(engine, f, rows[1], cs, now_ms);
    } else {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(30), Constraint::Length(38)])
            .split(chunks[1]);
        render_playfield(engine, f, cols[0], cs);
        render_panel(engine, f, cols[1], cs, now_ms);
    }
}

/// Exact-fit height for the stacked narrow layout: the active tab's line
/// count plus the tab row and the content block's borders. An undersized
/// panel would clip upgrade rows and their click targets with them.
fn panel_height(panel: Panel) -> u16 {
    let lines = match panel {
        Panel::Circles => 1 + CircleType::all().len() * 2,
        Panel::Bot => 6,
        Panel::Stats => 8 + CircleType::all().len(),
        Panel::Settings => 5,
    };
    lines as u16 + 3
}

fn render_header(engine: &Engine, f: &mut Frame, area: Rect, now_ms: f64) {
    let (name, single, cumulative) = match engine.store.data() {
        Some(d) => (d.name.clone(), d.single_score, d.cumulative_score()),
        None => ("-".to_string(), 0, 0),
    };
    let level = engine.state.level;
    let progress = level::progress_percent(&engine.tables, level, cumulative);

    let bar_cells = 20usize;
    let filled = ((progress / 100.0) * bar_cells as f64).round() as usize;
    let bar: String = "█".repeat(filled.min(bar_cells)) + &"░".repeat(bar_cells - filled.min(bar_cells));

    let bot_status = match engine.state.bot.phase {
        BotPhase::Idle => {
            let gate = engine.store.data().map(|d| d.next_auto_time).unwrap_or(0.0);
            if now_ms >= gate {
                Span::styled("bot ready", Style::default().fg(Color::Green))
            } else {
                Span::styled(
                    format!("bot refueling {}", format_countdown(gate - now_ms)),
                    Style::default().fg(Color::DarkGray),
                )
            }
        }
        BotPhase::Active { ends_at, .. } => Span::styled(
            format!("bot active {}", format_countdown(ends_at - now_ms)),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ),
        BotPhase::Refilling { ends_at } => Span::styled(
            format!("bot refilling {}", format_countdown(ends_at - now_ms)),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let lines = vec![
        Line::from(vec![
            Span::styled(name, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
            Span::raw("   score "),
            Span::styled(
                format_number(single),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                "   {:.1} cps  {:.1} sps",
                engine.state.display_cps, engine.state.display_sps
            )),
        ]),
        Line::from(vec![
            Span::styled(format!("Lv {level} "), Style::default().fg(Color::Yellow)),
            Span::styled(bar, Style::default().fg(Color::Yellow)),
            Span::raw(format!(" {progress:>5.1}%   ")),
            bot_status,
        ]),
        Line::from(Span::styled(
            "click the circles",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let header = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" circle clicker ")
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    f.render_widget(header, area);
}

fn render_playfield(engine: &mut Engine, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    f.render_widget(block, area);

    engine.set_playfield_size(inner.width, inner.height);

    for (idx, circle) in engine.state.circles.iter().enumerate() {
        let width = circle.ty.width();
        if circle.col + width > inner.width || circle.row >= inner.height {
            continue;
        }
        let rect = Rect::new(inner.x + circle.col, inner.y + circle.row, width, 1);
        let text = format!("({:^1$})", circle.ty.label(), (width - 2) as usize);
        let style = Style::default()
            .fg(circle.ty.color())
            .add_modifier(Modifier::BOLD);
        f.render_widget(Paragraph::new(Span::styled(text, style)), rect);
        cs.add_click_target(rect, actions::CIRCLE_TARGET_BASE + idx as u16);
    }

    // Popups float one row up per 4 ticks of age and fade near expiry.
    for popup in &engine.state.popups {
        let rise = (popup.max_life - popup.life) / 4;
        let row = popup.row.saturating_sub(rise as u16);
        if row >= inner.height {
            continue;
        }
        let w = (popup.text.len() as u16).min(inner.width.saturating_sub(popup.col));
        if w == 0 {
            continue;
        }
        let style = if popup.life <= 2 {
            Style::default().fg(Color::DarkGray)
        } else if popup.critical {
            Style::default().fg(popup.color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(popup.color)
        };
        let rect = Rect::new(inner.x + popup.col, inner.y + row, w, 1);
        f.render_widget(Paragraph::new(Span::styled(popup.text.clone(), style)), rect);
    }
}

fn render_panel(engine: &Engine, f: &mut Frame, area: Rect, cs: &mut ClickState, now_ms: f64) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(4)])
        .split(area);

    let tab_style = |panel: Panel| {
        if engine.state.panel == panel {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        }
    };
    TabBar::new("|")
        .tab("circles", tab_style(Panel::Circles), actions::TAB_CIRCLES)
        .tab("bot", tab_style(Panel::Bot), actions::TAB_BOT)
        .tab("stats", tab_style(Panel::Stats), actions::TAB_STATS)
        .tab("settings", tab_style(Panel::Settings), actions::TAB_SETTINGS)
        .render(f, chunks[0], cs);

    match engine.state.panel {
        Panel::Circles => render_circles_panel(engine, f, chunks[1], cs),
        Panel::Bot => render_bot_panel(engine, f, chunks[1], cs, now_ms),
        Panel::Stats => render_stats_panel(engine, f, chunks[1]),
        Panel::Settings => render_settings_panel(engine, f, chunks[1], cs),
    }
}

fn upgrade_line(
    engine: &Engine,
    label: String,
    axis: UpgradeAxis,
    single: u64,
) -> (Line<'static>, bool) {
    let Some(data) = engine.store.data() else {
        return (Line::from(label), false);
    };
    match upgrade::next_upgrade(&engine.tables, data, axis) {
        Some(NextUpgrade::Maxed) => (
            Line::from(vec![
                Span::raw(label),
                Span::styled("  MAX", Style::default().fg(Color::DarkGray)),
            ]),
            false,
        ),
        Some(NextUpgrade::Tier { cost, value }) => {
            let affordable = single >= cost;
            let cost_style = if affordable {
                Style::default().fg(Color::Green)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let value_text = match axis {
                UpgradeAxis::Circle(_, CircleAxis::CriticalChance) => {
                    format!("{:.0}%", value * 100.0)
                }
                _ => format!("{value}"),
            };
            (
                Line::from(vec![
                    Span::raw(label),
                    Span::raw(format!("  -> {value_text}  ")),
                    Span::styled(format!("{} pts", format_number(cost)), cost_style),
                ]),
                affordable,
            )
        }
        None => (Line::from(label), false),
    }
}

fn render_circles_panel(engine: &Engine, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let single = engine.store.data().map(|d| d.single_score).unwrap_or(0);
    let mut cl = ClickableList::new();
    cl.push(Line::from(Span::styled(
        "upgrades",
        Style::default().add_modifier(Modifier::BOLD),
    )));

    for &ty in CircleType::all() {
        for axis_kind in [CircleAxis::CriticalChance, CircleAxis::Score] {
            let axis = UpgradeAxis::Circle(ty, axis_kind);
            let tag = match axis_kind {
                CircleAxis::CriticalChance => "crit",
                CircleAxis::Score => "score",
            };
            let label = format!("{:<4} {:<5}", ty.label(), tag);
            let (line, affordable) = upgrade_line(engine, label, axis, single);
            if affordable {
                cl.push_clickable(line, actions::buy_circle_action(ty, axis_kind));
            } else {
                cl.push(line);
            }
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    cl.register_targets(area, cs, 1, 1, 0);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

fn render_bot_panel(engine: &Engine, f: &mut Frame, area: Rect, cs: &mut ClickState, now_ms: f64) {
    let data = engine.store.data();
    let single = data.map(|d| d.single_score).unwrap_or(0);
    let gate = data.map(|d| d.next_auto_time).unwrap_or(0.0);
    let bot = &engine.state.bot;

    let mut cl = ClickableList::new();
    match bot.phase {
        BotPhase::Idle if now_ms >= gate => {
            cl.push_clickable(
                Line::from(Span::styled(
                    "[ start bot ]",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )),
                actions::AUTO_BUTTON,
            );
        }
        BotPhase::Idle => {
            cl.push(Line::from(Span::styled(
                format!("ready in {}", format_countdown(gate - now_ms)),
                Style::default().fg(Color::DarkGray),
            )));
        }
        BotPhase::Active { ends_at, .. } => {
            cl.push(Line::from(Span::styled(
                format!("clicking... {}", format_countdown(ends_at - now_ms)),
                Style::default().fg(Color::Yellow),
            )));
            cl.push(Line::from(format!("run score {}", format_number(bot.session_score))));
        }
        BotPhase::Refilling { ends_at } => {
            cl.push(Line::from(Span::styled(
                format!("refilling {}", format_countdown(ends_at - now_ms)),
                Style::default().fg(Color::DarkGray),
            )));
            cl.push(Line::from(format!("last run {}", format_number(bot.session_score))));
        }
    }
    cl.push(Line::from(""));

    let axes = [
        ("speed", BotAxis::ClickSpeed),
        ("length", BotAxis::Duration),
        ("refill", BotAxis::RefillTime),
    ];
    for (i, (tag, bot_axis)) in axes.into_iter().enumerate() {
        let axis = UpgradeAxis::Bot(bot_axis);
        let label = format!("{tag:<7}");
        let (line, affordable) = upgrade_line(engine, label, axis, single);
        if affordable {
            cl.push_clickable(line, actions::BUY_BOT_BASE + i as u16);
        } else {
            cl.push(line);
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" bot ")
        .border_style(Style::default().fg(Color::DarkGray));
    cl.register_targets(area, cs, 1, 1, 0);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

fn render_stats_panel(engine: &Engine, f: &mut Frame, area: Rect) {
    let mut lines: Vec<Line> = Vec::new();
    if let Some(data) = engine.store.data() {
        let stats = &data.statistics;
        lines.push(Line::from(format!("player        {}", data.name)));
        lines.push(Line::from(format!(
            "total score   {}",
            format_number(data.cumulative_score())
        )));
        lines.push(Line::from(format!("playtime      {}", format_duration(stats.playtime))));
        lines.push(Line::from(format!(
            "all-time      {}",
            format_duration(stats.total_play_time)
        )));
        lines.push(Line::from(format!(
            "best cps      {:.1}",
            stats.highest_manual_clicks_per_second
        )));
        lines.push(Line::from(format!("best sps      {:.1}", stats.highest_score_per_second)));
        lines.push(Line::from(format!(
            "best bot run  {}",
            format_number(stats.highest_single_auto_score)
        )));
        lines.push(Line::from(""));
        for &ty in CircleType::all() {
            let clicks = stats.total_clicks.get(&ty).copied().unwrap_or(0);
            lines.push(Line::from(vec![
                Span::styled(format!("{:<4}", ty.label()), Style::default().fg(ty.color())),
                Span::raw(format!("{:>10} clicks", format_number(clicks))),
            ]));
        }
    } else {
        lines.push(Line::from(Span::styled(
            "no save loaded",
            Style::default().fg(Color::Red),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" stats ")
        .border_style(Style::default().fg(Color::DarkGray));
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_settings_panel(engine: &Engine, f: &mut Frame, area: Rect, cs: &mut ClickState) {
    let mut cl = ClickableList::new();
    if let Some(data) = engine.store.data() {
        let sound = if data.settings.sound { "on" } else { "off" };
        cl.push_clickable(Line::from(format!("sound       {sound}")), actions::SETTINGS_TOGGLE_SOUND);
        cl.push_clickable(
            Line::from(format!("background  {}", data.settings.background)),
            actions::SETTINGS_CYCLE_BACKGROUND,
        );
        match &engine.state.rename_buffer {
            Some(buffer) => cl.push(Line::from(vec![
                Span::raw("name        "),
                Span::styled(
                    format!("{buffer}_"),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ),
            ])),
            None => cl.push_clickable(
                Line::from(format!("name        {}", data.name)),
                actions::SETTINGS_RENAME,
            ),
        }
        cl.push(Line::from(""));
        cl.push_clickable(
            Line::from(Span::styled(
                "reset all progress",
                Style::default().fg(Color::Red),
            )),
            actions::SETTINGS_RESET,
        );
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" settings ")
        .border_style(Style::default().fg(Color::DarkGray));
    cl.register_targets(area, cs, 1, 1, 0);
    f.render_widget(Paragraph::new(cl.into_lines()).block(block), area);
}

/// Full-screen error notice when startup fails (bad tables).
pub fn render_error(f: &mut Frame, message: &str) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" error ")
        .border_style(Style::default().fg(Color::Red));
    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            "failed to start",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(message.to_string()),
    ])
    .block(block);
    f.render_widget(text, f.area());
}

/// Compact score formatting: 999, 1.2K, 3.4M.
pub fn format_number(n: u64) -> String {
    if n < 1_000 {
        n.to_string()
    } else if n < 1_000_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    }
}

/// mm:ss countdown from a millisecond remainder.
fn format_countdown(ms: f64) -> String {
    let total = (ms.max(0.0) / 1000.0).ceil() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// h/m/s playtime display.
fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}
