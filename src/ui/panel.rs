use ratatui::prelude::*;
use ratatui::widgets::*;

use super::tint_color;
use crate::app::App;
use crate::sim::{RunState, Tint};

const ACCENT: Color = Color::Rgb(255, 220, 80);
const MUTED: Color = Color::Rgb(100, 100, 130);
const KEY: Color = Color::Rgb(80, 200, 255);

pub fn render_panel(frame: &mut Frame, area: Rect, app: &App) {
    let entries = app.form.entries().count() as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),           // Controls
            Constraint::Length(entries + 2), // Parameters
            Constraint::Length(4),           // Time
            Constraint::Length(11),          // Monitors
            Constraint::Min(0),
            Constraint::Length(4), // Status bar
        ])
        .split(area);

    render_controls(frame, chunks[0], app);
    render_parameters(frame, chunks[1], app);
    render_timescale(frame, chunks[2], app);
    render_monitors(frame, chunks[3], app);
    render_status(frame, chunks[5], app);
}

fn panel_block(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 60, 80)))
        .title(title)
        .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
}

fn key_hint(key: &str, action: &str) -> Vec<Span<'static>> {
    vec![
        Span::styled(format!(" {}", key), Style::default().fg(KEY).add_modifier(Modifier::BOLD)),
        Span::styled(format!(" {} ", action), Style::default().fg(MUTED)),
    ]
}

fn render_controls(frame: &mut Frame, area: Rect, app: &App) {
    let play = if app.controller.is_running() { "\u{23F8} Pause" } else { "\u{25B6} Play" };
    let lines = if app.form.is_editing() {
        vec![
            Line::from([key_hint("Enter", "read"), key_hint("Esc", "cancel")].concat()),
            Line::from([key_hint("Bksp", "erase"), key_hint("Del", "clear")].concat()),
        ]
    } else {
        vec![
            Line::from([key_hint("Space", play), key_hint("S", "\u{23F9} Stop")].concat()),
            Line::from([key_hint("R", "Read"), key_hint("D", "Reset"), key_hint("Q", "Exit")].concat()),
            Line::from([key_hint("\u{2191}\u{2193}", "select"), key_hint("Enter", "edit")].concat()),
            Line::from([key_hint("+/-", "time scale")].concat()),
        ]
    };
    frame.render_widget(Paragraph::new(lines).block(panel_block(" Controls ")), area);
}

fn render_parameters(frame: &mut Frame, area: Rect, app: &App) {
    let locked = app.controller.is_running();
    let selected = app.form.selected();
    let lines: Vec<Line> = app
        .form
        .entries()
        .map(|(field, text)| {
            let is_selected = field == selected;
            let (value, value_style) = match app.form.edit_buffer() {
                Some(buffer) if is_selected => (
                    format!("{}_", buffer),
                    Style::default().fg(Color::White).bg(Color::Rgb(30, 50, 120)),
                ),
                _ if locked && field.is_static() => (text.to_string(), Style::default().fg(MUTED)),
                _ => (text.to_string(), Style::default().fg(Color::White)),
            };
            let marker = if is_selected { "\u{25B8}" } else { " " };
            let label_style = if is_selected {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Rgb(180, 180, 200))
            };
            Line::from(vec![
                Span::styled(format!("{}{:>9} = ", marker, field.label()), label_style),
                Span::styled(format!("{:<12}", value), value_style),
                Span::styled(format!(" {}", field.unit()), Style::default().fg(MUTED)),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines).block(panel_block(" Parameters ")), area);
}

fn render_timescale(frame: &mut Frame, area: Rect, app: &App) {
    let label = Style::default().fg(Color::Rgb(180, 180, 200));
    let value = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let lines = vec![
        Line::from(vec![
            Span::styled(" Time scale = ", label),
            Span::styled(format!("{:.3e}", app.controller.timescale()), value),
        ]),
        Line::from(vec![
            Span::styled("          t = ", label),
            Span::styled(format!("{:.3e}", app.controller.time()), value),
            Span::styled(" s", Style::default().fg(MUTED)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).block(panel_block(" Time ")), area);
}

fn render_monitors(frame: &mut Frame, area: Rect, app: &App) {
    let charge = Tint::of_sign(app.controller.physics().charge);
    let lines: Vec<Line> = app
        .controller
        .monitors()
        .lines()
        .into_iter()
        .map(|text| Line::from(Span::styled(format!(" {}", text), Style::default().fg(tint_color(charge)))))
        .collect();
    frame.render_widget(Paragraph::new(lines).block(panel_block(" Monitors ")), area);
}

fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let (text, color) = match &app.notice {
        Some(notice) => (notice.clone(), ACCENT),
        None => {
            let color = match app.controller.run_state() {
                RunState::Idle => Color::Rgb(180, 180, 200),
                RunState::Running => Color::Rgb(80, 220, 120),
                RunState::Paused => ACCENT,
                RunState::Ended => Color::Rgb(255, 100, 100),
            };
            (app.controller.status().to_string(), color)
        }
    };
    let delayed = app.controller.delayed_frames();
    let mut spans = vec![Span::styled(format!(" {}", text), Style::default().fg(color))];
    if delayed > 0 {
        spans.push(Span::styled(format!("  ({} delayed)", delayed), Style::default().fg(MUTED)));
    }
    let status = Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true });
    frame.render_widget(status.block(panel_block(" Status ")), area);
}
