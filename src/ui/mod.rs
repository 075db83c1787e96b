pub mod canvas;
pub mod panel;

use ratatui::prelude::*;

use crate::app::App;
use crate::sim::Tint;

const PANEL_WIDTH: u16 = 38;

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(20),             // Canvas
            Constraint::Length(PANEL_WIDTH), // Side panel
        ])
        .split(frame.area());

    canvas::render_scene(frame, chunks[0], app.controller.surface());
    panel::render_panel(frame, chunks[1], app);
}

pub fn tint_color(tint: Tint) -> Color {
    match tint {
        Tint::Positive => Color::Rgb(255, 80, 80),
        Tint::Negative => Color::Rgb(80, 150, 255),
        Tint::Neutral => Color::Rgb(200, 200, 210),
    }
}
