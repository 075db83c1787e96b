use ratatui::prelude::*;
use ratatui::symbols::Marker;
use ratatui::widgets::canvas::{Canvas, Circle, Context, Line as Segment, Points};
use ratatui::widgets::*;

use super::tint_color;
use crate::sim::surface::{BBox, ShapeKind};
use crate::sim::{Scene, Surface};

const ARC_SEGMENTS: usize = 48;

/// Braille cells hold 2x4 dots and are about twice as tall as wide.
const CELL_ASPECT: f64 = 2.0;

pub fn render_scene(frame: &mut Frame, area: Rect, scene: &Scene) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(60, 150, 200)))
        .title(" \u{269B} Cyclotron ")
        .title_style(Style::default().fg(Color::Rgb(200, 120, 255)).add_modifier(Modifier::BOLD));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (width, height) = (scene.width(), scene.height());
    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .background_color(Color::Rgb(10, 10, 20))
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            for shape in scene.shapes() {
                let color = tint_color(shape.tint);
                match shape.kind {
                    ShapeKind::Line(b) => ctx.draw(&Segment::new(b.x1, b.y1, b.x2, b.y2, color)),
                    ShapeKind::Arc { bbox, start, extent } => draw_pie(ctx, bbox, start, extent, color),
                    ShapeKind::Oval(_) => {}
                }
            }
            // particles above their trail
            ctx.layer();
            for shape in scene.shapes() {
                if let ShapeKind::Oval(bbox) = shape.kind {
                    let (x, y) = bbox.center();
                    let color = tint_color(shape.tint);
                    ctx.draw(&Circle { x, y, radius: bbox.radius(), color });
                    ctx.draw(&Points { coords: &[(x, y)], color });
                }
            }
        });
    frame.render_widget(canvas, fit_aspect(inner, width / height));
}

fn draw_pie(ctx: &mut Context, bbox: BBox, start: f64, extent: f64, color: Color) {
    let (cx, cy) = bbox.center();
    let r = bbox.radius();
    let point = |deg: f64| {
        let a = deg.to_radians();
        (cx + r * a.cos(), cy + r * a.sin())
    };
    let mut prev = point(start);
    ctx.draw(&Segment::new(cx, cy, prev.0, prev.1, color));
    for i in 1..=ARC_SEGMENTS {
        let next = point(start + extent * i as f64 / ARC_SEGMENTS as f64);
        ctx.draw(&Segment::new(prev.0, prev.1, next.0, next.1, color));
        prev = next;
    }
    ctx.draw(&Segment::new(prev.0, prev.1, cx, cy, color));
}

/// Largest centred sub-area whose dot grid keeps the surface's aspect ratio.
fn fit_aspect(area: Rect, aspect: f64) -> Rect {
    if area.width == 0 || area.height == 0 || !aspect.is_finite() || aspect <= 0.0 {
        return area;
    }
    let wanted_cols = (f64::from(area.height) * CELL_ASPECT * aspect).round() as u16;
    let cols = wanted_cols.clamp(1, area.width);
    let rows = ((f64::from(cols) / (CELL_ASPECT * aspect)).round() as u16).clamp(1, area.height);
    Rect::new(
        area.x + (area.width - cols) / 2,
        area.y + (area.height - rows) / 2,
        cols,
        rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_surface_in_wide_area() {
        let fitted = fit_aspect(Rect::new(0, 0, 100, 20), 1.0);
        assert_eq!((fitted.width, fitted.height), (40, 20));
        assert_eq!(fitted.x, 30);
    }

    #[test]
    fn square_surface_in_tall_area() {
        let fitted = fit_aspect(Rect::new(0, 0, 20, 40), 1.0);
        assert_eq!((fitted.width, fitted.height), (20, 10));
        assert_eq!(fitted.y, 15);
    }
}
