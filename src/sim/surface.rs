//! Drawing surface the animation renders into.
//!
//! Coordinates are surface pixels with the origin in the bottom-left corner
//! and y pointing up. Shapes are retained: the controller creates them once
//! and then moves or recolours them by id.

use std::collections::BTreeMap;

pub type ShapeId = usize;

/// Colour role of a shape, resolved to a concrete colour by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    Positive,
    Negative,
    Neutral,
}

impl Tint {
    pub fn of_sign(value: f64) -> Tint {
        if value > 0.0 {
            Tint::Positive
        } else if value < 0.0 {
            Tint::Negative
        } else {
            Tint::Neutral
        }
    }

    pub fn opposite(self) -> Tint {
        match self {
            Tint::Positive => Tint::Negative,
            Tint::Negative => Tint::Positive,
            Tint::Neutral => Tint::Neutral,
        }
    }
}

/// Axis-aligned bounding box, `(x1, y1)` to `(x2, y2)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BBox {
    pub fn around(cx: f64, cy: f64, radius: f64) -> Self {
        Self { x1: cx - radius, y1: cy - radius, x2: cx + radius, y2: cy + radius }
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    pub fn radius(&self) -> f64 {
        (self.x2 - self.x1).abs() / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeKind {
    Oval(BBox),
    /// Pie slice of the ellipse in `bbox`; angles in degrees,
    /// counter-clockwise from +x.
    Arc { bbox: BBox, start: f64, extent: f64 },
    /// Segment from `(x1, y1)` to `(x2, y2)` of the box.
    Line(BBox),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shape {
    pub kind: ShapeKind,
    pub tint: Tint,
}

pub trait Surface {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn clear(&mut self);
    fn create_oval(&mut self, bbox: BBox, tint: Tint) -> ShapeId;
    fn create_arc(&mut self, bbox: BBox, start: f64, extent: f64, tint: Tint) -> ShapeId;
    fn create_line(&mut self, from: (f64, f64), to: (f64, f64), tint: Tint) -> ShapeId;
    /// Move a shape; for lines the box corners are the end points.
    fn set_coords(&mut self, id: ShapeId, bbox: BBox);
    fn set_tint(&mut self, id: ShapeId, tint: Tint);
    fn delete(&mut self, id: ShapeId);
}

/// In-memory display list, drawn by the terminal canvas every frame.
#[derive(Debug, Clone)]
pub struct Scene {
    width: f64,
    height: f64,
    shapes: BTreeMap<ShapeId, Shape>,
    next_id: ShapeId,
}

impl Scene {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, shapes: BTreeMap::new(), next_id: 0 }
    }

    /// Shapes in creation order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    #[cfg(test)]
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    fn insert(&mut self, kind: ShapeKind, tint: Tint) -> ShapeId {
        let id = self.next_id;
        self.next_id += 1;
        self.shapes.insert(id, Shape { kind, tint });
        id
    }
}

impl Surface for Scene {
    fn width(&self) -> f64 {
        self.width
    }

    fn height(&self) -> f64 {
        self.height
    }

    fn clear(&mut self) {
        self.shapes.clear();
    }

    fn create_oval(&mut self, bbox: BBox, tint: Tint) -> ShapeId {
        self.insert(ShapeKind::Oval(bbox), tint)
    }

    fn create_arc(&mut self, bbox: BBox, start: f64, extent: f64, tint: Tint) -> ShapeId {
        self.insert(ShapeKind::Arc { bbox, start, extent }, tint)
    }

    fn create_line(&mut self, from: (f64, f64), to: (f64, f64), tint: Tint) -> ShapeId {
        let bbox = BBox { x1: from.0, y1: from.1, x2: to.0, y2: to.1 };
        self.insert(ShapeKind::Line(bbox), tint)
    }

    fn set_coords(&mut self, id: ShapeId, bbox: BBox) {
        if let Some(shape) = self.shapes.get_mut(&id) {
            match &mut shape.kind {
                ShapeKind::Oval(b) | ShapeKind::Line(b) | ShapeKind::Arc { bbox: b, .. } => *b = bbox,
            }
        }
    }

    fn set_tint(&mut self, id: ShapeId, tint: Tint) {
        if let Some(shape) = self.shapes.get_mut(&id) {
            shape.tint = tint;
        }
    }

    fn delete(&mut self, id: ShapeId) {
        self.shapes.remove(&id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_keep_creation_order_after_deletes() {
        let mut scene = Scene::new(100.0, 50.0);
        let a = scene.create_line((0.0, 0.0), (1.0, 1.0), Tint::Neutral);
        let b = scene.create_oval(BBox::around(5.0, 5.0, 1.0), Tint::Positive);
        scene.delete(a);
        let c = scene.create_line((1.0, 1.0), (2.0, 2.0), Tint::Negative);
        assert!(c > b);
        let tints: Vec<_> = scene.shapes().map(|s| s.tint).collect();
        assert_eq!(tints, vec![Tint::Positive, Tint::Negative]);
    }

    #[test]
    fn set_coords_and_tint() {
        let mut scene = Scene::new(100.0, 100.0);
        let id = scene.create_arc(BBox::around(50.0, 50.0, 10.0), 90.0, 180.0, Tint::Neutral);
        scene.set_coords(id, BBox::around(40.0, 50.0, 20.0));
        scene.set_tint(id, Tint::Negative);
        let shape = scene.get(id).unwrap();
        assert_eq!(shape.tint, Tint::Negative);
        match shape.kind {
            ShapeKind::Arc { bbox, start, extent } => {
                assert_eq!(bbox.center(), (40.0, 50.0));
                assert_eq!(bbox.radius(), 20.0);
                assert_eq!((start, extent), (90.0, 180.0));
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn tint_follows_sign() {
        assert_eq!(Tint::of_sign(2.0), Tint::Positive);
        assert_eq!(Tint::of_sign(-1e-30), Tint::Negative);
        assert_eq!(Tint::of_sign(0.0), Tint::Neutral);
        assert_eq!(Tint::Positive.opposite(), Tint::Negative);
        assert_eq!(Tint::Neutral.opposite(), Tint::Neutral);
    }
}
