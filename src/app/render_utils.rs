use std::f32::consts::TAU;

use eframe::egui::{Color32, Mesh, Painter, Pos2, Rect, Shape, Stroke, Vec2, vec2};

use crate::pulse::Surface;

const GLOW_SEGMENTS: u32 = 28;

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn segment_visible(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let bounds = Rect::from_two_pos(start, end).expand(padding);
    bounds.intersects(rect)
}

pub(super) struct PainterSurface<'a> {
    painter: &'a Painter,
    rect: Rect,
    pixels_per_point: f32,
}

impl<'a> PainterSurface<'a> {
    pub(super) fn new(painter: &'a Painter, rect: Rect, pixels_per_point: f32) -> Self {
        Self {
            painter,
            rect,
            pixels_per_point: pixels_per_point.max(f32::EPSILON),
        }
    }

    fn to_screen(&self, pixels: Pos2) -> Pos2 {
        self.rect.min + pixels.to_vec2() / self.pixels_per_point
    }

    fn to_points(&self, pixels: f32) -> f32 {
        pixels / self.pixels_per_point
    }
}

impl Surface for PainterSurface<'_> {
    fn fill_rect(&mut self, min: Pos2, size: Vec2, color: Color32) {
        let min = self.to_screen(min);
        let rect = Rect::from_min_size(min, size / self.pixels_per_point);
        self.painter.rect_filled(rect, 0.0, color);
    }

    fn stroke_line(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32) {
        let from = self.to_screen(from);
        let to = self.to_screen(to);
        let width = self.to_points(width);
        if !segment_visible(self.rect, from, to, width) {
            return;
        }
        self.painter.line_segment([from, to], Stroke::new(width, color));
    }

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        let center = self.to_screen(center);
        let radius = self.to_points(radius);
        if !circle_visible(self.rect, center, radius) {
            return;
        }
        self.painter.circle_filled(center, radius, color);
    }

    fn radial_gradient(&mut self, center: Pos2, radius: f32, inner: Color32) {
        let center = self.to_screen(center);
        let radius = self.to_points(radius);
        if radius <= 0.0 || !circle_visible(self.rect, center, radius) {
            return;
        }

        let mut mesh = Mesh::default();
        mesh.colored_vertex(center, inner);
        for segment in 0..GLOW_SEGMENTS {
            let angle = segment as f32 / GLOW_SEGMENTS as f32 * TAU;
            mesh.colored_vertex(
                center + vec2(angle.cos(), angle.sin()) * radius,
                Color32::TRANSPARENT,
            );
        }
        for segment in 0..GLOW_SEGMENTS {
            mesh.add_triangle(0, 1 + segment, 1 + (segment + 1) % GLOW_SEGMENTS);
        }
        self.painter.add(Shape::mesh(mesh));
    }
}
