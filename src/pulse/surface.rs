use eframe::egui::{Color32, Pos2, Vec2};

// Coordinates and lengths are backing-store pixels.
pub trait Surface {
    fn fill_rect(&mut self, min: Pos2, size: Vec2, color: Color32);

    fn stroke_line(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32);

    fn fill_circle(&mut self, center: Pos2, radius: f32, color: Color32);

    /// Fills a disc fading from `inner` at the center to transparent at `radius`.
    fn radial_gradient(&mut self, center: Pos2, radius: f32, inner: Color32);
}

#[derive(Debug, Default)]
pub struct NullSurface {
    pub calls: usize,
}

impl Surface for NullSurface {
    fn fill_rect(&mut self, _min: Pos2, _size: Vec2, _color: Color32) {
        self.calls += 1;
    }

    fn stroke_line(&mut self, _from: Pos2, _to: Pos2, _width: f32, _color: Color32) {
        self.calls += 1;
    }

    fn fill_circle(&mut self, _center: Pos2, _radius: f32, _color: Color32) {
        self.calls += 1;
    }

    fn radial_gradient(&mut self, _center: Pos2, _radius: f32, _inner: Color32) {
        self.calls += 1;
    }
}
