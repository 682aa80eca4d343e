use eframe::egui::Color32;

/// Color with floating point channels in `0.0..=255.0`, so smoothing never snaps to integers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn with_alpha(self, alpha: f32) -> Color32 {
        let channel = |value: f32| value.round().clamp(0.0, 255.0) as u8;
        Color32::from_rgba_unmultiplied(
            channel(self.r),
            channel(self.g),
            channel(self.b),
            (alpha.clamp(0.0, 1.0) * 255.0).round() as u8,
        )
    }

    #[cfg(test)]
    pub fn max_channel_distance(self, other: Rgb) -> f32 {
        (self.r - other.r)
            .abs()
            .max((self.g - other.g).abs())
            .max((self.b - other.b).abs())
    }

    fn lerp(self, other: Rgb, t: f32) -> Rgb {
        Rgb::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }
}

pub const NEUTRAL: Rgb = Rgb::new(100.0, 116.0, 139.0);

/// Risk score stops: low is safe (green), high is danger (red).
pub const COLOR_STOPS: [(f32, Rgb); 6] = [
    (0.0, Rgb::new(34.0, 197.0, 94.0)),
    (25.0, Rgb::new(34.0, 197.0, 94.0)),
    (40.0, Rgb::new(234.0, 179.0, 8.0)),
    (60.0, Rgb::new(249.0, 115.0, 22.0)),
    (75.0, Rgb::new(239.0, 68.0, 68.0)),
    (100.0, Rgb::new(185.0, 28.0, 28.0)),
];

pub fn target_color(score: Option<f32>) -> Rgb {
    let Some(score) = score.filter(|value| !value.is_nan()) else {
        return NEUTRAL;
    };
    let score = score.clamp(0.0, 100.0);

    for pair in COLOR_STOPS.windows(2) {
        let (low_score, low_color) = pair[0];
        let (high_score, high_color) = pair[1];
        if score >= low_score && score <= high_score {
            let span = high_score - low_score;
            if span <= f32::EPSILON {
                return high_color;
            }
            return low_color.lerp(high_color, (score - low_score) / span);
        }
    }

    COLOR_STOPS[COLOR_STOPS.len() - 1].1
}

/// Moves every channel of `current` by `rate` of its remaining distance to `target`.
pub fn lerp_color(current: &mut Rgb, target: Rgb, rate: f32) {
    let rate = rate.clamp(0.0, 1.0);
    *current = current.lerp(target, rate);
}

pub fn frame_rate_for(rate: f32, dt: f32) -> f32 {
    let time_step_scale = (dt * 60.0).max(0.0);
    1.0 - (1.0 - rate.clamp(0.0, 1.0)).powf(time_step_scale)
}
