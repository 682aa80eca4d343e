use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};
use rand::Rng;

use super::config::PulseConfig;

#[derive(Clone, Copy, Debug)]
pub struct Twinkle {
    pub phase: f32,
    pub speed: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct Star {
    pub pos: Vec2,
    pub radius: f32,
    pub opacity: f32,
    pub twinkle: Option<Twinkle>,
}

impl Star {
    pub fn opacity_at(&self, time: f64) -> f32 {
        match self.twinkle {
            Some(twinkle) => {
                let angle = f64::from(twinkle.phase) + f64::from(twinkle.speed) * time;
                let wave = angle.sin() as f32;
                (self.opacity * (0.55 + 0.45 * wave)).clamp(0.0, 1.0)
            }
            None => self.opacity,
        }
    }
}

pub fn generate_stars<R: Rng + ?Sized>(rng: &mut R, config: &PulseConfig) -> Vec<Star> {
    (0..config.star_count)
        .map(|_| {
            let twinkle = rng.gen_bool(config.star_twinkle_fraction as f64).then(|| Twinkle {
                phase: rng.gen_range(0.0..TAU),
                speed: config.star_twinkle_speed.sample(rng),
            });
            Star {
                pos: vec2(rng.r#gen::<f32>(), rng.r#gen::<f32>()),
                radius: config.star_radius_px.sample(rng),
                opacity: config.star_opacity.sample(rng),
                twinkle,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn stars_respect_configured_bounds() {
        let config = PulseConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let stars = generate_stars(&mut rng, &config);

        assert_eq!(stars.len(), config.star_count);
        for star in &stars {
            assert!((0.0..=1.0).contains(&star.pos.x) && (0.0..=1.0).contains(&star.pos.y));
            for step in 0..50 {
                let value = star.opacity_at(step as f64 * 0.37);
                assert!(value >= 0.0 && value <= config.star_opacity.max + 1e-6);
            }
        }
        assert!(stars.iter().any(|star| star.twinkle.is_some()));
        assert!(stars.iter().any(|star| star.twinkle.is_none()));
    }

    #[test]
    fn steady_star_never_changes() {
        let star = Star {
            pos: vec2(0.5, 0.5),
            radius: 1.0,
            opacity: 0.4,
            twinkle: None,
        };
        assert_eq!(star.opacity_at(0.0), star.opacity_at(123.0));
    }

    #[test]
    fn twinkling_star_varies_over_time() {
        let star = Star {
            pos: vec2(0.5, 0.5),
            radius: 1.0,
            opacity: 0.5,
            twinkle: Some(Twinkle { phase: 0.0, speed: 1.0 }),
        };
        assert!((star.opacity_at(0.0) - 0.275).abs() < 1e-6);
        assert!(star.opacity_at(std::f64::consts::FRAC_PI_2) > star.opacity_at(0.0));
    }
}
