use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn sample<R: Rng + ?Sized>(self, rng: &mut R) -> f32 {
        if self.max <= self.min {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }

    fn ordered(self) -> Self {
        if self.min <= self.max {
            self
        } else {
            Self::new(self.max, self.min)
        }
    }

    // NaN bounds collapse to `low`; the sampled width always stays finite.
    fn bounded(self, low: f32, high: f32) -> Self {
        let clamp = |value: f32| if value.is_nan() { low } else { value.clamp(low, high) };
        Self::new(clamp(self.min), clamp(self.max)).ordered()
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PulseConfig {
    pub max_nodes: usize,
    pub max_connections: usize,
    pub seed_nodes: usize,
    pub seed_connections: usize,
    pub seed_connection_attempts: usize,
    pub node_spawn_attempts: usize,
    pub node_lifetime_secs: Span,
    pub node_radius_px: Span,
    pub node_drift_per_sec: f32,
    pub node_min_distance: f32,
    pub node_spawn_interval_secs: f32,
    pub connection_spawn_interval_secs: f32,
    pub connection_min_lifetime_secs: f32,
    pub connection_reference_fraction: f32,
    pub connection_origin_min_opacity: f32,
    pub connection_peer_min_opacity: f32,
    pub connection_fade_in_secs: f32,
    pub edge_falloff_fraction: f32,
    pub edge_max_alpha: f32,
    pub edge_width_px: f32,
    pub glow_max_alpha: f32,
    pub glow_radius_scale: f32,
    pub core_max_alpha: f32,
    pub color_smoothing_rate: f32,
    pub star_count: usize,
    pub star_twinkle_fraction: f32,
    pub star_radius_px: Span,
    pub star_opacity: Span,
    pub star_twinkle_speed: Span,
    pub background: [u8; 3],
}

impl Default for PulseConfig {
    fn default() -> Self {
        Self {
            max_nodes: 60,
            max_connections: 70,
            seed_nodes: 36,
            seed_connections: 20,
            seed_connection_attempts: 100,
            node_spawn_attempts: 8,
            node_lifetime_secs: Span::new(12.0, 28.0),
            node_radius_px: Span::new(1.6, 3.4),
            node_drift_per_sec: 0.004,
            node_min_distance: 0.06,
            node_spawn_interval_secs: 0.45,
            connection_spawn_interval_secs: 0.15,
            connection_min_lifetime_secs: 2.0,
            connection_reference_fraction: 0.25,
            connection_origin_min_opacity: 0.5,
            connection_peer_min_opacity: 0.3,
            connection_fade_in_secs: 1.2,
            edge_falloff_fraction: 0.2,
            edge_max_alpha: 0.38,
            edge_width_px: 1.0,
            glow_max_alpha: 0.22,
            glow_radius_scale: 5.0,
            core_max_alpha: 0.9,
            color_smoothing_rate: 0.025,
            star_count: 140,
            star_twinkle_fraction: 0.3,
            star_radius_px: Span::new(0.3, 1.2),
            star_opacity: Span::new(0.12, 0.55),
            star_twinkle_speed: Span::new(0.6, 2.2),
            background: [8, 11, 18],
        }
    }
}

impl PulseConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read pulse config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse pulse config {}", path.display()))?;
        Ok(config.sanitized())
    }

    pub fn sanitized(mut self) -> Self {
        self.node_spawn_attempts = self.node_spawn_attempts.max(1);
        self.seed_nodes = self.seed_nodes.min(self.max_nodes);
        self.seed_connections = self.seed_connections.min(self.max_connections);
        self.node_lifetime_secs = self.node_lifetime_secs.bounded(0.1, 3_600.0);
        self.node_radius_px = self.node_radius_px.bounded(0.0, 64.0);
        self.node_drift_per_sec = self.node_drift_per_sec.max(0.0);
        self.node_min_distance = self.node_min_distance.clamp(0.0, 1.0);
        self.node_spawn_interval_secs = self.node_spawn_interval_secs.max(0.0);
        self.connection_spawn_interval_secs = self.connection_spawn_interval_secs.max(0.0);
        self.connection_min_lifetime_secs = self.connection_min_lifetime_secs.max(0.0);
        self.connection_reference_fraction = self.connection_reference_fraction.max(0.001);
        self.connection_origin_min_opacity = self.connection_origin_min_opacity.clamp(0.0, 1.0);
        self.connection_peer_min_opacity = self.connection_peer_min_opacity.clamp(0.0, 1.0);
        self.connection_fade_in_secs = self.connection_fade_in_secs.max(0.0);
        self.edge_falloff_fraction = self.edge_falloff_fraction.max(0.001);
        self.edge_max_alpha = self.edge_max_alpha.clamp(0.0, 1.0);
        self.edge_width_px = self.edge_width_px.max(0.1);
        self.glow_max_alpha = self.glow_max_alpha.clamp(0.0, 1.0);
        self.glow_radius_scale = self.glow_radius_scale.max(1.0);
        self.core_max_alpha = self.core_max_alpha.clamp(0.0, 1.0);
        self.color_smoothing_rate = self.color_smoothing_rate.clamp(0.001, 1.0);
        self.star_twinkle_fraction = self.star_twinkle_fraction.clamp(0.0, 1.0);
        self.star_radius_px = self.star_radius_px.bounded(0.0, 16.0);
        self.star_opacity = self.star_opacity.bounded(0.0, 1.0);
        self.star_twinkle_speed = self.star_twinkle_speed.bounded(-20.0, 20.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let raw = r#"{ "max_nodes": 12, "node_lifetime_secs": { "min": 4.0, "max": 6.0 } }"#;
        let config: PulseConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.max_nodes, 12);
        assert_eq!(config.node_lifetime_secs, Span::new(4.0, 6.0));
        assert_eq!(config.max_connections, PulseConfig::default().max_connections);
    }

    #[test]
    fn sanitize_orders_spans_and_bounds_seed_counts() {
        let config = PulseConfig {
            max_nodes: 5,
            seed_nodes: 50,
            node_lifetime_secs: Span::new(9.0, 3.0),
            color_smoothing_rate: 4.0,
            node_spawn_attempts: 0,
            ..PulseConfig::default()
        }
        .sanitized();

        assert_eq!(config.seed_nodes, 5);
        assert_eq!(config.node_lifetime_secs, Span::new(3.0, 9.0));
        assert_eq!(config.color_smoothing_rate, 1.0);
        assert_eq!(config.node_spawn_attempts, 1);
    }

    #[test]
    fn huge_spans_are_bounded_before_sampling() {
        let raw = r#"{
            "star_twinkle_speed": { "min": -3e38, "max": 3e38 },
            "node_lifetime_secs": { "min": 1e30, "max": -1e30 },
            "star_radius_px": { "min": 0.0, "max": 3e38 }
        }"#;
        let config = serde_json::from_str::<PulseConfig>(raw).unwrap().sanitized();

        assert_eq!(config.star_twinkle_speed, Span::new(-20.0, 20.0));
        assert_eq!(config.node_lifetime_secs, Span::new(0.1, 3_600.0));
        assert_eq!(config.star_radius_px, Span::new(0.0, 16.0));

        let mut rng = StdRng::seed_from_u64(19);
        for _ in 0..100 {
            assert!(config.star_twinkle_speed.sample(&mut rng).is_finite());
        }
        let field = crate::pulse::PulseField::new(config, false, Some(1));
        assert_eq!(field.stats().nodes, 0);
    }

    #[test]
    fn degenerate_span_samples_its_minimum() {
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(Span::new(2.0, 2.0).sample(&mut rng), 2.0);
        let value = Span::new(1.0, 3.0).sample(&mut rng);
        assert!((1.0..=3.0).contains(&value));
    }
}
