use std::collections::HashMap;

use eframe::egui::{Color32, Pos2, Vec2, vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use super::color::{NEUTRAL, Rgb, frame_rate_for, lerp_color, target_color};
use super::config::PulseConfig;
use super::connections::{ConnectionPool, to_pixels};
use super::nodes::{NodeId, NodePool};
use super::stars::{Star, generate_stars};
use super::surface::Surface;

const STAR_COLOR: Rgb = Rgb::new(214.0, 226.0, 255.0);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PulseStats {
    pub nodes: usize,
    pub connections: usize,
    pub time_secs: f64,
    pub color: Rgb,
}

#[derive(Default)]
struct FrameScratch {
    screen_positions: Vec<Pos2>,
    opacities: Vec<f32>,
    index_by_id: HashMap<NodeId, usize>,
}

pub struct PulseField {
    config: PulseConfig,
    reduced_motion: bool,
    rng: StdRng,
    stars: Vec<Star>,
    nodes: NodePool,
    connections: ConnectionPool,
    time: f64,
    last_node_spawn: f64,
    last_connection_spawn: f64,
    seeded: bool,
    current_color: Rgb,
    risk_score: Option<f32>,
    pixels_per_point: f32,
    backing_size: Vec2,
    deferral_logged: bool,
    drain_logged: bool,
    scratch: FrameScratch,
}

impl PulseField {
    pub fn new(config: PulseConfig, reduced_motion: bool, seed: Option<u64>) -> Self {
        let config = config.sanitized();
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let stars = generate_stars(&mut rng, &config);
        info!(
            stars = stars.len(),
            reduced_motion,
            seeded_rng = seed.is_some(),
            "network pulse initialized"
        );

        Self {
            config,
            reduced_motion,
            rng,
            stars,
            nodes: NodePool::default(),
            connections: ConnectionPool::default(),
            time: 0.0,
            last_node_spawn: 0.0,
            last_connection_spawn: 0.0,
            seeded: false,
            current_color: NEUTRAL,
            risk_score: None,
            pixels_per_point: 1.0,
            backing_size: Vec2::ZERO,
            deferral_logged: false,
            drain_logged: false,
            scratch: FrameScratch::default(),
        }
    }

    pub fn set_risk_score(&mut self, score: Option<f32>) {
        let score = score.filter(|value| !value.is_nan());
        if score != self.risk_score {
            debug!(?score, "risk score updated");
        }
        self.risk_score = score;
    }

    pub fn risk_score(&self) -> Option<f32> {
        self.risk_score
    }

    pub fn resize(&mut self, client_size: Vec2, pixels_per_point: f32) {
        let pixels_per_point = if pixels_per_point.is_finite() && pixels_per_point > 0.0 {
            pixels_per_point
        } else {
            1.0
        };
        let backing_size = vec2(
            (client_size.x.max(0.0) * pixels_per_point).floor(),
            (client_size.y.max(0.0) * pixels_per_point).floor(),
        );
        if backing_size != self.backing_size {
            debug!(
                width = backing_size.x,
                height = backing_size.y,
                pixels_per_point,
                "pulse surface resized"
            );
        }

        self.pixels_per_point = pixels_per_point;
        self.backing_size = backing_size;
    }

    pub fn backing_size(&self) -> Vec2 {
        self.backing_size
    }

    pub fn pixels_per_point(&self) -> f32 {
        self.pixels_per_point
    }

    fn surface_ready(&self) -> bool {
        self.backing_size.x >= 1.0 && self.backing_size.y >= 1.0
    }

    pub fn stats(&self) -> PulseStats {
        PulseStats {
            nodes: self.nodes.len(),
            connections: self.connections.len(),
            time_secs: self.time,
            color: self.current_color,
        }
    }

    #[cfg(test)]
    fn current_color(&self) -> Rgb {
        self.current_color
    }

    #[cfg(test)]
    fn nodes(&self) -> &NodePool {
        &self.nodes
    }

    #[cfg(test)]
    fn connections(&self) -> &ConnectionPool {
        &self.connections
    }

    /// Runs one frame of simulation. Returns `false` when the frame was deferred
    /// because the surface has no usable size yet.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.surface_ready() {
            if !self.deferral_logged {
                debug!("pulse surface has zero size, deferring frame");
                self.deferral_logged = true;
            }
            return false;
        }
        self.deferral_logged = false;

        if !self.seeded {
            self.seed();
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        self.time += f64::from(dt);
        let now = self.time;

        lerp_color(
            &mut self.current_color,
            target_color(self.risk_score),
            frame_rate_for(self.config.color_smoothing_rate, dt),
        );

        if !self.reduced_motion {
            if now - self.last_node_spawn >= f64::from(self.config.node_spawn_interval_secs) {
                self.nodes.spawn(now, &mut self.rng, &self.config);
                self.last_node_spawn = now;
            }

            let connection_interval = f64::from(self.config.connection_spawn_interval_secs);
            if now - self.last_connection_spawn >= connection_interval {
                self.connections.try_spawn(
                    now,
                    &self.nodes,
                    self.backing_size,
                    &mut self.rng,
                    &self.config,
                );
                self.last_connection_spawn = now;
            }
        }

        self.nodes.prune(now);
        self.connections.prune(now, &self.nodes);

        let drained = self.nodes.is_empty() && self.connections.is_empty();
        if drained && !self.drain_logged {
            info!(time_secs = now, "network pulse drained");
        }
        self.drain_logged = drained;

        self.update_scratch();
        true
    }

    fn seed(&mut self) {
        let now = self.time;
        let nodes = self.nodes.seed(now, &mut self.rng, &self.config);
        let connections = self.connections.seed(
            now,
            &self.nodes,
            self.backing_size,
            &mut self.rng,
            &self.config,
        );
        self.seeded = true;
        info!(nodes, connections, "network pulse seeded");
    }

    fn update_scratch(&mut self) {
        let now = self.time;
        let scratch = &mut self.scratch;
        scratch.screen_positions.clear();
        scratch.opacities.clear();
        scratch.index_by_id.clear();
        for (index, node) in self.nodes.iter().enumerate() {
            scratch
                .screen_positions
                .push(to_pixels(node.position_at(now), self.backing_size).to_pos2());
            scratch.opacities.push(node.opacity(now));
            scratch.index_by_id.insert(node.id, index);
        }
    }

    pub fn paint<S: Surface + ?Sized>(&self, surface: &mut S) {
        if !self.surface_ready() {
            return;
        }

        let config = &self.config;
        let now = self.time;
        let scale = self.pixels_per_point;
        let [bg_r, bg_g, bg_b] = config.background;
        surface.fill_rect(Pos2::ZERO, self.backing_size, Color32::from_rgb(bg_r, bg_g, bg_b));

        for star in &self.stars {
            surface.fill_circle(
                to_pixels(star.pos, self.backing_size).to_pos2(),
                star.radius * scale,
                STAR_COLOR.with_alpha(star.opacity_at(now)),
            );
        }

        let scratch = &self.scratch;
        let color = self.current_color;
        let falloff = (self.backing_size.length() * config.edge_falloff_fraction).max(1.0);
        for connection in self.connections.iter() {
            let (Some(&a), Some(&b)) = (
                scratch.index_by_id.get(&connection.a),
                scratch.index_by_id.get(&connection.b),
            ) else {
                continue;
            };

            let fade_in = if config.connection_fade_in_secs > 0.0 {
                (connection.age(now) / config.connection_fade_in_secs).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let endpoint = scratch.opacities[a].min(scratch.opacities[b]);
            let start = scratch.screen_positions[a];
            let end = scratch.screen_positions[b];
            let length = (end - start).length();
            let alpha = fade_in * endpoint * (-length / falloff).exp() * config.edge_max_alpha;
            if alpha <= 0.0 {
                continue;
            }

            surface.stroke_line(start, end, config.edge_width_px * scale, color.with_alpha(alpha));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let Some(&opacity) = scratch.opacities.get(index) else {
                continue;
            };
            if opacity <= 0.0 {
                continue;
            }
            surface.radial_gradient(
                scratch.screen_positions[index],
                node.radius * config.glow_radius_scale * scale,
                color.with_alpha(opacity * config.glow_max_alpha),
            );
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let Some(&opacity) = scratch.opacities.get(index) else {
                continue;
            };
            if opacity <= 0.0 {
                continue;
            }
            surface.fill_circle(
                scratch.screen_positions[index],
                node.radius * scale,
                color.with_alpha(opacity * config.core_max_alpha),
            );
        }
    }
}

pub fn run_headless<S: Surface + ?Sized>(
    field: &mut PulseField,
    surface: &mut S,
    frames: usize,
    dt: f32,
) -> PulseStats {
    let log_every = ((1.0 / dt.max(1e-3)) as usize).max(1) * 5;
    for frame in 0..frames {
        field.advance(dt);
        field.paint(surface);
        if frame % log_every == 0 {
            let stats = field.stats();
            debug!(
                frame,
                nodes = stats.nodes,
                connections = stats.connections,
                time_secs = stats.time_secs,
                "headless pulse frame"
            );
        }
    }
    field.stats()
}
