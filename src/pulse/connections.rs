use std::collections::HashSet;

use eframe::egui::Vec2;
use rand::Rng;

use super::config::PulseConfig;
use super::nodes::{Node, NodeId, NodePool};

pub fn pair_key(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

#[derive(Clone, Debug)]
pub struct Connection {
    pub a: NodeId,
    pub b: NodeId,
    pub birth: f64,
    pub lifetime: f32,
}

impl Connection {
    pub fn age(&self, now: f64) -> f32 {
        (now - self.birth) as f32
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.age(now) > self.lifetime
    }
}

#[derive(Debug, Default)]
pub struct ConnectionPool {
    connections: Vec<Connection>,
    pairs: HashSet<(NodeId, NodeId)>,
}

impl ConnectionPool {
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    pub fn joins(&self, a: NodeId, b: NodeId) -> bool {
        self.pairs.contains(&pair_key(a, b))
    }

    /// Picks a visible origin and links it to one peer, favouring close peers
    /// exponentially. Every unsatisfiable constraint is a silent no-op.
    pub fn try_spawn<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        nodes: &NodePool,
        surface_size: Vec2,
        rng: &mut R,
        config: &PulseConfig,
    ) -> bool {
        if self.connections.len() >= config.max_connections {
            return false;
        }

        // Expired nodes linger until the frame's prune pass.
        let live = nodes
            .iter()
            .filter(|node| !node.is_expired(now))
            .collect::<Vec<_>>();
        if live.len() < 2 {
            return false;
        }

        let origin = live[rng.gen_range(0..live.len())];
        if origin.opacity(now) < config.connection_origin_min_opacity {
            return false;
        }

        let reference = reference_distance(surface_size, config);
        let origin_px = to_pixels(origin.position_at(now), surface_size);
        let mut candidates: Vec<(&Node, f32)> = Vec::new();
        let mut total_weight = 0.0_f32;
        for &peer in &live {
            if peer.id == origin.id
                || peer.opacity(now) < config.connection_peer_min_opacity
                || self.joins(origin.id, peer.id)
            {
                continue;
            }

            let distance = (to_pixels(peer.position_at(now), surface_size) - origin_px).length();
            let weight = (-distance / reference).exp();
            total_weight += weight;
            candidates.push((peer, weight));
        }

        if candidates.is_empty() || total_weight <= 0.0 {
            return false;
        }

        let mut draw = rng.r#gen::<f32>() * total_weight;
        let mut chosen = candidates[candidates.len() - 1].0;
        for (peer, weight) in &candidates {
            if draw < *weight {
                chosen = *peer;
                break;
            }
            draw -= weight;
        }

        let lifetime = origin.remaining(now).min(chosen.remaining(now));
        if lifetime < config.connection_min_lifetime_secs {
            return false;
        }

        self.insert(origin.id, chosen.id, now, lifetime)
    }

    /// Startup links on undrifted positions: stops at the configured count or when
    /// the attempt budget runs out.
    pub fn seed<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        nodes: &NodePool,
        surface_size: Vec2,
        rng: &mut R,
        config: &PulseConfig,
    ) -> usize {
        let live = nodes.as_slice();
        if live.len() < 2 {
            return 0;
        }

        let reference = reference_distance(surface_size, config);
        let target = config.seed_connections.min(config.max_connections);
        let mut created = 0;
        for _ in 0..config.seed_connection_attempts {
            if created >= target || self.connections.len() >= config.max_connections {
                break;
            }

            let a = &live[rng.gen_range(0..live.len())];
            let b = &live[rng.gen_range(0..live.len())];
            if a.id == b.id || self.joins(a.id, b.id) {
                continue;
            }

            let distance =
                (to_pixels(a.pos, surface_size) - to_pixels(b.pos, surface_size)).length();
            if rng.r#gen::<f32>() >= (-distance / reference).exp() {
                continue;
            }

            let lifetime = a.remaining(now).min(b.remaining(now));
            if lifetime < config.connection_min_lifetime_secs {
                continue;
            }

            if self.insert(a.id, b.id, now, lifetime) {
                created += 1;
            }
        }

        created
    }

    pub fn prune(&mut self, now: f64, nodes: &NodePool) -> usize {
        let live_ids = nodes.iter().map(|node| node.id).collect::<HashSet<_>>();
        let before = self.connections.len();
        let pairs = &mut self.pairs;
        self.connections.retain(|connection| {
            let keep = !connection.is_expired(now)
                && live_ids.contains(&connection.a)
                && live_ids.contains(&connection.b);
            if !keep {
                pairs.remove(&pair_key(connection.a, connection.b));
            }
            keep
        });
        before - self.connections.len()
    }

    fn insert(&mut self, a: NodeId, b: NodeId, birth: f64, lifetime: f32) -> bool {
        if a == b || !self.pairs.insert(pair_key(a, b)) {
            return false;
        }

        self.connections.push(Connection {
            a,
            b,
            birth,
            lifetime,
        });
        true
    }
}

pub(super) fn to_pixels(normalized: Vec2, surface_size: Vec2) -> Vec2 {
    Vec2::new(normalized.x * surface_size.x, normalized.y * surface_size.y)
}

fn reference_distance(surface_size: Vec2, config: &PulseConfig) -> f32 {
    (surface_size.length() * config.connection_reference_fraction).max(1.0)
}
