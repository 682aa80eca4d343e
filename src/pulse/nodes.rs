use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};
use rand::Rng;

use super::config::PulseConfig;
use super::lifecycle::opacity;

pub type NodeId = u64;

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub birth: f64,
    pub lifetime: f32,
    pub radius: f32,
}

impl Node {
    // Free to leave the unit square.
    pub fn position_at(&self, now: f64) -> Vec2 {
        self.pos + self.velocity * self.age(now)
    }

    pub fn age(&self, now: f64) -> f32 {
        (now - self.birth) as f32
    }

    pub fn remaining(&self, now: f64) -> f32 {
        self.lifetime - self.age(now)
    }

    pub fn is_expired(&self, now: f64) -> bool {
        self.age(now) > self.lifetime
    }

    pub fn opacity(&self, now: f64) -> f32 {
        opacity(self.age(now), self.lifetime)
    }
}

#[derive(Debug, Default)]
pub struct NodePool {
    nodes: Vec<Node>,
    next_id: NodeId,
}

impl NodePool {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[Node] {
        &self.nodes
    }

    #[cfg(test)]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    #[cfg(test)]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Steady-state spawn. Candidates too close to a live node's drifted position are
    /// rejected; when every attempt is rejected nothing is spawned.
    pub fn spawn<R: Rng + ?Sized>(
        &mut self,
        now: f64,
        rng: &mut R,
        config: &PulseConfig,
    ) -> Option<NodeId> {
        if self.nodes.len() >= config.max_nodes {
            return None;
        }

        let min_distance_sq = config.node_min_distance * config.node_min_distance;
        for _ in 0..config.node_spawn_attempts {
            let candidate = vec2(rng.r#gen::<f32>(), rng.r#gen::<f32>());
            let crowded = self.nodes.iter().any(|node| {
                !node.is_expired(now)
                    && (node.position_at(now) - candidate).length_sq() < min_distance_sq
            });
            if crowded {
                continue;
            }

            let lifetime = config.node_lifetime_secs.sample(rng);
            return Some(self.insert(candidate, now, lifetime, rng, config));
        }

        None
    }

    /// Startup population with backdated births so the field does not open empty.
    /// Spacing is checked against the static positions of nodes placed so far.
    pub fn seed<R: Rng + ?Sized>(&mut self, now: f64, rng: &mut R, config: &PulseConfig) -> usize {
        let min_distance_sq = config.node_min_distance * config.node_min_distance;
        let target = config.seed_nodes.min(config.max_nodes);
        let mut placed = 0;

        for _ in 0..target {
            if self.nodes.len() >= config.max_nodes {
                break;
            }

            for _ in 0..config.node_spawn_attempts {
                let candidate = vec2(rng.r#gen::<f32>(), rng.r#gen::<f32>());
                if self
                    .nodes
                    .iter()
                    .any(|node| (node.pos - candidate).length_sq() < min_distance_sq)
                {
                    continue;
                }

                let lifetime = config.node_lifetime_secs.sample(rng);
                let backdate = rng.gen_range(0.0..=0.5_f32) * lifetime;
                self.insert(candidate, now - f64::from(backdate), lifetime, rng, config);
                placed += 1;
                break;
            }
        }

        placed
    }

    pub fn prune(&mut self, now: f64) -> usize {
        let before = self.nodes.len();
        self.nodes.retain(|node| !node.is_expired(now));
        before - self.nodes.len()
    }

    fn insert<R: Rng + ?Sized>(
        &mut self,
        pos: Vec2,
        birth: f64,
        lifetime: f32,
        rng: &mut R,
        config: &PulseConfig,
    ) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;

        let angle = rng.gen_range(0.0..TAU);
        let speed = rng.r#gen::<f32>() * config.node_drift_per_sec;
        self.nodes.push(Node {
            id,
            pos,
            velocity: vec2(angle.cos(), angle.sin()) * speed,
            birth,
            lifetime,
            radius: config.node_radius_px.sample(rng),
        });
        id
    }

    #[cfg(test)]
    pub(super) fn push_for_test(&mut self, pos: Vec2, birth: f64, lifetime: f32) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.push(Node {
            id,
            pos,
            velocity: Vec2::ZERO,
            birth,
            lifetime,
            radius: 2.0,
        });
        id
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn drift_is_not_clamped() {
        let node = Node {
            id: 0,
            pos: vec2(0.95, 0.5),
            velocity: vec2(0.1, 0.0),
            birth: 0.0,
            lifetime: 10.0,
            radius: 2.0,
        };
        assert!((node.position_at(2.0).x - 1.15).abs() < 1e-6);
        assert!(node.remaining(4.0) > 5.9);
    }

    #[test]
    fn spawn_respects_capacity() {
        let config = PulseConfig {
            max_nodes: 3,
            ..PulseConfig::default()
        };
        let mut pool = NodePool::default();
        for index in 0..3 {
            pool.push_for_test(vec2(index as f32 * 0.3, 0.1), 0.0, 20.0);
        }
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(pool.spawn(1.0, &mut rng, &config), None);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn spawned_nodes_keep_minimum_spacing() {
        let config = PulseConfig {
            max_nodes: 200,
            node_drift_per_sec: 0.0,
            ..PulseConfig::default()
        };
        let mut pool = NodePool::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..400 {
            pool.spawn(0.0, &mut rng, &config);
        }

        let nodes = pool.as_slice();
        assert!(nodes.len() > 10);
        for (index, a) in nodes.iter().enumerate() {
            for b in &nodes[index + 1..] {
                assert!((a.pos - b.pos).length_sq() >= config.node_min_distance.powi(2));
            }
        }
    }

    #[test]
    fn spawn_backs_off_silently_when_space_is_exhausted() {
        let config = PulseConfig {
            node_min_distance: 2.0,
            ..PulseConfig::default()
        };
        let mut pool = NodePool::default();
        pool.push_for_test(vec2(0.5, 0.5), 0.0, 20.0);
        let mut rng = StdRng::seed_from_u64(5);

        assert_eq!(pool.spawn(1.0, &mut rng, &config), None);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn expired_neighbours_do_not_block_spawning() {
        let config = PulseConfig {
            node_min_distance: 2.0,
            ..PulseConfig::default()
        };
        let mut pool = NodePool::default();
        pool.push_for_test(vec2(0.5, 0.5), 0.0, 1.0);
        let mut rng = StdRng::seed_from_u64(5);

        assert!(pool.spawn(5.0, &mut rng, &config).is_some());
    }

    #[test]
    fn seeding_backdates_births_and_assigns_unique_ids() {
        let config = PulseConfig::default();
        let mut pool = NodePool::default();
        let mut rng = StdRng::seed_from_u64(42);
        let placed = pool.seed(0.0, &mut rng, &config);

        assert_eq!(placed, pool.len());
        assert!(placed > config.seed_nodes / 2);
        assert!(pool.iter().all(|node| node.birth <= 0.0 && !node.is_expired(0.0)));
        assert!(pool.iter().any(|node| node.birth < 0.0));

        let ids = pool.iter().map(|node| node.id).collect::<HashSet<_>>();
        assert_eq!(ids.len(), placed);
    }

    #[test]
    fn ages_stay_precise_late_in_a_long_session() {
        let node = Node {
            id: 0,
            pos: vec2(0.5, 0.5),
            velocity: vec2(0.01, 0.0),
            birth: 600_000.0,
            lifetime: 10.0,
            radius: 2.0,
        };
        let now = 600_000.0 + 1.0 / 60.0;
        assert!((node.age(now) - 1.0 / 60.0).abs() < 1e-6);
        assert!(!node.is_expired(600_009.9));
        assert!(node.is_expired(600_010.1));
    }

    #[test]
    fn prune_removes_only_expired_nodes() {
        let mut pool = NodePool::default();
        let short = pool.push_for_test(vec2(0.1, 0.1), 0.0, 2.0);
        let long = pool.push_for_test(vec2(0.9, 0.9), 0.0, 20.0);

        assert_eq!(pool.prune(2.0), 0);
        assert_eq!(pool.prune(2.5), 1);
        assert!(!pool.contains(short));
        assert!(pool.contains(long));
    }
}
