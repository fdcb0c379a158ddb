//! Initial population placement.
//!
//! A [`SpawnContext`] is handed to the spawner once per agent, in id order,
//! and carries a single seeded RNG through the whole population, so the same
//! seed always yields the same population.
//!
//! ```ignore
//! // The standard Circles layout: uniform in the environment cube.
//! let agents = spawn_population(4096, bounds, 7, |ctx| ctx.random_in_bounds());
//! ```

use glam::DVec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::agent::Agent;
use crate::spatial::Bounds;

/// Context provided to spawner functions.
pub struct SpawnContext {
    /// Index of the agent being spawned, also its id.
    pub index: u32,
    /// Total number of agents being spawned.
    pub count: u32,
    /// Environment bounds.
    pub bounds: Bounds,
    rng: SmallRng,
}

impl SpawnContext {
    pub(crate) fn new(count: u32, bounds: Bounds, seed: u64) -> Self {
        Self {
            index: 0,
            count,
            bounds,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Normalized progress through the spawn (0.0 to 1.0).
    #[inline]
    pub fn progress(&self) -> f64 {
        self.index as f64 / self.count as f64
    }

    /// Random f64 in `[min, max)`. Returns `min` when the range is empty.
    #[inline]
    pub fn random_range(&mut self, min: f64, max: f64) -> f64 {
        if min < max {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    /// Uniform random point inside the environment bounds.
    pub fn random_in_bounds(&mut self) -> DVec3 {
        let Bounds { min, max } = self.bounds;
        DVec3::new(
            self.rng.gen_range(min.x..max.x),
            self.rng.gen_range(min.y..max.y),
            self.rng.gen_range(min.z..max.z),
        )
    }

    /// Uniform random point inside a sphere centered at `center`.
    pub fn random_in_sphere(&mut self, center: DVec3, radius: f64) -> DVec3 {
        // rejection sampling keeps the distribution uniform in volume
        loop {
            let p = DVec3::new(
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
                self.rng.gen_range(-1.0..1.0),
            );
            if p.length_squared() <= 1.0 {
                return center + p * radius;
            }
        }
    }

    /// Position of this agent on a regular `nx * ny * nz` lattice filling the
    /// bounds, one agent per lattice cell center. Wraps once the lattice is
    /// full.
    pub fn grid_position(&self, nx: u32, ny: u32, nz: u32) -> DVec3 {
        let (nx, ny, nz) = (u64::from(nx.max(1)), u64::from(ny.max(1)), u64::from(nz.max(1)));
        let i = u64::from(self.index) % nx.saturating_mul(ny).saturating_mul(nz);
        let cell = DVec3::new((i % nx) as f64, ((i / nx) % ny) as f64, (i / (nx * ny)) as f64);
        let step = self.bounds.size() / DVec3::new(nx as f64, ny as f64, nz as f64);
        self.bounds.min + (cell + 0.5) * step
    }
}

/// Build a population of `count` agents with ids `0..count`.
///
/// `spawner` returns each agent's initial position; drift starts at zero.
pub fn spawn_population<F>(count: u32, bounds: Bounds, seed: u64, mut spawner: F) -> Vec<Agent>
where
    F: FnMut(&mut SpawnContext) -> DVec3,
{
    let mut ctx = SpawnContext::new(count, bounds, seed);
    (0..count)
        .map(|i| {
            ctx.index = i;
            Agent::new(u64::from(i), spawner(&mut ctx))
        })
        .collect()
}

/// The standard Circles population: uniform in `bounds`.
pub fn spawn_uniform(count: u32, bounds: Bounds, seed: u64) -> Vec<Agent> {
    spawn_population(count, bounds, seed, SpawnContext::random_in_bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_context_progress() {
        let mut ctx = SpawnContext::new(100, Bounds::cube(0.0, 1.0), 0);
        ctx.index = 50;
        assert!((ctx.progress() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_uniform_population_in_bounds() {
        let bounds = Bounds::cube(0.0, 10.0);
        let agents = spawn_uniform(500, bounds, 3);
        assert_eq!(agents.len(), 500);
        for (i, a) in agents.iter().enumerate() {
            assert_eq!(a.id, i as u64);
            assert_eq!(a.drift, 0.0);
            assert!(bounds.contains(a.position));
        }
    }

    #[test]
    fn test_same_seed_same_population() {
        let bounds = Bounds::cube(0.0, 5.0);
        assert_eq!(spawn_uniform(64, bounds, 11), spawn_uniform(64, bounds, 11));
        assert_ne!(spawn_uniform(64, bounds, 11), spawn_uniform(64, bounds, 12));
    }

    #[test]
    fn test_random_in_sphere() {
        let mut ctx = SpawnContext::new(1, Bounds::cube(0.0, 1.0), 5);
        let center = DVec3::splat(3.0);
        for _ in 0..100 {
            let p = ctx.random_in_sphere(center, 0.5);
            assert!(p.distance(center) <= 0.5 + 1e-12);
        }
    }

    #[test]
    fn test_random_range() {
        let mut ctx = SpawnContext::new(1, Bounds::cube(0.0, 1.0), 8);
        for _ in 0..100 {
            let x = ctx.random_range(-2.0, 3.0);
            assert!((-2.0..3.0).contains(&x));
        }
        assert_eq!(ctx.random_range(4.0, 4.0), 4.0);
        assert_eq!(ctx.random_range(5.0, 1.0), 5.0);
    }

    #[test]
    fn test_grid_position_large_lattice() {
        let mut ctx = SpawnContext::new(u32::MAX, Bounds::cube(0.0, 1.0), 0);
        ctx.index = u32::MAX - 1;
        let p = ctx.grid_position(u32::MAX, u32::MAX, u32::MAX);
        assert!(p.is_finite());
        assert!(ctx.bounds.contains(p));
    }

    #[test]
    fn test_grid_position() {
        let agents = spawn_population(8, Bounds::cube(0.0, 2.0), 0, |ctx| ctx.grid_position(2, 2, 2));
        assert_eq!(agents[0].position, DVec3::splat(0.5));
        assert_eq!(agents[1].position, DVec3::new(1.5, 0.5, 0.5));
        assert_eq!(agents[7].position, DVec3::splat(1.5));
    }
}
