//! Cosmetic particles (clue sparks, ghost mist)

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining life in [0, 1]
    pub life: f32,
    pub color: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particles {
    list: Vec<Particle>,
    max: usize,
}

impl Particles {
    pub fn new(max: usize) -> Self {
        Self {
            list: Vec::new(),
            max,
        }
    }

    /// Burst `count` particles at `pos` with random velocities in [-1, 1]².
    /// The oldest particles are dropped once the cap is reached.
    pub fn emit<R: Rng>(&mut self, rng: &mut R, pos: Vec2, count: usize, color: [u8; 3]) {
        for _ in 0..count {
            let vel = Vec2::new(
                (rng.random::<f32>() - 0.5) * 2.0,
                (rng.random::<f32>() - 0.5) * 2.0,
            );
            self.list.push(Particle {
                pos,
                vel,
                life: 1.0,
                color,
            });
        }
        if self.list.len() > self.max {
            let excess = self.list.len() - self.max;
            self.list.drain(..excess);
        }
    }

    /// Integrate and age; dead particles are removed
    pub fn update(&mut self, dt: f32, gravity: f32, fade_rate: f32) {
        for p in &mut self.list {
            p.pos += p.vel * dt;
            p.vel.y += gravity * dt;
            p.life -= dt * fade_rate;
        }
        self.list.retain(|p| p.life > 0.0);
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.list.iter()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_particles_fade_out() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut p = Particles::new(64);
        p.emit(&mut rng, Vec2::new(2.0, 2.0), 10, [255, 215, 0]);
        assert_eq!(p.len(), 10);
        assert!(p.iter().all(|q| q.vel.x.abs() <= 1.0 && q.vel.y.abs() <= 1.0));
        p.update(0.5, 1.5, 0.8);
        assert_eq!(p.len(), 10);
        assert!(p.iter().all(|q| (q.life - 0.6).abs() < 1e-5));
        p.update(1.0, 1.5, 0.8);
        assert!(p.is_empty());
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut p = Particles::new(8);
        p.emit(&mut rng, Vec2::ZERO, 1, [0, 0, 0]);
        let before = p.iter().next().unwrap().vel.y;
        p.update(0.1, 1.5, 0.8);
        let after = p.iter().next().unwrap().vel.y;
        assert!((after - before - 0.15).abs() < 1e-5);
    }

    #[test]
    fn test_cap_drops_oldest() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut p = Particles::new(5);
        p.emit(&mut rng, Vec2::ZERO, 4, [1, 1, 1]);
        p.emit(&mut rng, Vec2::ONE, 4, [2, 2, 2]);
        assert_eq!(p.len(), 5);
        assert_eq!(p.iter().filter(|q| q.color == [2, 2, 2]).count(), 4);
    }
}
