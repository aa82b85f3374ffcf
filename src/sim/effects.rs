//! Short-lived visual particles
//!
//! Purely cosmetic: never serialized, never read by gameplay code.

use glam::Vec2;
use rand::Rng;

/// Default particle cap when settings don't override it
pub const MAX_PARTICLES: usize = 256;

/// A particle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    /// 1.0 at spawn, removed at 0
    pub life: f32,
    pub size: f32,
}

/// Bounded particle pool
#[derive(Debug, Clone)]
pub struct Particles {
    pub items: Vec<Particle>,
    cap: usize,
}

impl Default for Particles {
    fn default() -> Self {
        Self::with_cap(MAX_PARTICLES)
    }
}

impl Particles {
    /// A cap of 0 disables particles entirely
    pub fn with_cap(cap: usize) -> Self {
        Self {
            items: Vec::new(),
            cap,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Spray `count` particles outward from `pos`; extras past the cap are dropped
    pub fn burst(&mut self, rng: &mut impl Rng, pos: Vec2, count: usize, speed: f32, color: u32) {
        let room = self.cap.saturating_sub(self.items.len());
        for _ in 0..count.min(room) {
            let angle = rng.random_range(0.0..std::f32::consts::TAU);
            let s = speed * rng.random_range(0.4..1.0);
            self.items.push(Particle {
                pos,
                vel: Vec2::from_angle(angle) * s,
                color,
                life: 1.0,
                size: rng.random_range(1.5..3.5),
            });
        }
    }

    /// Integrate and age; `gravity` is added to velocity each second
    pub fn update(&mut self, dt: f32, gravity: Vec2) {
        for p in &mut self.items {
            p.vel += gravity * dt;
            p.vel *= 0.98;
            p.pos += p.vel * dt;
            p.life -= dt * 1.5;
            p.size *= 0.995;
        }
        self.items.retain(|p| p.life > 0.0);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_burst_respects_cap() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut particles = Particles::with_cap(10);
        particles.burst(&mut rng, Vec2::ZERO, 8, 50.0, 0xffffff);
        particles.burst(&mut rng, Vec2::ZERO, 8, 50.0, 0xffffff);
        assert_eq!(particles.len(), 10);

        let mut off = Particles::with_cap(0);
        off.burst(&mut rng, Vec2::ZERO, 8, 50.0, 0xffffff);
        assert!(off.is_empty());
    }

    #[test]
    fn test_particles_expire() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut particles = Particles::default();
        particles.burst(&mut rng, Vec2::ZERO, 5, 50.0, 0);
        for _ in 0..60 {
            particles.update(1.0 / 60.0, Vec2::new(0.0, 300.0));
        }
        assert!(particles.is_empty());
    }
}
