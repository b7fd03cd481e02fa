use bytemuck::{Pod, Zeroable};
use nalgebra::Vector2;
use rand::Rng;
use rand::RngCore;

use crate::color_matrix::Rgba;

pub type Vec2 = Vector2<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    /// Position at the previous step; Verlet state
    pub last_position: Vec2,
    /// Recomputed every step
    pub net_force: Vec2,
    pub species: usize,
    /// Index in the particle array at creation, never reused
    pub id: usize,
    /// Valid between a grid rebuild and the next integration
    pub cell_index: usize,
}

impl Particle {
    /// A particle at rest at `position`.
    pub fn new(id: usize, species: usize, position: Vec2) -> Self {
        Self {
            position,
            last_position: position,
            net_force: Vec2::zeros(),
            species,
            id,
            cell_index: 0,
        }
    }

    /// A particle that moved by `displacement` during the last step.
    pub fn with_displacement(id: usize, species: usize, position: Vec2, displacement: Vec2) -> Self {
        Self {
            last_position: position - displacement,
            ..Self::new(id, species, position)
        }
    }

    pub fn displacement(&self) -> Vec2 {
        self.position - self.last_position
    }

    pub fn velocity(&self, dt: f64) -> Vec2 {
        self.displacement() / dt
    }
}

/// GPU-friendly copy of a particle for a renderer to upload
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl ParticleInstance {
    pub fn new(particle: &Particle, color: Rgba) -> Self {
        Self {
            position: [particle.position.x as f32, particle.position.y as f32],
            color,
        }
    }
}

/// Chooses where a freshly created particle starts inside `[-extent, extent]²`
pub trait PositionSetter: Send + Sync {
    fn set_position(&self, rng: &mut dyn RngCore, species: usize, num_species: usize, extent: f64) -> Vec2;
}

/// Uniform over the whole domain
pub struct UniformPositionSetter;

impl PositionSetter for UniformPositionSetter {
    fn set_position(&self, rng: &mut dyn RngCore, _species: usize, _num_species: usize, extent: f64) -> Vec2 {
        Vec2::new(rng.gen_range(-extent..extent), rng.gen_range(-extent..extent))
    }
}

pub struct CenterPositionSetter;

impl PositionSetter for CenterPositionSetter {
    fn set_position(&self, rng: &mut dyn RngCore, _species: usize, _num_species: usize, extent: f64) -> Vec2 {
        let scale = 0.3 * extent;
        Vec2::new(rng.gen_range(-1.0..1.0) * scale, rng.gen_range(-1.0..1.0) * scale)
    }
}

pub struct RingPositionSetter;

impl PositionSetter for RingPositionSetter {
    fn set_position(&self, rng: &mut dyn RngCore, _species: usize, _num_species: usize, extent: f64) -> Vec2 {
        let angle = rng.gen_range(0.0..2.0 * std::f64::consts::PI);
        let radius = extent * (0.7 + 0.02 * rng.gen_range(-1.0..1.0));
        Vec2::new(angle.cos() * radius, angle.sin() * radius)
    }
}

/// Each species gets its own slice of a ring
pub struct RainbowRingPositionSetter;

impl PositionSetter for RainbowRingPositionSetter {
    fn set_position(&self, rng: &mut dyn RngCore, species: usize, num_species: usize, extent: f64) -> Vec2 {
        let n = num_species.max(1) as f64;
        let angle = (0.3 * rng.gen_range(-1.0..1.0) + species as f64) / n * 2.0 * std::f64::consts::PI;
        let radius = extent * (0.7 + 0.02 * rng.gen_range(-1.0..1.0));
        Vec2::new(angle.cos() * radius, angle.sin() * radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn new_particle_is_at_rest() {
        let p = Particle::new(3, 1, Vec2::new(1.0, -2.0));
        assert_eq!(p.displacement(), Vec2::zeros());
        assert_eq!(p.id, 3);
        assert_eq!(p.species, 1);
    }

    #[test]
    fn velocity_divides_displacement_by_dt() {
        let p = Particle::with_displacement(0, 0, Vec2::new(1.0, 1.0), Vec2::new(0.5, -0.25));
        assert_eq!(p.velocity(0.5), Vec2::new(1.0, -0.5));
    }

    #[test]
    fn setters_stay_inside_domain() {
        let mut rng = StdRng::seed_from_u64(11);
        let extent = 25.0;
        let setters: [&dyn PositionSetter; 4] = [
            &UniformPositionSetter,
            &CenterPositionSetter,
            &RingPositionSetter,
            &RainbowRingPositionSetter,
        ];
        for setter in setters {
            for species in 0..50 {
                let p = setter.set_position(&mut rng, species % 5, 5, extent);
                assert!(p.x.abs() <= extent && p.y.abs() <= extent, "{p:?}");
            }
        }
    }

    #[test]
    fn instance_is_plain_bytes() {
        let p = Particle::new(0, 0, Vec2::new(2.0, 3.0));
        let instances = [ParticleInstance::new(&p, [1.0, 0.0, 0.0, 1.0])];
        let bytes: &[u8] = bytemuck::cast_slice(&instances);
        assert_eq!(bytes.len(), std::mem::size_of::<ParticleInstance>());
        assert_eq!(instances[0].position, [2.0, 3.0]);
    }
}
