use crate::color_matrix::ColorMatrix;
use crate::particle::{Particle, Vec2};

use super::grid::SpatialGrid;

/// Scalars of the pair force, copied out of the system once per step
#[derive(Debug, Clone, Copy)]
pub struct ForceParams {
    pub extent: f64,
    pub interaction_radius: f64,
    /// Fraction of the interaction radius that always repels
    pub repulsion_fraction: f64,
    pub friction: f64,
    pub force_scale: f64,
}

/// Shortest vector from `a` to `b` on the torus `[-extent, extent]²`.
pub fn toroidal_delta(a: &Vec2, b: &Vec2, extent: f64) -> Vec2 {
    let mut delta = b - a;
    for d in delta.iter_mut() {
        if d.abs() > extent {
            *d -= 2.0 * extent * d.signum();
        }
    }
    delta
}

/// Signed strength at `distance`; negative pushes apart.
///
/// Inside the repulsion radius the force ramps linearly from `-radius` at
/// contact to zero. Between the repulsion radius and the interaction radius it
/// is a tent that is zero at both ends, peaks at `radius` halfway, and is
/// scaled by the species attraction.
pub fn force_strength(distance: f64, attraction: f64, params: &ForceParams) -> f64 {
    let radius = params.interaction_radius;
    let fraction = params.repulsion_fraction;
    let repulsion_radius = fraction * radius;

    if distance <= repulsion_radius {
        distance / fraction - radius
    } else if distance <= radius {
        (radius - ((2.0 * distance - radius - repulsion_radius) / (1.0 - fraction)).abs()) * attraction
    } else {
        0.0
    }
}

/// Force that `b` exerts on `a`.
pub fn pair_force(a: &Particle, b: &Particle, matrix: &ColorMatrix, params: &ForceParams) -> Vec2 {
    let delta = toroidal_delta(&a.position, &b.position, params.extent);
    let distance = delta.norm();
    if distance <= 0.0 || distance > params.interaction_radius {
        return Vec2::zeros();
    }
    let attraction = matrix.attraction(a.species, b.species);
    delta * (force_strength(distance, attraction, params) * params.force_scale / distance)
}

/// Velocity damping, recomputed from the Verlet state every step.
pub fn friction_force(particle: &Particle, friction: f64, dt: f64) -> Vec2 {
    -particle.velocity(dt) * friction
}

/// Net force on `particles[index]` from friction and every particle in the
/// surrounding 3×3 cells. Reads shared state only.
pub fn accumulate_force(
    index: usize,
    particles: &[Particle],
    grid: &SpatialGrid,
    matrix: &ColorMatrix,
    params: &ForceParams,
    dt: f64,
) -> Vec2 {
    let particle = &particles[index];
    let mut force = friction_force(particle, params.friction, dt);

    let (cells, len) = grid.unique_neighbor_cells(particle.cell_index);
    for &cell in &cells[..len] {
        for &j in grid.cell(cell) {
            if j != index {
                force += pair_force(particle, &particles[j], matrix, params);
            }
        }
    }
    force
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ForceParams {
        ForceParams {
            extent: 50.0,
            interaction_radius: 10.0,
            repulsion_fraction: 0.3,
            friction: 0.0,
            force_scale: 1.0,
        }
    }

    fn matrix(value: f64) -> ColorMatrix {
        let mut m = ColorMatrix::new(1);
        m.set_attraction_scale(0, 0, value).unwrap();
        m
    }

    #[test]
    fn delta_takes_the_wrapped_path_when_shorter() {
        let a = Vec2::new(-48.0, 0.0);
        let b = Vec2::new(48.0, 0.0);
        assert_eq!(toroidal_delta(&a, &b, 50.0), Vec2::new(-4.0, 0.0));
        assert_eq!(toroidal_delta(&b, &a, 50.0), Vec2::new(4.0, 0.0));

        let c = Vec2::new(10.0, -49.0);
        let d = Vec2::new(12.0, 49.5);
        assert_eq!(toroidal_delta(&c, &d, 50.0), Vec2::new(2.0, -1.5));
    }

    #[test]
    fn delta_keeps_the_direct_path_when_shorter() {
        let a = Vec2::new(-10.0, 5.0);
        let b = Vec2::new(30.0, -20.0);
        assert_eq!(toroidal_delta(&a, &b, 50.0), b - a);
    }

    #[test]
    fn strength_profile() {
        let p = params();
        assert_eq!(force_strength(0.0, 1.0, &p), -10.0);
        assert!(force_strength(3.0, 1.0, &p).abs() < 1e-12);
        assert!(force_strength(10.0, 1.0, &p).abs() < 1e-12);
        // midpoint of the tent
        assert!((force_strength(6.5, 1.0, &p) - 10.0).abs() < 1e-12);
        assert!((force_strength(6.5, -0.5, &p) + 5.0).abs() < 1e-12);
        assert_eq!(force_strength(10.5, 1.0, &p), 0.0);
        // repulsion ignores species
        assert_eq!(force_strength(1.5, -1.0, &p), force_strength(1.5, 1.0, &p));
    }

    #[test]
    fn same_species_attract_outside_repulsion_radius() {
        let m = matrix(1.0);
        let a = Particle::new(0, 0, Vec2::new(0.0, 0.0));
        let b = Particle::new(1, 0, Vec2::new(5.0, 0.0));
        let f = pair_force(&a, &b, &m, &params());
        assert!(f.x > 0.0);
        assert_eq!(f.y, 0.0);
    }

    #[test]
    fn close_particles_repel() {
        let m = matrix(1.0);
        let a = Particle::new(0, 0, Vec2::new(0.0, 0.0));
        let b = Particle::new(1, 0, Vec2::new(0.0, 1.0));
        assert!(pair_force(&a, &b, &m, &params()).y < 0.0);
    }

    #[test]
    fn coincident_particles_exert_nothing() {
        let m = matrix(1.0);
        let a = Particle::new(0, 0, Vec2::new(3.0, 3.0));
        let b = Particle::new(1, 0, Vec2::new(3.0, 3.0));
        assert_eq!(pair_force(&a, &b, &m, &params()), Vec2::zeros());
    }

    #[test]
    fn force_reaches_across_the_seam() {
        let m = matrix(1.0);
        let a = Particle::new(0, 0, Vec2::new(-48.0, 0.0));
        let b = Particle::new(1, 0, Vec2::new(47.0, 0.0));
        // b sits 5 units to the left through the boundary
        assert!(pair_force(&a, &b, &m, &params()).x < 0.0);
    }

    #[test]
    fn friction_opposes_motion() {
        let p = Particle::with_displacement(0, 0, Vec2::new(1.0, 1.0), Vec2::new(0.1, 0.0));
        let f = friction_force(&p, 2.0, 0.1);
        assert!((f.x + 2.0).abs() < 1e-12);
        assert_eq!(f.y, 0.0);
    }
}
