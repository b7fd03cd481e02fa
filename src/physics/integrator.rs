use crate::particle::{Particle, Vec2};

/// Position Verlet with unit mass.
pub fn verlet_step(particle: &mut Particle, dt: f64) {
    let next = 2.0 * particle.position - particle.last_position + particle.net_force * (dt * dt);
    particle.last_position = particle.position;
    particle.position = next;
}

/// Re-enters a particle that left `[-extent, extent]` on the opposite edge,
/// carrying its last displacement with it. Returns whether it wrapped.
pub fn wrap_position(particle: &mut Particle, extent: f64) -> bool {
    let displacement = particle.displacement();
    let mut wrapped = false;
    for axis in 0..2 {
        let p = &mut particle.position[axis];
        if *p > extent {
            *p = -extent;
            wrapped = true;
        } else if *p < -extent {
            *p = extent;
            wrapped = true;
        }
    }
    if wrapped {
        particle.last_position = particle.position - displacement;
    }
    wrapped
}

pub fn integrate(particles: &mut [Particle], forces: &[Vec2], extent: f64, dt: f64) {
    for (particle, force) in particles.iter_mut().zip(forces) {
        particle.net_force = *force;
        verlet_step(particle, dt);
        wrap_position(particle, extent);
    }
}
