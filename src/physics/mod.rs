pub mod dispatch;
pub mod force;
pub mod grid;
pub mod integrator;

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::app_settings::SimulationSettings;
use crate::color_matrix::ColorMatrix;
use crate::error::{Result, SimError};
use crate::particle::{Particle, ParticleInstance, PositionSetter, Vec2};
use crate::presets;

use dispatch::WorkerPool;
use force::ForceParams;
use grid::SpatialGrid;

/// Fixed-population particle-life simulation on a square torus.
///
/// Each [`update`](System::update) rebuilds the spatial grid, computes every
/// particle's net force (optionally on the worker pool), then advances all
/// particles with Verlet integration and wraps them back into the domain.
pub struct System {
    particles: Vec<Particle>,
    extent: f64,
    interaction_radius: f64,
    repulsion_fraction: f64,
    friction: f64,
    force_scale: f64,
    multithreaded: bool,
    worker_threads: Option<usize>,
    pool: Option<WorkerPool>,
    grid: SpatialGrid,
    force_buffer: Vec<Vec2>,
    rng: StdRng,
    position_setter: Box<dyn PositionSetter>,
    steps: u64,
}

impl System {
    pub fn new(settings: &SimulationSettings) -> Result<Self> {
        check_range("repulsion_fraction", settings.repulsion_fraction, |v| v > 0.0 && v < 1.0)?;
        check_range("friction", settings.friction, |v| v >= 0.0)?;
        check_range("force_scale", settings.force_scale, |_| true)?;
        let grid = build_grid(settings.bounding_size, settings.interaction_radius)?;
        let position_setter = presets::position_setter(&settings.position_setter)?;
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut system = Self {
            particles: Vec::new(),
            extent: settings.bounding_size,
            interaction_radius: settings.interaction_radius,
            repulsion_fraction: settings.repulsion_fraction,
            friction: settings.friction,
            force_scale: settings.force_scale,
            multithreaded: false,
            worker_threads: settings.worker_threads,
            pool: None,
            grid,
            force_buffer: Vec::new(),
            rng,
            position_setter,
            steps: 0,
        };
        system.set_multithreaded(settings.multithreaded)?;
        system.set_num_particles(settings.particle_count, settings.species_count)?;
        Ok(system)
    }

    /// A system holding exactly `particles`. Ids are reassigned to array
    /// indices and positions outside the domain are folded back in.
    pub fn with_particles(settings: &SimulationSettings, particles: Vec<Particle>) -> Result<Self> {
        let mut system = Self::new(&SimulationSettings {
            particle_count: 0,
            ..settings.clone()
        })?;
        system.particles = particles;
        for (id, particle) in system.particles.iter_mut().enumerate() {
            particle.id = id;
            fold_into_domain(particle, system.extent);
        }
        Ok(system)
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// On error no particle has moved.
    pub fn update(&mut self, matrix: &ColorMatrix, dt: f64) -> Result<()> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::InvalidTimestep(dt));
        }
        if self.particles.is_empty() {
            return Ok(());
        }
        let num_species = matrix.num_species();
        if let Some(p) = self.particles.iter().find(|p| p.species >= num_species) {
            return Err(SimError::SpeciesOutOfRange {
                species: p.species,
                num_species,
            });
        }

        let params = self.force_params();
        self.step(dt, |i, particles, grid| {
            force::accumulate_force(i, particles, grid, matrix, &params, dt)
        })
    }

    /// Rebuilds the grid, fills the force buffer with `kernel` and integrates.
    /// Particles only move once every force has been computed.
    fn step<F>(&mut self, dt: f64, kernel: F) -> Result<()>
    where
        F: Fn(usize, &[Particle], &SpatialGrid) -> Vec2 + Sync,
    {
        self.grid.rebuild(&mut self.particles);

        self.force_buffer.clear();
        self.force_buffer.resize(self.particles.len(), Vec2::zeros());

        let particles = &self.particles;
        let grid = &self.grid;
        let pool = if self.multithreaded { self.pool.as_ref() } else { None };
        dispatch::dispatch(&mut self.force_buffer, pool, |i| kernel(i, particles, grid))?;

        integrator::integrate(&mut self.particles, &self.force_buffer, self.extent, dt);
        self.steps += 1;
        trace!("step {} done for {} particles", self.steps, self.particles.len());
        Ok(())
    }

    /// Valid until the next `update`.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Render-ready positions and colors.
    pub fn instances(&self, matrix: &ColorMatrix) -> Result<Vec<ParticleInstance>> {
        self.particles
            .iter()
            .map(|p| Ok(ParticleInstance::new(p, matrix.get_color(p.species)?)))
            .collect()
    }

    pub fn species_counts(&self, num_species: usize) -> Vec<usize> {
        let mut counts = vec![0; num_species];
        for p in &self.particles {
            if let Some(count) = counts.get_mut(p.species) {
                *count += 1;
            }
        }
        counts
    }

    pub fn set_bounding_size(&mut self, bounding_size: f64) -> Result<()> {
        self.grid = build_grid(bounding_size, self.interaction_radius)?;
        if bounding_size < self.extent {
            for particle in &mut self.particles {
                fold_into_domain(particle, bounding_size);
            }
        }
        self.extent = bounding_size;
        debug!(
            "bounding size {bounding_size}, {0}x{0} grid cells",
            self.grid.cells_across()
        );
        Ok(())
    }

    pub fn set_interaction_radius(&mut self, interaction_radius: f64) -> Result<()> {
        self.grid = build_grid(self.extent, interaction_radius)?;
        self.interaction_radius = interaction_radius;
        debug!(
            "interaction radius {interaction_radius}, {0}x{0} grid cells",
            self.grid.cells_across()
        );
        Ok(())
    }

    /// Grows or shrinks the population.
    ///
    /// Shrinking drops the highest ids. New particles start at rest, placed by
    /// the position setter, with species assigned round-robin by id.
    pub fn set_num_particles(&mut self, count: usize, num_species: usize) -> Result<()> {
        if num_species == 0 {
            if count > 0 {
                return Err(SimError::NoSpecies(count));
            }
            self.particles.clear();
            return Ok(());
        }

        self.particles.truncate(count);
        for particle in &mut self.particles {
            if particle.species >= num_species {
                particle.species = particle.id % num_species;
            }
        }
        for id in self.particles.len()..count {
            let species = id % num_species;
            let position = self
                .position_setter
                .set_position(&mut self.rng, species, num_species, self.extent);
            self.particles.push(Particle::new(id, species, position));
        }
        info!("{count} particles across {num_species} species");
        Ok(())
    }

    pub fn set_multithreaded(&mut self, enabled: bool) -> Result<()> {
        if enabled && self.pool.is_none() {
            self.pool = Some(WorkerPool::new(self.worker_threads)?);
        }
        self.multithreaded = enabled;
        Ok(())
    }

    pub fn set_repulsion_fraction(&mut self, fraction: f64) -> Result<()> {
        self.repulsion_fraction = check_range("repulsion_fraction", fraction, |v| v > 0.0 && v < 1.0)?;
        Ok(())
    }

    pub fn set_friction(&mut self, friction: f64) -> Result<()> {
        self.friction = check_range("friction", friction, |v| v >= 0.0)?;
        Ok(())
    }

    pub fn set_force_scale(&mut self, scale: f64) -> Result<()> {
        self.force_scale = check_range("force_scale", scale, |_| true)?;
        Ok(())
    }

    /// Used for particles created by later `set_num_particles` calls.
    pub fn set_position_setter(&mut self, setter: Box<dyn PositionSetter>) {
        self.position_setter = setter;
    }

    pub fn bounding_size(&self) -> f64 {
        self.extent
    }

    pub fn interaction_radius(&self) -> f64 {
        self.interaction_radius
    }

    pub fn repulsion_fraction(&self) -> f64 {
        self.repulsion_fraction
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn is_multithreaded(&self) -> bool {
        self.multithreaded
    }

    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    fn force_params(&self) -> ForceParams {
        ForceParams {
            extent: self.extent,
            interaction_radius: self.interaction_radius,
            repulsion_fraction: self.repulsion_fraction,
            friction: self.friction,
            force_scale: self.force_scale,
        }
    }
}

/// Rejects an interaction radius larger than `bounding_size`, which is
/// already the half extent of the domain. Such a radius could see the same
/// partner along two wrapped paths.
fn build_grid(bounding_size: f64, interaction_radius: f64) -> Result<SpatialGrid> {
    if interaction_radius > bounding_size {
        return Err(SimError::InvalidGeometry {
            bounding_size,
            interaction_radius,
        });
    }
    SpatialGrid::new(bounding_size, interaction_radius)
}

fn check_range(name: &'static str, value: f64, valid: impl Fn(f64) -> bool) -> Result<f64> {
    if value.is_finite() && valid(value) {
        Ok(value)
    } else {
        Err(SimError::InvalidParameter { name, value })
    }
}

/// Maps a position onto the torus `[-extent, extent]²` keeping its last
/// displacement.
fn fold_into_domain(particle: &mut Particle, extent: f64) {
    let displacement = particle.displacement();
    for axis in 0..2 {
        let p = &mut particle.position[axis];
        if p.abs() > extent {
            *p = -extent + (*p + extent).rem_euclid(2.0 * extent);
        }
    }
    particle.last_position = particle.position - displacement;
}
