use log::{error, info};

use particle_life_core::clock::StepClock;
use particle_life_core::{presets, AppSettings, MatrixGenerator, System};

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let settings = AppSettings::load()?;
    let sim = &settings.simulation;
    info!(
        "{} particles, {} species, bounding size {}, interaction radius {}",
        sim.particle_count, sim.species_count, sim.bounding_size, sim.interaction_radius
    );

    let matrix = presets::matrix_generator(&settings.matrix_generator)?.generate(sim.species_count);
    let mut system = System::new(sim)?;
    let mut clock = StepClock::new();

    for step in 1..=settings.steps {
        system.update(&matrix, settings.time_step)?;
        clock.tick();

        if settings.report_interval > 0 && step % settings.report_interval == 0 {
            info!(
                "step {step}: {:.1} steps/s ({:.2} ms), species {:?}",
                clock.steps_per_second(),
                clock.last_step_millis(),
                system.species_counts(matrix.num_species())
            );
        }
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        error!("{e}");
        std::process::exit(1);
    }
}
