use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Parameters a simulation is created from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Half the side length of the square domain; positions span `[-size, size]`
    pub bounding_size: f64,
    /// Maximum distance at which two particles interact
    pub interaction_radius: f64,
    /// Fraction of the interaction radius that is always repulsive
    pub repulsion_fraction: f64,
    /// Velocity damping coefficient
    pub friction: f64,
    /// Multiplier applied to every pair force
    pub force_scale: f64,
    pub particle_count: usize,
    pub species_count: usize,
    pub multithreaded: bool,
    /// Size of the force worker pool, logical CPU count when unset
    pub worker_threads: Option<usize>,
    /// Seed for particle placement; entropy when unset
    pub seed: Option<u64>,
    /// Name of the initial placement pattern
    pub position_setter: String,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            bounding_size: 100.0,
            interaction_radius: 20.0,
            repulsion_fraction: 0.3,
            friction: 10.0,
            force_scale: 1.0,
            particle_count: 2000,
            species_count: 5,
            multithreaded: true,
            worker_threads: None,
            seed: None,
            position_setter: "Uniform".to_string(),
        }
    }
}

/// Settings for the headless runner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub simulation: SimulationSettings,
    /// Time step (delta time) for the simulation in seconds
    pub time_step: f64,
    /// Number of steps to run
    pub steps: u64,
    /// Steps between progress reports
    pub report_interval: u64,
    /// Name of the attraction matrix preset
    pub matrix_generator: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            simulation: SimulationSettings::default(),
            time_step: 0.02,
            steps: 1000,
            report_interval: 100,
            matrix_generator: "Random".to_string(),
        }
    }
}

impl AppSettings {
    const SETTINGS_FILE: &'static str = "settings.toml";

    /// Loads settings from the settings file, or returns default settings if the file doesn't exist
    pub fn load() -> Result<Self> {
        if Path::new(Self::SETTINGS_FILE).exists() {
            Self::load_from(Self::SETTINGS_FILE)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimError;
    use std::io::Write;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings = AppSettings::from_toml_str(
            r#"
            steps = 10

            [simulation]
            particle_count = 64
            seed = 3
            "#,
        )
        .unwrap();
        assert_eq!(settings.steps, 10);
        assert_eq!(settings.simulation.particle_count, 64);
        assert_eq!(settings.simulation.seed, Some(3));
        assert_eq!(settings.simulation.interaction_radius, 20.0);
        assert_eq!(settings.matrix_generator, "Random");
    }

    #[test]
    fn malformed_toml_is_a_settings_error() {
        let err = AppSettings::from_toml_str("steps = \"many\"").unwrap_err();
        assert!(matches!(err, SimError::Settings(_)));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "time_step = 0.05\n[simulation]\nmultithreaded = false").unwrap();
        let settings = AppSettings::load_from(file.path()).unwrap();
        assert_eq!(settings.time_step, 0.05);
        assert!(!settings.simulation.multithreaded);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppSettings::load_from("/nonexistent/settings.toml").unwrap_err();
        assert!(matches!(err, SimError::Io(_)));
    }
}
