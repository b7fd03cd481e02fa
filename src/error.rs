use thiserror::Error;

/// Errors surfaced by the simulation core
#[derive(Error, Debug)]
pub enum SimError {
    /// A species index outside `[0, num_species)`
    #[error("species {species} out of range for a matrix of {num_species} species")]
    SpeciesOutOfRange { species: usize, num_species: usize },

    /// Bounding size and interaction radius would produce an unusable grid
    #[error("invalid geometry: bounding size {bounding_size}, interaction radius {interaction_radius}")]
    InvalidGeometry {
        bounding_size: f64,
        interaction_radius: f64,
    },

    /// A scalar parameter outside its valid range
    #[error("invalid value {value} for {name}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("time step must be positive and finite, got {0}")]
    InvalidTimestep(f64),

    /// A non-empty population was requested without any species
    #[error("cannot create {0} particles with zero species")]
    NoSpecies(usize),

    /// A force worker panicked; reported once every chunk has finished
    #[error("force worker for chunk {chunk} panicked: {message}")]
    WorkerPanicked { chunk: usize, message: String },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings error: {0}")]
    Settings(#[from] toml::de::Error),

    /// A preset name in the settings that matches nothing
    #[error("unknown {kind} preset: {name}")]
    UnknownPreset { kind: &'static str, name: String },
}

pub type Result<T> = std::result::Result<T, SimError>;
