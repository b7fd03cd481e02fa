//! CPU particle-life simulation core.
//!
//! Particles of several species attract or repel each other according to a
//! [`ColorMatrix`], on a square domain that wraps at its edges. A uniform
//! [`SpatialGrid`](physics::grid::SpatialGrid) limits each particle to the
//! neighbours in its surrounding 3×3 cells, forces are computed on a worker
//! pool, and positions advance with Verlet integration.

pub mod app_settings;
pub mod clock;
pub mod color_matrix;
pub mod error;
pub mod particle;
pub mod physics;
pub mod presets;

pub use app_settings::{AppSettings, SimulationSettings};
pub use color_matrix::{ColorMatrix, MatrixGenerator, Rgba};
pub use error::{Result, SimError};
pub use particle::{Particle, ParticleInstance, PositionSetter, Vec2};
pub use physics::System;
