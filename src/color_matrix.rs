use rand::Rng;

use crate::error::{Result, SimError};

/// Display color of a species, RGBA in `[0, 1]`
pub type Rgba = [f32; 4];

/// Per-species colors plus the species-pair attraction table.
///
/// `attraction(a, b)` is how strongly species `a` is pulled toward species `b`;
/// the table need not be symmetric. The size is fixed at creation, callers that
/// want a different species count build a new matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMatrix {
    num_species: usize,
    colors: Vec<Rgba>,
    attraction: Vec<f64>,
}

impl ColorMatrix {
    pub fn new(num_species: usize) -> Self {
        Self {
            num_species,
            colors: (0..num_species).map(color_for_species).collect(),
            attraction: vec![0.0; num_species * num_species],
        }
    }

    pub fn num_species(&self) -> usize {
        self.num_species
    }

    pub fn get_color(&self, species: usize) -> Result<Rgba> {
        self.check(species)?;
        Ok(self.colors[species])
    }

    pub fn set_color(&mut self, species: usize, color: Rgba) -> Result<()> {
        self.check(species)?;
        self.colors[species] = color;
        Ok(())
    }

    pub fn get_attraction_scale(&self, a: usize, b: usize) -> Result<f64> {
        let idx = self.index(a, b)?;
        Ok(self.attraction[idx])
    }

    pub fn set_attraction_scale(&mut self, a: usize, b: usize, value: f64) -> Result<()> {
        let idx = self.index(a, b)?;
        self.attraction[idx] = value;
        Ok(())
    }

    /// Unchecked lookup for the force loop. Species ids are validated once per
    /// step before any worker runs.
    #[inline]
    pub(crate) fn attraction(&self, a: usize, b: usize) -> f64 {
        self.attraction[a * self.num_species + b]
    }

    /// Fills the attraction table with values in `[-1, 1)`.
    pub fn randomize<R: Rng>(&mut self, rng: &mut R) {
        self.attraction
            .iter_mut()
            .for_each(|val| *val = rng.gen_range(-1.0..1.0));
    }

    fn check(&self, species: usize) -> Result<()> {
        if species < self.num_species {
            Ok(())
        } else {
            Err(SimError::SpeciesOutOfRange {
                species,
                num_species: self.num_species,
            })
        }
    }

    fn index(&self, a: usize, b: usize) -> Result<usize> {
        self.check(a)?;
        self.check(b)?;
        Ok(a * self.num_species + b)
    }
}

pub fn color_for_species(species: usize) -> Rgba {
    match species % 9 {
        0 => [1.0, 0.0, 0.0, 1.0], // Red
        1 => [0.0, 1.0, 0.0, 1.0], // Green
        2 => [0.0, 0.0, 1.0, 1.0], // Blue
        3 => [1.0, 1.0, 0.0, 1.0], // Yellow
        4 => [1.0, 0.0, 1.0, 1.0], // Magenta
        5 => [0.0, 1.0, 1.0, 1.0], // Cyan
        6 => [1.0, 0.5, 0.0, 1.0], // Orange
        7 => [0.5, 0.0, 1.0, 1.0], // Purple
        _ => [0.0, 0.5, 0.5, 1.0], // Teal
    }
}

/// Builds a fresh matrix of a given species count
pub trait MatrixGenerator: Send + Sync {
    fn generate(&self, size: usize) -> ColorMatrix;
}

pub struct RandomMatrixGenerator;

impl MatrixGenerator for RandomMatrixGenerator {
    fn generate(&self, size: usize) -> ColorMatrix {
        let mut matrix = ColorMatrix::new(size);
        matrix.randomize(&mut rand::thread_rng());
        matrix
    }
}

pub struct SymmetricMatrixGenerator;

impl MatrixGenerator for SymmetricMatrixGenerator {
    fn generate(&self, size: usize) -> ColorMatrix {
        let mut matrix = RandomMatrixGenerator.generate(size);
        for i in 0..size {
            for j in i + 1..size {
                let value = matrix.attraction(j, i);
                matrix.attraction[i * size + j] = value;
            }
        }
        matrix
    }
}

/// Each species likes itself and its two ring neighbours, dislikes the rest
pub struct ChainsMatrixGenerator;

impl MatrixGenerator for ChainsMatrixGenerator {
    fn generate(&self, size: usize) -> ColorMatrix {
        let mut matrix = ColorMatrix::new(size);
        for i in 0..size {
            for j in 0..size {
                let linked = j == i || j == (i + 1) % size || j == (i + size - 1) % size;
                matrix.attraction[i * size + j] = if linked { 1.0 } else { -1.0 };
            }
        }
        matrix
    }
}

pub struct SnakesMatrixGenerator;

impl MatrixGenerator for SnakesMatrixGenerator {
    fn generate(&self, size: usize) -> ColorMatrix {
        let mut matrix = ColorMatrix::new(size);
        for i in 0..size {
            matrix.attraction[i * size + i] = 1.0;
            matrix.attraction[i * size + (i + 1) % size] = 0.2;
        }
        matrix
    }
}

pub struct ZeroMatrixGenerator;

impl MatrixGenerator for ZeroMatrixGenerator {
    fn generate(&self, size: usize) -> ColorMatrix {
        ColorMatrix::new(size)
    }
}
