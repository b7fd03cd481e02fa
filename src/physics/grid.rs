use crate::error::{Result, SimError};
use crate::particle::Particle;

/// Upper bound on `cells_across²`; finer grids are rejected as geometry errors.
pub const MAX_CELLS: usize = 1 << 20;

/// Uniform bucket grid over `[-extent, extent]²`, wrapping at the edges.
///
/// Cells are at least as wide as the interaction radius, so every partner
/// of a particle lies in the 3×3 block around its own cell.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cells: Vec<Vec<usize>>,
    cells_across: usize,
    cell_size: f64,
    extent: f64,
}

impl SpatialGrid {
    pub fn new(extent: f64, interaction_radius: f64) -> Result<Self> {
        let invalid = || SimError::InvalidGeometry {
            bounding_size: extent,
            interaction_radius,
        };
        if !(extent.is_finite() && interaction_radius.is_finite()) || extent <= 0.0 || interaction_radius <= 0.0 {
            return Err(invalid());
        }

        let cells_across = (2.0 * extent / interaction_radius).floor();
        if cells_across < 1.0 || cells_across > u32::MAX as f64 {
            return Err(invalid());
        }
        let cells_across = cells_across as usize;
        let num_cells = cells_across
            .checked_mul(cells_across)
            .filter(|&n| n <= MAX_CELLS)
            .ok_or_else(invalid)?;

        Ok(Self {
            cells: vec![Vec::new(); num_cells],
            cells_across,
            cell_size: 2.0 * extent / cells_across as f64,
            extent,
        })
    }

    pub fn cells_across(&self) -> usize {
        self.cells_across
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn cell(&self, index: usize) -> &[usize] {
        &self.cells[index]
    }

    fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    /// Row-major cell index, row 0 at the top (`y = extent`).
    ///
    /// A coordinate sitting exactly on the far edge lands one past the last
    /// row/column and is pulled back into it.
    pub fn cell_index_of(&self, x: f64, y: f64) -> usize {
        let last = self.cells_across as i64 - 1;
        let cx = (((x + self.extent) / self.cell_size).floor() as i64).clamp(0, last) as usize;
        let cy = (((self.extent - y) / self.cell_size).floor() as i64).clamp(0, last) as usize;
        cy * self.cells_across + cx
    }

    /// Re-buckets every particle and caches its cell on the particle.
    pub fn rebuild(&mut self, particles: &mut [Particle]) {
        self.clear();
        for particle in particles.iter_mut() {
            let cell_index = self.cell_index_of(particle.position.x, particle.position.y);
            self.cells[cell_index].push(particle.id);
            particle.cell_index = cell_index;
        }
    }

    /// The 3×3 block centred on `cell_index`, wrapping around the grid edges.
    /// Row-major from the top-left neighbour.
    pub fn neighbor_cells(&self, cell_index: usize) -> [usize; 9] {
        let n = self.cells_across;
        let row = cell_index / n;
        let col = cell_index % n;
        let mut out = [0; 9];
        let mut k = 0;
        for dr in [n - 1, 0, 1] {
            for dc in [n - 1, 0, 1] {
                out[k] = ((row + dr) % n) * n + (col + dc) % n;
                k += 1;
            }
        }
        out
    }

    /// [`neighbor_cells`](Self::neighbor_cells) with repeats dropped.
    ///
    /// With fewer than three cells across, wrapped neighbours alias each other
    /// (or the centre); each cell must contribute once.
    pub fn unique_neighbor_cells(&self, cell_index: usize) -> ([usize; 9], usize) {
        let all = self.neighbor_cells(cell_index);
        if self.cells_across >= 3 {
            return (all, 9);
        }
        let mut out = [0; 9];
        let mut len = 0;
        for cell in all {
            if !out[..len].contains(&cell) {
                out[len] = cell;
                len += 1;
            }
        }
        (out, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Vec2;

    fn particle_at(id: usize, x: f64, y: f64) -> Particle {
        Particle::new(id, 0, Vec2::new(x, y))
    }

    #[test]
    fn sizes_cells_from_radius() {
        let grid = SpatialGrid::new(100.0, 40.0).unwrap();
        assert_eq!(grid.cells_across(), 5);
        assert_eq!(grid.cell_size(), 40.0);

        let grid = SpatialGrid::new(10.0, 3.0).unwrap();
        assert_eq!(grid.cells_across(), 6);
        assert!(grid.cell_size() >= 3.0);
    }

    #[test]
    fn rejects_degenerate_geometry() {
        assert!(SpatialGrid::new(10.0, 0.0).is_err());
        assert!(SpatialGrid::new(10.0, -1.0).is_err());
        assert!(SpatialGrid::new(0.0, 1.0).is_err());
        assert!(SpatialGrid::new(10.0, 25.0).is_err());
        assert!(SpatialGrid::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn rejects_grids_too_fine_to_allocate() {
        assert!(matches!(
            SpatialGrid::new(100.0, 1e-6),
            Err(SimError::InvalidGeometry { .. })
        ));
        // 1024 across is exactly the cap, 1025 is over it
        assert_eq!(SpatialGrid::new(512.0, 1.0).unwrap().cells_across(), 1024);
        assert!(SpatialGrid::new(512.5, 1.0).is_err());
    }

    #[test]
    fn y_axis_runs_top_down() {
        let grid = SpatialGrid::new(10.0, 5.0).unwrap();
        // top-left corner
        assert_eq!(grid.cell_index_of(-9.0, 9.0), 0);
        // bottom-right corner
        assert_eq!(grid.cell_index_of(9.0, -9.0), 15);
        assert_eq!(grid.cell_index_of(-9.0, -9.0), 12);
    }

    #[test]
    fn far_edge_clamps_into_last_cell() {
        let grid = SpatialGrid::new(10.0, 5.0).unwrap();
        // x == extent and y == -extent both compute index 4 before clamping
        assert_eq!(grid.cell_index_of(10.0, -10.0), 15);
        assert_eq!(grid.cell_index_of(-10.0, 10.0), 0);
        assert_eq!(grid.cell_index_of(10.0, 10.0), 3);
    }

    #[test]
    fn rebuild_places_each_particle_once() {
        let mut grid = SpatialGrid::new(10.0, 5.0).unwrap();
        let mut particles = vec![
            particle_at(0, -9.0, 9.0),
            particle_at(1, 9.0, -9.0),
            particle_at(2, -8.0, 8.0),
        ];
        grid.rebuild(&mut particles);
        assert_eq!(grid.cell(0), &[0, 2]);
        assert_eq!(grid.cell(15), &[1]);
        assert_eq!(particles[1].cell_index, 15);
        let total: usize = (0..16).map(|c| grid.cell(c).len()).sum();
        assert_eq!(total, 3);

        // stale membership is dropped on the next rebuild
        particles[1].position = Vec2::new(-9.0, 9.0);
        grid.rebuild(&mut particles);
        assert_eq!(grid.cell(0), &[0, 1, 2]);
        assert!(grid.cell(15).is_empty());
    }

    #[test]
    fn neighbors_wrap_at_corners() {
        let grid = SpatialGrid::new(10.0, 5.0).unwrap();
        let mut block = grid.neighbor_cells(0);
        block.sort_unstable();
        assert_eq!(block, [0, 1, 3, 4, 5, 7, 12, 13, 15]);

        let interior = grid.neighbor_cells(5);
        assert_eq!(interior, [0, 1, 2, 4, 5, 6, 8, 9, 10]);
    }

    #[test]
    fn small_grids_do_not_repeat_cells() {
        let grid = SpatialGrid::new(10.0, 20.0).unwrap();
        assert_eq!(grid.cells_across(), 1);
        let (cells, len) = grid.unique_neighbor_cells(0);
        assert_eq!(&cells[..len], &[0]);

        let grid = SpatialGrid::new(10.0, 10.0).unwrap();
        assert_eq!(grid.cells_across(), 2);
        let (cells, len) = grid.unique_neighbor_cells(3);
        let mut cells = cells[..len].to_vec();
        cells.sort_unstable();
        assert_eq!(cells, vec![0, 1, 2, 3]);
    }
}
