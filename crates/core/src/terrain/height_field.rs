use crate::util::range::NumRange;
use anyhow::{anyhow, bail, ensure};
use serde::{Deserialize, Serialize};

/// A regular grid of elevation samples. A field with `rows x cols` cells has
/// `(rows + 1) x (cols + 1)` samples, one per grid line intersection, stored
/// row-major. A field with zero rows or zero columns is empty: it has no
/// samples at all.
///
/// Sample positions are in grid units, where column is X and row is Y. Use
/// [HeightField::to_mesh] to scale and place the grid in world space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightField {
    row_lines: usize,
    col_lines: usize,
    elevations: Vec<f64>,
}

impl HeightField {
    /// Create a flat field with the given number of cells
    pub fn new(rows: usize, cols: usize) -> Self {
        let (row_lines, col_lines) = if rows == 0 || cols == 0 {
            (0, 0)
        } else {
            (rows + 1, cols + 1)
        };
        Self {
            row_lines,
            col_lines,
            elevations: vec![0.0; row_lines * col_lines],
        }
    }

    /// Number of cells along Y
    pub fn rows(&self) -> usize {
        self.row_lines.saturating_sub(1)
    }

    /// Number of cells along X
    pub fn cols(&self) -> usize {
        self.col_lines.saturating_sub(1)
    }

    /// Number of sample lines along each axis, as `(row_lines, col_lines)`
    pub fn lines(&self) -> (usize, usize) {
        (self.row_lines, self.col_lines)
    }

    pub fn len(&self) -> usize {
        self.elevations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elevations.is_empty()
    }

    fn index(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.row_lines && col < self.col_lines);
        row * self.col_lines + col
    }

    /// Get the elevation at a sample. Panics if the sample is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.elevations[self.index(row, col)]
    }

    /// Set the elevation at a sample. Panics if the sample is out of bounds.
    pub fn set(&mut self, row: usize, col: usize, elevation: f64) {
        let index = self.index(row, col);
        self.elevations[index] = elevation;
    }

    /// All elevations, row-major
    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    pub fn elevations_mut(&mut self) -> &mut [f64] {
        &mut self.elevations
    }

    /// Every sample as `[col, row, elevation]`, row-major. Vertex `i` here is
    /// the vertex that index `i` in [HeightField::edges] refers to.
    pub fn vertices(&self) -> impl Iterator<Item = [f64; 3]> + '_ {
        let col_lines = self.col_lines;
        self.elevations.iter().enumerate().map(move |(i, &z)| {
            [(i % col_lines) as f64, (i / col_lines) as f64, z]
        })
    }

    /// Grid edges, as pairs of vertex indices. All horizontal edges come
    /// first, row by row, then all vertical edges, row by row. There are
    /// `row_lines * cols + rows * col_lines` in total.
    pub fn edges(&self) -> Vec<[usize; 2]> {
        let (rows, cols) = (self.rows(), self.cols());
        let mut edges =
            Vec::with_capacity(self.row_lines * cols + rows * self.col_lines);
        for row in 0..self.row_lines {
            for col in 0..cols {
                let start = self.index(row, col);
                edges.push([start, start + 1]);
            }
        }
        for row in 0..rows {
            for col in 0..self.col_lines {
                let start = self.index(row, col);
                edges.push([start, start + self.col_lines]);
            }
        }
        edges
    }

    /// Convert to a mesh, scaling the grid so adjacent lines are `cell_width`
    /// apart and moving the first vertex to `origin`. Elevations are not
    /// scaled.
    pub fn to_mesh(&self, cell_width: f64, origin: [f64; 3]) -> GridMesh {
        let vertices = self
            .vertices()
            .map(|[x, y, z]| {
                [
                    origin[0] + x * cell_width,
                    origin[1] + y * cell_width,
                    origin[2] + z,
                ]
            })
            .collect();
        GridMesh {
            vertices,
            edges: self.edges(),
        }
    }

    /// Flatten the outermost `width` lines of samples on every side to zero
    pub fn zero_border(&mut self, width: usize) {
        let (row_lines, col_lines) = self.lines();
        for row in 0..row_lines {
            let row_in_border = row < width || row + width >= row_lines;
            for col in 0..col_lines {
                if row_in_border || col < width || col + width >= col_lines {
                    self.set(row, col, 0.0);
                }
            }
        }
    }

    /// The smallest range covering every elevation, or `None` if the field is
    /// empty
    pub fn elevation_range(&self) -> Option<NumRange> {
        NumRange::covering(self.elevations.iter().copied())
    }

    /// Map every elevation into `[0, 1]`, where 0 is the lowest sample and 1
    /// the highest. Returns an error for an empty or completely flat field,
    /// since there's no span to normalize against.
    pub fn to_grayscale(&self) -> anyhow::Result<Vec<f64>> {
        let range = self
            .elevation_range()
            .ok_or_else(|| anyhow!("cannot normalize an empty field"))?;
        if range.span() <= 0.0 {
            bail!("cannot normalize a flat field (all elevations {})", range.min);
        }
        Ok(self
            .elevations
            .iter()
            .map(|&z| range.normalize(z))
            .collect())
    }

    /// Return an error if any elevation is NaN or infinite
    pub fn ensure_finite(&self) -> anyhow::Result<()> {
        match self.elevations.iter().position(|z| !z.is_finite()) {
            None => Ok(()),
            Some(i) => Err(anyhow!(
                "non-finite elevation {} at row {}, col {}",
                self.elevations[i],
                i / self.col_lines,
                i % self.col_lines
            )),
        }
    }

    /// Add another field of the same shape into this one, sample by sample,
    /// with every sample of `other` multiplied by `weight`
    pub fn add_scaled(
        &mut self,
        other: &HeightField,
        weight: f64,
    ) -> anyhow::Result<()> {
        ensure!(
            self.lines() == other.lines(),
            "field shape mismatch: {:?} vs {:?}",
            self.lines(),
            other.lines()
        );
        for (z, other_z) in self.elevations.iter_mut().zip(&other.elevations) {
            *z += weight * other_z;
        }
        Ok(())
    }
}

/// A wireframe grid in world space, ready to be handed to a mesh builder
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridMesh {
    pub vertices: Vec<[f64; 3]>,
    pub edges: Vec<[usize; 2]>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_shape() {
        let field = HeightField::new(3, 4);
        assert_eq!(field.lines(), (4, 5));
        assert_eq!(field.len(), 20);
        assert_eq!((field.rows(), field.cols()), (3, 4));

        let empty = HeightField::new(0, 10);
        assert!(empty.is_empty());
        assert_eq!(empty.lines(), (0, 0));
        assert!(empty.edges().is_empty());
        assert_eq!(empty.elevation_range(), None);
    }

    #[test]
    fn test_edges() {
        let field = HeightField::new(2, 3);
        let edges = field.edges();
        // row_lines * cols + rows * col_lines
        assert_eq!(edges.len(), 3 * 3 + 2 * 4);
        assert_eq!(edges[0], [0, 1]);
        assert_eq!(edges[2], [2, 3]);
        // Second row of horizontal edges starts at the second row of vertices
        assert_eq!(edges[3], [4, 5]);
        // First vertical edge
        assert_eq!(edges[9], [0, 4]);
        assert_eq!(*edges.last().unwrap(), [7, 11]);
    }

    #[test]
    fn test_vertices_and_mesh() {
        let mut field = HeightField::new(1, 2);
        field.set(1, 2, 7.0);
        let vertices: Vec<_> = field.vertices().collect();
        assert_eq!(vertices[1], [1.0, 0.0, 0.0]);
        assert_eq!(vertices[5], [2.0, 1.0, 7.0]);

        let mesh = field.to_mesh(2.5, [10.0, 0.0, 1.0]);
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.vertices[5], [15.0, 2.5, 8.0]);
        assert_eq!(mesh.edges, field.edges());
    }

    #[test]
    fn test_zero_border() {
        let mut field = HeightField::new(6, 6);
        field.elevations_mut().iter_mut().for_each(|z| *z = 1.0);
        field.zero_border(2);
        for row in 0..7 {
            for col in 0..7 {
                let inner = (2..5).contains(&row) && (2..5).contains(&col);
                let expected = if inner { 1.0 } else { 0.0 };
                assert_approx_eq!(field.get(row, col), expected);
            }
        }

        // Wider than the field just flattens everything
        field.zero_border(10);
        assert!(field.elevations().iter().all(|&z| z == 0.0));
    }

    #[test]
    fn test_grayscale() {
        let mut field = HeightField::new(1, 1);
        field.elevations_mut().copy_from_slice(&[-10.0, 0.0, 10.0, 5.0]);
        let gray = field.to_grayscale().unwrap();
        assert_approx_eq!(gray[0], 0.0);
        assert_approx_eq!(gray[1], 0.5);
        assert_approx_eq!(gray[2], 1.0);
        assert_approx_eq!(gray[3], 0.75);

        assert!(HeightField::new(2, 2).to_grayscale().is_err());
        assert!(HeightField::new(0, 0).to_grayscale().is_err());
    }

    #[test]
    fn test_ensure_finite() {
        let mut field = HeightField::new(2, 2);
        assert!(field.ensure_finite().is_ok());
        field.set(1, 2, f64::NAN);
        let error = field.ensure_finite().unwrap_err();
        assert!(error.to_string().contains("row 1, col 2"));
    }

    #[test]
    fn test_add_scaled() {
        let mut field = HeightField::new(1, 1);
        let mut other = HeightField::new(1, 1);
        other.elevations_mut().copy_from_slice(&[2.0, 4.0, 6.0, 8.0]);
        field.add_scaled(&other, 0.5).unwrap();
        assert_eq!(field.elevations(), &[1.0, 2.0, 3.0, 4.0]);

        assert!(field.add_scaled(&HeightField::new(2, 1), 1.0).is_err());
    }
}
