//! Output grid type
//!
//! `Grid` stores node values in row-major order together with the domain
//! they were computed on and the empty-node sentinel.

use ndarray::{Array2, ArrayView2};

use crate::domain::GridDomain;
use crate::error::{Error, Result};

/// A filled grid of f64 node values.
#[derive(Debug, Clone)]
pub struct Grid {
    data: Array2<f64>,
    domain: GridDomain,
    /// Sentinel emitted for empty nodes (NaN by default).
    nodata: f64,
}

impl Grid {
    /// Create a grid over `domain` filled with `value`.
    pub fn filled(domain: GridDomain, value: f64) -> Self {
        Self {
            data: Array2::from_elem((domain.n_rows(), domain.n_columns()), value),
            domain,
            nodata: f64::NAN,
        }
    }

    /// Create a grid from row-major node values.
    pub fn from_vec(domain: GridDomain, data: Vec<f64>, nodata: f64) -> Result<Self> {
        let (rows, cols) = (domain.n_rows(), domain.n_columns());
        if data.len() != rows * cols {
            return Err(Error::InvalidDomain(format!(
                "{} values for a {rows} x {cols} grid",
                data.len()
            )));
        }
        let data = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;
        Ok(Self {
            data,
            domain,
            nodata,
        })
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    pub fn domain(&self) -> &GridDomain {
        &self.domain
    }

    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    /// Check if a value is the empty-node sentinel.
    pub fn is_nodata(&self, value: f64) -> bool {
        if self.nodata.is_nan() {
            value.is_nan()
        } else {
            value == self.nodata
        }
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Iterate values in row-major order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().copied()
    }

    /// Min, max and mean over non-empty nodes.
    pub fn statistics(&self) -> GridStatistics {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;

        for &value in self.data.iter() {
            if self.is_nodata(value) {
                continue;
            }
            min = min.min(value);
            max = max.max(value);
            sum += value;
            count += 1;
        }

        GridStatistics {
            min: (count > 0).then_some(min),
            max: (count > 0).then_some(max),
            mean: (count > 0).then(|| sum / count as f64),
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

/// Basic statistics for a grid
#[derive(Debug, Clone)]
pub struct GridStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Registration;

    fn domain() -> GridDomain {
        GridDomain::cartesian(0.0, 10.0, 0.0, 5.0, 1.0, 1.0, Registration::Pixel).unwrap()
    }

    #[test]
    fn filled_matches_domain_shape() {
        let grid = Grid::filled(domain(), 0.0);
        assert_eq!(grid.shape(), (5, 10));
        assert_eq!(grid.len(), 50);
    }

    #[test]
    fn from_vec_rejects_bad_length() {
        assert!(Grid::from_vec(domain(), vec![0.0; 49], f64::NAN).is_err());
        assert!(Grid::from_vec(domain(), vec![0.0; 50], f64::NAN).is_ok());
    }

    #[test]
    fn statistics_skip_empty_nodes() {
        let mut grid = Grid::filled(domain(), f64::NAN);
        grid.set(0, 0, 2.0).unwrap();
        grid.set(1, 1, 4.0).unwrap();

        let stats = grid.statistics();
        assert_eq!(stats.min, Some(2.0));
        assert_eq!(stats.max, Some(4.0));
        assert_eq!(stats.mean, Some(3.0));
        assert_eq!(stats.valid_count, 2);
        assert_eq!(stats.nodata_count, 48);
    }

    #[test]
    fn finite_nodata_sentinel() {
        let mut grid = Grid::from_vec(domain(), vec![-9999.0; 50], -9999.0).unwrap();
        grid.set(2, 3, 1.5).unwrap();
        assert!(grid.is_nodata(-9999.0));
        assert!(!grid.is_nodata(1.5));
        assert_eq!(grid.statistics().valid_count, 1);
    }
}
