//! Search-window precomputation
//!
//! For a given radius the engine needs to know, per grid row, how many
//! columns to each side of a point's home column can possibly hold nodes
//! within the radius. On a sphere that half-width grows toward the poles
//! as meridians converge, which is why `d_col` is per-row rather than a
//! single scalar.

use sectorgrid_core::{DistanceUnit, Error, Geometry, Result};

/// Latitudes closer to a pole than this search the entire row.
const POLAR_LAT: f64 = 89.999_999;

/// Precomputed row/column search half-widths for one radius and grid.
#[derive(Debug, Clone)]
pub struct SearchWindow {
    d_col: Vec<i64>,
    d_row: i64,
    max_d_col: i64,
}

impl SearchWindow {
    /// Precompute the window. Fails on a grid with zero nodes.
    pub fn new(geometry: &Geometry, radius: f64) -> Result<Self> {
        let domain = geometry.domain();
        let (rows, cols) = (domain.n_rows(), domain.n_columns());
        if rows == 0 || cols == 0 {
            return Err(Error::DegenerateGrid { rows, cols });
        }

        // Searching further than the whole grid (or half of it, around a
        // periodic axis) is pointless.
        let col_cap = if domain.periodic_x {
            (cols / 2 + 1) as i64
        } else {
            cols as i64
        };
        let row_cap = rows as i64;

        let d_col;
        let d_row;
        if geometry.unit() == DistanceUnit::Cartesian {
            let half = half_width(radius, domain.x_inc, col_cap);
            d_col = vec![half; rows];
            d_row = half_width(radius, domain.y_inc, row_cap);
        } else {
            let dpd = geometry.distance_per_degree();
            d_row = half_width(radius, dpd * domain.y_inc, row_cap);
            d_col = (0..rows as i64)
                .map(|row| {
                    let lat = domain.row_to_y(row);
                    if lat.abs() > POLAR_LAT {
                        col_cap
                    } else {
                        let per_col = dpd * lat.to_radians().cos() * domain.x_inc;
                        half_width(radius, per_col, col_cap)
                    }
                })
                .collect();
        }

        let max_d_col = d_col.iter().copied().max().unwrap_or(0);
        Ok(Self {
            d_col,
            d_row,
            max_d_col,
        })
    }

    /// Row search half-width.
    pub fn d_row(&self) -> i64 {
        self.d_row
    }

    /// Column search half-width for `row`.
    pub fn d_col(&self, row: usize) -> i64 {
        self.d_col[row]
    }

    /// Largest column half-width over all rows.
    pub fn max_d_col(&self) -> i64 {
        self.max_d_col
    }
}

/// Integer half-width covering `radius` at `dist_per_step` spacing.
///
/// `floor + 1` rather than `ceil`: along a parallel the node spacing is an
/// arc length while the radius check uses the (shorter) great circle, so
/// the window must overshoot by a step to be a safe upper bound.
fn half_width(radius: f64, dist_per_step: f64, cap: i64) -> i64 {
    let steps = radius / dist_per_step;
    if !steps.is_finite() || steps.floor() as i64 >= cap {
        cap
    } else {
        steps.floor() as i64 + 1
    }
}
