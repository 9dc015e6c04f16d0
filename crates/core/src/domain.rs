//! Grid domain model
//!
//! A [`GridDomain`] describes the lattice the engine fills: rectangular
//! bounds, node increments, registration convention and periodicity flags.
//! Node layout is row-major with row 0 at the northern/top edge.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Relative tolerance used when checking that the domain span is an
/// integer number of increments.
const SPAN_TOL: f64 = 1e-8;

/// Node registration convention.
///
/// Gridline registration places node centers exactly on the stated domain
/// boundary coordinates; pixel registration offsets them by half a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Registration {
    Gridline,
    Pixel,
}

/// A rectangular grid domain with fixed increments.
///
/// Invariants enforced at construction: increments are positive and finite,
/// `east > west`, `north > south`, and each span is an integer multiple of
/// its increment (so the node count is deterministic).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridDomain {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
    pub x_inc: f64,
    pub y_inc: f64,
    pub registration: Registration,
    /// Coordinates are geographic lon/lat degrees.
    pub geographic: bool,
    /// The east and west edges represent the same physical locus.
    pub periodic_x: bool,
    /// The north and south edges represent the same physical locus.
    pub periodic_y: bool,
}

impl GridDomain {
    /// Create a Cartesian (non-periodic) domain.
    pub fn cartesian(
        west: f64,
        east: f64,
        south: f64,
        north: f64,
        x_inc: f64,
        y_inc: f64,
        registration: Registration,
    ) -> Result<Self> {
        let domain = Self {
            west,
            east,
            south,
            north,
            x_inc,
            y_inc,
            registration,
            geographic: false,
            periodic_x: false,
            periodic_y: false,
        };
        domain.validate()?;
        Ok(domain)
    }

    /// Create a geographic (lon/lat) domain.
    ///
    /// A domain spanning 360 degrees of longitude is periodic in x.
    pub fn geographic(
        west: f64,
        east: f64,
        south: f64,
        north: f64,
        x_inc: f64,
        y_inc: f64,
        registration: Registration,
    ) -> Result<Self> {
        let mut domain = Self::cartesian(west, east, south, north, x_inc, y_inc, registration)?;
        domain.geographic = true;
        domain.periodic_x = (east - west - 360.0).abs() < SPAN_TOL * 360.0;
        Ok(domain)
    }

    /// Opt a Cartesian domain into periodic boundaries on either axis.
    pub fn with_periodic(mut self, x: bool, y: bool) -> Self {
        self.periodic_x = x;
        self.periodic_y = y;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.x_inc.is_finite() || !self.y_inc.is_finite() || self.x_inc <= 0.0 || self.y_inc <= 0.0 {
            return Err(Error::InvalidDomain(format!(
                "increments must be positive, got {}/{}",
                self.x_inc, self.y_inc
            )));
        }
        if !(self.east > self.west) || !(self.north > self.south) {
            return Err(Error::InvalidDomain(format!(
                "empty region {}/{}/{}/{}",
                self.west, self.east, self.south, self.north
            )));
        }
        for (name, span, inc) in [
            ("x", self.east - self.west, self.x_inc),
            ("y", self.north - self.south, self.y_inc),
        ] {
            let steps = span / inc;
            if (steps - steps.round()).abs() > SPAN_TOL * steps.max(1.0) {
                return Err(Error::InvalidDomain(format!(
                    "{name} span {span} is not a multiple of increment {inc}"
                )));
            }
        }
        Ok(())
    }

    fn offset(&self) -> f64 {
        match self.registration {
            Registration::Gridline => 0.0,
            Registration::Pixel => 0.5,
        }
    }

    /// Number of node columns.
    pub fn n_columns(&self) -> usize {
        let steps = ((self.east - self.west) / self.x_inc).round() as usize;
        match self.registration {
            Registration::Gridline => steps + 1,
            Registration::Pixel => steps,
        }
    }

    /// Number of node rows.
    pub fn n_rows(&self) -> usize {
        let steps = ((self.north - self.south) / self.y_inc).round() as usize;
        match self.registration {
            Registration::Gridline => steps + 1,
            Registration::Pixel => steps,
        }
    }

    /// Total node count.
    pub fn n_nodes(&self) -> usize {
        self.n_rows() * self.n_columns()
    }

    /// Row-major node id of (row, col).
    pub fn node_id(&self, row: usize, col: usize) -> usize {
        row * self.n_columns() + col
    }

    /// X coordinate of a node column (columns may lie outside the grid).
    pub fn col_to_x(&self, col: i64) -> f64 {
        self.west + (col as f64 + self.offset()) * self.x_inc
    }

    /// Y coordinate of a node row; row 0 is the northern edge.
    pub fn row_to_y(&self, row: i64) -> f64 {
        self.north - (row as f64 + self.offset()) * self.y_inc
    }

    /// Column of the node nearest to `x` (may be outside the grid).
    pub fn x_to_col(&self, x: f64) -> i64 {
        ((x - self.west) / self.x_inc - self.offset()).round() as i64
    }

    /// Row of the node nearest to `y` (may be outside the grid).
    pub fn y_to_row(&self, y: f64) -> i64 {
        ((self.north - y) / self.y_inc - self.offset()).round() as i64
    }

    /// Domain width in x, in coordinate units.
    pub fn width_x(&self) -> f64 {
        self.east - self.west
    }

    /// Domain height in y, in coordinate units.
    pub fn width_y(&self) -> f64 {
        self.north - self.south
    }

    /// Column-index period for periodic-x wraparound.
    ///
    /// Gridline registration duplicates the seam column, so the period is
    /// one less than the column count.
    pub fn x_period(&self) -> usize {
        match self.registration {
            Registration::Gridline => self.n_columns() - 1,
            Registration::Pixel => self.n_columns(),
        }
    }

    /// Row-index period for periodic-y wraparound.
    pub fn y_period(&self) -> usize {
        match self.registration {
            Registration::Gridline => self.n_rows() - 1,
            Registration::Pixel => self.n_rows(),
        }
    }

    /// Whether a search can spill over the north pole and come back down
    /// on the opposite meridian. Requires a global geographic grid.
    pub fn wraps_north_pole(&self) -> bool {
        self.geographic && self.periodic_x && self.north == 90.0
    }

    /// Whether a search can spill over the south pole.
    pub fn wraps_south_pole(&self) -> bool {
        self.geographic && self.periodic_x && self.south == -90.0
    }

    /// Wrap an x coordinate into `[west, west + width_x)`.
    ///
    /// Only meaningful for periodic-x domains; other coordinates are
    /// returned unchanged.
    pub fn wrap_x(&self, x: f64) -> f64 {
        if !self.periodic_x {
            return x;
        }
        let w = self.width_x();
        let mut x = (x - self.west).rem_euclid(w) + self.west;
        if x >= self.east {
            x -= w;
        }
        x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn node_counts_gridline_vs_pixel() {
        let g = GridDomain::cartesian(0.0, 10.0, 0.0, 5.0, 1.0, 1.0, Registration::Gridline).unwrap();
        assert_eq!(g.n_columns(), 11);
        assert_eq!(g.n_rows(), 6);

        let p = GridDomain::cartesian(0.0, 10.0, 0.0, 5.0, 1.0, 1.0, Registration::Pixel).unwrap();
        assert_eq!(p.n_columns(), 10);
        assert_eq!(p.n_rows(), 5);
    }

    #[test]
    fn node_coordinates_roundtrip() {
        let g = GridDomain::cartesian(2.0, 12.0, -4.0, 6.0, 0.5, 0.5, Registration::Gridline).unwrap();
        for col in 0..g.n_columns() as i64 {
            assert_eq!(g.x_to_col(g.col_to_x(col)), col);
        }
        for row in 0..g.n_rows() as i64 {
            assert_eq!(g.y_to_row(g.row_to_y(row)), row);
        }
        // Row 0 sits on the northern edge for gridline registration.
        assert_relative_eq!(g.row_to_y(0), 6.0);
    }

    #[test]
    fn pixel_nodes_are_cell_centers() {
        let p = GridDomain::cartesian(0.0, 4.0, 0.0, 4.0, 1.0, 1.0, Registration::Pixel).unwrap();
        assert_relative_eq!(p.col_to_x(0), 0.5);
        assert_relative_eq!(p.row_to_y(0), 3.5);
    }

    #[test]
    fn global_grid_is_periodic_in_x() {
        let g = GridDomain::geographic(0.0, 360.0, -90.0, 90.0, 30.0, 30.0, Registration::Gridline)
            .unwrap();
        assert!(g.periodic_x);
        assert!(!g.periodic_y);
        assert!(g.wraps_north_pole());
        assert!(g.wraps_south_pole());
        assert_eq!(g.x_period(), g.n_columns() - 1);

        let regional =
            GridDomain::geographic(-30.0, 30.0, 30.0, 60.0, 1.0, 1.0, Registration::Gridline)
                .unwrap();
        assert!(!regional.periodic_x);
        assert!(!regional.wraps_north_pole());
    }

    #[test]
    fn wrap_x_normalizes_longitudes() {
        let g = GridDomain::geographic(0.0, 360.0, -90.0, 90.0, 10.0, 10.0, Registration::Gridline)
            .unwrap();
        assert_relative_eq!(g.wrap_x(365.0), 5.0);
        assert_relative_eq!(g.wrap_x(-10.0), 350.0);
        assert_relative_eq!(g.wrap_x(360.0), 0.0);
    }

    #[test]
    fn bad_domains_rejected() {
        assert!(GridDomain::cartesian(0.0, 10.0, 0.0, 5.0, 0.0, 1.0, Registration::Gridline).is_err());
        assert!(GridDomain::cartesian(10.0, 0.0, 0.0, 5.0, 1.0, 1.0, Registration::Gridline).is_err());
        assert!(GridDomain::cartesian(0.0, 10.0, 0.0, 5.0, 3.0, 1.0, Registration::Gridline).is_err());
    }
}
