//! Append-only store of accepted observations
//!
//! Observations are immutable once accepted and are referenced everywhere
//! else by integer index, so the backing vector may grow freely.

use sectorgrid_core::GridDomain;

use crate::window::SearchWindow;

/// One accepted observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    /// Observed value.
    pub z: f64,
    /// Observation weight (1.0 unless the input carries weights).
    pub w: f64,
}

/// Growable store of observations, filtered at the door.
///
/// Records with non-finite fields are dropped, as are records outside the
/// domain widened by the search window (a point just outside the region can
/// still reach nodes inside it). On periodic axes the coordinate is wrapped
/// into the domain instead of range-checked.
#[derive(Debug)]
pub struct PointStore {
    points: Vec<Point>,
    rejected: u64,
    domain: GridDomain,
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl PointStore {
    pub(crate) fn new(domain: &GridDomain, window: &SearchWindow) -> Self {
        let pad_x = window.max_d_col() as f64 * domain.x_inc;
        let pad_y = window.d_row() as f64 * domain.y_inc;
        Self {
            points: Vec::new(),
            rejected: 0,
            domain: *domain,
            x_min: domain.west - pad_x,
            x_max: domain.east + pad_x,
            y_min: domain.south - pad_y,
            y_max: domain.north + pad_y,
        }
    }

    /// Append an observation; returns its id, or `None` if rejected.
    pub fn add(&mut self, x: f64, y: f64, z: f64, w: f64) -> Option<usize> {
        if !x.is_finite() || !y.is_finite() || !z.is_finite() || !w.is_finite() {
            self.rejected += 1;
            return None;
        }
        let x = if self.domain.periodic_x {
            self.domain.wrap_x(x)
        } else if x < self.x_min || x > self.x_max {
            self.rejected += 1;
            return None;
        } else {
            x
        };
        if !self.domain.periodic_y && (y < self.y_min || y > self.y_max) {
            self.rejected += 1;
            return None;
        }

        let id = self.points.len();
        self.points.push(Point { x, y, z, w });
        Some(id)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of records dropped at the door.
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn get(&self, id: usize) -> &Point {
        &self.points[id]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sectorgrid_core::{DistanceUnit, Geometry, Registration};

    fn store(radius: f64) -> PointStore {
        let domain =
            GridDomain::cartesian(0.0, 10.0, 0.0, 10.0, 1.0, 1.0, Registration::Gridline).unwrap();
        let geometry = Geometry::new(domain, DistanceUnit::Cartesian).unwrap();
        let window = SearchWindow::new(&geometry, radius).unwrap();
        PointStore::new(geometry.domain(), &window)
    }

    #[test]
    fn accepts_in_domain_points() {
        let mut s = store(2.0);
        assert_eq!(s.add(5.0, 5.0, 1.0, 1.0), Some(0));
        assert_eq!(s.add(0.0, 10.0, 2.0, 1.0), Some(1));
        assert_eq!(s.len(), 2);
        assert_eq!(s.rejected(), 0);
    }

    #[test]
    fn rejects_non_finite_fields() {
        let mut s = store(2.0);
        assert_eq!(s.add(5.0, 5.0, f64::NAN, 1.0), None);
        assert_eq!(s.add(f64::INFINITY, 5.0, 1.0, 1.0), None);
        assert_eq!(s.add(5.0, 5.0, 1.0, f64::NAN), None);
        assert_eq!(s.rejected(), 3);
        assert!(s.is_empty());
    }

    #[test]
    fn padded_domain_keeps_near_outside_points() {
        let mut s = store(2.0);
        // Window pad is (floor(2/1)+1) = 3 grid steps.
        assert!(s.add(-2.5, 5.0, 1.0, 1.0).is_some());
        assert!(s.add(5.0, 13.0, 1.0, 1.0).is_some());
        assert_eq!(s.add(-4.0, 5.0, 1.0, 1.0), None);
        assert_eq!(s.add(5.0, 14.5, 1.0, 1.0), None);
    }

    #[test]
    fn periodic_x_wraps_instead_of_rejecting() {
        let domain =
            GridDomain::geographic(0.0, 360.0, -90.0, 90.0, 10.0, 10.0, Registration::Gridline)
                .unwrap();
        let geometry = Geometry::new(domain, DistanceUnit::Degrees).unwrap();
        let window = SearchWindow::new(&geometry, 5.0).unwrap();
        let mut s = PointStore::new(geometry.domain(), &window);

        let id = s.add(-15.0, 0.0, 1.0, 1.0).unwrap();
        assert_eq!(s.get(id).x, 345.0);
        assert_eq!(s.rejected(), 0);
    }
}
