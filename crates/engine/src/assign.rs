//! Sector assignment
//!
//! Walks every accepted point over the grid nodes inside its search
//! window, resolves row/column wraparound at the domain boundaries,
//! computes the angular sector the point occupies at each node, and
//! records the closest candidate per (node, sector).

use std::f64::consts::{PI, TAU};

use sectorgrid_core::{Geometry, GridDomain, Registration};

use crate::index::SectorIndex;
use crate::store::{Point, PointStore};
use crate::window::SearchWindow;

/// Assign all stored points, in insertion order.
///
/// Order matters only for exact distance ties (first seen is kept), so a
/// fixed iteration order makes the whole engine reproducible.
pub(crate) fn assign_points(
    geometry: &Geometry,
    window: &SearchWindow,
    store: &PointStore,
    index: &mut SectorIndex,
    radius: f64,
) {
    for (id, point) in store.iter().enumerate() {
        assign_point(geometry, window, index, radius, id as i64, point);
    }
}

fn assign_point(
    geometry: &Geometry,
    window: &SearchWindow,
    index: &mut SectorIndex,
    radius: f64,
    id: i64,
    point: &Point,
) {
    let domain = geometry.domain();
    let row0 = domain.y_to_row(point.y);
    let col0 = domain.x_to_col(point.x);

    for r in (row0 - window.d_row())..=(row0 + window.d_row()) {
        let Some((row, flip)) = resolve_row(domain, r) else {
            continue;
        };
        let half = window.d_col(row as usize);
        for c in (col0 - half)..=(col0 + half) {
            let Some(col) = resolve_col(domain, c, flip) else {
                continue;
            };
            let node_x = domain.col_to_x(col);
            let node_y = domain.row_to_y(row);
            let distance = geometry.distance(point.x, point.y, node_x, node_y);
            if distance > radius {
                continue;
            }
            let (dx, dy) = node_offset(domain, point, node_x, node_y);
            let sector = sector_of(dx, dy, index.sectors());

            let (nodes, n) = equivalent_nodes(domain, row, col);
            for &(rr, cc) in &nodes[..n] {
                index.update(
                    domain.node_id(rr as usize, cc as usize),
                    sector,
                    distance as f32,
                    id,
                );
            }
        }
    }
}

/// Map a raw candidate row onto the grid.
///
/// Beyond-pole rows of a global geographic grid reflect back onto the grid
/// on the opposite meridian; the returned flag tells the column resolver to
/// shift by half the domain.
fn resolve_row(domain: &GridDomain, r: i64) -> Option<(i64, bool)> {
    let n = domain.n_rows() as i64;
    if (0..n).contains(&r) {
        return Some((r, false));
    }
    if domain.periodic_y {
        return Some((r.rem_euclid(domain.y_period() as i64), false));
    }
    if r < 0 && domain.wraps_north_pole() {
        let rr = match domain.registration {
            Registration::Gridline => -r,
            Registration::Pixel => -r - 1,
        };
        if rr < n {
            return Some((rr, true));
        }
    } else if r >= n && domain.wraps_south_pole() {
        let rr = match domain.registration {
            Registration::Gridline => 2 * (n - 1) - r,
            Registration::Pixel => 2 * n - 1 - r,
        };
        if rr >= 0 {
            return Some((rr, true));
        }
    }
    None
}

/// Map a raw candidate column onto the grid, honoring periodic wraparound.
///
/// The wrap is modular in the column *period*: gridline registration
/// carries a duplicated seam column, so its period is one less than the
/// column count and the seam twin is handled by [`equivalent_nodes`].
fn resolve_col(domain: &GridDomain, c: i64, flip: bool) -> Option<i64> {
    let n = domain.n_columns() as i64;
    let c = if flip {
        c + domain.x_period() as i64 / 2
    } else {
        c
    };
    if (0..n).contains(&c) {
        Some(c)
    } else if domain.periodic_x {
        Some(c.rem_euclid(domain.x_period() as i64))
    } else {
        None
    }
}

/// Point-to-node offset, unwrapped across periodic seams.
///
/// When the shortest path crosses a seam the raw difference exceeds half
/// the domain width and points the wrong way; shifting by a full width
/// restores the short way around.
fn node_offset(domain: &GridDomain, point: &Point, node_x: f64, node_y: f64) -> (f64, f64) {
    let mut dx = node_x - point.x;
    let mut dy = node_y - point.y;
    if domain.periodic_x {
        let w = domain.width_x();
        if dx.abs() > 0.5 * w {
            dx -= w * dx.signum();
        }
    }
    if domain.periodic_y {
        let h = domain.width_y();
        if dy.abs() > 0.5 * h {
            dy -= h * dy.signum();
        }
    }
    (dx, dy)
}

/// Angular sector of the (dx, dy) direction among `n` equal slices.
///
/// `floor` resolves directions exactly on a slice boundary to the higher
/// sector index; the `atan2(dy, dx) = pi` ray wraps to sector 0.
fn sector_of(dx: f64, dy: f64, n: usize) -> usize {
    let frac = (dy.atan2(dx) + PI) / TAU;
    ((frac * n as f64).floor() as usize) % n
}

/// Physically equivalent node coordinates for a (row, col) assignment.
///
/// Gridline-registered periodic axes store the seam twice; an update
/// landing on either copy must reach both, independently per axis, so a
/// corner of a doubly periodic grid yields all four copies.
pub(crate) fn equivalent_nodes(
    domain: &GridDomain,
    row: i64,
    col: i64,
) -> ([(i64, i64); 4], usize) {
    let mut out = [(row, col); 4];
    let mut n = 1;
    if domain.periodic_x && domain.registration == Registration::Gridline {
        let last = domain.n_columns() as i64 - 1;
        if col == 0 {
            out[n] = (row, last);
            n += 1;
        } else if col == last {
            out[n] = (row, 0);
            n += 1;
        }
    }
    if domain.periodic_y && domain.registration == Registration::Gridline {
        let last = domain.n_rows() as i64 - 1;
        let twin = if row == 0 {
            Some(last)
        } else if row == last {
            Some(0)
        } else {
            None
        };
        if let Some(twin) = twin {
            for i in 0..n {
                out[n + i] = (twin, out[i].1);
            }
            n *= 2;
        }
    }
    (out, n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn global_domain() -> GridDomain {
        GridDomain::geographic(0.0, 360.0, -90.0, 90.0, 30.0, 30.0, Registration::Gridline).unwrap()
    }

    #[test]
    fn sector_quadrants() {
        // Four sectors: the split starts at the atan2 branch cut (-pi).
        assert_eq!(sector_of(-1.0, 0.0, 4), 0); // due west: pi wraps to 0
        assert_eq!(sector_of(0.0, -1.0, 4), 1); // due south
        assert_eq!(sector_of(1.0, 0.0, 4), 2); // due east
        assert_eq!(sector_of(0.0, 1.0, 4), 3); // due north
        assert_eq!(sector_of(1.0, 1.0, 4), 2);
        assert_eq!(sector_of(-1.0, -1.0, 4), 0);
    }

    #[test]
    fn sector_boundary_goes_to_higher_index() {
        // dy < 0, dx = 0 sits exactly on the 1/4 boundary of 4 sectors.
        assert_eq!(sector_of(0.0, -1.0, 4), 1);
        // A single sector swallows everything.
        for (dx, dy) in [(1.0, 0.0), (-1.0, 0.3), (0.0, -2.0)] {
            assert_eq!(sector_of(dx, dy, 1), 0);
        }
    }

    #[test]
    fn column_wrap_uses_gridline_period() {
        let domain = global_domain(); // 13 columns, period 12
        assert_eq!(resolve_col(&domain, 5, false), Some(5));
        assert_eq!(resolve_col(&domain, 12, false), Some(12));
        assert_eq!(resolve_col(&domain, 13, false), Some(1));
        assert_eq!(resolve_col(&domain, -1, false), Some(11));
        assert_eq!(resolve_col(&domain, -12, false), Some(0));
    }

    #[test]
    fn column_out_of_range_without_periodicity() {
        let domain =
            GridDomain::cartesian(0.0, 10.0, 0.0, 10.0, 1.0, 1.0, Registration::Gridline).unwrap();
        assert_eq!(resolve_col(&domain, -1, false), None);
        assert_eq!(resolve_col(&domain, 11, false), None);
        assert_eq!(resolve_row(&domain, -1), None);
        assert_eq!(resolve_row(&domain, 11), None);
    }

    #[test]
    fn beyond_pole_rows_reflect_and_flip() {
        let domain = global_domain(); // 7 rows, row 0 at the north pole
        assert_eq!(resolve_row(&domain, 0), Some((0, false)));
        assert_eq!(resolve_row(&domain, -1), Some((1, true)));
        assert_eq!(resolve_row(&domain, -2), Some((2, true)));
        assert_eq!(resolve_row(&domain, 7), Some((5, true)));
        assert_eq!(resolve_row(&domain, 8), Some((4, true)));
        // The flip shifts columns by half the period (180 degrees).
        assert_eq!(resolve_col(&domain, 0, true), Some(6));
        assert_eq!(resolve_col(&domain, 10, true), Some(4));
    }

    #[test]
    fn no_pole_wrap_for_regional_grids() {
        let domain =
            GridDomain::geographic(0.0, 360.0, 0.0, 60.0, 30.0, 30.0, Registration::Gridline)
                .unwrap();
        // Periodic in x but the north edge is not a pole.
        assert_eq!(resolve_row(&domain, -1), None);
    }

    #[test]
    fn seam_nodes_have_twins() {
        let domain = global_domain();
        let last_col = domain.n_columns() as i64 - 1;

        let (nodes, n) = equivalent_nodes(&domain, 3, 0);
        assert_eq!(&nodes[..n], &[(3, 0), (3, last_col)]);

        let (nodes, n) = equivalent_nodes(&domain, 3, last_col);
        assert_eq!(&nodes[..n], &[(3, last_col), (3, 0)]);

        let (_, n) = equivalent_nodes(&domain, 3, 5);
        assert_eq!(n, 1);
    }

    #[test]
    fn doubly_periodic_corner_has_four_copies() {
        let domain =
            GridDomain::cartesian(0.0, 10.0, 0.0, 10.0, 1.0, 1.0, Registration::Gridline)
                .unwrap()
                .with_periodic(true, true);
        let (nodes, n) = equivalent_nodes(&domain, 0, 0);
        assert_eq!(n, 4);
        assert_eq!(&nodes[..n], &[(0, 0), (0, 10), (10, 0), (10, 10)]);
    }

    #[test]
    fn offsets_unwrap_across_the_seam() {
        let domain = global_domain();
        let p = Point {
            x: 359.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        };
        let (dx, dy) = node_offset(&domain, &p, 0.0, 0.0);
        assert_eq!(dx, 1.0);
        assert_eq!(dy, 0.0);
        let (dx, _) = node_offset(&domain, &p, 350.0, 0.0);
        assert_eq!(dx, -9.0);
    }
}
