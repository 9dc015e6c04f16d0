//! Reduction pass
//!
//! Collapses each node's per-sector candidates into one output value (or
//! the empty sentinel) and tallies coverage counters. Nodes are
//! independent, so under the `parallel` feature the pass runs across all
//! cores; the result depends only on the final index state either way.

use crate::index::{SectorIndex, SectorSlot};
use crate::maybe_rayon::*;
use crate::store::PointStore;

/// Coverage counters reported alongside the grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FillReport {
    /// Nodes filled by a weighted average.
    pub filled: usize,
    /// Nodes with candidates in fewer sectors than required.
    pub below_min_sectors: usize,
    /// Nodes no point ever reached.
    pub empty: usize,
}

impl FillReport {
    pub fn total(&self) -> usize {
        self.filled + self.below_min_sectors + self.empty
    }
}

#[derive(Clone, Copy)]
enum Outcome {
    Filled,
    BelowMin,
    Empty,
}

pub(crate) struct ReduceParams {
    pub radius: f64,
    pub min_sectors: usize,
    pub empty_value: f64,
    pub use_weights: bool,
}

/// Consume the index and produce row-major node values plus counters.
pub(crate) fn reduce(
    index: SectorIndex,
    store: &PointStore,
    params: &ReduceParams,
) -> (Vec<f64>, FillReport) {
    let results: Vec<(f64, Outcome)> = index
        .into_nodes()
        .into_par_iter()
        .map(|entry| reduce_node(entry.as_deref(), store, params))
        .collect();

    let mut values = Vec::with_capacity(results.len());
    let mut report = FillReport::default();
    for (value, outcome) in results {
        values.push(value);
        match outcome {
            Outcome::Filled => report.filled += 1,
            Outcome::BelowMin => report.below_min_sectors += 1,
            Outcome::Empty => report.empty += 1,
        }
    }
    (values, report)
}

fn reduce_node(
    slots: Option<&[SectorSlot]>,
    store: &PointStore,
    params: &ReduceParams,
) -> (f64, Outcome) {
    let Some(slots) = slots else {
        return (params.empty_value, Outcome::Empty);
    };

    let filled = slots.iter().filter(|s| s.is_set()).count();
    if filled < params.min_sectors {
        return (params.empty_value, Outcome::BelowMin);
    }

    let mut sum_w = 0.0;
    let mut sum_wz = 0.0;
    for slot in slots.iter().filter(|s| s.is_set()) {
        let point = store.get(slot.point as usize);
        // Radius-normalized inverse-square falloff, exactly 1 for a
        // coincident point. The 3x scaling is a long-standing empirical
        // choice; changing it would silently change every output grid.
        let t = 3.0 * slot.distance as f64 / params.radius;
        let mut w = 1.0 / (1.0 + t * t);
        if params.use_weights {
            w *= point.w;
        }
        sum_w += w;
        sum_wz += w * point.z;
    }
    (sum_wz / sum_w, Outcome::Filled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::window::SearchWindow;
    use approx::assert_relative_eq;
    use sectorgrid_core::{DistanceUnit, Geometry, GridDomain, Registration};

    fn fixture(radius: f64) -> (PointStore, ReduceParams) {
        let domain =
            GridDomain::cartesian(0.0, 10.0, 0.0, 10.0, 1.0, 1.0, Registration::Gridline).unwrap();
        let geometry = Geometry::new(domain, DistanceUnit::Cartesian).unwrap();
        let window = SearchWindow::new(&geometry, radius).unwrap();
        let store = PointStore::new(geometry.domain(), &window);
        let params = ReduceParams {
            radius,
            min_sectors: 1,
            empty_value: f64::NAN,
            use_weights: false,
        };
        (store, params)
    }

    #[test]
    fn untouched_and_thin_nodes_emit_empty() {
        let (mut store, mut params) = fixture(2.0);
        store.add(1.0, 1.0, 5.0, 1.0).unwrap();

        let mut index = SectorIndex::new(4, 4);
        index.update(1, 0, 1.0, 0);
        params.min_sectors = 2;

        let (values, report) = reduce(index, &store, &params);
        assert!(values.iter().all(|v| v.is_nan()));
        assert_eq!(report.empty, 3);
        assert_eq!(report.below_min_sectors, 1);
        assert_eq!(report.filled, 0);
        assert_eq!(report.total(), 4);
    }

    #[test]
    fn coincident_point_weight_is_one() {
        let (mut store, params) = fixture(2.0);
        store.add(0.0, 10.0, 42.0, 1.0).unwrap();

        let mut index = SectorIndex::new(1, 4);
        index.update(0, 2, 0.0, 0);

        let (values, report) = reduce(index, &store, &params);
        assert_relative_eq!(values[0], 42.0);
        assert_eq!(report.filled, 1);
    }

    #[test]
    fn nearer_sectors_dominate_the_average() {
        let (mut store, params) = fixture(3.0);
        let near = store.add(1.0, 1.0, 10.0, 1.0).unwrap();
        let far = store.add(3.0, 3.0, 20.0, 1.0).unwrap();

        let mut index = SectorIndex::new(1, 4);
        index.update(0, 0, 0.5, near as i64);
        index.update(0, 2, 2.5, far as i64);

        let (values, _) = reduce(index, &store, &params);
        // Convex combination, pulled toward the nearby value.
        assert!(values[0] > 10.0 && values[0] < 15.0);
    }

    #[test]
    fn observation_weights_scale_contributions() {
        let (mut store, mut params) = fixture(3.0);
        let a = store.add(1.0, 1.0, 0.0, 3.0).unwrap();
        let b = store.add(2.0, 2.0, 10.0, 1.0).unwrap();

        let mut index = SectorIndex::new(1, 2);
        index.update(0, 0, 1.0, a as i64);
        index.update(0, 1, 1.0, b as i64);

        let (unweighted, _) = reduce(index, &store, &params);
        assert_relative_eq!(unweighted[0], 5.0);

        let mut index = SectorIndex::new(1, 2);
        index.update(0, 0, 1.0, a as i64);
        index.update(0, 1, 1.0, b as i64);
        params.use_weights = true;

        let (weighted, _) = reduce(index, &store, &params);
        assert_relative_eq!(weighted[0], 2.5);
    }
}
