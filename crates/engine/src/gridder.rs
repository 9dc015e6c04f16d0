//! Gridding façade
//!
//! Ties the engine together: validate the configuration, precompute the
//! search window, stream observations in, then run the assignment and
//! reduction passes to produce the output grid and its coverage report.

use tracing::{debug, info};

use sectorgrid_core::{Error, Geometry, Grid, Result};

use crate::assign;
use crate::index::SectorIndex;
use crate::reduce::{self, FillReport, ReduceParams};
use crate::store::PointStore;
use crate::window::SearchWindow;

/// Engine configuration.
///
/// The radius is expressed in the unit of the [`Geometry`] the gridder is
/// built with.
#[derive(Debug, Clone)]
pub struct GridderParams {
    /// Search radius (> 0).
    pub radius: f64,
    /// Number of angular sectors around each node.
    pub sectors: u32,
    /// Sectors that must hold a candidate before a node is filled.
    /// `None` means all of them.
    pub min_sectors: Option<u32>,
    /// Value emitted for nodes that cannot be filled.
    pub empty_value: f64,
    /// Multiply distance weights by the per-observation weight column.
    pub use_weights: bool,
}

impl Default for GridderParams {
    fn default() -> Self {
        Self {
            radius: 1.0,
            sectors: 4,
            min_sectors: None,
            empty_value: f64::NAN,
            use_weights: false,
        }
    }
}

impl GridderParams {
    fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "radius",
                value: self.radius.to_string(),
                reason: "search radius must be positive".into(),
            });
        }
        if self.sectors == 0 {
            return Err(Error::InvalidParameter {
                name: "sectors",
                value: "0".into(),
                reason: "at least one sector is required".into(),
            });
        }
        if let Some(min) = self.min_sectors {
            if min == 0 || min > self.sectors {
                return Err(Error::InvalidParameter {
                    name: "min_sectors",
                    value: min.to_string(),
                    reason: format!("must be between 1 and {}", self.sectors),
                });
            }
        }
        Ok(())
    }
}

/// Result of a gridding run.
#[derive(Debug)]
pub struct Gridding {
    pub grid: Grid,
    pub report: FillReport,
}

/// Sector-based nearest-neighbor gridder.
///
/// ```ignore
/// let mut gridder = Gridder::new(geometry, params)?;
/// for rec in records {
///     gridder.add(rec.x, rec.y, rec.z, 1.0);
/// }
/// let Gridding { grid, report } = gridder.grid()?;
/// ```
#[derive(Debug)]
pub struct Gridder {
    geometry: Geometry,
    params: GridderParams,
    window: SearchWindow,
    store: PointStore,
}

impl Gridder {
    /// Validate the configuration and precompute the search window.
    ///
    /// All fatal configuration errors (bad radius or sector counts, a grid
    /// with no nodes) surface here, before any point is processed.
    pub fn new(geometry: Geometry, params: GridderParams) -> Result<Self> {
        params.validate()?;
        let window = SearchWindow::new(&geometry, params.radius)?;
        debug!(
            d_row = window.d_row(),
            max_d_col = window.max_d_col(),
            "search window ready"
        );
        let store = PointStore::new(geometry.domain(), &window);
        Ok(Self {
            geometry,
            params,
            window,
            store,
        })
    }

    /// Stream one observation in; returns its point id, or `None` if the
    /// record was dropped (non-finite fields, or out of reach of the grid).
    pub fn add(&mut self, x: f64, y: f64, z: f64, w: f64) -> Option<usize> {
        self.store.add(x, y, z, w)
    }

    /// Number of accepted observations so far.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Number of records dropped at the door.
    pub fn rejected(&self) -> u64 {
        self.store.rejected()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Run the search and reduction, consuming the gridder.
    pub fn grid(self) -> Result<Gridding> {
        let domain = *self.geometry.domain();
        info!(
            points = self.store.len(),
            rejected = self.store.rejected(),
            nodes = domain.n_nodes(),
            "assigning points to node sectors"
        );

        let mut index = SectorIndex::new(domain.n_nodes(), self.params.sectors as usize);
        assign::assign_points(
            &self.geometry,
            &self.window,
            &self.store,
            &mut index,
            self.params.radius,
        );
        debug!(nodes_touched = index.touched(), "assignment complete");

        let reduce_params = ReduceParams {
            radius: self.params.radius,
            min_sectors: self.params.min_sectors.unwrap_or(self.params.sectors) as usize,
            empty_value: self.params.empty_value,
            use_weights: self.params.use_weights,
        };
        let (values, report) = reduce::reduce(index, &self.store, &reduce_params);
        info!(
            filled = report.filled,
            below_min_sectors = report.below_min_sectors,
            empty = report.empty,
            "reduction complete"
        );

        let grid = Grid::from_vec(domain, values, self.params.empty_value)?;
        Ok(Gridding { grid, report })
    }
}
