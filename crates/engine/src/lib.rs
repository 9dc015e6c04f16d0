//! # sectorgrid engine
//!
//! Sector-based nearest-neighbor gridding of scattered observations.
//!
//! For every accepted point the engine finds all grid nodes within a
//! search radius, assigns the point to the angular sector it occupies at
//! each node, and keeps only the closest point per (node, sector) —
//! wraparound-aware for periodic and global geographic grids. A final
//! reduction averages each node's per-sector survivors with a
//! distance-based weight, or emits the empty sentinel when too few
//! sectors are occupied.
//!
//! The sector constraint enforces directional diversity: a node is only
//! considered constrained when observations surround it, not merely when
//! many observations pile up on one side.
//!
//! Reference:
//! Shepard, D. (1968). A two-dimensional interpolation function for
//! irregularly-spaced data. ACM National Conference.

mod assign;
mod index;
mod maybe_rayon;
mod reduce;
mod store;
mod window;

pub mod gridder;

pub use gridder::{Gridder, GridderParams, Gridding};
pub use index::{SectorIndex, SectorSlot, UNSET};
pub use reduce::FillReport;
pub use store::{Point, PointStore};
pub use window::SearchWindow;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::gridder::{Gridder, GridderParams, Gridding};
    pub use crate::reduce::FillReport;
    pub use sectorgrid_core::prelude::*;
}
