//! # sectorgrid core
//!
//! Core types for the sectorgrid gridding toolkit.
//!
//! This crate provides:
//! - `GridDomain`: grid bounds, increments, registration and periodicity
//! - `Geometry`: distance provider over a domain (spherical or Cartesian)
//! - `Grid`: the filled output grid
//! - Error taxonomy shared by the workspace
//! - Native GeoTIFF grid I/O

pub mod domain;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod io;

pub use domain::{GridDomain, Registration};
pub use error::{Error, Result};
pub use geometry::{DistanceUnit, Geometry, MEAN_EARTH_RADIUS};
pub use grid::{Grid, GridStatistics};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::domain::{GridDomain, Registration};
    pub use crate::error::{Error, Result};
    pub use crate::geometry::{DistanceUnit, Geometry};
    pub use crate::grid::Grid;
}
