//! Geometry and distance provider
//!
//! Bundles a [`GridDomain`] with a [`DistanceUnit`] into the single object
//! the gridding engine consults for distances, node/coordinate conversions
//! and periodicity. The engine never reads ambient state; everything it
//! needs about the world goes through a [`Geometry`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::GridDomain;
use crate::error::{Error, Result};

/// IUGG mean Earth radius in meters.
pub const MEAN_EARTH_RADIUS: f64 = 6_371_008.7714;

/// Physical unit of the search radius and of all reported distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceUnit {
    Meters,
    Kilometers,
    Miles,
    NauticalMiles,
    Feet,
    /// Great-circle arc degrees.
    Degrees,
    /// Euclidean distance in the coordinate units of the domain.
    Cartesian,
}

impl DistanceUnit {
    /// Parse a one-letter radius suffix: `e` m, `k` km, `M` mi, `n` nmi,
    /// `f` ft, `d` arc degrees.
    pub fn from_suffix(c: char) -> Result<Self> {
        match c {
            'e' => Ok(Self::Meters),
            'k' => Ok(Self::Kilometers),
            'M' => Ok(Self::Miles),
            'n' => Ok(Self::NauticalMiles),
            'f' => Ok(Self::Feet),
            'd' => Ok(Self::Degrees),
            _ => Err(Error::UnknownUnit(c.to_string())),
        }
    }

    /// Whether distances in this unit are measured on the sphere.
    pub fn is_geographic(self) -> bool {
        !matches!(self, Self::Cartesian)
    }

    /// Unit value per meter, for the sphere-based units.
    fn per_meter(self) -> Option<f64> {
        match self {
            Self::Meters => Some(1.0),
            Self::Kilometers => Some(1e-3),
            Self::Miles => Some(1.0 / 1_609.344),
            Self::NauticalMiles => Some(1.0 / 1_852.0),
            Self::Feet => Some(1.0 / 0.3048),
            Self::Degrees | Self::Cartesian => None,
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "m" | "meter" | "meters" => Ok(Self::Meters),
            "km" | "kilometer" | "kilometers" => Ok(Self::Kilometers),
            "mi" | "mile" | "miles" => Ok(Self::Miles),
            "nmi" | "nautical" => Ok(Self::NauticalMiles),
            "ft" | "foot" | "feet" => Ok(Self::Feet),
            "deg" | "degree" | "degrees" => Ok(Self::Degrees),
            "cartesian" => Ok(Self::Cartesian),
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::from_suffix(c),
                    _ => Err(Error::UnknownUnit(other.to_string())),
                }
            }
        }
    }
}

/// Distance provider over a grid domain.
///
/// Construction fails when the unit cannot serve the domain (a spherical
/// unit on a Cartesian domain or vice versa), so a bad configuration
/// surfaces before any gridding work begins.
#[derive(Debug, Clone)]
pub struct Geometry {
    domain: GridDomain,
    unit: DistanceUnit,
    /// Distance of one degree of great-circle arc, in `unit`.
    dist_per_degree: f64,
}

impl Geometry {
    pub fn new(domain: GridDomain, unit: DistanceUnit) -> Result<Self> {
        if domain.geographic != unit.is_geographic() {
            return Err(Error::InvalidParameter {
                name: "unit",
                value: format!("{unit:?}"),
                reason: if domain.geographic {
                    "geographic domains need a spherical distance unit".into()
                } else {
                    "Cartesian domains need the Cartesian distance unit".into()
                },
            });
        }
        let dist_per_degree = match unit.per_meter() {
            Some(scale) => MEAN_EARTH_RADIUS.to_radians() * scale,
            None => 1.0,
        };
        Ok(Self {
            domain,
            unit,
            dist_per_degree,
        })
    }

    pub fn domain(&self) -> &GridDomain {
        &self.domain
    }

    pub fn unit(&self) -> DistanceUnit {
        self.unit
    }

    /// Distance of one degree of great-circle arc (one degree of latitude
    /// along a meridian), in the configured unit. 1.0 for Cartesian and
    /// arc-degree units.
    pub fn distance_per_degree(&self) -> f64 {
        self.dist_per_degree
    }

    /// Distance between two coordinate pairs in the configured unit.
    ///
    /// Geographic units use the great-circle distance on the mean-radius
    /// sphere, which is wraparound-aware by construction. Cartesian
    /// distances unwrap each axis across a periodic seam before measuring.
    pub fn distance(&self, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
        if self.unit == DistanceUnit::Cartesian {
            let mut dx = x2 - x1;
            let mut dy = y2 - y1;
            if self.domain.periodic_x {
                let w = self.domain.width_x();
                if dx.abs() > 0.5 * w {
                    dx -= w * dx.signum();
                }
            }
            if self.domain.periodic_y {
                let h = self.domain.width_y();
                if dy.abs() > 0.5 * h {
                    dy -= h * dy.signum();
                }
            }
            dx.hypot(dy)
        } else {
            haversine_degrees(x1, y1, x2, y2) * self.dist_per_degree
        }
    }

    pub fn is_periodic_x(&self) -> bool {
        self.domain.periodic_x
    }

    pub fn is_periodic_y(&self) -> bool {
        self.domain.periodic_y
    }

    pub fn domain_width_x(&self) -> f64 {
        self.domain.width_x()
    }

    pub fn domain_width_y(&self) -> f64 {
        self.domain.width_y()
    }

    pub fn x_to_col(&self, x: f64) -> i64 {
        self.domain.x_to_col(x)
    }

    pub fn y_to_row(&self, y: f64) -> i64 {
        self.domain.y_to_row(y)
    }

    pub fn col_to_x(&self, col: i64) -> f64 {
        self.domain.col_to_x(col)
    }

    pub fn row_to_y(&self, row: i64) -> f64 {
        self.domain.row_to_y(row)
    }
}

/// Great-circle arc between two lon/lat points, in degrees.
fn haversine_degrees(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let sin_dlat = ((phi2 - phi1) / 2.0).sin();
    let sin_dlon = ((lon2 - lon1).to_radians() / 2.0).sin();
    let a = sin_dlat * sin_dlat + phi1.cos() * phi2.cos() * sin_dlon * sin_dlon;
    2.0 * a.sqrt().min(1.0).asin().to_degrees()
}
