//! UTM to WGS84 conversion.
//!
//! Inverse transverse Mercator using the series expansion from Snyder,
//! "Map Projections: A Working Manual" (USGS 1395), good to well under a
//! metre inside a zone.
use std::fmt;
use std::str::FromStr;

use crate::models::GeoPoint;

// WGS84 ellipsoid
const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
const FLATTENING: f64 = 1.0 / 298.257_223_563;

const SCALE_FACTOR: f64 = 0.9996;
const FALSE_EASTING: f64 = 500_000.0;
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

const ZONE_WIDTH_DEG: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtmZone {
    number: u8,
    hemisphere: Hemisphere,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ZoneError {
    #[error("UTM zone number {0} is outside 1..=60")]
    OutOfRange(u32),
    #[error("cannot read UTM zone from {0:?}, expected e.g. \"18N\"")]
    Malformed(String),
}

impl UtmZone {
    /// Zone the bundled dataset is recorded in.
    pub const ZONE_18_NORTH: UtmZone = UtmZone {
        number: 18,
        hemisphere: Hemisphere::North,
    };

    pub fn new(number: u32, hemisphere: Hemisphere) -> Result<Self, ZoneError> {
        if !(1..=60).contains(&number) {
            return Err(ZoneError::OutOfRange(number));
        }
        Ok(UtmZone {
            number: number as u8,
            hemisphere,
        })
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    /// Longitude of the zone's central meridian in degrees.
    pub fn central_meridian(&self) -> f64 {
        (self.number as f64 - 1.0) * ZONE_WIDTH_DEG - 180.0 + ZONE_WIDTH_DEG / 2.0
    }
}

impl Default for UtmZone {
    fn default() -> Self {
        UtmZone::ZONE_18_NORTH
    }
}

impl fmt::Display for UtmZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let h = match self.hemisphere {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
        };
        write!(f, "{}{}", self.number, h)
    }
}

impl FromStr for UtmZone {
    type Err = ZoneError;

    /// Accepts `"18N"`, `"18s"` or a bare `"18"` (north).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let malformed = || ZoneError::Malformed(s.to_string());
        let (digits, hemisphere) = match s.chars().last() {
            Some('N' | 'n') => (&s[..s.len() - 1], Hemisphere::North),
            Some('S' | 's') => (&s[..s.len() - 1], Hemisphere::South),
            Some(c) if c.is_ascii_digit() => (s, Hemisphere::North),
            _ => return Err(malformed()),
        };
        let number: u32 = digits.parse().map_err(|_| malformed())?;
        UtmZone::new(number, hemisphere)
    }
}

/// Convert an easting/northing pair in `zone` to latitude/longitude.
///
/// Returns `None` when the input or the result is not finite.
pub fn to_lat_lng(easting: f64, northing: f64, zone: UtmZone) -> Option<GeoPoint> {
    if !easting.is_finite() || !northing.is_finite() {
        return None;
    }

    let e2 = FLATTENING * (2.0 - FLATTENING);
    let ep2 = e2 / (1.0 - e2);
    let e4 = e2 * e2;
    let e6 = e4 * e2;

    let x = easting - FALSE_EASTING;
    let y = match zone.hemisphere {
        Hemisphere::North => northing,
        Hemisphere::South => northing - FALSE_NORTHING_SOUTH,
    };

    // Footpoint latitude from the meridional arc
    let m = y / SCALE_FACTOR;
    let mu = m / (SEMI_MAJOR_AXIS * (1.0 - e2 / 4.0 - 3.0 * e4 / 64.0 - 5.0 * e6 / 256.0));
    let sqrt_1_e2 = (1.0 - e2).sqrt();
    let e1 = (1.0 - sqrt_1_e2) / (1.0 + sqrt_1_e2);
    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let (sin_phi1, cos_phi1) = phi1.sin_cos();
    let tan_phi1 = phi1.tan();
    let w = 1.0 - e2 * sin_phi1 * sin_phi1;
    let n1 = SEMI_MAJOR_AXIS / w.sqrt();
    let r1 = SEMI_MAJOR_AXIS * (1.0 - e2) / w.powf(1.5);
    let t1 = tan_phi1 * tan_phi1;
    let c1 = ep2 * cos_phi1 * cos_phi1;
    let d = x / (n1 * SCALE_FACTOR);

    let lat = phi1
        - (n1 * tan_phi1 / r1)
            * (d.powi(2) / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1 * c1 - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1 * t1 - 252.0 * ep2 - 3.0 * c1 * c1)
                    * d.powi(6)
                    / 720.0);
    let dlon = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1 * c1 + 8.0 * ep2 + 24.0 * t1 * t1) * d.powi(5)
            / 120.0)
        / cos_phi1;

    let point = GeoPoint::new(lat.to_degrees(), zone.central_meridian() + dlon.to_degrees());
    point.is_finite().then_some(point)
}
