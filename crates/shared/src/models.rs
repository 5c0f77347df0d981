use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Largest value a 24-bit RGB color can take.
pub const MAX_COLOR: u32 = 0xFF_FFFF;

/// A 24-bit RGB color, rendered as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(u32);

impl Color {
    /// Color used for markers placed without an explicit color.
    pub const DEFAULT_MARKER: Color = Color(0xFF_0000);

    pub fn from_rgb(value: u32) -> Option<Self> {
        (value <= MAX_COLOR).then_some(Color(value))
    }

    /// Uniform pick over the whole 24-bit range. Collisions are allowed.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Color(rng.random_range(0..=MAX_COLOR))
    }

    pub fn rgb(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color {0:?}, expected #rrggbb")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError(s.to_string()));
        }
        u32::from_str_radix(hex, 16)
            .map(Color)
            .map_err(|_| ColorParseError(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// WGS84 latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// A tagged animal (or anything else carrying a tag) shown on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedIndividual {
    pub id: String,
    pub name: String,
    pub color: Color,
    pub visible: bool,
}

impl TrackedIndividual {
    /// Apply the fields present in `changes`. Returns true if anything differs afterwards.
    pub fn apply(&mut self, changes: &IndividualChanges) -> bool {
        let before = self.clone();
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(color) = changes.color {
            self.color = color;
        }
        if let Some(visible) = changes.visible {
            self.visible = visible;
        }
        *self != before
    }
}

/// Partial update for a [`TrackedIndividual`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndividualChanges {
    pub name: Option<String>,
    pub color: Option<Color>,
    pub visible: Option<bool>,
}

impl IndividualChanges {
    pub fn visible(visible: bool) -> Self {
        Self {
            visible: Some(visible),
            ..Self::default()
        }
    }

    pub fn color(color: Color) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// The `{tag, name}` part of a record, enough to build the individual list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualRecord {
    pub tag_id: String,
    pub name: String,
}

impl IndividualRecord {
    pub fn new(tag_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tag_id: tag_id.into(),
            name: name.into(),
        }
    }
}

/// One parsed row of the tracking CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackPoint {
    pub tag_id: String,
    pub name: String,
    pub timestamp: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
}

impl TrackPoint {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }

    pub fn record(&self) -> IndividualRecord {
        IndividualRecord::new(self.tag_id.clone(), self.name.clone())
    }
}

/// Input to the marker registry: where and when a tag was seen.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerPoint {
    pub tag_id: String,
    pub position: GeoPoint,
    pub timestamp: NaiveDateTime,
    pub color: Option<Color>,
}

impl MarkerPoint {
    pub fn new(tag_id: impl Into<String>, position: GeoPoint, timestamp: NaiveDateTime) -> Self {
        Self {
            tag_id: tag_id.into(),
            position,
            timestamp,
            color: None,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }
}

impl From<&TrackPoint> for MarkerPoint {
    fn from(point: &TrackPoint) -> Self {
        MarkerPoint::new(point.tag_id.clone(), point.position(), point.timestamp)
    }
}

/// Published view of one placed marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerSnapshot {
    pub tag_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_color_display_is_zero_padded() {
        assert_eq!(Color::from_rgb(0x00_00ff).unwrap().to_string(), "#0000ff");
        assert_eq!(Color::from_rgb(0).unwrap().to_string(), "#000000");
        assert_eq!(Color::DEFAULT_MARKER.to_string(), "#ff0000");
    }

    #[test]
    fn test_color_from_rgb_rejects_overflow() {
        assert!(Color::from_rgb(MAX_COLOR).is_some());
        assert!(Color::from_rgb(MAX_COLOR + 1).is_none());
    }

    #[test]
    fn test_color_parse_accepts_hash_and_case() {
        assert_eq!("#A0b1C2".parse::<Color>().unwrap().rgb(), 0xa0b1c2);
        assert_eq!("a0b1c2".parse::<Color>().unwrap().rgb(), 0xa0b1c2);
    }

    #[test]
    fn test_color_parse_rejects_garbage() {
        assert!("#fff".parse::<Color>().is_err());
        assert!("#gggggg".parse::<Color>().is_err());
        assert!("".parse::<Color>().is_err());
        assert!("#+fffff".parse::<Color>().is_err());
    }

    #[test]
    fn test_random_colors_are_six_hex_digits() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let text = Color::random(&mut rng).to_string();
            assert_eq!(text.len(), 7);
            assert!(text.starts_with('#'));
            assert!(text[1..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_color_serializes_as_string() {
        let color: Color = "#12ab34".parse().unwrap();
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"#12ab34\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, color);
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }

    #[test]
    fn test_apply_reports_changes() {
        let mut ind = TrackedIndividual {
            id: "A".to_string(),
            name: "Alice".to_string(),
            color: Color::DEFAULT_MARKER,
            visible: true,
        };
        assert!(!ind.apply(&IndividualChanges::visible(true)));
        assert!(ind.apply(&IndividualChanges::visible(false)));
        assert!(!ind.visible);
        assert!(ind.apply(&IndividualChanges::name("Alicia")));
        assert_eq!(ind.name, "Alicia");
        assert!(!ind.apply(&IndividualChanges::default()));
    }
}
