use crate::models::{Color, GeoPoint};

/// Look of a circle marker on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub color: Color,
    pub fill_color: Color,
    pub fill_opacity: f64,
    pub radius: f64,
    pub weight: f64,
}

impl MarkerStyle {
    /// Solid dot in a single color.
    pub fn filled(color: Color) -> Self {
        Self {
            color,
            fill_color: color,
            fill_opacity: 1.0,
            radius: 6.0,
            weight: 2.0,
        }
    }
}

/// The map widget markers are drawn on.
///
/// Placing a marker creates a layer but does not show it; the
/// [`MarkerRegistry`](crate::markers::MarkerRegistry) decides what is attached.
pub trait MapSurface {
    type Handle: Copy + Eq + std::fmt::Debug;

    /// False while the rendering backend is not loaded yet.
    fn is_available(&self) -> bool {
        true
    }

    fn place_marker(&mut self, position: GeoPoint, style: MarkerStyle, label: &str)
        -> Self::Handle;
    fn restyle_marker(&mut self, handle: Self::Handle, style: MarkerStyle);
    fn remove_marker(&mut self, handle: Self::Handle);
    fn attach(&mut self, handle: Self::Handle);
    fn detach(&mut self, handle: Self::Handle);
}
