use std::fmt::Write;

use wildtrack_shared::models::GeoPoint;
use wildtrack_shared::surface::{MapSurface, MarkerStyle};

use crate::coords::{Bounds, Viewport, VIEW_HEIGHT, VIEW_WIDTH};

#[derive(Debug, Clone, PartialEq)]
pub struct SvgLayer {
    pub position: GeoPoint,
    pub style: MarkerStyle,
    pub label: String,
    pub attached: bool,
}

/// Circle markers drawn into an inline SVG overlay.
///
/// Handles index into `layers`. A removed layer leaves a `None` behind while
/// later layers are still live, and trailing `None`s are trimmed, so a full
/// reload starts again from an empty vector.
#[derive(Debug, Default)]
pub struct SvgSurface {
    layers: Vec<Option<SvgLayer>>,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn layer(&self, handle: usize) -> Option<&SvgLayer> {
        self.layers.get(handle).and_then(Option::as_ref)
    }

    fn layer_mut(&mut self, handle: usize) -> Option<&mut SvgLayer> {
        self.layers.get_mut(handle).and_then(Option::as_mut)
    }

    pub fn live(&self) -> impl Iterator<Item = &SvgLayer> {
        self.layers.iter().flatten()
    }

    pub fn attached(&self) -> impl Iterator<Item = &SvgLayer> {
        self.live().filter(|l| l.attached)
    }

    /// Extent of every placed marker, shown or not, so the view does not
    /// jump around while scrubbing.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.live().map(|l| l.position))
    }

    /// SVG elements for the attached markers.
    ///
    /// Radius and stroke are divided by `zoom` so markers keep their
    /// on-screen size when the overlay is scaled.
    pub fn render(&self, viewport: &Viewport, zoom: f64) -> String {
        let zoom = zoom.max(1.0);
        let mut out = String::new();
        for layer in self.attached() {
            let (x, y) = viewport.project(layer.position);
            let style = &layer.style;
            let _ = write!(
                out,
                r#"<g class="track-marker"><title>{}</title><circle cx="{:.2}" cy="{:.2}" r="{:.2}" stroke="{}" stroke-width="{:.2}" fill="{}" fill-opacity="{}"/></g>"#,
                escape_xml(&layer.label),
                x,
                y,
                style.radius / zoom,
                style.color,
                style.weight / zoom,
                style.fill_color,
                style.fill_opacity,
            );
        }
        out
    }

    /// Complete `<svg>` overlay sized to the canvas.
    pub fn render_document(&self, zoom: f64) -> String {
        let body = match self.bounds() {
            Some(bounds) => self.render(&Viewport::for_canvas(bounds), zoom),
            None => String::new(),
        };
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {VIEW_WIDTH} {VIEW_HEIGHT}" preserveAspectRatio="xMidYMid meet" style="position:absolute;top:0;left:0;width:100%;height:100%;">{body}</svg>"#
        )
    }
}

impl MapSurface for SvgSurface {
    type Handle = usize;

    fn place_marker(&mut self, position: GeoPoint, style: MarkerStyle, label: &str) -> usize {
        self.layers.push(Some(SvgLayer {
            position,
            style,
            label: label.to_string(),
            attached: false,
        }));
        self.layers.len() - 1
    }

    fn restyle_marker(&mut self, handle: usize, style: MarkerStyle) {
        if let Some(layer) = self.layer_mut(handle) {
            layer.style = style;
        }
    }

    fn remove_marker(&mut self, handle: usize) {
        if let Some(slot) = self.layers.get_mut(handle) {
            *slot = None;
        }
        while matches!(self.layers.last(), Some(None)) {
            self.layers.pop();
        }
    }

    fn attach(&mut self, handle: usize) {
        if let Some(layer) = self.layer_mut(handle) {
            layer.attached = true;
        }
    }

    fn detach(&mut self, handle: usize) {
        if let Some(layer) = self.layer_mut(handle) {
            layer.attached = false;
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wildtrack_shared::models::Color;

    fn red() -> MarkerStyle {
        MarkerStyle::filled(Color::DEFAULT_MARKER)
    }

    #[test]
    fn test_placed_markers_start_detached() {
        let mut s = SvgSurface::new();
        let h = s.place_marker(GeoPoint::new(42.0, -75.0), red(), "A1 05/01/2024 10:00");
        assert!(!s.layer(h).unwrap().attached);
        assert_eq!(s.attached().count(), 0);
        assert_eq!(s.render(&Viewport::for_canvas(s.bounds().unwrap()), 1.0), "");
    }

    #[test]
    fn test_attach_detach() {
        let mut s = SvgSurface::new();
        let a = s.place_marker(GeoPoint::new(42.0, -75.0), red(), "a");
        let b = s.place_marker(GeoPoint::new(42.1, -75.1), red(), "b");
        s.attach(a);
        s.attach(b);
        s.detach(a);
        let shown: Vec<&str> = s.attached().map(|l| l.label.as_str()).collect();
        assert_eq!(shown, ["b"]);
    }

    #[test]
    fn test_removed_handle_is_dead() {
        let mut s = SvgSurface::new();
        let a = s.place_marker(GeoPoint::new(42.0, -75.0), red(), "a");
        let b = s.place_marker(GeoPoint::new(42.1, -75.1), red(), "b");
        s.remove_marker(a);
        assert!(s.layer(a).is_none());
        assert_eq!(s.layer(b).unwrap().label, "b");
        s.attach(a);
        assert_eq!(s.attached().count(), 0);
        assert_eq!(s.live().count(), 1);
    }

    #[test]
    fn test_removing_everything_empties_storage() {
        let mut s = SvgSurface::new();
        for _ in 0..2 {
            let handles: Vec<usize> = (0..3)
                .map(|i| s.place_marker(GeoPoint::new(42.0 + i as f64, -75.0), red(), "m"))
                .collect();
            assert_eq!(handles, [0, 1, 2]);
            for h in handles {
                s.remove_marker(h);
            }
            assert!(s.layers.is_empty());
        }
    }

    #[test]
    fn test_removing_middle_layer_keeps_later_handles() {
        let mut s = SvgSurface::new();
        let a = s.place_marker(GeoPoint::new(42.0, -75.0), red(), "a");
        let b = s.place_marker(GeoPoint::new(42.1, -75.0), red(), "b");
        let c = s.place_marker(GeoPoint::new(42.2, -75.0), red(), "c");
        s.remove_marker(b);
        assert_eq!(s.layers.len(), 3);
        assert_eq!(s.layer(c).unwrap().label, "c");
        s.remove_marker(c);
        // b's tombstone is trailing now too
        assert_eq!(s.layers.len(), 1);
        assert_eq!(s.layer(a).unwrap().label, "a");
    }

    #[test]
    fn test_restyle() {
        let mut s = SvgSurface::new();
        let a = s.place_marker(GeoPoint::new(42.0, -75.0), red(), "a");
        let green = MarkerStyle::filled("#00ff00".parse().unwrap());
        s.restyle_marker(a, green);
        assert_eq!(s.layer(a).unwrap().style, green);
    }

    #[test]
    fn test_bounds_cover_detached_markers() {
        let mut s = SvgSurface::new();
        assert!(s.bounds().is_none());
        let a = s.place_marker(GeoPoint::new(42.0, -75.0), red(), "a");
        s.place_marker(GeoPoint::new(42.5, -74.5), red(), "b");
        s.attach(a);
        let b = s.bounds().unwrap();
        assert_eq!(b.max_lat, 42.5);
        assert_eq!(b.min_lng, -75.0);
    }

    #[test]
    fn test_render_attached_circle() {
        let mut s = SvgSurface::new();
        let a = s.place_marker(GeoPoint::new(42.0, -75.0), red(), "A1 <pup>");
        s.attach(a);
        let view = Viewport::for_canvas(s.bounds().unwrap());
        let svg = s.render(&view, 1.0);
        assert!(svg.contains(r##"stroke="#ff0000""##));
        assert!(svg.contains(r#"r="6.00""#));
        assert!(svg.contains(r#"cx="512.00" cy="384.00""#));
        assert!(svg.contains("<title>A1 &lt;pup&gt;</title>"));
    }

    #[test]
    fn test_render_scales_with_zoom() {
        let mut s = SvgSurface::new();
        let a = s.place_marker(GeoPoint::new(42.0, -75.0), red(), "a");
        s.attach(a);
        let view = Viewport::for_canvas(s.bounds().unwrap());
        assert!(s.render(&view, 2.0).contains(r#"r="3.00""#));
    }

    #[test]
    fn test_render_document_wraps_svg() {
        let s = SvgSurface::new();
        let doc = s.render_document(1.0);
        assert!(doc.starts_with("<svg"));
        assert!(doc.contains(r#"viewBox="0 0 1024 768""#));
        assert!(doc.ends_with("</svg>"));
    }
}
