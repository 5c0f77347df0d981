use wildtrack_shared::models::GeoPoint;

/// Size of the SVG canvas markers are drawn on.
pub const VIEW_WIDTH: f64 = 1024.0;
pub const VIEW_HEIGHT: f64 = 768.0;

/// Margin kept free around the outermost markers.
pub const VIEW_PADDING: f64 = 32.0;

/// Smallest span, in degrees, a viewport is fitted to. Keeps a single point
/// (or a stationary animal) from blowing the scale up to infinity.
const MIN_SPAN_DEG: f64 = 0.001;

/// Geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    pub fn around(point: GeoPoint) -> Self {
        Self {
            min_lat: point.latitude,
            max_lat: point.latitude,
            min_lng: point.longitude,
            max_lng: point.longitude,
        }
    }

    pub fn include(&mut self, point: GeoPoint) {
        self.min_lat = self.min_lat.min(point.latitude);
        self.max_lat = self.max_lat.max(point.latitude);
        self.min_lng = self.min_lng.min(point.longitude);
        self.max_lng = self.max_lng.max(point.longitude);
    }

    /// Smallest box holding every point, `None` for no points.
    pub fn from_points(points: impl IntoIterator<Item = GeoPoint>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut bounds = Self::around(points.next()?);
        for point in points {
            bounds.include(point);
        }
        Some(bounds)
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Equirectangular projection of a bounding box onto the SVG canvas.
///
/// Longitude is shrunk by the cosine of the center latitude so distances look
/// right at the scale a tracking study covers. North is up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    center: GeoPoint,
    lng_factor: f64,
    scale: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    pub fn fit(bounds: Bounds, width: f64, height: f64, padding: f64) -> Self {
        let center = bounds.center();
        let lng_factor = center.latitude.to_radians().cos().abs().max(1e-6);
        let span_x = ((bounds.max_lng - bounds.min_lng) * lng_factor).max(MIN_SPAN_DEG);
        let span_y = (bounds.max_lat - bounds.min_lat).max(MIN_SPAN_DEG);
        let usable_w = (width - 2.0 * padding).max(1.0);
        let usable_h = (height - 2.0 * padding).max(1.0);
        Self {
            center,
            lng_factor,
            scale: (usable_w / span_x).min(usable_h / span_y),
            width,
            height,
        }
    }

    /// Fit to the default canvas.
    pub fn for_canvas(bounds: Bounds) -> Self {
        Self::fit(bounds, VIEW_WIDTH, VIEW_HEIGHT, VIEW_PADDING)
    }

    /// Canvas pixels per degree of latitude.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn project(&self, point: GeoPoint) -> (f64, f64) {
        let dx = (point.longitude - self.center.longitude) * self.lng_factor * self.scale;
        let dy = (point.latitude - self.center.latitude) * self.scale;
        (self.width / 2.0 + dx, self.height / 2.0 - dy)
    }

    pub fn unproject(&self, x: f64, y: f64) -> GeoPoint {
        let lng = self.center.longitude + (x - self.width / 2.0) / (self.lng_factor * self.scale);
        let lat = self.center.latitude - (y - self.height / 2.0) / self.scale;
        GeoPoint::new(lat, lng)
    }
}

/// Convert container-relative coordinates to canvas pixels, undoing the
/// zoom/pan CSS transform.
///
/// The canvas renders at `width: 100%`, so both axes share the scale factor
/// `VIEW_WIDTH / container_w`.
pub fn container_to_canvas(
    container_x: f64,
    container_y: f64,
    container_w: f64,
    zoom: f64,
    pan_x: f64,
    pan_y: f64,
) -> Option<(f64, f64)> {
    if container_w <= 0.0 || zoom <= 0.0 {
        return None;
    }

    // Undo CSS transform: translate(pan_x, pan_y) scale(zoom)
    let rendered_x = (container_x - pan_x) / zoom;
    let rendered_y = (container_y - pan_y) / zoom;

    let scale = VIEW_WIDTH / container_w;
    Some((
        (rendered_x * scale).clamp(0.0, VIEW_WIDTH),
        (rendered_y * scale).clamp(0.0, VIEW_HEIGHT),
    ))
}

/// Format a position for the cursor readout.
pub fn format_lat_lng(point: GeoPoint) -> String {
    let ns = if point.latitude < 0.0 { 'S' } else { 'N' };
    let ew = if point.longitude < 0.0 { 'W' } else { 'E' };
    format!(
        "{:.5}°{ns} {:.5}°{ew}",
        point.latitude.abs(),
        point.longitude.abs()
    )
}
