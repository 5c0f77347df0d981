use std::collections::{BTreeSet, HashSet};

use chrono::{Local, NaiveDateTime};

use crate::individuals::Visibility;
use crate::models::{Color, GeoPoint, MarkerPoint, MarkerSnapshot};
use crate::parser::format_datetime;
use crate::surface::{MapSurface, MarkerStyle};

pub type MarkerListener = Box<dyn FnMut(&[MarkerSnapshot])>;

#[derive(Debug)]
struct PlacedMarker<H> {
    tag_id: String,
    timestamp: NaiveDateTime,
    position: GeoPoint,
    color: Color,
    handle: H,
    attached: bool,
}

impl<H> PlacedMarker<H> {
    fn snapshot(&self) -> MarkerSnapshot {
        MarkerSnapshot {
            tag_id: self.tag_id.clone(),
            latitude: self.position.latitude,
            longitude: self.position.longitude,
            timestamp: self.timestamp,
        }
    }
}

/// Owns every marker layer and keeps the surface showing exactly the markers
/// of the selected timestamp whose individual is visible.
pub struct MarkerRegistry<S: MapSurface> {
    surface: S,
    markers: Vec<PlacedMarker<S::Handle>>,
    active_timestamp: NaiveDateTime,
    listeners: Vec<MarkerListener>,
}

impl<S: MapSurface> MarkerRegistry<S> {
    /// Registry whose timeline starts at the current local time.
    pub fn new(surface: S) -> Self {
        Self::with_timestamp(surface, Local::now().naive_local())
    }

    pub fn with_timestamp(surface: S, active_timestamp: NaiveDateTime) -> Self {
        Self {
            surface,
            markers: Vec::new(),
            active_timestamp,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&[MarkerSnapshot]) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn active_timestamp(&self) -> NaiveDateTime {
        self.active_timestamp
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Place a layer for every valid point, then recompute what is shown.
    ///
    /// Points with an empty tag or a non-finite position are skipped. Every
    /// valid point becomes its own entry, even when its `(tag, timestamp)`
    /// is already present.
    pub fn add_markers<I, V>(&mut self, points: I, visibility: &V)
    where
        I: IntoIterator<Item = MarkerPoint>,
        V: Visibility + ?Sized,
    {
        if !self.surface_ready("add_markers") {
            return;
        }

        let mut added = 0usize;
        for point in points {
            if point.tag_id.is_empty() || !point.position.is_finite() {
                tracing::warn!(
                    tag_id = %point.tag_id,
                    latitude = point.position.latitude,
                    longitude = point.position.longitude,
                    "skipping invalid marker"
                );
                continue;
            }

            let color = point.color.unwrap_or(Color::DEFAULT_MARKER);
            let label = format!("{} {}", point.tag_id, format_datetime(&point.timestamp));
            let handle = self
                .surface
                .place_marker(point.position, MarkerStyle::filled(color), &label);
            self.markers.push(PlacedMarker {
                tag_id: point.tag_id,
                timestamp: point.timestamp,
                position: point.position,
                color,
                handle,
                attached: false,
            });
            added += 1;
        }

        tracing::debug!(added, total = self.markers.len(), "markers added");
        self.recompute(visibility);
        self.publish();
    }

    /// Select `timestamp` and show exactly its visible markers.
    pub fn set_active_timestamp<V>(&mut self, timestamp: NaiveDateTime, visibility: &V)
    where
        V: Visibility + ?Sized,
    {
        if !self.surface_ready("set_active_timestamp") {
            return;
        }
        self.active_timestamp = timestamp;
        self.recompute(visibility);
        self.publish();
    }

    /// Recompute the shown markers without moving the timeline.
    pub fn reevaluate<V>(&mut self, visibility: &V)
    where
        V: Visibility + ?Sized,
    {
        self.set_active_timestamp(self.active_timestamp, visibility);
    }

    /// Store `color` on every marker of `tag_id`, restyling the shown ones.
    pub fn set_marker_color(&mut self, tag_id: &str, color: Color) {
        if !self.surface_ready("set_marker_color") {
            return;
        }
        for marker in self.markers.iter_mut().filter(|m| m.tag_id == tag_id) {
            marker.color = color;
            if marker.attached {
                self.surface
                    .restyle_marker(marker.handle, MarkerStyle::filled(color));
            }
        }
        self.publish();
    }

    /// Take every marker off the surface. Entries are kept.
    pub fn clear(&mut self) {
        if !self.surface_ready("clear") {
            return;
        }
        self.detach_all();
        self.publish();
    }

    /// Drop every marker and its layer.
    pub fn reset(&mut self) {
        if self.discard_all() {
            self.publish();
        }
    }

    /// [`reset`](Self::reset) without notifying listeners, for callers that
    /// publish the refilled set themselves. False if the surface is unavailable.
    pub(crate) fn discard_all(&mut self) -> bool {
        if !self.surface_ready("reset") {
            return false;
        }
        for marker in std::mem::take(&mut self.markers) {
            self.discard(marker);
        }
        true
    }

    /// All markers, shown or not.
    pub fn snapshot(&self) -> Vec<MarkerSnapshot> {
        self.markers.iter().map(PlacedMarker::snapshot).collect()
    }

    /// Markers currently attached to the surface.
    pub fn active(&self) -> Vec<MarkerSnapshot> {
        self.markers
            .iter()
            .filter(|m| m.attached)
            .map(PlacedMarker::snapshot)
            .collect()
    }

    /// Distinct marker timestamps, oldest first.
    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.markers
            .iter()
            .map(|m| m.timestamp)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn color_of(&self, tag_id: &str) -> Option<Color> {
        self.markers
            .iter()
            .find(|m| m.tag_id == tag_id)
            .map(|m| m.color)
    }

    fn surface_ready(&self, op: &str) -> bool {
        let ready = self.surface.is_available();
        if !ready {
            tracing::warn!(op, "map surface not available, ignoring");
        }
        ready
    }

    fn recompute<V>(&mut self, visibility: &V)
    where
        V: Visibility + ?Sized,
    {
        self.detach_all();

        // One layer per tag at the selected time: the most recently added wins
        let selected = self.active_timestamp;
        let mut seen = HashSet::new();
        let mut chosen: Vec<usize> = Vec::new();
        for (index, marker) in self.markers.iter().enumerate().rev() {
            if marker.timestamp == selected
                && seen.insert(marker.tag_id.as_str())
                && visibility.is_visible(&marker.tag_id)
            {
                chosen.push(index);
            }
        }
        chosen.reverse();

        for &index in &chosen {
            let marker = &mut self.markers[index];
            self.surface
                .restyle_marker(marker.handle, MarkerStyle::filled(marker.color));
            self.surface.attach(marker.handle);
            marker.attached = true;
        }
        tracing::debug!(timestamp = %selected, shown = chosen.len(), "markers recomputed");
    }

    fn detach_all(&mut self) {
        for marker in self.markers.iter_mut().filter(|m| m.attached) {
            self.surface.detach(marker.handle);
            marker.attached = false;
        }
    }

    fn discard(&mut self, marker: PlacedMarker<S::Handle>) {
        if marker.attached {
            self.surface.detach(marker.handle);
        }
        self.surface.remove_marker(marker.handle);
    }

    fn publish(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for listener in &mut self.listeners {
            listener(&snapshot);
        }
    }
}
