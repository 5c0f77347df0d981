use chrono::NaiveDateTime;

use crate::individuals::{IndividualRegistry, UpdateOutcome};
use crate::markers::MarkerRegistry;
use crate::models::{IndividualChanges, MarkerPoint, MarkerSnapshot, TrackPoint, TrackedIndividual};
use crate::surface::MapSurface;
use crate::timeline::Timeline;

/// Individuals and their markers, kept in step.
///
/// Color edits are applied right away: every marker of the individual takes
/// the new color and the shown set is recomputed in the same call.
pub struct Tracker<S: MapSurface> {
    individuals: IndividualRegistry,
    markers: MarkerRegistry<S>,
}

impl<S: MapSurface> Tracker<S> {
    pub fn new(individuals: IndividualRegistry, markers: MarkerRegistry<S>) -> Self {
        Self {
            individuals,
            markers,
        }
    }

    pub fn individuals(&self) -> &IndividualRegistry {
        &self.individuals
    }

    pub fn markers(&self) -> &MarkerRegistry<S> {
        &self.markers
    }

    pub fn subscribe_individuals(&mut self, listener: impl FnMut(&[TrackedIndividual]) + 'static) {
        self.individuals.subscribe(listener);
    }

    pub fn subscribe_markers(&mut self, listener: impl FnMut(&[MarkerSnapshot]) + 'static) {
        self.markers.subscribe(listener);
    }

    /// Replace everything with a freshly parsed batch.
    ///
    /// Markers are colored like their individual. Marker listeners get one
    /// snapshot per load, holding the new set.
    pub fn load_points(&mut self, points: &[TrackPoint]) {
        self.markers.discard_all();
        self.individuals.load(points.iter().map(TrackPoint::record));

        let individuals = &self.individuals;
        let marker_points = points.iter().map(|p| {
            let marker = MarkerPoint::from(p);
            match individuals.color_of(&p.tag_id) {
                Some(color) => marker.with_color(color),
                None => marker,
            }
        });
        self.markers.add_markers(marker_points, individuals);
    }

    pub fn update_individual(&mut self, id: &str, changes: &IndividualChanges) -> UpdateOutcome {
        let outcome = self.individuals.update(id, changes);
        if !outcome.found {
            return outcome;
        }
        if let Some(color) = outcome.color {
            self.markers.set_marker_color(id, color);
        }
        self.markers.reevaluate(&self.individuals);
        outcome
    }

    pub fn set_active_timestamp(&mut self, timestamp: NaiveDateTime) {
        self.markers
            .set_active_timestamp(timestamp, &self.individuals);
    }

    pub fn reevaluate(&mut self) {
        self.markers.reevaluate(&self.individuals);
    }

    /// Timeline over the loaded markers, positioned on the latest recorded
    /// timestamp not after the active one.
    pub fn timeline(&self) -> Timeline {
        let mut timeline = Timeline::new(self.markers.timestamps());
        timeline.seek_to(self.markers.active_timestamp());
        timeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Color;
    use crate::parser::parse_datetime;
    use crate::surface::testing::{Call, RecordingSurface};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ts(text: &str) -> NaiveDateTime {
        parse_datetime(text).unwrap()
    }

    fn track(tag: &str, name: &str, time: &str, lat: f64, lng: f64) -> TrackPoint {
        TrackPoint {
            tag_id: tag.to_string(),
            name: name.to_string(),
            timestamp: ts(time),
            latitude: lat,
            longitude: lng,
        }
    }

    fn tracker() -> Tracker<RecordingSurface> {
        Tracker::new(
            IndividualRegistry::seeded(11),
            MarkerRegistry::with_timestamp(RecordingSurface::new(), ts("01/01/2024 00:00")),
        )
    }

    fn active_tags(t: &Tracker<RecordingSurface>) -> Vec<String> {
        let mut tags: Vec<String> = t.markers().active().into_iter().map(|m| m.tag_id).collect();
        tags.sort();
        tags
    }

    #[test]
    fn test_end_to_end_visibility_toggle() {
        let mut t = tracker();
        t.load_points(&[
            track("A", "Alice", "05/01/2024 10:00", 1.0, 1.0),
            track("B", "Bob", "05/01/2024 10:00", 2.0, 2.0),
        ]);
        t.set_active_timestamp(ts("05/01/2024 10:00"));
        assert_eq!(active_tags(&t), ["A", "B"]);

        t.update_individual("B", &IndividualChanges::visible(false));
        assert_eq!(active_tags(&t), ["A"]);
        assert_eq!(t.markers().active_timestamp(), ts("05/01/2024 10:00"));
        assert_eq!(t.markers().surface().attached().len(), 1);

        t.update_individual("B", &IndividualChanges::visible(true));
        assert_eq!(active_tags(&t), ["A", "B"]);
    }

    #[test]
    fn test_markers_take_individual_colors() {
        let mut t = tracker();
        t.load_points(&[
            track("A", "Alice", "05/01/2024 10:00", 1.0, 1.0),
            track("A", "Alice", "05/01/2024 11:00", 1.1, 1.1),
        ]);
        let color = t.individuals().color_of("A").unwrap();
        assert_eq!(t.markers().color_of("A"), Some(color));
        assert!(t.markers().surface().layers.iter().all(|l| l.style.color == color));
    }

    #[test]
    fn test_color_change_restyles_immediately() {
        let mut t = tracker();
        t.load_points(&[
            track("A", "Alice", "05/01/2024 10:00", 1.0, 1.0),
            track("A", "Alice", "05/01/2024 11:00", 1.1, 1.1),
        ]);
        t.set_active_timestamp(ts("05/01/2024 10:00"));

        let pink: Color = "#ff69b4".parse().unwrap();
        let outcome = t.update_individual("A", &IndividualChanges::color(pink));
        assert_eq!(outcome.color, Some(pink));
        assert_eq!(t.individuals().color_of("A"), Some(pink));
        let shown = t.markers().surface().attached();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].style.fill_color, pink);

        t.set_active_timestamp(ts("05/01/2024 11:00"));
        assert_eq!(t.markers().surface().attached()[0].style.color, pink);
    }

    #[test]
    fn test_unknown_individual_update_is_silent() {
        let mut t = tracker();
        t.load_points(&[track("A", "Alice", "05/01/2024 10:00", 1.0, 1.0)]);
        let calls = t.markers().surface().calls.len();
        let outcome = t.update_individual("Z", &IndividualChanges::visible(false));
        assert!(!outcome.found);
        assert_eq!(t.markers().surface().calls.len(), calls);
    }

    #[test]
    fn test_reload_replaces_individuals_and_markers() {
        let mut t = tracker();
        t.load_points(&[
            track("A", "Alice", "05/01/2024 10:00", 1.0, 1.0),
            track("B", "Bob", "05/01/2024 10:00", 2.0, 2.0),
        ]);
        t.set_active_timestamp(ts("05/01/2024 10:00"));

        t.load_points(&[track("C", "Carol", "05/01/2024 10:00", 3.0, 3.0)]);
        assert!(t.individuals().get("A").is_none());
        assert_eq!(t.markers().len(), 1);
        assert_eq!(active_tags(&t), ["C"]);
        assert_eq!(
            t.markers().surface().count(|c| matches!(c, Call::Remove(_))),
            2
        );
    }

    #[test]
    fn test_observers_see_both_collections() {
        let people = Rc::new(RefCell::new(Vec::new()));
        let markers = Rc::new(RefCell::new(Vec::new()));
        let mut t = tracker();
        let sink = people.clone();
        t.subscribe_individuals(move |all| *sink.borrow_mut() = all.to_vec());
        let sink = markers.clone();
        t.subscribe_markers(move |all| *sink.borrow_mut() = all.to_vec());

        t.load_points(&[
            track("A", "Alice", "05/01/2024 10:00", 1.0, 1.0),
            track("A", "Alice", "05/01/2024 11:00", 1.5, 1.5),
        ]);
        t.update_individual("A", &IndividualChanges::name("Alicia"));

        assert_eq!(people.borrow().len(), 1);
        assert_eq!(people.borrow()[0].name, "Alicia");
        assert_eq!(markers.borrow().len(), 2);
    }

    #[test]
    fn test_reload_publishes_one_snapshot_each() {
        let marker_snapshots: Rc<RefCell<Vec<Vec<MarkerSnapshot>>>> = Rc::default();
        let people: Rc<RefCell<Vec<usize>>> = Rc::default();
        let mut t = tracker();
        t.load_points(&[
            track("A", "Alice", "05/01/2024 10:00", 1.0, 1.0),
            track("B", "Bob", "05/01/2024 10:00", 2.0, 2.0),
        ]);

        let sink = marker_snapshots.clone();
        t.subscribe_markers(move |all| sink.borrow_mut().push(all.to_vec()));
        let sink = people.clone();
        t.subscribe_individuals(move |all| sink.borrow_mut().push(all.len()));

        t.load_points(&[track("C", "Carol", "05/01/2024 10:00", 3.0, 3.0)]);

        let marker_snapshots = marker_snapshots.borrow();
        assert_eq!(marker_snapshots.len(), 1);
        assert_eq!(marker_snapshots[0].len(), 1);
        assert_eq!(marker_snapshots[0][0].tag_id, "C");
        assert_eq!(*people.borrow(), [1]);
    }

    #[test]
    fn test_timeline_follows_active_timestamp() {
        let mut t = tracker();
        t.load_points(&[
            track("A", "Alice", "05/01/2024 10:00", 1.0, 1.0),
            track("A", "Alice", "05/01/2024 11:00", 1.5, 1.5),
        ]);
        t.set_active_timestamp(ts("05/01/2024 11:00"));
        let timeline = t.timeline();
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline.position(), Some(1));
    }
}
