use dioxus::logger::tracing::{error, info, warn};
use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use wildtrack_shared::individuals::IndividualRegistry;
use wildtrack_shared::markers::MarkerRegistry;
use wildtrack_shared::models::{IndividualChanges, MarkerSnapshot, TrackedIndividual};
use wildtrack_shared::timeline::Timeline;
use wildtrack_shared::tracker::Tracker;

use crate::api;
use crate::components::individual_panel::IndividualPanel;
use crate::components::map_view::MapView;
use crate::components::marker_list::MarkerList;
use crate::components::timeline_control::{Step, TimelineControl};
use crate::surface::SvgSurface;

/// Delay between playback steps.
const PLAYBACK_INTERVAL_MS: u32 = 500;

#[derive(Debug, Clone, PartialEq)]
enum LoadStatus {
    Loading,
    Loaded { points: usize, rejected: usize },
    Failed(String),
}

fn new_tracker() -> Tracker<SvgSurface> {
    let seed = chrono::Utc::now().timestamp_millis() as u64;
    Tracker::new(
        IndividualRegistry::seeded(seed),
        MarkerRegistry::new(SvgSurface::new()),
    )
}

#[component]
pub fn TrackerPage() -> Element {
    let mut individuals = use_signal(Vec::<TrackedIndividual>::new);
    let mut markers = use_signal(Vec::<MarkerSnapshot>::new);
    // Registry changes are mirrored into signals the panels render from
    let mut tracker = use_signal(move || {
        let mut t = new_tracker();
        t.subscribe_individuals(move |all| individuals.set(all.to_vec()));
        t.subscribe_markers(move |all| markers.set(all.to_vec()));
        t
    });
    let mut timeline = use_signal(Timeline::default);
    let mut playing = use_signal(|| false);
    let mut status = use_signal(|| LoadStatus::Loading);
    let mut reset_view_counter = use_signal(|| 0u64);

    let _loader = use_resource(move || async move {
        match api::fetch_tracks().await {
            Ok(parsed) => {
                let stamps = {
                    let mut t = tracker.write();
                    t.load_points(&parsed.points);
                    let stamps = Timeline::new(t.markers().timestamps());
                    if let Some(first) = stamps.current() {
                        t.set_active_timestamp(first);
                    }
                    stamps
                };
                info!(
                    points = parsed.points.len(),
                    rejected = parsed.rejected.len(),
                    timestamps = stamps.len(),
                    "Loaded tracks"
                );
                timeline.set(stamps);
                reset_view_counter += 1;
                status.set(LoadStatus::Loaded {
                    points: parsed.points.len(),
                    rejected: parsed.rejected.len(),
                });
            }
            Err(e) => {
                error!("Failed to load tracks: {e}");
                status.set(LoadStatus::Failed(e));
            }
        }
    });

    // Playback ticks keep running; they only advance while playing
    use_future(move || async move {
        loop {
            TimeoutFuture::new(PLAYBACK_INTERVAL_MS).await;
            if !*playing.peek() {
                continue;
            }
            let next = timeline.write().step_forward();
            if let Some(ts) = next {
                tracker.write().set_active_timestamp(ts);
            }
        }
    });

    let shown = tracker.read().markers().active();
    let total = markers.read().len();
    let status_text = match &*status.read() {
        LoadStatus::Loading => "Loading tracks...".to_string(),
        LoadStatus::Loaded { points, rejected: 0 } => format!("{points} fixes loaded"),
        LoadStatus::Loaded { points, rejected } => {
            format!("{points} fixes loaded, {rejected} rows skipped")
        }
        LoadStatus::Failed(e) => format!("Could not load tracks: {e}"),
    };
    let failed = matches!(*status.read(), LoadStatus::Failed(_));

    rsx! {
        div { class: "tracker-layout",
            div { class: "side-panel",
                h1 { "Wildtrack" }
                p {
                    class: if failed { "load-status error" } else { "load-status" },
                    "{status_text}"
                }

                TimelineControl {
                    timeline: timeline.read().clone(),
                    playing: *playing.read(),
                    on_seek: move |index: usize| {
                        let target = timeline.write().seek(index);
                        if let Some(ts) = target {
                            tracker.write().set_active_timestamp(ts);
                        }
                    },
                    on_step: move |step| {
                        let target = match step {
                            Step::Back => timeline.write().step_back(),
                            Step::Forward => timeline.write().step_forward(),
                        };
                        if let Some(ts) = target {
                            tracker.write().set_active_timestamp(ts);
                        }
                    },
                    on_toggle_play: move |_| {
                        let now = !*playing.read();
                        playing.set(now);
                    },
                }

                IndividualPanel {
                    individuals: individuals.read().clone(),
                    on_change: move |(id, changes): (String, IndividualChanges)| {
                        let outcome = tracker.write().update_individual(&id, &changes);
                        if !outcome.found {
                            warn!(id = %id, "Update for unknown individual ignored");
                        }
                    },
                }

                MarkerList {
                    shown: shown,
                    total: total,
                    individuals: individuals.read().clone(),
                }
            }

            div { class: "map-panel",
                MapView {
                    tracker: tracker,
                    reset_view_counter: reset_view_counter,
                }
            }
        }
    }
}
