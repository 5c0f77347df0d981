use dioxus::prelude::*;
use wildtrack_shared::models::{GeoPoint, MarkerSnapshot, TrackedIndividual};

use crate::coords::format_lat_lng;

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRow {
    pub tag_id: String,
    pub name: String,
    pub color: String,
    pub position: String,
}

/// Table rows for the shown markers, sorted by individual name.
pub fn marker_rows(shown: &[MarkerSnapshot], individuals: &[TrackedIndividual]) -> Vec<MarkerRow> {
    let mut rows: Vec<MarkerRow> = shown
        .iter()
        .map(|m| {
            let individual = individuals.iter().find(|i| i.id == m.tag_id);
            MarkerRow {
                tag_id: m.tag_id.clone(),
                name: individual.map(|i| i.name.clone()).unwrap_or_default(),
                color: individual.map(|i| i.color.to_string()).unwrap_or_default(),
                position: format_lat_lng(GeoPoint::new(
                    m.latitude,
                    m.longitude,
                )),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.tag_id.cmp(&b.tag_id)));
    rows
}

/// Positions of the markers currently on the map.
#[component]
pub fn MarkerList(
    shown: Vec<MarkerSnapshot>,
    total: usize,
    individuals: Vec<TrackedIndividual>,
) -> Element {
    let rows = marker_rows(&shown, &individuals);
    let count = rows.len();

    rsx! {
        div { class: "panel-section marker-list",
            h3 { "On map ({count} of {total} fixes)" }
            table {
                tbody {
                    for row in rows {
                        tr { key: "{row.tag_id}",
                            td {
                                span { class: "swatch", style: "background: {row.color};" }
                            }
                            td { "{row.name}" }
                            td { class: "position", "{row.position}" }
                        }
                    }
                }
            }
        }
    }
}
