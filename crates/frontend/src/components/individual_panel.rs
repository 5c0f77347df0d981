use dioxus::prelude::*;
use wildtrack_shared::models::{Color, IndividualChanges, TrackedIndividual};

/// Show/hide toggle, color picker and name field per individual.
#[component]
pub fn IndividualPanel(
    individuals: Vec<TrackedIndividual>,
    on_change: EventHandler<(String, IndividualChanges)>,
) -> Element {
    let shown = individuals.iter().filter(|i| i.visible).count();
    let total = individuals.len();

    rsx! {
        div { class: "panel-section individual-panel",
            h3 { "Individuals ({shown}/{total} shown)" }
            if individuals.is_empty() {
                p { class: "empty-hint", "No individuals loaded." }
            }
            ul { class: "individual-list",
                for ind in individuals {
                    li {
                        key: "{ind.id}",
                        class: if ind.visible { "individual" } else { "individual hidden" },
                        input {
                            r#type: "checkbox",
                            checked: ind.visible,
                            title: "Show on map",
                            onchange: {
                                let id = ind.id.clone();
                                move |evt: Event<FormData>| {
                                    on_change.call((id.clone(), IndividualChanges::visible(evt.checked())));
                                }
                            },
                        }
                        input {
                            r#type: "color",
                            value: "{ind.color}",
                            title: "Marker color",
                            onchange: {
                                let id = ind.id.clone();
                                move |evt: Event<FormData>| {
                                    if let Ok(color) = evt.value().parse::<Color>() {
                                        on_change.call((id.clone(), IndividualChanges::color(color)));
                                    }
                                }
                            },
                        }
                        input {
                            class: "individual-name",
                            r#type: "text",
                            value: "{ind.name}",
                            onchange: {
                                let id = ind.id.clone();
                                move |evt: Event<FormData>| {
                                    let name = evt.value().trim().to_string();
                                    if !name.is_empty() {
                                        on_change.call((id.clone(), IndividualChanges::name(name)));
                                    }
                                }
                            },
                        }
                        span { class: "tag-id", "{ind.id}" }
                    }
                }
            }
        }
    }
}
