use dioxus::prelude::*;
use wildtrack_shared::parser::format_datetime;
use wildtrack_shared::timeline::Timeline;

/// Which way a step button moves the scrubber.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Back,
    Forward,
}

/// Label for the scrubber position, e.g. `05/01/2024 10:00 (2/14)`.
pub fn position_label(timeline: &Timeline) -> String {
    match (timeline.current(), timeline.position()) {
        (Some(ts), Some(i)) => format!("{} ({}/{})", format_datetime(&ts), i + 1, timeline.len()),
        _ => "No timestamps".to_string(),
    }
}

#[component]
pub fn TimelineControl(
    timeline: Timeline,
    playing: bool,
    on_seek: EventHandler<usize>,
    on_step: EventHandler<Step>,
    on_toggle_play: EventHandler<()>,
) -> Element {
    let disabled = timeline.is_empty();
    let max = timeline.len().saturating_sub(1);
    let position = timeline.position().unwrap_or(0);
    let label = position_label(&timeline);
    let first = timeline.first().map(|t| format_datetime(&t)).unwrap_or_default();
    let last = timeline.last().map(|t| format_datetime(&t)).unwrap_or_default();

    rsx! {
        div { class: "panel-section timeline-control",
            h3 { "Time" }
            div { class: "timeline-label", "{label}" }
            input {
                r#type: "range",
                min: "0",
                max: "{max}",
                step: "1",
                value: "{position}",
                disabled: disabled,
                oninput: move |evt: Event<FormData>| {
                    if let Ok(index) = evt.value().parse::<usize>() {
                        on_seek.call(index);
                    }
                },
            }
            div { class: "timeline-range",
                span { "{first}" }
                span { "{last}" }
            }
            div { class: "timeline-buttons",
                button {
                    disabled: disabled,
                    onclick: move |_| on_step.call(Step::Back),
                    "Prev"
                }
                button {
                    class: if playing { "play active" } else { "play" },
                    disabled: disabled,
                    onclick: move |_| on_toggle_play.call(()),
                    if playing { "Pause" } else { "Play" }
                }
                button {
                    disabled: disabled,
                    onclick: move |_| on_step.call(Step::Forward),
                    "Next"
                }
            }
        }
    }
}
