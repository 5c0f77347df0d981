use dioxus::html::geometry::WheelDelta;
use dioxus::html::input_data::MouseButton;
use dioxus::prelude::*;
use wildtrack_shared::tracker::Tracker;

use crate::coords::{self, Viewport, VIEW_HEIGHT, VIEW_WIDTH};
use crate::surface::SvgSurface;

const MAP_CONTAINER_ID: &str = "track-map-container";

/// Drag threshold in pixels. Movement below this is not a pan.
const DRAG_THRESHOLD: f64 = 3.0;

const ZOOM_MIN: f64 = 1.0;
const ZOOM_MAX: f64 = 20.0;
const ZOOM_STEP: f64 = 1.1;

// ---------------------------------------------------------------------------
// DOM helpers
// ---------------------------------------------------------------------------

fn container_rect() -> Option<web_sys::DomRect> {
    let document = web_sys::window()?.document()?;
    let element = document.get_element_by_id(MAP_CONTAINER_ID)?;
    Some(element.get_bounding_client_rect())
}

// ---------------------------------------------------------------------------
// Zoom / pan math
// ---------------------------------------------------------------------------

/// New pan offsets keeping the point under the cursor fixed while zooming.
fn zoom_pan_at_cursor(
    cursor_x: f64,
    cursor_y: f64,
    old_zoom: f64,
    new_zoom: f64,
    old_pan_x: f64,
    old_pan_y: f64,
) -> (f64, f64) {
    let content_x = (cursor_x - old_pan_x) / old_zoom;
    let content_y = (cursor_y - old_pan_y) / old_zoom;
    (
        cursor_x - content_x * new_zoom,
        cursor_y - content_y * new_zoom,
    )
}

/// Clamp pan so the canvas can't be dragged off-screen.
///
/// The canvas renders at `width: 100%`, so its height is
/// `container_w * VIEW_HEIGHT / VIEW_WIDTH` and may exceed the container.
fn clamp_pan(pan_x: f64, pan_y: f64, zoom: f64, container_w: f64, container_h: f64) -> (f64, f64) {
    let content_w = container_w * zoom;
    let content_h = container_w * (VIEW_HEIGHT / VIEW_WIDTH) * zoom;
    let min_pan_x = -(content_w - container_w).max(0.0);
    let min_pan_y = -(content_h - container_h).max(0.0);
    (pan_x.clamp(min_pan_x, 0.0), pan_y.clamp(min_pan_y, 0.0))
}

fn clamp_pan_to_container(pan_x: f64, pan_y: f64, zoom: f64) -> (f64, f64) {
    match container_rect() {
        Some(rect) => clamp_pan(pan_x, pan_y, zoom, rect.width(), rect.height()),
        None => (pan_x, pan_y),
    }
}

/// Wheel delta (pixels / lines / pages) as a pixel-like value.
fn wheel_delta_y(delta: WheelDelta) -> f64 {
    match delta {
        WheelDelta::Pixels(d) => d.y,
        WheelDelta::Lines(d) => d.y * 40.0,
        WheelDelta::Pages(d) => d.y * 400.0,
    }
}

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// Zoomable, pannable map of the currently attached markers.
#[component]
pub fn MapView(tracker: Signal<Tracker<SvgSurface>>, reset_view_counter: Signal<u64>) -> Element {
    let mut zoom = use_signal(|| 1.0_f64);
    let mut pan_x = use_signal(|| 0.0_f64);
    let mut pan_y = use_signal(|| 0.0_f64);

    use_effect(move || {
        let _counter = *reset_view_counter.read();
        zoom.set(1.0);
        pan_x.set(0.0);
        pan_y.set(0.0);
    });

    let mut is_dragging = use_signal(|| false);
    let mut did_drag = use_signal(|| false);
    let mut drag_start = use_signal(|| (0.0_f64, 0.0_f64));
    let mut drag_start_pan = use_signal(|| (0.0_f64, 0.0_f64));
    let mut cursor = use_signal(|| None::<String>);

    // Pan is read outside the memo so dragging doesn't rebuild the SVG
    let svg_html = use_memo(move || {
        let t = tracker.read();
        t.markers().surface().render_document(*zoom.read())
    });

    let viewport = use_memo(move || {
        let t = tracker.read();
        t.markers().surface().bounds().map(Viewport::for_canvas)
    });

    let cur_pan_x = *pan_x.read();
    let cur_pan_y = *pan_y.read();
    let cur_zoom = *zoom.read();
    let transform_style = format!(
        "transform: translate({cur_pan_x}px, {cur_pan_y}px) scale({cur_zoom}); transform-origin: 0 0;"
    );
    let container_class = if *is_dragging.read() {
        "map-container dragging"
    } else {
        "map-container"
    };

    rsx! {
        div {
            id: MAP_CONTAINER_ID,
            class: "{container_class}",

            onwheel: move |evt: Event<WheelData>| {
                evt.prevent_default();

                let delta_y = wheel_delta_y(evt.data().delta());
                let factor = if delta_y < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
                let old_z = *zoom.read();
                let new_z = (old_z * factor).clamp(ZOOM_MIN, ZOOM_MAX);
                if (new_z - old_z).abs() < 1e-9 {
                    return;
                }

                let Some(rect) = container_rect() else { return };
                let client = evt.data().client_coordinates();
                let cx = client.x - rect.left();
                let cy = client.y - rect.top();

                let (new_px, new_py) =
                    zoom_pan_at_cursor(cx, cy, old_z, new_z, *pan_x.read(), *pan_y.read());
                let (px, py) = clamp_pan(new_px, new_py, new_z, rect.width(), rect.height());

                zoom.set(new_z);
                pan_x.set(px);
                pan_y.set(py);
            },

            onmousedown: move |evt: Event<MouseData>| {
                if evt.trigger_button() != Some(MouseButton::Primary) {
                    return;
                }
                let client = evt.client_coordinates();
                is_dragging.set(true);
                did_drag.set(false);
                drag_start.set((client.x, client.y));
                drag_start_pan.set((*pan_x.read(), *pan_y.read()));
            },

            onmousemove: move |evt: Event<MouseData>| {
                let client = evt.client_coordinates();

                if let (Some(rect), Some(view)) = (container_rect(), *viewport.read()) {
                    let readout = coords::container_to_canvas(
                        client.x - rect.left(),
                        client.y - rect.top(),
                        rect.width(),
                        *zoom.read(),
                        *pan_x.read(),
                        *pan_y.read(),
                    )
                    .map(|(x, y)| coords::format_lat_lng(view.unproject(x, y)));
                    cursor.set(readout);
                }

                if !*is_dragging.read() {
                    return;
                }
                let (start_x, start_y) = *drag_start.read();
                let dx = client.x - start_x;
                let dy = client.y - start_y;
                if !*did_drag.read() && (dx.abs() > DRAG_THRESHOLD || dy.abs() > DRAG_THRESHOLD) {
                    did_drag.set(true);
                }
                if *did_drag.read() {
                    let (start_pan_x, start_pan_y) = *drag_start_pan.read();
                    let (px, py) =
                        clamp_pan_to_container(start_pan_x + dx, start_pan_y + dy, *zoom.read());
                    pan_x.set(px);
                    pan_y.set(py);
                }
            },

            onmouseup: move |_| is_dragging.set(false),

            onmouseleave: move |_| {
                is_dragging.set(false);
                cursor.set(None);
            },

            div {
                class: "map-inner",
                style: "{transform_style}",
                div {
                    class: "map-canvas",
                    dangerous_inner_html: "{svg_html}",
                }
            }

            if let Some(text) = cursor.read().clone() {
                div { class: "coord-readout", "{text}" }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_pan_keeps_cursor_point_fixed() {
        let (px, py) = zoom_pan_at_cursor(200.0, 100.0, 1.0, 2.0, 0.0, 0.0);
        assert!((px - (-200.0)).abs() < 1e-9);
        assert!((py - (-100.0)).abs() < 1e-9);
        // Content under the cursor before and after is the same
        let before = (200.0 - 0.0) / 1.0;
        let after = (200.0 - px) / 2.0;
        assert!((before - after).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_pan_identity() {
        let (px, py) = zoom_pan_at_cursor(321.0, 123.0, 3.0, 3.0, -40.0, -20.0);
        assert!((px - (-40.0)).abs() < 1e-9);
        assert!((py - (-20.0)).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_pan_zoom1_canvas_fits() {
        // 800 wide renders 600 tall, container is taller
        let (px, py) = clamp_pan(-10.0, -10.0, 1.0, 800.0, 700.0);
        assert_eq!((px, py), (0.0, 0.0));
    }

    #[test]
    fn test_clamp_pan_canvas_taller_than_container() {
        // 800 wide renders 600 tall, container only 500
        let (_, py) = clamp_pan(0.0, -50.0, 1.0, 800.0, 500.0);
        assert!((py - (-50.0)).abs() < 1e-9);
        let (_, py) = clamp_pan(0.0, -500.0, 1.0, 800.0, 500.0);
        assert!((py - (-100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_pan_zoomed() {
        let (px, py) = clamp_pan(-5000.0, -5000.0, 2.0, 800.0, 600.0);
        assert!((px - (-800.0)).abs() < 1e-9);
        assert!((py - (-600.0)).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_pan_prevents_positive_pan() {
        let (px, py) = clamp_pan(50.0, 50.0, 2.0, 800.0, 600.0);
        assert_eq!((px, py), (0.0, 0.0));
    }
}
