//! Painted controls: rotary knob, vertical fader, LCD readout.
//!
//! Controls edit a local copy of the value and mark the response as changed;
//! the caller forwards changes to the store.

use super::*;

/// Everything a knob needs to know about its parameter.
pub(super) struct KnobSpec {
    pub label: &'static str,
    pub range: RangeInclusive<f64>,
    /// Double-click target
    pub default: f64,
    pub scale: Scale,
    pub format: fn(f64) -> String,
    /// Draw the arc from the center of the range instead of its start.
    pub bipolar: bool,
}

/// Arc geometry: 270° sweep starting at 7:30 (bottom-left).
/// In our coord system (x = cx - cos*r, y = cy - sin*r), clockwise = increasing angle.
const ARC_START: f32 = std::f32::consts::PI * 1.75;
const ARC_SWEEP: f32 = std::f32::consts::PI * 1.5;

fn arc_point(center: Pos2, angle: f32, r: f32) -> Pos2 {
    egui::pos2(center.x - angle.cos() * r, center.y - angle.sin() * r)
}

/// Rotary knob with a label above and the formatted value below.
pub(super) fn knob(ui: &mut Ui, value: &mut f64, spec: &KnobSpec) -> Response {
    ui.vertical_centered(|ui| {
        ui.spacing_mut().item_spacing.y = 1.0;
        ui.label(RichText::new(spec.label).size(10.0).color(Color32::from_gray(170)));
        let response = knob_dial(ui, value, spec, KNOB_SIZE);
        ui.label(
            RichText::new((spec.format)(*value))
                .monospace()
                .size(9.0)
                .color(Color32::from_gray(150)),
        );
        response
    })
    .inner
}

/// The dial alone.
pub(super) fn knob_dial(ui: &mut Ui, value: &mut f64, spec: &KnobSpec, size: f32) -> Response {
    let (rect, mut response) = ui.allocate_exact_size(Vec2::splat(size), Sense::click_and_drag());

    let before = *value;
    if response.double_clicked() {
        *value = spec.default;
    } else if response.dragged() {
        // Full sweep over ~200 px, in arc space so log knobs feel even.
        let t = to_normalized(*value, &spec.range, spec.scale) - response.drag_delta().y * 0.005;
        *value = from_normalized(t, &spec.range, spec.scale);
    }
    if *value != before {
        response.mark_changed();
    }

    let painter = ui.painter();
    let center = rect.center();
    let radius = size * 0.5 - 1.0;

    painter.circle_filled(center, radius, Color32::from_rgb(28, 28, 32));

    let normalized = to_normalized(*value, &spec.range, spec.scale);
    let origin = if spec.bipolar { 0.5 } else { 0.0 };
    let (from_norm, to_norm) = if normalized < origin {
        (normalized, origin)
    } else {
        (origin, normalized)
    };

    if (to_norm - from_norm) > 0.005 {
        let from_angle = ARC_START + from_norm * ARC_SWEEP;
        let sweep = (to_norm - from_norm) * ARC_SWEEP;
        let segments = ((to_norm - from_norm) * 24.0).max(4.0) as usize;
        let arc_color = if response.dragged() {
            Color32::from_rgb(130, 190, 255)
        } else {
            Color32::from_rgb(90, 145, 200)
        };
        let arc_r = radius - 1.5;
        for i in 0..segments {
            let a0 = from_angle + sweep * (i as f32 / segments as f32);
            let a1 = from_angle + sweep * ((i + 1) as f32 / segments as f32);
            painter.line_segment(
                [arc_point(center, a0, arc_r), arc_point(center, a1, arc_r)],
                Stroke::new(2.5, arc_color),
            );
        }
    }

    if spec.bipolar {
        // Center marker tick at 12 o'clock
        let center_angle = ARC_START + 0.5 * ARC_SWEEP;
        painter.line_segment(
            [
                arc_point(center, center_angle, radius - 3.5),
                arc_point(center, center_angle, radius + 0.5),
            ],
            Stroke::new(1.0, Color32::from_gray(90)),
        );
    }

    // Pointer line
    let pointer_angle = ARC_START + normalized * ARC_SWEEP;
    painter.line_segment(
        [
            arc_point(center, pointer_angle, radius * 0.25),
            arc_point(center, pointer_angle, radius - 3.0),
        ],
        Stroke::new(1.5, Color32::WHITE),
    );

    let border_color = if response.hovered() || response.dragged() {
        Color32::from_rgb(90, 140, 200)
    } else {
        Color32::from_gray(55)
    };
    painter.circle_stroke(center, radius, Stroke::new(1.0, border_color));

    response.on_hover_text(format!("{}: {}", spec.label, (spec.format)(*value)))
}

/// Vertical dB fader. Double-click toggles between 0 dB and the bottom of the range.
pub(super) fn fader(
    ui: &mut Ui,
    gain_db: &mut f64,
    range: &RangeInclusive<f64>,
    height: f32,
) -> Response {
    let (rect, mut response) =
        ui.allocate_exact_size(Vec2::new(FADER_WIDTH, height), Sense::click_and_drag());

    let before = *gain_db;
    if response.double_clicked() {
        *gain_db = if gain_db.abs() < 0.5 { *range.start() } else { 0.0 };
    } else if response.dragged() {
        let delta = f64::from(-response.drag_delta().y); // y increases downward
        let span = range.end() - range.start();
        let db_per_pixel = span / f64::from(height - 10.0);
        *gain_db = (*gain_db + delta * db_per_pixel).clamp(*range.start(), *range.end());
    }
    if *gain_db != before {
        response.mark_changed();
    }

    let painter = ui.painter();

    // Track
    let track_rect = Rect::from_center_size(rect.center(), Vec2::new(4.0, height - 10.0));
    painter.rect_filled(track_rect, CornerRadius::same(2), Color32::from_gray(60));

    // Unity mark
    let unity_y = db_to_y(0.0, range, rect.min.y, rect.max.y);
    painter.line_segment(
        [
            egui::pos2(rect.left(), unity_y),
            egui::pos2(rect.right(), unity_y),
        ],
        Stroke::new(1.0, Color32::from_gray(90)),
    );

    // Handle
    let handle_y = db_to_y(*gain_db, range, rect.min.y, rect.max.y);
    let handle_rect =
        Rect::from_center_size(egui::pos2(rect.center().x, handle_y), Vec2::new(14.0, 30.0));
    let handle_color = if response.dragged() {
        Color32::from_rgb(100, 150, 255)
    } else if response.hovered() {
        Color32::from_rgb(200, 200, 200)
    } else {
        Color32::from_rgb(160, 160, 160)
    };
    painter.rect_filled(handle_rect, CornerRadius::same(3), handle_color);
    // Center line indicating exact value
    painter.line_segment(
        [
            egui::pos2(handle_rect.left() + 2.0, handle_y),
            egui::pos2(handle_rect.right() - 2.0, handle_y),
        ],
        Stroke::new(1.5, Color32::from_gray(40)),
    );

    let text = format_db(*gain_db);
    response.on_hover_text(text)
}

/// Render a styled LCD display box.
pub(super) fn lcd(ui: &mut Ui, text: &str, width: f32) {
    let (rect, _) = ui.allocate_exact_size(Vec2::new(width, LCD_H), Sense::hover());
    let painter = ui.painter();
    painter.rect_filled(rect, CornerRadius::same(2), Color32::from_rgb(18, 22, 28));
    painter.rect_stroke(
        rect,
        CornerRadius::same(2),
        Stroke::new(1.0, Color32::from_rgb(45, 50, 55)),
        egui::epaint::StrokeKind::Inside,
    );
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::monospace(10.0),
        Color32::from_rgb(90, 200, 90),
    );
}

/// Latching button in the strip style.
pub(super) fn toggle_button(
    ui: &mut Ui,
    label: &str,
    active: bool,
    active_color: Color32,
    width: f32,
) -> Response {
    let (fill, text) = if active {
        (active_color, Color32::WHITE)
    } else {
        (Color32::from_rgb(48, 48, 52), Color32::from_gray(120))
    };
    ui.add(
        egui::Button::new(RichText::new(label).small().color(text))
            .fill(fill)
            .min_size(Vec2::new(width, BTN_H)),
    )
}
