use super::*;

impl Console {
    /// All nine strips, Master first.
    pub(super) fn render_mixer(&mut self, ui: &mut Ui, store: &mut MixerStore) {
        egui::ScrollArea::horizontal()
            .id_salt("strips_h_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    for index in 0..CHANNEL_COUNT {
                        self.render_strip(ui, store, index, true);
                        ui.add_space(STRIP_GAP);
                    }
                });
            });
    }

    /// One channel strip. `fx_button` adds the button that opens the effects view.
    pub(super) fn render_strip(
        &mut self,
        ui: &mut Ui,
        store: &mut MixerStore,
        index: usize,
        fx_button: bool,
    ) {
        let doc = store.document();
        let Some(channel) = doc.channel(index).cloned() else {
            return;
        };
        let audible = is_audible(doc, index);
        let is_master = index == MASTER_INDEX;

        let frame_color = match (is_master, audible) {
            (_, false) => Color32::from_rgb(28, 28, 30),
            (true, true) => Color32::from_rgb(45, 45, 52),
            (false, true) => Color32::from_rgb(38, 38, 42),
        };

        egui::Frame::default()
            .fill(frame_color)
            .corner_radius(CornerRadius::same(3))
            .inner_margin(STRIP_MARGIN)
            .show(ui, |ui| {
                ui.set_min_width(STRIP_INNER);
                ui.set_max_width(STRIP_INNER);
                if !audible {
                    ui.multiply_opacity(0.55);
                }

                ui.vertical_centered(|ui| {
                    ui.spacing_mut().item_spacing.y = 3.0;

                    ui.label(RichText::new(channel_label(index)).strong().size(11.0));

                    // ── Analog gain ──
                    if !is_master {
                        let mut analog = channel.analog_gain;
                        let spec = KnobSpec {
                            label: "Analog",
                            range: ANALOG_GAIN_RANGE,
                            default: default_analog_gain(index),
                            scale: Scale::Linear,
                            format: format_db,
                            bipolar: false,
                        };
                        if knob(ui, &mut analog, &spec).changed() {
                            store.set_analog_gain(index, analog);
                        }
                    }

                    if fx_button
                        && ui
                            .add(
                                egui::Button::new(RichText::new("FX").small())
                                    .min_size(Vec2::new(STRIP_INNER - 8.0, BTN_H)),
                            )
                            .on_hover_text("Show effects")
                            .clicked()
                    {
                        self.selected = Some(index);
                    }

                    // ── Digital gain ──
                    lcd(ui, &format_db(channel.digital_gain), STRIP_INNER - 8.0);
                    let mut digital = channel.digital_gain;
                    if fader(ui, &mut digital, &DIGITAL_GAIN_RANGE, FADER_HEIGHT).changed() {
                        store.set_digital_gain(index, digital);
                    }

                    // ── Pan / stereo ──
                    if is_master {
                        if toggle_button(
                            ui,
                            "Stereo",
                            channel.stereo,
                            Color32::from_rgb(0, 100, 180),
                            STRIP_INNER - 8.0,
                        )
                        .clicked()
                        {
                            store.set_stereo(index, !channel.stereo);
                        }
                    } else {
                        let mut panning = channel.panning;
                        let spec = KnobSpec {
                            label: "Pan",
                            range: PANNING_RANGE,
                            default: DEFAULT_PANNING,
                            scale: Scale::Linear,
                            format: format_pan,
                            bipolar: true,
                        };
                        if knob(ui, &mut panning, &spec).changed() {
                            store.set_panning(index, panning);
                        }
                    }

                    // ── Mute / solo ──
                    let half = (STRIP_INNER - 10.0) / 2.0;
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = 2.0;
                        if toggle_button(
                            ui,
                            "M",
                            channel.muted,
                            Color32::from_rgb(200, 50, 50),
                            half,
                        )
                        .on_hover_text("Mute")
                        .clicked()
                        {
                            store.set_muted(index, !channel.muted);
                        }
                        if toggle_button(
                            ui,
                            "S",
                            channel.soloed,
                            Color32::from_rgb(200, 170, 0),
                            half,
                        )
                        .on_hover_text("Solo")
                        .clicked()
                        {
                            store.set_soloed(index, !channel.soloed);
                        }
                    });
                });
            });
    }
}

/// Effects a channel position exposes in the effects view.
pub(super) fn effects_for(index: usize) -> &'static [Effect] {
    if index == MASTER_INDEX {
        &[Effect::Equalizer, Effect::Compressor, Effect::Reverb]
    } else {
        &[
            Effect::Equalizer,
            Effect::Compressor,
            Effect::Distortion,
            Effect::Phaser,
        ]
    }
}
