use std::sync::Arc;

use mixconsole_types::{
    BandParam, CompressorParam, DistortionParam, EqBandId, PhaserParam, ReverbParam,
};

use super::strip::effects_for;
use super::*;

/// Width of one effect module frame.
const MODULE_WIDTH: f32 = 260.0;

impl Console {
    /// Selected strip, its effect modules, and the Master strip for reference.
    pub(super) fn render_effects_view(
        &mut self,
        ui: &mut Ui,
        store: &mut MixerStore,
        index: usize,
    ) {
        if index >= CHANNEL_COUNT {
            self.selected = None;
            return;
        }

        ui.horizontal_top(|ui| {
            self.render_strip(ui, store, index, false);
            ui.add_space(STRIP_GAP * 4.0);

            egui::ScrollArea::vertical()
                .id_salt("effects_v_scroll")
                .auto_shrink([true, false])
                .show(ui, |ui| {
                    let channel = Arc::clone(&store.document().channels[index]);
                    for &effect in effects_for(index) {
                        effect_module(ui, store, index, &channel, effect);
                        ui.add_space(6.0);
                    }
                });

            if index != MASTER_INDEX {
                ui.add_space(STRIP_GAP * 4.0);
                self.render_strip(ui, store, MASTER_INDEX, false);
            }
        });
    }
}

fn effect_title(effect: Effect) -> &'static str {
    match effect {
        Effect::Equalizer => "Equalizer",
        Effect::Compressor => "Compressor",
        Effect::Distortion => "Distortion",
        Effect::Phaser => "Phaser",
        Effect::Reverb => "Reverb",
    }
}

/// Numeric parameters of a non-EQ effect, in display order.
fn effect_params(effect: Effect) -> Vec<EffectParam> {
    match effect {
        Effect::Equalizer => Vec::new(),
        Effect::Compressor => CompressorParam::ALL
            .iter()
            .map(|&p| EffectParam::Compressor(p))
            .collect(),
        Effect::Distortion => DistortionParam::ALL
            .iter()
            .map(|&p| EffectParam::Distortion(p))
            .collect(),
        Effect::Phaser => PhaserParam::ALL
            .iter()
            .map(|&p| EffectParam::Phaser(p))
            .collect(),
        Effect::Reverb => ReverbParam::ALL
            .iter()
            .map(|&p| EffectParam::Reverb(p))
            .collect(),
    }
}

fn effect_module(
    ui: &mut Ui,
    store: &mut MixerStore,
    index: usize,
    channel: &Channel,
    effect: Effect,
) {
    let enabled = channel.effect_enabled(effect);

    egui::Frame::default()
        .fill(Color32::from_rgb(36, 36, 40))
        .stroke(Stroke::new(1.0, Color32::from_gray(55)))
        .corner_radius(CornerRadius::same(4))
        .inner_margin(6.0)
        .show(ui, |ui| {
            ui.set_width(MODULE_WIDTH);

            ui.horizontal(|ui| {
                ui.label(RichText::new(effect_title(effect)).strong());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let label = if enabled { "ON" } else { "OFF" };
                    if toggle_button(ui, label, enabled, Color32::from_rgb(40, 150, 80), 40.0)
                        .on_hover_text(format!("Enable {}", effect_title(effect)))
                        .clicked()
                    {
                        store.set_effect_enabled(index, effect, !enabled);
                    }
                });
            });

            if !enabled {
                ui.multiply_opacity(0.5);
            }

            if effect == Effect::Equalizer {
                eq_grid(ui, store, index, channel);
                return;
            }

            ui.horizontal_wrapped(|ui| {
                for param in effect_params(effect) {
                    param_knob(ui, store, index, channel, param);
                }
            });
        });
}

/// Six bands, one row each: gain, frequency, Q.
fn eq_grid(ui: &mut Ui, store: &mut MixerStore, index: usize, channel: &Channel) {
    egui::Grid::new(("eq_grid", index))
        .num_columns(4)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            for &band in EqBandId::ALL {
                ui.label(RichText::new(band.label()).size(10.0));
                for &p in BandParam::ALL {
                    param_knob(ui, store, index, channel, EffectParam::Eq(band, p));
                }
                ui.end_row();
            }
        });
}

fn param_knob(
    ui: &mut Ui,
    store: &mut MixerStore,
    index: usize,
    channel: &Channel,
    param: EffectParam,
) {
    let spec = param_spec(param);
    let mut value = channel.param(param);
    if knob(ui, &mut value, &spec).changed() {
        store.set_effect_param(index, param, value);
    }
}

/// Knob description for an effect parameter.
pub(super) fn param_spec(param: EffectParam) -> KnobSpec {
    let linear = |label: &'static str,
                  range: RangeInclusive<f64>,
                  default: f64,
                  format: fn(f64) -> String| KnobSpec {
        label,
        range,
        default,
        scale: Scale::Linear,
        format,
        bipolar: false,
    };

    match param {
        EffectParam::Eq(band, p) => {
            let (freq, gain, q) = eq_band_defaults(band);
            match p {
                BandParam::GainDb => KnobSpec {
                    bipolar: true,
                    ..linear("Gain", EQ_GAIN_RANGE, gain, format_db)
                },
                BandParam::CutoffFreq => KnobSpec {
                    scale: Scale::Log,
                    ..linear("Freq", EQ_FREQ_RANGE, freq, format_hz)
                },
                BandParam::QFactor => KnobSpec {
                    scale: Scale::Log,
                    ..linear("Q", EQ_Q_RANGE, q, format_unitless)
                },
            }
        }
        EffectParam::Compressor(p) => match p {
            CompressorParam::ThresholdDb => linear(
                "Thresh",
                COMP_THRESHOLD_RANGE,
                DEFAULT_COMP_THRESHOLD,
                format_db,
            ),
            CompressorParam::Ratio => {
                linear("Ratio", COMP_RATIO_RANGE, DEFAULT_COMP_RATIO, format_ratio)
            }
            CompressorParam::AttackMs => KnobSpec {
                scale: Scale::Log,
                ..linear("Attack", COMP_ATTACK_RANGE, DEFAULT_COMP_ATTACK, format_ms)
            },
            CompressorParam::ReleaseMs => KnobSpec {
                scale: Scale::Log,
                ..linear("Release", COMP_RELEASE_RANGE, DEFAULT_COMP_RELEASE, format_ms)
            },
            CompressorParam::KneeDb => {
                linear("Knee", COMP_KNEE_RANGE, DEFAULT_COMP_KNEE, format_db)
            }
            CompressorParam::MakeupGainDb => {
                linear("Makeup", COMP_MAKEUP_RANGE, DEFAULT_COMP_MAKEUP, format_db)
            }
        },
        EffectParam::Distortion(p) => match p {
            DistortionParam::Drive => linear(
                "Drive",
                DISTORTION_DRIVE_RANGE,
                DEFAULT_DISTORTION_DRIVE,
                format_unitless,
            ),
            DistortionParam::OutputGainDb => linear(
                "Output",
                DISTORTION_OUTPUT_RANGE,
                DEFAULT_DISTORTION_OUTPUT,
                format_db,
            ),
        },
        EffectParam::Phaser(p) => match p {
            PhaserParam::Rate => KnobSpec {
                scale: Scale::Log,
                ..linear("Rate", PHASER_RATE_RANGE, DEFAULT_PHASER_RATE, format_hz)
            },
            PhaserParam::Depth => linear(
                "Depth",
                PHASER_DEPTH_RANGE,
                DEFAULT_PHASER_DEPTH,
                format_percent,
            ),
        },
        EffectParam::Reverb(p) => match p {
            ReverbParam::DecayTime => linear(
                "Decay",
                REVERB_DECAY_RANGE,
                DEFAULT_REVERB_DECAY,
                format_seconds,
            ),
            ReverbParam::WetLevel => {
                linear("Wet", REVERB_WET_RANGE, DEFAULT_REVERB_WET, format_percent)
            }
        },
    }
}

/// (cutoff Hz, gain dB, Q) a band resets to.
fn eq_band_defaults(band: EqBandId) -> (f64, f64, f64) {
    match band {
        EqBandId::LowShelf => DEFAULT_LOW_SHELF,
        EqBandId::HighShelf => DEFAULT_HIGH_SHELF,
        EqBandId::Band0 => DEFAULT_PEAK_BANDS[0],
        EqBandId::Band1 => DEFAULT_PEAK_BANDS[1],
        EqBandId::Band2 => DEFAULT_PEAK_BANDS[2],
        EqBandId::Band3 => DEFAULT_PEAK_BANDS[3],
    }
}
