//! Mixer console UI.
//!
//! Renders the header, the nine channel strips and the per-channel effects
//! view. Everything shown is read from the store's current document, and
//! every edit goes through a store action:
//! - Analog gain and pan knobs, digital gain fader, mute/solo per strip
//! - Stereo toggle on the Master bus
//! - EQ, compressor, distortion, phaser and reverb modules
//! - Guided record-and-infer dialog

mod effects;
mod header;
mod inference_modal;
mod strip;
mod util;
mod widgets;

use std::ops::RangeInclusive;

use egui::{Color32, Context, CornerRadius, Pos2, Rect, Response, RichText, Sense, Stroke, Ui, Vec2};
use mixconsole_types::mixer::*;
use mixconsole_types::{Channel, Effect, EffectParam, InferencingState, MixerDocument};

use crate::inference::InferenceWorkflow;
use crate::store::MixerStore;

use util::*;
use widgets::*;

// ── Layout constants ─────────────────────────────────────────────────
/// Gap between strips
const STRIP_GAP: f32 = 2.0;
/// Inner margin inside each strip frame
const STRIP_MARGIN: f32 = 4.0;
/// Inner width of a strip
const STRIP_INNER: f32 = 72.0;
/// Knob diameter
const KNOB_SIZE: f32 = 30.0;
/// Standard button height (mute, solo)
const BTN_H: f32 = 20.0;
/// LCD display height
const LCD_H: f32 = 16.0;
/// Height of the digital gain fader
const FADER_HEIGHT: f32 = 240.0;
const FADER_WIDTH: f32 = 18.0;

/// UI-only state of the console. Nothing here is synchronized.
#[derive(Debug, Default)]
pub struct Console {
    /// Channel whose effects view is open
    selected: Option<usize>,
    /// Inference dialog visibility
    show_inference: bool,
}

impl Console {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw one frame.
    pub fn show(
        &mut self,
        ctx: &Context,
        store: &mut MixerStore,
        workflow: &mut InferenceWorkflow,
    ) {
        egui::TopBottomPanel::top("console_header").show(ctx, |ui| {
            self.render_header(ui, store);
        });

        egui::CentralPanel::default().show(ctx, |ui| match self.selected {
            Some(index) => self.render_effects_view(ui, store, index),
            None => self.render_mixer(ui, store),
        });

        if self.show_inference {
            self.render_inference_dialog(ctx, store, workflow);
        }
    }
}

/// Display name of a channel position.
fn channel_label(index: usize) -> String {
    if index == MASTER_INDEX {
        "Master".to_string()
    } else {
        format!("CH {}", index)
    }
}
