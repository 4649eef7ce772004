//! Default values and parameter ranges for the mixer console.
//!
//! Single source of truth shared by the sync engine and the console widgets.

use std::ops::RangeInclusive;

// ── Structural ──────────────────────────────────────────────────────
/// Master bus plus eight input channels.
pub const CHANNEL_COUNT: usize = 9;
/// Index of the Master bus in `channels`.
pub const MASTER_INDEX: usize = 0;

// ── Channel defaults ────────────────────────────────────────────────
pub const DEFAULT_PANNING: f64 = 0.5;
pub const DEFAULT_DIGITAL_GAIN: f64 = 0.0;
pub const DEFAULT_MASTER_ANALOG_GAIN: f64 = 0.0;
/// Channels 1-4
pub const DEFAULT_LOW_BANK_ANALOG_GAIN: f64 = -3.0;
/// Channels 5-8
pub const DEFAULT_HIGH_BANK_ANALOG_GAIN: f64 = -9.0;

/// Analog gain default for a channel position.
pub fn default_analog_gain(index: usize) -> f64 {
    match index {
        MASTER_INDEX => DEFAULT_MASTER_ANALOG_GAIN,
        1..=4 => DEFAULT_LOW_BANK_ANALOG_GAIN,
        _ => DEFAULT_HIGH_BANK_ANALOG_GAIN,
    }
}

// ── Equalizer: (cutoff Hz, gain dB, Q) ──────────────────────────────
pub const DEFAULT_LOW_SHELF: (f64, f64, f64) = (80.0, 0.0, 0.707);
pub const DEFAULT_HIGH_SHELF: (f64, f64, f64) = (12000.0, 0.0, 0.707);
pub const DEFAULT_PEAK_BANDS: [(f64, f64, f64); 4] = [
    (250.0, 0.0, 1.0),
    (1000.0, 0.0, 1.0),
    (4000.0, 0.0, 1.0),
    (10000.0, 0.0, 1.0),
];

// ── Compressor ──────────────────────────────────────────────────────
pub const DEFAULT_COMP_THRESHOLD: f64 = -20.0;
pub const DEFAULT_COMP_RATIO: f64 = 2.0;
pub const DEFAULT_COMP_ATTACK: f64 = 10.0;
pub const DEFAULT_COMP_RELEASE: f64 = 50.0;
pub const DEFAULT_COMP_KNEE: f64 = 0.0;
pub const DEFAULT_COMP_MAKEUP: f64 = 0.0;

// ── Distortion / phaser / reverb ────────────────────────────────────
pub const DEFAULT_DISTORTION_DRIVE: f64 = 0.0;
pub const DEFAULT_DISTORTION_OUTPUT: f64 = 0.0;
pub const DEFAULT_PHASER_RATE: f64 = 1.0;
pub const DEFAULT_PHASER_DEPTH: f64 = 50.0;
pub const DEFAULT_REVERB_DECAY: f64 = 1.5;
pub const DEFAULT_REVERB_WET: f64 = 25.0;

// ── Ranges (UI clamps to these before calling an action) ────────────
pub const PANNING_RANGE: RangeInclusive<f64> = 0.0..=1.0;
pub const DIGITAL_GAIN_RANGE: RangeInclusive<f64> = -60.0..=6.0;
pub const ANALOG_GAIN_RANGE: RangeInclusive<f64> = -12.0..=32.0;
pub const EQ_GAIN_RANGE: RangeInclusive<f64> = -15.0..=15.0;
pub const EQ_FREQ_RANGE: RangeInclusive<f64> = 20.0..=20000.0;
pub const EQ_Q_RANGE: RangeInclusive<f64> = 0.1..=10.0;
pub const COMP_THRESHOLD_RANGE: RangeInclusive<f64> = -60.0..=0.0;
pub const COMP_RATIO_RANGE: RangeInclusive<f64> = 1.0..=20.0;
pub const COMP_ATTACK_RANGE: RangeInclusive<f64> = 0.1..=200.0;
pub const COMP_RELEASE_RANGE: RangeInclusive<f64> = 5.0..=2000.0;
pub const COMP_KNEE_RANGE: RangeInclusive<f64> = 0.0..=24.0;
pub const COMP_MAKEUP_RANGE: RangeInclusive<f64> = 0.0..=24.0;
pub const DISTORTION_DRIVE_RANGE: RangeInclusive<f64> = 0.0..=1.0;
pub const DISTORTION_OUTPUT_RANGE: RangeInclusive<f64> = -24.0..=12.0;
pub const PHASER_RATE_RANGE: RangeInclusive<f64> = 0.05..=10.0;
pub const PHASER_DEPTH_RANGE: RangeInclusive<f64> = 0.0..=100.0;
pub const REVERB_DECAY_RANGE: RangeInclusive<f64> = 0.1..=10.0;
pub const REVERB_WET_RANGE: RangeInclusive<f64> = 0.0..=100.0;

// ── Inference workflow display timing (seconds) ─────────────────────
pub const COUNTDOWN_SECONDS: u64 = 5;
pub const RECORDING_SECONDS: u64 = 6;
pub const ESTIMATED_INFERENCE_SECONDS: u64 = 20;
