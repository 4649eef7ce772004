//! Value mapping and formatting for console controls.

use std::ops::RangeInclusive;

use mixconsole_types::MixerDocument;

/// How a knob spreads its range over the arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scale {
    Linear,
    /// Equal arc per octave; for frequencies and other positive ranges.
    Log,
}

/// Map a value to an arc position (0.0-1.0).
pub(super) fn to_normalized(value: f64, range: &RangeInclusive<f64>, scale: Scale) -> f32 {
    let (lo, hi) = (*range.start(), *range.end());
    let value = value.clamp(lo, hi);
    let t = match scale {
        Scale::Linear => (value - lo) / (hi - lo),
        Scale::Log => (value / lo).ln() / (hi / lo).ln(),
    };
    t.clamp(0.0, 1.0) as f32
}

/// Inverse of [`to_normalized`], clamped to the range.
pub(super) fn from_normalized(t: f32, range: &RangeInclusive<f64>, scale: Scale) -> f64 {
    let (lo, hi) = (*range.start(), *range.end());
    let t = f64::from(t.clamp(0.0, 1.0));
    let value = match scale {
        Scale::Linear => lo + t * (hi - lo),
        Scale::Log => lo * (hi / lo).powf(t),
    };
    value.clamp(lo, hi)
}

/// Map a dB value to a y-coordinate within a vertical range.
/// Range: bottom of the fader range at (y_max - 5px) to the top at (y_min + 5px).
pub(super) fn db_to_y(db: f64, range: &RangeInclusive<f64>, y_min: f32, y_max: f32) -> f32 {
    let normalized = to_normalized(db, range, Scale::Linear);
    let margin = 5.0;
    let usable = (y_max - y_min) - margin * 2.0;
    y_max - margin - normalized * usable
}

pub(super) fn format_db(db: f64) -> String {
    if db <= -59.95 {
        "-inf dB".to_string()
    } else {
        format!("{:+.1} dB", db)
    }
}

/// Format a pan value (0.0 left, 0.5 center, 1.0 right).
pub(super) fn format_pan(pan: f64) -> String {
    let offset = (pan - 0.5) * 200.0;
    if offset < -0.5 {
        format!("L{:.0}", -offset)
    } else if offset > 0.5 {
        format!("R{:.0}", offset)
    } else {
        "C".to_string()
    }
}

pub(super) fn format_hz(hz: f64) -> String {
    if hz >= 1000.0 {
        format!("{:.1} kHz", hz / 1000.0)
    } else {
        format!("{:.0} Hz", hz)
    }
}

pub(super) fn format_ms(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.2} s", ms / 1000.0)
    } else {
        format!("{:.1} ms", ms)
    }
}

pub(super) fn format_seconds(s: f64) -> String {
    format!("{:.1} s", s)
}

pub(super) fn format_percent(p: f64) -> String {
    format!("{:.0}%", p)
}

pub(super) fn format_ratio(r: f64) -> String {
    format!("{:.1}:1", r)
}

pub(super) fn format_unitless(v: f64) -> String {
    format!("{:.2}", v)
}

/// Whether a channel is heard, given mute and solo state.
///
/// While any channel is soloed only soloed channels pass. The Master bus is
/// never silenced by solo.
pub(super) fn is_audible(doc: &MixerDocument, index: usize) -> bool {
    let Some(channel) = doc.channel(index) else {
        return false;
    };
    if channel.muted {
        return false;
    }
    index == mixconsole_types::mixer::MASTER_INDEX || !doc.soloing_active || channel.soloed
}
