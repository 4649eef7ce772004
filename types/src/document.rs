//! The mirrored mixer document.
//!
//! Channels are reference-counted so a copy of the document shares every
//! channel it did not touch. Writers go through [`MixerDocument::channel_mut`],
//! which clones only the addressed channel when it is shared.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::mixer::*;
use crate::path::{
    BandParam, CompressorParam, DistortionParam, Effect, EffectParam, EqBandId, PhaserParam,
    ReverbParam,
};

/// Server-driven inference workflow stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InferencingState {
    #[default]
    Idle,
    Countdown,
    Recording,
    Inferencing,
}

impl InferencingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Countdown => "countdown",
            Self::Recording => "recording",
            Self::Inferencing => "inferencing",
        }
    }

    /// Stages the client is allowed to request.
    pub fn is_client_requestable(&self) -> bool {
        !matches!(self, Self::Inferencing)
    }
}

impl std::fmt::Display for InferencingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport connection status. Local to the client, never synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Disconnected => "Disconnected",
            Self::Connecting => "Connecting",
            Self::Connected => "Connected",
        }
    }
}

/// One EQ band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqBand {
    pub gain_db: f64,
    pub cutoff_freq: f64,
    pub q_factor: f64,
}

impl EqBand {
    const fn from_defaults((cutoff_freq, gain_db, q_factor): (f64, f64, f64)) -> Self {
        Self {
            gain_db,
            cutoff_freq,
            q_factor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Equalizer {
    pub enabled: bool,
    #[serde(rename = "lowShelf")]
    pub low_shelf: EqBand,
    #[serde(rename = "highShelf")]
    pub high_shelf: EqBand,
    pub band0: EqBand,
    pub band1: EqBand,
    pub band2: EqBand,
    pub band3: EqBand,
}

impl Equalizer {
    pub fn band(&self, id: EqBandId) -> &EqBand {
        match id {
            EqBandId::LowShelf => &self.low_shelf,
            EqBandId::HighShelf => &self.high_shelf,
            EqBandId::Band0 => &self.band0,
            EqBandId::Band1 => &self.band1,
            EqBandId::Band2 => &self.band2,
            EqBandId::Band3 => &self.band3,
        }
    }

    pub fn band_mut(&mut self, id: EqBandId) -> &mut EqBand {
        match id {
            EqBandId::LowShelf => &mut self.low_shelf,
            EqBandId::HighShelf => &mut self.high_shelf,
            EqBandId::Band0 => &mut self.band0,
            EqBandId::Band1 => &mut self.band1,
            EqBandId::Band2 => &mut self.band2,
            EqBandId::Band3 => &mut self.band3,
        }
    }
}

impl Default for Equalizer {
    fn default() -> Self {
        Self {
            enabled: false,
            low_shelf: EqBand::from_defaults(DEFAULT_LOW_SHELF),
            high_shelf: EqBand::from_defaults(DEFAULT_HIGH_SHELF),
            band0: EqBand::from_defaults(DEFAULT_PEAK_BANDS[0]),
            band1: EqBand::from_defaults(DEFAULT_PEAK_BANDS[1]),
            band2: EqBand::from_defaults(DEFAULT_PEAK_BANDS[2]),
            band3: EqBand::from_defaults(DEFAULT_PEAK_BANDS[3]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compressor {
    pub enabled: bool,
    pub threshold_db: f64,
    pub ratio: f64,
    pub attack_ms: f64,
    pub release_ms: f64,
    pub knee_db: f64,
    pub makeup_gain_db: f64,
}

impl Default for Compressor {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold_db: DEFAULT_COMP_THRESHOLD,
            ratio: DEFAULT_COMP_RATIO,
            attack_ms: DEFAULT_COMP_ATTACK,
            release_ms: DEFAULT_COMP_RELEASE,
            knee_db: DEFAULT_COMP_KNEE,
            makeup_gain_db: DEFAULT_COMP_MAKEUP,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distortion {
    pub enabled: bool,
    pub drive: f64,
    pub output_gain_db: f64,
}

impl Default for Distortion {
    fn default() -> Self {
        Self {
            enabled: false,
            drive: DEFAULT_DISTORTION_DRIVE,
            output_gain_db: DEFAULT_DISTORTION_OUTPUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phaser {
    pub enabled: bool,
    pub rate: f64,
    pub depth: f64,
}

impl Default for Phaser {
    fn default() -> Self {
        Self {
            enabled: false,
            rate: DEFAULT_PHASER_RATE,
            depth: DEFAULT_PHASER_DEPTH,
        }
    }
}

/// Reverb send. Only the Master bus uses it, but every channel carries one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reverb {
    pub enabled: bool,
    pub decay_time: f64,
    pub wet_level: f64,
}

impl Default for Reverb {
    fn default() -> Self {
        Self {
            enabled: false,
            decay_time: DEFAULT_REVERB_DECAY,
            wet_level: DEFAULT_REVERB_WET,
        }
    }
}

/// A single channel strip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub muted: bool,
    pub soloed: bool,
    /// 0.0 (left) to 1.0 (right)
    pub panning: f64,
    /// dB
    pub digital_gain: f64,
    /// dB
    pub analog_gain: f64,
    /// Meaningful on the Master bus only
    pub stereo: bool,
    pub equalizer: Equalizer,
    pub compressor: Compressor,
    pub distortion: Distortion,
    pub phaser: Phaser,
    pub reverb: Reverb,
}

impl Channel {
    /// Channel populated with the defaults for its position.
    pub fn new(index: usize) -> Self {
        let is_master = index == MASTER_INDEX;
        Self {
            muted: false,
            soloed: false,
            panning: DEFAULT_PANNING,
            digital_gain: DEFAULT_DIGITAL_GAIN,
            analog_gain: default_analog_gain(index),
            stereo: is_master,
            equalizer: Equalizer::default(),
            compressor: Compressor::default(),
            distortion: Distortion::default(),
            phaser: Phaser::default(),
            reverb: Reverb {
                enabled: is_master,
                ..Reverb::default()
            },
        }
    }

    pub fn effect_enabled(&self, effect: Effect) -> bool {
        match effect {
            Effect::Equalizer => self.equalizer.enabled,
            Effect::Compressor => self.compressor.enabled,
            Effect::Distortion => self.distortion.enabled,
            Effect::Phaser => self.phaser.enabled,
            Effect::Reverb => self.reverb.enabled,
        }
    }

    pub fn effect_enabled_mut(&mut self, effect: Effect) -> &mut bool {
        match effect {
            Effect::Equalizer => &mut self.equalizer.enabled,
            Effect::Compressor => &mut self.compressor.enabled,
            Effect::Distortion => &mut self.distortion.enabled,
            Effect::Phaser => &mut self.phaser.enabled,
            Effect::Reverb => &mut self.reverb.enabled,
        }
    }

    pub fn param(&self, param: EffectParam) -> f64 {
        match param {
            EffectParam::Eq(band, p) => {
                let band = self.equalizer.band(band);
                match p {
                    BandParam::GainDb => band.gain_db,
                    BandParam::CutoffFreq => band.cutoff_freq,
                    BandParam::QFactor => band.q_factor,
                }
            }
            EffectParam::Compressor(p) => {
                let c = &self.compressor;
                match p {
                    CompressorParam::ThresholdDb => c.threshold_db,
                    CompressorParam::Ratio => c.ratio,
                    CompressorParam::AttackMs => c.attack_ms,
                    CompressorParam::ReleaseMs => c.release_ms,
                    CompressorParam::KneeDb => c.knee_db,
                    CompressorParam::MakeupGainDb => c.makeup_gain_db,
                }
            }
            EffectParam::Distortion(DistortionParam::Drive) => self.distortion.drive,
            EffectParam::Distortion(DistortionParam::OutputGainDb) => {
                self.distortion.output_gain_db
            }
            EffectParam::Phaser(PhaserParam::Rate) => self.phaser.rate,
            EffectParam::Phaser(PhaserParam::Depth) => self.phaser.depth,
            EffectParam::Reverb(ReverbParam::DecayTime) => self.reverb.decay_time,
            EffectParam::Reverb(ReverbParam::WetLevel) => self.reverb.wet_level,
        }
    }

    /// Mutable slot for a numeric effect parameter.
    pub fn param_mut(&mut self, param: EffectParam) -> &mut f64 {
        match param {
            EffectParam::Eq(band, p) => {
                let band = self.equalizer.band_mut(band);
                match p {
                    BandParam::GainDb => &mut band.gain_db,
                    BandParam::CutoffFreq => &mut band.cutoff_freq,
                    BandParam::QFactor => &mut band.q_factor,
                }
            }
            EffectParam::Compressor(p) => {
                let c = &mut self.compressor;
                match p {
                    CompressorParam::ThresholdDb => &mut c.threshold_db,
                    CompressorParam::Ratio => &mut c.ratio,
                    CompressorParam::AttackMs => &mut c.attack_ms,
                    CompressorParam::ReleaseMs => &mut c.release_ms,
                    CompressorParam::KneeDb => &mut c.knee_db,
                    CompressorParam::MakeupGainDb => &mut c.makeup_gain_db,
                }
            }
            EffectParam::Distortion(p) => match p {
                DistortionParam::Drive => &mut self.distortion.drive,
                DistortionParam::OutputGainDb => &mut self.distortion.output_gain_db,
            },
            EffectParam::Phaser(p) => match p {
                PhaserParam::Rate => &mut self.phaser.rate,
                PhaserParam::Depth => &mut self.phaser.depth,
            },
            EffectParam::Reverb(p) => match p {
                ReverbParam::DecayTime => &mut self.reverb.decay_time,
                ReverbParam::WetLevel => &mut self.reverb.wet_level,
            },
        }
    }
}

/// Local mirror of the remote mixer state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixerDocument {
    pub channels: [Arc<Channel>; CHANNEL_COUNT],
    #[serde(default)]
    pub soloing_active: bool,
    #[serde(default)]
    pub inferencing_active: bool,
    #[serde(default)]
    pub inferencing_state: InferencingState,
    #[serde(default)]
    pub hw_init_ready: bool,
    /// Local-only; never serialized and never taken from a server payload.
    #[serde(skip)]
    pub connection_status: ConnectionStatus,
}

impl MixerDocument {
    /// Document with every field at its default.
    pub fn new() -> Self {
        Self {
            channels: std::array::from_fn(|index| Arc::new(Channel::new(index))),
            soloing_active: false,
            inferencing_active: false,
            inferencing_state: InferencingState::Idle,
            hw_init_ready: false,
            connection_status: ConnectionStatus::Disconnected,
        }
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index).map(Arc::as_ref)
    }

    /// Mutable access to one channel, cloning it first if it is shared with
    /// another document version.
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut Channel> {
        self.channels.get_mut(index).map(Arc::make_mut)
    }

    pub fn master(&self) -> &Channel {
        &self.channels[MASTER_INDEX]
    }

    /// Compare everything the server owns, ignoring local-only fields.
    pub fn synced_eq(&self, other: &MixerDocument) -> bool {
        self.channels == other.channels
            && self.soloing_active == other.soloing_active
            && self.inferencing_active == other.inferencing_active
            && self.inferencing_state == other.inferencing_state
            && self.hw_init_ready == other.hw_init_ready
    }
}

impl Default for MixerDocument {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_population() {
        let doc = MixerDocument::new();
        assert_eq!(doc.channels.len(), 9);

        let master = doc.master();
        assert!(master.stereo);
        assert!(master.reverb.enabled);
        assert_eq!(master.analog_gain, 0.0);

        for (index, channel) in doc.channels.iter().enumerate() {
            assert!(!channel.muted);
            assert!(!channel.soloed);
            assert_eq!(channel.panning, 0.5);
            match index {
                0 => {}
                1..=4 => assert_eq!(channel.analog_gain, -3.0),
                _ => assert_eq!(channel.analog_gain, -9.0),
            }
            if index != 0 {
                assert!(!channel.stereo);
                assert!(!channel.reverb.enabled);
            }
        }
        assert_eq!(doc.inferencing_state, InferencingState::Idle);
        assert_eq!(doc.connection_status, ConnectionStatus::Disconnected);
    }

    #[test]
    fn test_channel_mut_clones_only_touched_channel() {
        let original = MixerDocument::new();
        let mut copy = original.clone();
        copy.channel_mut(3).unwrap().muted = true;

        assert!(!original.channels[3].muted);
        assert!(copy.channels[3].muted);
        assert!(!Arc::ptr_eq(&original.channels[3], &copy.channels[3]));
        assert!(Arc::ptr_eq(&original.channels[4], &copy.channels[4]));
    }

    #[test]
    fn test_param_slots_match_fields() {
        let mut channel = Channel::new(2);
        *channel.param_mut(EffectParam::Eq(EqBandId::HighShelf, BandParam::QFactor)) = 2.5;
        *channel.param_mut(EffectParam::Compressor(CompressorParam::KneeDb)) = 6.0;
        *channel.effect_enabled_mut(Effect::Phaser) = true;

        assert_eq!(channel.equalizer.high_shelf.q_factor, 2.5);
        assert_eq!(channel.compressor.knee_db, 6.0);
        assert!(channel.phaser.enabled);
        assert_eq!(
            channel.param(EffectParam::Eq(EqBandId::HighShelf, BandParam::QFactor)),
            2.5
        );
        assert_eq!(
            channel.param(EffectParam::Reverb(ReverbParam::DecayTime)),
            DEFAULT_REVERB_DECAY
        );
    }

    #[test]
    fn test_channel_out_of_range() {
        let mut doc = MixerDocument::new();
        assert!(doc.channel(9).is_none());
        assert!(doc.channel_mut(9).is_none());
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(MixerDocument::new()).unwrap();
        assert!(json.get("connection_status").is_none());
        assert_eq!(json["inferencing_state"], "idle");
        let master = &json["channels"][0];
        assert_eq!(master["digital_gain"], 0.0);
        assert!(master["equalizer"]["lowShelf"]["cutoff_freq"].is_number());
        assert!(master["compressor"]["makeup_gain_db"].is_number());
    }

    #[test]
    fn test_synced_eq_ignores_connection_status() {
        let a = MixerDocument::new();
        let mut b = a.clone();
        b.connection_status = ConnectionStatus::Connected;
        assert!(a.synced_eq(&b));
        b.hw_init_ready = true;
        assert!(!a.synced_eq(&b));
    }
}
