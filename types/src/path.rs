//! Typed pointers into the mixer document.
//!
//! The wire uses slash-delimited pointers such as
//! `/channels/3/equalizer/band0/gain_db`. Only the shapes the mixer document
//! actually has are representable, so a parsed [`DocPath`] always resolves.

use std::fmt;
use std::str::FromStr;

use crate::mixer::CHANNEL_COUNT;

/// Declares a closed set of wire names.
macro_rules! wire_names {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            pub fn from_wire(name: &str) -> Option<Self> {
                match name {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_names! {
    /// Top-level scalar fields.
    DocField {
        SoloingActive => "soloing_active",
        InferencingActive => "inferencing_active",
        InferencingState => "inferencing_state",
        HwInitReady => "hw_init_ready",
    }
}

wire_names! {
    /// Scalar fields directly on a channel.
    ChannelField {
        Muted => "muted",
        Soloed => "soloed",
        Panning => "panning",
        DigitalGain => "digital_gain",
        AnalogGain => "analog_gain",
        Stereo => "stereo",
    }
}

wire_names! {
    Effect {
        Equalizer => "equalizer",
        Compressor => "compressor",
        Distortion => "distortion",
        Phaser => "phaser",
        Reverb => "reverb",
    }
}

wire_names! {
    EqBandId {
        LowShelf => "lowShelf",
        HighShelf => "highShelf",
        Band0 => "band0",
        Band1 => "band1",
        Band2 => "band2",
        Band3 => "band3",
    }
}

wire_names! {
    BandParam {
        GainDb => "gain_db",
        CutoffFreq => "cutoff_freq",
        QFactor => "q_factor",
    }
}

wire_names! {
    CompressorParam {
        ThresholdDb => "threshold_db",
        Ratio => "ratio",
        AttackMs => "attack_ms",
        ReleaseMs => "release_ms",
        KneeDb => "knee_db",
        MakeupGainDb => "makeup_gain_db",
    }
}

wire_names! {
    DistortionParam {
        Drive => "drive",
        OutputGainDb => "output_gain_db",
    }
}

wire_names! {
    PhaserParam {
        Rate => "rate",
        Depth => "depth",
    }
}

wire_names! {
    ReverbParam {
        DecayTime => "decay_time",
        WetLevel => "wet_level",
    }
}

impl EqBandId {
    pub fn label(&self) -> &'static str {
        match self {
            Self::LowShelf => "Low Shelf",
            Self::HighShelf => "High Shelf",
            Self::Band0 => "Band 1",
            Self::Band1 => "Band 2",
            Self::Band2 => "Band 3",
            Self::Band3 => "Band 4",
        }
    }
}

/// A numeric parameter inside an effect block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectParam {
    Eq(EqBandId, BandParam),
    Compressor(CompressorParam),
    Distortion(DistortionParam),
    Phaser(PhaserParam),
    Reverb(ReverbParam),
}

impl EffectParam {
    pub fn effect(&self) -> Effect {
        match self {
            Self::Eq(..) => Effect::Equalizer,
            Self::Compressor(_) => Effect::Compressor,
            Self::Distortion(_) => Effect::Distortion,
            Self::Phaser(_) => Effect::Phaser,
            Self::Reverb(_) => Effect::Reverb,
        }
    }
}

/// A resolvable location in the mixer document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocPath {
    /// `/soloing_active`, `/inferencing_state`, ...
    Root(DocField),
    /// `/channels/{i}`
    Channel(usize),
    /// `/channels/{i}/muted`, ...
    Field(usize, ChannelField),
    /// `/channels/{i}/compressor`
    Effect(usize, Effect),
    /// `/channels/{i}/compressor/enabled`
    EffectEnabled(usize, Effect),
    /// `/channels/{i}/equalizer/band0`
    EqBand(usize, EqBandId),
    /// `/channels/{i}/compressor/ratio`, `/channels/{i}/equalizer/band0/gain_db`
    Param(usize, EffectParam),
}

/// Pointer resolution failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    #[error("pointer {0:?} does not start with '/'")]
    NotAbsolute(String),
    #[error("invalid channel index {0:?}")]
    BadIndex(String),
    #[error("channel index {0} out of range")]
    ChannelOutOfRange(usize),
    #[error("pointer {0:?} does not resolve")]
    Unresolvable(String),
}

impl DocPath {
    /// Channel addressed by this path, if any.
    pub fn channel_index(&self) -> Option<usize> {
        match *self {
            Self::Root(_) => None,
            Self::Channel(i)
            | Self::Field(i, _)
            | Self::Effect(i, _)
            | Self::EffectEnabled(i, _)
            | Self::EqBand(i, _)
            | Self::Param(i, _) => Some(i),
        }
    }

    fn parse_channel(pointer: &str, index: usize, rest: &[&str]) -> Result<Self, PathError> {
        let unresolvable = || PathError::Unresolvable(pointer.to_string());
        let path = match rest {
            [] => Self::Channel(index),
            [name] => match (ChannelField::from_wire(name), Effect::from_wire(name)) {
                (Some(field), _) => Self::Field(index, field),
                (None, Some(effect)) => Self::Effect(index, effect),
                (None, None) => return Err(unresolvable()),
            },
            [effect, "enabled"] => {
                Self::EffectEnabled(index, Effect::from_wire(effect).ok_or_else(unresolvable)?)
            }
            ["equalizer", band] => {
                Self::EqBand(index, EqBandId::from_wire(band).ok_or_else(unresolvable)?)
            }
            ["equalizer", band, param] => {
                let band = EqBandId::from_wire(band).ok_or_else(unresolvable)?;
                let param = BandParam::from_wire(param).ok_or_else(unresolvable)?;
                Self::Param(index, EffectParam::Eq(band, param))
            }
            ["compressor", param] => Self::Param(
                index,
                EffectParam::Compressor(
                    CompressorParam::from_wire(param).ok_or_else(unresolvable)?,
                ),
            ),
            ["distortion", param] => Self::Param(
                index,
                EffectParam::Distortion(
                    DistortionParam::from_wire(param).ok_or_else(unresolvable)?,
                ),
            ),
            ["phaser", param] => Self::Param(
                index,
                EffectParam::Phaser(PhaserParam::from_wire(param).ok_or_else(unresolvable)?),
            ),
            ["reverb", param] => Self::Param(
                index,
                EffectParam::Reverb(ReverbParam::from_wire(param).ok_or_else(unresolvable)?),
            ),
            _ => return Err(unresolvable()),
        };
        Ok(path)
    }
}

impl FromStr for DocPath {
    type Err = PathError;

    fn from_str(pointer: &str) -> Result<Self, Self::Err> {
        let rest = pointer
            .strip_prefix('/')
            .ok_or_else(|| PathError::NotAbsolute(pointer.to_string()))?;
        let segments: Vec<&str> = rest.split('/').collect();

        match segments.as_slice() {
            [field] => DocField::from_wire(field)
                .map(DocPath::Root)
                .ok_or_else(|| PathError::Unresolvable(pointer.to_string())),
            ["channels", index, rest @ ..] => {
                let index: usize = index
                    .parse()
                    .map_err(|_| PathError::BadIndex(index.to_string()))?;
                if index >= CHANNEL_COUNT {
                    return Err(PathError::ChannelOutOfRange(index));
                }
                Self::parse_channel(pointer, index, rest)
            }
            _ => Err(PathError::Unresolvable(pointer.to_string())),
        }
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root(field) => write!(f, "/{}", field),
            Self::Channel(i) => write!(f, "/channels/{}", i),
            Self::Field(i, field) => write!(f, "/channels/{}/{}", i, field),
            Self::Effect(i, effect) => write!(f, "/channels/{}/{}", i, effect),
            Self::EffectEnabled(i, effect) => write!(f, "/channels/{}/{}/enabled", i, effect),
            Self::EqBand(i, band) => write!(f, "/channels/{}/equalizer/{}", i, band),
            Self::Param(i, param) => match param {
                EffectParam::Eq(band, p) => write!(f, "/channels/{}/equalizer/{}/{}", i, band, p),
                EffectParam::Compressor(p) => write!(f, "/channels/{}/compressor/{}", i, p),
                EffectParam::Distortion(p) => write!(f, "/channels/{}/distortion/{}", i, p),
                EffectParam::Phaser(p) => write!(f, "/channels/{}/phaser/{}", i, p),
                EffectParam::Reverb(p) => write!(f, "/channels/{}/reverb/{}", i, p),
            },
        }
    }
}
