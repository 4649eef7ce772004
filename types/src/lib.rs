//! Shared types for the mixconsole state synchronization engine.
//!
//! This crate contains the mirrored mixer document, typed document pointers
//! and the patch wire format shared by the sync core and the console UI.

/// Default WebSocket endpoint of the mixer backend.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8765";

pub mod document;
pub mod mixer;
pub mod patch;
pub mod path;

// Re-export commonly used types
pub use document::{
    Channel, Compressor, ConnectionStatus, Distortion, EqBand, Equalizer, InferencingState,
    MixerDocument, Phaser, Reverb,
};
pub use patch::{DecodeError, PatchOp, ServerUpdate};
pub use path::{
    BandParam, ChannelField, CompressorParam, DistortionParam, DocField, DocPath, Effect,
    EffectParam, EqBandId, PathError, PhaserParam, ReverbParam,
};
