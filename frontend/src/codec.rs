//! Patch codec: applies server updates to the mirrored document.
//!
//! Both entry points are pure. They never mutate the input document and
//! return it unchanged (same `Arc`) when nothing observable changed, so
//! callers can detect changes with `Arc::ptr_eq`.

use std::sync::Arc;

use mixconsole_types::{
    Channel, ChannelField, DocField, DocPath, Effect, MixerDocument, PatchOp, PathError,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Why a patch batch was rejected.
#[derive(Debug, thiserror::Error)]
pub enum PatchError {
    #[error("op {index}: {source}")]
    Path {
        index: usize,
        #[source]
        source: PathError,
    },
    #[error("op {index}: {path} expects {expected}, got {found}")]
    TypeMismatch {
        index: usize,
        path: String,
        expected: &'static str,
        found: Value,
    },
    #[error("op {index}: cannot decode value for {path}: {source}")]
    Object {
        index: usize,
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a single operation, before it is tagged with its batch index.
enum OpError {
    Path(PathError),
    TypeMismatch(&'static str),
    Object(serde_json::Error),
}

impl OpError {
    fn at(self, index: usize, path: &str, value: &Value) -> PatchError {
        match self {
            OpError::Path(source) => PatchError::Path { index, source },
            OpError::TypeMismatch(expected) => PatchError::TypeMismatch {
                index,
                path: path.to_string(),
                expected,
                found: value.clone(),
            },
            OpError::Object(source) => PatchError::Object {
                index,
                path: path.to_string(),
                source,
            },
        }
    }
}

/// Apply an ordered batch of operations.
///
/// The batch is atomic: if any operation fails to resolve or has a value of
/// the wrong type, the error is returned and no change is visible.
pub fn apply_patch(
    doc: &Arc<MixerDocument>,
    ops: &[PatchOp],
) -> Result<Arc<MixerDocument>, PatchError> {
    let mut next = MixerDocument::clone(doc);

    for (index, op) in ops.iter().enumerate() {
        let PatchOp::Replace { path, value } = op;
        replace(&mut next, path, value).map_err(|e| e.at(index, path, value))?;
    }

    if next.synced_eq(doc) {
        Ok(Arc::clone(doc))
    } else {
        Ok(Arc::new(next))
    }
}

/// Adopt a full server snapshot.
///
/// Local-only fields are carried over from `doc`. If the snapshot matches
/// the current document, `doc` itself is returned.
pub fn apply_full_state(
    doc: &Arc<MixerDocument>,
    mut payload: MixerDocument,
) -> Arc<MixerDocument> {
    if doc.synced_eq(&payload) {
        return Arc::clone(doc);
    }
    payload.connection_status = doc.connection_status;
    Arc::new(payload)
}

fn replace(doc: &mut MixerDocument, pointer: &str, value: &Value) -> Result<(), OpError> {
    let path: DocPath = pointer.parse().map_err(OpError::Path)?;

    match path {
        DocPath::Root(field) => match field {
            DocField::SoloingActive => doc.soloing_active = expect_bool(value)?,
            DocField::InferencingActive => doc.inferencing_active = expect_bool(value)?,
            DocField::HwInitReady => doc.hw_init_ready = expect_bool(value)?,
            DocField::InferencingState => doc.inferencing_state = decode(value)?,
        },
        DocPath::Channel(index) => {
            let channel: Channel = decode(value)?;
            *channel_mut(doc, index)? = channel;
        }
        DocPath::Field(index, field) => {
            let channel = channel_mut(doc, index)?;
            match field {
                ChannelField::Muted => channel.muted = expect_bool(value)?,
                ChannelField::Soloed => channel.soloed = expect_bool(value)?,
                ChannelField::Stereo => channel.stereo = expect_bool(value)?,
                ChannelField::Panning => channel.panning = expect_number(value)?,
                ChannelField::DigitalGain => channel.digital_gain = expect_number(value)?,
                ChannelField::AnalogGain => channel.analog_gain = expect_number(value)?,
            }
        }
        DocPath::Effect(index, effect) => match effect {
            Effect::Equalizer => channel_mut(doc, index)?.equalizer = decode(value)?,
            Effect::Compressor => channel_mut(doc, index)?.compressor = decode(value)?,
            Effect::Distortion => channel_mut(doc, index)?.distortion = decode(value)?,
            Effect::Phaser => channel_mut(doc, index)?.phaser = decode(value)?,
            Effect::Reverb => channel_mut(doc, index)?.reverb = decode(value)?,
        },
        DocPath::EffectEnabled(index, effect) => {
            let enabled = expect_bool(value)?;
            *channel_mut(doc, index)?.effect_enabled_mut(effect) = enabled;
        }
        DocPath::EqBand(index, band) => {
            let decoded = decode(value)?;
            *channel_mut(doc, index)?.equalizer.band_mut(band) = decoded;
        }
        DocPath::Param(index, param) => {
            let number = expect_number(value)?;
            *channel_mut(doc, index)?.param_mut(param) = number;
        }
    }

    Ok(())
}

fn channel_mut(doc: &mut MixerDocument, index: usize) -> Result<&mut Channel, OpError> {
    doc.channel_mut(index)
        .ok_or(OpError::Path(PathError::ChannelOutOfRange(index)))
}

fn expect_bool(value: &Value) -> Result<bool, OpError> {
    value.as_bool().ok_or(OpError::TypeMismatch("a boolean"))
}

fn expect_number(value: &Value) -> Result<f64, OpError> {
    value.as_f64().ok_or(OpError::TypeMismatch("a number"))
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, OpError> {
    T::deserialize(value).map_err(OpError::Object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mixconsole_types::{ConnectionStatus, InferencingState};
    use serde_json::json;

    fn doc() -> Arc<MixerDocument> {
        Arc::new(MixerDocument::new())
    }

    #[test]
    fn test_replace_nested_eq_param() {
        let before = doc();
        let after = apply_patch(
            &before,
            &[PatchOp::replace("/channels/3/equalizer/band0/gain_db", 4.5)],
        )
        .unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(after.channels[3].equalizer.band0.gain_db, 4.5);
        assert_eq!(before.channels[3].equalizer.band0.gain_db, 0.0);
        assert!(Arc::ptr_eq(&before.channels[4], &after.channels[4]));
    }

    #[test]
    fn test_later_op_wins() {
        let after = apply_patch(
            &doc(),
            &[
                PatchOp::replace("/channels/1/panning", 0.2),
                PatchOp::replace("/channels/1/panning", 0.8),
            ],
        )
        .unwrap();
        assert_eq!(after.channels[1].panning, 0.8);
    }

    #[test]
    fn test_invalid_path_rejects_whole_batch() {
        let before = doc();
        let err = apply_patch(
            &before,
            &[
                PatchOp::replace("/channels/2/muted", true),
                PatchOp::replace("/channels/12/muted", true),
            ],
        )
        .unwrap_err();

        assert!(matches!(
            err,
            PatchError::Path {
                index: 1,
                source: PathError::ChannelOutOfRange(12)
            }
        ));
        assert!(!before.channels[2].muted);
    }

    #[test]
    fn test_type_mismatch_rejects_batch() {
        let err = apply_patch(
            &doc(),
            &[
                PatchOp::replace("/hw_init_ready", true),
                PatchOp::replace("/channels/0/muted", 1),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, PatchError::TypeMismatch { index: 1, .. }));

        let err = apply_patch(&doc(), &[PatchOp::replace("/channels/0/panning", "left")])
            .unwrap_err();
        assert!(matches!(err, PatchError::TypeMismatch { index: 0, .. }));
    }

    #[test]
    fn test_no_op_patch_keeps_identity() {
        let before = doc();
        let after = apply_patch(&before, &[PatchOp::replace("/channels/5/panning", 0.5)]).unwrap();
        assert!(Arc::ptr_eq(&before, &after));

        let after = apply_patch(&before, &[]).unwrap();
        assert!(Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_replace_top_level_fields() {
        let after = apply_patch(
            &doc(),
            &[
                PatchOp::replace("/inferencing_state", "recording"),
                PatchOp::replace("/inferencing_active", true),
                PatchOp::replace("/soloing_active", true),
            ],
        )
        .unwrap();
        assert_eq!(after.inferencing_state, InferencingState::Recording);
        assert!(after.inferencing_active);
        assert!(after.soloing_active);

        let err = apply_patch(&doc(), &[PatchOp::replace("/inferencing_state", "paused")]);
        assert!(matches!(err, Err(PatchError::Object { .. })));
    }

    #[test]
    fn test_replace_whole_objects() {
        let mut compressor = serde_json::to_value(&MixerDocument::new().channels[1].compressor)
            .unwrap();
        compressor["ratio"] = json!(8.0);
        compressor["enabled"] = json!(true);

        let after = apply_patch(
            &doc(),
            &[
                PatchOp::replace("/channels/1/compressor", compressor),
                PatchOp::replace(
                    "/channels/1/equalizer/lowShelf",
                    json!({"gain_db": 3.0, "cutoff_freq": 100.0, "q_factor": 0.5}),
                ),
            ],
        )
        .unwrap();
        assert!(after.channels[1].compressor.enabled);
        assert_eq!(after.channels[1].compressor.ratio, 8.0);
        assert_eq!(after.channels[1].equalizer.low_shelf.cutoff_freq, 100.0);

        let err = apply_patch(
            &doc(),
            &[PatchOp::replace("/channels/1/reverb", json!({"enabled": true}))],
        );
        assert!(matches!(err, Err(PatchError::Object { .. })));
    }

    #[test]
    fn test_full_state_idempotent() {
        let before = doc();
        let mut payload = MixerDocument::new();
        payload.hw_init_ready = true;
        Arc::make_mut(&mut payload.channels[7]).muted = true;

        let first = apply_full_state(&before, payload.clone());
        assert!(!Arc::ptr_eq(&before, &first));
        assert!(first.hw_init_ready);

        let second = apply_full_state(&first, payload);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_full_state_keeps_connection_status() {
        let mut local = MixerDocument::new();
        local.connection_status = ConnectionStatus::Connected;
        let before = Arc::new(local);

        let mut payload = MixerDocument::new();
        payload.soloing_active = true;
        payload.connection_status = ConnectionStatus::Disconnected;

        let after = apply_full_state(&before, payload);
        assert!(after.soloing_active);
        assert_eq!(after.connection_status, ConnectionStatus::Connected);
    }
}
