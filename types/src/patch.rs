//! Patch wire format and inbound frame classification.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::MixerDocument;

/// A single path-addressed mutation. `replace` is the only operation the
/// mixer protocol uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOp {
    Replace { path: String, value: Value },
}

impl PatchOp {
    pub fn replace(path: impl ToString, value: impl Into<Value>) -> Self {
        Self::Replace {
            path: path.to_string(),
            value: value.into(),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Self::Replace { path, .. } => path,
        }
    }

    pub fn value(&self) -> &Value {
        match self {
            Self::Replace { value, .. } => value,
        }
    }
}

/// An inbound server frame after classification.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerUpdate {
    /// Ordered batch of operations.
    Patch(Vec<PatchOp>),
    /// Complete document snapshot.
    FullState(Box<MixerDocument>),
}

impl ServerUpdate {
    pub fn description(&self) -> String {
        match self {
            Self::Patch(ops) => format!("patch ({} ops)", ops.len()),
            Self::FullState(_) => "full state".to_string(),
        }
    }

    /// Decode a text frame.
    pub fn from_json(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text).map_err(DecodeError::Json)?;
        Self::from_value(value)
    }

    /// Classify a decoded JSON value: arrays are patches, objects carrying a
    /// `channels` array are full states, anything else is rejected.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let has_channels = value.get("channels").is_some_and(Value::is_array);
        match value {
            Value::Array(_) => serde_json::from_value(value)
                .map(Self::Patch)
                .map_err(DecodeError::Patch),
            Value::Object(_) if has_channels => {
                serde_json::from_value::<MixerDocument>(value)
                    .map(|doc| Self::FullState(Box::new(doc)))
                    .map_err(DecodeError::FullState)
            }
            _ => Err(DecodeError::UnknownShape),
        }
    }
}

/// Why an inbound frame could not be turned into a [`ServerUpdate`].
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("frame is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("malformed patch: {0}")]
    Patch(#[source] serde_json::Error),
    #[error("malformed full state: {0}")]
    FullState(#[source] serde_json::Error),
    #[error("unknown payload shape")]
    UnknownShape,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_patch_wire_shape() {
        let op = PatchOp::replace("/channels/3/muted", true);
        assert_eq!(
            serde_json::to_value(&op).unwrap(),
            json!({"op": "replace", "path": "/channels/3/muted", "value": true})
        );
    }

    #[test]
    fn test_classify_patch() {
        let update = ServerUpdate::from_json(
            r#"[{"op":"replace","path":"/channels/1/panning","value":0.5}]"#,
        )
        .unwrap();
        assert_eq!(
            update,
            ServerUpdate::Patch(vec![PatchOp::replace("/channels/1/panning", 0.5)])
        );
    }

    #[test]
    fn test_classify_full_state() {
        let text = serde_json::to_string(&MixerDocument::new()).unwrap();
        let update = ServerUpdate::from_json(&text).unwrap();
        assert!(matches!(update, ServerUpdate::FullState(_)));
    }

    #[test]
    fn test_unknown_op_rejects_batch() {
        let err = ServerUpdate::from_value(json!([
            {"op": "replace", "path": "/hw_init_ready", "value": true},
            {"op": "add", "path": "/foo", "value": 1}
        ]))
        .unwrap_err();
        assert!(matches!(err, DecodeError::Patch(_)));
    }

    #[test]
    fn test_unknown_shapes() {
        assert!(matches!(
            ServerUpdate::from_value(json!({"type": "ping"})),
            Err(DecodeError::UnknownShape)
        ));
        assert!(matches!(
            ServerUpdate::from_value(json!(42)),
            Err(DecodeError::UnknownShape)
        ));
        assert!(matches!(
            ServerUpdate::from_json("not json"),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_full_state_requires_nine_channels() {
        let mut value = serde_json::to_value(MixerDocument::new()).unwrap();
        value["channels"].as_array_mut().unwrap().pop();
        assert!(matches!(
            ServerUpdate::from_value(value),
            Err(DecodeError::FullState(_))
        ));
    }
}
