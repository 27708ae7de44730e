use crate::document::SceneState;
use crate::error::SnapshotError;

/// Full serialized capture of the layer stack, active index and background.
///
/// The payload is opaque JSON; it is only ever decoded back into a
/// [`SceneState`] when undo or redo restores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    payload: Vec<u8>,
}

impl Snapshot {
    pub fn capture(state: &SceneState) -> Result<Self, SnapshotError> {
        let payload = serde_json::to_vec(state).map_err(SnapshotError::Serialize)?;
        Ok(Self { payload })
    }

    pub fn decode(&self) -> Result<SceneState, SnapshotError> {
        serde_json::from_slice(&self.payload).map_err(SnapshotError::Deserialize)
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn from_raw(payload: impl Into<Vec<u8>>) -> Self {
        Self { payload: payload.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use egui::Vec2;

    #[test]
    fn capture_restores_layers() {
        let mut document = Document::new(Vec2::new(10.0, 10.0), "Layer", None);
        document.add_layer();
        let snapshot = Snapshot::capture(&document.scene_state()).unwrap();
        assert!(!snapshot.is_empty());

        let state = snapshot.decode().unwrap();
        assert_eq!(state.layers.len(), 2);
        assert_eq!(state.active_layer, 1);
    }

    #[test]
    fn garbage_payload_fails_to_decode() {
        let snapshot = Snapshot::from_raw("{\"layers\": 4");
        assert!(matches!(snapshot.decode(), Err(SnapshotError::Deserialize(_))));
    }
}
