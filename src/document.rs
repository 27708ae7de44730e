//! The layer store: an ordered stack of layers with exactly one active layer.

use egui::{Color32, Pos2, Vec2};
use serde::{Deserialize, Serialize};

use crate::element::{Element, SceneObject};
use crate::error::{SurfaceError, SurfaceResult};
use crate::layer::{Layer, LayerInfo};

/// Everything a history snapshot captures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    pub layers: Vec<Layer>,
    pub active_layer: usize,
    pub background: Option<Color32>,
}

#[derive(Debug, Clone)]
pub struct Document {
    layers: Vec<Layer>,
    /// Always a valid index into `layers`
    active_layer: usize,
    size: Vec2,
    background: Option<Color32>,
    layer_name: String,
}

impl Document {
    /// Creates a document seeded with one empty, active layer.
    pub fn new(size: Vec2, layer_name: &str, background: Option<Color32>) -> Self {
        let mut document = Self {
            layers: Vec::new(),
            active_layer: 0,
            size,
            background,
            layer_name: layer_name.to_string(),
        };
        document.seed();
        document
    }

    fn seed(&mut self) {
        self.layers = vec![Layer::new(&format!("{} 1", self.layer_name))];
        self.active_layer = 0;
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, index: usize) -> SurfaceResult<&Layer> {
        self.layers.get(index).ok_or(SurfaceError::LayerOutOfRange(index))
    }

    fn layer_mut(&mut self, index: usize) -> SurfaceResult<&mut Layer> {
        self.layers.get_mut(index).ok_or(SurfaceError::LayerOutOfRange(index))
    }

    pub fn active_index(&self) -> usize {
        self.active_layer
    }

    pub fn active_layer(&self) -> &Layer {
        &self.layers[self.active_layer]
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn resize(&mut self, size: Vec2) -> SurfaceResult<()> {
        if !(size.x.is_finite() && size.y.is_finite()) || size.x <= 0.0 || size.y <= 0.0 {
            return Err(SurfaceError::InvalidSize(size.x, size.y));
        }
        self.size = size;
        Ok(())
    }

    pub fn background(&self) -> Option<Color32> {
        self.background
    }

    /// Appends a visible, unlocked, fully opaque layer and makes it active.
    pub fn add_layer(&mut self) -> usize {
        let name = format!("{} {}", self.layer_name, self.layers.len() + 1);
        self.layers.push(Layer::new(&name));
        self.active_layer = self.layers.len() - 1;
        self.active_layer
    }

    pub fn select_layer(&mut self, index: usize) -> SurfaceResult<()> {
        self.layer(index)?;
        self.active_layer = index;
        Ok(())
    }

    /// Returns the new visibility.
    pub fn toggle_visibility(&mut self, index: usize) -> SurfaceResult<bool> {
        Ok(self.layer_mut(index)?.toggle_visibility())
    }

    /// Returns the new lock state.
    pub fn toggle_lock(&mut self, index: usize) -> SurfaceResult<bool> {
        let layer = self.layer_mut(index)?;
        layer.locked = !layer.locked;
        Ok(layer.locked)
    }

    /// Returns the stored (clamped) opacity.
    pub fn set_layer_opacity(&mut self, index: usize, opacity: f32) -> SurfaceResult<f32> {
        Ok(self.layer_mut(index)?.set_opacity(opacity))
    }

    /// Removes a layer and re-clamps the active index. The last layer cannot be removed.
    pub fn remove_layer(&mut self, index: usize) -> SurfaceResult<Layer> {
        self.layer(index)?;
        if self.layers.len() == 1 {
            return Err(SurfaceError::LastLayer);
        }
        let removed = self.layers.remove(index);
        if index < self.active_layer {
            self.active_layer -= 1;
        }
        self.active_layer = self.active_layer.min(self.layers.len() - 1);
        Ok(removed)
    }

    /// Commits an object into the active layer. Returns the layer index.
    pub fn add_to_active(&mut self, object: SceneObject) -> SurfaceResult<usize> {
        let index = self.active_layer;
        self.layers[index].add_object(object)?;
        Ok(index)
    }

    pub fn infos(&self) -> Vec<LayerInfo> {
        self.layers
            .iter()
            .enumerate()
            .map(|(i, layer)| layer.info(i == self.active_layer))
            .collect()
    }

    pub fn object_count(&self) -> usize {
        self.layers.iter().map(|layer| layer.objects.len()).sum()
    }

    /// Topmost visible object under `pos` on an unlocked layer, as `(layer, object id)`.
    pub fn pick(&self, pos: Pos2) -> Option<(usize, usize)> {
        self.layers
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, layer)| layer.visible && !layer.locked)
            .find_map(|(index, layer)| {
                layer
                    .objects
                    .iter()
                    .rev()
                    .find(|object| object.is_visible() && object.hit_test(pos))
                    .map(|object| (index, object.id()))
            })
    }

    /// Moves an object. Fails on locked layers or unknown ids.
    pub fn translate_object(&mut self, index: usize, id: usize, delta: Vec2) -> SurfaceResult<()> {
        let layer = self.layer_mut(index)?;
        if layer.locked {
            return Err(SurfaceError::LayerLocked(layer.name.clone()));
        }
        let object = layer.object_mut(id).ok_or(SurfaceError::ObjectNotFound(id, index))?;
        object.translate(delta);
        Ok(())
    }

    /// Drops every layer and re-seeds one empty default layer.
    pub fn clear(&mut self) {
        self.seed();
    }

    pub fn scene_state(&self) -> SceneState {
        SceneState {
            layers: self.layers.clone(),
            active_layer: self.active_layer,
            background: self.background,
        }
    }

    /// Replaces layers, active index and background. Size is kept.
    pub fn restore(&mut self, state: SceneState) {
        self.layers = state.layers;
        self.background = state.background;
        if self.layers.is_empty() {
            self.seed();
        }
        self.active_layer = state.active_layer.min(self.layers.len() - 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> Document {
        Document::new(Vec2::new(200.0, 100.0), "Layer", None)
    }

    #[test]
    fn newest_layer_is_always_active() {
        let mut doc = document();
        for n in 1..=5 {
            let index = doc.add_layer();
            assert_eq!(index, n);
            assert_eq!(doc.active_index(), n);
        }
        assert_eq!(doc.layers().len(), 6);
        assert_eq!(doc.layers()[2].name, "Layer 3");
    }

    #[test]
    fn select_out_of_range_keeps_active() {
        let mut doc = document();
        doc.add_layer();
        assert!(doc.select_layer(7).is_err());
        assert_eq!(doc.active_index(), 1);
        doc.select_layer(0).unwrap();
        assert_eq!(doc.active_index(), 0);
    }

    #[test]
    fn removing_layers_reclamps_active_index() {
        let mut doc = document();
        doc.add_layer();
        doc.add_layer();
        // Active is the last one; removing it must not leave a dangling index
        doc.remove_layer(2).unwrap();
        assert_eq!(doc.active_index(), 1);

        doc.select_layer(1).unwrap();
        doc.remove_layer(0).unwrap();
        assert_eq!(doc.active_index(), 0);

        assert!(matches!(doc.remove_layer(0), Err(SurfaceError::LastLayer)));
        assert_eq!(doc.layers().len(), 1);
    }

    #[test]
    fn clear_reseeds_single_layer() {
        let mut doc = document();
        doc.add_layer();
        doc.toggle_lock(1).unwrap();
        doc.clear();
        assert_eq!(doc.layers().len(), 1);
        assert_eq!(doc.active_index(), 0);
        assert!(!doc.active_layer().locked);
    }

    #[test]
    fn restore_clamps_bad_active_index() {
        let mut doc = document();
        let mut state = doc.scene_state();
        state.active_layer = 12;
        doc.restore(state);
        assert_eq!(doc.active_index(), 0);
    }

    #[test]
    fn pick_finds_topmost_unlocked_object() {
        use crate::brush::{BrushKind, BrushParams, resolve};
        use crate::element::{Stroke, StrokePoint};
        use egui::{Color32, pos2};

        let style = resolve(
            BrushKind::Pencil,
            BrushParams {
                color: Color32::BLACK,
                width: 4.0,
                opacity: 1.0,
            },
        );
        let stroke = |id: usize| {
            let points = vec![
                StrokePoint { pos: pos2(10.0, 10.0), width: 4.0 },
                StrokePoint { pos: pos2(50.0, 10.0), width: 4.0 },
            ];
            SceneObject::Stroke(Stroke::new(id, points, style.clone()))
        };

        let mut doc = document();
        doc.add_to_active(stroke(1)).unwrap();
        doc.add_layer();
        doc.add_to_active(stroke(2)).unwrap();
        assert_eq!(doc.pick(pos2(30.0, 10.0)), Some((1, 2)));
        assert_eq!(doc.pick(pos2(30.0, 90.0)), None);

        doc.toggle_lock(1).unwrap();
        assert_eq!(doc.pick(pos2(30.0, 10.0)), Some((0, 1)));
        assert!(matches!(
            doc.translate_object(1, 2, Vec2::new(5.0, 0.0)),
            Err(SurfaceError::LayerLocked(_))
        ));
        assert!(matches!(
            doc.translate_object(0, 99, Vec2::new(5.0, 0.0)),
            Err(SurfaceError::ObjectNotFound(99, 0))
        ));
        doc.translate_object(0, 1, Vec2::new(0.0, 30.0)).unwrap();
        assert_eq!(doc.pick(pos2(30.0, 40.0)), Some((0, 1)));
    }

    #[test]
    fn resize_rejects_degenerate_sizes() {
        let mut doc = document();
        assert!(doc.resize(Vec2::new(0.0, 10.0)).is_err());
        doc.resize(Vec2::new(300.0, 150.0)).unwrap();
        assert_eq!(doc.size(), Vec2::new(300.0, 150.0));
    }
}
