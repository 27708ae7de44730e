use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::brush::clamp_unit;
use crate::element::{Element, SceneObject};
use crate::error::{SurfaceError, SurfaceResult};

/// Represents a single layer in the document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Stable identifier for the layer
    pub id: Uuid,
    /// Display name of the layer
    pub name: String,
    /// Owned objects, bottom to top
    pub objects: Vec<SceneObject>,
    /// Hidden layers keep their objects but are never rendered
    pub visible: bool,
    /// Locked layers never accept new objects
    pub locked: bool,
    /// 0.0..=1.0
    pub opacity: f32,
}

impl Layer {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            objects: Vec::new(),
            visible: true,
            locked: false,
            opacity: 1.0,
        }
    }

    /// Adds an object on top of the layer. A locked layer refuses it.
    pub fn add_object(&mut self, mut object: SceneObject) -> SurfaceResult<()> {
        if self.locked {
            return Err(SurfaceError::LayerLocked(self.name.clone()));
        }
        object.set_visible(self.visible);
        self.objects.push(object);
        Ok(())
    }

    /// Flips visibility and pushes it down to every owned object.
    pub fn toggle_visibility(&mut self) -> bool {
        self.set_visible(!self.visible);
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        for object in &mut self.objects {
            object.set_visible(visible);
        }
    }

    /// Clamps to 0..=1 and overwrites the opacity of every owned object.
    pub fn set_opacity(&mut self, opacity: f32) -> f32 {
        self.opacity = clamp_unit(opacity);
        for object in &mut self.objects {
            object.set_opacity(self.opacity);
        }
        self.opacity
    }

    pub fn object(&self, id: usize) -> Option<&SceneObject> {
        self.objects.iter().find(|object| object.id() == id)
    }

    pub fn object_mut(&mut self, id: usize) -> Option<&mut SceneObject> {
        self.objects.iter_mut().find(|object| object.id() == id)
    }

    pub fn info(&self, active: bool) -> LayerInfo {
        LayerInfo {
            id: self.id.to_string(),
            name: self.name.clone(),
            visible: self.visible,
            locked: self.locked,
            opacity: self.opacity,
            active,
            object_count: self.objects.len(),
        }
    }
}

/// Read-only view of a layer handed to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub id: String,
    pub name: String,
    pub visible: bool,
    pub locked: bool,
    pub opacity: f32,
    pub active: bool,
    pub object_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brush::{BrushKind, BrushParams, resolve};
    use crate::element::{Stroke, StrokePoint};
    use egui::{Color32, pos2};

    fn stroke(id: usize) -> SceneObject {
        let style = resolve(
            BrushKind::Pencil,
            BrushParams {
                color: Color32::RED,
                width: 2.0,
                opacity: 0.6,
            },
        );
        let points = vec![
            StrokePoint { pos: pos2(0.0, 0.0), width: 2.0 },
            StrokePoint { pos: pos2(10.0, 10.0), width: 2.0 },
        ];
        Stroke::new(id, points, style).into()
    }

    #[test]
    fn locked_layer_rejects_objects() {
        let mut layer = Layer::new("Layer 1");
        layer.add_object(stroke(1)).unwrap();
        layer.locked = true;
        assert!(matches!(layer.add_object(stroke(2)), Err(SurfaceError::LayerLocked(_))));
        assert_eq!(layer.objects.len(), 1);
    }

    #[test]
    fn visibility_propagates_to_objects() {
        let mut layer = Layer::new("Layer 1");
        layer.add_object(stroke(1)).unwrap();
        assert!(!layer.toggle_visibility());
        assert!(layer.objects.iter().all(|o| !o.is_visible()));

        // Objects added while hidden start hidden
        layer.add_object(stroke(2)).unwrap();
        assert!(!layer.objects[1].is_visible());

        assert!(layer.toggle_visibility());
        assert!(layer.objects.iter().all(|o| o.is_visible()));
    }

    #[test]
    fn opacity_clamps_and_overwrites() {
        let mut layer = Layer::new("Layer 1");
        layer.add_object(stroke(1)).unwrap();
        assert_eq!(layer.set_opacity(1.5), 1.0);
        assert_eq!(layer.set_opacity(-0.2), 0.0);
        assert_eq!(layer.set_opacity(0.4), 0.4);
        assert_eq!(layer.objects[0].opacity(), 0.4);
    }

    #[test]
    fn info_reports_state() {
        let mut layer = Layer::new("Sketch");
        layer.add_object(stroke(7)).unwrap();
        let info = layer.info(true);
        assert_eq!(info.name, "Sketch");
        assert_eq!(info.id, layer.id.to_string());
        assert!(info.active && info.visible && !info.locked);
        assert_eq!(info.object_count, 1);
        assert!(layer.object(7).is_some());
    }
}
