#![warn(clippy::all, rust_2018_idioms)]

pub mod brush;
pub mod command;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod event;
pub mod id_generator;
pub mod input;
pub mod layer;
pub mod renderer;
pub mod state;
pub mod surface;
pub mod tool;

pub use brush::{BrushKind, BrushProfile, StrokeStyle, resolve};
pub use command::{Command, SnapshotHistory};
pub use config::SurfaceConfig;
pub use document::Document;
pub use element::{Element, SceneObject, Shape, ShapeKind, Stroke};
pub use error::{SurfaceError, SurfaceResult};
pub use event::{EditorEvent, EventHandler};
pub use input::PointerSample;
pub use layer::{Layer, LayerInfo};
pub use renderer::ExportFormat;
pub use state::ToolKind;
pub use surface::{DrawingSurface, SurfaceHandle, SurfaceHost};
pub use tool::ToolOptions;
