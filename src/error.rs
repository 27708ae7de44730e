use thiserror::Error;

/// Failures while capturing or restoring a history snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to restore snapshot: {0}")]
    Deserialize(#[source] serde_json::Error),
}

/// Failures while producing an encoded image of the surface.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid export scale: {0}")]
    InvalidScale(f32),

    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    #[error("Surface has no drawable area")]
    EmptySurface,

    #[error("Export of {width}x{height} pixels exceeds the limit of {limit}")]
    TooLarge { width: u64, height: u64, limit: u64 },

    #[error("Failed to allocate a {0}x{1} canvas")]
    Allocation(u32, u32),

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse surface config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Every way a surface command can fail.
///
/// None of these reach the host as a panic or an `Err`: the surface logs them
/// and reports a falsy result instead.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("Surface is not initialized")]
    NotInitialized,

    #[error("Layer index {0} is out of range")]
    LayerOutOfRange(usize),

    #[error("Layer '{0}' is locked")]
    LayerLocked(String),

    #[error("No object #{0} on layer {1}")]
    ObjectNotFound(usize, usize),

    #[error("Cannot remove the last remaining layer")]
    LastLayer,

    #[error("Unrecognized tool id: {0}")]
    UnknownTool(String),

    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    #[error("Invalid surface size: {0}x{1}")]
    InvalidSize(f32, f32),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl SurfaceError {
    /// Precondition failures are expected during normal use and only deserve a debug line.
    pub fn is_precondition(&self) -> bool {
        !matches!(
            self,
            Self::Snapshot(_)
                | Self::Export(
                    ExportError::Encode(_)
                        | ExportError::TooLarge { .. }
                        | ExportError::Allocation(..)
                )
        )
    }
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;
