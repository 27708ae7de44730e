use egui::Pos2;

mod router;
pub use router::{PointerRouter, Subscription};

/// One pointer or stylus sample forwarded by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Position in surface coordinates
    pub pos: Pos2,
    /// Raw pressure as reported by the device, if any
    pub pressure: Option<f32>,
}

impl PointerSample {
    pub fn new(pos: Pos2) -> Self {
        Self { pos, pressure: None }
    }

    pub fn with_pressure(pos: Pos2, pressure: f32) -> Self {
        Self {
            pos,
            pressure: Some(pressure),
        }
    }

    /// Pressure strictly inside (0, 1) is trusted; anything else means the device
    /// has no pressure support and counts as full pressure.
    pub fn effective_pressure(&self) -> f32 {
        match self.pressure {
            Some(p) if p > 0.0 && p < 1.0 => p,
            _ => 1.0,
        }
    }

    /// Samples with NaN or infinite coordinates are dropped before they reach a tool.
    pub fn is_valid(&self) -> bool {
        self.pos.x.is_finite() && self.pos.y.is_finite()
    }
}

/// Pointer input from the host, in the order it happened
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(PointerSample),
    Move(PointerSample),
    Up(PointerSample),
}

impl PointerEvent {
    pub fn sample(&self) -> &PointerSample {
        match self {
            Self::Down(sample) | Self::Move(sample) | Self::Up(sample) => sample,
        }
    }
}
