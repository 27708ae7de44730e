//! The tool state machine: which interaction mode owns pointer input.

mod machine;
mod tool_state;

pub use machine::ToolMachine;
pub use tool_state::{ToolKind, ToolState};
