//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types; the
//! `platform` module translates window-system events into [`InputEvent`]s.

mod frame;
mod state;
mod types;

pub mod platform;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{
    CompositionEvent,
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    MouseWheelDelta,
    PointerButtonEvent,
    PointerMoveEvent,
    TextEvent,
};
