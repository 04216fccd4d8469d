//! Window-system translation layers.

pub mod winit;
