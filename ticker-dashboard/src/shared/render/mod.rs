//! Drawing a [`DisplayModel`] to a surface
//!
//! Provides:
//! - [`Renderer`]: draw / shutdown contract used by the refresh loop
//! - [`TerminalRenderer`]: ratatui + crossterm implementation
//! - [`parse_style`]: rich-like column style strings to ratatui styles

pub mod style;
pub mod terminal;
mod widget;

pub use style::{parse_style, tone_style};
pub use terminal::{is_exit_key, spawn_input_watcher, TerminalRenderer};
pub use widget::draw_dashboard;

use crate::shared::{error::RenderError, present::DisplayModel};

pub trait Renderer {
    /// Replace the whole visible frame with `model`
    fn draw(&mut self, model: &DisplayModel) -> Result<(), RenderError>;

    /// Release the surface. Must be idempotent.
    fn shutdown(&mut self) -> Result<(), RenderError>;
}
