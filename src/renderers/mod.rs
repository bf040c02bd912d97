//! Renderer trait and the text renderer.

pub mod canvas;
pub mod charset;
pub mod text;

pub use text::TextRenderer;

use crate::layout::types::LayoutResult;

/// A diagram renderer. The contract leaves room for alternate backends;
/// only the text renderer exists today.
pub trait Renderer {
    fn render(&self, layout: &LayoutResult) -> String;
}
