//! Configuration for the rendering pipeline.

use crate::syntax::types::Direction;

/// Options accepted by [`crate::render_dsl`]. All fields have defaults;
/// `..Default::default()` is the expected construction style.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Use the plain ASCII charset (`+-|><v^`) instead of Unicode box drawing.
    pub ascii: bool,
    /// Horizontal label padding inside each node box, in cells.
    pub padding: usize,
    /// Override the direction declared in the source. `None` keeps it.
    pub direction: Option<Direction>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            ascii: false,
            padding: 1,
            direction: None,
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }
}
