//! Layout pipeline: GraphIR → Sugiyama phases → routed edges.

pub mod graph;
pub mod router;
pub mod sugiyama;
pub mod types;

pub use graph::GraphIR;
pub use sugiyama::SugiyamaLayout;
pub use types::{LayoutNode, LayoutResult, Point, RoutedEdge};

use crate::config::RenderConfig;

/// Run the full layout pipeline.
pub fn full_layout(gir: &mut GraphIR, config: &RenderConfig) -> LayoutResult {
    SugiyamaLayout::layout(gir, config)
}
