/*!
# featview Render Pipeline

Retained-mode rendering of feature tracks against a shared sequence axis.

## Architecture

Every change to the viewer flows through two phases:
1. **Structural phase**: runs when the set of visible traces changes and
   creates or removes trace and feature nodes through keyed joins
2. **Positional phase**: runs on every zoom, pan, resize or settings change
   and only rewrites geometry attributes of existing nodes

The sequence row switches between residue letters and dots depending on
the pixel width of one position, and features that leave the visible
window are hidden once and skipped until they return.
*/

pub mod culling;
pub mod curve;
pub mod dssp;
pub mod export;
pub mod geometry;
pub mod lod;
pub mod manager;
pub mod pipeline;
pub mod scene;
pub mod selection;
pub mod structure;
pub mod tooltip;
pub mod viewer;

pub use export::{ExportConfig, SvgExporter};
pub use lod::LodLevel;
pub use manager::{Layers, Margin, SceneManager};
pub use pipeline::{PipelineStats, RenderPipeline};
pub use scene::{AttrValue, Handler, NodeId, NodeKind, SceneGraph};
pub use selection::{SelectionChannel, SelectionContext};
pub use structure::{StructureEvent, StructureLoader, StructureRenderer, StructureSource};
pub use tooltip::{Tooltip, TooltipController};
pub use viewer::{LabelLayout, PointerEvent, Viewer};

/// Version information for the featview render library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
