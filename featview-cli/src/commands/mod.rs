//! Command implementations for the featview CLI

pub mod inspect;
pub mod render;

use featview_core::PartialSettings;
use featview_render::Viewer;

use crate::config::Config;
use crate::document::Document;
use crate::error::CliResult;

/// Settings from the config file, overridden by the document's own.
pub fn effective_settings(config: &Config, document: &Document) -> PartialSettings {
    let base = PartialSettings {
        coil_seed: config.render.coil_seed.or(config.settings.coil_seed),
        ..config.settings.clone()
    };
    base.overlay(document.settings.clone())
}

/// Build a viewer over `document` and bring its scene up to date.
pub fn build_viewer(
    config: &Config,
    document: &Document,
    width: f64,
    height: f64,
    expand: bool,
) -> CliResult<Viewer> {
    let settings = effective_settings(config, document);
    let mut viewer = Viewer::with_settings(width, height, &settings);
    viewer.set_sequence(document.sequence_or_extent());
    viewer.set_traces(document.traces.clone());
    if expand {
        // Pre-order ids visit parents before their children
        let ids: Vec<_> = viewer.model().iter().map(|t| t.id).collect();
        for id in ids {
            let trace = viewer.model().get_trace(id)?;
            if trace.show && !trace.expanded && !viewer.model().child_ids(id).is_empty() {
                viewer.toggle_expansion(id)?;
            }
        }
    }
    viewer.render()?;
    Ok(viewer)
}
