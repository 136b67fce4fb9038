//! Render command implementation - lay out a document and export it to SVG

use anyhow::{Context, Result};
use std::path::PathBuf;

use featview_render::ExportConfig;

use crate::config::Config;
use crate::document::Document;
use crate::error::CliError;

#[derive(Debug, Clone, Default)]
pub struct RenderArgs {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub title: Option<String>,
    pub no_footer: bool,
    pub expand_all: bool,
}

pub fn execute(config: &Config, input: PathBuf, output: PathBuf, args: RenderArgs) -> Result<()> {
    log::info!("Starting track rendering");
    log::info!("Input document: {}", input.display());
    log::info!("Output file: {}", output.display());

    let width = args.width.unwrap_or(config.render.width);
    let height = args.height.unwrap_or(config.render.height);
    if !(width > 0.0 && width.is_finite()) || !(height >= 0.0 && height.is_finite()) {
        return Err(CliError::validation(format!("invalid surface size {}x{}", width, height)).into());
    }

    let document = Document::load(&input)?;
    let viewer = super::build_viewer(config, &document, width, height, args.expand_all)?;

    let stats = viewer.pipeline().stats();
    log::info!(
        "Laid out {} visible traces: {} features drawn, {} culled",
        viewer.model().visible_traces().len(),
        stats.drawn,
        stats.culled
    );

    let export = ExportConfig {
        show_footer: config.export.footer && !args.no_footer,
        title: args.title.or_else(|| config.export.title.clone()),
        provenance_comment: config.export.provenance.clone(),
        ..Default::default()
    };
    viewer
        .export_svg(&output, export)
        .with_context(|| format!("Failed to render {}", input.display()))?;

    log::info!("Rendering completed successfully");
    Ok(())
}
