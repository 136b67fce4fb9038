//! Inspect command implementation - print the trace tree and row layout

use anyhow::Result;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::PathBuf;

use featview_core::TraceId;
use featview_render::Viewer;

use crate::config::Config;
use crate::document::Document;

/// One trace as reported by `inspect`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceSummary {
    pub id: TraceId,
    pub label: String,
    pub level: usize,
    pub features: usize,
    pub children: usize,
    pub domain: (f64, f64),
    pub visible: bool,
    /// Top of the row when visible
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

pub fn summarize(viewer: &Viewer) -> Vec<TraceSummary> {
    let layouts = viewer.label_layouts();
    let model = viewer.model();
    model
        .iter()
        .map(|trace| {
            let layout = layouts.iter().find(|l| l.trace == trace.id);
            TraceSummary {
                id: trace.id,
                label: trace.label.clone(),
                level: trace.level,
                features: trace.features.len(),
                children: model.child_ids(trace.id).len(),
                domain: (trace.domain.min, trace.domain.max),
                visible: model.is_visible(trace.id),
                top: layout.map(|l| l.top),
                height: layout.map(|l| l.height),
            }
        })
        .collect()
}

/// Indented plain-text tree.
pub fn format_tree(summaries: &[TraceSummary], sequence_length: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Sequence length: {}", sequence_length);
    for s in summaries {
        let marker = match (s.children > 0, s.visible) {
            (true, _) => "+",
            (false, true) => "-",
            (false, false) => " ",
        };
        let _ = write!(
            out,
            "{}{} [{}] {} ({} features, domain {}..{})",
            "  ".repeat(s.level),
            marker,
            s.id,
            s.label,
            s.features,
            s.domain.0,
            s.domain.1
        );
        match (s.top, s.height) {
            (Some(top), Some(height)) => {
                let _ = writeln!(out, " at y={} h={}", top, height);
            }
            _ => {
                let _ = writeln!(out, " hidden");
            }
        }
    }
    out
}

pub fn execute(config: &Config, input: PathBuf, expand_all: bool, json: bool) -> Result<()> {
    let document = Document::load(&input)?;
    let viewer = super::build_viewer(config, &document, config.render.width, config.render.height, expand_all)?;
    let summaries = summarize(&viewer);

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        print!("{}", format_tree(&summaries, viewer.sequence().len()));
    }
    Ok(())
}
