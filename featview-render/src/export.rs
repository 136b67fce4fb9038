/*!
# Vector Export

Serialises the retained scene to a standalone SVG document. Output only
depends on the scene unless the footer is enabled, which stamps the
generation time.
*/

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

use crate::curve::fmt_num;
use crate::manager::SceneManager;
use crate::scene::{AttrValue, NodeId, NodeKind, SceneGraph};

/// Export configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub show_footer: bool,
    pub title: Option<String>,
    pub font_family: String,
    pub font_size: u32,
    pub provenance_comment: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            show_footer: true,
            title: None,
            font_family: "Arial, sans-serif".to_string(),
            font_size: 12,
            provenance_comment: None,
        }
    }
}

pub struct SvgExporter {
    config: ExportConfig,
}

impl SvgExporter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Render the manager's scene as an SVG document.
    pub fn to_svg_string(&self, manager: &SceneManager) -> String {
        let mut svg = SvgBuilder::new(manager.width(), manager.height());

        if let Some(comment) = &self.config.provenance_comment {
            svg.add_comment(comment);
        }

        let scene = manager.scene();
        for &child in scene.children(scene.root()) {
            svg.add_node(scene, child, 1);
        }

        if let Some(title) = &self.config.title {
            svg.add_title(title, &self.config);
        }

        if self.config.show_footer {
            let x = manager.x_scale();
            svg.add_footer(
                &format!(
                    "featview v{} | Window: {:.1}-{:.1} | Nodes: {} | Generated: {}",
                    crate::VERSION,
                    x.domain.0,
                    x.domain.1,
                    scene.len(),
                    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
                ),
                &self.config,
            );
        }

        svg.finish()
    }

    /// Export to SVG format
    pub fn export_svg<P: AsRef<Path>>(&self, path: P, manager: &SceneManager) -> Result<()> {
        let path = path.as_ref();
        let document = self.to_svg_string(manager);
        std::fs::write(path, document).with_context(|| format!("Failed to write SVG to {}", path.display()))?;
        log::info!("Wrote SVG to {}", path.display());
        Ok(())
    }
}

struct SvgBuilder {
    width: f64,
    height: f64,
    elements: Vec<String>,
    top_comments: Vec<String>,
}

impl SvgBuilder {
    fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            elements: Vec::new(),
            top_comments: Vec::new(),
        }
    }

    fn add_comment(&mut self, text: &str) {
        self.top_comments.push(text.to_string());
    }

    fn add_title(&mut self, title: &str, config: &ExportConfig) {
        self.elements.push(format!(
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}px" text-anchor="middle" font-weight="bold">{}</text>"#,
            fmt_num(self.width / 2.0),
            config.font_size + 4,
            escape(&config.font_family),
            config.font_size + 4,
            escape(title)
        ));
    }

    fn add_footer(&mut self, text: &str, config: &ExportConfig) {
        self.elements.push(format!(
            r#"<text x="10" y="{}" font-family="{}" font-size="{}px" fill="gray">{}</text>"#,
            fmt_num(self.height - 10.0),
            escape(&config.font_family),
            config.font_size.saturating_sub(2),
            escape(text)
        ));
    }

    fn add_node(&mut self, scene: &SceneGraph, id: NodeId, depth: usize) {
        let Some(node) = scene.get(id) else { return };
        let indent = "  ".repeat(depth - 1);
        let tag = node.kind.tag();
        let mut open = format!("{}<{}", indent, tag);
        for (name, value) in &node.attrs {
            let value = match value {
                AttrValue::Num(v) => fmt_num(*v),
                AttrValue::Str(s) => escape(s),
            };
            let _ = write!(open, r#" {}="{}""#, name, value);
        }

        let children = scene.children(id);
        match (&node.text, children.is_empty()) {
            (Some(text), _) if node.kind == NodeKind::Text => {
                self.elements.push(format!("{}>{}</{}>", open, escape(text), tag));
            }
            (_, true) => self.elements.push(format!("{}/>", open)),
            (_, false) => {
                self.elements.push(format!("{}>", open));
                for &child in children {
                    self.add_node(scene, child, depth + 1);
                }
                self.elements.push(format!("{}</{}>", indent, tag));
            }
        }
    }

    fn finish(self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        let _ = writeln!(
            out,
            r#"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">"#,
            w = fmt_num(self.width),
            h = fmt_num(self.height)
        );
        for c in &self.top_comments {
            for line in c.lines() {
                let _ = writeln!(out, "  <!-- {} -->", line.replace("--", "- -"));
            }
        }
        for element in &self.elements {
            let _ = writeln!(out, "  {}", element);
        }
        out.push_str("</svg>\n");
        out
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
