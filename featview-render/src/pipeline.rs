/*!
# Render Pipeline

Two phases over the scene owned by the [`SceneManager`]:

- `structure` runs once per distinct list of visible trace ids. It joins one
  group per trace (keyed by id) under the draw layer, creates one group per
  feature with its base shape and pointer handler, and builds grid and zero
  lines.
- `update` runs on every viewport, scale, selection or settings change. It
  only writes geometry attributes, apart from the sequence row and DSSP tiles
  whose node count depends on the zoom level and is reconciled by keyed joins.

Features leaving the visible window are hidden once and skipped until they
come back.
*/

use std::collections::BTreeMap;
use std::time::Instant;

use featview_core::colors::{self, Rgb};
use featview_core::feature::{Continuous, Dssp, Locus, Pin, Poly};
use featview_core::{
    BackgroundHeight, Band, CurveType, Domain, DsspShape, Feature, FeatureKey, InternalTrace, LinearScale,
    OrdinalScale, Result, RowKey, Sequence, Settings, TraceId, TraceModel, ViewerError,
};

use crate::culling::{CullingStats, OffscreenTracker, Visibility};
use crate::curve::{area_path, line_path};
use crate::dssp::{coil_stroke_width, glyph_path, tile_opacity, CoilNoise, DsspTiling};
use crate::geometry::{continuous_points, format_points, mark_radius, polygon_points, project_points, sheet_arrow, LocusGeometry};
use crate::lod::{dot_positions, LodLevel};
use crate::manager::SceneManager;
use crate::scene::{Handler, NodeId, NodeKind, SceneGraph};

/// Counters for both phases
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub structural_passes: u64,
    pub positional_passes: u64,
    /// Positional passes skipped because a cell had no width
    pub skipped_passes: u64,
    /// Features drawn on the last positional pass
    pub drawn: usize,
    /// Features skipped as off-screen on the last positional pass
    pub culled: usize,
}

#[derive(Debug, Clone, Copy)]
struct SequenceNodes {
    group: NodeId,
    backgrounds: NodeId,
    residues: NodeId,
    dots: NodeId,
}

#[derive(Debug, Clone)]
struct FeatureNodes {
    group: NodeId,
    shape: Option<NodeId>,
    label: Option<NodeId>,
    clip_rect: Option<NodeId>,
}

#[derive(Debug, Clone)]
struct TraceNodes {
    group: NodeId,
    grid_lines: Vec<(f64, NodeId)>,
    zero_line: Option<NodeId>,
    features: Vec<FeatureNodes>,
}

#[derive(Debug)]
pub struct RenderPipeline {
    visible: Option<Vec<TraceId>>,
    sequence: Option<SequenceNodes>,
    grid_groups: BTreeMap<TraceId, NodeId>,
    traces: BTreeMap<TraceId, TraceNodes>,
    offscreen: OffscreenTracker,
    coil: CoilNoise,
    stats: PipelineStats,
}

impl RenderPipeline {
    pub fn new(coil_seed: Option<u64>) -> Self {
        Self {
            visible: None,
            sequence: None,
            grid_groups: BTreeMap::new(),
            traces: BTreeMap::new(),
            offscreen: OffscreenTracker::new(),
            coil: CoilNoise::new(coil_seed),
            stats: PipelineStats::default(),
        }
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn culling_stats(&self) -> CullingStats {
        self.offscreen.stats()
    }

    pub fn is_offscreen(&self, key: &FeatureKey) -> bool {
        self.offscreen.is_offscreen(key)
    }

    /// Visible ids the structure was last built for.
    pub fn visible(&self) -> Option<&[TraceId]> {
        self.visible.as_deref()
    }

    /// Group node of a feature, if it has been created.
    pub fn feature_node(&self, key: FeatureKey) -> Option<NodeId> {
        self.traces.get(&key.trace)?.features.get(key.index).map(|f| f.group)
    }

    pub fn trace_node(&self, id: TraceId) -> Option<NodeId> {
        self.traces.get(&id).map(|t| t.group)
    }

    pub fn set_coil_seed(&mut self, seed: Option<u64>) {
        self.coil.reseed(seed);
    }

    /// Build trace and feature nodes for `visible`.
    ///
    /// Returns `false` without touching the scene when the list matches the
    /// previous one. Every id is resolved before the scene is modified.
    pub fn structure(
        &mut self,
        manager: &mut SceneManager,
        model: &TraceModel,
        visible: &[TraceId],
    ) -> Result<bool> {
        if self.visible.as_deref() == Some(visible) {
            return Ok(false);
        }
        let traces = visible
            .iter()
            .map(|&id| model.get_trace(id))
            .collect::<Result<Vec<_>>>()?;

        let started = Instant::now();
        let layers = *manager.layers();
        let scene = manager.scene_mut();

        if self.sequence.is_none() {
            self.sequence = Some(create_sequence(scene, layers.draw));
        }

        let keys: Vec<String> = visible.iter().map(|id| id.to_string()).collect();

        let joined = scene.join(layers.draw, NodeKind::Group, &keys);
        let mut next = BTreeMap::new();
        for (trace, (_, node)) in traces.iter().zip(&joined.nodes) {
            let nodes = match self.traces.remove(&trace.id) {
                Some(existing) if !joined.is_entered(*node) => existing,
                _ => create_trace(scene, *node, trace),
            };
            next.insert(trace.id, nodes);
        }
        self.traces = next;

        let grids = scene.join(layers.grid, NodeKind::Group, &keys);
        self.grid_groups.clear();
        for (trace, (_, node)) in traces.iter().zip(&grids.nodes) {
            if grids.is_entered(*node) {
                create_grid(scene, *node, trace);
            }
            self.grid_groups.insert(trace.id, *node);
        }
        for (trace, node) in traces.iter().zip(grids.nodes.iter().map(|(_, n)| *n)) {
            if let Some(nodes) = self.traces.get_mut(&trace.id) {
                collect_grid_nodes(scene, node, nodes);
            }
        }

        let kept: std::collections::HashSet<TraceId> = visible.iter().copied().collect();
        self.offscreen.retain(|k| kept.contains(&k.trace));

        self.visible = Some(visible.to_vec());
        self.stats.structural_passes += 1;
        log::debug!(
            "Structural pass: {} traces ({} entered, {} exited) in {:?}",
            visible.len(),
            joined.entered.len(),
            joined.exited,
            started.elapsed()
        );
        Ok(true)
    }

    /// Re-position every node for the current scales.
    ///
    /// Returns `false` when the pass was skipped because the horizontal scale
    /// gives a cell no width.
    pub fn update(
        &mut self,
        manager: &mut SceneManager,
        model: &TraceModel,
        sequence: &Sequence,
        y: &OrdinalScale,
        settings: &Settings,
    ) -> Result<bool> {
        let x = manager.x_scale();
        let cell = x.cell_width();
        if !(cell > 0.0 && cell.is_finite()) {
            log::debug!("Skipping positional pass, cell width is {}", cell);
            self.stats.skipped_passes += 1;
            return Ok(false);
        }

        let visible = self.visible.clone().unwrap_or_default();
        let rows = visible
            .iter()
            .map(|&id| {
                let trace = model.get_trace(id)?;
                let band = y.band(RowKey::Trace(id)).ok_or_else(|| ViewerError::trace_not_found(id))?;
                Ok((trace, band))
            })
            .collect::<Result<Vec<(&InternalTrace, Band)>>>()?;

        let started = Instant::now();
        let (x1, x2) = (manager.x1(), manager.x2());

        if let Some(nodes) = self.sequence {
            let lod = LodLevel::determine(&x, settings.char_width);
            let dots = match lod {
                LodLevel::Dots => dot_positions(&x, settings.char_width),
                LodLevel::Residues => Vec::new(),
            };
            update_sequence(manager.scene_mut(), nodes, sequence, settings, y, &x, lod, &dots);
        }

        let (lo, hi) = x.domain;
        let Self { traces, offscreen, coil, stats, .. } = self;
        let scene = manager.scene_mut();
        let mut drawn = 0;
        let mut culled = 0;
        for (trace, band) in &rows {
            let Some(nodes) = traces.get(&trace.id) else { continue };
            update_grid(scene, nodes, trace, band, settings, x1, x2);

            for (index, (feature, fnodes)) in trace.features.iter().zip(&nodes.features).enumerate() {
                let key = FeatureKey::new(trace.id, index);
                let span = feature.span();
                match offscreen.observe(key, span, lo, hi) {
                    Visibility::Skip => {
                        culled += 1;
                        continue;
                    }
                    Visibility::ExitedNow => {
                        scene.set_display(fnodes.group, false);
                        culled += 1;
                        continue;
                    }
                    Visibility::Entered => scene.set_display(fnodes.group, true),
                    Visibility::Visible => {}
                }
                let window = (span.start.max(lo), span.end.min(hi));
                let ctx = DrawContext { x: &x, band, domain: &trace.domain, settings, window };
                draw_feature(scene, coil, key, feature, fnodes, &ctx);
                drawn += 1;
            }
        }

        manager.update_shadow();
        manager.update_axis(y.axis_position());

        stats.positional_passes += 1;
        stats.drawn = drawn;
        stats.culled = culled;
        log::debug!("Positional pass: {} drawn, {} culled in {:?}", drawn, culled, started.elapsed());
        Ok(true)
    }

    /// Drop every trace node and forget the memoised structure.
    pub fn reset(&mut self, scene: &mut SceneGraph) {
        for nodes in self.traces.values() {
            scene.remove(nodes.group);
        }
        for group in self.grid_groups.values() {
            scene.remove(*group);
        }
        self.traces.clear();
        self.grid_groups.clear();
        self.visible = None;
        self.offscreen.clear();
        self.coil.clear();
    }

    /// Release everything this pipeline created.
    pub fn dispose(&mut self, scene: &mut SceneGraph) {
        self.reset(scene);
        if let Some(nodes) = self.sequence.take() {
            scene.remove(nodes.group);
        }
        self.stats = PipelineStats::default();
    }
}

struct DrawContext<'a> {
    x: &'a LinearScale,
    band: &'a Band,
    domain: &'a Domain,
    settings: &'a Settings,
    /// Visible part of the feature in sequence coordinates
    window: (f64, f64),
}

fn create_sequence(scene: &mut SceneGraph, draw: NodeId) -> SequenceNodes {
    let group = scene.create(draw, NodeKind::Group);
    scene.set_attr(group, "class", "sequence");
    let backgrounds = scene.create(group, NodeKind::Group);
    scene.set_attr(backgrounds, "class", "residue-backgrounds");
    let residues = scene.create(group, NodeKind::Group);
    scene.set_attr(residues, "class", "residues");
    let dots = scene.create(group, NodeKind::Group);
    scene.set_attr(dots, "class", "dots");
    SequenceNodes { group, backgrounds, residues, dots }
}

fn create_trace(scene: &mut SceneGraph, group: NodeId, trace: &InternalTrace) -> TraceNodes {
    scene.clear_children(group);
    scene.set_attr(group, "id", format!("trace-{}", trace.id));
    scene.set_attr(group, "class", "trace");
    let features = trace
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| create_feature(scene, group, FeatureKey::new(trace.id, index), feature))
        .collect();
    TraceNodes { group, grid_lines: Vec::new(), zero_line: None, features }
}

fn create_feature(scene: &mut SceneGraph, parent: NodeId, key: FeatureKey, feature: &Feature) -> FeatureNodes {
    let group = scene.create_keyed(parent, NodeKind::Group, &key.index.to_string());
    scene.set_attr(group, "id", format!("trace-{}", key));
    scene.set_attr(group, "class", format!("feature {}", feature.kind()));
    scene.set_handler(group, Handler::Feature(key));

    let style = feature.style();
    let color = style.color.as_deref();
    let opacity = style.opacity;
    let mut nodes = FeatureNodes { group, shape: None, label: None, clip_rect: None };

    match feature {
        Feature::Locus(_) => {
            let rect = scene.create(group, NodeKind::Rect);
            scene.set_attr(rect, "stroke", style.stroke_color.as_deref().unwrap_or("none"));
            scene.set_attr(rect, "stroke-opacity", 1.0);
            scene.set_attr(rect, "stroke-width", style.stroke_width.unwrap_or(0.0));
            scene.set_attr(rect, "fill", color.unwrap_or("white"));
            scene.set_attr(rect, "fill-opacity", opacity.unwrap_or(1.0));
            scene.set_attr(rect, "rx", 4.0);
            scene.set_attr(rect, "ry", 4.0);
            nodes.shape = Some(rect);
            if let Some(label) = style.label.as_deref() {
                let text = scene.create(group, NodeKind::Text);
                scene.set_attr(text, "dominant-baseline", "central");
                scene.set_attr(text, "text-anchor", "start");
                scene.set_text(text, label);
                nodes.label = Some(text);
            }
        }
        Feature::Continuous(c) => {
            let path = scene.create(group, NodeKind::Path);
            let stroke = style.stroke_color.as_deref().or(color).unwrap_or("black");
            scene.set_attr(path, "stroke", stroke);
            scene.set_attr(path, "stroke-opacity", opacity.unwrap_or(1.0));
            scene.set_attr(path, "stroke-width", style.stroke_width.unwrap_or(1.0));
            let fill = if c.show_area { color.unwrap_or("black") } else { "none" };
            scene.set_attr(path, "fill", fill);
            scene.set_attr(path, "fill-opacity", opacity.unwrap_or(1.0));
            nodes.shape = Some(path);
        }
        Feature::Pin(_) => {
            let circle = scene.create(group, NodeKind::Circle);
            scene.set_attr(circle, "stroke", style.stroke_color.as_deref().unwrap_or("none"));
            scene.set_attr(circle, "stroke-width", style.stroke_width.unwrap_or(0.0));
            scene.set_attr(circle, "fill", color.unwrap_or("black"));
            scene.set_attr(circle, "fill-opacity", opacity.unwrap_or(1.0));
            nodes.shape = Some(circle);
        }
        Feature::Poly(_) => {
            let polygon = scene.create(group, NodeKind::Polygon);
            scene.set_attr(polygon, "stroke", style.stroke_color.as_deref().unwrap_or("black"));
            scene.set_attr(polygon, "stroke-opacity", opacity.unwrap_or(1.0));
            scene.set_attr(polygon, "stroke-width", style.stroke_width.unwrap_or(1.0));
            scene.set_attr(polygon, "fill", color.unwrap_or("black"));
            scene.set_attr(polygon, "fill-opacity", opacity.unwrap_or(1.0));
            nodes.shape = Some(polygon);
        }
        Feature::Dssp(d) => match d.code.shape() {
            DsspShape::Sheet => {
                let polygon = scene.create(group, NodeKind::Polygon);
                scene.set_attr(polygon, "class", "sheet");
                scene.set_attr(polygon, "stroke", colors::darker_css(color.unwrap_or("white"), 0.5));
                scene.set_attr(polygon, "stroke-width", 2.0);
                scene.set_attr(polygon, "fill", color.unwrap_or("white"));
                scene.set_attr(polygon, "fill-opacity", opacity.unwrap_or(0.5));
                nodes.shape = Some(polygon);
            }
            DsspShape::Coil => {
                let path = scene.create(group, NodeKind::Path);
                scene.set_attr(path, "class", "coil");
                scene.set_attr(path, "stroke", color.unwrap_or("black"));
                scene.set_attr(path, "stroke-opacity", opacity.unwrap_or(0.5));
                scene.set_attr(path, "stroke-linecap", "square");
                scene.set_attr(path, "fill", "none");
                nodes.shape = Some(path);
            }
            DsspShape::Helix | DsspShape::Turn => {
                let clip_id = format!("clip-path-{}", key);
                let defs = scene.create(group, NodeKind::Defs);
                let clip = scene.create(defs, NodeKind::ClipPath);
                scene.set_attr(clip, "id", clip_id.as_str());
                nodes.clip_rect = Some(scene.create(clip, NodeKind::Rect));
                scene.set_attr(group, "clip-path", format!("url(#{})", clip_id));
            }
        },
    }
    nodes
}

/// Explicit text colour, then the settings text colour, then whatever
/// contrasts with the fill.
fn label_fill(feature: &Feature, settings: &Settings) -> String {
    let style = feature.style();
    if let Some(color) = style.text_color.as_deref().filter(|c| !c.is_empty()) {
        return color.to_string();
    }
    if !settings.text_color.is_empty() {
        return settings.text_color.clone();
    }
    let fill = Rgb::parse(style.color.as_deref().unwrap_or("black"));
    fill.map(|c| c.contrast_text()).unwrap_or(colors::BLACK).to_hex()
}

fn create_grid(scene: &mut SceneGraph, group: NodeId, trace: &InternalTrace) {
    scene.clear_children(group);
    scene.set_attr(group, "id", format!("grid-{}", trace.id));
    scene.set_attr(group, "class", "grid-line-group");
    let Some(options) = trace.options.as_ref() else { return };
    if options.grid {
        for (index, _) in options.grid_y_values.iter().enumerate() {
            let line = scene.create_keyed(group, NodeKind::Line, &format!("grid-line-{}", index));
            scene.set_attr(line, "class", "grid-line");
            scene.set_attr(line, "shape-rendering", "crispedges");
        }
    }
    if options.zero_line {
        let line = scene.create_keyed(group, NodeKind::Line, "zero-line");
        scene.set_attr(line, "class", "zero-line");
        scene.set_attr(line, "shape-rendering", "crispedges");
    }
}

fn collect_grid_nodes(scene: &SceneGraph, group: NodeId, nodes: &mut TraceNodes) {
    nodes.grid_lines.clear();
    nodes.zero_line = None;
    for &child in scene.children(group) {
        let Some(key) = scene.get(child).and_then(|n| n.key.as_deref()) else { continue };
        if key == "zero-line" {
            nodes.zero_line = Some(child);
        } else if let Some(index) = key.strip_prefix("grid-line-").and_then(|i| i.parse::<usize>().ok()) {
            nodes.grid_lines.push((index as f64, child));
        }
    }
}

fn update_grid(
    scene: &mut SceneGraph,
    nodes: &TraceNodes,
    trace: &InternalTrace,
    band: &Band,
    settings: &Settings,
    x1: f64,
    x2: f64,
) {
    let Some(options) = trace.options.as_ref() else { return };
    for &(index, line) in &nodes.grid_lines {
        let Some(&value) = options.grid_y_values.get(index as usize) else { continue };
        let y = band.rescale_value(value, &trace.domain);
        scene.set_attr(line, "x1", x1);
        scene.set_attr(line, "x2", x2);
        scene.set_attr(line, "y1", y);
        scene.set_attr(line, "y2", y);
        let stroke = options.grid_line_color.as_deref().unwrap_or(settings.grid_line_color.as_str());
        scene.set_attr(line, "stroke", stroke);
        scene.set_attr(line, "stroke-width", options.grid_line_width.unwrap_or(1.0));
    }
    if let Some(line) = nodes.zero_line {
        let y = band.rescale_value(0.0, &trace.domain);
        scene.set_attr(line, "x1", x1);
        scene.set_attr(line, "x2", x2);
        scene.set_attr(line, "y1", y);
        scene.set_attr(line, "y2", y);
        scene.set_attr(line, "stroke", options.zero_line_color.as_deref().unwrap_or("black"));
        scene.set_attr(line, "stroke-width", options.zero_line_width.unwrap_or(1.0));
    }
}

#[allow(clippy::too_many_arguments)]
fn update_sequence(
    scene: &mut SceneGraph,
    nodes: SequenceNodes,
    sequence: &Sequence,
    settings: &Settings,
    y: &OrdinalScale,
    x: &LinearScale,
    lod: LodLevel,
    dots: &[f64],
) {
    let band = y.band(RowKey::Sequence);
    let shown = settings.sequence_show && sequence.has_residues() && band.is_some();
    let Some(band) = band.filter(|_| shown) else {
        for group in [nodes.backgrounds, nodes.residues, nodes.dots] {
            scene.clear_children(group);
        }
        return;
    };
    let center = band.center();
    let text_color = settings.text_color.as_str();

    match lod {
        LodLevel::Dots => {
            scene.clear_children(nodes.backgrounds);
            scene.clear_children(nodes.residues);
            let keys: Vec<String> = (0..dots.len()).map(|i| i.to_string()).collect();
            let joined = scene.join(nodes.dots, NodeKind::Text, &keys);
            for ((_, node), position) in joined.nodes.iter().zip(dots) {
                if joined.is_entered(*node) {
                    scene.set_attr(*node, "class", "dot");
                    scene.set_attr(*node, "dominant-baseline", "central");
                    scene.set_attr(*node, "text-anchor", "middle");
                    scene.set_text(*node, ".");
                }
                scene.set_attr(*node, "x", x.apply(*position));
                scene.set_attr(*node, "y", center);
                scene.set_attr(*node, "fill", text_color);
            }
        }
        LodLevel::Residues => {
            scene.clear_children(nodes.dots);
            let (lo, hi) = sequence.window(x.domain.0, x.domain.1);
            let positions: Vec<usize> = (lo + 1..=hi).collect();
            let keys: Vec<String> = positions.iter().map(|p| p.to_string()).collect();

            let joined = scene.join(nodes.residues, NodeKind::Text, &keys);
            for ((_, node), &position) in joined.nodes.iter().zip(&positions) {
                if joined.is_entered(*node) {
                    scene.set_attr(*node, "class", "residue");
                    scene.set_attr(*node, "dominant-baseline", "central");
                    scene.set_attr(*node, "text-anchor", "middle");
                    if let Some(residue) = sequence.residue(position) {
                        scene.set_text(*node, residue.to_string());
                    }
                }
                scene.set_attr(*node, "x", x.apply(position as f64));
                scene.set_attr(*node, "y", center);
                scene.set_attr(*node, "fill", text_color);
            }

            let scheme = settings.sequence_background_color;
            if scheme.residue('X').is_none() {
                scene.clear_children(nodes.backgrounds);
                return;
            }
            let (top, height) = match settings.sequence_background_height {
                BackgroundHeight::Full => (band.y, (y.axis_position() - band.y).max(0.0)),
                BackgroundHeight::ContentSize => (band.y + (band.line_height - band.content_size) / 2.0, band.content_size),
                BackgroundHeight::LineHeight => (band.y, band.line_height),
            };
            let cell = x.cell_width();
            let joined = scene.join(nodes.backgrounds, NodeKind::Rect, &keys);
            for ((_, node), &position) in joined.nodes.iter().zip(&positions) {
                let fill = sequence
                    .residue(position)
                    .and_then(|r| scheme.residue(r))
                    .map(|c| c.background)
                    .unwrap_or("none");
                if joined.is_entered(*node) {
                    scene.set_attr(*node, "class", "residue");
                }
                scene.set_attr(*node, "x", x.apply(position as f64 - 0.5));
                scene.set_attr(*node, "y", top);
                scene.set_attr(*node, "width", cell);
                scene.set_attr(*node, "height", height);
                scene.set_attr(*node, "fill", fill);
                scene.set_attr(*node, "fill-opacity", settings.sequence_background_opacity);
            }
        }
    }
}

fn draw_feature(
    scene: &mut SceneGraph,
    coil: &mut CoilNoise,
    key: FeatureKey,
    feature: &Feature,
    nodes: &FeatureNodes,
    ctx: &DrawContext<'_>,
) {
    match feature {
        Feature::Locus(locus) => draw_locus(scene, feature, locus, nodes, ctx),
        Feature::Continuous(c) => draw_continuous(scene, c, nodes, ctx),
        Feature::Pin(pin) => draw_pin(scene, pin, nodes, ctx),
        Feature::Poly(poly) => draw_poly(scene, poly, nodes, ctx),
        Feature::Dssp(dssp) => draw_dssp(scene, coil, key, dssp, nodes, ctx),
    }
}

fn draw_locus(scene: &mut SceneGraph, feature: &Feature, locus: &Locus, nodes: &FeatureNodes, ctx: &DrawContext<'_>) {
    let g = LocusGeometry::compute(locus, ctx.x, ctx.band);
    if let Some(rect) = nodes.shape {
        scene.set_attr(rect, "x", g.x);
        scene.set_attr(rect, "y", g.y);
        scene.set_attr(rect, "width", g.width);
        scene.set_attr(rect, "height", g.height);
    }
    if let (Some(text), Some(label)) = (nodes.label, locus.style.label.as_deref()) {
        let label_width = ctx.settings.char_width * label.chars().count() as f64;
        scene.set_attr(text, "x", g.label_x);
        scene.set_attr(text, "y", g.label_y);
        scene.set_attr(text, "opacity", if g.label_fits(label_width) { 1.0 } else { 0.0 });
        scene.set_attr(text, "fill", label_fill(feature, ctx.settings));
    }
}

fn draw_continuous(scene: &mut SceneGraph, feature: &Continuous, nodes: &FeatureNodes, ctx: &DrawContext<'_>) {
    let Some(path) = nodes.shape else { return };
    let points = project_points(&continuous_points(feature), ctx.x, ctx.band, ctx.domain);
    let curve = feature.curve_type.unwrap_or_default();
    let d = if feature.show_area {
        area_path(&points, ctx.band.bottom(), curve)
    } else {
        line_path(&points, curve)
    };
    scene.set_attr(path, "d", d);
}

fn draw_pin(scene: &mut SceneGraph, pin: &Pin, nodes: &FeatureNodes, ctx: &DrawContext<'_>) {
    let Some(circle) = nodes.shape else { return };
    let radius = mark_radius(pin.adjust_to_width, pin.radius, ctx.band.content_size, ctx.x.cell_width());
    scene.set_attr(circle, "cx", ctx.x.apply(pin.position as f64));
    scene.set_attr(circle, "cy", ctx.band.center());
    scene.set_attr(circle, "r", radius);
}

fn draw_poly(scene: &mut SceneGraph, poly: &Poly, nodes: &FeatureNodes, ctx: &DrawContext<'_>) {
    let Some(polygon) = nodes.shape else { return };
    let radius = mark_radius(poly.adjust_to_width, poly.radius, ctx.band.content_size, ctx.x.cell_width());
    let points = polygon_points(ctx.x.apply(poly.position as f64), ctx.band.center(), radius, poly.sides());
    scene.set_attr(polygon, "points", format_points(&points));
}

fn draw_dssp(
    scene: &mut SceneGraph,
    coil: &mut CoilNoise,
    key: FeatureKey,
    dssp: &Dssp,
    nodes: &FeatureNodes,
    ctx: &DrawContext<'_>,
) {
    let shape = dssp.code.shape();
    let (start_point, end_point) = ctx.window;
    let cs = ctx.band.content_size;
    let center = ctx.band.center();
    let tiling = DsspTiling::compute(shape, start_point, end_point, ctx.x, cs);

    match shape {
        DsspShape::Helix | DsspShape::Turn => {
            let color = dssp.style.color.as_deref();
            let keys: Vec<String> = (0..tiling.x_positions.len()).map(|i| i.to_string()).collect();
            let joined = scene.join(nodes.group, NodeKind::Path, &keys);
            for (index, (_, tile)) in joined.nodes.iter().enumerate() {
                if joined.is_entered(*tile) {
                    scene.set_attr(*tile, "class", shape.as_str());
                    if let Some(d) = glyph_path(shape) {
                        scene.set_attr(*tile, "d", d);
                    }
                    scene.set_attr(*tile, "stroke", colors::darker_css(color.unwrap_or("white"), 0.5));
                    let stroke_width = if shape == DsspShape::Helix { 0.1 } else { 0.7 };
                    scene.set_attr(*tile, "stroke-width", stroke_width);
                    scene.set_attr(*tile, "fill", color.unwrap_or("black"));
                }
                scene.set_attr(*tile, "fill-opacity", tile_opacity(dssp.style.opacity, index));
                scene.set_attr(*tile, "transform", tiling.tile_transform(shape, index, ctx.x, center, cs));
            }
            if let Some(rect) = nodes.clip_rect {
                scene.set_attr(rect, "x", ctx.x.apply(start_point));
                scene.set_attr(rect, "y", ctx.band.top());
                scene.set_attr(rect, "width", tiling.total_width.max(0.0));
                scene.set_attr(rect, "height", cs);
            }
        }
        DsspShape::Sheet => {
            let Some(polygon) = nodes.shape else { return };
            let points = sheet_arrow(ctx.x.apply(start_point), ctx.x.apply(end_point), center, cs);
            scene.set_attr(polygon, "points", format_points(&points));
        }
        DsspShape::Coil => {
            let Some(path) = nodes.shape else { return };
            let width = coil_stroke_width(cs);
            scene.set_attr(path, "stroke-width", width);
            scene.set_attr(path, "stroke-dasharray", format!("{}, {}", width, width * 1.5));
            let positions = &tiling.x_positions;
            let samples = coil.samples(key, positions.len() + 1, ctx.domain);
            let mut points: Vec<(f64, f64)> = positions.iter().copied().zip(samples.iter().copied()).collect();
            if let Some(&last) = samples.last() {
                points.push((end_point, last));
            }
            let projected = project_points(&points, ctx.x, ctx.band, ctx.domain);
            scene.set_attr(path, "d", line_path(&projected, CurveType::Basis));
        }
    }
}
