//! Scene manager
//!
//! Owns the drawing surface and its fixed layers, the margin box, the
//! horizontal zoom state, the brush, the selection shadow and the hover
//! marker. Zoom, pan and brush only ever change the x domain.

use featview_core::{LinearScale, OrdinalScale, RowKey, Settings, Span, ZoomTransform};

use crate::curve::fmt_num;
use crate::scene::{NodeId, NodeKind, SceneGraph};

/// Zooming stops once fewer positions than this would be visible
pub const MIN_VISIBLE_POSITIONS: f64 = 5.0;
/// Brushes narrower than this many pixels are treated as clicks
pub const MIN_BRUSH_WIDTH: f64 = 2.0;
const AXIS_TICK_COUNT: usize = 10;
const AXIS_TICK_SIZE: f64 = 6.0;
const CLIP_ID: &str = "featview-clip";
const MASK_ID: &str = "featview-mask";

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            top: settings.margin_top,
            right: settings.margin_right,
            bottom: settings.margin_bottom,
            left: settings.margin_left,
        }
    }
}

/// Fixed nodes created once with the manager
#[derive(Debug, Clone, Copy)]
pub struct Layers {
    pub clip_rect: NodeId,
    pub mask_rect: NodeId,
    pub background: NodeId,
    pub plot_background: NodeId,
    pub focus: NodeId,
    pub events: NodeId,
    pub grid: NodeId,
    pub draw: NodeId,
    pub shadow: NodeId,
    pub brush: NodeId,
    pub brush_selection: NodeId,
    pub hover_marker: NodeId,
    pub x_axis: NodeId,
    pub x_axis_domain: NodeId,
    pub x_axis_ticks: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Brush {
    origin: f64,
    current: f64,
}

#[derive(Debug)]
pub struct SceneManager {
    scene: SceneGraph,
    layers: Layers,
    width: f64,
    requested_height: f64,
    content_height: f64,
    margin: Margin,
    base_x: LinearScale,
    sequence_length: usize,
    transform: ZoomTransform,
    brush: Option<Brush>,
    shadow: Option<Span>,
    text_color: String,
    x_axis_show: bool,
}

impl SceneManager {
    pub fn new(width: f64, height: f64, settings: &Settings) -> Self {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        scene.set_attr(root, "xmlns", "http://www.w3.org/2000/svg");

        let defs = scene.create(root, NodeKind::Defs);
        let clip = scene.create(defs, NodeKind::ClipPath);
        scene.set_attr(clip, "id", CLIP_ID);
        let clip_rect = scene.create(clip, NodeKind::Rect);

        let mask = scene.create(defs, NodeKind::Mask);
        scene.set_attr(mask, "id", MASK_ID);
        let mask_fill = scene.create(mask, NodeKind::Rect);
        scene.set_attr(mask_fill, "width", "100%");
        scene.set_attr(mask_fill, "height", "100%");
        scene.set_attr(mask_fill, "fill", "white");
        let mask_rect = scene.create(mask, NodeKind::Rect);
        scene.set_attr(mask_rect, "fill", "black");

        let background = scene.create(root, NodeKind::Rect);
        scene.set_attr(background, "id", "background");
        scene.set_attr(background, "class", "background");
        scene.set_attr(background, "width", "100%");
        scene.set_attr(background, "height", "100%");
        scene.set_attr(background, "mask", format!("url(#{})", MASK_ID));

        let plot_background = scene.create(root, NodeKind::Rect);
        scene.set_attr(plot_background, "id", "plot-background");
        scene.set_attr(plot_background, "width", "100%");
        scene.set_attr(plot_background, "height", "100%");
        scene.set_attr(plot_background, "clip-path", format!("url(#{})", CLIP_ID));

        let focus = scene.create(root, NodeKind::Group);
        scene.set_attr(focus, "class", "focus");

        // Event capture sits below the features so hover reaches them first
        let events = scene.create(focus, NodeKind::Rect);
        scene.set_attr(events, "class", "zoom");
        scene.set_attr(events, "fill", "none");
        scene.set_attr(events, "pointer-events", "all");

        let grid = scene.create(focus, NodeKind::Group);
        scene.set_attr(grid, "class", "grid");

        let draw = scene.create(focus, NodeKind::Group);
        scene.set_attr(draw, "class", "features");
        scene.set_attr(draw, "clip-path", format!("url(#{})", CLIP_ID));

        let shadow = scene.create(draw, NodeKind::Rect);
        scene.set_attr(shadow, "id", "shadow");
        scene.set_attr(shadow, "fill", "black");
        scene.set_attr(shadow, "fill-opacity", 0.15);
        scene.set_attr(shadow, "height", "100%");
        scene.set_attr(shadow, "x", 0.0);
        scene.set_attr(shadow, "width", 0.0);

        let brush = scene.create(focus, NodeKind::Group);
        scene.set_attr(brush, "class", "brush");
        let brush_selection = scene.create(brush, NodeKind::Rect);
        scene.set_attr(brush_selection, "class", "selection");
        scene.set_attr(brush_selection, "fill", "#777");
        scene.set_attr(brush_selection, "fill-opacity", 0.3);
        scene.set_display(brush_selection, false);

        let hover_marker = scene.create(root, NodeKind::Circle);
        scene.set_attr(hover_marker, "class", "hover-circle-marker");
        scene.set_attr(hover_marker, "r", 4.0);
        scene.set_attr(hover_marker, "fill", "none");
        scene.set_attr(hover_marker, "stroke-width", 1.5);
        scene.set_display(hover_marker, false);

        let x_axis = scene.create(root, NodeKind::Group);
        scene.set_attr(x_axis, "class", "x axis");
        let x_axis_domain = scene.create(x_axis, NodeKind::Line);
        scene.set_attr(x_axis_domain, "class", "domain");
        let x_axis_ticks = scene.create(x_axis, NodeKind::Group);
        scene.set_attr(x_axis_ticks, "class", "ticks");

        let layers = Layers {
            clip_rect,
            mask_rect,
            background,
            plot_background,
            focus,
            events,
            grid,
            draw,
            shadow,
            brush,
            brush_selection,
            hover_marker,
            x_axis,
            x_axis_domain,
            x_axis_ticks,
        };

        let mut manager = Self {
            scene,
            layers,
            width: width.max(0.0),
            requested_height: height.max(0.0),
            content_height: 0.0,
            margin: Margin::from_settings(settings),
            base_x: LinearScale::new((0.0, 1.0), (0.0, 0.0)),
            sequence_length: 0,
            transform: ZoomTransform::IDENTITY,
            brush: None,
            shadow: None,
            text_color: settings.text_color.clone(),
            x_axis_show: settings.x_axis_show,
        };
        manager.apply_settings(settings);
        manager
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    pub fn margin(&self) -> Margin {
        self.margin
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.requested_height.max(self.content_height)
    }

    /// Left edge of the plot area.
    pub fn x1(&self) -> f64 {
        self.margin.left
    }

    /// Right edge of the plot area.
    pub fn x2(&self) -> f64 {
        (self.width - self.margin.right).max(self.margin.left)
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    /// Horizontal scale as seen through the current zoom.
    pub fn x_scale(&self) -> LinearScale {
        self.base_x.rescale(&self.transform)
    }

    /// Restyle background layers and re-derive the margin box.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.margin = Margin::from_settings(settings);
        self.text_color = settings.text_color.clone();
        self.x_axis_show = settings.x_axis_show;
        let layers = self.layers;
        self.scene.set_attr(layers.background, "fill", settings.background_color.as_str());
        self.scene.set_attr(layers.plot_background, "fill", settings.plot_background_color.as_str());
        self.scene.set_attr(layers.hover_marker, "stroke", settings.text_color.as_str());
        self.layout();
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.requested_height = height.max(0.0);
        self.layout();
    }

    /// Grow the surface to fit rows ending at `plot_bottom`.
    pub fn fit_content(&mut self, plot_bottom: f64) {
        self.content_height = (plot_bottom + self.margin.bottom).max(0.0);
        self.layout();
    }

    /// Set the x domain to `[0, length + 1]` and reset zoom.
    pub fn set_sequence_length(&mut self, length: usize) {
        self.sequence_length = length;
        self.base_x.domain = (0.0, length as f64 + 1.0);
        self.transform = ZoomTransform::IDENTITY;
    }

    fn layout(&mut self) {
        let (x1, x2) = (self.x1(), self.x2());
        self.base_x.range = (x1, x2);
        self.transform = self.constrain(self.transform);

        let top = self.margin.top;
        let plot_height = (self.height() - self.margin.top - self.margin.bottom).max(0.0);
        let layers = self.layers;
        for node in [layers.clip_rect, layers.mask_rect, layers.events] {
            self.scene.set_attr(node, "x", x1);
            self.scene.set_attr(node, "y", top);
            self.scene.set_attr(node, "width", x2 - x1);
            self.scene.set_attr(node, "height", plot_height);
        }
        let root = self.scene.root();
        self.scene.set_attr(root, "width", self.width);
        self.scene.set_attr(root, "height", self.height());
    }

    fn max_zoom(&self) -> f64 {
        ((self.sequence_length as f64 + 1.0) / MIN_VISIBLE_POSITIONS).max(1.0)
    }

    fn constrain(&self, t: ZoomTransform) -> ZoomTransform {
        let k = if t.k.is_finite() { t.k.clamp(1.0, self.max_zoom()) } else { 1.0 };
        let (x1, x2) = (self.x1(), self.x2());
        let lo = x2 * (1.0 - k);
        let hi = x1 * (1.0 - k);
        let tx = if t.tx.is_finite() { t.tx.clamp(lo.min(hi), hi.max(lo)) } else { 0.0 };
        ZoomTransform { k, tx }
    }

    fn set_transform(&mut self, t: ZoomTransform) -> bool {
        let t = self.constrain(t);
        let changed = t != self.transform;
        self.transform = t;
        changed
    }

    /// Zoom by `factor` keeping the pixel `anchor` fixed. Returns whether
    /// the transform changed.
    pub fn zoom_at(&mut self, factor: f64, anchor: f64) -> bool {
        let current = self.transform;
        let k = current.k * factor;
        let world = current.invert_x(anchor);
        self.set_transform(ZoomTransform::new(k, anchor - world * k))
    }

    pub fn pan_by(&mut self, dx: f64) -> bool {
        let current = self.transform;
        self.set_transform(ZoomTransform::new(current.k, current.tx + dx))
    }

    /// Double-click behaviour: back to the full extent.
    pub fn reset_zoom(&mut self) -> bool {
        self.set_transform(ZoomTransform::IDENTITY)
    }

    /// Zoom so that the pixel range `[px0, px1]` fills the plot width.
    pub fn zoom_to_pixels(&mut self, px0: f64, px1: f64) -> bool {
        let (px0, px1) = if px0 <= px1 { (px0, px1) } else { (px1, px0) };
        let x = self.x_scale();
        let (d0, d1) = (x.invert(px0), x.invert(px1));
        let (b0, b1) = (self.base_x.apply(d0), self.base_x.apply(d1));
        if b1 - b0 <= 0.0 {
            return false;
        }
        let k = (self.x2() - self.x1()) / (b1 - b0);
        self.set_transform(ZoomTransform::new(k, self.x1() - b0 * k))
    }

    pub fn brush_start(&mut self, px: f64) {
        self.brush = Some(Brush { origin: px, current: px });
        self.draw_brush();
    }

    pub fn brush_move(&mut self, px: f64) {
        if let Some(brush) = self.brush.as_mut() {
            brush.current = px.clamp(self.margin.left, (self.width - self.margin.right).max(self.margin.left));
        }
        self.draw_brush();
    }

    /// Finish the brush, zooming to it when wide enough.
    pub fn brush_end(&mut self) -> bool {
        let brush = self.brush.take();
        self.scene.set_display(self.layers.brush_selection, false);
        match brush {
            Some(b) if (b.current - b.origin).abs() >= MIN_BRUSH_WIDTH => self.zoom_to_pixels(b.origin, b.current),
            _ => false,
        }
    }

    fn draw_brush(&mut self) {
        let node = self.layers.brush_selection;
        let Some(brush) = self.brush else {
            self.scene.set_display(node, false);
            return;
        };
        let plot_height = (self.height() - self.margin.top - self.margin.bottom).max(0.0);
        self.scene.set_display(node, true);
        self.scene.set_attr(node, "x", brush.origin.min(brush.current));
        self.scene.set_attr(node, "y", self.margin.top);
        self.scene.set_attr(node, "width", (brush.current - brush.origin).abs());
        self.scene.set_attr(node, "height", plot_height);
    }

    /// Rounded inverse of the pointer x and the row's pixel offset.
    pub fn get_coordinates(&self, pointer_x: f64, row: RowKey, y: &OrdinalScale) -> Option<(i64, f64)> {
        let position = (self.x_scale().invert(pointer_x) + 0.5).floor() as i64;
        y.position(row).map(|offset| (position, offset.round()))
    }

    pub fn shadow(&self) -> Option<Span> {
        self.shadow
    }

    pub fn set_shadow(&mut self, range: Option<Span>) {
        self.shadow = range;
        self.update_shadow();
    }

    /// Re-position the shadow under the current zoom.
    pub fn update_shadow(&mut self) {
        let node = self.layers.shadow;
        match self.shadow {
            Some(range) => {
                let x = self.x_scale();
                self.scene.set_attr(node, "x", x.apply(range.start));
                self.scene.set_attr(node, "width", x.apply(range.end) - x.apply(range.start));
            }
            None => {
                self.scene.set_attr(node, "x", 0.0);
                self.scene.set_attr(node, "width", 0.0);
            }
        }
    }

    pub fn show_hover_marker(&mut self, cx: f64, cy: f64) {
        let node = self.layers.hover_marker;
        self.scene.set_attr(node, "cx", cx);
        self.scene.set_attr(node, "cy", cy);
        self.scene.set_display(node, true);
    }

    pub fn hide_hover_marker(&mut self) {
        self.scene.set_display(self.layers.hover_marker, false);
    }

    /// Place the x axis at `y_position` and refresh its ticks.
    pub fn update_axis(&mut self, y_position: f64) {
        let layers = self.layers;
        if !self.x_axis_show {
            self.scene.set_display(layers.x_axis, false);
            return;
        }
        self.scene.set_display(layers.x_axis, true);
        self.scene.set_attr(layers.x_axis, "transform", format!("translate(0, {})", fmt_num(y_position)));

        let (x1, x2) = (self.x1(), self.x2());
        self.scene.set_attr(layers.x_axis_domain, "x1", x1);
        self.scene.set_attr(layers.x_axis_domain, "x2", x2);
        self.scene.set_attr(layers.x_axis_domain, "stroke", self.text_color.as_str());

        let x = self.x_scale();
        let upper = (self.sequence_length as f64).min(x.domain.1);
        let lower = x.domain.0.max(1.0);
        let ticks: Vec<f64> = if upper >= lower {
            nice_ticks(lower, upper, AXIS_TICK_COUNT)
        } else {
            Vec::new()
        };
        let keys: Vec<String> = ticks.iter().map(|t| fmt_num(*t)).collect();
        let join = self.scene.join(layers.x_axis_ticks, NodeKind::Group, &keys);
        for ((label, tick), value) in join.nodes.iter().zip(&ticks) {
            if join.is_entered(*tick) {
                let line = self.scene.create(*tick, NodeKind::Line);
                self.scene.set_attr(line, "y2", AXIS_TICK_SIZE);
                let text = self.scene.create(*tick, NodeKind::Text);
                self.scene.set_attr(text, "y", AXIS_TICK_SIZE + 3.0);
                self.scene.set_attr(text, "dy", "0.71em");
                self.scene.set_attr(text, "text-anchor", "middle");
                self.scene.set_text(text, label.clone());
            }
            self.scene.set_attr(*tick, "transform", format!("translate({}, 0)", fmt_num(x.apply(*value))));
            for child in self.scene.children(*tick).to_vec() {
                let attr = match self.scene.get(child).map(|n| n.kind) {
                    Some(NodeKind::Line) => "stroke",
                    _ => "fill",
                };
                self.scene.set_attr(child, attr, self.text_color.as_str());
            }
        }
    }
}

/// Round to a "nice" number: 1, 2 or 5 times a power of ten.
pub fn nice_round_length(x: f64) -> f64 {
    if x <= 0.0 || !x.is_finite() {
        return 1.0;
    }
    let exp = x.log10().floor();
    let base = 10f64.powf(exp);
    let mant = x / base;
    let nice = if mant <= 1.0 {
        1.0
    } else if mant <= 2.0 {
        2.0
    } else if mant <= 5.0 {
        5.0
    } else {
        10.0
    };
    nice * base
}

/// Integer tick positions at a nice step covering `[min, max]`.
pub fn nice_ticks(min: f64, max: f64, desired: usize) -> Vec<f64> {
    let span = (max - min).max(1.0);
    let step = nice_round_length(span / desired.max(1) as f64).max(1.0);
    let mut ticks = Vec::new();
    let mut v = (min / step).ceil() * step;
    while v <= max + 1e-9 {
        ticks.push(v);
        v += step;
    }
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SceneManager {
        let settings = Settings { margin_left: 10.0, margin_right: 10.0, ..Settings::default() };
        let mut m = SceneManager::new(120.0, 200.0, &settings);
        m.set_sequence_length(99);
        m
    }

    #[test]
    fn test_plot_box_and_scale() {
        let m = manager();
        assert_eq!(m.x1(), 10.0);
        assert_eq!(m.x2(), 110.0);
        let x = m.x_scale();
        assert_eq!(x.domain, (0.0, 100.0));
        assert_eq!(x.cell_width(), 1.0);
        let clip = m.layers().clip_rect;
        assert_eq!(m.scene().num_attr(clip, "width"), Some(100.0));
    }

    #[test]
    fn test_zoom_pan_constraints() {
        let mut m = manager();
        assert!(!m.zoom_at(0.5, 60.0));
        assert!(m.zoom_at(2.0, 60.0));
        let x = m.x_scale();
        assert!((x.domain.0 - 25.0).abs() < 1e-9);
        assert!((x.domain.1 - 75.0).abs() < 1e-9);

        // Panning stops at the sequence extent
        m.pan_by(1000.0);
        assert!((m.x_scale().domain.0 - 0.0).abs() < 1e-9);
        m.pan_by(-1000.0);
        assert!((m.x_scale().domain.1 - 100.0).abs() < 1e-9);

        // Zoom is capped so a few positions remain visible
        m.zoom_at(1e6, 60.0);
        let x = m.x_scale();
        assert!((x.domain.1 - x.domain.0 - MIN_VISIBLE_POSITIONS).abs() < 1e-9);

        assert!(m.reset_zoom());
        assert_eq!(m.x_scale().domain, (0.0, 100.0));
    }

    #[test]
    fn test_brush_zooms_to_range() {
        let mut m = manager();
        m.brush_start(30.0);
        m.brush_move(50.0);
        assert!(m.scene().is_displayed(m.layers().brush_selection));
        assert!(m.brush_end());
        let x = m.x_scale();
        assert!((x.domain.0 - 20.0).abs() < 1e-9);
        assert!((x.domain.1 - 40.0).abs() < 1e-9);
        assert!(!m.scene().is_displayed(m.layers().brush_selection));

        m.brush_start(30.0);
        assert!(!m.brush_end());
    }

    #[test]
    fn test_shadow_and_coordinates() {
        let mut m = manager();
        m.set_shadow(Some(Span::new(9.5, 10.5)));
        let shadow = m.layers().shadow;
        assert_eq!(m.scene().num_attr(shadow, "x"), Some(19.5));
        assert_eq!(m.scene().num_attr(shadow, "width"), Some(1.0));
        m.set_shadow(None);
        assert_eq!(m.scene().num_attr(shadow, "width"), Some(0.0));

        let y = OrdinalScale::default();
        assert_eq!(m.get_coordinates(20.2, RowKey::Sequence, &y), None);
    }

    #[test]
    fn test_settings_restyle_backgrounds() {
        let mut m = manager();
        let settings = Settings { background_color: "#eeeeee".into(), ..Settings::default() };
        m.apply_settings(&settings);
        let bg = m.layers().background;
        assert_eq!(m.scene().str_attr(bg, "fill"), Some("#eeeeee"));
    }

    #[test]
    fn test_axis_ticks() {
        assert_eq!(nice_ticks(1.0, 100.0, 10), (1..=10).map(|i| i as f64 * 10.0).collect::<Vec<_>>());
        assert_eq!(nice_round_length(3.0), 5.0);

        let mut m = manager();
        m.update_axis(150.0);
        let ticks = m.layers().x_axis_ticks;
        let before: Vec<NodeId> = m.scene().children(ticks).to_vec();
        assert_eq!(before.len(), 9);
        m.resize(220.0, 200.0);
        m.update_axis(150.0);
        assert_eq!(m.scene().children(ticks), before.as_slice());
    }
}
