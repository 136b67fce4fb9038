/*!
# Viewer

Wires the trace model, scales, scene manager, render pipeline, tooltip and
selection channel into one event-driven object. Mutating calls only record
state; [`Viewer::render`] brings the scene up to date, running the
structural phase when the visible traces changed and the positional phase
every time.
*/

use std::path::Path;

use featview_core::{
    recompute_y_scale, Feature, FeatureKey, OrdinalScale, PartialSettings, Result, RowKey, Sequence, Settings,
    Trace, TraceId, TraceModel,
};

use crate::export::{ExportConfig, SvgExporter};
use crate::manager::SceneManager;
use crate::pipeline::RenderPipeline;
use crate::scene::{Handler, NodeId};
use crate::selection::{SelectionChannel, SelectionContext};
use crate::tooltip::TooltipController;

/// Where a host should place the labels of one trace
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelLayout {
    pub trace: TraceId,
    pub top: f64,
    pub height: f64,
    pub left_width: f64,
    pub right_width: f64,
}

/// Pointer input against rendered nodes, in surface pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Enter { target: NodeId, x: f64, y: f64 },
    Move { target: NodeId, x: f64, y: f64 },
    Leave,
    Click { target: Option<NodeId>, x: f64, now_ms: u64 },
    DoubleClick,
}

pub struct Viewer {
    model: TraceModel,
    sequence: Sequence,
    settings: Settings,
    manager: SceneManager,
    pipeline: RenderPipeline,
    y: OrdinalScale,
    tooltip: TooltipController,
    selection: SelectionChannel,
    /// Continuous feature and position under the hover marker
    hover: Option<(FeatureKey, i64)>,
}

impl Viewer {
    pub fn new(width: f64, height: f64) -> Self {
        Self::with_settings(width, height, &PartialSettings::default())
    }

    pub fn with_settings(width: f64, height: f64, partial: &PartialSettings) -> Self {
        let settings = Settings::default().merged(partial);
        Self {
            model: TraceModel::new(),
            sequence: Sequence::default(),
            manager: SceneManager::new(width, height, &settings),
            pipeline: RenderPipeline::new(settings.coil_seed),
            y: OrdinalScale::default(),
            tooltip: TooltipController::new(),
            selection: SelectionChannel::new(),
            hover: None,
            settings,
        }
    }

    pub fn model(&self) -> &TraceModel {
        &self.model
    }

    pub fn manager(&self) -> &SceneManager {
        &self.manager
    }

    pub fn pipeline(&self) -> &RenderPipeline {
        &self.pipeline
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn y_scale(&self) -> &OrdinalScale {
        &self.y
    }

    pub fn tooltip(&self) -> &TooltipController {
        &self.tooltip
    }

    /// Last selection delivered through the channel.
    pub fn selection(&self) -> Option<&SelectionContext> {
        self.selection.current()
    }

    /// Replace every trace. Ids restart, so all trace nodes are rebuilt.
    pub fn set_traces(&mut self, traces: Vec<Trace>) {
        self.model.set_traces(traces);
        self.pipeline.reset(self.manager.scene_mut());
        self.tooltip.on_leave();
        self.hover = None;
        self.manager.hide_hover_marker();
        self.selection.clear();
        self.manager.set_shadow(None);
    }

    pub fn set_sequence(&mut self, sequence: Sequence) {
        self.manager.set_sequence_length(sequence.len());
        self.sequence = sequence;
    }

    /// Merge `partial` over the current settings.
    pub fn set_settings(&mut self, partial: &PartialSettings) {
        self.settings = self.settings.merged(partial);
        self.manager.apply_settings(&self.settings);
        self.pipeline.set_coil_seed(self.settings.coil_seed);
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.manager.resize(width, height);
    }

    pub fn zoom_at(&mut self, factor: f64, anchor: f64) -> bool {
        self.manager.zoom_at(factor, anchor)
    }

    pub fn pan_by(&mut self, dx: f64) -> bool {
        self.manager.pan_by(dx)
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.manager.reset_zoom()
    }

    pub fn brush_start(&mut self, px: f64) {
        self.manager.brush_start(px);
    }

    pub fn brush_move(&mut self, px: f64) {
        self.manager.brush_move(px);
    }

    pub fn brush_end(&mut self) -> bool {
        self.manager.brush_end()
    }

    pub fn toggle_expansion(&mut self, id: TraceId) -> Result<bool> {
        self.model.toggle_expansion(id)
    }

    /// Bring the scene up to date.
    ///
    /// The vertical scale is recomputed first, so a trace that cannot be
    /// resolved fails the call before any node changes.
    pub fn render(&mut self) -> Result<()> {
        let visible = self.model.visible_traces();
        let sequence_shown = self.settings.sequence_show && self.sequence.has_residues();
        let y = recompute_y_scale(&visible, &self.model, &self.settings, sequence_shown)?;
        self.manager.fit_content(y.axis_position());
        self.pipeline
            .structure(&mut self.manager, &self.model, &visible)?;
        self.pipeline
            .update(&mut self.manager, &self.model, &self.sequence, &y, &self.settings)?;
        self.y = y;
        self.refresh_hover_marker()
    }

    /// Follow the hovered sample through the new scales, hiding the marker
    /// while its feature is culled.
    fn refresh_hover_marker(&mut self) -> Result<()> {
        let Some((key, position)) = self.hover else {
            return Ok(());
        };
        let marker = if self.pipeline.is_offscreen(&key) {
            None
        } else {
            self.hover_marker_at(key, position)?
        };
        match marker {
            Some((cx, cy)) => self.manager.show_hover_marker(cx, cy),
            None => self.manager.hide_hover_marker(),
        }
        Ok(())
    }

    fn feature_at(&self, target: NodeId) -> Option<FeatureKey> {
        match self.manager.scene().resolve_handler(target)? {
            Handler::Feature(key) => Some(key),
        }
    }

    /// Sequence position under the pointer, rounded to the nearest cell.
    fn position_at(&self, key: FeatureKey, x: f64) -> i64 {
        self.manager
            .get_coordinates(x, RowKey::Trace(key.trace), &self.y)
            .map(|(position, _)| position)
            .unwrap_or_else(|| (self.manager.x_scale().invert(x) + 0.5).floor() as i64)
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<()> {
        match event {
            PointerEvent::Enter { target, x, y } | PointerEvent::Move { target, x, y } => {
                let Some(key) = self.feature_at(target) else {
                    return Ok(());
                };
                let position = self.position_at(key, x);
                let trace = self.model.get_trace(key.trace)?;
                if matches!(event, PointerEvent::Enter { .. }) {
                    self.tooltip.on_enter(trace, key.index, (x, y), position);
                } else {
                    self.tooltip.on_move(trace, key.index, (x, y), position);
                    self.move_hover_marker(key, position)?;
                }
            }
            PointerEvent::Leave => {
                self.tooltip.on_leave();
                self.hover = None;
                self.manager.hide_hover_marker();
            }
            PointerEvent::Click { target, x, now_ms } => {
                let selection = match target.and_then(|t| self.feature_at(t)) {
                    Some(key) => {
                        let feature = self.model.get_feature(key)?;
                        let range = feature.selection_range(self.position_at(key, x));
                        Some(SelectionContext::new(key, range))
                    }
                    None => None,
                };
                self.selection.publish(selection, now_ms);
            }
            PointerEvent::DoubleClick => {
                self.manager.reset_zoom();
            }
        }
        Ok(())
    }

    fn hover_marker_at(&self, key: FeatureKey, position: i64) -> Result<Option<(f64, f64)>> {
        let trace = self.model.get_trace(key.trace)?;
        Ok(match (trace.feature(key.index), self.y.band(RowKey::Trace(key.trace))) {
            (Some(Feature::Continuous(c)), Some(band)) => c
                .value_at(position)
                .map(|v| (self.manager.x_scale().apply(position as f64), band.rescale_value(v, &trace.domain))),
            _ => None,
        })
    }

    fn move_hover_marker(&mut self, key: FeatureKey, position: i64) -> Result<()> {
        match self.hover_marker_at(key, position)? {
            Some((cx, cy)) => {
                self.hover = Some((key, position));
                self.manager.show_hover_marker(cx, cy);
            }
            None => {
                self.hover = None;
                self.manager.hide_hover_marker();
            }
        }
        Ok(())
    }

    /// Deliver a settled selection and move the shadow to it.
    pub fn tick(&mut self, now_ms: u64) -> Option<Option<SelectionContext>> {
        let delivered = self.selection.poll(now_ms)?;
        self.manager.set_shadow(delivered.map(|s| s.range));
        Some(delivered)
    }

    /// Label boxes for every visible trace.
    pub fn label_layouts(&self) -> Vec<LabelLayout> {
        let margin = self.manager.margin();
        self.model
            .visible_traces()
            .into_iter()
            .filter_map(|id| {
                let band = self.y.band(RowKey::Trace(id))?;
                Some(LabelLayout {
                    trace: id,
                    top: band.y,
                    height: band.line_height,
                    left_width: margin.left,
                    right_width: margin.right,
                })
            })
            .collect()
    }

    pub fn to_svg(&self, config: ExportConfig) -> String {
        SvgExporter::new(config).to_svg_string(&self.manager)
    }

    pub fn export_svg<P: AsRef<Path>>(&self, path: P, config: ExportConfig) -> anyhow::Result<()> {
        SvgExporter::new(config).export_svg(path, &self.manager)
    }

    /// Release pipeline state and clear any selection.
    pub fn dispose(&mut self) {
        self.pipeline.dispose(self.manager.scene_mut());
        self.tooltip.on_leave();
        self.selection.clear();
        self.manager.set_shadow(None);
        self.hover = None;
        self.manager.hide_hover_marker();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use featview_core::feature::Continuous;
    use featview_core::FeatureStyle;

    fn viewer() -> Viewer {
        let mut viewer = Viewer::with_settings(
            230.0,
            100.0,
            &PartialSettings { margin_left: Some(20.0), margin_right: Some(10.0), ..Default::default() },
        );
        viewer.set_sequence(Sequence::from("MKTAYIAKQRQISFVKSHF"));
        let curve = Feature::Continuous(Continuous {
            values: vec![0.0, 10.0, 5.0],
            min: None,
            max: None,
            curve_type: None,
            show_area: false,
            style: FeatureStyle::default(),
        });
        viewer.set_traces(vec![
            Trace::new("parent").with_nested(vec![Trace::new("child")]),
            Trace::new("curve").with_features(vec![curve]),
        ]);
        viewer.render().unwrap();
        viewer
    }

    #[test]
    fn test_label_layouts_follow_visibility() {
        let mut viewer = viewer();
        let labels = viewer.label_layouts();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].top, 32.0);
        assert_eq!(labels[0].left_width, 20.0);
        assert_eq!(labels[0].right_width, 10.0);
        assert_eq!(labels[1].trace, 2);

        viewer.toggle_expansion(0).unwrap();
        viewer.render().unwrap();
        let ids: Vec<TraceId> = viewer.label_layouts().iter().map(|l| l.trace).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(viewer.pipeline().stats().structural_passes, 2);
    }

    #[test]
    fn test_continuous_hover_marker() {
        let mut viewer = viewer();
        let node = viewer.pipeline().feature_node(FeatureKey::new(2, 0)).unwrap();
        // 20 positions over 200px: position 2 sits at x = 40
        viewer.handle_pointer(PointerEvent::Enter { target: node, x: 40.0, y: 80.0 }).unwrap();
        viewer.handle_pointer(PointerEvent::Move { target: node, x: 41.0, y: 80.0 }).unwrap();
        let marker = viewer.manager().layers().hover_marker;
        let scene = viewer.manager().scene();
        assert!(scene.is_displayed(marker));
        assert_eq!(scene.num_attr(marker, "cx"), Some(40.0));
        // value 10 is the top of the band: 64 + 16 - 8
        assert_eq!(scene.num_attr(marker, "cy"), Some(72.0));
        assert!(viewer.tooltip().is_visible());

        viewer.handle_pointer(PointerEvent::Leave).unwrap();
        assert!(!viewer.tooltip().is_visible());
        assert!(!viewer.manager().scene().is_displayed(marker));
    }

    #[test]
    fn test_hover_marker_survives_zoom_until_culled() {
        let mut viewer = viewer();
        let node = viewer.pipeline().feature_node(FeatureKey::new(2, 0)).unwrap();
        viewer.handle_pointer(PointerEvent::Move { target: node, x: 41.0, y: 80.0 }).unwrap();
        let marker = viewer.manager().layers().hover_marker;

        assert!(viewer.zoom_at(2.0, 40.0));
        viewer.render().unwrap();
        let cx = viewer.manager().x_scale().apply(2.0);
        let scene = viewer.manager().scene();
        assert!(scene.is_displayed(marker));
        assert_eq!(scene.num_attr(marker, "cx"), Some(cx));
        assert_eq!(scene.num_attr(marker, "cy"), Some(72.0));

        // Zoomed into the far end, the curve over 1..3 is culled
        viewer.reset_zoom();
        assert!(viewer.zoom_at(3.0, 220.0));
        viewer.render().unwrap();
        assert!(viewer.pipeline().is_offscreen(&FeatureKey::new(2, 0)));
        assert!(!viewer.manager().scene().is_displayed(marker));

        viewer.reset_zoom();
        viewer.render().unwrap();
        assert!(viewer.manager().scene().is_displayed(marker));
        assert_eq!(viewer.manager().scene().num_attr(marker, "cx"), Some(40.0));
    }

    #[test]
    fn test_background_click_clears_selection() {
        let mut viewer = viewer();
        let node = viewer.pipeline().feature_node(FeatureKey::new(2, 0)).unwrap();
        viewer.handle_pointer(PointerEvent::Click { target: Some(node), x: 40.0, now_ms: 0 }).unwrap();
        let delivered = viewer.tick(300).unwrap().unwrap();
        assert_eq!((delivered.range.start, delivered.range.end), (1.5, 2.5));

        viewer.handle_pointer(PointerEvent::Click { target: None, x: 40.0, now_ms: 500 }).unwrap();
        assert_eq!(viewer.tick(800), Some(None));
        let shadow = viewer.manager().layers().shadow;
        assert_eq!(viewer.manager().scene().num_attr(shadow, "width"), Some(0.0));
    }

    #[test]
    fn test_double_click_resets_zoom() {
        let mut viewer = viewer();
        assert!(viewer.zoom_at(2.0, 100.0));
        viewer.handle_pointer(PointerEvent::DoubleClick).unwrap();
        assert!(viewer.manager().transform().is_identity());
    }
}
