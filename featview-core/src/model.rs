//! Trace model
//!
//! Flattens the caller's trace forest into an arena indexed by id, keeping
//! parent/child relations as id-to-id maps and the visible set up to date
//! across expansion toggles.

use std::collections::BTreeSet;

use crate::error::{Result, ViewerError};
use crate::feature::Feature;
use crate::trace::{Domain, FeatureKey, InternalTrace, Trace, TraceId};

#[derive(Debug, Clone, Default)]
pub struct TraceModel {
    arena: Vec<InternalTrace>,
    parents: Vec<Option<TraceId>>,
    children: Vec<Vec<TraceId>>,
    roots: Vec<TraceId>,
    visible: BTreeSet<TraceId>,
}

impl TraceModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_traces(roots: Vec<Trace>) -> Self {
        let mut model = Self::new();
        model.set_traces(roots);
        model
    }

    /// Replace the whole forest. Ids restart at zero in pre-order.
    pub fn set_traces(&mut self, roots: Vec<Trace>) {
        let total: usize = roots.iter().map(Trace::count).sum();
        self.arena = Vec::with_capacity(total);
        self.parents = Vec::with_capacity(total);
        self.children = Vec::with_capacity(total);
        self.roots.clear();
        self.visible.clear();

        for root in roots {
            let id = self.flatten(root, None, 0);
            self.roots.push(id);
        }

        log::debug!(
            "Trace model rebuilt: {} traces, {} roots",
            self.arena.len(),
            self.roots.len()
        );
    }

    fn flatten(&mut self, trace: Trace, parent: Option<TraceId>, level: usize) -> TraceId {
        let id = self.arena.len() as TraceId;
        let Trace { label, mut features, mut options, nested, position } = trace;

        if let Some(options) = options.as_mut() {
            options.sanitize();
        }
        let content_size = options.as_ref().and_then(|o| o.content_size);
        for feature in features.iter_mut() {
            feature.sanitize(content_size);
        }
        // Stable: continuous features go last so marks draw on top of them
        features.sort_by_key(Feature::is_continuous);

        let domain = Domain::from_trace(&features, options.as_ref());
        let show = level == 0;
        self.arena.push(InternalTrace {
            id,
            label,
            features,
            options,
            position,
            level,
            expanded: false,
            show,
            domain,
        });
        self.parents.push(parent);
        self.children.push(Vec::new());
        if show {
            self.visible.insert(id);
        }

        for child in nested {
            let child_id = self.flatten(child, Some(id), level + 1);
            self.children[id as usize].push(child_id);
        }
        id
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn get_trace(&self, id: TraceId) -> Result<&InternalTrace> {
        self.arena
            .get(id as usize)
            .ok_or_else(|| ViewerError::trace_not_found(id))
    }

    pub fn get_feature(&self, key: FeatureKey) -> Result<&Feature> {
        self.get_trace(key.trace)?
            .feature(key.index)
            .ok_or_else(|| ViewerError::feature_not_found(key.trace, key.index))
    }

    pub fn get_parent_trace(&self, id: TraceId) -> Result<Option<&InternalTrace>> {
        let parent = *self
            .parents
            .get(id as usize)
            .ok_or_else(|| ViewerError::trace_not_found(id))?;
        parent.map(|p| self.get_trace(p)).transpose()
    }

    pub fn get_children(&self, id: TraceId) -> Result<Vec<&InternalTrace>> {
        let children = self
            .children
            .get(id as usize)
            .ok_or_else(|| ViewerError::trace_not_found(id))?;
        children.iter().map(|&c| self.get_trace(c)).collect()
    }

    pub fn child_ids(&self, id: TraceId) -> &[TraceId] {
        self.children.get(id as usize).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Pre-order subtree rooted at `id`, root included.
    pub fn get_branch(&self, id: TraceId) -> Result<Vec<&InternalTrace>> {
        self.get_trace(id)?;
        let mut branch = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            branch.push(self.get_trace(current)?);
            stack.extend(self.child_ids(current).iter().rev());
        }
        Ok(branch)
    }

    /// Root traces in input order.
    pub fn traces(&self) -> Vec<&InternalTrace> {
        self.roots
            .iter()
            .filter_map(|&id| self.arena.get(id as usize))
            .collect()
    }

    /// Flip the expansion of `id` and return its new state.
    ///
    /// Expanding reveals exactly the next level. Collapsing hides every
    /// descendant and resets their own expansion.
    pub fn toggle_expansion(&mut self, id: TraceId) -> Result<bool> {
        let trace = self.get_trace(id)?;
        if !trace.show {
            log::warn!("Trace {} is hidden and cannot be toggled", id);
            return Ok(trace.expanded);
        }
        let expanded = !trace.expanded;
        self.arena[id as usize].expanded = expanded;

        if expanded {
            let children = self.children[id as usize].clone();
            for child in children {
                self.arena[child as usize].show = true;
                self.visible.insert(child);
            }
        } else {
            let mut stack: Vec<TraceId> = self.children[id as usize].clone();
            while let Some(current) = stack.pop() {
                let trace = &mut self.arena[current as usize];
                trace.show = false;
                trace.expanded = false;
                self.visible.remove(&current);
                stack.extend(self.children[current as usize].iter().copied());
            }
        }
        log::debug!(
            "Trace {} {}, {} visible",
            id,
            if expanded { "expanded" } else { "collapsed" },
            self.visible.len()
        );
        Ok(expanded)
    }

    /// Visible trace ids in pre-order.
    pub fn visible_traces(&self) -> Vec<TraceId> {
        // Pre-order ids make id order the display order
        self.visible.iter().copied().collect()
    }

    pub fn is_visible(&self, id: TraceId) -> bool {
        self.visible.contains(&id)
    }

    /// Every feature across the model, keyed by owning trace and index.
    pub fn features(&self) -> impl Iterator<Item = (FeatureKey, &Feature)> + '_ {
        self.arena.iter().flat_map(|trace| {
            trace
                .features
                .iter()
                .enumerate()
                .map(move |(index, feature)| (FeatureKey::new(trace.id, index), feature))
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &InternalTrace> + '_ {
        self.arena.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{Continuous, FeatureStyle, Locus, Pin};
    use crate::trace::TraceOptions;

    fn sample_forest() -> Vec<Trace> {
        vec![
            Trace::new("A").with_nested(vec![
                Trace::new("A1").with_nested(vec![Trace::new("A1a")]),
                Trace::new("A2"),
            ]),
            Trace::new("B"),
        ]
    }

    #[test]
    fn test_preorder_ids() {
        let model = TraceModel::from_traces(sample_forest());
        let labels: Vec<&str> = model.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "A1", "A1a", "A2", "B"]);
        assert_eq!(model.len(), 5);
        assert_eq!(model.visible_traces(), vec![0, 4]);
        assert_eq!(model.get_trace(2).unwrap().level, 2);
    }

    #[test]
    fn test_lookups() {
        let model = TraceModel::from_traces(sample_forest());
        assert_eq!(model.get_parent_trace(2).unwrap().map(|t| t.id), Some(1));
        assert!(model.get_parent_trace(0).unwrap().is_none());
        let children: Vec<TraceId> = model.get_children(0).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(children, vec![1, 3]);
        let branch: Vec<TraceId> = model.get_branch(0).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(branch, vec![0, 1, 2, 3]);
        assert!(matches!(model.get_trace(99), Err(ViewerError::TraceNotFound { id: 99 })));
        let roots: Vec<&str> = model.traces().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(roots, vec!["A", "B"]);
    }

    #[test]
    fn test_toggle_expansion() {
        let mut model = TraceModel::from_traces(sample_forest());
        assert!(model.toggle_expansion(0).unwrap());
        assert_eq!(model.visible_traces(), vec![0, 1, 3, 4]);
        assert!(model.toggle_expansion(1).unwrap());
        assert_eq!(model.visible_traces(), vec![0, 1, 2, 3, 4]);

        assert!(!model.toggle_expansion(0).unwrap());
        assert_eq!(model.visible_traces(), vec![0, 4]);
        assert!(!model.get_trace(1).unwrap().expanded);
        assert!(!model.get_trace(2).unwrap().show);
    }

    #[test]
    fn test_toggle_hidden_trace_is_refused() {
        let mut model = TraceModel::from_traces(sample_forest());
        assert!(!model.toggle_expansion(1).unwrap());
        assert_eq!(model.visible_traces(), vec![0, 4]);
        assert!(!model.get_trace(1).unwrap().expanded);
    }

    #[test]
    fn test_continuous_sorted_last_and_validated() {
        let cont = Feature::Continuous(Continuous {
            values: vec![1.0, 2.0],
            min: None,
            max: None,
            curve_type: None,
            show_area: false,
            style: FeatureStyle::default(),
        });
        let locus = Feature::Locus(Locus { start: -2, end: 3, height: None, style: FeatureStyle::default() });
        let pin = Feature::Pin(Pin { position: 4, radius: None, adjust_to_width: false, style: FeatureStyle::default() });
        let trace = Trace::new("mixed")
            .with_features(vec![cont, locus, pin])
            .with_options(TraceOptions { line_height: Some(-5.0), ..Default::default() });

        let model = TraceModel::from_traces(vec![trace]);
        let t = model.get_trace(0).unwrap();
        let kinds: Vec<&str> = t.features.iter().map(|f| f.kind().as_str()).collect();
        assert_eq!(kinds, vec!["locus", "pin", "continuous"]);
        assert_eq!(t.line_height(), Some(32.0));
        assert_eq!(t.domain, Domain { min: 1.0, max: 2.0 });
        match &t.features[0] {
            Feature::Locus(l) => assert_eq!(l.start, 0),
            other => panic!("unexpected feature {:?}", other),
        }
        assert_eq!(model.features().count(), 3);
        assert!(model.get_feature(FeatureKey::new(0, 2)).unwrap().is_continuous());
        assert!(matches!(
            model.get_feature(FeatureKey::new(0, 7)),
            Err(ViewerError::FeatureNotFound { trace: 0, index: 7 })
        ));
    }

    #[test]
    fn test_set_traces_replaces_forest() {
        let mut model = TraceModel::from_traces(sample_forest());
        model.toggle_expansion(0).unwrap();
        model.set_traces(vec![Trace::new("only")]);
        assert_eq!(model.len(), 1);
        assert_eq!(model.visible_traces(), vec![0]);
        assert_eq!(model.get_trace(0).unwrap().label, "only");
    }
}
