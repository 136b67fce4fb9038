/*!
# Scene Graph

Retained tree of drawing nodes with create / update / remove / keyed-join
semantics. Nodes live in an arena addressed by [`NodeId`]; ids are never
reused, so a node that survives a pass keeps its identity.
*/

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use featview_core::FeatureKey;

pub type NodeId = u64;

/// Element kind of a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    Group,
    Defs,
    ClipPath,
    Mask,
    Rect,
    Path,
    Circle,
    Polygon,
    Line,
    Text,
}

impl NodeKind {
    /// SVG element name.
    pub fn tag(self) -> &'static str {
        match self {
            NodeKind::Root => "svg",
            NodeKind::Group => "g",
            NodeKind::Defs => "defs",
            NodeKind::ClipPath => "clipPath",
            NodeKind::Mask => "mask",
            NodeKind::Rect => "rect",
            NodeKind::Path => "path",
            NodeKind::Circle => "circle",
            NodeKind::Polygon => "polygon",
            NodeKind::Line => "line",
            NodeKind::Text => "text",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Num(f64),
    Str(String),
}

impl AttrValue {
    pub fn as_num(&self) -> Option<f64> {
        match self {
            AttrValue::Num(v) => Some(*v),
            AttrValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            AttrValue::Num(_) => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Num(v) => write!(f, "{}", v),
            AttrValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Num(v)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

/// Pointer handler bound to a node at creation time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    Feature(FeatureKey),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub attrs: BTreeMap<String, AttrValue>,
    pub key: Option<String>,
    pub text: Option<String>,
    pub handler: Option<Handler>,
}

/// Mutation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneStats {
    pub created: u64,
    pub removed: u64,
    pub attr_writes: u64,
}

/// Outcome of a keyed join: nodes for every requested key, in key order
#[derive(Debug, Clone, Default)]
pub struct JoinResult {
    pub nodes: Vec<(String, NodeId)>,
    pub entered: HashSet<NodeId>,
    pub exited: usize,
}

impl JoinResult {
    pub fn is_entered(&self, id: NodeId) -> bool {
        self.entered.contains(&id)
    }
}

#[derive(Debug)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, Node>,
    root: NodeId,
    next_id: NodeId,
    stats: SceneStats,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = Node {
            id: 0,
            kind: NodeKind::Root,
            parent: None,
            children: Vec::new(),
            attrs: BTreeMap::new(),
            key: None,
            text: None,
            handler: None,
        };
        let mut nodes = HashMap::new();
        nodes.insert(0, root);
        Self { nodes, root: 0, next_id: 1, stats: SceneStats::default() }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn stats(&self) -> SceneStats {
        self.stats
    }

    /// Append a new child under `parent`. A missing parent attaches to the root.
    pub fn create(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let parent = if self.nodes.contains_key(&parent) {
            parent
        } else {
            log::debug!("Parent node {} missing, attaching to root", parent);
            self.root
        };
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                id,
                kind,
                parent: Some(parent),
                children: Vec::new(),
                attrs: BTreeMap::new(),
                key: None,
                text: None,
                handler: None,
            },
        );
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.push(id);
        }
        self.stats.created += 1;
        id
    }

    pub fn create_keyed(&mut self, parent: NodeId, kind: NodeKind, key: &str) -> NodeId {
        let id = self.create(parent, kind);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.key = Some(key.to_string());
        }
        id
    }

    /// Remove `id` and its whole subtree. Returns the number of nodes removed.
    pub fn remove(&mut self, id: NodeId) -> usize {
        if id == self.root {
            return 0;
        }
        let parent = match self.nodes.get(&id) {
            Some(node) => node.parent,
            None => return 0,
        };
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|&c| c != id);
        }
        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.remove(&current) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        self.stats.removed += removed as u64;
        removed
    }

    /// Remove every child of `id`.
    pub fn clear_children(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        for child in children {
            self.remove(child);
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    pub fn find_child_by_key(&self, parent: NodeId, key: &str) -> Option<NodeId> {
        self.children(parent)
            .iter()
            .copied()
            .find(|c| self.nodes.get(c).and_then(|n| n.key.as_deref()) == Some(key))
    }

    pub fn set_attr<V: Into<AttrValue>>(&mut self, id: NodeId, name: &str, value: V) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.attrs.insert(name.to_string(), value.into());
            self.stats.attr_writes += 1;
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.nodes.get_mut(&id) {
            if node.attrs.remove(name).is_some() {
                self.stats.attr_writes += 1;
            }
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&AttrValue> {
        self.nodes.get(&id).and_then(|n| n.attrs.get(name))
    }

    pub fn num_attr(&self, id: NodeId, name: &str) -> Option<f64> {
        self.attr(id, name).and_then(AttrValue::as_num)
    }

    pub fn str_attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attr(id, name).and_then(AttrValue::as_str)
    }

    pub fn set_text<S: Into<String>>(&mut self, id: NodeId, text: S) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.text = Some(text.into());
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).and_then(|n| n.text.as_deref())
    }

    pub fn set_display(&mut self, id: NodeId, shown: bool) {
        if shown {
            self.remove_attr(id, "display");
        } else {
            self.set_attr(id, "display", "none");
        }
    }

    pub fn is_displayed(&self, id: NodeId) -> bool {
        self.str_attr(id, "display") != Some("none")
    }

    pub fn set_handler(&mut self, id: NodeId, handler: Handler) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.handler = Some(handler);
        }
    }

    /// Handler on `id` or its nearest ancestor, as pointer events bubble.
    pub fn resolve_handler(&self, id: NodeId) -> Option<Handler> {
        let mut current = Some(id);
        while let Some(node) = current.and_then(|c| self.nodes.get(&c)) {
            if let Some(handler) = node.handler {
                return Some(handler);
            }
            current = node.parent;
        }
        None
    }

    /// Keyed join of `kind` children under `parent`.
    ///
    /// Existing keyed children whose key is still requested are kept, new
    /// keys are created and stale keys removed. Joined children are moved
    /// after any other children, in key order.
    pub fn join(&mut self, parent: NodeId, kind: NodeKind, keys: &[String]) -> JoinResult {
        let wanted: HashSet<&str> = keys.iter().map(String::as_str).collect();
        let mut existing: HashMap<String, NodeId> = HashMap::new();
        let mut result = JoinResult::default();

        for child in self.children(parent).to_vec() {
            let Some(node) = self.nodes.get(&child) else { continue };
            if node.kind != kind {
                continue;
            }
            match node.key.clone() {
                Some(key) if wanted.contains(key.as_str()) && !existing.contains_key(&key) => {
                    existing.insert(key, child);
                }
                Some(_) => {
                    self.remove(child);
                    result.exited += 1;
                }
                None => {}
            }
        }

        for key in keys {
            let id = match existing.get(key) {
                Some(&id) => id,
                None => {
                    let id = self.create_keyed(parent, kind, key);
                    existing.insert(key.clone(), id);
                    result.entered.insert(id);
                    id
                }
            };
            result.nodes.push((key.clone(), id));
        }

        let joined: HashSet<NodeId> = result.nodes.iter().map(|(_, id)| *id).collect();
        if let Some(p) = self.nodes.get_mut(&parent) {
            p.children.retain(|c| !joined.contains(c));
            p.children.extend(result.nodes.iter().map(|(_, id)| *id));
        }
        result
    }

    /// Pre-order walk of the subtree rooted at `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                out.push(current);
                stack.extend(node.children.iter().rev());
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_create_and_remove_subtree() {
        let mut scene = SceneGraph::new();
        let g = scene.create(scene.root(), NodeKind::Group);
        let r = scene.create(g, NodeKind::Rect);
        scene.create(g, NodeKind::Text);
        assert_eq!(scene.len(), 4);
        assert_eq!(scene.parent(r), Some(g));
        assert_eq!(scene.remove(g), 3);
        assert!(!scene.contains(r));
        assert!(scene.is_empty());
        assert_eq!(scene.stats().removed, 3);
    }

    #[test]
    fn test_keyed_join_keeps_identity() {
        let mut scene = SceneGraph::new();
        let layer = scene.create(scene.root(), NodeKind::Group);
        let other = scene.create(layer, NodeKind::Rect);

        let first = scene.join(layer, NodeKind::Group, &keys(&["0", "1", "2"]));
        assert_eq!(first.entered.len(), 3);

        let second = scene.join(layer, NodeKind::Group, &keys(&["2", "0", "5"]));
        assert_eq!(second.entered.len(), 1);
        assert_eq!(second.exited, 1);
        assert_eq!(second.nodes[0].1, first.nodes[2].1);
        assert_eq!(second.nodes[1].1, first.nodes[0].1);
        assert!(second.is_entered(second.nodes[2].1));

        let order: Vec<NodeId> = scene.children(layer).to_vec();
        assert_eq!(order[0], other);
        assert_eq!(&order[1..], &[second.nodes[0].1, second.nodes[1].1, second.nodes[2].1]);
    }

    #[test]
    fn test_large_join_reports_entered_nodes() {
        let mut scene = SceneGraph::new();
        let layer = scene.create(scene.root(), NodeKind::Group);
        let names: Vec<String> = (0..2000).map(|i| i.to_string()).collect();
        let first = scene.join(layer, NodeKind::Rect, &names);
        assert_eq!(first.entered.len(), 2000);
        assert!(first.nodes.iter().all(|(_, id)| first.is_entered(*id)));

        let shifted: Vec<String> = (1000..3000).map(|i| i.to_string()).collect();
        let second = scene.join(layer, NodeKind::Rect, &shifted);
        assert_eq!(second.exited, 1000);
        assert_eq!(second.entered.len(), 1000);
        assert!(!second.is_entered(second.nodes[0].1));
        assert!(second.is_entered(second.nodes[1999].1));
        assert_eq!(scene.children(layer).len(), 2000);
    }

    #[test]
    fn test_attrs_display_and_handlers() {
        let mut scene = SceneGraph::new();
        let g = scene.create(scene.root(), NodeKind::Group);
        let rect = scene.create(g, NodeKind::Rect);
        scene.set_attr(rect, "x", 12.5);
        scene.set_attr(rect, "fill", "red");
        assert_eq!(scene.num_attr(rect, "x"), Some(12.5));
        assert_eq!(scene.str_attr(rect, "fill"), Some("red"));

        scene.set_display(g, false);
        assert!(!scene.is_displayed(g));
        scene.set_display(g, true);
        assert!(scene.is_displayed(g));

        let key = FeatureKey::new(1, 4);
        scene.set_handler(g, Handler::Feature(key));
        assert_eq!(scene.resolve_handler(rect), Some(Handler::Feature(key)));
        assert_eq!(scene.resolve_handler(scene.root()), None);
    }
}
