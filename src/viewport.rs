use crate::config::LayoutConfig;
use crate::graph::FamilyGraph;
use crate::layout::{TreeLayout, layout_tree, visible_nodes};
use crate::metrics::MeasuredMetrics;
use crate::render::{LineHandle, NodeHandle, RenderSink};

/// Owns the currently rendered node/line set for one loaded dataset.
///
/// Selecting a person re-roots the diagram: the previous handles are
/// released, the layout pipeline reruns from the upward-searched root, and
/// the result is re-rendered through the sink. Panning translates the
/// existing handles in place without recomputing layout.
pub struct Viewport<S: RenderSink> {
    graph: FamilyGraph,
    config: LayoutConfig,
    sink: S,
    root: Option<String>,
    node_handles: Vec<(String, NodeHandle)>,
    line_handles: Vec<LineHandle>,
    offset: (f32, f32),
    tree: Option<TreeLayout>,
}

impl<S: RenderSink> Viewport<S> {
    pub fn new(graph: FamilyGraph, config: LayoutConfig, sink: S) -> Self {
        Self {
            graph,
            config,
            sink,
            root: None,
            node_handles: Vec::new(),
            line_handles: Vec::new(),
            offset: (0.0, 0.0),
            tree: None,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn tree(&self) -> Option<&TreeLayout> {
        self.tree.as_ref()
    }

    pub fn offset(&self) -> (f32, f32) {
        self.offset
    }

    /// Handles a click on a person: searches one level upward for the
    /// effective root and rebuilds the rendered state from it.
    pub fn select(&mut self, id: &str) {
        let root = self.graph.find_root(id).to_string();
        self.rebuild(&root);
    }

    /// Translates every rendered node and line by the gesture delta.
    /// O(visible nodes + visible lines); widths stay memoized from the last
    /// layout pass and are not recomputed.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset.0 += dx;
        self.offset.1 += dy;
        self.sink.translate_all(dx, dy);
    }

    fn rebuild(&mut self, root: &str) {
        // Old handles are released before any new ones are created.
        self.sink.remove_all_nodes();
        self.sink.clear_lines();
        self.node_handles.clear();
        self.line_handles.clear();
        self.offset = (0.0, 0.0);

        let visible = visible_nodes(&self.graph, root);
        let mut measured = MeasuredMetrics::default();
        for id in &visible {
            if let Some(person) = self.graph.get(id) {
                let handle = self.sink.create_node(&person.name);
                measured.insert(&person.name, self.sink.measure_box_width(handle));
                self.node_handles.push((person.id.clone(), handle));
            }
        }

        let tree = layout_tree(&self.graph, root, &measured, &self.config);
        for (id, handle) in &self.node_handles {
            if let Some(node) = tree.nodes.get(id) {
                self.sink.position_node(*handle, node.x, node.y);
            }
        }
        for line in &tree.lines {
            self.line_handles
                .push(self.sink.draw_line(line.x1, line.y1, line.x2, line.y2));
        }

        self.root = Some(root.to_string());
        self.tree = Some(tree);
    }
}
