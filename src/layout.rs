use crate::config::LayoutConfig;
use crate::geometry::{Line, build_lines};
use crate::graph::FamilyGraph;
use crate::metrics::BoxMetrics;
use std::collections::{BTreeMap, HashMap, HashSet};

/// One placed person box: top-left corner plus dimensions. Recreated on
/// every layout pass and discarded on the next.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeBox {
    pub id: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NodeBox {
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Result of one layout pass rooted at a chosen person.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLayout {
    pub root: String,
    pub nodes: BTreeMap<String, NodeBox>,
    pub lines: Vec<Line>,
    pub width: f32,
    pub height: f32,
}

/// Per-pass width memo. Widths depend only on the graph snapshot and the
/// metrics provider, so each id is computed at most once per pass.
pub type WidthMemo = HashMap<String, f32>;

pub fn own_box_width(graph: &FamilyGraph, id: &str, metrics: &dyn BoxMetrics) -> f32 {
    match graph.get(id) {
        Some(person) => metrics.box_width(&person.name),
        None => 0.0,
    }
}

/// Width of the partner pair: the person's own box, or both boxes plus the
/// gap when partnered.
pub fn partner_width(
    graph: &FamilyGraph,
    id: &str,
    metrics: &dyn BoxMetrics,
    config: &LayoutConfig,
) -> f32 {
    let own = own_box_width(graph, id, metrics);
    match graph.get(id).and_then(|person| person.partner.as_deref()) {
        Some(partner) => own + config.spacing + own_box_width(graph, partner, metrics),
        None => own,
    }
}

/// Width of the child generation. Zero when there are no children, and also
/// zero for an unpartnered person: only a partnered pair produces a rendered
/// child generation.
pub fn children_width(
    graph: &FamilyGraph,
    id: &str,
    metrics: &dyn BoxMetrics,
    config: &LayoutConfig,
    memo: &mut WidthMemo,
) -> f32 {
    let Some(person) = graph.get(id) else {
        return 0.0;
    };
    if person.partner.is_none() || person.children.is_empty() {
        return 0.0;
    }
    let mut total = 0.0;
    for child in &person.children {
        total += subtree_width(graph, child, metrics, config, memo);
    }
    total + config.spacing * (person.children.len() as f32 - 1.0)
}

/// Memoized subtree width: the larger of the partner-pair width and the
/// child-generation width.
pub fn subtree_width(
    graph: &FamilyGraph,
    id: &str,
    metrics: &dyn BoxMetrics,
    config: &LayoutConfig,
    memo: &mut WidthMemo,
) -> f32 {
    if let Some(width) = memo.get(id) {
        return *width;
    }
    let width = partner_width(graph, id, metrics, config)
        .max(children_width(graph, id, metrics, config, memo));
    memo.insert(id.to_string(), width);
    width
}

/// Ids rendered for a given root, in traversal order: the person, their
/// partner, then (for partnered persons only) each child's subtree.
pub fn visible_nodes(graph: &FamilyGraph, root: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    collect_visible(graph, root, &mut seen, &mut out);
    out
}

fn collect_visible(
    graph: &FamilyGraph,
    id: &str,
    seen: &mut HashSet<String>,
    out: &mut Vec<String>,
) {
    let Some(person) = graph.get(id) else {
        return;
    };
    if !seen.insert(person.id.clone()) {
        return;
    }
    out.push(person.id.clone());
    let Some(partner) = person.partner.as_deref() else {
        return;
    };
    if graph.contains(partner) && seen.insert(partner.to_string()) {
        out.push(partner.to_string());
    }
    for child in &person.children {
        collect_visible(graph, child, seen, out);
    }
}

/// Runs the full pipeline for one root: the memoized width pass, the
/// top-down placement pass, and the connector-line pass.
pub fn layout_tree(
    graph: &FamilyGraph,
    root: &str,
    metrics: &dyn BoxMetrics,
    config: &LayoutConfig,
) -> TreeLayout {
    let mut memo = WidthMemo::new();
    let mut nodes: BTreeMap<String, NodeBox> = BTreeMap::new();
    place_subtree(
        graph,
        root,
        config.margin,
        config.margin,
        metrics,
        config,
        &mut memo,
        &mut nodes,
    );
    let lines = build_lines(graph, root, &nodes, config);

    let mut max_x: f32 = 0.0;
    let mut max_y: f32 = 0.0;
    for node in nodes.values() {
        max_x = max_x.max(node.right());
        max_y = max_y.max(node.y + node.height);
    }
    TreeLayout {
        root: root.to_string(),
        nodes,
        lines,
        width: max_x + config.margin,
        height: max_y + config.margin,
    }
}

/// Places a person's subtree with its bounding box's top-left corner at
/// `(x, y)`. The person's own box is centered within the subtree width
/// relative to the partner-pair width; the partner box sits immediately to
/// the right; children go one generation down, left-to-right.
fn place_subtree(
    graph: &FamilyGraph,
    id: &str,
    x: f32,
    y: f32,
    metrics: &dyn BoxMetrics,
    config: &LayoutConfig,
    memo: &mut WidthMemo,
    nodes: &mut BTreeMap<String, NodeBox>,
) {
    let Some(person) = graph.get(id) else {
        return;
    };
    let width = subtree_width(graph, id, metrics, config, memo);
    let pair = partner_width(graph, id, metrics, config);
    let own = own_box_width(graph, id, metrics);

    let box_left = x + (width - pair) / 2.0;
    nodes.insert(
        person.id.clone(),
        NodeBox {
            id: person.id.clone(),
            name: person.name.clone(),
            x: box_left,
            y,
            width: own,
            height: config.box_height,
        },
    );

    let Some(partner_id) = person.partner.as_deref() else {
        // A single parent's children are not laid out beneath them.
        return;
    };
    if let Some(partner) = graph.get(partner_id) {
        nodes.insert(
            partner.id.clone(),
            NodeBox {
                id: partner.id.clone(),
                name: partner.name.clone(),
                x: box_left + own + config.spacing,
                y,
                width: own_box_width(graph, partner_id, metrics),
                height: config.box_height,
            },
        );
    }

    if person.children.is_empty() {
        return;
    }
    let kids = children_width(graph, id, metrics, config, memo);
    let mut cursor = if kids >= pair {
        x
    } else {
        // Narrow child rows sit centered under the partner pair.
        box_left + (pair - kids) / 2.0
    };
    for child in &person.children {
        place_subtree(
            graph,
            child,
            cursor,
            y + config.gen_space,
            metrics,
            config,
            memo,
            nodes,
        );
        cursor += subtree_width(graph, child, metrics, config, memo) + config.spacing;
    }
}
