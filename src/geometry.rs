use crate::config::LayoutConfig;
use crate::graph::FamilyGraph;
use crate::layout::NodeBox;
use std::collections::BTreeMap;

/// Role a connector segment plays in the diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Horizontal segment joining the two partner boxes.
    PartnerLink,
    /// Vertical segment dropping from the partner midpoint toward the
    /// children. For a lone child this runs all the way to the child's top.
    DescentStub,
    /// Vertical segment from a child's top edge up to the generation rail.
    ChildStub,
    /// Horizontal rail joining the first and last child stubs.
    SiblingSpan,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub kind: LineKind,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Line {
    fn new(kind: LineKind, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { kind, x1, y1, x2, y2 }
    }
}

/// Derives connector lines from placed boxes, walking the visible tree from
/// the root. Only a partnered person with children emits lines; single
/// individuals have neither partner lines nor rendered children.
pub fn build_lines(
    graph: &FamilyGraph,
    root: &str,
    nodes: &BTreeMap<String, NodeBox>,
    config: &LayoutConfig,
) -> Vec<Line> {
    let mut lines = Vec::new();
    visit(graph, root, nodes, config, &mut lines);
    lines
}

fn visit(
    graph: &FamilyGraph,
    id: &str,
    nodes: &BTreeMap<String, NodeBox>,
    config: &LayoutConfig,
    lines: &mut Vec<Line>,
) {
    let Some(person) = graph.get(id) else {
        return;
    };
    let Some(partner_id) = person.partner.as_deref() else {
        return;
    };
    let (Some(own), Some(mate)) = (nodes.get(id), nodes.get(partner_id)) else {
        return;
    };

    if !person.children.is_empty() {
        let mid_y = own.y + own.height / 2.0;
        lines.push(Line::new(
            LineKind::PartnerLink,
            own.right(),
            mid_y,
            mate.x,
            mid_y,
        ));

        // Midpoint of the gap between the partner boxes.
        let join_x = own.right() + config.spacing / 2.0;
        let tops: Vec<(f32, f32)> = person
            .children
            .iter()
            .filter_map(|child| nodes.get(child))
            .map(|child| (child.center_x(), child.y))
            .collect();

        if let [(child_x, child_y)] = tops[..] {
            // A lone child gets one direct drop, no stub/rail pair.
            lines.push(Line::new(
                LineKind::DescentStub,
                join_x,
                mid_y,
                child_x,
                child_y,
            ));
        } else if tops.len() > 1 {
            // Rail halfway between the parent boxes' bottom edge and the
            // children's top edge.
            let rail_y = own.y + (own.height + config.gen_space) / 2.0;
            lines.push(Line::new(LineKind::DescentStub, join_x, mid_y, join_x, rail_y));
            for (child_x, child_y) in &tops {
                lines.push(Line::new(
                    LineKind::ChildStub,
                    *child_x,
                    *child_y,
                    *child_x,
                    rail_y,
                ));
            }
            let (first_x, _) = tops[0];
            let (last_x, _) = tops[tops.len() - 1];
            lines.push(Line::new(LineKind::SiblingSpan, first_x, rail_y, last_x, rail_y));
        }
    }

    for child in &person.children {
        visit(graph, child, nodes, config, lines);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::link_records;
    use crate::layout::layout_tree;
    use crate::metrics::FixedMetrics;
    use crate::record::PersonRecord;

    fn record(id: &str, partner: Option<&str>, children: &[&str]) -> PersonRecord {
        PersonRecord {
            id: id.to_string(),
            name: Some(id.to_string()),
            partner: partner.map(|p| p.to_string()),
            children: if children.is_empty() {
                None
            } else {
                Some(children.iter().map(|c| c.to_string()).collect())
            },
        }
    }

    fn lines_of_kind(lines: &[Line], kind: LineKind) -> Vec<Line> {
        lines.iter().copied().filter(|l| l.kind == kind).collect()
    }

    #[test]
    fn single_person_emits_no_lines() {
        let (graph, _) = link_records(&[record("a", None, &[])]);
        let tree = layout_tree(&graph, "a", &FixedMetrics(50.0), &LayoutConfig::default());
        assert!(tree.lines.is_empty());
    }

    #[test]
    fn childless_couple_emits_no_lines() {
        let records = vec![record("a", Some("b"), &[]), record("b", Some("a"), &[])];
        let (graph, _) = link_records(&records);
        let tree = layout_tree(&graph, "a", &FixedMetrics(50.0), &LayoutConfig::default());
        assert!(tree.lines.is_empty());
    }

    #[test]
    fn two_children_get_stub_rail_and_span() {
        let records = vec![
            record("a", Some("b"), &["c", "d"]),
            record("b", Some("a"), &[]),
            record("c", None, &[]),
            record("d", None, &[]),
        ];
        let (graph, _) = link_records(&records);
        let tree = layout_tree(&graph, "a", &FixedMetrics(50.0), &LayoutConfig::default());

        assert_eq!(lines_of_kind(&tree.lines, LineKind::PartnerLink).len(), 1);
        assert_eq!(lines_of_kind(&tree.lines, LineKind::DescentStub).len(), 1);
        assert_eq!(lines_of_kind(&tree.lines, LineKind::ChildStub).len(), 2);
        let spans = lines_of_kind(&tree.lines, LineKind::SiblingSpan);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].x1, tree.nodes["c"].center_x());
        assert_eq!(spans[0].x2, tree.nodes["d"].center_x());
    }

    #[test]
    fn partner_line_meets_descent_stub() {
        let records = vec![
            record("a", Some("b"), &["c", "d"]),
            record("b", Some("a"), &[]),
            record("c", None, &[]),
            record("d", None, &[]),
        ];
        let (graph, _) = link_records(&records);
        let tree = layout_tree(&graph, "a", &FixedMetrics(50.0), &LayoutConfig::default());
        let partner = lines_of_kind(&tree.lines, LineKind::PartnerLink)[0];
        let descent = lines_of_kind(&tree.lines, LineKind::DescentStub)[0];
        assert_eq!(partner.y1, descent.y1);
        assert!(partner.x1 <= descent.x1 && descent.x1 <= partner.x2);
    }

    #[test]
    fn lone_child_gets_single_drop() {
        let records = vec![
            record("a", Some("b"), &["c"]),
            record("b", Some("a"), &[]),
            record("c", None, &[]),
        ];
        let (graph, _) = link_records(&records);
        let tree = layout_tree(&graph, "a", &FixedMetrics(50.0), &LayoutConfig::default());

        assert!(lines_of_kind(&tree.lines, LineKind::ChildStub).is_empty());
        assert!(lines_of_kind(&tree.lines, LineKind::SiblingSpan).is_empty());
        let drops = lines_of_kind(&tree.lines, LineKind::DescentStub);
        assert_eq!(drops.len(), 1);
        assert_eq!(drops[0].x2, tree.nodes["c"].center_x());
        assert_eq!(drops[0].y2, tree.nodes["c"].y);
    }

    #[test]
    fn child_stubs_end_on_the_rail() {
        let records = vec![
            record("a", Some("b"), &["c", "d", "e"]),
            record("b", Some("a"), &[]),
            record("c", None, &[]),
            record("d", None, &[]),
            record("e", None, &[]),
        ];
        let (graph, _) = link_records(&records);
        let tree = layout_tree(&graph, "a", &FixedMetrics(50.0), &LayoutConfig::default());
        let span = lines_of_kind(&tree.lines, LineKind::SiblingSpan)[0];
        for stub in lines_of_kind(&tree.lines, LineKind::ChildStub) {
            assert_eq!(stub.y2, span.y1);
            assert_eq!(stub.y1, tree.nodes["c"].y);
        }
    }

    #[test]
    fn nested_generations_emit_lines_per_couple() {
        let records = vec![
            record("a", Some("b"), &["c"]),
            record("b", Some("a"), &[]),
            record("c", Some("e"), &["f", "g"]),
            record("e", Some("c"), &[]),
            record("f", None, &[]),
            record("g", None, &[]),
        ];
        let (graph, _) = link_records(&records);
        let tree = layout_tree(&graph, "a", &FixedMetrics(50.0), &LayoutConfig::default());
        assert_eq!(lines_of_kind(&tree.lines, LineKind::PartnerLink).len(), 2);
    }
}
