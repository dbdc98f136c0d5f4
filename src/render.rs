use crate::config::LayoutConfig;
#[cfg(feature = "png")]
use crate::config::RenderConfig;
use crate::layout::TreeLayout;
use crate::metrics::{BoxMetrics, FontMetrics};
use crate::theme::Theme;
use anyhow::Result;
use std::path::Path;

/// Opaque handle for a rendered person box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle(pub(crate) usize);

/// Opaque handle for a rendered connector line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineHandle(pub(crate) usize);

/// The paint surface contract consumed by the viewport. Creating a node
/// also makes its box measurable, so layout can run against real text
/// metrics before anything is positioned.
pub trait RenderSink {
    fn create_node(&mut self, name: &str) -> NodeHandle;
    fn remove_all_nodes(&mut self);
    fn measure_box_width(&self, handle: NodeHandle) -> f32;
    fn position_node(&mut self, handle: NodeHandle, x: f32, y: f32);
    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> LineHandle;
    fn clear_lines(&mut self);
    fn translate_all(&mut self, dx: f32, dy: f32);
}

#[derive(Debug, Clone)]
struct SvgNode {
    name: String,
    width: f32,
    x: f32,
    y: f32,
}

#[derive(Debug, Clone, Copy)]
struct SvgLine {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

/// SVG-producing render sink. Boxes are measured through font metrics at
/// creation time and everything is kept in document coordinates until
/// [`SvgCanvas::to_svg`] is called.
pub struct SvgCanvas {
    theme: Theme,
    config: LayoutConfig,
    metrics: FontMetrics,
    nodes: Vec<SvgNode>,
    lines: Vec<SvgLine>,
}

impl SvgCanvas {
    pub fn new(theme: Theme, config: LayoutConfig) -> Self {
        let metrics = FontMetrics::new(&theme, &config);
        Self {
            theme,
            config,
            metrics,
            nodes: Vec::new(),
            lines: Vec::new(),
        }
    }

    pub fn to_svg(&self) -> String {
        let mut max_x: f32 = 0.0;
        let mut max_y: f32 = 0.0;
        for node in &self.nodes {
            max_x = max_x.max(node.x + node.width);
            max_y = max_y.max(node.y + self.config.box_height);
        }
        for line in &self.lines {
            max_x = max_x.max(line.x1.max(line.x2));
            max_y = max_y.max(line.y1.max(line.y2));
        }
        let width = max_x + self.config.margin;
        let height = max_y + self.config.margin;

        let mut svg = svg_open(width, height, &self.theme);
        for line in &self.lines {
            svg.push_str(&line_svg(line.x1, line.y1, line.x2, line.y2, &self.theme));
        }
        for node in &self.nodes {
            svg.push_str(&box_svg(
                &node.name,
                node.x,
                node.y,
                node.width,
                self.config.box_height,
                &self.theme,
            ));
        }
        svg.push_str("</svg>");
        svg
    }
}

impl RenderSink for SvgCanvas {
    fn create_node(&mut self, name: &str) -> NodeHandle {
        let width = self.metrics.box_width(name);
        self.nodes.push(SvgNode {
            name: name.to_string(),
            width,
            x: 0.0,
            y: 0.0,
        });
        NodeHandle(self.nodes.len() - 1)
    }

    fn remove_all_nodes(&mut self) {
        self.nodes.clear();
    }

    fn measure_box_width(&self, handle: NodeHandle) -> f32 {
        self.nodes.get(handle.0).map(|node| node.width).unwrap_or(0.0)
    }

    fn position_node(&mut self, handle: NodeHandle, x: f32, y: f32) {
        if let Some(node) = self.nodes.get_mut(handle.0) {
            node.x = x;
            node.y = y;
        }
    }

    fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> LineHandle {
        self.lines.push(SvgLine { x1, y1, x2, y2 });
        LineHandle(self.lines.len() - 1)
    }

    fn clear_lines(&mut self) {
        self.lines.clear();
    }

    fn translate_all(&mut self, dx: f32, dy: f32) {
        for node in &mut self.nodes {
            node.x += dx;
            node.y += dy;
        }
        for line in &mut self.lines {
            line.x1 += dx;
            line.y1 += dy;
            line.x2 += dx;
            line.y2 += dy;
        }
    }
}

/// Renders a computed layout straight to an SVG document.
pub fn render_svg(tree: &TreeLayout, theme: &Theme, config: &LayoutConfig) -> String {
    let width = tree.width.max(2.0 * config.margin);
    let height = tree.height.max(2.0 * config.margin);
    let mut svg = svg_open(width, height, theme);
    for line in &tree.lines {
        svg.push_str(&line_svg(line.x1, line.y1, line.x2, line.y2, theme));
    }
    for node in tree.nodes.values() {
        svg.push_str(&box_svg(&node.name, node.x, node.y, node.width, node.height, theme));
    }
    svg.push_str("</svg>");
    svg
}

fn svg_open(width: f32, height: f32, theme: &Theme) -> String {
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width:.0}\" height=\"{height:.0}\" viewBox=\"0 0 {width:.0} {height:.0}\">",
    );
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"{}\"/>",
        theme.background
    ));
    svg
}

fn line_svg(x1: f32, y1: f32, x2: f32, y2: f32, theme: &Theme) -> String {
    format!(
        "<line x1=\"{x1:.2}\" y1=\"{y1:.2}\" x2=\"{x2:.2}\" y2=\"{y2:.2}\" stroke=\"{}\" stroke-width=\"1.4\"/>",
        theme.line_color
    )
}

fn box_svg(name: &str, x: f32, y: f32, width: f32, height: f32, theme: &Theme) -> String {
    let mut out = format!(
        "<rect x=\"{x:.2}\" y=\"{y:.2}\" width=\"{width:.2}\" height=\"{height:.2}\" rx=\"4\" ry=\"4\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.4\"/>",
        theme.box_fill, theme.box_border
    );
    let text_x = x + width / 2.0;
    let text_y = y + height / 2.0 + theme.font_size * 0.35;
    out.push_str(&format!(
        "<text x=\"{text_x:.2}\" y=\"{text_y:.2}\" text-anchor=\"middle\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
        escape_xml(&theme.font_family),
        theme.font_size,
        theme.text_color,
        escape_xml(name)
    ));
    out
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .unwrap_or(usvg::Size::from_wh(800.0, 600.0).unwrap());

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
