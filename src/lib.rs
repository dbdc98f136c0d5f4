#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod geometry;
pub mod graph;
pub mod layout;
pub mod loader;
pub mod metrics;
pub mod record;
pub mod render;
pub mod theme;
pub mod viewport;

pub use config::{Config, LayoutConfig, RenderConfig, load_config};
pub use geometry::{Line, LineKind};
pub use graph::{FamilyGraph, LinkWarning, Person, link_records};
pub use layout::{NodeBox, TreeLayout, layout_tree};
pub use loader::{LoadOutcome, SourceError, load_sources};
pub use metrics::{BoxMetrics, FixedMetrics, FontMetrics, MeasuredMetrics};
pub use record::{PersonRecord, RecordError, merge_sources, parse_records};
pub use render::{RenderSink, SvgCanvas, render_svg};
pub use theme::Theme;
pub use viewport::Viewport;

#[cfg(feature = "cli")]
pub use cli::run;
