use crate::config::load_config;
use crate::graph::link_records;
use crate::layout::layout_tree;
use crate::loader::load_sources;
use crate::metrics::FontMetrics;
use crate::record::merge_sources;
#[cfg(feature = "png")]
use crate::render::write_output_png;
use crate::render::{render_svg, write_output_svg};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kintree", version, about = "Family tree renderer (merges partial sources)")]
pub struct Args {
    /// Input files, each a JSON array of person records. Overlapping ids
    /// across files are merged.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Person to focus; the diagram roots at their parent when one is
    /// known. Defaults to the first record.
    #[arg(short = 'r', long = "root")]
    pub root: Option<String>,

    /// Output file (svg/png). Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme and layout overrides)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Svg,
    #[cfg(feature = "png")]
    Png,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    let outcome = load_sources(&args.inputs);
    for failure in &outcome.failures {
        eprintln!("error: {failure}");
    }
    if outcome.sources.is_empty() {
        return Err(anyhow::anyhow!("no readable input sources"));
    }

    let records = merge_sources(outcome.sources);
    if records.is_empty() {
        return Err(anyhow::anyhow!("input contains no person records"));
    }
    let focus = args.root.clone().unwrap_or_else(|| records[0].id.clone());

    let (graph, warnings) = link_records(&records);
    for warning in &warnings {
        eprintln!("warning: {warning}");
    }
    if !graph.contains(&focus) {
        return Err(anyhow::anyhow!("unknown person id '{focus}'"));
    }

    let root = graph.find_root(&focus).to_string();
    let metrics = FontMetrics::new(&config.theme, &config.layout);
    let tree = layout_tree(&graph, &root, &metrics, &config.layout);
    let svg = render_svg(&tree, &config.theme, &config.layout);

    match args.output_format {
        OutputFormat::Svg => {
            write_output_svg(&svg, args.output.as_deref())?;
        }
        #[cfg(feature = "png")]
        OutputFormat::Png => {
            let output = args
                .output
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Output path required for png output"))?;
            write_output_png(&svg, output, &config.render)?;
        }
    }
    Ok(())
}
