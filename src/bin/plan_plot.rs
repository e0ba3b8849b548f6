//! Build plot elements from a JSON job file and print the resulting plan.
//!
//! ```text
//! plan_plot job.json
//! ```
//!
//! ```json
//! {
//!   "files": ["sample_data/blue.ecsv", "sample_data/red.ecsv"],
//!   "xcol": 1,
//!   "ycol": [2, 4],
//!   "options": { "x_low": 400, "x_high": 800 },
//!   "layout": { "layout": "multi_tables_columns" },
//!   "render": { "nrows": 1, "ncols": 2 },
//!   "text_box": { "text": "Gain 10", "x": 0.05, "y": 0.95 }
//! }
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Deserialize;

use rusty_spectra::elements::{build_elements, Layout};
use rusty_spectra::render::{plan, BoxStrategy, ChangesStrategy, PassStrategy, RenderConfig, RenderPlan, Renderer, TextBox};
use rusty_spectra::source::{TableFromFile, TableOptions, TablesFromFiles, YColumns};

#[derive(Parser)]
#[command(name = "plan_plot", version, about = "Resolve plot elements from a JSON job and print the plan")]
struct Cli {
    /// JSON job file
    job: PathBuf,
}

#[derive(Debug, Deserialize)]
struct Job {
    files: Vec<PathBuf>,
    xcol: usize,
    ycol: YColumns,
    #[serde(default)]
    options: TableOptions,
    layout: Layout,
    #[serde(default)]
    render: RenderConfig,
    text_box: Option<TextBox>,
}

/// Writes a plain-text description of the plan to stdout.
struct TextRenderer;

impl Renderer for TextRenderer {
    fn render(&mut self, plan: &RenderPlan) -> rusty_spectra::Result<()> {
        println!("style: {:?}, grid {}x{}", plan.style, plan.nrows, plan.ncols);
        if let Some(title) = &plan.figure_title {
            println!("figure: {title}");
        }
        for (i, panel) in plan.panels.iter().enumerate() {
            println!(
                "panel {}: {}  x: {}  y: {}",
                i + 1,
                panel.title.as_deref().unwrap_or("-"),
                panel.x_label,
                panel.y_label
            );
            for line in &panel.reference_lines {
                println!("  | {} at {} ({})", line.label, line.x, line.style);
            }
            for series in &panel.series {
                println!(
                    "  {:<20} {} pts  marker {}  line {}  colour {}",
                    series.label.as_deref().unwrap_or("(no legend)"),
                    series.x.len(),
                    series.marker,
                    series.linestyle,
                    series.color.hex()
                );
            }
            for text_box in &panel.text_boxes {
                println!("  [{}]", text_box.text);
            }
        }
        if plan.hidden_panels > 0 {
            println!("{} empty panel(s) hidden", plan.hidden_panels);
        }
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let path = cli.job.display();
    let text = std::fs::read_to_string(&cli.job).with_context(|| format!("reading {path}"))?;
    let job: Job = serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;

    let elements = if job.files.len() == 1 {
        let source = TableFromFile::new(&job.files[0], job.xcol, job.ycol, job.options);
        build_elements(source, job.layout)
    } else {
        let source = TablesFromFiles::new(job.files, job.xcol, job.ycol, job.options);
        build_elements(source, job.layout)
    }
    .context("building plot elements")?;

    let strategy: Box<dyn PassStrategy> = match job.text_box {
        Some(text_box) => Box::new(BoxStrategy::new(job.render.changes, text_box)),
        None => Box::new(ChangesStrategy::new(job.render.changes)),
    };
    let plan = plan(&elements, &job.render, strategy.as_ref()).context("planning the figure")?;
    TextRenderer.render(&plan)?;
    Ok(())
}
