// main.rs

// --- External Crate Imports ---
use anyhow::{Context, Result};
use clap::{error::ErrorKind, Parser};
use log::{error, info};
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

mod axes;
mod color;
mod error;
mod labels;
mod render;
mod tables;
mod variance;

use crate::error::PlotError;

// --- Main Function ---
fn main() -> ExitCode {
    let cli_args = match cli::CliArgs::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(_) => {
            eprintln!("{}", cli::usage_error());
            return ExitCode::from(1);
        }
    };

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_micros()
        .init();

    info!("Starting pca_plot with args: {:?}", cli_args);

    match run(&cli_args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli_args: &cli::CliArgs) -> Result<()> {
    let total_time_start = Instant::now();
    let config = render::PlotConfig::default();

    let summary = plot_pca(
        &cli_args.input_prefix,
        &cli_args.name_table,
        &cli_args.output_prefix,
        &config,
    )
    .with_context(|| {
        format!(
            "Failed to plot PCA for input prefix '{}'",
            cli_args.input_prefix.display()
        )
    })?;

    info!(
        "pca_plot finished successfully in {:.2?}: {} point(s) plotted ({} / {}) into {}.",
        total_time_start.elapsed(),
        summary.points_plotted,
        summary.x_label,
        summary.y_label,
        summary
            .outputs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

/// What a completed run produced.
#[derive(Debug)]
struct PlotSummary {
    points_plotted: usize,
    x_label: String,
    y_label: String,
    outputs: Vec<PathBuf>,
}

/// Load -> join -> axis window -> render twice.
///
/// All inputs are read and validated before any output file is created.
fn plot_pca(
    input_prefix: &Path,
    name_table: &Path,
    output_prefix: &Path,
    config: &render::PlotConfig,
) -> Result<PlotSummary, PlotError> {
    // --- 1. Load Tables ---
    let records = tables::load_eigen_records(&tables::with_suffix(input_prefix, ".evec"))?;
    let eigenvalues = tables::load_eigenvalues(&tables::with_suffix(input_prefix, ".eval"))?;
    let colors = tables::load_color_table(name_table)?;

    // --- 2. Variance Explained ---
    let variance = variance::variance_explained(&eigenvalues)?;

    // --- 3. Join & Axis Window ---
    let points = axes::inner_join(&records, &colors);
    let (x_range, y_range) = axes::plot_window(&points, config);

    // --- 4. Render ---
    let chart = render::ChartData {
        points: &points,
        x_range,
        y_range,
        x_label: variance.pc1_label(),
        y_label: variance.pc2_label(),
    };
    let outputs = render::render_outputs(&chart, output_prefix, config)?;

    Ok(PlotSummary {
        points_plotted: points.len(),
        x_label: chart.x_label,
        y_label: chart.y_label,
        outputs,
    })
}

// --- Module Implementations ---

mod cli {
    use clap::Parser;
    use std::path::PathBuf;

    use crate::error::PlotError;

    #[derive(Parser, Debug)]
    #[command(author, version, about = "Render a labeled PCA scatter plot to PDF and PNG.", long_about = None)]
    pub(crate) struct CliArgs {
        /// Prefix of the `<prefix>.evec` and `<prefix>.eval` tables.
        pub(crate) input_prefix: PathBuf,

        /// Whitespace-delimited sample table with a header and a `Color` column.
        pub(crate) name_table: PathBuf,

        /// Prefix of the `<prefix>.pdf` and `<prefix>.png` outputs.
        pub(crate) output_prefix: PathBuf,
    }

    pub(crate) fn usage_error() -> PlotError {
        let program = std::env::args()
            .next()
            .as_deref()
            .and_then(|arg0| std::path::Path::new(arg0).file_name()?.to_str().map(str::to_owned))
            .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
        PlotError::Usage { program }
    }
}
