// render.rs

use log::{debug, info, warn};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use resvg::tiny_skia;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};
use usvg::fontdb;

use crate::axes::{AxisRange, JoinedPoint};
use crate::error::PlotError;
use crate::labels::{layout_labels, LabelStyle};
use crate::tables::with_suffix;

// The chart is laid out in CSS pixels; the PDF page and PNG scale derive from it.
const BASE_DPI: f32 = 96.0;
const FONT_FAMILY: &str = "sans-serif";

/// Rendering parameters. The CLI always runs with `PlotConfig::default()`.
#[derive(Debug, Clone)]
pub(crate) struct PlotConfig {
    /// Axis padding factor `k` used by `expanded_range`.
    pub(crate) expand_by: f64,
    /// Edge length of the square output, in inches.
    pub(crate) size_in: f32,
    /// Raster resolution of the PNG.
    pub(crate) dpi: f32,
    pub(crate) point_radius: u32,
    pub(crate) label_font_size: f64,
    pub(crate) label_offset_px: i32,
    pub(crate) max_bump_steps: usize,
    pub(crate) tick_font_size: f64,
    pub(crate) axis_font_size: f64,
    pub(crate) margin_px: u32,
    /// Shared size of the left and bottom label areas; equal sizes keep the plot square.
    pub(crate) label_area_px: u32,
    /// Smallest axis length drawn when every point sits at one position.
    pub(crate) min_axis_span: f64,
    /// Axis range used when the join leaves no points.
    pub(crate) empty_range: (f64, f64),
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            expand_by: 0.2,
            size_in: 5.0,
            dpi: 96.0,
            point_radius: 3,
            label_font_size: 9.0,
            label_offset_px: 5,
            max_bump_steps: 64,
            tick_font_size: 11.0,
            axis_font_size: 13.0,
            margin_px: 12,
            label_area_px: 48,
            min_axis_span: 0.1,
            empty_range: (-1.0, 1.0),
        }
    }
}

impl PlotConfig {
    fn canvas_px(&self) -> u32 {
        (self.size_in * BASE_DPI).round() as u32
    }

    fn raster_px(&self) -> u32 {
        (self.size_in * self.dpi).round() as u32
    }

    fn label_style(&self) -> LabelStyle {
        LabelStyle {
            font_size: self.label_font_size,
            offset_px: self.label_offset_px,
            max_bump_steps: self.max_bump_steps,
            top_px: 0,
        }
    }
}

/// Everything drawn on the chart, computed before any drawing starts.
#[derive(Debug)]
pub(crate) struct ChartData<'a> {
    pub(crate) points: &'a [JoinedPoint],
    pub(crate) x_range: AxisRange,
    pub(crate) y_range: AxisRange,
    pub(crate) x_label: String,
    pub(crate) y_label: String,
}

fn render_err(e: impl std::fmt::Display) -> PlotError {
    PlotError::Render(e.to_string())
}

/// Draws the scatter plot into an SVG document.
pub(crate) fn draw_chart(chart: &ChartData<'_>, config: &PlotConfig) -> Result<String, PlotError> {
    let side = config.canvas_px();
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (side, side)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut plot = ChartBuilder::on(&root)
            .margin(config.margin_px)
            .x_label_area_size(config.label_area_px)
            .y_label_area_size(config.label_area_px)
            .build_cartesian_2d(
                chart.x_range.lo..chart.x_range.hi,
                chart.y_range.lo..chart.y_range.hi,
            )
            .map_err(render_err)?;

        plot.configure_mesh()
            .disable_mesh()
            .x_labels(5)
            .y_labels(5)
            .x_desc(chart.x_label.as_str())
            .y_desc(chart.y_label.as_str())
            .label_style((FONT_FAMILY, config.tick_font_size))
            .axis_desc_style((FONT_FAMILY, config.axis_font_size))
            .draw()
            .map_err(render_err)?;

        plot.draw_series(
            chart
                .points
                .iter()
                .map(|p| Circle::new((p.x, p.y), config.point_radius, p.color.filled())),
        )
        .map_err(render_err)?;

        let anchors: Vec<(i32, i32)> = chart
            .points
            .iter()
            .map(|p| plot.backend_coord(&(p.x, p.y)))
            .collect();
        let texts: Vec<&str> = chart.points.iter().map(|p| p.sample_id.as_str()).collect();
        let boxes = layout_labels(&anchors, &texts, &config.label_style());

        for (point, label_box) in chart.points.iter().zip(&boxes) {
            let style = (FONT_FAMILY, config.label_font_size)
                .into_font()
                .color(&point.color)
                .pos(Pos::new(HPos::Left, VPos::Top));
            root.draw(&Text::new(
                point.sample_id.as_str(),
                (label_box.x, label_box.y),
                style,
            ))
            .map_err(render_err)?;
        }

        root.present().map_err(render_err)?;
    }
    debug!("Chart drawn as {} bytes of SVG.", svg.len());
    Ok(svg)
}

fn parse_svg(svg: &str, fonts: &Arc<fontdb::Database>) -> Result<usvg::Tree, PlotError> {
    let mut options = usvg::Options::default();
    options.fontdb = Arc::clone(fonts);
    usvg::Tree::from_str(svg, &options).map_err(|e| PlotError::Render(format!("SVG parse: {}", e)))
}

/// One output artifact format. Encoding is pure; `write` owns the file handle
/// for the duration of a single call.
pub(crate) trait OutputTarget: Sync {
    fn name(&self) -> &'static str;

    fn suffix(&self) -> &'static str;

    fn encode(&self, tree: &usvg::Tree, config: &PlotConfig) -> Result<Vec<u8>, PlotError>;

    fn path_for(&self, output_prefix: &Path) -> PathBuf {
        with_suffix(output_prefix, self.suffix())
    }

    /// Writes `bytes` to the target path. On failure nothing is left behind.
    fn write(&self, output_prefix: &Path, bytes: &[u8]) -> Result<PathBuf, PlotError> {
        let path = self.path_for(output_prefix);
        let result = File::create(&path).and_then(|file| {
            let mut writer = BufWriter::new(file);
            writer.write_all(bytes)?;
            writer.flush()
        });
        match result {
            Ok(()) => {
                info!("Wrote {} ({} bytes)", path.display(), bytes.len());
                Ok(path)
            }
            Err(source) => {
                let _ = fs::remove_file(&path);
                Err(PlotError::Output { path, source })
            }
        }
    }
}

/// Vector document: the SVG converted to a single-page PDF.
pub(crate) struct PdfTarget;

impl OutputTarget for PdfTarget {
    fn name(&self) -> &'static str {
        "PDF"
    }

    fn suffix(&self) -> &'static str {
        ".pdf"
    }

    fn encode(&self, tree: &usvg::Tree, _config: &PlotConfig) -> Result<Vec<u8>, PlotError> {
        let mut page = svg2pdf::PageOptions::default();
        page.dpi = BASE_DPI;
        svg2pdf::to_pdf(tree, svg2pdf::ConversionOptions::default(), page)
            .map_err(|e| PlotError::Render(format!("PDF conversion: {:?}", e)))
    }
}

/// Raster image: the SVG rasterised on a white square at `config.dpi`.
pub(crate) struct PngTarget;

impl OutputTarget for PngTarget {
    fn name(&self) -> &'static str {
        "PNG"
    }

    fn suffix(&self) -> &'static str {
        ".png"
    }

    fn encode(&self, tree: &usvg::Tree, config: &PlotConfig) -> Result<Vec<u8>, PlotError> {
        let side = config.raster_px();
        let mut pixmap = tiny_skia::Pixmap::new(side, side)
            .ok_or_else(|| PlotError::Render(format!("cannot allocate {}x{} raster", side, side)))?;
        pixmap.fill(tiny_skia::Color::WHITE);

        let size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            side as f32 / size.width(),
            side as f32 / size.height(),
        );
        resvg::render(tree, transform, &mut pixmap.as_mut());

        pixmap
            .encode_png()
            .map_err(|e| PlotError::Render(format!("PNG encoding: {}", e)))
    }
}

fn encode_with(
    target: &dyn OutputTarget,
    svg: &str,
    fonts: &Arc<fontdb::Database>,
    config: &PlotConfig,
) -> Result<Vec<u8>, PlotError> {
    let start = Instant::now();
    let tree = parse_svg(svg, fonts)?;
    let bytes = target.encode(&tree, config)?;
    debug!(
        "{} encoded in {:.2?} ({} bytes)",
        target.name(),
        start.elapsed(),
        bytes.len()
    );
    Ok(bytes)
}

/// Draws the chart and writes `<output_prefix>.pdf` and `<output_prefix>.png`.
///
/// Both artifacts are encoded in memory before either file is created. If a
/// later write fails, earlier ones are removed so no partial output remains.
pub(crate) fn render_outputs(
    chart: &ChartData<'_>,
    output_prefix: &Path,
    config: &PlotConfig,
) -> Result<Vec<PathBuf>, PlotError> {
    let svg = draw_chart(chart, config)?;

    let mut fonts = fontdb::Database::new();
    fonts.load_system_fonts();
    if fonts.is_empty() {
        warn!("No system fonts found; text will be missing from the PDF and PNG.");
    }
    let fonts = Arc::new(fonts);

    let targets: [&dyn OutputTarget; 2] = [&PdfTarget, &PngTarget];
    let (pdf, png) = rayon::join(
        || encode_with(targets[0], &svg, &fonts, config),
        || encode_with(targets[1], &svg, &fonts, config),
    );
    let encoded = [pdf?, png?];

    let mut written: Vec<PathBuf> = Vec::with_capacity(targets.len());
    for (target, bytes) in targets.iter().zip(&encoded) {
        match target.write(output_prefix, bytes) {
            Ok(path) => written.push(path),
            Err(e) => {
                for path in &written {
                    if let Err(rm) = fs::remove_file(path) {
                        warn!("Could not remove partial output {}: {}", path.display(), rm);
                    }
                }
                return Err(e);
            }
        }
    }
    Ok(written)
}
