// axes.rs

use log::{debug, info, warn};
use plotters::style::RGBColor;
use std::collections::{HashMap, HashSet};

use crate::render::PlotConfig;
use crate::tables::{ColorEntry, EigenRecord};

/// A plotted sample: geometry from the eigenvector table, colour from the name table.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct JoinedPoint {
    pub(crate) sample_id: String,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) color: RGBColor,
}

/// Closed display interval `[lo, hi]` for one axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct AxisRange {
    pub(crate) lo: f64,
    pub(crate) hi: f64,
}

impl AxisRange {
    pub(crate) fn new(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    pub(crate) fn len(&self) -> f64 {
        self.hi - self.lo
    }

    pub(crate) fn center(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    /// Grows the range symmetrically about its centre to at least `len`.
    pub(crate) fn widened_to(self, len: f64) -> Self {
        if len <= self.len() {
            return self;
        }
        let (center, half) = (self.center(), len / 2.0);
        Self::new(center - half, center + half)
    }
}

/// Inner join on sample id.
///
/// Samples missing from either table are left out. Output follows the
/// eigenvector table order; a sample listed twice in the name table yields
/// one point per listing.
pub(crate) fn inner_join(records: &[EigenRecord], colors: &[ColorEntry]) -> Vec<JoinedPoint> {
    let mut by_id: HashMap<&str, Vec<&ColorEntry>> = HashMap::new();
    for entry in colors {
        by_id.entry(entry.sample_id.as_str()).or_default().push(entry);
    }

    let mut joined = Vec::with_capacity(records.len());
    let mut unmatched_records = Vec::new();
    for record in records {
        match by_id.get(record.sample_id.as_str()) {
            Some(entries) => joined.extend(entries.iter().map(|entry| JoinedPoint {
                sample_id: record.sample_id.clone(),
                x: record.x,
                y: record.y,
                color: entry.color,
            })),
            None => unmatched_records.push(record.sample_id.as_str()),
        }
    }

    let record_ids: HashSet<&str> = records.iter().map(|r| r.sample_id.as_str()).collect();
    let unmatched_colors = colors
        .iter()
        .filter(|entry| !record_ids.contains(entry.sample_id.as_str()))
        .count();
    info!(
        "Joined {} point(s); dropped {} eigenvector row(s) and {} name-table row(s) without a match.",
        joined.len(),
        unmatched_records.len(),
        unmatched_colors
    );
    if !unmatched_records.is_empty() {
        debug!("Samples without a colour entry: {:?}", unmatched_records);
    }
    joined
}

/// Pads `[min, max]` of `values` by `expand_by` of its width, split evenly
/// between both ends. Returns `None` for an empty input; identical values
/// give a zero-width range.
pub(crate) fn expanded_range<I>(values: I, expand_by: f64) -> Option<AxisRange>
where
    I: IntoIterator<Item = f64>,
{
    let (lo, hi) = values.into_iter().fold(None, |acc: Option<(f64, f64)>, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })?;
    let padding = (hi - lo).abs() * expand_by;
    Some(AxisRange::new(lo - 0.5 * padding, hi + 0.5 * padding))
}

/// Widens `target` about its centre to the length of `reference` when it is
/// the shorter of the two. A longer or equal `target` comes back unchanged.
pub(crate) fn calc_lims(target: AxisRange, reference: AxisRange) -> AxisRange {
    if target.len() < reference.len() {
        target.widened_to(reference.len())
    } else {
        target
    }
}

/// Final `(x, y)` window: expanded per axis, squared against each other, and
/// never degenerate.
pub(crate) fn plot_window(points: &[JoinedPoint], config: &PlotConfig) -> (AxisRange, AxisRange) {
    let x_expanded = expanded_range(points.iter().map(|p| p.x), config.expand_by);
    let y_expanded = expanded_range(points.iter().map(|p| p.y), config.expand_by);

    let (x_expanded, y_expanded) = match (x_expanded, y_expanded) {
        (Some(x), Some(y)) => (x, y),
        _ => {
            warn!(
                "No points to plot; using default axis range [{}, {}].",
                config.empty_range.0, config.empty_range.1
            );
            let fallback = AxisRange::new(config.empty_range.0, config.empty_range.1);
            (fallback, fallback)
        }
    };

    let mut x_range = calc_lims(x_expanded, y_expanded);
    let mut y_range = calc_lims(y_expanded, x_expanded);

    if x_expanded.len() == 0.0 && y_expanded.len() == 0.0 {
        warn!(
            "All points share one position; widening both axes to span {}.",
            config.min_axis_span
        );
        x_range = x_range.widened_to(config.min_axis_span);
        y_range = y_range.widened_to(config.min_axis_span);
    }

    info!(
        "Axis window: x [{:.4}, {:.4}], y [{:.4}, {:.4}]",
        x_range.lo, x_range.hi, y_range.lo, y_range.hi
    );
    (x_range, y_range)
}
