// tables.rs

use log::{debug, info};
use plotters::style::RGBColor;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use crate::color::parse_color;
use crate::error::PlotError;

/// Header name the name table must carry for the per-sample colour.
pub(crate) const COLOR_COLUMN: &str = "Color";

/// One row of the eigenvector table, reduced to the sample id and PC1/PC2.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EigenRecord {
    pub(crate) sample_id: String,
    pub(crate) x: f64,
    pub(crate) y: f64,
}

/// Per-component variances in table order. Always holds at least two values.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EigenValues(Vec<f64>);

impl EigenValues {
    pub(crate) fn new(values: Vec<f64>) -> Option<Self> {
        (values.len() >= 2).then_some(Self(values))
    }

    pub(crate) fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ColorEntry {
    pub(crate) sample_id: String,
    pub(crate) color: RGBColor,
}

/// Appends `suffix` to a path prefix without treating it as an extension,
/// so `out/run.v2` + `.evec` gives `out/run.v2.evec`.
pub(crate) fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut joined = prefix.as_os_str().to_owned();
    joined.push(suffix);
    PathBuf::from(joined)
}

/// Strips an `"<sample_id>:<suffix>"` identifier down to its sample id.
pub(crate) fn sample_id_of(composite: &str) -> &str {
    composite.split_once(':').map_or(composite, |(id, _)| id)
}

fn read_table_text(path: &Path) -> Result<String, PlotError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => PlotError::InputNotFound {
            path: path.to_path_buf(),
        },
        _ => PlotError::MalformedInput {
            path: path.to_path_buf(),
            detail: format!("unreadable: {}", e),
        },
    })
}

// Header-less tables: blank lines and '#' comment lines carry no rows.
fn data_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn parse_finite(path: &Path, line_no: usize, field: &str, what: &str) -> Result<f64, PlotError> {
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(PlotError::malformed(
            path,
            line_no,
            format!("{} '{}' is not a finite number", what, field),
        )),
    }
}

/// Loads the eigenvector table. Columns past the third are ignored.
pub(crate) fn load_eigen_records(path: &Path) -> Result<Vec<EigenRecord>, PlotError> {
    let text = read_table_text(path)?;
    let mut records = Vec::new();

    for (line_no, line) in data_lines(&text) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(PlotError::malformed(
                path,
                line_no,
                format!("expected at least 3 columns, found {}", fields.len()),
            ));
        }
        if fields.len() > 3 {
            debug!(
                "{}:{}: discarding {} trailing column(s).",
                path.display(),
                line_no,
                fields.len() - 3
            );
        }
        records.push(EigenRecord {
            sample_id: sample_id_of(fields[0]).to_string(),
            x: parse_finite(path, line_no, fields[1], "PC1 coordinate")?,
            y: parse_finite(path, line_no, fields[2], "PC2 coordinate")?,
        });
    }

    info!(
        "Loaded {} eigenvector row(s) from {}",
        records.len(),
        path.display()
    );
    Ok(records)
}

/// Loads the eigenvalue table: the first column of every row, in order.
pub(crate) fn load_eigenvalues(path: &Path) -> Result<EigenValues, PlotError> {
    let text = read_table_text(path)?;
    let mut values = Vec::new();

    for (line_no, line) in data_lines(&text) {
        if let Some(field) = line.split_whitespace().next() {
            values.push(parse_finite(path, line_no, field, "eigenvalue")?);
        }
    }

    let found = values.len();
    let eigenvalues = EigenValues::new(values).ok_or_else(|| PlotError::MalformedInput {
        path: path.to_path_buf(),
        detail: format!("expected at least 2 eigenvalues, found {}", found),
    })?;
    info!("Loaded {} eigenvalue(s) from {}", found, path.display());
    Ok(eigenvalues)
}

/// Loads the sample-to-colour table.
///
/// The first non-blank line is the header. The sample id comes from the first
/// header column; rows need at least as many fields as the header and any
/// extra trailing fields are ignored. Comment markers are not special here.
pub(crate) fn load_color_table(path: &Path) -> Result<Vec<ColorEntry>, PlotError> {
    let text = read_table_text(path)?;
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let missing = |column: &str| PlotError::MissingColumn {
        path: path.to_path_buf(),
        column: column.to_string(),
    };

    let header: Vec<&str> = lines
        .next()
        .map(|(_, line)| line.split_whitespace().collect())
        .unwrap_or_default();
    let color_idx = header
        .iter()
        .position(|name| *name == COLOR_COLUMN)
        .ok_or_else(|| missing(COLOR_COLUMN))?;
    let id_idx = 0;
    debug!(
        "Name table {}: sample id column '{}', colour column {}",
        path.display(),
        header[id_idx],
        color_idx + 1
    );

    let mut entries = Vec::new();
    for (line_no, line) in lines {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < header.len() {
            return Err(PlotError::malformed(
                path,
                line_no,
                format!(
                    "expected at least {} columns to match the header, found {}",
                    header.len(),
                    fields.len()
                ),
            ));
        }
        let color = parse_color(fields[color_idx])
            .map_err(|detail| PlotError::malformed(path, line_no, detail))?;
        entries.push(ColorEntry {
            sample_id: fields[id_idx].to_string(),
            color,
        });
    }

    info!(
        "Loaded {} sample colour(s) from {}",
        entries.len(),
        path.display()
    );
    Ok(entries)
}
