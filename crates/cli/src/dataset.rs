//! CSV loading for replay sessions.
//!
//! Feature columns are selected by name and cast to `Float64`. Labels come
//! from a global `label` column (`1` / `-1`) or from per-group partial label
//! columns `label_0 .. label_{g-1}`. An optional `id` column keeps caller ids;
//! otherwise the row index is used. Label cells other than `1` / `-1` and ids
//! that are not non-negative integers are rejected.

use anyhow::{bail, Context, Result};
use polars::prelude::*;
use std::path::Path;
use tsm::{DataPoint, Label, LabelGroup, LabeledPoint, UserLabel};

fn load(path: &Path) -> Result<DataFrame> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(100))
        .finish()
        .with_context(|| format!("opening {}", path.display()))?
        .collect()
        .with_context(|| format!("reading {}", path.display()))?;
    tracing::info!(
        path = %path.display(),
        rows = df.height(),
        cols = df.width(),
        "csv_loaded"
    );
    Ok(df)
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .with_context(|| format!("missing column {name}"))?
        .cast(&DataType::Float64)?;
    column
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.with_context(|| format!("empty cell in column {name}, row {row}")))
        .collect()
}

fn row_id(row: usize, v: f64) -> Result<usize> {
    if v.fract() != 0.0 || v < 0.0 {
        bail!("id column, row {row}: expected a non-negative integer, got {v}");
    }
    Ok(v as usize)
}

fn row_label(column: &str, row: usize, v: f64) -> Result<Label> {
    if v == 1.0 {
        Ok(Label::Positive)
    } else if v == -1.0 {
        Ok(Label::Negative)
    } else {
        bail!("column {column}, row {row}: expected 1 or -1, got {v}")
    }
}

fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

fn points(df: &DataFrame, columns: &[String]) -> Result<Vec<DataPoint>> {
    let features = columns
        .iter()
        .map(|c| float_column(df, c))
        .collect::<Result<Vec<_>>>()?;
    let ids: Vec<usize> = if has_column(df, "id") {
        float_column(df, "id")?
            .into_iter()
            .enumerate()
            .map(|(row, v)| row_id(row, v))
            .collect::<Result<_>>()?
    } else {
        (0..df.height()).collect()
    };
    Ok(ids
        .into_iter()
        .enumerate()
        .map(|(row, id)| {
            let values: Vec<f64> = features.iter().map(|col| col[row]).collect();
            DataPoint::new(id, &values)
        })
        .collect())
}

/// Unlabeled candidates.
pub fn read_points(path: &Path, columns: &[String]) -> Result<Vec<DataPoint>> {
    points(&load(path)?, columns)
}

/// Labeled rows for a session with `n_groups` feature groups.
pub fn read_labeled(path: &Path, columns: &[String], n_groups: usize) -> Result<Vec<LabeledPoint>> {
    let df = load(path)?;
    let labels: Vec<UserLabel> = if has_column(&df, "label") {
        float_column(&df, "label")?
            .into_iter()
            .enumerate()
            .map(|(row, v)| row_label("label", row, v).map(UserLabel::Global))
            .collect::<Result<_>>()?
    } else if has_column(&df, "label_0") {
        let names: Vec<String> = (0..n_groups).map(|g| format!("label_{g}")).collect();
        let partial = names
            .iter()
            .map(|name| float_column(&df, name))
            .collect::<Result<Vec<_>>>()?;
        (0..df.height())
            .map(|row| -> Result<UserLabel> {
                let group = names
                    .iter()
                    .zip(&partial)
                    .map(|(name, col)| row_label(name, row, col[row]))
                    .collect::<Result<Vec<_>>>()?;
                Ok(UserLabel::Partial(LabelGroup::new(group)?))
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        bail!(
            "{} has neither a `label` column nor `label_0..label_{}` columns",
            path.display(),
            n_groups.saturating_sub(1)
        );
    };
    Ok(points(&df, columns)?
        .into_iter()
        .zip(labels)
        .map(|(p, l)| LabeledPoint::new(p, l))
        .collect())
}
