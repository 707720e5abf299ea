use crate::table::MetricTable;
use anyhow::Context;
use bench_run_model::Metric;
use polars::prelude::{col, lit, IntoLazy};

pub const BYTES_PER_MEGABYTE: f64 = 1_048_576.0;

/// Rescale the given byte-valued columns to megabytes.
///
/// Only the named columns change. Values are divided as they are, there is no rounding and no
/// clamping. Applying this twice divides twice.
pub fn to_megabytes(table: MetricTable, columns: &[Metric]) -> anyhow::Result<MetricTable> {
    if columns.is_empty() {
        return Ok(table);
    }

    let frame = table
        .frame()
        .clone()
        .lazy()
        .with_columns(
            columns
                .iter()
                .map(|metric| (col(metric.column()) / lit(BYTES_PER_MEGABYTE)).alias(metric.column()))
                .collect::<Vec<_>>(),
        )
        .collect()
        .context("Convert to megabytes")?;

    Ok(MetricTable::from_frame(frame))
}
