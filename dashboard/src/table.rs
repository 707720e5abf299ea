use anyhow::Context;
use bench_run_model::{
    extract_records, DocumentSource, Metric, MetricRecord, BASELINE_COLUMN, STEP_ID_COLUMN,
};
use itertools::Itertools;
use polars::prelude::*;

/// The flattened `(baseline, step) -> metrics` dataset.
///
/// One row per [MetricRecord], columns are `Baseline`, `StepId` and then every [Metric] as `f64`.
/// Row order is document order, then step order within a document.
#[derive(Debug, Clone)]
pub struct MetricTable {
    frame: DataFrame,
}

impl MetricTable {
    /// Build a table from already extracted records.
    pub fn from_records<I>(records: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = MetricRecord>,
    {
        let records = records.into_iter().collect::<Vec<_>>();

        let mut columns = Vec::with_capacity(Metric::ALL.len() + 2);
        columns.push(Column::new(
            BASELINE_COLUMN.into(),
            records.iter().map(|r| r.baseline.clone()).collect::<Vec<_>>(),
        ));
        columns.push(Column::new(
            STEP_ID_COLUMN.into(),
            records.iter().map(|r| r.step_id.clone()).collect::<Vec<_>>(),
        ));
        for metric in Metric::ALL {
            columns.push(Column::new(
                metric.column().into(),
                records.iter().map(|r| r.value(metric)).collect::<Vec<f64>>(),
            ));
        }

        let frame = DataFrame::new(columns).context("Build metric table")?;
        Ok(Self { frame })
    }

    /// Read every document from `source` and flatten it into one table.
    pub fn load<S: DocumentSource>(source: &S) -> anyhow::Result<Self> {
        let mut records = Vec::new();
        for id in source.list()? {
            let document = source
                .read(&id)
                .with_context(|| format!("Read run document {id:?}"))?;
            let before = records.len();
            records.extend(extract_records(document));
            log::debug!("Loaded {} steps from {id:?}", records.len() - before);
        }

        let table = Self::from_records(records)?;
        log::debug!("Loaded metric table with {} rows", table.height());
        log::trace!("Loaded frame: {}", table.frame);

        Ok(table)
    }

    pub(crate) fn from_frame(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Keep only the rows whose baseline is one of `baselines`.
    ///
    /// An empty selection means no filter, the whole table is returned.
    pub fn filter<B: AsRef<str>>(&self, baselines: &[B]) -> anyhow::Result<Self> {
        let Some(predicate) = baselines
            .iter()
            .map(|b| col(BASELINE_COLUMN).eq(lit(b.as_ref())))
            .reduce(|acc, expr| acc.or(expr))
        else {
            return Ok(self.clone());
        };

        let frame = self
            .frame
            .clone()
            .lazy()
            .filter(predicate)
            .collect()
            .context("Filter by baseline")?;

        Ok(Self { frame })
    }

    /// Rows for one step, in table order.
    pub(crate) fn select_step(&self, step: &str) -> anyhow::Result<Self> {
        self.select(col(STEP_ID_COLUMN).eq(lit(step)))
    }

    /// Rows for one baseline, in table order.
    pub(crate) fn select_baseline(&self, baseline: &str) -> anyhow::Result<Self> {
        self.select(col(BASELINE_COLUMN).eq(lit(baseline)))
    }

    fn select(&self, predicate: Expr) -> anyhow::Result<Self> {
        let frame = self.frame.clone().lazy().filter(predicate).collect()?;
        Ok(Self { frame })
    }

    /// Distinct baselines in first-seen order.
    pub fn baselines(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.labels(BASELINE_COLUMN)?.into_iter().unique().collect())
    }

    /// Distinct step ids in first-seen order.
    pub fn steps(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.labels(STEP_ID_COLUMN)?.into_iter().unique().collect())
    }

    /// All values of a label column, one per row.
    pub(crate) fn labels(&self, column: &str) -> anyhow::Result<Vec<String>> {
        Ok(self
            .frame
            .column(column)?
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or_default().to_string())
            .collect())
    }

    /// All values of a metric column, one per row.
    pub fn values(&self, metric: Metric) -> anyhow::Result<Vec<f64>> {
        Ok(self
            .frame
            .column(metric.column())?
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or_default())
            .collect())
    }

    /// Turn the rows back into records.
    pub fn records(&self) -> anyhow::Result<Vec<MetricRecord>> {
        let baselines = self.labels(BASELINE_COLUMN)?;
        let steps = self.labels(STEP_ID_COLUMN)?;

        let mut records = baselines
            .into_iter()
            .zip(steps)
            .map(|(baseline, step_id)| MetricRecord {
                baseline,
                step_id,
                ..Default::default()
            })
            .collect::<Vec<_>>();

        for metric in Metric::ALL {
            for (record, value) in records.iter_mut().zip(self.values(metric)?) {
                record.set_value(metric, value);
            }
        }

        Ok(records)
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.height() == 0
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bench_run_model::{load_run_document, MemorySource};
    use pretty_assertions::assert_eq;

    pub(crate) fn record(baseline: &str, step: &str, bytes_in_use: f64) -> MetricRecord {
        MetricRecord {
            baseline: baseline.to_string(),
            step_id: step.to_string(),
            bytes_in_use,
            ..Default::default()
        }
    }

    fn sample_table() -> MetricTable {
        MetricTable::from_records(vec![
            record("B", "s1", 1.0),
            record("A", "s1", 2.0),
            record("B", "s2", 3.0),
            record("C", "s1", 4.0),
            record("A", "s2", 5.0),
        ])
        .unwrap()
    }

    #[test]
    fn empty_table_has_full_schema() -> anyhow::Result<()> {
        let table = MetricTable::from_records(Vec::new())?;
        assert!(table.is_empty());
        assert_eq!(table.frame().width(), 15);
        assert!(table.baselines()?.is_empty());
        assert!(table.steps()?.is_empty());
        assert!(table.records()?.is_empty());
        Ok(())
    }

    #[test]
    fn labels_are_first_seen_order() -> anyhow::Result<()> {
        let table = sample_table();
        assert_eq!(table.baselines()?, vec!["B", "A", "C"]);
        assert_eq!(table.steps()?, vec!["s1", "s2"]);
        Ok(())
    }

    #[test]
    fn records_survive_the_table() -> anyhow::Result<()> {
        let mut original = record("X", "0_Load", 10.0);
        for (i, metric) in Metric::ALL.into_iter().enumerate() {
            original.set_value(metric, i as f64 * 1.5);
        }

        let table = MetricTable::from_records(vec![original.clone()])?;
        assert_eq!(table.records()?, vec![original]);
        Ok(())
    }

    #[test]
    fn empty_filter_returns_everything() -> anyhow::Result<()> {
        let table = sample_table();
        let filtered = table.filter::<&str>(&[])?;
        assert_eq!(filtered.records()?, table.records()?);
        Ok(())
    }

    #[test]
    fn filter_keeps_selected_baselines_in_order() -> anyhow::Result<()> {
        let table = sample_table();
        let filtered = table.filter(&["A", "B"])?;

        assert_eq!(
            filtered.records()?,
            vec![
                record("B", "s1", 1.0),
                record("A", "s1", 2.0),
                record("B", "s2", 3.0),
                record("A", "s2", 5.0),
            ]
        );
        Ok(())
    }

    #[test]
    fn filter_without_matches_is_empty() -> anyhow::Result<()> {
        let filtered = sample_table().filter(&["nope"])?;
        assert!(filtered.is_empty());
        assert!(filtered.baselines()?.is_empty());
        Ok(())
    }

    #[test]
    fn load_preserves_document_then_step_order() -> anyhow::Result<()> {
        let doc1 = load_run_document(
            r#"{"Environment": {"Environment": {"Group": "X"}}, "StepDetails": [{"StepId": "0_Load", "MemoryState": {"Bytes in use": 200}}]}"#
                .as_bytes(),
        )?;
        let doc2 = load_run_document(
            r#"{"Environment": {"Environment": {"Group": "Y"}}, "StepDetails": [{"StepId": "0_Load", "MemoryState": {"Bytes in use": 400}}]}"#
                .as_bytes(),
        )?;
        let no_steps = load_run_document(r#"{"Environment": {"Environment": {"Group": "Z"}}}"#.as_bytes())?;

        let table = MetricTable::load(&MemorySource::new(vec![doc1, no_steps, doc2]))?;

        assert_eq!(table.height(), 2);
        assert_eq!(table.baselines()?, vec!["X", "Y"]);
        assert_eq!(
            table.records()?,
            vec![record("X", "0_Load", 200.0), record("Y", "0_Load", 400.0)]
        );
        Ok(())
    }
}
