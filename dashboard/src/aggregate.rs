use crate::group::MetricColumnGroup;
use crate::table::MetricTable;
use bench_run_model::{Metric, BASELINE_COLUMN, STEP_ID_COLUMN};
use itertools::Itertools;
use std::collections::HashMap;

/// Fixed geometry of a clustered stacked bar chart, in x axis units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterLayout {
    pub bar_width: f64,
    /// Gap between two bars of the same group
    pub bar_spacing: f64,
    /// Gap between two groups
    pub group_spacing: f64,
}

impl Default for ClusterLayout {
    fn default() -> Self {
        Self {
            bar_width: 0.15,
            bar_spacing: 0.05,
            group_spacing: 0.5,
        }
    }
}

impl ClusterLayout {
    /// Width of one baseline group including the trailing group gap.
    pub fn group_width(&self, steps: usize) -> f64 {
        self.bar_width * steps as f64
            + self.bar_spacing * steps.saturating_sub(1) as f64
            + self.group_spacing
    }

    pub fn group_position(&self, baseline: usize, steps: usize) -> f64 {
        baseline as f64 * self.group_width(steps)
    }

    /// Centre of the bar for `step` inside the group for `baseline`.
    pub fn bar_position(&self, baseline: usize, step: usize, steps: usize) -> f64 {
        self.group_position(baseline, steps) + step as f64 * (self.bar_width + self.bar_spacing)
    }

    /// Where the baseline label goes, the middle of the group's bars.
    pub fn tick_position(&self, baseline: usize, steps: usize) -> f64 {
        self.group_position(baseline, steps)
            + (self.group_width(steps) - self.group_spacing) / 2.0
            - self.bar_width / 2.0
    }
}

/// One stacked segment of a bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackSegment {
    pub metric: Metric,
    pub bottom: f64,
    pub top: f64,
}

/// Column values for every `(baseline, step)` pair, ready to be drawn as clustered stacked bars.
///
/// Baselines are the outer axis and steps the inner one, both in first-seen table order. A pair
/// without a row occupies its slot with zeros. When a pair has several rows only the first one
/// in table order is used.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedClusters {
    pub group: MetricColumnGroup,
    pub baselines: Vec<String>,
    pub steps: Vec<String>,
    /// Indexed `[baseline][step][column]`
    values: Vec<Vec<Vec<f64>>>,
}

impl StackedClusters {
    pub fn aggregate(table: &MetricTable, group: MetricColumnGroup) -> anyhow::Result<Self> {
        let baselines = table.baselines()?;
        let steps = table.steps()?;

        let mut first_rows = HashMap::new();
        for record in table.records()? {
            first_rows
                .entry((record.baseline.clone(), record.step_id.clone()))
                .or_insert(record);
        }

        let values = baselines
            .iter()
            .map(|baseline| {
                steps
                    .iter()
                    .map(|step| match first_rows.get(&(baseline.clone(), step.clone())) {
                        Some(record) => group.columns.iter().map(|m| record.value(*m)).collect(),
                        None => vec![0.0; group.columns.len()],
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            group,
            baselines,
            steps,
            values,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.baselines.is_empty() || self.steps.is_empty()
    }

    /// Column values for one pair, in group column order.
    pub fn values(&self, baseline: usize, step: usize) -> &[f64] {
        &self.values[baseline][step]
    }

    pub fn value(&self, baseline: &str, step: &str, metric: Metric) -> Option<f64> {
        let b = self.baselines.iter().position(|v| v == baseline)?;
        let s = self.steps.iter().position(|v| v == step)?;
        let c = self.group.columns.iter().position(|m| *m == metric)?;
        Some(self.values[b][s][c])
    }

    /// The bar for one pair, stacked bottom-up in group column order.
    pub fn segments(&self, baseline: usize, step: usize) -> Vec<StackSegment> {
        let mut bottom = 0.0;
        self.group
            .columns
            .iter()
            .zip(self.values(baseline, step))
            .map(|(metric, value)| {
                let segment = StackSegment {
                    metric: *metric,
                    bottom,
                    top: bottom + value,
                };
                bottom = segment.top;
                segment
            })
            .collect()
    }

    /// Lowest and highest point reached by any segment, always including zero.
    pub fn value_range(&self) -> (f64, f64) {
        let mut range = (0.0_f64, 0.0_f64);
        for b in 0..self.baselines.len() {
            for s in 0..self.steps.len() {
                for segment in self.segments(b, s) {
                    range.0 = range.0.min(segment.bottom.min(segment.top));
                    range.1 = range.1.max(segment.bottom.max(segment.top));
                }
            }
        }
        range
    }
}

/// Which label column is used as the horizontal axis of a trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendAxis {
    Baseline,
    Step,
}

impl TrendAxis {
    pub fn column(&self) -> &'static str {
        match self {
            TrendAxis::Baseline => BASELINE_COLUMN,
            TrendAxis::Step => STEP_ID_COLUMN,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendLine {
    pub metric: Metric,
    /// `(category index, value)` in table row order
    pub points: Vec<(usize, f64)>,
}

/// One line per group column plotted against a categorical axis.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendSeries {
    pub group: MetricColumnGroup,
    pub axis: TrendAxis,
    /// First-seen order
    pub categories: Vec<String>,
    pub lines: Vec<TrendLine>,
}

impl TrendSeries {
    fn from_selection(
        selection: &MetricTable,
        axis: TrendAxis,
        group: MetricColumnGroup,
    ) -> anyhow::Result<Self> {
        let labels = selection.labels(axis.column())?;
        let categories = labels.iter().unique().cloned().collect::<Vec<_>>();
        let positions = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect::<HashMap<_, _>>();
        let indices = labels.iter().map(|l| positions[l.as_str()]).collect::<Vec<_>>();

        let mut lines = Vec::with_capacity(group.columns.len());
        for metric in group.columns {
            lines.push(TrendLine {
                metric: *metric,
                points: indices
                    .iter()
                    .copied()
                    .zip(selection.values(*metric)?)
                    .collect(),
            });
        }

        Ok(Self {
            group,
            axis,
            categories,
            lines,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Lowest and highest plotted value, always including zero.
    pub fn value_range(&self) -> (f64, f64) {
        self.lines
            .iter()
            .flat_map(|l| l.points.iter().map(|(_, v)| *v))
            .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }
}

/// For every requested step, the group's columns plotted against baseline.
///
/// Steps that do not occur in the table produce an empty series rather than an error.
pub fn stepwise<S: AsRef<str>>(
    table: &MetricTable,
    steps: &[S],
    group: MetricColumnGroup,
) -> anyhow::Result<Vec<(String, TrendSeries)>> {
    steps
        .iter()
        .map(|step| {
            let selection = table.select_step(step.as_ref())?;
            log::debug!(
                "Step {} selects {} rows for {}",
                step.as_ref(),
                selection.height(),
                group.name
            );
            Ok((
                step.as_ref().to_string(),
                TrendSeries::from_selection(&selection, TrendAxis::Baseline, group)?,
            ))
        })
        .collect()
}

/// The group's columns plotted against step for a single baseline.
///
/// Expects byte columns to have been converted already if megabytes are wanted.
pub fn baseline_trend(
    table: &MetricTable,
    baseline: &str,
    group: MetricColumnGroup,
) -> anyhow::Result<TrendSeries> {
    let selection = table.select_baseline(baseline)?;
    log::debug!(
        "Baseline {baseline} selects {} rows for {}",
        selection.height(),
        group.name
    );
    TrendSeries::from_selection(&selection, TrendAxis::Step, group)
}
