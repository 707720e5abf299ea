use crate::aggregate::{baseline_trend, stepwise, StackedClusters, TrendSeries};
use crate::group::{MetricColumnGroup, PlotType, ALL_GROUPS};
use crate::render::{render_stacked_clusters, render_trend, Chart};
use crate::table::MetricTable;
use crate::units::to_megabytes;
use anyhow::Context;
use bench_run_model::Metric;

/// Everything a page needs to show: the available filters, what is selected and the charts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageData {
    pub heading: String,
    pub baselines: Vec<String>,
    pub steps: Vec<String>,
    pub selected_baselines: Vec<String>,
    pub selected_step: Option<String>,
    pub selected_baseline: Option<String>,
    pub charts: Vec<Chart>,
}

impl PageData {
    fn new(heading: impl Into<String>, table: &MetricTable) -> anyhow::Result<Self> {
        Ok(Self {
            heading: heading.into(),
            baselines: table.baselines()?,
            steps: table.steps()?,
            ..Default::default()
        })
    }
}

pub fn stacked_chart_title(group: &MetricColumnGroup) -> String {
    format!("{} by Baseline and Step", group.label)
}

/// The clustered stacked bar chart for one group.
pub fn stacked_chart(table: &MetricTable, group: MetricColumnGroup) -> anyhow::Result<Chart> {
    let clusters = StackedClusters::aggregate(table, group)
        .with_context(|| format!("Aggregate {} by baseline and step", group.name))?;
    render_stacked_clusters(&clusters, &stacked_chart_title(&group))
}

/// The four summary charts, restricted to `selected` baselines when any are given.
pub fn home(table: &MetricTable, selected: Vec<String>) -> anyhow::Result<PageData> {
    let filtered = table.filter(&selected)?;
    log::debug!(
        "Home page with {} of {} rows for {} selected baselines",
        filtered.height(),
        table.height(),
        selected.len()
    );

    let mut page = PageData::new("Benchmark runs", table)?;
    page.charts = PlotType::ALL
        .iter()
        .map(|plot| stacked_chart(&filtered, plot.group()))
        .collect::<anyhow::Result<Vec<_>>>()?;
    page.selected_baselines = selected;

    Ok(page)
}

/// A single summary chart.
pub fn plot(table: &MetricTable, plot_type: PlotType) -> anyhow::Result<PageData> {
    let group = plot_type.group();
    let mut page = PageData::new(stacked_chart_title(&group), table)?;
    page.charts.push(stacked_chart(table, group)?);
    Ok(page)
}

/// Every group compared across baselines at one step.
pub fn stepwise_analysis(table: &MetricTable, step: &str) -> anyhow::Result<PageData> {
    let mut page = PageData::new(format!("Step: {step}"), table)?;
    for group in ALL_GROUPS {
        for (step, series) in stepwise(table, &[step], group)? {
            page.charts.push(render_trend(
                &series,
                &format!("{} at Step: {step}", group.label),
                group.axis_label,
            )?);
        }
    }
    page.selected_step = Some(step.to_string());
    Ok(page)
}

/// Every group's trend across the steps of one baseline, byte columns converted to megabytes.
pub fn baseline_series(
    table: &MetricTable,
    baseline: &str,
) -> anyhow::Result<Vec<(MetricColumnGroup, TrendSeries)>> {
    let byte_columns = Metric::ALL
        .into_iter()
        .filter(Metric::is_bytes)
        .collect::<Vec<_>>();
    let converted = to_megabytes(table.clone(), &byte_columns)?;

    ALL_GROUPS
        .into_iter()
        .map(|group| Ok((group, baseline_trend(&converted, baseline, group)?)))
        .collect()
}

/// Every group across the steps of one baseline, with byte columns shown in megabytes.
pub fn baseline_analysis(table: &MetricTable, baseline: &str) -> anyhow::Result<PageData> {
    let mut page = PageData::new(format!("Baseline: {baseline}"), table)?;
    for (group, trend) in baseline_series(table, baseline)? {
        page.charts.push(render_trend(
            &trend,
            &format!("{} for Baseline: {baseline}", group.label),
            group.megabyte_axis_label,
        )?);
    }
    page.selected_baseline = Some(baseline.to_string());
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::MEMORY;
    use crate::table::tests::record;
    use crate::units::BYTES_PER_MEGABYTE;
    use base64::Engine;
    use pretty_assertions::assert_eq;

    fn table() -> MetricTable {
        MetricTable::from_records(vec![
            record("X", "0_Load", 200.0),
            record("Y", "0_Load", 400.0),
            record("X", "1_Edit", 1_048_576.0),
        ])
        .unwrap()
    }

    #[test]
    fn home_lists_every_baseline_but_charts_the_selection() -> anyhow::Result<()> {
        let page = home(&table(), vec!["Y".to_string()])?;
        assert_eq!(page.baselines, vec!["X", "Y"]);
        assert_eq!(page.steps, vec!["0_Load", "1_Edit"]);
        assert_eq!(page.selected_baselines, vec!["Y"]);
        assert_eq!(
            page.charts.iter().map(|c| c.title.as_str()).collect::<Vec<_>>(),
            vec![
                "Memory Usage by Baseline and Step",
                "Assembly State by Baseline and Step",
                "Timer State by Baseline and Step",
                "Network State by Baseline and Step",
            ]
        );
        Ok(())
    }

    #[test]
    fn single_plot() -> anyhow::Result<()> {
        let page = plot(&table(), PlotType::NetworkState)?;
        assert_eq!(page.charts.len(), 1);
        assert_eq!(page.charts[0].title, "Network State by Baseline and Step");
        assert!(!page.charts[0].image.is_empty());
        Ok(())
    }

    #[test]
    fn stepwise_has_a_chart_per_group() -> anyhow::Result<()> {
        let page = stepwise_analysis(&table(), "0_Load")?;
        assert_eq!(page.selected_step.as_deref(), Some("0_Load"));
        assert_eq!(page.charts.len(), 4);
        assert_eq!(page.charts[0].title, "Memory Usage at Step: 0_Load");
        Ok(())
    }

    #[test]
    fn unknown_step_and_baseline_still_render() -> anyhow::Result<()> {
        assert_eq!(stepwise_analysis(&table(), "nope")?.charts.len(), 4);
        assert_eq!(baseline_analysis(&table(), "nope")?.charts.len(), 4);
        Ok(())
    }

    #[test]
    fn baseline_series_are_in_megabytes() -> anyhow::Result<()> {
        let series = baseline_series(&table(), "X")?;
        assert_eq!(series.len(), 4);

        let (group, memory) = &series[0];
        assert_eq!(group.name, MEMORY.name);
        let in_use = memory
            .lines
            .iter()
            .find(|l| l.metric == Metric::BytesInUse)
            .unwrap();
        assert_eq!(in_use.points, vec![(0, 200.0 / BYTES_PER_MEGABYTE), (1, 1.0)]);

        // Only byte columns are rescaled
        let (_, assembly) = &series[1];
        assert!(assembly.lines.iter().all(|l| l.points.iter().all(|(_, v)| *v == 0.0)));
        Ok(())
    }

    #[test]
    fn baseline_analysis_uses_megabytes() -> anyhow::Result<()> {
        let table = table();
        let page = baseline_analysis(&table, "X")?;
        assert_eq!(page.selected_baseline.as_deref(), Some("X"));
        assert_eq!(page.charts[3].title, "Network State for Baseline: X");

        let memory_svg = String::from_utf8(
            base64::engine::general_purpose::STANDARD.decode(&page.charts[0].image)?,
        )?;
        assert!(memory_svg.contains("Memory Usage (MB)"));
        assert!(!memory_svg.contains("Memory Usage (bytes)"));

        // The caller's table is left in bytes
        assert_eq!(
            table.values(Metric::BytesInUse)?,
            vec![200.0, 400.0, 1_048_576.0]
        );
        Ok(())
    }
}
