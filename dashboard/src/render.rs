use crate::aggregate::{ClusterLayout, StackedClusters, TrendSeries};
use base64::Engine;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontTransform;
use serde::Serialize;

/// The "tab10" colours, assigned to columns in group order.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

const CLUSTER_CHART_SIZE: (u32, u32) = (1800, 800);
const TREND_CHART_SIZE: (u32, u32) = (1000, 500);
const FONT: &str = "sans-serif";

/// A rendered chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    /// Base64 encoded SVG document
    pub image: String,
}

impl Chart {
    pub const MEDIA_TYPE: &'static str = "image/svg+xml";

    fn from_svg(title: String, svg: String) -> Self {
        Self {
            title,
            image: base64::engine::general_purpose::STANDARD.encode(svg.as_bytes()),
        }
    }

    /// The image as a `data:` URI, usable directly as an `<img>` source.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", Self::MEDIA_TYPE, self.image)
    }
}

pub fn color_for(column_index: usize) -> RGBColor {
    PALETTE[column_index % PALETTE.len()]
}

/// Draw one clustered stacked bar chart: a bar group per baseline, a bar per step, segments per
/// column.
pub fn render_stacked_clusters(clusters: &StackedClusters, title: &str) -> anyhow::Result<Chart> {
    let layout = ClusterLayout::default();
    let group = clusters.group;
    let steps = clusters.steps.len();
    let half_bar = layout.bar_width / 2.0;

    let ticks = (0..clusters.baselines.len())
        .map(|b| layout.tick_position(b, steps))
        .collect::<Vec<_>>();
    let x_end = layout.group_position(clusters.baselines.len(), steps) - layout.group_spacing;
    let x_range = -layout.bar_width..x_end.max(layout.bar_width);
    let (y_lo, y_hi) = padded(clusters.value_range());

    let svg = draw_svg(CLUSTER_CHART_SIZE, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 24))
            .margin(20)
            .x_label_area_size(140)
            .y_label_area_size(90)
            .build_cartesian_2d(x_range, y_lo..y_hi)?;

        // Baseline names are drawn under their group below, not as numeric ticks
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(0)
            .x_desc("Baseline")
            .y_desc(group.axis_label)
            .draw()?;

        let label_style = (FONT, 14)
            .into_font()
            .transform(FontTransform::Rotate90)
            .color(&BLACK);
        for (x, baseline) in ticks.iter().zip(&clusters.baselines) {
            let (px, py) = chart.backend_coord(&(*x, y_lo));
            root.draw(&Text::new(
                baseline.as_str(),
                (px, py + 8),
                label_style.clone(),
            ))?;
        }

        for step in 0..steps {
            for (c, metric) in group.columns.iter().enumerate() {
                let color = color_for(c);
                let bars = (0..clusters.baselines.len())
                    .map(|b| {
                        let segment = clusters.segments(b, step)[c];
                        let x = layout.bar_position(b, step, steps);
                        Rectangle::new(
                            [(x - half_bar, segment.bottom), (x + half_bar, segment.top)],
                            color.filled(),
                        )
                    })
                    .collect::<Vec<_>>();

                let series = chart.draw_series(bars)?;
                // One legend row per column, taken from the first step's bars
                if step == 0 {
                    series.label(metric.column()).legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                    });
                }
            }
        }

        if clusters.is_empty() {
            draw_no_data(root)?;
        } else {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperRight)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .label_font((FONT, 14))
                .draw()?;
        }

        Ok(())
    })?;

    Ok(Chart::from_svg(title.to_string(), svg))
}

/// Draw one line per column against the series' categorical axis.
pub fn render_trend(series: &TrendSeries, title: &str, y_label: &str) -> anyhow::Result<Chart> {
    let n = series.categories.len();
    let (y_lo, y_hi) = padded(series.value_range());

    let label_for = |x: &SegmentValue<usize>| match x {
        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
            series.categories.get(*i).cloned().unwrap_or_default()
        }
        SegmentValue::Last => String::new(),
    };

    let svg = draw_svg(TREND_CHART_SIZE, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(title, (FONT, 20))
            .margin(15)
            .x_label_area_size(110)
            .y_label_area_size(80)
            .build_cartesian_2d((0..n).into_segmented(), y_lo..y_hi)?;

        chart
            .configure_mesh()
            .x_labels(n + 1)
            .x_label_formatter(&label_for)
            .x_label_style((FONT, 12).into_font().transform(FontTransform::Rotate90))
            .x_desc(series.axis.column())
            .y_desc(y_label)
            .draw()?;

        for (i, line) in series.lines.iter().enumerate() {
            let color = color_for(i);
            chart
                .draw_series(
                    LineSeries::new(
                        line.points.iter().map(|(x, y)| (SegmentValue::CenterOf(*x), *y)),
                        color.stroke_width(2),
                    )
                    .point_size(3),
                )?
                .label(line.metric.column())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }

        if series.is_empty() {
            draw_no_data(root)?;
        } else {
            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
        }

        Ok(())
    })?;

    Ok(Chart::from_svg(title.to_string(), svg))
}

/// Acquire an in-memory SVG surface, let `draw` paint it and return the finished document.
///
/// The surface only lives for the duration of this call.
fn draw_svg<F>(size: (u32, u32), draw: F) -> anyhow::Result<String>
where
    F: FnOnce(&DrawingArea<SVGBackend<'_>, Shift>) -> anyhow::Result<()>,
{
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        root.fill(&WHITE)?;
        draw(&root)?;
        root.present()?;
    }
    Ok(svg)
}

fn draw_no_data(root: &DrawingArea<SVGBackend<'_>, Shift>) -> anyhow::Result<()> {
    let (width, height) = root.dim_in_pixel();
    root.draw(&Text::new(
        "No data",
        (width as i32 / 2 - 40, height as i32 / 2),
        (FONT, 24).into_font().color(&RGBColor(127, 127, 127)),
    ))?;
    Ok(())
}

/// A drawable value range: never empty, with headroom above the highest value.
fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span <= 0.0 {
        return (lo, lo + 1.0);
    }
    let lo = if lo < 0.0 { lo - span * 0.05 } else { lo };
    (lo, hi + span * 0.05)
}
