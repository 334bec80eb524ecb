//! Series Builder: run the reader/locator/extractor/aggregator chain over every
//! point of a chart plan and assemble the data handed to the chart renderer.

use crate::aggregate::{self, WorkerSample};
use crate::error::{AggregateError, Result};
use crate::extract::{self, Buckets};
use crate::locate::locate;
use crate::log::read_rows;
use crate::plan::family::DISPLAY_CEILING_US;
use crate::plan::{ChartPlan, ChartStyle, ExperimentPoint, Family, Metric, SeriesPlan, Unit, XAxis};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Ordered (x, y) pairs; x strictly increasing in sweep order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricSeries {
    pub points: Vec<Point>,
}

#[cfg(test)]
impl MetricSeries {
    pub fn xs(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesView {
    pub label: String,
    pub family: Family,
    pub metric: Metric,
    #[serde(flatten)]
    pub series: MetricSeries,
    /// Failed-query percentage per point, for bar annotations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_percent: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistogramView {
    pub label: String,
    pub family: Family,
    pub bucket_names: Vec<String>,
    /// Raw latencies (µs) per bucket, unclamped.
    pub buckets: Vec<Vec<f64>>,
    /// Renderer hint: values above this are drawn in an overflow bin.
    pub display_ceiling: f64,
}

/// Everything the external chart renderer receives for one chart.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub name: String,
    pub title: Option<String>,
    pub style: ChartStyle,
    pub x_axis: XAxis,
    pub x_label: &'static str,
    pub y_unit: Unit,
    pub y_label: &'static str,
    pub log_y: bool,
    /// Legend order.
    pub series: Vec<SeriesView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub histograms: Vec<HistogramView>,
}

/// Aggregate `points` in order, dividing each value by `unit_divisor`.
///
/// Any failure at a point aborts the whole series; no partial series is
/// returned.
pub fn build_series<F>(
    points: &[ExperimentPoint],
    unit_divisor: f64,
    mut measure: F,
) -> Result<MetricSeries>
where
    F: FnMut(&ExperimentPoint) -> Result<f64>,
{
    let mut out = MetricSeries {
        points: Vec::with_capacity(points.len()),
    };
    for p in points {
        if let Some(last) = out.points.last() {
            if p.x <= last.x {
                return Err(AggregateError::Sweep {
                    reason: format!("x {} does not follow {}", p.x, last.x),
                });
            }
        }
        let y = measure(p)? / unit_divisor;
        debug!(dir = %p.dir_name(), x = p.x, y, "aggregated point");
        out.points.push(Point { x: p.x, y });
    }
    Ok(out)
}

/// Latency buckets of one point, merged over all of its files.
pub fn point_buckets(root: &Path, point: &ExperimentPoint) -> Result<Buckets> {
    let schema = point.family.schema();
    let mut merged: Buckets = (0..schema.buckets).map(|b| (b, Vec::new())).collect();
    for path in locate(root, point)? {
        let rows = read_rows(&path, schema.style)?;
        let buckets = extract::extract(rows, &path, schema.extraction, schema.buckets)?;
        for (b, values) in buckets {
            merged.entry(b).or_default().extend(values);
        }
    }
    Ok(merged)
}

/// Per-worker counters of one OLTP throughput point.
pub fn point_workers(root: &Path, point: &ExperimentPoint) -> Result<Vec<WorkerSample>> {
    let schema = point.family.schema();
    locate(root, point)?
        .iter()
        .map(|path| extract::extract_worker(read_rows(path, schema.style)?, path))
        .collect()
}

fn point_median(root: &Path, series: &SeriesPlan, point: &ExperimentPoint) -> Result<f64> {
    let bucket = series.bucket.unwrap_or(0);
    let buckets = point_buckets(root, point)?;
    let values = buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[]);
    let what = match series.family.bucket_names().get(bucket) {
        Some(name) if series.family.schema().buckets > 1 => {
            format!("{} in {}", name, point.dir_name())
        }
        _ => point.dir_name(),
    };
    aggregate::median(values, &what)
}

fn build_line_series(root: &Path, series: &SeriesPlan, unit: Unit) -> Result<SeriesView> {
    let mut failures = Vec::new();
    let metric_series = build_series(&series.points, unit.divisor(), |p| match series.metric {
        Metric::Median => point_median(root, series, p),
        Metric::Throughput => {
            let workers = point_workers(root, p)?;
            failures.push(aggregate::failure_rate(&workers));
            aggregate::throughput(&workers, &p.dir_name())
        }
        Metric::FailureRate => Ok(aggregate::failure_rate(&point_workers(root, p)?)),
        Metric::Distribution => Err(AggregateError::Unsupported {
            stage: "line series",
            what: format!("distribution metric of '{}'", series.label),
        }),
    })?;

    Ok(SeriesView {
        label: series.label.clone(),
        family: series.family,
        metric: series.metric,
        series: metric_series,
        failure_percent: (series.metric == Metric::Throughput).then_some(failures),
    })
}

fn build_histogram(root: &Path, series: &SeriesPlan) -> Result<HistogramView> {
    let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); series.family.schema().buckets];
    for p in &series.points {
        for (b, values) in point_buckets(root, p)? {
            if let Some(slot) = buckets.get_mut(b) {
                slot.extend(values);
            }
        }
    }
    if buckets.iter().all(Vec::is_empty) {
        return Err(AggregateError::EmptyInput {
            what: format!("latency histogram '{}'", series.label),
        });
    }
    Ok(HistogramView {
        label: series.label.clone(),
        family: series.family,
        bucket_names: series.family.bucket_names(),
        buckets,
        display_ceiling: DISPLAY_CEILING_US,
    })
}

/// Build one chart's data. Nothing is written; a failure anywhere aborts.
pub fn build_chart(root: &Path, plan: &ChartPlan) -> Result<ChartData> {
    info!(chart = %plan.name, series = plan.series.len(), "building chart");

    let mut series = Vec::new();
    let mut histograms = Vec::new();
    for s in &plan.series {
        match plan.style {
            ChartStyle::Histogram => histograms.push(build_histogram(root, s)?),
            ChartStyle::Line | ChartStyle::Bar => {
                series.push(build_line_series(root, s, plan.y_unit)?)
            }
        }
    }

    Ok(ChartData {
        name: plan.name.clone(),
        title: plan.title.clone(),
        style: plan.style,
        x_axis: plan.x_axis,
        x_label: match plan.x_axis {
            XAxis::Servers => "Servers",
            XAxis::Scale => "Scale",
        },
        y_unit: plan.y_unit,
        y_label: plan.y_unit.label(),
        log_y: plan.log_y,
        series,
        histograms,
    })
}

/// Build every chart before returning, so callers can refuse to write
/// anything when one of them fails.
pub fn build_charts(root: &Path, plans: &[ChartPlan]) -> Result<Vec<ChartData>> {
    plans.iter().map(|p| build_chart(root, p)).collect()
}
