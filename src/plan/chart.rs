//! Chart plans: which series to aggregate, over which sweeps, in which unit.
//!
//! JSON shape:
//! {
//!   "charts": [
//!     {
//!       "name": "global_strong_scaling",   // output file stem
//!       "style": "line",                  // line | bar | histogram
//!       "y_unit": "seconds",
//!       "log_y": true,                    // optional
//!       "sweep": { "axis": "servers", "servers": [8, 16], "scale": 26 },
//!       "series": [
//!         { "label": "WCC GDA", "family": "wcc" },
//!         { "label": "LCC GDA", "family": "lcc",
//!           "sweep": { "axis": "servers", "servers": [8, 16], "scale": 23 } }
//!       ]
//!     }
//!   ]
//! }
//!
//! `validate_and_build` resolves every series to its concrete experiment points
//! so that configuration mistakes surface before any result file is opened.

use crate::Result;
use crate::plan::family::{Family, Metric};
use crate::plan::{ExperimentPoint, Sweep, XAxis};
use anyhow::bail;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Deserialize)]
pub struct PlanSpec {
    #[serde(default)]
    pub charts: Vec<RawChart>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStyle {
    Line,
    Bar,
    Histogram,
}

/// Unit of the y-values handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    Microseconds,
    Seconds,
    Minutes,
    /// Raw throughput is queries per microsecond, which is this unit exactly.
    MillionQueriesPerSecond,
    Percent,
    /// Histogram bins; values stay in microseconds.
    QueryCount,
}

impl Unit {
    /// Divisor applied to every raw value of a series.
    pub fn divisor(self) -> f64 {
        match self {
            Unit::Seconds => 1_000_000.0,
            Unit::Minutes => 60.0 * 1_000_000.0,
            Unit::Microseconds
            | Unit::MillionQueriesPerSecond
            | Unit::Percent
            | Unit::QueryCount => 1.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Unit::Microseconds => "Runtime [µs]",
            Unit::Seconds => "Runtime [s]",
            Unit::Minutes => "Runtime [min]",
            Unit::MillionQueriesPerSecond => "Million Queries/Second",
            Unit::Percent => "Failed Queries [%]",
            Unit::QueryCount => "Query Count",
        }
    }

    fn fits(self, metric: Metric) -> bool {
        match metric {
            Metric::Median => matches!(self, Unit::Microseconds | Unit::Seconds | Unit::Minutes),
            Metric::Throughput => self == Unit::MillionQueriesPerSecond,
            Metric::FailureRate => self == Unit::Percent,
            Metric::Distribution => self == Unit::QueryCount,
        }
    }
}

/// Raw chart shape as it appears in a plan file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawChart {
    pub name: String,

    #[serde(default)]
    pub title: Option<String>,

    pub style: ChartStyle,

    pub y_unit: Unit,

    #[serde(default)]
    pub log_y: bool,

    /// Default sweep for series that do not bring their own.
    #[serde(default)]
    pub sweep: Option<Sweep>,

    #[serde(default)]
    pub series: Vec<RawSeries>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSeries {
    pub label: String,

    pub family: Family,

    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub bucket: Option<usize>,

    #[serde(default)]
    pub metric: Option<Metric>,

    #[serde(default)]
    pub sweep: Option<Sweep>,
}

/// Validated chart, ready for aggregation.
#[derive(Debug, Clone)]
pub struct ChartPlan {
    pub name: String,
    pub title: Option<String>,
    pub style: ChartStyle,
    pub y_unit: Unit,
    pub log_y: bool,
    pub x_axis: XAxis,
    pub series: Vec<SeriesPlan>,
}

#[derive(Debug, Clone)]
pub struct SeriesPlan {
    pub label: String,
    pub family: Family,
    pub metric: Metric,
    /// Bucket to plot; `None` for single-bucket families and histograms.
    pub bucket: Option<usize>,
    pub points: Vec<ExperimentPoint>,
}

impl PlanSpec {
    pub fn from_json(text: &str) -> Result<PlanSpec> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn validate_and_build(&self) -> Result<Vec<ChartPlan>> {
        if self.charts.is_empty() {
            bail!("chart plan contained no charts");
        }

        let mut names = BTreeSet::new();
        let mut out = Vec::with_capacity(self.charts.len());
        for raw in &self.charts {
            if raw.name.trim().is_empty() {
                bail!("chart with empty name");
            }
            if !names.insert(raw.name.as_str()) {
                bail!("duplicate chart name in plan: {}", raw.name);
            }
            out.push(build_chart(raw)?);
        }
        Ok(out)
    }
}

fn build_chart(raw: &RawChart) -> Result<ChartPlan> {
    if raw.series.is_empty() {
        bail!("chart '{}' has no series", raw.name);
    }

    let mut labels = BTreeSet::new();
    let mut series = Vec::with_capacity(raw.series.len());
    let mut x_axis: Option<XAxis> = None;

    for s in &raw.series {
        if !labels.insert(s.label.as_str()) {
            bail!("chart '{}' has duplicate series label '{}'", raw.name, s.label);
        }

        let sweep = match s.sweep.as_ref().or(raw.sweep.as_ref()) {
            Some(sw) => sw,
            None => bail!(
                "series '{}' in chart '{}' has no sweep and the chart has no default",
                s.label,
                raw.name
            ),
        };
        check_sweep(&raw.name, &s.label, sweep, raw.style)?;

        match x_axis {
            None => x_axis = Some(sweep.axis()),
            Some(axis) if axis != sweep.axis() => bail!(
                "chart '{}' mixes server and scale sweeps (series '{}')",
                raw.name,
                s.label
            ),
            Some(_) => {}
        }

        let metric = s.metric.unwrap_or_else(|| s.family.default_metric());
        if !s.family.supports(metric) {
            bail!(
                "series '{}' in chart '{}': family {} cannot produce {:?}",
                s.label,
                raw.name,
                s.family,
                metric
            );
        }
        if (raw.style == ChartStyle::Histogram) != (metric == Metric::Distribution) {
            bail!(
                "series '{}' in chart '{}': histogram charts take exactly the latency distribution families",
                s.label,
                raw.name
            );
        }
        if !raw.y_unit.fits(metric) {
            bail!(
                "chart '{}' unit {:?} does not fit metric {:?} of series '{}'",
                raw.name,
                raw.y_unit,
                metric,
                s.label
            );
        }

        if s.family.has_width() != s.width.is_some() {
            if s.family.has_width() {
                bail!("series '{}' ({}) needs a width", s.label, s.family);
            }
            bail!("series '{}' ({}) does not take a width", s.label, s.family);
        }

        let buckets = s.family.schema().buckets;
        let bucket = match (s.bucket, metric) {
            (_, Metric::Distribution) => None,
            (Some(b), _) if b >= buckets => bail!(
                "series '{}' bucket {} out of range for {} ({} buckets)",
                s.label,
                b,
                s.family,
                buckets
            ),
            (Some(b), _) => Some(b),
            (None, _) if buckets > 1 => bail!(
                "series '{}' ({}) must pick a bucket below {}",
                s.label,
                s.family,
                buckets
            ),
            (None, _) => None,
        };

        series.push(SeriesPlan {
            label: s.label.clone(),
            family: s.family,
            metric,
            bucket,
            points: sweep.points(s.family, s.width),
        });
    }

    Ok(ChartPlan {
        name: raw.name.clone(),
        title: raw.title.clone(),
        style: raw.style,
        y_unit: raw.y_unit,
        log_y: raw.log_y,
        // Non-empty series guarantees this is set.
        x_axis: x_axis.unwrap_or(XAxis::Servers),
        series,
    })
}

fn check_sweep(chart: &str, label: &str, sweep: &Sweep, style: ChartStyle) -> Result<()> {
    if sweep.is_empty() {
        bail!("series '{}' in chart '{}' has an empty sweep", label, chart);
    }
    let counts = match sweep {
        Sweep::Servers { servers, .. } => servers,
        Sweep::Scale { instances, .. } => instances,
    };
    if counts.contains(&0) {
        bail!("series '{}' in chart '{}' sweeps over zero nodes", label, chart);
    }
    // Histogram series are single runs; their order is the caller's legend order.
    if style != ChartStyle::Histogram && counts.windows(2).any(|w| w[0] >= w[1]) {
        bail!(
            "series '{}' in chart '{}' sweep is not strictly increasing: {:?}",
            label,
            chart,
            counts
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn plan(json: &str) -> Result<Vec<ChartPlan>> {
        PlanSpec::from_json(json)?.validate_and_build()
    }

    #[test]
    fn series_sweep_overrides_chart_default() {
        let charts = plan(
            r#"{"charts":[{"name":"g","style":"line","y_unit":"seconds",
                "sweep":{"axis":"servers","servers":[8,16],"scale":26},
                "series":[
                  {"label":"WCC","family":"wcc"},
                  {"label":"LCC","family":"lcc",
                   "sweep":{"axis":"servers","servers":[8],"scale":23}}
                ]}]}"#,
        )
        .unwrap();
        let dirs: Vec<Vec<String>> = charts[0]
            .series
            .iter()
            .map(|s| s.points.iter().map(|p| p.dir_name()).collect())
            .collect();
        assert_eq!(
            dirs,
            vec![
                vec!["n008_s26_e16.wcc".to_string(), "n016_s26_e16.wcc".into()],
                vec!["n008_s23_e16.lcc".to_string()],
            ]
        );
        assert_eq!(charts[0].x_axis, XAxis::Servers);
        assert_eq!(charts[0].series[0].metric, Metric::Median);
    }

    #[test]
    fn rejects_unordered_sweep() {
        let err = plan(
            r#"{"charts":[{"name":"g","style":"line","y_unit":"seconds",
                "sweep":{"axis":"servers","servers":[16,8],"scale":26},
                "series":[{"label":"WCC","family":"wcc"}]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("not strictly increasing"));
    }

    #[test]
    fn khop_needs_bucket_in_range() {
        let err = plan(
            r#"{"charts":[{"name":"k","style":"line","y_unit":"seconds",
                "sweep":{"axis":"servers","servers":[8],"scale":26},
                "series":[{"label":"5-Hop","family":"khop","bucket":3}]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("out of range"));

        let err = plan(
            r#"{"charts":[{"name":"k","style":"line","y_unit":"seconds",
                "sweep":{"axis":"servers","servers":[8],"scale":26},
                "series":[{"label":"k","family":"khop"}]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("must pick a bucket"));
    }

    #[test]
    fn unit_must_fit_metric() {
        let err = plan(
            r#"{"charts":[{"name":"t","style":"bar","y_unit":"seconds",
                "sweep":{"axis":"servers","servers":[8],"scale":26},
                "series":[{"label":"lb","family":"oltp_lb"}]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not fit"));
    }

    #[test]
    fn gnn_width_required() {
        let err = plan(
            r#"{"charts":[{"name":"g","style":"line","y_unit":"seconds",
                "sweep":{"axis":"servers","servers":[8],"scale":25},
                "series":[{"label":"k=4","family":"gnn"}]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("needs a width"));
    }

    #[test]
    fn mixed_axes_rejected() {
        let err = plan(
            r#"{"charts":[{"name":"m","style":"line","y_unit":"seconds",
                "series":[
                  {"label":"a","family":"wcc","sweep":{"axis":"servers","servers":[8],"scale":26}},
                  {"label":"b","family":"cdlp","sweep":{"axis":"scale","instances":[1],"base_scale":23}}
                ]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("mixes"));
    }

    #[test]
    fn duplicate_chart_names_rejected() {
        let chart = r#"{"name":"g","style":"line","y_unit":"seconds",
            "sweep":{"axis":"servers","servers":[8],"scale":26},
            "series":[{"label":"WCC","family":"wcc"}]}"#;
        let err = plan(&format!(r#"{{"charts":[{},{}]}}"#, chart, chart)).unwrap_err();
        assert!(err.to_string().contains("duplicate chart name"));
    }

    #[test]
    fn unit_divisors() {
        assert_eq!(Unit::Seconds.divisor(), 1e6);
        assert_eq!(Unit::Minutes.divisor(), 6e7);
        assert_eq!(Unit::MillionQueriesPerSecond.divisor(), 1.0);
    }
}
