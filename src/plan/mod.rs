//! Plan layer: workload families, experiment points and chart plans.
//!
//! Kept separate from log parsing and aggregation. It owns:
//! - Family schema descriptors (file names, columns, bucket rules)
//! - ExperimentPoint / Sweep (directory naming, x-values)
//! - Chart plans (JSON) and the built-in presets

pub mod chart;
pub mod family;
pub mod point;

pub use chart::{ChartPlan, ChartStyle, PlanSpec, SeriesPlan, Unit};
pub use family::{Extraction, FileSet, Family, Metric};
pub use point::{ExperimentPoint, Sweep, XAxis};

use crate::Result;
use anyhow::Context;
use std::path::Path;

/// The charts of the GDA paper's plotting scripts.
const PRESETS: &str = include_str!("presets.json");

pub fn presets() -> Result<Vec<ChartPlan>> {
    PlanSpec::from_json(PRESETS)
        .context("parse built-in presets")?
        .validate_and_build()
        .context("validate built-in presets")
}

/// Load a plan file, or the built-in presets when no file is given.
pub fn load(path: Option<&Path>) -> Result<Vec<ChartPlan>> {
    let Some(path) = path else {
        return presets();
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read chart plan {}", path.display()))?;
    PlanSpec::from_json(&text)
        .with_context(|| format!("parse chart plan {}", path.display()))?
        .validate_and_build()
        .with_context(|| format!("validate chart plan {}", path.display()))
}
