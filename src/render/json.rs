use crate::Result;
use crate::model::ChartData;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// Serialize one chart's aggregated series for the renderer.
pub fn render_chart_json(data: &ChartData) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Write `<out_dir>/<chart name>.json` for every chart.
///
/// All payloads are rendered before the first file is created, so a
/// serialization failure leaves the output directory untouched.
pub fn write_charts(out_dir: &Path, charts: &[ChartData]) -> Result<Vec<PathBuf>> {
    let rendered = charts
        .iter()
        .map(|c| Ok((out_dir.join(format!("{}.json", c.name)), render_chart_json(c)?)))
        .collect::<Result<Vec<_>>>()?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("create output directory {}", out_dir.display()))?;

    let mut written = Vec::with_capacity(rendered.len());
    for (path, text) in rendered {
        fs::write(&path, text).with_context(|| format!("write {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
