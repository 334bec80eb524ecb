//! Discover which experiment configurations a results tree holds.

use crate::Result;
use crate::plan::Family;
use anyhow::Context;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::warn;

/// Directory stem: n<nodes>_s<scale>_e<edge_factor>[_v<width>].<suffix>
const DIR_NAME_RE: &str = r"^n(\d+)_s(\d+)_e(\d+)(?:_v(\d+))?\.([A-Za-z0-9.]+)$";

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDir {
    pub name: String,
    pub nodes: u32,
    pub scale: u32,
    pub edge_factor: u32,
    pub width: Option<u32>,
    pub suffix: String,
    /// Families whose files live under this suffix; empty if unknown.
    pub families: Vec<Family>,
}

pub fn scan(root: &Path) -> Result<Vec<ConfigDir>> {
    let re = Regex::new(DIR_NAME_RE)?;

    let mut out = Vec::new();
    let entries =
        fs::read_dir(root).with_context(|| format!("read results directory {}", root.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("read results directory {}", root.display()))?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        match parse_dir_name(&re, &name) {
            Some(dir) if dir.families.is_empty() => {
                warn!(dir = %name, suffix = %dir.suffix, "unknown workload suffix");
                out.push(dir);
            }
            Some(dir) => out.push(dir),
            None => warn!(dir = %name, "not an experiment directory"),
        }
    }

    out.sort_by(|a, b| {
        (a.suffix.as_str(), a.scale, a.nodes, a.width).cmp(&(b.suffix.as_str(), b.scale, b.nodes, b.width))
    });
    Ok(out)
}

fn parse_dir_name(re: &Regex, name: &str) -> Option<ConfigDir> {
    let caps = re.captures(name)?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
    let suffix = caps.get(5)?.as_str().to_string();

    Some(ConfigDir {
        name: name.to_string(),
        nodes: num(1)?,
        scale: num(2)?,
        edge_factor: num(3)?,
        width: match caps.get(4) {
            Some(_) => Some(num(4)?),
            None => None,
        },
        families: Family::by_suffix(&suffix),
        suffix,
    })
}
