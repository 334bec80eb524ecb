//! Experiment points and the sweeps that generate them.

use crate::plan::family::Family;
use serde::{Deserialize, Serialize};

/// Digits of the `n<count>` directory component for each sweep axis.
pub const SERVER_PAD: usize = 3;
pub const INSTANCE_PAD: usize = 4;
/// Digits of the `_v<width>` component.
pub const WIDTH_PAD: usize = 3;

/// What the x-axis of a series measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XAxis {
    /// Strong scaling: fixed problem, growing server count.
    Servers,
    /// Weak scaling: problem scale grows with the instance count.
    Scale,
}

/// One measurement run, mapped to a configuration directory on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentPoint {
    pub family: Family,
    /// Server / instance count as written in the directory name.
    pub nodes: u32,
    pub pad: usize,
    pub scale: u32,
    pub edge_factor: u32,
    pub width: Option<u32>,
    /// Position along the sweep axis.
    pub x: f64,
}

impl ExperimentPoint {
    /// `n<nodes>_s<scale>_e<edge_factor>[_v<width>].<suffix>`
    pub fn dir_name(&self) -> String {
        let mut name = format!(
            "n{:0pad$}_s{}_e{}",
            self.nodes,
            self.scale,
            self.edge_factor,
            pad = self.pad
        );
        if let Some(w) = self.width {
            name.push_str(&format!("_v{:0pad$}", w, pad = WIDTH_PAD));
        }
        name.push('.');
        name.push_str(self.family.schema().suffix);
        name
    }
}

fn default_edge_factor() -> u32 {
    16
}

/// A swept configuration axis, as written in chart plans.
///
/// JSON shape:
/// { "axis": "servers", "servers": [8, 16, 24], "scale": 26 }
/// { "axis": "scale", "instances": [1, 2, 4], "base_scale": 23, "edge_factor": 16 }
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "axis", rename_all = "snake_case")]
pub enum Sweep {
    Servers {
        servers: Vec<u32>,
        scale: u32,
        #[serde(default = "default_edge_factor")]
        edge_factor: u32,
    },
    Scale {
        instances: Vec<u32>,
        base_scale: u32,
        #[serde(default = "default_edge_factor")]
        edge_factor: u32,
    },
}

impl Sweep {
    pub fn axis(&self) -> XAxis {
        match self {
            Sweep::Servers { .. } => XAxis::Servers,
            Sweep::Scale { .. } => XAxis::Scale,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Sweep::Servers { servers, .. } => servers.len(),
            Sweep::Scale { instances, .. } => instances.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expand into points in sweep order.
    ///
    /// Servers: x is the server count. Scale: x starts at `base_scale` and
    /// grows by one per step, matching the scale written into the directory.
    pub fn points(&self, family: Family, width: Option<u32>) -> Vec<ExperimentPoint> {
        match self {
            Sweep::Servers {
                servers,
                scale,
                edge_factor,
            } => servers
                .iter()
                .map(|&n| ExperimentPoint {
                    family,
                    nodes: n,
                    pad: SERVER_PAD,
                    scale: *scale,
                    edge_factor: *edge_factor,
                    width,
                    x: f64::from(n),
                })
                .collect(),
            Sweep::Scale {
                instances,
                base_scale,
                edge_factor,
            } => instances
                .iter()
                .zip(*base_scale..)
                .map(|(&n, scale)| ExperimentPoint {
                    family,
                    nodes: n,
                    pad: INSTANCE_PAD,
                    scale,
                    edge_factor: *edge_factor,
                    width,
                    x: f64::from(scale),
                })
                .collect(),
        }
    }
}
