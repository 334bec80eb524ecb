//! Workload families and their result-file schema descriptors.
//!
//! Each family fixes where its files live, how they are tokenized, which
//! columns carry the measurement and how rows are bucketed. Everything
//! downstream is driven by [`Schema`]; there is no per-family code outside
//! the extractor's rule dispatch.

use crate::log::LogStyle;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Smallest hop distance kept by the k-Hop extractor; bucket = hop - KHOP_MIN_HOP.
pub const KHOP_MIN_HOP: u64 = 2;

/// 2-, 3- and 4-Hop.
pub const KHOP_BUCKETS: usize = 3;

pub const OLTP_FILE_PREFIX: &str = "lsb";

/// Query type codes 0..=6 written by the OLTP latency benchmarks.
pub const QUERY_TYPE_NAMES: [&str; 7] = [
    "retrieve vertex",
    "insert vertex",
    "delete vertex",
    "update vertex",
    "count edges",
    "retrieve edges",
    "add edges",
];

/// Latency ceiling (µs) the histogram renderer clamps to. Passed through as a
/// hint only; aggregated values are never clamped.
pub const DISPLAY_CEILING_US: f64 = 5000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Family {
    #[serde(rename = "bfs")]
    Bfs,
    #[serde(rename = "graph500_bfs")]
    Graph500Bfs,
    #[serde(rename = "khop")]
    KHop,
    #[serde(rename = "wcc")]
    Wcc,
    #[serde(rename = "cdlp")]
    Cdlp,
    #[serde(rename = "pr")]
    PageRank,
    #[serde(rename = "lcc")]
    Lcc,
    #[serde(rename = "bi")]
    Bi,
    #[serde(rename = "gnn")]
    Gnn,
    #[serde(rename = "oltp_lb")]
    OltpLinkBench,
    #[serde(rename = "oltp_ri")]
    OltpReadIntensive,
    #[serde(rename = "oltp_rm")]
    OltpReadMostly,
    #[serde(rename = "oltp_wi")]
    OltpWriteIntensive,
    #[serde(rename = "oltp_lb_latency")]
    OltpLinkBenchLatency,
    #[serde(rename = "oltp_ri_latency")]
    OltpReadIntensiveLatency,
    #[serde(rename = "oltp_rm_latency")]
    OltpReadMostlyLatency,
    #[serde(rename = "oltp_wi_latency")]
    OltpWriteIntensiveLatency,
}

/// Which files in a configuration directory belong to a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSet {
    /// Exactly one file with this name.
    Fixed(&'static str),
    /// Every regular file whose name starts with this prefix (one per worker).
    Prefixed(&'static str),
}

/// Row selection and field extraction rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Latency (µs) in the given column of every row.
    Column(usize),
    /// col0 root id, col1 hop distance, col2 latency; only the first root seen
    /// in the file, only hops >= KHOP_MIN_HOP.
    HopBuckets,
    /// col0 query type code, col1 latency.
    QueryTypeBuckets,
    /// Row 0 col4 barrier start; row 1 issued/failed/skipped/-/end.
    WorkerCounters,
}

/// How the extracted values of one point are reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Median,
    Throughput,
    FailureRate,
    /// Raw per-bucket values, handed to a histogram renderer.
    Distribution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    /// Directory suffix after the `n.._s.._e..` stem.
    pub suffix: &'static str,
    pub files: FileSet,
    pub style: LogStyle,
    pub extraction: Extraction,
    pub buckets: usize,
}

impl Family {
    pub const ALL: [Family; 17] = [
        Family::Bfs,
        Family::Graph500Bfs,
        Family::KHop,
        Family::Wcc,
        Family::Cdlp,
        Family::PageRank,
        Family::Lcc,
        Family::Bi,
        Family::Gnn,
        Family::OltpLinkBench,
        Family::OltpReadIntensive,
        Family::OltpReadMostly,
        Family::OltpWriteIntensive,
        Family::OltpLinkBenchLatency,
        Family::OltpReadIntensiveLatency,
        Family::OltpReadMostlyLatency,
        Family::OltpWriteIntensiveLatency,
    ];

    pub fn schema(self) -> Schema {
        use Extraction::*;
        use FileSet::*;

        let gda = |suffix, file, extraction, buckets| Schema {
            suffix,
            files: Fixed(file),
            style: LogStyle::Gda,
            extraction,
            buckets,
        };
        let oltp = |suffix, extraction, buckets| Schema {
            suffix,
            files: Prefixed(OLTP_FILE_PREFIX),
            style: LogStyle::Gda,
            extraction,
            buckets,
        };

        match self {
            Family::Bfs => gda("bfs", "lsb.gdi_bfs.r0", Column(2), 1),
            Family::Graph500Bfs => Schema {
                suffix: "bfs",
                files: Fixed("bfs_times.txt"),
                style: LogStyle::Reference,
                extraction: Column(1),
                buckets: 1,
            },
            Family::KHop => gda("khop", "lsb.gdi_k_hop.r0", HopBuckets, KHOP_BUCKETS),
            Family::Wcc => gda("wcc", "lsb.gdi_wcc.r0", Column(2), 1),
            Family::Cdlp => gda("cdlp", "lsb.gdi_cdlp.r0", Column(2), 1),
            Family::PageRank => gda("pr", "lsb.gdi_pr.r0", Column(3), 1),
            Family::Lcc => gda("lcc", "lsb.gdi_lcc.r0", Column(1), 1),
            Family::Bi => gda("bi", "lsb.gdi_bi.r0", Column(1), 1),
            Family::Gnn => gda("gnn", "lsb.gdi_gnn.r0", Column(3), 1),
            Family::OltpLinkBench => oltp("oltp.lb", WorkerCounters, 1),
            Family::OltpReadIntensive => oltp("oltp.ri", WorkerCounters, 1),
            Family::OltpReadMostly => oltp("oltp.rm", WorkerCounters, 1),
            Family::OltpWriteIntensive => oltp("oltp.wi", WorkerCounters, 1),
            Family::OltpLinkBenchLatency => {
                oltp("oltp.lb.lat", QueryTypeBuckets, QUERY_TYPE_NAMES.len())
            }
            Family::OltpReadIntensiveLatency => {
                oltp("oltp.ri.lat", QueryTypeBuckets, QUERY_TYPE_NAMES.len())
            }
            Family::OltpReadMostlyLatency => {
                oltp("oltp.rm.lat", QueryTypeBuckets, QUERY_TYPE_NAMES.len())
            }
            Family::OltpWriteIntensiveLatency => {
                oltp("oltp.wi.lat", QueryTypeBuckets, QUERY_TYPE_NAMES.len())
            }
        }
    }

    /// Metric used when a series does not name one.
    pub fn default_metric(self) -> Metric {
        match self.schema().extraction {
            Extraction::Column(_) | Extraction::HopBuckets => Metric::Median,
            Extraction::WorkerCounters => Metric::Throughput,
            Extraction::QueryTypeBuckets => Metric::Distribution,
        }
    }

    pub fn supports(self, metric: Metric) -> bool {
        match self.schema().extraction {
            Extraction::Column(_) | Extraction::HopBuckets => metric == Metric::Median,
            Extraction::WorkerCounters => {
                matches!(metric, Metric::Throughput | Metric::FailureRate)
            }
            Extraction::QueryTypeBuckets => metric == Metric::Distribution,
        }
    }

    /// Whether result directories carry a `_v<width>` feature-vector component.
    pub fn has_width(self) -> bool {
        self == Family::Gnn
    }

    /// Display names for the family's buckets, in bucket order.
    pub fn bucket_names(self) -> Vec<String> {
        match self.schema().extraction {
            Extraction::HopBuckets => (0..KHOP_BUCKETS as u64)
                .map(|b| format!("{}-Hop", b + KHOP_MIN_HOP))
                .collect(),
            Extraction::QueryTypeBuckets => {
                QUERY_TYPE_NAMES.iter().map(|s| s.to_string()).collect()
            }
            _ => vec![self.to_string()],
        }
    }

    /// Families sharing a directory suffix (BFS and Graph500 BFS live side by side).
    pub fn by_suffix(suffix: &str) -> Vec<Family> {
        Family::ALL
            .iter()
            .copied()
            .filter(|f| f.schema().suffix == suffix)
            .collect()
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Family::Bfs => "bfs",
            Family::Graph500Bfs => "graph500_bfs",
            Family::KHop => "khop",
            Family::Wcc => "wcc",
            Family::Cdlp => "cdlp",
            Family::PageRank => "pr",
            Family::Lcc => "lcc",
            Family::Bi => "bi",
            Family::Gnn => "gnn",
            Family::OltpLinkBench => "oltp_lb",
            Family::OltpReadIntensive => "oltp_ri",
            Family::OltpReadMostly => "oltp_rm",
            Family::OltpWriteIntensive => "oltp_wi",
            Family::OltpLinkBenchLatency => "oltp_lb_latency",
            Family::OltpReadIntensiveLatency => "oltp_ri_latency",
            Family::OltpReadMostlyLatency => "oltp_rm_latency",
            Family::OltpWriteIntensiveLatency => "oltp_wi_latency",
        };
        f.write_str(name)
    }
}
