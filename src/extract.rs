//! Row Filter & Field Extractor.
//!
//! Applies a family's selection rule to the rows of one file and pulls out the
//! numeric fields. A row that is too short or carries a non-numeric field where
//! a number is required fails the whole file; rows are never skipped for being
//! malformed, only for not matching the selection rule.

use crate::aggregate::WorkerSample;
use crate::error::{AggregateError, Result};
use crate::log::ResultRow;
use crate::plan::Extraction;
use crate::plan::family::KHOP_MIN_HOP;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// Bucket index -> extracted values, in file order.
pub type Buckets = BTreeMap<usize, Vec<f64>>;

/// Extract latency values from one file's rows.
///
/// Every bucket in `0..bucket_count` is present in the result, possibly empty;
/// deciding whether an empty bucket is an error is left to the aggregator.
pub fn extract<I>(rows: I, path: &Path, extraction: Extraction, bucket_count: usize) -> Result<Buckets>
where
    I: IntoIterator<Item = Result<ResultRow>>,
{
    let mut out: Buckets = (0..bucket_count).map(|b| (b, Vec::new())).collect();

    match extraction {
        Extraction::Column(col) => {
            for row in rows {
                let row = row?;
                let v = number::<f64>(&row, col, path)?;
                push(&mut out, 0, v, &row, path)?;
            }
        }
        Extraction::HopBuckets => {
            // The first row's root marks the traversal being measured; rows of
            // other roots interleaved in the same file are dropped.
            let mut cmp_root: Option<u64> = None;
            for row in rows {
                let row = row?;
                let root = number::<u64>(&row, 0, path)?;
                let cmp = *cmp_root.get_or_insert(root);
                if root != cmp {
                    continue;
                }
                let hop = number::<u64>(&row, 1, path)?;
                if hop < KHOP_MIN_HOP {
                    continue;
                }
                // Latency is only read from rows that land in a bucket.
                let latency = number::<f64>(&row, 2, path)?;
                let bucket = (hop - KHOP_MIN_HOP) as usize;
                push(&mut out, bucket, latency, &row, path)?;
            }
        }
        Extraction::QueryTypeBuckets => {
            for row in rows {
                let row = row?;
                let query_type = number::<u64>(&row, 0, path)? as usize;
                let latency = number::<f64>(&row, 1, path)?;
                push(&mut out, query_type, latency, &row, path)?;
            }
        }
        Extraction::WorkerCounters => {
            return Err(AggregateError::Unsupported {
                stage: "latency extraction",
                what: format!("worker counters in {}", path.display()),
            });
        }
    }

    Ok(out)
}

/// Extract the per-worker counters of one OLTP throughput file.
///
/// Row 0: col4 = barrier start time.
/// Row 1: col0 = issued, col1 = failed, col2 = skipped (vertex deleted),
/// col4 = end time. Further rows are ignored.
pub fn extract_worker<I>(rows: I, path: &Path) -> Result<WorkerSample>
where
    I: IntoIterator<Item = Result<ResultRow>>,
{
    let mut rows = rows.into_iter();
    let barrier = next_row(&mut rows, path, "barrier")?;
    let counters = next_row(&mut rows, path, "query counters")?;

    let start = number::<f64>(&barrier, 4, path)?;
    let issued = number::<u64>(&counters, 0, path)?;
    let failed = number::<u64>(&counters, 1, path)?;
    let skipped = number::<u64>(&counters, 2, path)?;
    let end = number::<f64>(&counters, 4, path)?;

    if skipped > issued {
        return Err(AggregateError::parse(
            path,
            counters.line,
            format!("skipped queries ({}) exceed issued queries ({})", skipped, issued),
        ));
    }

    Ok(WorkerSample {
        issued,
        failed,
        skipped,
        start,
        end,
    })
}

fn next_row<I>(rows: &mut I, path: &Path, what: &str) -> Result<ResultRow>
where
    I: Iterator<Item = Result<ResultRow>>,
{
    match rows.next() {
        Some(row) => row,
        None => Err(AggregateError::parse(
            path,
            0,
            format!("file ends before the {} row", what),
        )),
    }
}

fn push(out: &mut Buckets, bucket: usize, v: f64, row: &ResultRow, path: &Path) -> Result<()> {
    let buckets = out.len();
    match out.get_mut(&bucket) {
        Some(values) => {
            values.push(v);
            Ok(())
        }
        None => Err(AggregateError::parse(
            path,
            row.line,
            format!("bucket {} out of range (expected < {})", bucket, buckets),
        )),
    }
}

fn number<T>(row: &ResultRow, col: usize, path: &Path) -> Result<T>
where
    T: FromStr + Finite,
{
    let raw = row.field(col).ok_or_else(|| {
        AggregateError::parse(
            path,
            row.line,
            format!("expected at least {} fields, found {}", col + 1, row.fields.len()),
        )
    })?;
    match raw.parse::<T>() {
        Ok(v) if v.is_finite_value() => Ok(v),
        _ => Err(AggregateError::parse(
            path,
            row.line,
            format!("field {} is not a number: {:?}", col, raw),
        )),
    }
}

/// Rejects `inf`/`NaN`, which `f64::from_str` would otherwise accept.
trait Finite {
    fn is_finite_value(&self) -> bool;
}

impl Finite for f64 {
    fn is_finite_value(&self) -> bool {
        self.is_finite()
    }
}

impl Finite for u64 {
    fn is_finite_value(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rows(data: &[&[&str]]) -> Vec<Result<ResultRow>> {
        data.iter()
            .enumerate()
            .map(|(i, fields)| {
                Ok(ResultRow::new(
                    i + 1,
                    fields.iter().map(|s| s.to_string()).collect(),
                ))
            })
            .collect()
    }

    fn path() -> &'static Path {
        Path::new("lsb.test.r0")
    }

    #[test]
    fn column_takes_every_row() {
        let got = extract(
            rows(&[&["0", "7", "10.5", "x"], &["1", "7", "20"]]),
            path(),
            Extraction::Column(2),
            1,
        )
        .unwrap();
        assert_eq!(got, Buckets::from([(0, vec![10.5, 20.0])]));
    }

    #[test]
    fn khop_first_row_fixes_root() {
        let got = extract(
            rows(&[
                &["5", "0", "10"],
                &["5", "2", "100"],
                &["5", "3", "200"],
                &["9", "2", "999"],
            ]),
            path(),
            Extraction::HopBuckets,
            3,
        )
        .unwrap();
        assert_eq!(
            got,
            Buckets::from([(0, vec![100.0]), (1, vec![200.0]), (2, vec![])])
        );
    }

    #[test]
    fn khop_root_does_not_leak_between_files() {
        let first = extract(
            rows(&[&["5", "2", "1"]]),
            path(),
            Extraction::HopBuckets,
            3,
        )
        .unwrap();
        let second = extract(
            rows(&[&["9", "2", "2"], &["5", "2", "3"]]),
            path(),
            Extraction::HopBuckets,
            3,
        )
        .unwrap();
        assert_eq!(first[&0], vec![1.0]);
        assert_eq!(second[&0], vec![2.0]);
    }

    #[test]
    fn khop_discarded_rows_are_not_parsed_past_the_filter() {
        let got = extract(
            rows(&[
                &["5", "2", "100"],
                &["9", "2", "n/a"],
                &["9", "x"],
                &["5", "1"],
            ]),
            path(),
            Extraction::HopBuckets,
            3,
        )
        .unwrap();
        assert_eq!(
            got,
            Buckets::from([(0, vec![100.0]), (1, vec![]), (2, vec![])])
        );
    }

    #[test]
    fn khop_kept_row_with_bad_latency_is_fatal() {
        let err = extract(
            rows(&[&["5", "2", "100"], &["5", "3", "n/a"]]),
            path(),
            Extraction::HopBuckets,
            3,
        )
        .unwrap_err();
        assert!(matches!(err, AggregateError::Parse { line: 2, .. }));
    }

    #[test]
    fn khop_hop_beyond_buckets_is_fatal() {
        let err = extract(
            rows(&[&["5", "5", "1"]]),
            path(),
            Extraction::HopBuckets,
            3,
        )
        .unwrap_err();
        assert!(matches!(err, AggregateError::Parse { line: 1, .. }));
    }

    #[test]
    fn query_types_are_bucketed_unclamped() {
        let got = extract(
            rows(&[&["0", "12"], &["6", "90000"], &["0", "14"]]),
            path(),
            Extraction::QueryTypeBuckets,
            7,
        )
        .unwrap();
        assert_eq!(got[&0], vec![12.0, 14.0]);
        assert_eq!(got[&6], vec![90000.0]);
        assert!(got[&3].is_empty());
    }

    #[test]
    fn short_row_is_parse_error() {
        let err = extract(
            rows(&[&["0", "1", "2", "3"], &["0", "1"]]),
            path(),
            Extraction::Column(3),
            1,
        )
        .unwrap_err();
        match err {
            AggregateError::Parse { line, reason, .. } => {
                assert_eq!(line, 2);
                assert!(reason.contains("expected at least 4 fields"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn non_numeric_and_non_finite_fields_are_rejected() {
        for bad in ["abc", "NaN", "inf"] {
            let err = extract(
                rows(&[&["0", bad]]),
                path(),
                Extraction::Column(1),
                1,
            )
            .unwrap_err();
            assert!(matches!(err, AggregateError::Parse { .. }), "{}", bad);
        }
    }

    #[test]
    fn worker_counters() {
        let got = extract_worker(
            rows(&[
                &["0", "0", "0", "0", "5.0"],
                &["1000", "5", "10", "0", "100"],
                &["ignored"],
            ]),
            path(),
        )
        .unwrap();
        assert_eq!(
            got,
            WorkerSample {
                issued: 1000,
                failed: 5,
                skipped: 10,
                start: 5.0,
                end: 100.0,
            }
        );
    }

    #[test]
    fn worker_counters_are_not_latencies() {
        let err = extract(
            rows(&[&["0", "0", "0", "0", "5"]]),
            path(),
            Extraction::WorkerCounters,
            1,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AggregateError::Unsupported { stage: "latency extraction", .. }
        ));
    }

    #[test]
    fn worker_file_needs_two_rows() {
        let err = extract_worker(rows(&[&["0", "0", "0", "0", "5"]]), path()).unwrap_err();
        assert!(err.to_string().contains("query counters"));
    }
}
