//! Aggregator: reduce extracted values to one number per point.

use crate::error::{AggregateError, Result};

/// Counters and timestamps reported by one OLTP worker. Times are in the raw
/// log unit (µs).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkerSample {
    pub issued: u64,
    pub failed: u64,
    /// Queries dropped because their vertex had been deleted.
    pub skipped: u64,
    /// Barrier release.
    pub start: f64,
    pub end: f64,
}

impl WorkerSample {
    /// Queries that count towards throughput and failure rate.
    pub fn effective(&self) -> u64 {
        self.issued - self.skipped
    }
}

/// Standard median; the mean of the two central elements for even lengths.
pub fn median(values: &[f64], what: &str) -> Result<f64> {
    if values.is_empty() {
        return Err(AggregateError::EmptyInput {
            what: what.to_string(),
        });
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Ok(sorted[mid])
    } else {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// `Σ(issued - skipped) / (max(end) - min(start))`, in queries per raw time unit.
pub fn throughput(workers: &[WorkerSample], what: &str) -> Result<f64> {
    let (Some(start), Some(end)) = (
        workers.iter().map(|w| w.start).reduce(f64::min),
        workers.iter().map(|w| w.end).reduce(f64::max),
    ) else {
        return Err(AggregateError::EmptyInput {
            what: what.to_string(),
        });
    };

    if end <= start {
        return Err(AggregateError::DegenerateWindow { start, end });
    }

    let queries: u64 = workers.iter().map(WorkerSample::effective).sum();
    Ok(queries as f64 / (end - start))
}

/// `Σfailed / Σ(issued - skipped) × 100`; 0 when no effective query was issued.
pub fn failure_rate(workers: &[WorkerSample]) -> f64 {
    let queries: u64 = workers.iter().map(WorkerSample::effective).sum();
    if queries == 0 {
        return 0.0;
    }
    let failed: u64 = workers.iter().map(|w| w.failed).sum();
    failed as f64 / queries as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9 * b.abs().max(1.0)
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0], "t").unwrap(), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0], "t").unwrap(), 2.5);
        assert_eq!(median(&[7.0], "t").unwrap(), 7.0);
    }

    #[test]
    fn median_is_order_independent() {
        let values = [9.0, 2.5, 7.0, 1.0, 4.0, 4.0, 12.0, 0.5];
        let expected = median(&values, "t").unwrap();
        let mut rotated = values;
        for _ in 0..values.len() {
            rotated.rotate_left(1);
            assert_eq!(median(&rotated, "t").unwrap(), expected);
        }
        let mut reversed = values;
        reversed.reverse();
        assert_eq!(median(&reversed, "t").unwrap(), expected);
        assert_eq!(expected, 4.0);
    }

    #[test]
    fn median_of_nothing_is_an_error() {
        let err = median(&[], "3-Hop at n008").unwrap_err();
        assert!(matches!(err, AggregateError::EmptyInput { .. }));
        assert!(err.to_string().contains("3-Hop at n008"));
    }

    fn two_workers() -> [WorkerSample; 2] {
        [
            WorkerSample {
                issued: 1000,
                failed: 5,
                skipped: 10,
                start: 0.0,
                end: 100.0,
            },
            WorkerSample {
                issued: 2000,
                failed: 0,
                skipped: 0,
                start: 5.0,
                end: 120.0,
            },
        ]
    }

    #[test]
    fn throughput_spans_earliest_start_to_latest_end() {
        let tp = throughput(&two_workers(), "t").unwrap();
        assert!(close(tp, 2990.0 / 120.0), "{}", tp);
        assert!(close(tp, 24.916_666_666_666_668));
    }

    #[test]
    fn throughput_is_order_independent() {
        let mut w = two_workers();
        let a = throughput(&w, "t").unwrap();
        w.reverse();
        assert_eq!(throughput(&w, "t").unwrap(), a);
    }

    #[test]
    fn throughput_rejects_empty_and_degenerate() {
        assert!(matches!(
            throughput(&[], "t").unwrap_err(),
            AggregateError::EmptyInput { .. }
        ));
        let w = WorkerSample {
            issued: 1,
            failed: 0,
            skipped: 0,
            start: 10.0,
            end: 10.0,
        };
        assert!(matches!(
            throughput(&[w], "t").unwrap_err(),
            AggregateError::DegenerateWindow { .. }
        ));
    }

    #[test]
    fn failure_rate_percent() {
        let rate = failure_rate(&two_workers());
        assert!(close(rate, 5.0 / 2990.0 * 100.0));
        assert!((rate - 0.1672).abs() < 1e-4);
    }

    #[test]
    fn failure_rate_without_queries_is_zero() {
        let w = WorkerSample {
            issued: 10,
            failed: 3,
            skipped: 10,
            start: 0.0,
            end: 1.0,
        };
        assert_eq!(failure_rate(&[w]), 0.0);
        assert_eq!(failure_rate(&[]), 0.0);
    }
}
