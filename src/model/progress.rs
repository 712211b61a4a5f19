use super::interval::{merge, Interval};

/// Total unique time watched: the summed length of the merged interval set.
pub fn watched_time(intervals: &[Interval]) -> f64 {
    merge(intervals).iter().map(Interval::length).sum()
}

/// Percentage of `duration` covered by `intervals`, deduplicated and clamped into `[0, 100]`.
///
/// `duration` must be positive and callers check it before getting here. With a zero duration the
/// result is NaN for an empty set and a saturated 100 otherwise, neither of which means anything.
pub fn compute_progress(intervals: &[Interval], duration: f64) -> f64 {
    let percentage = watched_time(intervals) / duration * 100.0;
    percentage.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(pairs: &[(f64, f64)]) -> Vec<Interval> {
        pairs.iter().map(|&(start, end)| Interval::new(start, end)).collect()
    }

    #[test]
    fn half_watched() {
        assert_eq!(compute_progress(&spans(&[(0.0, 50.0)]), 100.0), 50.0);
    }

    #[test]
    fn overlapping_time_is_counted_once() {
        let intervals = spans(&[(0.0, 50.0), (40.0, 100.0)]);
        assert_eq!(watched_time(&intervals), 100.0);
        assert_eq!(compute_progress(&intervals, 100.0), 100.0);
    }

    #[test]
    fn progress_is_capped_at_one_hundred() {
        let intervals = spans(&[(0.0, 150.0)]);
        assert_eq!(compute_progress(&intervals, 100.0), 100.0);
    }

    #[test]
    fn reversed_intervals_cannot_push_progress_below_zero() {
        let intervals = spans(&[(50.0, 10.0)]);
        assert_eq!(compute_progress(&intervals, 100.0), 0.0);
    }

    #[test]
    fn empty_set_has_no_progress() {
        assert_eq!(compute_progress(&[], 100.0), 0.0);
    }

    #[test]
    fn zero_duration_is_meaningless() {
        assert!(compute_progress(&[], 0.0).is_nan());
        assert_eq!(compute_progress(&spans(&[(0.0, 10.0)]), 0.0), 100.0);
    }

    #[test]
    fn progress_stays_in_bounds() {
        let intervals = spans(&[(0.0, 3.0), (2.0, 8.0), (20.0, 25.0), (24.0, 60.0), (59.0, 61.0)]);

        for duration in [1.0, 7.5, 30.0, 61.0, 600.0] {
            let progress = compute_progress(&intervals, duration);
            assert!(
                (0.0..=100.0).contains(&progress),
                "progress {progress} out of bounds for duration {duration}"
            );
        }
    }

    #[test]
    fn adding_intervals_never_decreases_progress() {
        let reports = spans(&[(10.0, 20.0), (15.0, 18.0), (0.0, 5.0), (90.0, 95.0), (0.0, 100.0)]);
        let mut watched = Vec::new();
        let mut previous = 0.0;

        for report in reports {
            watched.push(report);
            let progress = compute_progress(&watched, 100.0);
            assert!(progress >= previous, "{progress} < {previous} after {report:?}");
            previous = progress;
        }
    }
}
