//! The pure recompute rule for denormalized rating summaries.
//!
//! Every unit in the episode → season → show hierarchy carries a
//! `{mean_rating, rating_count}` pair. An episode's summary is derived from
//! its raw rating rows; a season's (and a show's, one level up) is derived
//! from the summaries of its *rated* children — a child with `rating_count`
//! of zero is excluded so it cannot drag the parent's mean toward zero.
//!
//! Keeping the rule here, free of I/O, makes the invariant testable without a
//! database. The aggregation engine and the repair job both call into this
//! module instead of issuing ad-hoc SQL aggregates.

/// A denormalized rating summary as stored on a show, season or episode row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub mean_rating: f64,
    pub rating_count: i32,
}

impl Summary {
    #[must_use]
    pub const fn is_rated(&self) -> bool {
        self.rating_count > 0
    }
}

/// Arithmetic mean of raw rating values.
///
/// Returns `None` for an empty slice; the caller leaves the previous mean in
/// place rather than writing zero or NaN.
#[must_use]
pub fn mean_of(values: &[i32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let sum: i64 = values.iter().map(|&v| i64::from(v)).sum();
    #[allow(clippy::cast_precision_loss)]
    Some(sum as f64 / values.len() as f64)
}

/// Rolls child summaries up into a parent summary.
///
/// The parent mean is the arithmetic mean of the children's means, restricted
/// to rated children. The parent count is the number of rated children — not
/// the sum of their counts. Ranking thresholds are compared against that
/// count, so the distinction is load-bearing.
///
/// Returns `None` when no child is rated; the caller leaves the previous mean
/// untouched (the count may still be reset to zero by a repair pass).
#[must_use]
pub fn rollup(children: &[Summary]) -> Option<Summary> {
    let rated: Vec<f64> = children
        .iter()
        .filter(|c| c.is_rated())
        .map(|c| c.mean_rating)
        .collect();
    if rated.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    Some(Summary {
        mean_rating: rated.iter().sum::<f64>() / rated.len() as f64,
        rating_count: rated.len() as i32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(mean: f64, count: i32) -> Summary {
        Summary {
            mean_rating: mean,
            rating_count: count,
        }
    }

    #[test]
    fn mean_is_exact_over_source_values() {
        assert_eq!(mean_of(&[15]), Some(15.0));
        assert_eq!(mean_of(&[20, 10]), Some(15.0));
        let m = mean_of(&[14, 15, 16, 18]).unwrap();
        assert!((m - 15.75).abs() < f64::EPSILON);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean_of(&[]), None);
    }

    #[test]
    fn rollup_averages_child_means_not_raw_ratings() {
        // A season whose two episodes have means 20.0 (1 rating) and 10.0
        // (3 ratings) averages to 15.0, not the rating-weighted 12.5.
        let out = rollup(&[summary(20.0, 1), summary(10.0, 3)]).unwrap();
        assert!((out.mean_rating - 15.0).abs() < f64::EPSILON);
        assert_eq!(out.rating_count, 2);
    }

    #[test]
    fn rollup_count_is_rated_children_not_rating_sum() {
        let out = rollup(&[summary(12.0, 7), summary(16.0, 3)]).unwrap();
        assert_eq!(out.rating_count, 2);
    }

    #[test]
    fn rollup_excludes_unrated_children() {
        let out = rollup(&[summary(18.0, 4), summary(0.0, 0)]).unwrap();
        assert!((out.mean_rating - 18.0).abs() < f64::EPSILON);
        assert_eq!(out.rating_count, 1);
    }

    #[test]
    fn rollup_of_all_unrated_is_none() {
        assert_eq!(rollup(&[]), None);
        assert_eq!(rollup(&[summary(0.0, 0), summary(0.0, 0)]), None);
    }
}
