/// Score returned when either side leaves a salary bound unset.
pub const NEUTRAL_SALARY_SCORE: f64 = 50.0;
/// Score for a candidate whose top ask exceeds the offer by more than the buffer.
pub const OVER_BUFFER_SALARY_SCORE: f64 = 25.0;
/// Share of the job's top offer tolerated above it before the score bottoms out.
pub const SALARY_BUFFER_RATIO: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SalaryRange {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl SalaryRange {
    pub fn new(min: Option<i64>, max: Option<i64>) -> Self {
        Self { min, max }
    }

    fn bounds(&self) -> Option<(i64, i64)> {
        Some((self.min?, self.max?))
    }
}

/// Salary compatibility on a 0..=100 scale.
pub fn salary_score(job: SalaryRange, candidate: SalaryRange) -> f64 {
    let (Some((job_min, job_max)), Some((candidate_min, candidate_max))) =
        (job.bounds(), candidate.bounds())
    else {
        return NEUTRAL_SALARY_SCORE;
    };

    if candidate_max < job_min || candidate_min > job_max {
        return 0.0;
    }

    if candidate_max <= job_max {
        return 100.0;
    }

    let diff = (i128::from(candidate_max) - i128::from(job_max)) as f64;
    let buffer = job_max as f64 * SALARY_BUFFER_RATIO;
    if diff > buffer {
        return OVER_BUFFER_SALARY_SCORE;
    }

    100.0 - (diff / buffer) * (100.0 - OVER_BUFFER_SALARY_SCORE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: i64, max: i64) -> SalaryRange {
        SalaryRange::new(Some(min), Some(max))
    }

    #[test]
    fn expectation_inside_offer_is_perfect() {
        assert_eq!(salary_score(range(100_000, 150_000), range(110_000, 140_000)), 100.0);
    }

    #[test]
    fn expectation_below_offer_is_perfect() {
        assert_eq!(salary_score(range(100_000, 150_000), range(90_000, 140_000)), 100.0);
    }

    #[test]
    fn top_ask_within_buffer_interpolates() {
        let score = salary_score(range(100_000, 150_000), range(120_000, 170_000));
        assert!((score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn top_ask_at_buffer_edge_scores_floor() {
        let score = salary_score(range(100_000, 150_000), range(120_000, 180_000));
        assert!((score - 25.0).abs() < 1e-9);
    }

    #[test]
    fn top_ask_beyond_buffer_scores_floor() {
        assert_eq!(
            salary_score(range(100_000, 150_000), range(140_000, 200_000)),
            OVER_BUFFER_SALARY_SCORE
        );
    }

    #[test]
    fn extreme_bounds_do_not_overflow() {
        let score = salary_score(range(i64::MIN, -1), range(-5, i64::MAX));
        assert_eq!(score, OVER_BUFFER_SALARY_SCORE);

        let score = salary_score(range(0, i64::MAX - 1), range(1, i64::MAX));
        assert!(score > 99.0 && score <= 100.0);
    }

    #[test]
    fn disjoint_ranges_score_zero() {
        assert_eq!(salary_score(range(100_000, 150_000), range(155_000, 170_000)), 0.0);
        assert_eq!(salary_score(range(100_000, 150_000), range(50_000, 90_000)), 0.0);
    }

    #[test]
    fn touching_ranges_overlap() {
        assert_eq!(salary_score(range(100_000, 150_000), range(80_000, 100_000)), 100.0);
    }

    #[test]
    fn any_missing_bound_is_neutral() {
        let full = range(100_000, 150_000);
        let cases = [
            (SalaryRange::new(None, Some(150_000)), full),
            (SalaryRange::new(Some(100_000), None), full),
            (full, SalaryRange::new(None, Some(140_000))),
            (full, SalaryRange::new(Some(110_000), None)),
            (SalaryRange::new(None, None), SalaryRange::new(None, None)),
        ];

        for (job, candidate) in cases {
            assert_eq!(salary_score(job, candidate), NEUTRAL_SALARY_SCORE);
        }
    }
}
