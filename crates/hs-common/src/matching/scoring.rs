use serde::{Deserialize, Serialize};

use super::{
    location::location_score,
    salary::{SalaryRange, salary_score},
    skills::skills_score,
    weights::Weights,
};
use crate::{Candidate, JobPost};

/// Tag stored with every match so rows produced by an older formula can be told apart.
pub const ALGORITHM_VERSION: &str = "1.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorScores {
    pub skills: i32,
    pub salary: i32,
    pub location: i32,
}

/// Persisted breakdown of a match (`job_matches.match_details`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub scores: FactorScores,
    pub weights_used: Weights,
    pub algorithm_version: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchScore {
    pub skills: i32,
    pub salary: i32,
    pub location: i32,
    pub total: i32,
    pub weights: Weights,
    pub algorithm_version: &'static str,
}

impl MatchScore {
    pub fn details(&self) -> MatchDetails {
        MatchDetails {
            scores: FactorScores {
                skills: self.skills,
                salary: self.salary,
                location: self.location,
            },
            weights_used: self.weights,
            algorithm_version: self.algorithm_version.to_string(),
        }
    }

    pub fn clears(&self, threshold: i32) -> bool {
        self.total >= threshold
    }
}

// f64::round rounds half away from zero.
fn round_score(value: f64) -> i32 {
    value.round() as i32
}

/// Pure weighted scorer for a single (job, candidate) pair.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    weights: Weights,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(Weights::default())
    }
}

impl Scorer {
    pub fn new(weights: Weights) -> Self {
        Self { weights }
    }

    pub fn score(&self, job: &JobPost, candidate: &Candidate) -> MatchScore {
        let profile = &candidate.profile;

        let skills = skills_score(&job.required_skills, &profile.skills);
        let salary = salary_score(
            SalaryRange::new(job.salary_min, job.salary_max),
            SalaryRange::new(profile.salary_expectation_min, profile.salary_expectation_max),
        );
        let location = location_score(&job.location, profile.location_preference.as_deref());

        self.combine(skills, salary, location)
    }

    /// Weighted total from raw sub-scores. The total is taken before the
    /// sub-scores are rounded for storage.
    pub fn combine(&self, skills: f64, salary: f64, location: f64) -> MatchScore {
        let total = skills * self.weights.skills
            + salary * self.weights.salary
            + location * self.weights.location;

        MatchScore {
            skills: round_score(skills),
            salary: round_score(salary),
            location: round_score(location),
            total: round_score(total),
            weights: self.weights,
            algorithm_version: ALGORITHM_VERSION,
        }
    }
}
