use std::collections::BTreeSet;

use crate::SkillId;

#[derive(Debug, Clone, PartialEq)]
pub struct SkillOverlap {
    pub required: usize,
    pub matched: Vec<SkillId>,
    pub missing: Vec<SkillId>,
}

impl SkillOverlap {
    /// Share of required skills the candidate holds, on a 0..=100 scale.
    /// A job with no required skills scores 0.
    pub fn score(&self) -> f64 {
        if self.required == 0 {
            return 0.0;
        }
        self.matched.len() as f64 / self.required as f64 * 100.0
    }
}

/// Compare required and possessed skills by id.
pub fn skill_overlap(required: &BTreeSet<SkillId>, possessed: &BTreeSet<SkillId>) -> SkillOverlap {
    let matched: Vec<_> = required.intersection(possessed).copied().collect();
    let missing: Vec<_> = required.difference(possessed).copied().collect();

    SkillOverlap {
        required: required.len(),
        matched,
        missing,
    }
}

pub fn skills_score(required: &BTreeSet<SkillId>, possessed: &BTreeSet<SkillId>) -> f64 {
    skill_overlap(required, possessed).score()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(ids: &[SkillId]) -> BTreeSet<SkillId> {
        ids.iter().copied().collect()
    }

    #[test]
    fn no_required_skills_scores_zero() {
        assert_eq!(skills_score(&set(&[]), &set(&[1, 2, 3])), 0.0);
        assert_eq!(skills_score(&set(&[]), &set(&[])), 0.0);
    }

    #[test]
    fn partial_overlap_is_proportional() {
        let overlap = skill_overlap(&set(&[1, 2, 3, 4]), &set(&[1, 2, 3, 9]));
        assert_eq!(overlap.matched, vec![1, 2, 3]);
        assert_eq!(overlap.missing, vec![4]);
        assert!((overlap.score() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn extra_candidate_skills_do_not_inflate_score() {
        assert_eq!(skills_score(&set(&[1, 2]), &set(&[1, 2, 3, 4, 5])), 100.0);
    }

    #[test]
    fn one_of_three_is_a_repeating_fraction() {
        let score = skills_score(&set(&[1, 2, 3]), &set(&[2]));
        assert!((score - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(score.round(), 33.0);
    }

    #[test]
    fn empty_candidate_skills_score_zero() {
        assert_eq!(skills_score(&set(&[1]), &set(&[])), 0.0);
    }
}
