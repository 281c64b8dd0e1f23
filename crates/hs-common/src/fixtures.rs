//! Demo data set for the matching batch: a small job board with two active
//! posts and four candidates covering perfect, salary-miss, remote and
//! wrong-location cases.

use crate::{CandidateProfile, JobPost, Role, Skill, SkillId, User};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub skills: Vec<Skill>,
    pub job_posts: Vec<JobPost>,
    pub users: Vec<User>,
}

impl Dataset {
    pub fn skill_id(&self, name: &str) -> Option<SkillId> {
        self.skills.iter().find(|s| s.name == name).map(|s| s.id)
    }
}

const SKILL_NAMES: [&str; 8] = [
    "PHP",
    "Laravel",
    "Vue.js",
    "React",
    "PostgreSQL",
    "Docker",
    "AWS",
    "JavaScript",
];

pub const EMPLOYER_ID: i64 = 1;
pub const SENIOR_LARAVEL_JOB_ID: i64 = 1;
pub const FRONTEND_JOB_ID: i64 = 2;
pub const ARCHIVED_JOB_ID: i64 = 3;
pub const ALICE_ID: i64 = 2;
pub const BOB_ID: i64 = 3;
pub const CHARLIE_ID: i64 = 4;
pub const DAVID_ID: i64 = 5;

fn ids(skills: &[Skill], names: &[&str]) -> std::collections::BTreeSet<SkillId> {
    skills
        .iter()
        .filter(|s| names.contains(&s.name.as_str()))
        .map(|s| s.id)
        .collect()
}

fn candidate(
    id: i64,
    name: &str,
    email: &str,
    location: &str,
    salary: (i64, i64),
    skills: std::collections::BTreeSet<SkillId>,
) -> User {
    User {
        id,
        name: name.into(),
        email: email.into(),
        role: Role::Candidate(CandidateProfile {
            location_preference: Some(location.into()),
            salary_expectation_min: Some(salary.0),
            salary_expectation_max: Some(salary.1),
            skills,
        }),
    }
}

pub fn matching_demo_dataset() -> Dataset {
    let skills: Vec<Skill> = SKILL_NAMES
        .iter()
        .zip(1..)
        .map(|(name, id)| Skill {
            id,
            name: (*name).to_string(),
        })
        .collect();

    let job_posts = vec![
        JobPost {
            id: SENIOR_LARAVEL_JOB_ID,
            employer_id: EMPLOYER_ID,
            title: "Senior Laravel Developer".into(),
            description: "Looking for a senior backend developer.".into(),
            company_name: "Tech Company Inc.".into(),
            company_description: None,
            location: "New York, NY".into(),
            salary_min: Some(100_000),
            salary_max: Some(150_000),
            is_active: true,
            required_skills: ids(&skills, &["PHP", "Laravel", "PostgreSQL", "Docker"]),
        },
        JobPost {
            id: FRONTEND_JOB_ID,
            employer_id: EMPLOYER_ID,
            title: "Frontend Developer".into(),
            description: "Building beautiful UIs with Vue.".into(),
            company_name: "Tech Company Inc.".into(),
            company_description: None,
            location: "Remote".into(),
            salary_min: Some(80_000),
            salary_max: Some(120_000),
            is_active: true,
            required_skills: ids(&skills, &["JavaScript", "Vue.js", "React"]),
        },
        JobPost {
            id: ARCHIVED_JOB_ID,
            employer_id: EMPLOYER_ID,
            title: "Legacy PHP Maintainer".into(),
            description: "Position closed.".into(),
            company_name: "Tech Company Inc.".into(),
            company_description: None,
            location: "New York, NY".into(),
            salary_min: Some(90_000),
            salary_max: Some(110_000),
            is_active: false,
            required_skills: ids(&skills, &["PHP"]),
        },
    ];

    let users = vec![
        User {
            id: EMPLOYER_ID,
            name: "Tech Company Inc.".into(),
            email: "employer@example.com".into(),
            role: Role::Employer,
        },
        candidate(
            ALICE_ID,
            "Alice PerfectMatch",
            "alice@example.com",
            "New York, NY",
            (110_000, 140_000),
            ids(&skills, &["PHP", "Laravel", "PostgreSQL", "Docker", "AWS"]),
        ),
        candidate(
            BOB_ID,
            "Bob GoodMatch",
            "bob@example.com",
            "New York, NY",
            (155_000, 170_000),
            ids(&skills, &["PHP", "Laravel"]),
        ),
        candidate(
            CHARLIE_ID,
            "Charlie Remote",
            "charlie@example.com",
            "Remote",
            (90_000, 110_000),
            ids(&skills, &["JavaScript", "Vue.js"]),
        ),
        candidate(
            DAVID_ID,
            "David WrongLocation",
            "david@example.com",
            "Boston, MA",
            (100_000, 130_000),
            ids(&skills, &["PHP", "Laravel", "PostgreSQL"]),
        ),
    ];

    Dataset {
        skills,
        job_posts,
        users,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_ids_are_sequential_and_unique() {
        let data = matching_demo_dataset();
        assert_eq!(data.skills.len(), 8);
        assert_eq!(data.skill_id("PHP"), Some(1));
        assert_eq!(data.skill_id("JavaScript"), Some(8));
        assert_eq!(data.skill_id("Rust"), None);
    }

    #[test]
    fn has_four_candidates_and_one_inactive_post() {
        let data = matching_demo_dataset();
        let candidates = data
            .users
            .iter()
            .filter(|u| matches!(u.role, Role::Candidate(_)))
            .count();
        assert_eq!(candidates, 4);
        assert_eq!(data.job_posts.iter().filter(|j| !j.is_active).count(), 1);
    }
}
