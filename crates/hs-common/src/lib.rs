pub mod config;
pub mod db;
pub mod fixtures;
pub mod logging;
pub mod matching;
pub mod notify;
pub mod run_id;
pub mod schema;
pub mod store;

use std::collections::BTreeSet;

/// Skill identity. Matching compares ids, never names.
pub type SkillId = i64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
}

// Commonly used data models for matching functions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPost {
    pub id: i64,
    pub employer_id: i64,
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub company_description: Option<String>,
    pub location: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub is_active: bool,
    pub required_skills: BTreeSet<SkillId>,
}

/// Candidate-only attributes of a user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandidateProfile {
    pub location_preference: Option<String>,
    pub salary_expectation_min: Option<i64>,
    pub salary_expectation_max: Option<i64>,
    pub skills: BTreeSet<SkillId>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Role {
    Admin,
    Employer,
    Candidate(CandidateProfile),
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Employer => "employer",
            Role::Candidate(_) => "candidate",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl User {
    /// Narrow to the candidate view; employers and admins yield `None`.
    pub fn into_candidate(self) -> Option<Candidate> {
        match self.role {
            Role::Candidate(profile) => Some(Candidate {
                id: self.id,
                name: self.name,
                email: self.email,
                profile,
            }),
            Role::Admin | Role::Employer => None,
        }
    }
}

/// A user with role = candidate, as consumed by the matching batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub profile: CandidateProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_candidates_narrow_to_candidate_view() {
        let employer = User {
            id: 1,
            name: "Tech Company Inc.".into(),
            email: "employer@example.com".into(),
            role: Role::Employer,
        };
        assert!(employer.into_candidate().is_none());

        let candidate = User {
            id: 2,
            name: "Alice".into(),
            email: "alice@example.com".into(),
            role: Role::Candidate(CandidateProfile {
                location_preference: Some("New York, NY".into()),
                skills: [1, 2].into_iter().collect(),
                ..CandidateProfile::default()
            }),
        };
        assert_eq!(candidate.role.as_str(), "candidate");

        let narrowed = candidate.into_candidate().expect("candidate role");
        assert_eq!(narrowed.id, 2);
        assert_eq!(narrowed.profile.skills.len(), 2);
    }
}
