#![allow(async_fn_in_trait)]

pub mod memory;

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use deadpool_postgres::PoolError;
use serde::{Deserialize, Serialize};
use tokio_postgres::Error as PgError;

use crate::{Candidate, JobPost, matching::MatchDetails};

pub use memory::InMemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("failed to map row: {0}")]
    Mapping(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Review state of a match. The batch only ever writes `Pending`; reviewers move it on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Pending,
    Viewed,
    Rejected,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Viewed => "viewed",
            MatchStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown match status: {0}")]
pub struct UnknownMatchStatus(pub String);

impl FromStr for MatchStatus {
    type Err = UnknownMatchStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MatchStatus::Pending),
            "viewed" => Ok(MatchStatus::Viewed),
            "rejected" => Ok(MatchStatus::Rejected),
            other => Err(UnknownMatchStatus(other.to_string())),
        }
    }
}

/// What happens to an existing row's status when the pair is scored again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusPolicy {
    /// Keep the reviewer's disposition; `pending` is only written on insert.
    #[default]
    PreserveOnUpdate,
    /// Legacy behavior: every rescore puts the row back to `pending`.
    ResetToPending,
}

impl StatusPolicy {
    pub fn resets(&self) -> bool {
        matches!(self, StatusPolicy::ResetToPending)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobMatchUpsert {
    pub job_post_id: i64,
    pub candidate_id: i64,
    pub match_score: i32,
    pub match_details: MatchDetails,
    pub run_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub match_id: i64,
    pub created: bool,
    pub status: MatchStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobMatch {
    pub id: i64,
    pub job_post_id: i64,
    pub candidate_id: i64,
    pub match_score: i32,
    pub match_details: MatchDetails,
    pub status: MatchStatus,
    pub last_run_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Job/candidate loader plus the match recorder the batch writes through.
pub trait MatchingStore {
    /// Active job posts with their required skills.
    async fn fetch_active_job_posts(&self) -> Result<Vec<JobPost>, StoreError>;

    /// Candidates ordered by id, starting after `after_id`, at most `limit` rows.
    async fn fetch_candidates_page(
        &self,
        after_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Candidate>, StoreError>;

    /// Insert or overwrite the match for `(job_post_id, candidate_id)` atomically.
    async fn upsert_job_match(
        &self,
        record: &JobMatchUpsert,
        policy: StatusPolicy,
    ) -> Result<UpsertOutcome, StoreError>;
}
