use super::{candidates, job_matches, job_posts, pool::PgPool};
use crate::{
    Candidate, JobPost,
    store::{JobMatchUpsert, MatchingStore, StatusPolicy, StoreError, UpsertOutcome},
};

/// Postgres-backed [`MatchingStore`].
#[derive(Clone)]
pub struct PgMatchingStore {
    pool: PgPool,
}

impl PgMatchingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl MatchingStore for PgMatchingStore {
    async fn fetch_active_job_posts(&self) -> Result<Vec<JobPost>, StoreError> {
        job_posts::fetch_active_job_posts(&self.pool).await
    }

    async fn fetch_candidates_page(
        &self,
        after_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Candidate>, StoreError> {
        candidates::fetch_candidates_page(&self.pool, after_id, limit).await
    }

    async fn upsert_job_match(
        &self,
        record: &JobMatchUpsert,
        policy: StatusPolicy,
    ) -> Result<UpsertOutcome, StoreError> {
        job_matches::upsert_job_match(&self.pool, record, policy).await
    }
}
