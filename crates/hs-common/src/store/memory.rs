use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    JobMatch, JobMatchUpsert, MatchStatus, MatchingStore, StatusPolicy, StoreError, UpsertOutcome,
};
use crate::{Candidate, JobPost, User, fixtures::Dataset};

#[derive(Debug, Default)]
struct MemoryState {
    job_posts: BTreeMap<i64, JobPost>,
    users: BTreeMap<i64, User>,
    matches: BTreeMap<(i64, i64), JobMatch>,
    next_match_id: i64,
    failing_pairs: HashSet<(i64, i64)>,
}

/// In-process store used by tests and the demo command. Keeps one match per
/// (job_post_id, candidate_id) key, same as the unique constraint in Postgres.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        let state = MemoryState {
            job_posts: dataset.job_posts.into_iter().map(|j| (j.id, j)).collect(),
            users: dataset.users.into_iter().map(|u| (u.id, u)).collect(),
            ..MemoryState::default()
        };

        Self {
            state: RwLock::new(state),
        }
    }

    pub async fn insert_job_post(&self, job: JobPost) {
        self.state.write().await.job_posts.insert(job.id, job);
    }

    pub async fn insert_user(&self, user: User) {
        self.state.write().await.users.insert(user.id, user);
    }

    pub async fn set_job_active(&self, job_post_id: i64, active: bool) {
        if let Some(job) = self.state.write().await.job_posts.get_mut(&job_post_id) {
            job.is_active = active;
        }
    }

    /// Reviewer-side status change, as the application layer would do it.
    pub async fn set_match_status(
        &self,
        job_post_id: i64,
        candidate_id: i64,
        status: MatchStatus,
    ) -> bool {
        match self
            .state
            .write()
            .await
            .matches
            .get_mut(&(job_post_id, candidate_id))
        {
            Some(m) => {
                m.status = status;
                m.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    /// Make every upsert for the pair fail until cleared.
    pub async fn fail_upserts_for(&self, job_post_id: i64, candidate_id: i64) {
        self.state
            .write()
            .await
            .failing_pairs
            .insert((job_post_id, candidate_id));
    }

    pub async fn job_match(&self, job_post_id: i64, candidate_id: i64) -> Option<JobMatch> {
        self.state
            .read()
            .await
            .matches
            .get(&(job_post_id, candidate_id))
            .cloned()
    }

    /// All matches ordered by (job_post_id, candidate_id).
    pub async fn job_matches(&self) -> Vec<JobMatch> {
        self.state.read().await.matches.values().cloned().collect()
    }
}

impl MatchingStore for InMemoryStore {
    async fn fetch_active_job_posts(&self) -> Result<Vec<JobPost>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .job_posts
            .values()
            .filter(|j| j.is_active)
            .cloned()
            .collect())
    }

    async fn fetch_candidates_page(
        &self,
        after_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Candidate>, StoreError> {
        let state = self.state.read().await;
        let lower = after_id.map_or(i64::MIN, |id| id.saturating_add(1));

        Ok(state
            .users
            .range(lower..)
            .filter_map(|(_, user)| user.clone().into_candidate())
            .take(limit)
            .collect())
    }

    async fn upsert_job_match(
        &self,
        record: &JobMatchUpsert,
        policy: StatusPolicy,
    ) -> Result<UpsertOutcome, StoreError> {
        let mut state = self.state.write().await;
        let key = (record.job_post_id, record.candidate_id);

        if state.failing_pairs.contains(&key) {
            return Err(StoreError::Unavailable(format!(
                "injected failure for job {} / candidate {}",
                key.0, key.1
            )));
        }

        let now = Utc::now();
        if let Some(existing) = state.matches.get_mut(&key) {
            existing.match_score = record.match_score;
            existing.match_details = record.match_details.clone();
            existing.last_run_id = Some(record.run_id.clone());
            existing.updated_at = now;
            if policy.resets() {
                existing.status = MatchStatus::Pending;
            }

            return Ok(UpsertOutcome {
                match_id: existing.id,
                created: false,
                status: existing.status,
            });
        }

        state.next_match_id += 1;
        let id = state.next_match_id;
        state.matches.insert(
            key,
            JobMatch {
                id,
                job_post_id: record.job_post_id,
                candidate_id: record.candidate_id,
                match_score: record.match_score,
                match_details: record.match_details.clone(),
                status: MatchStatus::Pending,
                last_run_id: Some(record.run_id.clone()),
                created_at: now,
                updated_at: now,
            },
        );

        Ok(UpsertOutcome {
            match_id: id,
            created: true,
            status: MatchStatus::Pending,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Role,
        fixtures::matching_demo_dataset,
        matching::{MatchScore, Scorer},
    };

    fn record(job_post_id: i64, candidate_id: i64, score: &MatchScore) -> JobMatchUpsert {
        JobMatchUpsert {
            job_post_id,
            candidate_id,
            match_score: score.total,
            match_details: score.details(),
            run_id: "run-1".into(),
        }
    }

    #[tokio::test]
    async fn loads_only_active_jobs() {
        let store = InMemoryStore::from_dataset(matching_demo_dataset());
        let jobs = store.fetch_active_job_posts().await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert!(jobs.iter().all(|j| j.is_active));
    }

    #[tokio::test]
    async fn pages_candidates_by_id_and_skips_employers() {
        let store = InMemoryStore::from_dataset(matching_demo_dataset());

        let first = store.fetch_candidates_page(None, 3).await.unwrap();
        let ids: Vec<_> = first.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);

        let second = store.fetch_candidates_page(Some(4), 3).await.unwrap();
        assert_eq!(second.iter().map(|c| c.id).collect::<Vec<_>>(), vec![5]);

        let done = store.fetch_candidates_page(Some(5), 3).await.unwrap();
        assert!(done.is_empty());
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_per_pair() {
        let store = InMemoryStore::new();
        let score = Scorer::default().combine(100.0, 50.0, 0.0);

        let first = store.upsert_job_match(&record(1, 2, &score), StatusPolicy::default()).await.unwrap();
        let second = store.upsert_job_match(&record(1, 2, &score), StatusPolicy::default()).await.unwrap();

        assert!(first.created);
        assert!(!second.created);
        assert_eq!(first.match_id, second.match_id);
        assert_eq!(store.job_matches().await.len(), 1);
    }

    #[tokio::test]
    async fn status_policy_controls_rescore() {
        let store = InMemoryStore::new();
        let score = Scorer::default().combine(100.0, 100.0, 100.0);

        store.upsert_job_match(&record(1, 2, &score), StatusPolicy::default()).await.unwrap();
        assert!(store.set_match_status(1, 2, MatchStatus::Viewed).await);

        let kept = store
            .upsert_job_match(&record(1, 2, &score), StatusPolicy::PreserveOnUpdate)
            .await
            .unwrap();
        assert_eq!(kept.status, MatchStatus::Viewed);

        let reset = store
            .upsert_job_match(&record(1, 2, &score), StatusPolicy::ResetToPending)
            .await
            .unwrap();
        assert_eq!(reset.status, MatchStatus::Pending);
    }

    #[tokio::test]
    async fn injected_failures_only_hit_their_pair() {
        let store = InMemoryStore::new();
        let score = Scorer::default().combine(0.0, 0.0, 0.0);
        store.fail_upserts_for(1, 2).await;

        assert!(store.upsert_job_match(&record(1, 2, &score), StatusPolicy::default()).await.is_err());
        assert!(store.upsert_job_match(&record(1, 3, &score), StatusPolicy::default()).await.is_ok());
    }

    #[tokio::test]
    async fn new_users_show_up_as_candidates() {
        let store = InMemoryStore::new();
        store
            .insert_user(User {
                id: 7,
                name: "Eve".into(),
                email: "eve@example.com".into(),
                role: Role::Candidate(Default::default()),
            })
            .await;

        let page = store.fetch_candidates_page(None, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].email, "eve@example.com");
    }
}
