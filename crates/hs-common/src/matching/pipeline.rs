use metrics::counter;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::scoring::{MatchScore, Scorer};
use crate::{
    Candidate, JobPost,
    config::MatchingConfig,
    notify::{HighMatchNotification, MatchNotifier},
    run_id,
    store::{JobMatchUpsert, MatchingStore, StoreError},
};

#[derive(Debug, thiserror::Error)]
pub enum MatchingError {
    #[error("failed to load active job posts: {0}")]
    LoadJobs(#[source] StoreError),
    #[error("failed to load candidates after id {after_id:?}: {source}")]
    LoadCandidates {
        after_id: Option<i64>,
        #[source]
        source: StoreError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyRunning,
    NoActiveJobs,
    NoCandidates,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub run_id: String,
    pub skipped: Option<SkipReason>,
    pub cancelled: bool,
    pub jobs: usize,
    pub candidates: usize,
    pub pairs_scored: usize,
    pub matches_created: usize,
    pub matches_updated: usize,
    pub upsert_failures: usize,
    pub notifications_sent: usize,
    pub notification_failures: usize,
}

impl BatchReport {
    fn new(run_id: String) -> Self {
        Self {
            run_id,
            ..Self::default()
        }
    }

    fn skipped(run_id: String, reason: SkipReason) -> Self {
        Self {
            run_id,
            skipped: Some(reason),
            ..Self::default()
        }
    }
}

/// Runs the all-pairs matching batch: load → score → upsert → notify.
///
/// Runs on one instance never overlap; a second call while a batch is in
/// flight returns a report skipped with [`SkipReason::AlreadyRunning`].
pub struct MatchingService<S, N> {
    store: S,
    notifier: N,
    scorer: Scorer,
    config: MatchingConfig,
    run_guard: Mutex<()>,
}

impl<S, N> MatchingService<S, N>
where
    S: MatchingStore,
    N: MatchNotifier,
{
    pub fn new(store: S, notifier: N, config: MatchingConfig) -> Self {
        Self {
            store,
            notifier,
            scorer: Scorer::new(config.weights),
            config,
            run_guard: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn run_batch(&self, cancel: &CancellationToken) -> Result<BatchReport, MatchingError> {
        let run_id = run_id::generate();

        let Ok(_guard) = self.run_guard.try_lock() else {
            info!(%run_id, "job matching already running; skipping");
            return Ok(BatchReport::skipped(run_id, SkipReason::AlreadyRunning));
        };

        let jobs: Vec<JobPost> = self
            .store
            .fetch_active_job_posts()
            .await
            .map_err(MatchingError::LoadJobs)?
            .into_iter()
            .filter(|job| job.is_active)
            .collect();

        let page_size = self.config.candidate_page_size.max(1);
        let mut page = self.load_candidates(None, page_size).await?;

        if jobs.is_empty() || page.is_empty() {
            info!(
                %run_id,
                jobs = jobs.len(),
                candidates = page.len(),
                "job matching: no active jobs or candidates to match"
            );
            let reason = if jobs.is_empty() {
                SkipReason::NoActiveJobs
            } else {
                SkipReason::NoCandidates
            };
            return Ok(BatchReport::skipped(run_id, reason));
        }

        info!(%run_id, jobs = jobs.len(), page_size, "job matching started");

        let mut report = BatchReport::new(run_id);
        report.jobs = jobs.len();

        'pages: loop {
            report.candidates += page.len();

            for job in &jobs {
                if cancel.is_cancelled() {
                    report.cancelled = true;
                    break 'pages;
                }
                for candidate in &page {
                    self.process_pair(job, candidate, &mut report).await;
                }
            }

            if page.len() < page_size {
                break;
            }
            if cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let after_id = page.last().map(|c| c.id);
            page = self.load_candidates(after_id, page_size).await?;
            if page.is_empty() {
                break;
            }
        }

        if report.cancelled {
            warn!(
                run_id = %report.run_id,
                pairs_scored = report.pairs_scored,
                "job matching cancelled before completion"
            );
        }

        info!(
            run_id = %report.run_id,
            jobs = report.jobs,
            candidates = report.candidates,
            pairs_scored = report.pairs_scored,
            created = report.matches_created,
            updated = report.matches_updated,
            upsert_failures = report.upsert_failures,
            notifications = report.notifications_sent,
            notification_failures = report.notification_failures,
            "job matching finished"
        );

        Ok(report)
    }

    async fn load_candidates(
        &self,
        after_id: Option<i64>,
        limit: usize,
    ) -> Result<Vec<Candidate>, MatchingError> {
        self.store
            .fetch_candidates_page(after_id, limit)
            .await
            .map_err(|source| MatchingError::LoadCandidates { after_id, source })
    }

    fn build_upsert(
        &self,
        job: &JobPost,
        candidate: &Candidate,
        score: &MatchScore,
        run_id: &str,
    ) -> JobMatchUpsert {
        JobMatchUpsert {
            job_post_id: job.id,
            candidate_id: candidate.id,
            match_score: score.total,
            match_details: score.details(),
            run_id: run_id.to_string(),
        }
    }

    async fn process_pair(&self, job: &JobPost, candidate: &Candidate, report: &mut BatchReport) {
        let score = self.scorer.score(job, candidate);
        report.pairs_scored += 1;
        counter!("hs_match_pairs_scored_total").increment(1);

        debug!(
            run_id = %report.run_id,
            job_post_id = job.id,
            candidate_id = candidate.id,
            skills = score.skills,
            salary = score.salary,
            location = score.location,
            total = score.total,
            "scored pair"
        );

        let record = self.build_upsert(job, candidate, &score, &report.run_id);
        let outcome = match self
            .store
            .upsert_job_match(&record, self.config.status_policy)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                report.upsert_failures += 1;
                counter!("hs_match_upsert_failures_total").increment(1);
                warn!(
                    run_id = %report.run_id,
                    job_post_id = job.id,
                    candidate_id = candidate.id,
                    error = %err,
                    "failed to record job match; continuing"
                );
                return;
            }
        };

        if outcome.created {
            report.matches_created += 1;
        } else {
            report.matches_updated += 1;
        }

        if !score.clears(self.config.threshold) {
            return;
        }

        let notification =
            HighMatchNotification::new(outcome.match_id, job, candidate, score.total);
        match self.notifier.notify_high_match(&notification).await {
            Ok(()) => {
                report.notifications_sent += 1;
                counter!("hs_match_notifications_total").increment(1);
                info!(
                    run_id = %report.run_id,
                    job_post_id = job.id,
                    candidate_id = candidate.id,
                    score = score.total,
                    "high match notification queued"
                );
            }
            Err(err) => {
                report.notification_failures += 1;
                counter!("hs_match_notification_failures_total").increment(1);
                warn!(
                    run_id = %report.run_id,
                    job_post_id = job.id,
                    candidate_id = candidate.id,
                    score = score.total,
                    error = %err,
                    "failed to queue high match notification"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CandidateProfile, Role, User,
        notify::{ChannelNotifier, NotificationError},
        store::{InMemoryStore, MatchStatus},
    };

    fn job(id: i64, skills: &[i64]) -> JobPost {
        JobPost {
            id,
            employer_id: 1,
            title: format!("Job {id}"),
            company_name: "Acme".into(),
            location: "Remote".into(),
            is_active: true,
            required_skills: skills.iter().copied().collect(),
            ..JobPost::default()
        }
    }

    fn candidate(id: i64, skills: &[i64]) -> User {
        User {
            id,
            name: format!("Candidate {id}"),
            email: format!("c{id}@example.com"),
            role: Role::Candidate(CandidateProfile {
                location_preference: Some("Remote".into()),
                skills: skills.iter().copied().collect(),
                ..CandidateProfile::default()
            }),
        }
    }

    struct FailingNotifier;

    impl MatchNotifier for FailingNotifier {
        async fn notify_high_match(
            &self,
            _notification: &HighMatchNotification,
        ) -> Result<(), NotificationError> {
            Err(NotificationError::ChannelClosed)
        }
    }

    #[tokio::test]
    async fn empty_store_is_a_clean_no_op() {
        let (notifier, mut receiver) = ChannelNotifier::new();
        let service = MatchingService::new(InMemoryStore::new(), notifier, MatchingConfig::default());

        let report = service.run_batch(&CancellationToken::new()).await.unwrap();

        assert_eq!(report.skipped, Some(SkipReason::NoActiveJobs));
        assert_eq!(report.pairs_scored, 0);
        assert!(service.store().job_matches().await.is_empty());
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn jobs_without_candidates_are_skipped() {
        let store = InMemoryStore::new();
        store.insert_job_post(job(1, &[1])).await;
        let (notifier, _receiver) = ChannelNotifier::new();
        let service = MatchingService::new(store, notifier, MatchingConfig::default());

        let report = service.run_batch(&CancellationToken::new()).await.unwrap();
        assert_eq!(report.skipped, Some(SkipReason::NoCandidates));
    }

    #[tokio::test]
    async fn threshold_is_inclusive() {
        // Neutral salary (15) + matching location (20): 7/10 skills -> 70, 17/25 -> 69.
        let store = InMemoryStore::new();
        let ten: Vec<i64> = (1..=10).collect();
        let twenty_five: Vec<i64> = (1..=25).collect();
        store.insert_job_post(job(1, &ten)).await;
        store.insert_job_post(job(2, &twenty_five)).await;
        store.insert_user(candidate(100, &(1..=17).collect::<Vec<_>>())).await;
        store.insert_user(candidate(200, &(1..=7).collect::<Vec<_>>())).await;

        let (notifier, mut receiver) = ChannelNotifier::new();
        let service = MatchingService::new(store, notifier, MatchingConfig::default());
        service.run_batch(&CancellationToken::new()).await.unwrap();

        let store = service.store();
        assert_eq!(store.job_match(1, 200).await.unwrap().match_score, 70);
        assert_eq!(store.job_match(2, 100).await.unwrap().match_score, 69);

        let mut notified = Vec::new();
        while let Ok(n) = receiver.try_recv() {
            notified.push((n.job_post_id, n.candidate_id, n.match_score));
        }
        notified.sort();
        // candidate 100 holds 10/10 of job 1 -> 85
        assert_eq!(notified, vec![(1, 100, 85), (1, 200, 70)]);
    }

    #[tokio::test]
    async fn upsert_failure_does_not_abort_batch() {
        let store = InMemoryStore::new();
        store.insert_job_post(job(1, &[1])).await;
        store.insert_user(candidate(10, &[1])).await;
        store.insert_user(candidate(11, &[1])).await;
        store.fail_upserts_for(1, 10).await;

        let (notifier, mut receiver) = ChannelNotifier::new();
        let service = MatchingService::new(store, notifier, MatchingConfig::default());
        let report = service.run_batch(&CancellationToken::new()).await.unwrap();

        assert_eq!(report.pairs_scored, 2);
        assert_eq!(report.upsert_failures, 1);
        assert_eq!(report.matches_created, 1);
        assert!(service.store().job_match(1, 10).await.is_none());
        assert!(service.store().job_match(1, 11).await.is_some());

        assert_eq!(receiver.try_recv().unwrap().candidate_id, 11);
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn notification_failure_keeps_match_row() {
        let store = InMemoryStore::new();
        store.insert_job_post(job(1, &[1])).await;
        store.insert_user(candidate(10, &[1])).await;

        let service = MatchingService::new(store, FailingNotifier, MatchingConfig::default());
        let report = service.run_batch(&CancellationToken::new()).await.unwrap();

        assert_eq!(report.notification_failures, 1);
        assert_eq!(report.notifications_sent, 0);
        let row = service.store().job_match(1, 10).await.unwrap();
        assert_eq!(row.match_score, 85);
        assert_eq!(row.status, MatchStatus::Pending);
    }

    #[tokio::test]
    async fn pages_cover_every_candidate() {
        let store = InMemoryStore::new();
        store.insert_job_post(job(1, &[1])).await;
        store.insert_job_post(job(2, &[2])).await;
        for id in 10..17 {
            store.insert_user(candidate(id, &[1])).await;
        }

        let (notifier, _receiver) = ChannelNotifier::new();
        let config = MatchingConfig {
            candidate_page_size: 3,
            ..MatchingConfig::default()
        };
        let service = MatchingService::new(store, notifier, config);
        let report = service.run_batch(&CancellationToken::new()).await.unwrap();

        assert_eq!(report.candidates, 7);
        assert_eq!(report.pairs_scored, 14);
        assert_eq!(service.store().job_matches().await.len(), 14);
    }

    #[tokio::test]
    async fn cancelled_run_stops_before_scoring() {
        let store = InMemoryStore::new();
        store.insert_job_post(job(1, &[1])).await;
        store.insert_user(candidate(10, &[1])).await;

        let (notifier, _receiver) = ChannelNotifier::new();
        let service = MatchingService::new(store, notifier, MatchingConfig::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let report = service.run_batch(&cancel).await.unwrap();
        assert!(report.cancelled);
        assert_eq!(report.pairs_scored, 0);
    }

    #[tokio::test]
    async fn overlapping_run_is_skipped() {
        let (notifier, _receiver) = ChannelNotifier::new();
        let service = MatchingService::new(InMemoryStore::new(), notifier, MatchingConfig::default());

        let _held = service.run_guard.lock().await;
        let report = service.run_batch(&CancellationToken::new()).await.unwrap();
        assert_eq!(report.skipped, Some(SkipReason::AlreadyRunning));
    }

    struct FirstPageOnly(InMemoryStore);

    impl MatchingStore for FirstPageOnly {
        async fn fetch_active_job_posts(&self) -> Result<Vec<JobPost>, StoreError> {
            self.0.fetch_active_job_posts().await
        }

        async fn fetch_candidates_page(
            &self,
            after_id: Option<i64>,
            limit: usize,
        ) -> Result<Vec<Candidate>, StoreError> {
            match after_id {
                None => self.0.fetch_candidates_page(None, limit).await,
                Some(_) => Err(StoreError::Unavailable("connection reset".into())),
            }
        }

        async fn upsert_job_match(
            &self,
            record: &JobMatchUpsert,
            policy: crate::store::StatusPolicy,
        ) -> Result<crate::store::UpsertOutcome, StoreError> {
            self.0.upsert_job_match(record, policy).await
        }
    }

    #[tokio::test]
    async fn page_load_failure_aborts_but_keeps_written_pairs() {
        let inner = InMemoryStore::new();
        inner.insert_job_post(job(1, &[1])).await;
        for id in [10, 20, 30] {
            inner.insert_user(candidate(id, &[1])).await;
        }
        let (notifier, _receiver) = ChannelNotifier::new();
        let config = MatchingConfig {
            candidate_page_size: 2,
            ..MatchingConfig::default()
        };
        let service = MatchingService::new(FirstPageOnly(inner), notifier, config);

        let err = service
            .run_batch(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MatchingError::LoadCandidates {
                after_id: Some(20),
                ..
            }
        ));
        assert_eq!(service.store().0.job_matches().await.len(), 2);
    }
}
