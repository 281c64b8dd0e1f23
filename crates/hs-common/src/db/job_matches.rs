use tokio_postgres::types::Json;
use tracing::instrument;

use super::util::{TimedClientExt, column};
use crate::{
    db::PgPool,
    store::{JobMatchUpsert, MatchStatus, StatusPolicy, StoreError, UpsertOutcome},
};

// Single statement so concurrent runs can't create a second row for a pair.
// $6 decides whether an existing row's status goes back to 'pending'.
const UPSERT_JOB_MATCH_SQL: &str = "INSERT INTO hs.job_matches (\
        job_post_id, candidate_id, match_score, match_details, status, last_run_id\
    ) VALUES ($1, $2, $3, $4, 'pending', $5) \
    ON CONFLICT (job_post_id, candidate_id) DO UPDATE SET \
        match_score = EXCLUDED.match_score, \
        match_details = EXCLUDED.match_details, \
        status = CASE WHEN $6::BOOLEAN THEN 'pending' ELSE hs.job_matches.status END, \
        last_run_id = EXCLUDED.last_run_id, \
        updated_at = NOW() \
    RETURNING id, status, xmax = 0 AS inserted";

#[instrument(skip(pool, record), fields(job_post_id = record.job_post_id, candidate_id = record.candidate_id))]
pub async fn upsert_job_match(
    pool: &PgPool,
    record: &JobMatchUpsert,
    policy: StatusPolicy,
) -> Result<UpsertOutcome, StoreError> {
    let client = pool.get().await?;
    let row = client
        .timed_query_one(
            UPSERT_JOB_MATCH_SQL,
            &[
                &record.job_post_id,
                &record.candidate_id,
                &record.match_score,
                &Json(&record.match_details),
                &record.run_id,
                &policy.resets(),
            ],
            "upsert_job_match",
        )
        .await?;

    let status: String = column(&row, "status")?;
    Ok(UpsertOutcome {
        match_id: column(&row, "id")?,
        created: column(&row, "inserted")?,
        status: status
            .parse::<MatchStatus>()
            .map_err(|e| StoreError::Mapping(e.to_string()))?,
    })
}
