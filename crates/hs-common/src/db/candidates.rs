use tokio_postgres::Row;
use tracing::instrument;

use super::{
    job_posts::skill_set,
    util::{TimedClientExt, column, limit_param},
};
use crate::{Candidate, CandidateProfile, Role, User, db::PgPool, store::StoreError};

const CANDIDATES_PAGE_SQL: &str = "SELECT \
        u.id, u.name, u.email, u.role, \
        u.location_preference, u.salary_expectation_min, u.salary_expectation_max, \
        COALESCE( \
            array_agg(us.skill_id ORDER BY us.skill_id) FILTER (WHERE us.skill_id IS NOT NULL), \
            ARRAY[]::BIGINT[] \
        ) AS skill_ids \
    FROM hs.users u \
    LEFT JOIN hs.user_skill us ON us.user_id = u.id \
    WHERE u.role = 'candidate' \
      AND u.deleted_at IS NULL \
      AND ($1::BIGINT IS NULL OR u.id > $1::BIGINT) \
    GROUP BY u.id \
    ORDER BY u.id \
    LIMIT $2";

fn role_from_column(role: &str, profile: CandidateProfile) -> Result<Role, StoreError> {
    match role {
        "candidate" => Ok(Role::Candidate(profile)),
        "employer" => Ok(Role::Employer),
        "admin" => Ok(Role::Admin),
        other => Err(StoreError::Mapping(format!("unknown user role: {other}"))),
    }
}

fn user_from_row(row: &Row) -> Result<User, StoreError> {
    let profile = CandidateProfile {
        location_preference: column(row, "location_preference")?,
        salary_expectation_min: column(row, "salary_expectation_min")?,
        salary_expectation_max: column(row, "salary_expectation_max")?,
        skills: skill_set(column(row, "skill_ids")?),
    };
    let role: String = column(row, "role")?;

    Ok(User {
        id: column(row, "id")?,
        name: column(row, "name")?,
        email: column(row, "email")?,
        role: role_from_column(&role, profile)?,
    })
}

/// One keyset page of candidates (ordered by id, strictly after `after_id`).
#[instrument(skip(pool))]
pub async fn fetch_candidates_page(
    pool: &PgPool,
    after_id: Option<i64>,
    limit: usize,
) -> Result<Vec<Candidate>, StoreError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query(
            CANDIDATES_PAGE_SQL,
            &[&after_id, &limit_param(limit)],
            "fetch_candidates_page",
        )
        .await?;

    rows.iter()
        .map(|row| {
            let user = user_from_row(row)?;
            let id = user.id;
            user.into_candidate()
                .ok_or_else(|| StoreError::Mapping(format!("user {id} is not a candidate")))
        })
        .collect()
}
