use std::collections::BTreeSet;

use tokio_postgres::Row;
use tracing::instrument;

use super::util::{TimedClientExt, column};
use crate::{JobPost, SkillId, db::PgPool, store::StoreError};

const ACTIVE_JOB_POSTS_SQL: &str = "SELECT \
        jp.id, jp.employer_id, jp.title, jp.description, jp.company_name, \
        jp.company_description, jp.location, jp.salary_min, jp.salary_max, jp.is_active, \
        COALESCE( \
            array_agg(jps.skill_id ORDER BY jps.skill_id) FILTER (WHERE jps.skill_id IS NOT NULL), \
            ARRAY[]::BIGINT[] \
        ) AS skill_ids \
    FROM hs.job_posts jp \
    LEFT JOIN hs.job_post_skill jps ON jps.job_post_id = jp.id \
    WHERE jp.is_active \
    GROUP BY jp.id \
    ORDER BY jp.id";

pub(crate) fn skill_set(ids: Vec<SkillId>) -> BTreeSet<SkillId> {
    ids.into_iter().collect()
}

fn job_post_from_row(row: &Row) -> Result<JobPost, StoreError> {
    Ok(JobPost {
        id: column(row, "id")?,
        employer_id: column(row, "employer_id")?,
        title: column(row, "title")?,
        description: column(row, "description")?,
        company_name: column(row, "company_name")?,
        company_description: column(row, "company_description")?,
        location: column(row, "location")?,
        salary_min: column(row, "salary_min")?,
        salary_max: column(row, "salary_max")?,
        is_active: column(row, "is_active")?,
        required_skills: skill_set(column(row, "skill_ids")?),
    })
}

/// Active job posts with their required skill ids.
#[instrument(skip(pool))]
pub async fn fetch_active_job_posts(pool: &PgPool) -> Result<Vec<JobPost>, StoreError> {
    let client = pool.get().await?;
    let rows = client
        .timed_query(ACTIVE_JOB_POSTS_SQL, &[], "fetch_active_job_posts")
        .await?;

    rows.iter().map(job_post_from_row).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_active_posts_are_selected() {
        assert!(ACTIVE_JOB_POSTS_SQL.contains("WHERE jp.is_active"));
        assert!(ACTIVE_JOB_POSTS_SQL.contains("LEFT JOIN hs.job_post_skill"));
    }

    #[test]
    fn skill_ids_collapse_into_set() {
        let set = skill_set(vec![3, 1, 3, 2]);
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
    }
}
