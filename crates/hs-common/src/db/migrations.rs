use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::{
    db::PgPool,
    schema::{JOB_MATCHES_DDL, JOB_POSTS_DDL, NOTIFICATIONS_DDL, SKILLS_DDL, USERS_DDL},
};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] PgError),
}

struct Migration {
    id: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        id: 1,
        description: "skills",
        sql: SKILLS_DDL,
    },
    Migration {
        id: 2,
        description: "users with candidate matching fields",
        sql: USERS_DDL,
    },
    Migration {
        id: 3,
        description: "job posts and required skills",
        sql: JOB_POSTS_DDL,
    },
    Migration {
        id: 4,
        description: "job matches keyed by (job_post_id, candidate_id)",
        sql: JOB_MATCHES_DDL,
    },
    Migration {
        id: 5,
        description: "notification outbox",
        sql: NOTIFICATIONS_DDL,
    },
];

const BOOTSTRAP_SQL: &str = "CREATE SCHEMA IF NOT EXISTS hs;
    CREATE TABLE IF NOT EXISTS hs.schema_migrations (
        id INTEGER PRIMARY KEY,
        description TEXT NOT NULL,
        applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    );";

/// Apply pending migrations in id order, each in its own transaction.
/// Returns how many were applied.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<usize, MigrationError> {
    let mut client = pool.get().await?;
    client.batch_execute(BOOTSTRAP_SQL).await?;

    let mut applied = 0;
    for migration in MIGRATIONS {
        let already_applied: bool = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM hs.schema_migrations WHERE id = $1)",
                &[&migration.id],
            )
            .await?
            .get(0);

        if already_applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            "INSERT INTO hs.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;
        applied += 1;

        info!(
            id = migration.id,
            description = migration.description,
            "applied migration"
        );
    }

    Ok(applied)
}
