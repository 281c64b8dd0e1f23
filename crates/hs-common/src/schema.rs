/// Skills shared by job posts and candidates.
pub const SKILLS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS hs.skills (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);
"#;

/// Users of every role. Candidate matching fields stay NULL for admins and employers.
pub const USERS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS hs.users (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255) NOT NULL UNIQUE,
    role VARCHAR(20) NOT NULL DEFAULT 'candidate',

    location_preference VARCHAR(255),
    salary_expectation_min BIGINT,
    salary_expectation_max BIGINT,

    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ,

    CONSTRAINT chk_users_role CHECK (role IN ('admin', 'employer', 'candidate')),
    CONSTRAINT chk_users_salary_expectation CHECK (
        salary_expectation_min IS NULL OR salary_expectation_min >= 0
    )
);

CREATE INDEX IF NOT EXISTS idx_users_role_id ON hs.users(role, id) WHERE deleted_at IS NULL;

CREATE TABLE IF NOT EXISTS hs.user_skill (
    user_id BIGINT NOT NULL REFERENCES hs.users(id) ON DELETE CASCADE,
    skill_id BIGINT NOT NULL REFERENCES hs.skills(id) ON DELETE CASCADE,
    PRIMARY KEY (user_id, skill_id)
);
"#;

pub const JOB_POSTS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS hs.job_posts (
    id BIGSERIAL PRIMARY KEY,
    employer_id BIGINT NOT NULL REFERENCES hs.users(id) ON DELETE CASCADE,
    title VARCHAR(255) NOT NULL,
    description TEXT NOT NULL,
    company_name VARCHAR(255) NOT NULL,
    company_description TEXT,
    location VARCHAR(255) NOT NULL,
    salary_min BIGINT,
    salary_max BIGINT,
    is_active BOOLEAN NOT NULL DEFAULT true,

    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX IF NOT EXISTS idx_job_posts_active ON hs.job_posts(id) WHERE is_active;

CREATE TABLE IF NOT EXISTS hs.job_post_skill (
    job_post_id BIGINT NOT NULL REFERENCES hs.job_posts(id) ON DELETE CASCADE,
    skill_id BIGINT NOT NULL REFERENCES hs.skills(id) ON DELETE CASCADE,
    PRIMARY KEY (job_post_id, skill_id)
);
"#;

/// One row per (job_post_id, candidate_id); every batch run overwrites score and details.
pub const JOB_MATCHES_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS hs.job_matches (
    id BIGSERIAL PRIMARY KEY,
    job_post_id BIGINT NOT NULL REFERENCES hs.job_posts(id) ON DELETE CASCADE,
    candidate_id BIGINT NOT NULL REFERENCES hs.users(id) ON DELETE CASCADE,
    match_score INTEGER NOT NULL,
    match_details JSONB NOT NULL,
    status VARCHAR(20) NOT NULL DEFAULT 'pending',

    -- ULID of the batch run that last wrote the row
    last_run_id VARCHAR(26),

    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_job_matches_pair UNIQUE (job_post_id, candidate_id),
    CONSTRAINT chk_job_matches_status CHECK (status IN ('pending', 'viewed', 'rejected')),
    CONSTRAINT chk_job_matches_score CHECK (match_score >= 0)
);

CREATE INDEX IF NOT EXISTS idx_job_matches_candidate_score
    ON hs.job_matches(candidate_id, match_score DESC);
"#;

/// Outbox of queued notifications, drained by the mail delivery service.
pub const NOTIFICATIONS_DDL: &str = r#"
CREATE TABLE IF NOT EXISTS hs.notifications (
    id BIGSERIAL PRIMARY KEY,
    notifiable_id BIGINT NOT NULL REFERENCES hs.users(id) ON DELETE CASCADE,
    kind VARCHAR(64) NOT NULL,
    channel VARCHAR(20) NOT NULL DEFAULT 'mail',
    data JSONB NOT NULL,
    mail JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    sent_at TIMESTAMPTZ
);

CREATE INDEX IF NOT EXISTS idx_notifications_unsent
    ON hs.notifications(created_at, id) WHERE sent_at IS NULL;
"#;
