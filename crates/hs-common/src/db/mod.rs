pub mod candidates;
pub mod job_matches;
pub mod job_posts;
pub mod migrations;
pub mod notifications;
pub mod pool;
pub mod store;
pub mod util;

pub use candidates::fetch_candidates_page;
pub use job_matches::upsert_job_match;
pub use job_posts::fetch_active_job_posts;
pub use migrations::{MigrationError, run_migrations};
pub use notifications::{OutboxNotifier, insert_notification};
pub use pool::{DbPoolError, PgPool, create_pool_from_url};
pub use store::PgMatchingStore;
