use serde_json::Value;
use tokio_postgres::types::Json;
use tracing::instrument;

use super::util::{TimedClientExt, column};
use crate::{
    db::PgPool,
    notify::{HIGH_MATCH_KIND, HighMatchNotification, MailMessage, MatchNotifier, NotificationError},
    store::StoreError,
};

const INSERT_NOTIFICATION_SQL: &str = "INSERT INTO hs.notifications (\
        notifiable_id, kind, channel, data, mail\
    ) VALUES ($1, $2, 'mail', $3, $4) \
    RETURNING id";

/// Queue a notification row for the mail delivery service.
#[instrument(skip(pool, data, mail))]
pub async fn insert_notification(
    pool: &PgPool,
    notifiable_id: i64,
    kind: &str,
    data: &Value,
    mail: Option<&MailMessage>,
) -> Result<i64, StoreError> {
    let client = pool.get().await?;
    let row = client
        .timed_query_one(
            INSERT_NOTIFICATION_SQL,
            &[&notifiable_id, &kind, &Json(data), &mail.map(Json)],
            "insert_notification",
        )
        .await?;

    column(&row, "id")
}

/// Writes high-match notifications into the `hs.notifications` outbox.
#[derive(Clone)]
pub struct OutboxNotifier {
    pool: PgPool,
    app_url: String,
}

impl OutboxNotifier {
    pub fn new(pool: PgPool, app_url: impl Into<String>) -> Self {
        Self {
            pool,
            app_url: app_url.into(),
        }
    }
}

impl MatchNotifier for OutboxNotifier {
    async fn notify_high_match(
        &self,
        notification: &HighMatchNotification,
    ) -> Result<(), NotificationError> {
        let mail = notification.to_mail(&self.app_url);
        insert_notification(
            &self.pool,
            notification.candidate_id,
            HIGH_MATCH_KIND,
            &notification.to_payload(),
            Some(&mail),
        )
        .await?;
        Ok(())
    }
}
