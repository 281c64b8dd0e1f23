#![allow(async_fn_in_trait)]

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tracing::info;

use crate::{Candidate, JobPost};

pub const HIGH_MATCH_KIND: &str = "candidate_high_match";

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification channel closed")]
    ChannelClosed,
    #[error("failed to persist notification: {0}")]
    Store(#[from] crate::store::StoreError),
}

/// Tells a candidate that a job scored at or above the threshold for them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighMatchNotification {
    pub match_id: i64,
    pub candidate_id: i64,
    pub candidate_name: String,
    pub candidate_email: String,
    pub job_post_id: i64,
    pub job_title: String,
    pub company_name: String,
    pub location: String,
    pub match_score: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub greeting: String,
    pub lines: Vec<String>,
    pub action_text: String,
    pub action_url: String,
    pub outro: String,
}

impl HighMatchNotification {
    pub fn new(match_id: i64, job: &JobPost, candidate: &Candidate, match_score: i32) -> Self {
        Self {
            match_id,
            candidate_id: candidate.id,
            candidate_name: candidate.name.clone(),
            candidate_email: candidate.email.clone(),
            job_post_id: job.id,
            job_title: job.title.clone(),
            company_name: job.company_name.clone(),
            location: job.location.clone(),
            match_score,
        }
    }

    /// Stored notification data.
    pub fn to_payload(&self) -> Value {
        json!({
            "job_post_id": self.job_post_id,
            "match_score": self.match_score,
        })
    }

    pub fn to_mail(&self, app_url: &str) -> MailMessage {
        MailMessage {
            to: self.candidate_email.clone(),
            subject: "You're a great match for a new job!".into(),
            greeting: format!("Hi {},", self.candidate_name),
            lines: vec![
                format!(
                    "We found a new job opportunity that looks like a great fit for you (Match Score: {}%).",
                    self.match_score
                ),
                format!("Job Title: **{}** at **{}**", self.job_title, self.company_name),
                format!("Location: **{}**", self.location),
            ],
            action_text: "View Job & Apply".into(),
            action_url: format!(
                "{}/api/v1/job-posts/{}",
                app_url.trim_end_matches('/'),
                self.job_post_id
            ),
            outro: "Thank you for using HireSmart!".into(),
        }
    }
}

/// Delivery side of high-match events. Failures are reported, never retried here.
pub trait MatchNotifier {
    async fn notify_high_match(
        &self,
        notification: &HighMatchNotification,
    ) -> Result<(), NotificationError>;
}

/// Hands notifications to an in-process consumer.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<HighMatchNotification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HighMatchNotification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl MatchNotifier for ChannelNotifier {
    async fn notify_high_match(
        &self,
        notification: &HighMatchNotification,
    ) -> Result<(), NotificationError> {
        self.sender
            .send(notification.clone())
            .map_err(|_| NotificationError::ChannelClosed)
    }
}

/// Writes the rendered mail to the log instead of delivering it.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    app_url: String,
}

impl LogNotifier {
    pub fn new(app_url: impl Into<String>) -> Self {
        Self {
            app_url: app_url.into(),
        }
    }
}

impl MatchNotifier for LogNotifier {
    async fn notify_high_match(
        &self,
        notification: &HighMatchNotification,
    ) -> Result<(), NotificationError> {
        let mail = notification.to_mail(&self.app_url);
        info!(
            to = %mail.to,
            subject = %mail.subject,
            action_url = %mail.action_url,
            match_score = notification.match_score,
            "high match mail rendered"
        );
        Ok(())
    }
}
