use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{JobMatch, UserIdentity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackValue {
    Like,
    Dislike,
}

impl FeedbackValue {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackValue::Like => "like",
            FeedbackValue::Dislike => "dislike",
        }
    }
}

/// One append-only like/dislike entry. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackRecord {
    pub user_id: UserIdentity,
    pub title: String,
    pub company: String,
    pub job_link: Option<String>,
    pub feedback: FeedbackValue,
    pub ts: DateTime<Utc>,
}

impl FeedbackRecord {
    /// Builds the record for `job`, stamped with the write time.
    pub fn new(user: &UserIdentity, job: &JobMatch, feedback: FeedbackValue) -> Self {
        Self::at(user, job, feedback, Utc::now())
    }

    pub fn at(
        user: &UserIdentity,
        job: &JobMatch,
        feedback: FeedbackValue,
        ts: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user.clone(),
            title: job.title.clone().unwrap_or_default(),
            company: job.company.clone().unwrap_or_default(),
            job_link: job.job_link.clone(),
            feedback,
            ts,
        }
    }
}
