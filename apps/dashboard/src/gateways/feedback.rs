use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{self, doc, Document};
use mongodb::{Collection, Database};
use tracing::info;

use crate::db::FEEDBACK_COLLECTION;
use crate::gateways::GatewayError;
use crate::models::{FeedbackRecord, FeedbackValue, JobMatch, UserIdentity};

/// Append-only feedback collection. There is no update or delete path.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn append(&self, record: &FeedbackRecord) -> Result<(), GatewayError>;
}

pub struct MongoFeedbackSink {
    collection: Collection<Document>,
}

impl MongoFeedbackSink {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(FEEDBACK_COLLECTION),
        }
    }
}

#[async_trait]
impl FeedbackSink for MongoFeedbackSink {
    async fn append(&self, record: &FeedbackRecord) -> Result<(), GatewayError> {
        let document = doc! {
            "user_id": record.user_id.as_str(),
            "title": record.title.as_str(),
            "company": record.company.as_str(),
            "job_link": record.job_link.clone(),
            "feedback": record.feedback.as_str(),
            "ts": bson::DateTime::from_chrono(record.ts),
        };
        self.collection.insert_one(document, None).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct FeedbackRecorder {
    sink: Arc<dyn FeedbackSink>,
}

impl FeedbackRecorder {
    pub fn new(sink: Arc<dyn FeedbackSink>) -> Self {
        Self { sink }
    }

    /// Appends one record stamped with the current UTC time. Repeated or
    /// conflicting feedback for the same job accumulates.
    pub async fn record_feedback(
        &self,
        user: &UserIdentity,
        job: &JobMatch,
        value: FeedbackValue,
    ) -> Result<FeedbackRecord, GatewayError> {
        let record = FeedbackRecord::new(user, job, value);
        self.sink.append(&record).await?;
        info!(
            "Recorded {} for {} at {}",
            value.as_str(),
            user,
            record.company
        );
        Ok(record)
    }
}
