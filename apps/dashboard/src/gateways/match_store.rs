use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{doc, Document};
use mongodb::{Collection, Database};

use crate::db::{MATCHES_COLLECTION, RESUMES_COLLECTION};
use crate::gateways::GatewayError;
use crate::models::resume::ResumeStatus;
use crate::models::{JobMatch, MatchDocument, UserIdentity};

/// Point-in-time reads from the shared document store. Absence is `Ok(None)`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchStore: Send + Sync {
    async fn find_match_document(
        &self,
        user: &UserIdentity,
    ) -> Result<Option<MatchDocument>, GatewayError>;

    async fn resume_record_exists(&self, user: &UserIdentity) -> Result<bool, GatewayError>;
}

pub struct MongoMatchStore {
    matches: Collection<MatchDocument>,
    resumes: Collection<Document>,
}

impl MongoMatchStore {
    pub fn new(db: &Database) -> Self {
        Self {
            matches: db.collection(MATCHES_COLLECTION),
            resumes: db.collection(RESUMES_COLLECTION),
        }
    }
}

#[async_trait]
impl MatchStore for MongoMatchStore {
    async fn find_match_document(
        &self,
        user: &UserIdentity,
    ) -> Result<Option<MatchDocument>, GatewayError> {
        let found = self
            .matches
            .find_one(doc! { "user_id": user.as_str() }, None)
            .await?;
        Ok(found)
    }

    async fn resume_record_exists(&self, user: &UserIdentity) -> Result<bool, GatewayError> {
        let found = self
            .resumes
            .find_one(doc! { "user_id": user.as_str() }, None)
            .await?;
        Ok(found.is_some())
    }
}

#[derive(Clone)]
pub struct MatchStoreReader {
    store: Arc<dyn MatchStore>,
}

impl MatchStoreReader {
    pub fn new(store: Arc<dyn MatchStore>) -> Self {
        Self { store }
    }

    /// Returns the stored results verbatim, or an empty list when the
    /// matching pipeline has not produced a document yet.
    pub async fn load_matches(&self, user: &UserIdentity) -> Result<Vec<JobMatch>, GatewayError> {
        let document = self.store.find_match_document(user).await?;
        Ok(document.map(|d| d.results).unwrap_or_default())
    }

    pub async fn resume_status(&self, user: &UserIdentity) -> Result<ResumeStatus, GatewayError> {
        let processed = self.store.resume_record_exists(user).await?;
        Ok(ResumeStatus {
            user_id: user.to_string(),
            processed,
        })
    }
}
