//! In-memory stand-ins for the external stores, shared by the orchestration
//! and router tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use serde_json::{json, Value};

use crate::gateways::courses::{course_query, Course, CourseLookup, CourseSearch};
use crate::gateways::feedback::FeedbackSink;
use crate::gateways::invocation::FunctionInvoker;
use crate::gateways::match_store::MatchStore;
use crate::gateways::object_store::ObjectStore;
use crate::gateways::refresh::{HttpTransport, TransportError};
use crate::gateways::GatewayError;
use crate::models::{FeedbackRecord, JobMatch, MatchDocument, UserIdentity};

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, (Bytes, String)>>,
    pub fail: bool,
}

impl MemoryObjectStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<(Bytes, String)> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), GatewayError> {
        if self.fail {
            return Err(GatewayError::Storage("bucket unavailable".to_string()));
        }
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (body, content_type.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingInvoker {
    events: Mutex<Vec<Value>>,
}

impl RecordingInvoker {
    pub fn events(&self) -> Vec<Value> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl FunctionInvoker for RecordingInvoker {
    async fn invoke_event(&self, payload: Vec<u8>) -> Result<(), GatewayError> {
        let event = serde_json::from_slice(&payload)?;
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

pub struct FailingInvoker;

#[async_trait]
impl FunctionInvoker for FailingInvoker {
    async fn invoke_event(&self, _payload: Vec<u8>) -> Result<(), GatewayError> {
        Err(GatewayError::Invocation("function throttled".to_string()))
    }
}

/// Holds match documents as raw JSON so that decoding runs exactly as it
/// does for documents read from the store.
#[derive(Default)]
pub struct MemoryMatchStore {
    documents: HashMap<String, Value>,
    resumes: HashSet<String>,
}

impl MemoryMatchStore {
    pub fn with_matches(self, user: &str, matches: Vec<JobMatch>) -> Self {
        self.with_raw(user, json!({ "user_id": user, "results": matches }))
    }

    pub fn with_raw(mut self, user: &str, document: Value) -> Self {
        self.documents.insert(user.to_string(), document);
        self
    }

    pub fn with_resume(mut self, user: &str) -> Self {
        self.resumes.insert(user.to_string());
        self
    }
}

#[async_trait]
impl MatchStore for MemoryMatchStore {
    async fn find_match_document(
        &self,
        user: &UserIdentity,
    ) -> Result<Option<MatchDocument>, GatewayError> {
        match self.documents.get(user.as_str()) {
            Some(document) => Ok(Some(serde_json::from_value(document.clone())?)),
            None => Ok(None),
        }
    }

    async fn resume_record_exists(&self, user: &UserIdentity) -> Result<bool, GatewayError> {
        Ok(self.resumes.contains(user.as_str()))
    }
}

/// Every read fails as if the database were unreachable.
pub struct FailingMatchStore;

#[async_trait]
impl MatchStore for FailingMatchStore {
    async fn find_match_document(
        &self,
        _user: &UserIdentity,
    ) -> Result<Option<MatchDocument>, GatewayError> {
        Err(GatewayError::Storage("matches unavailable".to_string()))
    }

    async fn resume_record_exists(&self, _user: &UserIdentity) -> Result<bool, GatewayError> {
        Err(GatewayError::Storage("resumes unavailable".to_string()))
    }
}

#[derive(Default)]
pub struct MemoryFeedbackSink {
    records: Mutex<Vec<FeedbackRecord>>,
}

impl MemoryFeedbackSink {
    pub fn records(&self) -> Vec<FeedbackRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedbackSink for MemoryFeedbackSink {
    async fn append(&self, record: &FeedbackRecord) -> Result<(), GatewayError> {
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Answers every POST with a fixed status and counts calls.
pub struct FixedStatusTransport {
    pub status: u16,
    calls: Mutex<usize>,
}

impl FixedStatusTransport {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl HttpTransport for FixedStatusTransport {
    async fn post_json(&self, _url: &str, _body: &Value) -> Result<u16, TransportError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.status)
    }
}

/// Returns one course per query, named after the query, and remembers queries.
#[derive(Default)]
pub struct EchoCourseSearch {
    queries: Mutex<Vec<String>>,
}

impl EchoCourseSearch {
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl CourseSearch for EchoCourseSearch {
    async fn search(&self, skills: &[String]) -> CourseLookup {
        if skills.is_empty() {
            return CourseLookup::Found(Vec::new());
        }
        let query = course_query(skills);
        self.queries.lock().unwrap().push(query.clone());
        CourseLookup::Found(vec![Course {
            name: query,
            link: String::new(),
        }])
    }
}
