//! Gateways to the external systems this service drives but does not own:
//! the object store, the resume-processing function, the job-refresh
//! service, the document store and the course-search API.
//!
//! Each backend sits behind an `async_trait` seam so the orchestration can be
//! exercised against in-memory fakes.

pub mod courses;
pub mod feedback;
pub mod invocation;
pub mod match_store;
pub mod object_store;
pub mod refresh;

#[cfg(test)]
pub mod testing;

use thiserror::Error;

pub use courses::{CourseSearch, CourseraSearch};
pub use feedback::{FeedbackRecorder, MongoFeedbackSink};
pub use invocation::{InvocationGateway, LambdaInvoker};
pub use match_store::{MatchStoreReader, MongoMatchStore};
pub use object_store::{ObjectStoreGateway, S3ObjectStore};
pub use refresh::{JobRefreshGateway, ReqwestTransport};

/// Transport or storage failure reported by a gateway backend.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("storage error: {0}")]
    Storage(String),

    #[error("async invocation error: {0}")]
    Invocation(String),

    #[error("document store error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
