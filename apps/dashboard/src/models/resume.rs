use serde::Serialize;

/// Whether the resume processor has written its parsed record for a user yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeStatus {
    pub user_id: String,
    pub processed: bool,
}
